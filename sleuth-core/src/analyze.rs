// Run orchestration: read or probe, build the report, persist it

use crate::error::{Result, RunError};
use crate::extract::ExtractOptions;
use crate::report::{DiagnosticReport, RunContext, build_extraction_report, build_probe_report};
use crate::sink::{FileSink, ReportSink};
use serde::{Deserialize, Serialize};
use sleuth_scanner::{Prober, prober::DEFAULT_TIMEOUT_SECS};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub log_dir: PathBuf,
    pub dedupe_urls: bool,
    pub claim_spans: bool,
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("log"),
            dedupe_urls: false,
            claim_spans: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalyzerConfig {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            dedupe_urls: self.dedupe_urls,
            claim_spans: self.claim_spans,
        }
    }

    pub fn prober(&self) -> Result<Prober> {
        Ok(Prober::with_timeout(self.timeout_secs)?)
    }

    pub fn sink(&self) -> FileSink {
        FileSink::new(&self.log_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Reading,
    Probing,
    BuildingReport,
    Persisting,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Reading => "reading",
            RunStage::Probing => "probing",
            RunStage::BuildingReport => "building_report",
            RunStage::Persisting => "persisting",
        }
    }
}

/// Minimal report for a run that could not finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub success: bool,
    pub stage: RunStage,
    pub error: String,
}

impl FailureReport {
    pub fn new(stage: RunStage, error: &RunError) -> Self {
        Self {
            success: false,
            stage,
            error: error.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Persisted {
        report: DiagnosticReport,
        path: PathBuf,
    },
    Failed(FailureReport),
}

impl RunOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, RunOutcome::Persisted { .. })
    }
}

fn at<T>(stage: RunStage, result: Result<T>) -> std::result::Result<T, FailureReport> {
    result.map_err(|e| {
        error!("Run failed while {}: {}", stage.as_str(), e);
        FailureReport::new(stage, &e)
    })
}

fn finish(result: std::result::Result<(DiagnosticReport, PathBuf), FailureReport>) -> RunOutcome {
    match result {
        Ok((report, path)) => RunOutcome::Persisted { report, path },
        Err(failure) => RunOutcome::Failed(failure),
    }
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RunError::Input {
        path: path.to_path_buf(),
        source,
    })
}

fn serialize(report: &DiagnosticReport) -> Result<String> {
    Ok(report.to_json()?)
}

fn persist<S: ReportSink + ?Sized>(sink: &S, file_name: &str, json: &str) -> Result<PathBuf> {
    sink.write(file_name, json.as_bytes()).map_err(RunError::Persist)
}

fn store<S: ReportSink + ?Sized>(
    report: DiagnosticReport,
    sink: &S,
) -> std::result::Result<(DiagnosticReport, PathBuf), FailureReport> {
    let json = at(RunStage::BuildingReport, serialize(&report))?;
    let path = at(RunStage::Persisting, persist(sink, &report.file_name(), &json))?;
    info!("Report saved to {}", path.display());
    Ok((report, path))
}

fn file_analysis<S: ReportSink + ?Sized>(
    path: &Path,
    options: &ExtractOptions,
    ctx: &RunContext,
    sink: &S,
) -> std::result::Result<(DiagnosticReport, PathBuf), FailureReport> {
    info!("Reading {}", path.display());
    let text = at(RunStage::Reading, read_input(path))?;
    info!("Read {} chars", text.chars().count());

    let report = build_extraction_report(ctx, path, &text, options);
    store(report, sink)
}

/// The prober for `config`, or the failure report of a run that cannot
/// send its request.
pub fn build_prober(config: &AnalyzerConfig) -> std::result::Result<Prober, FailureReport> {
    at(RunStage::Probing, config.prober())
}

/// Scan a text file for data sources and persist an extraction report.
pub fn run_file_analysis<S: ReportSink + ?Sized>(
    path: &Path,
    options: &ExtractOptions,
    ctx: &RunContext,
    sink: &S,
) -> RunOutcome {
    finish(file_analysis(path, options, ctx, sink))
}

/// Probe one endpoint and persist a diagnostic report. Probe failures are
/// findings, so only serialization or persistence can fail the run.
pub async fn run_endpoint_analysis<S: ReportSink + ?Sized>(
    url: &str,
    prober: &Prober,
    ctx: &RunContext,
    sink: &S,
) -> RunOutcome {
    let probe_result = prober.probe(url).await;

    let report = build_probe_report(ctx, url, probe_result);
    finish(store(report, sink))
}
