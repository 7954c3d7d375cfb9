// Diagnostic report assembly and console rendering

use crate::aggregate::{aggregate, count, scan_data_flow, scan_processing, scan_technology};
use crate::analyze::FailureReport;
use crate::classify::classify;
use crate::extract::{ExtractOptions, extract_with};
use crate::model::{
    DataFlowSignals, ExtractedReference, ExtractionCounts, HostStat, ProcessingPattern,
    TechnologySignals,
};
use crate::params::{ParameterNote, break_down};
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use sleuth_scanner::ProbeResult;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

const RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Timestamp shared by everything one run produces: report body, report
/// file name and log file name.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    started: DateTime<Local>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    pub fn at(started: DateTime<Local>) -> Self {
        Self { started }
    }

    /// `YYYYMMDD_HHMMSS`
    pub fn stamp(&self) -> String {
        self.started.format("%Y%m%d_%H%M%S").to_string()
    }

    pub fn analysis_time(&self) -> String {
        self.started.to_rfc3339()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    HtmlDataSource,
    ApiDiagnostic,
}

impl ReportKind {
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportKind::HtmlDataSource => "html_data_source_report",
            ReportKind::ApiDiagnostic => "api_diagnostic_report",
        }
    }

    pub fn log_prefix(&self) -> &'static str {
        match self {
            ReportKind::HtmlDataSource => "html_analysis",
            ReportKind::ApiDiagnostic => "api_analysis",
        }
    }

    pub fn file_name(&self, ctx: &RunContext) -> String {
        format!("{}_{}.json", self.file_prefix(), ctx.stamp())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportSource {
    UrlAnalysis {
        url: String,
        base_url: String,
        parameters: Vec<ParameterNote>,
    },
    FileAnalysis {
        path: String,
        size_chars: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFindings {
    pub references: Vec<ExtractedReference>,
    pub host_stats: BTreeMap<String, HostStat>,
    pub technology_signals: TechnologySignals,
    pub data_flow_signals: DataFlowSignals,
    pub processing_patterns: Vec<ProcessingPattern>,
    pub counts: ExtractionCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Findings {
    Extraction(ExtractionFindings),
    Probe { probe_result: ProbeResult },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl ReportSummary {
    fn flag(&mut self, issue: String, recommendation: &str) {
        self.issues.push(issue);
        self.recommendations.push(recommendation.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub timestamp: String,
    pub analysis_time: String,
    pub source: ReportSource,
    pub findings: Findings,
    pub summary: ReportSummary,
}

impl DiagnosticReport {
    pub fn kind(&self) -> ReportKind {
        match self.findings {
            Findings::Extraction(_) => ReportKind::HtmlDataSource,
            Findings::Probe { .. } => ReportKind::ApiDiagnostic,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.kind().file_prefix(), self.timestamp)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn build_extraction_report(
    ctx: &RunContext,
    path: &Path,
    text: &str,
    options: &ExtractOptions,
) -> DiagnosticReport {
    let references = extract_with(text, options);
    info!("Extracted {} references", references.len());

    let host_stats = aggregate(&references);
    let technology_signals = scan_technology(text);
    let data_flow_signals = scan_data_flow(text, &references);
    let processing_patterns = scan_processing(text);
    let counts = count(&references, &host_stats);
    info!(
        "Aggregated {} hosts ({} api, {} external, {} data sources)",
        counts.unique_hosts, counts.api_endpoints, counts.external_resources, counts.data_sources
    );

    DiagnosticReport {
        timestamp: ctx.stamp(),
        analysis_time: ctx.analysis_time(),
        source: ReportSource::FileAnalysis {
            path: path.display().to_string(),
            size_chars: text.chars().count(),
        },
        findings: Findings::Extraction(ExtractionFindings {
            references,
            host_stats,
            technology_signals,
            data_flow_signals,
            processing_patterns,
            counts,
        }),
        summary: ReportSummary::default(),
    }
}

pub fn build_probe_report(ctx: &RunContext, url: &str, probe_result: ProbeResult) -> DiagnosticReport {
    let breakdown = break_down(url);

    let mut summary = summarize_probe(&probe_result);
    summary.purpose = Some(classify(url).to_string());
    summary.subject = breakdown.subject().map(str::to_string);

    DiagnosticReport {
        timestamp: ctx.stamp(),
        analysis_time: ctx.analysis_time(),
        source: ReportSource::UrlAnalysis {
            url: url.to_string(),
            base_url: breakdown.base_url,
            parameters: breakdown.parameters,
        },
        findings: Findings::Probe { probe_result },
        summary,
    }
}

/// Issues and recommendations for a probe, one pair per failed check.
pub fn summarize_probe(result: &ProbeResult) -> ReportSummary {
    let mut summary = ReportSummary {
        data_format: result.data_format.map(|f| f.as_str().to_string()),
        ..ReportSummary::default()
    };

    if !result.success {
        let error = result.error.as_deref().unwrap_or("unknown error");
        summary.flag(
            format!("API request failed: {}", error),
            "Check network connectivity and the API server status",
        );
    }

    if result.status_code != Some(200) {
        let code = result
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());
        summary.flag(
            format!("Unexpected HTTP status code: {}", code),
            "Verify the API URL and its parameters",
        );
    }

    if result.json_failed() {
        summary.flag(
            "JSON decoding failed; the endpoint may return non-standard JSON".to_string(),
            "Check the response format or contact the API provider",
        );
    }

    let status = if !result.success {
        "failed"
    } else if summary.issues.is_empty() {
        "normal"
    } else {
        "degraded"
    };
    summary.status = Some(status.to_string());

    for issue in &summary.issues {
        warn!("{}", issue);
    }

    summary
}

fn section(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&title.bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n\n");
}

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = items.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}

pub fn render_text(report: &DiagnosticReport) -> String {
    let mut out = String::new();

    let title = match report.kind() {
        ReportKind::HtmlDataSource => "                         SLEUTH DATA SOURCE REPORT",
        ReportKind::ApiDiagnostic => "                        SLEUTH API DIAGNOSTIC REPORT",
    };
    out.push_str(RULE);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n\n");

    match &report.source {
        ReportSource::FileAnalysis { path, size_chars } => {
            out.push_str(&format!("Source:       {} ({} chars)\n", path, size_chars));
        }
        ReportSource::UrlAnalysis {
            url,
            base_url,
            parameters,
        } => {
            out.push_str(&format!("Target:       {}\n", url));
            out.push_str(&format!("Base URL:     {}\n", base_url));
            if !parameters.is_empty() {
                out.push_str("Parameters:\n");
                for p in parameters {
                    out.push_str(&format!("  {} = {}  ({})\n", p.name, p.value, p.description));
                }
            }
        }
    }
    out.push_str(&format!("Analyzed:     {}\n\n", report.analysis_time));

    match &report.findings {
        Findings::Extraction(findings) => render_extraction(&mut out, findings),
        Findings::Probe { probe_result } => render_probe(&mut out, probe_result, &report.summary),
    }

    section(&mut out, "STATUS");
    if report.summary.issues.is_empty() {
        out.push_str(&format!("{}\n", "[OK] running normally".green()));
    } else {
        for (issue, recommendation) in report
            .summary
            .issues
            .iter()
            .zip(report.summary.recommendations.iter())
        {
            out.push_str(&format!("{} {}\n", "[ISSUE]".red().bold(), issue));
            out.push_str(&format!("        -> {}\n", recommendation));
        }
    }
    out.push('\n');

    out
}

fn render_extraction(out: &mut String, findings: &ExtractionFindings) {
    section(out, "SUMMARY");
    let counts = &findings.counts;
    out.push_str(&format!("API endpoints:       {}\n", counts.api_endpoints));
    out.push_str(&format!("External resources:  {}\n", counts.external_resources));
    out.push_str(&format!("Data sources:        {}\n", counts.data_sources));
    out.push_str(&format!("Unique hosts:        {}\n\n", counts.unique_hosts));

    if !findings.host_stats.is_empty() {
        section(out, "HOSTS");
        for stat in findings.host_stats.values() {
            out.push_str(&format!(
                "{}  x{}  {}\n",
                stat.host.cyan(),
                stat.occurrence_count,
                stat.description
            ));
            let kinds: Vec<&str> = stat.kinds.iter().map(|k| k.as_str()).collect();
            out.push_str(&format!("  kinds:    {}\n", kinds.join(", ")));
            out.push_str(&format!("  purposes: {}\n", join_or_none(&stat.purposes)));
        }
        out.push('\n');
    }

    if !findings.references.is_empty() {
        section(out, "REFERENCES");
        for (idx, r) in findings.references.iter().enumerate() {
            out.push_str(&format!("[{}] {} {} {}\n", idx + 1, r.kind.as_str(), r.method, r.url));
            out.push_str(&format!("    purpose: {}\n", r.purpose));
            if let Some(resource_type) = &r.resource_type {
                out.push_str(&format!("    type:    {}\n", resource_type));
            }
            for (name, value) in &r.headers {
                out.push_str(&format!("    header:  {}: {}\n", name, value));
            }
        }
        out.push('\n');
    }

    section(out, "TECHNOLOGY");
    let tech = &findings.technology_signals;
    out.push_str(&format!("Chart libraries:     {}\n", join_or_none(&tech.chart_libraries)));
    out.push_str(&format!("Frontend frameworks: {}\n", join_or_none(&tech.frontend_frameworks)));
    out.push_str(&format!("Storage:             {}\n", join_or_none(&tech.storage_methods)));
    out.push_str(&format!("Data processing:     {}\n\n", join_or_none(&tech.data_processing)));

    section(out, "DATA FLOW");
    let flow = &findings.data_flow_signals;
    for (set, label) in [
        (flow.api_to_local_storage, "API data written to local storage"),
        (flow.real_time_updates, "real-time data updates"),
        (flow.data_export_import, "data export / import"),
        (flow.chart_integration, "chart integration"),
    ] {
        let mark = if set { "[x]" } else { "[ ]" };
        out.push_str(&format!("{} {}\n", mark, label));
    }
    for pattern in &findings.processing_patterns {
        out.push_str(&format!("  {}: {}\n", pattern.label, pattern.count));
    }
    out.push('\n');
}

fn render_probe(out: &mut String, result: &ProbeResult, summary: &ReportSummary) {
    section(out, "PROBE RESULT");
    let status = result
        .status_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("Status code:  {}\n", status));
    out.push_str(&format!("Elapsed:      {} ms\n", result.elapsed_ms));
    if let Some(content_type) = &result.content_type {
        out.push_str(&format!("Content type: {}\n", content_type));
    }
    if let Some(format) = &summary.data_format {
        out.push_str(&format!("Data format:  {}\n", format));
    }
    if let Some(purpose) = &summary.purpose {
        out.push_str(&format!("Purpose:      {}\n", purpose));
    }
    if let Some(subject) = &summary.subject {
        out.push_str(&format!("Subject:      {}\n", subject));
    }
    if let Some(error) = &result.json_error {
        out.push_str(&format!("JSON error:   {}\n", error));
    }
    out.push('\n');

    if let Some(shape) = &result.json_shape {
        section(out, "RESPONSE SHAPE");
        out.push_str(&format!("Type:         {}\n", shape.value_type));
        if let Some(keys) = &shape.keys {
            out.push_str(&format!("Keys:         {}\n", keys.join(", ")));
        }
        if let Some(length) = shape.length {
            out.push_str(&format!("Length:       {}\n", length));
        }
        if let Some(first) = &shape.first_item_type {
            out.push_str(&format!("First item:   {}\n", first));
        }
        if let Some(keys) = &shape.first_item_keys {
            out.push_str(&format!("Item keys:    {}\n", keys.join(", ")));
        }
        for (key, value) in &shape.sample {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
        out.push('\n');
    }
}

pub fn render_failure(failure: &FailureReport) -> String {
    format!(
        "{} {} stage: {}",
        "[FAILED]".red().bold(),
        failure.stage.as_str(),
        failure.error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_ctx() -> RunContext {
        RunContext::at(Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap())
    }

    #[test]
    fn test_stamp_format() {
        let ctx = fixed_ctx();
        assert_eq!(ctx.stamp(), "20240305_090701");
        assert!(ctx.analysis_time().starts_with("2024-03-05T09:07:01"));
    }

    #[test]
    fn test_file_names() {
        let ctx = fixed_ctx();
        assert_eq!(
            ReportKind::HtmlDataSource.file_name(&ctx),
            "html_data_source_report_20240305_090701.json"
        );
        assert_eq!(
            ReportKind::ApiDiagnostic.file_name(&ctx),
            "api_diagnostic_report_20240305_090701.json"
        );
        assert_eq!(ReportKind::ApiDiagnostic.log_prefix(), "api_analysis");
    }
}
