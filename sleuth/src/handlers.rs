use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sleuth_core::{
    AnalyzerConfig, ReportKind, RunContext, RunOutcome, build_prober, render_failure,
    render_text, run_endpoint_analysis, run_file_analysis,
};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};
use url::Url;

/// Expand `~` in a user supplied directory
pub fn resolve_log_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn scan_config(dedupe_urls: bool, keep_overlaps: bool, log_dir: &str) -> AnalyzerConfig {
    AnalyzerConfig {
        log_dir: resolve_log_dir(log_dir),
        dedupe_urls,
        claim_spans: !keep_overlaps,
        ..AnalyzerConfig::default()
    }
}

pub fn probe_config(timeout_secs: u64, log_dir: &str) -> AnalyzerConfig {
    AnalyzerConfig {
        log_dir: resolve_log_dir(log_dir),
        timeout_secs,
        ..AnalyzerConfig::default()
    }
}

/// Parse a probe target, trying to add http:// if needed. Anything that
/// still does not parse is passed through for the prober to reject.
pub fn normalize_target(raw: &str) -> String {
    let raw = raw.trim();
    if Url::parse(raw).is_ok() {
        return raw.to_string();
    }

    let with_scheme = format!("http://{}", raw);
    if Url::parse(&with_scheme).is_ok() {
        return with_scheme;
    }

    raw.to_string()
}

/// Stderr level: warn by default, info with -v, debug with -vv and up
pub fn verbosity_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

pub fn log_file_path(log_dir: &Path, kind: ReportKind, ctx: &RunContext) -> PathBuf {
    log_dir.join(format!("{}_{}.log", kind.log_prefix(), ctx.stamp()))
}

/// Log to stderr and to a per-run file under `log_dir`.
pub fn init_logging(
    log_dir: &Path,
    kind: ReportKind,
    ctx: &RunContext,
    verbose: u8,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;

    let path = log_file_path(log_dir, kind, ctx);
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(verbosity_filter(verbose));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("cannot install log subscriber")?;

    Ok(path)
}

fn setup_logging(log_dir: &Path, kind: ReportKind, ctx: &RunContext, verbose: u8) {
    match init_logging(log_dir, kind, ctx, verbose) {
        Ok(path) => info!("Logging to {}", path.display()),
        Err(e) => {
            eprintln!("{} {:#}", "[WARNING]".yellow(), e);
            let _ = tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_max_level(verbosity_filter(verbose))
                .try_init();
        }
    }
}

/// Console output for a finished run: the text (or JSON) report on success,
/// the one-line failure marker otherwise.
pub fn render_outcome(outcome: &RunOutcome, json: bool) -> Result<String, String> {
    match outcome {
        RunOutcome::Persisted { report, path } => {
            if json {
                report.to_json().map_err(|e| e.to_string())
            } else {
                Ok(format!(
                    "{}{} {}",
                    render_text(report),
                    "Report saved to".green(),
                    path.display()
                ))
            }
        }
        RunOutcome::Failed(failure) => Err(render_failure(failure)),
    }
}

fn print_outcome(outcome: &RunOutcome, json: bool) -> bool {
    match render_outcome(outcome, json) {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(line) => {
            eprintln!("{}", line);
            false
        }
    }
}

pub fn handle_scan(args: &ArgMatches, verbose: u8) -> bool {
    let Some(file) = args.get_one::<PathBuf>("FILE") else {
        eprintln!("{} a file to scan is required", "[FAILED]".red().bold());
        return false;
    };
    let log_dir = args.get_one::<String>("log-dir").map(String::as_str).unwrap_or("log");
    let config = scan_config(
        args.get_flag("dedupe"),
        args.get_flag("keep-overlaps"),
        log_dir,
    );
    let ctx = RunContext::new();

    setup_logging(&config.log_dir, ReportKind::HtmlDataSource, &ctx, verbose);
    info!("Scanning {}", file.display());

    let outcome = run_file_analysis(file, &config.extract_options(), &ctx, &config.sink());
    print_outcome(&outcome, args.get_flag("json"))
}

pub async fn handle_probe(args: &ArgMatches, verbose: u8) -> bool {
    let Some(raw_url) = args.get_one::<String>("URL") else {
        eprintln!("{} a URL to probe is required", "[FAILED]".red().bold());
        return false;
    };
    let timeout = args.get_one::<u64>("timeout").copied().unwrap_or(30);
    let log_dir = args.get_one::<String>("log-dir").map(String::as_str).unwrap_or("log");
    let config = probe_config(timeout, log_dir);
    let ctx = RunContext::new();
    let url = normalize_target(raw_url);

    setup_logging(&config.log_dir, ReportKind::ApiDiagnostic, &ctx, verbose);

    let json = args.get_flag("json");
    let prober = match build_prober(&config) {
        Ok(prober) => prober,
        Err(failure) => return print_outcome(&RunOutcome::Failed(failure), json),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Probing {}", url));

    let outcome = run_endpoint_analysis(&url, &prober, &ctx, &config.sink()).await;
    spinner.finish_and_clear();

    print_outcome(&outcome, json)
}
