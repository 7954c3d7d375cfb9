pub mod aggregate;
pub mod analyze;
pub mod classify;
pub mod error;
pub mod extract;
pub mod model;
pub mod params;
pub mod patterns;
pub mod report;
pub mod sink;

use colored::Colorize;

pub use analyze::{
    AnalyzerConfig, FailureReport, RunOutcome, RunStage, build_prober, run_endpoint_analysis,
    run_file_analysis,
};
pub use error::RunError;
pub use extract::{ExtractOptions, extract, extract_with};
pub use model::{ExtractedReference, HostStat, ReferenceKind};
pub use report::{DiagnosticReport, ReportKind, RunContext, render_failure, render_text};
pub use sink::{FileSink, ReportSink};

const BANNER: &str = r#"
    ╔═══════════════════════════════════════════════════╗
    ║  ███████╗██╗     ███████╗██╗   ██╗████████╗██╗  ██╗║
    ║  ██╔════╝██║     ██╔════╝██║   ██║╚══██╔══╝██║  ██║║
    ║  ███████╗██║     █████╗  ██║   ██║   ██║   ███████║║
    ║  ╚════██║██║     ██╔══╝  ██║   ██║   ██║   ██╔══██║║
    ║  ███████║███████╗███████╗╚██████╔╝   ██║   ██║  ██║║
    ║  ╚══════╝╚══════╝╚══════╝ ╚═════╝    ╚═╝   ╚═╝  ╚═╝║
    ╚═══════════════════════════════════════════════════╝"#;

pub fn print_banner() {
    println!("{}", BANNER.cyan());
    println!(
        "    {} v{}\n",
        "data source discovery & endpoint probe".dimmed(),
        env!("CARGO_PKG_VERSION")
    );
}
