use crate::CLAP_STYLING;
use clap::{Arg, ArgAction, arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sleuth")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sleuth")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more to stderr (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Find the external data sources referenced by an HTML or JavaScript file \
                and classify them.",
                )
                .arg(
                    arg!(<FILE>)
                        .required(true)
                        .help("The HTML or script file to scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"dedupe")
                        .help("Report each distinct URL once, keeping its first reference")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"keep-overlaps")
                        .help("Also report URLs already matched by an earlier pattern family")
                        .action(ArgAction::SetTrue),
                )
                .arg(log_dir_arg())
                .arg(json_arg()),
        )
        .subcommand(
            command!("probe")
                .about("Send one GET request to an API endpoint and diagnose the response")
                .arg(arg!(<URL>).required(true).help("The endpoint to probe"))
                .arg(
                    arg!(-t --"timeout" <SECS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .default_value("30")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(log_dir_arg())
                .arg(json_arg()),
        )
}

fn log_dir_arg() -> Arg {
    arg!(-l --"log-dir" <DIR>)
        .required(false)
        .help("Directory for the JSON report and the run log")
        .default_value("log")
}

fn json_arg() -> Arg {
    arg!(--"json")
        .help("Print the report as JSON instead of the text summary")
        .action(ArgAction::SetTrue)
}
