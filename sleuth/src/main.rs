use commands::command_argument_builder;
use sleuth::handlers::{handle_probe, handle_scan};
use sleuth_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_count("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let succeeded = match chosen_command.subcommand() {
        None => return,
        Some(("scan", primary_command)) => handle_scan(primary_command, verbose),
        Some(("probe", primary_command)) => handle_probe(primary_command, verbose).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if !succeeded {
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
