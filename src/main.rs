use clap::Parser;
use ensemble_lint::Cli;
use ensemble_lint::run::{handle_list_patterns, run_scan};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_patterns {
        return handle_list_patterns(&cli);
    }

    run_scan(&cli)
}
