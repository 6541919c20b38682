use clap::Parser;
use std::process::ExitCode;

mod banner;
mod cli;
mod commands;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(mode) = cli.color {
        shellstrap::set_color_mode(mode);
    }

    #[cfg(feature = "telemetry")]
    shellstrap::telemetry_init(cli.verbose);

    // Check mode only reads; it neither locks nor prints the banner.
    if cli.check {
        return commands::run_check(&cli);
    }
    commands::run_bootstrap(&cli)
}
