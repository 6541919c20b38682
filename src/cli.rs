use clap::Parser;

use shellstrap::config::CHANGE_SHELL_DEFAULT;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("SHELLSTRAP_BUILD_DATE"),
    ", ",
    env!("SHELLSTRAP_BUILD_TARGET"),
    ", ",
    env!("SHELLSTRAP_BUILD_PROFILE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "shellstrap",
    version,
    long_version = LONG_VERSION,
    about = "Install zsh, oh-my-zsh and the autosuggestions/syntax-highlighting plugins, then enable them in ~/.zshrc."
)]
pub(crate) struct Cli {
    /// Pass `yes` to also make zsh your login shell; any other value skips it
    #[arg(value_name = "CHANGE_SHELL", default_value = CHANGE_SHELL_DEFAULT)]
    pub(crate) change_shell: String,

    /// Print the commands that would run, but do not execute or write anything
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Print each external command before running it
    #[arg(long)]
    pub(crate) verbose: bool,

    /// Give up on any external command after this many seconds (0 waits forever)
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub(crate) command_timeout: u64,

    /// Report which components are present without installing anything
    #[arg(long)]
    pub(crate) check: bool,

    /// With --check: emit machine-readable JSON
    #[arg(long, requires = "check")]
    pub(crate) json: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum)]
    pub(crate) color: Option<shellstrap::ColorMode>,
}
