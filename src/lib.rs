//! shellstrap: idempotent zsh environment bootstrap for macOS and Linux.
//!
//! Architecture
//! - Binary glue (src/main.rs) parses the CLI, takes the run lock and runs either
//!   the bootstrap pipeline or the read-only check.
//! - bootstrap: install targets (package manager, zsh, oh-my-zsh, plugins), the
//!   `.zshrc` patch and the optional login-shell change, assembled into a pipeline.
//! - ensure / pipeline: "probe, install if missing" and the fail-fast step runner.
//! - zshrc / profile / login_shell: the file edits and the `chsh` sequence.
//! - util::exec: `CommandRunner` seam; every external command goes through it.
//!
//! Environment (documented for contributors)
//! - SHELLSTRAP_COLOR / NO_COLOR: color control for stderr output.
//! - SHELLSTRAP_SKIP_LOCK=1: skip the single-instance lock.
//! - SHELLSTRAP_LOG: tracing filter when built with the `telemetry` feature.
//! - ZSH, ZSH_CUSTOM, SHELLSTRAP_ZSHRC, SHELLSTRAP_ZPROFILE, SHELLSTRAP_ETC_SHELLS,
//!   SHELLSTRAP_BREW_INSTALL_URL, SHELLSTRAP_OMZ_INSTALL_URL: see config.rs.

mod color;
mod errors;
mod lock;

pub mod bootstrap;
pub mod check;
pub mod config;
pub mod ensure;
pub mod login_shell;
pub mod pipeline;
pub mod platform;
pub mod profile;
pub mod util;
pub mod zshrc;

#[cfg(feature = "telemetry")]
mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use color::*;
pub use errors::*;
pub use lock::*;

#[cfg(feature = "telemetry")]
pub use telemetry::telemetry_init;
