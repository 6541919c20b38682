//! Login-profile (`~/.zprofile`) maintenance for Homebrew's shell environment.

use std::path::Path;

use crate::errors::BootstrapError;
use crate::pipeline::StepOutcome;
use crate::util::fs::append_line;

/// The line that puts Homebrew on PATH for login shells.
pub fn brew_shellenv_line(brew: &Path) -> String {
    format!("eval \"$({} shellenv)\"", brew.display())
}

/// Append `line` to the profile at `path` unless an identical (trimmed) line
/// is already there. The file is created when absent.
pub fn ensure_profile_line(
    path: &Path,
    line: &str,
    dry_run: bool,
) -> Result<StepOutcome, BootstrapError> {
    let present = match std::fs::read_to_string(path) {
        Ok(text) => text.lines().any(|l| l.trim() == line.trim()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };
    if present {
        return Ok(StepOutcome::AlreadyPresent);
    }
    if dry_run {
        return Ok(StepOutcome::Planned);
    }
    append_line(path, line)?;
    Ok(StepOutcome::Patched)
}
