//! Make zsh the invoking user's login shell.

use std::path::{Path, PathBuf};

use crate::errors::BootstrapError;
use crate::pipeline::StepOutcome;
use crate::platform::privileged;
use crate::util::{CommandRunner, ExecRequest};

/// True when `shell` is listed (one path per line, `#` comments allowed) in the
/// allowed-shells file. A missing file lists nothing.
pub fn shells_file_lists(etc_shells: &Path, shell: &Path) -> Result<bool, BootstrapError> {
    let text = match std::fs::read_to_string(etc_shells) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let wanted = shell.to_string_lossy();
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('#'))
        .any(|l| l == wanted))
}

/// Commands registering `shell` in `etc_shells` (when needed) and switching to it.
pub fn change_shell_commands(etc_shells: &Path, shell: &Path, listed: bool) -> Vec<ExecRequest> {
    let mut cmds = Vec::new();
    if !listed {
        // tee echoes its input; capture it to keep the terminal clean.
        cmds.push(
            privileged("tee", [std::ffi::OsString::from("-a"), etc_shells.into()])
                .stdin(format!("{}\n", shell.display()))
                .capture_output(true),
        );
    }
    cmds.push(ExecRequest::new("chsh").arg("-s").arg(shell));
    cmds
}

/// Locate zsh, make sure it is an allowed login shell, then `chsh` to it.
pub fn change_login_shell(
    etc_shells: &Path,
    runner: &dyn CommandRunner,
) -> Result<StepOutcome, BootstrapError> {
    let use_err = crate::color_enabled_stderr();
    let shell: PathBuf = match runner.find_program("zsh") {
        Some(p) => p,
        None if runner.is_dry_run() => {
            crate::log_info_stderr(use_err, "dry-run: would change login shell to zsh once installed");
            return Ok(StepOutcome::Planned);
        }
        None => {
            crate::log_error_stderr(use_err, "zsh binary not found on PATH; cannot change login shell");
            return Err(BootstrapError::NotFound {
                what: "zsh binary".to_string(),
            });
        }
    };
    let listed = shells_file_lists(etc_shells, &shell)?;
    if !listed {
        crate::log_info_stderr(
            use_err,
            &format!("    adding {} to {}", shell.display(), etc_shells.display()),
        );
    }
    for cmd in change_shell_commands(etc_shells, &shell, listed) {
        runner.run(&cmd)?;
    }
    if runner.is_dry_run() {
        return Ok(StepOutcome::Planned);
    }
    Ok(StepOutcome::Changed)
}
