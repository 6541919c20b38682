//! The bootstrap procedure: which targets exist, how each is installed, and the
//! order they run in.

use std::path::PathBuf;

use crate::config::{Plugin, Settings, CHANGE_SHELL_YES};
use crate::ensure::{ensure, Action, EnsureStep, Probe, RemoteScript};
use crate::errors::{BootstrapError, StepFailure};
use crate::login_shell::change_login_shell;
use crate::pipeline::{Pipeline, Report, StepOutcome};
use crate::platform::{homebrew_prefix, PackageManager, Platform, BASE_PACKAGES};
use crate::profile::{brew_shellenv_line, ensure_profile_line};
use crate::util::{CommandRunner, ExecRequest};
use crate::zshrc::{patch_config_file, FilePatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub change_shell: bool,
}

impl Options {
    /// Options from the positional argument; only the exact literal `yes` opts in.
    pub fn from_arg(change_shell: &str) -> Self {
        Self {
            change_shell: change_shell == CHANGE_SHELL_YES,
        }
    }
}

const LINUX_MANAGER_PROGRAMS: [&str; 3] = ["apt-get", "dnf", "pacman"];

/// Resolved Homebrew binary: PATH first, then the architecture's default prefix.
pub fn brew_binary(runner: &dyn CommandRunner) -> PathBuf {
    runner
        .find_program("brew")
        .unwrap_or_else(|| homebrew_prefix().join("bin").join("brew"))
}

pub fn package_manager_step(settings: &Settings, runner: &dyn CommandRunner) -> EnsureStep {
    match settings.platform {
        Platform::MacOs => EnsureStep::new(
            "package-manager",
            Probe::Any(vec![
                Probe::Program("brew".to_string()),
                Probe::Path(homebrew_prefix().join("bin").join("brew")),
            ]),
            Action::RemoteScript(
                RemoteScript::new(settings.brew_install_url.clone(), "/bin/bash")
                    .env("NONINTERACTIVE", "1"),
            ),
        ),
        Platform::Linux => match PackageManager::detect(Platform::Linux, runner) {
            Some(pm) => EnsureStep::new(
                "package-manager",
                Probe::Program(pm.program().to_string()),
                Action::Unavailable(pm.program().to_string()),
            ),
            None => EnsureStep::new(
                "package-manager",
                Probe::Any(
                    LINUX_MANAGER_PROGRAMS
                        .iter()
                        .map(|p| Probe::Program(p.to_string()))
                        .collect(),
                ),
                Action::Unavailable(
                    "a supported package manager (apt-get, dnf or pacman)".to_string(),
                ),
            ),
        },
    }
}

pub fn shell_step(settings: &Settings, runner: &dyn CommandRunner) -> EnsureStep {
    let probe = Probe::All(
        BASE_PACKAGES
            .iter()
            .map(|p| Probe::Program(p.to_string()))
            .collect(),
    );
    let action = match PackageManager::detect(settings.platform, runner) {
        Some(pm) => Action::Commands(pm.install_commands(&brew_binary(runner), &BASE_PACKAGES)),
        None => Action::Unavailable("a package manager to install zsh".to_string()),
    };
    EnsureStep::new("zsh", probe, action)
}

pub fn framework_step(settings: &Settings) -> EnsureStep {
    let script = RemoteScript::new(settings.omz_install_url.clone(), "sh")
        .arg("--unattended")
        .arg("--keep-zshrc")
        .env("RUNZSH", "no")
        .env("CHSH", "no")
        .env("ZSH", settings.framework_dir.display().to_string());
    EnsureStep::new(
        "oh-my-zsh",
        Probe::Path(settings.framework_dir.clone()),
        Action::RemoteScript(script),
    )
}

pub fn plugin_step(settings: &Settings, plugin: &Plugin) -> EnsureStep {
    let dir = settings.plugin_dir(plugin);
    let clone = ExecRequest::new("git")
        .args(["clone", "--depth=1", plugin.repo_url.as_str()])
        .arg(&dir);
    EnsureStep::new(
        &format!("plugin {}", plugin.name),
        Probe::Path(dir),
        Action::Commands(vec![clone]),
    )
}

/// Every install target in run order (the login profile and config patch are not targets).
pub fn ensure_steps(settings: &Settings, runner: &dyn CommandRunner) -> Vec<EnsureStep> {
    let mut steps = vec![
        package_manager_step(settings, runner),
        shell_step(settings, runner),
        framework_step(settings),
    ];
    steps.extend(settings.plugins.iter().map(|p| plugin_step(settings, p)));
    steps
}

fn zshrc_step(settings: &Settings, dry_run: bool) -> Result<StepOutcome, BootstrapError> {
    let names = settings.plugin_names();
    let path = &settings.zshrc;
    Ok(match patch_config_file(path, &names, dry_run)? {
        FilePatch::Unchanged => StepOutcome::Unchanged,
        FilePatch::Patched { line } => {
            crate::log_info_stderr(crate::color_enabled_stderr(), &format!("    {line}"));
            StepOutcome::Patched
        }
        FilePatch::WouldPatch { line } => {
            crate::log_info_stderr(
                crate::color_enabled_stderr(),
                &format!("    dry-run: would write {line}"),
            );
            StepOutcome::Planned
        }
        FilePatch::NoMatch => StepOutcome::Warned(format!(
            "no plugins=(...) line found in {}; add {} manually",
            path.display(),
            names.join(" ")
        )),
        FilePatch::Missing => StepOutcome::Warned(format!(
            "{} not found; add plugins=({}) once it exists",
            path.display(),
            names.join(" ")
        )),
    })
}

/// Assemble the full procedure. Each step resolves its targets when it runs, so
/// later steps see what earlier ones installed.
pub fn pipeline(settings: &Settings, options: Options) -> Pipeline<'_> {
    let mut p = Pipeline::new().step("package-manager", move |r| {
        ensure(&package_manager_step(settings, r), r)
    });
    if settings.platform == Platform::MacOs {
        p = p.step("login-profile", move |r| {
            let line = brew_shellenv_line(&brew_binary(r));
            ensure_profile_line(&settings.zprofile, &line, r.is_dry_run())
        });
    }
    p = p
        .step("zsh", move |r| ensure(&shell_step(settings, r), r))
        .step("oh-my-zsh", move |r| ensure(&framework_step(settings), r));
    for plugin in &settings.plugins {
        p = p.step(format!("plugin {}", plugin.name), move |r| {
            ensure(&plugin_step(settings, plugin), r)
        });
    }
    p.step("zshrc", move |r| zshrc_step(settings, r.is_dry_run()))
        .step("login-shell", move |r| {
            if options.change_shell {
                change_login_shell(&settings.etc_shells, r)
            } else {
                Ok(StepOutcome::Skipped)
            }
        })
}

#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(level = "info", skip_all, fields(platform = settings.platform.as_str(), change_shell = options.change_shell))
)]
pub fn run(
    settings: &Settings,
    options: Options,
    runner: &dyn CommandRunner,
) -> Result<Report, StepFailure> {
    pipeline(settings, options).run(runner)
}
