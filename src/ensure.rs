//! Idempotent "ensure installed": probe first, install only when the probe fails.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use url::Url;

use crate::errors::BootstrapError;
use crate::pipeline::StepOutcome;
use crate::util::{CommandRunner, ExecRequest};

/// Detection check for an installable target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Program resolves on PATH.
    Program(String),
    /// Path exists on disk.
    Path(PathBuf),
    All(Vec<Probe>),
    Any(Vec<Probe>),
}

impl Probe {
    pub fn satisfied(&self, runner: &dyn CommandRunner) -> bool {
        match self {
            Probe::Program(name) => runner.find_program(name).is_some(),
            Probe::Path(p) => p.exists(),
            Probe::All(ps) => ps.iter().all(|p| p.satisfied(runner)),
            Probe::Any(ps) => ps.iter().any(|p| p.satisfied(runner)),
        }
    }

    /// Human-readable list of what the probe looks for.
    pub fn describe(&self) -> String {
        match self {
            Probe::Program(name) => format!("`{name}` on PATH"),
            Probe::Path(p) => p.display().to_string(),
            Probe::All(ps) => ps.iter().map(Probe::describe).collect::<Vec<_>>().join(" and "),
            Probe::Any(ps) => ps.iter().map(Probe::describe).collect::<Vec<_>>().join(" or "),
        }
    }
}

/// Installer shell script fetched over the network into a temp file, then executed.
/// A failed download fails the step before anything runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScript {
    pub url: Url,
    pub interpreter: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl RemoteScript {
    pub fn new(url: Url, interpreter: &str) -> Self {
        Self {
            url,
            interpreter: interpreter.to_string(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }

    /// The download and execute commands for a script stored at `script`.
    pub fn commands(&self, script: &Path) -> [ExecRequest; 2] {
        let download = ExecRequest::new("curl")
            .args(["-fsSL", "-o"])
            .arg(script)
            .arg(self.url.as_str());
        let mut exec = ExecRequest::new(OsString::from(&self.interpreter))
            .arg(script)
            .args(self.args.iter().map(String::as_str));
        for (k, v) in &self.env {
            exec = exec.env(k.as_str(), v.as_str());
        }
        [download, exec]
    }

    fn run(&self, runner: &dyn CommandRunner) -> Result<(), BootstrapError> {
        let dir = tempfile::Builder::new().prefix("shellstrap-").tempdir()?;
        let script = dir.path().join("install.sh");
        for req in self.commands(&script) {
            runner.run(&req)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the commands in order; the first failure aborts.
    Commands(Vec<ExecRequest>),
    RemoteScript(RemoteScript),
    /// Nothing can install the target here; the message says what is missing.
    Unavailable(String),
}

/// One target of the bootstrap: a name, how to detect it and how to install it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureStep {
    pub name: String,
    pub probe: Probe,
    pub action: Action,
}

impl EnsureStep {
    pub fn new(name: &str, probe: Probe, action: Action) -> Self {
        Self {
            name: name.to_string(),
            probe,
            action,
        }
    }
}

/// Run `step.action` only when `step.probe` fails.
///
/// After installing, the probe is checked again. In dry-run mode nothing was
/// installed, so the outcome is `Planned` and the re-check is skipped.
pub fn ensure(step: &EnsureStep, runner: &dyn CommandRunner) -> Result<StepOutcome, BootstrapError> {
    if step.probe.satisfied(runner) {
        return Ok(StepOutcome::AlreadyPresent);
    }
    match &step.action {
        Action::Commands(cmds) => {
            for c in cmds {
                runner.run(c)?;
            }
        }
        Action::RemoteScript(script) => script.run(runner)?,
        Action::Unavailable(what) => {
            return Err(BootstrapError::NotFound { what: what.clone() });
        }
    }
    if runner.is_dry_run() {
        return Ok(StepOutcome::Planned);
    }
    if !step.probe.satisfied(runner) {
        return Err(BootstrapError::StillMissing {
            target: step.probe.describe(),
        });
    }
    Ok(StepOutcome::Installed)
}
