//! Sequential pipeline of named fallible steps.
//!
//! Steps run in insertion order. The first failing step stops the run and is
//! reported by name; nothing already done is rolled back.

use std::fmt;

use crate::errors::{BootstrapError, StepFailure};
use crate::util::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    AlreadyPresent,
    Installed,
    /// Dry-run: the install commands were printed, not executed.
    Planned,
    Patched,
    Unchanged,
    /// Completed without doing its job; the pipeline continues.
    Warned(String),
    Changed,
    Skipped,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::AlreadyPresent => write!(f, "already present"),
            StepOutcome::Installed => write!(f, "installed"),
            StepOutcome::Planned => write!(f, "would install (dry-run)"),
            StepOutcome::Patched => write!(f, "patched"),
            StepOutcome::Unchanged => write!(f, "unchanged"),
            StepOutcome::Warned(msg) => write!(f, "warning: {msg}"),
            StepOutcome::Changed => write!(f, "changed"),
            StepOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

type StepFn<'a> = Box<dyn FnOnce(&dyn CommandRunner) -> Result<StepOutcome, BootstrapError> + 'a>;

struct Step<'a> {
    name: String,
    run: StepFn<'a>,
}

#[derive(Default)]
pub struct Pipeline<'a> {
    steps: Vec<Step<'a>>,
}

/// Outcome of every step that ran, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub entries: Vec<(String, StepOutcome)>,
}

impl Report {
    pub fn outcome(&self, step: &str) -> Option<&StepOutcome> {
        self.entries
            .iter()
            .find(|(name, _)| name == step)
            .map(|(_, o)| o)
    }

    /// Number of steps that ran an installer (or would have, in dry-run mode).
    pub fn install_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, StepOutcome::Installed | StepOutcome::Planned))
            .count()
    }
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(&dyn CommandRunner) -> Result<StepOutcome, BootstrapError> + 'a,
    {
        self.steps.push(Step {
            name: name.into(),
            run: Box::new(run),
        });
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Run all steps, stopping at the first failure.
    pub fn run(self, runner: &dyn CommandRunner) -> Result<Report, StepFailure> {
        let use_err = crate::color_enabled_stderr();
        let mut report = Report::default();
        for step in self.steps {
            crate::log_step_stderr(use_err, &step.name);
            #[cfg(feature = "telemetry")]
            let _span = tracing::info_span!("step", name = %step.name).entered();
            match (step.run)(runner) {
                Ok(outcome) => {
                    match &outcome {
                        StepOutcome::Warned(msg) => crate::log_warn_stderr(use_err, msg),
                        other => crate::log_ok_stderr(use_err, &format!("    {other}")),
                    }
                    #[cfg(feature = "telemetry")]
                    tracing::info!(outcome = %outcome, "step finished");
                    report.entries.push((step.name, outcome));
                }
                Err(source) => {
                    #[cfg(feature = "telemetry")]
                    tracing::error!(error = %source, "step failed");
                    return Err(StepFailure {
                        step: step.name,
                        source,
                    });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;
    use std::cell::Cell;

    #[test]
    fn test_runs_in_order_and_reports() {
        let runner = RecordingRunner::new();
        let report = Pipeline::new()
            .step("a", |_| Ok(StepOutcome::AlreadyPresent))
            .step("b", |_| Ok(StepOutcome::Installed))
            .run(&runner)
            .expect("pipeline");
        assert_eq!(
            report.entries,
            vec![
                ("a".to_string(), StepOutcome::AlreadyPresent),
                ("b".to_string(), StepOutcome::Installed)
            ]
        );
        assert_eq!(report.install_count(), 1);
        assert_eq!(report.outcome("b"), Some(&StepOutcome::Installed));
    }

    #[test]
    fn test_first_failure_stops_and_is_named() {
        let ran_after = Cell::new(false);
        let runner = RecordingRunner::new();
        let err = Pipeline::new()
            .step("zsh", |_| Ok(StepOutcome::Installed))
            .step("oh-my-zsh", |_| {
                Err(BootstrapError::CommandFailed {
                    command: "curl".to_string(),
                    code: Some(22),
                })
            })
            .step("zshrc", |_| {
                ran_after.set(true);
                Ok(StepOutcome::Patched)
            })
            .run(&runner)
            .expect_err("must stop");
        assert_eq!(err.step, "oh-my-zsh");
        assert_eq!(crate::exit_code_for_error(&err.source), 22);
        assert!(!ran_after.get(), "steps after a failure must not run");
    }

    #[test]
    fn test_warning_does_not_stop() {
        let runner = RecordingRunner::new();
        let report = Pipeline::new()
            .step("zshrc", |_| Ok(StepOutcome::Warned("no plugins line".into())))
            .step("login-shell", |_| Ok(StepOutcome::Skipped))
            .run(&runner)
            .expect("pipeline");
        assert_eq!(report.entries.len(), 2);
    }
}
