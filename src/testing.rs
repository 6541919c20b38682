//! In-process command runner for unit tests: records every request instead of executing it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::BootstrapError;
use crate::util::{CommandRunner, ExecOutput, ExecRequest};

type Effect = Box<dyn Fn(&ExecRequest, &RecordingRunner)>;

#[derive(Default)]
pub struct RecordingRunner {
    programs: RefCell<HashMap<String, PathBuf>>,
    calls: RefCell<Vec<ExecRequest>>,
    effects: Vec<(String, Effect)>,
    failures: Vec<(String, i32)>,
    dry_run: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs that resolve on the fake PATH (as `/usr/bin/<name>`).
    pub fn with_programs<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for n in names {
            self.add_program(n.as_ref());
        }
        self
    }

    pub fn add_program(&self, name: &str) {
        self.programs
            .borrow_mut()
            .insert(name.to_string(), PathBuf::from(format!("/usr/bin/{name}")));
    }

    /// Run `effect` for every request whose preview contains `pattern`.
    pub fn on<F>(mut self, pattern: &str, effect: F) -> Self
    where
        F: Fn(&ExecRequest, &RecordingRunner) + 'static,
    {
        self.effects.push((pattern.to_string(), Box::new(effect)));
        self
    }

    /// Fail every request whose preview contains `pattern` with exit `code`.
    pub fn fail_on(mut self, pattern: &str, code: i32) -> Self {
        self.failures.push((pattern.to_string(), code));
        self
    }

    pub fn set_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn previews(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|r| r.preview()).collect()
    }

    pub fn calls(&self) -> Vec<ExecRequest> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput, BootstrapError> {
        let preview = request.preview();
        self.calls.borrow_mut().push(request.clone());
        if let Some((_, code)) = self.failures.iter().find(|(p, _)| preview.contains(p)) {
            return Err(BootstrapError::CommandFailed {
                command: preview,
                code: Some(*code),
            });
        }
        if !self.dry_run {
            for (pattern, effect) in &self.effects {
                if preview.contains(pattern) {
                    effect(request, self);
                }
            }
        }
        Ok(ExecOutput::default())
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.programs.borrow().get(name).cloned()
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
