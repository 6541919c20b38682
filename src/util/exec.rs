use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::errors::BootstrapError;
use crate::util::shell_join;

/// Seam between the bootstrap steps and the host: every external command and
/// every `PATH` lookup goes through a runner.
pub trait CommandRunner {
    /// Run a command to completion. A non-zero exit is an error.
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput, BootstrapError>;

    /// Resolve a program name on `PATH`.
    fn find_program(&self, name: &str) -> Option<PathBuf>;

    /// True when commands are only printed, never executed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs commands on the host with inherited stdio (unless capture is requested).
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
    dry_run: bool,
    verbose: bool,
}

impl SystemRunner {
    /// A zero timeout waits forever; installers may prompt for a password.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            dry_run: false,
            verbose: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn spawn_and_wait(&self, request: &ExecRequest) -> Result<ExecOutput, BootstrapError> {
        let preview = request.preview();
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        if request.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        }
        if request.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|e| BootstrapError::CommandSpawn {
            command: preview.clone(),
            source: e,
        })?;

        if let Some(data) = &request.stdin {
            if let Some(mut sin) = child.stdin.take() {
                if let Err(e) = sin.write_all(data) {
                    drop(sin);
                    // A closed pipe means the child stopped reading; let it finish.
                    if e.kind() != io::ErrorKind::BrokenPipe {
                        let _ = child.kill();
                    }
                    let status = child.wait()?;
                    if !status.success() {
                        return Err(BootstrapError::CommandFailed {
                            command: preview,
                            code: status.code(),
                        });
                    }
                    return Err(BootstrapError::CommandIo {
                        command: preview,
                        source: e,
                    });
                }
            }
        }

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        let started = Instant::now();
        let status = if self.timeout.is_zero() {
            child.wait()?
        } else {
            match child.wait_timeout(self.timeout)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BootstrapError::TimedOut {
                        command: preview,
                        after: self.timeout,
                    });
                }
            }
        };
        let duration = started.elapsed();

        let stdout = read_stream(stdout_pipe.as_mut())?;
        let stderr = read_stream(stderr_pipe.as_mut())?;

        if !status.success() {
            return Err(BootstrapError::CommandFailed {
                command: preview,
                code: status.code(),
            });
        }
        Ok(ExecOutput {
            code: status.code(),
            duration,
            stdout,
            stderr,
        })
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput, BootstrapError> {
        let use_err = crate::color_enabled_stderr();
        if self.dry_run {
            crate::log_info_stderr(use_err, &format!("dry-run: {}", request.preview()));
            return Ok(ExecOutput::default());
        }
        if self.verbose {
            crate::log_info_stderr(use_err, &format!("+ {}", request.preview()));
        }
        #[cfg(feature = "telemetry")]
        tracing::debug!(command = %request.preview(), "running external command");
        self.spawn_and_wait(request)
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

fn read_stream(stream: Option<&mut impl Read>) -> io::Result<String> {
    let mut buf = String::new();
    if let Some(reader) = stream {
        reader.read_to_string(&mut buf)?;
    }
    Ok(buf)
}

/// Description of one external command. Environment is inherited; `env` adds to it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    stdin: Option<Vec<u8>>,
    capture_output: bool,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Bytes written to the child's stdin before waiting on it.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-quoted single-line rendering, used for dry-run, verbose output and errors.
    pub fn preview(&self) -> String {
        let mut words: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
            .collect();
        words.push(self.program.to_string_lossy().into_owned());
        words.extend(self.arg_strings());
        shell_join(&words)
    }
}

#[derive(Debug, Default)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_quotes_arguments_and_env() {
        let req = ExecRequest::new("sh")
            .env("RUNZSH", "no")
            .args(["-c", "echo hi"]);
        assert_eq!(req.preview(), "RUNZSH=no sh -c 'echo hi'");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_propagates_exit_code() {
        let runner = SystemRunner::default();
        let err = runner
            .run(&ExecRequest::new("sh").args(["-c", "exit 7"]))
            .expect_err("non-zero exit must fail");
        match err {
            BootstrapError::CommandFailed { code, .. } => assert_eq!(code, Some(7)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_feeds_stdin_and_captures() {
        let runner = SystemRunner::default();
        let out = runner
            .run(
                &ExecRequest::new("cat")
                    .stdin("/usr/bin/zsh\n")
                    .capture_output(true),
            )
            .expect("cat should succeed");
        assert_eq!(out.stdout, "/usr/bin/zsh\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child_and_fails() {
        let runner = SystemRunner::new(Duration::from_millis(200));
        let started = Instant::now();
        let err = runner
            .run(&ExecRequest::new("sh").args(["-c", "sleep 5"]))
            .expect_err("must time out");
        assert!(started.elapsed() < Duration::from_secs(4));
        match err {
            BootstrapError::TimedOut { command, after } => {
                assert_eq!(command, "sh -c 'sleep 5'");
                assert_eq!(after, Duration::from_millis(200));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_child_exiting_before_reading_stdin_reports_its_code() {
        let runner = SystemRunner::default();
        let big = vec![b'x'; 1 << 20];
        let err = runner
            .run(&ExecRequest::new("sh").args(["-c", "exit 3"]).stdin(big))
            .expect_err("child exits with 3");
        match err {
            BootstrapError::CommandFailed { command, code } => {
                assert_eq!(command, "sh -c 'exit 3'");
                assert_eq!(code, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_not_found() {
        let runner = SystemRunner::default();
        let err = runner
            .run(&ExecRequest::new("shellstrap-definitely-missing-binary"))
            .expect_err("spawn must fail");
        assert_eq!(crate::exit_code_for_error(&err), 127);
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let runner = SystemRunner::default().dry_run(true);
        let out = runner
            .run(&ExecRequest::new("shellstrap-definitely-missing-binary"))
            .expect("dry-run never spawns");
        assert!(out.stdout.is_empty());
        assert!(runner.is_dry_run());
    }
}
