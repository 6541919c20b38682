use fs2::FileExt;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::BootstrapError;

/// User-scoped single-instance lock guard that removes the lock file on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Best-effort unlock; ignore errors
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

/// Acquire a non-blocking exclusive lock at the first usable candidate path.
#[cfg_attr(feature = "telemetry", tracing::instrument(level = "debug", err))]
pub fn acquire_lock() -> Result<RunLock, BootstrapError> {
    let paths = candidate_lock_paths();
    let mut last_err: Option<io::Error> = None;

    for p in &paths {
        match acquire_lock_at(p) {
            Ok(lock) => return Ok(lock),
            Err(BootstrapError::Io(e)) => {
                last_err = Some(e);
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    let mut msg = String::from("failed to create lock file in any candidate location: ");
    msg.push_str(
        &paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    );
    if let Some(e) = last_err {
        msg.push_str(&format!(" (last error: {e})"));
    }
    Err(BootstrapError::Message(msg))
}

/// Acquire a lock at a specific path.
pub fn acquire_lock_at(p: &Path) -> Result<RunLock, BootstrapError> {
    if let Some(parent) = p.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(true)
        .open(p)?;
    match f.try_lock_exclusive() {
        Ok(_) => Ok(RunLock {
            file: f,
            path: p.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(BootstrapError::LockHeld {
            path: p.display().to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Honor SHELLSTRAP_SKIP_LOCK=1 to skip the single-instance lock.
pub fn should_acquire_lock() -> bool {
    env::var("SHELLSTRAP_SKIP_LOCK").ok().as_deref() != Some("1")
}

/// Candidate lock file locations, in order:
/// XDG_RUNTIME_DIR/shellstrap.lock, HOME/.shellstrap.lock, /tmp/shellstrap.lock
pub fn candidate_lock_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(rt) = env::var("XDG_RUNTIME_DIR") {
        if !rt.is_empty() {
            paths.push(PathBuf::from(rt).join("shellstrap.lock"));
        }
    }
    if let Some(home) = home::home_dir() {
        paths.push(home.join(".shellstrap.lock"));
    }
    paths.push(PathBuf::from("/tmp/shellstrap.lock"));
    paths
}
