//! Host platform and package-manager selection.

use std::path::PathBuf;

use serde::Serialize;

use crate::errors::BootstrapError;
use crate::util::{CommandRunner, ExecRequest};

/// Packages installed alongside the shell: the shell itself, the version-control
/// tool used to clone plugins and the transfer tool used to fetch installers.
pub const BASE_PACKAGES: [&str; 3] = ["zsh", "git", "curl"];

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Result<Self, BootstrapError> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self, BootstrapError> {
        match os {
            "macos" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            other => Err(BootstrapError::Message(format!(
                "unsupported platform '{other}' (supported: macos, linux)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Homebrew,
    Apt,
    Dnf,
    Pacman,
}

const LINUX_MANAGERS: [(PackageManager, &str); 3] = [
    (PackageManager::Apt, "apt-get"),
    (PackageManager::Dnf, "dnf"),
    (PackageManager::Pacman, "pacman"),
];

impl PackageManager {
    /// Pick the package manager for `platform`. On Linux the first of
    /// apt-get, dnf, pacman found on PATH wins; `None` when none is present.
    pub fn detect(platform: Platform, runner: &dyn CommandRunner) -> Option<Self> {
        match platform {
            Platform::MacOs => Some(PackageManager::Homebrew),
            Platform::Linux => LINUX_MANAGERS
                .iter()
                .find(|(_, prog)| runner.find_program(prog).is_some())
                .map(|(pm, _)| *pm),
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Homebrew => "brew",
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
        }
    }

    /// Commands installing `packages`. `brew` is the resolved Homebrew binary,
    /// which may not be on PATH yet right after a fresh install.
    pub fn install_commands(&self, brew: &std::path::Path, packages: &[&str]) -> Vec<ExecRequest> {
        match self {
            PackageManager::Homebrew => {
                vec![ExecRequest::new(brew).arg("install").args(packages.iter().copied())]
            }
            PackageManager::Apt => vec![
                privileged("apt-get", ["update"]),
                privileged("apt-get", ["install", "-y"]).args(packages.iter().copied()),
            ],
            PackageManager::Dnf => {
                vec![privileged("dnf", ["install", "-y"]).args(packages.iter().copied())]
            }
            PackageManager::Pacman => vec![privileged("pacman", ["-S", "--noconfirm", "--needed"])
                .args(packages.iter().copied())],
        }
    }
}

/// Install prefix Homebrew uses on this machine's architecture.
pub fn homebrew_prefix() -> PathBuf {
    if std::env::consts::ARCH == "aarch64" {
        PathBuf::from("/opt/homebrew")
    } else {
        PathBuf::from("/usr/local")
    }
}

pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Build a command that runs with elevated privilege (`sudo`) unless already root.
pub fn privileged<I, S>(program: &str, args: I) -> ExecRequest
where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString>,
{
    if is_root() {
        ExecRequest::new(program).args(args)
    } else {
        ExecRequest::new("sudo").arg(program).args(args)
    }
}

/// Login shell recorded in the user database for the invoking user, falling
/// back to `$SHELL`.
pub fn current_login_shell() -> Option<String> {
    nix::unistd::User::from_uid(nix::unistd::getuid())
        .ok()
        .flatten()
        .map(|u| u.shell.to_string_lossy().into_owned())
        .or_else(|| std::env::var("SHELL").ok())
        .filter(|s| !s.is_empty())
}
