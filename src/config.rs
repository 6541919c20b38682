//! Settings resolved once from the environment.
//!
//! Environment overrides (all optional):
//! - ZSH / ZSH_CUSTOM: framework root and custom dir (same meaning as for oh-my-zsh itself)
//! - SHELLSTRAP_ZSHRC / SHELLSTRAP_ZPROFILE: config and login-profile files
//! - SHELLSTRAP_ETC_SHELLS: list of allowed login shells
//! - SHELLSTRAP_BREW_INSTALL_URL / SHELLSTRAP_OMZ_INSTALL_URL: installer script locations

use std::path::PathBuf;

use serde::Serialize;
use url::Url;

use crate::errors::BootstrapError;
use crate::platform::Platform;

pub const BREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";
pub const OMZ_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh";

/// Value of the positional argument that enables the login-shell change.
pub const CHANGE_SHELL_YES: &str = "yes";
pub const CHANGE_SHELL_DEFAULT: &str = "no";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plugin {
    pub name: String,
    pub repo_url: String,
}

impl Plugin {
    pub fn new(name: &str, repo_url: &str) -> Self {
        Self {
            name: name.to_string(),
            repo_url: repo_url.to_string(),
        }
    }
}

pub fn default_plugins() -> Vec<Plugin> {
    vec![
        Plugin::new(
            "zsh-autosuggestions",
            "https://github.com/zsh-users/zsh-autosuggestions",
        ),
        Plugin::new(
            "zsh-syntax-highlighting",
            "https://github.com/zsh-users/zsh-syntax-highlighting.git",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub platform: Platform,
    pub home: PathBuf,
    pub framework_dir: PathBuf,
    pub custom_dir: PathBuf,
    pub zshrc: PathBuf,
    pub zprofile: PathBuf,
    pub etc_shells: PathBuf,
    pub brew_install_url: Url,
    pub omz_install_url: Url,
    pub plugins: Vec<Plugin>,
}

impl Settings {
    /// Resolve settings for the current host from the process environment.
    pub fn from_env() -> Result<Self, BootstrapError> {
        let home = home::home_dir().ok_or_else(|| BootstrapError::NotFound {
            what: "home directory".to_string(),
        })?;
        let platform = Platform::current()?;
        Self::resolve(platform, home, |k| std::env::var(k).ok())
    }

    /// Resolve settings from an arbitrary variable lookup (tests pass a map).
    pub fn resolve<F>(platform: Platform, home: PathBuf, lookup: F) -> Result<Self, BootstrapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let framework_dir = var("ZSH")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".oh-my-zsh"));
        let custom_dir = var("ZSH_CUSTOM")
            .map(PathBuf::from)
            .unwrap_or_else(|| framework_dir.join("custom"));
        let zshrc = var("SHELLSTRAP_ZSHRC")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".zshrc"));
        let zprofile = var("SHELLSTRAP_ZPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".zprofile"));
        let etc_shells = var("SHELLSTRAP_ETC_SHELLS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/etc/shells"));
        let brew_install_url = parse_installer_url(
            "SHELLSTRAP_BREW_INSTALL_URL",
            var("SHELLSTRAP_BREW_INSTALL_URL").as_deref().unwrap_or(BREW_INSTALL_URL),
        )?;
        let omz_install_url = parse_installer_url(
            "SHELLSTRAP_OMZ_INSTALL_URL",
            var("SHELLSTRAP_OMZ_INSTALL_URL").as_deref().unwrap_or(OMZ_INSTALL_URL),
        )?;

        Ok(Self {
            platform,
            home,
            framework_dir,
            custom_dir,
            zshrc,
            zprofile,
            etc_shells,
            brew_install_url,
            omz_install_url,
            plugins: default_plugins(),
        })
    }

    pub fn plugin_dir(&self, plugin: &Plugin) -> PathBuf {
        self.custom_dir.join("plugins").join(&plugin.name)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }
}

fn parse_installer_url(key: &str, raw: &str) -> Result<Url, BootstrapError> {
    let url = Url::parse(raw)
        .map_err(|e| BootstrapError::Message(format!("{key}: invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "https" | "http" | "file" => Ok(url),
        other => Err(BootstrapError::Message(format!(
            "{key}: unsupported URL scheme '{other}' (expected https, http or file)"
        ))),
    }
}
