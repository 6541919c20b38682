//! Read-only status of every bootstrap target (`--check`).

use std::path::PathBuf;

use serde::Serialize;

use crate::bootstrap::ensure_steps;
use crate::config::Settings;
use crate::platform::{PackageManager, Platform};
use crate::util::CommandRunner;
use crate::zshrc::config_lists_plugins;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStatus {
    pub name: String,
    pub target: String,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub platform: Platform,
    pub package_manager: Option<PackageManager>,
    pub components: Vec<ComponentStatus>,
    pub zshrc: PathBuf,
    pub zshrc_lists_plugins: bool,
    pub login_shell: Option<String>,
}

impl CheckReport {
    pub fn all_present(&self) -> bool {
        self.components.iter().all(|c| c.present) && self.zshrc_lists_plugins
    }
}

/// Evaluate every probe without running anything.
pub fn check(settings: &Settings, runner: &dyn CommandRunner) -> CheckReport {
    let components = ensure_steps(settings, runner)
        .into_iter()
        .map(|step| ComponentStatus {
            present: step.probe.satisfied(runner),
            target: step.probe.describe(),
            name: step.name,
        })
        .collect();
    CheckReport {
        platform: settings.platform,
        package_manager: PackageManager::detect(settings.platform, runner),
        components,
        zshrc: settings.zshrc.clone(),
        zshrc_lists_plugins: config_lists_plugins(&settings.zshrc, &settings.plugin_names()),
        login_shell: crate::platform::current_login_shell(),
    }
}
