use crate::install::github::DEFAULT_API_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const APP_NAME: &str = "ritobin-installer";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "RITOBIN_INSTALLER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerSettings {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Falls back to a per-user data directory under `owner/repo`.
    #[serde(default)]
    pub install_dir: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_owner() -> String {
    "LeagueToolkit".to_string()
}
fn default_repo() -> String {
    "ritobin-tools".to_string()
}
fn default_channel() -> String {
    "windows-x64".to_string()
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            channel: default_channel(),
            install_dir: None,
            api_url: default_api_url(),
        }
    }
}

impl InstallerSettings {
    /// Overlay `RITOBIN_INSTALLER_*` variables obtained through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(owner) = non_empty("RITOBIN_INSTALLER_OWNER") {
            self.owner = owner;
        }
        if let Some(repo) = non_empty("RITOBIN_INSTALLER_REPO") {
            self.repo = repo;
        }
        if let Some(channel) = non_empty("RITOBIN_INSTALLER_CHANNEL") {
            self.channel = channel;
        }
        if let Some(dir) = non_empty("RITOBIN_INSTALLER_INSTALL_DIR") {
            self.install_dir = Some(dir);
        }
        if let Some(api_url) = non_empty("RITOBIN_INSTALLER_API_URL") {
            self.api_url = api_url;
        }
    }

    /// The install directory as an absolute path. Relative values are taken
    /// against the current directory, since the result lands on the user PATH.
    pub fn resolve_install_dir(&self) -> Result<PathBuf> {
        let dir = match &self.install_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_install_dir(&self.owner, &self.repo)?,
        };
        std::path::absolute(&dir)
            .with_context(|| format!("Could not resolve install directory {}", dir.display()))
    }
}

pub fn get_user_config_dir() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(APP_NAME);
    tracing::debug!("User config directory: {}", path.display());
    Ok(path)
}

pub fn get_config_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let path = get_user_config_dir()?.join(CONFIG_FILE_NAME);
    tracing::debug!("Config file path: {}", path.display());
    Ok(path)
}

/// `<local data dir>/<owner>/<repo>`, e.g. `%LOCALAPPDATA%\LeagueToolkit\ritobin-tools`.
pub fn default_install_dir(owner: &str, repo: &str) -> Result<PathBuf> {
    let path = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
        .join(owner)
        .join(repo);
    tracing::debug!("Default install directory: {}", path.display());
    Ok(path)
}

/// Defaults, then the config file if present, then environment overrides.
pub fn load_settings() -> Result<InstallerSettings> {
    let config_path = get_config_file_path()?;

    let mut settings = if config_path.exists() {
        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Could not read config file at {}", config_path.display())
        })?;
        serde_json::from_str(&content).with_context(|| {
            format!(
                "Could not parse config file {} as JSON",
                config_path.display()
            )
        })?
    } else {
        InstallerSettings::default()
    };

    settings.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(settings)
}
