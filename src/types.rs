use crate::platform;
use crate::version::NormalizedVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Where a product lives on disk once installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub root_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub entry_point: PathBuf,
    pub shim_path: PathBuf,
}

impl InstallLayout {
    pub fn new(root_dir: &Path, product: &str, channel: &str) -> Self {
        let bin_dir = root_dir.join("bin");
        let entry_point = root_dir.join(format!(
            "{}{}",
            product,
            platform::entry_point_extension(channel)
        ));
        let shim_path = bin_dir.join(format!("{}{}", product, platform::SHIM_EXTENSION));

        Self {
            root_dir: root_dir.to_path_buf(),
            bin_dir,
            entry_point,
            shim_path,
        }
    }
}

/// Inputs for one installation run.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub owner: String,
    pub repo: String,
    /// Name of the product inside release assets; the repository name by default.
    pub product: String,
    pub channel: String,
    /// Release tag to install; `None` means the latest release.
    pub tag: Option<String>,
    pub install_dir: PathBuf,
    /// Directory the archive is downloaded into before extraction.
    pub staging_dir: PathBuf,
}

impl InstallRequest {
    pub fn full_repo(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install_dir, &self.product, &self.channel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathUpdate {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone)]
pub struct InstallResult {
    pub version: NormalizedVersion,
    pub asset_name: String,
    pub layout: InstallLayout,
    pub path_update: PathUpdate,
}
