//! Installation of a release into a user-scoped directory
//!
//! One run walks a fixed sequence of stages and stops at the first failure:
//! - Ensure the install directory
//! - Fetch release metadata and pick the asset for the channel
//! - Download and extract the archive, then check the entry point exists
//! - Write the shim and register its directory on the user PATH
//!
//! Re-running over an existing install overwrites files in place and leaves
//! the PATH untouched when the bin directory is already registered.

pub mod github;

pub use github::GitHubClient;

use crate::download::{download_file, extract_zip};
use crate::env::{ensure_path_entry, EnvStore};
use crate::error::{InstallError, InstallFailure, InstallStage};
use crate::platform;
use crate::resolve::resolve_asset;
use crate::types::{InstallRequest, InstallResult};
use crate::version::extract_version;
use std::fs;
use std::path::Path;

/// Tracks how far a run got so a failure can name the step it was in.
struct Progress {
    stage: InstallStage,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: InstallStage::Init,
        }
    }

    fn advance(&mut self) {
        let next = self.stage.next();
        tracing::debug!("{:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn fail(&self, error: InstallError) -> InstallFailure {
        InstallFailure {
            stage: self.stage,
            error,
        }
    }
}

pub async fn install<S: EnvStore + ?Sized>(
    client: &GitHubClient,
    env: &mut S,
    request: &InstallRequest,
) -> Result<InstallResult, InstallFailure> {
    let mut progress = Progress::new();
    let layout = request.layout();
    let repo = request.full_repo();

    tracing::debug!("Install layout: {:?}", layout);
    ensure_dir(&layout.root_dir).map_err(|e| progress.fail(e))?;
    progress.advance();

    let release = client
        .get_release(&repo, request.tag.as_deref())
        .await
        .map_err(|e| progress.fail(e))?;
    tracing::info!(
        "{} release of {} is '{}' with {} assets",
        if request.tag.is_some() { "Requested" } else { "Latest" },
        repo,
        release.tag_name,
        release.assets.len()
    );
    progress.advance();

    let version = extract_version(&release.tag_name);
    let asset = resolve_asset(&release.assets, &request.product, &version, &request.channel)
        .map_err(|e| progress.fail(e))?;
    progress.advance();

    eprintln!("Installing {} {}...", request.product, version);
    let archive_path = request.staging_dir.join(&asset.name);
    download_file(client.http(), &asset.download_url, &archive_path)
        .await
        .map_err(|e| progress.fail(e))?;
    progress.advance();

    extract_zip(&archive_path, &layout.root_dir).map_err(|e| progress.fail(e))?;
    if let Err(e) = fs::remove_file(&archive_path) {
        tracing::debug!(
            "Could not remove downloaded archive {}: {}",
            archive_path.display(),
            e
        );
    }
    progress.advance();

    if !layout.entry_point.is_file() {
        return Err(progress.fail(InstallError::EntryPointMissing {
            path: layout.entry_point.clone(),
        }));
    }
    progress.advance();

    ensure_dir(&layout.bin_dir).map_err(|e| progress.fail(e))?;
    write_shim(&layout.shim_path, &layout.entry_point).map_err(|e| progress.fail(e))?;
    progress.advance();

    let bin_dir = layout.bin_dir.to_string_lossy();
    let path_update = ensure_path_entry(env, &bin_dir).map_err(|e| progress.fail(e))?;
    progress.advance();

    tracing::info!(
        "Successfully installed {} {} to {}",
        request.product,
        version,
        layout.root_dir.display()
    );
    progress.advance();

    Ok(InstallResult {
        version,
        asset_name: asset.name.clone(),
        layout,
        path_update,
    })
}

fn ensure_dir(path: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(path).map_err(|e| InstallError::filesystem(path, e))
}

/// Overwrite the shim at `shim_path` so it forwards to `entry_point`.
fn write_shim(shim_path: &Path, entry_point: &Path) -> Result<(), InstallError> {
    fs::write(shim_path, platform::shim_content(entry_point))
        .map_err(|e| InstallError::filesystem(shim_path, e))?;
    platform::make_executable(shim_path).map_err(|e| InstallError::filesystem(shim_path, e))?;
    tracing::info!("Created shim script at {}", shim_path.display());
    Ok(())
}
