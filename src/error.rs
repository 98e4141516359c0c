use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort an installation run.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Failed to fetch release metadata for {repo}: {message}")]
    MetadataFetch { repo: String, message: String },

    #[error(
        "No release asset named '{expected}' or matching '{pattern}' is available for channel '{channel}'"
    )]
    AssetNotFound {
        expected: String,
        pattern: String,
        channel: String,
    },

    #[error("Failed to download {name}: {message}")]
    Download { name: String, message: String },

    #[error("Failed to extract {}: {message}", archive.display())]
    Extraction { archive: PathBuf, message: String },

    #[error("Expected executable not found at {} after extraction", path.display())]
    EntryPointMissing { path: PathBuf },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to update user environment variable {name}: {message}")]
    Environment { name: String, message: String },
}

impl InstallError {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        InstallError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Steps of a single installation run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Init,
    DirEnsured,
    MetadataFetched,
    AssetResolved,
    Downloaded,
    Extracted,
    EntryPointVerified,
    ShimWritten,
    PathEnsured,
    Done,
}

impl InstallStage {
    /// The stage a run moves to once this one completes.
    pub fn next(self) -> Self {
        match self {
            InstallStage::Init => InstallStage::DirEnsured,
            InstallStage::DirEnsured => InstallStage::MetadataFetched,
            InstallStage::MetadataFetched => InstallStage::AssetResolved,
            InstallStage::AssetResolved => InstallStage::Downloaded,
            InstallStage::Downloaded => InstallStage::Extracted,
            InstallStage::Extracted => InstallStage::EntryPointVerified,
            InstallStage::EntryPointVerified => InstallStage::ShimWritten,
            InstallStage::ShimWritten => InstallStage::PathEnsured,
            InstallStage::PathEnsured | InstallStage::Done => InstallStage::Done,
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStage::Init => "preparing the install directory",
            InstallStage::DirEnsured => "fetching release metadata",
            InstallStage::MetadataFetched => "resolving the release asset",
            InstallStage::AssetResolved => "downloading the release asset",
            InstallStage::Downloaded => "extracting the archive",
            InstallStage::Extracted => "verifying the entry point",
            InstallStage::EntryPointVerified => "writing the shim",
            InstallStage::ShimWritten => "registering the bin directory on PATH",
            InstallStage::PathEnsured | InstallStage::Done => "finishing",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a run: the step that was in progress and why it failed.
#[derive(Debug, Error)]
#[error("Failed while {stage}: {error}")]
pub struct InstallFailure {
    pub stage: InstallStage,
    #[source]
    pub error: InstallError,
}
