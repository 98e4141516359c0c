use crate::config::InstallerSettings;
use clap::Parser;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("RITOBIN_INSTALLER_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("RITOBIN_INSTALLER_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("RITOBIN_INSTALLER_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup so clap can hold a 'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser, Debug)]
#[command(name = "ritobin-installer")]
#[command(about = "Install or update ritobin-tools from its latest GitHub release")]
#[command(
    version = get_version(),
    after_help = "Examples:\n  ritobin-installer\n  ritobin-installer --channel windows-arm64\n  ritobin-installer --install-dir D:\\tools\\ritobin --tag ritobin-tools-v0.1.1"
)]
pub struct Cli {
    /// GitHub account that publishes the releases
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository to install from; also the product name inside release assets
    #[arg(long)]
    pub repo: Option<String>,

    /// Platform channel in asset names (e.g. 'windows-x64')
    #[arg(long)]
    pub channel: Option<String>,

    /// Directory to install into (defaults to a per-user data directory)
    #[arg(long)]
    pub install_dir: Option<String>,

    /// Install this release tag instead of the latest release
    #[arg(long)]
    pub tag: Option<String>,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Command-line flags take precedence over every other source.
    pub fn apply_to(&self, settings: &mut InstallerSettings) {
        if let Some(owner) = &self.owner {
            settings.owner = owner.clone();
        }
        if let Some(repo) = &self.repo {
            settings.repo = repo.clone();
        }
        if let Some(channel) = &self.channel {
            settings.channel = channel.clone();
        }
        if let Some(dir) = &self.install_dir {
            settings.install_dir = Some(dir.clone());
        }
    }
}
