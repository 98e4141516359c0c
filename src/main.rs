mod cli;
mod config;
mod download;
mod env;
mod error;
mod install;
mod platform;
mod resolve;
mod types;
mod version;


use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::load_settings;
use console::style;
use env::UserEnv;
use install::{install, GitHubClient};
use types::{InstallRequest, InstallResult, PathUpdate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    // Load configuration
    let mut settings = load_settings()?;
    cli.apply_to(&mut settings);
    tracing::debug!("Effective settings: {:?}", settings);

    let request = InstallRequest {
        owner: settings.owner.clone(),
        repo: settings.repo.clone(),
        product: settings.repo.clone(),
        channel: settings.channel.clone(),
        tag: cli.tag.clone(),
        install_dir: settings.resolve_install_dir()?,
        staging_dir: std::env::temp_dir(),
    };

    let token = std::env::var("GITHUB_TOKEN").ok();
    let client = GitHubClient::new(&settings.api_url, token.as_deref())
        .context("Could not create the GitHub client")?;
    let mut user_env = open_user_env().context("Could not open the user environment")?;

    match install(&client, &mut user_env, &request).await {
        Ok(result) => {
            print_summary(&result, &user_env);
            Ok(())
        }
        Err(failure) => {
            tracing::debug!("Installation failed: {:?}", failure);
            eprintln!("{} {}", style("error:").red().bold(), failure);
            std::process::exit(1);
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

#[cfg(windows)]
fn open_user_env() -> Result<UserEnv> {
    Ok(UserEnv::open()?)
}

#[cfg(not(windows))]
fn open_user_env() -> Result<UserEnv> {
    Ok(UserEnv::open(&config::get_user_config_dir()?)?)
}

fn print_summary(result: &InstallResult, user_env: &UserEnv) {
    let product = result
        .layout
        .entry_point
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    println!(
        "{} {} {}",
        style("Installed").green().bold(),
        style(&product).bold(),
        result.version.as_str()
    );
    println!("  Asset: {}", result.asset_name);
    println!("  Path: {}", result.layout.root_dir.display());
    println!("  Shim: {}", result.layout.shim_path.display());

    if result.path_update == PathUpdate::Added {
        println!(
            "  Added {} to your user PATH.",
            result.layout.bin_dir.display()
        );
        print_path_hint(user_env);
    }

    println!();
    println!("Run `{} --help` to get started.", style(&product).cyan());
}

#[cfg(windows)]
fn print_path_hint(_user_env: &UserEnv) {
    println!("  Open a new terminal for the change to take effect.");
}

#[cfg(not(windows))]
fn print_path_hint(user_env: &UserEnv) {
    println!("  Add this line to your shell profile, then open a new terminal:");
    println!("    . \"{}\"", user_env.script_path().display());
}
