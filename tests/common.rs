use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Not every test binary uses every helper.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub config_path: PathBuf,
    pub config_dir: PathBuf,
    pub install_dir: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("config");
        let config_path = temp_dir.path().join("installer-config.json");
        let install_dir = temp_dir.path().join("install");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_ritobin-installer"));

        Self {
            _temp_dir: temp_dir,
            config_path,
            config_dir,
            install_dir,
            bin_path,
        }
    }

    /// A command isolated from the real home, config and temp directories.
    pub fn cmd(&self) -> Command {
        let tmp = self._temp_dir.path().join("tmp");
        std::fs::create_dir_all(&tmp).expect("Failed to create tmp dir");

        let mut cmd = Command::new(&self.bin_path);
        cmd.env("RITOBIN_INSTALLER_CONFIG", &self.config_path);
        cmd.env("HOME", self._temp_dir.path());
        cmd.env("XDG_DATA_HOME", self._temp_dir.path().join("data"));
        cmd.env("XDG_CONFIG_HOME", &self.config_dir);
        cmd.env("TMPDIR", tmp);
        for key in [
            "RITOBIN_INSTALLER_OWNER",
            "RITOBIN_INSTALLER_REPO",
            "RITOBIN_INSTALLER_CHANNEL",
            "RITOBIN_INSTALLER_INSTALL_DIR",
            "RITOBIN_INSTALLER_API_URL",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }

    /// The variables file written by the user environment store.
    pub fn env_json_path(&self) -> PathBuf {
        self.config_dir.join("ritobin-installer").join("env.json")
    }
}

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.status.success() {
            panic!(
                "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// Build a zip archive in memory from `(name, contents)` entries.
#[allow(dead_code)]
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(contents).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// Serve `repo`'s latest release from `server` with the given assets.
#[allow(dead_code)]
pub fn serve_release(
    server: &mut mockito::ServerGuard,
    repo: &str,
    tag: &str,
    assets: &[(&str, Vec<u8>)],
) -> Vec<mockito::Mock> {
    let base = server.url();
    let listing: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, _)| {
            serde_json::json!({
                "name": name,
                "browser_download_url": format!("{}/download/{}", base, name),
            })
        })
        .collect();

    let mut mocks = vec![server
        .mock("GET", format!("/repos/{}/releases/latest", repo).as_str())
        .with_status(200)
        .with_body(serde_json::json!({ "tag_name": tag, "assets": listing }).to_string())
        .create()];

    for (name, bytes) in assets {
        mocks.push(
            server
                .mock("GET", format!("/download/{}", name).as_str())
                .with_status(200)
                .with_body(bytes)
                .create(),
        );
    }
    mocks
}
