//! User-scope environment variables.
//!
//! The installer never touches the process environment to register its bin
//! directory. It goes through an [`EnvStore`], which persists variables for
//! the current user across sessions:
//! - On Windows, the user environment (`HKCU\Environment`) via PowerShell
//! - Elsewhere, an env file the user sources from their shell profile

use crate::error::InstallError;
use crate::platform::PATH_SEPARATOR;
use crate::types::PathUpdate;

pub const PATH_VARIABLE: &str = "PATH";

pub trait EnvStore {
    fn get(&self, name: &str) -> Result<Option<String>, InstallError>;
    fn set(&mut self, name: &str, value: &str) -> Result<(), InstallError>;
}

/// Append `entry` to the user PATH unless an identical segment is already there.
///
/// Existing segments keep their order, and nothing is written when the entry
/// is present, so any number of runs leaves exactly one copy.
pub fn ensure_path_entry<S: EnvStore + ?Sized>(
    store: &mut S,
    entry: &str,
) -> Result<PathUpdate, InstallError> {
    let current = store.get(PATH_VARIABLE)?.unwrap_or_default();

    if current.split(PATH_SEPARATOR).any(|segment| segment == entry) {
        tracing::debug!("{} is already on the user PATH", entry);
        return Ok(PathUpdate::AlreadyPresent);
    }

    let updated = append_segment(&current, entry);
    store.set(PATH_VARIABLE, &updated)?;
    tracing::info!("Added {} to the user PATH", entry);
    Ok(PathUpdate::Added)
}

fn append_segment(current: &str, entry: &str) -> String {
    if current.is_empty() {
        entry.to_string()
    } else if current.ends_with(PATH_SEPARATOR) {
        format!("{}{}", current, entry)
    } else {
        format!("{}{}{}", current, PATH_SEPARATOR, entry)
    }
}

#[cfg(windows)]
pub use windows::PowerShellUserEnv as UserEnv;

#[cfg(not(windows))]
pub use unix::EnvFileStore as UserEnv;

#[cfg(windows)]
mod windows {
    use super::EnvStore;
    use crate::error::InstallError;
    use std::process::Command;

    /// Redirected output otherwise uses the OEM code page.
    const UTF8_OUTPUT: &str =
        "[Console]::OutputEncoding = New-Object System.Text.UTF8Encoding $false; ";

    /// The current user's environment, as seen by `[Environment]` with the `User` target.
    pub struct PowerShellUserEnv;

    impl PowerShellUserEnv {
        pub fn open() -> Result<Self, InstallError> {
            Ok(Self)
        }

        fn run(name: &str, script: &str) -> Result<String, InstallError> {
            let env_error = |message: String| InstallError::Environment {
                name: name.to_string(),
                message,
            };

            let script = utf8_script(script);
            let output = Command::new("powershell")
                .args(["-NoProfile", "-NonInteractive", "-Command", script.as_str()])
                .output()
                .map_err(|e| env_error(e.to_string()))?;

            if !output.status.success() {
                return Err(env_error(
                    String::from_utf8_lossy(&output.stderr).trim().to_string(),
                ));
            }
            // A lossy decode would be written back over the user's PATH
            String::from_utf8(output.stdout)
                .map_err(|e| env_error(format!("PowerShell output is not UTF-8: {}", e)))
        }
    }

    fn utf8_script(script: &str) -> String {
        format!("{}{}", UTF8_OUTPUT, script)
    }

    fn quote(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn parse_value(output: &str) -> Option<String> {
        let value = output
            .trim_start_matches('\u{feff}')
            .trim_end_matches(['\r', '\n']);
        (!value.is_empty()).then(|| value.to_string())
    }

    impl EnvStore for PowerShellUserEnv {
        fn get(&self, name: &str) -> Result<Option<String>, InstallError> {
            let script = format!(
                "[Environment]::GetEnvironmentVariable({}, 'User')",
                quote(name)
            );
            Ok(parse_value(&Self::run(name, &script)?))
        }

        fn set(&mut self, name: &str, value: &str) -> Result<(), InstallError> {
            let script = format!(
                "[Environment]::SetEnvironmentVariable({}, {}, 'User')",
                quote(name),
                quote(value)
            );
            Self::run(name, &script).map(|_| ())
        }
    }

}

#[cfg(not(windows))]
mod unix {
    use super::{EnvStore, PATH_VARIABLE};
    use crate::error::InstallError;
    use crate::platform::escape_sh;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const VARIABLES_FILE_NAME: &str = "env.json";
    pub const SCRIPT_FILE_NAME: &str = "env";

    /// User-scope variables kept in `env.json`, rendered to a POSIX `env`
    /// script that shell profiles source.
    ///
    /// `PATH` holds only the segments registered here; the script appends
    /// them to whatever `PATH` the shell already has.
    pub struct EnvFileStore {
        dir: PathBuf,
        vars: BTreeMap<String, String>,
    }

    impl EnvFileStore {
        pub fn open(dir: &Path) -> Result<Self, InstallError> {
            let path = dir.join(VARIABLES_FILE_NAME);
            let vars = if path.exists() {
                let content = fs::read_to_string(&path)
                    .map_err(|e| InstallError::filesystem(&path, e))?;
                serde_json::from_str(&content).map_err(|e| InstallError::Environment {
                    name: path.display().to_string(),
                    message: format!("Could not parse variables file: {}", e),
                })?
            } else {
                BTreeMap::new()
            };

            Ok(Self {
                dir: dir.to_path_buf(),
                vars,
            })
        }

        pub fn script_path(&self) -> PathBuf {
            self.dir.join(SCRIPT_FILE_NAME)
        }

        fn save(&self) -> Result<(), InstallError> {
            fs::create_dir_all(&self.dir).map_err(|e| InstallError::filesystem(&self.dir, e))?;

            let vars_path = self.dir.join(VARIABLES_FILE_NAME);
            let content = serde_json::to_string_pretty(&self.vars).map_err(|e| {
                InstallError::Environment {
                    name: vars_path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            fs::write(&vars_path, content).map_err(|e| InstallError::filesystem(&vars_path, e))?;

            let script_path = self.script_path();
            fs::write(&script_path, render_script(&self.vars))
                .map_err(|e| InstallError::filesystem(&script_path, e))?;
            tracing::debug!("Wrote user environment script {}", script_path.display());
            Ok(())
        }
    }

    impl EnvStore for EnvFileStore {
        fn get(&self, name: &str) -> Result<Option<String>, InstallError> {
            Ok(self.vars.get(name).cloned())
        }

        fn set(&mut self, name: &str, value: &str) -> Result<(), InstallError> {
            self.vars.insert(name.to_string(), value.to_string());
            self.save()
        }
    }

    pub(crate) fn render_script(vars: &BTreeMap<String, String>) -> String {
        let mut script = String::from("#!/bin/sh\n# Generated by ritobin-installer\n");
        for (name, value) in vars {
            if name == PATH_VARIABLE {
                script.push_str(&format!("export PATH=\"$PATH:{}\"\n", escape_sh(value)));
            } else {
                script.push_str(&format!("export {}=\"{}\"\n", name, escape_sh(value)));
            }
        }
        script
    }

}

/// In-memory store that counts writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryEnvStore {
    pub vars: std::collections::HashMap<String, String>,
    pub writes: usize,
}

#[cfg(test)]
impl MemoryEnvStore {
    pub fn with_path(value: &str) -> Self {
        let mut store = Self::default();
        store.vars.insert(PATH_VARIABLE.to_string(), value.to_string());
        store
    }

    pub fn path(&self) -> Option<&str> {
        self.vars.get(PATH_VARIABLE).map(String::as_str)
    }
}

#[cfg(test)]
impl EnvStore for MemoryEnvStore {
    fn get(&self, name: &str) -> Result<Option<String>, InstallError> {
        Ok(self.vars.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), InstallError> {
        self.writes += 1;
        self.vars.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(parts: &[&str]) -> String {
        parts.join(&PATH_SEPARATOR.to_string())
    }

    #[test]
    fn test_appends_when_absent() {
        let mut store = MemoryEnvStore::with_path(&joined(&["/usr/bin", "/bin"]));
        let update = ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        assert_eq!(update, PathUpdate::Added);
        assert_eq!(
            store.path(),
            Some(joined(&["/usr/bin", "/bin", "/opt/tool/bin"]).as_str())
        );
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_no_write_when_present() {
        let original = joined(&["/opt/tool/bin", "/usr/bin"]);
        let mut store = MemoryEnvStore::with_path(&original);
        let update = ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        assert_eq!(update, PathUpdate::AlreadyPresent);
        assert_eq!(store.path(), Some(original.as_str()));
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_repeated_runs_keep_single_entry() {
        let mut store = MemoryEnvStore::with_path("/usr/bin");
        for _ in 0..5 {
            ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        }
        let path = store.path().unwrap();
        assert_eq!(
            path.split(PATH_SEPARATOR)
                .filter(|s| *s == "/opt/tool/bin")
                .count(),
            1
        );
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_membership_is_exact_string_equality() {
        // A trailing slash is a different segment
        let mut store = MemoryEnvStore::with_path("/opt/tool/bin/");
        let update = ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        assert_eq!(update, PathUpdate::Added);
        assert_eq!(
            store.path(),
            Some(joined(&["/opt/tool/bin/", "/opt/tool/bin"]).as_str())
        );
    }

    #[test]
    fn test_missing_or_empty_path() {
        let mut store = MemoryEnvStore::default();
        ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        assert_eq!(store.path(), Some("/opt/tool/bin"));

        let mut store = MemoryEnvStore::with_path("");
        ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        assert_eq!(store.path(), Some("/opt/tool/bin"));
    }

    #[test]
    fn test_trailing_separator_is_not_doubled() {
        let mut store = MemoryEnvStore::with_path(&format!("/usr/bin{}", PATH_SEPARATOR));
        ensure_path_entry(&mut store, "/opt/tool/bin").unwrap();
        assert_eq!(
            store.path(),
            Some(joined(&["/usr/bin", "/opt/tool/bin"]).as_str())
        );
    }
}
