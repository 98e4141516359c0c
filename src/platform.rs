use std::io;
use std::path::Path;

#[cfg(windows)]
pub const SHIM_EXTENSION: &str = ".cmd";
#[cfg(not(windows))]
pub const SHIM_EXTENSION: &str = "";

#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Channels are things like `windows-x64` or `linux-x64`; only Windows
/// archives ship `.exe` entry points.
pub fn entry_point_extension(channel: &str) -> &'static str {
    if channel.to_lowercase().contains("windows") {
        ".exe"
    } else {
        ""
    }
}

/// Contents of a shim that forwards every argument to `entry_point`.
pub fn shim_content(entry_point: &Path) -> String {
    let entry = entry_point.to_string_lossy();
    if cfg!(windows) {
        cmd_shim(&entry)
    } else {
        sh_shim(&entry)
    }
}

fn cmd_shim(entry: &str) -> String {
    format!("@echo off\r\n\"{}\" %*\r\n", escape_cmd(entry))
}

fn sh_shim(entry: &str) -> String {
    format!("#!/bin/sh\nexec \"{}\" \"$@\"\n", escape_sh(entry))
}

/// Escape `value` for use inside a double-quoted POSIX shell word.
pub fn escape_sh(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Batch files expand `%` even inside quotes.
fn escape_cmd(value: &str) -> String {
    value.replace('%', "%%")
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
