use crate::error::InstallError;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    local_path: &Path,
) -> Result<u64, InstallError> {
    let filename = file_label(local_path);
    tracing::info!("Downloading {}...", filename);
    tracing::debug!("Download URL: {}", url);

    let download_error = |message: String| InstallError::Download {
        name: filename.clone(),
        message,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| download_error(e.to_string()))?;
    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("Downloading {}", filename));

    if let Some(parent) = local_path.parent() {
        fs::create_dir_all(parent).map_err(|e| InstallError::filesystem(parent, e))?;
    }
    let mut file =
        fs::File::create(local_path).map_err(|e| InstallError::filesystem(local_path, e))?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| download_error(e.to_string()))?;
        file.write_all(&chunk)
            .map_err(|e| download_error(e.to_string()))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }
    file.flush().map_err(|e| download_error(e.to_string()))?;

    pb.finish_with_message("Download complete");
    tracing::debug!("Downloaded {} bytes to {}", downloaded, local_path.display());
    Ok(downloaded)
}

/// Unpack every entry of a zip archive into `extract_dir`, replacing files
/// that already exist. Returns the number of files written.
pub fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<usize, InstallError> {
    tracing::info!("Extracting {}...", file_label(archive_path));

    let extraction_error = |message: String| InstallError::Extraction {
        archive: archive_path.to_path_buf(),
        message,
    };

    let file =
        fs::File::open(archive_path).map_err(|e| InstallError::filesystem(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(e.to_string()))?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_error(e.to_string()))?;

        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                tracing::warn!("Skipping malicious path in zip: {}", entry.name());
                continue;
            }
        };
        let outpath = extract_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| InstallError::filesystem(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::filesystem(parent, e))?;
        }
        let mut outfile =
            fs::File::create(&outpath).map_err(|e| InstallError::filesystem(&outpath, e))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| extraction_error(format!("{}: {}", outpath.display(), e)))?;
        written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Keep the owner write bit so a reinstall can overwrite the file
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode | 0o200))
                    .map_err(|e| InstallError::filesystem(&outpath, e))?;
            }
        }
    }

    tracing::debug!("Extracted {} files into {}", written, extract_dir.display());
    Ok(written)
}
