//! File transfer — one HTTP GET, body streamed to disk.

use crate::{Error, Result};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Download `url` into `dest`.
///
/// A non-success status is an unrecoverable fault, as is the file being
/// absent once the write completes.
pub async fn download(client: &reqwest::Client, url: &str, dest: &Path) -> Result<PathBuf> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Download(format!("GET {} returned {}", url, status)));
    }

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    if !fs::try_exists(dest).await? {
        return Err(Error::Download(format!(
            "file missing after transfer: {}",
            dest.display()
        )));
    }

    info!("downloaded {} -> {}", url, dest.display());
    Ok(dest.to_path_buf())
}

/// Derive the local file name from the final path segment of `url`.
pub fn file_name_from_url(url: &url::Url) -> Result<String> {
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    if name.is_empty() {
        return Err(Error::Download(format!(
            "cannot derive a file name from {}",
            url
        )));
    }
    Ok(name.to_string())
}
