use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{ManagerError, ManagerResult};

/// Payload reported while an asset streams to disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DownloadProgress {
    pub url: String,
    pub bytes_downloaded: u64,
    pub total_bytes: Option<u64>,
    pub file_name: String,
}

/// Streams addon archives into a target directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` into `dir/filename`, returning the final path.
    ///
    /// Data is written to `<filename>.part` and renamed once complete. The
    /// partial file is removed if the transfer fails.
    pub async fn download_to<F>(
        &self,
        url: &str,
        dir: &Path,
        filename: &str,
        mut on_progress: F,
    ) -> ManagerResult<PathBuf>
    where
        F: FnMut(&DownloadProgress) + Send,
    {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ManagerError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let file_name = sanitize_filename(filename);
        let dest = dir.join(&file_name);
        let partial = dir.join(format!("{file_name}.part"));

        info!("Downloading {} -> {:?}", url, dest);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length();
        let mut progress = DownloadProgress {
            url: url.to_string(),
            bytes_downloaded: 0,
            total_bytes,
            file_name: file_name.clone(),
        };

        if let Err(e) = write_body(response, &partial, &mut progress, &mut on_progress).await {
            warn!("Download of {} failed: {}", url, e);
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                debug!("Could not remove {:?}: {}", partial, cleanup);
            }
            return Err(e);
        }

        tokio::fs::rename(&partial, &dest)
            .await
            .map_err(|e| ManagerError::Io {
                path: dest.clone(),
                source: e,
            })?;

        debug!(
            "Downloaded {} bytes: {} -> {:?}",
            progress.bytes_downloaded, url, dest
        );
        Ok(dest)
    }
}

/// Stream the response body into `partial`. The handle is closed on return.
async fn write_body<F>(
    response: reqwest::Response,
    partial: &Path,
    progress: &mut DownloadProgress,
    on_progress: &mut F,
) -> ManagerResult<()>
where
    F: FnMut(&DownloadProgress) + Send,
{
    let io_err = |e| ManagerError::Io {
        path: partial.to_path_buf(),
        source: e,
    };

    let mut file = tokio::fs::File::create(partial).await.map_err(io_err)?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(io_err)?;
        progress.bytes_downloaded = progress
            .bytes_downloaded
            .saturating_add(chunk.len() as u64);
        on_progress(progress);
    }
    file.flush().await.map_err(io_err)
}

/// Make a train name usable as a file name on every platform.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');
    if cleaned.is_empty() {
        "download.zip".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators_and_reserved_chars() {
        assert_eq!(sanitize_filename("E231/E233系-1.0.zip"), "E231_E233系-1.0.zip");
        assert_eq!(sanitize_filename("a:b*c?.zip"), "a_b_c_.zip");
        assert_eq!(sanitize_filename("  ..  "), "download.zip");
        assert_eq!(sanitize_filename("../evil.zip"), "_evil.zip");
    }
}
