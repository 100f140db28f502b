mod client;

pub use client::{sanitize_filename, DownloadProgress, Downloader};

use serde::Serialize;

/// A resolved download waiting to be performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub train_id: u64,
    pub train_name: String,
    pub version: Option<String>,
    pub url: String,
    pub filename: String,
}
