use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the addon manager backend.
/// Every module returns `Result<T, ManagerError>`.
#[derive(Debug, Error)]
pub enum ManagerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TrainList request failed: {status} {reason}")]
    ApiStatus { status: u16, reason: String },

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Configuration ───────────────────────────────────
    #[error("API base URL is not configured (set RTM_API_BASE_URL or api_base_url in settings)")]
    MissingApiBase,

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Catalog / selection ─────────────────────────────
    #[error("Train not found: {0}")]
    TrainNotFound(u64),

    #[error("No train is selected")]
    NoSelection,

    #[error("Unknown version '{0}'")]
    UnknownVersion(String),

    #[error("No download link available for {0}")]
    DownloadUnavailable(String),

    // ── Terms gate ──────────────────────────────────────
    #[error("Terms of use have not been accepted")]
    TermsNotAccepted,

    #[error("No terms dialog is open")]
    NoPendingTerms,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type ManagerResult<T> = Result<T, ManagerError>;

// ── Serialization for Tauri IPC ─────────────────────────
// Tauri commands require the error type to implement `Serialize`.
impl serde::Serialize for ManagerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_message_matches_list_error_text() {
        let err = ManagerError::ApiStatus {
            status: 503,
            reason: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "TrainList request failed: 503 Service Unavailable"
        );
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&ManagerError::NoSelection).unwrap();
        assert_eq!(json, "\"No train is selected\"");
    }
}
