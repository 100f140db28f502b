use chrono::Utc;
use tracing::debug;

use crate::core::catalog::{Train, TrainDetail};
use crate::core::downloader::DownloadRequest;
use crate::core::error::{ManagerError, ManagerResult};
use crate::core::release::ReleaseLinks;

/// The train shown in the detail panel and whether the panel is open.
///
/// Shared by the list (which selects) and the detail view (which reads).
/// Never reset; a new selection simply overwrites the previous one.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Option<Train>,
    panel_open: bool,
    current_version: Option<String>,
    /// Epoch millis captured at selection time, used to bust the image
    /// cache when the record carries no timestamp of its own.
    session_cache_bust: Option<i64>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Train> {
        self.selected.as_ref()
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn current_version(&self) -> Option<&str> {
        self.current_version.as_deref()
    }

    pub fn session_cache_bust(&self) -> Option<i64> {
        self.session_cache_bust
    }

    /// Replace the selection. The version picker resets to the first
    /// version of the new train.
    pub fn set_selected(&mut self, train: Option<Train>) {
        self.current_version = train.as_ref().and_then(|t| {
            ReleaseLinks::parse(t.ver.as_deref(), t.download_link.as_deref())
                .default_version()
                .map(str::to_string)
        });
        self.session_cache_bust = match &train {
            Some(t) if t.cache_bust().is_none() => Some(Utc::now().timestamp_millis()),
            _ => None,
        };
        if let Some(t) = &train {
            debug!("Selected train {} ({})", t.id, t.name);
        }
        self.selected = train;
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }

    /// Select `train` and slide the panel in.
    pub fn open(&mut self, train: Train) {
        self.set_selected(Some(train));
        self.set_panel_open(true);
    }

    /// Pick a version from the selected train's version list.
    pub fn choose_version(&mut self, version: &str) -> ManagerResult<()> {
        let train = self.selected.as_ref().ok_or(ManagerError::NoSelection)?;
        let releases = ReleaseLinks::parse(train.ver.as_deref(), train.download_link.as_deref());
        if !releases.contains_version(version) {
            return Err(ManagerError::UnknownVersion(version.to_string()));
        }
        self.current_version = Some(version.to_string());
        Ok(())
    }

    pub fn detail(&self, base_url: &str) -> Option<TrainDetail> {
        self.selected.as_ref().map(|t| {
            TrainDetail::build(
                t,
                base_url,
                self.current_version.as_deref(),
                self.session_cache_bust,
            )
        })
    }

    /// The download the button would trigger right now.
    pub fn download_request(&self) -> ManagerResult<DownloadRequest> {
        let train = self.selected.as_ref().ok_or(ManagerError::NoSelection)?;
        let detail = TrainDetail::build(train, "", self.current_version.as_deref(), None);
        let url = detail
            .download_url
            .ok_or_else(|| ManagerError::DownloadUnavailable(train.name.clone()))?;

        Ok(DownloadRequest {
            train_id: train.id,
            train_name: train.name.clone(),
            version: self.current_version.clone(),
            url,
            filename: detail.suggested_filename,
        })
    }
}
