use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::selection::SelectionState;
use super::terms::{GateDecision, TermsGate};
use crate::core::catalog::{ListState, TrainApi, TrainDetail, TrainList, TrainSource};
use crate::core::downloader::{DownloadRequest, Downloader};
use crate::core::error::{ManagerError, ManagerResult};
use crate::core::http::build_http_client;

const APP_DIR_NAME: &str = "RtmAddonManager";
const SETTINGS_FILE: &str = "settings.json";

/// Environment variable naming the catalog API base URL.
pub const API_BASE_ENV: &str = "RTM_API_BASE_URL";

/// Base URL baked in at compile time, if `RTM_API_BASE_URL` was set then.
pub fn build_time_api_base() -> Option<&'static str> {
    option_env!("RTM_API_BASE_URL").filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadBehavior {
    /// Hand the URL to the system browser.
    #[default]
    OpenInBrowser,
    /// Stream the archive into the download directory.
    SaveToDirectory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSettings {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub download_behavior: DownloadBehavior,
}

impl ManagerSettings {
    /// `None` when the file is missing or unreadable.
    pub fn load(data_dir: &Path) -> Option<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring unreadable settings at {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> ManagerResult<()> {
        std::fs::create_dir_all(data_dir).map_err(|e| ManagerError::Io {
            path: data_dir.to_path_buf(),
            source: e,
        })?;
        let path = data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| ManagerError::Io { path, source: e })
    }

    /// Configured directory, else the OS download folder.
    pub fn effective_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Pick the API base: run-time override, then settings, then build time.
pub fn resolve_api_base(runtime: Option<&str>, settings: &ManagerSettings) -> Option<String> {
    non_blank(runtime)
        .or_else(|| non_blank(settings.api_base_url.as_deref()))
        .or_else(|| non_blank(build_time_api_base()))
        .map(|s| s.trim_end_matches('/').to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Process-wide state shared by the list, the detail panel and the terms
/// dialog.
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: ManagerSettings,
    pub http_client: Client,
    pub downloader: Downloader,
    pub train_list: TrainList,
    pub selection: SelectionState,
    pub terms: TermsGate<DownloadRequest>,
    runtime_api_base: Option<String>,
}

impl AppState {
    pub fn new(data_dir: PathBuf, runtime_api_base: Option<String>) -> ManagerResult<Self> {
        Ok(Self::with_client(
            data_dir,
            runtime_api_base,
            build_http_client()?,
        ))
    }

    pub fn with_client(
        data_dir: PathBuf,
        runtime_api_base: Option<String>,
        http_client: Client,
    ) -> Self {
        let settings = ManagerSettings::load(&data_dir).unwrap_or_default();

        Self {
            data_dir,
            settings,
            downloader: Downloader::new(http_client.clone()),
            http_client,
            train_list: TrainList::new(),
            selection: SelectionState::new(),
            terms: TermsGate::new(),
            runtime_api_base,
        }
    }

    pub fn api_base(&self) -> ManagerResult<String> {
        resolve_api_base(self.runtime_api_base.as_deref(), &self.settings)
            .ok_or(ManagerError::MissingApiBase)
    }

    /// Base for image URLs; empty when unconfigured so paths stay relative.
    pub fn image_base(&self) -> String {
        self.api_base().unwrap_or_default()
    }

    pub fn api(&self) -> ManagerResult<TrainApi> {
        Ok(TrainApi::new(self.http_client.clone(), self.api_base()?))
    }

    pub fn update_settings(&mut self, settings: ManagerSettings) -> ManagerResult<()> {
        settings.save(&self.data_dir)?;
        self.settings = settings;
        info!("Settings updated");
        Ok(())
    }

    /// Select a loaded train and open the detail panel.
    pub fn select_train(&mut self, id: u64) -> ManagerResult<TrainDetail> {
        let train = self
            .train_list
            .find(id)
            .cloned()
            .ok_or(ManagerError::TrainNotFound(id))?;
        self.selection.open(train);
        self.selected_detail()
    }

    pub fn selected_detail(&self) -> ManagerResult<TrainDetail> {
        self.selection
            .detail(&self.image_base())
            .ok_or(ManagerError::NoSelection)
    }

    /// Press the download button: resolve the link, then pass it through the
    /// terms gate.
    pub fn request_download(&mut self) -> ManagerResult<GateDecision<DownloadRequest>> {
        let request = self.selection.download_request()?;
        let terms = self
            .selection
            .selected()
            .and_then(|t| t.terms_text())
            .map(str::to_string);
        Ok(self.terms.request(terms.as_deref(), request))
    }
}

/// Fetch the list from the configured API without holding the state lock
/// across the request.
pub async fn refresh_train_list(state: &Arc<Mutex<AppState>>) -> ListState {
    let api = state.lock().await.api();
    match api {
        Ok(api) => refresh_train_list_from(state, &api).await,
        Err(e) => {
            let mut guard = state.lock().await;
            let ticket = guard.train_list.begin_load();
            guard.train_list.finish(ticket, Err(e));
            guard.train_list.state().clone()
        }
    }
}

/// Load the list from `source`.
///
/// The result is applied only if no newer load started meanwhile and the
/// list is still mounted.
pub async fn refresh_train_list_from<S>(state: &Arc<Mutex<AppState>>, source: &S) -> ListState
where
    S: TrainSource + ?Sized,
{
    let ticket = state.lock().await.train_list.begin_load();
    let result = source.fetch_trains().await;

    let mut guard = state.lock().await;
    guard.train_list.finish(ticket, result);
    guard.train_list.state().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Train;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Serves a fixed list once `release` is notified.
    struct HeldSource {
        release: Arc<Notify>,
        trains: Vec<Train>,
    }

    #[async_trait]
    impl TrainSource for HeldSource {
        async fn fetch_trains(&self) -> ManagerResult<Vec<Train>> {
            self.release.notified().await;
            Ok(self.trains.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TrainSource for FailingSource {
        async fn fetch_trains(&self) -> ManagerResult<Vec<Train>> {
            Err(ManagerError::ApiStatus {
                status: 502,
                reason: "Bad Gateway".into(),
            })
        }
    }

    fn shared_state(temp: &tempfile::TempDir) -> Arc<Mutex<AppState>> {
        Arc::new(Mutex::new(AppState::with_client(
            temp.path().to_path_buf(),
            Some("https://rtm.example.jp".into()),
            Client::new(),
        )))
    }

    fn sample_trains() -> Vec<Train> {
        serde_json::from_value(serde_json::json!([
            { "id": 1, "name": "E231系" },
            { "id": 2, "name": "キハ40" }
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn refresh_from_source_fills_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let state = shared_state(&temp);
        let release = Arc::new(Notify::new());
        release.notify_one();
        let source = HeldSource {
            release,
            trains: sample_trains(),
        };

        let list = refresh_train_list_from(&state, &source).await;
        assert!(matches!(list, ListState::Ready(ref trains) if trains.len() == 2));
        assert!(state.lock().await.train_list.find(2).is_some());
    }

    #[tokio::test]
    async fn failing_source_shows_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let state = shared_state(&temp);
        let source: Arc<dyn TrainSource> = Arc::new(FailingSource);

        let list = refresh_train_list_from(&state, source.as_ref()).await;
        assert_eq!(
            list,
            ListState::Failed("TrainList request failed: 502 Bad Gateway".into())
        );
    }

    #[tokio::test]
    async fn result_arriving_after_unmount_is_dropped() {
        let temp = tempfile::TempDir::new().unwrap();
        let state = shared_state(&temp);
        let release = Arc::new(Notify::new());
        let source = Arc::new(HeldSource {
            release: Arc::clone(&release),
            trains: sample_trains(),
        });

        let task = {
            let state = Arc::clone(&state);
            let source = Arc::clone(&source);
            tokio::spawn(async move { refresh_train_list_from(&state, source.as_ref()).await })
        };

        while !state.lock().await.train_list.is_mounted() {
            tokio::task::yield_now().await;
        }
        state.lock().await.train_list.unmount();
        release.notify_one();

        assert_eq!(task.await.unwrap(), ListState::Loading);
        assert!(state.lock().await.train_list.trains().is_empty());
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(ManagerSettings::load(temp.path()).is_none());

        let settings = ManagerSettings {
            api_base_url: Some("https://rtm.example.jp".into()),
            download_dir: Some(temp.path().join("dl")),
            download_behavior: DownloadBehavior::SaveToDirectory,
        };
        settings.save(temp.path()).unwrap();
        assert_eq!(ManagerSettings::load(temp.path()), Some(settings));
    }

    #[test]
    fn save_failure_names_the_offending_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let not_a_dir = temp.path().join("blocker");
        std::fs::write(&not_a_dir, "file").unwrap();

        let err = ManagerSettings::default().save(&not_a_dir).unwrap_err();
        assert!(matches!(err, ManagerError::Io { ref path, .. } if path == &not_a_dir));
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(SETTINGS_FILE), "{not json").unwrap();
        assert!(ManagerSettings::load(temp.path()).is_none());
    }

    #[test]
    fn runtime_override_beats_settings() {
        let settings = ManagerSettings {
            api_base_url: Some("https://from-settings/".into()),
            ..ManagerSettings::default()
        };
        assert_eq!(
            resolve_api_base(Some(" https://from-env/ "), &settings).as_deref(),
            Some("https://from-env")
        );
        assert_eq!(
            resolve_api_base(None, &settings).as_deref(),
            Some("https://from-settings")
        );
    }

    #[test]
    fn blank_override_does_not_hide_settings() {
        let settings = ManagerSettings {
            api_base_url: Some("https://from-settings".into()),
            ..ManagerSettings::default()
        };
        assert_eq!(
            resolve_api_base(Some("  "), &settings).as_deref(),
            Some("https://from-settings")
        );
    }

    #[test]
    fn unconfigured_base_falls_back_to_build_time() {
        let settings = ManagerSettings::default();
        assert_eq!(
            resolve_api_base(Some("  "), &settings),
            build_time_api_base().map(|s| s.trim().trim_end_matches('/').to_string())
        );
    }

    #[test]
    fn missing_download_dir_uses_os_default() {
        let settings = ManagerSettings::default();
        assert!(!settings.effective_download_dir().as_os_str().is_empty());
    }
}
