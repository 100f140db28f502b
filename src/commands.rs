use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};
use tauri_plugin_opener::OpenerExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::catalog::{ListState, TrainCard, TrainDetail, TrainQuery};
use crate::core::downloader::{DownloadProgress, DownloadRequest};
use crate::core::error::ManagerError;
use crate::core::state::{
    refresh_train_list, AppState, DownloadBehavior, GateDecision, ManagerSettings, TermsPrompt,
};

type SharedState<'a> = tauri::State<'a, Arc<Mutex<AppState>>>;

const DOWNLOAD_PROGRESS_EVENT: &str = "download-progress";

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrainListView {
    Loading,
    Failed { error: String },
    Ready { cards: Vec<TrainCard> },
}

#[derive(Debug, Serialize)]
pub struct SelectionView {
    pub panel_open: bool,
    pub detail: Option<TrainDetail>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadOutcome {
    TermsRequired { prompt: TermsPrompt },
    Opened { url: String },
    Saved { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub api_base_url: Option<String>,
    pub download_dir: Option<String>,
    pub download_behavior: DownloadBehavior,
    /// Directory actually used when saving, after defaults.
    #[serde(default)]
    pub effective_download_dir: Option<String>,
}

impl From<&ManagerSettings> for SettingsPayload {
    fn from(settings: &ManagerSettings) -> Self {
        Self {
            api_base_url: settings.api_base_url.clone(),
            download_dir: settings
                .download_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            download_behavior: settings.download_behavior,
            effective_download_dir: Some(
                settings.effective_download_dir().to_string_lossy().to_string(),
            ),
        }
    }
}

impl SettingsPayload {
    fn into_settings(self) -> ManagerSettings {
        ManagerSettings {
            api_base_url: self.api_base_url.filter(|s| !s.trim().is_empty()),
            download_dir: self
                .download_dir
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            download_behavior: self.download_behavior,
        }
    }
}

fn list_view(state: &AppState, list: &ListState, query: &TrainQuery) -> TrainListView {
    match list {
        ListState::Loading => TrainListView::Loading,
        ListState::Failed(error) => TrainListView::Failed {
            error: error.clone(),
        },
        ListState::Ready(_) => TrainListView::Ready {
            cards: state.train_list.cards(&state.image_base(), query),
        },
    }
}

// ── Train list ──────────────────────────────────────────

#[tauri::command]
pub async fn fetch_train_list(state: SharedState<'_>) -> Result<TrainListView, ManagerError> {
    let list = refresh_train_list(state.inner()).await;
    let state = state.lock().await;
    Ok(list_view(&state, &list, &TrainQuery::default()))
}

#[tauri::command]
pub async fn search_trains(
    state: SharedState<'_>,
    query: TrainQuery,
) -> Result<TrainListView, ManagerError> {
    let state = state.lock().await;
    let list = state.train_list.state().clone();
    Ok(list_view(&state, &list, &query))
}

#[tauri::command]
pub fn report_image_error(url: String) {
    warn!("panel image load failed: {}", url);
}

// ── Selection / detail panel ────────────────────────────

#[tauri::command]
pub async fn select_train(state: SharedState<'_>, id: u64) -> Result<TrainDetail, ManagerError> {
    let mut state = state.lock().await;
    state.select_train(id)
}

#[tauri::command]
pub async fn set_panel_open(state: SharedState<'_>, open: bool) -> Result<(), ManagerError> {
    let mut state = state.lock().await;
    state.selection.set_panel_open(open);
    Ok(())
}

#[tauri::command]
pub async fn get_selected_detail(state: SharedState<'_>) -> Result<SelectionView, ManagerError> {
    let state = state.lock().await;
    Ok(SelectionView {
        panel_open: state.selection.panel_open(),
        detail: state.selection.detail(&state.image_base()),
    })
}

#[tauri::command]
pub async fn choose_version(
    state: SharedState<'_>,
    version: String,
) -> Result<TrainDetail, ManagerError> {
    let mut state = state.lock().await;
    state.selection.choose_version(&version)?;
    state.selected_detail()
}

// ── Download + terms gate ───────────────────────────────

#[tauri::command]
pub async fn request_download(
    app: AppHandle,
    state: SharedState<'_>,
) -> Result<DownloadOutcome, ManagerError> {
    let decision = {
        let mut guard = state.lock().await;
        guard.request_download()?
    };

    match decision {
        GateDecision::Proceed(request) => perform_download(&app, state.inner(), request).await,
        GateDecision::AwaitingConsent => {
            let guard = state.lock().await;
            let prompt = guard.terms.prompt().cloned().ok_or(ManagerError::NoPendingTerms)?;
            Ok(DownloadOutcome::TermsRequired { prompt })
        }
    }
}

#[tauri::command]
pub async fn set_terms_agreed(
    state: SharedState<'_>,
    agreed: bool,
) -> Result<TermsPrompt, ManagerError> {
    let mut state = state.lock().await;
    state.terms.set_agreed(agreed)?;
    state.terms.prompt().cloned().ok_or(ManagerError::NoPendingTerms)
}

#[tauri::command]
pub async fn confirm_terms(
    app: AppHandle,
    state: SharedState<'_>,
) -> Result<DownloadOutcome, ManagerError> {
    let request = {
        let mut guard = state.lock().await;
        guard.terms.confirm()?
    };
    perform_download(&app, state.inner(), request).await
}

#[tauri::command]
pub async fn dismiss_terms(state: SharedState<'_>) -> Result<(), ManagerError> {
    let mut state = state.lock().await;
    state.terms.dismiss();
    Ok(())
}

async fn perform_download(
    app: &AppHandle,
    shared: &Arc<Mutex<AppState>>,
    request: DownloadRequest,
) -> Result<DownloadOutcome, ManagerError> {
    let (behavior, downloader, dir) = {
        let state = shared.lock().await;
        (
            state.settings.download_behavior,
            state.downloader.clone(),
            state.settings.effective_download_dir(),
        )
    };

    match behavior {
        DownloadBehavior::OpenInBrowser => {
            info!("Opening download for {} in browser", request.train_name);
            app.opener()
                .open_url(&request.url, None::<&str>)
                .map_err(|e| ManagerError::Other(format!("Failed to open browser: {e}")))?;
            Ok(DownloadOutcome::Opened { url: request.url })
        }
        DownloadBehavior::SaveToDirectory => {
            let path = downloader
                .download_to(&request.url, &dir, &request.filename, |p: &DownloadProgress| {
                    let _ = app.emit(DOWNLOAD_PROGRESS_EVENT, p.clone());
                })
                .await?;
            Ok(DownloadOutcome::Saved {
                path: path.to_string_lossy().to_string(),
            })
        }
    }
}

// ── Settings ────────────────────────────────────────────

#[tauri::command]
pub async fn get_settings(state: SharedState<'_>) -> Result<SettingsPayload, ManagerError> {
    let state = state.lock().await;
    Ok(SettingsPayload::from(&state.settings))
}

#[tauri::command]
pub async fn update_settings(
    state: SharedState<'_>,
    payload: SettingsPayload,
) -> Result<SettingsPayload, ManagerError> {
    let mut state = state.lock().await;
    state.update_settings(payload.into_settings())?;
    Ok(SettingsPayload::from(&state.settings))
}
