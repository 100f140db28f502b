use std::path::PathBuf;
use std::sync::Arc;

use dialoguer::Confirm;
use tokio::sync::Mutex;
use tracing::info;

use rtm_addon_manager_lib::core::catalog::{Feature, ListState, Region, TrainQuery};
use rtm_addon_manager_lib::core::downloader::DownloadRequest;
use rtm_addon_manager_lib::core::error::{ManagerError, ManagerResult};
use rtm_addon_manager_lib::core::state::{
    refresh_train_list, AppState, GateDecision, ManagerSettings,
};

use crate::display;

type Shared = Arc<Mutex<AppState>>;

/// Fetch the catalog; a failed fetch ends the command with its message.
async fn load_catalog(state: &Shared) -> ManagerResult<()> {
    match refresh_train_list(state).await {
        ListState::Ready(_) => Ok(()),
        ListState::Failed(message) => Err(ManagerError::Other(message)),
        ListState::Loading => Err(ManagerError::Other(
            "train list is still loading".to_string(),
        )),
    }
}

pub async fn list(
    state: &Shared,
    search: Option<String>,
    regions: Vec<Region>,
    features: Vec<Feature>,
    json: bool,
) -> ManagerResult<()> {
    load_catalog(state).await?;

    let query = TrainQuery {
        text: search,
        regions,
        features,
    };
    let state = state.lock().await;
    let cards = state.train_list.cards(&state.image_base(), &query);

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        display::cards(&cards);
    }
    Ok(())
}

pub async fn show(
    state: &Shared,
    id: u64,
    version: Option<&str>,
    json: bool,
) -> ManagerResult<()> {
    load_catalog(state).await?;

    let mut state = state.lock().await;
    let mut detail = state.select_train(id)?;
    if let Some(version) = version {
        state.selection.choose_version(version)?;
        detail = state.selected_detail()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        display::detail(&detail);
    }
    Ok(())
}

pub async fn download(
    state: &Shared,
    id: u64,
    version: Option<&str>,
    output: Option<PathBuf>,
    accept_terms: bool,
) -> ManagerResult<()> {
    load_catalog(state).await?;

    let decision = {
        let mut guard = state.lock().await;
        guard.select_train(id)?;
        if let Some(version) = version {
            guard.selection.choose_version(version)?;
        }
        guard.request_download()?
    };

    let request = match decision {
        GateDecision::Proceed(request) => request,
        GateDecision::AwaitingConsent => match accept_via_prompt(state, accept_terms).await? {
            Some(request) => request,
            None => {
                display::warning("Download cancelled: terms of use were not accepted");
                return Ok(());
            }
        },
    };

    let (downloader, dir) = {
        let guard = state.lock().await;
        (
            guard.downloader.clone(),
            output.unwrap_or_else(|| guard.settings.effective_download_dir()),
        )
    };

    let path = downloader
        .download_to(&request.url, &dir, &request.filename, display::progress)
        .await?;
    display::progress_done();
    display::success(&format!("Saved {}", path.display()));
    Ok(())
}

/// Show the terms and ask for the acknowledgment. `None` when declined.
async fn accept_via_prompt(
    state: &Shared,
    accept_terms: bool,
) -> ManagerResult<Option<DownloadRequest>> {
    accept_terms_with(state, move || {
        if accept_terms {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt("同意します (I agree to the terms of use)")
            .default(false)
            .interact()
            .map_err(|e| ManagerError::Other(format!("Prompt failed: {e}")))
    })
    .await
}

/// Resolve the open terms dialog with the answer from `ask`, which runs on a
/// blocking thread while the state lock is released.
async fn accept_terms_with<F>(state: &Shared, ask: F) -> ManagerResult<Option<DownloadRequest>>
where
    F: FnOnce() -> ManagerResult<bool> + Send + 'static,
{
    let prompt = state.lock().await.terms.prompt().cloned();
    if let Some(prompt) = &prompt {
        display::terms(prompt);
    }

    let agreed = tokio::task::spawn_blocking(ask)
        .await
        .map_err(|e| ManagerError::Other(format!("Prompt task failed: {e}")))??;

    let mut guard = state.lock().await;
    if !agreed {
        guard.terms.dismiss();
        return Ok(None);
    }

    guard.terms.set_agreed(true)?;
    let request = guard.terms.confirm()?;
    info!("Terms accepted for {}", request.train_name);
    Ok(Some(request))
}

pub async fn config_show(state: &Shared) -> ManagerResult<()> {
    let state = state.lock().await;
    display::settings(&state.settings, state.api_base().ok().as_deref());
    Ok(())
}

pub async fn config_set_api_base(state: &Shared, url: String) -> ManagerResult<()> {
    let mut state = state.lock().await;
    let settings = ManagerSettings {
        api_base_url: Some(url.trim().to_string()),
        ..state.settings.clone()
    };
    state.update_settings(settings)?;
    display::success("API base URL saved");
    Ok(())
}

pub async fn config_set_download_dir(state: &Shared, dir: PathBuf) -> ManagerResult<()> {
    let mut state = state.lock().await;
    let settings = ManagerSettings {
        download_dir: Some(dir),
        ..state.settings.clone()
    };
    state.update_settings(settings)?;
    display::success("Download directory saved");
    Ok(())
}

pub async fn config_reset(state: &Shared) -> ManagerResult<()> {
    let mut state = state.lock().await;
    state.update_settings(ManagerSettings::default())?;
    display::success("Settings reset");
    Ok(())
}
