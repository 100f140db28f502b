mod common;

use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::Mutex;

use common::{direct_client, serve, Route};
use rtm_addon_manager_lib::core::catalog::{ListState, TrainApi, TrainQuery};
use rtm_addon_manager_lib::core::downloader::Downloader;
use rtm_addon_manager_lib::core::error::ManagerError;
use rtm_addon_manager_lib::core::state::{refresh_train_list, AppState, GateDecision};

const TRAIN_LIST: &str = r#"[
    {
        "id": 1,
        "name": "E231系",
        "header_image_path": "/public_html/images/e231.png",
        "ver": "1.0/1.1",
        "download_link": "DL_A|DL_B",
        "area_kanto": 1,
        "ATS": "1"
    },
    {
        "id": "2",
        "name": "キハ40",
        "header_image_path": null,
        "ver": "2.0",
        "download_link": "DL_C",
        "terms": "再配布禁止\n改造自由",
        "area_tohoku": true
    },
    {
        "id": 3,
        "name": "EF65",
        "ver": "1.0"
    }
]"#;

fn app_state(base: &str, temp: &TempDir) -> Arc<Mutex<AppState>> {
    Arc::new(Mutex::new(AppState::with_client(
        temp.path().to_path_buf(),
        Some(base.to_string()),
        direct_client(),
    )))
}

#[tokio::test]
async fn fetch_train_list_parses_records() {
    let base = serve(vec![Route::json("/TrainList.php", TRAIN_LIST)]).await;
    let api = TrainApi::new(direct_client(), format!("{base}/"));

    let trains = api.fetch_train_list().await.unwrap();
    assert_eq!(trains.len(), 3);
    assert_eq!(trains[1].id, 2);
    assert!(trains[0].ats);
    assert!(trains[1].area_tohoku);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = serve(vec![Route::status("/TrainList.php", "503 Service Unavailable")]).await;
    let api = TrainApi::new(direct_client(), base);

    match api.fetch_train_list().await {
        Err(ManagerError::ApiStatus { status, reason }) => {
            assert_eq!(status, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("expected ApiStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let base = serve(vec![Route::json("/TrainList.php", "{\"not\":\"a list\"}")]).await;
    let api = TrainApi::new(direct_client(), base);
    assert!(matches!(
        api.fetch_train_list().await,
        Err(ManagerError::Json(_))
    ));
}

#[tokio::test]
async fn refresh_populates_list_and_cards() {
    let temp = TempDir::new().unwrap();
    let base = serve(vec![Route::json("/TrainList.php", TRAIN_LIST)]).await;
    let state = app_state(&base, &temp);

    let list = refresh_train_list(&state).await;
    assert!(matches!(list, ListState::Ready(ref t) if t.len() == 3));

    let guard = state.lock().await;
    let cards = guard
        .train_list
        .cards(&guard.image_base(), &TrainQuery::text("e231"));
    assert_eq!(cards.len(), 1);
    assert_eq!(
        cards[0].image_url.as_deref(),
        Some(format!("{base}/images/e231.png").as_str())
    );
}

#[tokio::test]
async fn refresh_failure_shows_single_error() {
    let temp = TempDir::new().unwrap();
    let base = serve(Vec::new()).await;
    let state = app_state(&base, &temp);

    let list = refresh_train_list(&state).await;
    assert_eq!(
        list,
        ListState::Failed("TrainList request failed: 404 Not Found".to_string())
    );
}

#[tokio::test]
async fn download_without_terms_proceeds_and_resolves_version() {
    let temp = TempDir::new().unwrap();
    let base = serve(vec![Route::json("/TrainList.php", TRAIN_LIST)]).await;
    let state = app_state(&base, &temp);
    refresh_train_list(&state).await;

    let mut guard = state.lock().await;
    let detail = guard.select_train(1).unwrap();
    assert_eq!(detail.current_version.as_deref(), Some("1.0"));
    assert!(guard.selection.panel_open());

    guard.selection.choose_version("1.1").unwrap();
    match guard.request_download().unwrap() {
        GateDecision::Proceed(request) => {
            assert_eq!(request.url, "DL_B");
            assert_eq!(request.filename, "E231系-1.1.zip");
        }
        GateDecision::AwaitingConsent => panic!("no terms on this train"),
    }
}

#[tokio::test]
async fn download_with_terms_waits_for_acknowledgment() {
    let temp = TempDir::new().unwrap();
    let base = serve(vec![Route::json("/TrainList.php", TRAIN_LIST)]).await;
    let state = app_state(&base, &temp);
    refresh_train_list(&state).await;

    let mut guard = state.lock().await;
    guard.select_train(2).unwrap();
    assert_eq!(
        guard.request_download().unwrap(),
        GateDecision::AwaitingConsent
    );
    assert_eq!(
        guard.terms.prompt().map(|p| p.body.as_str()),
        Some("再配布禁止\n改造自由")
    );
    assert!(matches!(
        guard.terms.confirm(),
        Err(ManagerError::TermsNotAccepted)
    ));

    guard.terms.set_agreed(true).unwrap();
    let request = guard.terms.confirm().unwrap();
    assert_eq!(request.url, "DL_C");
}

#[tokio::test]
async fn train_without_links_cannot_download() {
    let temp = TempDir::new().unwrap();
    let base = serve(vec![Route::json("/TrainList.php", TRAIN_LIST)]).await;
    let state = app_state(&base, &temp);
    refresh_train_list(&state).await;

    let mut guard = state.lock().await;
    let detail = guard.select_train(3).unwrap();
    assert!(!detail.download_available);
    assert!(matches!(
        guard.request_download(),
        Err(ManagerError::DownloadUnavailable(_))
    ));
    assert!(matches!(
        guard.select_train(99),
        Err(ManagerError::TrainNotFound(99))
    ));
}

#[tokio::test]
async fn downloader_streams_file_under_sanitized_name() {
    let temp = TempDir::new().unwrap();
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let base = serve(vec![Route::bytes("/files/e231.zip", payload.clone())]).await;

    let downloader = Downloader::new(direct_client());
    let mut last_seen = 0;
    let path = downloader
        .download_to(
            &format!("{base}/files/e231.zip"),
            &temp.path().join("out"),
            "E231/E233系-1.0.zip",
            |p| last_seen = p.bytes_downloaded,
        )
        .await
        .unwrap();

    assert_eq!(path, temp.path().join("out").join("E231_E233系-1.0.zip"));
    assert_eq!(std::fs::read(&path).unwrap(), payload);
    assert_eq!(last_seen, payload.len() as u64);
    assert!(!temp.path().join("out").join("E231_E233系-1.0.zip.part").exists());
}

#[tokio::test]
async fn downloader_reports_http_status() {
    let temp = TempDir::new().unwrap();
    let base = serve(Vec::new()).await;
    let downloader = Downloader::new(direct_client());

    let err = downloader
        .download_to(&format!("{base}/missing.zip"), temp.path(), "x.zip", |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::DownloadFailed { status: 404, .. }));
    assert!(!temp.path().join("x.zip").exists());
}

#[tokio::test]
async fn interrupted_download_leaves_no_partial_file() {
    let temp = TempDir::new().unwrap();
    let base = serve(vec![Route::truncated(
        "/files/cut.zip",
        vec![7u8; 5_000],
        100_000,
    )])
    .await;
    let downloader = Downloader::new(direct_client());
    let out = temp.path().join("out");

    let result = downloader
        .download_to(&format!("{base}/files/cut.zip"), &out, "cut.zip", |_| {})
        .await;

    assert!(result.is_err());
    assert!(!out.join("cut.zip.part").exists());
    assert!(!out.join("cut.zip").exists());
}
