// ─── Train List API ───
// Single read-only endpoint: GET {base}/TrainList.php -> [Train].

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info};

use super::model::Train;
use crate::core::error::{ManagerError, ManagerResult};

const TRAIN_LIST_ENDPOINT: &str = "TrainList.php";

/// Anything that can produce the train catalog.
#[async_trait]
pub trait TrainSource: Send + Sync {
    async fn fetch_trains(&self) -> ManagerResult<Vec<Train>>;
}

/// HTTP client for the catalog API.
#[derive(Debug, Clone)]
pub struct TrainApi {
    client: Client,
    base_url: String,
}

impl TrainApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            TRAIN_LIST_ENDPOINT
        )
    }

    /// Fetch the full list. No retry, no pagination.
    pub async fn fetch_train_list(&self) -> ManagerResult<Vec<Train>> {
        let url = self.list_url();
        info!("Fetching train list from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::ApiStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;
        let trains: Vec<Train> = serde_json::from_slice(&body)?;

        debug!("Loaded {} trains", trains.len());
        Ok(trains)
    }
}

#[async_trait]
impl TrainSource for TrainApi {
    async fn fetch_trains(&self) -> ManagerResult<Vec<Train>> {
        self.fetch_train_list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_url_tolerates_trailing_slash() {
        let client = Client::new();
        assert_eq!(
            TrainApi::new(client.clone(), "https://rtm.example.jp/api/").list_url(),
            "https://rtm.example.jp/api/TrainList.php"
        );
        assert_eq!(
            TrainApi::new(client, "https://rtm.example.jp").list_url(),
            "https://rtm.example.jp/TrainList.php"
        );
    }
}
