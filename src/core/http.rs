use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::Client;

pub const APP_USER_AGENT: &str = concat!("RtmAddonManager/", env!("CARGO_PKG_VERSION"));

/// Shared client for the catalog API and asset downloads.
///
/// Responses are never cached: every list fetch must reflect the server.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}
