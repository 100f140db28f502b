//! Minimal HTTP fixture server for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned response for one request path.
#[derive(Clone)]
pub struct Route {
    pub path: &'static str,
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Advertised `Content-Length` when it differs from the body sent.
    pub declared_len: Option<usize>,
}

impl Route {
    pub fn json(path: &'static str, body: &str) -> Self {
        Self {
            path,
            status: "200 OK",
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
            declared_len: None,
        }
    }

    pub fn bytes(path: &'static str, body: Vec<u8>) -> Self {
        Self {
            path,
            status: "200 OK",
            content_type: "application/zip",
            body,
            declared_len: None,
        }
    }

    /// Advertises `declared_len` bytes but closes after sending `body`.
    pub fn truncated(path: &'static str, body: Vec<u8>, declared_len: usize) -> Self {
        Self {
            declared_len: Some(declared_len),
            ..Self::bytes(path, body)
        }
    }

    pub fn status(path: &'static str, status: &'static str) -> Self {
        Self {
            path,
            status,
            content_type: "text/plain",
            body: Vec::new(),
            declared_len: None,
        }
    }
}

/// Serve `routes` on an ephemeral port; unknown paths get 404.
/// Returns the base URL, e.g. `http://127.0.0.1:41234`.
pub async fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let path = head
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();

                let route = routes
                    .iter()
                    .find(|r| r.path == path)
                    .cloned()
                    .unwrap_or_else(|| Route::status("", "404 Not Found"));

                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    route.status,
                    route.content_type,
                    route.declared_len.unwrap_or(route.body.len())
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(&route.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Client that never routes through an environment proxy.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
