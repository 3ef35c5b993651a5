//! Remote manifests served over HTTP(S).

use std::time::Duration;

use reqwest::Client;

use crate::error::LoadError;

pub fn is_remote(src: &str) -> bool {
    let src = src.trim_start();
    src.starts_with("https://") || src.starts_with("http://")
}

/// Fetches the manifest text at `url`. Non-success statuses count as network failures.
pub async fn fetch(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LoadError::network(url, e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LoadError::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::network(url, format!("status {status}")));
    }

    response.text().await.map_err(|e| LoadError::network(url, e))
}
