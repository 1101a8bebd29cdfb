//! HTTP client for the remote inventory service.
//!
//! [`HttpBackend`] implements [`InventoryBackend`] over the service's JSON
//! API and adds the operations only the CLI needs: backup export/restore
//! and retrieval-augmented questions.
//!
//! # Retry Strategy
//!
//! Idempotent reads (`GET`) are retried on transient failures:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 250ms, 500ms, 1s, 2s, 4s (capped)
//!
//! Deletes, restores, backups, and questions are sent once.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use stockroom_core::backend::InventoryBackend;
use stockroom_core::models::{decode_items, Item, Shelf};

use crate::config::ServiceConfig;

/// reqwest-backed inventory service client.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ServiceConfig,
}

/// Answer from `POST /api/rag/query`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AskResponse {
    pub answer: String,
    /// Items the service cited. Passed through unparsed.
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ItemsEnvelope {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl HttpBackend {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// GET a JSON document, retrying transient failures.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path);
        let mut last_err = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(250 << (attempt - 1).min(4));
                tracing::warn!(%url, attempt, ?delay, "retrying request");
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(%url, "GET");
            match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .with_context(|| format!("Invalid response from {}", url));
                    }

                    let err = service_error(response).await;
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(anyhow!(e).context(format!("Request to {} failed", url)));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Request to {} failed after retries", url)))
    }

    /// Downloads a backup archive (zip bytes) of the whole inventory.
    pub async fn export_backup(&self) -> Result<Vec<u8>> {
        let url = self.config.endpoint("/api/data/backup");
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let response = ensure_success(response).await?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read backup archive")?;
        Ok(bytes.to_vec())
    }

    /// Uploads a backup archive, replacing all data held by the service.
    /// Returns the service's confirmation message.
    pub async fn restore_backup(&self, file_name: &str, archive: Vec<u8>) -> Result<String> {
        let url = self.config.endpoint("/api/data/restore");
        let part = reqwest::multipart::Part::bytes(archive)
            .file_name(file_name.to_string())
            .mime_str("application/zip")?;
        let form = reqwest::multipart::Form::new().part("backup", part);

        tracing::debug!(%url, "POST multipart");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let response = ensure_success(response).await?;
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        Ok(body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Backup restored")
            .to_string())
    }

    /// Asks the service's retrieval-augmented question endpoint.
    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let url = self.config.endpoint("/api/rag/query");
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "query": question }))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let response = ensure_success(response).await?;
        response
            .json::<AskResponse>()
            .await
            .with_context(|| format!("Invalid response from {}", url))
    }
}

#[async_trait]
impl InventoryBackend for HttpBackend {
    async fn fetch_items(&self) -> Result<Vec<Item>> {
        let envelope: ItemsEnvelope = self.get_json("/api/inventory/items").await?;
        Ok(decode_items(envelope.items))
    }

    async fn delete_item(&self, id: i64) -> Result<()> {
        let url = self.config.endpoint(&format!("/api/inventory/items/{}", id));
        tracing::debug!(%url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_storage(&self) -> Result<Vec<Shelf>> {
        self.get_json("/api/storage/level1").await
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(service_error(response).await)
    }
}

/// Builds an error from a non-success response, preferring the service's
/// own `error` or `message` field over the raw body.
async fn service_error(response: Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match error_message(&body) {
        Some(msg) => anyhow!("{} ({})", msg, status),
        None if body.trim().is_empty() => anyhow!("Service returned {}", status),
        None => anyhow!("Service returned {}: {}", status, body.trim()),
    }
}

fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
