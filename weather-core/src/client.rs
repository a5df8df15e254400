//! HTTP capability the repository is built on.
//!
//! The repository only needs "GET this URL and give me the JSON back", so that is the
//! whole trait. Production code uses [`ReqwestHttpClient`]; tests inject stubs.

use std::{fmt::Debug, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    /// Fetch `url` and parse the body as JSON, whatever the HTTP status.
    async fn get(&self, url: &str) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    http: Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<Value> {
        // Error statuses still carry a JSON body with `cod` and `message`.
        let res = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send request to OpenWeather")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather response body")?;

        serde_json::from_str(&body).with_context(|| {
            format!(
                "Failed to parse OpenWeather JSON (status {}): {}",
                status,
                truncate_body(&body),
            )
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
