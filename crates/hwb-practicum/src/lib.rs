//! Practicum adapter (homework statuses).
//!
//! Implements the `hwb-core` HomeworkApi port over the `homework_statuses`
//! endpoint with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::Value;

use hwb_core::{api::HomeworkApi, config::Config, errors::Error, Result};

#[derive(Clone, Debug)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.endpoint, &cfg.practicum_token, cfg.http_timeout)
    }

    /// Issue the request; `Error::Transport` and `Error::Decode` are mapped to
    /// an absent answer by the port impl.
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request to {} failed: {e}", self.endpoint)))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Protocol {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(format!("reading response body failed: {e}")))?;

        serde_json::from_str(&body).map_err(|e| {
            Error::Decode(format!(
                "response is not JSON ({e}): {}",
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn homework_statuses(&self, from_date: i64) -> Result<Option<Value>> {
        match self.fetch(from_date).await {
            Ok(v) => Ok(Some(v)),
            Err(e @ (Error::Transport(_) | Error::Decode(_))) => {
                tracing::error!("API request failed: {e}");
                Ok(None)
            }
            Err(e) => {
                tracing::error!("API request failed: {e}");
                Err(e)
            }
        }
    }
}
