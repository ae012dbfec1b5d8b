use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{
    ClashFetcher,
    error::{CodinGameError, FetchResult},
};
use crate::state::clash::Game;

const FIND_CLASH_PATH: &str = "services/ClashOfCode/findClashByHandle";

/// Connection settings for the CodinGame API.
#[derive(Debug, Clone)]
pub struct CodinGameConfig {
    /// API root, e.g. `https://www.codingame.com`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CodinGameConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.codingame.com".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// [`ClashFetcher`] backed by the public CodinGame API.
#[derive(Clone)]
pub struct CodinGameClient {
    client: Client,
    endpoint: Arc<str>,
}

impl CodinGameClient {
    /// Build a client; every request is bounded by the configured timeout.
    pub fn new(config: CodinGameConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| CodinGameError::ClientBuilder { source })?;
        let endpoint = format!("{}/{}", config.base_url.trim_end_matches('/'), FIND_CLASH_PATH);

        Ok(Self {
            client,
            endpoint: Arc::from(endpoint),
        })
    }

    async fn find_clash(&self, handle: String) -> FetchResult<Option<Game>> {
        let response = self
            .client
            .post(self.endpoint.as_ref())
            .json(&[handle.as_str()])
            .send()
            .await
            .map_err(|source| CodinGameError::RequestSend {
                handle: handle.clone(),
                source,
            })?;

        let status = response.status();
        if is_not_found(status) {
            debug!(%handle, %status, "clash not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CodinGameError::RequestStatus { handle, status });
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|source| CodinGameError::DecodeResponse {
                handle: handle.clone(),
                source,
            })?;

        hydrate_payload(handle, payload)
    }
}

impl ClashFetcher for CodinGameClient {
    fn fetch(&self, handle: &str) -> BoxFuture<'static, FetchResult<Option<Game>>> {
        let client = self.clone();
        let handle = handle.to_owned();
        Box::pin(async move { client.find_clash(handle).await })
    }
}

/// CodinGame reports unknown handles with 404 or with a 422 business error.
fn is_not_found(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY
    )
}

fn hydrate_payload(handle: String, payload: Value) -> FetchResult<Option<Game>> {
    if payload.is_null() {
        return Ok(None);
    }

    Game::hydrate(payload)
        .map(Some)
        .map_err(|source| CodinGameError::Malformed { handle, source })
}
