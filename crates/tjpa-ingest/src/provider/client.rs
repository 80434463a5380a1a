//! HTTP client for the unified process lookup service
//!
//! Two lookups are used:
//!
//! 1. `processobycnj/{cnj}` returns the processes registered under a number
//! 2. `movimentacaobyprocesso/{doc}/{instance}` returns one process's history
//!
//! Neither lookup is retried. A number that fails now is simply reported as
//! empty for this run.

use super::endpoints;
use super::types::{MovementEntry, ProcessLookupResponse};
use super::{FetchOutcome, ProcessSource};
use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tjpa_common::{CanonicalIdentifier, Movement, Result, TjpaError};
use tracing::{debug, warn};

/// Client for the court's consilium REST API
pub struct ConsiliumClient {
    client: Client,
    base_url: String,
}

impl ConsiliumClient {
    /// Build a client with the configured timeout and User-Agent.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TjpaError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Movement history of one process.
    ///
    /// Any failure yields an empty history; the owning record is kept.
    pub async fn fetch_movements(&self, doc_code: &str, instance_code: &str) -> Vec<Movement> {
        match self.try_fetch_movements(doc_code, instance_code).await {
            Ok(movements) => movements,
            Err(reason) => {
                warn!(
                    doc_code,
                    instance_code,
                    reason = %reason,
                    "Movement lookup failed, keeping process without movements"
                );
                Vec::new()
            },
        }
    }

    async fn try_fetch_movements(
        &self,
        doc_code: &str,
        instance_code: &str,
    ) -> std::result::Result<Vec<Movement>, String> {
        let url = endpoints::movements_url(&self.base_url, doc_code, instance_code);

        let response = self.client.get(&url).send().await.map_err(|e| e.to_string())?;
        if response.status() != StatusCode::OK {
            return Err(format!("status {}", response.status()));
        }

        let entries: Vec<MovementEntry> = response.json().await.map_err(|e| e.to_string())?;
        Ok(entries.iter().map(MovementEntry::to_movement).collect())
    }
}

#[async_trait]
impl ProcessSource for ConsiliumClient {
    async fn fetch_process_data(&self, identifier: &CanonicalIdentifier) -> FetchOutcome {
        let url = endpoints::process_by_cnj_url(&self.base_url, identifier.as_str());

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Transport(e.to_string()),
        };

        if response.status() != StatusCode::OK {
            debug!(identifier = %identifier, status = %response.status(), "Lookup returned no process");
            return FetchOutcome::NotFound;
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            debug!(identifier = %identifier, "Lookup answered with a non-JSON document");
            return FetchOutcome::NotFound;
        }

        let body: ProcessLookupResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Transport(format!("unreadable lookup body: {}", e)),
        };

        let mut records = Vec::with_capacity(body.lista_processos.len());
        for entry in body.lista_processos {
            let movements = match entry.movement_key() {
                Some((doc_code, instance_code)) => {
                    self.fetch_movements(&doc_code, &instance_code).await
                },
                None => Vec::new(),
            };
            records.push(entry.into_record(movements));
        }

        FetchOutcome::Found(records)
    }
}
