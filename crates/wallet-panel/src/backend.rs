//! Backend proxy for balance and transaction queries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::json;
use tracing::debug;

use crate::error::{PanelError, PanelResult};

/// Route for the balance query, relative to the backend base URL.
pub const BALANCE_ROUTE: &str = "token/balance";
/// Route for the transaction history query.
pub const TRANSACTIONS_ROUTE: &str = "token/transactions";

/// Service that answers balance and transaction queries for an address.
///
/// Both calls return the raw response body.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn token_balance(&self, address: &str) -> PanelResult<String>;

    async fn token_transactions(&self, address: &str) -> PanelResult<String>;
}

/// HTTP client for the backend canister's `token/*` routes.
#[derive(Clone)]
pub struct BackendProxy {
    base_url: String,
    http: Client,
}

impl BackendProxy {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PanelResult<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, route: &str, address: &str) -> PanelResult<String> {
        let url = format!("{}{}", self.base_url, route);
        debug!(%url, address, "backend request");

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "address": address }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PanelError::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl Backend for BackendProxy {
    async fn token_balance(&self, address: &str) -> PanelResult<String> {
        self.post(BALANCE_ROUTE, address).await
    }

    async fn token_transactions(&self, address: &str) -> PanelResult<String> {
        self.post(TRANSACTIONS_ROUTE, address).await
    }
}
