//! Chain access seam and the toncenter implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{RpcError, RpcResult};
use crate::types::{AccountState, Envelope, GetMethodResult, JsonRpcRequest};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the toncenter API key.
const API_KEY_HEADER: &str = "X-API-Key";

/// Read and write access to the TON chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Balance and lifecycle state of `address`.
    async fn account_state(&self, address: &str) -> RpcResult<AccountState>;

    /// Run a get-method with an empty stack.
    async fn run_get_method(&self, address: &str, method: &str) -> RpcResult<GetMethodResult>;

    /// Submit a base64-encoded BoC.
    async fn send_boc(&self, boc: &str) -> RpcResult<()>;

    /// Current wallet seqno via the `seqno` get-method.
    async fn get_seqno(&self, address: &str) -> RpcResult<u32> {
        let result = self.run_get_method(address, "seqno").await?;
        if result.exit_code != 0 {
            return Err(RpcError::ExitCode {
                method: "seqno".to_string(),
                exit_code: result.exit_code,
            });
        }
        result
            .stack
            .first()
            .and_then(|entry| entry.as_i128())
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| RpcError::InvalidResponse("seqno is not a u32".to_string()))
    }
}

/// toncenter v2 JSON-RPC client.
#[derive(Clone)]
pub struct TonCenterClient {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl TonCenterClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> RpcResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let request = JsonRpcRequest {
            id: 1,
            jsonrpc: "2.0",
            method,
            params,
        };
        debug!(method, endpoint = %self.endpoint, "json-rpc call");

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Envelope>(&body) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if !status.is_success() => {
                warn!(method, status = status.as_u16(), "json-rpc call failed");
                Err(RpcError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ChainClient for TonCenterClient {
    async fn account_state(&self, address: &str) -> RpcResult<AccountState> {
        let result = self
            .call("getAddressInformation", json!({ "address": address }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn run_get_method(&self, address: &str, method: &str) -> RpcResult<GetMethodResult> {
        let result = self
            .call(
                "runGetMethod",
                json!({ "address": address, "method": method, "stack": [] }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn send_boc(&self, boc: &str) -> RpcResult<()> {
        self.call("sendBoc", json!({ "boc": boc })).await?;
        Ok(())
    }
}
