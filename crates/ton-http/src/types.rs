//! Wire types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{RpcError, RpcResult};

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub id: u32,
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
}

/// `{ok, result}` or `{ok: false, error, code}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

impl Envelope {
    pub fn into_result(self) -> RpcResult<Value> {
        if !self.ok {
            return Err(RpcError::Api {
                code: self.code,
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.result
            .ok_or_else(|| RpcError::InvalidResponse("missing result".to_string()))
    }
}

/// Lifecycle state of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Uninitialized,
    Frozen,
    Other(String),
}

impl AccountStatus {
    fn from_wire(state: &str) -> Self {
        match state {
            "active" => AccountStatus::Active,
            "uninitialized" | "uninit" | "nonexist" => AccountStatus::Uninitialized,
            "frozen" => AccountStatus::Frozen,
            other => AccountStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountState {
    /// Balance in nanotons.
    #[serde(deserialize_with = "de_nanotons")]
    pub balance: u128,
    #[serde(rename = "state", deserialize_with = "de_status")]
    pub status: AccountStatus,
}

impl AccountState {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// One entry of a TVM stack as toncenter renders it, e.g. `["num", "0x1"]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StackEntry(pub String, pub Value);

impl StackEntry {
    /// Interpret a `num` entry (`0x`-prefixed hex, optionally negative).
    pub fn as_i128(&self) -> Option<i128> {
        if self.0 != "num" {
            return None;
        }
        let text = self.1.as_str()?;
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let value = i128::from_str_radix(digits.strip_prefix("0x")?, 16).ok()?;
        Some(if negative { -value } else { value })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetMethodResult {
    #[serde(default)]
    pub stack: Vec<StackEntry>,
    pub exit_code: i64,
    #[serde(default)]
    pub gas_used: Option<u64>,
}

fn de_nanotons<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().map_err(D::Error::custom),
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| D::Error::custom(format!("invalid balance {}", n))),
        other => Err(D::Error::custom(format!("invalid balance {}", other))),
    }
}

fn de_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AccountStatus, D::Error> {
    Ok(AccountStatus::from_wire(&String::deserialize(deserializer)?))
}
