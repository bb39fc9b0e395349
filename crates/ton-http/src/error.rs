//! Error types for ton-http

use thiserror::Error;

/// JSON-RPC client error type
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error{}: {message}", code.map(|c| format!(" {c}")).unwrap_or_default())]
    Api { code: Option<i64>, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Get-method {method} failed with exit code {exit_code}")]
    ExitCode { method: String, exit_code: i64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type RpcResult<T> = Result<T, RpcError>;
