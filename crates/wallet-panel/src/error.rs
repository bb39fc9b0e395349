//! Error types for wallet-panel

use thiserror::Error;

/// Panel error type
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("{0}")]
    Wallet(#[from] ton_wallet::WalletError),

    #[error("{0}")]
    Identity(#[from] icp_identity::IdentityError),

    #[error("{0}")]
    Rpc(#[from] ton_http::RpcError),

    #[error("{0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    BackendStatus { status: u16, body: String },

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("no wallet loaded")]
    NoWallet,

    #[error("no secret key (watch-only wallet)")]
    NoSecretKey,

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Result type alias
pub type PanelResult<T> = Result<T, PanelError>;
