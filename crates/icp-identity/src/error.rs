//! Error types for icp-identity

use thiserror::Error;

/// Identity error type
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("Principal checksum mismatch")]
    PrincipalChecksum,

    #[error("Invalid DER public key: {0}")]
    InvalidDerKey(String),

    #[error("Key error: {0}")]
    Key(#[from] ton_crypto::Ed25519Error),

    #[error("Delegation chain is empty")]
    EmptyDelegationChain,

    #[error("Delegation chain does not end at the session key")]
    SessionKeyMismatch,

    #[error("Delegation expired")]
    DelegationExpired,

    #[error("Invalid delegation signature at index {0}")]
    InvalidDelegationSignature(usize),

    #[error("Authorization pending: delegate to session key {session_key} at {url}, then write the chain to {path}")]
    AuthorizationPending {
        session_key: String,
        url: String,
        path: String,
    },

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;
