//! TON JSON-RPC access
//!
//! `ChainClient` is the seam the wallet panel talks to; `TonCenterClient`
//! implements it over the toncenter v2 `jsonRPC` endpoint.

pub mod client;
pub mod error;
pub mod types;

// Re-exports
pub use client::{ChainClient, DEFAULT_TIMEOUT_SECS, TonCenterClient};
pub use error::{RpcError, RpcResult};
pub use types::{AccountState, AccountStatus, GetMethodResult, StackEntry};
