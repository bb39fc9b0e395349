//! TON wallet panel with Internet Computer identity login
//!
//! - `WalletPanel`: create/import a wallet, log in, query balance and
//!   transactions, send a transfer
//! - `BackendProxy`: the backend's `token/*` routes
//! - `PanelConfig`: TOML file, environment and flag overrides
//! - `init_logging`: tracing subscriber for the binary

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod panel;

// Re-exports
pub use backend::{BALANCE_ROUTE, Backend, BackendProxy, TRANSACTIONS_ROUTE};
pub use config::{ConfigError, LogFormat, PanelConfig, ValidationError};
pub use error::{PanelError, PanelResult};
pub use format::{NANOTONS_PER_TON, balance_from_response, format_nanotons, parse_ton};
pub use logging::init_logging;
pub use panel::{
    CHECKING, IdentitySource, LOADING, LOGGING_IN, NO_SESSION, PLACEHOLDER, PanelView, SESSION_DROPPED,
    WalletIdentity, WalletPanel,
};
