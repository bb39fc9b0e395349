//! Panel configuration.
//!
//! Values come from an optional TOML file, then environment variables,
//! then command-line flags. Validation reports every problem at once.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ton_cell::{AddressFlags, MsgAddress};
use url::Url;

/// Environment variable naming the backend proxy base URL.
pub const ENV_BACKEND_URL: &str = "BACKEND_CANISTER_ENDPOINT";
/// Environment variable naming the identity provider URL.
pub const ENV_IDENTITY_PROVIDER_URL: &str = "II_CANISTER_ENDPOINT";
/// Environment variable naming the TON JSON-RPC endpoint.
pub const ENV_RPC_ENDPOINT: &str = "TON_RPC_ENDPOINT";
/// Environment variable holding the JSON-RPC API key.
pub const ENV_RPC_API_KEY: &str = "TON_RPC_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Base URL of the backend proxy; `token/balance` is appended.
    pub backend_url: String,
    pub identity_provider_url: String,
    /// toncenter v2 `jsonRPC` endpoint.
    pub rpc_endpoint: String,
    pub rpc_api_key: Option<String>,
    /// Explorer prefix; the destination address is appended.
    pub explorer_url: String,
    pub workchain: i32,
    /// Flags used when rendering the wallet address.
    pub bounceable: bool,
    pub testnet: bool,
    /// Amount sent by `send_ton`, in nanotons.
    pub transfer_amount: u64,
    /// Comment prefix; the send time in unix milliseconds is appended.
    pub transfer_comment: String,
    pub send_mode: u8,
    pub default_destination: String,
    pub max_time_to_live_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            backend_url: "http://127.0.0.1:8080/".to_string(),
            identity_provider_url: "https://identity.ic0.app".to_string(),
            rpc_endpoint: "https://testnet.toncenter.com/api/v2/jsonRPC".to_string(),
            rpc_api_key: None,
            explorer_url: "https://testnet.tonviewer.com/".to_string(),
            workchain: 0,
            bounceable: false,
            testnet: false,
            transfer_amount: 1_000_000,
            transfer_comment: "Test".to_string(),
            send_mode: ton_wallet::transfer::SEND_MODE_PAY_FEES_SEPARATELY,
            default_destination: "0QDQBpCcv361Q785LZ33ky4fowYlgSYLTEIRTPzHVOaAhsVm".to_string(),
            max_time_to_live_secs: 8 * 60 * 60,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PanelConfig {
    /// Read a TOML file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Defaults, or the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Override fields from variables found by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = lookup(ENV_BACKEND_URL) {
            self.backend_url = v;
        }
        if let Some(v) = lookup(ENV_IDENTITY_PROVIDER_URL) {
            self.identity_provider_url = v;
        }
        if let Some(v) = lookup(ENV_RPC_ENDPOINT) {
            self.rpc_endpoint = v;
        }
        if let Some(v) = lookup(ENV_RPC_API_KEY) {
            self.rpc_api_key = Some(v);
        }
    }

    /// Override fields from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    pub fn address_flags(&self) -> AddressFlags {
        AddressFlags {
            bounceable: self.bounceable,
            testnet: self.testnet,
        }
    }

    /// Check every field, returning all problems found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: &'static str, message: String| {
            errors.push(ValidationError { field, message });
        };

        for (field, value) in [
            ("backend_url", &self.backend_url),
            ("identity_provider_url", &self.identity_provider_url),
            ("rpc_endpoint", &self.rpc_endpoint),
            ("explorer_url", &self.explorer_url),
        ] {
            if let Err(e) = Url::parse(value) {
                push(field, format!("invalid URL {:?}: {}", value, e));
            }
        }
        if !matches!(self.workchain, 0 | -1) {
            push("workchain", format!("must be 0 or -1, got {}", self.workchain));
        }
        if self.request_timeout_secs == 0 {
            push("request_timeout_secs", "must be greater than 0".to_string());
        }
        if self.max_time_to_live_secs == 0 {
            push("max_time_to_live_secs", "must be greater than 0".to_string());
        }
        if self.transfer_amount == 0 {
            push("transfer_amount", "must be greater than 0".to_string());
        }
        if !self.default_destination.is_empty()
            && let Err(e) = MsgAddress::from_string(&self.default_destination)
        {
            push("default_destination", e.to_string());
        }
        if self.log_level.trim().is_empty() {
            push("log_level", "must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = PanelConfig::default();
        config.validate().unwrap();
        assert_eq!(config.transfer_amount, 1_000_000);
        assert_eq!(config.send_mode, 1);
        assert_eq!(config.max_time_to_live_secs, 28_800);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url = \"https://backend.example/\"").unwrap();
        writeln!(file, "testnet = true").unwrap();
        writeln!(file, "log_format = \"json\"").unwrap();

        let config = PanelConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.backend_url, "https://backend.example/");
        assert!(config.testnet);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.workchain, 0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"x\"").unwrap();
        assert!(matches!(
            PanelConfig::load(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PanelConfig::load(Some(Path::new("/nonexistent/panel.toml"))),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "https://canister.example/"),
            (ENV_RPC_API_KEY, "secret"),
            (ENV_RPC_ENDPOINT, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = PanelConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend_url, "https://canister.example/");
        assert_eq!(config.rpc_api_key.as_deref(), Some("secret"));
        assert_eq!(config.rpc_endpoint, PanelConfig::default().rpc_endpoint);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = PanelConfig {
            backend_url: "not a url".to_string(),
            workchain: 5,
            request_timeout_secs: 0,
            default_destination: "nope".to_string(),
            ..PanelConfig::default()
        };
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["backend_url", "workchain", "request_timeout_secs", "default_destination"]
        );
    }
}
