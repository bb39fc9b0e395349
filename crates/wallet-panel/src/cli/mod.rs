//! Command-line interface.

pub mod output;
pub mod shell;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use icp_identity::DelegationFileProvider;
use ton_http::TonCenterClient;
use wallet_panel::{BackendProxy, PanelConfig, WalletPanel, parse_ton};

/// Panel wired to the real backend, toncenter and a delegation file.
pub type ShellPanel = WalletPanel<BackendProxy, TonCenterClient, DelegationFileProvider>;

/// TON wallet panel with Internet Computer identity login.
#[derive(Parser)]
#[command(name = "wallet-panel", version, about)]
pub struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file.
    #[arg(long, global = true, env = "WALLET_PANEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend proxy base URL.
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// toncenter v2 JSON-RPC endpoint.
    #[arg(long, global = true)]
    pub rpc_endpoint: Option<String>,

    /// Amount to send, in TON (for example 0.001).
    #[arg(long, global = true)]
    pub amount: Option<String>,

    /// Render addresses in their testnet form.
    #[arg(long, global = true)]
    pub testnet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive panel (default).
    Shell,
    /// Generate a wallet and print it.
    Create,
    /// Print the V4R2 wallet address of a public key.
    Address {
        /// Ed25519 public key, hex.
        pubkey: String,
    },
}

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
}

/// Load `.env` (or `env_file`), then parse `args`, so flags backed by
/// environment variables see values from the file.
pub fn load_cli<I, T>(env_file: Option<&Path>, args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    // A missing .env file is fine.
    let _ = match env_file {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    Cli::parse_from(args)
}

/// File, then environment, then flags; validated.
pub fn build_config(cli: &Cli) -> Result<PanelConfig> {
    let mut config = PanelConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_process_env();

    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(endpoint) = &cli.rpc_endpoint {
        config.rpc_endpoint = endpoint.clone();
    }
    if let Some(amount) = &cli.amount {
        let nanotons = parse_ton(amount).ok_or_else(|| anyhow!("invalid TON amount: {amount}"))?;
        config.transfer_amount =
            u64::try_from(nanotons).map_err(|_| anyhow!("amount too large: {amount}"))?;
    }
    if cli.testnet {
        config.testnet = true;
    }

    config.validate()?;
    Ok(config)
}

/// Build the panel. No network traffic happens here.
pub fn build_panel(config: PanelConfig) -> Result<ShellPanel> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let backend =
        BackendProxy::new(config.backend_url.clone(), timeout).context("building backend client")?;
    let chain = TonCenterClient::new(config.rpc_endpoint.clone(), config.rpc_api_key.clone(), timeout)
        .context("building JSON-RPC client")?;
    let provider = DelegationFileProvider::new("delegation.json");
    Ok(WalletPanel::new(config, backend, chain, provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_file_feeds_config_flag() {
        let mut env_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(env_file, "WALLET_PANEL_CONFIG=/etc/wallet-panel/from-env.toml").unwrap();

        let cli = load_cli(Some(env_file.path()), ["wallet-panel", "create"]);
        assert_eq!(
            cli.config.as_deref(),
            Some(Path::new("/etc/wallet-panel/from-env.toml"))
        );
        assert!(matches!(cli.command, Some(Commands::Create)));
    }
}
