//! wallet-panel binary.

mod cli;

use anyhow::{Context, Result, bail};
use tracing::debug;
use wallet_panel::init_logging;

use crate::cli::{Commands, GlobalOpts, output};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::load_cli(None, std::env::args_os());

    let config = cli::build_config(&cli)?;
    init_logging(&config.log_level, config.log_format).context("installing log subscriber")?;
    debug!(backend = %config.backend_url, rpc = %config.rpc_endpoint, "configuration loaded");

    let opts = GlobalOpts { json: cli.json };
    let mut panel = cli::build_panel(config)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => cli::shell::run(&mut panel, &opts).await,
        Commands::Create => {
            let summary = panel.create_wallet().to_string();
            output::print_field("identity", &summary, opts.json);
            if panel.identity().is_none() {
                bail!("wallet creation failed");
            }
            Ok(())
        }
        Commands::Address { pubkey } => {
            let summary = panel.watch_address(&pubkey).to_string();
            match panel.identity() {
                Some(identity) => {
                    output::print_field("address", &identity.address_text, opts.json);
                    Ok(())
                }
                None => bail!("{summary}"),
            }
        }
    }
}
