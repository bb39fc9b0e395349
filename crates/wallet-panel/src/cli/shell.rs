//! Interactive panel.
//!
//! Each line is one command acting on the panel; the field it changed is
//! printed afterwards. Ctrl+C or EOF leaves the loop.

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::output::{print_error, print_field, print_value};
use super::{GlobalOpts, ShellPanel};

const HELP: &[(&str, &str)] = &[
    ("create", "generate a new wallet"),
    ("import <24 words>", "import a TON mnemonic"),
    ("import-lenient <24 words>", "import without the TON seed check"),
    ("import-key <hex>", "import a secret key (seed or seed||public)"),
    ("watch <pubkey-hex>", "track a wallet without its secret key"),
    ("login <chain.json>", "log in with a delegation file"),
    ("check", "show the current session"),
    ("logout", "drop the current session"),
    ("balance", "query the backend for the balance"),
    ("transactions", "query the backend for transactions"),
    ("dest <address>", "set the transfer destination"),
    ("send [address]", "send to the destination"),
    ("show", "print every field"),
    ("help", "this list"),
    ("quit", "leave"),
];

enum Flow {
    Continue,
    Quit,
}

pub async fn run(panel: &mut ShellPanel, opts: &GlobalOpts) -> Result<()> {
    if !opts.json {
        print_banner(panel);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        if !opts.json {
            let label = panel
                .identity()
                .map(|i| truncate(&i.address_text, 8))
                .unwrap_or_else(|| "(no wallet)".dimmed().to_string());
            eprint!("{} > ", label);
        }

        let line = tokio::select! {
            result = lines.next_line() => match result {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    print_error(&format!("failed to read input: {e}"), opts.json);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if !opts.json {
                    println!();
                }
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Flow::Quit = handle_command(trimmed, panel, opts).await {
            break;
        }
    }

    if !opts.json {
        println!("{}", "Goodbye.".dimmed());
    }
    Ok(())
}

async fn handle_command(input: &str, panel: &mut ShellPanel, opts: &GlobalOpts) -> Flow {
    let (cmd, arg) = input
        .split_once(char::is_whitespace)
        .map(|(c, a)| (c, a.trim()))
        .unwrap_or((input, ""));
    let json = opts.json;

    match cmd {
        "quit" | "exit" | "q" => return Flow::Quit,

        "create" => print_field("identity", panel.create_wallet(), json),

        "import" | "import-lenient" => {
            if arg.is_empty() {
                print_error("usage: import <24 words>", json);
            } else {
                let strict = cmd == "import";
                print_field("identity", panel.import_mnemonic(arg, strict), json);
            }
        }

        "import-key" => {
            if arg.is_empty() {
                print_error("usage: import-key <hex>", json);
            } else {
                print_field("identity", panel.import_secret_key(arg), json);
            }
        }

        "watch" => {
            if arg.is_empty() {
                print_error("usage: watch <pubkey-hex>", json);
            } else {
                print_field("identity", panel.watch_address(arg), json);
            }
        }

        "login" => {
            if arg.is_empty() {
                print_error("usage: login <chain.json>", json);
            } else {
                panel.provider_mut().set_path(arg);
                print_field("identity", panel.login().await, json);
            }
        }

        "check" => print_field("identity", panel.check_identity(), json),

        "logout" => print_field("identity", panel.logout(), json),

        "balance" => print_field("balance", panel.get_balance().await, json),

        "transactions" => print_field("transactions", panel.get_transactions().await, json),

        "dest" => {
            if arg.is_empty() {
                print_field("destination", &panel.view().destination, json);
            } else {
                panel.set_destination(arg);
                print_field("destination", arg, json);
            }
        }

        "send" => {
            if !arg.is_empty() {
                panel.set_destination(arg);
            }
            print_field("send", panel.send_ton().await, json);
        }

        "show" => {
            if json {
                print_value(panel.view(), true);
            } else {
                let view = panel.view();
                print_field("identity", &view.identity, false);
                print_field("balance", &view.balance, false);
                print_field("transactions", &view.transactions, false);
                print_field("destination", &view.destination, false);
                print_field("send", &view.send, false);
            }
        }

        "help" => {
            if !json {
                for (usage, text) in HELP {
                    println!("  {:<28} {}", usage.bold(), text);
                }
            }
        }

        _ => print_error(&format!("unknown command '{cmd}', type help"), json),
    }

    Flow::Continue
}

fn print_banner(panel: &ShellPanel) {
    let config = panel.config();
    println!("\n{}", "TON Wallet Panel".bright_cyan().bold());
    println!("  Backend:     {}", config.backend_url);
    println!("  RPC:         {}", config.rpc_endpoint);
    println!("  Identity:    {}", config.identity_provider_url);
    println!("  Destination: {}", panel.view().destination);
    println!("Type {} for commands.\n", "help".bold());
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max + 3 {
        format!("{}...", &s[..max])
    } else {
        s.to_string()
    }
}
