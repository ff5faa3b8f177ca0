//! Wallet CLI commands

use clap::Subcommand;

use crate::display::format_wallet_list;
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{Money, WalletKind};
use crate::services::Session;

/// Wallet subcommands
#[derive(Subcommand)]
pub enum WalletCommands {
    /// List all wallets
    List,

    /// Create a new wallet
    Add {
        /// Wallet name
        name: String,
        /// Wallet type (cash, bank, e_wallet, credit_card)
        #[arg(short = 't', long = "type", default_value = "cash")]
        kind: String,
        /// Opening balance (e.g., "1500" or "1,500.00")
        #[arg(short, long)]
        balance: Option<String>,
    },
}

/// Handle a wallet command
pub fn handle_wallet_command(session: &mut Session, cmd: WalletCommands) -> PocketbookResult<()> {
    match cmd {
        WalletCommands::List => {
            let symbol = session.settings().currency_symbol.clone();
            print!(
                "{}",
                format_wallet_list(
                    session.wallets().all(),
                    session.wallets().default_wallet(),
                    &symbol
                )
            );
        }

        WalletCommands::Add {
            name,
            kind,
            balance,
        } => {
            let kind = WalletKind::parse(&kind).ok_or_else(|| {
                PocketbookError::Config(format!(
                    "Invalid wallet type: '{}'. Use cash, bank, e_wallet or credit_card",
                    kind
                ))
            })?;
            let balance = match balance {
                Some(text) => Money::parse(&text).map_err(|e| {
                    PocketbookError::Config(format!("Invalid balance '{}': {}", text, e))
                })?,
                None => Money::zero(),
            };

            let wallet = session.create_wallet(name.trim(), kind, balance)?;
            session.save()?;

            println!("Created wallet: {}", wallet.name);
            println!("  Type:    {}", wallet.kind);
            println!(
                "  Balance: {}",
                wallet
                    .initial_balance
                    .format_with_symbol(&session.settings().currency_symbol)
            );
            println!("  ID:      {}", wallet.id);
        }
    }

    Ok(())
}
