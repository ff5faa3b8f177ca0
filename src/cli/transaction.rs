//! Transaction CLI commands

use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;

use crate::display::{format_day, format_transaction_list};
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{Money, NewTransaction, Transaction, TransactionType};
use crate::services::Session;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Transaction type (income, expense or transfer)
        kind: String,
        /// Amount (e.g., "120" or "1,250.50")
        amount: String,
        /// Category name or ID
        category: String,
        /// Wallet name or ID (defaults to the default wallet)
        #[arg(short, long)]
        wallet: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
        /// Date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List recent transactions, newest first
    List {
        /// Only show one wallet
        #[arg(short, long)]
        wallet: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn parse_date(s: &str) -> PocketbookResult<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            PocketbookError::Config(format!(
                "Invalid date: '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
                s
            ))
        })
}

/// Handle a transaction command
pub fn handle_transaction_command(
    session: &mut Session,
    cmd: TransactionCommands,
) -> PocketbookResult<()> {
    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            category,
            wallet,
            note,
            date,
        } => {
            let kind = TransactionType::parse(&kind).ok_or_else(|| {
                PocketbookError::Config(format!(
                    "Invalid transaction type: '{}'. Use income, expense or transfer",
                    kind
                ))
            })?;
            let amount = Money::parse(&amount).map_err(|e| {
                PocketbookError::Config(format!("Invalid amount '{}': {}", amount, e))
            })?;

            let category_id = match kind.category_type() {
                Some(category_type) => session.categories().find_by_key(&category, category_type),
                None => session.categories().find(&category),
            }
            .or_else(|| session.categories().find(&category))
            .map(|c| c.id)
            .ok_or_else(|| PocketbookError::category_not_found(&category))?;

            let mut input = NewTransaction::new(kind, amount, category_id);
            if let Some(wallet) = wallet {
                let found = session
                    .wallets()
                    .find(&wallet)
                    .ok_or_else(|| PocketbookError::wallet_not_found(&wallet))?;
                input = input.wallet(found.id);
            }
            if let Some(note) = note {
                input = input.note(note);
            }
            if let Some(date) = date {
                input = input.date(parse_date(&date)?);
            }

            let txn = session.add_transaction(input)?;
            session.save()?;

            println!(
                "Added {} of {} on {}",
                txn.kind,
                txn.amount
                    .format_with_symbol(&session.settings().currency_symbol),
                format_day(txn.date.date(), &session.settings().date_format)
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List { wallet, limit } => {
            let wallet_id = match wallet {
                Some(wallet) => Some(
                    session
                        .wallets()
                        .find(&wallet)
                        .ok_or_else(|| PocketbookError::wallet_not_found(&wallet))?
                        .id,
                ),
                None => None,
            };

            let transactions: Vec<&Transaction> = session
                .ledger()
                .sorted_transactions()
                .into_iter()
                .filter(|t| wallet_id.map_or(true, |id| t.wallet_id == id))
                .take(limit)
                .collect();

            print!(
                "{}",
                format_transaction_list(
                    &transactions,
                    session.categories(),
                    session.wallets(),
                    &session.settings().currency_symbol,
                    &session.settings().date_format
                )
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-05").unwrap();
        assert_eq!(date.format("%Y-%m-%d %H:%M").to_string(), "2024-01-05 00:00");
        let date = parse_date("2024-01-05T12:30:00").unwrap();
        assert_eq!(date.format("%H:%M").to_string(), "12:30");
        assert!(parse_date("05/01/2024").is_err());
    }
}
