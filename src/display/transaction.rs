//! Transaction display formatting

use tabled::Tabled;

use crate::models::Transaction;
use crate::services::{CategoryRegistry, WalletRegistry};

use super::{format_day, render_table};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Wallet")]
    wallet: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// Format transactions as a register, resolving names through the registries
pub fn format_transaction_list(
    transactions: &[&Transaction],
    categories: &CategoryRegistry,
    wallets: &WalletRegistry,
    symbol: &str,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    let rows = transactions
        .iter()
        .map(|t| TransactionRow {
            date: format!(
                "{} {}",
                format_day(t.date.date(), date_format),
                t.date.format("%H:%M")
            ),
            kind: t.kind.to_string(),
            category: categories
                .get(t.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "(unknown)".into()),
            wallet: wallets
                .get(t.wallet_id)
                .map(|w| w.name.clone())
                .unwrap_or_else(|| "(unknown)".into()),
            amount: t.amount.format_with_symbol(symbol),
            note: truncate(t.note_text(), 30),
        })
        .collect();

    render_table(rows)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
