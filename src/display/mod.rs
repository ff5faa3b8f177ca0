//! Display formatting for terminal output
//!
//! Renders wallets, categories, transactions and summaries as tables.

pub mod category;
pub mod summary;
pub mod transaction;
pub mod wallet;

pub use category::format_category_list;
pub use summary::{format_daily_summaries, format_monthly_summary};
pub use transaction::format_transaction_list;
pub use wallet::format_wallet_list;

use std::fmt::Write;

use chrono::NaiveDate;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows with the table style shared by every listing
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a day with the configured strftime pattern, falling back to ISO
/// when the pattern is invalid or needs time fields
pub fn format_day(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}
