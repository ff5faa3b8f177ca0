//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the session.

pub mod category;
pub mod export;
pub mod import;
pub mod summary;
pub mod transaction;
pub mod wallet;

pub use category::{handle_category_command, CategoryCommands};
pub use export::handle_export_command;
pub use import::handle_import_command;
pub use summary::{handle_summary_command, SummaryCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
pub use wallet::{handle_wallet_command, WalletCommands};

use crate::models::Progress;

/// Print a progress update on one terminal line
pub(crate) fn print_progress(progress: &Progress) {
    eprintln!("[{:>3}%] {}", progress.progress, progress.message);
}
