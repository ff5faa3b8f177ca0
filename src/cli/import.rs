//! CLI command for spreadsheet import
//!
//! Ctrl-C stops the import between rows; rows already imported stay.

use std::path::Path;

use tracing::warn;

use crate::error::PocketbookResult;
use crate::services::{CancelSignal, Session};

use super::print_progress;

/// How many row errors to list before summarizing the rest
const MAX_LISTED_ERRORS: usize = 20;

/// Handle the import command
pub async fn handle_import_command(session: &mut Session, file: &Path) -> PocketbookResult<()> {
    let cancel = CancelSignal::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling import");
            on_interrupt.cancel();
        }
    });

    let outcome = session.import_path(file, print_progress, &cancel).await;
    watcher.abort();

    // Persist whatever was imported, including before a cancellation
    session.save()?;

    let Some(result) = outcome? else {
        println!("An import is already running.");
        return Ok(());
    };

    println!("Import Complete!");
    println!("  Imported:            {}", result.imported_count);
    println!("  Skipped:             {}", result.skipped_count);
    println!("  Wallets created:     {}", result.created_wallets);
    println!("  Categories created:  {}", result.created_categories);
    for error in result.errors.iter().take(MAX_LISTED_ERRORS) {
        println!("    {} row {}: {}", error.sheet, error.row, error.reason);
    }
    if result.errors.len() > MAX_LISTED_ERRORS {
        println!("    ... and {} more", result.errors.len() - MAX_LISTED_ERRORS);
    }

    Ok(())
}
