//! Spreadsheet export
//!
//! Writes the ledger to an xlsx workbook: one sheet per wallet with its
//! transactions grouped into month sections, then a category summary sheet.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{Datelike, Local, NaiveDate};
use tracing::{info, warn};

use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{
    Category, CategoryId, CategoryType, Money, Phase, Progress, Transaction, TransactionType,
    Wallet, WalletId,
};
use crate::services::interchange::{InterchangeGate, ProgressReporter};

use super::layout::{
    DATE_FORMAT, MONTH_FORMAT, SUMMARY_HEADERS, SUMMARY_SHEET_NAME, TOTAL_LABEL,
    TRANSACTION_HEADERS, WALLET_LABEL,
};
use super::workbook::{Cell, Workbook};

/// Everything an export reads
#[derive(Debug, Clone, Default)]
pub struct ExportData {
    pub transactions: Vec<Transaction>,
    pub wallets: Vec<Wallet>,
    pub categories: Vec<Category>,
}

/// A finished workbook ready to be saved or offered for download
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Default file name for an export made on `date`
    pub fn file_name_for(date: NaiveDate) -> String {
        format!("pocketbook-export-{}.xlsx", date.format("%Y-%m-%d"))
    }

    /// Write the workbook to `path`
    pub async fn write_to(&self, path: &Path) -> PocketbookResult<()> {
        tokio::fs::write(path, &self.bytes).await.map_err(|e| {
            PocketbookError::Io(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), bytes = self.bytes.len(), "export written");
        Ok(())
    }
}

/// Single-flight xlsx exporter
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExporter {
    gate: InterchangeGate,
}

impl SpreadsheetExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an export is in flight
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Build the workbook
    ///
    /// Returns `Ok(None)` without doing anything while another export from
    /// this exporter is running.
    pub async fn export<F>(
        &self,
        data: ExportData,
        on_progress: F,
    ) -> PocketbookResult<Option<ExportArtifact>>
    where
        F: FnMut(&Progress),
    {
        let Some(_guard) = self.gate.try_acquire() else {
            info!("export already running, ignoring request");
            return Ok(None);
        };

        let mut reporter = ProgressReporter::new(on_progress);
        match run_export(data, &mut reporter).await {
            Ok(artifact) => {
                reporter.complete(format!("Exported {}", artifact.file_name));
                Ok(Some(artifact))
            }
            Err(e) => {
                reporter.fail(e.to_string());
                Err(e)
            }
        }
    }
}

async fn run_export<F: FnMut(&Progress)>(
    data: ExportData,
    reporter: &mut ProgressReporter<F>,
) -> PocketbookResult<ExportArtifact> {
    reporter.running(Phase::Preparing, 0, "Preparing export");
    if data.transactions.is_empty() {
        return Err(PocketbookError::EmptyDataset);
    }

    let categories: HashMap<CategoryId, &Category> =
        data.categories.iter().map(|c| (c.id, c)).collect();

    let mut by_wallet: HashMap<WalletId, Vec<&Transaction>> = HashMap::new();
    for txn in &data.transactions {
        by_wallet.entry(txn.wallet_id).or_default().push(txn);
    }
    let orphaned: usize = by_wallet
        .iter()
        .filter(|(id, _)| !data.wallets.iter().any(|w| w.id == **id))
        .map(|(_, txns)| txns.len())
        .sum();
    if orphaned > 0 {
        warn!(count = orphaned, "skipping transactions whose wallet no longer exists");
    }

    reporter.running(
        Phase::Preparing,
        10,
        format!("{} transactions in {} wallets", data.transactions.len(), data.wallets.len()),
    );

    let mut workbook = Workbook::new();
    workbook.reserve_name(SUMMARY_SHEET_NAME);

    let wallet_count = data.wallets.len();
    for (i, wallet) in data.wallets.iter().enumerate() {
        let txns = by_wallet.remove(&wallet.id).unwrap_or_default();
        let rows = wallet_sheet_rows(wallet, txns, &categories);
        let sheet_name = workbook.add_sheet(&wallet.name, rows);
        reporter.proportional(
            Phase::WalletSheets,
            10,
            70,
            i + 1,
            wallet_count,
            format!("Wrote sheet {}", sheet_name),
        );
    }
    if wallet_count == 0 {
        reporter.running(Phase::WalletSheets, 70, "No wallets to write");
    }

    reporter.running(Phase::CategorySummary, 70, "Summarizing categories");
    let summary = summary_sheet_rows(&data.transactions, &data.categories);
    workbook.add_reserved_sheet(SUMMARY_SHEET_NAME, summary);
    reporter.running(Phase::CategorySummary, 85, "Category summary written");

    reporter.running(Phase::Finalizing, 85, "Writing workbook");
    let bytes = tokio::task::spawn_blocking(move || workbook.to_xlsx())
        .await
        .map_err(|e| PocketbookError::Io(format!("Export worker failed: {}", e)))??;

    let artifact = ExportArtifact {
        file_name: ExportArtifact::file_name_for(Local::now().date_naive()),
        bytes,
    };
    info!(file = %artifact.file_name, bytes = artifact.bytes.len(), "export built");
    Ok(artifact)
}

fn wallet_sheet_rows(
    wallet: &Wallet,
    mut txns: Vec<&Transaction>,
    categories: &HashMap<CategoryId, &Category>,
) -> Vec<Vec<Cell>> {
    let mut rows = vec![
        vec![Cell::text(WALLET_LABEL), Cell::text(wallet.name.as_str())],
        TRANSACTION_HEADERS.iter().map(|h| Cell::text(*h)).collect(),
    ];

    txns.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut months: BTreeMap<(i32, u32), Vec<&Transaction>> = BTreeMap::new();
    for txn in txns {
        months
            .entry((txn.date.year(), txn.date.month()))
            .or_default()
            .push(txn);
    }

    for month_txns in months.values() {
        let Some(first) = month_txns.first() else {
            continue;
        };
        rows.push(vec![Cell::text(first.date.format(MONTH_FORMAT).to_string())]);
        for txn in month_txns {
            let category = match categories.get(&txn.category_id) {
                Some(c) => c.name.clone(),
                None => {
                    warn!(id = %txn.id, "transaction references an unknown category");
                    String::new()
                }
            };
            rows.push(vec![
                Cell::text(txn.date.format(DATE_FORMAT).to_string()),
                Cell::text(txn.kind.as_str()),
                Cell::text(category),
                Cell::Number(txn.amount.to_major()),
                match &txn.note {
                    Some(note) => Cell::text(note.as_str()),
                    None => Cell::Empty,
                },
            ]);
        }
    }

    rows
}

fn summary_sheet_rows(transactions: &[Transaction], categories: &[Category]) -> Vec<Vec<Cell>> {
    let mut totals: HashMap<CategoryId, (Money, usize)> = HashMap::new();
    for txn in transactions {
        // Transfers are not income or expense
        if txn.kind == TransactionType::Transfer {
            continue;
        }
        let entry = totals.entry(txn.category_id).or_insert((Money::zero(), 0));
        entry.0 += txn.amount;
        entry.1 += 1;
    }

    let mut rows = vec![SUMMARY_HEADERS.iter().map(|h| Cell::text(*h)).collect()];

    for (kind, label) in [
        (CategoryType::Expense, "Expense"),
        (CategoryType::Income, "Income"),
    ] {
        rows.push(vec![Cell::text(label)]);

        let mut section: Vec<&Category> = categories
            .iter()
            .filter(|c| c.kind == kind && totals.contains_key(&c.id))
            .collect();
        section.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

        let mut section_total = Money::zero();
        let mut section_count = 0;
        for category in section {
            let (total, count) = totals[&category.id];
            section_total += total;
            section_count += count;
            rows.push(vec![
                Cell::text(category.name.as_str()),
                Cell::text(kind.as_str()),
                Cell::Number(total.to_major()),
                Cell::Number(count as f64),
            ]);
        }
        rows.push(vec![
            Cell::text(TOTAL_LABEL),
            Cell::text(kind.as_str()),
            Cell::Number(section_total.to_major()),
            Cell::Number(section_count as f64),
        ]);
    }

    rows
}
