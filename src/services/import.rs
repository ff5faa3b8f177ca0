//! Spreadsheet import service
//!
//! Reads a workbook in the export layout, reconciles wallet and category
//! names against the registries (creating what is missing) and feeds each
//! row through the ledger. Malformed rows and rejected inserts are collected
//! as row errors; only an unreadable file or cancellation aborts the run.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PocketbookError, PocketbookResult, ValidationError};
use crate::export::layout::{
    COL_AMOUNT, COL_CATEGORY, COL_DATE, COL_NOTE, COL_TYPE, MONTH_FORMAT, SUMMARY_SHEET_NAME,
    WALLET_LABEL,
};
use crate::models::{
    Category, CategoryId, CategoryType, Money, NewTransaction, Phase, Progress, Transaction,
    TransactionType, Wallet, WalletId,
};

use super::interchange::{CancelSignal, InterchangeGate, ProgressReporter};

/// What the importer needs from the rest of the application
pub trait ImportTarget {
    /// Find a category by its natural key
    fn find_category_by_name(&self, name: &str, kind: CategoryType) -> Option<Category>;

    /// Create a category
    fn add_category(&mut self, name: &str, kind: CategoryType) -> PocketbookResult<Category>;

    /// All wallets
    fn wallets(&self) -> Vec<Wallet>;

    /// Find a wallet by name; exact comparison unless overridden
    fn find_wallet_by_name(&self, name: &str) -> Option<Wallet> {
        self.wallets().into_iter().find(|w| w.name == name)
    }

    /// Create a wallet with default attributes
    fn add_wallet(&mut self, name: &str) -> PocketbookResult<Wallet>;

    /// Record one transaction
    fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction, ValidationError>;
}

/// A row that was not imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub sheet: String,
    /// 1-based row number as shown by spreadsheet applications
    pub row: u32,
    pub reason: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub imported_count: usize,
    /// Always `errors.len()`
    pub skipped_count: usize,
    pub errors: Vec<RowError>,
    pub created_wallets: usize,
    pub created_categories: usize,
}

/// Where the workbook comes from
#[derive(Debug, Clone)]
pub enum ImportSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Single-flight xlsx importer
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetImporter {
    gate: InterchangeGate,
}

impl SpreadsheetImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an import is in flight
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Import a workbook file
    pub async fn import_path<D, F>(
        &self,
        path: &Path,
        deps: &mut D,
        on_progress: F,
        cancel: &CancelSignal,
    ) -> PocketbookResult<Option<ImportResult>>
    where
        D: ImportTarget,
        F: FnMut(&Progress),
    {
        self.import(ImportSource::Path(path.to_path_buf()), deps, on_progress, cancel)
            .await
    }

    /// Import a workbook held in memory
    pub async fn import_bytes<D, F>(
        &self,
        bytes: Vec<u8>,
        deps: &mut D,
        on_progress: F,
        cancel: &CancelSignal,
    ) -> PocketbookResult<Option<ImportResult>>
    where
        D: ImportTarget,
        F: FnMut(&Progress),
    {
        self.import(ImportSource::Bytes(bytes), deps, on_progress, cancel)
            .await
    }

    /// Run an import
    ///
    /// Returns `Ok(None)` without doing anything while another import from
    /// this importer is running.
    pub async fn import<D, F>(
        &self,
        source: ImportSource,
        deps: &mut D,
        on_progress: F,
        cancel: &CancelSignal,
    ) -> PocketbookResult<Option<ImportResult>>
    where
        D: ImportTarget,
        F: FnMut(&Progress),
    {
        let Some(_guard) = self.gate.try_acquire() else {
            info!("import already running, ignoring request");
            return Ok(None);
        };

        let mut reporter = ProgressReporter::new(on_progress);
        match run_import(source, deps, &mut reporter, cancel).await {
            Ok(result) => {
                reporter.complete(format!(
                    "Imported {} transactions, skipped {}",
                    result.imported_count, result.skipped_count
                ));
                Ok(Some(result))
            }
            Err(e) => {
                reporter.fail(e.to_string());
                Err(e)
            }
        }
    }
}

async fn run_import<D, F>(
    source: ImportSource,
    deps: &mut D,
    reporter: &mut ProgressReporter<F>,
    cancel: &CancelSignal,
) -> PocketbookResult<ImportResult>
where
    D: ImportTarget,
    F: FnMut(&Progress),
{
    reporter.running(Phase::Reading, 0, "Reading workbook");
    let bytes = match source {
        ImportSource::Bytes(bytes) => bytes,
        ImportSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
            PocketbookError::FileFormat(format!("Cannot read {}: {}", path.display(), e))
        })?,
    };

    let sheets = tokio::task::spawn_blocking(move || parse_workbook(bytes))
        .await
        .map_err(|e| PocketbookError::Io(format!("Import worker failed: {}", e)))??;

    let total: usize = sheets.iter().map(|s| s.rows.len()).sum();
    reporter.running(
        Phase::Reading,
        10,
        format!("Read {} rows from {} sheets", total, sheets.len()),
    );

    let mut resolver = Resolver::default();
    let mut result = ImportResult::default();
    let mut done = 0;

    for sheet in &sheets {
        for parsed in &sheet.rows {
            if cancel.is_cancelled() {
                info!(imported = result.imported_count, "import cancelled");
                return Err(PocketbookError::Cancelled);
            }

            let outcome = match &parsed.data {
                Ok(row) => insert_row(deps, &mut resolver, &sheet.wallet_name, row),
                Err(reason) => Err(reason.clone()),
            };
            match outcome {
                Ok(_) => result.imported_count += 1,
                Err(reason) => {
                    debug!(sheet = %sheet.name, row = parsed.row, %reason, "row skipped");
                    result.errors.push(RowError {
                        sheet: sheet.name.clone(),
                        row: parsed.row,
                        reason,
                    });
                }
            }

            done += 1;
            reporter.proportional(
                Phase::Inserting,
                10,
                95,
                done,
                total,
                format!("Imported row {} of {}", done, total),
            );
        }
    }

    result.skipped_count = result.errors.len();
    result.created_wallets = resolver.created_wallets;
    result.created_categories = resolver.created_categories;
    reporter.running(Phase::Inserting, 95, "Finishing import");

    if result.skipped_count > 0 {
        warn!(skipped = result.skipped_count, "some rows were not imported");
    }
    info!(
        imported = result.imported_count,
        wallets_created = result.created_wallets,
        categories_created = result.created_categories,
        "import finished"
    );
    Ok(result)
}

/// Per-run caches of resolved names
#[derive(Default)]
struct Resolver {
    wallets: HashMap<String, Result<WalletId, String>>,
    categories: HashMap<(String, TransactionType), CategoryId>,
    created_wallets: usize,
    created_categories: usize,
}

impl Resolver {
    fn wallet<D: ImportTarget>(&mut self, deps: &mut D, name: &str) -> Result<WalletId, String> {
        if let Some(cached) = self.wallets.get(name) {
            return cached.clone();
        }

        let resolved = match deps.find_wallet_by_name(name) {
            Some(wallet) => Ok(wallet.id),
            None => match deps.add_wallet(name) {
                Ok(wallet) => {
                    info!(name = %wallet.name, "created wallet during import");
                    self.created_wallets += 1;
                    Ok(wallet.id)
                }
                Err(e) => Err(format!("cannot create wallet '{}': {}", name, e)),
            },
        };
        self.wallets.insert(name.to_string(), resolved.clone());
        resolved
    }

    fn category<D: ImportTarget>(
        &mut self,
        deps: &mut D,
        name: &str,
        kind: TransactionType,
    ) -> Result<CategoryId, String> {
        let key = (name.to_string(), kind);
        if let Some(id) = self.categories.get(&key) {
            return Ok(*id);
        }

        let found = match kind.category_type() {
            Some(category_type) => deps.find_category_by_name(name, category_type),
            // Transfers may be filed under either type
            None => deps
                .find_category_by_name(name, CategoryType::Expense)
                .or_else(|| deps.find_category_by_name(name, CategoryType::Income)),
        };

        let category = match found {
            Some(category) => category,
            None => {
                let category_type = kind.category_type().unwrap_or(CategoryType::Expense);
                let created = deps
                    .add_category(name, category_type)
                    .map_err(|e| format!("cannot create category '{}': {}", name, e))?;
                info!(name = %created.name, kind = %created.kind, "created category during import");
                self.created_categories += 1;
                created
            }
        };

        self.categories.insert(key, category.id);
        Ok(category.id)
    }
}

fn insert_row<D: ImportTarget>(
    deps: &mut D,
    resolver: &mut Resolver,
    wallet_name: &str,
    row: &RowData,
) -> Result<Transaction, String> {
    let wallet_id = resolver.wallet(deps, wallet_name)?;
    let category_id = resolver.category(deps, &row.category, row.kind)?;

    let mut input = NewTransaction::new(row.kind, row.amount, category_id)
        .wallet(wallet_id)
        .date(row.date);
    input.note = row.note.clone();

    deps.add_transaction(input).map_err(|e| e.to_string())
}

// === Workbook parsing ===

#[derive(Debug)]
struct ParsedSheet {
    name: String,
    wallet_name: String,
    rows: Vec<ParsedRow>,
}

#[derive(Debug)]
struct ParsedRow {
    row: u32,
    data: Result<RowData, String>,
}

#[derive(Debug, Clone, PartialEq)]
struct RowData {
    date: NaiveDateTime,
    kind: TransactionType,
    category: String,
    amount: Money,
    note: Option<String>,
}

fn parse_workbook(bytes: Vec<u8>) -> PocketbookResult<Vec<ParsedSheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PocketbookError::FileFormat(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        if name == SUMMARY_SHEET_NAME {
            debug!("skipping summary sheet");
            continue;
        }
        let range = workbook.worksheet_range(&name).map_err(|e| {
            PocketbookError::FileFormat(format!("Cannot read sheet '{}': {}", name, e))
        })?;
        sheets.push(parse_sheet(name, &range));
    }
    Ok(sheets)
}

static EMPTY: Data = Data::Empty;

fn cell(range: &Range<Data>, row: u32, col: usize) -> &Data {
    range.get_value((row, col as u32)).unwrap_or(&EMPTY)
}

fn parse_sheet(name: String, range: &Range<Data>) -> ParsedSheet {
    let (Some((start_row, _)), Some((end_row, _))) = (range.start(), range.end()) else {
        return ParsedSheet {
            wallet_name: name.clone(),
            name,
            rows: Vec::new(),
        };
    };

    let wallet_name = wallet_label(range, start_row).unwrap_or_else(|| name.clone());

    let mut rows = Vec::new();
    for r in start_row..=end_row {
        let cells: Vec<&Data> = (0..=COL_NOTE).map(|c| cell(range, r, c)).collect();
        if !is_data_row(&cells) {
            continue;
        }
        rows.push(ParsedRow {
            row: r + 1,
            data: parse_row(&cells),
        });
    }

    ParsedSheet {
        name,
        wallet_name,
        rows,
    }
}

/// The wallet name from a `Wallet | name` label row at the top of the sheet
fn wallet_label(range: &Range<Data>, first_row: u32) -> Option<String> {
    let label = cell_text(cell(range, first_row, 0))?;
    if !label.trim().eq_ignore_ascii_case(WALLET_LABEL) {
        return None;
    }
    cell_text(cell(range, first_row, 1)).filter(|name| !name.trim().is_empty())
}

fn is_blank(data: &Data) -> bool {
    cell_text(data).map_or(true, |s| s.trim().is_empty())
}

/// Blank rows, label rows, header rows and month sections carry no transaction
fn is_data_row(cells: &[&Data]) -> bool {
    if cells.iter().all(|c| is_blank(c)) {
        return false;
    }

    let first = cell_text(cells[COL_DATE]).unwrap_or_default();
    let first = first.trim();
    let second = cell_text(cells[COL_TYPE]).unwrap_or_default();

    if first.eq_ignore_ascii_case(WALLET_LABEL) && cells[COL_CATEGORY..].iter().all(|c| is_blank(c)) {
        return false;
    }
    if first.eq_ignore_ascii_case("date") && second.trim().eq_ignore_ascii_case("type") {
        return false;
    }
    // Month section: a YYYY-MM label alone in column A. Anything else with
    // only column A filled is a broken transaction row.
    if is_month_label(first) && cells[COL_TYPE..].iter().all(|c| is_blank(c)) {
        return false;
    }
    true
}

fn is_month_label(text: &str) -> bool {
    NaiveDate::parse_from_str(&format!("{}-01", text), &format!("{}-%d", MONTH_FORMAT)).is_ok()
}

fn parse_row(cells: &[&Data]) -> Result<RowData, String> {
    let date = parse_date_cell(cells[COL_DATE])?;

    let type_text = cell_text(cells[COL_TYPE]).unwrap_or_default();
    let kind = TransactionType::parse(&type_text)
        .ok_or_else(|| format!("invalid type '{}'", type_text.trim()))?;

    let category = cell_text(cells[COL_CATEGORY])
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "missing category".to_string())?;

    let amount = parse_amount_cell(cells[COL_AMOUNT])?;

    let note = cell_text(cells[COL_NOTE]).filter(|s| !s.is_empty());

    Ok(RowData {
        date,
        kind,
        category,
        amount,
        note,
    })
}

fn cell_text(data: &Data) -> Option<String> {
    match data {
        Data::String(s) | Data::DateTimeIso(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        _ => None,
    }
}

fn parse_amount_cell(data: &Data) -> Result<Money, String> {
    let value = match data {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '฿' | '$' | ' ' | '\u{a0}'))
                .collect();
            if cleaned.is_empty() {
                return Err("missing amount".into());
            }
            cleaned
                .parse::<f64>()
                .map_err(|_| format!("invalid amount '{}'", s.trim()))?
        }
        Data::Empty => return Err("missing amount".into()),
        other => return Err(format!("invalid amount '{}'", other)),
    };

    let amount = Money::from_major(value).ok_or_else(|| format!("invalid amount '{}'", value))?;
    if amount.is_negative() {
        return Err(format!("negative amount {}", amount));
    }
    if amount.exceeds_limit() {
        return Err(format!(
            "amount too large {} (max {})",
            amount,
            Money::MAX_AMOUNT
        ));
    }
    Ok(amount)
}

fn parse_date_cell(data: &Data) -> Result<NaiveDateTime, String> {
    match data {
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64()),
        Data::Float(f) => excel_serial_to_datetime(*f),
        Data::Int(i) => excel_serial_to_datetime(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_date_text(s),
        Data::Empty => Err("missing date".into()),
        other => Err(format!("invalid date '{}'", other)),
    }
}

/// Excel serial dates count days from 1899-12-30; the fraction is the time of day
fn excel_serial_to_datetime(serial: f64) -> Result<NaiveDateTime, String> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(format!("invalid date serial {}", serial));
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "invalid base date".to_string())?;
    let seconds = (serial * 86_400.0).round() as i64;
    base.checked_add_signed(Duration::seconds(seconds))
        .ok_or_else(|| format!("invalid date serial {}", serial))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// Day-first before month-first
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

fn parse_date_text(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("missing date".into());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }
    if let Ok(serial) = s.parse::<f64>() {
        return excel_serial_to_datetime(serial);
    }

    Err(format!("invalid date '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameMatchPolicy;
    use crate::export::workbook::{Cell, Workbook};
    use crate::models::ProgressStatus;
    use crate::services::{CategoryRegistry, LedgerOptions, TransactionLedger, WalletRegistry};

    /// Registries plus ledger, wired the way the session wires them
    struct Target {
        categories: CategoryRegistry,
        wallets: WalletRegistry,
        ledger: TransactionLedger,
    }

    impl Target {
        fn new(policy: NameMatchPolicy) -> Self {
            let mut categories = CategoryRegistry::new(policy);
            categories.create("อาหาร", CategoryType::Expense).unwrap();
            categories.create("เงินเดือน", CategoryType::Income).unwrap();
            Self {
                categories,
                wallets: WalletRegistry::load_or_seed(Vec::new(), policy, "THB"),
                ledger: TransactionLedger::new(LedgerOptions::default()),
            }
        }
    }

    impl ImportTarget for Target {
        fn find_category_by_name(&self, name: &str, kind: CategoryType) -> Option<Category> {
            self.categories.find_by_key(name, kind).cloned()
        }

        fn add_category(&mut self, name: &str, kind: CategoryType) -> PocketbookResult<Category> {
            self.categories.create(name, kind)
        }

        fn wallets(&self) -> Vec<Wallet> {
            self.wallets.all().to_vec()
        }

        fn add_wallet(&mut self, name: &str) -> PocketbookResult<Wallet> {
            self.wallets.find_or_create(name, "THB").map(|(w, _)| w)
        }

        fn add_transaction(
            &mut self,
            input: NewTransaction,
        ) -> Result<Transaction, ValidationError> {
            self.ledger
                .add_transaction(input, &self.categories, &self.wallets)
        }
    }

    fn row(date: &str, kind: &str, category: &str, amount: Cell, note: &str) -> Vec<Cell> {
        vec![
            Cell::text(date),
            Cell::text(kind),
            Cell::text(category),
            amount,
            if note.is_empty() {
                Cell::Empty
            } else {
                Cell::text(note)
            },
        ]
    }

    fn wallet_sheet(workbook: &mut Workbook, wallet: &str, rows: Vec<Vec<Cell>>) {
        let mut all = vec![
            vec![Cell::text("Wallet"), Cell::text(wallet)],
            vec![
                Cell::text("Date"),
                Cell::text("Type"),
                Cell::text("Category"),
                Cell::text("Amount"),
                Cell::text("Note"),
            ],
            vec![Cell::text("2024-01")],
        ];
        all.extend(rows);
        workbook.add_sheet(wallet, all);
    }

    fn scenario_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        wallet_sheet(
            &mut workbook,
            "เงินสด",
            vec![
                row("2024-01-05", "expense", "อาหาร", Cell::Number(120.0), "lunch"),
                row("2024-01-05", "income", "เงินเดือน", Cell::Number(45000.0), ""),
                row("2024-01-06", "expense", "NewCategory", Cell::Number(50.0), ""),
            ],
        );
        workbook.to_xlsx().unwrap()
    }

    #[tokio::test]
    async fn test_scenario_import() {
        let mut target = Target::new(NameMatchPolicy::Exact);
        let importer = SpreadsheetImporter::new();

        let result = importer
            .import_bytes(scenario_bytes(), &mut target, |_| {}, &CancelSignal::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.imported_count, 3);
        assert_eq!(result.skipped_count, 0);
        assert_eq!(result.created_categories, 1);
        assert_eq!(result.created_wallets, 0);
        assert_eq!(target.categories.len(), 3);

        let jan5 = target
            .ledger
            .daily_summary(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .unwrap();
        assert_eq!(jan5.income, Money::from_minor(4_500_000));
        assert_eq!(jan5.expense, Money::from_minor(12000));
        let jan6 = target
            .ledger
            .daily_summary(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap())
            .unwrap();
        assert_eq!(jan6.expense, Money::from_minor(5000));
        assert!(jan6.income.is_zero());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_reported() {
        let mut workbook = Workbook::new();
        wallet_sheet(
            &mut workbook,
            "PromptPay",
            vec![
                row("not a date", "expense", "อาหาร", Cell::Number(1.0), ""),
                row("2024-01-05", "refund", "อาหาร", Cell::Number(1.0), ""),
                row("2024-01-05", "expense", "อาหาร", Cell::text("abc"), ""),
                row("2024-01-05", "expense", "อาหาร", Cell::Number(-5.0), ""),
                row("2024-01-05", "expense", "", Cell::Number(5.0), ""),
                row("2024-01-05", "expense", "เงินเดือน", Cell::Number(5.0), ""),
                row("05/01/2024", "Expense", "อาหาร", Cell::text("฿1,250.50"), "ok"),
            ],
        );

        let mut target = Target::new(NameMatchPolicy::Exact);
        let result = SpreadsheetImporter::new()
            .import_bytes(workbook.to_xlsx().unwrap(), &mut target, |_| {}, &CancelSignal::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.imported_count, 2);
        assert_eq!(result.skipped_count, 5);
        assert_eq!(result.errors.len(), 5);
        let rows: Vec<u32> = result.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![4, 5, 6, 7, 8]);
        assert!(result.errors[0].reason.contains("invalid date"));
        assert!(result.errors[1].reason.contains("invalid type"));
        assert!(result.errors[3].reason.contains("negative"));
        assert_eq!(result.errors[4].reason, "missing category");
        // An expense row naming an income-only category creates the expense twin
        assert_eq!(result.created_categories, 1);

        let txn = target.ledger.transactions().next().unwrap();
        assert_eq!(txn.amount, Money::from_minor(125_050));
        assert_eq!(txn.day(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(txn.note.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_unreadable_file() {
        let mut target = Target::new(NameMatchPolicy::Exact);
        let mut seen: Vec<Progress> = Vec::new();
        let err = SpreadsheetImporter::new()
            .import_bytes(
                b"definitely not a workbook".to_vec(),
                &mut target,
                |p| seen.push(p.clone()),
                &CancelSignal::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PocketbookError::FileFormat(_)));
        assert_eq!(seen.last().unwrap().status, ProgressStatus::Error);
        assert!(seen.last().unwrap().progress < 100);
        assert!(target.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_missing_path_is_file_format_error() {
        let mut target = Target::new(NameMatchPolicy::Exact);
        let err = SpreadsheetImporter::new()
            .import_path(
                Path::new("/nonexistent/pocketbook.xlsx"),
                &mut target,
                |_| {},
                &CancelSignal::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PocketbookError::FileFormat(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_rows() {
        let mut target = Target::new(NameMatchPolicy::Exact);
        let cancel = CancelSignal::new();
        cancel.cancel();

        let mut seen: Vec<Progress> = Vec::new();
        let err = SpreadsheetImporter::new()
            .import_bytes(scenario_bytes(), &mut target, |p| seen.push(p.clone()), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PocketbookError::Cancelled));
        assert_eq!(seen.last().unwrap().status, ProgressStatus::Error);
        assert!(target.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_busy_importer_ignores_request() {
        let importer = SpreadsheetImporter::new();
        let _held = importer.gate.try_acquire().unwrap();
        let mut target = Target::new(NameMatchPolicy::Exact);

        let result = importer
            .import_bytes(scenario_bytes(), &mut target, |_| {}, &CancelSignal::new())
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(target.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_wallet_from_sheet_name_without_label() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(
            "Travel",
            vec![row("2024-03-01T10:30:00", "expense", "อาหาร", Cell::Number(99.5), "")],
        );

        let mut target = Target::new(NameMatchPolicy::Exact);
        let result = SpreadsheetImporter::new()
            .import_bytes(workbook.to_xlsx().unwrap(), &mut target, |_| {}, &CancelSignal::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.imported_count, 1);
        assert_eq!(result.created_wallets, 1);
        let travel = target.wallets.find_by_key("Travel").unwrap();
        assert!(travel.is_asset);
        assert_eq!(target.ledger.transactions().next().unwrap().wallet_id, travel.id);
    }

    #[test]
    fn test_row_classification() {
        let empty = Data::Empty;
        let month = Data::String("2024-01".into());
        let date = Data::String("Date".into());
        let kind = Data::String("Type".into());
        assert!(!is_data_row(&[&empty, &empty, &empty, &empty, &empty]));
        assert!(!is_data_row(&[&month, &empty, &empty, &empty, &empty]));
        assert!(!is_data_row(&[&date, &kind, &empty, &empty, &empty]));
        let amount = Data::Float(5.0);
        assert!(is_data_row(&[&month, &kind, &empty, &amount, &empty]));

        let day = Data::String("2024-01-06".into());
        let blank_text = Data::String(String::new());
        assert!(is_data_row(&[&day, &empty, &empty, &empty, &empty]));
        assert!(is_data_row(&[&day, &blank_text, &blank_text, &empty, &blank_text]));
        assert!(!is_data_row(&[&month, &blank_text, &empty, &empty, &empty]));
        assert!(is_month_label("2024-12"));
        assert!(!is_month_label("2024-13"));
        assert!(!is_month_label("2024-01-06"));
    }

    #[tokio::test]
    async fn test_date_only_rows_are_reported() {
        let mut workbook = Workbook::new();
        wallet_sheet(
            &mut workbook,
            "เงินสด",
            vec![
                row("2024-01-05", "expense", "อาหาร", Cell::Number(120.0), ""),
                vec![Cell::text("2024-01-06")],
                vec![
                    Cell::text("2024-01-07"),
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                ],
            ],
        );

        let mut target = Target::new(NameMatchPolicy::Exact);
        let result = SpreadsheetImporter::new()
            .import_bytes(workbook.to_xlsx().unwrap(), &mut target, |_| {}, &CancelSignal::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.imported_count, 1);
        assert_eq!(result.skipped_count, 2);
        let rows: Vec<u32> = result.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![5, 6]);
        assert!(result.errors.iter().all(|e| e.reason.contains("invalid type")));
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_row_errors() {
        let mut workbook = Workbook::new();
        wallet_sheet(
            &mut workbook,
            "เงินสด",
            vec![
                row("2024-01-05", "income", "เงินเดือน", Cell::Number(5.0e16), ""),
                row("2024-01-05", "income", "เงินเดือน", Cell::Number(5.0e16), ""),
                row("2024-01-05", "expense", "อาหาร", Cell::Number(120.0), ""),
            ],
        );

        let mut target = Target::new(NameMatchPolicy::Exact);
        let result = SpreadsheetImporter::new()
            .import_bytes(workbook.to_xlsx().unwrap(), &mut target, |_| {}, &CancelSignal::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.imported_count, 1);
        assert_eq!(result.skipped_count, 2);
        assert!(result.errors.iter().all(|e| e.reason.contains("amount too large")));
        let day = target
            .ledger
            .daily_summary(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .unwrap();
        assert!(day.income.is_zero());
        assert_eq!(day.expense, Money::from_minor(12000));
    }

    #[test]
    fn test_parse_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date_text("2024-01-05").unwrap(), expected);
        assert_eq!(parse_date_text("05.01.2024").unwrap(), expected);
        assert_eq!(parse_date_text("2024/01/05").unwrap(), expected);
        assert_eq!(parse_date_cell(&Data::Float(45296.0)).unwrap(), expected);
        assert_eq!(
            parse_date_text("2024-01-05T12:30:00").unwrap(),
            expected + Duration::minutes(750)
        );
        assert_eq!(
            excel_serial_to_datetime(45296.5).unwrap(),
            expected + Duration::hours(12)
        );
        assert!(parse_date_text("yesterday").is_err());
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(
            parse_amount_cell(&Data::Float(120.456)).unwrap(),
            Money::from_minor(12046)
        );
        assert_eq!(
            parse_amount_cell(&Data::String(" 45,000 ".into())).unwrap(),
            Money::from_minor(4_500_000)
        );
        assert_eq!(parse_amount_cell(&Data::Int(7)).unwrap(), Money::from_minor(700));
        assert!(parse_amount_cell(&Data::Empty).is_err());
        assert!(parse_amount_cell(&Data::Float(-1.0)).is_err());
        assert!(parse_amount_cell(&Data::Float(5.0e16))
            .unwrap_err()
            .contains("amount too large"));
        assert_eq!(
            parse_amount_cell(&Data::Float(Money::MAX_AMOUNT.to_major())).unwrap(),
            Money::MAX_AMOUNT
        );
    }
}
