//! Application session
//!
//! Owns the registries and the ledger for one data directory. Loads them from
//! storage on open (seeding empty collections), persists them with batch
//! saves, and is the target the spreadsheet importer reconciles against.

use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::config::{PocketbookPaths, Settings};
use crate::error::{PocketbookResult, ValidationError};
use crate::export::{ExportArtifact, ExportData, SpreadsheetExporter};
use crate::models::{
    Category, CategoryType, Money, NewTransaction, Progress, Transaction, Wallet, WalletKind,
};
use crate::storage::Storage;

use super::category::CategoryRegistry;
use super::import::{ImportResult, ImportTarget, SpreadsheetImporter};
use super::interchange::CancelSignal;
use super::ledger::{LedgerOptions, TransactionLedger};
use super::wallet::WalletRegistry;

/// Everything a frontend needs, passed by reference instead of held globally
#[derive(Debug)]
pub struct Session {
    storage: Storage,
    settings: Settings,
    categories: CategoryRegistry,
    wallets: WalletRegistry,
    ledger: TransactionLedger,
    exporter: SpreadsheetExporter,
    importer: SpreadsheetImporter,
}

impl Session {
    /// Open the data directory, seeding wallets and categories when empty
    pub fn open(paths: PocketbookPaths) -> PocketbookResult<Self> {
        let storage = Storage::new(paths)?;
        let settings = Settings::load_or_create(storage.paths())?;
        let policy = settings.name_match_policy;

        let categories = CategoryRegistry::load_or_seed(storage.load_all()?, policy);
        let wallets = WalletRegistry::load_or_seed(storage.load_all()?, policy, &settings.currency)
            .with_default(settings.default_wallet.clone());
        let ledger = TransactionLedger::from_transactions(
            storage.load_all()?,
            Local::now().date_naive(),
            LedgerOptions::from_settings(&settings),
        );

        info!(
            data_dir = %storage.paths().data_dir().display(),
            wallets = wallets.len(),
            categories = categories.len(),
            transactions = ledger.len(),
            policy = ?policy,
            "session opened"
        );

        Ok(Self {
            storage,
            settings,
            categories,
            wallets,
            ledger,
            exporter: SpreadsheetExporter::new(),
            importer: SpreadsheetImporter::new(),
        })
    }

    /// Persist all three collections
    pub fn save(&self) -> PocketbookResult<()> {
        self.storage.bulk_save(self.wallets.all())?;
        self.storage.bulk_save(self.categories.as_slice())?;
        let transactions: Vec<Transaction> = self.ledger.transactions().cloned().collect();
        self.storage.bulk_save(&transactions)?;
        info!(
            wallets = self.wallets.len(),
            categories = self.categories.len(),
            transactions = transactions.len(),
            "session saved"
        );
        Ok(())
    }

    pub fn paths(&self) -> &PocketbookPaths {
        self.storage.paths()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings and write them out; registry policy applies from the next open
    pub fn update_settings(&mut self, update: impl FnOnce(&mut Settings)) -> PocketbookResult<()> {
        update(&mut self.settings);
        self.settings.save(self.storage.paths())?;
        debug!("settings updated");
        Ok(())
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn wallets(&self) -> &WalletRegistry {
        &self.wallets
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TransactionLedger {
        &mut self.ledger
    }

    /// Validate and record a transaction
    pub fn add_transaction(
        &mut self,
        input: NewTransaction,
    ) -> Result<Transaction, ValidationError> {
        self.ledger
            .add_transaction(input, &self.categories, &self.wallets)
    }

    pub fn create_category(&mut self, name: &str, kind: CategoryType) -> PocketbookResult<Category> {
        self.categories.create(name, kind)
    }

    pub fn create_wallet(
        &mut self,
        name: &str,
        kind: WalletKind,
        initial_balance: Money,
    ) -> PocketbookResult<Wallet> {
        let wallet = Wallet::with_balance(name, kind, self.settings.currency.clone(), initial_balance);
        self.wallets.add(wallet)
    }

    pub fn set_selected_month(&mut self, month: NaiveDate) {
        self.ledger.set_selected_month(month);
    }

    /// Snapshot of what an export reads
    pub fn export_data(&self) -> ExportData {
        ExportData {
            transactions: self.ledger.transactions().cloned().collect(),
            wallets: self.wallets.all().to_vec(),
            categories: self.categories.as_slice().to_vec(),
        }
    }

    /// Build a workbook of the current ledger; `None` while an export is running
    pub async fn export<F>(&self, on_progress: F) -> PocketbookResult<Option<ExportArtifact>>
    where
        F: FnMut(&Progress),
    {
        self.exporter.export(self.export_data(), on_progress).await
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }

    pub fn is_importing(&self) -> bool {
        self.importer.is_busy()
    }

    /// Import a workbook file; `None` while an import is running
    pub async fn import_path<F>(
        &mut self,
        path: &Path,
        on_progress: F,
        cancel: &CancelSignal,
    ) -> PocketbookResult<Option<ImportResult>>
    where
        F: FnMut(&Progress),
    {
        // Clones share the gate
        let importer = self.importer.clone();
        importer.import_path(path, self, on_progress, cancel).await
    }

    /// Import a workbook held in memory; `None` while an import is running
    pub async fn import_bytes<F>(
        &mut self,
        bytes: Vec<u8>,
        on_progress: F,
        cancel: &CancelSignal,
    ) -> PocketbookResult<Option<ImportResult>>
    where
        F: FnMut(&Progress),
    {
        let importer = self.importer.clone();
        importer.import_bytes(bytes, self, on_progress, cancel).await
    }
}

impl ImportTarget for Session {
    fn find_category_by_name(&self, name: &str, kind: CategoryType) -> Option<Category> {
        self.categories.find_by_key(name, kind).cloned()
    }

    fn add_category(&mut self, name: &str, kind: CategoryType) -> PocketbookResult<Category> {
        self.categories.create(name, kind)
    }

    fn wallets(&self) -> Vec<Wallet> {
        self.wallets.all().to_vec()
    }

    fn find_wallet_by_name(&self, name: &str) -> Option<Wallet> {
        self.wallets.find_by_key(name).cloned()
    }

    fn add_wallet(&mut self, name: &str) -> PocketbookResult<Wallet> {
        let currency = self.settings.currency.clone();
        self.wallets
            .find_or_create(name, &currency)
            .map(|(wallet, _)| wallet)
    }

    fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction, ValidationError> {
        Session::add_transaction(self, input)
    }
}
