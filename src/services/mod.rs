//! Service layer for Pocketbook
//!
//! The service layer holds the business logic on top of the models: name
//! reconciliation in the registries, validation and aggregation in the
//! ledger, spreadsheet import, and the session that wires them to storage.

pub mod category;
pub mod import;
pub mod interchange;
pub mod ledger;
pub mod session;
pub mod wallet;

pub use category::CategoryRegistry;
pub use import::{ImportResult, ImportSource, ImportTarget, RowError, SpreadsheetImporter};
pub use interchange::{CancelSignal, InterchangeGate, ProgressReporter};
pub use ledger::{LedgerEvent, LedgerOptions, TransactionLedger};
pub use session::Session;
pub use wallet::WalletRegistry;
