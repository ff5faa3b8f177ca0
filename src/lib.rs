//! Pocketbook - personal finance ledger
//!
//! Records income, expense and transfer transactions against wallets and
//! categories, keeps daily and monthly aggregates current as transactions are
//! added, and moves the whole ledger in and out of xlsx workbooks.
//!
//! # Architecture
//!
//! - `config`: Data directory resolution and user settings
//! - `error`: Custom error types
//! - `models`: Core data models (wallets, categories, transactions, summaries)
//! - `storage`: JSON file storage layer
//! - `services`: Registries, ledger, importer and the session object
//! - `export`: xlsx workbook writer and ledger exporter
//! - `cli`: Command handlers for the `pocketbook` binary
//! - `display`: Table formatting for terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use pocketbook::config::PocketbookPaths;
//! use pocketbook::services::Session;
//!
//! let session = Session::open(PocketbookPaths::new()?)?;
//! println!("{} transactions", session.ledger().len());
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{PocketbookError, PocketbookResult};
