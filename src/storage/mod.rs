//! Storage layer for Pocketbook
//!
//! One JSON file per entity kind in the data directory. The rest of the crate
//! only needs two operations: load every item of a kind, and replace every
//! item of a kind in one batch.

pub mod file_io;

pub use file_io::{read_json, write_json_atomic};

use std::fmt;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::paths::PocketbookPaths;
use crate::error::PocketbookError;
use crate::models::{Category, Transaction, Wallet};

/// The persisted entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Wallets,
    Categories,
    Transactions,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallets => write!(f, "wallets"),
            Self::Categories => write!(f, "categories"),
            Self::Transactions => write!(f, "transactions"),
        }
    }
}

/// An entity that lives in one of the storage collections
pub trait StoredEntity: Serialize + DeserializeOwned {
    const KIND: EntityKind;
}

impl StoredEntity for Wallet {
    const KIND: EntityKind = EntityKind::Wallets;
}

impl StoredEntity for Category {
    const KIND: EntityKind = EntityKind::Categories;
}

impl StoredEntity for Transaction {
    const KIND: EntityKind = EntityKind::Transactions;
}

/// JSON-file store rooted at a data directory
#[derive(Debug, Clone)]
pub struct Storage {
    paths: PocketbookPaths,
}

impl Storage {
    /// Create a storage handle, creating directories as needed
    pub fn new(paths: PocketbookPaths) -> Result<Self, PocketbookError> {
        paths.ensure_directories()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &PocketbookPaths {
        &self.paths
    }

    fn file_for(&self, kind: EntityKind) -> PathBuf {
        match kind {
            EntityKind::Wallets => self.paths.wallets_file(),
            EntityKind::Categories => self.paths.categories_file(),
            EntityKind::Transactions => self.paths.transactions_file(),
        }
    }

    /// Load every stored item of `T`'s kind; a missing file is empty
    pub fn load_all<T: StoredEntity>(&self) -> Result<Vec<T>, PocketbookError> {
        let items: Vec<T> = read_json(self.file_for(T::KIND))?;
        debug!(kind = %T::KIND, count = items.len(), "loaded");
        Ok(items)
    }

    /// Replace the stored collection of `T`'s kind with `items`
    pub fn bulk_save<T: StoredEntity>(&self, items: &[T]) -> Result<(), PocketbookError> {
        write_json_atomic(self.file_for(T::KIND), items)?;
        debug!(kind = %T::KIND, count = items.len(), "saved");
        Ok(())
    }
}
