//! Custom error types for Pocketbook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// Reasons a single insert or entity is rejected
///
/// These are local failures: they reject one `add_transaction` (or one
/// registry `add`) call and never abort an import run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category-not-found: {0}")]
    CategoryNotFound(String),

    #[error("wallet-not-found: {0}")]
    WalletNotFound(String),

    #[error("category-type-mismatch: category '{category}' is {category_type}, transaction is {transaction_type}")]
    CategoryTypeMismatch {
        category: String,
        category_type: String,
        transaction_type: String,
    },

    #[error("negative-amount: {0}")]
    NegativeAmount(String),

    #[error("amount-too-large: {0}")]
    AmountTooLarge(String),

    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    #[error("{entity} name too long ({len} chars, max {max})")]
    NameTooLong {
        entity: &'static str,
        len: usize,
        max: usize,
    },
}

impl ValidationError {
    /// Stable machine-readable code for this failure
    pub fn code(&self) -> &'static str {
        match self {
            Self::CategoryNotFound(_) => "category-not-found",
            Self::WalletNotFound(_) => "wallet-not-found",
            Self::CategoryTypeMismatch { .. } => "category-type-mismatch",
            Self::NegativeAmount(_) => "negative-amount",
            Self::AmountTooLarge(_) => "amount-too-large",
            Self::EmptyName(_) => "empty-name",
            Self::NameTooLong { .. } => "name-too-long",
        }
    }
}

/// The main error type for Pocketbook operations
#[derive(Error, Debug)]
pub enum PocketbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors, including artifact serialization
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for inserts and entities
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate natural key
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Export requested with no transactions
    #[error("Nothing to export: the ledger has no transactions")]
    EmptyDataset,

    /// Import file could not be read as a workbook
    #[error("Unreadable workbook: {0}")]
    FileFormat(String),

    /// A long-running import was abandoned by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PocketbookError {
    /// Create a "not found" error for wallets
    pub fn wallet_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Wallet",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether a caller may retry the same operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Storage(_))
    }
}

impl From<std::io::Error> for PocketbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PocketbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Pocketbook operations
pub type PocketbookResult<T> = Result<T, PocketbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PocketbookError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = PocketbookError::wallet_not_found("Cash");
        assert_eq!(err.to_string(), "Wallet not found: Cash");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_codes() {
        let err = ValidationError::CategoryTypeMismatch {
            category: "Salary".into(),
            category_type: "income".into(),
            transaction_type: "expense".into(),
        };
        assert_eq!(err.code(), "category-type-mismatch");
        assert!(err.to_string().starts_with("category-type-mismatch"));

        let wrapped: PocketbookError = err.into();
        assert!(wrapped.is_validation());
    }

    #[test]
    fn test_amount_too_large_code() {
        let err = ValidationError::AmountTooLarge("500000000000000.00".into());
        assert_eq!(err.code(), "amount-too-large");
        assert!(err.to_string().starts_with("amount-too-large"));
    }

    #[test]
    fn test_empty_dataset_not_retryable() {
        assert!(!PocketbookError::EmptyDataset.is_retryable());
        assert!(PocketbookError::Io("disk full".into()).is_retryable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PocketbookError = io_err.into();
        assert!(matches!(err, PocketbookError::Io(_)));
    }
}
