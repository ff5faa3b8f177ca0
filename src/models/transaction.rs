//! Transaction model
//!
//! A transaction records one movement of money in a wallet. Transactions are
//! immutable once the ledger has accepted them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::CategoryType;
use super::ids::{CategoryId, TransactionId, WalletId};
use super::money::Money;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    /// Movement between wallets; excluded from income and expense totals
    Transfer,
}

impl TransactionType {
    /// Parse a transaction type, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    /// The category type this transaction type must be filed under, if any
    pub fn category_type(&self) -> Option<CategoryType> {
        match self {
            Self::Income => Some(CategoryType::Income),
            Self::Expense => Some(CategoryType::Expense),
            Self::Transfer => None,
        }
    }
}

impl From<CategoryType> for TransactionType {
    fn from(kind: CategoryType) -> Self {
        match kind {
            CategoryType::Income => Self::Income,
            CategoryType::Expense => Self::Expense,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique, time-ordered identifier
    pub id: TransactionId,

    /// The wallet this transaction belongs to
    pub wallet_id: WalletId,

    /// The category this transaction is filed under
    pub category_id: CategoryId,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Non-negative amount; direction comes from `kind`
    pub amount: Money,

    pub currency: String,

    /// When the transaction happened (local time)
    pub date: NaiveDateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Calendar day used for daily grouping
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Note text, empty when absent
    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.amount
        )
    }
}

/// Input to `TransactionLedger::add_transaction`
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Money,
    pub category_id: CategoryId,
    /// Defaults to the ledger's default wallet
    pub wallet_id: Option<WalletId>,
    pub note: Option<String>,
    /// Defaults to now
    pub date: Option<NaiveDateTime>,
}

impl NewTransaction {
    pub fn new(kind: TransactionType, amount: Money, category_id: CategoryId) -> Self {
        Self {
            kind,
            amount,
            category_id,
            wallet_id: None,
            note: None,
            date: None,
        }
    }

    pub fn wallet(mut self, wallet_id: WalletId) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    /// Attach a note; empty notes are stored as absent
    pub fn note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.is_empty() { None } else { Some(note) };
        self
    }

    pub fn date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parse() {
        assert_eq!(TransactionType::parse("Income"), Some(TransactionType::Income));
        assert_eq!(TransactionType::parse(" expense "), Some(TransactionType::Expense));
        assert_eq!(TransactionType::parse("TRANSFER"), Some(TransactionType::Transfer));
        assert_eq!(TransactionType::parse("refund"), None);
    }

    #[test]
    fn test_category_type() {
        assert_eq!(
            TransactionType::Income.category_type(),
            Some(CategoryType::Income)
        );
        assert_eq!(TransactionType::Transfer.category_type(), None);
        assert_eq!(
            TransactionType::from(CategoryType::Expense),
            TransactionType::Expense
        );
    }

    #[test]
    fn test_new_transaction_builder() {
        let category_id = CategoryId::new();
        let wallet_id = WalletId::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let input = NewTransaction::new(TransactionType::Expense, Money::from_minor(12000), category_id)
            .wallet(wallet_id)
            .note("")
            .date(date);

        assert_eq!(input.wallet_id, Some(wallet_id));
        assert_eq!(input.note, None);
        assert_eq!(input.date, Some(date));
    }

    #[test]
    fn test_serialization() {
        let now = Utc::now();
        let txn = Transaction {
            id: TransactionId::new(),
            wallet_id: WalletId::new(),
            category_id: CategoryId::new(),
            kind: TransactionType::Expense,
            amount: Money::from_minor(12000),
            currency: "THB".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            note: Some("lunch".into()),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains(r#""type":"expense""#));
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(txn, deserialized);
        assert_eq!(deserialized.day(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }
}
