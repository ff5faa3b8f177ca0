//! Core data models for Pocketbook
//!
//! This module contains the data structures of the ledger domain: wallets,
//! categories, transactions, money, and the summaries derived from them.

pub mod category;
pub mod ids;
pub mod money;
pub mod progress;
pub mod summary;
pub mod transaction;
pub mod wallet;

pub use category::{seed_categories, Category, CategoryType};
pub use ids::{CategoryId, TransactionId, WalletId};
pub use money::{Money, MoneyParseError};
pub use progress::{Phase, Progress, ProgressStatus};
pub use summary::{compute_daily_summaries, compute_monthly_summary, DailySummary, MonthlySummary};
pub use transaction::{NewTransaction, Transaction, TransactionType};
pub use wallet::{seed_wallets, Wallet, WalletKind};
