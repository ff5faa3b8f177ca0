//! Wallet model
//!
//! Represents the places money lives (cash, bank accounts, e-wallets, credit
//! cards). A wallet's balances are descriptive; the ledger never recomputes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::WalletId;
use super::money::Money;
use crate::error::ValidationError;

/// Maximum wallet name length in characters
pub const MAX_WALLET_NAME_LEN: usize = 100;

/// Kind of wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// Physical cash
    #[default]
    Cash,
    /// Bank account
    Bank,
    /// Mobile payment / e-wallet
    EWallet,
    /// Credit card
    CreditCard,
}

impl WalletKind {
    /// Returns true if a balance in this wallet is money owed
    pub fn is_liability(&self) -> bool {
        matches!(self, Self::CreditCard)
    }

    /// Parse wallet kind from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank" | "checking" | "savings" => Some(Self::Bank),
            "e_wallet" | "ewallet" | "e-wallet" => Some(Self::EWallet),
            "credit_card" | "creditcard" | "credit" => Some(Self::CreditCard),
            _ => None,
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::Bank => write!(f, "Bank"),
            Self::EWallet => write!(f, "E-Wallet"),
            Self::CreditCard => write!(f, "Credit Card"),
        }
    }
}

/// A wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique identifier
    pub id: WalletId,

    /// Wallet name, the natural key used when reconciling imports
    pub name: String,

    /// Kind of wallet
    #[serde(rename = "type")]
    pub kind: WalletKind,

    /// ISO currency code
    pub currency: String,

    /// Balance when the wallet was opened
    #[serde(default)]
    pub initial_balance: Money,

    /// Last known balance
    #[serde(default)]
    pub current_balance: Money,

    /// Whether the balance counts toward assets
    #[serde(default = "default_is_asset")]
    pub is_asset: bool,

    /// When the wallet was created
    pub created_at: DateTime<Utc>,
}

fn default_is_asset() -> bool {
    true
}

impl Wallet {
    /// Create a new wallet with zero balances
    pub fn new(name: impl Into<String>, kind: WalletKind, currency: impl Into<String>) -> Self {
        Self {
            id: WalletId::new(),
            name: name.into(),
            kind,
            currency: currency.into(),
            initial_balance: Money::zero(),
            current_balance: Money::zero(),
            is_asset: !kind.is_liability(),
            created_at: Utc::now(),
        }
    }

    /// Create a new wallet with an opening balance
    pub fn with_balance(
        name: impl Into<String>,
        kind: WalletKind,
        currency: impl Into<String>,
        balance: Money,
    ) -> Self {
        let mut wallet = Self::new(name, kind, currency);
        wallet.initial_balance = balance;
        wallet.current_balance = balance;
        wallet
    }

    /// Validate the wallet
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("Wallet"));
        }

        let len = self.name.chars().count();
        if len > MAX_WALLET_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                entity: "Wallet",
                len,
                max: MAX_WALLET_NAME_LEN,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Build the seed wallet set; the first wallet is the default wallet
pub fn seed_wallets(currency: &str) -> Vec<Wallet> {
    vec![
        Wallet::new("เงินสด", WalletKind::Cash, currency),
        Wallet::new("ธ.กสิกรไทย", WalletKind::Bank, currency),
        Wallet::new("PromptPay", WalletKind::EWallet, currency),
        Wallet::new("บัตรเครดิต KBank", WalletKind::CreditCard, currency),
    ]
}
