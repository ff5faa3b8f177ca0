//! Wallet registry
//!
//! Owns the wallet set. The natural key is the wallet name, normalized by the
//! configured [`NameMatchPolicy`]. Wallets are never updated or removed.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::NameMatchPolicy;
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{seed_wallets, Wallet, WalletId, WalletKind};

/// In-memory wallet set with id and name indexes
#[derive(Debug, Clone)]
pub struct WalletRegistry {
    policy: NameMatchPolicy,
    wallets: Vec<Wallet>,
    by_id: HashMap<WalletId, usize>,
    by_name: HashMap<String, usize>,
    /// Name of the wallet used when a transaction omits one
    default_name: Option<String>,
}

impl WalletRegistry {
    /// Create an empty registry
    pub fn new(policy: NameMatchPolicy) -> Self {
        Self {
            policy,
            wallets: Vec::new(),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            default_name: None,
        }
    }

    /// Build a registry from stored wallets, in storage order; first match wins
    pub fn load(wallets: Vec<Wallet>, policy: NameMatchPolicy) -> Self {
        let mut registry = Self::new(policy);
        for wallet in wallets {
            if registry.by_id.contains_key(&wallet.id) {
                warn!(id = %wallet.id, "dropping wallet with duplicate id");
                continue;
            }
            let idx = registry.wallets.len();
            registry.by_id.insert(wallet.id, idx);
            let key = policy.normalize(&wallet.name);
            if registry.by_name.contains_key(&key) {
                warn!(name = %wallet.name, "wallet name shadowed by an earlier entry");
            } else {
                registry.by_name.insert(key, idx);
            }
            registry.wallets.push(wallet);
        }
        registry
    }

    /// Load stored wallets, falling back to the seed set when there are none
    pub fn load_or_seed(wallets: Vec<Wallet>, policy: NameMatchPolicy, currency: &str) -> Self {
        if wallets.is_empty() {
            debug!("no stored wallets, using seed set");
            Self::load(seed_wallets(currency), policy)
        } else {
            Self::load(wallets, policy)
        }
    }

    /// Prefer the named wallet as the default wallet
    pub fn with_default(mut self, name: Option<String>) -> Self {
        self.default_name = name;
        self
    }

    pub fn policy(&self) -> NameMatchPolicy {
        self.policy
    }

    /// Find a wallet by name
    pub fn find_by_key(&self, name: &str) -> Option<&Wallet> {
        self.by_name
            .get(&self.policy.normalize(name))
            .map(|&idx| &self.wallets[idx])
    }

    /// Get a wallet by id
    pub fn get(&self, id: WalletId) -> Option<&Wallet> {
        self.by_id.get(&id).map(|&idx| &self.wallets[idx])
    }

    /// Find a wallet by name or id string
    pub fn find(&self, identifier: &str) -> Option<&Wallet> {
        self.find_by_key(identifier).or_else(|| {
            identifier
                .parse::<WalletId>()
                .ok()
                .and_then(|id| self.get(id))
        })
    }

    /// The configured default wallet, or the first wallet
    pub fn default_wallet(&self) -> Option<&Wallet> {
        if let Some(name) = &self.default_name {
            match self.find_by_key(name) {
                Some(wallet) => return Some(wallet),
                None => warn!(name = %name, "configured default wallet not found"),
            }
        }
        self.wallets.first()
    }

    /// Add a wallet
    ///
    /// # Errors
    ///
    /// Fails when the wallet does not validate or its id or name is taken.
    pub fn add(&mut self, wallet: Wallet) -> PocketbookResult<Wallet> {
        wallet.validate()?;

        let key = self.policy.normalize(&wallet.name);
        if self.by_name.contains_key(&key) {
            return Err(PocketbookError::Duplicate {
                entity_type: "Wallet",
                identifier: wallet.name,
            });
        }
        if self.by_id.contains_key(&wallet.id) {
            return Err(PocketbookError::Duplicate {
                entity_type: "Wallet",
                identifier: wallet.id.to_string(),
            });
        }

        let idx = self.wallets.len();
        self.by_id.insert(wallet.id, idx);
        self.by_name.insert(key, idx);
        self.wallets.push(wallet.clone());
        debug!(name = %wallet.name, kind = %wallet.kind, "added wallet");
        Ok(wallet)
    }

    /// Return the wallet with this name, creating a cash wallet if absent
    ///
    /// The flag is true when the wallet was created.
    pub fn find_or_create(&mut self, name: &str, currency: &str) -> PocketbookResult<(Wallet, bool)> {
        if let Some(existing) = self.find_by_key(name) {
            return Ok((existing.clone(), false));
        }
        self.add(Wallet::new(name, WalletKind::Cash, currency))
            .map(|w| (w, true))
    }

    /// All wallets in storage order
    pub fn all(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
