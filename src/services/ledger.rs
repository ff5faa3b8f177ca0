//! Transaction ledger
//!
//! Owns the transaction set and its derived daily and monthly aggregates.
//! Inserts are validated against the registries, then folded into the one
//! touched day bucket and, when it matches, the selected month. Listeners
//! subscribe to a broadcast channel of [`LedgerEvent`]s; short-lived UI state
//! (the "added" toast and the new-transaction markers) expires on deadlines
//! that a driver fires through [`TransactionLedger::expire_transients`].

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, SubsecRound, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::ValidationError;
use crate::models::{
    compute_daily_summaries, compute_monthly_summary, DailySummary, MonthlySummary,
    NewTransaction, Transaction, TransactionId, TransactionType,
};

use super::category::CategoryRegistry;
use super::wallet::WalletRegistry;

const EVENT_CAPACITY: usize = 64;

/// Notifications published by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    TransactionAdded {
        id: TransactionId,
        kind: TransactionType,
    },
    ToastShown {
        kind: TransactionType,
    },
    ToastHidden,
    MarkerCleared {
        id: TransactionId,
    },
    MonthChanged {
        month: NaiveDate,
    },
}

/// Ledger tunables
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    pub toast_duration: Duration,
    pub marker_duration: Duration,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl LedgerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            toast_duration: Duration::from_millis(settings.toast_duration_ms),
            marker_duration: Duration::from_millis(settings.marker_duration_ms),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Toast {
    kind: TransactionType,
    hide_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    id: TransactionId,
    clear_at: Instant,
}

/// The transaction set plus its aggregates
#[derive(Debug)]
pub struct TransactionLedger {
    options: LedgerOptions,
    /// Insertion order, oldest first
    transactions: Vec<Transaction>,
    index: HashMap<TransactionId, usize>,
    daily: BTreeMap<NaiveDate, DailySummary>,
    selected_month: NaiveDate,
    monthly: MonthlySummary,
    toast: Option<Toast>,
    markers: Vec<Marker>,
    events: broadcast::Sender<LedgerEvent>,
}

impl TransactionLedger {
    /// Create an empty ledger showing the current month
    pub fn new(options: LedgerOptions) -> Self {
        Self::from_transactions(Vec::new(), Local::now().date_naive(), options)
    }

    /// Load persisted transactions (most recent insert first) without emitting events
    pub fn from_transactions(
        existing: Vec<Transaction>,
        selected_month: NaiveDate,
        options: LedgerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut transactions = existing;
        transactions.reverse();

        let mut ledger = Self {
            options,
            index: HashMap::with_capacity(transactions.len()),
            transactions,
            daily: BTreeMap::new(),
            selected_month,
            monthly: MonthlySummary::empty(selected_month),
            toast: None,
            markers: Vec::new(),
            events,
        };
        ledger.rebuild_aggregates();
        ledger
    }

    fn rebuild_aggregates(&mut self) {
        self.index = self
            .transactions
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
        self.daily = compute_daily_summaries(&self.transactions)
            .into_iter()
            .map(|day| (day.date, day))
            .collect();
        self.monthly = compute_monthly_summary(&self.transactions, self.selected_month);
    }

    /// Subscribe to ledger events
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: LedgerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Validate and record a new transaction
    ///
    /// On failure nothing in the ledger changes.
    pub fn add_transaction(
        &mut self,
        input: NewTransaction,
        categories: &CategoryRegistry,
        wallets: &WalletRegistry,
    ) -> Result<Transaction, ValidationError> {
        let category = categories
            .get(input.category_id)
            .ok_or_else(|| ValidationError::CategoryNotFound(input.category_id.to_string()))?;

        if let Some(expected) = input.kind.category_type() {
            if category.kind != expected {
                return Err(ValidationError::CategoryTypeMismatch {
                    category: category.name.clone(),
                    category_type: category.kind.to_string(),
                    transaction_type: input.kind.to_string(),
                });
            }
        }

        if input.amount.is_negative() {
            return Err(ValidationError::NegativeAmount(input.amount.to_string()));
        }
        if input.amount.exceeds_limit() {
            return Err(ValidationError::AmountTooLarge(input.amount.to_string()));
        }

        let wallet = match input.wallet_id {
            Some(id) => wallets
                .get(id)
                .ok_or_else(|| ValidationError::WalletNotFound(id.to_string()))?,
            None => wallets
                .default_wallet()
                .ok_or_else(|| ValidationError::WalletNotFound("default wallet".into()))?,
        };

        let now = Utc::now();
        let txn = Transaction {
            id: TransactionId::new(),
            wallet_id: wallet.id,
            category_id: category.id,
            kind: input.kind,
            amount: input.amount,
            currency: wallet.currency.clone(),
            // Whole seconds, the precision a workbook date cell keeps
            date: input
                .date
                .unwrap_or_else(|| Local::now().naive_local())
                .trunc_subsecs(0),
            note: input.note.filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        self.record(txn.clone());
        debug!(id = %txn.id, kind = %txn.kind, amount = %txn.amount, "transaction added");
        Ok(txn)
    }

    fn record(&mut self, txn: Transaction) {
        self.daily
            .entry(txn.day())
            .or_insert_with(|| DailySummary::new(txn.day()))
            .record(&txn);
        self.monthly.record(&txn);

        let now = Instant::now();
        // A newer toast replaces the pending one along with its hide deadline
        self.toast = Some(Toast {
            kind: txn.kind,
            hide_at: now + self.options.toast_duration,
        });
        self.markers.push(Marker {
            id: txn.id,
            clear_at: now + self.options.marker_duration,
        });

        self.publish(LedgerEvent::TransactionAdded {
            id: txn.id,
            kind: txn.kind,
        });
        self.publish(LedgerEvent::ToastShown { kind: txn.kind });

        self.index.insert(txn.id, self.transactions.len());
        self.transactions.push(txn);
    }

    /// Select the month the monthly summary covers
    pub fn set_selected_month(&mut self, month: NaiveDate) {
        self.selected_month = month;
        self.monthly = compute_monthly_summary(&self.transactions, month);
        info!(month = %month.format("%Y-%m"), "selected month changed");
        self.publish(LedgerEvent::MonthChanged { month });
    }

    pub fn selected_month(&self) -> NaiveDate {
        self.selected_month
    }

    pub fn monthly_summary(&self) -> &MonthlySummary {
        &self.monthly
    }

    /// Daily summaries, newest day first
    pub fn daily_summaries(&self) -> Vec<&DailySummary> {
        self.daily.values().rev().collect()
    }

    /// Summary for one day, if it has transactions
    pub fn daily_summary(&self, date: NaiveDate) -> Option<&DailySummary> {
        self.daily.get(&date)
    }

    /// Transactions in storage order, most recent insert first
    pub fn transactions(
        &self,
    ) -> impl DoubleEndedIterator<Item = &Transaction> + ExactSizeIterator + '_ {
        self.transactions.iter().rev()
    }

    /// Transactions by date, newest first; ties broken by creation time
    pub fn sorted_transactions(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions().collect();
        sorted.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        sorted
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.index.get(&id).map(|&i| &self.transactions[i])
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Re-derive both aggregates from the full transaction set
    pub fn recompute(&self) -> (Vec<DailySummary>, MonthlySummary) {
        (
            compute_daily_summaries(&self.transactions),
            compute_monthly_summary(&self.transactions, self.selected_month),
        )
    }

    // === Transient UI state ===

    /// Kind of the transaction the visible toast announces
    pub fn toast(&self) -> Option<TransactionType> {
        self.toast.map(|t| t.kind)
    }

    /// Ids still marked as newly added, oldest first
    pub fn new_transaction_ids(&self) -> Vec<TransactionId> {
        self.markers.iter().map(|m| m.id).collect()
    }

    /// Hide the toast now, cancelling its scheduled hide
    ///
    /// Returns false when no toast was showing.
    pub fn hide_toast(&mut self) -> bool {
        if self.toast.take().is_some() {
            self.publish(LedgerEvent::ToastHidden);
            true
        } else {
            false
        }
    }

    /// Earliest pending expiry, if any
    pub fn next_expiry(&self) -> Option<Instant> {
        let toast = self.toast.map(|t| t.hide_at);
        let marker = self.markers.iter().map(|m| m.clear_at).min();
        match (toast, marker) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire every expiry due at `now`; returns how many fired
    pub fn expire_transients(&mut self, now: Instant) -> usize {
        let mut fired = 0;

        if self.toast.is_some_and(|t| t.hide_at <= now) {
            self.toast = None;
            self.publish(LedgerEvent::ToastHidden);
            fired += 1;
        }

        let (due, pending): (Vec<Marker>, Vec<Marker>) =
            self.markers.iter().partition(|m| m.clear_at <= now);
        self.markers = pending;
        for marker in due {
            self.publish(LedgerEvent::MarkerCleared { id: marker.id });
            fired += 1;
        }

        fired
    }
}
