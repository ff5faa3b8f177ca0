//! Derived daily and monthly views over the transaction set
//!
//! The ledger maintains these incrementally; the `compute_*` functions here
//! re-derive them from scratch and are the reference the incremental path is
//! checked against.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use super::money::Money;
use super::transaction::{Transaction, TransactionType};

/// Totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub income: Money,
    pub expense: Money,
    /// Transactions on this day, in insertion order
    pub transactions: Vec<Transaction>,
}

impl DailySummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            income: Money::zero(),
            expense: Money::zero(),
            transactions: Vec::new(),
        }
    }

    /// Fold one transaction into the day's totals
    pub fn record(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionType::Income => self.income += txn.amount,
            TransactionType::Expense => self.expense += txn.amount,
            TransactionType::Transfer => {}
        }
        self.transactions.push(txn.clone());
    }

    pub fn balance(&self) -> Money {
        self.income - self.expense
    }
}

/// Totals for one (year, month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    pub expense: Money,
    /// Always `income - expense`
    pub balance: Money,
}

impl MonthlySummary {
    /// An empty summary for the month containing `date`
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            income: Money::zero(),
            expense: Money::zero(),
            balance: Money::zero(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Fold one transaction in if it falls inside this month
    pub fn record(&mut self, txn: &Transaction) {
        if !self.contains(txn.day()) {
            return;
        }
        match txn.kind {
            TransactionType::Income => self.income += txn.amount,
            TransactionType::Expense => self.expense += txn.amount,
            TransactionType::Transfer => return,
        }
        self.balance = self.income - self.expense;
    }
}

/// Group transactions (given in insertion order) by calendar day, newest day first
pub fn compute_daily_summaries<'a, I>(transactions: I) -> Vec<DailySummary>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();
    for txn in transactions {
        days.entry(txn.day())
            .or_insert_with(|| DailySummary::new(txn.day()))
            .record(txn);
    }
    days.into_values().rev().collect()
}

/// Sum income and expense for the month containing `selected_month`
pub fn compute_monthly_summary<'a, I>(transactions: I, selected_month: NaiveDate) -> MonthlySummary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = MonthlySummary::empty(selected_month);
    for txn in transactions {
        summary.record(txn);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, TransactionId, WalletId};
    use chrono::Utc;

    fn txn(day: u32, month: u32, kind: TransactionType, minor: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            wallet_id: WalletId::new(),
            category_id: CategoryId::new(),
            kind,
            amount: Money::from_minor(minor),
            currency: "THB".into(),
            date: NaiveDate::from_ymd_opt(2024, month, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_daily_grouping_sorted_descending() {
        let txns = vec![
            txn(5, 1, TransactionType::Expense, 12000),
            txn(6, 1, TransactionType::Expense, 5000),
            txn(5, 1, TransactionType::Income, 4_500_000),
        ];

        let days = compute_daily_summaries(&txns);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(days[0].expense, Money::from_minor(5000));
        assert_eq!(days[0].income, Money::zero());

        assert_eq!(days[1].income, Money::from_minor(4_500_000));
        assert_eq!(days[1].expense, Money::from_minor(12000));
        assert_eq!(days[1].transactions[0].id, txns[0].id);
        assert_eq!(days[1].transactions[1].id, txns[2].id);
    }

    #[test]
    fn test_transfers_excluded() {
        let txns = vec![
            txn(5, 1, TransactionType::Transfer, 100_000),
            txn(5, 1, TransactionType::Expense, 100),
        ];

        let days = compute_daily_summaries(&txns);
        assert_eq!(days[0].income, Money::zero());
        assert_eq!(days[0].expense, Money::from_minor(100));
        assert_eq!(days[0].transactions.len(), 2);

        let month = compute_monthly_summary(&txns, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(month.expense, Money::from_minor(100));
        assert_eq!(month.balance, Money::from_minor(-100));
    }

    #[test]
    fn test_monthly_filters_by_month_and_year() {
        let mut other_year = txn(5, 1, TransactionType::Income, 999);
        other_year.date = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let txns = vec![
            txn(5, 1, TransactionType::Income, 4_500_000),
            txn(6, 1, TransactionType::Expense, 12000),
            txn(1, 2, TransactionType::Expense, 700),
            other_year,
        ];

        let january = compute_monthly_summary(&txns, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!((january.year, january.month), (2024, 1));
        assert_eq!(january.income, Money::from_minor(4_500_000));
        assert_eq!(january.expense, Money::from_minor(12000));
        assert_eq!(january.balance, january.income - january.expense);

        let february = compute_monthly_summary(&txns, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(february.income, Money::zero());
        assert_eq!(february.expense, Money::from_minor(700));
    }

    #[test]
    fn test_empty_month() {
        let summary = compute_monthly_summary(&Vec::<Transaction>::new(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(summary, MonthlySummary::empty(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()));
    }
}
