//! Property-based tests for ledger aggregation
//!
//! The ledger folds each insert into its daily and monthly aggregates; these
//! properties check the folded state against a full recompute.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use pocketbook::config::NameMatchPolicy;
use pocketbook::models::{
    compute_daily_summaries, compute_monthly_summary, CategoryType, Money, NewTransaction,
    TransactionType,
};
use pocketbook::services::{CategoryRegistry, LedgerOptions, TransactionLedger, WalletRegistry};

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
struct Insert {
    kind: TransactionType,
    minor: i64,
    wallet: usize,
    date: NaiveDateTime,
}

fn arb_kind() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Income),
        Just(TransactionType::Expense),
        Just(TransactionType::Transfer),
    ]
}

/// Timestamps spread over roughly three months so inserts share days and cross months
fn arb_date() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..90, 0i64..86_400).prop_map(|(days, seconds)| {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|start| start + Duration::days(days) + Duration::seconds(seconds))
            .unwrap_or_default()
    })
}

fn arb_insert() -> impl Strategy<Value = Insert> {
    (arb_kind(), 0i64..10_000_000, 0usize..4, arb_date()).prop_map(
        |(kind, minor, wallet, date)| Insert {
            kind,
            minor,
            wallet,
            date,
        },
    )
}

fn arb_month() -> impl Strategy<Value = NaiveDate> {
    (1u32..=4).prop_map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap_or_default())
}

struct Fixture {
    categories: CategoryRegistry,
    wallets: WalletRegistry,
    ledger: TransactionLedger,
}

impl Fixture {
    fn new() -> Self {
        let categories = CategoryRegistry::load_or_seed(Vec::new(), NameMatchPolicy::Exact);
        let wallets = WalletRegistry::load_or_seed(Vec::new(), NameMatchPolicy::Exact, "THB");
        Self {
            categories,
            wallets,
            ledger: TransactionLedger::new(LedgerOptions::default()),
        }
    }

    fn insert(&mut self, op: &Insert) {
        let category_type = op.kind.category_type().unwrap_or(CategoryType::Expense);
        let category = self.categories.all().into_iter().find(|c| c.kind == category_type);
        let category_id = category.map(|c| c.id).unwrap();
        let wallet_id = self.wallets.all()[op.wallet % self.wallets.len()].id;

        let input = NewTransaction::new(op.kind, Money::from_minor(op.minor), category_id)
            .wallet(wallet_id)
            .date(op.date);
        self.ledger
            .add_transaction(input, &self.categories, &self.wallets)
            .unwrap();
    }
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Incremental aggregates equal a full recompute after any insert sequence
    #[test]
    fn prop_incremental_matches_recompute(
        inserts in proptest::collection::vec(arb_insert(), 0..40),
        month in arb_month(),
    ) {
        let mut fixture = Fixture::new();
        fixture.ledger.set_selected_month(month);
        for op in &inserts {
            fixture.insert(op);
        }

        let (daily, monthly) = fixture.ledger.recompute();
        let incremental: Vec<_> = fixture.ledger.daily_summaries().into_iter().cloned().collect();
        prop_assert_eq!(&incremental, &daily);
        prop_assert_eq!(fixture.ledger.monthly_summary(), &monthly);

        let oldest_first: Vec<_> = fixture.ledger.transactions().rev().cloned().collect();
        prop_assert_eq!(compute_daily_summaries(&oldest_first), daily);
        prop_assert_eq!(compute_monthly_summary(&oldest_first, month), monthly);
    }

    /// Monthly balance is income minus expense after every insert and month change
    #[test]
    fn prop_monthly_balance_invariant(
        inserts in proptest::collection::vec(arb_insert(), 1..30),
        months in proptest::collection::vec(arb_month(), 1..4),
    ) {
        let mut fixture = Fixture::new();
        for (i, op) in inserts.iter().enumerate() {
            fixture.insert(op);
            let summary = fixture.ledger.monthly_summary();
            prop_assert_eq!(summary.balance, summary.income - summary.expense);

            if let Some(month) = months.get(i % (months.len() + 1)) {
                fixture.ledger.set_selected_month(*month);
                let summary = fixture.ledger.monthly_summary();
                prop_assert_eq!(summary.balance, summary.income - summary.expense);
            }
        }
    }

    /// Daily totals are the per-type sums of the day's transactions; transfers count for neither
    #[test]
    fn prop_daily_sums_match_contents(
        inserts in proptest::collection::vec(arb_insert(), 0..40),
    ) {
        let mut fixture = Fixture::new();
        for op in &inserts {
            fixture.insert(op);
        }

        let mut total = 0;
        for day in fixture.ledger.daily_summaries() {
            let sum = |kind: TransactionType| -> Money {
                day.transactions.iter().filter(|t| t.kind == kind).map(|t| t.amount).sum()
            };
            prop_assert_eq!(day.income, sum(TransactionType::Income));
            prop_assert_eq!(day.expense, sum(TransactionType::Expense));
            prop_assert!(day.transactions.iter().all(|t| t.day() == day.date));
            total += day.transactions.len();
        }
        prop_assert_eq!(total, inserts.len());
    }
}
