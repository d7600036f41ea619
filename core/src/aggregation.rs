//! The aggregation engine: derives every monthly view — buckets,
//! income/expense/balance totals, category breakdowns and the filtered
//! transaction list — from a flat, unordered transaction list.
//!
//! All functions are pure and total. A malformed record degrades its
//! own ordering or contributes zero to a sum; it never aborts the
//! aggregation of the rest of the list.

use std::collections::HashMap;

use chrono::NaiveDate;
use shared::{Transaction, TransactionType};
use tracing::warn;

use crate::month::{parse_date, MonthKey};

/// Label substituted for an empty category during aggregation only.
pub const UNCATEGORIZED: &str = "未分類";

/// Cyclic chart palette. Entries are assigned by sorted rank, so the
/// largest category of any month always renders in the first color.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#6366f1", "#ec4899", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6", "#ef4444", "#14b8a6",
];

/// Income / expense / balance sums for one month bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthTotals {
    pub income: u64,
    pub expense: u64,
    /// `income - expense`; may be negative, never clamped.
    pub balance: i64,
}

/// One slice of the expense-only category breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: u64,
    pub color: &'static str,
}

fn normalized_category(tx: &Transaction) -> &str {
    if tx.category.is_empty() {
        UNCATEGORIZED
    } else {
        &tx.category
    }
}

/// Group transactions by month key. Total: every record lands in
/// exactly one bucket, whatever its date looks like.
pub fn month_buckets(transactions: &[Transaction]) -> HashMap<MonthKey, Vec<Transaction>> {
    let mut buckets: HashMap<MonthKey, Vec<Transaction>> = HashMap::new();
    for tx in transactions {
        buckets
            .entry(MonthKey::from_date_str(&tx.date))
            .or_default()
            .push(tx.clone());
    }
    buckets
}

/// Distinct month keys in ascending order, always including the month
/// of `today` so the dashboard has a card to land on even with an
/// empty ledger.
pub fn available_months(
    buckets: &HashMap<MonthKey, Vec<Transaction>>,
    today: NaiveDate,
) -> Vec<MonthKey> {
    let mut months: Vec<MonthKey> = buckets.keys().cloned().collect();
    let current = MonthKey::from_date(today);
    if !months.contains(&current) {
        months.push(current);
    }
    months.sort();
    months
}

/// Sum one bucket. An empty bucket yields all zeros.
pub fn month_totals(bucket: &[Transaction]) -> MonthTotals {
    let mut income: u64 = 0;
    let mut expense: u64 = 0;
    for tx in bucket {
        match tx.transaction_type {
            TransactionType::Income => income += tx.amount,
            TransactionType::Expense => expense += tx.amount,
        }
    }
    MonthTotals {
        income,
        expense,
        balance: income as i64 - expense as i64,
    }
}

/// Expense-only category breakdown, largest first. Income is never
/// categorized in the chart. Ties keep first-seen order, and colors
/// follow the sorted rank through the cyclic palette.
pub fn category_totals(bucket: &[Transaction]) -> Vec<CategoryTotal> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, u64> = HashMap::new();
    for tx in bucket {
        if tx.transaction_type == TransactionType::Income {
            continue;
        }
        let category = normalized_category(tx);
        if !sums.contains_key(category) {
            order.push(category.to_string());
        }
        *sums.entry(category.to_string()).or_insert(0) += tx.amount;
    }

    let mut totals: Vec<(String, u64)> = order
        .into_iter()
        .map(|category| {
            let amount = sums[&category];
            (category, amount)
        })
        .collect();
    // Stable sort: equal amounts stay in first-seen order.
    totals.sort_by(|a, b| b.1.cmp(&a.1));

    totals
        .into_iter()
        .enumerate()
        .map(|(rank, (category, amount))| CategoryTotal {
            category,
            amount,
            color: CATEGORY_PALETTE[rank % CATEGORY_PALETTE.len()],
        })
        .collect()
}

/// Per-day totals for the calendar grid. Days without transactions
/// are simply absent (the grid renders them as zero). A record whose
/// date cannot be parsed has no cell to land in; it is logged and
/// left off the calendar, without affecting any other day.
pub fn day_totals(bucket: &[Transaction]) -> HashMap<NaiveDate, MonthTotals> {
    let mut totals: HashMap<NaiveDate, MonthTotals> = HashMap::new();
    for tx in bucket {
        let Some(day) = parse_date(&tx.date) else {
            warn!(date = %tx.date, merchant = %tx.merchant, "unparseable transaction date; omitting from calendar");
            continue;
        };
        let entry = totals.entry(day).or_default();
        match tx.transaction_type {
            TransactionType::Income => entry.income += tx.amount,
            TransactionType::Expense => entry.expense += tx.amount,
        }
        entry.balance = entry.income as i64 - entry.expense as i64;
    }
    totals
}

/// The detail list behind one tapped calendar day, in source-list
/// order.
pub fn transactions_on(bucket: &[Transaction], day: NaiveDate) -> Vec<Transaction> {
    bucket
        .iter()
        .filter(|tx| parse_date(&tx.date) == Some(day))
        .cloned()
        .collect()
}

/// The transaction list for one month, optionally restricted to a
/// category (matched after uncategorized normalization), most recent
/// first. Unparseable dates sort to the oldest end and are logged; the
/// record itself is kept.
pub fn filtered_transactions(
    bucket: &[Transaction],
    category_filter: Option<&str>,
) -> Vec<Transaction> {
    let mut decorated: Vec<(Option<NaiveDate>, Transaction)> = bucket
        .iter()
        .filter(|tx| match category_filter {
            Some(filter) => normalized_category(tx) == filter,
            None => true,
        })
        .map(|tx| {
            let parsed = parse_date(&tx.date);
            if parsed.is_none() {
                warn!(date = %tx.date, merchant = %tx.merchant, "unparseable transaction date; sorting to oldest");
            }
            (parsed, tx.clone())
        })
        .collect();
    // `None < Some(_)`, so malformed dates land at the oldest extreme.
    // Stable: same-date records keep their source-list order.
    decorated.sort_by(|a, b| b.0.cmp(&a.0));
    decorated.into_iter().map(|(_, tx)| tx).collect()
}

/// The fully-derived monthly view a single render consumes.
#[derive(Debug, Clone)]
pub struct AggregationView {
    pub buckets: HashMap<MonthKey, Vec<Transaction>>,
    pub available_months: Vec<MonthKey>,
    pub selected_month: MonthKey,
    pub selected_category: Option<String>,
    /// Totals for the selected month.
    pub totals: MonthTotals,
    pub category_totals: Vec<CategoryTotal>,
    pub filtered_transactions: Vec<Transaction>,
}

impl AggregationView {
    /// Derive the whole view in one pass. Deterministic for a given
    /// input; the source list is never mutated.
    pub fn compute(
        transactions: &[Transaction],
        selected_month: &MonthKey,
        selected_category: Option<&str>,
        today: NaiveDate,
    ) -> Self {
        let buckets = month_buckets(transactions);
        let available_months = available_months(&buckets, today);
        let empty: Vec<Transaction> = Vec::new();
        let bucket = buckets.get(selected_month).unwrap_or(&empty);

        AggregationView {
            totals: month_totals(bucket),
            category_totals: category_totals(bucket),
            filtered_transactions: filtered_transactions(bucket, selected_category),
            available_months,
            selected_month: selected_month.clone(),
            selected_category: selected_category.map(str::to_string),
            buckets,
        }
    }

    /// Totals for any month card in the strip (not just the selection).
    pub fn totals_for(&self, month: &MonthKey) -> MonthTotals {
        self.buckets
            .get(month)
            .map(|bucket| month_totals(bucket))
            .unwrap_or_default()
    }
}
