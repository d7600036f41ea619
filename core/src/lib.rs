//! Pure computation core of the kakeibo tracker: month bucketing,
//! monthly totals, category breakdowns and the view-selection state
//! machine. No I/O happens in this crate — everything is a function of
//! an already-fetched transaction list plus user events, so a render
//! cycle can recompute the whole derived view deterministically.

pub mod aggregation;
pub mod month;
pub mod view;

pub use aggregation::{
    available_months, category_totals, day_totals, filtered_transactions, month_buckets,
    month_totals, transactions_on, AggregationView, CategoryTotal, MonthTotals, CATEGORY_PALETTE,
    UNCATEGORIZED,
};
pub use month::MonthKey;
pub use view::{SwipeDirection, ViewSelection, MIN_SWIPE_DISTANCE, MONTH_FOCUS_THRESHOLD};
