//! Orchestration layer: owns the transaction snapshot, drives the
//! fetch/mutate-refresh cycle against the record store, and wires the
//! pure aggregation core to view-selection events. Everything the
//! presentation layer needs short of actually drawing pixels.

pub mod dashboard;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use dashboard::Dashboard;
pub use store::ExpenseStore;
