//! Dashboard coordinator: composes the snapshot store, the
//! view-selection controller and the aggregation engine into the state
//! a render cycle consumes.
//!
//! One instance per ledger source. Theming and drawing live entirely
//! outside; a dark-mode variant of the dashboard is the same
//! coordinator pointed at a different source.

use std::collections::HashMap;

use chrono::NaiveDate;
use kakeibo_core::{AggregationView, MonthKey, MonthTotals, SwipeDirection, ViewSelection};
use kakeibo_client::ClientError;
use shared::Transaction;

use crate::store::ExpenseStore;

pub struct Dashboard {
    store: ExpenseStore,
    selection: ViewSelection,
    today: NaiveDate,
}

impl Dashboard {
    pub fn new(store: ExpenseStore, today: NaiveDate) -> Self {
        Self {
            selection: ViewSelection::new(today),
            store,
            today,
        }
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ExpenseStore {
        &mut self.store
    }

    pub fn selected_month(&self) -> &MonthKey {
        self.selection.selected_month()
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selection.selected_category()
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.store.refresh().await
    }

    /// Derive the view for the current selection. Once the first
    /// snapshot is in (cached or fetched), the one-shot initial scroll
    /// lands the selection on the most recent available month; later
    /// calls never move it.
    pub fn overview(&mut self) -> AggregationView {
        if !self.store.is_loading() {
            let months = kakeibo_core::available_months(
                &kakeibo_core::month_buckets(self.store.transactions()),
                self.today,
            );
            if let Some(target) = self.selection.initial_scroll_target(&months) {
                self.selection.on_month_focus_changed(target);
            }
        }
        AggregationView::compute(
            self.store.transactions(),
            self.selection.selected_month(),
            self.selection.selected_category(),
            self.today,
        )
    }

    /// Per-day totals for the calendar grid. Derived from the whole
    /// snapshot; the grid shows whichever days fall in the selected
    /// month.
    pub fn calendar_day_totals(&self) -> HashMap<NaiveDate, MonthTotals> {
        kakeibo_core::day_totals(self.store.transactions())
    }

    /// Detail list for a tapped calendar day.
    pub fn transactions_on(&self, day: NaiveDate) -> Vec<Transaction> {
        kakeibo_core::transactions_on(self.store.transactions(), day)
    }

    /// A month card crossed the focus threshold in the card strip.
    pub fn on_month_focus_changed(&mut self, month: MonthKey) {
        self.selection.on_month_focus_changed(month);
    }

    /// A category legend entry was tapped.
    pub fn toggle_category(&mut self, category: &str) {
        self.selection.toggle_category(category);
    }

    /// A horizontal swipe finished on the calendar view.
    pub fn swipe(&mut self, direction: SwipeDirection) {
        self.selection.swipe(direction);
    }
}
