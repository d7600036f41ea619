//! View-selection state: which month is under view, which category
//! filter is active, and the one-shot scroll-to-latest initialization.
//!
//! The controller never does I/O. Presentation feeds it abstract
//! events — "this month card took focus", "this legend entry was
//! tapped", "a horizontal swipe finished" — and reads the selection
//! back when recomputing the aggregation view.

use chrono::NaiveDate;
use tracing::debug;

use crate::month::MonthKey;

/// Share of the viewport a month card must occupy before it counts as
/// focused. A presentation policy, kept next to the transition it
/// drives so the tie-break for partially-visible cards is in one place.
pub const MONTH_FOCUS_THRESHOLD: f32 = 0.6;

/// Minimum horizontal displacement (in presentation units, px) before
/// a gesture counts as a swipe rather than a tap or vertical scroll.
pub const MIN_SWIPE_DISTANCE: f32 = 50.0;

/// A recognized horizontal swipe on the calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Swipe left: advance to the next month.
    NextMonth,
    /// Swipe right: go back to the previous month.
    PreviousMonth,
}

impl SwipeDirection {
    /// Classify a finished gesture from its horizontal displacement
    /// (`start_x - end_x`). Displacements below the threshold are
    /// rejected as accidental taps.
    pub fn from_displacement(dx: f32) -> Option<SwipeDirection> {
        if dx > MIN_SWIPE_DISTANCE {
            Some(SwipeDirection::NextMonth)
        } else if dx < -MIN_SWIPE_DISTANCE {
            Some(SwipeDirection::PreviousMonth)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Uninitialized,
    Initialized,
}

/// Owner of `selected_month` and `selected_category`. The only writer
/// of either field in the whole application.
#[derive(Debug, Clone)]
pub struct ViewSelection {
    selected_month: MonthKey,
    selected_category: Option<String>,
    init: InitState,
}

impl ViewSelection {
    /// On first load the current calendar month is selected, before
    /// any data has arrived.
    pub fn new(today: NaiveDate) -> Self {
        ViewSelection {
            selected_month: MonthKey::from_date(today),
            selected_category: None,
            init: InitState::Uninitialized,
        }
    }

    pub fn selected_month(&self) -> &MonthKey {
        &self.selected_month
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// A month card took focus (scroll, swipe on the card strip, or an
    /// explicit next/prev action). Any actual month change
    /// unconditionally drops the category filter, so switching to a
    /// month without the filtered category can never show a silently
    /// empty list.
    pub fn on_month_focus_changed(&mut self, month: MonthKey) {
        if month == self.selected_month {
            return;
        }
        debug!(from = %self.selected_month, to = %month, "month selection changed");
        self.selected_month = month;
        self.selected_category = None;
    }

    /// Legend tap: activate the category filter, or clear it when the
    /// same entry is tapped again. At most one category is active.
    pub fn toggle_category(&mut self, category: &str) {
        if self.selected_category.as_deref() == Some(category) {
            self.selected_category = None;
        } else {
            self.selected_category = Some(category.to_string());
        }
    }

    /// Calendar-view swipe: step one month forward or back. Returns
    /// false (and changes nothing) if the current key cannot be
    /// stepped, which only happens for an anomalous bucket key.
    pub fn swipe(&mut self, direction: SwipeDirection) -> bool {
        let stepped = match direction {
            SwipeDirection::NextMonth => self.selected_month.next(),
            SwipeDirection::PreviousMonth => self.selected_month.prev(),
        };
        match stepped {
            Some(month) => {
                self.on_month_focus_changed(month);
                true
            }
            None => false,
        }
    }

    /// One-shot scroll-to-latest: after the first successful data load
    /// the card strip scrolls to the most recent available month,
    /// exactly once. Subsequent refreshes return `None` and must not
    /// move the user's scroll position.
    pub fn initial_scroll_target(&mut self, available_months: &[MonthKey]) -> Option<MonthKey> {
        if self.init == InitState::Initialized {
            return None;
        }
        let target = available_months.last()?.clone();
        self.init = InitState::Initialized;
        Some(target)
    }
}
