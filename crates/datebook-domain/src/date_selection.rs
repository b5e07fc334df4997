//! Drag-to-select date ranges.
//!
//! Pointer-down starts a drag on one day, pointer-enter extends it, and
//! pointer-up commits it. The endpoints keep the order the user dragged
//! in; consumers read the normalized [`DateRange`] instead.

use chrono::NaiveDate;
use serde::Serialize;

use crate::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPhase {
    Idle,
    Dragging,
    Committed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSelection {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    active: bool,
}

impl DateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SelectionPhase {
        match (self.start, self.active) {
            (None, _) => SelectionPhase::Idle,
            (Some(_), true) => SelectionPhase::Dragging,
            (Some(_), false) => SelectionPhase::Committed,
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin a new drag. Any earlier selection is replaced.
    pub fn pointer_down(&mut self, date: NaiveDate) {
        self.start = Some(date);
        self.end = Some(date);
        self.active = true;
    }

    /// Extend the drag to `date`. Returns whether the selection changed.
    pub fn pointer_enter(&mut self, date: NaiveDate) -> bool {
        if !self.active || self.end == Some(date) {
            return false;
        }
        self.end = Some(date);
        true
    }

    /// Finish the drag. Returns the committed range, if a drag was running.
    pub fn pointer_up(&mut self) -> Option<DateRange> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.range()
    }

    /// Drop the selection entirely.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The selected days with endpoints in ascending order.
    pub fn range(&self) -> Option<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            (Some(day), None) | (None, Some(day)) => Some(DateRange::single(day)),
            (None, None) => None,
        }
    }

    /// A committed selection spanning more than one day. This is what opens
    /// bulk input.
    pub fn committed_multi_day(&self) -> Option<DateRange> {
        if self.phase() != SelectionPhase::Committed {
            return None;
        }
        self.range().filter(|range| !range.is_single_day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range().is_some_and(|range| range.contains(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let mut selection = DateSelection::new();
        assert_eq!(selection.phase(), SelectionPhase::Idle);

        selection.pointer_down(date("2025-05-10"));
        assert_eq!(selection.phase(), SelectionPhase::Dragging);
        assert_eq!(selection.start(), selection.end());

        assert!(selection.pointer_enter(date("2025-05-12")));
        assert!(!selection.pointer_enter(date("2025-05-12")));

        let committed = selection.pointer_up().unwrap();
        assert_eq!(selection.phase(), SelectionPhase::Committed);
        assert_eq!(committed.len_days(), 3);

        selection.clear();
        assert_eq!(selection.phase(), SelectionPhase::Idle);
        assert_eq!(selection.range(), None);
    }

    #[test]
    fn test_enter_without_drag_is_ignored() {
        let mut selection = DateSelection::new();
        assert!(!selection.pointer_enter(date("2025-05-12")));
        assert_eq!(selection.pointer_up(), None);
        assert_eq!(selection.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn test_backward_drag_yields_same_days() {
        let mut backward = DateSelection::new();
        backward.pointer_down(date("2025-05-14"));
        backward.pointer_enter(date("2025-05-11"));
        backward.pointer_up();

        let mut forward = DateSelection::new();
        forward.pointer_down(date("2025-05-11"));
        forward.pointer_enter(date("2025-05-14"));
        forward.pointer_up();

        assert_eq!(backward.start(), Some(date("2025-05-14")));
        let back_days: Vec<_> = backward.range().unwrap().days().collect();
        let fwd_days: Vec<_> = forward.range().unwrap().days().collect();
        assert_eq!(back_days, fwd_days);
    }

    #[test]
    fn test_single_day_does_not_open_bulk_input() {
        let mut selection = DateSelection::new();
        selection.pointer_down(date("2025-05-10"));
        assert_eq!(selection.committed_multi_day(), None);
        selection.pointer_up();
        assert_eq!(selection.committed_multi_day(), None);

        selection.pointer_down(date("2025-05-10"));
        selection.pointer_enter(date("2025-05-11"));
        // Still dragging
        assert_eq!(selection.committed_multi_day(), None);
        selection.pointer_up();
        assert!(selection.committed_multi_day().is_some());
    }

    #[test]
    fn test_new_drag_replaces_committed() {
        let mut selection = DateSelection::new();
        selection.pointer_down(date("2025-05-10"));
        selection.pointer_enter(date("2025-05-20"));
        selection.pointer_up();

        selection.pointer_down(date("2025-06-01"));
        assert_eq!(selection.range(), Some(DateRange::single(date("2025-06-01"))));
        assert!(!selection.contains(date("2025-05-15")));
    }
}
