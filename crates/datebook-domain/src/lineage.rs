//! Origin chains and the records built by each transfer.
//!
//! An origin chain only ever grows at its tail. Appending a date that is
//! already the last entry is a no-op, so a chain never holds the same date
//! twice in a row.

use chrono::NaiveDate;

use crate::{Event, EventId, PostponedEntry, PostponedView};

/// Append `date` unless it is already the last entry.
pub fn push_if_not_last(chain: &mut Vec<NaiveDate>, date: NaiveDate) {
    if chain.last() != Some(&date) {
        chain.push(date);
    }
}

/// Collapse runs of the same date into one entry, keeping order.
pub fn collapse_repeats(chain: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut collapsed = Vec::with_capacity(chain.len());
    for date in chain {
        push_if_not_last(&mut collapsed, *date);
    }
    collapsed
}

/// Extend a chain with the dates a transfer passes through.
pub fn extend_chain(chain: &[NaiveDate], steps: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut extended = collapse_repeats(chain);
    for step in steps {
        push_if_not_last(&mut extended, *step);
    }
    extended
}

/// True when `later` keeps every entry of `earlier` in the same relative order.
pub fn preserves_history(earlier: &[NaiveDate], later: &[NaiveDate]) -> bool {
    let mut remaining = later.iter();
    collapse_repeats(earlier)
        .iter()
        .all(|date| remaining.any(|candidate| candidate == date))
}

impl Event {
    /// A fresh copy of this event placed on `target`.
    pub fn copied_to(&self, target: NaiveDate) -> Event {
        Event {
            id: EventId::generate(),
            title: self.title.clone(),
            date: target,
            start_time: self.start_time.clone(),
            priority: self.priority,
            note: self.note.clone(),
            link: self.link.clone(),
            origin_dates: extend_chain(&self.origin_dates, &[self.date, target]),
            was_postponed: self.was_postponed,
            unlock_date: self.unlock_date,
        }
    }

    /// This event shelved into a backlog partition.
    pub fn postponed_into(&self, view: PostponedView) -> PostponedEntry {
        PostponedEntry {
            id: EventId::generate(),
            title: self.title.clone(),
            start_time: self.start_time.clone(),
            priority: self.priority,
            note: self.note.clone(),
            link: self.link.clone(),
            origin_dates: extend_chain(&self.origin_dates, &[self.date]),
            was_postponed: true,
            unlock_date: self.unlock_date,
            postponed_view: view,
        }
    }
}

impl PostponedEntry {
    /// This entry placed back on the calendar at `target`.
    pub fn reactivated_on(&self, target: NaiveDate) -> Event {
        Event {
            id: EventId::generate(),
            title: self.title.clone(),
            date: target,
            start_time: self.start_time.clone(),
            priority: self.priority,
            note: self.note.clone(),
            link: self.link.clone(),
            origin_dates: extend_chain(&self.origin_dates, &[target]),
            was_postponed: true,
            unlock_date: self.unlock_date,
        }
    }

    /// This entry moved into another backlog partition.
    pub fn repostponed_into(&self, view: PostponedView) -> PostponedEntry {
        PostponedEntry {
            id: EventId::generate(),
            origin_dates: collapse_repeats(&self.origin_dates),
            was_postponed: true,
            postponed_view: view,
            ..self.clone()
        }
    }
}
