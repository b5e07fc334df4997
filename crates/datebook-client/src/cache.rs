//! Client-side cache of dated events, bucketed by day.
//!
//! Each bucket is kept in the default day order. An id lives in at most one
//! bucket; a later write for the same id replaces the earlier one wherever
//! it was.

use chrono::NaiveDate;
use datebook_domain::{sort_items, DateRange, Event, EventId, SortMode};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct EventCache {
    days: BTreeMap<NaiveDate, Vec<Event>>,
    index: HashMap<EventId, NaiveDate>,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events on `date` in day order. Empty when nothing is cached.
    pub fn get(&self, date: NaiveDate) -> &[Event] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, id: &EventId) -> Option<&Event> {
        let date = self.index.get(id)?;
        self.days.get(date)?.iter().find(|event| &event.id == id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Replace everything with a fresh server listing.
    pub fn replace_all(&mut self, events: Vec<Event>) {
        self.clear();
        self.merge_optimistic(events);
    }

    /// Insert or update events ahead of server confirmation.
    ///
    /// Later entries win over earlier ones with the same id, including
    /// duplicates within `events` itself.
    pub fn merge_optimistic(&mut self, events: Vec<Event>) {
        let mut touched = BTreeSet::new();
        for event in events {
            if let Some(previous) = self.detach(&event.id) {
                touched.insert(previous);
            }
            touched.insert(event.date);
            self.index.insert(event.id.clone(), event.date);
            self.days.entry(event.date).or_default().push(event);
        }
        for date in touched {
            self.resort(date);
        }
    }

    pub fn remove(&mut self, id: &EventId) -> Option<Event> {
        let date = self.index.remove(id)?;
        let bucket = self.days.get_mut(&date)?;
        let position = bucket.iter().position(|event| &event.id == id)?;
        let removed = bucket.remove(position);
        if bucket.is_empty() {
            self.days.remove(&date);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.days.clear();
        self.index.clear();
    }

    /// Every day of `range` with its events, including empty days.
    pub fn in_range(&self, range: DateRange) -> Vec<(NaiveDate, &[Event])> {
        range.days().map(|day| (day, self.get(day))).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.days.values().flatten()
    }

    fn detach(&mut self, id: &EventId) -> Option<NaiveDate> {
        let date = self.index.remove(id)?;
        if let Some(bucket) = self.days.get_mut(&date) {
            bucket.retain(|event| &event.id != id);
            if bucket.is_empty() {
                self.days.remove(&date);
            }
        }
        Some(date)
    }

    fn resort(&mut self, date: NaiveDate) {
        if let Some(bucket) = self.days.get_mut(&date) {
            sort_items(bucket, SortMode::Time);
        }
    }
}
