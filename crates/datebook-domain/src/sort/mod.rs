//! Per-day ordering of events and postponed entries.
//!
//! The default order is start time, then priority, then title. Views the
//! user switches to priority order compare priority first. Missing values
//! always sort last. The event id is the final tie-breaker, so the order is
//! total and does not depend on the order events arrived in.

use crate::{EventId, Schedulable};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Order preference for a list of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Time,
    Priority,
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "priority" => Ok(Self::Priority),
            other => Err(format!("unknown sort mode '{other}'")),
        }
    }
}

/// Single comparison key.
pub enum SortBy {
    StartTime,
    Priority,
    Title,
    Id,
}

impl SortBy {
    pub fn compare<T: Schedulable + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        match self {
            Self::StartTime => compare_times(a.start_time(), b.start_time()),
            Self::Priority => missing_last(a.priority(), b.priority()),
            Self::Title => a.title().cmp(b.title()),
            Self::Id => compare_ids(a.id(), b.id()),
        }
    }
}

impl SortMode {
    pub fn keys(self) -> [SortBy; 4] {
        match self {
            Self::Time => [SortBy::StartTime, SortBy::Priority, SortBy::Title, SortBy::Id],
            Self::Priority => [SortBy::Priority, SortBy::StartTime, SortBy::Title, SortBy::Id],
        }
    }

    pub fn compare<T: Schedulable + ?Sized>(self, a: &T, b: &T) -> Ordering {
        self.keys()
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Sort a slice in place by the given mode.
pub fn sort_items<T: Schedulable>(items: &mut [T], mode: SortMode) {
    items.sort_by(|a, b| mode.compare(a, b));
}

fn missing_last<V: Ord>(a: Option<V>, b: Option<V>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Times compare as clock times when they parse (so `9:00` sorts before
/// `10:00`), otherwise as text after every parseable time.
fn compare_times(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (parse_time(a), parse_time(b)) {
            (Some(ta), Some(tb)) => ta.cmp(&tb).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        },
        (a, b) => missing_last(a, b),
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn compare_ids(a: &EventId, b: &EventId) -> Ordering {
    a.cmp(b)
}
