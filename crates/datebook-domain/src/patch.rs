use chrono::NaiveDate;
use datebook_core::DatebookResult;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_time;
use crate::{Event, FieldUpdate};

/// Full-field replacement body for one dated event, as sent to the server.
///
/// Lineage fields are not part of the patch: an edit in place never changes
/// where the event has been.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub priority: Option<i64>,
    pub note: Option<String>,
    pub link: Option<String>,
    pub unlock_date: Option<NaiveDate>,
}

impl EventPatch {
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date,
            start_time: event.start_time.clone(),
            priority: event.priority,
            note: event.note.clone(),
            link: event.link.clone(),
            unlock_date: event.unlock_date,
        }
    }

    /// The event as it looks once the server accepted this patch.
    pub fn applied_to(&self, event: &Event) -> Event {
        Event {
            id: event.id.clone(),
            title: self.title.clone(),
            date: self.date,
            start_time: self.start_time.clone(),
            priority: self.priority,
            note: self.note.clone(),
            link: self.link.clone(),
            origin_dates: event.origin_dates.clone(),
            was_postponed: event.was_postponed,
            unlock_date: self.unlock_date,
        }
    }
}

/// Partial edit of an event, resolved into an [`EventPatch`] against the
/// current cached copy.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: FieldUpdate<String>,
    pub priority: FieldUpdate<i64>,
    pub note: FieldUpdate<String>,
    pub link: FieldUpdate<String>,
    pub unlock_date: FieldUpdate<NaiveDate>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && !self.start_time.is_change()
            && !self.priority.is_change()
            && !self.note.is_change()
            && !self.link.is_change()
            && !self.unlock_date.is_change()
    }

    pub fn resolve(self, current: &Event) -> DatebookResult<EventPatch> {
        let mut patch = EventPatch::from_event(current);
        if let Some(title) = self.title {
            patch.title = title.trim().to_string();
        }
        if let Some(date) = self.date {
            patch.date = date;
        }
        self.start_time.apply_to(&mut patch.start_time);
        patch.start_time = normalize_time(patch.start_time.as_deref());
        self.priority.apply_to(&mut patch.priority);
        self.note.apply_to(&mut patch.note);
        self.link.apply_to(&mut patch.link);
        self.unlock_date.apply_to(&mut patch.unlock_date);

        patch.applied_to(current).validate()?;
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datebook_core::DatebookError;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_resolve_keeps_untouched_fields() {
        let mut event = Event::new("Lunch", date("2025-04-01")).with_time("12:00");
        event.note = Some("bring receipts".to_string());
        event.origin_dates = vec![date("2025-03-30")];

        let update = EventUpdate {
            priority: FieldUpdate::Set(1),
            note: FieldUpdate::Clear,
            ..EventUpdate::default()
        };
        let patch = update.resolve(&event).unwrap();
        assert_eq!(patch.title, "Lunch");
        assert_eq!(patch.start_time.as_deref(), Some("12:00"));
        assert_eq!(patch.priority, Some(1));
        assert_eq!(patch.note, None);

        let applied = patch.applied_to(&event);
        assert_eq!(applied.origin_dates, vec![date("2025-03-30")]);
        assert_eq!(applied.id, event.id);
    }

    #[test]
    fn test_resolve_rejects_blank_title() {
        let event = Event::new("Lunch", date("2025-04-01"));
        let update = EventUpdate {
            title: Some("   ".to_string()),
            ..EventUpdate::default()
        };
        assert!(matches!(
            update.resolve(&event),
            Err(DatebookError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_time_clears() {
        let event = Event::new("Lunch", date("2025-04-01")).with_time("12:00");
        let update = EventUpdate {
            start_time: FieldUpdate::Set(" ".to_string()),
            ..EventUpdate::default()
        };
        assert_eq!(update.resolve(&event).unwrap().start_time, None);
    }

    #[test]
    fn test_empty_update() {
        assert!(EventUpdate::default().is_empty());
        let update = EventUpdate {
            link: FieldUpdate::Clear,
            ..EventUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
