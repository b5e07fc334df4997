use chrono::NaiveDate;
use datebook_core::{DatebookError, DatebookResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::normalize;

/// Opaque event identifier. Client-generated ids are UUIDs, but server ids
/// are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Backlog partition a postponed entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostponedView {
    Week,
    All,
}

impl PostponedView {
    pub const ALL: [PostponedView; 2] = [PostponedView::Week, PostponedView::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::All => "all",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Week => Self::All,
            Self::All => Self::Week,
        }
    }
}

impl fmt::Display for PostponedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostponedView {
    type Err = DatebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "all" => Ok(Self::All),
            other => Err(DatebookError::Validation(format!(
                "unknown backlog view '{other}' (expected 'week' or 'all')"
            ))),
        }
    }
}

/// Fields shared by dated events and postponed entries, as seen by ordering
/// and selection code.
pub trait Schedulable {
    fn id(&self) -> &EventId;
    fn title(&self) -> &str;
    fn start_time(&self) -> Option<&str>;
    fn priority(&self) -> Option<i64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(deserialize_with = "normalize::deserialize_date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "normalize::deserialize_time")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "normalize::deserialize_priority")]
    pub priority: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "normalize::deserialize_date_list")]
    pub origin_dates: Vec<NaiveDate>,
    #[serde(default, deserialize_with = "normalize::null_as_default")]
    pub was_postponed: bool,
    #[serde(default, deserialize_with = "normalize::deserialize_opt_date")]
    pub unlock_date: Option<NaiveDate>,
}

impl Event {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: EventId::generate(),
            title: title.into(),
            date,
            start_time: None,
            priority: None,
            note: None,
            link: None,
            origin_dates: Vec::new(),
            was_postponed: false,
            unlock_date: None,
        }
    }

    pub fn with_time(mut self, time: &str) -> Self {
        self.start_time = normalize::normalize_time(Some(time));
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// A time capsule stays locked until its unlock date arrives.
    pub fn is_locked(&self, today: NaiveDate) -> bool {
        self.unlock_date.is_some_and(|unlock| today < unlock)
    }

    pub fn validate(&self) -> DatebookResult<()> {
        validate_title(&self.title)
    }

    /// Copy of this event with fields re-normalized.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.start_time = normalize::normalize_time(self.start_time.as_deref());
        self
    }
}

impl Schedulable for Event {
    fn id(&self) -> &EventId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }

    fn priority(&self) -> Option<i64> {
        self.priority
    }
}

/// An event parked in the backlog, without a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostponedEntry {
    pub id: EventId,
    pub title: String,
    #[serde(default, deserialize_with = "normalize::deserialize_time")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "normalize::deserialize_priority")]
    pub priority: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "normalize::deserialize_date_list")]
    pub origin_dates: Vec<NaiveDate>,
    #[serde(default, deserialize_with = "normalize::null_as_default")]
    pub was_postponed: bool,
    #[serde(default, deserialize_with = "normalize::deserialize_opt_date")]
    pub unlock_date: Option<NaiveDate>,
    pub postponed_view: PostponedView,
}

impl PostponedEntry {
    pub fn new(title: impl Into<String>, view: PostponedView) -> Self {
        Self {
            id: EventId::generate(),
            title: title.into(),
            start_time: None,
            priority: None,
            note: None,
            link: None,
            origin_dates: Vec::new(),
            was_postponed: true,
            unlock_date: None,
            postponed_view: view,
        }
    }

    pub fn is_locked(&self, today: NaiveDate) -> bool {
        self.unlock_date.is_some_and(|unlock| today < unlock)
    }

    pub fn validate(&self) -> DatebookResult<()> {
        validate_title(&self.title)
    }
}

impl Schedulable for PostponedEntry {
    fn id(&self) -> &EventId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }

    fn priority(&self) -> Option<i64> {
        self.priority
    }
}

fn validate_title(title: &str) -> DatebookResult<()> {
    if title.trim().is_empty() {
        return Err(DatebookError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}

/// User input for a new event before it has a date or an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub unlock_date: Option<NaiveDate>,
}

impl EventDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn into_event(self, date: NaiveDate) -> DatebookResult<Event> {
        validate_title(&self.title)?;
        Ok(Event {
            id: EventId::generate(),
            title: self.title.trim().to_string(),
            date,
            start_time: normalize::normalize_time(self.start_time.as_deref()),
            priority: self.priority,
            note: blank_to_none(self.note),
            link: blank_to_none(self.link),
            origin_dates: Vec::new(),
            was_postponed: false,
            unlock_date: self.unlock_date,
        })
    }

    pub fn into_postponed(self, view: PostponedView) -> DatebookResult<PostponedEntry> {
        validate_title(&self.title)?;
        Ok(PostponedEntry {
            id: EventId::generate(),
            title: self.title.trim().to_string(),
            start_time: normalize::normalize_time(self.start_time.as_deref()),
            priority: self.priority,
            note: blank_to_none(self.note),
            link: blank_to_none(self.link),
            origin_dates: Vec::new(),
            was_postponed: true,
            unlock_date: self.unlock_date,
            postponed_view: view,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Owner of a calendar being viewed read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendMeta {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// What a renderer is allowed to see of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayEvent {
    Visible(Event),
    #[serde(rename_all = "camelCase")]
    Locked {
        id: EventId,
        date: NaiveDate,
        unlock_date: NaiveDate,
    },
}

impl DisplayEvent {
    pub fn from_event(event: Event, today: NaiveDate) -> Self {
        match event.unlock_date {
            Some(unlock_date) if today < unlock_date => Self::Locked {
                id: event.id,
                date: event.date,
                unlock_date,
            },
            _ => Self::Visible(event),
        }
    }

    pub fn id(&self) -> &EventId {
        match self {
            Self::Visible(event) => &event.id,
            Self::Locked { id, .. } => id,
        }
    }
}
