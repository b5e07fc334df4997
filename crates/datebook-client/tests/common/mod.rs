#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use datebook_client::{EventTransport, Store};
use datebook_core::{AppConfig, DatebookError, DatebookResult};
use datebook_domain::{Event, EventId, EventPatch, FriendMeta, PostponedEntry};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

/// One collaborator call, in the order the store issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListEvents,
    ListFriendEvents(String),
    CreateEvents(Vec<Event>),
    UpdateEvent(EventId, EventPatch),
    DeleteEvent(EventId),
    ListPostponed,
    CreatePostponed(Vec<PostponedEntry>),
    DeletePostponed(EventId),
}

/// Errors the fake can be told to return. `DatebookError` is not `Clone`.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Network,
    Auth(u16),
    Rejected,
}

impl Failure {
    fn to_error(self) -> DatebookError {
        match self {
            Self::Network => DatebookError::Network("connection refused".to_string()),
            Self::Auth(status) => DatebookError::AuthExpired { status },
            Self::Rejected => DatebookError::Validation("rejected by server".to_string()),
        }
    }
}

/// In-memory server that records every call.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    events: Mutex<Vec<Event>>,
    postponed: Mutex<Vec<PostponedEntry>>,
    friends: Mutex<HashMap<String, (Vec<Event>, FriendMeta)>>,
    fail_create: Mutex<Option<Failure>>,
    fail_list: Mutex<Option<Failure>>,
    fail_delete: Mutex<HashMap<EventId, Failure>>,
    list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_events(&self, events: Vec<Event>) {
        self.events.lock().extend(events);
    }

    pub fn seed_postponed(&self, entries: Vec<PostponedEntry>) {
        self.postponed.lock().extend(entries);
    }

    pub fn seed_friend(&self, meta: FriendMeta, events: Vec<Event>) {
        self.friends.lock().insert(meta.id.clone(), (events, meta));
    }

    pub fn fail_create(&self, failure: Failure) {
        *self.fail_create.lock() = Some(failure);
    }

    pub fn fail_list(&self, failure: Option<Failure>) {
        *self.fail_list.lock() = failure;
    }

    pub fn fail_delete(&self, id: &EventId, failure: Failure) {
        self.fail_delete.lock().insert(id.clone(), failure);
    }

    /// Hold the next `list_events` response until the returned sender
    /// fires. The listing is taken when the call arrives.
    pub fn hold_next_listing(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::ListEvents | Call::ListPostponed | Call::ListFriendEvents(_)))
            .collect()
    }

    pub fn server_events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn server_postponed(&self) -> Vec<PostponedEntry> {
        self.postponed.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check_token(token: &str) -> DatebookResult<()> {
        if token.is_empty() {
            return Err(DatebookError::Unauthenticated);
        }
        Ok(())
    }
}

#[async_trait]
impl EventTransport for RecordingTransport {
    async fn list_events(&self, token: &str) -> DatebookResult<Vec<Event>> {
        Self::check_token(token)?;
        self.record(Call::ListEvents);
        let listing = self.events.lock().clone();
        let failure = *self.fail_list.lock();
        let gate = self.list_gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(listing),
        }
    }

    async fn list_friend_events(
        &self,
        token: &str,
        friend_id: &str,
    ) -> DatebookResult<(Vec<Event>, FriendMeta)> {
        Self::check_token(token)?;
        self.record(Call::ListFriendEvents(friend_id.to_string()));
        self.friends
            .lock()
            .get(friend_id)
            .cloned()
            .ok_or_else(|| DatebookError::NotFound(friend_id.to_string()))
    }

    async fn create_events(&self, token: &str, events: &[Event]) -> DatebookResult<usize> {
        Self::check_token(token)?;
        self.record(Call::CreateEvents(events.to_vec()));
        if let Some(failure) = *self.fail_create.lock() {
            return Err(failure.to_error());
        }
        self.events.lock().extend(events.iter().cloned());
        Ok(events.len())
    }

    async fn update_event(
        &self,
        token: &str,
        id: &EventId,
        patch: &EventPatch,
    ) -> DatebookResult<()> {
        Self::check_token(token)?;
        self.record(Call::UpdateEvent(id.clone(), patch.clone()));
        let mut events = self.events.lock();
        let event = events
            .iter_mut()
            .find(|event| &event.id == id)
            .ok_or_else(|| DatebookError::NotFound(id.to_string()))?;
        *event = patch.applied_to(event);
        Ok(())
    }

    async fn delete_event(&self, token: &str, id: &EventId) -> DatebookResult<()> {
        Self::check_token(token)?;
        self.record(Call::DeleteEvent(id.clone()));
        if let Some(failure) = self.fail_delete.lock().get(id).copied() {
            return Err(failure.to_error());
        }
        self.events.lock().retain(|event| &event.id != id);
        Ok(())
    }

    async fn list_postponed(&self, token: &str) -> DatebookResult<Vec<PostponedEntry>> {
        Self::check_token(token)?;
        self.record(Call::ListPostponed);
        if let Some(failure) = *self.fail_list.lock() {
            return Err(failure.to_error());
        }
        Ok(self.postponed.lock().clone())
    }

    async fn create_postponed(
        &self,
        token: &str,
        entries: &[PostponedEntry],
    ) -> DatebookResult<usize> {
        Self::check_token(token)?;
        self.record(Call::CreatePostponed(entries.to_vec()));
        if let Some(failure) = *self.fail_create.lock() {
            return Err(failure.to_error());
        }
        self.postponed.lock().extend(entries.iter().cloned());
        Ok(entries.len())
    }

    async fn delete_postponed(&self, token: &str, id: &EventId) -> DatebookResult<()> {
        Self::check_token(token)?;
        self.record(Call::DeletePostponed(id.clone()));
        if let Some(failure) = self.fail_delete.lock().get(id).copied() {
            return Err(failure.to_error());
        }
        self.postponed.lock().retain(|entry| &entry.id != id);
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A signed-in store over `transport`, with its caches loaded.
pub async fn signed_in_store(transport: &Arc<RecordingTransport>, config: AppConfig) -> Arc<Store> {
    let store = Arc::new(Store::new(transport.clone(), &config));
    store.sign_in("test-token");
    store.refresh_all().await.unwrap();
    store
}
