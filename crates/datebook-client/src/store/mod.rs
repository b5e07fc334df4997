//! The client store.
//!
//! Owns the event cache, the postponed backlog, the friend comparison
//! cache, and the selection models. Server access goes through the injected
//! [`EventTransport`]. State sits behind one non-poisoning mutex that is
//! never held across an `.await`, so any number of async call sites may
//! resolve in any order and apply their results.

mod crud_ops;
mod refresh_ops;
mod transfer_ops;

pub use refresh_ops::Refreshed;

use chrono::NaiveDate;
use datebook_core::{
    logging, AppConfig, DatebookError, DatebookResult, LogEntry, Loggable, MultiSelection,
};
use datebook_domain::{
    sort_items, DateRange, DateSelection, DisplayEvent, Event, EventId, FriendMeta,
    PostponedEntry, PostponedView, SelectionPhase, SortMode,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::backlog::{PartitionState, PostponedBacklog, TransferTarget};
use crate::cache::EventCache;
use crate::transport::EventTransport;

/// Whose calendar the dated views show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContext {
    Own,
    Friend(String),
}

#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
    needs_login: bool,
    /// Bumped on every sign-in and teardown so late responses from an
    /// earlier session are dropped.
    epoch: u64,
}

/// Applied-sequence bookkeeping for one cache.
#[derive(Debug, Default, Clone, Copy)]
struct SeqTracker {
    applied: u64,
}

impl SeqTracker {
    fn accept(&mut self, seq: u64, guard: bool) -> bool {
        if guard && seq < self.applied {
            return false;
        }
        self.applied = self.applied.max(seq);
        true
    }
}

#[derive(Debug, Default)]
struct FriendView {
    meta: Option<FriendMeta>,
    events: EventCache,
}

/// Checkbox selection within one day.
#[derive(Debug, Default)]
struct DaySelection {
    date: Option<NaiveDate>,
    ids: MultiSelection<EventId>,
}

#[derive(Debug)]
struct StoreState {
    session: Session,
    view: ViewContext,
    events: EventCache,
    friend: FriendView,
    backlog: PostponedBacklog,
    day_sort: SortMode,
    range: DateSelection,
    day_selection: DaySelection,
    events_seq: SeqTracker,
    friend_seq: SeqTracker,
    backlog_seq: SeqTracker,
    notices: Vec<LogEntry>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            session: Session::default(),
            view: ViewContext::Own,
            events: EventCache::new(),
            friend: FriendView::default(),
            backlog: PostponedBacklog::new(),
            day_sort: SortMode::Time,
            range: DateSelection::new(),
            day_selection: DaySelection::default(),
            events_seq: SeqTracker::default(),
            friend_seq: SeqTracker::default(),
            backlog_seq: SeqTracker::default(),
            notices: Vec::new(),
        }
    }

    fn prune_day_selection(&mut self) {
        if let Some(date) = self.day_selection.date {
            let existing: Vec<EventId> =
                self.events.get(date).iter().map(|e| e.id.clone()).collect();
            self.day_selection.ids.retain_existing(existing.iter());
        }
    }
}

/// Snapshot of what a request needs from the session.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub token: String,
    pub epoch: u64,
}

pub struct Store {
    transport: Arc<dyn EventTransport>,
    state: Mutex<StoreState>,
    in_flight: Mutex<HashSet<String>>,
    fetch_seq: AtomicU64,
    sequence_guard: bool,
    settle_delay: Duration,
    notice_capacity: usize,
}

/// Marks an action busy until dropped.
pub(crate) struct BusyGuard<'a> {
    store: &'a Store,
    key: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.store.in_flight.lock().remove(&self.key);
    }
}

impl Store {
    pub fn new(transport: Arc<dyn EventTransport>, config: &AppConfig) -> Self {
        Self {
            transport,
            state: Mutex::new(StoreState::new()),
            in_flight: Mutex::new(HashSet::new()),
            fetch_seq: AtomicU64::new(0),
            sequence_guard: config.sync.sequence_guard,
            settle_delay: config.selection.settle_delay(),
            notice_capacity: config.notice_capacity,
        }
    }

    // Session

    pub fn sign_in(&self, token: impl Into<String>) {
        let mut state = self.state.lock();
        state.session.token = Some(token.into());
        state.session.needs_login = false;
        state.session.epoch += 1;
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.lock().session.token.is_some()
    }

    /// True after a session teardown until the next sign-in.
    pub fn needs_login(&self) -> bool {
        self.state.lock().session.needs_login
    }

    /// Forget the session and everything cached for it.
    pub fn teardown_session(&self) {
        let mut state = self.state.lock();
        let epoch = state.session.epoch + 1;
        let notices = std::mem::take(&mut state.notices);
        let day_sort = state.day_sort;
        *state = StoreState::new();
        state.session = Session {
            token: None,
            needs_login: true,
            epoch,
        };
        state.notices = notices;
        state.day_sort = day_sort;
        drop(state);
        tracing::info!("Session ended; cleared local caches");
    }

    pub(crate) fn credentials(&self) -> DatebookResult<Credentials> {
        let state = self.state.lock();
        match &state.session.token {
            Some(token) => Ok(Credentials {
                token: token.clone(),
                epoch: state.session.epoch,
            }),
            None => Err(DatebookError::Unauthenticated),
        }
    }

    /// Route a failure: auth errors end the session, everything else becomes
    /// a user notice. The error is handed back for the caller to return.
    pub(crate) fn fail(&self, action: &str, error: DatebookError) -> DatebookError {
        if error.is_auth() {
            if self.is_signed_in() {
                tracing::warn!("{} failed with an expired session", action);
                self.teardown_session();
            }
        } else {
            tracing::warn!("{} failed: {}", action, error);
            self.add_log(LogEntry::error(format!("{action} failed: {error}")));
        }
        error
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn mark_busy(&self, key: impl Into<String>) -> DatebookResult<BusyGuard<'_>> {
        let key = key.into();
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(key.clone()) {
            return Err(DatebookError::Busy(key));
        }
        Ok(BusyGuard { store: self, key })
    }

    /// Whether an action is waiting on the server; used to disable controls.
    pub fn is_busy(&self, key: &str) -> bool {
        self.in_flight.lock().contains(key)
    }

    pub(crate) fn transport(&self) -> &dyn EventTransport {
        self.transport.as_ref()
    }

    // View context

    pub fn view_context(&self) -> ViewContext {
        self.state.lock().view.clone()
    }

    /// Switch dated views to a friend's calendar, read-only.
    pub fn view_friend(&self, friend_id: impl Into<String>) {
        let friend_id = friend_id.into();
        let mut state = self.state.lock();
        if state.view != ViewContext::Friend(friend_id.clone()) {
            state.friend = FriendView::default();
        }
        state.view = ViewContext::Friend(friend_id);
    }

    pub fn view_own(&self) {
        let mut state = self.state.lock();
        state.view = ViewContext::Own;
        state.friend = FriendView::default();
    }

    pub fn friend_meta(&self) -> Option<FriendMeta> {
        self.state.lock().friend.meta.clone()
    }

    // Reads

    pub fn day_sort(&self) -> SortMode {
        self.state.lock().day_sort
    }

    pub fn set_day_sort(&self, mode: SortMode) {
        self.state.lock().day_sort = mode;
    }

    /// Own events on `date`, in the current day order.
    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        let state = self.state.lock();
        sorted_bucket(state.events.get(date), state.day_sort)
    }

    /// Friend's events on `date` while viewing their calendar.
    pub fn friend_events_on(&self, date: NaiveDate) -> Vec<Event> {
        let state = self.state.lock();
        sorted_bucket(state.friend.events.get(date), state.day_sort)
    }

    /// Events on `date` for the active view, with time capsules withheld.
    pub fn display_events(&self, date: NaiveDate, today: NaiveDate) -> Vec<DisplayEvent> {
        let events = match self.view_context() {
            ViewContext::Own => self.events_on(date),
            ViewContext::Friend(_) => self.friend_events_on(date),
        };
        events
            .into_iter()
            .map(|event| DisplayEvent::from_event(event, today))
            .collect()
    }

    /// Every day of `range` with its own events.
    pub fn events_in_range(&self, range: DateRange) -> Vec<(NaiveDate, Vec<Event>)> {
        let state = self.state.lock();
        state
            .events
            .in_range(range)
            .into_iter()
            .map(|(day, events)| (day, events.to_vec()))
            .collect()
    }

    pub fn find_event(&self, id: &EventId) -> Option<Event> {
        self.state.lock().events.find(id).cloned()
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn backlog_entries(&self, view: PostponedView) -> Vec<PostponedEntry> {
        self.state.lock().backlog.entries(view)
    }

    pub fn find_postponed(&self, id: &EventId) -> Option<PostponedEntry> {
        self.state.lock().backlog.find(id).cloned()
    }

    pub fn backlog_state(&self, view: PostponedView) -> PartitionState {
        self.state.lock().backlog.state(view).clone()
    }

    pub fn set_backlog_sort(&self, view: PostponedView, mode: SortMode) {
        self.state.lock().backlog.state_mut(view).sort = mode;
    }

    pub fn set_backlog_target(&self, view: PostponedView, target: Option<TransferTarget>) {
        self.state.lock().backlog.state_mut(view).transfer_target = target;
    }

    // Date-range selection

    pub fn selection_phase(&self) -> SelectionPhase {
        self.state.lock().range.phase()
    }

    pub fn selected_range(&self) -> Option<DateRange> {
        self.state.lock().range.range()
    }

    pub fn pointer_down(&self, date: NaiveDate) {
        self.state.lock().range.pointer_down(date);
    }

    pub fn pointer_enter(&self, date: NaiveDate) -> bool {
        self.state.lock().range.pointer_enter(date)
    }

    /// Commit the drag. Returns the committed range, if any.
    pub fn pointer_up(&self) -> Option<DateRange> {
        self.state.lock().range.pointer_up()
    }

    pub fn cancel_selection(&self) {
        self.state.lock().range.clear();
    }

    /// Wait out the settle delay after a drag, then report the range if a
    /// multi-day selection is still committed unchanged. `Some` means the
    /// bulk input flow should open.
    pub async fn settled_bulk_range(&self) -> Option<DateRange> {
        let committed = self.state.lock().range.committed_multi_day()?;
        tokio::time::sleep(self.settle_delay).await;
        let current = self.state.lock().range.committed_multi_day();
        current.filter(|range| *range == committed)
    }

    // Checkbox selection

    /// Toggle one event of `date`. Switching to another day starts a fresh
    /// selection.
    pub fn toggle_day_event(&self, date: NaiveDate, id: EventId) -> bool {
        let mut state = self.state.lock();
        if state.day_selection.date != Some(date) {
            state.day_selection = DaySelection {
                date: Some(date),
                ids: MultiSelection::new(),
            };
        }
        state.day_selection.ids.toggle(id)
    }

    pub fn select_all_day(&self, date: NaiveDate) {
        let mut state = self.state.lock();
        let ids: Vec<EventId> = state.events.get(date).iter().map(|e| e.id.clone()).collect();
        state.day_selection = DaySelection {
            date: Some(date),
            ids: MultiSelection::new(),
        };
        state.day_selection.ids.select_all(ids);
    }

    pub fn clear_day_selection(&self) {
        self.state.lock().day_selection = DaySelection::default();
    }

    /// Selected events of the selected day, in day order.
    pub fn selected_day_events(&self) -> Vec<Event> {
        let state = self.state.lock();
        match state.day_selection.date {
            Some(date) => state
                .day_selection
                .ids
                .pick(state.events.get(date), |e| &e.id)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn toggle_backlog_entry(&self, view: PostponedView, id: EventId) -> bool {
        self.state.lock().backlog.state_mut(view).selection.toggle(id)
    }

    pub fn select_all_backlog(&self, view: PostponedView) {
        self.state.lock().backlog.select_all(view);
    }

    pub fn clear_backlog_selection(&self, view: PostponedView) {
        self.state.lock().backlog.state_mut(view).selection.clear();
    }

    pub fn selected_backlog_entries(&self, view: PostponedView) -> Vec<PostponedEntry> {
        self.state.lock().backlog.selected(view)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        f(&mut self.state.lock())
    }
}

impl Loggable for Store {
    fn add_log(&self, entry: LogEntry) {
        let mut state = self.state.lock();
        logging::push_bounded(&mut state.notices, entry, self.notice_capacity);
    }

    fn get_logs(&self) -> Vec<LogEntry> {
        self.state.lock().notices.clone()
    }
}

/// Cache buckets are kept in time order; other modes re-sort a copy.
fn sorted_bucket(bucket: &[Event], mode: SortMode) -> Vec<Event> {
    let mut events = bucket.to_vec();
    if mode != SortMode::Time {
        sort_items(&mut events, mode);
    }
    events
}
