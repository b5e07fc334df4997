use datebook_core::{DatebookError, DatebookResult};
use datebook_domain::Event;

use super::{Credentials, Store, ViewContext};

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refreshed {
    Applied(usize),
    /// A newer fetch was already applied, or the session changed meanwhile.
    Discarded,
}

impl Store {
    /// Refetch the signed-in user's dated events and replace the cache.
    /// A failed fetch leaves the cache as it was.
    pub async fn refresh_events(&self) -> DatebookResult<Refreshed> {
        let creds = self.credentials()?;
        let seq = self.next_seq();
        let events = match self.transport().list_events(&creds.token).await {
            Ok(events) => events,
            Err(e) => return Err(self.fail_for(&creds, "Refreshing events", e)),
        };

        let guard = self.sequence_guard;
        let outcome = self.with_state(|state| {
            if state.session.epoch != creds.epoch || !state.events_seq.accept(seq, guard) {
                return Refreshed::Discarded;
            }
            let count = events.len();
            state
                .events
                .replace_all(events.into_iter().map(Event::normalized).collect());
            state.prune_day_selection();
            Refreshed::Applied(count)
        });
        log_outcome("events", seq, outcome);
        Ok(outcome)
    }

    /// Refetch the friend calendar currently being viewed into the
    /// read-only comparison cache.
    pub async fn refresh_friend(&self) -> DatebookResult<Refreshed> {
        let ViewContext::Friend(friend_id) = self.view_context() else {
            return Err(DatebookError::Validation(
                "not viewing a friend's calendar".to_string(),
            ));
        };
        let creds = self.credentials()?;
        let seq = self.next_seq();
        let (events, meta) = match self
            .transport()
            .list_friend_events(&creds.token, &friend_id)
            .await
        {
            Ok(listing) => listing,
            Err(e) => return Err(self.fail_for(&creds, "Refreshing friend calendar", e)),
        };

        let guard = self.sequence_guard;
        let outcome = self.with_state(|state| {
            let same_view = state.view == ViewContext::Friend(friend_id.clone());
            if state.session.epoch != creds.epoch
                || !same_view
                || !state.friend_seq.accept(seq, guard)
            {
                return Refreshed::Discarded;
            }
            let count = events.len();
            state
                .friend
                .events
                .replace_all(events.into_iter().map(Event::normalized).collect());
            state.friend.meta = Some(meta);
            Refreshed::Applied(count)
        });
        log_outcome("friend events", seq, outcome);
        Ok(outcome)
    }

    /// Refresh whichever dated calendar the view currently shows.
    pub async fn refresh_view(&self) -> DatebookResult<Refreshed> {
        match self.view_context() {
            ViewContext::Own => self.refresh_events().await,
            ViewContext::Friend(_) => self.refresh_friend().await,
        }
    }

    pub async fn refresh_backlog(&self) -> DatebookResult<Refreshed> {
        let creds = self.credentials()?;
        let seq = self.next_seq();
        let entries = match self.transport().list_postponed(&creds.token).await {
            Ok(entries) => entries,
            Err(e) => return Err(self.fail_for(&creds, "Refreshing backlog", e)),
        };

        let guard = self.sequence_guard;
        let outcome = self.with_state(|state| {
            if state.session.epoch != creds.epoch || !state.backlog_seq.accept(seq, guard) {
                return Refreshed::Discarded;
            }
            let count = entries.len();
            state.backlog.replace_all(entries);
            Refreshed::Applied(count)
        });
        log_outcome("backlog", seq, outcome);
        Ok(outcome)
    }

    /// Refresh the dated view and the backlog concurrently.
    pub async fn refresh_all(&self) -> DatebookResult<()> {
        let (events, backlog) = tokio::join!(self.refresh_view(), self.refresh_backlog());
        events?;
        backlog?;
        Ok(())
    }

    /// Resync after a successful write. The write already stands, so a
    /// failure here only leaves a notice (or ends the session).
    pub(crate) async fn resync_after_write(&self, backlog: bool) {
        let result = if backlog {
            let (events, entries) = tokio::join!(self.refresh_events(), self.refresh_backlog());
            events.and(entries).map(|_| ())
        } else {
            self.refresh_events().await.map(|_| ())
        };
        if let Err(e) = result {
            tracing::debug!("resync after write failed: {}", e);
        }
    }

    /// Like [`Store::fail`], but errors from a session that has since
    /// ended are returned without side effects.
    pub(crate) fn fail_for(
        &self,
        creds: &Credentials,
        action: &str,
        error: DatebookError,
    ) -> DatebookError {
        let current = self.with_state(|state| state.session.epoch);
        if current != creds.epoch {
            tracing::debug!("{} failed after the session changed: {}", action, error);
            return error;
        }
        self.fail(action, error)
    }
}

fn log_outcome(what: &str, seq: u64, outcome: Refreshed) {
    match outcome {
        Refreshed::Applied(count) => tracing::info!("Synced {} {} (fetch #{})", count, what, seq),
        Refreshed::Discarded => tracing::debug!("Discarded stale {} fetch #{}", what, seq),
    }
}
