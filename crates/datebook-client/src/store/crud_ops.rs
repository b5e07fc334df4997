use chrono::NaiveDate;
use datebook_core::{DatebookError, DatebookResult, LogEntry, Loggable};
use datebook_domain::{
    format_date, Event, EventDraft, EventId, EventUpdate, PostponedEntry, PostponedView,
    SelectionPhase,
};

use super::Store;

impl Store {
    pub async fn create_event(&self, date: NaiveDate, draft: EventDraft) -> DatebookResult<Event> {
        let event = draft
            .into_event(date)
            .map_err(|e| self.fail("Creating event", e))?;
        let creds = self.credentials()?;
        if let Err(e) = self
            .transport()
            .create_events(&creds.token, std::slice::from_ref(&event))
            .await
        {
            return Err(self.fail_for(&creds, "Creating event", e));
        }
        self.apply_if_current(creds.epoch, |state| {
            state.events.merge_optimistic(vec![event.clone()])
        });
        self.resync_after_write(false).await;
        Ok(event)
    }

    /// Edit an event in place. The server receives every field, built from
    /// the cached copy plus `update`.
    pub async fn update_event(&self, id: &EventId, update: EventUpdate) -> DatebookResult<Event> {
        let current = self
            .find_event(id)
            .ok_or_else(|| DatebookError::NotFound(id.to_string()))?;
        let patch = update
            .resolve(&current)
            .map_err(|e| self.fail("Updating event", e))?;
        let creds = self.credentials()?;
        if let Err(e) = self
            .transport()
            .update_event(&creds.token, id, &patch)
            .await
        {
            return Err(self.fail_for(&creds, "Updating event", e));
        }
        let updated = patch.applied_to(&current);
        self.apply_if_current(creds.epoch, |state| {
            state.events.merge_optimistic(vec![updated.clone()])
        });
        self.resync_after_write(false).await;
        Ok(updated)
    }

    pub async fn delete_event(&self, id: &EventId) -> DatebookResult<()> {
        let creds = self.credentials()?;
        if let Err(e) = self.transport().delete_event(&creds.token, id).await {
            return Err(self.fail_for(&creds, "Deleting event", e));
        }
        self.apply_if_current(creds.epoch, |state| {
            state.events.remove(id);
            state.prune_day_selection();
        });
        self.resync_after_write(false).await;
        Ok(())
    }

    pub async fn create_postponed(
        &self,
        view: PostponedView,
        draft: EventDraft,
    ) -> DatebookResult<PostponedEntry> {
        let entry = draft
            .into_postponed(view)
            .map_err(|e| self.fail("Adding to backlog", e))?;
        let creds = self.credentials()?;
        if let Err(e) = self
            .transport()
            .create_postponed(&creds.token, std::slice::from_ref(&entry))
            .await
        {
            return Err(self.fail_for(&creds, "Adding to backlog", e));
        }
        self.apply_if_current(creds.epoch, |state| {
            state.backlog.merge_optimistic(vec![entry.clone()])
        });
        self.resync_after_write(true).await;
        Ok(entry)
    }

    pub async fn delete_postponed(&self, id: &EventId) -> DatebookResult<()> {
        let creds = self.credentials()?;
        if let Err(e) = self.transport().delete_postponed(&creds.token, id).await {
            return Err(self.fail_for(&creds, "Removing from backlog", e));
        }
        self.apply_if_current(creds.epoch, |state| {
            state.backlog.remove(id);
        });
        self.resync_after_write(true).await;
        Ok(())
    }

    /// Bulk-create events across the committed date range, one draft per
    /// entry. Every date must fall inside the range. On success the range
    /// selection is cleared.
    pub async fn create_range(
        &self,
        drafts: Vec<(NaiveDate, EventDraft)>,
    ) -> DatebookResult<Vec<Event>> {
        if drafts.is_empty() {
            return Err(DatebookError::EmptySelection);
        }
        let range = match (self.selection_phase(), self.selected_range()) {
            (SelectionPhase::Committed, Some(range)) => range,
            _ => {
                return Err(DatebookError::Validation(
                    "select a date range before adding events to it".to_string(),
                ))
            }
        };

        let mut events = Vec::with_capacity(drafts.len());
        for (date, draft) in drafts {
            if !range.contains(date) {
                let err = DatebookError::Validation(format!(
                    "{} is outside the selected range {} to {}",
                    format_date(date),
                    format_date(range.start()),
                    format_date(range.end())
                ));
                return Err(self.fail("Adding events", err));
            }
            events.push(draft.into_event(date).map_err(|e| self.fail("Adding events", e))?);
        }

        let _busy = self.mark_busy("create:range")?;
        let creds = self.credentials()?;
        let created = match self.transport().create_events(&creds.token, &events).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail_for(&creds, "Adding events", e)),
        };
        self.apply_if_current(creds.epoch, |state| {
            state.events.merge_optimistic(events.clone());
            state.range.clear();
        });
        tracing::info!(
            "Created {} event(s) across {} day(s)",
            created,
            range.len_days()
        );
        self.add_log(LogEntry::info(format!("Added {created} event(s)")));
        self.resync_after_write(false).await;
        Ok(events)
    }

    fn apply_if_current(&self, epoch: u64, apply: impl FnOnce(&mut super::StoreState)) {
        self.with_state(|state| {
            if state.session.epoch == epoch {
                apply(state);
            }
        });
    }
}
