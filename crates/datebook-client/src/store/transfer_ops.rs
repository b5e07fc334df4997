use chrono::NaiveDate;
use datebook_core::{DatebookError, DatebookResult, LogEntry, Loggable};
use datebook_domain::{format_date, EventId, PostponedEntry, PostponedView};

use super::Store;
use crate::backlog::TransferTarget;
use crate::transfer::{self, Batch, SourceRef, TransferPlan, TransferPolicy, TransferReport};

impl Store {
    pub async fn copy_to_date(
        &self,
        ids: &[EventId],
        target: NaiveDate,
    ) -> DatebookResult<TransferReport> {
        self.transfer_dated(ids, TransferTarget::Date(target), TransferPolicy::Copy).await
    }

    pub async fn move_to_date(
        &self,
        ids: &[EventId],
        target: NaiveDate,
    ) -> DatebookResult<TransferReport> {
        self.transfer_dated(ids, TransferTarget::Date(target), TransferPolicy::Move).await
    }

    /// Shelve dated events into a backlog partition.
    pub async fn postpone(
        &self,
        ids: &[EventId],
        view: PostponedView,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        self.transfer_dated(ids, TransferTarget::Backlog(view), policy).await
    }

    /// Put backlog entries back on the calendar.
    pub async fn reactivate(
        &self,
        ids: &[EventId],
        target: NaiveDate,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        self.transfer_postponed(ids, TransferTarget::Date(target), policy).await
    }

    /// Move or copy backlog entries into another partition.
    pub async fn repostpone(
        &self,
        ids: &[EventId],
        view: PostponedView,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        self.transfer_postponed(ids, TransferTarget::Backlog(view), policy).await
    }

    /// Transfer the checked events of the selected day. The selection is
    /// cleared once the transfer has been applied.
    pub async fn transfer_day_selection(
        &self,
        target: TransferTarget,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        let ids: Vec<EventId> = self
            .selected_day_events()
            .into_iter()
            .map(|event| event.id)
            .collect();
        let report = self.transfer_dated(&ids, target, policy).await?;
        self.clear_day_selection();
        Ok(report)
    }

    /// Transfer the checked entries of a partition to that partition's
    /// chosen target.
    pub async fn transfer_backlog_selection(
        &self,
        view: PostponedView,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        let target = self.backlog_state(view).transfer_target.ok_or_else(|| {
            DatebookError::Validation(format!("no transfer target chosen for the {view} backlog"))
        })?;
        let ids: Vec<EventId> = self
            .selected_backlog_entries(view)
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        let report = self.transfer_postponed(&ids, target, policy).await?;
        self.clear_backlog_selection(view);
        Ok(report)
    }

    async fn transfer_dated(
        &self,
        ids: &[EventId],
        target: TransferTarget,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        let events = self.lookup(ids, |state, id| state.events.find(id).cloned())?;
        let key = match events.first() {
            Some(event) => format!("transfer:day:{}", format_date(event.date)),
            None => "transfer:day".to_string(),
        };
        let plan = match target {
            TransferTarget::Date(date) => TransferPlan::dated_to_date(&events, date, policy),
            TransferTarget::Backlog(view) => TransferPlan::dated_to_backlog(&events, view, policy),
        };
        self.run_transfer(plan, key).await
    }

    async fn transfer_postponed(
        &self,
        ids: &[EventId],
        target: TransferTarget,
        policy: TransferPolicy,
    ) -> DatebookResult<TransferReport> {
        let entries: Vec<PostponedEntry> =
            self.lookup(ids, |state, id| state.backlog.find(id).cloned())?;
        let key = match entries.first() {
            Some(entry) => format!("transfer:backlog:{}", entry.postponed_view),
            None => "transfer:backlog".to_string(),
        };
        let plan = match target {
            TransferTarget::Date(date) => TransferPlan::backlog_to_date(&entries, date, policy),
            TransferTarget::Backlog(view) => {
                TransferPlan::backlog_to_backlog(&entries, view, policy)
            }
        };
        self.run_transfer(plan, key).await
    }

    fn lookup<T>(
        &self,
        ids: &[EventId],
        find: impl Fn(&super::StoreState, &EventId) -> Option<T>,
    ) -> DatebookResult<Vec<T>> {
        let state = self.state.lock();
        ids.iter()
            .map(|id| find(&state, id).ok_or_else(|| DatebookError::NotFound(id.to_string())))
            .collect()
    }

    async fn run_transfer(
        &self,
        plan: DatebookResult<TransferPlan>,
        key: String,
    ) -> DatebookResult<TransferReport> {
        let plan = match plan {
            Ok(plan) => plan,
            Err(DatebookError::EmptySelection) => return Err(DatebookError::EmptySelection),
            Err(e) => return Err(self.fail("Transfer", e)),
        };
        let _busy = self.mark_busy(key)?;
        let creds = self.credentials()?;
        let action = describe(&plan);

        let report = match transfer::execute(self.transport(), &creds.token, &plan).await {
            Ok(report) => report,
            Err(e) => return Err(self.fail_for(&creds, &action, e)),
        };

        let applied = self.with_state(|state| {
            if state.session.epoch != creds.epoch {
                return false;
            }
            match &plan.batch {
                Batch::Dated(events) => state.events.merge_optimistic(events.clone()),
                Batch::Postponed(entries) => state.backlog.merge_optimistic(entries.clone()),
            }
            for source in &report.deleted {
                match source {
                    SourceRef::Dated(id) => {
                        state.events.remove(id);
                    }
                    SourceRef::Postponed(id) => {
                        state.backlog.remove(id);
                    }
                }
            }
            state.prune_day_selection();
            true
        });
        if applied {
            tracing::info!(
                "{}: created {}, removed {}",
                action,
                report.created,
                report.deleted.len()
            );
            self.resync_after_write(true).await;
        }

        if let Some(err) = report.partial_error() {
            self.add_log(LogEntry::warning(err.to_string()));
            return Err(err);
        }
        Ok(report)
    }
}

fn describe(plan: &TransferPlan) -> String {
    let verb = match plan.policy {
        TransferPolicy::Copy => "Copying",
        TransferPolicy::Move => "Moving",
    };
    let target = match plan.target {
        TransferTarget::Date(date) => format_date(date),
        TransferTarget::Backlog(view) => format!("the {view} backlog"),
    };
    format!("{verb} {} item(s) to {target}", plan.batch.len())
}
