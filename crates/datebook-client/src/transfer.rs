//! Copy, move, postpone, and reactivate.
//!
//! A transfer is planned up front (fresh ids, extended origin chains) and
//! then executed as one bulk create followed, for moves only, by one delete
//! per source. No delete is issued unless the create succeeded. Deletes are
//! independent: a failed one is reported and the rest still run.

use chrono::NaiveDate;
use datebook_core::{DatebookError, DatebookResult};
use datebook_domain::{Event, EventId, PostponedEntry, PostponedView};
use serde::{Deserialize, Serialize};

use crate::backlog::TransferTarget;
use crate::transport::EventTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferPolicy {
    Copy,
    Move,
}

/// The original record a transfer reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum SourceRef {
    Dated(EventId),
    Postponed(EventId),
}

impl SourceRef {
    pub fn id(&self) -> &EventId {
        match self {
            Self::Dated(id) | Self::Postponed(id) => id,
        }
    }
}

/// Records to create, all of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    Dated(Vec<Event>),
    Postponed(Vec<PostponedEntry>),
}

impl Batch {
    pub fn len(&self) -> usize {
        match self {
            Self::Dated(events) => events.len(),
            Self::Postponed(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub policy: TransferPolicy,
    pub target: TransferTarget,
    pub batch: Batch,
    pub sources: Vec<SourceRef>,
}

impl TransferPlan {
    /// Dated events onto another date.
    pub fn dated_to_date(
        events: &[Event],
        target: NaiveDate,
        policy: TransferPolicy,
    ) -> DatebookResult<Self> {
        ensure_selected(events.len())?;
        let built = events.iter().map(|e| e.copied_to(target)).collect::<Vec<_>>();
        validate_all(built.iter().map(Event::validate))?;
        Ok(Self {
            policy,
            target: TransferTarget::Date(target),
            batch: Batch::Dated(built),
            sources: events.iter().map(|e| SourceRef::Dated(e.id.clone())).collect(),
        })
    }

    /// Dated events into a backlog partition.
    pub fn dated_to_backlog(
        events: &[Event],
        view: PostponedView,
        policy: TransferPolicy,
    ) -> DatebookResult<Self> {
        ensure_selected(events.len())?;
        let built = events.iter().map(|e| e.postponed_into(view)).collect::<Vec<_>>();
        validate_all(built.iter().map(PostponedEntry::validate))?;
        Ok(Self {
            policy,
            target: TransferTarget::Backlog(view),
            batch: Batch::Postponed(built),
            sources: events.iter().map(|e| SourceRef::Dated(e.id.clone())).collect(),
        })
    }

    /// Backlog entries back onto the calendar.
    pub fn backlog_to_date(
        entries: &[PostponedEntry],
        target: NaiveDate,
        policy: TransferPolicy,
    ) -> DatebookResult<Self> {
        ensure_selected(entries.len())?;
        let built = entries.iter().map(|e| e.reactivated_on(target)).collect::<Vec<_>>();
        validate_all(built.iter().map(Event::validate))?;
        Ok(Self {
            policy,
            target: TransferTarget::Date(target),
            batch: Batch::Dated(built),
            sources: entries.iter().map(|e| SourceRef::Postponed(e.id.clone())).collect(),
        })
    }

    /// Backlog entries into a partition.
    pub fn backlog_to_backlog(
        entries: &[PostponedEntry],
        view: PostponedView,
        policy: TransferPolicy,
    ) -> DatebookResult<Self> {
        ensure_selected(entries.len())?;
        let built = entries.iter().map(|e| e.repostponed_into(view)).collect::<Vec<_>>();
        validate_all(built.iter().map(PostponedEntry::validate))?;
        Ok(Self {
            policy,
            target: TransferTarget::Backlog(view),
            batch: Batch::Postponed(built),
            sources: entries.iter().map(|e| SourceRef::Postponed(e.id.clone())).collect(),
        })
    }
}

fn ensure_selected(count: usize) -> DatebookResult<()> {
    if count == 0 {
        return Err(DatebookError::EmptySelection);
    }
    Ok(())
}

fn validate_all<I: IntoIterator<Item = DatebookResult<()>>>(results: I) -> DatebookResult<()> {
    results.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDelete {
    pub source: SourceRef,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub policy: TransferPolicy,
    pub target: TransferTarget,
    pub created: usize,
    pub deleted: Vec<SourceRef>,
    pub failed: Vec<FailedDelete>,
}

impl TransferReport {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// The partial-failure error for this report, if any delete failed.
    pub fn partial_error(&self) -> Option<DatebookError> {
        if !self.is_partial() {
            return None;
        }
        Some(DatebookError::PartialDelete {
            created: self.created,
            deleted: self.deleted.len(),
            failed: self
                .failed
                .iter()
                .map(|f| f.source.id().to_string())
                .collect(),
        })
    }
}

/// Run a plan against the server.
///
/// Returns `Err` only when nothing was created, or when the session expired
/// midway. Failed deletes are reported in the returned report.
pub async fn execute(
    transport: &dyn EventTransport,
    token: &str,
    plan: &TransferPlan,
) -> DatebookResult<TransferReport> {
    let created = match &plan.batch {
        Batch::Dated(events) => transport.create_events(token, events).await?,
        Batch::Postponed(entries) => transport.create_postponed(token, entries).await?,
    };
    if created != plan.batch.len() {
        tracing::warn!(
            "server reported {} created for a batch of {}",
            created,
            plan.batch.len()
        );
    }

    let mut report = TransferReport {
        policy: plan.policy,
        target: plan.target,
        created,
        deleted: Vec::new(),
        failed: Vec::new(),
    };
    if plan.policy == TransferPolicy::Copy {
        return Ok(report);
    }

    for source in &plan.sources {
        let result = match source {
            SourceRef::Dated(id) => transport.delete_event(token, id).await,
            SourceRef::Postponed(id) => transport.delete_postponed(token, id).await,
        };
        match result {
            Ok(()) => report.deleted.push(source.clone()),
            Err(e) if e.is_auth() => return Err(e),
            // Someone else removed it first; nothing is duplicated.
            Err(DatebookError::NotFound(_)) => {
                tracing::debug!("Original {} was already gone", source.id());
                report.deleted.push(source.clone());
            }
            Err(e) => {
                tracing::warn!("Failed to remove original {}: {}", source.id(), e);
                report.failed.push(FailedDelete {
                    source: source.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockEventTransport;
    use mockall::predicate::eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn two_events() -> Vec<Event> {
        vec![
            Event::new("one", date("2025-01-01")),
            Event::new("two", date("2025-01-01")),
        ]
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = TransferPlan::dated_to_date(&[], date("2025-01-02"), TransferPolicy::Move)
            .unwrap_err();
        assert!(matches!(err, DatebookError::EmptySelection));
        let err = TransferPlan::backlog_to_backlog(&[], PostponedView::All, TransferPolicy::Copy)
            .unwrap_err();
        assert!(matches!(err, DatebookError::EmptySelection));
    }

    #[test]
    fn test_plan_with_blank_title_is_rejected() {
        let mut event = Event::new("x", date("2025-01-01"));
        event.title = " ".to_string();
        let err = TransferPlan::dated_to_date(&[event], date("2025-01-02"), TransferPolicy::Copy)
            .unwrap_err();
        assert!(matches!(err, DatebookError::Validation(_)));
    }

    #[tokio::test]
    async fn test_failed_create_issues_no_deletes() {
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .times(1)
            .returning(|_, _| Err(DatebookError::Network("connection reset".to_string())));
        transport.expect_delete_event().never();
        transport.expect_delete_postponed().never();

        let plan =
            TransferPlan::dated_to_date(&two_events(), date("2025-01-05"), TransferPolicy::Move)
                .unwrap();
        let result = execute(&transport, "token", &plan).await;
        assert!(matches!(result, Err(DatebookError::Network(_))));
    }

    #[tokio::test]
    async fn test_copy_never_deletes() {
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .times(1)
            .returning(|_, events| Ok(events.len()));
        transport.expect_delete_event().never();

        let plan =
            TransferPlan::dated_to_date(&two_events(), date("2025-01-05"), TransferPolicy::Copy)
                .unwrap();
        let report = execute(&transport, "token", &plan).await.unwrap();
        assert_eq!(report.created, 2);
        assert!(report.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_copy_keeps_postponed_flag_in_payload() {
        let mut events = two_events();
        for event in &mut events {
            event.was_postponed = true;
        }
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .withf(|_, events| !events.is_empty() && events.iter().all(|e| e.was_postponed))
            .times(1)
            .returning(|_, events| Ok(events.len()));

        let plan = TransferPlan::dated_to_date(&events, date("2025-03-01"), TransferPolicy::Copy)
            .unwrap();
        execute(&transport, "token", &plan).await.unwrap();
    }

    #[tokio::test]
    async fn test_move_deletes_each_source_once() {
        let events = two_events();
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .times(1)
            .returning(|_, events| Ok(events.len()));
        for event in &events {
            transport
                .expect_delete_event()
                .with(eq("token"), eq(event.id.clone()))
                .times(1)
                .returning(|_, _| Ok(()));
        }

        let plan = TransferPlan::dated_to_date(&events, date("2025-01-05"), TransferPolicy::Move)
            .unwrap();
        let report = execute(&transport, "token", &plan).await.unwrap();
        assert_eq!(report.deleted.len(), 2);
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_one_failed_delete_does_not_stop_the_others() {
        let events = two_events();
        let failing = events[0].id.clone();
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .returning(|_, events| Ok(events.len()));
        transport
            .expect_delete_event()
            .times(2)
            .returning(move |_, id| {
                if *id == failing {
                    Err(DatebookError::Server {
                        status: 500,
                        message: "db locked".to_string(),
                    })
                } else {
                    Ok(())
                }
            });

        let plan = TransferPlan::dated_to_date(&events, date("2025-01-05"), TransferPolicy::Move)
            .unwrap();
        let report = execute(&transport, "token", &plan).await.unwrap();
        assert_eq!(report.deleted, vec![SourceRef::Dated(events[1].id.clone())]);
        assert_eq!(report.failed.len(), 1);
        match report.partial_error() {
            Some(DatebookError::PartialDelete {
                created,
                deleted,
                failed,
            }) => {
                assert_eq!(created, 2);
                assert_eq!(deleted, 1);
                assert_eq!(failed, vec![events[0].id.to_string()]);
            }
            other => panic!("expected partial delete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_source_already_gone_counts_as_deleted() {
        let events = two_events();
        let vanished = events[0].id.clone();
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .returning(|_, events| Ok(events.len()));
        transport
            .expect_delete_event()
            .times(2)
            .returning(move |_, id| {
                if *id == vanished {
                    Err(DatebookError::from_status(404, "no such event"))
                } else {
                    Ok(())
                }
            });

        let plan = TransferPlan::dated_to_date(&events, date("2025-01-05"), TransferPolicy::Move)
            .unwrap();
        let report = execute(&transport, "token", &plan).await.unwrap();
        assert_eq!(report.deleted.len(), 2);
        assert!(report.failed.is_empty());
        assert!(report.partial_error().is_none());
    }

    #[tokio::test]
    async fn test_postpone_move_creates_postponed_then_deletes_dated() {
        let event = Event::new("taxes", date("2025-04-01"));
        let id = event.id.clone();
        let mut transport = MockEventTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_create_postponed()
            .withf(|_, entries| {
                entries.len() == 1
                    && entries[0].postponed_view == PostponedView::Week
                    && entries[0].was_postponed
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, entries| Ok(entries.len()));
        transport
            .expect_delete_event()
            .with(eq("token"), eq(id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let plan =
            TransferPlan::dated_to_backlog(&[event], PostponedView::Week, TransferPolicy::Move)
                .unwrap();
        let report = execute(&transport, "token", &plan).await.unwrap();
        assert_eq!(report.target, TransferTarget::Backlog(PostponedView::Week));
    }

    #[tokio::test]
    async fn test_auth_failure_during_delete_stops_the_run() {
        let mut transport = MockEventTransport::new();
        transport
            .expect_create_events()
            .returning(|_, events| Ok(events.len()));
        transport
            .expect_delete_event()
            .times(1)
            .returning(|_, _| Err(DatebookError::AuthExpired { status: 401 }));

        let plan =
            TransferPlan::dated_to_date(&two_events(), date("2025-01-05"), TransferPolicy::Move)
                .unwrap();
        let result = execute(&transport, "token", &plan).await;
        assert!(matches!(result, Err(DatebookError::AuthExpired { status: 401 })));
    }
}
