//! Background refresh of the store.
//!
//! Two trigger sources feed one task: a fixed interval that refetches the
//! dated view, and explicit triggers (mount/focus) that refetch the dated
//! view and, if configured, the backlog. Each trigger runs its refresh in
//! its own task, so a slow fetch never delays the next one. Outcomes are
//! broadcast to subscribers.

use chrono::{DateTime, Utc};
use datebook_core::{DatebookResult, SyncSettings};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::store::{Refreshed, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTrigger {
    /// The calendar view was mounted or regained focus.
    Focus,
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncScope {
    Events,
    Backlog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncOutcome {
    Applied { count: usize },
    Discarded,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncEvent {
    pub trigger: SyncTrigger,
    pub scope: SyncScope,
    pub outcome: SyncOutcome,
    pub at: DateTime<Utc>,
}

pub struct SyncLoop;

impl SyncLoop {
    /// Start syncing `store`. A focus refresh runs right away, then the
    /// interval takes over.
    pub fn spawn(store: Arc<Store>, settings: SyncSettings) -> SyncHandle {
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let (events_tx, _) = broadcast::channel(32);
        let events = events_tx.clone();
        let period = settings.events_interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            dispatch(&store, &settings, &events_tx, SyncTrigger::Focus);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => dispatch(&store, &settings, &events_tx, SyncTrigger::Interval),
                    trigger = trigger_rx.recv() => match trigger {
                        Some(trigger) => dispatch(&store, &settings, &events_tx, trigger),
                        None => break,
                    },
                }
            }
            tracing::info!("Stopped background sync");
        });
        tracing::info!("Started background sync every {}s", period.as_secs());

        SyncHandle {
            triggers: trigger_tx,
            events,
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

fn dispatch(
    store: &Arc<Store>,
    settings: &SyncSettings,
    events: &broadcast::Sender<SyncEvent>,
    trigger: SyncTrigger,
) {
    if !store.is_signed_in() {
        tracing::debug!("Skipping {:?} sync without a session", trigger);
        return;
    }

    let store_for_events = Arc::clone(store);
    let sender = events.clone();
    tokio::spawn(async move {
        let result = store_for_events.refresh_view().await;
        publish(&sender, trigger, SyncScope::Events, result);
    });

    if trigger == SyncTrigger::Focus && settings.backlog_on_focus {
        let store = Arc::clone(store);
        let sender = events.clone();
        tokio::spawn(async move {
            let result = store.refresh_backlog().await;
            publish(&sender, trigger, SyncScope::Backlog, result);
        });
    }
}

fn publish(
    sender: &broadcast::Sender<SyncEvent>,
    trigger: SyncTrigger,
    scope: SyncScope,
    result: DatebookResult<Refreshed>,
) {
    let outcome = match result {
        Ok(Refreshed::Applied(count)) => SyncOutcome::Applied { count },
        Ok(Refreshed::Discarded) => SyncOutcome::Discarded,
        Err(e) => SyncOutcome::Failed {
            message: e.to_string(),
        },
    };
    // No subscribers is fine
    let _ = sender.send(SyncEvent {
        trigger,
        scope,
        outcome,
        at: Utc::now(),
    });
}

pub struct SyncHandle {
    triggers: mpsc::UnboundedSender<SyncTrigger>,
    events: broadcast::Sender<SyncEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Request a focus refresh. Returns false once the loop has stopped.
    pub fn focus(&self) -> bool {
        self.triggers.send(SyncTrigger::Focus).is_ok()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the loop. Refreshes already in flight still complete.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!("Sync task ended abnormally: {}", e);
        }
    }
}
