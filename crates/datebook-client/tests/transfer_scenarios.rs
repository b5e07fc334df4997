mod common;

use common::{date, signed_in_store, Call, Failure, RecordingTransport};
use datebook_client::{TransferPolicy, TransferTarget};
use datebook_core::{AppConfig, DatebookError, Loggable};
use datebook_domain::{Event, EventDraft, PostponedEntry, PostponedView};

#[tokio::test]
async fn reactivate_and_move_creates_then_deletes_once() {
    let transport = RecordingTransport::new();
    let mut entry = PostponedEntry::new("Call the bank", PostponedView::Week);
    entry.origin_dates = vec![date("2025-01-01")];
    transport.seed_postponed(vec![entry.clone()]);
    let store = signed_in_store(&transport, AppConfig::default()).await;

    store
        .reactivate(
            &[entry.id.clone()],
            date("2025-02-10"),
            TransferPolicy::Move,
        )
        .await
        .unwrap();

    let writes = transport.writes();
    assert_eq!(writes.len(), 2, "unexpected writes: {writes:?}");
    match &writes[0] {
        Call::CreateEvents(created) => {
            assert_eq!(created.len(), 1);
            assert_eq!(created[0].date, date("2025-02-10"));
            assert_eq!(
                created[0].origin_dates,
                vec![date("2025-01-01"), date("2025-02-10")]
            );
            assert!(created[0].was_postponed);
        }
        other => panic!("expected a create first, got {other:?}"),
    }
    assert_eq!(writes[1], Call::DeletePostponed(entry.id.clone()));

    assert!(store.find_postponed(&entry.id).is_none());
    assert_eq!(store.events_on(date("2025-02-10")).len(), 1);
}

#[tokio::test]
async fn failed_create_issues_no_deletes() {
    let transport = RecordingTransport::new();
    let events = vec![
        Event::new("one", date("2025-03-01")),
        Event::new("two", date("2025-03-01")),
    ];
    transport.seed_events(events.clone());
    let store = signed_in_store(&transport, AppConfig::default()).await;
    transport.fail_create(Failure::Network);

    let ids: Vec<_> = events.iter().map(|e| e.id.clone()).collect();
    let err = store.move_to_date(&ids, date("2025-03-02")).await.unwrap_err();

    assert!(matches!(err, DatebookError::Network(_)));
    assert!(transport
        .writes()
        .iter()
        .all(|call| !matches!(call, Call::DeleteEvent(_) | Call::DeletePostponed(_))));
    assert_eq!(store.events_on(date("2025-03-01")).len(), 2);
    assert!(store.events_on(date("2025-03-02")).is_empty());
}

#[tokio::test]
async fn copy_keeps_was_postponed_and_sources() {
    let transport = RecordingTransport::new();
    let mut event = Event::new("Revisit budget", date("2025-03-01"));
    event.was_postponed = true;
    event.priority = Some(2);
    transport.seed_events(vec![event.clone()]);
    let store = signed_in_store(&transport, AppConfig::default()).await;

    store
        .copy_to_date(&[event.id.clone()], date("2025-03-08"))
        .await
        .unwrap();

    let writes = transport.writes();
    assert_eq!(writes.len(), 1);
    let Call::CreateEvents(created) = &writes[0] else {
        panic!("expected a create, got {:?}", writes[0]);
    };
    assert!(created.iter().all(|e| e.was_postponed));
    assert_ne!(created[0].id, event.id);
    assert_eq!(created[0].priority, Some(2));
    assert_eq!(
        created[0].origin_dates,
        vec![date("2025-03-01"), date("2025-03-08")]
    );
    assert_eq!(store.events_on(date("2025-03-01")), vec![event]);
}

#[tokio::test]
async fn partial_delete_keeps_create_and_reports() {
    let transport = RecordingTransport::new();
    let stuck = Event::new("stuck", date("2025-04-01"));
    let fine = Event::new("fine", date("2025-04-01"));
    transport.seed_events(vec![stuck.clone(), fine.clone()]);
    transport.fail_delete(&stuck.id, Failure::Network);
    let store = signed_in_store(&transport, AppConfig::default()).await;

    let err = store
        .move_to_date(&[stuck.id.clone(), fine.id.clone()], date("2025-04-02"))
        .await
        .unwrap_err();

    match err {
        DatebookError::PartialDelete {
            created,
            deleted,
            failed,
        } => {
            assert_eq!(created, 2);
            assert_eq!(deleted, 1);
            assert_eq!(failed, vec![stuck.id.to_string()]);
        }
        other => panic!("expected a partial delete, got {other:?}"),
    }
    // The create stands; the undeletable original is duplicated
    assert_eq!(store.events_on(date("2025-04-02")).len(), 2);
    assert_eq!(store.events_on(date("2025-04-01")), vec![stuck]);
    assert!(store
        .get_logs()
        .iter()
        .any(|log| log.message.contains("could not remove")));
}

#[tokio::test]
async fn expired_session_during_move_tears_down() {
    let transport = RecordingTransport::new();
    let event = Event::new("meeting", date("2025-05-01"));
    transport.seed_events(vec![event.clone()]);
    transport.fail_delete(&event.id, Failure::Auth(401));
    let store = signed_in_store(&transport, AppConfig::default()).await;

    let err = store
        .move_to_date(&[event.id.clone()], date("2025-05-02"))
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert!(store.needs_login());
    assert!(!store.is_signed_in());
    assert_eq!(store.event_count(), 0);
    assert!(store.get_logs().is_empty());
}

#[tokio::test]
async fn postpone_then_repostpone_extends_lineage() {
    let transport = RecordingTransport::new();
    let mut event = Event::new("Paint fence", date("2025-06-01"));
    event.origin_dates = vec![date("2025-05-25"), date("2025-06-01")];
    transport.seed_events(vec![event.clone()]);
    let store = signed_in_store(&transport, AppConfig::default()).await;

    store
        .postpone(&[event.id.clone()], PostponedView::Week, TransferPolicy::Move)
        .await
        .unwrap();
    let week = store.backlog_entries(PostponedView::Week);
    assert_eq!(week.len(), 1);
    assert_eq!(week[0].origin_dates, event.origin_dates);
    assert!(week[0].was_postponed);
    assert_eq!(store.event_count(), 0);

    store
        .repostpone(&[week[0].id.clone()], PostponedView::All, TransferPolicy::Move)
        .await
        .unwrap();
    assert!(store.backlog_entries(PostponedView::Week).is_empty());
    let all = store.backlog_entries(PostponedView::All);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].origin_dates, event.origin_dates);
    assert_eq!(transport.server_postponed().len(), 1);
}

#[tokio::test]
async fn day_selection_transfer_only_touches_checked_events() {
    let transport = RecordingTransport::new();
    let a = Event::new("a", date("2025-07-01")).with_time("09:00");
    let b = Event::new("b", date("2025-07-01")).with_time("10:00");
    let c = Event::new("c", date("2025-07-01")).with_time("11:00");
    transport.seed_events(vec![a.clone(), b.clone(), c.clone()]);
    let store = signed_in_store(&transport, AppConfig::default()).await;

    store.toggle_day_event(a.date, a.id.clone());
    store.toggle_day_event(c.date, c.id.clone());
    store
        .transfer_day_selection(TransferTarget::Date(date("2025-07-03")), TransferPolicy::Move)
        .await
        .unwrap();

    let left: Vec<_> = store
        .events_on(date("2025-07-01"))
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(left, vec!["b"]);
    let moved: Vec<_> = store
        .events_on(date("2025-07-03"))
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(moved, vec!["a", "c"]);
    assert!(store.selected_day_events().is_empty());
}

#[tokio::test]
async fn second_submission_while_in_flight_is_busy() {
    let transport = RecordingTransport::new();
    let event = Event::new("x", date("2025-08-01"));
    transport.seed_events(vec![event.clone()]);
    let store = signed_in_store(&transport, AppConfig::default()).await;

    // Hold the resync so the first transfer stays in flight
    let release = transport.hold_next_listing();
    let first = {
        let store = store.clone();
        let id = event.id.clone();
        tokio::spawn(async move { store.copy_to_date(&[id], date("2025-08-02")).await })
    };
    while !store.is_busy("transfer:day:2025-08-01") {
        tokio::task::yield_now().await;
    }

    let err = store
        .copy_to_date(&[event.id.clone()], date("2025-08-03"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatebookError::Busy(_)));

    release.send(()).unwrap();
    first.await.unwrap().unwrap();
    assert!(!store.is_busy("transfer:day:2025-08-01"));
}

#[tokio::test]
async fn create_range_submits_one_batch_and_clears_selection() {
    let transport = RecordingTransport::new();
    let store = signed_in_store(&transport, AppConfig::default()).await;

    store.pointer_down(date("2025-09-03"));
    store.pointer_enter(date("2025-09-02"));
    store.pointer_enter(date("2025-09-01"));
    store.pointer_up();

    let drafts = store
        .selected_range()
        .unwrap()
        .days()
        .map(|day| (day, EventDraft::titled("Standup")))
        .collect();
    let created = store.create_range(drafts).await.unwrap();

    assert_eq!(created.len(), 3);
    let creates: Vec<_> = transport
        .writes()
        .into_iter()
        .filter(|call| matches!(call, Call::CreateEvents(_)))
        .collect();
    assert_eq!(creates.len(), 1);
    assert!(store.selected_range().is_none());
    for day in ["2025-09-01", "2025-09-02", "2025-09-03"] {
        assert_eq!(store.events_on(date(day)).len(), 1);
    }
}
