use order_tracker::config::TrackerConfig;
use order_tracker::error::TrackerError;
use order_tracker::lifecycle::TrackerSystem;
use order_tracker::mock::RecordingObserver;
use order_tracker::model::{OrderId, OrderLines, OrderSnapshot, OrderState};
use order_tracker::picker::PickerState;
use std::collections::BTreeSet;
use tempfile::TempDir;

fn lines(entries: &[(&str, u32)]) -> OrderLines {
    entries.iter().map(|(p, q)| (p.to_string(), *q)).collect()
}

fn config(tmp: &TempDir) -> TrackerConfig {
    TrackerConfig::default().with_root(tmp.path().join("orders"))
}

/// Places the three orders used throughout: alice, bob, carol.
async fn place_abc(system: &TrackerSystem) -> Vec<OrderId> {
    let mut ids = Vec::new();
    for (owner, order) in [
        ("alice", lines(&[("0001", 2), ("0002", 1)])),
        ("bob", lines(&[("0003", 1)])),
        ("carol", lines(&[("0001", 4)])),
    ] {
        ids.push(system.client.submit(owner, order).await.expect("submit failed"));
    }
    ids
}

#[tokio::test]
async fn test_pick_cycle_scenario() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let system = TrackerSystem::start(config.clone()).await.unwrap();

    let ids = place_abc(&system).await;
    assert_eq!(ids, vec![OrderId(1), OrderId(2), OrderId(3)]);
    assert_eq!(
        system.client.snapshot().await.unwrap(),
        OrderSnapshot::from([
            (1, OrderState::Placed),
            (2, OrderState::Placed),
            (3, OrderState::Placed),
        ])
    );

    let detail = system.client.advance().await.unwrap();
    assert_eq!(detail.id, OrderId(1));
    assert_eq!(detail.owner, "alice");
    assert_eq!(detail.lines, lines(&[("0001", 2), ("0002", 1)]));
    assert_eq!(detail.state, OrderState::InProgress);
    assert!(detail.progressing_at.is_some());
    assert_eq!(
        system.client.snapshot().await.unwrap(),
        OrderSnapshot::from([
            (1, OrderState::InProgress),
            (2, OrderState::Placed),
            (3, OrderState::Placed),
        ])
    );
    assert_eq!(
        system.client.picker_state().await.unwrap(),
        PickerState::Working(OrderId(1))
    );

    assert_eq!(system.client.complete().await.unwrap(), OrderId(1));
    assert_eq!(
        system.client.snapshot().await.unwrap(),
        OrderSnapshot::from([(2, OrderState::Placed), (3, OrderState::Placed)])
    );
    assert_eq!(system.client.picker_state().await.unwrap(), PickerState::Idle);

    // The collected record sits in the done directory and nowhere else.
    assert!(config.state_dir(OrderState::Done).join("1.json").is_file());
    assert!(!config.state_dir(OrderState::Placed).join("1.json").exists());
    assert!(!config.state_dir(OrderState::InProgress).join("1.json").exists());

    let archived = system.client.get(OrderId(1)).await.unwrap().unwrap();
    assert_eq!(archived.state, OrderState::Done);
    assert!(archived.collected_at.is_some());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_second_advance_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();
    place_abc(&system).await;

    system.client.advance().await.unwrap();
    let err = system.client.advance().await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidWorkflowState { .. }));

    // Nothing moved.
    assert_eq!(
        system.client.snapshot().await.unwrap().get(OrderId(2)),
        Some(OrderState::Placed)
    );
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_advance_with_nothing_placed() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();

    let err = system.client.advance().await.unwrap_err();
    assert!(matches!(err, TrackerError::NoOrderAvailable));
    assert!(system.client.snapshot().await.unwrap().is_empty());
    assert_eq!(system.client.picker_state().await.unwrap(), PickerState::Idle);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_complete_while_idle() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();
    place_abc(&system).await;

    let err = system.client.complete().await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidWorkflowState { .. }));
    assert_eq!(system.client.snapshot().await.unwrap().len(), 3);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_empty_order_is_rejected_without_burning_an_id() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();

    let err = system.client.submit("alice", OrderLines::new()).await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidOrder(_)));
    let err = system
        .client
        .submit("alice", lines(&[("0001", 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::InvalidOrder(_)));

    let id = system.client.submit("alice", lines(&[("0001", 1)])).await.unwrap();
    assert_eq!(id, OrderId(1));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_submits_get_distinct_ids() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let system = TrackerSystem::start(config.clone()).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = system.client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .submit(&format!("customer-{i}"), lines(&[("0001", 1)]))
                .await
        }));
    }

    let mut ids = BTreeSet::new();
    for task in tasks {
        let id = task.await.unwrap().unwrap();
        assert!(ids.insert(id), "id {id} handed out twice");
    }
    assert_eq!(ids, (1..=20).map(OrderId).collect());
    assert_eq!(system.client.snapshot().await.unwrap().len(), 20);

    system.shutdown().await.unwrap();
    let counter = std::fs::read_to_string(config.counter_path()).unwrap();
    assert_eq!(counter.trim(), "20");
}

#[tokio::test]
async fn test_restart_restores_snapshot() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);

    let system = TrackerSystem::start(config.clone()).await.unwrap();
    place_abc(&system).await;
    system.client.advance().await.unwrap();
    system.client.complete().await.unwrap();
    let before = system.client.snapshot().await.unwrap();
    let order_two = system.client.get(OrderId(2)).await.unwrap();
    system.shutdown().await.unwrap();

    let system = TrackerSystem::start(config).await.unwrap();
    assert_eq!(system.client.snapshot().await.unwrap(), before);
    assert_eq!(system.client.get(OrderId(2)).await.unwrap(), order_two);

    // Ids continue after the last one handed out.
    let next = system.client.submit("dave", lines(&[("0002", 1)])).await.unwrap();
    assert_eq!(next, OrderId(4));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_restart_resumes_order_in_progress() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);

    let system = TrackerSystem::start(config.clone()).await.unwrap();
    place_abc(&system).await;
    system.client.advance().await.unwrap();
    system.shutdown().await.unwrap();

    let system = TrackerSystem::start(config).await.unwrap();
    assert_eq!(
        system.client.picker_state().await.unwrap(),
        PickerState::Working(OrderId(1))
    );

    let observer = RecordingObserver::new();
    system.client.register(observer.clone()).await.unwrap();
    let first = &observer.updates()[0];
    assert_eq!(first.detail.as_ref().map(|d| d.id), Some(OrderId(1)));

    assert_eq!(system.client.complete().await.unwrap(), OrderId(1));
    assert_eq!(system.client.advance().await.unwrap().id, OrderId(2));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_late_observer_sees_current_state() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();
    place_abc(&system).await;

    let observer = RecordingObserver::new();
    assert!(system.client.register(observer.clone()).await.unwrap());

    let updates = observer.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].snapshot, system.client.snapshot().await.unwrap());
    assert!(updates[0].detail.is_none());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_observers_see_every_change_in_order() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();
    let mut view = system.client.subscribe("tracker-view").await.unwrap();
    let recorder = RecordingObserver::new();
    system.client.register(recorder.clone()).await.unwrap();

    let id = system.client.submit("alice", lines(&[("0001", 1)])).await.unwrap();
    system.client.advance().await.unwrap();
    system.client.complete().await.unwrap();

    let expected = vec![
        OrderSnapshot::default(),
        OrderSnapshot::from([(1, OrderState::Placed)]),
        OrderSnapshot::from([(1, OrderState::InProgress)]),
        OrderSnapshot::default(),
    ];

    let recorded: Vec<_> = recorder.updates().into_iter().map(|u| u.snapshot).collect();
    assert_eq!(recorded, expected);

    for snapshot in &expected {
        assert_eq!(&view.recv().await.unwrap().snapshot, snapshot);
    }
    assert!(view.try_recv().is_err());

    let details: Vec<_> = recorder
        .updates()
        .into_iter()
        .map(|u| u.detail.map(|d| d.id))
        .collect();
    assert_eq!(details, vec![None, None, Some(id), None]);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropped_view_is_forgotten() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();

    let view = system.client.subscribe("picker-view").await.unwrap();
    drop(view);

    // The next change detaches the dead view; the tracker keeps working.
    system.client.submit("alice", lines(&[("0001", 1)])).await.unwrap();
    system.client.submit("bob", lines(&[("0002", 1)])).await.unwrap();
    assert_eq!(system.client.snapshot().await.unwrap().len(), 2);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_get_unknown_order() {
    let tmp = TempDir::new().unwrap();
    let system = TrackerSystem::start(config(&tmp)).await.unwrap();

    assert_eq!(system.client.get(OrderId(42)).await.unwrap(), None);
    assert_eq!(system.client.oldest(OrderState::Placed).await.unwrap(), None);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_placed_record_does_not_block_picker() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let system = TrackerSystem::start(config.clone()).await.unwrap();
    system.client.submit("alice", lines(&[("0001", 1)])).await.unwrap();
    system.client.submit("bob", lines(&[("0002", 1)])).await.unwrap();

    std::fs::remove_file(config.state_dir(OrderState::Placed).join("1.json")).unwrap();

    let err = system.client.advance().await.unwrap_err();
    assert!(matches!(
        err,
        TrackerError::NotFound { id: OrderId(1), state: OrderState::Placed }
    ));
    assert_eq!(
        system.client.snapshot().await.unwrap(),
        OrderSnapshot::from([(2, OrderState::Placed)])
    );
    assert_eq!(system.client.picker_state().await.unwrap(), PickerState::Idle);

    let detail = system.client.advance().await.unwrap();
    assert_eq!(detail.id, OrderId(2));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_placed_record_leaves_live_view() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let system = TrackerSystem::start(config.clone()).await.unwrap();
    let recorder = RecordingObserver::new();
    system.client.register(recorder.clone()).await.unwrap();
    system.client.submit("alice", lines(&[("0001", 1)])).await.unwrap();
    system.client.submit("bob", lines(&[("0002", 1)])).await.unwrap();

    std::fs::write(config.state_dir(OrderState::Placed).join("1.json"), "{ not json").unwrap();

    let err = system.client.advance().await.unwrap_err();
    assert!(matches!(err, TrackerError::CorruptRecord { .. }));

    // Views are told the order left the live map.
    let last = recorder.updates().pop().unwrap();
    assert_eq!(last.snapshot, OrderSnapshot::from([(2, OrderState::Placed)]));

    assert_eq!(system.client.advance().await.unwrap().id, OrderId(2));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_progress_record_frees_picker() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let system = TrackerSystem::start(config.clone()).await.unwrap();
    place_abc(&system).await;
    system.client.advance().await.unwrap();

    std::fs::remove_file(config.state_dir(OrderState::InProgress).join("1.json")).unwrap();

    let err = system.client.complete().await.unwrap_err();
    assert!(matches!(
        err,
        TrackerError::NotFound { id: OrderId(1), state: OrderState::InProgress }
    ));
    assert_eq!(system.client.picker_state().await.unwrap(), PickerState::Idle);
    assert_eq!(
        system.client.snapshot().await.unwrap(),
        OrderSnapshot::from([(2, OrderState::Placed), (3, OrderState::Placed)])
    );

    assert_eq!(system.client.advance().await.unwrap().id, OrderId(2));
    system.shutdown().await.unwrap();
}
