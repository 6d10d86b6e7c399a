//! Integration tests for the gesture event loop

use std::sync::Arc;
use taskboard_kanban::{
    board::LoadBoard,
    test_support::{column_id, task_id, task_titles, BoardFixture, RecordingBackend},
    BoardContext, BoardSession, EngineConfig, Execute, GestureEvent, TaskId,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

async fn loaded_session() -> (Arc<RecordingBackend>, BoardSession<RecordingBackend>) {
    let backend = Arc::new(RecordingBackend::new());
    let loaded = BoardFixture::new()
        .column("todo", &["a", "b", "c"])
        .column("done", &[])
        .seed(backend.as_ref())
        .await
        .unwrap();
    let ctx = BoardContext::with_backend(Arc::clone(&backend), EngineConfig::default());
    LoadBoard::new(loaded.board.id)
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    (backend, BoardSession::new(ctx))
}

#[tokio::test]
async fn test_events_from_channel_drive_a_full_drag() {
    let (backend, mut session) = loaded_session().await;
    let snapshot = session.context().snapshot().await;
    let a = task_id(&snapshot, "a").to_string();
    let c = task_id(&snapshot, "c").to_string();
    let done = format!("column-{}", column_id(&snapshot, "done"));

    let (tx, rx) = mpsc::channel(16);
    let events = vec![
        GestureEvent::Start { active: a.clone() },
        GestureEvent::Over {
            active: a.clone(),
            over: Some(c.clone()),
        },
        GestureEvent::Over {
            active: a.clone(),
            over: Some(done.clone()),
        },
        GestureEvent::End {
            active: a.clone(),
            over: Some(done),
        },
    ];
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);

    let pending = session.run(rx, CancellationToken::new()).await;
    assert_eq!(pending.len(), 1);
    for commit in pending {
        commit.wait().await.unwrap();
    }

    let snapshot = session.context().snapshot().await;
    assert_eq!(task_titles(&snapshot, "todo"), ["b", "c"]);
    assert_eq!(task_titles(&snapshot, "done"), ["a"]);
    assert_eq!(backend.moves().len(), 1);
    assert!(!session.drag().is_dragging());
}

#[tokio::test]
async fn test_events_decoded_from_json_lines() {
    let (backend, mut session) = loaded_session().await;
    let snapshot = session.context().snapshot().await;
    let a = task_id(&snapshot, "a");
    let b = task_id(&snapshot, "b");

    let script = format!(
        "{{\"event\":\"start\",\"active\":\"{b}\"}}\n\
         {{\"event\":\"over\",\"active\":\"{b}\",\"over\":\"{a}\"}}\n\
         {{\"event\":\"end\",\"active\":\"{b}\",\"over\":\"{a}\"}}\n"
    );
    for line in script.lines() {
        let event: GestureEvent = serde_json::from_str(line).unwrap();
        if let Some(pending) = session.handle(event).await {
            pending.wait().await.unwrap();
        }
    }

    assert_eq!(
        task_titles(&*session.context().snapshot().await, "todo"),
        ["b", "a", "c"]
    );
    let moves = backend.moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].task_id, b);
    assert_eq!(moves[0].order, 0);
}

#[tokio::test]
async fn test_active_task_is_observable() {
    let (_backend, mut session) = loaded_session().await;
    let snapshot = session.context().snapshot().await;
    let a = task_id(&snapshot, "a");
    let mut active = session.subscribe_active();

    session.on_drag_start(a.as_str()).await;
    active.changed().await.unwrap();
    assert_eq!(*active.borrow_and_update(), Some(a.clone()));

    session.on_drag_cancel(a.as_str()).await;
    active.changed().await.unwrap();
    assert_eq!(*active.borrow_and_update(), None::<TaskId>);
}

#[tokio::test]
async fn test_second_drag_ignored_while_first_is_active() {
    let (backend, mut session) = loaded_session().await;
    let snapshot = session.context().snapshot().await;
    let a = task_id(&snapshot, "a").to_string();
    let b = task_id(&snapshot, "b").to_string();
    let c = task_id(&snapshot, "c").to_string();

    session.on_drag_start(&a).await;
    session.on_drag_start(&b).await;
    session.on_drag_over(&b, Some(&c)).await;
    assert!(session.on_drag_end(&b, Some(&c)).await.is_none());
    assert_eq!(session.drag().active_task(), Some(TaskId::from_string(a)));
    assert_eq!(
        task_titles(&*session.context().snapshot().await, "todo"),
        ["a", "b", "c"]
    );
    assert!(backend.moves().is_empty());
}

#[tokio::test]
async fn test_cancelled_token_stops_loop_and_cancels_drag() {
    let (backend, mut session) = loaded_session().await;
    let snapshot = session.context().snapshot().await;
    let a = task_id(&snapshot, "a").to_string();
    let c = task_id(&snapshot, "c").to_string();

    session.on_drag_start(&a).await;
    session.on_drag_over(&a, Some(&c)).await;

    let (_tx, rx) = mpsc::channel::<GestureEvent>(4);
    let token = CancellationToken::new();
    token.cancel();
    let pending = session.run(rx, token).await;

    assert!(pending.is_empty());
    assert!(!session.drag().is_dragging());
    // The default policy puts the task back where the drag started.
    assert_eq!(
        task_titles(&*session.context().snapshot().await, "todo"),
        ["a", "b", "c"]
    );
    assert!(backend.moves().is_empty());
}
