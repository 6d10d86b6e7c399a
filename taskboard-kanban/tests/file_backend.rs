//! Integration tests for the file-backed store

use taskboard_kanban::{
    backend::FileBackend,
    board::{CreateBoard, ListBoards, LoadBoard},
    column::{AddColumn, RenameColumn},
    defaults::column_drop_id,
    task::{AddTask, MoveTask},
    test_support::{column_id, task_id, task_titles},
    BoardBackend, BoardContext, BoardError, BoardId, BoardOperationProcessor, BoardSession,
    EngineConfig, Execute, OperationProcessor,
};
use tempfile::TempDir;

fn context(temp: &TempDir) -> BoardContext<FileBackend> {
    let config = EngineConfig::default()
        .with_data_dir(temp.path().join(".taskboard"))
        .with_actor("tester");
    let backend = FileBackend::new(&config.data_dir);
    BoardContext::new(backend, config)
}

async fn create_and_load(ctx: &BoardContext<FileBackend>) -> String {
    let processor = BoardOperationProcessor::new();
    let created = processor
        .process(&CreateBoard::new("Launch", "tester"), ctx)
        .await
        .unwrap();
    let board_id = created["board"]["id"].as_str().unwrap().to_string();
    processor
        .process(&LoadBoard::new(board_id.as_str()), ctx)
        .await
        .unwrap();
    board_id
}

#[tokio::test]
async fn test_board_lifecycle_persists_across_contexts() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    let processor = BoardOperationProcessor::new();
    let board_id = create_and_load(&ctx).await;

    processor
        .process(&AddTask::new("Write copy"), &ctx)
        .await
        .unwrap();
    processor
        .process(&AddTask::new("Pick date"), &ctx)
        .await
        .unwrap();
    processor
        .process(&AddColumn::new("Blocked"), &ctx)
        .await
        .unwrap();

    let snapshot = ctx.snapshot().await;
    let done = column_id(&snapshot, "Done");
    processor
        .process(&RenameColumn::new(done, "Shipped"), &ctx)
        .await
        .unwrap();

    let snapshot = ctx.snapshot().await;
    let shipped = column_id(&snapshot, "Shipped");
    let pick = task_id(&snapshot, "Pick date");
    processor
        .process(&MoveTask::new(pick, shipped, 0), &ctx)
        .await
        .unwrap();

    // A fresh context sees exactly what the first one wrote.
    let fresh = context(&temp);
    processor
        .process(&LoadBoard::new(board_id.as_str()), &fresh)
        .await
        .unwrap();
    let snapshot = fresh.snapshot().await;
    let titles: Vec<&str> = snapshot
        .columns()
        .iter()
        .map(|c| c.column.title.as_str())
        .collect();
    assert_eq!(
        titles,
        ["To Do", "In Progress", "Review", "Shipped", "Blocked"]
    );
    assert_eq!(task_titles(&snapshot, "To Do"), ["Write copy"]);
    assert_eq!(task_titles(&snapshot, "Shipped"), ["Pick date"]);
}

#[tokio::test]
async fn test_activity_is_appended_newest_first() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    create_and_load(&ctx).await;

    BoardOperationProcessor::new()
        .process(&AddTask::new("First"), &ctx)
        .await
        .unwrap();

    let entries = ctx.backend().read_activity(None).await.unwrap();
    assert_eq!(entries.len(), 2); // create board, add task (load is not logged)
    assert_eq!(entries[0].op, "add task");
    assert_eq!(entries[1].op, "create board");
    assert_eq!(entries[0].actor.as_deref(), Some("tester"));

    let limited = ctx.backend().read_activity(Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_load_orders_columns_and_tasks_by_sort_order() {
    let temp = TempDir::new().unwrap();
    let backend = FileBackend::new(temp.path().join(".taskboard"));
    let board = backend
        .create_board(taskboard_kanban::types::NewBoard {
            title: "Order".into(),
            description: None,
            color: "bg-blue-500".into(),
            owner: "tester".into(),
        })
        .await
        .unwrap();
    let first = backend.create_column(&board.id, "first").await.unwrap();
    let second = backend.create_column(&board.id, "second").await.unwrap();
    let third = backend.create_column(&board.id, "third").await.unwrap();
    let x = backend
        .create_task(&first.id, taskboard_kanban::types::NewTask::new("x"))
        .await
        .unwrap();
    let y = backend
        .create_task(&first.id, taskboard_kanban::types::NewTask::new("y"))
        .await
        .unwrap();

    // Columns stored as [0, 2, 1], tasks as [1, 0].
    let swap = |path: std::path::PathBuf, from: &str, to: &str| {
        let raw = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, raw.replace(from, to)).unwrap();
    };
    let root = backend.root().to_path_buf();
    swap(root.join(format!("columns/{}.yaml", second.id)), "sort_order: 1", "sort_order: 2");
    swap(root.join(format!("columns/{}.yaml", third.id)), "sort_order: 2", "sort_order: 1");
    swap(root.join(format!("tasks/{}.yaml", x.id)), "sort_order: 0", "sort_order: 1");
    swap(root.join(format!("tasks/{}.yaml", y.id)), "sort_order: 1", "sort_order: 0");

    let ctx = BoardContext::new(backend, EngineConfig::default());
    LoadBoard::new(board.id.clone())
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();

    let snapshot = ctx.snapshot().await;
    let titles: Vec<&str> = snapshot
        .columns()
        .iter()
        .map(|c| c.column.title.as_str())
        .collect();
    assert_eq!(titles, ["first", "third", "second"]);
    assert_eq!(task_titles(&snapshot, "first"), ["y", "x"]);
}

#[tokio::test]
async fn test_drag_on_file_backend() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    let board_id = create_and_load(&ctx).await;
    let processor = BoardOperationProcessor::new();
    processor.process(&AddTask::new("a"), &ctx).await.unwrap();
    processor.process(&AddTask::new("b"), &ctx).await.unwrap();

    let snapshot = ctx.snapshot().await;
    let b = task_id(&snapshot, "b").to_string();
    let review = column_drop_id("column-", column_id(&snapshot, "Review").as_str());

    let mut session = BoardSession::new(ctx.clone());
    session.on_drag_start(&b).await;
    session.on_drag_over(&b, Some(&review)).await;
    let pending = session.on_drag_end(&b, Some(&review)).await.unwrap();
    pending.wait().await.unwrap();

    let loaded = ctx
        .backend()
        .load_board_with_columns_and_tasks(&BoardId::from_string(board_id))
        .await
        .unwrap()
        .sorted();
    let review = loaded
        .columns
        .iter()
        .find(|c| c.column.title == "Review")
        .unwrap();
    assert_eq!(review.tasks.len(), 1);
    assert_eq!(review.tasks[0].title, "b");
    assert_eq!(review.tasks[0].sort_order, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_back_to_back_drops_all_persist() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    let board_id = create_and_load(&ctx).await;
    let processor = BoardOperationProcessor::new();
    let titles = ["a", "b", "c", "d"];
    for title in titles {
        processor.process(&AddTask::new(title), &ctx).await.unwrap();
    }

    let snapshot = ctx.snapshot().await;
    let review = column_drop_id("column-", column_id(&snapshot, "Review").as_str());
    let mut session = BoardSession::new(ctx.clone());
    let mut pending = Vec::new();
    for title in titles {
        let task = task_id(&snapshot, title).to_string();
        session.on_drag_start(&task).await;
        session.on_drag_over(&task, Some(&review)).await;
        pending.extend(session.on_drag_end(&task, Some(&review)).await);
    }
    assert_eq!(pending.len(), 4);
    for commit in pending {
        commit.wait().await.unwrap();
    }
    assert!(ctx.errors().current().is_none());

    let local = ctx.snapshot().await;
    assert_eq!(task_titles(&local, "Review"), titles);
    let loaded = ctx
        .backend()
        .load_board_with_columns_and_tasks(&BoardId::from_string(board_id))
        .await
        .unwrap()
        .sorted();
    let review = loaded
        .columns
        .iter()
        .find(|c| c.column.title == "Review")
        .unwrap();
    let persisted: Vec<_> = review.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(persisted, titles);
}

#[tokio::test]
async fn test_lock_held_rejects_writes() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    create_and_load(&ctx).await;

    // A second handle on the same directory stands in for another process
    let other = FileBackend::new(ctx.backend().root());
    let _held = other.lock().await.unwrap();
    let err = BoardOperationProcessor::new()
        .process(&AddTask::new("blocked"), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::WriteFailed { .. }));
    assert!(err.to_string().contains("lock busy"));
    assert!(ctx.snapshot().await.task_count() == 0);
}

#[tokio::test]
async fn test_list_boards_newest_first() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    let processor = BoardOperationProcessor::new();
    for title in ["Old", "New"] {
        processor
            .process(&CreateBoard::new(title, "tester"), &ctx)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    processor
        .process(&CreateBoard::new("Theirs", "someone-else"), &ctx)
        .await
        .unwrap();

    let listed = processor
        .process(&ListBoards::new("tester"), &ctx)
        .await
        .unwrap();
    let titles: Vec<&str> = listed["boards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["New", "Old"]);
}
