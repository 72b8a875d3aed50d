/// Integration tests for the edit → debounce → store flow
use screenwright_editor::{format, Document, EditSession, ElementType, Key};
use screenwright_workspace::{
    AutoSaver, DirectoryStore, LoadError, MemoryStore, ProjectLoader, RemoteStore, SaveStatus,
};
use std::sync::Arc;
use std::time::Duration;

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn open_session(document: Document, saver: &Arc<AutoSaver>) -> EditSession {
    let mut session = EditSession::new(document);
    let saver = Arc::clone(saver);
    session.on_change(move |doc| saver.schedule(doc.clone()));
    session
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_saves_once() {
    let store = Arc::new(MemoryStore::new());
    let id = store.seed("Pilot", None).await;

    let opened = ProjectLoader::open(store.as_ref(), id).await.unwrap();
    assert!(opened.seeded);

    let saver = Arc::new(AutoSaver::new(store.clone(), id));
    let mut session = open_session(opened.document, &saver);

    session.handle_key(Key::Enter);
    for c in "JOHN".chars() {
        session.handle_key(Key::Char(c));
    }
    session.handle_key(Key::Enter);
    for c in "Hello.".chars() {
        session.handle_key(Key::Char(c));
    }
    session.handle_key(Key::Tab);

    settle().await;
    assert!(store.writes().await.is_empty());

    tokio::time::sleep(Duration::from_millis(1600)).await;
    settle().await;

    let writes = store.writes().await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].content, format::to_value(session.document()).unwrap());
    assert_eq!(saver.status(), SaveStatus::Saved);

    let reopened = ProjectLoader::open(store.as_ref(), id).await.unwrap();
    assert_eq!(
        reopened.document.types(),
        vec![
            ElementType::SceneHeading,
            ElementType::Character,
            ElementType::Parenthetical
        ]
    );
    assert_eq!(reopened.document.block(2).unwrap().text(), "Hello.");
}

#[tokio::test(start_paused = true)]
async fn test_write_failure_does_not_interrupt_editing() {
    let store = Arc::new(MemoryStore::new());
    let id = store.seed("Draft", None).await;
    let saver = Arc::new(AutoSaver::new(store.clone(), id));
    let mut session = open_session(Document::starter(), &saver);

    store.set_fail_writes(true);
    session.insert_break();
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert!(matches!(saver.status(), SaveStatus::Error(_)));

    store.set_fail_writes(false);
    session.insert_text("MIA");
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    assert_eq!(saver.status(), SaveStatus::Saved);
    assert_eq!(store.writes().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_point_cycle_schedules_nothing() {
    let store = Arc::new(MemoryStore::new());
    let id = store.seed("Quiet", None).await;
    let saver = Arc::new(AutoSaver::new(store.clone(), id));
    let mut session = open_session(Document::starter(), &saver);

    session.handle_key(Key::Tab);

    assert!(!saver.has_pending());
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert!(store.writes().await.is_empty());
    assert_eq!(saver.status(), SaveStatus::Idle);
}

#[tokio::test]
async fn test_directory_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn RemoteStore> = Arc::new(DirectoryStore::new(dir.path()));

    let id = ProjectLoader::create(store.as_ref(), Some("Harbor"), None)
        .await
        .unwrap();
    let opened = ProjectLoader::open(store.as_ref(), id).await.unwrap();
    assert_eq!(opened.document, Document::new());

    let saver = AutoSaver::with_debounce(store.clone(), id, Duration::from_millis(10));
    let mut session = EditSession::new(opened.document);
    session.insert_text("EXT. HARBOR - DUSK");
    session.insert_break();
    session.insert_text("Gulls.");
    session.cycle_type();

    saver.save_now(session.document().clone()).await.unwrap();

    let reopened = ProjectLoader::open(store.as_ref(), id).await.unwrap();
    assert_eq!(&reopened.document, session.document());
    assert_eq!(reopened.title, "Harbor");
}

#[tokio::test]
async fn test_unreadable_project_is_not_opened_empty() {
    let store = MemoryStore::new();
    let id = store
        .seed("Important", Some(serde_json::json!([{ "type": "action", "children": [{ "text": "Do not lose me." }] }])))
        .await;
    store.set_fail_reads(true);

    match ProjectLoader::open(&store, id).await {
        Err(LoadError::Remote { id: failed, .. }) => assert_eq!(failed, id),
        other => panic!("expected a blocking read error, got {:?}", other.map(|p| p.title)),
    }
}
