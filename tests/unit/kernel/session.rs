use super::*;
use crate::kernel::services::adapters::TokioExecutor;
use crate::kernel::services::ports::CollaboratorError;
use crate::models::{CellValue, Header, Record, SourceKey};
use compact_str::CompactString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const WAIT: Duration = Duration::from_secs(5);

fn new_context() -> Rc<InteractiveContext> {
    Rc::new(InteractiveContext::init(Arc::new(
        TokioExecutor::new(1).unwrap(),
    )))
}

fn record(id: i64, name: &str) -> Record {
    let mut r = Record::default();
    r.insert(CompactString::from("id"), CellValue::Int(id));
    r.insert(CompactString::from("name"), CellValue::from(name));
    r
}

/// Two pages; page 2 fails unless `page2_ok` is set.
struct FakeSource {
    fetches: AtomicUsize,
    page2_ok: bool,
}

impl PageSource for FakeSource {
    fn fetch(&self, page: u32) -> std::result::Result<PageData, CollaboratorError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if page == 2 && !self.page2_ok {
            return Err(CollaboratorError::new("page 2 unavailable"));
        }
        let base = i64::from(page) * 10;
        Ok(PageData {
            headers: vec![Header::new("id"), Header::new("name")],
            rows: vec![record(base, "a"), record(base + 1, "b")],
            total_pages: 2,
        })
    }
}

#[derive(Default)]
struct FakeSink {
    submitted: Mutex<Vec<ChangeSet>>,
    fail: bool,
}

impl ChangeSink for FakeSink {
    fn submit(&self, changes: &ChangeSet) -> std::result::Result<(), CollaboratorError> {
        self.submitted.lock().unwrap().push(changes.clone());
        if self.fail {
            Err(CollaboratorError::new("rejected"))
        } else {
            Ok(())
        }
    }
}

fn session_with(
    source: Arc<FakeSource>,
    sink: Arc<FakeSink>,
    settings: Settings,
) -> GridSession {
    GridSession::new(new_context(), &settings, source, sink)
}

fn source(page2_ok: bool) -> Arc<FakeSource> {
    Arc::new(FakeSource {
        fetches: AtomicUsize::new(0),
        page2_ok,
    })
}

fn opened(source: Arc<FakeSource>, sink: Arc<FakeSink>) -> GridSession {
    let session = session_with(source, sink, Settings::default());
    assert_eq!(session.open().unwrap().len(), 1);
    assert!(session.wait_idle(WAIT));
    session
}

#[test]
fn test_open_loads_first_page() {
    let session = opened(source(true), Arc::new(FakeSink::default()));
    session.with_state(|s| {
        assert_eq!(s.model.row_count(), 2);
        assert_eq!(s.paging.current_page(), 1);
        assert_eq!(s.paging.total_pages(), 2);
        assert!(s.enabled);
    });
    assert_eq!(session.last_error(), None);
}

#[test]
fn test_view_is_disabled_while_task_outstanding() {
    let session = session_with(
        source(true),
        Arc::new(FakeSink::default()),
        Settings::default(),
    );
    let handles = session.open().unwrap();
    assert_eq!(handles.len(), 1);
    assert!(session.is_busy());

    // A second interaction cannot start a second task.
    assert!(matches!(session.go_to(2), Err(GridError::Busy)));
    assert!(matches!(session.save(), Err(GridError::Busy)));
    assert_eq!(session.context().pending_count(), 1);
    session.with_state(|s| {
        assert_eq!(s.tasks_started, 1);
        assert_eq!(s.tasks_finished, 0);
    });

    assert!(session.wait_idle(WAIT));
    assert!(!session.is_busy());
    assert!(handles[0].is_finished());
    session.with_state(|s| {
        assert_eq!(s.tasks_started, 1);
        assert_eq!(s.tasks_finished, 1);
    });
}

#[test]
fn test_failed_fetch_keeps_previous_rows() {
    let src = source(false);
    let session = opened(Arc::clone(&src), Arc::new(FakeSink::default()));

    session.go_to(2).unwrap();
    assert!(session.wait_idle(WAIT));

    assert_eq!(src.fetches.load(Ordering::SeqCst), 2);
    assert!(matches!(session.last_error(), Some(GridError::FetchFailed(_))));
    session.with_state(|s| {
        assert_eq!(s.paging.current_page(), 1);
        assert_eq!(s.model.value(0, "id").unwrap().display(), "10");
        assert!(s.enabled);
    });
}

#[test]
fn test_successful_save_commits_and_refreshes() {
    let src = source(true);
    let sink = Arc::new(FakeSink::default());
    let session = opened(Arc::clone(&src), Arc::clone(&sink));

    session
        .dispatch(Action::SetCell {
            row: 0,
            column: "name".to_string(),
            value: "edited".into(),
        })
        .unwrap();
    session.dispatch(Action::AddRow).unwrap();
    session
        .dispatch(Action::SetCell {
            row: 2,
            column: "name".to_string(),
            value: "c".into(),
        })
        .unwrap();
    session.save().unwrap();
    assert!(session.wait_idle(WAIT));

    let submitted = sink.submitted.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].creates.len(), 1);
    assert_eq!(submitted[0].updates[0].key, SourceKey::Position(0));

    // The refresh after save re-fetched page 1.
    assert_eq!(src.fetches.load(Ordering::SeqCst), 2);
    assert!(session.diff().is_empty());
    session.with_state(|s| {
        assert_eq!(s.tasks_started, 3);
        assert_eq!(s.tasks_finished, 3);
        assert_eq!(s.model.row_count(), 2);
    });
}

#[test]
fn test_save_without_refresh_keeps_committed_rows() {
    let src = source(true);
    let sink = Arc::new(FakeSink::default());
    let mut settings = Settings::default();
    settings.grid.refresh_after_save = false;
    let session = session_with(Arc::clone(&src), Arc::clone(&sink), settings);
    session.open().unwrap();
    assert!(session.wait_idle(WAIT));

    session.dispatch(Action::AddRow).unwrap();
    session
        .dispatch(Action::SetCell {
            row: 2,
            column: "name".to_string(),
            value: "c".into(),
        })
        .unwrap();
    session.save().unwrap();
    assert!(session.wait_idle(WAIT));

    assert_eq!(src.fetches.load(Ordering::SeqCst), 1);
    assert!(session.diff().is_empty());
    session.with_state(|s| assert_eq!(s.model.row_count(), 3));
}

#[test]
fn test_failed_save_keeps_edits() {
    let sink = Arc::new(FakeSink {
        fail: true,
        ..FakeSink::default()
    });
    let session = opened(source(true), Arc::clone(&sink));

    session.dispatch(Action::RemoveRows(vec![1])).unwrap();
    let before = session.diff();
    session.save().unwrap();
    assert!(session.wait_idle(WAIT));

    assert_eq!(sink.submitted.lock().unwrap().len(), 1);
    assert_eq!(session.diff(), before);
    assert_eq!(
        session.last_error(),
        Some(GridError::SubmitFailed("rejected".to_string()))
    );
    assert!(!session.is_busy());
}

#[test]
fn test_panicking_source_is_reported_as_fetch_failure() {
    let panicking = |_page: u32| -> std::result::Result<PageData, CollaboratorError> {
        panic!("backend exploded")
    };
    let session = GridSession::new(
        new_context(),
        &Settings::default(),
        Arc::new(panicking),
        Arc::new(FakeSink::default()),
    );
    session.open().unwrap();
    assert!(session.wait_idle(WAIT));

    match session.last_error() {
        Some(GridError::FetchFailed(msg)) => assert!(msg.contains("backend exploded")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!session.is_busy());
    session.with_state(|s| assert_eq!(s.paging.current_page(), 0));
}

#[test]
fn test_export_skips_hidden_columns_by_default() {
    let mut settings = Settings::default();
    settings.grid.hidden = vec!["id".to_string()];
    let session = session_with(source(true), Arc::new(FakeSink::default()), settings);
    session.open().unwrap();
    assert!(session.wait_idle(WAIT));

    let rows = session.export_rows();
    assert_eq!(rows[0], vec!["name".to_string()]);
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_host_cannot_forge_task_finished() {
    let src = source(true);
    let sink = Arc::new(FakeSink::default());
    let session = opened(Arc::clone(&src), Arc::clone(&sink));

    session
        .dispatch(Action::SetCell {
            row: 0,
            column: "name".to_string(),
            value: "edited".into(),
        })
        .unwrap();
    assert_eq!(session.save().unwrap().len(), 1);
    assert!(session.is_busy());

    assert_eq!(
        session.dispatch(Action::TaskFinished).err(),
        Some(GridError::LifecycleAction("TaskFinished"))
    );
    assert!(matches!(
        session.dispatch(Action::SaveSucceeded),
        Err(GridError::LifecycleAction(_))
    ));
    assert!(session.is_busy());
    assert!(matches!(session.go_to(2), Err(GridError::Busy)));
    assert_eq!(session.context().pending_count(), 1);

    assert!(session.wait_idle(WAIT));
    assert_eq!(sink.submitted.lock().unwrap().len(), 1);
    // Open, then the refresh after the save; the forged request never ran.
    assert_eq!(src.fetches.load(Ordering::SeqCst), 2);
    session.with_state(|s| {
        assert_eq!(s.paging.current_page(), 1);
        assert_eq!(s.tasks_started, s.tasks_finished);
    });
}

#[test]
fn test_teardown_reenables_view() {
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let rx = Mutex::new(rx);
    let gated = move |_page: u32| -> std::result::Result<PageData, CollaboratorError> {
        let _ = rx.lock().unwrap().recv_timeout(Duration::from_secs(5));
        Err(CollaboratorError::new("released"))
    };
    let ctx = new_context();
    let session = GridSession::new(
        Rc::clone(&ctx),
        &Settings::default(),
        Arc::new(gated),
        Arc::new(FakeSink::default()),
    );
    session.open().unwrap();
    assert!(session.is_busy());

    // Unblock the worker so shutdown is quick; its outcome is never pumped.
    let _ = tx.send(());
    ctx.teardown();

    assert!(!session.is_busy());
    assert_eq!(ctx.pending_count(), 0);
    assert_eq!(
        session.last_error(),
        Some(GridError::FetchFailed("interactive context closed".to_string()))
    );
    session.with_state(|s| {
        assert_eq!(s.tasks_started, 1);
        assert_eq!(s.tasks_finished, 1);
        assert_eq!(s.paging.current_page(), 0);
    });
}
