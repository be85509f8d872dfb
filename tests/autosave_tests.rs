use std::sync::{Arc, Mutex};
use std::time::Duration;

use nltable::error::FileError;
use nltable::io::autosave::spawn_autosave;
use nltable::io::host::{load_table, FsHost, HostFiles};
use nltable::state::command::Command;
use nltable::state::data_model::CellType;
use nltable::state::factory::create_table_state;
use nltable::state::table_state::{FixedClock, StoreContext, TableState};

const DEBOUNCE: Duration = Duration::from_millis(250);

fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&str) -> Result<(), FileError> + Send) {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&writes);
    let write = move |text: &str| {
        sink.lock().unwrap().push(text.to_string());
        Ok::<(), FileError>(())
    };
    (writes, write)
}

#[tokio::test(start_paused = true)]
async fn test_burst_writes_latest_once() {
    let (writes, write) = recorder();
    let autosave = spawn_autosave(DEBOUNCE, write);

    autosave.schedule("a".to_string());
    autosave.schedule("b".to_string());
    autosave.schedule("c".to_string());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(writes.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(*writes.lock().unwrap(), vec!["c".to_string()]);

    autosave.finish().await;
    assert_eq!(writes.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_are_written_separately() {
    let (writes, write) = recorder();
    let autosave = spawn_autosave(DEBOUNCE, write);

    autosave.schedule("first".to_string());
    tokio::time::sleep(Duration::from_millis(400)).await;
    autosave.schedule("second".to_string());
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(
        *writes.lock().unwrap(),
        vec!["first".to_string(), "second".to_string()]
    );
    autosave.finish().await;
}

#[tokio::test(start_paused = true)]
async fn test_finish_flushes_pending_snapshot() {
    let (writes, write) = recorder();
    let autosave = spawn_autosave(DEBOUNCE, write);

    autosave.schedule("pending".to_string());
    autosave.finish().await;
    assert_eq!(*writes.lock().unwrap(), vec!["pending".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_store_observer_saves_to_host() {
    let dir = tempfile::tempdir().unwrap();
    let host = FsHost::new(dir.path());
    let writer_host = host.clone();
    let autosave = spawn_autosave(DEBOUNCE, move |text| writer_host.write_file("auto.table", text));

    let mut state = TableState::new(
        create_table_state(1, 1, CellType::Text, 1_000),
        StoreContext::with_clock(FixedClock(2_000)),
    );
    state.subscribe(autosave.observer());
    state.do_command(Command::add_row()).unwrap();
    state.do_command(Command::add_column()).unwrap();
    let expected = state.document().clone();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(load_table(&host, "auto.table").unwrap(), expected);

    drop(state);
    autosave.finish().await;
}

#[tokio::test(start_paused = true)]
async fn test_observer_survives_stopped_writer() {
    let autosave = spawn_autosave(DEBOUNCE, |_: &str| -> Result<(), FileError> {
        panic!("writer crashed");
    });
    autosave.schedule("first".to_string());
    tokio::time::sleep(Duration::from_millis(500)).await;

    let mut observer = autosave.observer();
    observer(&create_table_state(1, 1, CellType::Text, 1_000));
    autosave.schedule("second".to_string());
    autosave.finish().await;
}
