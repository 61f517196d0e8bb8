// tests/result_store.rs

use std::path::PathBuf;

use masscan_worker::fs::mock::MockFileSystem;
use masscan_worker::fs::FileSystem;
use masscan_worker::store::{FileStore, RawOutput, ResultStore};

fn output(task_id: &str, project_uuid: &str, chunks: &[&[u8]]) -> RawOutput {
    RawOutput {
        task_id: task_id.to_string(),
        project_uuid: project_uuid.to_string(),
        chunks: chunks.iter().map(|c| c.to_vec()).collect(),
    }
}

#[tokio::test]
async fn file_store_writes_concatenated_chunks_per_project() {
    let fs = MockFileSystem::new();
    let store = FileStore::with_fs(fs.clone(), "/results");

    store
        .save(output("task-1", "proj-a", &[b"<nmaprun>", b"<host/>", b"</nmaprun>"]))
        .await
        .unwrap();

    let path = PathBuf::from("/results/proj-a/task-1.xml");
    assert_eq!(fs.paths(), vec![path.clone()]);
    assert_eq!(fs.read(&path).unwrap(), b"<nmaprun><host/></nmaprun>".to_vec());
}

#[tokio::test]
async fn file_store_propagates_write_failures() {
    let fs = MockFileSystem::new();
    fs.set_fail_writes(true);
    let store = FileStore::with_fs(fs.clone(), "/results");

    let err = store
        .save(output("task-1", "proj-a", &[b"<nmaprun/>"]))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("task-1"));
    assert!(fs.paths().is_empty());
}

#[tokio::test]
async fn ids_that_would_escape_the_root_are_refused() {
    let fs = MockFileSystem::new();
    let store = FileStore::with_fs(fs.clone(), "/results");

    for (task_id, project) in [("../evil", "p"), ("t", "a/b"), ("", "p"), ("t", "..")] {
        assert!(
            store.save(output(task_id, project, &[b"x"])).await.is_err(),
            "expected ({task_id:?}, {project:?}) to be refused"
        );
    }
    assert!(fs.paths().is_empty());
}

#[tokio::test]
async fn real_file_store_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert_eq!(store.root(), dir.path());

    store
        .save(output("task-9", "proj-z", &[b"<a/>", b"<b/>"]))
        .await
        .unwrap();

    let written = std::fs::read(dir.path().join("proj-z").join("task-9.xml")).unwrap();
    assert_eq!(written, b"<a/><b/>".to_vec());
}
