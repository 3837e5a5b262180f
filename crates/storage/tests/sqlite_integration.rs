use storage::keys::{NOTES_KEY, PROGRESS_KEY};
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_set_get_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_item(PROGRESS_KEY).await.unwrap(), None);

    repo.set_item(PROGRESS_KEY, r#"{"git-github":{"git-1":"completed"}}"#)
        .await
        .unwrap();
    repo.set_item(PROGRESS_KEY, r#"{"git-github":{"git-1":"in_progress"}}"#)
        .await
        .unwrap();

    let stored = repo.get_item(PROGRESS_KEY).await.unwrap();
    assert_eq!(
        stored.as_deref(),
        Some(r#"{"git-github":{"git-1":"in_progress"}}"#)
    );

    repo.remove_item(PROGRESS_KEY).await.unwrap();
    repo.remove_item(PROGRESS_KEY).await.unwrap();
    assert_eq!(repo.get_item(PROGRESS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let url = "sqlite:file:memdb_kv_migrate?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set_item(NOTES_KEY, "{}").await.unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(repo.get_item(NOTES_KEY).await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn storage_handles_share_one_database() {
    let url = "sqlite:file:memdb_kv_shared?mode=memory&cache=shared";
    let first = Storage::sqlite(url).await.expect("first");
    let second = Storage::sqlite(url).await.expect("second");

    first.kv.set_item("k", "from-first").await.unwrap();
    second.kv.set_item("k", "from-second").await.unwrap();

    assert_eq!(
        first.kv.get_item("k").await.unwrap().as_deref(),
        Some("from-second")
    );
}
