use std::sync::Arc;

use services::{AppServices, Clock, ProgressStore, StoreChanged};
use storage::repository::Storage;
use trail_core::model::{CurrentPosition, NodeId, ProgressStatus, RoadmapId};
use trail_core::time::fixed_now;

#[tokio::test]
async fn progress_survives_reopening_sqlite_storage() {
    let url = "sqlite:file:memdb_progress_flow?mode=memory&cache=shared";
    // Keep one handle open so the shared in-memory database outlives the store.
    let keeper = Storage::sqlite(url).await.expect("connect sqlite");

    let roadmap = RoadmapId::new("git-github").unwrap();
    let node = NodeId::new("git-4").unwrap();

    {
        let services = AppServices::new_sqlite(url, Clock::fixed(fixed_now()), None)
            .await
            .expect("services");
        let store = services.store();
        let saved = store
            .update_node_progress(&node, "in_progress", &roadmap)
            .await
            .expect("valid status");
        assert!(saved.is_persisted());
        let _ = store.set_note(&node, "git status -s is handy").await.unwrap();
        let _ = store.set_current_position(&roadmap, &node).await;
    }

    let reopened = ProgressStore::new(Clock::system(), Arc::clone(&keeper.kv));
    assert_eq!(
        reopened.get_node_status(&roadmap, &node).await,
        ProgressStatus::InProgress
    );
    let note = reopened.get_note(&node).await.unwrap();
    assert_eq!(note.content(), "git status -s is handy");
    assert_eq!(note.updated_at(), fixed_now());
    assert_eq!(
        reopened.get_current_position().await,
        Some(CurrentPosition::new(roadmap, node))
    );
}

#[tokio::test]
async fn observers_are_told_about_every_mutation() {
    let services = AppServices::in_memory(Clock::system());
    let store = services.store();
    let mut rx = store.subscribe();

    let roadmap = RoadmapId::new("genai-prompting").unwrap();
    let node = NodeId::new("genai-1-1").unwrap();

    let _ = store
        .set_node_status(&roadmap, &node, ProgressStatus::Completed)
        .await;
    let _ = store.set_note(&node, "LLMs predict tokens").await.unwrap();
    let _ = store.set_current_position(&roadmap, &node).await;
    let _ = store.reset_all().await;

    for _ in 0..4 {
        assert_eq!(rx.recv().await.unwrap(), StoreChanged);
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn note_timestamp_is_not_before_the_call() {
    let services = AppServices::in_memory(Clock::system());
    let store = services.store();
    let node = NodeId::new("git-1").unwrap();

    let before = chrono::Utc::now();
    let _ = store.set_note(&node, "hello").await.unwrap();
    let note = store.get_note(&node).await.unwrap();

    assert_eq!(note.content(), "hello");
    assert!(note.updated_at() >= before);
}

#[tokio::test]
async fn journey_reflects_progress_made_through_the_store() {
    let services = AppServices::in_memory(Clock::system());
    let store = services.store();
    let git = RoadmapId::new("git-github").unwrap();

    for node in services.catalog().list_nodes(&git).await.iter().take(3) {
        let _ = store
            .set_node_status(&git, &node.id, ProgressStatus::Completed)
            .await;
    }

    let summary = services
        .journey()
        .journey()
        .await
        .into_iter()
        .find(|s| s.roadmap.id == git)
        .unwrap();
    assert_eq!(summary.completed_count, 3);
    assert_eq!(summary.total_count, 13);
    assert_eq!(summary.current_node.unwrap().id.as_str(), "git-4");
}

#[tokio::test]
async fn concurrent_updates_to_different_nodes_are_all_kept() {
    let services = AppServices::in_memory(Clock::system());
    let store = services.store();
    let roadmap = RoadmapId::new("r").unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        let roadmap = roadmap.clone();
        handles.push(tokio::spawn(async move {
            let node = NodeId::new(format!("n{i}")).unwrap();
            let _ = store
                .set_node_status(&roadmap, &node, ProgressStatus::Completed)
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.get_completed_count(&roadmap).await, 16);
}
