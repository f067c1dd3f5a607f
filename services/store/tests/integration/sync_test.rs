use campus_store::infra::codec::Entity;
use campus_store::infra::local::LocalStore;
use campus_store::infra::store::TableStore;
use campus_store::usecase::sync::{ReplayPendingWritesUseCase, ReplayReport};

use crate::helpers::{DownTable, MemoryTable};

#[tokio::test]
async fn should_replay_local_writes_and_mark_them_synced() {
    let local = LocalStore::in_memory().await.unwrap();
    let users = local.table("users");
    users.insert(&Entity::new("users", "u1").with("name", "A")).await.unwrap();
    users.insert(&Entity::new("users", "u2")).await.unwrap();
    users
        .replace(&Entity::new("users", "u2").with("name", "B"))
        .await
        .unwrap();
    let remote = MemoryTable::new("users");
    let replay = ReplayPendingWritesUseCase {
        local: local.clone(),
        remotes: vec![remote.clone()],
    };

    let report = replay.execute().await.unwrap();

    assert_eq!(
        report,
        ReplayReport {
            replayed: 2,
            failed: 0,
            skipped: 0
        }
    );
    let u2 = remote.get("users", "u2").await.unwrap().unwrap();
    assert_eq!(u2.attribute("name"), Some(serde_json::json!("B")));
    assert!(local.pending().await.unwrap().is_empty());
    assert!(users.get("users", "u1").await.unwrap().is_some());
}

#[tokio::test]
async fn should_overwrite_remote_and_replay_deletes() {
    let local = LocalStore::in_memory().await.unwrap();
    let remote = MemoryTable::new("sessions");
    remote.insert(&Entity::new("u1", "s1")).await.unwrap();
    remote.insert(&Entity::new("u1", "s2").with("v", 1)).await.unwrap();
    let sessions = local.table("sessions");
    sessions.delete("u1", "s1").await.unwrap();
    sessions.insert(&Entity::new("u1", "s2").with("v", 2)).await.unwrap();
    let replay = ReplayPendingWritesUseCase {
        local: local.clone(),
        remotes: vec![remote.clone()],
    };

    let report = replay.execute().await.unwrap();

    assert_eq!(report.replayed, 2);
    assert!(remote.get("u1", "s1").await.unwrap().is_none());
    let s2 = remote.get("u1", "s2").await.unwrap().unwrap();
    assert_eq!(s2.attribute("v"), Some(serde_json::json!(2)));
    assert!(local.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn should_keep_writes_pending_while_remote_is_down() {
    let local = LocalStore::in_memory().await.unwrap();
    local
        .table("users")
        .insert(&Entity::new("users", "u1"))
        .await
        .unwrap();
    local
        .table("courses")
        .insert(&Entity::new("courses", "c1"))
        .await
        .unwrap();
    let replay = ReplayPendingWritesUseCase {
        local: local.clone(),
        remotes: vec![DownTable::unavailable("users")],
    };

    let report = replay.execute().await.unwrap();

    assert_eq!(
        report,
        ReplayReport {
            replayed: 0,
            failed: 1,
            skipped: 1
        }
    );
    assert_eq!(local.pending().await.unwrap().len(), 2);
}
