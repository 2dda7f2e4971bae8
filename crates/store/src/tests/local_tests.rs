use super::*;
use shared::domain::{Building, MachineStatus};

async fn memory_store() -> LocalStore {
    LocalStore::new("sqlite::memory:").await.expect("db")
}

fn draft(name: &str) -> MachineDraft {
    MachineDraft {
        name: name.to_string(),
        building: Building::D,
        status: MachineStatus::Running,
        item_name: "Panel-X".to_string(),
        possible_items: vec!["Panel-X".to_string(), "Panel-Y".to_string()],
        count: 10,
        target: 100,
    }
}

#[tokio::test]
async fn seeds_empty_store_with_default_machines() {
    let store = memory_store().await;

    let first = store.get_machines().await.expect("machines");
    assert_eq!(first.len(), 7);
    assert_eq!(first[0].name, "Press-01");
    assert_eq!(first[0].building, Building::B);

    let second = store.get_machines().await.expect("machines again");
    assert_eq!(second, first, "seeding must be idempotent");
}

#[tokio::test]
async fn create_machine_assigns_fresh_id_and_persists() {
    let store = memory_store().await;
    let before = store.get_machines().await.expect("machines");

    let created = store.create_machine(draft("Laser-01")).await.expect("create");
    assert!(
        before.iter().all(|m| m.id != created.id),
        "new id must not collide with the existing set"
    );

    let after = store.get_machines().await.expect("machines");
    assert_eq!(after.len(), before.len() + 1);
    assert!(after.iter().any(|m| m.id == created.id && m.name == "Laser-01"));
}

#[tokio::test]
async fn update_replaces_matching_record() {
    let store = memory_store().await;
    let mut machine = store.get_machines().await.expect("machines")[0].clone();

    machine.status = MachineStatus::Done;
    machine.count = 2000;
    store.update_machine(machine.clone()).await.expect("update");

    let reloaded = store.get_machines().await.expect("machines");
    let stored = reloaded.iter().find(|m| m.id == machine.id).expect("record");
    assert_eq!(stored.status, MachineStatus::Done);
    assert_eq!(stored.count, 2000);
}

#[tokio::test]
async fn update_with_unknown_id_leaves_set_unchanged() {
    let store = memory_store().await;
    let before = store.get_machines().await.expect("machines");

    let ghost = draft("Ghost-01").into_machine(MachineId(999_999));
    store.update_machine(ghost).await.expect("no-op update");

    let after = store.get_machines().await.expect("machines");
    assert_eq!(after, before);
}

#[tokio::test]
async fn delete_removes_record_and_missing_id_is_noop() {
    let store = memory_store().await;
    let machines = store.get_machines().await.expect("machines");
    let victim = machines[2].id;

    store.delete_machine(victim).await.expect("delete");
    let after = store.get_machines().await.expect("machines");
    assert_eq!(after.len(), machines.len() - 1);
    assert!(after.iter().all(|m| m.id != victim));

    store.delete_machine(MachineId(424_242)).await.expect("noop");
    assert_eq!(store.get_machines().await.expect("machines"), after);
}

#[tokio::test]
async fn save_all_is_a_full_replace() {
    let store = memory_store().await;
    let machines = store.get_machines().await.expect("machines");

    let kept: Vec<_> = machines.into_iter().take(2).collect();
    store
        .save_all_machines(kept.clone())
        .await
        .expect("save all");

    let after = store.get_machines().await.expect("machines");
    assert_eq!(after, kept, "records absent from the snapshot must be gone");
}

#[tokio::test]
async fn corrupt_blob_surfaces_backend_error() {
    let store = memory_store().await;
    sqlx::query("INSERT INTO kv_blobs (key, value) VALUES (?, ?)")
        .bind(STORAGE_KEY)
        .bind("not json")
        .execute(&store.pool)
        .await
        .expect("inject blob");

    let err = store.get_machines().await.expect_err("should fail");
    assert!(matches!(err, StoreError::Backend { .. }));
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("temp dir");
    let db_path = temp_root.path().join("nested").join("dashboard.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let store = LocalStore::new(&database_url).await.expect("db");
    store.get_machines().await.expect("machines");
    drop(store);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}
