use super::*;
use serde_json::json;
use shared::domain::{Building, MachineStatus};
use wiremock::matchers::{header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn press_row(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "building": "B동",
        "status": "RUNNING",
        "itemName": "Bracket-A",
        "possibleItems": ["Bracket-A", "Bracket-B"],
        "count": 1250,
        "target": 2000
    })
}

#[tokio::test]
async fn select_all_maps_rows_including_null_item_columns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/machines"))
        .and(query_param("select", "*"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            press_row(1, "Press-01"),
            {
                // a row written by the management form: item columns are null
                "id": 2,
                "name": "Press-02",
                "building": "D동",
                "status": "IDLE",
                "itemName": null,
                "possibleItems": null,
                "count": 0,
                "target": 0
            }
        ])))
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let machines = store.get_machines().await.expect("machines");

    assert_eq!(machines.len(), 2);
    assert_eq!(machines[0].building, Building::B);
    assert_eq!(machines[1].building, Building::D);
    assert_eq!(machines[1].status, MachineStatus::Idle);
    assert_eq!(machines[1].item_name, "");
    assert!(machines[1].possible_items.is_empty());
}

#[tokio::test]
async fn empty_table_is_seeded_via_upsert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/machines"))
        .and(headers(
            "Prefer",
            vec!["resolution=merge-duplicates", "return=representation"],
        ))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::to_value(default_machines()).expect("json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let machines = store.get_machines().await.expect("machines");
    assert_eq!(machines.len(), 7);
    assert_eq!(machines[6].name, "Wiz-01");
}

#[tokio::test]
async fn failing_request_maps_to_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/machines"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let err = store.get_machines().await.expect_err("should fail");
    assert!(matches!(err, StoreError::Backend { .. }));
}

#[tokio::test]
async fn unreachable_backend_maps_to_unavailable() {
    // Nothing listens on this port.
    let store = RemoteStore::new("http://127.0.0.1:9", "anon-key").expect("store");
    let err = store.get_machines().await.expect_err("should fail");
    assert!(matches!(err, StoreError::Unavailable { .. }));
}

#[tokio::test]
async fn update_with_zero_affected_rows_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/machines"))
        .and(query_param("id", "eq.77"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let machine = MachineDraft {
        name: "Ghost-01".to_string(),
        ..MachineDraft::default()
    }
    .into_machine(MachineId(77));

    let stored = store.update_machine(machine.clone()).await.expect("update");
    assert_eq!(stored, machine);
}

#[tokio::test]
async fn delete_targets_the_given_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/machines"))
        .and(query_param("id", "eq.3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let id = store.delete_machine(MachineId(3)).await.expect("delete");
    assert_eq!(id, MachineId(3));
}

#[tokio::test]
async fn save_all_clears_the_table_before_upserting() {
    let server = MockServer::start().await;
    let snapshot = vec![
        MachineDraft {
            name: "Press-01".to_string(),
            ..MachineDraft::default()
        }
        .into_machine(MachineId(1)),
    ];

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/machines"))
        .and(query_param("id", "not.is.null"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/machines"))
        .and(headers(
            "Prefer",
            vec!["resolution=merge-duplicates", "return=representation"],
        ))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::to_value(&snapshot).expect("json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let stored = store
        .save_all_machines(snapshot.clone())
        .await
        .expect("save all");
    assert_eq!(stored, snapshot);
}

#[tokio::test]
async fn save_all_with_empty_snapshot_only_clears() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/machines"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = RemoteStore::new(&server.uri(), "anon-key").expect("store");
    let stored = store.save_all_machines(Vec::new()).await.expect("save all");
    assert!(stored.is_empty());
}
