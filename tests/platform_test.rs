use std::sync::Arc;

use serde_json::json;

use kai_platform::response::{respond, ApiResponse};
use kai_platform::{Collection, InMemoryBackend, Platform, StoreError};

fn mem_platform() -> Platform {
    Platform::with_backend(Arc::new(InMemoryBackend::new()))
}

#[tokio::test]
async fn create_host_applies_creation_defaults() {
    let platform = mem_platform();

    let host = platform
        .create_host(json!({"name": "Kai", "creatorId": "u1"}))
        .await
        .unwrap();

    assert!(!host["id"].as_str().unwrap().is_empty());
    assert_eq!(host["status"], json!("draft"));
    assert_eq!(
        host["datm"],
        json!({"truth": 50, "goodness": 50, "beauty": 50, "intelligence": 50})
    );
    assert_eq!(host["description"], json!(""));
    assert_eq!(host["domain"], json!("general"));
    assert_eq!(host["cozeConfig"], json!({}));
    assert!(host["prompts"]["scheduler"].is_string());
    assert!(host["createdAt"].is_string());
    assert!(host["updatedAt"].is_string());
}

#[tokio::test]
async fn explicit_host_fields_are_kept() {
    let platform = mem_platform();

    let host = platform
        .create_host(json!({
            "name": "Kai",
            "creatorId": "u1",
            "description": "coffee salon host",
            "domain": "coffee",
            "datm": {"truth": 80, "goodness": 60, "beauty": 40, "intelligence": 90},
        }))
        .await
        .unwrap();

    assert_eq!(host["description"], json!("coffee salon host"));
    assert_eq!(host["domain"], json!("coffee"));
    assert_eq!(host["datm"]["truth"], json!(80));
    assert_eq!(host["status"], json!("draft"));
}

#[tokio::test]
async fn create_host_rejects_invalid_datm() {
    let platform = mem_platform();

    let err = platform
        .create_host(json!({
            "name": "Kai",
            "creatorId": "u1",
            "datm": {"truth": 200, "goodness": 50, "beauty": 50, "intelligence": 50},
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert!(platform.list_hosts().await.unwrap().is_empty());
}

#[tokio::test]
async fn datm_update_is_atomic() {
    let platform = mem_platform();

    let host = platform
        .create_host(json!({"name": "Kai", "creatorId": "u1"}))
        .await
        .unwrap();
    let id = host["id"].as_str().unwrap().to_string();

    // One out-of-range axis rejects the whole update.
    let err = platform
        .update_datm(
            &id,
            json!({"truth": 150, "goodness": 10, "beauty": 10, "intelligence": 10}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let unchanged = platform.get_host(&id).await.unwrap();
    assert_eq!(
        unchanged["datm"],
        json!({"truth": 50, "goodness": 50, "beauty": 50, "intelligence": 50})
    );

    // A fully in-range update lands.
    let datm = platform
        .update_datm(
            &id,
            json!({"truth": 80, "goodness": 70, "beauty": 60, "intelligence": 90}),
        )
        .await
        .unwrap();
    assert_eq!(datm.truth, 80);

    let stored = platform.get_host(&id).await.unwrap();
    assert_eq!(stored["datm"]["intelligence"], json!(90));
}

#[tokio::test]
async fn datm_update_requires_all_axes() {
    let platform = mem_platform();

    let host = platform
        .create_host(json!({"name": "Kai", "creatorId": "u1"}))
        .await
        .unwrap();
    let id = host["id"].as_str().unwrap().to_string();

    let err = platform
        .update_datm(&id, json!({"truth": 10}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn update_host_validates_embedded_datm() {
    let platform = mem_platform();

    let host = platform
        .create_host(json!({"name": "Kai", "creatorId": "u1"}))
        .await
        .unwrap();
    let id = host["id"].as_str().unwrap().to_string();

    let err = platform
        .update_host(
            &id,
            json!({"datm": {"truth": -5, "goodness": 50, "beauty": 50, "intelligence": 50}}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let merged = platform
        .update_host(&id, json!({"status": "published"}))
        .await
        .unwrap();
    assert_eq!(merged["status"], json!("published"));
    assert_eq!(merged["name"], json!("Kai"));
}

#[tokio::test]
async fn user_creation_validates_and_defaults_hosts_list() {
    let platform = mem_platform();

    let err = platform
        .create_user(json!({"username": "kai"}))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let user = platform
        .create_user(json!({"username": "kai", "email": "kai@example.com"}))
        .await
        .unwrap();
    assert_eq!(user["hosts"], json!([]));

    let err = platform
        .create_user(json!({"username": "kai2", "email": "kai@example.com"}))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn delete_host_removes_it() {
    let platform = mem_platform();

    let host = platform
        .create_host(json!({"name": "Kai", "creatorId": "u1"}))
        .await
        .unwrap();
    let id = host["id"].as_str().unwrap().to_string();

    platform.delete_host(&id).await.unwrap();
    assert!(platform.list_hosts().await.unwrap().is_empty());

    let err = platform.delete_host(&id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn non_object_body_is_a_validation_error() {
    let platform = mem_platform();

    let err = platform.create_host(json!("just a string")).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = platform.create_user(json!([1, 2, 3])).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn sessions_collection_supports_generic_crud() {
    let platform = mem_platform();

    let session = platform
        .store()
        .create(
            Collection::Sessions,
            json!({"userId": "u1"}).as_object().cloned().unwrap(),
        )
        .await
        .unwrap();
    let id = session["id"].as_str().unwrap();

    assert_eq!(
        platform
            .store()
            .get(Collection::Sessions, id)
            .await
            .unwrap()["userId"],
        json!("u1")
    );
}

// ── Response envelope ────────────────────────────────────────

#[test]
fn envelope_shapes_match_the_wire_contract() {
    let ok = respond(Ok(json!([{"id": "h1"}])));
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body["success"], json!(true));
    assert_eq!(ok.body["data"][0]["id"], json!("h1"));

    let datm = ApiResponse::ok_under("datm", json!({"truth": 80}));
    assert_eq!(datm.body["success"], json!(true));
    assert_eq!(datm.body["datm"]["truth"], json!(80));

    let empty = ApiResponse::ok_empty();
    assert_eq!(empty.body, json!({"success": true}));
}

#[test]
fn errors_map_to_status_codes() {
    let cases: Vec<(StoreError, u16)> = vec![
        (StoreError::Validation("missing field".into()), 400),
        (
            StoreError::NotFound {
                collection: Collection::Hosts,
                id: "h1".into(),
            },
            404,
        ),
        (StoreError::Conflict("email already registered".into()), 409),
        (StoreError::Storage("malformed file".into()), 500),
    ];

    for (err, status) in cases {
        let response = ApiResponse::from(err);
        assert_eq!(response.status, status);
        assert_eq!(response.body["success"], json!(false));
        assert!(response.body["error"].is_string());
    }
}
