mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{TestDb, build_app, grants_gov_config, send, send_request};
use serde_json::{Value, json};

#[tokio::test]
async fn grant_routes_follow_crud_contract() {
    let db = TestDb::spawn("route-grants").await;
    let app = build_app(&db, grants_gov_config(None));

    // 1) create -> 201 with id, defaults and timestamps
    let (status, created) = send(
        &app,
        "POST",
        "/api/grants",
        Some(json!({
            "title": "Community Arts",
            "agency": "NEA",
            "opportunity_number": "NEA-2026-01",
            "deadline": "2026-04-30",
            "tags": ["arts"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("id");
    assert!(id > 0);
    assert_eq!(created["status"], "tracking");
    assert_eq!(created["tags"], json!(["arts"]));
    assert_eq!(created["deadline"], "2026-04-30");
    assert!(created["created_at"].is_string());

    // 2) duplicate number -> 400 CONFLICT
    let (status, body) = send(
        &app,
        "POST",
        "/api/grants",
        Some(json!({"title": "Copy", "opportunity_number": "NEA-2026-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("NEA-2026-01")
    );

    // 3) get -> 200
    let (status, fetched) = send(&app, "GET", &format!("/api/grants/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // 4) list with and without filter
    let (status, list) = send(&app, "GET", "/api/grants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, list) = send(&app, "GET", "/api/grants?status=applied", None).await;
    assert_eq!(list, json!([]));
    let (_, list) = send(&app, "GET", "/api/grants?status=", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // 5) full update -> omitted fields cleared
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/grants/{id}"),
        Some(json!({"title": "Community Arts", "status": "applied"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "applied");
    assert_eq!(updated["agency"], Value::Null);
    assert_eq!(updated["tags"], json!([]));
    assert_eq!(updated["created_at"], created["created_at"]);

    // 6) status transition
    let (status, awarded) = send(
        &app,
        "PATCH",
        &format!("/api/grants/{id}/status"),
        Some(json!({"status": "awarded"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(awarded["status"], "awarded");

    // 7) delete twice -> success both times, then 404
    for _ in 0..2 {
        let (status, body) = send(&app, "DELETE", &format!("/api/grants/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }
    let (status, body) = send(&app, "GET", &format!("/api/grants/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn grant_routes_reject_bad_requests() {
    let db = TestDb::spawn("route-grants-bad").await;
    let app = build_app(&db, grants_gov_config(None));

    // invalid JSON -> 400 INVALID_JSON
    let (status, body) = send_request(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/grants")
            .header("content-type", "application/json")
            .body(Body::from("not-json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_JSON");

    // missing title -> 400
    let (status, body) = send(&app, "POST", "/api/grants", Some(json!({"agency": "NSF"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    // malformed deadline -> 400
    let (status, _) = send(
        &app,
        "POST",
        "/api/grants",
        Some(json!({"title": "t", "deadline": "someday"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // non-numeric id -> 400
    let (status, _) = send(&app, "GET", "/api/grants/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // update of unknown id -> 404, and nothing is created
    let (status, _) = send(&app, "PUT", "/api/grants/999", Some(json!({"title": "ghost"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&app, "GET", "/api/grants", None).await;
    assert_eq!(list, json!([]));

    // blank status transition -> 400
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/grants/1/status",
        Some(json!({"status": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown route -> 404
    let (status, _) = send(&app, "GET", "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_and_dashboard_routes() {
    let db = TestDb::spawn("route-settings").await;
    let app = build_app(&db, grants_gov_config(None));

    let (status, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, body) = send(
        &app,
        "POST",
        "/api/settings",
        Some(json!({"grants_gov_api_key": "k-1", "page_size": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, body) = send(
        &app,
        "POST",
        "/api/settings",
        Some(json!({"grants_gov_api_key": "k-2"})),
    )
    .await;
    assert_eq!(body, json!({"success": true}));

    let (_, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(body, json!({"grants_gov_api_key": "k-2", "page_size": "50"}));

    let (status, _) = send(&app, "POST", "/api/settings", Some(json!({"k": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app, "POST", "/api/grants", Some(json!({"title": "one"}))).await;
    send(&app, "POST", "/api/grants", Some(json!({"title": "two", "status": "applied"}))).await;

    let (status, dash) = send(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["total"], 2);
    assert_eq!(dash["active"], 1);
    assert_eq!(dash["applied"], 1);
    assert_eq!(dash["awarded"], 0);
    assert_eq!(dash["total_funding_awarded"], 0.0);
    assert_eq!(dash["upcoming_deadlines"], json!([]));

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let db = TestDb::spawn("route-request-id").await;
    let app = build_app(&db, grants_gov_config(None));

    let resp = tower::ServiceExt::oneshot(
        app.clone(),
        Request::builder()
            .uri("/api/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "req-123");

    let resp = tower::ServiceExt::oneshot(
        app.clone(),
        Request::builder().uri("/api/health").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert!(!resp.headers()["x-request-id"].is_empty());

    // Error responses carry it too.
    let resp = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .uri("/api/nope")
            .header("x-request-id", "req-404")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers()["x-request-id"], "req-404");
}
