use super::{AppState, router};
use admission_sin::{MemoryStore, Registration, SinPolicy};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN: &str = "test-admin-token";

fn app_with_page_size(max_page_size: usize) -> Router {
    router(AppState::new(
        Arc::new(MemoryStore::new()),
        SinPolicy::Sequential.generator(),
        TOKEN,
        max_page_size,
    ))
}

fn app() -> Router {
    app_with_page_size(500)
}

fn app_with_records(registrations: Vec<Registration>) -> Router {
    router(AppState::new(
        Arc::new(MemoryStore::with_registrations(registrations)),
        SinPolicy::Sequential.generator(),
        TOKEN,
        500,
    ))
}

/// A paid record imported without a SIN.
fn imported(id: &str) -> Registration {
    Registration {
        id: id.into(),
        program: "polytechnic".into(),
        course: "civil_engineering".into(),
        student_name: "Asha Devi".into(),
        transaction_id: Some(format!("TXN-{id}")),
        payment_amount: Some("5000".into()),
        payment_status: "paid".into(),
        status: "paid".into(),
        ..Default::default()
    }
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn submission(txn: Option<&str>) -> Value {
    json!({
        "program": "polytechnic",
        "course": "civil_engineering",
        "studentName": "Asha Devi",
        "email": "asha@example.com",
        "phoneNumber": "9876543210",
        "paymentAmount": "5000",
        "totalFee": 5500,
        "transactionId": txn,
        "aadharFile": { "name": "aadhar.pdf", "path": "uploads/aadhar.pdf" }
    })
}

async fn create(app: &Router, txn: Option<&str>) -> String {
    let (status, body) = send(
        app,
        json_request("POST", "/api/registrations", &submission(txn)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = app();

    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
    assert!(body["uptimeSecs"].is_u64());

    let (status, body) = send(&app, Request::get("/healthz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn create_returns_saved_registration() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/registrations", &submission(None)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], body["id"]);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["aadharFile"]["name"], "aadhar.pdf");
    assert!(body["data"]["sinNumber"].is_null());
    assert!(body.get("sinNumber").is_none());
}

#[tokio::test]
async fn paid_submission_gets_sin_on_create() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/registrations", &submission(Some("pay_At1"))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sinNumber"], "POLY-CIV-00001");
    assert_eq!(body["data"]["sinNumber"], "POLY-CIV-00001");
    assert_eq!(body["data"]["status"], "paid");
    assert!(body["data"]["sinGeneratedAt"].is_string());
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/registrations", &json!({ "program": "ug" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("course"));
}

#[tokio::test]
async fn payment_confirmation_issues_sin_once() {
    let app = app();
    let id = create(&app, None).await;
    let payment = json!({
        "transactionId": "pay_Nx81",
        "paymentStatus": "captured",
        "paymentTime": "2026-06-01T10:30:00Z"
    });
    let uri = format!("/api/registrations/{id}/payment");

    let (status, body) = send(&app, json_request("POST", &uri, &payment)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["transactionId"], "pay_Nx81");
    assert_eq!(body["sinNumber"], "POLY-CIV-00001");

    let (_, again) = send(&app, json_request("POST", &uri, &payment)).await;
    assert_eq!(again["sinNumber"], "POLY-CIV-00001");

    let (_, stored) = send(&app, admin("GET", &format!("/api/registrations/{id}"))).await;
    assert_eq!(stored["sinNumber"], "POLY-CIV-00001");
    assert_eq!(stored["paymentStatus"], "captured");
    assert_eq!(stored["status"], "paid");
}

#[tokio::test]
async fn payment_time_accepts_bare_date() {
    let app = app();
    let id = create(&app, None).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/registrations/{id}/payment"),
            &json!({ "transactionId": "pay_D1", "paymentTime": "2026-06-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sinNumber"], "POLY-CIV-00001");

    let (_, stored) = send(&app, admin("GET", &format!("/api/registrations/{id}"))).await;
    assert_eq!(stored["paymentTime"], "2026-06-01T00:00:00Z");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/registrations/{id}/payment"),
            &json!({ "transactionId": "pay_D1", "paymentTime": "soon" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("paymentTime"));
}

#[tokio::test]
async fn payment_for_unknown_registration_is_404() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/registrations/nope/payment",
            &json!({ "transactionId": "pay_1", "paymentStatus": "captured" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn payment_without_transaction_id_is_rejected() {
    let app = app();
    let id = create(&app, None).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/registrations/{id}/payment"),
            &json!({ "transactionId": "  " }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let app = app();
    let id = create(&app, None).await;
    let routes = [
        ("GET", "/api/registrations".to_owned()),
        ("GET", "/api/registrations/export".to_owned()),
        ("GET", format!("/api/registrations/{id}")),
        ("DELETE", format!("/api/registrations/{id}")),
        ("POST", format!("/api/registrations/{id}/sin")),
        ("POST", "/api/admin/sin/backfill".to_owned()),
    ];

    for (method, uri) in &routes {
        let bare = Request::builder()
            .method(*method)
            .uri(uri.as_str())
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, bare).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body, json!({ "error": "Unauthorized access" }));

        let wrong = Request::builder()
            .method(*method)
            .uri(uri.as_str())
            .header(header::AUTHORIZATION, "Bearer not-the-token")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }

    // still there: the rejected DELETE never ran
    let (status, _) = send(&app, admin("GET", &format!("/api/registrations/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn listing_pages_and_caps_limit() {
    let app = app_with_page_size(2);
    for _ in 0..3 {
        create(&app, None).await;
    }

    let (status, body) = send(&app, admin("GET", "/api/registrations?limit=50")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["limit"], 2);
    assert_eq!(body["metadata"]["count"], 2);
    assert_eq!(body["metadata"]["hasMore"], true);

    let (_, tail) = send(&app, admin("GET", "/api/registrations?limit=2&offset=2")).await;
    assert_eq!(tail["metadata"]["count"], 1);
    assert_eq!(tail["metadata"]["hasMore"], false);
    assert_eq!(tail["metadata"]["offset"], 2);

    // unparseable values fall back to the defaults
    let (status, body) = send(&app, admin("GET", "/api/registrations?limit=abc&offset=x")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["limit"], 2);
    assert_eq!(body["metadata"]["offset"], 0);
}

#[tokio::test]
async fn export_is_an_attachment() {
    let app = app();
    create(&app, Some("TXN1")).await;

    let response = app
        .clone()
        .oneshot(admin("GET", "/api/registrations/export"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment; filename=\"registrations-"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let rows: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["transactionId"], "TXN1");
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = app();
    let id = create(&app, None).await;
    let uri = format!("/api/registrations/{id}");

    let (status, body) = send(&app, admin("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, _) = send(&app, admin("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, admin("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_registration_sin_is_not_reissued() {
    let app = app();
    let first = create(&app, Some("TXN1")).await;
    let second = create(&app, Some("TXN2")).await;
    let (_, body) = send(&app, admin("GET", &format!("/api/registrations/{second}"))).await;
    assert_eq!(body["sinNumber"], "POLY-CIV-00002");

    let (status, _) = send(&app, admin("DELETE", &format!("/api/registrations/{second}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        json_request("POST", "/api/registrations", &submission(Some("TXN3"))),
    )
    .await;
    assert_eq!(body["sinNumber"], "POLY-CIV-00003");

    let (_, body) = send(&app, admin("GET", &format!("/api/registrations/{first}"))).await;
    assert_eq!(body["sinNumber"], "POLY-CIV-00001");
}

#[tokio::test]
async fn single_allocation_reports_outcome() {
    let app = app_with_records(vec![imported("legacy-1")]);
    let pending = create(&app, None).await;

    let (_, body) = send(&app, admin("POST", &format!("/api/registrations/{pending}/sin"))).await;
    assert_eq!(body["outcome"], "ineligible");
    assert!(body.get("sinNumber").is_none());

    let uri = "/api/registrations/legacy-1/sin";
    let (_, first) = send(&app, admin("POST", uri)).await;
    assert_eq!(first["outcome"], "assigned");
    assert_eq!(first["sinNumber"], "POLY-CIV-00001");

    let (_, second) = send(&app, admin("POST", uri)).await;
    assert_eq!(second["outcome"], "existing");
    assert_eq!(second["sinNumber"], "POLY-CIV-00001");
}

#[tokio::test]
async fn backfill_endpoint_returns_report() {
    let app = app_with_records(vec![imported("a"), imported("b"), imported("c")]);
    create(&app, None).await;

    let (status, body) = send(&app, admin("POST", "/api/admin/sin/backfill")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["processed"], 3);
    assert_eq!(body["generated"], 3);
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["errors"], json!([]));

    let (_, list) = send(&app, admin("GET", "/api/registrations")).await;
    let mut sins: Vec<_> = list["registrations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["sinNumber"].as_str())
        .collect();
    sins.sort_unstable();
    assert_eq!(sins, ["POLY-CIV-00001", "POLY-CIV-00002", "POLY-CIV-00003"]);

    let (_, again) = send(&app, admin("POST", "/api/admin/sin/backfill")).await;
    assert_eq!(again["processed"], 0);
    assert_eq!(again["skipped"], 4);
}
