//! Integration tests for denidom-api endpoints
//!
//! Tests cover:
//! - Health endpoint (no auth required)
//! - Registration, login, current user, token rejection
//! - Owner-scoped CRUD for clients, projects and estimates
//! - Estimate totals, CSV document downloads
//! - Public calculator and reference endpoints
//! - AI flows against a local generateContent stand-in and in fallback mode

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use denidom_api::ai::AiClient;
use denidom_api::{build_router, AppState};
use denidom_common::db::init_memory_database;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

const SECRET: &str = "integration-test-secret";

/// Test helper: app over a fresh in-memory database, AI disabled
async fn setup_app() -> Router {
    let db = init_memory_database().await.expect("Should create database");
    build_router(AppState::new(db, SECRET, 24))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

/// Register a user and return the bearer token
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": email, "name": "Прораб", "password": "correct horse"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create_project(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/projects",
            Some(token),
            Some(json!({"name": "Квартира на Ленина", "address": "ул. Ленина, 5"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

fn plaster_items(quantity: f64) -> Value {
    json!([{"name": "Штукатурка стен", "unit": "м²", "quantity": quantity, "price": 100.0}])
}

// =============================================================================
// Health and authentication
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app().await;
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "denidom-api");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_app().await;

    let (status, body) = send(&app, request("GET", "/api/clients", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, request("GET", "/api/auth/me", Some("not.a.token"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = setup_app().await;
    let token = register(&app, "Foreman@Example.com").await;

    let (status, me) = send(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "foreman@example.com");
    assert_eq!(me["role"], "user");
    assert!(me.get("password_hash").is_none());

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "foreman@example.com", "password": "correct horse"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["id"], me["id"]);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "foreman@example.com", "password": "wrong password"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = setup_app().await;
    register(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "DUP@example.com", "name": "Второй", "password": "another pass"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_validation_errors_list_fields() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "not-an-email", "name": "Иван", "password": "short"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_client_crud_lifecycle() {
    let app = setup_app().await;
    let token = register(&app, "owner@example.com").await;

    let (status, client) = send(
        &app,
        request(
            "POST",
            "/api/clients",
            Some(&token),
            Some(json!({"name": "Иванов И.И.", "phone": "+7 900 000-00-00", "inn": "7701234567"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = client["id"].as_str().unwrap().to_string();
    let uri = format!("/api/clients/{}", id);

    let (status, fetched) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Иванов И.И.");

    let (status, updated) = send(
        &app,
        request("PUT", &uri, Some(&token), Some(json!({"company": "ООО Ремонт"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["company"], "ООО Ремонт");
    assert_eq!(updated["phone"], "+7 900 000-00-00");

    let (status, list) = send(&app, request("GET", "/api/clients", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_other_users_rows_are_invisible() {
    let app = setup_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let project_id = create_project(&app, &alice).await;
    let uri = format!("/api/projects/{}", project_id);

    let (status, _) = send(&app, request("GET", &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("DELETE", &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send(&app, request("GET", "/api/projects", Some(&bob), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("{}/estimates", uri),
            Some(&bob),
            Some(json!({"name": "Чужая смета"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_rejects_foreign_client() {
    let app = setup_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let (_, client) = send(
        &app,
        request("POST", "/api/clients", Some(&alice), Some(json!({"name": "Клиент Алисы"}))),
    )
    .await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/projects",
            Some(&bob),
            Some(json!({"name": "Проект", "client_id": client["id"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "client_id");
}

#[tokio::test]
async fn test_estimate_totals_recomputed() {
    let app = setup_app().await;
    let token = register(&app, "estimator@example.com").await;
    let project_id = create_project(&app, &token).await;

    let (status, estimate) = send(
        &app,
        request(
            "POST",
            &format!("/api/projects/{}/estimates", project_id),
            Some(&token),
            Some(json!({"name": "Отделка", "items": plaster_items(10.0)})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", estimate);
    assert_eq!(estimate["number"], "1");
    assert_eq!(estimate["status"], "draft");
    assert_eq!(estimate["subtotal"], 1000.0);
    assert_eq!(estimate["totals"]["overhead"], 120.0);
    assert_eq!(estimate["totals"]["profit"], 89.6);
    assert_eq!(estimate["total"], 1451.52);

    let uri = format!("/api/estimates/{}", estimate["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"items": plaster_items(20.0), "vat_rate": 0.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["subtotal"], 2000.0);
    assert_eq!(updated["total"], 2419.2);
    assert_eq!(updated["name"], "Отделка");

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"items": [{"name": "x", "unit": "шт", "quantity": -1, "price": 5}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "items[0].quantity");

    let (status, list) = send(
        &app,
        request("GET", &format!("/api/projects/{}/estimates", project_id), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Documents
// =============================================================================

async fn download(app: &Router, uri: &str, token: &str) -> (StatusCode, String, String) {
    let response = app
        .clone()
        .oneshot(request("GET", uri, Some(token), None))
        .await
        .unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, disposition, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_export_documents() {
    let app = setup_app().await;
    let token = register(&app, "docs@example.com").await;
    let project_id = create_project(&app, &token).await;

    let (_, estimate) = send(
        &app,
        request(
            "POST",
            &format!("/api/projects/{}/estimates", project_id),
            Some(&token),
            Some(json!({"name": "Отделка", "items": plaster_items(10.0)})),
        ),
    )
    .await;
    let id = estimate["id"].as_str().unwrap();

    let (status, disposition, body) = download(
        &app,
        &format!("/api/export/estimates/{}/ks2?contractor=OOO%20Stroy", id),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(disposition, "attachment; filename=\"KS-2_1.csv\"");
    assert!(body.starts_with('\u{feff}'));
    assert!(body.contains("Объект;Квартира на Ленина, ул. Ленина, 5\r\n"));
    assert!(body.contains("Подрядчик;OOO Stroy\r\n"));
    assert!(body.contains("Штукатурка стен"));

    for kind in ["ks3", "m29", "csv"] {
        let (status, _, body) =
            download(&app, &format!("/api/export/estimates/{}/{}", id, kind), &token).await;
        assert_eq!(status, StatusCode::OK, "{}", kind);
        assert!(body.starts_with('\u{feff}'), "{}", kind);
    }

    let (status, _, _) = download(&app, &format!("/api/export/estimates/{}/pdf", id), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ks3_accumulates_approved_estimates() {
    let app = setup_app().await;
    let token = register(&app, "ks3@example.com").await;
    let project_id = create_project(&app, &token).await;
    let estimates_uri = format!("/api/projects/{}/estimates", project_id);

    let (status, _) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "Этап 1", "status": "approved", "items": plaster_items(10.0)})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, second) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "Этап 2", "items": plaster_items(5.0)})),
        ),
    )
    .await;
    assert_eq!(second["number"], "2");

    let (status, _, body) = download(
        &app,
        &format!("/api/export/estimates/{}/ks3", second["id"].as_str().unwrap()),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let row = body
        .lines()
        .find(|l| l.contains("Стоимость выполненных работ"))
        .unwrap();
    assert!(row.starts_with("1;Стоимость выполненных работ;1500.00;"), "{}", row);
    assert!(row.ends_with(";500.00"), "{}", row);
}

#[tokio::test]
async fn test_ks3_ignores_estimates_created_later() {
    let app = setup_app().await;
    let token = register(&app, "ks3-order@example.com").await;
    let project_id = create_project(&app, &token).await;
    let estimates_uri = format!("/api/projects/{}/estimates", project_id);

    // Both rows usually land within the same second
    let (_, first) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "Этап 1", "items": plaster_items(5.0)})),
        ),
    )
    .await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "Этап 2", "status": "approved", "items": plaster_items(10.0)})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = download(
        &app,
        &format!("/api/export/estimates/{}/ks3", first["id"].as_str().unwrap()),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let row = body
        .lines()
        .find(|l| l.contains("Стоимость выполненных работ"))
        .unwrap();
    assert_eq!(row, "1;Стоимость выполненных работ;500.00;500.00;500.00");
}

#[tokio::test]
async fn test_estimate_numbers_not_reused_after_delete() {
    let app = setup_app().await;
    let token = register(&app, "numbers@example.com").await;
    let project_id = create_project(&app, &token).await;
    let estimates_uri = format!("/api/projects/{}/estimates", project_id);

    let mut created = Vec::new();
    for name in ["A", "B"] {
        let (_, estimate) = send(
            &app,
            request(
                "POST",
                &estimates_uri,
                Some(&token),
                Some(json!({"name": name, "items": plaster_items(1.0)})),
            ),
        )
        .await;
        created.push(estimate);
    }
    assert_eq!(created[0]["number"], "1");
    assert_eq!(created[1]["number"], "2");

    let uri = format!("/api/estimates/{}", created[0]["id"].as_str().unwrap());
    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, third) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "C", "items": plaster_items(1.0)})),
        ),
    )
    .await;
    assert_eq!(third["number"], "3");

    // Free-form numbers do not disturb the sequence
    let (_, custom) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "D", "number": "2024-ДС-1", "items": plaster_items(1.0)})),
        ),
    )
    .await;
    assert_eq!(custom["number"], "2024-ДС-1");

    let (_, next) = send(
        &app,
        request(
            "POST",
            &estimates_uri,
            Some(&token),
            Some(json!({"name": "E", "items": plaster_items(1.0)})),
        ),
    )
    .await;
    assert_eq!(next["number"], "4");
}

#[tokio::test]
async fn test_m29_with_actual_consumption() {
    let app = setup_app().await;
    let token = register(&app, "m29@example.com").await;
    let project_id = create_project(&app, &token).await;

    let (_, estimate) = send(
        &app,
        request(
            "POST",
            &format!("/api/projects/{}/estimates", project_id),
            Some(&token),
            Some(json!({"name": "Отделка", "items": plaster_items(10.0)})),
        ),
    )
    .await;
    let uri = format!("/api/export/estimates/{}/m29", estimate["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some(&token),
            Some(json!({"actual": {"Штукатурная смесь гипсовая": 95.0}})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("1;Штукатурная смесь гипсовая;кг;9;10;90;95;5\r\n"), "{}", body);
    assert!(body.contains("2;Маяк штукатурный;м;0.8;10;8;8;0\r\n"), "{}", body);

    let (status, body) = send(
        &app,
        request(
            "POST",
            &uri,
            Some(&token),
            Some(json!({"actual": {"Маяк штукатурный": -3.0}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let ks2_uri = uri.replace("/m29", "/ks2");
    let (status, _) = send(&app, request("POST", &ks2_uri, Some(&token), Some(json!({"actual": {}})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_inn_must_be_10_or_12_digits() {
    let app = setup_app().await;
    let token = register(&app, "inn@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/clients",
            Some(&token),
            Some(json!({"name": "ИП Петров", "inn": "77012345678"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "inn");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/clients",
            Some(&token),
            Some(json!({"name": "ИП Петров", "inn": "770123456789"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// =============================================================================
// Public calculator and reference data
// =============================================================================

#[tokio::test]
async fn test_calculator_endpoints() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/calculator/calculate",
            None,
            Some(json!({"items": plaster_items(10.0)})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1451.52);
    assert_eq!(body["items_count"], 1);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/calculator/calculate",
            None,
            Some(json!({"items": plaster_items(10.0), "options": {"include_vat": false}})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vat"], 0.0);
    assert_eq!(body["total"], 1209.6);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/calculator/item-total",
            None,
            Some(json!({"quantity": 3, "price": 10.5, "coefficient": 1.2})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 37.8);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/calculator/materials",
            None,
            Some(json!({"work": {"materials": [{"id": "cement", "ratio": 0.25}]}, "quantity": 10})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["materials"][0]["quantity"], 2.5);

    let (status, body) = send(&app, request("GET", "/api/calculator/coefficients", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["cramped_conditions"].as_array().unwrap().is_empty());
    assert!(!body["temperature_zones"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/calculator/recommendations",
            None,
            Some(json!({"items": plaster_items(10.0), "top_n": 2})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        request("POST", "/api/calculator/predict", None, Some(json!({"category": "tile"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quarters_ahead"], 1);
    assert!(body["lower_bound"].as_f64().unwrap() <= body["predicted_price"].as_f64().unwrap());

    let (status, _) = send(
        &app,
        request("POST", "/api/calculator/predict", None, Some(json!({"category": "unknown"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_optimize_and_anomalies() {
    let app = setup_app().await;
    let items = json!([
        {"name": "Штукатурка стен", "unit": "м²", "quantity": 100, "price": 495},
        {"name": "Покраска стен", "unit": "м²", "quantity": 100, "price": 5000, "coefficient": 5}
    ]);

    let (status, body) = send(
        &app,
        request("POST", "/api/calculator/anomalies", None, Some(json!({"items": items.clone()}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["anomalies"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/calculator/optimize",
            None,
            Some(json!({"items": items, "min_quality": 0.7})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for s in body["suggestions"].as_array().unwrap() {
        assert!(s["alternative_price"].as_f64().unwrap() < s["current_price"].as_f64().unwrap());
    }

    let (status, _) = send(
        &app,
        request("POST", "/api/calculator/optimize", None, Some(json!({"items": [], "min_quality": 2}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reference_lookups() {
    let app = setup_app().await;

    let (status, body) = send(&app, request("GET", "/api/normatives?base=fer&limit=3", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["base_type"] == "FER"));

    let (status, body) = send(
        &app,
        request("GET", "/api/normatives?q=%D0%A8%D0%A2%D0%A3%D0%9A%D0%90%D0%A2%D0%A3%D0%A0", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["code"], "ФЕР15-02-016-01");

    let (status, _) = send(&app, request("GET", "/api/normatives?base=xyz", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, request("GET", "/api/materials?category=plaster", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

// =============================================================================
// AI flows
// =============================================================================

#[tokio::test]
async fn test_ai_flows_fall_back_without_client() {
    let app = setup_app().await;
    let token = register(&app, "ai@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/ai/generate-estimate",
            Some(&token),
            Some(json!({"description": "Укладка плитки в ванной", "area_m2": 6})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["items"][0]["category"], "tile");
    assert_eq!(body["items"][0]["quantity"], 6.0);

    let (status, body) = send(
        &app,
        request("POST", "/api/ai/advice", Some(&token), Some(json!({"items": plaster_items(100.0)}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert!(!body["advice"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        request("POST", "/api/ai/generate-estimate", Some(&token), Some(json!({"description": "x"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Serve `router` on an ephemeral port and return its base URL
async fn spawn_model_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn app_with_model(endpoint: &str) -> Router {
    let db = init_memory_database().await.unwrap();
    let client = AiClient::new(endpoint, "test-model", "test-key", Duration::from_secs(5)).unwrap();
    build_router(AppState::new(db, SECRET, 24).with_ai(client))
}

#[tokio::test]
async fn test_ai_estimate_from_model() {
    let reply = json!({"items": [
        {"name": "Демонтаж плитки", "unit": "м²", "quantity": 12, "price": 350},
        {"name": "Укладка плитки", "unit": "м²", "quantity": 12, "price": 1650}
    ]});
    let model = Router::new().route(
        "/models/:call",
        post(move || {
            let text = reply.to_string();
            async move { Json(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})) }
        }),
    );
    let endpoint = spawn_model_server(model).await;
    let app = app_with_model(&endpoint).await;
    let token = register(&app, "model@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/ai/generate-estimate",
            Some(&token),
            Some(json!({"description": "Замена плитки в санузле", "area_m2": 12})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "ai");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["name"], "Демонтаж плитки");
}

#[tokio::test]
async fn test_ai_server_error_falls_back() {
    let model = Router::new().route(
        "/models/:call",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded") }),
    );
    let endpoint = spawn_model_server(model).await;
    let app = app_with_model(&endpoint).await;
    let token = register(&app, "model-down@example.com").await;

    let (status, body) = send(
        &app,
        request("POST", "/api/ai/advice", Some(&token), Some(json!({"items": plaster_items(50.0)}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
}
