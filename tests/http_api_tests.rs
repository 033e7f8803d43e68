#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use vacation_quote::{GroupedVacation, Quote, VacationLine, http_api};

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(Quote::new());
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn night_shift() -> Value {
    json!({
        "dateStart": "2025-03-10",
        "timeStart": "22:00",
        "dateEnd": "2025-03-11",
        "timeEnd": "07:00",
        "rateCHFh": 40.0,
        "canton": "ge"
    })
}

#[tokio::test]
async fn vacation_lifecycle_via_http_api() {
    let app = new_router();

    // Create
    let response = app
        .clone()
        .oneshot(json_request("POST", "/vacations", night_shift()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: VacationLine = read_json(response).await;
    assert_eq!(created.entry.id, 1);
    assert_eq!(created.entry.canton, "GE");
    assert!((created.breakdown.hours_night - 7.0).abs() < 1e-9);
    assert!((created.breakdown.line_ht - 430.0).abs() < 1e-9);

    // Update
    let mut updated = night_shift();
    updated["travelCHF"] = json!(20.0);
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/vacations/1", updated))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let line: VacationLine = read_json(response).await;
    assert!((line.breakdown.line_ht - 450.0).abs() < 1e-9);

    // Delete
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/vacations/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone
    let response = app
        .oneshot(empty_request("GET", "/vacations/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Value = read_json(response).await;
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn invalid_vacation_is_rejected() {
    let app = new_router();
    let mut body = night_shift();
    body["timeEnd"] = json!("22:00");
    body["dateEnd"] = json!("2025-03-10");
    let response = app
        .oneshot(json_request("POST", "/vacations", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = read_json(response).await;
    assert_eq!(error["error"], "invalid_request");
}

#[tokio::test]
async fn calculate_does_not_store_vacation() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/calculate", night_shift()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let line: VacationLine = read_json(response).await;
    assert!((line.breakdown.line_ttc - 464.83).abs() < 1e-9);

    let response = app
        .oneshot(empty_request("GET", "/vacations"))
        .await
        .unwrap();
    let lines: Vec<VacationLine> = read_json(response).await;
    assert!(lines.is_empty());
}

#[tokio::test]
async fn grouped_vacations_and_summary() {
    let app = new_router();
    for day in ["2025-03-10", "2025-03-11"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/vacations",
                json!({
                    "dateStart": day,
                    "timeStart": "08:00",
                    "dateEnd": day,
                    "timeEnd": "16:00",
                    "rateCHFh": 40.0,
                    "canton": "GE",
                    "agentType": "agent de sécurité"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/vacations/grouped"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let groups: Vec<GroupedVacation> = read_json(response).await;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].date_label, "du 10.03.2025 au 11.03.2025");

    let response = app
        .oneshot(empty_request("GET", "/summary"))
        .await
        .unwrap();
    let summary: Value = read_json(response).await;
    assert_eq!(summary["vacation_count"], 2);
    assert_eq!(summary["totals"]["total_ht"], 640.0);
}

#[tokio::test]
async fn settings_and_items_endpoints() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/settings"))
        .await
        .unwrap();
    let mut settings: Value = read_json(response).await;
    assert_eq!(settings["vat_pct"], 8.1);

    settings["vat_pct"] = json!(7.7);
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/settings", settings.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    settings["vat_pct"] = json!(120.0);
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/settings", settings))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/items",
            json!({ "description": "Radio", "quantity": 2.0, "unit_price_chf": 15.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("DELETE", "/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_endpoint_requires_name() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/client", json!({ "name": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/client", json!({ "name": "Hôtel du Lac" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/client"))
        .await
        .unwrap();
    let client: Value = read_json(response).await;
    assert_eq!(client["name"], "Hôtel du Lac");
}

#[tokio::test]
async fn health_reports_ok() {
    let response = new_router()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
