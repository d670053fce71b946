// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use bookdrive::Inventory;
use bookdrive_api::load_location_tree;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, build_router};

const TEST_LOCATIONS: &str = r#"{ "States": { "Telangana": { "Districts": [
    { "District_Name": "Hyderabad", "Mandals": ["Secunderabad"] },
    { "District_Name": "Warangal", "Mandals": ["Hanamkonda"] }
] } } }"#;

pub fn create_test_app_state() -> AppState {
    let tree = load_location_tree(TEST_LOCATIONS).expect("test locations are valid");
    AppState::new(Inventory::with_locations(tree))
}

pub fn create_test_app() -> (AppState, Router) {
    let app_state: AppState = create_test_app_state();
    let router: Router = build_router(app_state.clone());
    (app_state, router)
}

fn build_request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends one request and returns the status with the raw response.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(build_request(method, uri, token, body))
        .await
        .unwrap();
    let status: StatusCode = response.status();
    let headers: HeaderMap = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Sends one request and parses the JSON response body, if any.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let (status, _, text) = send_raw(app, method, uri, token, body).await;
    if text.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_str(&text).unwrap())
}

pub async fn login_as(app: &Router, login_name: &str, role: &str) -> String {
    let body: Value = json!({ "login_name": login_name, "role": role });
    let (status, response) = send(app, "POST", "/login", None, Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    response["session_token"].as_str().unwrap().to_string()
}

pub fn batch_body(name: &str, total: u32) -> Value {
    json!({
        "batch_name": name,
        "total_books": total,
        "serial_start": "1001",
        "serial_end": format!("{}", 1000 + total),
        "printed_date": "2026-02-01",
    })
}

pub fn address_body() -> Value {
    json!({
        "state": "Telangana",
        "district": "Hyderabad",
        "town": "Secunderabad",
    })
}

pub fn distribution_body(batch_id: u64, first_serial: &str, count: u32) -> Value {
    json!({
        "recipient": {
            "name": "Ravi Kumar",
            "phone": "9876543210",
            "recipient_type": "Individual",
            "address": address_body(),
        },
        "batch_id": batch_id,
        "first_serial": first_serial,
        "count": count,
        "date": "2026-03-01",
    })
}

/// Creates a batch through the API and returns its id.
pub async fn create_batch(app: &Router, token: &str, name: &str, total: u32) -> u64 {
    let (status, response) = send(app, "POST", "/batches", Some(token), Some(&batch_body(name, total))).await;
    assert_eq!(status, StatusCode::OK, "{response}");
    response["batch"]["batch_id"].as_u64().unwrap()
}

/// Distributes books through the API and returns the response.
pub async fn distribute(app: &Router, token: &str, batch_id: u64, first_serial: &str, count: u32) -> Value {
    let (status, response) = send(
        app,
        "POST",
        "/distributions",
        Some(token),
        Some(&distribution_body(batch_id, first_serial, count)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{response}");
    response
}
