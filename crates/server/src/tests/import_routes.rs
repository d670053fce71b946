// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::{create_batch, create_test_app, distribute, login_as, send};
use crate::live::LiveEvent;

const BATCH_CSV: &str = "batch_name,total_books,serial_start,serial_end,printed_date\n\
                         Lot A,10,1,10,2026-01-10\n\
                         Lot B,10,1,20,2026-01-10\n\
                         Lot C,5,11,15,2026-01-11\n";

#[tokio::test]
async fn test_batch_preview_then_commit() {
    let (app_state, app) = create_test_app();
    let token: String = login_as(&app, "admin", "SuperAdmin").await;
    let request: Value = json!({ "csv_content": BATCH_CSV });

    let (status, preview) = send(&app, "POST", "/batches/import/preview", Some(&token), Some(&request)).await;
    assert_eq!(status, StatusCode::OK, "{preview}");
    assert_eq!(preview["total_rows"], 3);
    assert_eq!(preview["valid_count"], 2);
    assert_eq!(preview["invalid_count"], 1);

    // Preview leaves the store untouched.
    let (_, batches) = send(&app, "GET", "/batches", Some(&token), None).await;
    assert!(batches["batches"].as_array().unwrap().is_empty());

    let mut rx = app_state.live_events.subscribe();
    let (status, response) = send(&app, "POST", "/batches/import", Some(&token), Some(&request)).await;
    assert_eq!(status, StatusCode::OK, "{response}");
    assert_eq!(response["imported_count"], 2);
    assert_eq!(response["failed_count"], 1);
    assert_eq!(
        rx.try_recv().unwrap(),
        LiveEvent::ImportCompleted {
            target: String::from("batch"),
            imported: 2,
            failed: 1,
        }
    );

    let (_, batches) = send(&app, "GET", "/batches", Some(&token), None).await;
    assert_eq!(batches["batches"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_import_with_missing_header_is_bad_request() {
    let (_, app) = create_test_app();
    let token: String = login_as(&app, "admin", "SuperAdmin").await;
    let request: Value = json!({ "csv_content": "batch_name,total_books\nLot A,10\n" });

    let (status, body) = send(&app, "POST", "/batches/import/preview", Some(&token), Some(&request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid file format"));
}

#[tokio::test]
async fn test_distribution_import_applies_valid_rows() {
    let (_, app) = create_test_app();
    let token: String = login_as(&app, "admin", "SuperAdmin").await;
    create_batch(&app, &token, "Lot A", 20).await;
    let csv: &str = "name,phone,pssm_id,recipient_type,state,district,town,center,batch_name,first_serial,count\n\
                     Ravi,9876543210,,Individual,Telangana,Hyderabad,Secunderabad,,Lot A,1001,5\n\
                     Sita,12345,,Individual,Telangana,Hyderabad,,,Lot A,1006,2\n";
    let request: Value = json!({ "csv_content": csv, "date": "2026-03-05" });

    let (status, response) = send(&app, "POST", "/distributions/import", Some(&token), Some(&request)).await;

    assert_eq!(status, StatusCode::OK, "{response}");
    assert_eq!(response["imported_count"], 1);
    assert_eq!(response["failed_count"], 1);

    let (_, distributions) = send(&app, "GET", "/distributions", Some(&token), None).await;
    let listed: &Vec<Value> = distributions["distributions"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["date"], "2026-03-05");
    assert_eq!(listed[0]["count"], 5);
}

#[tokio::test]
async fn test_registration_import_preview() {
    let (_, app) = create_test_app();
    let token: String = login_as(&app, "admin", "SuperAdmin").await;
    let batch_id: u64 = create_batch(&app, &token, "Lot A", 10).await;
    distribute(&app, &token, batch_id, "1001", 2).await;
    let csv: &str = "book_number,name,phone,pssm_id,state,district,town,center\n\
                     1001,Lakshmi Devi,9123456780,,Telangana,Hyderabad,Secunderabad,\n\
                     1009,Nobody,9123456781,,Telangana,Hyderabad,,\n";
    let request: Value = json!({ "csv_content": csv });

    let (status, preview) = send(
        &app,
        "POST",
        "/books/registrations/import/preview",
        Some(&token),
        Some(&request),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{preview}");
    assert_eq!(preview["valid_count"], 1);
    assert_eq!(preview["invalid_count"], 1);
}

#[tokio::test]
async fn test_location_import_merges_file() {
    let (_, app) = create_test_app();
    let token: String = login_as(&app, "admin", "SuperAdmin").await;
    let json_content: &str = r#"{ "States": { "Karnataka": { "Districts": [
        { "District_Name": "Mysuru", "Mandals": ["Hunsur"] }
    ] } } }"#;
    let request: Value = json!({ "json_content": json_content });

    let (status, body) = send(&app, "POST", "/locations/import", Some(&token), Some(&request)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["created"], 3);

    let (status, _) = send(
        &app,
        "POST",
        "/locations/import",
        Some(&token),
        Some(&json!({ "json_content": "not json" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
