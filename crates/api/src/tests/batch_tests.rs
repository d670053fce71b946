// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_batch_request, create_test_actor, create_test_admin, create_test_batch,
    create_test_cause, create_test_inventory, distribute_books, distribution_request,
};
use crate::{
    ApiError, ApiResult, BatchInfo, CreateBatchRequest, CreateBatchResponse, Role, create_batch,
    SummaryResponse, create_distribution, export_batches, get_batch, get_summary, list_batches,
};
use bookdrive::Inventory;

#[test]
fn test_create_batch_starts_in_stock() {
    let mut inventory: Inventory = create_test_inventory();
    let result: ApiResult<CreateBatchResponse> = create_batch(
        &mut inventory,
        &create_batch_request("Lot A", 100),
        &create_test_actor(Role::Distributor),
        create_test_cause(),
    )
    .unwrap();

    let batch: &BatchInfo = &result.response.batch;
    assert_eq!(batch.total_books, 100);
    assert_eq!(batch.remaining_books, 100);
    assert_eq!(batch.status, "InStock");
    assert_eq!(batch.printed_date, "2026-02-01");
    assert_eq!(result.audit_event.action.name, "CreateBatch");
    assert_eq!(result.audit_event.actor.actor_type, "Distributor");
}

#[test]
fn test_duplicate_batch_name_is_rejected_case_insensitively() {
    let mut inventory: Inventory = create_test_inventory();
    create_test_batch(&mut inventory, "Lot A", 10);

    let result: Result<ApiResult<CreateBatchResponse>, ApiError> = create_batch(
        &mut inventory,
        &create_batch_request("  lot a ", 10),
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "unique_batch_name"
    ));
    assert_eq!(list_batches(&inventory).batches.len(), 1);
}

#[test]
fn test_zero_books_is_invalid_input() {
    let mut inventory: Inventory = create_test_inventory();
    let request: CreateBatchRequest = CreateBatchRequest {
        total_books: 0,
        ..create_batch_request("Lot Z", 1)
    };

    let result: Result<ApiResult<CreateBatchResponse>, ApiError> =
        create_batch(&mut inventory, &request, &create_test_admin(), create_test_cause());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "total_books"
    ));
}

#[test]
fn test_bad_printed_date_is_invalid_input() {
    let mut inventory: Inventory = create_test_inventory();
    let request: CreateBatchRequest = CreateBatchRequest {
        printed_date: String::from("01/02/2026"),
        ..create_batch_request("Lot D", 5)
    };

    let result: Result<ApiResult<CreateBatchResponse>, ApiError> =
        create_batch(&mut inventory, &request, &create_test_admin(), create_test_cause());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "date"
    ));
}

#[test]
fn test_stock_drawdown_to_exhaustion() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 100);

    distribute_books(&mut inventory, Some(batch_id), "1001", 30);
    let batch: BatchInfo = get_batch(&inventory, batch_id).unwrap();
    assert_eq!(batch.remaining_books, 70);
    assert_eq!(batch.status, "PartiallyDistributed");

    distribute_books(&mut inventory, Some(batch_id), "1031", 70);
    let batch: BatchInfo = get_batch(&inventory, batch_id).unwrap();
    assert_eq!(batch.remaining_books, 0);
    assert_eq!(batch.status, "FullyDistributed");

    let result: Result<_, ApiError> = create_distribution(
        &mut inventory,
        &distribution_request(Some(batch_id), "2001", 1),
        &create_test_admin(),
        create_test_cause(),
    );
    assert_eq!(
        result.unwrap_err(),
        ApiError::InsufficientStock {
            batch_name: String::from("Lot A"),
            requested: 1,
            remaining: 0,
        }
    );
    assert_eq!(get_batch(&inventory, batch_id).unwrap().remaining_books, 0);
}

#[test]
fn test_list_batches_newest_first() {
    let mut inventory: Inventory = create_test_inventory();
    create_test_batch(&mut inventory, "First", 5);
    create_test_batch(&mut inventory, "Second", 5);

    let names: Vec<String> = list_batches(&inventory)
        .batches
        .into_iter()
        .map(|b| b.batch_name)
        .collect();
    assert_eq!(names, vec![String::from("Second"), String::from("First")]);
}

#[test]
fn test_unknown_batch_is_not_found() {
    let inventory: Inventory = create_test_inventory();
    assert!(matches!(
        get_batch(&inventory, 42),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_summary_tracks_stock() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 20);
    distribute_books(&mut inventory, Some(batch_id), "1001", 5);

    let summary: SummaryResponse = get_summary(&inventory);
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.printed_books, 20);
    assert_eq!(summary.remaining_books, 15);
    assert_eq!(summary.books_distributed, 5);
    assert_eq!(summary.collected, "0.00");
}

#[test]
fn test_export_batches_quotes_every_field() {
    let mut inventory: Inventory = create_test_inventory();
    create_test_batch(&mut inventory, "Lot A", 10);

    let csv: String = export_batches(&inventory).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[1],
        "\"Lot A\",\"10\",\"10\",\"0\",\"1001\",\"1010\",\"2026-02-01\",\"InStock\""
    );
}
