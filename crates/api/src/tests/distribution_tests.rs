// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_actor, create_test_admin, create_test_batch, create_test_cause,
    create_test_inventory, create_test_recipient, distribute_books, distribution_request,
    register_book,
};
use crate::{
    ApiError, ApiResult, CancelDistributionResponse, CreateDistributionRequest,
    CreateDistributionResponse, DistributionInfo, Role, UpdateDistributionRequest,
    cancel_distribution, create_distribution, export_distributions, get_batch, get_distribution,
    list_books, list_distributions, update_distribution,
};
use bookdrive::Inventory;

#[test]
fn test_distribution_creates_one_book_per_serial() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 50);

    let response: CreateDistributionResponse =
        distribute_books(&mut inventory, Some(batch_id), "1001", 5);

    assert_eq!(response.book_ids.len(), 5);
    assert_eq!(response.batch_remaining, Some(45));
    assert_eq!(response.distribution.count, 5);
    assert_eq!(response.distribution.serial_range, "1001 - 1005");
    assert_eq!(response.distribution.batch_name.as_deref(), Some("Lot A"));
    assert_eq!(
        list_books(&inventory, Some("Distributed"), None)
            .unwrap()
            .books
            .len(),
        5
    );
}

#[test]
fn test_single_book_range_shows_one_serial() {
    let mut inventory: Inventory = create_test_inventory();
    let response: CreateDistributionResponse = distribute_books(&mut inventory, None, "B-07", 1);
    assert_eq!(response.distribution.serial_range, "B-07");
    assert_eq!(response.batch_remaining, None);
}

#[test]
fn test_explicit_serials_with_repeat_are_rejected() {
    let mut inventory: Inventory = create_test_inventory();
    let request: CreateDistributionRequest = CreateDistributionRequest {
        book_serials: vec![String::from("7"), String::from("8"), String::from("7")],
        first_serial: None,
        count: None,
        ..distribution_request(None, "1", 1)
    };

    let result: Result<ApiResult<CreateDistributionResponse>, ApiError> =
        create_distribution(&mut inventory, &request, &create_test_admin(), create_test_cause());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "book_serials"
    ));
    assert!(list_distributions(&inventory, None).unwrap().distributions.is_empty());
}

#[test]
fn test_already_assigned_serial_is_rejected() {
    let mut inventory: Inventory = create_test_inventory();
    distribute_books(&mut inventory, None, "1001", 3);

    let result: Result<ApiResult<CreateDistributionResponse>, ApiError> = create_distribution(
        &mut inventory,
        &distribution_request(None, "1003", 2),
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "unique_book_serial"
    ));
}

#[test]
fn test_count_beyond_stock_fails_before_expanding() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 10);

    let result: Result<ApiResult<CreateDistributionResponse>, ApiError> = create_distribution(
        &mut inventory,
        &distribution_request(Some(batch_id), "1001", u32::MAX),
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InsufficientStock { requested, remaining: 10, .. }) if requested == u32::MAX
    ));
    assert_eq!(get_batch(&inventory, batch_id).unwrap().remaining_books, 10);
}

#[test]
fn test_oversized_count_without_batch_is_rejected() {
    let mut inventory: Inventory = create_test_inventory();

    let result: Result<ApiResult<CreateDistributionResponse>, ApiError> = create_distribution(
        &mut inventory,
        &distribution_request(None, "1", u32::MAX),
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "count"
    ));
    assert!(list_distributions(&inventory, None).unwrap().distributions.is_empty());
}

#[test]
fn test_invalid_phone_blocks_distribution_and_stock() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 10);
    let mut request: CreateDistributionRequest = distribution_request(Some(batch_id), "1001", 2);
    request.recipient.phone = String::from("12345");

    let result: Result<ApiResult<CreateDistributionResponse>, ApiError> =
        create_distribution(&mut inventory, &request, &create_test_admin(), create_test_cause());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "phone"
    ));
    assert_eq!(get_batch(&inventory, batch_id).unwrap().remaining_books, 10);
}

#[test]
fn test_rollups_follow_book_status() {
    let mut inventory: Inventory = create_test_inventory();
    let response: CreateDistributionResponse = distribute_books(&mut inventory, None, "1001", 3);
    register_book(&mut inventory, response.book_ids[0]);
    register_book(&mut inventory, response.book_ids[1]);

    let info: DistributionInfo =
        get_distribution(&inventory, response.distribution.distribution_id).unwrap();
    assert_eq!(info.count, 3);
    assert_eq!(info.registered_count, 2);
    assert_eq!(info.submitted_count, 0);
}

#[test]
fn test_update_changes_recipient_only() {
    let mut inventory: Inventory = create_test_inventory();
    let response: CreateDistributionResponse = distribute_books(&mut inventory, None, "1001", 2);
    let id: u64 = response.distribution.distribution_id;

    let updated: DistributionInfo = update_distribution(
        &mut inventory,
        id,
        &UpdateDistributionRequest {
            name: Some(String::from("Ravi K.")),
            date: Some(String::from("2026-03-05")),
            ..UpdateDistributionRequest::default()
        },
        &create_test_actor(Role::Incharge),
        create_test_cause(),
    )
    .unwrap()
    .response
    .distribution;

    assert_eq!(updated.name, "Ravi K.");
    assert_eq!(updated.date, "2026-03-05");
    assert_eq!(updated.book_serials, response.distribution.book_serials);
}

#[test]
fn test_empty_update_is_rejected() {
    let mut inventory: Inventory = create_test_inventory();
    let id: u64 = distribute_books(&mut inventory, None, "1001", 1)
        .distribution
        .distribution_id;

    let result: Result<_, ApiError> = update_distribution(
        &mut inventory,
        id,
        &UpdateDistributionRequest::default(),
        &create_test_admin(),
        create_test_cause(),
    );
    assert!(result.is_err());
}

#[test]
fn test_cancel_restocks_batch_and_removes_books() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 10);
    let id: u64 = distribute_books(&mut inventory, Some(batch_id), "1001", 4)
        .distribution
        .distribution_id;

    let result: ApiResult<CancelDistributionResponse> =
        cancel_distribution(&mut inventory, id, &create_test_admin(), create_test_cause())
            .unwrap();

    assert_eq!(result.response.released, 4);
    assert_eq!(result.response.batch_id, Some(batch_id));
    assert_eq!(get_batch(&inventory, batch_id).unwrap().remaining_books, 10);
    assert!(list_books(&inventory, None, None).unwrap().books.is_empty());
    assert!(matches!(
        get_distribution(&inventory, id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_cancel_refused_once_a_book_is_registered() {
    let mut inventory: Inventory = create_test_inventory();
    let batch_id: u64 = create_test_batch(&mut inventory, "Lot A", 10);
    let response: CreateDistributionResponse =
        distribute_books(&mut inventory, Some(batch_id), "1001", 2);
    register_book(&mut inventory, response.book_ids[1]);

    let result: Result<_, ApiError> = cancel_distribution(
        &mut inventory,
        response.distribution.distribution_id,
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "distribution_locked"
    ));
    assert_eq!(get_batch(&inventory, batch_id).unwrap().remaining_books, 8);
}

#[test]
fn test_filter_by_recipient_type() {
    let mut inventory: Inventory = create_test_inventory();
    distribute_books(&mut inventory, None, "1001", 1);
    let mut individual: CreateDistributionRequest = distribution_request(None, "2001", 1);
    individual.recipient = crate::RecipientInput {
        recipient_type: String::from("individual"),
        ..create_test_recipient()
    };
    create_distribution(
        &mut inventory,
        &individual,
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(
        list_distributions(&inventory, Some("Individual"))
            .unwrap()
            .distributions
            .len(),
        1
    );
    assert_eq!(list_distributions(&inventory, None).unwrap().distributions.len(), 2);
    assert!(list_distributions(&inventory, Some("Nobody")).is_err());
}

#[test]
fn test_export_uses_range_and_rollups() {
    let mut inventory: Inventory = create_test_inventory();
    distribute_books(&mut inventory, None, "1001", 3);

    let csv: String = export_distributions(&inventory).unwrap();
    let row: &str = csv.lines().nth(1).unwrap();
    assert!(row.contains("\"1001 - 1003\""));
    assert!(row.contains("\"North Center, Secunderabad, Hyderabad, Telangana\""));
    assert!(row.ends_with("\"3\",\"0\",\"0\""));
}
