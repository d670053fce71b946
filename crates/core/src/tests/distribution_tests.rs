// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_actor, create_test_batch, create_test_cause, create_test_date,
    create_test_recipient, distribute_books, register_book, run,
};
use crate::{Command, CommandOutcome, CoreError, Inventory, TransitionResult, apply};
use bookdrive_domain::{
    BatchId, BatchStatus, BookId, BookStatus, DistributionId, DistributionPatch,
    DistributionProgress, DistributionRecord, DomainError, MAX_DISTRIBUTION_BOOKS, ReceiverBook,
    RecipientType, expand_serials,
};

fn try_distribute(
    inventory: &mut Inventory,
    batch_id: Option<BatchId>,
    serials: Vec<String>,
) -> Result<TransitionResult, CoreError> {
    apply(
        inventory,
        Command::Distribute {
            recipient: create_test_recipient(),
            batch_id,
            book_serials: serials,
            date: create_test_date(),
        },
        create_test_actor(),
        create_test_cause(),
    )
}

#[test]
fn test_distribute_allocates_and_creates_books() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 100);
    let (distribution_id, book_ids): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, Some(batch_id), "1001", 30);

    assert_eq!(book_ids.len(), 30);
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 70);
    assert_eq!(
        inventory.batch(batch_id).unwrap().status(),
        BatchStatus::PartiallyDistributed
    );

    let record: &DistributionRecord = inventory.distribution(distribution_id).unwrap();
    assert_eq!(record.count(), 30);
    assert_eq!(record.serial_range(), "1001 - 1030");
    assert_eq!(record.batch_name.as_deref(), Some("Batch-A"));

    let book: &ReceiverBook = inventory.find_book_by_number("1015").unwrap();
    assert_eq!(book.status(), BookStatus::Distributed);
    assert_eq!(book.distribution_id(), distribution_id);
    assert_eq!(book.batch_name(), Some("Batch-A"));
}

#[test]
fn test_insufficient_stock_blocks_whole_distribution() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 100);
    distribute_books(&mut inventory, Some(batch_id), "1001", 30);
    distribute_books(&mut inventory, Some(batch_id), "1031", 70);
    assert_eq!(
        inventory.batch(batch_id).unwrap().status(),
        BatchStatus::FullyDistributed
    );

    let result: Result<TransitionResult, CoreError> = try_distribute(
        &mut inventory,
        Some(batch_id),
        expand_serials("2001", 1).unwrap(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InsufficientStock { .. }))
    ));
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 0);
    assert!(inventory.find_book_by_number("2001").is_none());
    assert_eq!(inventory.distributions(None).len(), 2);
}

#[test]
fn test_stock_is_checked_before_serials() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 3);
    let serials: Vec<String> = vec![
        String::from("1"),
        String::from("1"),
        String::from("2"),
        String::from("3"),
    ];

    let result: Result<TransitionResult, CoreError> =
        try_distribute(&mut inventory, Some(batch_id), serials);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InsufficientStock {
            requested: 4,
            remaining: 3,
            ..
        }))
    ));
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 3);
}

#[test]
fn test_oversized_distribution_is_rejected() {
    let mut inventory: Inventory = Inventory::new();
    let serials: Vec<String> = (0..=MAX_DISTRIBUTION_BOOKS).map(|n| n.to_string()).collect();

    let result: Result<TransitionResult, CoreError> =
        try_distribute(&mut inventory, None, serials);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidAllocation(_)))
    ));
    assert!(inventory.distributions(None).is_empty());
}

#[test]
fn test_lookup_by_name_and_number() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 10);
    distribute_books(&mut inventory, Some(batch_id), "1001", 1);

    assert_eq!(inventory.batch_by_name(" batch-a ").unwrap().id(), batch_id);
    assert!(matches!(
        inventory.batch_by_name("Batch-Z"),
        Err(DomainError::BatchNameNotFound(name)) if name == "Batch-Z"
    ));
    assert_eq!(inventory.book_by_number("1001").unwrap().book_number(), "1001");
    assert!(matches!(
        inventory.book_by_number("1002"),
        Err(DomainError::BookNumberNotFound(number)) if number == "1002"
    ));
}

#[test]
fn test_serial_already_assigned_is_rejected() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 100);
    distribute_books(&mut inventory, Some(batch_id), "1001", 10);

    let result: Result<TransitionResult, CoreError> = try_distribute(
        &mut inventory,
        Some(batch_id),
        expand_serials("1010", 5).unwrap(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::SerialAlreadyAssigned(s))) if s == "1010"
    ));
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 90);
}

#[test]
fn test_duplicate_serial_in_request_is_rejected() {
    let mut inventory: Inventory = Inventory::new();
    let result: Result<TransitionResult, CoreError> = try_distribute(
        &mut inventory,
        None,
        vec![String::from("5"), String::from("5")],
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::DuplicateSerial(_)))
    ));
}

#[test]
fn test_unknown_batch_is_not_found() {
    let mut inventory: Inventory = Inventory::new();
    let result: Result<TransitionResult, CoreError> = try_distribute(
        &mut inventory,
        Some(BatchId::new(42)),
        vec![String::from("1")],
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::BatchNotFound(_)))
    ));
}

#[test]
fn test_distribution_without_batch() {
    let mut inventory: Inventory = Inventory::new();
    let (distribution_id, _): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, None, "X-01", 2);
    let record: &DistributionRecord = inventory.distribution(distribution_id).unwrap();
    assert_eq!(record.batch_id, None);
    assert_eq!(record.book_serials(), &["X-01", "X-02"]);
}

#[test]
fn test_progress_tracks_book_status() {
    let mut inventory: Inventory = Inventory::new();
    let (distribution_id, book_ids): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, None, "1001", 3);

    register_book(&mut inventory, book_ids[0]);
    register_book(&mut inventory, book_ids[1]);
    run(
        &mut inventory,
        Command::FinalizeBook {
            book_id: book_ids[1],
            confirmed: true,
            received_date: create_test_date(),
        },
    );

    let progress: DistributionProgress = inventory.distribution_progress(distribution_id).unwrap();
    assert_eq!(
        progress,
        DistributionProgress {
            count: 3,
            registered_count: 2,
            submitted_count: 1,
        }
    );
}

#[test]
fn test_update_changes_recipient_only() {
    let mut inventory: Inventory = Inventory::new();
    let (distribution_id, _): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, None, "1001", 3);

    run(
        &mut inventory,
        Command::UpdateDistribution {
            distribution_id,
            patch: DistributionPatch {
                name: Some(String::from("Ravi K.")),
                ..DistributionPatch::default()
            },
        },
    );

    let record: &DistributionRecord = inventory.distribution(distribution_id).unwrap();
    assert_eq!(record.recipient.name, "Ravi K.");
    assert_eq!(record.count(), 3);
}

#[test]
fn test_empty_update_is_rejected() {
    let mut inventory: Inventory = Inventory::new();
    let (distribution_id, _): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, None, "1001", 1);
    let result: Result<TransitionResult, CoreError> = apply(
        &mut inventory,
        Command::UpdateDistribution {
            distribution_id,
            patch: DistributionPatch::default(),
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(result.is_err());
}

#[test]
fn test_cancel_restocks_batch_and_removes_books() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 100);
    let (distribution_id, _): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, Some(batch_id), "1001", 30);

    let result: TransitionResult = run(
        &mut inventory,
        Command::CancelDistribution { distribution_id },
    );
    assert_eq!(
        result.outcome,
        CommandOutcome::DistributionCancelled {
            distribution_id,
            batch_id: Some(batch_id),
            released: 30,
        }
    );
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 100);
    assert!(inventory.distribution(distribution_id).is_err());
    assert!(!inventory.is_serial_assigned("1001"));

    distribute_books(&mut inventory, Some(batch_id), "1001", 30);
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 70);
}

#[test]
fn test_cancel_refused_after_registration() {
    let mut inventory: Inventory = Inventory::new();
    let batch_id: BatchId = create_test_batch(&mut inventory, "Batch-A", 10);
    let (distribution_id, book_ids): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, Some(batch_id), "1001", 5);
    register_book(&mut inventory, book_ids[2]);

    let result: Result<TransitionResult, CoreError> = apply(
        &mut inventory,
        Command::CancelDistribution { distribution_id },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::DistributionLocked { .. }))
    ));
    assert_eq!(inventory.batch(batch_id).unwrap().remaining_books(), 5);
    assert_eq!(inventory.books(None, Some(distribution_id)).len(), 5);
}

#[test]
fn test_filter_distributions_by_type() {
    let mut inventory: Inventory = Inventory::new();
    distribute_books(&mut inventory, None, "1001", 1);
    assert_eq!(inventory.distributions(Some(RecipientType::Center)).len(), 1);
    assert!(
        inventory
            .distributions(Some(RecipientType::Individual))
            .is_empty()
    );
}
