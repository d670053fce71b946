// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_actor, create_test_cause, create_test_date, create_test_locations,
    distribute_books, register_book, run,
};
use crate::{Command, CommandOutcome, CoreError, Inventory, TransitionResult, apply};
use bookdrive_domain::{
    Address, BookId, DistributionId, DistributionRecord, DomainError, LocationPath, ReceiverBook,
    Recipient, RecipientType, expand_serials,
};

#[test]
fn test_add_location_under_existing_parent() {
    let mut inventory: Inventory = Inventory::with_locations(create_test_locations());
    run(
        &mut inventory,
        Command::AddLocation {
            path: LocationPath::town("Telangana", "Warangal", "Hanamkonda"),
        },
    );
    assert!(
        inventory
            .locations()
            .contains(&LocationPath::town("Telangana", "Warangal", "Hanamkonda"))
    );
}

#[test]
fn test_add_location_with_missing_parent_fails() {
    let mut inventory: Inventory = Inventory::new();
    let result: Result<TransitionResult, CoreError> = apply(
        &mut inventory,
        Command::AddLocation {
            path: LocationPath::district("Kerala", "Kochi"),
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::LocationNotFound { .. }))
    ));
}

#[test]
fn test_rename_cascades_into_addresses() {
    let mut inventory: Inventory = Inventory::with_locations(create_test_locations());
    let (distribution_id, book_ids): (DistributionId, Vec<BookId>) =
        distribute_books(&mut inventory, None, "1001", 2);
    register_book(&mut inventory, book_ids[0]);

    let result: TransitionResult = run(
        &mut inventory,
        Command::RenameLocation {
            path: LocationPath::district("Telangana", "Hyderabad"),
            new_name: String::from("Hyderabad Urban"),
        },
    );
    assert!(matches!(
        result.outcome,
        CommandOutcome::LocationRenamed {
            addresses_updated: 3,
            ..
        }
    ));

    let record: &DistributionRecord = inventory.distribution(distribution_id).unwrap();
    assert_eq!(record.recipient.address.district, "Hyderabad Urban");
    let book: &ReceiverBook = inventory.book(book_ids[0]).unwrap();
    assert_eq!(book.address().district, "Hyderabad Urban");
    assert_eq!(book.address().center.as_deref(), Some("North Center"));
}

#[test]
fn test_address_outside_tree_is_kept_as_written() {
    let mut inventory: Inventory = Inventory::with_locations(create_test_locations());
    let recipient: Recipient = Recipient::new(
        "Ameerpet Volunteers",
        "9123456780",
        None,
        Address::new("Telangana", "Hyderabad").with_town("Ameerpet"),
        RecipientType::Individual,
    );
    let result: TransitionResult = run(
        &mut inventory,
        Command::Distribute {
            recipient,
            batch_id: None,
            book_serials: expand_serials("5001", 2).unwrap(),
            date: create_test_date(),
        },
    );
    let CommandOutcome::Distributed {
        distribution_id, ..
    } = result.outcome
    else {
        panic!("expected a distribution");
    };

    let result: TransitionResult = run(
        &mut inventory,
        Command::RenameLocation {
            path: LocationPath::town("Telangana", "Hyderabad", "Secunderabad"),
            new_name: String::from("Secunderabad East"),
        },
    );
    assert!(matches!(
        result.outcome,
        CommandOutcome::LocationRenamed {
            addresses_updated: 0,
            ..
        }
    ));
    let record: &DistributionRecord = inventory.distribution(distribution_id).unwrap();
    assert_eq!(record.recipient.address.town.as_deref(), Some("Ameerpet"));

    run(
        &mut inventory,
        Command::RemoveLocation {
            path: LocationPath::town("Telangana", "Hyderabad", "Secunderabad East"),
        },
    );
}

#[test]
fn test_remove_refused_while_referenced() {
    let mut inventory: Inventory = Inventory::with_locations(create_test_locations());
    distribute_books(&mut inventory, None, "1001", 1);

    let result: Result<TransitionResult, CoreError> = apply(
        &mut inventory,
        Command::RemoveLocation {
            path: LocationPath::district("Telangana", "Hyderabad"),
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::LocationInUse {
            references: 2,
            ..
        }))
    ));

    run(
        &mut inventory,
        Command::RemoveLocation {
            path: LocationPath::district("Telangana", "Warangal"),
        },
    );
    assert!(
        !inventory
            .locations()
            .contains(&LocationPath::district("Telangana", "Warangal"))
    );
}

#[test]
fn test_merge_locations_counts_created_nodes() {
    let mut inventory: Inventory = Inventory::with_locations(create_test_locations());
    let result: TransitionResult = run(
        &mut inventory,
        Command::MergeLocations {
            paths: vec![
                LocationPath::town("Telangana", "Hyderabad", "Secunderabad"),
                LocationPath::town("Telangana", "Hyderabad", "Kukatpally"),
                LocationPath::town("Andhra Pradesh", "Guntur", "Tenali"),
            ],
        },
    );
    assert_eq!(result.outcome, CommandOutcome::LocationsMerged { created: 4 });
}

#[test]
fn test_failed_merge_leaves_tree_unchanged() {
    let mut inventory: Inventory = Inventory::with_locations(create_test_locations());
    let result: Result<TransitionResult, CoreError> = apply(
        &mut inventory,
        Command::MergeLocations {
            paths: vec![
                LocationPath::town("Telangana", "Hyderabad", "Kukatpally"),
                LocationPath::state("Bad/Name"),
            ],
        },
        create_test_actor(),
        create_test_cause(),
    );
    assert!(result.is_err());
    assert!(
        !inventory
            .locations()
            .contains(&LocationPath::town("Telangana", "Hyderabad", "Kukatpally"))
    );
}
