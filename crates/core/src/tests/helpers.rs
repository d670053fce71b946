// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, CommandOutcome, Inventory, TransitionResult, apply};
use bookdrive_audit::{Actor, Cause};
use bookdrive_domain::{
    Address, BatchId, BookId, DistributionId, LocationPath, LocationTree, Recipient,
    RecipientDetails, RecipientType, expand_serials, parse_date,
};
use time::Date;

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin-123"), String::from("SuperAdmin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_date() -> Date {
    parse_date("2026-03-01").unwrap()
}

pub fn create_test_address() -> Address {
    Address::new("Telangana", "Hyderabad")
        .with_town("Secunderabad")
        .with_center("North Center")
}

pub fn create_test_recipient() -> Recipient {
    Recipient::new(
        "Ravi Kumar",
        "9876543210",
        None,
        create_test_address(),
        RecipientType::Center,
    )
}

pub fn create_test_details() -> RecipientDetails {
    RecipientDetails::new("Lakshmi Devi", "9123456780", None, create_test_address())
}

pub fn create_test_locations() -> LocationTree {
    let mut tree: LocationTree = LocationTree::new();
    tree.merge(&LocationPath::center(
        "Telangana",
        "Hyderabad",
        "Secunderabad",
        "North Center",
    ))
    .unwrap();
    tree.merge(&LocationPath::district("Telangana", "Warangal"))
        .unwrap();
    tree
}

pub fn run(inventory: &mut Inventory, command: Command) -> TransitionResult {
    apply(inventory, command, create_test_actor(), create_test_cause()).unwrap()
}

/// Creates a batch of `total` books numbered from 1001.
pub fn create_test_batch(inventory: &mut Inventory, name: &str, total: u32) -> BatchId {
    let result: TransitionResult = run(
        inventory,
        Command::CreateBatch {
            batch_name: String::from(name),
            total_books: total,
            serial_start: String::from("1001"),
            serial_end: format!("{}", 1000 + total),
            printed_date: create_test_date(),
        },
    );
    match result.outcome {
        CommandOutcome::BatchCreated(id) => id,
        other => panic!("unexpected outcome {other:?}"),
    }
}

pub fn distribute_books(
    inventory: &mut Inventory,
    batch_id: Option<BatchId>,
    first_serial: &str,
    count: u32,
) -> (DistributionId, Vec<BookId>) {
    let result: TransitionResult = run(
        inventory,
        Command::Distribute {
            recipient: create_test_recipient(),
            batch_id,
            book_serials: expand_serials(first_serial, count).unwrap(),
            date: create_test_date(),
        },
    );
    match result.outcome {
        CommandOutcome::Distributed {
            distribution_id,
            book_ids,
        } => (distribution_id, book_ids),
        other => panic!("unexpected outcome {other:?}"),
    }
}

pub fn register_book(inventory: &mut Inventory, book_id: BookId) {
    run(
        inventory,
        Command::RegisterRecipient {
            book_id,
            details: create_test_details(),
        },
    );
}
