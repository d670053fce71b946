// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_registered_book, create_test_book, create_test_date, create_test_details};
use crate::{
    Address, Amount, BookStatus, DomainError, PageFields, ReceiverBook, RecipientDetails,
};

fn create_page(donor: &str, amount: u64) -> PageFields {
    PageFields {
        donor_name: String::from(donor),
        amount: Some(Amount::from_major(amount)),
        ..PageFields::default()
    }
}

#[test]
fn test_new_book_is_distributed() {
    let book: ReceiverBook = create_test_book("1001");
    assert_eq!(book.status(), BookStatus::Distributed);
    assert_eq!(book.filled_pages(), 0);
    assert_eq!(book.total_amount(), Amount::ZERO);
    assert_eq!(book.total_pages(), 20);
    assert_eq!(book.assigned_to().name, "Ravi Kumar");
}

#[test]
fn test_register_records_responsible_person() {
    let mut book: ReceiverBook = create_test_book("1001");
    book.register(&create_test_details()).unwrap();
    assert_eq!(book.status(), BookStatus::Registered);
    assert_eq!(book.assigned_to().name, "Lakshmi Devi");
    assert_eq!(book.assigned_to().phone, "9123456780");
}

#[test]
fn test_reregister_corrects_details() {
    let mut book: ReceiverBook = create_registered_book("1001");
    let details: RecipientDetails = RecipientDetails::new(
        "Lakshmi D.",
        "9123456780",
        None,
        Address::new("Telangana", "Warangal"),
    );
    book.register(&details).unwrap();
    assert_eq!(book.status(), BookStatus::Registered);
    assert_eq!(book.address().district, "Warangal");
}

#[test]
fn test_register_rejects_bad_phone_without_mutation() {
    let mut book: ReceiverBook = create_test_book("1001");
    let details: RecipientDetails = RecipientDetails::new(
        "Lakshmi Devi",
        "12345",
        None,
        Address::new("Telangana", "Hyderabad"),
    );
    assert!(matches!(
        book.register(&details),
        Err(DomainError::InvalidPhone(_))
    ));
    assert_eq!(book.status(), BookStatus::Distributed);
    assert_eq!(book.assigned_to().name, "Ravi Kumar");
}

#[test]
fn test_finalize_requires_confirmation() {
    let mut book: ReceiverBook = create_registered_book("1001");
    assert!(matches!(
        book.finalize(false, create_test_date()),
        Err(DomainError::ConfirmationRequired { .. })
    ));
    assert_eq!(book.status(), BookStatus::Registered);

    book.finalize(true, create_test_date()).unwrap();
    assert_eq!(book.status(), BookStatus::Received);
    assert_eq!(book.received_date(), Some(create_test_date()));
}

#[test]
fn test_finalize_from_distributed_is_rejected() {
    let mut book: ReceiverBook = create_test_book("1001");
    assert!(matches!(
        book.finalize(true, create_test_date()),
        Err(DomainError::InvalidTransition {
            from: BookStatus::Distributed,
            to: BookStatus::Received,
            ..
        })
    ));
}

#[test]
fn test_received_book_cannot_be_registered_again() {
    let mut book: ReceiverBook = create_registered_book("1001");
    book.finalize(true, create_test_date()).unwrap();
    assert!(matches!(
        book.register(&create_test_details()),
        Err(DomainError::InvalidTransition { .. })
    ));
}

#[test]
fn test_reopen_returns_to_registered() {
    let mut book: ReceiverBook = create_registered_book("1001");
    assert!(book.reopen().is_err());

    book.finalize(true, create_test_date()).unwrap();
    book.reopen().unwrap();
    assert_eq!(book.status(), BookStatus::Registered);
    assert_eq!(book.received_date(), None);
}

#[test]
fn test_save_page_requires_registration() {
    let mut book: ReceiverBook = create_test_book("1001");
    assert!(matches!(
        book.save_page(1, &create_page("Donor", 100)),
        Err(DomainError::BookNotRegistered { .. })
    ));
}

#[test]
fn test_save_page_rejected_after_finalize() {
    let mut book: ReceiverBook = create_registered_book("1001");
    book.finalize(true, create_test_date()).unwrap();
    assert!(matches!(
        book.save_page(1, &create_page("Donor", 100)),
        Err(DomainError::BookFinalized { .. })
    ));
}

#[test]
fn test_save_page_rejects_out_of_range_pages() {
    let mut book: ReceiverBook = create_registered_book("1001");
    assert!(matches!(
        book.save_page(0, &create_page("Donor", 1)),
        Err(DomainError::InvalidPageNumber { page: 0, max: 20 })
    ));
    assert!(matches!(
        book.save_page(21, &create_page("Donor", 1)),
        Err(DomainError::InvalidPageNumber { page: 21, max: 20 })
    ));
    book.save_page(20, &create_page("Donor", 1)).unwrap();
    assert_eq!(book.filled_pages(), 1);
}

#[test]
fn test_save_page_requires_donor_name() {
    let mut book: ReceiverBook = create_registered_book("1001");
    assert!(matches!(
        book.save_page(1, &create_page("   ", 10)),
        Err(DomainError::InvalidName(_))
    ));
    assert_eq!(book.filled_pages(), 0);
}

#[test]
fn test_resaving_a_page_replaces_it() {
    let mut book: ReceiverBook = create_registered_book("1001");
    for page in 1..=8 {
        book.save_page(page, &create_page("Donor", 100)).unwrap();
    }
    assert_eq!(book.filled_pages(), 8);
    assert_eq!(book.total_amount(), Amount::from_major(800));

    book.save_page(3, &create_page("Second Donor", 500)).unwrap();
    assert_eq!(book.filled_pages(), 8);
    assert_eq!(book.total_amount(), Amount::from_major(1200));
    assert_eq!(book.page(3).unwrap().donor_name, "Second Donor");

    book.save_page(3, &create_page("Second Donor", 500)).unwrap();
    assert_eq!(book.filled_pages(), 8);
    assert_eq!(book.total_amount(), Amount::from_major(1200));
}

#[test]
fn test_page_without_amount_counts_as_zero() {
    let mut book: ReceiverBook = create_registered_book("1001");
    let fields: PageFields = PageFields {
        donor_name: String::from("Donor"),
        donor_phone: Some(String::from("  ")),
        ..PageFields::default()
    };
    book.save_page(5, &fields).unwrap();
    assert_eq!(book.filled_pages(), 1);
    assert_eq!(book.total_amount(), Amount::ZERO);
    assert_eq!(book.page(5).unwrap().donor_phone, None);
}

#[test]
fn test_status_transitions() {
    assert!(BookStatus::Distributed.can_transition_to(BookStatus::Registered));
    assert!(BookStatus::Registered.can_transition_to(BookStatus::Registered));
    assert!(BookStatus::Registered.can_transition_to(BookStatus::Received));
    assert!(!BookStatus::Distributed.can_transition_to(BookStatus::Received));
    assert!(!BookStatus::Received.can_transition_to(BookStatus::Registered));
    assert!(!BookStatus::Received.can_transition_to(BookStatus::Distributed));
}

#[test]
fn test_status_parsing() {
    assert_eq!(
        "submitted".parse::<BookStatus>().unwrap(),
        BookStatus::Received
    );
    assert_eq!(
        " Registered ".parse::<BookStatus>().unwrap(),
        BookStatus::Registered
    );
    assert!("lost".parse::<BookStatus>().is_err());
}
