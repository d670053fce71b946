// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Address, BookId, DistributionId, ReceiverBook, Recipient, RecipientDetails, RecipientType,
    parse_date,
};
use time::Date;

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
        Some("PSSM-17"),
        create_test_address(),
        RecipientType::Individual,
    )
}

pub fn create_test_details() -> RecipientDetails {
    RecipientDetails::new("Lakshmi Devi", "9123456780", None, create_test_address())
}

pub fn create_test_book(book_number: &str) -> ReceiverBook {
    ReceiverBook::new(
        BookId::new(1),
        book_number,
        Some(String::from("Batch-A")),
        DistributionId::new(1),
        &RecipientDetails::from(&create_test_recipient()),
        create_test_date(),
    )
}

pub fn create_registered_book(book_number: &str) -> ReceiverBook {
    let mut book: ReceiverBook = create_test_book(book_number);
    book.register(&create_test_details()).unwrap();
    book
}
