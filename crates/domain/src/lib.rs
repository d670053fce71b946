// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod batch;
mod book;
mod distribution;
mod error;
mod location;
mod serial;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use batch::{BatchStatus, PrintBatch};
pub use book::{Assignee, BookPage, BookStatus, PageFields, ReceiverBook, TOTAL_PAGES};
pub use distribution::{
    DistributionPatch, DistributionProgress, DistributionRecord, MAX_DISTRIBUTION_BOOKS,
    check_distribution_size, normalize_serials,
};
pub use location::{LocationCounts, LocationLevel, LocationPath, LocationTree};
pub use serial::{compare_serials, expand_serials, format_serial_range, serial_span, sort_serials};

// Re-export public types
pub use error::DomainError;
pub use types::{
    Address, Amount, BatchId, BookId, DistributionId, Recipient, RecipientDetails, RecipientType,
    format_date, non_empty, parse_date,
};
pub use validation::{
    validate_address, validate_batch_name, validate_location_name, validate_name,
    validate_page_number, validate_phone, validate_recipient, validate_recipient_details,
};
