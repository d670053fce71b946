// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::book::BookStatus;
use crate::types::{BatchId, BookId, DistributionId};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Batch name is empty or invalid.
    InvalidBatchName(String),
    /// A batch with this name already exists.
    DuplicateBatchName(String),
    /// Batch book count must be positive.
    InvalidBookCount {
        /// The invalid count value.
        count: u32,
    },
    /// The serial range does not describe the batch.
    InvalidSerialRange {
        /// The first serial of the range.
        start: String,
        /// The last serial of the range.
        end: String,
        /// Description of the problem.
        reason: String,
    },
    /// A serial could not be interpreted.
    InvalidSerial(String),
    /// Batch does not exist.
    BatchNotFound(BatchId),
    /// No batch carries the given name.
    BatchNameNotFound(String),
    /// An allocation or release count is invalid.
    InvalidAllocation(String),
    /// The batch does not hold enough undistributed books.
    InsufficientStock {
        /// The batch name.
        batch_name: String,
        /// The number of books requested.
        requested: u32,
        /// The number of books still in stock.
        remaining: u32,
    },
    /// Releasing books would exceed the printed total.
    OverRelease {
        /// The batch name.
        batch_name: String,
        /// The number of books being returned.
        released: u32,
        /// The current remaining count.
        remaining: u32,
        /// The printed total.
        total: u32,
    },
    /// Recipient or donor name is empty or invalid.
    InvalidName(String),
    /// Phone number is empty or malformed.
    InvalidPhone(String),
    /// Address is incomplete or inconsistent.
    InvalidAddress(String),
    /// Recipient type is not recognised.
    InvalidRecipientType(String),
    /// A distribution must assign at least one book.
    EmptyBookSerials,
    /// The same serial was listed more than once.
    DuplicateSerial(String),
    /// The serial already belongs to a distributed book.
    SerialAlreadyAssigned(String),
    /// Distribution does not exist.
    DistributionNotFound(DistributionId),
    /// The distribution can no longer be cancelled or changed.
    DistributionLocked {
        /// The distribution identifier.
        distribution_id: DistributionId,
        /// Why the distribution is locked.
        reason: String,
    },
    /// Book does not exist.
    BookNotFound(BookId),
    /// No book carries the given serial.
    BookNumberNotFound(String),
    /// Book status is not recognised.
    InvalidBookStatus(String),
    /// The requested status change is not permitted.
    InvalidTransition {
        /// The book serial.
        book_number: String,
        /// The current status.
        from: BookStatus,
        /// The requested status.
        to: BookStatus,
    },
    /// Finalizing a book requires explicit confirmation.
    ConfirmationRequired {
        /// The book serial.
        book_number: String,
    },
    /// Page number outside the book.
    InvalidPageNumber {
        /// The invalid page number.
        page: u8,
        /// The number of pages in a book.
        max: u8,
    },
    /// Pages cannot be edited because the book has not been registered.
    BookNotRegistered {
        /// The book serial.
        book_number: String,
    },
    /// Pages cannot be edited because the book has been received.
    BookFinalized {
        /// The book serial.
        book_number: String,
    },
    /// Amount is negative, malformed, or overflows.
    InvalidAmount(String),
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Location name is empty or invalid.
    InvalidLocationName(String),
    /// Location path does not exist.
    LocationNotFound {
        /// The location path.
        path: String,
    },
    /// Location already exists under its parent.
    DuplicateLocation {
        /// The location path.
        path: String,
    },
    /// Location is referenced by existing records.
    LocationInUse {
        /// The location path.
        path: String,
        /// Number of records referencing the location.
        references: usize,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBatchName(msg) => write!(f, "Invalid batch name: {msg}"),
            Self::DuplicateBatchName(name) => write!(f, "Batch '{name}' already exists"),
            Self::InvalidBookCount { count } => {
                write!(f, "Invalid book count: {count}. Must be greater than 0")
            }
            Self::InvalidSerialRange { start, end, reason } => {
                write!(f, "Invalid serial range '{start}' - '{end}': {reason}")
            }
            Self::InvalidSerial(msg) => write!(f, "Invalid serial: {msg}"),
            Self::BatchNotFound(id) => write!(f, "Batch {id} not found"),
            Self::BatchNameNotFound(name) => write!(f, "Batch '{name}' not found"),
            Self::InvalidAllocation(msg) => write!(f, "Invalid allocation: {msg}"),
            Self::InsufficientStock {
                batch_name,
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "Batch '{batch_name}' has {remaining} books remaining, cannot allocate {requested}"
                )
            }
            Self::OverRelease {
                batch_name,
                released,
                remaining,
                total,
            } => {
                write!(
                    f,
                    "Cannot return {released} books to batch '{batch_name}': {remaining} of {total} already in stock"
                )
            }
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone: {msg}"),
            Self::InvalidAddress(msg) => write!(f, "Invalid address: {msg}"),
            Self::InvalidRecipientType(value) => write!(
                f,
                "Invalid recipient type '{value}'. Must be Individual, Center, District, or Autonomous"
            ),
            Self::EmptyBookSerials => write!(f, "At least one book must be assigned"),
            Self::DuplicateSerial(serial) => {
                write!(f, "Serial '{serial}' is listed more than once")
            }
            Self::SerialAlreadyAssigned(serial) => {
                write!(f, "Serial '{serial}' is already assigned to a book")
            }
            Self::DistributionNotFound(id) => write!(f, "Distribution {id} not found"),
            Self::DistributionLocked {
                distribution_id,
                reason,
            } => write!(f, "Distribution {distribution_id} is locked: {reason}"),
            Self::BookNotFound(id) => write!(f, "Book {id} not found"),
            Self::BookNumberNotFound(number) => write!(f, "Book '{number}' not found"),
            Self::InvalidBookStatus(value) => write!(
                f,
                "Invalid book status '{value}'. Must be Distributed, Registered, or Received"
            ),
            Self::InvalidTransition {
                book_number,
                from,
                to,
            } => write!(f, "Book '{book_number}' cannot move from {from} to {to}"),
            Self::ConfirmationRequired { book_number } => {
                write!(f, "Finalizing book '{book_number}' requires confirmation")
            }
            Self::InvalidPageNumber { page, max } => {
                write!(f, "Invalid page number: {page}. Must be between 1 and {max}")
            }
            Self::BookNotRegistered { book_number } => write!(
                f,
                "Book '{book_number}' must be registered before pages are recorded"
            ),
            Self::BookFinalized { book_number } => {
                write!(f, "Book '{book_number}' has been received and is read-only")
            }
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {msg}"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidLocationName(msg) => write!(f, "Invalid location name: {msg}"),
            Self::LocationNotFound { path } => write!(f, "Location '{path}' not found"),
            Self::DuplicateLocation { path } => write!(f, "Location '{path}' already exists"),
            Self::LocationInUse { path, references } => write!(
                f,
                "Location '{path}' is referenced by {references} record(s)"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
