// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::serial::serial_span;
use crate::types::BatchId;
use crate::validation::validate_batch_name;
use serde::{Deserialize, Serialize};
use time::Date;

/// Stock status of a print batch.
///
/// Always derived from the remaining and total counts, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    /// No book of the batch has been distributed.
    InStock,
    /// Some, but not all, books have been distributed.
    PartiallyDistributed,
    /// Every book has been distributed.
    FullyDistributed,
}

impl BatchStatus {
    /// Derives the status from stock counts.
    #[must_use]
    pub const fn from_counts(remaining: u32, total: u32) -> Self {
        if remaining == 0 {
            Self::FullyDistributed
        } else if remaining >= total {
            Self::InStock
        } else {
            Self::PartiallyDistributed
        }
    }

    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::PartiallyDistributed => "Partially Distributed",
            Self::FullyDistributed => "Fully Distributed",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A printed lot of sequentially numbered books.
///
/// `remaining_books` stays within `0..=total_books`; allocation beyond
/// the remaining stock is rejected without mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintBatch {
    id: BatchId,
    batch_name: String,
    total_books: u32,
    remaining_books: u32,
    serial_start: String,
    serial_end: String,
    printed_date: Date,
}

impl PrintBatch {
    /// Creates a new batch with its full stock on hand.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty
    /// - `total_books` is zero
    /// - The serial endpoints are empty, reversed, or span a different
    ///   number of books than `total_books`
    pub fn new(
        id: BatchId,
        batch_name: &str,
        total_books: u32,
        serial_start: &str,
        serial_end: &str,
        printed_date: Date,
    ) -> Result<Self, DomainError> {
        validate_batch_name(batch_name)?;

        if total_books == 0 {
            return Err(DomainError::InvalidBookCount { count: total_books });
        }

        let serial_start: &str = serial_start.trim();
        let serial_end: &str = serial_end.trim();
        if serial_start.is_empty() || serial_end.is_empty() {
            return Err(DomainError::InvalidSerialRange {
                start: serial_start.to_string(),
                end: serial_end.to_string(),
                reason: String::from("both serial endpoints are required"),
            });
        }

        // Endpoints without a shared numeric suffix are accepted as labels
        if let Some(span) = serial_span(serial_start, serial_end)?
            && span != u64::from(total_books)
        {
            return Err(DomainError::InvalidSerialRange {
                start: serial_start.to_string(),
                end: serial_end.to_string(),
                reason: format!("range covers {span} books but batch has {total_books}"),
            });
        }

        Ok(Self {
            id,
            batch_name: batch_name.trim().to_string(),
            total_books,
            remaining_books: total_books,
            serial_start: serial_start.to_string(),
            serial_end: serial_end.to_string(),
            printed_date,
        })
    }

    /// Returns the batch identifier.
    #[must_use]
    pub const fn id(&self) -> BatchId {
        self.id
    }

    /// Returns the batch name.
    #[must_use]
    pub fn batch_name(&self) -> &str {
        &self.batch_name
    }

    /// Returns the number of books printed.
    #[must_use]
    pub const fn total_books(&self) -> u32 {
        self.total_books
    }

    /// Returns the number of books not yet distributed.
    #[must_use]
    pub const fn remaining_books(&self) -> u32 {
        self.remaining_books
    }

    /// Returns the number of books distributed so far.
    #[must_use]
    pub const fn distributed_books(&self) -> u32 {
        self.total_books - self.remaining_books
    }

    /// Returns the first serial of the batch.
    #[must_use]
    pub fn serial_start(&self) -> &str {
        &self.serial_start
    }

    /// Returns the last serial of the batch.
    #[must_use]
    pub fn serial_end(&self) -> &str {
        &self.serial_end
    }

    /// Returns the date the batch was printed.
    #[must_use]
    pub const fn printed_date(&self) -> Date {
        self.printed_date
    }

    /// Returns the stock status derived from the current counts.
    #[must_use]
    pub const fn status(&self) -> BatchStatus {
        BatchStatus::from_counts(self.remaining_books, self.total_books)
    }

    /// Checks whether `count` books could be allocated without mutating.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero or exceeds the remaining stock.
    pub fn check_allocation(&self, count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidAllocation(String::from(
                "count must be greater than 0",
            )));
        }
        if count > self.remaining_books {
            return Err(DomainError::InsufficientStock {
                batch_name: self.batch_name.clone(),
                requested: count,
                remaining: self.remaining_books,
            });
        }
        Ok(())
    }

    /// Draws `count` books from the remaining stock.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero or exceeds the remaining stock.
    /// The batch is unchanged on error.
    pub fn allocate(&mut self, count: u32) -> Result<(), DomainError> {
        self.check_allocation(count)?;
        self.remaining_books -= count;
        Ok(())
    }

    /// Returns `count` books to the remaining stock.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero or the release would exceed the
    /// printed total. The batch is unchanged on error.
    pub fn release(&mut self, count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidAllocation(String::from(
                "count must be greater than 0",
            )));
        }
        if count > self.distributed_books() {
            return Err(DomainError::OverRelease {
                batch_name: self.batch_name.clone(),
                released: count,
                remaining: self.remaining_books,
                total: self.total_books,
            });
        }
        self.remaining_books += count;
        Ok(())
    }
}
