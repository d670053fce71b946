// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::serial::{format_serial_range, sort_serials};
use crate::types::{Address, BatchId, DistributionId, Recipient, RecipientType, non_empty};
use crate::validation::validate_recipient;
use std::collections::HashSet;
use time::Date;

/// The most books a single distribution may carry.
pub const MAX_DISTRIBUTION_BOOKS: u32 = 10_000;

/// The assignment of a set of books to a recipient.
///
/// The record owns its serial set. The source batch is referenced by id
/// and name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRecord {
    /// The record identifier.
    pub id: DistributionId,
    /// The date the books were handed over.
    pub date: Date,
    /// Who received the books.
    pub recipient: Recipient,
    /// The batch the books were drawn from, if any.
    pub batch_id: Option<BatchId>,
    /// The name of the source batch at distribution time.
    pub batch_name: Option<String>,
    book_serials: Vec<String>,
}

impl DistributionRecord {
    /// Creates a distribution record.
    ///
    /// Serials are trimmed and stored in natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The recipient fails validation
    /// - No serials are given
    /// - A serial is empty or repeated
    pub fn new(
        id: DistributionId,
        date: Date,
        recipient: Recipient,
        batch: Option<(BatchId, String)>,
        book_serials: &[String],
    ) -> Result<Self, DomainError> {
        validate_recipient(&recipient)?;
        let serials: Vec<String> = normalize_serials(book_serials)?;
        let (batch_id, batch_name): (Option<BatchId>, Option<String>) =
            batch.map_or((None, None), |(id, name)| (Some(id), Some(name)));

        Ok(Self {
            id,
            date,
            recipient,
            batch_id,
            batch_name,
            book_serials: serials,
        })
    }

    /// Returns the distributed serials in natural order.
    #[must_use]
    pub fn book_serials(&self) -> &[String] {
        &self.book_serials
    }

    /// Returns the number of books distributed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.book_serials.len()
    }

    /// Returns the display form of the serial set.
    #[must_use]
    pub fn serial_range(&self) -> String {
        format_serial_range(&self.book_serials)
    }

    /// Applies a recipient/date patch.
    ///
    /// The patched record is validated as a whole before anything changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the patched recipient fails validation.
    pub fn apply_patch(&mut self, patch: &DistributionPatch) -> Result<(), DomainError> {
        let mut recipient: Recipient = self.recipient.clone();
        if let Some(name) = &patch.name {
            recipient.name = name.trim().to_string();
        }
        if let Some(phone) = &patch.phone {
            recipient.phone = phone.trim().to_string();
        }
        if let Some(pssm_id) = &patch.pssm_id {
            recipient.pssm_id = non_empty(pssm_id);
        }
        if let Some(address) = &patch.address {
            recipient.address = address.clone();
        }
        if let Some(recipient_type) = patch.recipient_type {
            recipient.recipient_type = recipient_type;
        }
        validate_recipient(&recipient)?;

        self.recipient = recipient;
        if let Some(date) = patch.date {
            self.date = date;
        }
        Ok(())
    }
}

/// Trims, validates, and naturally sorts a serial list.
///
/// # Errors
///
/// Returns an error if the list is empty, longer than
/// [`MAX_DISTRIBUTION_BOOKS`], or contains empty or repeated serials.
pub fn normalize_serials(book_serials: &[String]) -> Result<Vec<String>, DomainError> {
    if book_serials.is_empty() {
        return Err(DomainError::EmptyBookSerials);
    }
    check_distribution_size(book_serials.len())?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut serials: Vec<String> = Vec::with_capacity(book_serials.len());
    for serial in book_serials {
        let serial: &str = serial.trim();
        if serial.is_empty() {
            return Err(DomainError::InvalidSerial(String::from(
                "serial cannot be empty",
            )));
        }
        if !seen.insert(serial) {
            return Err(DomainError::DuplicateSerial(serial.to_string()));
        }
        serials.push(serial.to_string());
    }
    sort_serials(&mut serials);
    Ok(serials)
}

/// Converts a requested book count to `u32`, rejecting counts above
/// [`MAX_DISTRIBUTION_BOOKS`].
///
/// # Errors
///
/// Returns `InvalidAllocation` if the count is too large.
pub fn check_distribution_size(count: usize) -> Result<u32, DomainError> {
    u32::try_from(count)
        .ok()
        .filter(|count| *count <= MAX_DISTRIBUTION_BOOKS)
        .ok_or_else(|| {
            DomainError::InvalidAllocation(format!(
                "at most {MAX_DISTRIBUTION_BOOKS} books can be distributed at once, got {count}"
            ))
        })
}

/// A partial update to a distribution record.
///
/// Batch, serials, and count are deliberately absent: they are fixed once
/// books have been allocated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPatch {
    /// New recipient name.
    pub name: Option<String>,
    /// New recipient phone.
    pub phone: Option<String>,
    /// New PSSM identifier; an empty string clears it.
    pub pssm_id: Option<String>,
    /// New recipient address.
    pub address: Option<Address>,
    /// New recipient classification.
    pub recipient_type: Option<RecipientType>,
    /// New distribution date.
    pub date: Option<Date>,
}

impl DistributionPatch {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.pssm_id.is_none()
            && self.address.is_none()
            && self.recipient_type.is_none()
            && self.date.is_none()
    }
}

/// Per-distribution progress computed from the books it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionProgress {
    /// Books in the distribution.
    pub count: usize,
    /// Books registered or received.
    pub registered_count: usize,
    /// Books received.
    pub submitted_count: usize,
}
