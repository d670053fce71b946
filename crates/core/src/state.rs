// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bookdrive_audit::AuditEvent;
use bookdrive_domain::{
    Amount, BatchId, BookId, BookStatus, DistributionId, DistributionProgress, DistributionRecord,
    DomainError, LocationPath, LocationTree, PrintBatch, ReceiverBook, RecipientType,
};
use std::collections::{BTreeMap, HashMap};

/// The complete in-memory state of the service.
///
/// Every collection is owned here and changed only through [`crate::apply`].
/// Identifiers are assigned sequentially and never reused.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub(crate) batches: BTreeMap<BatchId, PrintBatch>,
    pub(crate) distributions: BTreeMap<DistributionId, DistributionRecord>,
    pub(crate) books: BTreeMap<BookId, ReceiverBook>,
    pub(crate) book_numbers: HashMap<String, BookId>,
    pub(crate) locations: LocationTree,
    pub(crate) audit_log: Vec<AuditEvent>,
    next_batch_id: u64,
    next_distribution_id: u64,
    next_book_id: u64,
    next_event_id: u64,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inventory seeded with a location tree.
    #[must_use]
    pub fn with_locations(locations: LocationTree) -> Self {
        Self {
            locations,
            ..Self::default()
        }
    }

    pub(crate) const fn peek_batch_id(&self) -> BatchId {
        BatchId::new(self.next_batch_id + 1)
    }

    pub(crate) const fn take_batch_id(&mut self) -> BatchId {
        self.next_batch_id += 1;
        BatchId::new(self.next_batch_id)
    }

    pub(crate) const fn peek_distribution_id(&self) -> DistributionId {
        DistributionId::new(self.next_distribution_id + 1)
    }

    pub(crate) const fn take_distribution_id(&mut self) -> DistributionId {
        self.next_distribution_id += 1;
        DistributionId::new(self.next_distribution_id)
    }

    pub(crate) const fn take_book_id(&mut self) -> BookId {
        self.next_book_id += 1;
        BookId::new(self.next_book_id)
    }

    pub(crate) fn record_event(&mut self, event: AuditEvent) -> AuditEvent {
        self.next_event_id += 1;
        let recorded: AuditEvent = event.with_event_id(self.next_event_id);
        self.audit_log.push(recorded.clone());
        recorded
    }

    /// Lists batches, most recently created first.
    #[must_use]
    pub fn batches(&self) -> Vec<&PrintBatch> {
        self.batches.values().rev().collect()
    }

    /// Looks up a batch by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BatchNotFound` if no such batch exists.
    pub fn batch(&self, batch_id: BatchId) -> Result<&PrintBatch, DomainError> {
        self.batches
            .get(&batch_id)
            .ok_or(DomainError::BatchNotFound(batch_id))
    }

    /// Finds a batch by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn find_batch_by_name(&self, batch_name: &str) -> Option<&PrintBatch> {
        let wanted: String = batch_name.trim().to_lowercase();
        self.batches
            .values()
            .find(|b| b.batch_name().to_lowercase() == wanted)
    }

    /// Looks up a batch by name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `BatchNameNotFound` if no batch has the name.
    pub fn batch_by_name(&self, batch_name: &str) -> Result<&PrintBatch, DomainError> {
        self.find_batch_by_name(batch_name)
            .ok_or_else(|| DomainError::BatchNameNotFound(batch_name.trim().to_string()))
    }

    /// Lists distributions, most recent first, optionally filtered by type.
    #[must_use]
    pub fn distributions(&self, recipient_type: Option<RecipientType>) -> Vec<&DistributionRecord> {
        self.distributions
            .values()
            .rev()
            .filter(|d| recipient_type.is_none_or(|t| d.recipient.recipient_type == t))
            .collect()
    }

    /// Looks up a distribution by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DistributionNotFound` if no such record exists.
    pub fn distribution(
        &self,
        distribution_id: DistributionId,
    ) -> Result<&DistributionRecord, DomainError> {
        self.distributions
            .get(&distribution_id)
            .ok_or(DomainError::DistributionNotFound(distribution_id))
    }

    /// Computes the registration rollups of a distribution from its books.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DistributionNotFound` if no such record exists.
    pub fn distribution_progress(
        &self,
        distribution_id: DistributionId,
    ) -> Result<DistributionProgress, DomainError> {
        let record: &DistributionRecord = self.distribution(distribution_id)?;
        let mut progress: DistributionProgress = DistributionProgress {
            count: record.count(),
            ..DistributionProgress::default()
        };
        for book in self.books_for_distribution(distribution_id) {
            if book.status().is_registered() {
                progress.registered_count += 1;
            }
            if book.status() == BookStatus::Received {
                progress.submitted_count += 1;
            }
        }
        Ok(progress)
    }

    /// Lists books, optionally filtered by status and distribution.
    #[must_use]
    pub fn books(
        &self,
        status: Option<BookStatus>,
        distribution_id: Option<DistributionId>,
    ) -> Vec<&ReceiverBook> {
        self.books
            .values()
            .filter(|b| status.is_none_or(|s| b.status() == s))
            .filter(|b| distribution_id.is_none_or(|d| b.distribution_id() == d))
            .collect()
    }

    /// Lists the books created by one distribution.
    pub fn books_for_distribution(
        &self,
        distribution_id: DistributionId,
    ) -> impl Iterator<Item = &ReceiverBook> {
        self.books
            .values()
            .filter(move |b| b.distribution_id() == distribution_id)
    }

    /// Looks up a book by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BookNotFound` if no such book exists.
    pub fn book(&self, book_id: BookId) -> Result<&ReceiverBook, DomainError> {
        self.books
            .get(&book_id)
            .ok_or(DomainError::BookNotFound(book_id))
    }

    /// Finds a book by its serial.
    #[must_use]
    pub fn find_book_by_number(&self, book_number: &str) -> Option<&ReceiverBook> {
        self.book_numbers
            .get(book_number.trim())
            .and_then(|id| self.books.get(id))
    }

    /// Looks up a book by its serial.
    ///
    /// # Errors
    ///
    /// Returns `BookNumberNotFound` if no book has the serial.
    pub fn book_by_number(&self, book_number: &str) -> Result<&ReceiverBook, DomainError> {
        self.find_book_by_number(book_number)
            .ok_or_else(|| DomainError::BookNumberNotFound(book_number.trim().to_string()))
    }

    /// Returns whether a serial already belongs to a book.
    #[must_use]
    pub fn is_serial_assigned(&self, serial: &str) -> bool {
        self.book_numbers.contains_key(serial.trim())
    }

    /// Returns the location hierarchy.
    #[must_use]
    pub const fn locations(&self) -> &LocationTree {
        &self.locations
    }

    /// Counts distribution and book addresses at or below a location.
    #[must_use]
    pub fn location_references(&self, path: &LocationPath) -> usize {
        let distributions: usize = self
            .distributions
            .values()
            .filter(|d| path.contains_address(&d.recipient.address))
            .count();
        let books: usize = self
            .books
            .values()
            .filter(|b| path.contains_address(b.address()))
            .count();
        distributions + books
    }

    /// Returns every recorded audit event, oldest first.
    #[must_use]
    pub fn audit_log(&self) -> &[AuditEvent] {
        &self.audit_log
    }

    /// Computes inventory-wide totals.
    #[must_use]
    pub fn summary(&self) -> InventorySummary {
        let mut summary: InventorySummary = InventorySummary {
            batches: self.batches.len(),
            distributions: self.distributions.len(),
            ..InventorySummary::default()
        };
        for batch in self.batches.values() {
            summary.printed_books += u64::from(batch.total_books());
            summary.remaining_books += u64::from(batch.remaining_books());
        }
        for book in self.books.values() {
            match book.status() {
                BookStatus::Distributed => summary.books_distributed += 1,
                BookStatus::Registered => summary.books_registered += 1,
                BookStatus::Received => summary.books_received += 1,
            }
            summary.collected = summary
                .collected
                .checked_add(book.total_amount())
                .unwrap_or(summary.collected);
        }
        summary
    }
}

/// Inventory-wide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventorySummary {
    /// Number of batches.
    pub batches: usize,
    /// Books printed across all batches.
    pub printed_books: u64,
    /// Books still in stock across all batches.
    pub remaining_books: u64,
    /// Number of distribution records.
    pub distributions: usize,
    /// Books not yet registered.
    pub books_distributed: usize,
    /// Books registered and not yet received.
    pub books_registered: usize,
    /// Books received.
    pub books_received: usize,
    /// Sum of all filled page amounts.
    pub collected: Amount,
}

/// What a successful command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A batch was created.
    BatchCreated(BatchId),
    /// Books were distributed.
    Distributed {
        /// The new distribution record.
        distribution_id: DistributionId,
        /// The books created, in serial order.
        book_ids: Vec<BookId>,
    },
    /// A distribution was corrected.
    DistributionUpdated(DistributionId),
    /// A distribution was cancelled.
    DistributionCancelled {
        /// The removed record.
        distribution_id: DistributionId,
        /// The batch that got its stock back, if any.
        batch_id: Option<BatchId>,
        /// The number of books released.
        released: u32,
    },
    /// A book changed.
    BookUpdated(BookId),
    /// A location was added.
    LocationAdded(LocationPath),
    /// A location was renamed.
    LocationRenamed {
        /// The old path.
        from: LocationPath,
        /// The new path.
        to: LocationPath,
        /// Number of addresses rewritten.
        addresses_updated: usize,
    },
    /// A location was removed.
    LocationRemoved(LocationPath),
    /// Locations were merged.
    LocationsMerged {
        /// Number of nodes created.
        created: usize,
    },
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// What changed.
    pub outcome: CommandOutcome,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
