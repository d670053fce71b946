// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bookdrive_domain::{
    BatchId, BookId, DistributionId, DistributionPatch, LocationPath, PageFields, Recipient,
    RecipientDetails,
};
use time::Date;

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a newly printed batch.
    CreateBatch {
        /// The batch display name.
        batch_name: String,
        /// The number of books printed.
        total_books: u32,
        /// The first serial of the batch.
        serial_start: String,
        /// The last serial of the batch.
        serial_end: String,
        /// The date the batch was printed.
        printed_date: Date,
    },
    /// Hand a set of books to a recipient.
    Distribute {
        /// Who receives the books.
        recipient: Recipient,
        /// The batch the books are drawn from, if any.
        batch_id: Option<BatchId>,
        /// The serials of the books handed over.
        book_serials: Vec<String>,
        /// The date of the hand-over.
        date: Date,
    },
    /// Correct the recipient or date of a distribution.
    UpdateDistribution {
        /// The distribution to update.
        distribution_id: DistributionId,
        /// The fields to change.
        patch: DistributionPatch,
    },
    /// Undo a distribution whose books are all still unregistered.
    CancelDistribution {
        /// The distribution to cancel.
        distribution_id: DistributionId,
    },
    /// Record the person responsible for a book.
    RegisterRecipient {
        /// The book to register.
        book_id: BookId,
        /// The responsible person.
        details: RecipientDetails,
    },
    /// Fill one donor page of a book.
    SavePage {
        /// The book being filled.
        book_id: BookId,
        /// The page number, 1-based.
        page_number: u8,
        /// The donor details.
        fields: PageFields,
    },
    /// Mark a book as received.
    FinalizeBook {
        /// The book to finalize.
        book_id: BookId,
        /// Explicit confirmation from the operator.
        confirmed: bool,
        /// The date the book was turned in.
        received_date: Date,
    },
    /// Return a received book to the Registered state.
    ReopenBook {
        /// The book to reopen.
        book_id: BookId,
        /// Why the book is being reopened.
        reason: String,
    },
    /// Add one location node under an existing parent.
    AddLocation {
        /// The node to add.
        path: LocationPath,
    },
    /// Rename a location node and every address referencing it.
    RenameLocation {
        /// The node to rename.
        path: LocationPath,
        /// The new node name.
        new_name: String,
    },
    /// Remove an unreferenced location node.
    RemoveLocation {
        /// The node to remove.
        path: LocationPath,
    },
    /// Merge a set of paths into the tree, creating whatever is missing.
    MergeLocations {
        /// The paths to merge.
        paths: Vec<LocationPath>,
    },
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateBatch { .. } => "CreateBatch",
            Self::Distribute { .. } => "Distribute",
            Self::UpdateDistribution { .. } => "UpdateDistribution",
            Self::CancelDistribution { .. } => "CancelDistribution",
            Self::RegisterRecipient { .. } => "RegisterRecipient",
            Self::SavePage { .. } => "SavePage",
            Self::FinalizeBook { .. } => "FinalizeBook",
            Self::ReopenBook { .. } => "ReopenBook",
            Self::AddLocation { .. } => "AddLocation",
            Self::RenameLocation { .. } => "RenameLocation",
            Self::RemoveLocation { .. } => "RemoveLocation",
            Self::MergeLocations { .. } => "MergeLocations",
        }
    }
}
