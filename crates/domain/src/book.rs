// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Address, Amount, BookId, DistributionId, RecipientDetails, non_empty};
use crate::validation::{validate_page_number, validate_recipient_details};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::Date;

/// Number of donor pages in every book.
pub const TOTAL_PAGES: u8 = 20;

/// Lifecycle status of a single book in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookStatus {
    /// Handed to a recipient, nobody registered as responsible yet.
    #[default]
    Distributed,
    /// A responsible person has been recorded. Pages may be filled.
    Registered,
    /// Pages and funds have been turned in. Read-only.
    Received,
}

impl FromStr for BookStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "distributed" => Ok(Self::Distributed),
            "registered" => Ok(Self::Registered),
            "received" | "submitted" => Ok(Self::Received),
            _ => Err(DomainError::InvalidBookStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BookStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Distributed => "Distributed",
            Self::Registered => "Registered",
            Self::Received => "Received",
        }
    }

    /// Checks if a forward transition from this status is valid.
    ///
    /// Valid transitions are:
    /// - Distributed → Registered
    /// - Registered → Registered (correcting the responsible person)
    /// - Registered → Received
    ///
    /// Received → Registered is only reachable through an explicit reopen.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Distributed | Self::Registered, Self::Registered)
                | (Self::Registered, Self::Received)
        )
    }

    /// Returns whether the book counts as registered for rollups.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Registered | Self::Received)
    }
}

/// Donor details written on one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageFields {
    /// The donor's name.
    pub donor_name: String,
    /// The donor's phone number.
    pub donor_phone: Option<String>,
    /// The donor's address.
    pub donor_address: Option<String>,
    /// The receipt number written on the page.
    pub receipt_number: Option<String>,
    /// The amount donated; defaults to zero.
    pub amount: Option<Amount>,
    /// The donation date.
    pub date: Option<Date>,
}

/// One donor slot in a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    /// Page number, 1-based.
    pub page_number: u8,
    /// The donor's name.
    pub donor_name: String,
    /// The donor's phone number.
    pub donor_phone: Option<String>,
    /// The donor's address.
    pub donor_address: Option<String>,
    /// The receipt number written on the page.
    pub receipt_number: Option<String>,
    /// The amount donated.
    pub amount: Amount,
    /// Whether the page has been filled.
    pub is_filled: bool,
    /// The donation date.
    pub date: Option<Date>,
}

/// The person a book is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    /// The person's name.
    pub name: String,
    /// The person's phone number.
    pub phone: String,
    /// Optional PSSM membership identifier.
    pub pssm_id: Option<String>,
}

/// One physical book in the field.
///
/// `filled_pages` and `total_amount` are recomputed from the page map on
/// every save, so saving the same page twice never double counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverBook {
    id: BookId,
    book_number: String,
    batch_name: Option<String>,
    distribution_id: DistributionId,
    status: BookStatus,
    assigned_to: Assignee,
    address: Address,
    pages: BTreeMap<u8, BookPage>,
    filled_pages: u8,
    total_amount: Amount,
    assigned_date: Date,
    received_date: Option<Date>,
}

impl ReceiverBook {
    /// Creates a book in the Distributed state.
    #[must_use]
    pub fn new(
        id: BookId,
        book_number: &str,
        batch_name: Option<String>,
        distribution_id: DistributionId,
        holder: &RecipientDetails,
        assigned_date: Date,
    ) -> Self {
        Self {
            id,
            book_number: book_number.trim().to_string(),
            batch_name,
            distribution_id,
            status: BookStatus::Distributed,
            assigned_to: Assignee {
                name: holder.name.clone(),
                phone: holder.phone.clone(),
                pssm_id: holder.pssm_id.clone(),
            },
            address: holder.address.clone(),
            pages: BTreeMap::new(),
            filled_pages: 0,
            total_amount: Amount::ZERO,
            assigned_date,
            received_date: None,
        }
    }

    /// Returns the book identifier.
    #[must_use]
    pub const fn id(&self) -> BookId {
        self.id
    }

    /// Returns the book serial.
    #[must_use]
    pub fn book_number(&self) -> &str {
        &self.book_number
    }

    /// Returns the source batch name, if any.
    #[must_use]
    pub fn batch_name(&self) -> Option<&str> {
        self.batch_name.as_deref()
    }

    /// Returns the distribution that created this book.
    #[must_use]
    pub const fn distribution_id(&self) -> DistributionId {
        self.distribution_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> BookStatus {
        self.status
    }

    /// Returns the person the book is assigned to.
    #[must_use]
    pub const fn assigned_to(&self) -> &Assignee {
        &self.assigned_to
    }

    /// Returns the holder's address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the holder's address for in-place location renames.
    pub const fn address_mut(&mut self) -> &mut Address {
        &mut self.address
    }

    /// Returns the filled pages in page order.
    pub fn pages(&self) -> impl Iterator<Item = &BookPage> {
        self.pages.values()
    }

    /// Returns a single page, if it has been filled.
    #[must_use]
    pub fn page(&self, page_number: u8) -> Option<&BookPage> {
        self.pages.get(&page_number)
    }

    /// Returns the number of pages in the book.
    #[must_use]
    pub const fn total_pages(&self) -> u8 {
        TOTAL_PAGES
    }

    /// Returns the number of filled pages.
    #[must_use]
    pub const fn filled_pages(&self) -> u8 {
        self.filled_pages
    }

    /// Returns the sum of amounts over filled pages.
    #[must_use]
    pub const fn total_amount(&self) -> Amount {
        self.total_amount
    }

    /// Returns the assignment date.
    #[must_use]
    pub const fn assigned_date(&self) -> Date {
        self.assigned_date
    }

    /// Returns the date the book was received, if finalized.
    #[must_use]
    pub const fn received_date(&self) -> Option<Date> {
        self.received_date
    }

    /// Records the person responsible for the book's pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the details are invalid or the book has been received.
    pub fn register(&mut self, details: &RecipientDetails) -> Result<(), DomainError> {
        self.ensure_transition(BookStatus::Registered)?;
        validate_recipient_details(details)?;

        self.assigned_to = Assignee {
            name: details.name.clone(),
            phone: details.phone.clone(),
            pssm_id: details.pssm_id.clone(),
        };
        self.address = details.address.clone();
        self.status = BookStatus::Registered;
        Ok(())
    }

    /// Marks the book as received.
    ///
    /// # Errors
    ///
    /// Returns an error if `confirmed` is false or the book is not registered.
    pub fn finalize(&mut self, confirmed: bool, received_date: Date) -> Result<(), DomainError> {
        self.ensure_transition(BookStatus::Received)?;
        if !confirmed {
            return Err(DomainError::ConfirmationRequired {
                book_number: self.book_number.clone(),
            });
        }
        self.status = BookStatus::Received;
        self.received_date = Some(received_date);
        Ok(())
    }

    /// Moves a received book back to Registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the book is not received.
    pub fn reopen(&mut self) -> Result<(), DomainError> {
        if self.status != BookStatus::Received {
            return Err(DomainError::InvalidTransition {
                book_number: self.book_number.clone(),
                from: self.status,
                to: BookStatus::Registered,
            });
        }
        self.status = BookStatus::Registered;
        self.received_date = None;
        Ok(())
    }

    /// Checks whether a page could be saved without mutating.
    ///
    /// # Errors
    ///
    /// Returns an error if the page number is out of range, the book is not
    /// in the Registered state, or the donor name is empty.
    pub fn check_page(&self, page_number: u8, fields: &PageFields) -> Result<(), DomainError> {
        validate_page_number(page_number)?;
        match self.status {
            BookStatus::Distributed => {
                return Err(DomainError::BookNotRegistered {
                    book_number: self.book_number.clone(),
                });
            }
            BookStatus::Received => {
                return Err(DomainError::BookFinalized {
                    book_number: self.book_number.clone(),
                });
            }
            BookStatus::Registered => {}
        }
        if fields.donor_name.trim().is_empty() {
            return Err(DomainError::InvalidName(String::from(
                "Donor name cannot be empty",
            )));
        }
        Ok(())
    }

    /// Saves one donor page, replacing any earlier content of that page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be saved. The book is unchanged
    /// on error.
    pub fn save_page(&mut self, page_number: u8, fields: &PageFields) -> Result<(), DomainError> {
        self.check_page(page_number, fields)?;

        let page: BookPage = BookPage {
            page_number,
            donor_name: fields.donor_name.trim().to_string(),
            donor_phone: fields.donor_phone.as_deref().and_then(non_empty),
            donor_address: fields.donor_address.as_deref().and_then(non_empty),
            receipt_number: fields.receipt_number.as_deref().and_then(non_empty),
            amount: fields.amount.unwrap_or(Amount::ZERO),
            is_filled: true,
            date: fields.date,
        };

        let mut pages: BTreeMap<u8, BookPage> = self.pages.clone();
        pages.insert(page_number, page);
        let (filled_pages, total_amount): (u8, Amount) = totals(&pages)?;

        self.pages = pages;
        self.filled_pages = filled_pages;
        self.total_amount = total_amount;
        Ok(())
    }

    fn ensure_transition(&self, target: BookStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                book_number: self.book_number.clone(),
                from: self.status,
                to: target,
            })
        }
    }
}

/// Counts filled pages and sums their amounts.
fn totals(pages: &BTreeMap<u8, BookPage>) -> Result<(u8, Amount), DomainError> {
    let mut filled: u8 = 0;
    let mut total: Amount = Amount::ZERO;
    for page in pages.values().filter(|p| p.is_filled) {
        filled += 1;
        total = total.checked_add(page.amount)?;
    }
    Ok((filled, total))
}
