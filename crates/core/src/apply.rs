// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{CommandOutcome, Inventory, TransitionResult};
use bookdrive_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot, Subject};
use bookdrive_domain::{
    BatchId, BookId, BookStatus, DistributionId, DistributionPatch, DistributionRecord,
    DomainError, LocationCounts, LocationPath, LocationTree, PageFields, PrintBatch, ReceiverBook,
    Recipient, RecipientDetails, check_distribution_size,
};
use time::Date;

/// The parts of an audit event a command handler produces.
struct Change {
    outcome: CommandOutcome,
    subject: Subject,
    details: String,
    before: StateSnapshot,
    after: StateSnapshot,
}

/// Applies a command to the inventory and records its audit event.
///
/// Every handler validates the whole command before its first mutation,
/// so an error leaves the inventory exactly as it was.
///
/// # Arguments
///
/// * `inventory` - The inventory to change
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the outcome and the recorded audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if the command violates a domain rule or refers to a
/// record that does not exist.
pub fn apply(
    inventory: &mut Inventory,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let action_name: &'static str = command.name();
    let change: Change = match command {
        Command::CreateBatch {
            batch_name,
            total_books,
            serial_start,
            serial_end,
            printed_date,
        } => create_batch(
            inventory,
            &batch_name,
            total_books,
            &serial_start,
            &serial_end,
            printed_date,
        )?,
        Command::Distribute {
            recipient,
            batch_id,
            book_serials,
            date,
        } => distribute(inventory, recipient, batch_id, &book_serials, date)?,
        Command::UpdateDistribution {
            distribution_id,
            patch,
        } => update_distribution(inventory, distribution_id, &patch)?,
        Command::CancelDistribution { distribution_id } => {
            cancel_distribution(inventory, distribution_id)?
        }
        Command::RegisterRecipient { book_id, details } => {
            register_recipient(inventory, book_id, &details)?
        }
        Command::SavePage {
            book_id,
            page_number,
            fields,
        } => save_page(inventory, book_id, page_number, &fields)?,
        Command::FinalizeBook {
            book_id,
            confirmed,
            received_date,
        } => finalize_book(inventory, book_id, confirmed, received_date)?,
        Command::ReopenBook { book_id, reason } => reopen_book(inventory, book_id, &reason)?,
        Command::AddLocation { path } => add_location(inventory, path)?,
        Command::RenameLocation { path, new_name } => {
            rename_location(inventory, &path, &new_name)?
        }
        Command::RemoveLocation { path } => remove_location(inventory, path)?,
        Command::MergeLocations { paths } => merge_locations(inventory, &paths)?,
    };

    let audit_event: AuditEvent = inventory.record_event(AuditEvent::new(
        actor,
        cause,
        Action::new(String::from(action_name), Some(change.details)),
        change.subject,
        change.before,
        change.after,
    ));

    Ok(TransitionResult {
        outcome: change.outcome,
        audit_event,
    })
}

fn batch_snapshot(batch: &PrintBatch) -> StateSnapshot {
    StateSnapshot::new(format!(
        "remaining={},total={},status={}",
        batch.remaining_books(),
        batch.total_books(),
        batch.status()
    ))
}

fn book_snapshot(book: &ReceiverBook) -> StateSnapshot {
    StateSnapshot::new(format!(
        "status={},holder={},filled_pages={},total_amount={}",
        book.status(),
        book.assigned_to().name,
        book.filled_pages(),
        book.total_amount()
    ))
}

fn distribution_snapshot(record: &DistributionRecord) -> StateSnapshot {
    StateSnapshot::new(format!(
        "recipient={},phone={},type={},date={},books={}",
        record.recipient.name,
        record.recipient.phone,
        record.recipient.recipient_type,
        record.date,
        record.serial_range()
    ))
}

fn locations_snapshot(tree: &LocationTree) -> StateSnapshot {
    let counts: LocationCounts = tree.counts();
    StateSnapshot::new(format!(
        "states={},districts={},towns={},centers={}",
        counts.states, counts.districts, counts.towns, counts.centers
    ))
}

fn create_batch(
    inventory: &mut Inventory,
    batch_name: &str,
    total_books: u32,
    serial_start: &str,
    serial_end: &str,
    printed_date: Date,
) -> Result<Change, CoreError> {
    if inventory.find_batch_by_name(batch_name).is_some() {
        return Err(CoreError::DomainViolation(DomainError::DuplicateBatchName(
            batch_name.trim().to_string(),
        )));
    }

    let batch: PrintBatch = PrintBatch::new(
        inventory.peek_batch_id(),
        batch_name,
        total_books,
        serial_start,
        serial_end,
        printed_date,
    )?;

    let batch_id: BatchId = inventory.take_batch_id();
    let after: StateSnapshot = batch_snapshot(&batch);
    let details: String = format!(
        "Created batch '{}' with {} books ({} - {})",
        batch.batch_name(),
        batch.total_books(),
        batch.serial_start(),
        batch.serial_end()
    );
    inventory.batches.insert(batch_id, batch);

    Ok(Change {
        outcome: CommandOutcome::BatchCreated(batch_id),
        subject: Subject::Batch(batch_id),
        details,
        before: StateSnapshot::absent(),
        after,
    })
}

fn distribute(
    inventory: &mut Inventory,
    recipient: Recipient,
    batch_id: Option<BatchId>,
    book_serials: &[String],
    date: Date,
) -> Result<Change, CoreError> {
    // Size and stock are checked before any per-serial work.
    let count: u32 = check_distribution_size(book_serials.len())?;
    let batch: Option<(BatchId, String)> = match batch_id {
        Some(id) => {
            let batch: &PrintBatch = inventory.batch(id)?;
            if count > 0 {
                batch.check_allocation(count)?;
            }
            Some((id, batch.batch_name().to_string()))
        }
        None => None,
    };

    let record: DistributionRecord = DistributionRecord::new(
        inventory.peek_distribution_id(),
        date,
        recipient,
        batch,
        book_serials,
    )?;

    if let Some(serial) = record
        .book_serials()
        .iter()
        .find(|s| inventory.is_serial_assigned(s))
    {
        return Err(CoreError::DomainViolation(
            DomainError::SerialAlreadyAssigned(serial.clone()),
        ));
    }

    let before: StateSnapshot = match batch_id {
        Some(id) => batch_snapshot(inventory.batch(id)?),
        None => StateSnapshot::absent(),
    };

    // Validation complete; mutations start here
    let distribution_id: DistributionId = inventory.take_distribution_id();
    if let Some(id) = batch_id
        && let Some(batch) = inventory.batches.get_mut(&id)
    {
        batch.allocate(count)?;
    }

    let holder: RecipientDetails = RecipientDetails::from(&record.recipient);
    let mut book_ids: Vec<BookId> = Vec::with_capacity(record.count());
    for serial in record.book_serials() {
        let book_id: BookId = inventory.take_book_id();
        let book: ReceiverBook = ReceiverBook::new(
            book_id,
            serial,
            record.batch_name.clone(),
            distribution_id,
            &holder,
            date,
        );
        inventory.book_numbers.insert(serial.clone(), book_id);
        inventory.books.insert(book_id, book);
        book_ids.push(book_id);
    }

    let after: StateSnapshot = distribution_snapshot(&record);
    let details: String = format!(
        "Distributed {} book(s) {} to '{}'",
        record.count(),
        record.serial_range(),
        record.recipient.name
    );
    inventory.distributions.insert(distribution_id, record);

    Ok(Change {
        outcome: CommandOutcome::Distributed {
            distribution_id,
            book_ids,
        },
        subject: Subject::Distribution(distribution_id),
        details,
        before,
        after,
    })
}

fn update_distribution(
    inventory: &mut Inventory,
    distribution_id: DistributionId,
    patch: &DistributionPatch,
) -> Result<Change, CoreError> {
    if patch.is_empty() {
        return Err(CoreError::DomainViolation(DomainError::InvalidAllocation(
            String::from("update changes nothing"),
        )));
    }

    let current: &DistributionRecord = inventory.distribution(distribution_id)?;
    let before: StateSnapshot = distribution_snapshot(current);
    let mut updated: DistributionRecord = current.clone();
    updated.apply_patch(patch)?;

    let after: StateSnapshot = distribution_snapshot(&updated);
    let details: String = format!(
        "Updated distribution {distribution_id} for '{}'",
        updated.recipient.name
    );
    inventory.distributions.insert(distribution_id, updated);

    Ok(Change {
        outcome: CommandOutcome::DistributionUpdated(distribution_id),
        subject: Subject::Distribution(distribution_id),
        details,
        before,
        after,
    })
}

fn cancel_distribution(
    inventory: &mut Inventory,
    distribution_id: DistributionId,
) -> Result<Change, CoreError> {
    let record: &DistributionRecord = inventory.distribution(distribution_id)?;
    if let Some(book) = inventory
        .books_for_distribution(distribution_id)
        .find(|b| b.status() != BookStatus::Distributed)
    {
        return Err(CoreError::DomainViolation(DomainError::DistributionLocked {
            distribution_id,
            reason: format!("book '{}' is {}", book.book_number(), book.status()),
        }));
    }

    let count: u32 = u32::try_from(record.count()).map_err(|_| {
        DomainError::InvalidAllocation(format!("{} books is too many", record.count()))
    })?;
    let before: StateSnapshot = distribution_snapshot(record);
    let released_batch: Option<PrintBatch> = match record.batch_id {
        Some(id) => {
            let mut batch: PrintBatch = inventory.batch(id)?.clone();
            batch.release(count)?;
            Some(batch)
        }
        None => None,
    };

    // Validation complete; mutations start here
    let batch_id: Option<BatchId> = released_batch.as_ref().map(PrintBatch::id);
    let after: StateSnapshot = released_batch
        .as_ref()
        .map_or_else(StateSnapshot::absent, batch_snapshot);
    if let Some(batch) = released_batch {
        inventory.batches.insert(batch.id(), batch);
    }
    let book_ids: Vec<BookId> = inventory
        .books_for_distribution(distribution_id)
        .map(ReceiverBook::id)
        .collect();
    for book_id in book_ids {
        if let Some(book) = inventory.books.remove(&book_id) {
            inventory.book_numbers.remove(book.book_number());
        }
    }
    inventory.distributions.remove(&distribution_id);

    Ok(Change {
        outcome: CommandOutcome::DistributionCancelled {
            distribution_id,
            batch_id,
            released: count,
        },
        subject: Subject::Distribution(distribution_id),
        details: format!("Cancelled distribution {distribution_id}, released {count} book(s)"),
        before,
        after,
    })
}

/// Runs a change against a copy of one book and commits it on success.
fn change_book(
    inventory: &mut Inventory,
    book_id: BookId,
    change: impl FnOnce(&mut ReceiverBook) -> Result<String, DomainError>,
) -> Result<Change, CoreError> {
    let current: &ReceiverBook = inventory.book(book_id)?;
    let before: StateSnapshot = book_snapshot(current);
    let mut updated: ReceiverBook = current.clone();
    let details: String = change(&mut updated)?;

    let after: StateSnapshot = book_snapshot(&updated);
    inventory.books.insert(book_id, updated);

    Ok(Change {
        outcome: CommandOutcome::BookUpdated(book_id),
        subject: Subject::Book(book_id),
        details,
        before,
        after,
    })
}

fn register_recipient(
    inventory: &mut Inventory,
    book_id: BookId,
    details: &RecipientDetails,
) -> Result<Change, CoreError> {
    change_book(inventory, book_id, |book| {
        book.register(details)?;
        Ok(format!(
            "Registered book '{}' to '{}'",
            book.book_number(),
            details.name
        ))
    })
}

fn save_page(
    inventory: &mut Inventory,
    book_id: BookId,
    page_number: u8,
    fields: &PageFields,
) -> Result<Change, CoreError> {
    change_book(inventory, book_id, |book| {
        book.save_page(page_number, fields)?;
        Ok(format!(
            "Saved page {page_number} of book '{}' for donor '{}'",
            book.book_number(),
            fields.donor_name.trim()
        ))
    })
}

fn finalize_book(
    inventory: &mut Inventory,
    book_id: BookId,
    confirmed: bool,
    received_date: Date,
) -> Result<Change, CoreError> {
    change_book(inventory, book_id, |book| {
        book.finalize(confirmed, received_date)?;
        Ok(format!(
            "Received book '{}' with {} filled page(s) totalling {}",
            book.book_number(),
            book.filled_pages(),
            book.total_amount()
        ))
    })
}

fn reopen_book(inventory: &mut Inventory, book_id: BookId, reason: &str) -> Result<Change, CoreError> {
    change_book(inventory, book_id, |book| {
        book.reopen()?;
        Ok(format!("Reopened book '{}': {}", book.book_number(), reason.trim()))
    })
}

fn add_location(inventory: &mut Inventory, path: LocationPath) -> Result<Change, CoreError> {
    let before: StateSnapshot = locations_snapshot(&inventory.locations);
    inventory.locations.add(&path)?;

    Ok(Change {
        details: format!("Added {} '{path}'", path.level()),
        subject: Subject::Location(path.to_string()),
        outcome: CommandOutcome::LocationAdded(path),
        before,
        after: locations_snapshot(&inventory.locations),
    })
}

fn rename_location(
    inventory: &mut Inventory,
    path: &LocationPath,
    new_name: &str,
) -> Result<Change, CoreError> {
    let before: StateSnapshot = locations_snapshot(&inventory.locations);
    let renamed: LocationPath = inventory.locations.rename(path, new_name)?;

    let mut addresses_updated: usize = 0;
    for record in inventory.distributions.values_mut() {
        if path.rename_in_address(&mut record.recipient.address, new_name) {
            addresses_updated += 1;
        }
    }
    for book in inventory.books.values_mut() {
        if path.rename_in_address(book.address_mut(), new_name) {
            addresses_updated += 1;
        }
    }

    Ok(Change {
        details: format!("Renamed '{path}' to '{renamed}', {addresses_updated} address(es) updated"),
        subject: Subject::Location(renamed.to_string()),
        outcome: CommandOutcome::LocationRenamed {
            from: path.clone(),
            to: renamed,
            addresses_updated,
        },
        before,
        after: locations_snapshot(&inventory.locations),
    })
}

fn remove_location(inventory: &mut Inventory, path: LocationPath) -> Result<Change, CoreError> {
    if !inventory.locations.contains(&path) {
        return Err(CoreError::DomainViolation(DomainError::LocationNotFound {
            path: path.to_string(),
        }));
    }
    let references: usize = inventory.location_references(&path);
    if references > 0 {
        return Err(CoreError::DomainViolation(DomainError::LocationInUse {
            path: path.to_string(),
            references,
        }));
    }

    let before: StateSnapshot = locations_snapshot(&inventory.locations);
    inventory.locations.remove(&path)?;

    Ok(Change {
        details: format!("Removed {} '{path}'", path.level()),
        subject: Subject::Location(path.to_string()),
        outcome: CommandOutcome::LocationRemoved(path),
        before,
        after: locations_snapshot(&inventory.locations),
    })
}

fn merge_locations(inventory: &mut Inventory, paths: &[LocationPath]) -> Result<Change, CoreError> {
    let before: StateSnapshot = locations_snapshot(&inventory.locations);
    let mut merged: LocationTree = inventory.locations.clone();
    let mut created: usize = 0;
    for path in paths {
        created += merged.merge(path)?;
    }

    let after: StateSnapshot = locations_snapshot(&merged);
    inventory.locations = merged;

    Ok(Change {
        outcome: CommandOutcome::LocationsMerged { created },
        subject: Subject::Location(String::from("*")),
        details: format!("Merged {} path(s), {created} node(s) created", paths.len()),
        before,
        after,
    })
}
