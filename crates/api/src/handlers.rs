// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Each mutating handler authorizes the actor, translates the request into
//! a `Command`, applies it to the inventory, and shapes the outcome into a
//! response DTO. Read handlers are open to every role.

use bookdrive::{Command, CommandOutcome, Inventory, InventorySummary, TransitionResult, apply};
use bookdrive_audit::{Actor, AuditEvent, Cause};
use bookdrive_domain::{
    Address, Amount, BatchId, BookId, BookPage, BookStatus, DistributionId, DistributionPatch,
    DistributionProgress, DistributionRecord, LocationLevel, LocationPath, LocationTree,
    PageFields, PrintBatch, ReceiverBook, Recipient, RecipientDetails, RecipientType,
    expand_serials, format_date, parse_date,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService, Session, SessionStore};
use crate::csv_import::{
    BatchRow, CsvPreviewResult, CsvRowResult, CsvRowStatus, DistributionRow, RegistrationRow,
    preview_batches, preview_distributions, preview_registrations,
};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::location_import::parse_location_json;
use crate::request_response::{
    AddressInfo, AssigneeInfo, AuditEventInfo, AuditLogResponse, BatchInfo, BookDetailResponse,
    BookInfo, BookUpdateResponse, CancelDistributionResponse, CreateBatchRequest,
    CreateBatchResponse, CreateDistributionRequest, CreateDistributionResponse,
    CsvImportRequest, CsvImportResponse, CsvImportRowResult, CsvImportRowStatus, CsvPreviewResponse,
    CsvPreviewRow, CsvPreviewRowStatus, DistributionInfo, FinalizeBookRequest,
    ImportLocationsRequest, ImportLocationsResponse, ListBatchesResponse, ListBooksResponse,
    ListDistributionsResponse, LocationChangeResponse, LocationNode, LocationRequest,
    LocationsResponse, LoginRequest, LoginResponse, PageInfo, RegisterRecipientRequest,
    RenameLocationRequest, RenameLocationResponse, ReopenBookRequest, SavePageRequest,
    SummaryResponse, UpdateDistributionRequest, UpdateDistributionResponse, WhoAmIResponse,
};

/// Result of an API operation that includes both the response and the audit event.
#[derive(Debug, Clone)]
pub struct ApiResult<T> {
    /// The API response.
    pub response: T,
    /// The audit event generated by this operation.
    pub audit_event: AuditEvent,
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn parse_optional_date(value: Option<&str>) -> Result<Date, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v).map_err(translate_domain_error),
        None => Ok(today()),
    }
}

fn unexpected_outcome(outcome: &CommandOutcome) -> ApiError {
    ApiError::Internal {
        message: format!("Unexpected command outcome: {outcome:?}"),
    }
}

fn to_location_path(request: &LocationRequest) -> Result<LocationPath, ApiError> {
    LocationPath::from_parts(
        &request.state,
        request.district.as_deref(),
        request.town.as_deref(),
        request.center.as_deref(),
    )
    .map_err(translate_domain_error)
}

fn run(
    inventory: &mut Inventory,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TransitionResult, ApiError> {
    let actor: Actor = authenticated_actor.to_audit_actor();
    let name: &'static str = command.name();
    apply(inventory, command, actor, cause).map_err(|e| {
        warn!(command = name, actor = %authenticated_actor.id, error = %e, "Command rejected");
        translate_core_error(e)
    })
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Opens a session.
///
/// # Errors
///
/// Returns an error if the login name is empty or the role is unknown.
pub fn login(sessions: &mut SessionStore, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    let session: Session = sessions.login(&request.login_name, &request.role)?;
    info!(login_name = %session.login_name, role = %session.role, "Opened session");
    Ok(LoginResponse {
        session_token: session.token,
        login_name: session.login_name,
        role: session.role.as_str().to_string(),
    })
}

/// Closes a session.
///
/// # Errors
///
/// Returns an error if the token does not name an open session.
pub fn logout(sessions: &mut SessionStore, session_token: &str) -> Result<(), ApiError> {
    let session: Session = sessions.logout(session_token)?;
    info!(login_name = %session.login_name, "Closed session");
    Ok(())
}

/// Returns the operator behind a session.
///
/// # Errors
///
/// Returns an error if the token does not name an open session.
pub fn whoami(sessions: &SessionStore, session_token: &str) -> Result<WhoAmIResponse, ApiError> {
    let (_, session): (AuthenticatedActor, &Session) = sessions.validate(session_token)?;
    Ok(WhoAmIResponse {
        login_name: session.login_name.clone(),
        role: session.role.as_str().to_string(),
        logged_in_at: session.created_at.clone(),
    })
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// Builds the API view of a batch.
#[must_use]
pub fn batch_info(batch: &PrintBatch) -> BatchInfo {
    BatchInfo {
        batch_id: batch.id().value(),
        batch_name: batch.batch_name().to_string(),
        total_books: batch.total_books(),
        remaining_books: batch.remaining_books(),
        distributed_books: batch.distributed_books(),
        serial_start: batch.serial_start().to_string(),
        serial_end: batch.serial_end().to_string(),
        printed_date: format_date(batch.printed_date()),
        status: batch.status().as_str().to_string(),
    }
}

/// Registers a printed batch.
///
/// # Arguments
///
/// * `inventory` - The inventory to change
/// * `request` - The batch to create
/// * `authenticated_actor` - The operator performing the action
/// * `cause` - The reason for the action
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a Super Admin or Distributor
/// - The date cannot be parsed
/// - The name is empty or taken, the count is zero, or the serial range
///   does not match the count
pub fn create_batch(
    inventory: &mut Inventory,
    request: &CreateBatchRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CreateBatchResponse>, ApiError> {
    AuthorizationService::authorize_create_batch(authenticated_actor)?;

    let printed_date: Date = parse_date(&request.printed_date).map_err(translate_domain_error)?;
    let command: Command = Command::CreateBatch {
        batch_name: request.batch_name.clone(),
        total_books: request.total_books,
        serial_start: request.serial_start.clone(),
        serial_end: request.serial_end.clone(),
        printed_date,
    };
    let result: TransitionResult = run(inventory, command, authenticated_actor, cause)?;

    let CommandOutcome::BatchCreated(batch_id) = result.outcome else {
        return Err(unexpected_outcome(&result.outcome));
    };
    let batch: BatchInfo = batch_info(inventory.batch(batch_id).map_err(translate_domain_error)?);
    info!(batch_id = batch.batch_id, batch_name = %batch.batch_name, total_books = batch.total_books, "Created batch");

    Ok(ApiResult {
        response: CreateBatchResponse {
            message: format!(
                "Created batch '{}' with {} books",
                batch.batch_name, batch.total_books
            ),
            batch,
        },
        audit_event: result.audit_event,
    })
}

/// Lists batches, newest first.
#[must_use]
pub fn list_batches(inventory: &Inventory) -> ListBatchesResponse {
    ListBatchesResponse {
        batches: inventory.batches().into_iter().map(batch_info).collect(),
    }
}

/// Looks up one batch.
///
/// # Errors
///
/// Returns an error if the batch does not exist.
pub fn get_batch(inventory: &Inventory, batch_id: u64) -> Result<BatchInfo, ApiError> {
    inventory
        .batch(BatchId::new(batch_id))
        .map(batch_info)
        .map_err(translate_domain_error)
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Builds the API view of a distribution, including its computed rollups.
///
/// # Errors
///
/// Returns an error if the record is not part of the inventory.
pub fn distribution_info(
    inventory: &Inventory,
    record: &DistributionRecord,
) -> Result<DistributionInfo, ApiError> {
    let progress: DistributionProgress = inventory
        .distribution_progress(record.id)
        .map_err(translate_domain_error)?;
    Ok(DistributionInfo {
        distribution_id: record.id.value(),
        date: format_date(record.date),
        name: record.recipient.name.clone(),
        phone: record.recipient.phone.clone(),
        pssm_id: record.recipient.pssm_id.clone(),
        recipient_type: record.recipient.recipient_type.as_str().to_string(),
        address: AddressInfo::from(&record.recipient.address),
        batch_id: record.batch_id.map(|id| id.value()),
        batch_name: record.batch_name.clone(),
        book_serials: record.book_serials().to_vec(),
        serial_range: record.serial_range(),
        count: progress.count,
        registered_count: progress.registered_count,
        submitted_count: progress.submitted_count,
    })
}

/// Hands books to a recipient.
///
/// When a batch is named, its stock is drawn down by the number of serials
/// in the same step; a shortfall rejects the whole distribution. A
/// `first_serial` and `count` pair is checked against stock before the run
/// is expanded.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not distribute
/// - No serials are given, a serial repeats, or a serial is already assigned
/// - The recipient is invalid
/// - The batch does not exist or lacks stock
pub fn create_distribution(
    inventory: &mut Inventory,
    request: &CreateDistributionRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CreateDistributionResponse>, ApiError> {
    AuthorizationService::authorize_distribute(authenticated_actor)?;

    let recipient_type: RecipientType = request
        .recipient
        .recipient_type
        .parse()
        .map_err(translate_domain_error)?;
    let recipient: Recipient = Recipient::new(
        &request.recipient.name,
        &request.recipient.phone,
        request.recipient.pssm_id.as_deref(),
        Address::from(&request.recipient.address),
        recipient_type,
    );

    let book_serials: Vec<String> = match (&request.first_serial, request.count) {
        (Some(first), Some(count)) if request.book_serials.is_empty() => {
            if let Some(batch_id) = request.batch_id {
                inventory
                    .batch(BatchId::new(batch_id))
                    .and_then(|batch| batch.check_allocation(count))
                    .map_err(translate_domain_error)?;
            }
            expand_serials(first, count).map_err(translate_domain_error)?
        }
        _ => request.book_serials.clone(),
    };
    let date: Date = parse_optional_date(request.date.as_deref())?;

    let command: Command = Command::Distribute {
        recipient,
        batch_id: request.batch_id.map(BatchId::new),
        book_serials,
        date,
    };
    let result: TransitionResult = run(inventory, command, authenticated_actor, cause)?;

    let CommandOutcome::Distributed {
        distribution_id,
        book_ids,
    } = &result.outcome
    else {
        return Err(unexpected_outcome(&result.outcome));
    };
    let record: &DistributionRecord = inventory
        .distribution(*distribution_id)
        .map_err(translate_domain_error)?;
    let distribution: DistributionInfo = distribution_info(inventory, record)?;
    let batch_remaining: Option<u32> = record
        .batch_id
        .and_then(|id| inventory.batch(id).ok())
        .map(PrintBatch::remaining_books);
    info!(
        distribution_id = distribution.distribution_id,
        count = distribution.count,
        recipient = %distribution.name,
        batch_remaining = ?batch_remaining,
        "Created distribution"
    );

    Ok(ApiResult {
        response: CreateDistributionResponse {
            message: format!(
                "Distributed {} book(s) to '{}'",
                distribution.count, distribution.name
            ),
            book_ids: book_ids.iter().map(BookId::value).collect(),
            batch_remaining,
            distribution,
        },
        audit_event: result.audit_event,
    })
}

/// Lists distributions, newest first.
///
/// # Errors
///
/// Returns an error if the recipient type filter is not recognised.
pub fn list_distributions(
    inventory: &Inventory,
    recipient_type: Option<&str>,
) -> Result<ListDistributionsResponse, ApiError> {
    let filter: Option<RecipientType> = recipient_type
        .map(str::parse::<RecipientType>)
        .transpose()
        .map_err(translate_domain_error)?;
    let distributions: Vec<DistributionInfo> = inventory
        .distributions(filter)
        .into_iter()
        .map(|record| distribution_info(inventory, record))
        .collect::<Result<Vec<DistributionInfo>, ApiError>>()?;
    Ok(ListDistributionsResponse { distributions })
}

/// Looks up one distribution.
///
/// # Errors
///
/// Returns an error if the distribution does not exist.
pub fn get_distribution(
    inventory: &Inventory,
    distribution_id: u64,
) -> Result<DistributionInfo, ApiError> {
    let record: &DistributionRecord = inventory
        .distribution(DistributionId::new(distribution_id))
        .map_err(translate_domain_error)?;
    distribution_info(inventory, record)
}

/// Corrects the recipient or date of a distribution.
///
/// # Errors
///
/// Returns an error if the actor may not distribute, the distribution does
/// not exist, the patch is empty, or a changed field is invalid.
pub fn update_distribution(
    inventory: &mut Inventory,
    distribution_id: u64,
    request: &UpdateDistributionRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<UpdateDistributionResponse>, ApiError> {
    AuthorizationService::authorize_distribute(authenticated_actor)?;

    let patch: DistributionPatch = DistributionPatch {
        name: request.name.clone(),
        phone: request.phone.clone(),
        pssm_id: request.pssm_id.clone(),
        address: request.address.as_ref().map(Address::from),
        recipient_type: request
            .recipient_type
            .as_deref()
            .map(str::parse::<RecipientType>)
            .transpose()
            .map_err(translate_domain_error)?,
        date: request
            .date
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(translate_domain_error)?,
    };
    let distribution_id: DistributionId = DistributionId::new(distribution_id);
    let result: TransitionResult = run(
        inventory,
        Command::UpdateDistribution {
            distribution_id,
            patch,
        },
        authenticated_actor,
        cause,
    )?;

    let distribution: DistributionInfo = get_distribution(inventory, distribution_id.value())?;
    info!(distribution_id = distribution.distribution_id, "Updated distribution");
    Ok(ApiResult {
        response: UpdateDistributionResponse {
            message: format!("Updated distribution {}", distribution.distribution_id),
            distribution,
        },
        audit_event: result.audit_event,
    })
}

/// Cancels a distribution whose books are all still unregistered.
///
/// # Errors
///
/// Returns an error if the actor may not distribute, the distribution does
/// not exist, or any of its books has moved past Distributed.
pub fn cancel_distribution(
    inventory: &mut Inventory,
    distribution_id: u64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CancelDistributionResponse>, ApiError> {
    AuthorizationService::authorize_distribute(authenticated_actor)?;

    let result: TransitionResult = run(
        inventory,
        Command::CancelDistribution {
            distribution_id: DistributionId::new(distribution_id),
        },
        authenticated_actor,
        cause,
    )?;
    let CommandOutcome::DistributionCancelled {
        distribution_id,
        batch_id,
        released,
    } = result.outcome
    else {
        return Err(unexpected_outcome(&result.outcome));
    };
    info!(distribution_id = %distribution_id, released = released, "Cancelled distribution");

    Ok(ApiResult {
        response: CancelDistributionResponse {
            distribution_id: distribution_id.value(),
            batch_id: batch_id.map(|id| id.value()),
            released,
            message: format!(
                "Cancelled distribution {distribution_id}; {released} book(s) returned to stock"
            ),
        },
        audit_event: result.audit_event,
    })
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

/// Builds the API view of a book.
#[must_use]
pub fn book_info(book: &ReceiverBook) -> BookInfo {
    BookInfo {
        book_id: book.id().value(),
        book_number: book.book_number().to_string(),
        batch_name: book.batch_name().map(str::to_string),
        distribution_id: book.distribution_id().value(),
        status: book.status().as_str().to_string(),
        assigned_to: AssigneeInfo {
            name: book.assigned_to().name.clone(),
            phone: book.assigned_to().phone.clone(),
            pssm_id: book.assigned_to().pssm_id.clone(),
        },
        address: AddressInfo::from(book.address()),
        total_pages: book.total_pages(),
        filled_pages: book.filled_pages(),
        total_amount: book.total_amount().to_string(),
        assigned_date: format_date(book.assigned_date()),
        received_date: book.received_date().map(format_date),
    }
}

fn page_info(page: &BookPage) -> PageInfo {
    PageInfo {
        page_number: page.page_number,
        donor_name: page.donor_name.clone(),
        donor_phone: page.donor_phone.clone(),
        donor_address: page.donor_address.clone(),
        receipt_number: page.receipt_number.clone(),
        amount: page.amount.to_string(),
        is_filled: page.is_filled,
        date: page.date.map(format_date),
    }
}

/// Lists books, optionally filtered by status and distribution.
///
/// # Errors
///
/// Returns an error if the status filter is not recognised.
pub fn list_books(
    inventory: &Inventory,
    status: Option<&str>,
    distribution_id: Option<u64>,
) -> Result<ListBooksResponse, ApiError> {
    let status: Option<BookStatus> = status
        .map(str::parse::<BookStatus>)
        .transpose()
        .map_err(translate_domain_error)?;
    Ok(ListBooksResponse {
        books: inventory
            .books(status, distribution_id.map(DistributionId::new))
            .into_iter()
            .map(book_info)
            .collect(),
    })
}

/// Looks up one book with its pages.
///
/// # Errors
///
/// Returns an error if the book does not exist.
pub fn get_book(inventory: &Inventory, book_id: u64) -> Result<BookDetailResponse, ApiError> {
    let book: &ReceiverBook = inventory
        .book(BookId::new(book_id))
        .map_err(translate_domain_error)?;
    Ok(BookDetailResponse {
        book: book_info(book),
        pages: book.pages().map(page_info).collect(),
    })
}

fn change_book(
    inventory: &mut Inventory,
    book_id: BookId,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<BookUpdateResponse>, ApiError> {
    let previous: BookStatus = inventory
        .book(book_id)
        .map_err(translate_domain_error)?
        .status();
    let action: &'static str = command.name();
    let result: TransitionResult = run(inventory, command, authenticated_actor, cause)?;
    let book: BookInfo = book_info(inventory.book(book_id).map_err(translate_domain_error)?);
    info!(
        book_number = %book.book_number,
        action = action,
        from = %previous,
        to = %book.status,
        "Updated book"
    );

    Ok(ApiResult {
        response: BookUpdateResponse {
            message: format!("Book '{}' is {}", book.book_number, book.status),
            previous_status: previous.as_str().to_string(),
            book,
        },
        audit_event: result.audit_event,
    })
}

/// Records the person responsible for a book.
///
/// # Errors
///
/// Returns an error if the actor may not register, the book does not
/// exist or has been received, or the details are invalid.
pub fn register_recipient(
    inventory: &mut Inventory,
    book_id: u64,
    request: &RegisterRecipientRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<BookUpdateResponse>, ApiError> {
    AuthorizationService::authorize_register_recipient(authenticated_actor)?;
    let book_id: BookId = BookId::new(book_id);
    let details: RecipientDetails = RecipientDetails::new(
        &request.name,
        &request.phone,
        request.pssm_id.as_deref(),
        Address::from(&request.address),
    );
    change_book(
        inventory,
        book_id,
        Command::RegisterRecipient { book_id, details },
        authenticated_actor,
        cause,
    )
}

/// Fills one donor page of a registered book.
///
/// # Errors
///
/// Returns an error if the actor may not record pages, the page number or
/// amount is invalid, or the book is not in the Registered state.
pub fn save_page(
    inventory: &mut Inventory,
    book_id: u64,
    page_number: u8,
    request: &SavePageRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<BookUpdateResponse>, ApiError> {
    AuthorizationService::authorize_save_page(authenticated_actor)?;
    let book_id: BookId = BookId::new(book_id);

    let amount: Option<Amount> = request
        .amount
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::parse::<Amount>)
        .transpose()
        .map_err(translate_domain_error)?;
    let date: Option<Date> = request
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(parse_date)
        .transpose()
        .map_err(translate_domain_error)?;
    let fields: PageFields = PageFields {
        donor_name: request.donor_name.clone(),
        donor_phone: request.donor_phone.clone(),
        donor_address: request.donor_address.clone(),
        receipt_number: request.receipt_number.clone(),
        amount,
        date,
    };
    debug!(book_id = %book_id, page_number = page_number, "Saving page");

    change_book(
        inventory,
        book_id,
        Command::SavePage {
            book_id,
            page_number,
            fields,
        },
        authenticated_actor,
        cause,
    )
}

/// Marks a registered book as received.
///
/// # Errors
///
/// Returns an error if the actor may not finalize, confirmation is missing,
/// or the book is not in the Registered state.
pub fn finalize_book(
    inventory: &mut Inventory,
    book_id: u64,
    request: &FinalizeBookRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<BookUpdateResponse>, ApiError> {
    AuthorizationService::authorize_finalize_book(authenticated_actor)?;
    let book_id: BookId = BookId::new(book_id);
    let received_date: Date = parse_optional_date(request.received_date.as_deref())?;
    change_book(
        inventory,
        book_id,
        Command::FinalizeBook {
            book_id,
            confirmed: request.confirmed,
            received_date,
        },
        authenticated_actor,
        cause,
    )
}

/// Returns a received book to the Registered state.
///
/// # Errors
///
/// Returns an error if the actor is not a Super Admin, no reason is given,
/// or the book has not been received.
pub fn reopen_book(
    inventory: &mut Inventory,
    book_id: u64,
    request: &ReopenBookRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<BookUpdateResponse>, ApiError> {
    AuthorizationService::authorize_reopen_book(authenticated_actor)?;
    if request.reason.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("reason"),
            message: String::from("A reason is required to reopen a book"),
        });
    }
    let book_id: BookId = BookId::new(book_id);
    change_book(
        inventory,
        book_id,
        Command::ReopenBook {
            book_id,
            reason: request.reason.trim().to_string(),
        },
        authenticated_actor,
        cause,
    )
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

fn child_path(parent: Option<&LocationPath>, name: &str) -> Option<LocationPath> {
    let Some(parent) = parent else {
        return Some(LocationPath::state(name));
    };
    let state: &str = parent.state_name();
    let district: &str = parent.district_name().unwrap_or_default();
    let town: &str = parent.town_name().unwrap_or_default();
    match parent.level() {
        LocationLevel::State => Some(LocationPath::district(state, name)),
        LocationLevel::District => Some(LocationPath::town(state, district, name)),
        LocationLevel::Town => Some(LocationPath::center(state, district, town, name)),
        LocationLevel::Center => None,
    }
}

fn location_nodes(
    tree: &LocationTree,
    parent: Option<&LocationPath>,
) -> Result<Vec<LocationNode>, ApiError> {
    let mut nodes: Vec<LocationNode> = Vec::new();
    for name in tree.children(parent).map_err(translate_domain_error)? {
        let children: Vec<LocationNode> = match child_path(parent, &name) {
            Some(path) => location_nodes(tree, Some(&path))?,
            None => Vec::new(),
        };
        nodes.push(LocationNode { name, children });
    }
    Ok(nodes)
}

/// Returns the whole location tree.
///
/// # Errors
///
/// Returns an error only if the tree is internally inconsistent.
pub fn list_locations(inventory: &Inventory) -> Result<LocationsResponse, ApiError> {
    let tree: &LocationTree = inventory.locations();
    Ok(LocationsResponse {
        states: location_nodes(tree, None)?,
        counts: tree.counts(),
    })
}

/// Adds a location under an existing parent.
///
/// # Errors
///
/// Returns an error if the actor is not a Super Admin, the parent is
/// missing, or the name is invalid or taken.
pub fn add_location(
    inventory: &mut Inventory,
    request: &LocationRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<LocationChangeResponse>, ApiError> {
    AuthorizationService::authorize_manage_locations(authenticated_actor)?;
    let path: LocationPath = to_location_path(request)?;
    let result: TransitionResult = run(
        inventory,
        Command::AddLocation { path },
        authenticated_actor,
        cause,
    )?;
    let CommandOutcome::LocationAdded(path) = result.outcome else {
        return Err(unexpected_outcome(&result.outcome));
    };
    info!(path = %path, level = %path.level(), "Added location");

    Ok(ApiResult {
        response: LocationChangeResponse {
            message: format!("Added {} '{}'", path.level(), path.name()),
            level: path.level().as_str().to_string(),
            path: path.to_string(),
        },
        audit_event: result.audit_event,
    })
}

/// Renames a location and every address that references it.
///
/// # Errors
///
/// Returns an error if the actor is not a Super Admin, the location is
/// missing, or the new name is invalid or taken by a sibling.
pub fn rename_location(
    inventory: &mut Inventory,
    request: &RenameLocationRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<RenameLocationResponse>, ApiError> {
    AuthorizationService::authorize_manage_locations(authenticated_actor)?;
    let path: LocationPath = to_location_path(&request.location)?;
    let result: TransitionResult = run(
        inventory,
        Command::RenameLocation {
            path,
            new_name: request.new_name.clone(),
        },
        authenticated_actor,
        cause,
    )?;
    let CommandOutcome::LocationRenamed {
        from,
        to,
        addresses_updated,
    } = result.outcome
    else {
        return Err(unexpected_outcome(&result.outcome));
    };
    info!(from = %from, to = %to, addresses_updated = addresses_updated, "Renamed location");

    Ok(ApiResult {
        response: RenameLocationResponse {
            message: format!(
                "Renamed '{from}' to '{}'; {addresses_updated} address(es) updated",
                to.name()
            ),
            from: from.to_string(),
            to: to.to_string(),
            addresses_updated,
        },
        audit_event: result.audit_event,
    })
}

/// Removes a location that no record references.
///
/// # Errors
///
/// Returns an error if the actor is not a Super Admin, the location is
/// missing, or any distribution or book address lies at or below it.
pub fn remove_location(
    inventory: &mut Inventory,
    request: &LocationRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<LocationChangeResponse>, ApiError> {
    AuthorizationService::authorize_manage_locations(authenticated_actor)?;
    let path: LocationPath = to_location_path(request)?;
    let result: TransitionResult = run(
        inventory,
        Command::RemoveLocation { path },
        authenticated_actor,
        cause,
    )?;
    let CommandOutcome::LocationRemoved(path) = result.outcome else {
        return Err(unexpected_outcome(&result.outcome));
    };
    info!(path = %path, "Removed location");

    Ok(ApiResult {
        response: LocationChangeResponse {
            message: format!("Removed {} '{}'", path.level(), path.name()),
            level: path.level().as_str().to_string(),
            path: path.to_string(),
        },
        audit_event: result.audit_event,
    })
}

/// Merges a location file into the hierarchy.
///
/// # Errors
///
/// Returns an error if the actor is not a Super Admin or the file is
/// malformed.
pub fn import_locations(
    inventory: &mut Inventory,
    request: &ImportLocationsRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<ImportLocationsResponse>, ApiError> {
    AuthorizationService::authorize_manage_locations(authenticated_actor)?;
    let paths: Vec<LocationPath> = parse_location_json(&request.json_content)?;
    let result: TransitionResult = run(
        inventory,
        Command::MergeLocations { paths },
        authenticated_actor,
        cause,
    )?;
    let CommandOutcome::LocationsMerged { created } = result.outcome else {
        return Err(unexpected_outcome(&result.outcome));
    };
    info!(created = created, "Imported locations");

    Ok(ApiResult {
        response: ImportLocationsResponse {
            created,
            counts: inventory.locations().counts(),
            message: format!("Added {created} location(s)"),
        },
        audit_event: result.audit_event,
    })
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

fn preview_response<T>(preview: &CsvPreviewResult<T>) -> CsvPreviewResponse {
    CsvPreviewResponse {
        rows: preview
            .rows
            .iter()
            .map(|row| CsvPreviewRow {
                row_number: row.row_number,
                status: match row.status {
                    CsvRowStatus::Valid => CsvPreviewRowStatus::Valid,
                    CsvRowStatus::Invalid => CsvPreviewRowStatus::Invalid,
                },
                errors: row.errors.clone(),
                raw_data: row.raw_data.clone(),
            })
            .collect(),
        total_rows: preview.total_rows,
        valid_count: preview.valid_count,
        invalid_count: preview.invalid_count,
    }
}

/// Applies every valid row of a preview, one command per row.
///
/// Rows that were invalid at preview are reported as failed with their
/// preview errors. A row that fails at commit does not stop later rows.
fn commit_rows<T>(
    inventory: &mut Inventory,
    preview: CsvPreviewResult<T>,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
    target: &str,
    mut to_command: impl FnMut(&Inventory, T) -> Result<Command, ApiError>,
) -> CsvImportResponse {
    let total_rows: usize = preview.total_rows;
    let mut rows: Vec<CsvImportRowResult> = Vec::with_capacity(total_rows);

    for row in preview.rows {
        let CsvRowResult {
            row_number,
            errors,
            parsed,
            ..
        } = row;
        let Some(parsed) = parsed else {
            rows.push(CsvImportRowResult {
                row_number,
                status: CsvImportRowStatus::Failed,
                errors,
            });
            continue;
        };

        let row_cause: Cause = Cause::new(
            cause.id.clone(),
            format!("{} ({target} row {row_number})", cause.description),
        );
        let outcome: Result<TransitionResult, ApiError> = to_command(inventory, parsed)
            .and_then(|command| run(inventory, command, authenticated_actor, row_cause));
        match outcome {
            Ok(_) => rows.push(CsvImportRowResult {
                row_number,
                status: CsvImportRowStatus::Imported,
                errors: Vec::new(),
            }),
            Err(e) => {
                warn!(import_target = target, row_number = row_number, error = %e, "Import row failed");
                rows.push(CsvImportRowResult {
                    row_number,
                    status: CsvImportRowStatus::Failed,
                    errors: vec![e.to_string()],
                });
            }
        }
    }

    let imported_count: usize = rows
        .iter()
        .filter(|r| r.status == CsvImportRowStatus::Imported)
        .count();
    let failed_count: usize = total_rows - imported_count;
    info!(
        import_target = target,
        total_rows = total_rows,
        imported = imported_count,
        failed = failed_count,
        "Completed CSV import"
    );

    CsvImportResponse {
        rows,
        total_rows,
        imported_count,
        failed_count,
        message: format!("Imported {imported_count} of {total_rows} {target} row(s)"),
    }
}

/// Validates a batch CSV without importing it.
///
/// # Errors
///
/// Returns an error if the actor may not create batches or the file is
/// empty or lacks a required header.
pub fn preview_batch_import(
    inventory: &Inventory,
    request: &CsvImportRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CsvPreviewResponse, ApiError> {
    AuthorizationService::authorize_create_batch(authenticated_actor)?;
    let preview: CsvPreviewResult<BatchRow> = preview_batches(&request.csv_content, inventory)?;
    Ok(preview_response(&preview))
}

/// Imports the valid rows of a batch CSV.
///
/// # Errors
///
/// Returns an error if the actor may not create batches or the file is
/// empty or lacks a required header. Row failures are reported per row.
pub fn import_batches(
    inventory: &mut Inventory,
    request: &CsvImportRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<CsvImportResponse, ApiError> {
    AuthorizationService::authorize_create_batch(authenticated_actor)?;
    let preview: CsvPreviewResult<BatchRow> = preview_batches(&request.csv_content, inventory)?;
    Ok(commit_rows(
        inventory,
        preview,
        authenticated_actor,
        cause,
        "batch",
        |_, row| {
            Ok(Command::CreateBatch {
                batch_name: row.batch_name,
                total_books: row.total_books,
                serial_start: row.serial_start,
                serial_end: row.serial_end,
                printed_date: row.printed_date,
            })
        },
    ))
}

/// Validates a distribution CSV without importing it.
///
/// # Errors
///
/// Returns an error if the actor may not distribute or the file is empty
/// or lacks a required header.
pub fn preview_distribution_import(
    inventory: &Inventory,
    request: &CsvImportRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CsvPreviewResponse, ApiError> {
    AuthorizationService::authorize_distribute(authenticated_actor)?;
    let preview: CsvPreviewResult<DistributionRow> =
        preview_distributions(&request.csv_content, inventory)?;
    Ok(preview_response(&preview))
}

/// Imports the valid rows of a distribution CSV.
///
/// Rows are applied in file order, so an earlier row can exhaust the stock
/// a later row was previewed against.
///
/// # Errors
///
/// Returns an error if the actor may not distribute, the date is invalid,
/// or the file is empty or lacks a required header.
pub fn import_distributions(
    inventory: &mut Inventory,
    request: &CsvImportRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<CsvImportResponse, ApiError> {
    AuthorizationService::authorize_distribute(authenticated_actor)?;
    let date: Date = parse_optional_date(request.date.as_deref())?;
    let preview: CsvPreviewResult<DistributionRow> =
        preview_distributions(&request.csv_content, inventory)?;
    Ok(commit_rows(
        inventory,
        preview,
        authenticated_actor,
        cause,
        "distribution",
        |inventory, row| {
            let batch_id: Option<BatchId> = row
                .batch
                .as_ref()
                .map(|batch| inventory.batch_by_name(batch.batch_name()).map(PrintBatch::id))
                .transpose()
                .map_err(translate_domain_error)?;
            Ok(Command::Distribute {
                recipient: row.recipient,
                batch_id,
                book_serials: row.book_serials,
                date,
            })
        },
    ))
}

/// Validates a registration CSV without importing it.
///
/// # Errors
///
/// Returns an error if the actor may not register recipients or the file
/// is empty or lacks a required header.
pub fn preview_registration_import(
    inventory: &Inventory,
    request: &CsvImportRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CsvPreviewResponse, ApiError> {
    AuthorizationService::authorize_register_recipient(authenticated_actor)?;
    let preview: CsvPreviewResult<RegistrationRow> =
        preview_registrations(&request.csv_content, inventory)?;
    Ok(preview_response(&preview))
}

/// Imports the valid rows of a registration CSV.
///
/// # Errors
///
/// Returns an error if the actor may not register recipients or the file
/// is empty or lacks a required header.
pub fn import_registrations(
    inventory: &mut Inventory,
    request: &CsvImportRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<CsvImportResponse, ApiError> {
    AuthorizationService::authorize_register_recipient(authenticated_actor)?;
    let preview: CsvPreviewResult<RegistrationRow> =
        preview_registrations(&request.csv_content, inventory)?;
    Ok(commit_rows(
        inventory,
        preview,
        authenticated_actor,
        cause,
        "registration",
        |inventory, row| {
            let book: &ReceiverBook = inventory
                .book_by_number(&row.book_number)
                .map_err(translate_domain_error)?;
            Ok(Command::RegisterRecipient {
                book_id: book.id(),
                details: row.details,
            })
        },
    ))
}

// ---------------------------------------------------------------------------
// Audit and totals
// ---------------------------------------------------------------------------

/// Builds the API view of an audit event.
#[must_use]
pub fn audit_event_info(event: &AuditEvent) -> AuditEventInfo {
    AuditEventInfo {
        event_id: event.event_id,
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        action: event.action.name.clone(),
        details: event.action.details.clone(),
        subject: event.subject.to_string(),
        before: event.before.data.clone(),
        after: event.after.data.clone(),
    }
}

/// Returns the audit log, oldest first.
#[must_use]
pub fn get_audit_log(inventory: &Inventory) -> AuditLogResponse {
    AuditLogResponse {
        events: inventory.audit_log().iter().map(audit_event_info).collect(),
    }
}

/// Returns inventory-wide totals.
#[must_use]
pub fn get_summary(inventory: &Inventory) -> SummaryResponse {
    let summary: InventorySummary = inventory.summary();
    SummaryResponse {
        batches: summary.batches,
        printed_books: summary.printed_books,
        remaining_books: summary.remaining_books,
        distributions: summary.distributions,
        books_distributed: summary.books_distributed,
        books_registered: summary.books_registered,
        books_received: summary.books_received,
        collected: summary.collected.to_string(),
    }
}
