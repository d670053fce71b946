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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bookdrive::Inventory;
use bookdrive_api::{
    ApiError, ApiResult, AuditLogResponse, AuthenticatedActor, BatchInfo, BookDetailResponse,
    BookUpdateResponse, CancelDistributionResponse, CreateBatchRequest, CreateBatchResponse,
    CreateDistributionRequest, CreateDistributionResponse, CsvImportRequest, CsvImportResponse,
    CsvPreviewResponse, DistributionInfo, FinalizeBookRequest, ImportLocationsRequest,
    ImportLocationsResponse, ListBatchesResponse, ListBooksResponse, ListDistributionsResponse,
    LocationChangeResponse, LocationRequest, LocationsResponse, LoginRequest, LoginResponse,
    RegisterRecipientRequest, RenameLocationRequest, RenameLocationResponse, ReopenBookRequest,
    SavePageRequest, SessionStore, SummaryResponse, UpdateDistributionRequest,
    UpdateDistributionResponse, WhoAmIResponse, add_location, cancel_distribution, create_batch,
    create_distribution, export_batches, export_books, export_distributions, finalize_book,
    get_audit_log, get_batch, get_book, get_distribution, get_summary, import_batches,
    import_distributions, import_locations, import_registrations, list_batches, list_books,
    list_distributions, list_locations, load_location_tree, login, logout, preview_batch_import,
    preview_distribution_import, preview_registration_import, register_recipient,
    remove_location, rename_location, reopen_book, save_page, update_distribution, whoami,
};
use bookdrive_audit::Cause;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::session::SessionActor;

/// Book donation server - HTTP API for the book donation tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Location hierarchy JSON file to seed the store with
    #[arg(short, long)]
    locations: Option<PathBuf>,
}

/// Application state shared across handlers.
///
/// The inventory and the session store are each guarded by one mutex, so
/// every command runs against a consistent view of the whole store.
#[derive(Clone)]
struct AppState {
    /// The in-memory inventory.
    inventory: Arc<Mutex<Inventory>>,
    /// Open operator sessions.
    sessions: Arc<Mutex<SessionStore>>,
    /// Broadcaster for live events.
    live_events: Arc<LiveEventBroadcaster>,
    /// Source of request identifiers for audit causes.
    request_counter: Arc<AtomicU64>,
}

impl AppState {
    fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Arc::new(Mutex::new(inventory)),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            live_events: Arc::new(LiveEventBroadcaster::new()),
            request_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Builds the audit cause for one request.
    fn cause(&self, action: &str, actor: &AuthenticatedActor) -> Cause {
        let request_id: u64 = self.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
        Cause::new(
            format!("req_{request_id}"),
            format!("{action} requested by {}", actor.id),
        )
    }

    fn broadcast(&self, event: &LiveEvent) {
        self.live_events.broadcast(event);
    }
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live_events)
    }
}

/// Query parameters for listing distributions.
#[derive(Debug, Deserialize)]
struct ListDistributionsQuery {
    /// Optional recipient type filter.
    recipient_type: Option<String>,
}

/// Query parameters for listing books.
#[derive(Debug, Deserialize)]
struct ListBooksQuery {
    /// Optional status filter.
    status: Option<String>,
    /// Optional distribution filter.
    distribution_id: Option<u64>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Domain rules whose violation means the request collides with existing state.
const CONFLICT_RULES: &[&str] = &[
    "unique_batch_name",
    "unique_book_serial",
    "unique_location",
    "distribution_locked",
    "location_in_use",
];

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } | ApiError::InvalidCsvFormat { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DomainRuleViolation { rule, .. } if CONFLICT_RULES.contains(&rule.as_str()) => {
                StatusCode::CONFLICT
            }
            ApiError::DomainRuleViolation { .. } | ApiError::InsufficientStock { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Wraps an export in a CSV download response.
fn csv_response(filename: &str, body: String) -> Response {
    let headers: [(HeaderName, String); 2] = [
        (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    (headers, body).into_response()
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Handler for POST `/login` endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, role = %req.role, "Handling login request");

    let mut sessions = app_state.sessions.lock().await;
    let response: LoginResponse = login(&mut sessions, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/logout` endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, token): SessionActor,
) -> Result<StatusCode, HttpError> {
    info!(login_name = %actor.id, "Handling logout request");

    let mut sessions = app_state.sessions.lock().await;
    logout(&mut sessions, &token)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/whoami` endpoint.
async fn handle_whoami(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, token): SessionActor,
) -> Result<Json<WhoAmIResponse>, HttpError> {
    let sessions = app_state.sessions.lock().await;
    let response: WhoAmIResponse = whoami(&sessions, &token)?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// Handler for POST `/batches` endpoint.
async fn handle_create_batch(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateBatchRequest>,
) -> Result<Json<CreateBatchResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        batch_name = %req.batch_name,
        total_books = req.total_books,
        "Handling create_batch request"
    );

    let cause: Cause = app_state.cause("create_batch", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<CreateBatchResponse> = create_batch(&mut inventory, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::BatchCreated {
        batch_id: result.response.batch.batch_id,
        batch_name: result.response.batch.batch_name.clone(),
        total_books: result.response.batch.total_books,
    });
    Ok(Json(result.response))
}

/// Handler for GET `/batches` endpoint.
async fn handle_list_batches(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Json<ListBatchesResponse> {
    let inventory = app_state.inventory.lock().await;
    Json(list_batches(&inventory))
}

/// Handler for GET `/batches/{id}` endpoint.
async fn handle_get_batch(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
    Path(batch_id): Path<u64>,
) -> Result<Json<BatchInfo>, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(Json(get_batch(&inventory, batch_id)?))
}

/// Handler for POST `/batches/import/preview` endpoint.
async fn handle_preview_batch_import(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvPreviewResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling batch import preview request");

    let inventory = app_state.inventory.lock().await;
    Ok(Json(preview_batch_import(&inventory, &req, &actor)?))
}

/// Handler for POST `/batches/import` endpoint.
async fn handle_import_batches(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvImportResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling batch import request");

    let cause: Cause = app_state.cause("import_batches", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let response: CsvImportResponse = import_batches(&mut inventory, &req, &actor, &cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::ImportCompleted {
        target: String::from("batch"),
        imported: response.imported_count,
        failed: response.failed_count,
    });
    Ok(Json(response))
}

/// Handler for GET `/batches/export` endpoint.
async fn handle_export_batches(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Result<Response, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(csv_response("batches.csv", export_batches(&inventory)?))
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Handler for POST `/distributions` endpoint.
async fn handle_create_distribution(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CreateDistributionRequest>,
) -> Result<Json<CreateDistributionResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        recipient = %req.recipient.name,
        batch_id = ?req.batch_id,
        "Handling create_distribution request"
    );

    let cause: Cause = app_state.cause("distribute", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<CreateDistributionResponse> =
        create_distribution(&mut inventory, &req, &actor, cause)?;
    drop(inventory);

    let distribution: &DistributionInfo = &result.response.distribution;
    app_state.broadcast(&LiveEvent::DistributionCreated {
        distribution_id: distribution.distribution_id,
        recipient: distribution.name.clone(),
        count: distribution.count,
    });
    if let (Some(batch_id), Some(remaining_books)) =
        (distribution.batch_id, result.response.batch_remaining)
    {
        app_state.broadcast(&LiveEvent::StockChanged {
            batch_id,
            remaining_books,
        });
    }
    Ok(Json(result.response))
}

/// Handler for GET `/distributions` endpoint.
async fn handle_list_distributions(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
    Query(query): Query<ListDistributionsQuery>,
) -> Result<Json<ListDistributionsResponse>, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(Json(list_distributions(
        &inventory,
        query.recipient_type.as_deref(),
    )?))
}

/// Handler for GET `/distributions/{id}` endpoint.
async fn handle_get_distribution(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
    Path(distribution_id): Path<u64>,
) -> Result<Json<DistributionInfo>, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(Json(get_distribution(&inventory, distribution_id)?))
}

/// Handler for POST `/distributions/{id}` endpoint.
///
/// Corrects the recipient or date of a distribution.
async fn handle_update_distribution(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(distribution_id): Path<u64>,
    Json(req): Json<UpdateDistributionRequest>,
) -> Result<Json<UpdateDistributionResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        distribution_id = distribution_id,
        "Handling update_distribution request"
    );

    let cause: Cause = app_state.cause("update_distribution", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<UpdateDistributionResponse> =
        update_distribution(&mut inventory, distribution_id, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::DistributionUpdated { distribution_id });
    Ok(Json(result.response))
}

/// Handler for POST `/distributions/{id}/cancel` endpoint.
async fn handle_cancel_distribution(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(distribution_id): Path<u64>,
) -> Result<Json<CancelDistributionResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        distribution_id = distribution_id,
        "Handling cancel_distribution request"
    );

    let cause: Cause = app_state.cause("cancel_distribution", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<CancelDistributionResponse> =
        cancel_distribution(&mut inventory, distribution_id, &actor, cause)?;
    let restocked: Option<BatchInfo> = result
        .response
        .batch_id
        .and_then(|batch_id| get_batch(&inventory, batch_id).ok());
    drop(inventory);

    app_state.broadcast(&LiveEvent::DistributionCancelled {
        distribution_id,
        released: result.response.released,
    });
    if let Some(batch) = restocked {
        app_state.broadcast(&LiveEvent::StockChanged {
            batch_id: batch.batch_id,
            remaining_books: batch.remaining_books,
        });
    }
    Ok(Json(result.response))
}

/// Handler for POST `/distributions/import/preview` endpoint.
async fn handle_preview_distribution_import(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvPreviewResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling distribution import preview request");

    let inventory = app_state.inventory.lock().await;
    Ok(Json(preview_distribution_import(&inventory, &req, &actor)?))
}

/// Handler for POST `/distributions/import` endpoint.
async fn handle_import_distributions(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvImportResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling distribution import request");

    let cause: Cause = app_state.cause("import_distributions", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let response: CsvImportResponse = import_distributions(&mut inventory, &req, &actor, &cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::ImportCompleted {
        target: String::from("distribution"),
        imported: response.imported_count,
        failed: response.failed_count,
    });
    Ok(Json(response))
}

/// Handler for GET `/distributions/export` endpoint.
async fn handle_export_distributions(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Result<Response, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(csv_response(
        "distributions.csv",
        export_distributions(&inventory)?,
    ))
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

fn broadcast_book_change(app_state: &AppState, response: &BookUpdateResponse) {
    if response.previous_status != response.book.status {
        app_state.broadcast(&LiveEvent::BookStatusChanged {
            book_id: response.book.book_id,
            book_number: response.book.book_number.clone(),
            from: response.previous_status.clone(),
            to: response.book.status.clone(),
        });
    }
}

/// Handler for GET `/books` endpoint.
async fn handle_list_books(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<ListBooksResponse>, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(Json(list_books(
        &inventory,
        query.status.as_deref(),
        query.distribution_id,
    )?))
}

/// Handler for GET `/books/{id}` endpoint.
async fn handle_get_book(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
    Path(book_id): Path<u64>,
) -> Result<Json<BookDetailResponse>, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(Json(get_book(&inventory, book_id)?))
}

/// Handler for POST `/books/{id}/register` endpoint.
async fn handle_register_recipient(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(book_id): Path<u64>,
    Json(req): Json<RegisterRecipientRequest>,
) -> Result<Json<BookUpdateResponse>, HttpError> {
    info!(actor_id = %actor.id, book_id = book_id, "Handling register_recipient request");

    let cause: Cause = app_state.cause("register_recipient", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<BookUpdateResponse> =
        register_recipient(&mut inventory, book_id, &req, &actor, cause)?;
    drop(inventory);

    broadcast_book_change(&app_state, &result.response);
    Ok(Json(result.response))
}

/// Handler for POST `/books/{id}/pages/{page}` endpoint.
async fn handle_save_page(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path((book_id, page_number)): Path<(u64, u8)>,
    Json(req): Json<SavePageRequest>,
) -> Result<Json<BookUpdateResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        book_id = book_id,
        page_number = page_number,
        "Handling save_page request"
    );

    let cause: Cause = app_state.cause("save_page", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<BookUpdateResponse> =
        save_page(&mut inventory, book_id, page_number, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::PageSaved {
        book_id,
        page_number,
        filled_pages: result.response.book.filled_pages,
        total_amount: result.response.book.total_amount.clone(),
    });
    Ok(Json(result.response))
}

/// Handler for POST `/books/{id}/finalize` endpoint.
async fn handle_finalize_book(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(book_id): Path<u64>,
    Json(req): Json<FinalizeBookRequest>,
) -> Result<Json<BookUpdateResponse>, HttpError> {
    info!(actor_id = %actor.id, book_id = book_id, "Handling finalize_book request");

    let cause: Cause = app_state.cause("finalize_book", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<BookUpdateResponse> =
        finalize_book(&mut inventory, book_id, &req, &actor, cause)?;
    drop(inventory);

    broadcast_book_change(&app_state, &result.response);
    Ok(Json(result.response))
}

/// Handler for POST `/books/{id}/reopen` endpoint.
async fn handle_reopen_book(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Path(book_id): Path<u64>,
    Json(req): Json<ReopenBookRequest>,
) -> Result<Json<BookUpdateResponse>, HttpError> {
    info!(actor_id = %actor.id, book_id = book_id, "Handling reopen_book request");

    let cause: Cause = app_state.cause("reopen_book", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<BookUpdateResponse> =
        reopen_book(&mut inventory, book_id, &req, &actor, cause)?;
    drop(inventory);

    broadcast_book_change(&app_state, &result.response);
    Ok(Json(result.response))
}

/// Handler for POST `/books/registrations/import/preview` endpoint.
async fn handle_preview_registration_import(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvPreviewResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling registration import preview request");

    let inventory = app_state.inventory.lock().await;
    Ok(Json(preview_registration_import(&inventory, &req, &actor)?))
}

/// Handler for POST `/books/registrations/import` endpoint.
async fn handle_import_registrations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<CsvImportRequest>,
) -> Result<Json<CsvImportResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling registration import request");

    let cause: Cause = app_state.cause("import_registrations", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let response: CsvImportResponse = import_registrations(&mut inventory, &req, &actor, &cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::ImportCompleted {
        target: String::from("registration"),
        imported: response.imported_count,
        failed: response.failed_count,
    });
    Ok(Json(response))
}

/// Handler for GET `/books/export` endpoint.
async fn handle_export_books(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Result<Response, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(csv_response("books.csv", export_books(&inventory)?))
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// Handler for GET `/locations` endpoint.
async fn handle_list_locations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Result<Json<LocationsResponse>, HttpError> {
    let inventory = app_state.inventory.lock().await;
    Ok(Json(list_locations(&inventory)?))
}

/// Handler for POST `/locations` endpoint.
async fn handle_add_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<LocationRequest>,
) -> Result<Json<LocationChangeResponse>, HttpError> {
    info!(actor_id = %actor.id, state = %req.state, "Handling add_location request");

    let cause: Cause = app_state.cause("add_location", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<LocationChangeResponse> =
        add_location(&mut inventory, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::LocationsChanged {
        path: result.response.path.clone(),
    });
    Ok(Json(result.response))
}

/// Handler for POST `/locations/rename` endpoint.
async fn handle_rename_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<RenameLocationRequest>,
) -> Result<Json<RenameLocationResponse>, HttpError> {
    info!(actor_id = %actor.id, new_name = %req.new_name, "Handling rename_location request");

    let cause: Cause = app_state.cause("rename_location", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<RenameLocationResponse> =
        rename_location(&mut inventory, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::LocationsChanged {
        path: result.response.to.clone(),
    });
    Ok(Json(result.response))
}

/// Handler for POST `/locations/remove` endpoint.
async fn handle_remove_location(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<LocationRequest>,
) -> Result<Json<LocationChangeResponse>, HttpError> {
    info!(actor_id = %actor.id, state = %req.state, "Handling remove_location request");

    let cause: Cause = app_state.cause("remove_location", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<LocationChangeResponse> =
        remove_location(&mut inventory, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::LocationsChanged {
        path: result.response.path.clone(),
    });
    Ok(Json(result.response))
}

/// Handler for POST `/locations/import` endpoint.
async fn handle_import_locations(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor, _): SessionActor,
    Json(req): Json<ImportLocationsRequest>,
) -> Result<Json<ImportLocationsResponse>, HttpError> {
    info!(actor_id = %actor.id, "Handling import_locations request");

    let cause: Cause = app_state.cause("import_locations", &actor);
    let mut inventory = app_state.inventory.lock().await;
    let result: ApiResult<ImportLocationsResponse> =
        import_locations(&mut inventory, &req, &actor, cause)?;
    drop(inventory);

    app_state.broadcast(&LiveEvent::LocationsChanged {
        path: String::from("*"),
    });
    Ok(Json(result.response))
}

// ---------------------------------------------------------------------------
// Audit and totals
// ---------------------------------------------------------------------------

/// Handler for GET `/audit` endpoint.
async fn handle_get_audit_log(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Json<AuditLogResponse> {
    let inventory = app_state.inventory.lock().await;
    Json(get_audit_log(&inventory))
}

/// Handler for GET `/summary` endpoint.
async fn handle_get_summary(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(_, _): SessionActor,
) -> Json<SummaryResponse> {
    let inventory = app_state.inventory.lock().await;
    Json(get_summary(&inventory))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/whoami", get(handle_whoami))
        .route("/batches", get(handle_list_batches).post(handle_create_batch))
        .route("/batches/{id}", get(handle_get_batch))
        .route("/batches/import/preview", post(handle_preview_batch_import))
        .route("/batches/import", post(handle_import_batches))
        .route("/batches/export", get(handle_export_batches))
        .route(
            "/distributions",
            get(handle_list_distributions).post(handle_create_distribution),
        )
        .route(
            "/distributions/{id}",
            get(handle_get_distribution).post(handle_update_distribution),
        )
        .route(
            "/distributions/{id}/cancel",
            post(handle_cancel_distribution),
        )
        .route(
            "/distributions/import/preview",
            post(handle_preview_distribution_import),
        )
        .route("/distributions/import", post(handle_import_distributions))
        .route("/distributions/export", get(handle_export_distributions))
        .route("/books", get(handle_list_books))
        .route("/books/{id}", get(handle_get_book))
        .route("/books/{id}/register", post(handle_register_recipient))
        .route("/books/{id}/pages/{page}", post(handle_save_page))
        .route("/books/{id}/finalize", post(handle_finalize_book))
        .route("/books/{id}/reopen", post(handle_reopen_book))
        .route(
            "/books/registrations/import/preview",
            post(handle_preview_registration_import),
        )
        .route(
            "/books/registrations/import",
            post(handle_import_registrations),
        )
        .route("/books/export", get(handle_export_books))
        .route(
            "/locations",
            get(handle_list_locations).post(handle_add_location),
        )
        .route("/locations/rename", post(handle_rename_location))
        .route("/locations/remove", post(handle_remove_location))
        .route("/locations/import", post(handle_import_locations))
        .route("/audit", get(handle_get_audit_log))
        .route("/summary", get(handle_get_summary))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing book donation server");

    let inventory: Inventory = if let Some(path) = &args.locations {
        info!(path = %path.display(), "Loading location hierarchy");
        let json_content: String = std::fs::read_to_string(path)?;
        Inventory::with_locations(load_location_tree(&json_content)?)
    } else {
        info!("Starting with an empty location hierarchy");
        Inventory::new()
    };

    let app: Router = build_router(AppState::new(inventory));

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
