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

mod auth;
mod csv_export;
mod csv_import;
mod error;
mod handlers;
mod location_import;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, Session, SessionStore};
pub use csv_export::{export_batches, export_books, export_distributions};
pub use csv_import::{
    BATCH_HEADERS, BatchRow, CsvPreviewResult, CsvRowResult, CsvRowStatus, DISTRIBUTION_HEADERS,
    DistributionRow, REGISTRATION_HEADERS, RegistrationRow, preview_batches,
    preview_distributions, preview_registrations,
};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    ApiResult, add_location, audit_event_info, batch_info, book_info, cancel_distribution,
    create_batch, create_distribution, distribution_info, finalize_book, get_audit_log,
    get_batch, get_book, get_distribution, get_summary, import_batches, import_distributions,
    import_locations, import_registrations, list_batches, list_books, list_distributions,
    list_locations, login, logout, preview_batch_import, preview_distribution_import,
    preview_registration_import, register_recipient, remove_location, rename_location,
    reopen_book, save_page, update_distribution, whoami,
};
pub use location_import::{LocationImportError, load_location_tree, parse_location_json};
pub use request_response::{
    AddressInfo, AssigneeInfo, AuditEventInfo, AuditLogResponse, BatchInfo, BookDetailResponse,
    BookInfo, BookUpdateResponse, CancelDistributionResponse, CreateBatchRequest,
    CreateBatchResponse, CreateDistributionRequest, CreateDistributionResponse, CsvImportRequest,
    CsvImportResponse, CsvImportRowResult, CsvImportRowStatus, CsvPreviewResponse, CsvPreviewRow,
    CsvPreviewRowStatus, DistributionInfo, FinalizeBookRequest, ImportLocationsRequest,
    ImportLocationsResponse, ListBatchesResponse, ListBooksResponse, ListDistributionsResponse,
    LocationChangeResponse, LocationNode, LocationRequest, LocationsResponse, LoginRequest,
    LoginResponse, PageInfo, RecipientInput, RegisterRecipientRequest, RenameLocationRequest,
    RenameLocationResponse, ReopenBookRequest, SavePageRequest, SummaryResponse,
    UpdateDistributionRequest, UpdateDistributionResponse, WhoAmIResponse,
};
