// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates cross the boundary as `YYYY-MM-DD` strings and amounts as decimal
//! strings such as `"500.00"`.

use bookdrive_domain::{Address, LocationCounts};

/// API request to open a session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The operator's login name.
    pub login_name: String,
    /// The role to act as (e.g. "`SuperAdmin`", "Incharge").
    pub role: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The bearer token for subsequent requests.
    pub session_token: String,
    /// The operator's login name.
    pub login_name: String,
    /// The role the session acts as.
    pub role: String,
}

/// API response describing the current session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    /// The operator's login name.
    pub login_name: String,
    /// The role the session acts as.
    pub role: String,
    /// When the session was opened.
    pub logged_in_at: String,
}

/// A structured address as it crosses the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddressInfo {
    /// The state name.
    pub state: String,
    /// The district name.
    pub district: String,
    /// The town (mandal) name.
    #[serde(default)]
    pub town: Option<String>,
    /// The center name.
    #[serde(default)]
    pub center: Option<String>,
    /// Free-form street line.
    #[serde(default)]
    pub line: Option<String>,
}

impl From<&Address> for AddressInfo {
    fn from(address: &Address) -> Self {
        Self {
            state: address.state.clone(),
            district: address.district.clone(),
            town: address.town.clone(),
            center: address.center.clone(),
            line: address.line.clone(),
        }
    }
}

impl From<&AddressInfo> for Address {
    fn from(info: &AddressInfo) -> Self {
        let mut address: Self = Self::new(&info.state, &info.district);
        if let Some(town) = &info.town {
            address = address.with_town(town);
        }
        if let Some(center) = &info.center {
            address = address.with_center(center);
        }
        if let Some(line) = &info.line {
            address = address.with_line(line);
        }
        address
    }
}

/// API request to register a printed batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateBatchRequest {
    /// The batch display name.
    pub batch_name: String,
    /// The number of books printed.
    pub total_books: u32,
    /// The first serial.
    pub serial_start: String,
    /// The last serial.
    pub serial_end: String,
    /// The print date.
    pub printed_date: String,
}

/// Information about a print batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchInfo {
    /// The batch identifier.
    pub batch_id: u64,
    /// The batch display name.
    pub batch_name: String,
    /// The number of books printed.
    pub total_books: u32,
    /// Books still in stock.
    pub remaining_books: u32,
    /// Books handed out.
    pub distributed_books: u32,
    /// The first serial.
    pub serial_start: String,
    /// The last serial.
    pub serial_end: String,
    /// The print date.
    pub printed_date: String,
    /// Derived stock status.
    pub status: String,
}

/// API response for a successful batch creation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateBatchResponse {
    /// The created batch.
    pub batch: BatchInfo,
    /// A success message.
    pub message: String,
}

/// API response listing batches.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListBatchesResponse {
    /// Batches, newest first.
    pub batches: Vec<BatchInfo>,
}

/// Recipient fields of a distribution request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecipientInput {
    /// The recipient's name.
    pub name: String,
    /// The recipient's phone number.
    pub phone: String,
    /// Optional PSSM membership identifier.
    #[serde(default)]
    pub pssm_id: Option<String>,
    /// Individual, Center, District, or Autonomous.
    pub recipient_type: String,
    /// The recipient's address.
    pub address: AddressInfo,
}

/// API request to hand books to a recipient.
///
/// Serials are either listed in `book_serials` or expanded from
/// `first_serial` and `count`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateDistributionRequest {
    /// Who receives the books.
    pub recipient: RecipientInput,
    /// The source batch, if any.
    #[serde(default)]
    pub batch_id: Option<u64>,
    /// Explicit serials.
    #[serde(default)]
    pub book_serials: Vec<String>,
    /// The first serial of a contiguous run.
    #[serde(default)]
    pub first_serial: Option<String>,
    /// The length of the contiguous run.
    #[serde(default)]
    pub count: Option<u32>,
    /// The date of the hand-over; defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

/// Information about a distribution record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DistributionInfo {
    /// The distribution identifier.
    pub distribution_id: u64,
    /// The date of the hand-over.
    pub date: String,
    /// The recipient's name.
    pub name: String,
    /// The recipient's phone number.
    pub phone: String,
    /// Optional PSSM membership identifier.
    pub pssm_id: Option<String>,
    /// The recipient classification.
    pub recipient_type: String,
    /// The recipient's address.
    pub address: AddressInfo,
    /// The source batch identifier.
    pub batch_id: Option<u64>,
    /// The source batch name.
    pub batch_name: Option<String>,
    /// The serials handed over, in order.
    pub book_serials: Vec<String>,
    /// The serial range for display.
    pub serial_range: String,
    /// The number of books.
    pub count: usize,
    /// Books registered or received.
    pub registered_count: usize,
    /// Books received.
    pub submitted_count: usize,
}

/// API response for a successful distribution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateDistributionResponse {
    /// The created record.
    pub distribution: DistributionInfo,
    /// The books created, in serial order.
    pub book_ids: Vec<u64>,
    /// Remaining stock of the source batch, if any.
    pub batch_remaining: Option<u32>,
    /// A success message.
    pub message: String,
}

/// API request to correct a distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateDistributionRequest {
    /// New recipient name.
    #[serde(default)]
    pub name: Option<String>,
    /// New recipient phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// New PSSM identifier; an empty string clears it.
    #[serde(default)]
    pub pssm_id: Option<String>,
    /// New recipient classification.
    #[serde(default)]
    pub recipient_type: Option<String>,
    /// New recipient address.
    #[serde(default)]
    pub address: Option<AddressInfo>,
    /// New hand-over date.
    #[serde(default)]
    pub date: Option<String>,
}

/// API response for a distribution update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateDistributionResponse {
    /// The updated record.
    pub distribution: DistributionInfo,
    /// A success message.
    pub message: String,
}

/// API response for a cancelled distribution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancelDistributionResponse {
    /// The removed record.
    pub distribution_id: u64,
    /// The batch that got its stock back.
    pub batch_id: Option<u64>,
    /// The number of books returned to stock.
    pub released: u32,
    /// A success message.
    pub message: String,
}

/// API response listing distributions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListDistributionsResponse {
    /// Distributions, newest first.
    pub distributions: Vec<DistributionInfo>,
}

/// The person a book is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssigneeInfo {
    /// The person's name.
    pub name: String,
    /// The person's phone number.
    pub phone: String,
    /// Optional PSSM membership identifier.
    pub pssm_id: Option<String>,
}

/// Information about a book.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookInfo {
    /// The book identifier.
    pub book_id: u64,
    /// The book serial.
    pub book_number: String,
    /// The source batch name.
    pub batch_name: Option<String>,
    /// The distribution that created this book.
    pub distribution_id: u64,
    /// Distributed, Registered, or Received.
    pub status: String,
    /// The responsible person.
    pub assigned_to: AssigneeInfo,
    /// The responsible person's address.
    pub address: AddressInfo,
    /// Pages in the book.
    pub total_pages: u8,
    /// Pages filled.
    pub filled_pages: u8,
    /// Sum of all filled page amounts.
    pub total_amount: String,
    /// The date the book was assigned.
    pub assigned_date: String,
    /// The date the book was received.
    pub received_date: Option<String>,
}

/// One donor page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PageInfo {
    /// Page number, 1-based.
    pub page_number: u8,
    /// The donor's name.
    pub donor_name: String,
    /// The donor's phone number.
    pub donor_phone: Option<String>,
    /// The donor's address.
    pub donor_address: Option<String>,
    /// The receipt number.
    pub receipt_number: Option<String>,
    /// The amount donated.
    pub amount: String,
    /// Whether the page is filled.
    pub is_filled: bool,
    /// The donation date.
    pub date: Option<String>,
}

/// API response with a book and its pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookDetailResponse {
    /// The book.
    pub book: BookInfo,
    /// The recorded pages, in page order.
    pub pages: Vec<PageInfo>,
}

/// API response listing books.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListBooksResponse {
    /// The matching books.
    pub books: Vec<BookInfo>,
}

/// API request to record the person responsible for a book.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterRecipientRequest {
    /// The person's name.
    pub name: String,
    /// The person's phone number.
    pub phone: String,
    /// Optional PSSM membership identifier.
    #[serde(default)]
    pub pssm_id: Option<String>,
    /// The person's address.
    pub address: AddressInfo,
}

/// API request to fill one donor page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SavePageRequest {
    /// The donor's name.
    pub donor_name: String,
    /// The donor's phone number.
    #[serde(default)]
    pub donor_phone: Option<String>,
    /// The donor's address.
    #[serde(default)]
    pub donor_address: Option<String>,
    /// The receipt number.
    #[serde(default)]
    pub receipt_number: Option<String>,
    /// The amount donated; defaults to zero.
    #[serde(default)]
    pub amount: Option<String>,
    /// The donation date.
    #[serde(default)]
    pub date: Option<String>,
}

/// API request to mark a book as received.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FinalizeBookRequest {
    /// Explicit operator confirmation.
    pub confirmed: bool,
    /// The date the book was turned in; defaults to today.
    #[serde(default)]
    pub received_date: Option<String>,
}

/// API request to return a received book to editing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReopenBookRequest {
    /// Why the book is being reopened.
    pub reason: String,
}

/// API response for any single-book change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookUpdateResponse {
    /// The book after the change.
    pub book: BookInfo,
    /// The book's previous status.
    pub previous_status: String,
    /// A success message.
    pub message: String,
}

/// A location given by its path components.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationRequest {
    /// The state name.
    pub state: String,
    /// The district name.
    #[serde(default)]
    pub district: Option<String>,
    /// The town name.
    #[serde(default)]
    pub town: Option<String>,
    /// The center name.
    #[serde(default)]
    pub center: Option<String>,
}

/// API request to rename a location.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenameLocationRequest {
    /// The location to rename.
    pub location: LocationRequest,
    /// The new name of the last path component.
    pub new_name: String,
}

/// One node of the location tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationNode {
    /// The node name.
    pub name: String,
    /// The node's children, sorted by name.
    pub children: Vec<LocationNode>,
}

/// API response with the whole location tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationsResponse {
    /// The states, sorted by name.
    pub states: Vec<LocationNode>,
    /// Node counts per level.
    pub counts: LocationCounts,
}

/// API response for adding or removing a location.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationChangeResponse {
    /// The affected path.
    pub path: String,
    /// The level of the affected node.
    pub level: String,
    /// A success message.
    pub message: String,
}

/// API response for a location rename.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenameLocationResponse {
    /// The old path.
    pub from: String,
    /// The new path.
    pub to: String,
    /// Number of distribution and book addresses rewritten.
    pub addresses_updated: usize,
    /// A success message.
    pub message: String,
}

/// API request to import a location file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportLocationsRequest {
    /// The location JSON document.
    pub json_content: String,
}

/// API response for a location import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportLocationsResponse {
    /// Number of nodes created.
    pub created: usize,
    /// Node counts per level after the import.
    pub counts: LocationCounts,
    /// A success message.
    pub message: String,
}

/// API request to preview or commit a CSV import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportRequest {
    /// The raw CSV content.
    pub csv_content: String,
    /// The date recorded on imported distributions; defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

/// Status of a previewed CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvPreviewRowStatus {
    /// Row can be imported.
    Valid,
    /// Row has validation errors.
    Invalid,
}

/// One previewed CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvPreviewRow {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The row status.
    pub status: CsvPreviewRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<String>,
    /// The row as it appeared in the file.
    pub raw_data: String,
}

/// API response for a CSV preview.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvPreviewResponse {
    /// Per-row validation results.
    pub rows: Vec<CsvPreviewRow>,
    /// Total number of rows.
    pub total_rows: usize,
    /// Number of valid rows.
    pub valid_count: usize,
    /// Number of invalid rows.
    pub invalid_count: usize,
}

/// Status of a single CSV row import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvImportRowStatus {
    /// Row was imported.
    Imported,
    /// Row import failed.
    Failed,
}

/// Result of importing a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportRowResult {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The status of this import attempt.
    pub status: CsvImportRowStatus,
    /// Why the row failed, if it did.
    pub errors: Vec<String>,
}

/// API response for a CSV import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportResponse {
    /// Per-row outcomes.
    pub rows: Vec<CsvImportRowResult>,
    /// Total number of rows in the file.
    pub total_rows: usize,
    /// Number of rows imported.
    pub imported_count: usize,
    /// Number of rows that failed.
    pub failed_count: usize,
    /// A summary message.
    pub message: String,
}

/// One audit event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEventInfo {
    /// Sequence number.
    pub event_id: Option<u64>,
    /// Who performed the action.
    pub actor_id: String,
    /// The actor's role or kind.
    pub actor_type: String,
    /// The request or import that triggered the action.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The command name.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// The record the action applied to.
    pub subject: String,
    /// Snapshot before the action.
    pub before: String,
    /// Snapshot after the action.
    pub after: String,
}

/// API response listing audit events.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditLogResponse {
    /// Events, oldest first.
    pub events: Vec<AuditEventInfo>,
}

/// API response with inventory-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SummaryResponse {
    /// Number of batches.
    pub batches: usize,
    /// Books printed.
    pub printed_books: u64,
    /// Books in stock.
    pub remaining_books: u64,
    /// Number of distributions.
    pub distributions: usize,
    /// Books awaiting registration.
    pub books_distributed: usize,
    /// Books registered and out in the field.
    pub books_registered: usize,
    /// Books received.
    pub books_received: usize,
    /// Total collected.
    pub collected: String,
}
