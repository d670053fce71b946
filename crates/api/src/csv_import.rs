// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV preview and validation for bulk imports.
//!
//! This module parses and validates batch, distribution, and registration
//! rows without mutating the inventory. Each row gets its own verdict; only
//! file-level problems (no data, missing headers) fail the whole preview.

use bookdrive::Inventory;
use bookdrive_domain::{
    Address, BookStatus, DomainError, PrintBatch, Recipient, RecipientDetails, RecipientType,
    expand_serials, parse_date, serial_span, validate_batch_name, validate_recipient,
    validate_recipient_details,
};
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use time::Date;

use crate::error::ApiError;

/// Expected headers for a batch import.
pub const BATCH_HEADERS: &[&str] = &[
    "batch_name",
    "total_books",
    "serial_start",
    "serial_end",
    "printed_date",
];

/// Expected headers for a distribution import.
pub const DISTRIBUTION_HEADERS: &[&str] = &[
    "name",
    "phone",
    "pssm_id",
    "recipient_type",
    "state",
    "district",
    "town",
    "center",
    "batch_name",
    "first_serial",
    "count",
];

/// Expected headers for a registration import.
pub const REGISTRATION_HEADERS: &[&str] = &[
    "book_number",
    "name",
    "phone",
    "pssm_id",
    "state",
    "district",
    "town",
    "center",
];

/// Status of a CSV row validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and cannot be imported.
    Invalid,
}

/// A single row result from CSV preview validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRowResult<T> {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The row status.
    pub status: CsvRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<String>,
    /// The row as it appeared in the file.
    pub raw_data: String,
    /// The parsed row, present only when the row is valid.
    pub parsed: Option<T>,
}

/// Result of CSV preview validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPreviewResult<T> {
    /// Per-row validation results.
    pub rows: Vec<CsvRowResult<T>>,
    /// Total number of rows.
    pub total_rows: usize,
    /// Number of valid rows.
    pub valid_count: usize,
    /// Number of invalid rows.
    pub invalid_count: usize,
}

/// A batch row ready to become a `CreateBatch` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// The batch display name.
    pub batch_name: String,
    /// The number of books printed.
    pub total_books: u32,
    /// The first serial.
    pub serial_start: String,
    /// The last serial.
    pub serial_end: String,
    /// The print date.
    pub printed_date: Date,
}

/// A distribution row ready to become a `Distribute` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRow {
    /// Who receives the books.
    pub recipient: Recipient,
    /// The source batch, if the row names one.
    pub batch: Option<PrintBatch>,
    /// The serials handed over.
    pub book_serials: Vec<String>,
}

/// A registration row ready to become a `RegisterRecipient` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRow {
    /// The serial of the book being registered.
    pub book_number: String,
    /// The responsible person.
    pub details: RecipientDetails,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(
    headers: &StringRecord,
    required: &[&str],
) -> Result<HashMap<String, usize>, ApiError> {
    let mut header_map: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        header_map.insert(normalize_header(header), idx);
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|r| !header_map.contains_key(*r))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Extracts and validates a required field from a CSV row.
fn parse_required_field(
    get_field: &impl Fn(&str) -> Option<String>,
    field_name: &str,
    errors: &mut Vec<String>,
) -> String {
    get_field(field_name).unwrap_or_else(|| {
        errors.push(format!("{field_name}: required field is missing or empty"));
        String::new()
    })
}

/// Parses a required positive count.
fn parse_count_field(
    get_field: &impl Fn(&str) -> Option<String>,
    field_name: &str,
    errors: &mut Vec<String>,
) -> Option<u32> {
    let Some(value) = get_field(field_name) else {
        errors.push(format!("{field_name}: required field is missing or empty"));
        return None;
    };
    match value.parse::<u32>() {
        Ok(0) => {
            errors.push(format!("{field_name}: must be greater than 0"));
            None
        }
        Ok(count) => Some(count),
        Err(_) => {
            errors.push(format!("{field_name}: invalid number '{value}'"));
            None
        }
    }
}

fn parse_date_field(
    get_field: &impl Fn(&str) -> Option<String>,
    field_name: &str,
    errors: &mut Vec<String>,
) -> Option<Date> {
    let value: String = parse_required_field(get_field, field_name, errors);
    if value.is_empty() {
        return None;
    }
    parse_date(&value).map_or_else(
        |e| {
            errors.push(format!("{field_name}: {e}"));
            None
        },
        Some,
    )
}

/// Builds the address shared by distribution and registration rows.
fn parse_address(
    get_field: &impl Fn(&str) -> Option<String>,
    errors: &mut Vec<String>,
) -> Address {
    let state: String = parse_required_field(get_field, "state", errors);
    let district: String = parse_required_field(get_field, "district", errors);
    let mut address: Address = Address::new(&state, &district);
    if let Some(town) = get_field("town") {
        address = address.with_town(&town);
    }
    if let Some(center) = get_field("center") {
        address = address.with_center(&center);
    }
    address
}

fn push_domain_error(errors: &mut Vec<String>, err: &DomainError) {
    errors.push(err.to_string());
}

/// A data row as read from the file, before field validation.
struct RawRow {
    row_number: usize,
    raw_data: String,
    record: Result<StringRecord, String>,
}

/// Reads a CSV file into its header map and raw rows.
///
/// Blank lines are dropped and every line is trimmed before parsing.
fn read_rows(
    csv_content: &str,
    required: &[&str],
) -> Result<(HashMap<String, usize>, Vec<RawRow>), ApiError> {
    let lines: Vec<&str> = csv_content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(ApiError::InvalidCsvFormat {
            reason: String::from("empty file"),
        });
    }

    let cleaned: String = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(cleaned.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers, required)?;

    // Raw text is sliced by byte position; quoted fields may span lines.
    let mut rows: Vec<RawRow> = Vec::new();
    let mut record: StringRecord = StringRecord::new();
    loop {
        let start: u64 = reader.position().byte();
        let result: Result<bool, csv::Error> = reader.read_record(&mut record);
        let end: u64 = reader.position().byte();
        let parsed: Result<StringRecord, String> = match result {
            Ok(false) => break,
            Ok(true) => Ok(record.clone()),
            Err(_) if end == start => break,
            Err(e) => Err(format!("CSV parse error: {e}")),
        };
        rows.push(RawRow {
            row_number: rows.len() + 1,
            raw_data: slice_bytes(&cleaned, start, end).trim().to_string(),
            record: parsed,
        });
    }

    Ok((header_map, rows))
}

fn slice_bytes(text: &str, start: u64, end: u64) -> &str {
    let start: usize = usize::try_from(start).unwrap_or(usize::MAX);
    let end: usize = usize::try_from(end).unwrap_or(usize::MAX);
    text.get(start..end).unwrap_or_default()
}

/// Runs a row parser over every raw row and tallies the verdicts.
fn build_preview<T>(
    rows: Vec<RawRow>,
    header_map: &HashMap<String, usize>,
    mut parse_row: impl FnMut(&dyn Fn(&str) -> Option<String>) -> Result<T, Vec<String>>,
) -> CsvPreviewResult<T> {
    let mut results: Vec<CsvRowResult<T>> = Vec::with_capacity(rows.len());

    for row in rows {
        let outcome: Result<T, Vec<String>> = match &row.record {
            Ok(record) => {
                let get_field = |name: &str| -> Option<String> {
                    header_map
                        .get(name)
                        .and_then(|&idx| record.get(idx))
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                };
                parse_row(&get_field)
            }
            Err(message) => Err(vec![message.clone()]),
        };

        let (status, errors, parsed): (CsvRowStatus, Vec<String>, Option<T>) = match outcome {
            Ok(parsed) => (CsvRowStatus::Valid, Vec::new(), Some(parsed)),
            Err(errors) => (CsvRowStatus::Invalid, errors, None),
        };
        results.push(CsvRowResult {
            row_number: row.row_number,
            status,
            errors,
            raw_data: row.raw_data,
            parsed,
        });
    }

    let total_rows: usize = results.len();
    let valid_count: usize = results
        .iter()
        .filter(|r| r.status == CsvRowStatus::Valid)
        .count();
    let invalid_count: usize = total_rows - valid_count;

    CsvPreviewResult {
        rows: results,
        total_rows,
        valid_count,
        invalid_count,
    }
}

/// Previews and validates a batch CSV without changing the inventory.
///
/// Batch names are checked against the inventory and against earlier rows
/// of the same file.
///
/// # Errors
///
/// Returns `ApiError::InvalidCsvFormat` if the file is empty or lacks a
/// required header.
pub fn preview_batches(
    csv_content: &str,
    inventory: &Inventory,
) -> Result<CsvPreviewResult<BatchRow>, ApiError> {
    let (header_map, rows): (HashMap<String, usize>, Vec<RawRow>) =
        read_rows(csv_content, BATCH_HEADERS)?;
    let mut seen_names: HashSet<String> = HashSet::new();

    Ok(build_preview(rows, &header_map, |get_field| {
        let mut errors: Vec<String> = Vec::new();
        let batch_name: String = parse_required_field(&get_field, "batch_name", &mut errors);
        let total_books: Option<u32> = parse_count_field(&get_field, "total_books", &mut errors);
        let serial_start: String = parse_required_field(&get_field, "serial_start", &mut errors);
        let serial_end: String = parse_required_field(&get_field, "serial_end", &mut errors);
        let printed_date: Option<Date> = parse_date_field(&get_field, "printed_date", &mut errors);

        if !batch_name.is_empty() {
            if let Err(e) = validate_batch_name(&batch_name) {
                push_domain_error(&mut errors, &e);
            }
            let key: String = batch_name.to_lowercase();
            if inventory.find_batch_by_name(&batch_name).is_some() {
                errors.push(format!("batch_name: batch '{batch_name}' already exists"));
            } else if !seen_names.insert(key) {
                errors.push(format!(
                    "batch_name: duplicate within CSV - '{batch_name}' appears multiple times"
                ));
            }
        }

        if let Some(total) = total_books
            && !serial_start.is_empty()
            && !serial_end.is_empty()
        {
            match serial_span(&serial_start, &serial_end) {
                Ok(Some(span)) if span != u64::from(total) => errors.push(format!(
                    "serial range '{serial_start}' - '{serial_end}' covers {span} books but total_books is {total}"
                )),
                Ok(_) => {}
                Err(e) => push_domain_error(&mut errors, &e),
            }
        }

        match (total_books, printed_date) {
            (Some(total_books), Some(printed_date)) if errors.is_empty() => Ok(BatchRow {
                batch_name,
                total_books,
                serial_start,
                serial_end,
                printed_date,
            }),
            _ => Err(errors),
        }
    }))
}

/// Previews and validates a distribution CSV without changing the inventory.
///
/// Each row's serials are expanded from `first_serial` and `count`. Stock
/// is checked against the inventory as it is now, so a row valid here can
/// still fail at commit once earlier rows have drawn down the same batch.
///
/// # Errors
///
/// Returns `ApiError::InvalidCsvFormat` if the file is empty or lacks a
/// required header.
#[allow(clippy::too_many_lines)]
pub fn preview_distributions(
    csv_content: &str,
    inventory: &Inventory,
) -> Result<CsvPreviewResult<DistributionRow>, ApiError> {
    let (header_map, rows): (HashMap<String, usize>, Vec<RawRow>) =
        read_rows(csv_content, DISTRIBUTION_HEADERS)?;
    let mut seen_serials: HashSet<String> = HashSet::new();

    Ok(build_preview(rows, &header_map, |get_field| {
        let mut errors: Vec<String> = Vec::new();
        let name: String = parse_required_field(&get_field, "name", &mut errors);
        let phone: String = parse_required_field(&get_field, "phone", &mut errors);
        let pssm_id: Option<String> = get_field("pssm_id");
        let type_str: String = parse_required_field(&get_field, "recipient_type", &mut errors);
        let address: Address = parse_address(&get_field, &mut errors);
        let first_serial: String = parse_required_field(&get_field, "first_serial", &mut errors);
        let count: Option<u32> = parse_count_field(&get_field, "count", &mut errors);

        let recipient_type: Option<RecipientType> = if type_str.is_empty() {
            None
        } else {
            type_str.parse::<RecipientType>().map_or_else(
                |e| {
                    push_domain_error(&mut errors, &e);
                    None
                },
                Some,
            )
        };

        let batch: Option<PrintBatch> = get_field("batch_name").and_then(|batch_name| {
            inventory.batch_by_name(&batch_name).map_or_else(
                |e| {
                    errors.push(format!("batch_name: {e}"));
                    None
                },
                |batch| Some(batch.clone()),
            )
        });

        // Stock comes first so an oversized count is never expanded.
        let mut book_serials: Vec<String> = Vec::new();
        if let Some(count) = count
            && !first_serial.is_empty()
        {
            let in_stock: Result<(), DomainError> = batch
                .as_ref()
                .map_or(Ok(()), |batch| batch.check_allocation(count));
            match in_stock.and_then(|()| expand_serials(&first_serial, count)) {
                Ok(serials) => book_serials = serials,
                Err(e) => push_domain_error(&mut errors, &e),
            }
        }
        for serial in &book_serials {
            if inventory.is_serial_assigned(serial) {
                errors.push(format!(
                    "first_serial: serial '{serial}' is already assigned to a book"
                ));
            } else if !seen_serials.insert(serial.clone()) {
                errors.push(format!(
                    "first_serial: serial '{serial}' appears in an earlier row"
                ));
            }
        }

        let Some(recipient_type) = recipient_type else {
            return Err(errors);
        };
        let recipient: Recipient =
            Recipient::new(&name, &phone, pssm_id.as_deref(), address, recipient_type);
        if (!name.is_empty() && !phone.is_empty())
            && let Err(e) = validate_recipient(&recipient)
        {
            push_domain_error(&mut errors, &e);
        }

        if errors.is_empty() {
            Ok(DistributionRow {
                recipient,
                batch,
                book_serials,
            })
        } else {
            Err(errors)
        }
    }))
}

/// Previews and validates a registration CSV without changing the inventory.
///
/// # Errors
///
/// Returns `ApiError::InvalidCsvFormat` if the file is empty or lacks a
/// required header.
pub fn preview_registrations(
    csv_content: &str,
    inventory: &Inventory,
) -> Result<CsvPreviewResult<RegistrationRow>, ApiError> {
    let (header_map, rows): (HashMap<String, usize>, Vec<RawRow>) =
        read_rows(csv_content, REGISTRATION_HEADERS)?;
    let mut seen_books: HashSet<String> = HashSet::new();

    Ok(build_preview(rows, &header_map, |get_field| {
        let mut errors: Vec<String> = Vec::new();
        let book_number: String = parse_required_field(&get_field, "book_number", &mut errors);
        let name: String = parse_required_field(&get_field, "name", &mut errors);
        let phone: String = parse_required_field(&get_field, "phone", &mut errors);
        let pssm_id: Option<String> = get_field("pssm_id");
        let address: Address = parse_address(&get_field, &mut errors);

        if !book_number.is_empty() {
            match inventory.book_by_number(&book_number) {
                Err(e) => errors.push(format!("book_number: {e}")),
                Ok(book) if !book.status().can_transition_to(BookStatus::Registered) => {
                    errors.push(format!(
                        "book_number: book '{book_number}' is {} and cannot be registered",
                        book.status()
                    ));
                }
                Ok(_) => {}
            }
            if !seen_books.insert(book_number.clone()) {
                errors.push(format!(
                    "book_number: duplicate within CSV - '{book_number}' appears multiple times"
                ));
            }
        }

        let details: RecipientDetails =
            RecipientDetails::new(&name, &phone, pssm_id.as_deref(), address);
        if (!name.is_empty() && !phone.is_empty())
            && let Err(e) = validate_recipient_details(&details)
        {
            push_domain_error(&mut errors, &e);
        }

        if errors.is_empty() {
            Ok(RegistrationRow {
                book_number,
                details,
            })
        } else {
            Err(errors)
        }
    }))
}
