// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export of batches, distributions, and books.
//!
//! Every field is quoted. Export headers are written for people reading
//! the file in a spreadsheet and do not match the import headers.

use bookdrive::Inventory;
use bookdrive_domain::{DistributionProgress, format_date};

use crate::error::ApiError;

const BATCH_EXPORT_HEADERS: &[&str] = &[
    "Batch Name",
    "Total Books",
    "Remaining Books",
    "Distributed Books",
    "Serial Start",
    "Serial End",
    "Printed Date",
    "Status",
];

const DISTRIBUTION_EXPORT_HEADERS: &[&str] = &[
    "Date",
    "Recipient Name",
    "Phone",
    "PSSM ID",
    "Recipient Type",
    "Address",
    "Batch",
    "Book Numbers",
    "Count",
    "Registered",
    "Submitted",
];

const BOOK_EXPORT_HEADERS: &[&str] = &[
    "Book Number",
    "Batch",
    "Status",
    "Assigned To",
    "Phone",
    "PSSM ID",
    "Address",
    "Filled Pages",
    "Total Pages",
    "Total Amount",
    "Assigned Date",
    "Received Date",
];

fn write_csv(headers: &[&str], rows: Vec<Vec<String>>) -> Result<String, ApiError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    let write_err = |e: csv::Error| ApiError::Internal {
        message: format!("Failed to write CSV: {e}"),
    };
    writer.write_record(headers).map_err(write_err)?;
    for row in rows {
        writer.write_record(&row).map_err(write_err)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to flush CSV: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV output is not UTF-8: {e}"),
    })
}

/// Exports every batch, newest first.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the CSV cannot be written.
pub fn export_batches(inventory: &Inventory) -> Result<String, ApiError> {
    let rows: Vec<Vec<String>> = inventory
        .batches()
        .into_iter()
        .map(|b| {
            vec![
                b.batch_name().to_string(),
                b.total_books().to_string(),
                b.remaining_books().to_string(),
                b.distributed_books().to_string(),
                b.serial_start().to_string(),
                b.serial_end().to_string(),
                format_date(b.printed_date()),
                b.status().as_str().to_string(),
            ]
        })
        .collect();
    write_csv(BATCH_EXPORT_HEADERS, rows)
}

/// Exports every distribution, newest first, with computed rollups.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the CSV cannot be written.
pub fn export_distributions(inventory: &Inventory) -> Result<String, ApiError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in inventory.distributions(None) {
        let progress: DistributionProgress = inventory
            .distribution_progress(record.id)
            .unwrap_or_default();
        rows.push(vec![
            format_date(record.date),
            record.recipient.name.clone(),
            record.recipient.phone.clone(),
            record.recipient.pssm_id.clone().unwrap_or_default(),
            record.recipient.recipient_type.as_str().to_string(),
            record.recipient.address.display_line(),
            record.batch_name.clone().unwrap_or_default(),
            record.serial_range(),
            record.count().to_string(),
            progress.registered_count.to_string(),
            progress.submitted_count.to_string(),
        ]);
    }
    write_csv(DISTRIBUTION_EXPORT_HEADERS, rows)
}

/// Exports every book in serial order of creation.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the CSV cannot be written.
pub fn export_books(inventory: &Inventory) -> Result<String, ApiError> {
    let rows: Vec<Vec<String>> = inventory
        .books(None, None)
        .into_iter()
        .map(|book| {
            vec![
                book.book_number().to_string(),
                book.batch_name().unwrap_or_default().to_string(),
                book.status().as_str().to_string(),
                book.assigned_to().name.clone(),
                book.assigned_to().phone.clone(),
                book.assigned_to().pssm_id.clone().unwrap_or_default(),
                book.address().display_line(),
                book.filled_pages().to_string(),
                book.total_pages().to_string(),
                book.total_amount().to_string(),
                format_date(book.assigned_date()),
                book.received_date().map(format_date).unwrap_or_default(),
            ]
        })
        .collect();
    write_csv(BOOK_EXPORT_HEADERS, rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_export_has_quoted_header() {
        let csv: String = export_batches(&Inventory::new()).unwrap();
        assert_eq!(
            csv,
            "\"Batch Name\",\"Total Books\",\"Remaining Books\",\"Distributed Books\",\"Serial Start\",\"Serial End\",\"Printed Date\",\"Status\"\n"
        );
    }

    #[test]
    fn test_book_export_header_differs_from_import() {
        let csv: String = export_books(&Inventory::new()).unwrap();
        assert!(csv.starts_with("\"Book Number\""));
        assert!(!csv.contains("book_number"));
    }
}
