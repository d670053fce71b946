// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Book serial arithmetic.
//!
//! Serials are strings with an optional alphabetic prefix followed by a
//! numeric suffix (`B1-0001`, `104233`). The numeric suffix drives range
//! expansion and natural ordering; zero padding is preserved.

use crate::distribution::check_distribution_size;
use crate::error::DomainError;
use std::cmp::Ordering;

/// A serial split into its prefix and numeric suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SerialParts<'a> {
    prefix: &'a str,
    number: u64,
    width: usize,
}

/// Splits a serial into prefix and trailing digits.
///
/// Returns `None` when the serial has no numeric suffix or the suffix
/// does not fit in a `u64`.
fn split_serial(serial: &str) -> Option<SerialParts<'_>> {
    let digits_start: usize = serial
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    let suffix: &str = &serial[digits_start..];
    let number: u64 = suffix.parse::<u64>().ok()?;
    Some(SerialParts {
        prefix: &serial[..digits_start],
        number,
        width: suffix.len(),
    })
}

/// Returns the number of serials in the inclusive range `start..=end`.
///
/// Returns `Ok(None)` when the endpoints cannot be compared numerically
/// (no numeric suffix, or different prefixes).
///
/// # Errors
///
/// Returns `DomainError::InvalidSerialRange` if `end` precedes `start`.
pub fn serial_span(start: &str, end: &str) -> Result<Option<u64>, DomainError> {
    let (Some(first), Some(last)) = (split_serial(start.trim()), split_serial(end.trim())) else {
        return Ok(None);
    };
    if first.prefix != last.prefix {
        return Ok(None);
    }
    if last.number < first.number {
        return Err(DomainError::InvalidSerialRange {
            start: start.to_string(),
            end: end.to_string(),
            reason: String::from("end precedes start"),
        });
    }
    Ok(Some(last.number - first.number + 1))
}

/// Expands a contiguous run of `count` serials beginning at `first`.
///
/// # Errors
///
/// Returns an error if `first` has no numeric suffix, `count` exceeds the
/// per-distribution limit, or the run overflows.
pub fn expand_serials(first: &str, count: u32) -> Result<Vec<String>, DomainError> {
    let count: u32 = check_distribution_size(usize::try_from(count).unwrap_or(usize::MAX))?;
    let first: &str = first.trim();
    let parts: SerialParts<'_> = split_serial(first).ok_or_else(|| {
        DomainError::InvalidSerial(format!("'{first}' has no numeric suffix to count from"))
    })?;

    (0..u64::from(count))
        .map(|offset| {
            let number: u64 = parts.number.checked_add(offset).ok_or_else(|| {
                DomainError::InvalidSerial(format!("range from '{first}' overflows"))
            })?;
            Ok(format!(
                "{}{:0width$}",
                parts.prefix,
                number,
                width = parts.width
            ))
        })
        .collect()
}

/// Compares two serials in natural order.
///
/// Serials sharing a prefix compare by numeric suffix; everything else
/// falls back to plain string order.
#[must_use]
pub fn compare_serials(a: &str, b: &str) -> Ordering {
    match (split_serial(a), split_serial(b)) {
        (Some(left), Some(right)) if left.prefix == right.prefix => left
            .number
            .cmp(&right.number)
            .then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Sorts serials in natural order.
pub fn sort_serials(serials: &mut [String]) {
    serials.sort_by(|a, b| compare_serials(a, b));
}

/// Formats a sorted set of serials for display.
///
/// One serial is shown as itself, several as `first - last`, and an empty
/// set as `-`. The string is a display convenience only.
#[must_use]
pub fn format_serial_range(serials: &[String]) -> String {
    match serials {
        [] => String::from("-"),
        [only] => only.clone(),
        [first, .., last] => format!("{first} - {last}"),
    }
}
