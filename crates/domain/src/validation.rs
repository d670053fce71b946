// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::book::TOTAL_PAGES;
use crate::error::DomainError;
use crate::types::{Address, Recipient, RecipientDetails, RecipientType};

/// Number of digits in a valid phone number.
const PHONE_DIGITS: usize = 10;

/// Validates a print batch name.
///
/// Uniqueness is not checked here; that requires the store.
///
/// # Errors
///
/// Returns an error if the name is empty after trimming.
pub fn validate_batch_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidBatchName(String::from(
            "Batch name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a person's name.
///
/// # Errors
///
/// Returns an error if the name is empty after trimming.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a phone number.
///
/// Spaces and dashes are ignored; what remains must be exactly ten ASCII
/// digits.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhone` if the number is malformed.
pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    let mut digits: usize = 0;
    for c in phone.chars().filter(|c| !c.is_whitespace() && *c != '-') {
        if !c.is_ascii_digit() {
            return Err(DomainError::InvalidPhone(format!(
                "'{phone}' contains a non-digit character"
            )));
        }
        digits += 1;
    }
    if digits != PHONE_DIGITS {
        return Err(DomainError::InvalidPhone(format!(
            "'{phone}' must have exactly {PHONE_DIGITS} digits, found {digits}"
        )));
    }
    Ok(())
}

/// Validates an address.
///
/// # Errors
///
/// Returns an error if:
/// - The state or district is empty
/// - A center is given without a town
pub fn validate_address(address: &Address) -> Result<(), DomainError> {
    if address.state.trim().is_empty() {
        return Err(DomainError::InvalidAddress(String::from(
            "State cannot be empty",
        )));
    }
    if address.district.trim().is_empty() {
        return Err(DomainError::InvalidAddress(String::from(
            "District cannot be empty",
        )));
    }
    if address.center.is_some() && address.town.is_none() {
        return Err(DomainError::InvalidAddress(String::from(
            "A center requires a town",
        )));
    }
    Ok(())
}

/// Validates a distribution recipient.
///
/// # Errors
///
/// Returns an error if any field is invalid, or if a center recipient has
/// no center in its address.
pub fn validate_recipient(recipient: &Recipient) -> Result<(), DomainError> {
    validate_name(&recipient.name)?;
    validate_phone(&recipient.phone)?;
    validate_address(&recipient.address)?;
    if recipient.recipient_type == RecipientType::Center && recipient.address.center.is_none() {
        return Err(DomainError::InvalidAddress(String::from(
            "A center recipient must name its center",
        )));
    }
    Ok(())
}

/// Validates the details of a book's responsible person.
///
/// # Errors
///
/// Returns an error if the name, phone, or address is invalid.
pub fn validate_recipient_details(details: &RecipientDetails) -> Result<(), DomainError> {
    validate_name(&details.name)?;
    validate_phone(&details.phone)?;
    validate_address(&details.address)
}

/// Validates a page number against the fixed page count.
///
/// # Errors
///
/// Returns `DomainError::InvalidPageNumber` unless `1 <= page <= 20`.
pub const fn validate_page_number(page: u8) -> Result<(), DomainError> {
    if page == 0 || page > TOTAL_PAGES {
        return Err(DomainError::InvalidPageNumber {
            page,
            max: TOTAL_PAGES,
        });
    }
    Ok(())
}

/// Validates a location node name.
///
/// # Errors
///
/// Returns an error if the name is empty or contains the path separator.
pub fn validate_location_name(name: &str) -> Result<(), DomainError> {
    let name: &str = name.trim();
    if name.is_empty() {
        return Err(DomainError::InvalidLocationName(String::from(
            "Location name cannot be empty",
        )));
    }
    if name.contains('/') {
        return Err(DomainError::InvalidLocationName(format!(
            "'{name}' cannot contain '/'"
        )));
    }
    Ok(())
}
