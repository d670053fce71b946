// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

/// Identifier of a print batch within an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

impl BatchId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a distribution record within an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionId(u64);

impl DistributionId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DistributionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single physical book within an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of party receiving a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientType {
    /// A single person.
    Individual,
    /// A center incharge.
    Center,
    /// A district incharge.
    District,
    /// An autonomous body outside the location hierarchy.
    Autonomous,
}

impl RecipientType {
    /// Converts this recipient type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Center => "Center",
            Self::District => "District",
            Self::Autonomous => "Autonomous",
        }
    }
}

impl FromStr for RecipientType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "center" | "centre" => Ok(Self::Center),
            "district" => Ok(Self::District),
            "autonomous" => Ok(Self::Autonomous),
            _ => Err(DomainError::InvalidRecipientType(s.to_string())),
        }
    }
}

impl std::fmt::Display for RecipientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured postal address anchored in the location hierarchy.
///
/// Addresses are kept as discrete fields and only joined into a single
/// string at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// The state name.
    pub state: String,
    /// The district name.
    pub district: String,
    /// The town (mandal) name.
    pub town: Option<String>,
    /// The center name.
    pub center: Option<String>,
    /// Free-form street line.
    pub line: Option<String>,
}

impl Address {
    /// Creates an address at district granularity.
    #[must_use]
    pub fn new(state: &str, district: &str) -> Self {
        Self {
            state: state.trim().to_string(),
            district: district.trim().to_string(),
            town: None,
            center: None,
            line: None,
        }
    }

    /// Sets the town.
    #[must_use]
    pub fn with_town(mut self, town: &str) -> Self {
        self.town = non_empty(town);
        self
    }

    /// Sets the center.
    #[must_use]
    pub fn with_center(mut self, center: &str) -> Self {
        self.center = non_empty(center);
        self
    }

    /// Sets the street line.
    #[must_use]
    pub fn with_line(mut self, line: &str) -> Self {
        self.line = non_empty(line);
        self
    }

    /// Joins the address into the human-readable form used in exports.
    #[must_use]
    pub fn display_line(&self) -> String {
        let parts: Vec<&str> = [
            self.line.as_deref(),
            self.center.as_deref(),
            self.town.as_deref(),
            Some(self.district.as_str()),
            Some(self.state.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
        parts.join(", ")
    }
}

/// Trims a string and maps empty values to `None`.
#[must_use]
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The party a distribution is made to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// The recipient's name.
    pub name: String,
    /// The recipient's phone number (10 digits).
    pub phone: String,
    /// Optional PSSM membership identifier.
    pub pssm_id: Option<String>,
    /// The recipient's address.
    pub address: Address,
    /// The recipient classification.
    pub recipient_type: RecipientType,
}

impl Recipient {
    /// Creates a new recipient.
    #[must_use]
    pub fn new(
        name: &str,
        phone: &str,
        pssm_id: Option<&str>,
        address: Address,
        recipient_type: RecipientType,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            pssm_id: pssm_id.and_then(non_empty),
            address,
            recipient_type,
        }
    }
}

/// The person currently responsible for a book's pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientDetails {
    /// The person's name.
    pub name: String,
    /// The person's phone number (10 digits).
    pub phone: String,
    /// Optional PSSM membership identifier.
    pub pssm_id: Option<String>,
    /// The person's address.
    pub address: Address,
}

impl RecipientDetails {
    /// Creates new recipient details.
    #[must_use]
    pub fn new(name: &str, phone: &str, pssm_id: Option<&str>, address: Address) -> Self {
        Self {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            pssm_id: pssm_id.and_then(non_empty),
            address,
        }
    }
}

impl From<&Recipient> for RecipientDetails {
    fn from(recipient: &Recipient) -> Self {
        Self {
            name: recipient.name.clone(),
            phone: recipient.phone.clone(),
            pssm_id: recipient.pssm_id.clone(),
            address: recipient.address.clone(),
        }
    }
}

/// A non-negative currency amount held in minor units (paise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole major units.
    #[must_use]
    pub const fn from_major(major: u64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.0
    }

    /// Adds two amounts, failing on overflow.
    ///
    /// # Errors
    ///
    /// Returns an error if the sum does not fit in the representation.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidAmount(String::from("total overflows")))
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: &str = s.trim();
        if value.is_empty() {
            return Err(DomainError::InvalidAmount(String::from(
                "amount cannot be empty",
            )));
        }
        if value.starts_with('-') {
            return Err(DomainError::InvalidAmount(format!(
                "'{value}' is negative"
            )));
        }

        let (major_str, minor_str): (&str, &str) = value.split_once('.').unwrap_or((value, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if major_str.is_empty() || !all_digits(major_str) || !all_digits(minor_str) {
            return Err(DomainError::InvalidAmount(format!(
                "'{value}' is not a number"
            )));
        }
        if minor_str.len() > 2 {
            return Err(DomainError::InvalidAmount(format!(
                "'{value}' has more than two decimal places"
            )));
        }

        let overflow = || DomainError::InvalidAmount(format!("'{value}' is too large"));
        let major: u64 = major_str.parse::<u64>().map_err(|_| overflow())?;
        let minor: u64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<u64>().map_err(|_| overflow())? * 10,
            _ => minor_str.parse::<u64>().map_err(|_| overflow())?,
        };

        major
            .checked_mul(100)
            .and_then(|m| m.checked_add(minor))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        raw.parse::<Self>().map_err(serde::de::Error::custom)
    }
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}
