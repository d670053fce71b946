// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::location_import::LocationImportError;
use bookdrive::CoreError;
use bookdrive_domain::DomainError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A batch does not hold enough books for an allocation.
    InsufficientStock {
        /// The batch name.
        batch_name: String,
        /// The number of books requested.
        requested: u32,
        /// The number of books still in stock.
        remaining: u32,
    },
    /// An uploaded file is not in the expected format.
    InvalidCsvFormat {
        /// Why the file was rejected.
        reason: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InsufficientStock {
                batch_name,
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "Insufficient stock: batch '{batch_name}' has {remaining} books remaining, {requested} requested"
                )
            }
            Self::InvalidCsvFormat { reason } => {
                write!(f, "Invalid file format: {reason}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<LocationImportError> for ApiError {
    fn from(err: LocationImportError) -> Self {
        Self::InvalidCsvFormat {
            reason: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidBatchName(msg) => ApiError::InvalidInput {
            field: String::from("batch_name"),
            message: msg,
        },
        DomainError::DuplicateBatchName(_) => ApiError::DomainRuleViolation {
            rule: String::from("unique_batch_name"),
            message,
        },
        DomainError::InvalidBookCount { .. } => ApiError::InvalidInput {
            field: String::from("total_books"),
            message,
        },
        DomainError::InvalidSerialRange { .. } => ApiError::InvalidInput {
            field: String::from("serial_range"),
            message,
        },
        DomainError::InvalidSerial(msg) => ApiError::InvalidInput {
            field: String::from("serial"),
            message: msg,
        },
        DomainError::BatchNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Batch"),
            message: format!("Batch {id} does not exist"),
        },
        DomainError::BatchNameNotFound(name) => ApiError::ResourceNotFound {
            resource_type: String::from("Batch"),
            message: format!("No batch is named '{name}'"),
        },
        DomainError::InvalidAllocation(msg) => ApiError::InvalidInput {
            field: String::from("count"),
            message: msg,
        },
        DomainError::InsufficientStock {
            batch_name,
            requested,
            remaining,
        } => ApiError::InsufficientStock {
            batch_name,
            requested,
            remaining,
        },
        DomainError::OverRelease { .. } => ApiError::DomainRuleViolation {
            rule: String::from("stock_within_total"),
            message,
        },
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidPhone(msg) => ApiError::InvalidInput {
            field: String::from("phone"),
            message: msg,
        },
        DomainError::InvalidAddress(msg) => ApiError::InvalidInput {
            field: String::from("address"),
            message: msg,
        },
        DomainError::InvalidRecipientType(_) => ApiError::InvalidInput {
            field: String::from("recipient_type"),
            message,
        },
        DomainError::EmptyBookSerials | DomainError::DuplicateSerial(_) => {
            ApiError::InvalidInput {
                field: String::from("book_serials"),
                message,
            }
        }
        DomainError::SerialAlreadyAssigned(_) => ApiError::DomainRuleViolation {
            rule: String::from("unique_book_serial"),
            message,
        },
        DomainError::DistributionNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Distribution"),
            message: format!("Distribution {id} does not exist"),
        },
        DomainError::DistributionLocked { .. } => ApiError::DomainRuleViolation {
            rule: String::from("distribution_locked"),
            message,
        },
        DomainError::BookNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Book"),
            message: format!("Book {id} does not exist"),
        },
        DomainError::BookNumberNotFound(number) => ApiError::ResourceNotFound {
            resource_type: String::from("Book"),
            message: format!("No book has serial '{number}'"),
        },
        DomainError::InvalidBookStatus(_) => ApiError::InvalidInput {
            field: String::from("status"),
            message,
        },
        DomainError::InvalidTransition { .. }
        | DomainError::BookNotRegistered { .. }
        | DomainError::BookFinalized { .. } => ApiError::DomainRuleViolation {
            rule: String::from("book_lifecycle"),
            message,
        },
        DomainError::ConfirmationRequired { .. } => ApiError::InvalidInput {
            field: String::from("confirmed"),
            message,
        },
        DomainError::InvalidPageNumber { .. } => ApiError::InvalidInput {
            field: String::from("page_number"),
            message,
        },
        DomainError::InvalidAmount(msg) => ApiError::InvalidInput {
            field: String::from("amount"),
            message: msg,
        },
        DomainError::DateParseError { .. } => ApiError::InvalidInput {
            field: String::from("date"),
            message,
        },
        DomainError::InvalidLocationName(msg) => ApiError::InvalidInput {
            field: String::from("location"),
            message: msg,
        },
        DomainError::LocationNotFound { path } => ApiError::ResourceNotFound {
            resource_type: String::from("Location"),
            message: format!("Location '{path}' does not exist"),
        },
        DomainError::DuplicateLocation { .. } => ApiError::DomainRuleViolation {
            rule: String::from("unique_location"),
            message,
        },
        DomainError::LocationInUse { .. } => ApiError::DomainRuleViolation {
            rule: String::from("location_in_use"),
            message,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}
