// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides the Axum extractor that resolves a bearer token
//! into the operator behind it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use bookdrive_api::AuthenticatedActor;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for authenticated operators.
///
/// Validates the session token from the Authorization header and yields the
/// authenticated actor together with the token itself.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionActor(actor, token): SessionActor,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // token: String
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if:
/// - Authorization header is missing
/// - Authorization header format is invalid
/// - The token does not name an open session
pub struct SessionActor(pub AuthenticatedActor, pub String);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        let sessions = state.sessions.lock().await;
        let (actor, _) = sessions.validate(token).map_err(|e| {
            warn!(error = %e, "Session validation failed");
            SessionError::InvalidSession(e.to_string())
        })?;

        debug!(
            login_name = %actor.id,
            role = %actor.role,
            "Session validated successfully"
        );

        Ok(Self(actor, token.to_string()))
    }
}

/// Session extraction errors.
///
/// These errors are returned when session validation fails and are
/// automatically converted to HTTP responses.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        (
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}
