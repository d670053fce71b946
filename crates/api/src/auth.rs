// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use bookdrive_audit::Actor;
use std::collections::HashMap;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::AuthError;

/// Operator roles for authorization.
///
/// Roles are declared at login and decide which commands an operator may
/// run. Every role may read and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full control, including location management and reopening books.
    SuperAdmin,
    /// Prints batches and hands them out.
    Distributor,
    /// Runs a center or district: distributes, registers, and finalizes.
    Incharge,
    /// Takes responsibility for books and records donors.
    BookReceiver,
    /// Office staff recording donor pages and receiving books.
    Staff,
    /// Read-only access.
    Volunteer,
}

impl Role {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Distributor => "Distributor",
            Self::Incharge => "Incharge",
            Self::BookReceiver => "BookReceiver",
            Self::Staff => "Staff",
            Self::Volunteer => "Volunteer",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "superadmin" => Ok(Self::SuperAdmin),
            "distributor" => Ok(Self::Distributor),
            "incharge" => Ok(Self::Incharge),
            "bookreceiver" => Ok(Self::BookReceiver),
            "staff" => Ok(Self::Staff),
            "volunteer" => Ok(Self::Volunteer),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{s}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor (the login name).
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the logged-in operator.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Each check names the action it guards so a refusal can say what was
/// attempted and which roles would have been allowed.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(
        actor: &AuthenticatedActor,
        action: &str,
        allowed: &[Role],
    ) -> Result<(), AuthError> {
        if allowed.contains(&actor.role) {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<&str>>()
                .join(" or "),
        })
    }

    /// Checks if an actor may create or import print batches.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is a Super Admin or Distributor.
    pub fn authorize_create_batch(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            "create_batch",
            &[Role::SuperAdmin, Role::Distributor],
        )
    }

    /// Checks if an actor may create, change, cancel, or import
    /// distributions.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is a Super Admin, Distributor, or
    /// Incharge.
    pub fn authorize_distribute(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            "distribute",
            &[Role::SuperAdmin, Role::Distributor, Role::Incharge],
        )
    }

    /// Checks if an actor may change the location hierarchy.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is a Super Admin.
    pub fn authorize_manage_locations(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::SuperAdmin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("manage_locations"),
                required_role: String::from("SuperAdmin"),
            }),
        }
    }

    /// Checks if an actor may register the person responsible for a book.
    ///
    /// # Errors
    ///
    /// Returns an error for Staff and Volunteers.
    pub fn authorize_register_recipient(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            "register_recipient",
            &[
                Role::SuperAdmin,
                Role::Distributor,
                Role::Incharge,
                Role::BookReceiver,
            ],
        )
    }

    /// Checks if an actor may record donor pages.
    ///
    /// # Errors
    ///
    /// Returns an error for Volunteers.
    pub fn authorize_save_page(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            "save_page",
            &[
                Role::SuperAdmin,
                Role::Distributor,
                Role::Incharge,
                Role::BookReceiver,
                Role::Staff,
            ],
        )
    }

    /// Checks if an actor may mark a book as received.
    ///
    /// # Errors
    ///
    /// Returns an error for Distributors and Volunteers.
    pub fn authorize_finalize_book(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            "finalize_book",
            &[
                Role::SuperAdmin,
                Role::Incharge,
                Role::BookReceiver,
                Role::Staff,
            ],
        )
    }

    /// Checks if an actor may return a received book to editing.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is a Super Admin.
    pub fn authorize_reopen_book(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::SuperAdmin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("reopen_book"),
                required_role: String::from("SuperAdmin"),
            }),
        }
    }
}

/// A logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The bearer token identifying this session.
    pub token: String,
    /// The name the operator logged in with.
    pub login_name: String,
    /// The role declared at login.
    pub role: Role,
    /// When the session was created, RFC 3339.
    pub created_at: String,
}

/// In-memory session registry.
///
/// Sessions never expire; they last until logout or process exit.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    /// Creates an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for an operator.
    ///
    /// No credential check is performed; the login name and role are taken
    /// as given.
    ///
    /// # Arguments
    ///
    /// * `login_name` - The operator's login name
    /// * `role` - The role name the operator is acting as
    ///
    /// # Returns
    ///
    /// The new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name is empty or the role is unknown.
    pub fn login(&mut self, login_name: &str, role: &str) -> Result<Session, AuthError> {
        let login_name: &str = login_name.trim();
        if login_name.is_empty() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Login name cannot be empty"),
            });
        }
        let role: Role = role.parse()?;

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let session: Session = Session {
            token: Self::generate_session_token(now),
            login_name: login_name.to_string(),
            role,
            created_at: now
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| now.unix_timestamp().to_string()),
        };
        self.sessions
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    /// Resolves a session token into its actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not name an open session.
    pub fn validate(&self, token: &str) -> Result<(AuthenticatedActor, &Session), AuthError> {
        let session: &Session =
            self.sessions
                .get(token)
                .ok_or_else(|| AuthError::AuthenticationFailed {
                    reason: String::from("Session not found"),
                })?;
        Ok((
            AuthenticatedActor::new(session.login_name.clone(), session.role),
            session,
        ))
    }

    /// Closes a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not name an open session.
    pub fn logout(&mut self, token: &str) -> Result<Session, AuthError> {
        self.sessions
            .remove(token)
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Session not found"),
            })
    }

    /// Returns the number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns whether no sessions are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn generate_session_token(now: OffsetDateTime) -> String {
        let timestamp: i128 = now.unix_timestamp_nanos();
        format!("session_{timestamp}_{}", rand::random::<u64>())
    }
}
