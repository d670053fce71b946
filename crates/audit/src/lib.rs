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

use bookdrive_domain::{BatchId, BookId, DistributionId};
use serde::Serialize;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// a logged-in operator acting under one of the roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor, usually the role name (e.g. "`SuperAdmin`").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g. request ID, import file name).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// The name of the action (e.g. "`CreateBatch`", "`SavePage`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The record an audit event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    /// A print batch.
    Batch(BatchId),
    /// A distribution record.
    Distribution(DistributionId),
    /// A single book.
    Book(BookId),
    /// A location node, by its display path.
    Location(String),
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batch(id) => write!(f, "batch {id}"),
            Self::Distribution(id) => write!(f, "distribution {id}"),
            Self::Book(id) => write!(f, "book {id}"),
            Self::Location(path) => write!(f, "location {path}"),
        }
    }
}

/// A compact textual snapshot of the affected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// The snapshot of a record that did not exist.
    #[must_use]
    pub fn absent() -> Self {
        Self::new(String::from("absent"))
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful command produces exactly one audit event capturing:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action) and on which record (subject)
/// - The state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// Sequence number assigned when the event is recorded.
    pub event_id: Option<u64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The record the action applied to.
    pub subject: Subject,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new, unrecorded `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `subject` - The record that changed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        subject: Subject,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            subject,
            before,
            after,
        }
    }

    /// Returns a copy carrying the given sequence number.
    #[must_use]
    pub fn with_event_id(mut self, event_id: u64) -> Self {
        self.event_id = Some(event_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_event() -> AuditEvent {
        AuditEvent::new(
            Actor::new(String::from("asha"), String::from("Distributor")),
            Cause::new(String::from("req-1"), String::from("API request")),
            Action::new(String::from("CreateBatch"), None),
            Subject::Batch(BatchId::new(1)),
            StateSnapshot::absent(),
            StateSnapshot::new(String::from("remaining=100")),
        )
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("user-123"), String::from("Staff"));

        assert_eq!(actor.id, "user-123");
        assert_eq!(actor.actor_type, "Staff");
    }

    #[test]
    fn test_action_creation_with_details() {
        let action: Action = Action::new(
            String::from("SavePage"),
            Some(String::from("page 3 of 1001")),
        );

        assert_eq!(action.name, "SavePage");
        assert_eq!(action.details, Some(String::from("page 3 of 1001")));
    }

    #[test]
    fn test_new_event_is_unrecorded() {
        let event: AuditEvent = create_test_event();
        assert_eq!(event.event_id, None);
        assert_eq!(event.before.data, "absent");

        let recorded: AuditEvent = event.clone().with_event_id(7);
        assert_eq!(recorded.event_id, Some(7));
        assert_eq!(recorded.action, event.action);
    }

    #[test]
    fn test_subject_display() {
        assert_eq!(Subject::Batch(BatchId::new(3)).to_string(), "batch 3");
        assert_eq!(
            Subject::Location(String::from("Telangana / Hyderabad")).to_string(),
            "location Telangana / Hyderabad"
        );
    }
}
