//! Population events — recorded life-cycle changes for a person.
//!
//! Events are an administrative log: recording one does not itself mutate
//! the referenced person. Read-only for aggregation purposes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of life-cycle change an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  Birth,
  Death,
  /// Change of household. Direction (moved in vs moved away) lives in the
  /// free-text description — see [`crate::normalize::is_move_out`].
  Migration,
  /// Temporary absence. Not counted by the movement view.
  Absence,
  /// Return from a temporary absence. Not counted by the movement view.
  Return,
}

impl EventKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Birth => "birth",
      Self::Death => "death",
      Self::Migration => "migration",
      Self::Absence => "absence",
      Self::Return => "return",
    }
  }
}

/// A recorded population event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationEvent {
  pub event_id:    Uuid,
  pub person_id:   Uuid,
  pub kind:        EventKind,
  pub description: Option<String>,
  /// The calendar date the change took place (not when it was entered).
  pub occurred_on: NaiveDate,
  /// The staff user who entered the record, when known.
  pub recorded_by: Option<Uuid>,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::RegistryStore::record_event`].
/// `recorded_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
  pub person_id:   Uuid,
  pub kind:        EventKind,
  pub description: Option<String>,
  pub occurred_on: NaiveDate,
  pub recorded_by: Option<Uuid>,
}
