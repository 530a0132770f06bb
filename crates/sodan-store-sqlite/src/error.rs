//! Error type for `sodan-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum tag did not match any known variant.
  #[error("undecodable column value: {0}")]
  Decode(String),

  #[error("household not found: {0}")]
  HouseholdNotFound(Uuid),

  #[error("household code already taken: {0}")]
  CodeTaken(String),

  /// The caller tried to persist a credential state where the active flag
  /// and the stored hash disagree.
  #[error("credential state for household {0} violates the active/hash pairing")]
  CredentialStateInvalid(Uuid),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("national id already taken: {0}")]
  NationalIdTaken(String),

  #[error("population event not found: {0}")]
  EventNotFound(Uuid),

  #[error("contribution not found: {0}")]
  ContributionNotFound(Uuid),

  #[error("contribution {0} is already paid")]
  AlreadyPaid(Uuid),

  #[error("staff username already taken: {0}")]
  UsernameTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
