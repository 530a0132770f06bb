//! Error types for `sodan-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("household not found: {0}")]
  HouseholdNotFound(Uuid),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("population event not found: {0}")]
  EventNotFound(Uuid),

  #[error("contribution not found: {0}")]
  ContributionNotFound(Uuid),

  #[error("household code already taken: {0}")]
  CodeTaken(String),

  #[error("contribution {0} is already paid")]
  AlreadyPaid(Uuid),

  /// Uniform authentication failure. Never carries detail about *which*
  /// check failed (unknown account, inactive account, wrong secret).
  #[error("invalid credentials")]
  InvalidCredential,

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("password hash error: {0}")]
  Hash(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error without committing to its concrete type.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
