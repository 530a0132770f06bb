//! Person — a registered resident, optionally attached to one household.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Residency registration state.
///
/// Legacy records carry this as free text; it is a closed enum at every
/// boundary here, with [`crate::normalize::residency_from_text`] as the
/// one-time mapping for legacy values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidencyStatus {
  Permanent,
  Temporary,
  Absent,
}

/// Registered gender. `Other` covers every value outside the male/female
/// vocabulary; the statistics layer splits it half-and-half across the
/// pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Other,
}

/// A registered person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:     Uuid,
  /// Owning household; `None` while unassigned.
  pub household_id:  Option<Uuid>,
  pub full_name:     String,
  /// `None` when unknown or unparseable; such records are skipped by the
  /// age pyramid.
  pub date_of_birth: Option<NaiveDate>,
  pub gender:        Gender,
  /// Unique national identification number.
  pub national_id:   String,
  /// Relationship to the head of household, e.g. "vợ", "con".
  pub relationship:  Option<String>,
  pub occupation:    Option<String>,
  pub education:     Option<String>,
  pub residency:     ResidencyStatus,
  pub deceased:      bool,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::RegistryStore::add_person`].
///
/// `gender` and `residency` deserialize through the normalization layer, so
/// legacy free-text values ("Thường trú", "Nữ") are accepted alongside the
/// canonical tags.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
  pub household_id:  Option<Uuid>,
  pub full_name:     String,
  pub date_of_birth: Option<NaiveDate>,
  #[serde(deserialize_with = "crate::normalize::de_gender")]
  pub gender:        Gender,
  pub national_id:   String,
  pub relationship:  Option<String>,
  pub occupation:    Option<String>,
  pub education:     Option<String>,
  #[serde(deserialize_with = "crate::normalize::de_residency")]
  pub residency:     ResidencyStatus,
}

/// Full-field replacement for a person's mutable columns.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonUpdate {
  pub household_id:  Option<Uuid>,
  pub full_name:     String,
  pub date_of_birth: Option<NaiveDate>,
  #[serde(deserialize_with = "crate::normalize::de_gender")]
  pub gender:        Gender,
  pub relationship:  Option<String>,
  pub occupation:    Option<String>,
  pub education:     Option<String>,
  #[serde(deserialize_with = "crate::normalize::de_residency")]
  pub residency:     ResidencyStatus,
  pub deceased:      bool,
}
