//! Household — the administrative unit that groups persons at an address.
//!
//! A household doubles as a portal login identity: its unique `code` is the
//! username, and `secret_hash` holds the argon2 PHC string once a secret has
//! been issued. The pair (`secret_hash`, `active`) moves together — see
//! [`Household::credential_invariant_holds`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An administrative household record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
  pub household_id: Uuid,
  /// Unique human-readable registration code; the portal login username.
  pub code:         String,
  pub street:       Option<String>,
  pub ward:         Option<String>,
  pub district:     Option<String>,
  /// Free-text classification tag (e.g. "family", "collective").
  pub kind:         String,
  /// Destination for credential delivery; portal access cannot be notified
  /// without one.
  pub email:        Option<String>,
  /// Argon2 PHC string. Never exposed through the API.
  #[serde(skip_serializing, default)]
  pub secret_hash:  Option<String>,
  /// True once a secret has been set and portal login is allowed.
  pub active:       bool,
  pub created_at:   DateTime<Utc>,
}

impl Household {
  /// `active = true` must imply a stored hash, and `active = false` must
  /// imply no stored hash. Checked after every credential lifecycle
  /// operation; also enforced by the storage schema.
  pub fn credential_invariant_holds(&self) -> bool {
    self.active == self.secret_hash.is_some()
  }
}

/// Input to [`crate::store::RegistryStore::add_household`].
/// New households start inert: no secret, not active.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHousehold {
  pub code:     String,
  pub street:   Option<String>,
  pub ward:     Option<String>,
  pub district: Option<String>,
  pub kind:     String,
  pub email:    Option<String>,
}

/// Full-field replacement for the mutable (non-credential) columns.
#[derive(Debug, Clone, Deserialize)]
pub struct HouseholdUpdate {
  pub street:   Option<String>,
  pub ward:     Option<String>,
  pub district: Option<String>,
  pub kind:     String,
  pub email:    Option<String>,
}
