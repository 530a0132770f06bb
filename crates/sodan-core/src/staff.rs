//! Staff users and the role hierarchy for administrative endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Administrative role, ordered: `Staff < Manager < Admin`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Staff,
  Manager,
  Admin,
}

impl Role {
  /// Role-hierarchy check: does this role meet or exceed `required`?
  pub fn at_least(self, required: Role) -> bool { self >= required }
}

/// An administrative account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
  pub staff_id:      Uuid,
  pub username:      String,
  pub display_name:  String,
  pub role:          Role,
  /// Argon2 PHC string. Never exposed through the API.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::RegistryStore::add_staff`].
#[derive(Debug, Clone)]
pub struct NewStaffUser {
  pub username:      String,
  pub display_name:  String,
  pub role:          Role,
  pub password_hash: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_ordering() {
    assert!(Role::Admin.at_least(Role::Manager));
    assert!(Role::Manager.at_least(Role::Manager));
    assert!(!Role::Staff.at_least(Role::Manager));
    assert!(Role::Staff.at_least(Role::Staff));
  }
}
