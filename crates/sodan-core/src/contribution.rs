//! Contributions — per-household levies and their payment state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A levy owed by one household.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
  pub contribution_id: Uuid,
  pub household_id:    Uuid,
  /// Free-text label, e.g. "quỹ vệ sinh 2024".
  pub kind:            String,
  /// Whole currency units; minor units are not tracked.
  pub amount:          i64,
  pub due_on:          Option<NaiveDate>,
  pub paid:            bool,
  pub paid_at:         Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::RegistryStore::add_contribution`].
/// Contributions start unpaid.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContribution {
  pub household_id: Uuid,
  pub kind:         String,
  pub amount:       i64,
  pub due_on:       Option<NaiveDate>,
}
