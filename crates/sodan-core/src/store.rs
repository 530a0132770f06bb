//! The `RegistryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `sodan-store-sqlite`).
//! Higher layers (`sodan-api`, the credential service) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  contribution::{Contribution, NewContribution},
  event::{NewEvent, PopulationEvent},
  household::{Household, HouseholdUpdate, NewHousehold},
  person::{NewPerson, Person, PersonUpdate},
  staff::{NewStaffUser, StaffUser},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RegistryStore::list_contributions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContributionFilter {
  /// Restrict to one household.
  pub household_id: Option<Uuid>,
  /// If `true`, only contributions that are not yet paid.
  pub unpaid_only:  bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a registry storage backend.
///
/// Rows mutate in place; each request handler works against a consistent view
/// provided by the backend's own row-level isolation. The bulk `list_*`
/// operations return full snapshots for the statistics aggregator.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Households ────────────────────────────────────────────────────────

  /// Create a household. New households start with no secret and
  /// `active = false`. Fails if the code is already taken.
  fn add_household(
    &self,
    input: NewHousehold,
  ) -> impl Future<Output = Result<Household, Self::Error>> + Send + '_;

  /// Retrieve a household by id. Returns `None` if not found.
  fn get_household(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Household>, Self::Error>> + Send + '_;

  /// Retrieve a household by its unique registration code.
  fn get_household_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Household>, Self::Error>> + Send + 'a;

  fn list_households(
    &self,
  ) -> impl Future<Output = Result<Vec<Household>, Self::Error>> + Send + '_;

  /// Replace the mutable (non-credential) fields of a household.
  fn update_household(
    &self,
    id: Uuid,
    update: HouseholdUpdate,
  ) -> impl Future<Output = Result<Household, Self::Error>> + Send + '_;

  /// Delete a household. Member persons are detached (their
  /// `household_id` is cleared), not deleted.
  fn delete_household(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The single write path for household credentials.
  ///
  /// Must reject combinations violating the invariant that `active`
  /// implies a stored hash and vice versa.
  fn set_household_secret(
    &self,
    id: Uuid,
    secret_hash: Option<String>,
    active: bool,
  ) -> impl Future<Output = Result<Household, Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by their unique national identification number.
  fn get_person_by_national_id<'a>(
    &'a self,
    national_id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// List persons, optionally restricted to one household's members.
  fn list_persons(
    &self,
    household_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn update_person(
    &self,
    id: Uuid,
    update: PersonUpdate,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Delete a person together with their recorded events.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Population events ─────────────────────────────────────────────────

  /// Record an event. `recorded_at` is set by the store. Recording an
  /// event does not mutate the referenced person.
  fn record_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<PopulationEvent, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PopulationEvent>, Self::Error>> + Send + '_;

  /// List events, optionally restricted to one person.
  fn list_events(
    &self,
    person_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<PopulationEvent>, Self::Error>> + Send + '_;

  fn delete_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Contributions ─────────────────────────────────────────────────────

  fn add_contribution(
    &self,
    input: NewContribution,
  ) -> impl Future<Output = Result<Contribution, Self::Error>> + Send + '_;

  fn get_contribution(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contribution>, Self::Error>> + Send + '_;

  fn list_contributions(
    &self,
    filter: ContributionFilter,
  ) -> impl Future<Output = Result<Vec<Contribution>, Self::Error>> + Send + '_;

  /// Mark a contribution paid at `paid_at`. Fails if it is already paid.
  fn mark_paid(
    &self,
    id: Uuid,
    paid_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Contribution, Self::Error>> + Send + '_;

  fn delete_contribution(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Staff ─────────────────────────────────────────────────────────────

  /// Create a staff account. Fails if the username is already taken.
  fn add_staff(
    &self,
    input: NewStaffUser,
  ) -> impl Future<Output = Result<StaffUser, Self::Error>> + Send + '_;

  fn get_staff_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<StaffUser>, Self::Error>> + Send + 'a;
}
