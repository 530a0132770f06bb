//! Handlers for `/stats` endpoints — the dashboard aggregations.
//!
//! | Method | Path | View |
//! |--------|------|------|
//! | `GET` | `/stats/residency` | [`ResidencyOverview`] |
//! | `GET` | `/stats/age-structure` | [`AgeStructure`] |
//! | `GET` | `/stats/movement` | [`MovementSummary`] |
//! | `GET` | `/stats/household-sizes` | [`HouseholdSizeSummary`] |
//!
//! Each handler pulls a full snapshot from the store and runs the pure
//! aggregation over it; nothing is cached or stored.

use axum::{Json, extract::State};
use chrono::Utc;
use sodan_core::{
  notify::Notifier,
  stats::{
    AgeStructure, HouseholdSizeSummary, MovementSummary, ResidencyOverview,
    age_structure, household_sizes, movement, residency_overview,
  },
  store::RegistryStore,
};

use crate::{AppState, auth::StaffAuth, error::ApiError};

/// `GET /stats/residency`
pub async fn residency<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
) -> Result<Json<ResidencyOverview>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let persons = state
    .store
    .list_persons(None)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(residency_overview(&persons)))
}

/// `GET /stats/age-structure`
pub async fn age<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
) -> Result<Json<AgeStructure>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let persons = state
    .store
    .list_persons(None)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(age_structure(&persons, Utc::now().date_naive())))
}

/// `GET /stats/movement`
pub async fn movement_view<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
) -> Result<Json<MovementSummary>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let events = state
    .store
    .list_events(None)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(movement(&events)))
}

/// `GET /stats/household-sizes`
pub async fn sizes<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
) -> Result<Json<HouseholdSizeSummary>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let households = state
    .store
    .list_households()
    .await
    .map_err(ApiError::store)?;
  let persons = state
    .store
    .list_persons(None)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(household_sizes(&households, &persons)))
}
