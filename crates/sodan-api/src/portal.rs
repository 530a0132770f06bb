//! Handlers for the household self-service portal.
//!
//! | Method | Path | What it does |
//! |--------|------|--------------|
//! | `POST` | `/portal/login` | Check a code/secret pair |
//! | `GET` | `/portal/me` | Household record, members, contributions |
//! | `PUT` | `/portal/password` | Rotate the household secret |
//! | `POST` | `/portal/contributions/{id}/pay` | Settle an own contribution |
//!
//! Everything past `/portal/login` authenticates with HTTP Basic where the
//! username is the household code, via [`PortalAuth`]. A household only ever
//! sees its own rows; foreign contribution ids come back as 404, not 403, so
//! the portal leaks nothing about other households' ids.

use axum::{Json, extract::{Path, State}};
use serde::{Deserialize, Serialize};
use sodan_core::{
  contribution::Contribution,
  household::Household,
  notify::Notifier,
  person::Person,
  store::{ContributionFilter, RegistryStore},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::PortalAuth,
  error::ApiError,
  households::ChangePasswordBody,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub code:   String,
  pub secret: String,
}

/// `POST /portal/login`
///
/// Returns the household on a match and a uniform 401 otherwise.
pub async fn login<S, N>(
  State(state): State<AppState<S, N>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Household>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let household = state
    .credentials
    .validate(&body.code, &body.secret)
    .await?
    .ok_or(ApiError::Unauthorized)?;
  Ok(Json(household))
}

#[derive(Debug, Serialize)]
pub struct PortalOverview {
  pub household:     Household,
  pub members:       Vec<Person>,
  pub contributions: Vec<Contribution>,
}

/// `GET /portal/me`
pub async fn me<S, N>(
  State(state): State<AppState<S, N>>,
  auth: PortalAuth,
) -> Result<Json<PortalOverview>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let household_id = auth.household.household_id;
  let members = state
    .store
    .list_persons(Some(household_id))
    .await
    .map_err(ApiError::store)?;
  let contributions = state
    .store
    .list_contributions(ContributionFilter {
      household_id: Some(household_id),
      unpaid_only:  false,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(PortalOverview {
    household: auth.household,
    members,
    contributions,
  }))
}

/// `PUT /portal/password`
pub async fn change_password<S, N>(
  State(state): State<AppState<S, N>>,
  auth: PortalAuth,
  Json(body): Json<ChangePasswordBody>,
) -> Result<Json<Household>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  crate::households::check_secret_len(&body.new)?;
  let household = state
    .credentials
    .change_password(auth.household.household_id, &body.current, &body.new)
    .await?;
  Ok(Json(household))
}

/// `POST /portal/contributions/{id}/pay`
pub async fn pay_contribution<S, N>(
  State(state): State<AppState<S, N>>,
  auth: PortalAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<Contribution>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let contribution = state
    .store
    .get_contribution(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contribution {id} not found")))?;

  if contribution.household_id != auth.household.household_id {
    return Err(ApiError::NotFound(format!("contribution {id} not found")));
  }

  crate::contributions::mark_paid(&state, id).await
}
