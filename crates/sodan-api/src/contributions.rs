//! Handlers for `/contributions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contributions` | Optional `?household_id=<uuid>&unpaid=true` |
//! | `POST`   | `/contributions` | Body: [`NewContribution`] |
//! | `GET`    | `/contributions/:id` | 404 if not found |
//! | `POST`   | `/contributions/:id/pay` | 409 if already paid |
//! | `DELETE` | `/contributions/:id` | Manager+ |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use sodan_core::{
  contribution::{Contribution, NewContribution},
  notify::Notifier,
  staff::Role,
  store::{ContributionFilter, RegistryStore},
};
use uuid::Uuid;

use crate::{AppState, auth::StaffAuth, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub household_id: Option<Uuid>,
  #[serde(default)]
  pub unpaid:       bool,
}

/// `GET /contributions[?household_id=<uuid>][&unpaid=true]`
pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contribution>>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let contributions = state
    .store
    .list_contributions(ContributionFilter {
      household_id: params.household_id,
      unpaid_only:  params.unpaid,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contributions))
}

/// `POST /contributions` — returns 201 + the stored contribution.
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Json(body): Json<NewContribution>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  if body.amount < 0 {
    return Err(ApiError::BadRequest("amount must not be negative".into()));
  }
  state
    .store
    .get_household(body.household_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("household {} not found", body.household_id))
    })?;

  let contribution = state
    .store
    .add_contribution(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(contribution)))
}

/// `GET /contributions/:id`
pub async fn get_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
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
  Ok(Json(contribution))
}

/// `POST /contributions/:id/pay` — staff-recorded payment (e.g. cash at the
/// office). Gateway-driven payments come in through the portal instead.
pub async fn pay_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<Contribution>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  mark_paid(&state, id).await
}

/// `DELETE /contributions/:id` — requires Manager or above.
pub async fn delete_one<S, N>(
  State(state): State<AppState<S, N>>,
  auth: StaffAuth,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  auth.require(Role::Manager)?;
  state
    .store
    .get_contribution(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contribution {id} not found")))?;

  state
    .store
    .delete_contribution(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// Shared payment path for the staff and portal endpoints. A repeat payment
/// is a 409; backend failures stay 500s.
pub(crate) async fn mark_paid<S, N>(
  state: &AppState<S, N>,
  id: Uuid,
) -> Result<Json<Contribution>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let current = state
    .store
    .get_contribution(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contribution {id} not found")))?;

  if current.paid {
    return Err(ApiError::Conflict(format!(
      "contribution {id} is already paid"
    )));
  }

  let paid = state
    .store
    .mark_paid(id, Utc::now())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(paid))
}
