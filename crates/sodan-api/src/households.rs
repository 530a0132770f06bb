//! Handlers for `/households` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/households` | All households |
//! | `POST`   | `/households` | Body: [`NewHousehold`]; 409 if code taken |
//! | `GET`    | `/households/:id` | 404 if not found |
//! | `PUT`    | `/households/:id` | Body: [`HouseholdUpdate`] |
//! | `DELETE` | `/households/:id` | Manager+; members are detached |
//! | `POST`   | `/households/:id/credentials` | Set or generate the secret |
//! | `PUT`    | `/households/:id/password` | Body: `{"current":..,"new":..}` |
//! | `DELETE` | `/households/:id/credentials` | Manager+; revoke portal access |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sodan_core::{
  credential::MIN_SECRET_LEN,
  household::{Household, HouseholdUpdate, NewHousehold},
  notify::Notifier,
  staff::Role,
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{AppState, auth::StaffAuth, error::ApiError};

/// Minimum-length policy for caller-chosen secrets; generated secrets are
/// longer by construction.
pub(crate) fn check_secret_len(secret: &str) -> Result<(), ApiError> {
  if secret.chars().count() < MIN_SECRET_LEN {
    return Err(ApiError::BadRequest(format!(
      "secret must be at least {MIN_SECRET_LEN} characters"
    )));
  }
  Ok(())
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

/// `GET /households`
pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
) -> Result<Json<Vec<Household>>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let households = state
    .store
    .list_households()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(households))
}

/// `POST /households` — returns 201 + the stored household.
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Json(body): Json<NewHousehold>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  if body.code.trim().is_empty() {
    return Err(ApiError::BadRequest("household code is required".into()));
  }
  if state
    .store
    .get_household_by_code(&body.code)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!(
      "household code already taken: {}",
      body.code
    )));
  }

  let household = state
    .store
    .add_household(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(household)))
}

/// `GET /households/:id`
pub async fn get_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<Household>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let household = state
    .store
    .get_household(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("household {id} not found")))?;
  Ok(Json(household))
}

/// `PUT /households/:id`
pub async fn update_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
  Json(body): Json<HouseholdUpdate>,
) -> Result<Json<Household>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  ensure_household(&state, id).await?;
  let household = state
    .store
    .update_household(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(household))
}

/// `DELETE /households/:id` — requires Manager or above.
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
  ensure_household(&state, id).await?;
  state
    .store
    .delete_household(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Credential lifecycle ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SetCredentialsBody {
  /// Caller-chosen secret; when omitted one is generated and delivered to
  /// the household's email.
  pub secret: Option<String>,
}

/// Response for `POST /households/:id/credentials`. `secret` is present only
/// when one was generated — it is shown to staff exactly once.
#[derive(Debug, Serialize)]
pub struct CredentialsResponse {
  pub household: Household,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub secret:    Option<String>,
}

/// `POST /households/:id/credentials`
///
/// The body may be omitted entirely; a missing body, `{}`, and
/// `{"secret": null}` all mean "generate one".
pub async fn set_credentials<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
  body: Option<Json<SetCredentialsBody>>,
) -> Result<Json<CredentialsResponse>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  match body.and_then(|Json(b)| b.secret) {
    Some(secret) => {
      check_secret_len(&secret)?;
      let household = state.credentials.set_password(id, &secret).await?;
      Ok(Json(CredentialsResponse { household, secret: None }))
    }
    None => {
      let issued = state.credentials.issue(id).await?;
      Ok(Json(CredentialsResponse {
        household: issued.household,
        secret:    Some(issued.secret),
      }))
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
  pub current: String,
  pub new:     String,
}

/// `PUT /households/:id/password`
pub async fn change_password<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
  Json(body): Json<ChangePasswordBody>,
) -> Result<Json<Household>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  check_secret_len(&body.new)?;
  let household = state
    .credentials
    .change_password(id, &body.current, &body.new)
    .await?;
  Ok(Json(household))
}

/// `DELETE /households/:id/credentials` — requires Manager or above.
pub async fn revoke_credentials<S, N>(
  State(state): State<AppState<S, N>>,
  auth: StaffAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<Household>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  auth.require(Role::Manager)?;
  let household = state.credentials.revoke(id).await?;
  Ok(Json(household))
}

async fn ensure_household<S, N>(
  state: &AppState<S, N>,
  id: Uuid,
) -> Result<(), ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  state
    .store
    .get_household(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("household {id} not found")))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::testutil::{MemStore, app_state, staff};

  #[tokio::test]
  async fn credentials_endpoint_generates_a_secret_without_a_body() {
    let store = Arc::new(MemStore::default());
    let household = store.insert_household("HK-0001");
    let state = app_state(Arc::clone(&store));

    let Json(res) = set_credentials(
      State(state),
      staff(),
      Path(household.household_id),
      None,
    )
    .await
    .unwrap();

    assert!(res.secret.is_some());
    assert!(res.household.active);
    assert!(res.household.credential_invariant_holds());
  }

  #[tokio::test]
  async fn credentials_endpoint_keeps_a_chosen_secret_out_of_the_response() {
    let store = Arc::new(MemStore::default());
    let household = store.insert_household("HK-0001");
    let state = app_state(Arc::clone(&store));

    let body = SetCredentialsBody { secret: Some("hoa-sua-2024".into()) };
    let Json(res) = set_credentials(
      State(state),
      staff(),
      Path(household.household_id),
      Some(Json(body)),
    )
    .await
    .unwrap();

    assert!(res.secret.is_none());
    assert!(res.household.active);
  }

  #[tokio::test]
  async fn credentials_endpoint_rejects_a_short_secret() {
    let store = Arc::new(MemStore::default());
    let household = store.insert_household("HK-0001");
    let state = app_state(store);

    let body = SetCredentialsBody { secret: Some("abc".into()) };
    let err = set_credentials(
      State(state),
      staff(),
      Path(household.household_id),
      Some(Json(body)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::BadRequest(_)), "got {err:?}");
  }
}
