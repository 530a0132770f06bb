//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons` | Optional `?household_id=<uuid>` |
//! | `POST`   | `/persons` | Body: [`NewPerson`]; 409 if national id taken |
//! | `GET`    | `/persons/:id` | 404 if not found |
//! | `PUT`    | `/persons/:id` | Body: [`PersonUpdate`] |
//! | `DELETE` | `/persons/:id` | Manager+; removes the person's events |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sodan_core::{
  notify::Notifier,
  person::{NewPerson, Person, PersonUpdate},
  staff::Role,
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{AppState, auth::StaffAuth, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub household_id: Option<Uuid>,
}

/// `GET /persons[?household_id=<uuid>]`
pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let persons = state
    .store
    .list_persons(params.household_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(persons))
}

/// `POST /persons` — returns 201 + the stored person.
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  if body.full_name.trim().is_empty() {
    return Err(ApiError::BadRequest("full name is required".into()));
  }
  if body.national_id.trim().is_empty() {
    return Err(ApiError::BadRequest("national id is required".into()));
  }
  if state
    .store
    .get_person_by_national_id(&body.national_id)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!(
      "national id already registered: {}",
      body.national_id
    )));
  }
  if let Some(hid) = body.household_id {
    state
      .store
      .get_household(hid)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound(format!("household {hid} not found")))?;
  }

  let person = state.store.add_person(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /persons/:id`
pub async fn get_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let person = state
    .store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

/// `PUT /persons/:id`
pub async fn update_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
  Json(body): Json<PersonUpdate>,
) -> Result<Json<Person>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  state
    .store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;

  let person = state
    .store
    .update_person(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(person))
}

/// `DELETE /persons/:id` — requires Manager or above.
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
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;

  state
    .store
    .delete_person(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
