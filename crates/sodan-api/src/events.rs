//! Handlers for `/events` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/events` | Optional `?person_id=<uuid>` |
//! | `POST`   | `/events` | Body: [`NewEventBody`]; `recorded_by` is the caller |
//! | `GET`    | `/events/:id` | 404 if not found |
//! | `DELETE` | `/events/:id` | Manager+ |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sodan_core::{
  event::{EventKind, NewEvent, PopulationEvent},
  notify::Notifier,
  staff::Role,
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{AppState, auth::StaffAuth, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub person_id: Option<Uuid>,
}

/// `GET /events[?person_id=<uuid>]`
pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PopulationEvent>>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let events = state
    .store
    .list_events(params.person_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(events))
}

/// JSON body accepted by `POST /events`. The recording staff user is taken
/// from the authenticated caller, not from the body.
#[derive(Debug, Deserialize)]
pub struct NewEventBody {
  pub person_id:   Uuid,
  /// Accepts the canonical tag or a legacy free-text label ("Khai sinh").
  #[serde(deserialize_with = "sodan_core::normalize::de_event_kind")]
  pub kind:        EventKind,
  pub description: Option<String>,
  pub occurred_on: NaiveDate,
}

/// `POST /events` — returns 201 + the stored event.
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  auth: StaffAuth,
  Json(body): Json<NewEventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  state
    .store
    .get_person(body.person_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("person {} not found", body.person_id))
    })?;

  let event = state
    .store
    .record_event(NewEvent {
      person_id:   body.person_id,
      kind:        body.kind,
      description: body.description,
      occurred_on: body.occurred_on,
      recorded_by: Some(auth.staff.staff_id),
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/:id`
pub async fn get_one<S, N>(
  State(state): State<AppState<S, N>>,
  _auth: StaffAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<PopulationEvent>, ApiError>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  let event = state
    .store
    .get_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(event))
}

/// `DELETE /events/:id` — requires Manager or above.
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
    .get_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;

  state.store.delete_event(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
