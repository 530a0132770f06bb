//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// Uniform authentication failure — deliberately carries no detail, so an
  /// unknown account and a wrong secret are indistinguishable.
  #[error("invalid credentials")]
  Unauthorized,

  #[error("insufficient role")]
  Forbidden,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error without committing to its concrete type.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<sodan_core::Error> for ApiError {
  fn from(e: sodan_core::Error) -> Self {
    use sodan_core::Error as E;
    match e {
      E::HouseholdNotFound(_)
      | E::PersonNotFound(_)
      | E::EventNotFound(_)
      | E::ContributionNotFound(_) => ApiError::NotFound(e.to_string()),
      E::CodeTaken(_) | E::AlreadyPaid(_) => ApiError::Conflict(e.to_string()),
      E::InvalidCredential => ApiError::Unauthorized,
      E::Validation(msg) => ApiError::BadRequest(msg),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "invalid credentials".to_owned())
      }
      ApiError::Forbidden => {
        (StatusCode::FORBIDDEN, "insufficient role".to_owned())
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"sodan\""),
      );
    }
    res
  }
}
