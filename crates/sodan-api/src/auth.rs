//! HTTP Basic-auth extractors for the two account classes.
//!
//! [`StaffAuth`] authenticates administrative users against stored staff
//! accounts and carries the account for role checks. [`PortalAuth`]
//! authenticates a household (code + secret) through the credential
//! service's uniform-failure path. Both reject with the same opaque 401.

use axum::{extract::FromRequestParts, http::{HeaderMap, request::Parts}};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use sodan_core::{
  credential::SecretHasher,
  household::Household,
  notify::Notifier,
  staff::{Role, StaffUser},
  store::RegistryStore,
};

use crate::{AppState, error::ApiError};

/// Decode `Authorization: Basic …` into `(username, password)`.
fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())?;
  let encoded = header_val.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (user, pass) = creds.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

// ─── Staff ───────────────────────────────────────────────────────────────────

/// Present in a handler means the request carried valid staff credentials.
pub struct StaffAuth {
  pub staff: StaffUser,
}

impl StaffAuth {
  /// Role-hierarchy gate for destructive operations.
  pub fn require(&self, role: Role) -> Result<(), ApiError> {
    if self.staff.role.at_least(role) {
      Ok(())
    } else {
      Err(ApiError::Forbidden)
    }
  }
}

impl<S, N> FromRequestParts<AppState<S, N>> for StaffAuth
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, N>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) =
      parse_basic(&parts.headers).ok_or(ApiError::Unauthorized)?;

    let staff = state
      .store
      .get_staff_by_username(&username)
      .await
      .map_err(ApiError::store)?
      .ok_or(ApiError::Unauthorized)?;

    // The PHC string embeds its own parameters, so a default verifier works
    // for hashes produced under any cost setting.
    if !SecretHasher::default().verify(&password, &staff.password_hash) {
      return Err(ApiError::Unauthorized);
    }

    Ok(StaffAuth { staff })
  }
}

// ─── Portal ──────────────────────────────────────────────────────────────────

/// Present in a handler means the request carried a household's valid code
/// and secret.
pub struct PortalAuth {
  pub household: Household,
}

impl<S, N> FromRequestParts<AppState<S, N>> for PortalAuth
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, N>,
  ) -> Result<Self, Self::Rejection> {
    let (code, secret) =
      parse_basic(&parts.headers).ok_or(ApiError::Unauthorized)?;

    let household = state
      .credentials
      .validate(&code, &secret)
      .await
      .map_err(ApiError::from)?
      .ok_or(ApiError::Unauthorized)?;

    Ok(PortalAuth { household })
  }
}
