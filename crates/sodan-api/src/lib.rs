//! JSON REST API for the registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sodan_core::store::RegistryStore`] plus a
//! [`sodan_core::credential::CredentialService`] for the household portal.
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sodan_api::api_router(state))
//! ```
//!
//! Staff routes authenticate with HTTP Basic against the staff table; the
//! `/portal` routes authenticate with the household code and secret.

pub mod auth;
pub mod contributions;
pub mod error;
pub mod events;
pub mod households;
pub mod persons;
pub mod portal;
pub mod stats;

#[cfg(test)]
mod testutil;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use sodan_core::{
  credential::CredentialService, notify::Notifier, store::RegistryStore,
};

pub use error::ApiError;

/// Shared handler state. Cloning is cheap; both fields are behind [`Arc`].
pub struct AppState<S, N> {
  pub store:       Arc<S>,
  pub credentials: Arc<CredentialService<S, N>>,
}

// Derived Clone would require S: Clone and N: Clone.
impl<S, N> Clone for AppState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      credentials: Arc::clone(&self.credentials),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(state: AppState<S, N>) -> Router<()>
where
  S: RegistryStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Households and their portal credentials
    .route(
      "/households",
      get(households::list::<S, N>).post(households::create::<S, N>),
    )
    .route(
      "/households/{id}",
      get(households::get_one::<S, N>)
        .put(households::update_one::<S, N>)
        .delete(households::delete_one::<S, N>),
    )
    .route(
      "/households/{id}/credentials",
      post(households::set_credentials::<S, N>)
        .delete(households::revoke_credentials::<S, N>),
    )
    .route(
      "/households/{id}/password",
      put(households::change_password::<S, N>),
    )
    // Persons
    .route(
      "/persons",
      get(persons::list::<S, N>).post(persons::create::<S, N>),
    )
    .route(
      "/persons/{id}",
      get(persons::get_one::<S, N>)
        .put(persons::update_one::<S, N>)
        .delete(persons::delete_one::<S, N>),
    )
    // Population events
    .route(
      "/events",
      get(events::list::<S, N>).post(events::create::<S, N>),
    )
    .route(
      "/events/{id}",
      get(events::get_one::<S, N>).delete(events::delete_one::<S, N>),
    )
    // Contributions
    .route(
      "/contributions",
      get(contributions::list::<S, N>).post(contributions::create::<S, N>),
    )
    .route(
      "/contributions/{id}",
      get(contributions::get_one::<S, N>)
        .delete(contributions::delete_one::<S, N>),
    )
    .route("/contributions/{id}/pay", post(contributions::pay_one::<S, N>))
    // Statistics
    .route("/stats/residency", get(stats::residency::<S, N>))
    .route("/stats/age-structure", get(stats::age::<S, N>))
    .route("/stats/movement", get(stats::movement_view::<S, N>))
    .route("/stats/household-sizes", get(stats::sizes::<S, N>))
    // Household portal
    .route("/portal/login", post(portal::login::<S, N>))
    .route("/portal/me", get(portal::me::<S, N>))
    .route("/portal/password", put(portal::change_password::<S, N>))
    .route(
      "/portal/contributions/{id}/pay",
      post(portal::pay_contribution::<S, N>),
    )
    .with_state(state)
}
