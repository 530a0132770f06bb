//! The `Notifier` trait — out-of-band delivery of issued credentials.
//!
//! Delivery is best-effort: the credential service logs a failure and moves
//! on. The secret is already committed by the time delivery is attempted, so
//! a transport error must never roll it back or fail the request.

use std::future::Future;

/// Abstraction over a credential-delivery transport (e-mail in production).
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Deliver a household's login code and plaintext secret to `to`.
  fn deliver_credentials<'a>(
    &'a self,
    to: &'a str,
    household_code: &'a str,
    secret: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// A notifier that drops everything — for tests and headless deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
  type Error = std::convert::Infallible;

  async fn deliver_credentials(
    &self,
    _to: &str,
    _household_code: &str,
    _secret: &str,
  ) -> Result<(), Self::Error> {
    Ok(())
  }
}
