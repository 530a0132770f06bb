//! Household credential lifecycle.
//!
//! A household's login secret is opaque at rest and only ever compared,
//! never reversed. The lifecycle is: inert household (no hash, inactive) →
//! secret set/issued (hash stored, active) → optional changes → optional
//! revocation (hash cleared, inactive). Every step preserves the invariant
//! that `active` and a stored hash go together.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use rand_core::{OsRng, RngCore as _};
use uuid::Uuid;

use crate::{
  Error, Result,
  household::Household,
  notify::Notifier,
  store::RegistryStore,
};

/// Minimum length accepted for caller-chosen secrets. Enforced at the API
/// boundary, not re-checked by the service.
pub const MIN_SECRET_LEN: usize = 6;

/// Length of generated secrets.
pub const DEFAULT_SECRET_LEN: usize = 10;

const ALPHABET: &[u8; 62] =
  b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// ─── Secret generation ───────────────────────────────────────────────────────

/// Generate a random alphanumeric secret of `len` symbols from the OS
/// CSPRNG.
///
/// Rejection sampling: bytes ≥ 248 are discarded so every one of the 62
/// symbols is equally likely.
pub fn generate_secret(len: usize) -> String {
  let mut out = String::with_capacity(len);
  let mut buf = [0u8; 32];
  while out.len() < len {
    OsRng.fill_bytes(&mut buf);
    for &b in &buf {
      if out.len() == len {
        break;
      }
      if b < 4 * 62 {
        out.push(ALPHABET[(b % 62) as usize] as char);
      }
    }
  }
  out
}

// ─── Hashing ─────────────────────────────────────────────────────────────────

/// Argon2 wrapper producing and verifying PHC strings.
#[derive(Clone, Default)]
pub struct SecretHasher {
  argon2: Argon2<'static>,
}

impl SecretHasher {
  /// A hasher with non-default cost parameters.
  pub fn with_params(params: argon2::Params) -> Self {
    Self {
      argon2: Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
      ),
    }
  }

  /// Hash `plain` with a fresh random salt.
  pub fn hash(&self, plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .argon2
      .hash_password(plain.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| Error::Hash(e.to_string()))
  }

  /// Verify `plain` against a stored PHC string. A malformed stored hash
  /// verifies as false rather than erroring.
  pub fn verify(&self, plain: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
      return false;
    };
    self
      .argon2
      .verify_password(plain.as_bytes(), &parsed)
      .is_ok()
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// A freshly issued secret, returned to the (staff) caller exactly once.
#[derive(Debug, Clone)]
pub struct IssuedSecret {
  pub household: Household,
  pub secret:    String,
}

/// Credential lifecycle operations over a [`RegistryStore`] and a
/// [`Notifier`].
#[derive(Clone)]
pub struct CredentialService<S, N> {
  store:      Arc<S>,
  notifier:   Arc<N>,
  hasher:     SecretHasher,
  /// Verified against on the no-stored-hash branches of [`Self::validate`]
  /// so timing does not distinguish an unknown account from a wrong secret.
  dummy_hash: String,
}

impl<S, N> CredentialService<S, N>
where
  S: RegistryStore,
  N: Notifier,
{
  pub fn new(store: Arc<S>, notifier: Arc<N>) -> Result<Self> {
    Self::with_hasher(store, notifier, SecretHasher::default())
  }

  pub fn with_hasher(
    store: Arc<S>,
    notifier: Arc<N>,
    hasher: SecretHasher,
  ) -> Result<Self> {
    let dummy_hash = hasher.hash("sodan.timing.pad")?;
    Ok(Self { store, notifier, hasher, dummy_hash })
  }

  /// Hash `plain` and persist it, activating the household's portal login.
  ///
  /// Minimum-length policy is the caller's contract; this method hashes
  /// whatever it is given.
  pub async fn set_password(
    &self,
    household_id: Uuid,
    plain: &str,
  ) -> Result<Household> {
    let hash = self.hasher.hash(plain)?;
    self
      .store
      .get_household(household_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::HouseholdNotFound(household_id))?;

    let updated = self
      .store
      .set_household_secret(household_id, Some(hash), true)
      .await
      .map_err(Error::store)?;
    debug_assert!(updated.credential_invariant_holds());
    Ok(updated)
  }

  /// Generate a secret, set it, then best-effort deliver it to the
  /// household's email address.
  ///
  /// Delivery failure (or a missing address) is logged and swallowed; the
  /// stored hash is already committed and stays. The plaintext is returned
  /// to the caller so staff can hand it over out of band.
  pub async fn issue(&self, household_id: Uuid) -> Result<IssuedSecret> {
    let secret = generate_secret(DEFAULT_SECRET_LEN);
    let household = self.set_password(household_id, &secret).await?;

    match household.email.as_deref() {
      Some(email) => {
        if let Err(e) = self
          .notifier
          .deliver_credentials(email, &household.code, &secret)
          .await
        {
          tracing::warn!(
            code = %household.code,
            error = %e,
            "credential delivery failed; secret remains set"
          );
        }
      }
      None => {
        tracing::warn!(
          code = %household.code,
          "household has no email address; secret not delivered"
        );
      }
    }

    Ok(IssuedSecret { household, secret })
  }

  /// Look up a household by code and compare the secret.
  ///
  /// Returns `None` — never an error, never a distinguishing message — for
  /// an unknown code, a household with no stored hash, an inactive
  /// household, or a wrong secret. The no-hash branches verify against a
  /// dummy hash so the timing profile matches the wrong-secret branch.
  pub async fn validate(
    &self,
    code: &str,
    plain: &str,
  ) -> Result<Option<Household>> {
    let household = self
      .store
      .get_household_by_code(code)
      .await
      .map_err(Error::store)?;

    let stored = household
      .as_ref()
      .filter(|h| h.active)
      .and_then(|h| h.secret_hash.clone());

    match stored {
      Some(hash) if self.hasher.verify(plain, &hash) => Ok(household),
      Some(_) => Ok(None),
      None => {
        let _ = self.hasher.verify(plain, &self.dummy_hash);
        Ok(None)
      }
    }
  }

  /// Replace the secret after verifying the current one. The active flag
  /// is left unchanged.
  pub async fn change_password(
    &self,
    household_id: Uuid,
    current: &str,
    new: &str,
  ) -> Result<Household> {
    let household = self
      .store
      .get_household(household_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::HouseholdNotFound(household_id))?;

    let hash = household
      .secret_hash
      .as_deref()
      .ok_or(Error::HouseholdNotFound(household_id))?;

    if !self.hasher.verify(current, hash) {
      return Err(Error::InvalidCredential);
    }

    let new_hash = self.hasher.hash(new)?;
    let updated = self
      .store
      .set_household_secret(household_id, Some(new_hash), household.active)
      .await
      .map_err(Error::store)?;
    debug_assert!(updated.credential_invariant_holds());
    Ok(updated)
  }

  /// Clear the stored hash and deactivate portal access together.
  pub async fn revoke(&self, household_id: Uuid) -> Result<Household> {
    self
      .store
      .get_household(household_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::HouseholdNotFound(household_id))?;

    let updated = self
      .store
      .set_household_secret(household_id, None, false)
      .await
      .map_err(Error::store)?;
    debug_assert!(updated.credential_invariant_holds());
    Ok(updated)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::{
    household::{Household, HouseholdUpdate, NewHousehold},
    notify::{Notifier, NoopNotifier},
    store::RegistryStore,
  };

  /// A household-only in-memory store; the non-household methods are never
  /// reached by the credential service.
  #[derive(Default)]
  struct MemStore {
    households: Mutex<HashMap<Uuid, Household>>,
  }

  impl MemStore {
    fn insert(&self, email: Option<&str>) -> Household {
      let h = Household {
        household_id: Uuid::new_v4(),
        code:         format!("HK-{}", Uuid::new_v4().simple()),
        street:       None,
        ward:         None,
        district:     None,
        kind:         "family".into(),
        email:        email.map(str::to_owned),
        secret_hash:  None,
        active:       false,
        created_at:   Utc::now(),
      };
      self
        .households
        .lock()
        .unwrap()
        .insert(h.household_id, h.clone());
      h
    }
  }

  impl RegistryStore for MemStore {
    type Error = std::convert::Infallible;

    async fn add_household(&self, _: NewHousehold) -> Result<Household, Self::Error> {
      unimplemented!()
    }

    async fn get_household(&self, id: Uuid) -> Result<Option<Household>, Self::Error> {
      Ok(self.households.lock().unwrap().get(&id).cloned())
    }

    async fn get_household_by_code(&self, code: &str) -> Result<Option<Household>, Self::Error> {
      Ok(
        self
          .households
          .lock()
          .unwrap()
          .values()
          .find(|h| h.code == code)
          .cloned(),
      )
    }

    async fn list_households(&self) -> Result<Vec<Household>, Self::Error> {
      unimplemented!()
    }

    async fn update_household(&self, _: Uuid, _: HouseholdUpdate) -> Result<Household, Self::Error> {
      unimplemented!()
    }

    async fn delete_household(&self, _: Uuid) -> Result<(), Self::Error> {
      unimplemented!()
    }

    async fn set_household_secret(
      &self,
      id: Uuid,
      secret_hash: Option<String>,
      active: bool,
    ) -> Result<Household, Self::Error> {
      let mut map = self.households.lock().unwrap();
      let h = map.get_mut(&id).expect("household exists");
      h.secret_hash = secret_hash;
      h.active = active;
      Ok(h.clone())
    }

    async fn add_person(&self, _: crate::person::NewPerson) -> Result<crate::person::Person, Self::Error> {
      unimplemented!()
    }

    async fn get_person(&self, _: Uuid) -> Result<Option<crate::person::Person>, Self::Error> {
      unimplemented!()
    }

    async fn get_person_by_national_id(&self, _: &str) -> Result<Option<crate::person::Person>, Self::Error> {
      unimplemented!()
    }

    async fn list_persons(&self, _: Option<Uuid>) -> Result<Vec<crate::person::Person>, Self::Error> {
      unimplemented!()
    }

    async fn update_person(&self, _: Uuid, _: crate::person::PersonUpdate) -> Result<crate::person::Person, Self::Error> {
      unimplemented!()
    }

    async fn delete_person(&self, _: Uuid) -> Result<(), Self::Error> {
      unimplemented!()
    }

    async fn record_event(&self, _: crate::event::NewEvent) -> Result<crate::event::PopulationEvent, Self::Error> {
      unimplemented!()
    }

    async fn get_event(&self, _: Uuid) -> Result<Option<crate::event::PopulationEvent>, Self::Error> {
      unimplemented!()
    }

    async fn list_events(&self, _: Option<Uuid>) -> Result<Vec<crate::event::PopulationEvent>, Self::Error> {
      unimplemented!()
    }

    async fn delete_event(&self, _: Uuid) -> Result<(), Self::Error> {
      unimplemented!()
    }

    async fn add_contribution(&self, _: crate::contribution::NewContribution) -> Result<crate::contribution::Contribution, Self::Error> {
      unimplemented!()
    }

    async fn get_contribution(&self, _: Uuid) -> Result<Option<crate::contribution::Contribution>, Self::Error> {
      unimplemented!()
    }

    async fn list_contributions(&self, _: crate::store::ContributionFilter) -> Result<Vec<crate::contribution::Contribution>, Self::Error> {
      unimplemented!()
    }

    async fn mark_paid(&self, _: Uuid, _: chrono::DateTime<Utc>) -> Result<crate::contribution::Contribution, Self::Error> {
      unimplemented!()
    }

    async fn delete_contribution(&self, _: Uuid) -> Result<(), Self::Error> {
      unimplemented!()
    }

    async fn add_staff(&self, _: crate::staff::NewStaffUser) -> Result<crate::staff::StaffUser, Self::Error> {
      unimplemented!()
    }

    async fn get_staff_by_username(&self, _: &str) -> Result<Option<crate::staff::StaffUser>, Self::Error> {
      unimplemented!()
    }
  }

  /// Records deliveries; optionally fails every call.
  #[derive(Default)]
  struct RecordingNotifier {
    fail:      bool,
    delivered: Mutex<Vec<(String, String, String)>>,
  }

  #[derive(Debug, thiserror::Error)]
  #[error("smtp down")]
  struct SmtpDown;

  impl Notifier for RecordingNotifier {
    type Error = SmtpDown;

    async fn deliver_credentials(
      &self,
      to: &str,
      household_code: &str,
      secret: &str,
    ) -> Result<(), Self::Error> {
      if self.fail {
        return Err(SmtpDown);
      }
      self.delivered.lock().unwrap().push((
        to.to_owned(),
        household_code.to_owned(),
        secret.to_owned(),
      ));
      Ok(())
    }
  }

  fn service(
    store: Arc<MemStore>,
  ) -> CredentialService<MemStore, NoopNotifier> {
    // Cheap argon2 params keep the test suite fast.
    let hasher = SecretHasher::with_params(
      argon2::Params::new(1024, 1, 1, None).unwrap(),
    );
    CredentialService::with_hasher(store, Arc::new(NoopNotifier), hasher)
      .unwrap()
  }

  #[test]
  fn generated_secret_alphabet_and_length() {
    let s = generate_secret(DEFAULT_SECRET_LEN);
    assert_eq!(s.len(), DEFAULT_SECRET_LEN);
    assert!(s.bytes().all(|b| ALPHABET.contains(&b)));

    let s6 = generate_secret(6);
    assert_eq!(s6.len(), 6);
  }

  #[tokio::test]
  async fn set_password_activates_and_upholds_invariant() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(None);
    let svc = service(store.clone());

    let updated = svc.set_password(h.household_id, "s3cret").await.unwrap();
    assert!(updated.active);
    assert!(updated.secret_hash.is_some());
    assert!(updated.credential_invariant_holds());
  }

  #[tokio::test]
  async fn set_password_unknown_household() {
    let store = Arc::new(MemStore::default());
    let svc = service(store);
    let missing = Uuid::new_v4();

    let err = svc.set_password(missing, "s3cret").await.unwrap_err();
    assert!(matches!(err, Error::HouseholdNotFound(id) if id == missing));
  }

  #[tokio::test]
  async fn validate_matches_only_known_active_correct() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(None);
    let svc = service(store.clone());

    // No hash yet.
    assert!(svc.validate(&h.code, "s3cret").await.unwrap().is_none());

    svc.set_password(h.household_id, "s3cret").await.unwrap();

    // Unknown code.
    assert!(svc.validate("HK-nope", "s3cret").await.unwrap().is_none());
    // Wrong secret.
    assert!(svc.validate(&h.code, "wrong").await.unwrap().is_none());
    // Correct.
    let matched = svc.validate(&h.code, "s3cret").await.unwrap().unwrap();
    assert_eq!(matched.household_id, h.household_id);

    // Revoked households no longer match.
    svc.revoke(h.household_id).await.unwrap();
    assert!(svc.validate(&h.code, "s3cret").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn change_password_rotates_the_matching_secret() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(None);
    let svc = service(store.clone());

    svc.set_password(h.household_id, "old-secret").await.unwrap();

    let err = svc
      .change_password(h.household_id, "not-the-secret", "new-secret")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidCredential));

    let updated = svc
      .change_password(h.household_id, "old-secret", "new-secret")
      .await
      .unwrap();
    assert!(updated.active);
    assert!(updated.credential_invariant_holds());

    assert!(svc.validate(&h.code, "new-secret").await.unwrap().is_some());
    assert!(svc.validate(&h.code, "old-secret").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn change_password_without_existing_hash_is_not_found() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(None);
    let svc = service(store);

    let err = svc
      .change_password(h.household_id, "anything", "new")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::HouseholdNotFound(_)));
  }

  #[tokio::test]
  async fn revoke_clears_hash_and_active_together() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(None);
    let svc = service(store.clone());

    svc.set_password(h.household_id, "s3cret").await.unwrap();
    let revoked = svc.revoke(h.household_id).await.unwrap();
    assert!(!revoked.active);
    assert!(revoked.secret_hash.is_none());
    assert!(revoked.credential_invariant_holds());
  }

  #[tokio::test]
  async fn issue_delivers_to_household_email() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(Some("to@vd.example"));
    let notifier = Arc::new(RecordingNotifier::default());
    let hasher = SecretHasher::with_params(
      argon2::Params::new(1024, 1, 1, None).unwrap(),
    );
    let svc =
      CredentialService::with_hasher(store, notifier.clone(), hasher).unwrap();

    let issued = svc.issue(h.household_id).await.unwrap();
    assert_eq!(issued.secret.len(), DEFAULT_SECRET_LEN);
    assert!(issued.household.active);

    let delivered = notifier.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "to@vd.example");
    assert_eq!(delivered[0].1, h.code);
    assert_eq!(delivered[0].2, issued.secret);
  }

  #[tokio::test]
  async fn issue_survives_delivery_failure() {
    let store = Arc::new(MemStore::default());
    let h = store.insert(Some("to@vd.example"));
    let notifier = Arc::new(RecordingNotifier { fail: true, ..Default::default() });
    let hasher = SecretHasher::with_params(
      argon2::Params::new(1024, 1, 1, None).unwrap(),
    );
    let svc =
      CredentialService::with_hasher(store, notifier, hasher).unwrap();

    // The failure is swallowed; the secret stays committed and valid.
    let issued = svc.issue(h.household_id).await.unwrap();
    assert!(
      svc
        .validate(&issued.household.code, &issued.secret)
        .await
        .unwrap()
        .is_some()
    );
  }
}
