//! In-memory store and state fixtures shared by the handler tests.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use chrono::Utc;
use sodan_core::{
  contribution::{Contribution, NewContribution},
  credential::{CredentialService, SecretHasher},
  event::{NewEvent, PopulationEvent},
  household::{Household, HouseholdUpdate, NewHousehold},
  notify::NoopNotifier,
  person::{NewPerson, Person, PersonUpdate},
  staff::{NewStaffUser, Role, StaffUser},
  store::{ContributionFilter, RegistryStore},
};
use uuid::Uuid;

use crate::{AppState, auth::StaffAuth};

#[derive(Debug, thiserror::Error)]
#[error("disk I/O error: database is locked")]
pub struct BackendDown;

/// Households and contributions live in real maps; the handlers under test
/// never reach the other tables.
#[derive(Default)]
pub struct MemStore {
  pub households:      Mutex<HashMap<Uuid, Household>>,
  pub contributions:   Mutex<HashMap<Uuid, Contribution>>,
  /// When set, `mark_paid` fails like a broken backend.
  pub mark_paid_fails: bool,
}

impl MemStore {
  pub fn insert_household(&self, code: &str) -> Household {
    let h = Household {
      household_id: Uuid::new_v4(),
      code:         code.to_owned(),
      street:       None,
      ward:         None,
      district:     None,
      kind:         "family".into(),
      email:        None,
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

  pub fn insert_contribution(
    &self,
    household_id: Uuid,
    paid: bool,
  ) -> Contribution {
    let c = Contribution {
      contribution_id: Uuid::new_v4(),
      household_id,
      kind: "quỹ vệ sinh".into(),
      amount: 50_000,
      due_on: None,
      paid,
      paid_at: paid.then(Utc::now),
      created_at: Utc::now(),
    };
    self
      .contributions
      .lock()
      .unwrap()
      .insert(c.contribution_id, c.clone());
    c
  }
}

impl RegistryStore for MemStore {
  type Error = BackendDown;

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

  async fn add_person(&self, _: NewPerson) -> Result<Person, Self::Error> {
    unimplemented!()
  }

  async fn get_person(&self, _: Uuid) -> Result<Option<Person>, Self::Error> {
    unimplemented!()
  }

  async fn get_person_by_national_id(&self, _: &str) -> Result<Option<Person>, Self::Error> {
    unimplemented!()
  }

  async fn list_persons(&self, _: Option<Uuid>) -> Result<Vec<Person>, Self::Error> {
    unimplemented!()
  }

  async fn update_person(&self, _: Uuid, _: PersonUpdate) -> Result<Person, Self::Error> {
    unimplemented!()
  }

  async fn delete_person(&self, _: Uuid) -> Result<(), Self::Error> {
    unimplemented!()
  }

  async fn record_event(&self, _: NewEvent) -> Result<PopulationEvent, Self::Error> {
    unimplemented!()
  }

  async fn get_event(&self, _: Uuid) -> Result<Option<PopulationEvent>, Self::Error> {
    unimplemented!()
  }

  async fn list_events(&self, _: Option<Uuid>) -> Result<Vec<PopulationEvent>, Self::Error> {
    unimplemented!()
  }

  async fn delete_event(&self, _: Uuid) -> Result<(), Self::Error> {
    unimplemented!()
  }

  async fn add_contribution(&self, _: NewContribution) -> Result<Contribution, Self::Error> {
    unimplemented!()
  }

  async fn get_contribution(&self, id: Uuid) -> Result<Option<Contribution>, Self::Error> {
    Ok(self.contributions.lock().unwrap().get(&id).cloned())
  }

  async fn list_contributions(&self, _: ContributionFilter) -> Result<Vec<Contribution>, Self::Error> {
    unimplemented!()
  }

  async fn mark_paid(
    &self,
    id: Uuid,
    paid_at: chrono::DateTime<Utc>,
  ) -> Result<Contribution, Self::Error> {
    if self.mark_paid_fails {
      return Err(BackendDown);
    }
    let mut map = self.contributions.lock().unwrap();
    let c = map.get_mut(&id).expect("contribution exists");
    c.paid = true;
    c.paid_at = Some(paid_at);
    Ok(c.clone())
  }

  async fn delete_contribution(&self, _: Uuid) -> Result<(), Self::Error> {
    unimplemented!()
  }

  async fn add_staff(&self, _: NewStaffUser) -> Result<StaffUser, Self::Error> {
    unimplemented!()
  }

  async fn get_staff_by_username(&self, _: &str) -> Result<Option<StaffUser>, Self::Error> {
    unimplemented!()
  }
}

/// Handler state over a [`MemStore`], with cheap argon2 params so the test
/// suite stays fast.
pub fn app_state(store: Arc<MemStore>) -> AppState<MemStore, NoopNotifier> {
  let hasher =
    SecretHasher::with_params(argon2::Params::new(1024, 1, 1, None).unwrap());
  let credentials = Arc::new(
    CredentialService::with_hasher(
      Arc::clone(&store),
      Arc::new(NoopNotifier),
      hasher,
    )
    .unwrap(),
  );
  AppState { store, credentials }
}

/// An authenticated staff caller.
pub fn staff() -> StaffAuth {
  StaffAuth {
    staff: StaffUser {
      staff_id:      Uuid::new_v4(),
      username:      "lan.pham".into(),
      display_name:  "Phạm Ngọc Lan".into(),
      role:          Role::Staff,
      password_hash: "$argon2id$stub".into(),
      created_at:    Utc::now(),
    },
  }
}
