//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sodan_core::{
  contribution::{Contribution, NewContribution},
  event::{NewEvent, PopulationEvent},
  household::{Household, HouseholdUpdate, NewHousehold},
  person::{NewPerson, Person, PersonUpdate},
  staff::{NewStaffUser, StaffUser},
  store::{ContributionFilter, RegistryStore},
};

use crate::{
  Error, Result,
  encode::{
    RawContribution, RawEvent, RawHousehold, RawPerson, RawStaff, encode_date,
    encode_dt, encode_event_kind, encode_gender, encode_residency, encode_role,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row readers ─────────────────────────────────────────────────────────────

const HOUSEHOLD_COLS: &str = "household_id, code, street, ward, district, \
                              kind, email, secret_hash, active, created_at";

fn household_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawHousehold> {
  Ok(RawHousehold {
    household_id: row.get(0)?,
    code:         row.get(1)?,
    street:       row.get(2)?,
    ward:         row.get(3)?,
    district:     row.get(4)?,
    kind:         row.get(5)?,
    email:        row.get(6)?,
    secret_hash:  row.get(7)?,
    active:       row.get(8)?,
    created_at:   row.get(9)?,
  })
}

const PERSON_COLS: &str = "person_id, household_id, full_name, date_of_birth, \
                           gender, national_id, relationship, occupation, \
                           education, residency, deceased, created_at";

fn person_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:     row.get(0)?,
    household_id:  row.get(1)?,
    full_name:     row.get(2)?,
    date_of_birth: row.get(3)?,
    gender:        row.get(4)?,
    national_id:   row.get(5)?,
    relationship:  row.get(6)?,
    occupation:    row.get(7)?,
    education:     row.get(8)?,
    residency:     row.get(9)?,
    deceased:      row.get(10)?,
    created_at:    row.get(11)?,
  })
}

const EVENT_COLS: &str = "event_id, person_id, kind, description, occurred_on, \
                          recorded_by, recorded_at";

fn event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:    row.get(0)?,
    person_id:   row.get(1)?,
    kind:        row.get(2)?,
    description: row.get(3)?,
    occurred_on: row.get(4)?,
    recorded_by: row.get(5)?,
    recorded_at: row.get(6)?,
  })
}

const CONTRIBUTION_COLS: &str = "contribution_id, household_id, kind, amount, \
                                 due_on, paid, paid_at, created_at";

fn contribution_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawContribution> {
  Ok(RawContribution {
    contribution_id: row.get(0)?,
    household_id:    row.get(1)?,
    kind:            row.get(2)?,
    amount:          row.get(3)?,
    due_on:          row.get(4)?,
    paid:            row.get(5)?,
    paid_at:         row.get(6)?,
    created_at:      row.get(7)?,
  })
}

const STAFF_COLS: &str =
  "staff_id, username, display_name, role, password_hash, created_at";

fn staff_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStaff> {
  Ok(RawStaff {
    staff_id:      row.get(0)?,
    username:      row.get(1)?,
    display_name:  row.get(2)?,
    role:          row.get(3)?,
    password_hash: row.get(4)?,
    created_at:    row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Sodan registry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_household(&self, id: Uuid) -> Result<Option<Household>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawHousehold> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {HOUSEHOLD_COLS} FROM households WHERE household_id = ?1"
              ),
              rusqlite::params![id_str],
              household_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawHousehold::into_household).transpose()
  }

  async fn fetch_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLS} FROM persons WHERE person_id = ?1"),
              rusqlite::params![id_str],
              person_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn fetch_contribution(&self, id: Uuid) -> Result<Option<Contribution>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawContribution> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONTRIBUTION_COLS} FROM contributions \
                 WHERE contribution_id = ?1"
              ),
              rusqlite::params![id_str],
              contribution_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawContribution::into_contribution).transpose()
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Households ────────────────────────────────────────────────────────────

  async fn add_household(&self, input: NewHousehold) -> Result<Household> {
    let household = Household {
      household_id: Uuid::new_v4(),
      code:         input.code,
      street:       input.street,
      ward:         input.ward,
      district:     input.district,
      kind:         input.kind,
      email:        input.email,
      secret_hash:  None,
      active:       false,
      created_at:   Utc::now(),
    };

    let id_str   = encode_uuid(household.household_id);
    let at_str   = encode_dt(household.created_at);
    let code     = household.code.clone();
    let street   = household.street.clone();
    let ward     = household.ward.clone();
    let district = household.district.clone();
    let kind     = household.kind.clone();
    let email    = household.email.clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM households WHERE code = ?1",
            rusqlite::params![code],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO households (
             household_id, code, street, ward, district, kind, email,
             secret_hash, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 0, ?8)",
          rusqlite::params![id_str, code, street, ward, district, kind, email, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::CodeTaken(household.code));
    }
    Ok(household)
  }

  async fn get_household(&self, id: Uuid) -> Result<Option<Household>> {
    self.fetch_household(id).await
  }

  async fn get_household_by_code(&self, code: &str) -> Result<Option<Household>> {
    let code = code.to_owned();
    let raw: Option<RawHousehold> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {HOUSEHOLD_COLS} FROM households WHERE code = ?1"),
              rusqlite::params![code],
              household_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawHousehold::into_household).transpose()
  }

  async fn list_households(&self) -> Result<Vec<Household>> {
    let raws: Vec<RawHousehold> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HOUSEHOLD_COLS} FROM households ORDER BY code"
        ))?;
        let rows = stmt
          .query_map([], household_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawHousehold::into_household).collect()
  }

  async fn update_household(
    &self,
    id: Uuid,
    update: HouseholdUpdate,
  ) -> Result<Household> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE households
           SET street = ?2, ward = ?3, district = ?4, kind = ?5, email = ?6
           WHERE household_id = ?1",
          rusqlite::params![
            id_str,
            update.street,
            update.ward,
            update.district,
            update.kind,
            update.email,
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::HouseholdNotFound(id));
    }
    self
      .fetch_household(id)
      .await?
      .ok_or(Error::HouseholdNotFound(id))
  }

  async fn delete_household(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        // Members are detached, not deleted; contributions go with the
        // household they belong to.
        conn.execute(
          "UPDATE persons SET household_id = NULL WHERE household_id = ?1",
          rusqlite::params![id_str],
        )?;
        conn.execute(
          "DELETE FROM contributions WHERE household_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(conn.execute(
          "DELETE FROM households WHERE household_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::HouseholdNotFound(id));
    }
    Ok(())
  }

  async fn set_household_secret(
    &self,
    id: Uuid,
    secret_hash: Option<String>,
    active: bool,
  ) -> Result<Household> {
    // Reject states the schema CHECK would also refuse, with a clearer error.
    if active != secret_hash.is_some() {
      return Err(Error::CredentialStateInvalid(id));
    }

    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE households SET secret_hash = ?2, active = ?3
           WHERE household_id = ?1",
          rusqlite::params![id_str, secret_hash, active],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::HouseholdNotFound(id));
    }
    self
      .fetch_household(id)
      .await?
      .ok_or(Error::HouseholdNotFound(id))
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:     Uuid::new_v4(),
      household_id:  input.household_id,
      full_name:     input.full_name,
      date_of_birth: input.date_of_birth,
      gender:        input.gender,
      national_id:   input.national_id,
      relationship:  input.relationship,
      occupation:    input.occupation,
      education:     input.education,
      residency:     input.residency,
      deceased:      false,
      created_at:    Utc::now(),
    };

    let id_str        = encode_uuid(person.person_id);
    let household_str = person.household_id.map(encode_uuid);
    let full_name     = person.full_name.clone();
    let dob_str       = person.date_of_birth.map(encode_date);
    let gender_str    = encode_gender(person.gender).to_owned();
    let national_id   = person.national_id.clone();
    let relationship  = person.relationship.clone();
    let occupation    = person.occupation.clone();
    let education     = person.education.clone();
    let residency_str = encode_residency(person.residency).to_owned();
    let at_str        = encode_dt(person.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM persons WHERE national_id = ?1",
            rusqlite::params![national_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO persons (
             person_id, household_id, full_name, date_of_birth, gender,
             national_id, relationship, occupation, education, residency,
             deceased, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11)",
          rusqlite::params![
            id_str,
            household_str,
            full_name,
            dob_str,
            gender_str,
            national_id,
            relationship,
            occupation,
            education,
            residency_str,
            at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::NationalIdTaken(person.national_id));
    }
    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self.fetch_person(id).await
  }

  async fn get_person_by_national_id(
    &self,
    national_id: &str,
  ) -> Result<Option<Person>> {
    let national_id = national_id.to_owned();
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLS} FROM persons WHERE national_id = ?1"),
              rusqlite::params![national_id],
              person_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self, household_id: Option<Uuid>) -> Result<Vec<Person>> {
    let household_str = household_id.map(encode_uuid);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(h) = household_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLS} FROM persons WHERE household_id = ?1
             ORDER BY full_name"
          ))?;
          stmt
            .query_map(rusqlite::params![h], person_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLS} FROM persons ORDER BY full_name"
          ))?;
          stmt
            .query_map([], person_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn update_person(&self, id: Uuid, update: PersonUpdate) -> Result<Person> {
    let id_str        = encode_uuid(id);
    let household_str = update.household_id.map(encode_uuid);
    let dob_str       = update.date_of_birth.map(encode_date);
    let gender_str    = encode_gender(update.gender).to_owned();
    let residency_str = encode_residency(update.residency).to_owned();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE persons
           SET household_id = ?2, full_name = ?3, date_of_birth = ?4,
               gender = ?5, relationship = ?6, occupation = ?7,
               education = ?8, residency = ?9, deceased = ?10
           WHERE person_id = ?1",
          rusqlite::params![
            id_str,
            household_str,
            update.full_name,
            dob_str,
            gender_str,
            update.relationship,
            update.occupation,
            update.education,
            residency_str,
            update.deceased,
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::PersonNotFound(id));
    }
    self.fetch_person(id).await?.ok_or(Error::PersonNotFound(id))
  }

  async fn delete_person(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM population_events WHERE person_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(conn.execute(
          "DELETE FROM persons WHERE person_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::PersonNotFound(id));
    }
    Ok(())
  }

  // ── Population events ─────────────────────────────────────────────────────

  async fn record_event(&self, input: NewEvent) -> Result<PopulationEvent> {
    let event = PopulationEvent {
      event_id:    Uuid::new_v4(),
      person_id:   input.person_id,
      kind:        input.kind,
      description: input.description,
      occurred_on: input.occurred_on,
      recorded_by: input.recorded_by,
      recorded_at: Utc::now(),
    };

    let id_str       = encode_uuid(event.event_id);
    let person_str   = encode_uuid(event.person_id);
    let kind_str     = encode_event_kind(event.kind).to_owned();
    let description  = event.description.clone();
    let occurred_str = encode_date(event.occurred_on);
    let by_str       = event.recorded_by.map(encode_uuid);
    let at_str       = encode_dt(event.recorded_at);

    let person_exists: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM persons WHERE person_id = ?1",
            rusqlite::params![person_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO population_events (
             event_id, person_id, kind, description, occurred_on,
             recorded_by, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, person_str, kind_str, description, occurred_str, by_str,
            at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !person_exists {
      return Err(Error::PersonNotFound(event.person_id));
    }
    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<PopulationEvent>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVENT_COLS} FROM population_events WHERE event_id = ?1"
              ),
              rusqlite::params![id_str],
              event_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_events(
    &self,
    person_id: Option<Uuid>,
  ) -> Result<Vec<PopulationEvent>> {
    let person_str = person_id.map(encode_uuid);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(p) = person_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM population_events WHERE person_id = ?1
             ORDER BY occurred_on"
          ))?;
          stmt
            .query_map(rusqlite::params![p], event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM population_events ORDER BY occurred_on"
          ))?;
          stmt
            .query_map([], event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn delete_event(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM population_events WHERE event_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::EventNotFound(id));
    }
    Ok(())
  }

  // ── Contributions ─────────────────────────────────────────────────────────

  async fn add_contribution(
    &self,
    input: NewContribution,
  ) -> Result<Contribution> {
    let contribution = Contribution {
      contribution_id: Uuid::new_v4(),
      household_id:    input.household_id,
      kind:            input.kind,
      amount:          input.amount,
      due_on:          input.due_on,
      paid:            false,
      paid_at:         None,
      created_at:      Utc::now(),
    };

    let id_str        = encode_uuid(contribution.contribution_id);
    let household_str = encode_uuid(contribution.household_id);
    let kind          = contribution.kind.clone();
    let amount        = contribution.amount;
    let due_str       = contribution.due_on.map(encode_date);
    let at_str        = encode_dt(contribution.created_at);

    let household_exists: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM households WHERE household_id = ?1",
            rusqlite::params![household_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO contributions (
             contribution_id, household_id, kind, amount, due_on,
             paid, paid_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6)",
          rusqlite::params![id_str, household_str, kind, amount, due_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !household_exists {
      return Err(Error::HouseholdNotFound(contribution.household_id));
    }
    Ok(contribution)
  }

  async fn get_contribution(&self, id: Uuid) -> Result<Option<Contribution>> {
    self.fetch_contribution(id).await
  }

  async fn list_contributions(
    &self,
    filter: ContributionFilter,
  ) -> Result<Vec<Contribution>> {
    let household_str = filter.household_id.map(encode_uuid);
    let unpaid_only = filter.unpaid_only;

    let raws: Vec<RawContribution> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if household_str.is_some() {
          conds.push("household_id = ?1");
        }
        if unpaid_only {
          conds.push("paid = 0");
        }
        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {CONTRIBUTION_COLS} FROM contributions
           {where_clause} ORDER BY created_at"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = if let Some(h) = household_str {
          stmt
            .query_map(rusqlite::params![h], contribution_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          stmt
            .query_map([], contribution_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;
    raws
      .into_iter()
      .map(RawContribution::into_contribution)
      .collect()
  }

  async fn mark_paid(
    &self,
    id: Uuid,
    paid_at: DateTime<Utc>,
  ) -> Result<Contribution> {
    let id_str = encode_uuid(id);
    let paid_at_str = encode_dt(paid_at);

    // `already_paid` distinguishes the two failure shapes of the update.
    let state: Option<bool> = self
      .conn
      .call(move |conn| {
        let already_paid: Option<bool> = conn
          .query_row(
            "SELECT paid FROM contributions WHERE contribution_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        if already_paid == Some(false) {
          conn.execute(
            "UPDATE contributions SET paid = 1, paid_at = ?2
             WHERE contribution_id = ?1",
            rusqlite::params![id_str, paid_at_str],
          )?;
        }
        Ok(already_paid)
      })
      .await?;

    match state {
      None => Err(Error::ContributionNotFound(id)),
      Some(true) => Err(Error::AlreadyPaid(id)),
      Some(false) => self
        .fetch_contribution(id)
        .await?
        .ok_or(Error::ContributionNotFound(id)),
    }
  }

  async fn delete_contribution(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contributions WHERE contribution_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ContributionNotFound(id));
    }
    Ok(())
  }

  // ── Staff ─────────────────────────────────────────────────────────────────

  async fn add_staff(&self, input: NewStaffUser) -> Result<StaffUser> {
    let staff = StaffUser {
      staff_id:      Uuid::new_v4(),
      username:      input.username,
      display_name:  input.display_name,
      role:          input.role,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(staff.staff_id);
    let username = staff.username.clone();
    let display  = staff.display_name.clone();
    let role_str = encode_role(staff.role).to_owned();
    let hash     = staff.password_hash.clone();
    let at_str   = encode_dt(staff.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM staff_users WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO staff_users (
             staff_id, username, display_name, role, password_hash, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, display, role_str, hash, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::UsernameTaken(staff.username));
    }
    Ok(staff)
  }

  async fn get_staff_by_username(
    &self,
    username: &str,
  ) -> Result<Option<StaffUser>> {
    let username = username.to_owned();
    let raw: Option<RawStaff> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STAFF_COLS} FROM staff_users WHERE username = ?1"),
              rusqlite::params![username],
              staff_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStaff::into_staff).transpose()
  }
}
