//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`.
//! Enum tags match the serde `rename_all` spellings of the domain enums.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use sodan_core::{
  contribution::Contribution,
  event::{EventKind, PopulationEvent},
  household::Household,
  person::{Gender, Person, ResidencyStatus},
  staff::{Role, StaffUser},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::Male => "male",
    Gender::Female => "female",
    Gender::Other => "other",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    "other" => Ok(Gender::Other),
    other => Err(Error::Decode(format!("unknown gender tag: {other:?}"))),
  }
}

// ─── ResidencyStatus ─────────────────────────────────────────────────────────

pub fn encode_residency(r: ResidencyStatus) -> &'static str {
  match r {
    ResidencyStatus::Permanent => "permanent",
    ResidencyStatus::Temporary => "temporary",
    ResidencyStatus::Absent => "absent",
  }
}

pub fn decode_residency(s: &str) -> Result<ResidencyStatus> {
  match s {
    "permanent" => Ok(ResidencyStatus::Permanent),
    "temporary" => Ok(ResidencyStatus::Temporary),
    "absent" => Ok(ResidencyStatus::Absent),
    other => Err(Error::Decode(format!("unknown residency tag: {other:?}"))),
  }
}

// ─── EventKind ───────────────────────────────────────────────────────────────

pub fn encode_event_kind(k: EventKind) -> &'static str { k.discriminant() }

pub fn decode_event_kind(s: &str) -> Result<EventKind> {
  match s {
    "birth" => Ok(EventKind::Birth),
    "death" => Ok(EventKind::Death),
    "migration" => Ok(EventKind::Migration),
    "absence" => Ok(EventKind::Absence),
    "return" => Ok(EventKind::Return),
    other => Err(Error::Decode(format!("unknown event kind: {other:?}"))),
  }
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Staff => "staff",
    Role::Manager => "manager",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "staff" => Ok(Role::Staff),
    "manager" => Ok(Role::Manager),
    "admin" => Ok(Role::Admin),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `households` row.
pub struct RawHousehold {
  pub household_id: String,
  pub code:         String,
  pub street:       Option<String>,
  pub ward:         Option<String>,
  pub district:     Option<String>,
  pub kind:         String,
  pub email:        Option<String>,
  pub secret_hash:  Option<String>,
  pub active:       bool,
  pub created_at:   String,
}

impl RawHousehold {
  pub fn into_household(self) -> Result<Household> {
    Ok(Household {
      household_id: decode_uuid(&self.household_id)?,
      code:         self.code,
      street:       self.street,
      ward:         self.ward,
      district:     self.district,
      kind:         self.kind,
      email:        self.email,
      secret_hash:  self.secret_hash,
      active:       self.active,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:     String,
  pub household_id:  Option<String>,
  pub full_name:     String,
  pub date_of_birth: Option<String>,
  pub gender:        String,
  pub national_id:   String,
  pub relationship:  Option<String>,
  pub occupation:    Option<String>,
  pub education:     Option<String>,
  pub residency:     String,
  pub deceased:      bool,
  pub created_at:    String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:     decode_uuid(&self.person_id)?,
      household_id:  self
        .household_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      full_name:     self.full_name,
      date_of_birth: self
        .date_of_birth
        .as_deref()
        .map(decode_date)
        .transpose()?,
      gender:        decode_gender(&self.gender)?,
      national_id:   self.national_id,
      relationship:  self.relationship,
      occupation:    self.occupation,
      education:     self.education,
      residency:     decode_residency(&self.residency)?,
      deceased:      self.deceased,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `population_events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub person_id:   String,
  pub kind:        String,
  pub description: Option<String>,
  pub occurred_on: String,
  pub recorded_by: Option<String>,
  pub recorded_at: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<PopulationEvent> {
    Ok(PopulationEvent {
      event_id:    decode_uuid(&self.event_id)?,
      person_id:   decode_uuid(&self.person_id)?,
      kind:        decode_event_kind(&self.kind)?,
      description: self.description,
      occurred_on: decode_date(&self.occurred_on)?,
      recorded_by: self
        .recorded_by
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `contributions` row.
pub struct RawContribution {
  pub contribution_id: String,
  pub household_id:    String,
  pub kind:            String,
  pub amount:          i64,
  pub due_on:          Option<String>,
  pub paid:            bool,
  pub paid_at:         Option<String>,
  pub created_at:      String,
}

impl RawContribution {
  pub fn into_contribution(self) -> Result<Contribution> {
    Ok(Contribution {
      contribution_id: decode_uuid(&self.contribution_id)?,
      household_id:    decode_uuid(&self.household_id)?,
      kind:            self.kind,
      amount:          self.amount,
      due_on:          self.due_on.as_deref().map(decode_date).transpose()?,
      paid:            self.paid,
      paid_at:         self.paid_at.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `staff_users` row.
pub struct RawStaff {
  pub staff_id:      String,
  pub username:      String,
  pub display_name:  String,
  pub role:          String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawStaff {
  pub fn into_staff(self) -> Result<StaffUser> {
    Ok(StaffUser {
      staff_id:      decode_uuid(&self.staff_id)?,
      username:      self.username,
      display_name:  self.display_name,
      role:          decode_role(&self.role)?,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
