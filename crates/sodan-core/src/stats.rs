//! Population statistics — pure aggregations over registry snapshots.
//!
//! Each function is a deterministic, order-insensitive fold over
//! caller-supplied collections: no I/O, no mutation, no hidden state. The
//! age pyramid takes `today` as an argument so one "now" governs a whole
//! dashboard render. The outputs are computed view models, never stored.

use std::collections::HashMap;

use chrono::{Datelike as _, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  event::{EventKind, PopulationEvent},
  household::Household,
  normalize::is_move_out,
  person::{Gender, Person, ResidencyStatus},
};

// ─── Residency overview ──────────────────────────────────────────────────────

/// Head counts by residency status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResidencyOverview {
  pub total:     usize,
  pub permanent: usize,
  pub temporary: usize,
  pub absent:    usize,
}

pub fn residency_overview(persons: &[Person]) -> ResidencyOverview {
  let mut out = ResidencyOverview { total: persons.len(), ..Default::default() };
  for p in persons {
    match p.residency {
      ResidencyStatus::Permanent => out.permanent += 1,
      ResidencyStatus::Temporary => out.temporary += 1,
      ResidencyStatus::Absent => out.absent += 1,
    }
  }
  out
}

// ─── Age/gender pyramid ──────────────────────────────────────────────────────

/// One band of the age pyramid. Counts are fractional: a person whose
/// gender is outside the male/female vocabulary contributes 0.5 to each
/// side, so a band total is exact even when individual sides are not whole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeBand {
  pub label:  &'static str,
  pub male:   f64,
  pub female: f64,
}

impl AgeBand {
  fn new(label: &'static str) -> Self { Self { label, male: 0.0, female: 0.0 } }

  pub fn total(&self) -> f64 { self.male + self.female }
}

/// The five-band pyramid plus the dependency ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeStructure {
  pub bands:            [AgeBand; 5],
  /// (under-15 + 60-and-over) / (15–59); `0.0` when there is no
  /// working-age population.
  pub dependency_ratio: f64,
}

/// Whole years elapsed as of `today`, rolled down by one if the birthday
/// has not yet been reached this year.
fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
  let mut age = today.year() - dob.year();
  if (today.month(), today.day()) < (dob.month(), dob.day()) {
    age -= 1;
  }
  age
}

pub fn age_structure(persons: &[Person], today: NaiveDate) -> AgeStructure {
  let mut bands = [
    AgeBand::new("0-5"),
    AgeBand::new("6-14"),
    AgeBand::new("15-24"),
    AgeBand::new("25-59"),
    AgeBand::new("60+"),
  ];

  for p in persons {
    // Records without a parseable birth date are skipped, not failed.
    let Some(dob) = p.date_of_birth else {
      continue;
    };
    let age = age_on(dob, today);
    let idx = if age <= 5 {
      0
    } else if age <= 14 {
      1
    } else if age <= 24 {
      2
    } else if age <= 59 {
      3
    } else {
      4
    };
    match p.gender {
      Gender::Male => bands[idx].male += 1.0,
      Gender::Female => bands[idx].female += 1.0,
      Gender::Other => {
        bands[idx].male += 0.5;
        bands[idx].female += 0.5;
      }
    }
  }

  let dependents = bands[0].total() + bands[1].total() + bands[4].total();
  let working = bands[2].total() + bands[3].total();
  let dependency_ratio = if working == 0.0 { 0.0 } else { dependents / working };

  AgeStructure { bands, dependency_ratio }
}

// ─── Population movement ─────────────────────────────────────────────────────

/// Inflow/outflow counts derived from the event log. Absence and return
/// events belong to neither flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MovementSummary {
  pub births:    usize,
  pub deaths:    usize,
  pub moved_in:  usize,
  pub moved_out: usize,
}

impl MovementSummary {
  pub fn inflow(&self) -> usize { self.births + self.moved_in }

  pub fn outflow(&self) -> usize { self.deaths + self.moved_out }
}

pub fn movement(events: &[PopulationEvent]) -> MovementSummary {
  let mut out = MovementSummary::default();
  for e in events {
    match e.kind {
      EventKind::Birth => out.births += 1,
      EventKind::Death => out.deaths += 1,
      EventKind::Migration => {
        if is_move_out(e.description.as_deref()) {
          out.moved_out += 1;
        } else {
          out.moved_in += 1;
        }
      }
      EventKind::Absence | EventKind::Return => {}
    }
  }
  out
}

// ─── Household-size distribution ─────────────────────────────────────────────

/// Histogram of household sizes plus the arithmetic mean size.
///
/// The first bucket is `size <= 1`: a household with no registered members
/// lands there together with single-person households.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HouseholdSizeSummary {
  pub one:          usize,
  pub two_to_three: usize,
  pub four_to_five: usize,
  pub six_plus:     usize,
  /// `0.0` when there are no households.
  pub mean_size:    f64,
}

pub fn household_sizes(
  households: &[Household],
  persons: &[Person],
) -> HouseholdSizeSummary {
  let mut member_counts: HashMap<Uuid, usize> = households
    .iter()
    .map(|h| (h.household_id, 0))
    .collect();
  for p in persons {
    if let Some(hid) = p.household_id
      && let Some(count) = member_counts.get_mut(&hid)
    {
      *count += 1;
    }
  }

  let mut out = HouseholdSizeSummary::default();
  let mut sum = 0usize;
  for h in households {
    let size = member_counts[&h.household_id];
    sum += size;
    if size <= 1 {
      out.one += 1;
    } else if size <= 3 {
      out.two_to_three += 1;
    } else if size <= 5 {
      out.four_to_five += 1;
    } else {
      out.six_plus += 1;
    }
  }

  out.mean_size = if households.is_empty() {
    0.0
  } else {
    sum as f64 / households.len() as f64
  };
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::normalize::residency_from_text;

  fn person(
    gender: Gender,
    dob: Option<NaiveDate>,
    residency: ResidencyStatus,
    household_id: Option<Uuid>,
  ) -> Person {
    Person {
      person_id: Uuid::new_v4(),
      household_id,
      full_name: "Nguyễn Văn A".into(),
      date_of_birth: dob,
      gender,
      national_id: Uuid::new_v4().simple().to_string(),
      relationship: None,
      occupation: None,
      education: None,
      residency,
      deceased: false,
      created_at: Utc::now(),
    }
  }

  fn household() -> Household {
    Household {
      household_id: Uuid::new_v4(),
      code:         Uuid::new_v4().simple().to_string(),
      street:       None,
      ward:         None,
      district:     None,
      kind:         "family".into(),
      email:        None,
      secret_hash:  None,
      active:       false,
      created_at:   Utc::now(),
    }
  }

  fn event(kind: EventKind, description: Option<&str>) -> PopulationEvent {
    PopulationEvent {
      event_id:    Uuid::new_v4(),
      person_id:   Uuid::new_v4(),
      kind,
      description: description.map(str::to_owned),
      occurred_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      recorded_by: None,
      recorded_at: Utc::now(),
    }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  // ── Residency overview ──────────────────────────────────────────────────

  #[test]
  fn residency_overview_partitions_by_status() {
    // Legacy spellings route through normalization into the buckets.
    let persons = vec![
      person(Gender::Male, None, residency_from_text("Thường trú"), None),
      person(Gender::Male, None, residency_from_text("tam tru"), None),
      person(Gender::Female, None, residency_from_text("Vắng mặt"), None),
      // Empty free text falls into the permanent default bucket.
      person(Gender::Female, None, residency_from_text(""), None),
    ];
    let overview = residency_overview(&persons);
    assert_eq!(overview.total, 4);
    assert_eq!(overview.permanent, 2);
    assert_eq!(overview.temporary, 1);
    assert_eq!(overview.absent, 1);
  }

  // ── Age structure ───────────────────────────────────────────────────────

  #[test]
  fn age_bands_use_last_birthday_age() {
    let today = date(2024, 6, 15);
    let persons = vec![
      // Birthday already passed this year: exactly 6 → band "6-14".
      person(Gender::Male, Some(date(2018, 6, 1)), ResidencyStatus::Permanent, None),
      // Birthday not reached yet: still 5 → band "0-5".
      person(Gender::Male, Some(date(2018, 7, 1)), ResidencyStatus::Permanent, None),
    ];
    let s = age_structure(&persons, today);
    assert_eq!(s.bands[0].male, 1.0);
    assert_eq!(s.bands[1].male, 1.0);
  }

  #[test]
  fn unknown_gender_splits_half_and_half() {
    let today = date(2024, 6, 15);
    let persons =
      vec![person(Gender::Other, Some(date(1980, 1, 1)), ResidencyStatus::Permanent, None)];
    let s = age_structure(&persons, today);
    // Band 25–59, half a unit on each side — not a whole unit on either.
    assert_eq!(s.bands[3].male, 0.5);
    assert_eq!(s.bands[3].female, 0.5);
    assert_eq!(s.bands[3].total(), 1.0);
  }

  #[test]
  fn missing_birth_dates_are_skipped() {
    let today = date(2024, 6, 15);
    let persons = vec![
      person(Gender::Male, None, ResidencyStatus::Permanent, None),
      person(Gender::Female, Some(date(2000, 1, 1)), ResidencyStatus::Permanent, None),
    ];
    let s = age_structure(&persons, today);
    let counted: f64 = s.bands.iter().map(AgeBand::total).sum();
    assert_eq!(counted, 1.0);
  }

  #[test]
  fn dependency_ratio_zero_when_no_working_age() {
    let today = date(2024, 6, 15);
    // Ten dependents (children and elderly), zero working-age persons.
    let mut persons = Vec::new();
    for _ in 0..5 {
      persons.push(person(Gender::Male, Some(date(2020, 1, 1)), ResidencyStatus::Permanent, None));
      persons.push(person(Gender::Female, Some(date(1950, 1, 1)), ResidencyStatus::Permanent, None));
    }
    let s = age_structure(&persons, today);
    assert_eq!(s.dependency_ratio, 0.0);
    assert!(s.dependency_ratio.is_finite());
  }

  #[test]
  fn dependency_ratio_half_for_twenty_working_ten_dependent() {
    let today = date(2024, 6, 15);
    let mut persons = Vec::new();
    for _ in 0..20 {
      persons.push(person(Gender::Male, Some(date(1990, 1, 1)), ResidencyStatus::Permanent, None));
    }
    for _ in 0..10 {
      persons.push(person(Gender::Female, Some(date(2015, 1, 1)), ResidencyStatus::Permanent, None));
    }
    let s = age_structure(&persons, today);
    assert_eq!(s.dependency_ratio, 0.5);
  }

  // ── Movement ────────────────────────────────────────────────────────────

  #[test]
  fn movement_classifies_events() {
    let events = vec![
      event(EventKind::Birth, None),
      event(EventKind::Birth, None),
      event(EventKind::Death, None),
      event(EventKind::Migration, Some("chuyển đến từ quận 3")),
      event(EventKind::Migration, Some("Đã chuyển đi nơi khác")),
      event(EventKind::Migration, None), // no direction signal → move in
      event(EventKind::Absence, None),
      event(EventKind::Return, None),
    ];
    let m = movement(&events);
    assert_eq!(m.births, 2);
    assert_eq!(m.deaths, 1);
    assert_eq!(m.moved_in, 2);
    assert_eq!(m.moved_out, 1);
    assert_eq!(m.inflow(), 4);
    assert_eq!(m.outflow(), 2);
  }

  // ── Household sizes ─────────────────────────────────────────────────────

  #[test]
  fn household_size_buckets_and_mean() {
    let h1 = household(); // 0 members → "one" bucket (size <= 1)
    let h2 = household(); // 1 member
    let h3 = household(); // 3 members
    let h4 = household(); // 6 members
    let households = vec![h1.clone(), h2.clone(), h3.clone(), h4.clone()];

    let mut persons = Vec::new();
    persons.push(person(Gender::Male, None, ResidencyStatus::Permanent, Some(h2.household_id)));
    for _ in 0..3 {
      persons.push(person(Gender::Male, None, ResidencyStatus::Permanent, Some(h3.household_id)));
    }
    for _ in 0..6 {
      persons.push(person(Gender::Female, None, ResidencyStatus::Permanent, Some(h4.household_id)));
    }
    // An unassigned person counts toward no household.
    persons.push(person(Gender::Male, None, ResidencyStatus::Permanent, None));

    let sizes = household_sizes(&households, &persons);
    assert_eq!(sizes.one, 2); // the empty household and the 1-member one
    assert_eq!(sizes.two_to_three, 1);
    assert_eq!(sizes.four_to_five, 0);
    assert_eq!(sizes.six_plus, 1);
    assert_eq!(sizes.mean_size, 10.0 / 4.0);
  }

  #[test]
  fn household_sizes_empty_input() {
    let sizes = household_sizes(&[], &[]);
    assert_eq!(sizes.mean_size, 0.0);
    assert_eq!(sizes.one, 0);
  }

  // ── Idempotence ─────────────────────────────────────────────────────────

  #[test]
  fn aggregations_are_idempotent_over_a_snapshot() {
    let today = date(2024, 6, 15);
    let h = household();
    let households = vec![h.clone()];
    let persons = vec![
      person(Gender::Male, Some(date(1990, 2, 2)), ResidencyStatus::Permanent, Some(h.household_id)),
      person(Gender::Other, Some(date(2010, 5, 5)), ResidencyStatus::Temporary, Some(h.household_id)),
    ];
    let events = vec![
      event(EventKind::Birth, None),
      event(EventKind::Migration, Some("chuyển đi")),
    ];

    assert_eq!(residency_overview(&persons), residency_overview(&persons));
    assert_eq!(
      age_structure(&persons, today),
      age_structure(&persons, today)
    );
    assert_eq!(movement(&events), movement(&events));
    assert_eq!(
      household_sizes(&households, &persons),
      household_sizes(&households, &persons)
    );
  }
}
