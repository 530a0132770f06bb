//! Normalization of legacy free-text classification fields.
//!
//! Legacy records carry residency status, gender, and migration direction
//! as free text in mixed Vietnamese/English spellings, with and without
//! diacritics. Internally these are closed enums; this module is the
//! single place where free text is folded and mapped, applied once at the
//! API boundary (via the `de_*` serde helpers) or, for migration direction,
//! at aggregation time — the direction only exists inside an event's
//! description.

use serde::{Deserialize, Deserializer};

use crate::{
  event::EventKind,
  person::{Gender, ResidencyStatus},
};

// ─── Folding ─────────────────────────────────────────────────────────────────

/// Lowercase and strip Vietnamese diacritics ("Thường trú" → "thuong tru").
pub fn fold(text: &str) -> String {
  text
    .chars()
    .flat_map(char::to_lowercase)
    .map(strip_diacritic)
    .collect()
}

fn strip_diacritic(c: char) -> char {
  match c {
    'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â'
    | 'ầ' | 'ấ' | 'ẩ' | 'ẫ' | 'ậ' => 'a',
    'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
    'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
    'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ'
    | 'ờ' | 'ớ' | 'ở' | 'ỡ' | 'ợ' => 'o',
    'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
    'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
    'đ' => 'd',
    other => other,
  }
}

// ─── Legacy-value mapping ────────────────────────────────────────────────────

/// Map a legacy residency value onto the closed enum.
///
/// Unrecognised and empty values fold to `Permanent`, the documented
/// default bucket of the overview.
pub fn residency_from_text(raw: &str) -> ResidencyStatus {
  let t = fold(raw);
  if t.contains("tam tru") || t.contains("temporary") {
    ResidencyStatus::Temporary
  } else if t.contains("vang") || t.contains("absent") {
    ResidencyStatus::Absent
  } else {
    ResidencyStatus::Permanent
  }
}

/// Map a legacy gender value onto the closed enum. Anything outside the
/// male/female vocabulary is `Other`.
pub fn gender_from_text(raw: &str) -> Gender {
  match fold(raw.trim()).as_str() {
    "nam" | "male" | "m" => Gender::Male,
    "nu" | "female" | "f" => Gender::Female,
    _ => Gender::Other,
  }
}

/// Map a legacy event-type tag onto [`EventKind`]. Returns `None` for
/// unrecognised tags; unlike residency there is no sensible default kind.
pub fn event_kind_from_text(raw: &str) -> Option<EventKind> {
  let t = fold(raw.trim());
  if t.contains("sinh") || t.contains("birth") {
    Some(EventKind::Birth)
  } else if t.contains("tu vong") || t.contains("khai tu") || t.contains("death") {
    Some(EventKind::Death)
  } else if t.contains("chuyen") || t.contains("migrat") {
    Some(EventKind::Migration)
  } else if t.contains("tam vang") || t.contains("absence") {
    Some(EventKind::Absence)
  } else if t.contains("tro ve") || t.contains("return") {
    Some(EventKind::Return)
  } else {
    None
  }
}

/// Does a migration event's description signal a move *out*?
///
/// Folded substring search; absent any move-out vocabulary, a migration
/// event counts as a move in.
pub fn is_move_out(description: Option<&str>) -> bool {
  let Some(desc) = description else {
    return false;
  };
  let t = fold(desc);
  t.contains("chuyen di") || t.contains("out")
}

// ─── Serde boundary helpers ──────────────────────────────────────────────────

/// Deserialize a residency field from either the canonical tag or legacy
/// free text.
pub fn de_residency<'de, D>(de: D) -> Result<ResidencyStatus, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(de)?;
  Ok(residency_from_text(&raw))
}

/// Deserialize a gender field from either the canonical tag or legacy free
/// text.
pub fn de_gender<'de, D>(de: D) -> Result<Gender, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(de)?;
  Ok(gender_from_text(&raw))
}

/// Deserialize an event kind from either the canonical tag or a legacy
/// free-text label. Unrecognised values are rejected rather than defaulted.
pub fn de_event_kind<'de, D>(de: D) -> Result<EventKind, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(de)?;
  event_kind_from_text(&raw)
    .ok_or_else(|| serde::de::Error::custom(format!("unknown event kind: {raw}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fold_strips_vietnamese_diacritics() {
    assert_eq!(fold("Thường trú"), "thuong tru");
    assert_eq!(fold("Tạm trú"), "tam tru");
    assert_eq!(fold("Vắng mặt"), "vang mat");
    assert_eq!(fold("Đã chuyển đi"), "da chuyen di");
  }

  #[test]
  fn residency_vietnamese_with_diacritics() {
    assert_eq!(
      residency_from_text("Thường trú"),
      ResidencyStatus::Permanent
    );
    assert_eq!(residency_from_text("Tạm trú"), ResidencyStatus::Temporary);
    assert_eq!(residency_from_text("Vắng mặt"), ResidencyStatus::Absent);
  }

  #[test]
  fn residency_without_diacritics() {
    assert_eq!(residency_from_text("tam tru"), ResidencyStatus::Temporary);
    assert_eq!(residency_from_text("thuong tru"), ResidencyStatus::Permanent);
  }

  #[test]
  fn residency_english_spellings() {
    assert_eq!(residency_from_text("Temporary"), ResidencyStatus::Temporary);
    assert_eq!(residency_from_text("absent"), ResidencyStatus::Absent);
    assert_eq!(residency_from_text("permanent"), ResidencyStatus::Permanent);
  }

  #[test]
  fn residency_unknown_defaults_to_permanent() {
    assert_eq!(residency_from_text(""), ResidencyStatus::Permanent);
    assert_eq!(residency_from_text("???"), ResidencyStatus::Permanent);
  }

  #[test]
  fn gender_vocabulary() {
    assert_eq!(gender_from_text("Nam"), Gender::Male);
    assert_eq!(gender_from_text("Nữ"), Gender::Female);
    assert_eq!(gender_from_text("female"), Gender::Female);
    assert_eq!(gender_from_text("unknown-value"), Gender::Other);
    assert_eq!(gender_from_text(""), Gender::Other);
  }

  #[test]
  fn event_kind_vocabulary() {
    assert_eq!(event_kind_from_text("Khai sinh"), Some(EventKind::Birth));
    assert_eq!(event_kind_from_text("Khai tử"), Some(EventKind::Death));
    assert_eq!(
      event_kind_from_text("Chuyển đến"),
      Some(EventKind::Migration)
    );
    assert_eq!(event_kind_from_text("Tạm vắng"), Some(EventKind::Absence));
    assert_eq!(event_kind_from_text("Trở về"), Some(EventKind::Return));
    assert_eq!(event_kind_from_text("gibberish"), None);
  }

  #[test]
  fn move_out_vocabulary() {
    assert!(is_move_out(Some("Chuyển đi nơi khác")));
    assert!(is_move_out(Some("moved out of district")));
    assert!(!is_move_out(Some("chuyển đến từ phường 5")));
    assert!(!is_move_out(None));
  }
}
