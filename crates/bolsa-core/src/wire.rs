//! Small serde helpers for the backend's loose JSON.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Decode an optional timestamp. Accepts RFC 3339 and naive ISO-8601 (read as
/// UTC, which is what the backend stores). Unparseable values decode as
/// `None` rather than failing the whole payload.
pub(crate) fn timestamp<'de, D>(
  deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
    .ok()
    .map(|naive| naive.and_utc())
}

/// `null` decodes as the empty string.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn yes() -> bool { true }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_backend_timestamps() {
    let naive = parse_timestamp("2025-11-10T09:30:00").unwrap();
    assert_eq!(naive.to_rfc3339(), "2025-11-10T09:30:00+00:00");

    let fractional = parse_timestamp("2025-11-10T09:30:00.123456").unwrap();
    assert_eq!(fractional.timestamp(), naive.timestamp());

    let zoned = parse_timestamp("2025-11-10T06:30:00-03:00").unwrap();
    assert_eq!(zoned, naive);

    assert!(parse_timestamp("ayer").is_none());
  }
}
