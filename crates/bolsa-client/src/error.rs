//! Mapping backend failures onto `bolsa_core::Error`.
//!
//! The backend reports failures as `{"detail": "..."}` or, for request
//! validation, `{"detail": [{"loc": [...], "msg": "..."}, ...]}`. Both shapes
//! are flattened into one line for the status banner.

use bolsa_core::Error;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Longest raw body quoted when the payload has no recognisable shape.
const RAW_BODY_LIMIT: usize = 200;

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  detail:  Option<Detail>,
  #[serde(default, alias = "mensaje")]
  message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
  Text(String),
  Items(Vec<DetailItem>),
  Other(Value),
}

#[derive(Deserialize)]
struct DetailItem {
  #[serde(default)]
  loc: Vec<Value>,
  #[serde(default)]
  msg: String,
}

impl DetailItem {
  /// The last path segment that names a field, e.g. `email` in
  /// `["body", "email"]`.
  fn field(&self) -> Option<String> {
    self.loc.iter().rev().find_map(|segment| match segment {
      Value::String(s) if !matches!(s.as_str(), "body" | "query" | "path") => {
        Some(s.clone())
      }
      _ => None,
    })
  }
}

/// Flatten a backend error body into `field: message; field: message`.
/// Returns `None` when the body carries no message at all.
pub fn flatten_detail(body: &str) -> Option<String> {
  let parsed: ErrorBody = serde_json::from_str(body).ok()?;
  match parsed.detail {
    Some(Detail::Text(text)) => Some(text),
    Some(Detail::Items(items)) if !items.is_empty() => Some(
      items
        .iter()
        .map(|item| match item.field() {
          Some(field) => format!("{field}: {}", item.msg),
          None => item.msg.clone(),
        })
        .collect::<Vec<_>>()
        .join("; "),
    ),
    Some(Detail::Other(value)) if !value.is_null() => Some(value.to_string()),
    _ => parsed.message,
  }
}

/// The error for a non-2xx answer.
pub(crate) fn from_status(status: StatusCode, body: &str) -> Error {
  let message = flatten_detail(body).unwrap_or_else(|| {
    let raw = body.trim();
    if raw.is_empty() {
      status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
    } else {
      raw.chars().take(RAW_BODY_LIMIT).collect()
    }
  });

  match status.as_u16() {
    401 | 403 => Error::Auth(message),
    404 => Error::NotFound(message),
    400 | 409 | 422 => Error::Validation(message),
    _ => Error::Network(format!("{status}: {message}")),
  }
}

/// The error for a request that never got an answer.
pub(crate) fn transport(what: &str, err: reqwest::Error) -> Error {
  if err.is_timeout() {
    Error::Network(format!("{what} timed out"))
  } else if err.is_connect() {
    Error::Network(format!("{what}: could not reach the server"))
  } else {
    Error::Network(format!("{what}: {err}"))
  }
}

#[cfg(test)]
mod tests {
  use bolsa_core::ErrorKind;

  use super::*;

  #[test]
  fn flattens_validation_lists() {
    let body = r#"{"detail":[
      {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"},
      {"loc":["body","password"],"msg":"too short"}
    ]}"#;
    assert_eq!(
      flatten_detail(body).as_deref(),
      Some("email: value is not a valid email address; password: too short")
    );
  }

  #[test]
  fn plain_detail_is_kept() {
    assert_eq!(
      flatten_detail(r#"{"detail":"Credenciales inválidas"}"#).as_deref(),
      Some("Credenciales inválidas")
    );
    assert_eq!(
      flatten_detail(r#"{"mensaje":"Ya existe"}"#).as_deref(),
      Some("Ya existe")
    );
    assert_eq!(flatten_detail("<html>oops</html>"), None);
  }

  #[test]
  fn statuses_map_to_kinds() {
    let kind = |code: u16| {
      from_status(StatusCode::from_u16(code).unwrap(), r#"{"detail":"x"}"#).kind()
    };
    assert_eq!(kind(401), ErrorKind::Auth);
    assert_eq!(kind(403), ErrorKind::Auth);
    assert_eq!(kind(404), ErrorKind::NotFound);
    assert_eq!(kind(409), ErrorKind::Validation);
    assert_eq!(kind(422), ErrorKind::Validation);
    assert_eq!(kind(500), ErrorKind::Network);
  }

  #[test]
  fn empty_body_uses_reason_phrase() {
    let err = from_status(StatusCode::SERVICE_UNAVAILABLE, "");
    assert_eq!(err.to_string(), "network error: 503 Service Unavailable: Service Unavailable");
  }
}
