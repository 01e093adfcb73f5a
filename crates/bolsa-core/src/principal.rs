//! Principal: the authenticated actor.
//!
//! A principal is either a person (keyed by national id, `dni`) or a company
//! (keyed by `id_empresa`). The identity is a sum type so there is never a
//! principal with neither or both ids.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, guard};

/// The kind of actor a principal represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
  Person,
  Company,
}

impl PrincipalKind {
  /// Map a backend role string (`"PERSONA"`, `"EMPRESA"`) to a kind.
  pub fn from_role(role: &str) -> Option<Self> {
    match role.trim().to_ascii_uppercase().as_str() {
      "PERSONA" => Some(Self::Person),
      "EMPRESA" => Some(Self::Company),
      _ => None,
    }
  }

  pub fn role(self) -> &'static str {
    match self {
      Self::Person => "PERSONA",
      Self::Company => "EMPRESA",
    }
  }
}

impl fmt::Display for PrincipalKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Person => f.write_str("person"),
      Self::Company => f.write_str("company"),
    }
  }
}

/// Who the principal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
  Person { dni: i64 },
  Company { id_empresa: i64 },
}

impl Identity {
  pub fn kind(self) -> PrincipalKind {
    match self {
      Self::Person { .. } => PrincipalKind::Person,
      Self::Company { .. } => PrincipalKind::Company,
    }
  }

  /// The numeric key: `dni` for a person, `id_empresa` for a company.
  pub fn id(self) -> i64 {
    match self {
      Self::Person { dni } => dni,
      Self::Company { id_empresa } => id_empresa,
    }
  }

  fn from_parts(
    kind: PrincipalKind,
    dni: Option<i64>,
    id_empresa: Option<i64>,
  ) -> Result<Self> {
    match kind {
      PrincipalKind::Person => dni
        .map(|dni| Self::Person { dni })
        .ok_or_else(|| Error::Auth("PERSONA session without dni".into())),
      PrincipalKind::Company => id_empresa
        .map(|id_empresa| Self::Company { id_empresa })
        .ok_or_else(|| {
          Error::Auth("EMPRESA session without id_empresa".into())
        }),
    }
  }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Person { dni } => write!(f, "person {dni}"),
      Self::Company { id_empresa } => write!(f, "company {id_empresa}"),
    }
  }
}

/// Opaque bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
  pub fn new(token: impl Into<String>) -> Self { Self(token.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Debug for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionToken(..)")
  }
}

/// The authenticated actor, held only in process-local session state.
#[derive(Debug, Clone)]
pub struct Principal {
  pub identity:     Identity,
  pub display_name: String,
  pub email:        String,
  pub token:        SessionToken,
  pub issued_at:    DateTime<Utc>,
}

impl Principal {
  pub fn kind(&self) -> PrincipalKind { self.identity.kind() }

  pub fn id(&self) -> i64 { self.identity.id() }

  /// The candidate's `dni`, if this principal is a person.
  pub fn dni(&self) -> Option<i64> {
    match self.identity {
      Identity::Person { dni } => Some(dni),
      Identity::Company { .. } => None,
    }
  }

  /// Build a principal from a successful `POST /auth/login` payload.
  pub fn from_login(response: LoginResponse, email: &str) -> Result<Self> {
    let kind = PrincipalKind::from_role(&response.rol).ok_or_else(|| {
      Error::Auth(format!("unsupported role {:?}", response.rol))
    })?;
    let identity = Identity::from_parts(kind, response.dni, response.id_empresa)?;
    let display_name = response
      .usuario
      .as_ref()
      .and_then(display_name_of)
      .unwrap_or_else(|| email.to_owned());

    Ok(Self {
      identity,
      display_name,
      email: email.to_owned(),
      token: SessionToken::new(response.access_token),
      issued_at: Utc::now(),
    })
  }

  /// Rebuild a principal from `GET /auth/me` and a token found in the durable
  /// slot.
  pub fn from_user_info(info: UserInfo, token: SessionToken) -> Result<Self> {
    let kind = PrincipalKind::from_role(&info.rol).ok_or_else(|| {
      Error::Auth(format!("unsupported role {:?}", info.rol))
    })?;
    if !info.activo {
      return Err(Error::Auth(format!("account {} is disabled", info.email)));
    }
    let identity = Identity::from_parts(kind, info.dni, info.id_empresa)?;
    Ok(Self {
      identity,
      display_name: info.email.clone(),
      email: info.email,
      token,
      issued_at: Utc::now(),
    })
  }
}

/// Best display name found in the optional `usuario` object of a login
/// response.
fn display_name_of(usuario: &serde_json::Value) -> Option<String> {
  let text = |key: &str| {
    usuario
      .get(key)
      .and_then(serde_json::Value::as_str)
      .map(str::trim)
      .filter(|s| !s.is_empty())
  };
  match (text("nombre"), text("apellido")) {
    (Some(nombre), Some(apellido)) => Some(format!("{nombre} {apellido}")),
    (Some(nombre), None) => Some(nombre.to_owned()),
    _ => text("nombre_empresa").map(str::to_owned),
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
  pub email:    String,
  pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
  pub access_token: String,
  #[serde(default = "bearer")]
  pub token_type:   String,
  pub rol:          String,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub dni:          Option<i64>,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub id_empresa:   Option<i64>,
  #[serde(default)]
  pub usuario:      Option<serde_json::Value>,
}

fn bearer() -> String { "bearer".to_owned() }

/// Response of `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
  pub email:      String,
  pub rol:        String,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub id_usuario: Option<i64>,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub dni:        Option<i64>,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub id_empresa: Option<i64>,
  #[serde(default = "active")]
  pub activo:     bool,
}

fn active() -> bool { true }

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn login(value: serde_json::Value) -> LoginResponse {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn person_login_maps_to_person_identity() {
    let resp = login(json!({
      "access_token": "tok",
      "token_type": "bearer",
      "rol": "PERSONA",
      "dni": 12345678,
      "usuario": { "nombre": "Juan", "apellido": "Pérez" }
    }));
    let p = Principal::from_login(resp, "juan@example.com").unwrap();
    assert_eq!(p.identity, Identity::Person { dni: 12345678 });
    assert_eq!(p.display_name, "Juan Pérez");
    assert_eq!(p.token.as_str(), "tok");
  }

  #[test]
  fn company_login_accepts_string_ids() {
    let resp = login(json!({
      "access_token": "tok",
      "rol": "EMPRESA",
      "id_empresa": "3",
      "usuario": { "nombre_empresa": "Panadería Sur" }
    }));
    let p = Principal::from_login(resp, "rrhh@sur.com").unwrap();
    assert_eq!(p.identity, Identity::Company { id_empresa: 3 });
    assert_eq!(p.display_name, "Panadería Sur");
    assert_eq!(p.dni(), None);
  }

  #[test]
  fn missing_id_for_role_is_an_auth_error() {
    let resp = login(json!({ "access_token": "tok", "rol": "PERSONA" }));
    let err = Principal::from_login(resp, "x@y.z").unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
  }

  #[test]
  fn unknown_role_is_rejected() {
    let resp = login(json!({ "access_token": "tok", "rol": "ADMIN", "dni": 1 }));
    assert!(Principal::from_login(resp, "x@y.z").is_err());
  }

  #[test]
  fn display_name_falls_back_to_email() {
    let resp = login(json!({ "access_token": "t", "rol": "EMPRESA", "id_empresa": 9 }));
    let p = Principal::from_login(resp, "hola@empresa.com").unwrap();
    assert_eq!(p.display_name, "hola@empresa.com");
  }

  #[test]
  fn token_is_redacted_in_debug() {
    let token = SessionToken::new("secret-jwt");
    assert!(!format!("{token:?}").contains("secret"));
  }

  #[test]
  fn disabled_account_cannot_resume() {
    let info: UserInfo = serde_json::from_value(json!({
      "email": "a@b.c", "rol": "PERSONA", "dni": 20111222, "activo": false
    }))
    .unwrap();
    assert!(Principal::from_user_info(info, SessionToken::new("t")).is_err());
  }
}
