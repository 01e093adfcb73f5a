//! Person and company profiles, and the self-registration forms.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, guard, wire};

/// Smallest `dni` the backend accepts.
pub const MIN_DNI: i64 = 10_000_000;

/// Shortest password the backend accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

// ─── Registration ────────────────────────────────────────────────────────────

/// Body of `POST /auth/registro/persona`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonRegistration {
  pub dni:              i64,
  pub nombre:           String,
  pub apellido:         String,
  pub email:            String,
  pub password:         String,
  /// `YYYY-MM-DD`.
  pub fecha_nacimiento: String,
  pub direccion:        String,
  pub ciudad:           String,
  pub provincia:        String,
  pub sexo:             String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub telefono:         Option<String>,
}

impl PersonRegistration {
  pub fn validate(&self) -> Result<()> {
    if self.dni <= MIN_DNI {
      return Err(Error::Validation(format!("dni must be greater than {MIN_DNI}")));
    }
    require("name", &self.nombre)?;
    require("surname", &self.apellido)?;
    validate_credentials(&self.email, &self.password)?;
    require("birth date", &self.fecha_nacimiento)?;
    if chrono::NaiveDate::parse_from_str(self.fecha_nacimiento.trim(), "%Y-%m-%d").is_err() {
      return Err(Error::Validation("birth date must be YYYY-MM-DD".into()));
    }
    require("address", &self.direccion)?;
    require("city", &self.ciudad)?;
    require("province", &self.provincia)?;
    require("sex", &self.sexo)
  }
}

/// Body of `POST /auth/registro/empresa`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRegistration {
  pub nombre:    String,
  pub email:     String,
  pub password:  String,
  pub direccion: String,
  pub ciudad:    String,
  pub provincia: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub telefono:  Option<String>,
}

impl CompanyRegistration {
  pub fn validate(&self) -> Result<()> {
    require("company name", &self.nombre)?;
    validate_credentials(&self.email, &self.password)?;
    require("address", &self.direccion)?;
    require("city", &self.ciudad)?;
    require("province", &self.provincia)
  }
}

/// What the registration endpoints answer on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationReceipt {
  #[serde(rename = "mensaje", default)]
  pub message:    String,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub dni:        Option<i64>,
  #[serde(default, deserialize_with = "guard::optional_numeric_id")]
  pub id_empresa: Option<i64>,
}

fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    Err(Error::required(field))
  } else {
    Ok(())
  }
}

/// Login and registration share these rules.
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
  require("email", email)?;
  if !email.contains('@') {
    return Err(Error::Validation("email must be a valid address".into()));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::Validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// `GET /api/personas/{dni}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonProfile {
  #[serde(deserialize_with = "guard::numeric_id")]
  pub dni:       i64,
  #[serde(default, deserialize_with = "wire::text")]
  pub nombre:    String,
  #[serde(default, deserialize_with = "wire::text")]
  pub apellido:  String,
  #[serde(default, alias = "mail", deserialize_with = "wire::text")]
  pub email:     String,
  #[serde(default)]
  pub ciudad:    Option<String>,
  #[serde(default)]
  pub provincia: Option<String>,
  #[serde(default)]
  pub telefono:  Option<String>,
}

impl PersonProfile {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.nombre, self.apellido).trim().to_owned()
  }
}

/// `GET /api/empresas/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
  #[serde(deserialize_with = "guard::numeric_id")]
  pub id_empresa: i64,
  #[serde(default, deserialize_with = "wire::text")]
  pub nombre:     String,
  #[serde(default, alias = "mail", deserialize_with = "wire::text")]
  pub email:      String,
  #[serde(default)]
  pub ciudad:     Option<String>,
  #[serde(default)]
  pub provincia:  Option<String>,
  #[serde(default)]
  pub telefono:   Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn person() -> PersonRegistration {
    PersonRegistration {
      dni:              30111222,
      nombre:           "Ana".into(),
      apellido:         "Gómez".into(),
      email:            "ana@example.com".into(),
      password:         "secreto".into(),
      fecha_nacimiento: "1999-04-02".into(),
      direccion:        "Mitre 100".into(),
      ciudad:           "Viedma".into(),
      provincia:        "Río Negro".into(),
      sexo:             "F".into(),
      telefono:         None,
    }
  }

  #[test]
  fn valid_person_passes() { assert!(person().validate().is_ok()); }

  #[test]
  fn person_rules() {
    let low_dni = PersonRegistration { dni: 9_999_999, ..person() };
    assert!(low_dni.validate().is_err());

    let bad_mail = PersonRegistration { email: "ana.example.com".into(), ..person() };
    assert!(bad_mail.validate().is_err());

    let short_pw = PersonRegistration { password: "123".into(), ..person() };
    assert!(short_pw.validate().is_err());

    let bad_date = PersonRegistration { fecha_nacimiento: "02/04/1999".into(), ..person() };
    assert!(bad_date.validate().is_err());

    let no_city = PersonRegistration { ciudad: " ".into(), ..person() };
    assert!(matches!(no_city.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn company_rules() {
    let company = CompanyRegistration {
      nombre:    "Panadería Sur".into(),
      email:     "rrhh@sur.com".into(),
      password:  "secreto".into(),
      direccion: "San Martín 20".into(),
      ciudad:    "Viedma".into(),
      provincia: "Río Negro".into(),
      telefono:  Some("2920-000000".into()),
    };
    assert!(company.validate().is_ok());
    let nameless = CompanyRegistration { nombre: String::new(), ..company };
    assert!(nameless.validate().is_err());
  }
}
