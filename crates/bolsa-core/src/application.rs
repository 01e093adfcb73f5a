//! Applications ("postulaciones"): a candidate's interest in an offer.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, guard, profile::PersonProfile, wire};

/// Where an application stands. `Hired` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
  #[default]
  #[serde(rename = "pendiente", alias = "PENDIENTE")]
  Pending,
  #[serde(rename = "revisando", alias = "REVISANDO")]
  Reviewing,
  #[serde(rename = "entrevista", alias = "ENTREVISTA")]
  Interview,
  #[serde(rename = "contratado", alias = "CONTRATADO")]
  Hired,
  #[serde(rename = "rechazado", alias = "RECHAZADO")]
  Rejected,
}

impl ApplicationStatus {
  pub const ALL: [ApplicationStatus; 5] = [
    Self::Pending,
    Self::Reviewing,
    Self::Interview,
    Self::Hired,
    Self::Rejected,
  ];

  pub fn is_terminal(self) -> bool { matches!(self, Self::Hired | Self::Rejected) }

  /// The backend's spelling.
  pub fn wire_name(self) -> &'static str {
    match self {
      Self::Pending => "pendiente",
      Self::Reviewing => "revisando",
      Self::Interview => "entrevista",
      Self::Hired => "contratado",
      Self::Rejected => "rechazado",
    }
  }
}

impl fmt::Display for ApplicationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Pending => "pending",
      Self::Reviewing => "reviewing",
      Self::Interview => "interview",
      Self::Hired => "hired",
      Self::Rejected => "rejected",
    })
  }
}

impl FromStr for ApplicationStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim().to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|status| status.wire_name() == s || status.to_string() == s)
      .ok_or_else(|| Error::Validation(format!("unknown application status {s:?}")))
  }
}

/// An application as returned by `/api/postulaciones/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  #[serde(deserialize_with = "guard::numeric_id")]
  pub id:         i64,
  #[serde(deserialize_with = "guard::numeric_id")]
  pub dni:        i64,
  #[serde(rename = "id_oferta", deserialize_with = "guard::numeric_id")]
  pub offer_id:   i64,
  #[serde(rename = "estado", default)]
  pub status:     ApplicationStatus,
  #[serde(rename = "creado_en", default, deserialize_with = "wire::timestamp")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Application {
  pub fn key(&self) -> (i64, i64) { (self.dni, self.offer_id) }
}

/// Body of `POST /api/postulaciones/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
  pub dni:      i64,
  #[serde(rename = "id_oferta")]
  pub offer_id: i64,
  #[serde(rename = "estado")]
  pub status:   ApplicationStatus,
}

// ─── Company view ────────────────────────────────────────────────────────────

/// The applicant part of a company-side application row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
  #[serde(deserialize_with = "guard::numeric_id")]
  pub dni:       i64,
  #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
  pub name:      String,
  #[serde(rename = "apellido", default, deserialize_with = "wire::text")]
  pub surname:   String,
  #[serde(default, deserialize_with = "wire::text")]
  pub email:     String,
  #[serde(rename = "telefono", default)]
  pub phone:     Option<String>,
}

impl Applicant {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.name, self.surname).trim().to_owned()
  }

  /// Placeholder for a candidate whose profile could not be fetched.
  pub fn unknown(dni: i64) -> Self {
    Self {
      dni,
      name: String::new(),
      surname: String::new(),
      email: String::new(),
      phone: None,
    }
  }
}

impl From<PersonProfile> for Applicant {
  fn from(p: PersonProfile) -> Self {
    Self {
      dni:     p.dni,
      name:    p.nombre,
      surname: p.apellido,
      email:   p.email,
      phone:   p.telefono,
    }
  }
}

/// The offer part of a company-side application row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedOffer {
  #[serde(rename = "id_oferta", deserialize_with = "guard::numeric_id")]
  pub id:    i64,
  #[serde(rename = "titulo")]
  pub title: String,
}

/// One row of `GET /api/postulaciones/empresa/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyApplication {
  #[serde(rename = "id_postulacion", deserialize_with = "guard::numeric_id")]
  pub id:         i64,
  #[serde(rename = "estado", default)]
  pub status:     ApplicationStatus,
  #[serde(rename = "creado_en", default, deserialize_with = "wire::timestamp")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(rename = "persona")]
  pub applicant:  Applicant,
  #[serde(rename = "oferta")]
  pub offer:      AppliedOffer,
}

impl CompanyApplication {
  pub fn to_application(&self) -> Application {
    Application {
      id:         self.id,
      dni:        self.applicant.dni,
      offer_id:   self.offer.id,
      status:     self.status,
      created_at: self.created_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn status_wire_names() {
    assert_eq!(
      serde_json::to_value(ApplicationStatus::Interview).unwrap(),
      json!("entrevista")
    );
    let s: ApplicationStatus = serde_json::from_value(json!("CONTRATADO")).unwrap();
    assert_eq!(s, ApplicationStatus::Hired);
    assert_eq!("rejected".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Rejected);
    assert_eq!("revisando".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Reviewing);
  }

  #[test]
  fn terminal_states() {
    let terminal: Vec<_> = ApplicationStatus::ALL
      .into_iter()
      .filter(|s| s.is_terminal())
      .collect();
    assert_eq!(terminal, vec![ApplicationStatus::Hired, ApplicationStatus::Rejected]);
  }

  #[test]
  fn decodes_company_rows() {
    let row: CompanyApplication = serde_json::from_value(json!({
      "id_postulacion": 11,
      "estado": "pendiente",
      "creado_en": "2025-11-10T09:30:00",
      "persona": {
        "dni": 12345678, "apellido": "Pérez", "nombre": "Juan",
        "email": "juan@example.com", "telefono": null
      },
      "oferta": {
        "id_oferta": "5", "titulo": "Mozo", "descripcion": "...",
        "fecha_publicacion": null
      }
    }))
    .unwrap();
    assert_eq!(row.applicant.full_name(), "Juan Pérez");
    let app = row.to_application();
    assert_eq!(app.key(), (12345678, 5));
    assert_eq!(app.status, ApplicationStatus::Pending);
  }
}
