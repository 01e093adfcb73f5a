//! Activities: the shared skill/specialty catalog and the links that attach
//! catalog entries to people and companies.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, guard, offer::Level, wire};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  #[serde(rename = "id_actividad", deserialize_with = "guard::numeric_id")]
  pub id:          i64,
  #[serde(rename = "nombre")]
  pub name:        String,
  #[serde(default)]
  pub area:        Option<String>,
  #[serde(rename = "especialidad", default)]
  pub specialty:   Option<String>,
  #[serde(rename = "descripcion", default)]
  pub description: Option<String>,
}

/// Body of `POST /api/actividades/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewActivity {
  #[serde(rename = "nombre")]
  pub name:        String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub area:        Option<String>,
  #[serde(rename = "especialidad", skip_serializing_if = "Option::is_none")]
  pub specialty:   Option<String>,
  #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl NewActivity {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  /// Trims every field, drops blank optionals, and requires a name.
  pub fn normalized(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::required("activity name"));
    }
    let clean = |v: Option<String>| {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    };
    Ok(Self {
      name,
      area: clean(self.area),
      specialty: clean(self.specialty),
      description: clean(self.description),
    })
  }
}

// ─── Person skills ───────────────────────────────────────────────────────────

/// An activity on a person's profile (`GET /api/actividades/persona/{dni}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSkill {
  #[serde(rename = "id_actividad", deserialize_with = "guard::numeric_id")]
  pub activity_id: i64,
  #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
  pub name:        String,
  #[serde(default)]
  pub area:        Option<String>,
  #[serde(rename = "especialidad", default)]
  pub specialty:   Option<String>,
  #[serde(rename = "nivel_experiencia", default)]
  pub level:       Option<Level>,
  #[serde(rename = "años_experiencia", default)]
  pub years:       Option<u32>,
}

/// Body of `POST /api/actividades/persona`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSkillLink {
  pub dni:         i64,
  #[serde(rename = "id_actividad")]
  pub activity_id: i64,
  #[serde(rename = "nivel_experiencia", skip_serializing_if = "Option::is_none")]
  pub level:       Option<Level>,
  #[serde(rename = "años_experiencia")]
  pub years:       u32,
}

// ─── Company specialties ─────────────────────────────────────────────────────

/// An activity on a company's profile (`GET /api/actividades/empresa/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySpecialty {
  #[serde(rename = "id_actividad", deserialize_with = "guard::numeric_id")]
  pub activity_id:    i64,
  #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
  pub name:           String,
  #[serde(default)]
  pub area:           Option<String>,
  #[serde(rename = "especializacion", default)]
  pub specialization: Option<String>,
}

/// Body of `POST /api/actividades/empresa`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySpecialtyLink {
  pub id_empresa:     i64,
  #[serde(rename = "id_actividad")]
  pub activity_id:    i64,
  #[serde(rename = "especializacion", skip_serializing_if = "Option::is_none")]
  pub specialization: Option<String>,
}
