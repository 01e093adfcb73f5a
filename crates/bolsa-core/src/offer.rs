//! Offer types: job postings and the activities they require.
//!
//! Field names follow the backend's JSON (`titulo`, `descripcion`, ...); the
//! Rust names are the English ones used throughout the crate.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, guard, principal::Identity, wire};

// ─── Level ───────────────────────────────────────────────────────────────────

/// Required (or self-reported) proficiency in an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
  #[serde(rename = "PRINCIPIANTE", alias = "principiante")]
  Beginner,
  #[serde(rename = "INTERMEDIO", alias = "intermedio")]
  Intermediate,
  #[serde(rename = "AVANZADO", alias = "avanzado")]
  Advanced,
  #[serde(rename = "EXPERTO", alias = "experto")]
  Expert,
}

impl Level {
  pub const ALL: [Level; 4] =
    [Self::Beginner, Self::Intermediate, Self::Advanced, Self::Expert];

  /// The backend's spelling.
  pub fn wire_name(self) -> &'static str {
    match self {
      Self::Beginner => "PRINCIPIANTE",
      Self::Intermediate => "INTERMEDIO",
      Self::Advanced => "AVANZADO",
      Self::Expert => "EXPERTO",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Beginner => "beginner",
      Self::Intermediate => "intermediate",
      Self::Advanced => "advanced",
      Self::Expert => "expert",
    })
  }
}

impl FromStr for Level {
  type Err = Error;

  /// Accepts the English names, the backend's Spanish names, or `1`–`4`.
  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "1" | "beginner" | "principiante" => Ok(Self::Beginner),
      "2" | "intermediate" | "intermedio" => Ok(Self::Intermediate),
      "3" | "advanced" | "avanzado" => Ok(Self::Advanced),
      "4" | "expert" | "experto" => Ok(Self::Expert),
      other => Err(Error::Validation(format!(
        "unknown level {other:?}; use beginner, intermediate, advanced or expert"
      ))),
    }
  }
}

// ─── Required activities ─────────────────────────────────────────────────────

/// One entry of an offer's ordered requirement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredActivity {
  #[serde(rename = "id_actividad", deserialize_with = "guard::numeric_id")]
  pub activity_id: i64,
  #[serde(rename = "nivel_requerido")]
  pub level:       Level,
  /// Catalog name, when the backend joins it in.
  #[serde(
    rename = "nombre_actividad",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub name:        Option<String>,
}

impl RequiredActivity {
  pub fn new(activity_id: i64, level: Level) -> Self {
    Self { activity_id, level, name: None }
  }
}

// ─── Offer ───────────────────────────────────────────────────────────────────

/// A job posting as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
  #[serde(rename = "id_oferta", deserialize_with = "guard::numeric_id")]
  pub id:                  i64,
  #[serde(rename = "titulo")]
  pub title:               String,
  #[serde(rename = "descripcion", default, deserialize_with = "wire::text")]
  pub description:         String,
  #[serde(rename = "activa", default = "wire::yes")]
  pub active:              bool,
  #[serde(
    rename = "fecha_publicacion",
    default,
    deserialize_with = "wire::timestamp"
  )]
  pub published_at:        Option<DateTime<Utc>>,
  #[serde(
    rename = "id_empresa",
    default,
    deserialize_with = "guard::optional_numeric_id"
  )]
  pub company_id:          Option<i64>,
  #[serde(
    rename = "persona_dni",
    default,
    deserialize_with = "guard::optional_numeric_id"
  )]
  pub person_dni:          Option<i64>,
  #[serde(rename = "actividades", default)]
  pub required_activities: Vec<RequiredActivity>,
}

impl Offer {
  /// The principal allowed to mutate this offer. `None` when the backend
  /// sent neither or both owner columns.
  pub fn owner(&self) -> Option<Identity> {
    match (self.company_id, self.person_dni) {
      (Some(id_empresa), None) => Some(Identity::Company { id_empresa }),
      (None, Some(dni)) => Some(Identity::Person { dni }),
      _ => None,
    }
  }

  pub fn requires(&self, activity_id: i64) -> bool {
    self
      .required_activities
      .iter()
      .any(|r| r.activity_id == activity_id)
  }

  /// The full `{titulo, descripcion, activa}` triple for `PUT`.
  pub fn to_update(&self) -> OfferUpdate {
    OfferUpdate {
      title:       self.title.clone(),
      description: self.description.clone(),
      active:      self.active,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// What an owner fills in before submitting a new offer.
#[derive(Debug, Clone, Default)]
pub struct OfferDraft {
  pub title:       String,
  pub description: String,
  pub activities:  Vec<RequiredActivity>,
}

impl OfferDraft {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      title:       title.into(),
      description: description.into(),
      activities:  Vec::new(),
    }
  }

  pub fn with_activity(mut self, activity_id: i64, level: Level) -> Self {
    self.activities.push(RequiredActivity::new(activity_id, level));
    self
  }

  /// Check the draft before anything is sent: title and description must be
  /// non-blank and no activity may appear twice. Zero activities is fine.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::required("title"));
    }
    if self.description.trim().is_empty() {
      return Err(Error::required("description"));
    }
    for (i, a) in self.activities.iter().enumerate() {
      if self.activities[..i]
        .iter()
        .any(|b| b.activity_id == a.activity_id)
      {
        return Err(Error::DuplicateActivity {
          target:      "the draft".into(),
          activity_id: a.activity_id,
        });
      }
    }
    Ok(())
  }
}

/// Body of `POST /api/ofertas/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffer {
  #[serde(rename = "titulo")]
  pub title:       String,
  #[serde(rename = "descripcion")]
  pub description: String,
  #[serde(rename = "activa")]
  pub active:      bool,
  #[serde(rename = "id_empresa", skip_serializing_if = "Option::is_none", default)]
  pub company_id:  Option<i64>,
  #[serde(rename = "persona_dni", skip_serializing_if = "Option::is_none", default)]
  pub person_dni:  Option<i64>,
}

impl NewOffer {
  /// New offers start active and are owned by `owner`.
  pub fn from_draft(draft: &OfferDraft, owner: Identity) -> Self {
    let (company_id, person_dni) = match owner {
      Identity::Company { id_empresa } => (Some(id_empresa), None),
      Identity::Person { dni } => (None, Some(dni)),
    };
    Self {
      title: draft.title.trim().to_owned(),
      description: draft.description.trim().to_owned(),
      active: true,
      company_id,
      person_dni,
    }
  }
}

/// Body of `PUT /api/ofertas/{id}`. Always complete: the backend overwrites
/// every field it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferUpdate {
  #[serde(rename = "titulo")]
  pub title:       String,
  #[serde(rename = "descripcion")]
  pub description: String,
  #[serde(rename = "activa")]
  pub active:      bool,
}

/// A partial edit; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct OfferPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub active:      Option<bool>,
}

impl OfferPatch {
  /// Merge onto the current offer, producing the full triple to send.
  pub fn apply_to(&self, current: &Offer) -> Result<OfferUpdate> {
    let title = self.title.as_deref().unwrap_or(&current.title).trim();
    let description = self
      .description
      .as_deref()
      .unwrap_or(&current.description)
      .trim();
    if title.is_empty() {
      return Err(Error::required("title"));
    }
    if description.is_empty() {
      return Err(Error::required("description"));
    }
    Ok(OfferUpdate {
      title:       title.to_owned(),
      description: description.to_owned(),
      active:      self.active.unwrap_or(current.active),
    })
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for listing and searching offers.
#[derive(Debug, Clone, Default)]
pub struct OfferQuery {
  /// Free text; when set the search endpoint is used.
  pub text:   Option<String>,
  /// `Some(false)` lists inactive offers. Defaults to active only.
  pub active: Option<bool>,
  pub skip:   Option<usize>,
  pub limit:  Option<usize>,
}

impl OfferQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), ..Self::default() }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn decodes_backend_offer() {
    let offer: Offer = serde_json::from_value(json!({
      "id_oferta": 5,
      "titulo": "Mozo",
      "descripcion": null,
      "activa": false,
      "fecha_publicacion": "2025-11-10T09:30:00",
      "id_empresa": "3",
      "persona_dni": null,
      "actividades": [
        { "id_actividad": "7", "nivel_requerido": "AVANZADO", "id_oferta": 5 }
      ]
    }))
    .unwrap();

    assert_eq!(offer.id, 5);
    assert_eq!(offer.description, "");
    assert!(!offer.active);
    assert!(offer.published_at.is_some());
    assert_eq!(offer.owner(), Some(Identity::Company { id_empresa: 3 }));
    assert_eq!(offer.required_activities, vec![RequiredActivity::new(7, Level::Advanced)]);
    assert!(offer.requires(7));
  }

  #[test]
  fn active_defaults_to_true() {
    let offer: Offer =
      serde_json::from_value(json!({ "id_oferta": 1, "titulo": "x" })).unwrap();
    assert!(offer.active);
  }

  #[test]
  fn draft_requires_title_and_description() {
    assert!(OfferDraft::new(" ", "desc").validate().is_err());
    assert!(OfferDraft::new("Mozo", "").validate().is_err());
    assert!(OfferDraft::new("Mozo", "Turno noche").validate().is_ok());
  }

  #[test]
  fn draft_rejects_repeated_activities() {
    let draft = OfferDraft::new("Mozo", "Turno noche")
      .with_activity(7, Level::Beginner)
      .with_activity(7, Level::Expert);
    assert!(matches!(
      draft.validate(),
      Err(Error::DuplicateActivity { activity_id: 7, .. })
    ));
  }

  #[test]
  fn new_offer_carries_exactly_one_owner() {
    let draft = OfferDraft::new(" Mozo ", "Turno noche");
    let body = serde_json::to_value(NewOffer::from_draft(
      &draft,
      Identity::Company { id_empresa: 3 },
    ))
    .unwrap();
    assert_eq!(
      body,
      json!({ "titulo": "Mozo", "descripcion": "Turno noche", "activa": true, "id_empresa": 3 })
    );
  }

  #[test]
  fn patch_keeps_untouched_fields() {
    let offer: Offer = serde_json::from_value(json!({
      "id_oferta": 1, "titulo": "Mozo", "descripcion": "Turno noche", "activa": true
    }))
    .unwrap();
    let update = OfferPatch { active: Some(false), ..Default::default() }
      .apply_to(&offer)
      .unwrap();
    assert_eq!(update, OfferUpdate {
      title:       "Mozo".into(),
      description: "Turno noche".into(),
      active:      false,
    });
  }

  #[test]
  fn level_parsing() {
    assert_eq!("avanzado".parse::<Level>().unwrap(), Level::Advanced);
    assert_eq!("Expert".parse::<Level>().unwrap(), Level::Expert);
    assert_eq!("1".parse::<Level>().unwrap(), Level::Beginner);
    assert!("guru".parse::<Level>().is_err());
  }
}
