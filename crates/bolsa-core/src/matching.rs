//! Recommendation payloads. The scores are computed by the external matching
//! service; this crate only reads them.

use serde::{Deserialize, Serialize};

use crate::{guard, offer::Offer, wire};

/// `GET /api/matching/matching/{dni}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingReport {
  #[serde(rename = "recomendaciones", default)]
  pub matches: Vec<OfferMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferMatch {
  #[serde(rename = "oferta", deserialize_with = "guard::numeric_id")]
  pub offer_id: i64,
  #[serde(rename = "titulo", default, deserialize_with = "wire::text")]
  pub title:    String,
  /// Percentage, 0–100.
  #[serde(rename = "puntaje", default)]
  pub score:    f64,
}

/// `GET /api/actividades/recomendaciones/habilidades/{dni}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillReport {
  #[serde(rename = "recomendaciones", default)]
  pub skills: Vec<SkillRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecommendation {
  #[serde(rename = "habilidad")]
  pub skill:      String,
  /// Fraction, 0–1.
  #[serde(rename = "confianza", default)]
  pub confidence: f64,
  #[serde(rename = "razon", default, deserialize_with = "wire::text")]
  pub reason:     String,
  /// Live offers that ask for this skill.
  #[serde(rename = "ofertas", default)]
  pub offers:     Vec<Offer>,
}

impl SkillRecommendation {
  pub fn confidence_percent(&self) -> u8 {
    (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
  }
}

impl MatchingReport {
  /// Best match first.
  pub fn ranked(mut self) -> Vec<OfferMatch> {
    self.matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    self.matches
  }
}
