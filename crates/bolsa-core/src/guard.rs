//! Authorization Guard: the client-side ownership checks.
//!
//! Every mutation of an offer, an application or a profile link runs one of
//! the `ensure_*` checks before a request is issued. A denial is reported as
//! [`Error::Authorization`] and no request is made. The backend keeps the
//! authoritative check.
//!
//! This module is also the only place where identifiers coming from the
//! network are normalized. The backend may emit an id as `3` or as `"3"`; all
//! wire types decode their id fields through [`numeric_id`] or
//! [`optional_numeric_id`], so the rest of the crate compares plain `i64`s.

use std::fmt;

use serde::{Deserialize, Deserializer, de::Error as _};

use crate::{
  Error, Result,
  application::Application,
  offer::Offer,
  principal::{Identity, Principal},
};

// ─── Id normalization ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Int(i64),
  Float(f64),
  Text(String),
}

impl RawId {
  fn normalize(&self) -> Option<i64> {
    match self {
      Self::Int(n) => Some(*n),
      Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
      Self::Float(_) => None,
      Self::Text(s) => s.trim().parse().ok(),
    }
  }
}

impl fmt::Display for RawId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{n}"),
      Self::Float(x) => write!(f, "{x}"),
      Self::Text(s) => write!(f, "{s:?}"),
    }
  }
}

/// Normalize an id held in a loose JSON value (number or numeric string).
pub fn normalize_id(value: &serde_json::Value) -> Option<i64> {
  RawId::deserialize(value).ok()?.normalize()
}

/// `deserialize_with` helper for required id fields.
pub fn numeric_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = RawId::deserialize(deserializer)?;
  raw
    .normalize()
    .ok_or_else(|| D::Error::custom(format!("not a numeric id: {raw}")))
}

/// `deserialize_with` helper for nullable id fields. `null` and `""` decode as
/// `None`.
pub fn optional_numeric_id<'de, D>(
  deserializer: D,
) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<RawId>::deserialize(deserializer)? {
    None => Ok(None),
    Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
    Some(raw) => raw
      .normalize()
      .map(Some)
      .ok_or_else(|| D::Error::custom(format!("not a numeric id: {raw}"))),
  }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

/// True iff `principal` is the single owner of `offer`.
pub fn can_mutate_offer(principal: &Principal, offer: &Offer) -> bool {
  offer.owner() == Some(principal.identity)
}

/// True iff `principal` is the applicant.
pub fn is_candidate(principal: &Principal, application: &Application) -> bool {
  principal.identity == (Identity::Person { dni: application.dni })
}

/// True iff `principal` owns the offer `application` targets. `offer` must be
/// the targeted offer; a mismatched offer never grants access.
pub fn owns_target(
  principal: &Principal,
  application: &Application,
  offer: &Offer,
) -> bool {
  offer.id == application.offer_id && can_mutate_offer(principal, offer)
}

/// True iff `principal` may mutate `application` in some way: withdraw it as
/// the candidate, or move its status as the owner of the targeted offer.
pub fn can_mutate_application(
  principal: &Principal,
  application: &Application,
  offer: Option<&Offer>,
) -> bool {
  is_candidate(principal, application)
    || offer.is_some_and(|o| owns_target(principal, application, o))
}

// ─── Checks ──────────────────────────────────────────────────────────────────

pub fn ensure_offer_owner(principal: &Principal, offer: &Offer) -> Result<()> {
  if can_mutate_offer(principal, offer) {
    Ok(())
  } else {
    Err(Error::Authorization(format!(
      "{} does not own offer {}",
      principal.identity, offer.id
    )))
  }
}

pub fn ensure_candidate(
  principal: &Principal,
  application: &Application,
) -> Result<()> {
  if is_candidate(principal, application) {
    Ok(())
  } else {
    Err(Error::Authorization(format!(
      "only dni {} may withdraw this application",
      application.dni
    )))
  }
}

pub fn ensure_target_owner(
  principal: &Principal,
  application: &Application,
  offer: &Offer,
) -> Result<()> {
  if owns_target(principal, application, offer) {
    Ok(())
  } else {
    Err(Error::Authorization(format!(
      "{} does not own offer {}",
      principal.identity, application.offer_id
    )))
  }
}

/// Profile links (skills, specialties) may only be edited by their owner.
pub fn ensure_self(principal: &Principal, identity: Identity) -> Result<()> {
  if principal.identity == identity {
    Ok(())
  } else {
    Err(Error::Authorization(format!(
      "{} cannot edit the profile of {identity}",
      principal.identity
    )))
  }
}

/// Applying is reserved to persons; returns the applicant's `dni`.
pub fn ensure_person(principal: &Principal) -> Result<i64> {
  principal.dni().ok_or_else(|| {
    Error::Authorization(format!("{} cannot apply to offers", principal.identity))
  })
}
