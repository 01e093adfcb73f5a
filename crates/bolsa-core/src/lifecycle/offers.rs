use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  backend::JobBoardBackend,
  guard,
  offer::{Level, NewOffer, Offer, OfferDraft, OfferPatch, OfferQuery, RequiredActivity},
  principal::Principal,
};

/// Offers as last seen by this client: `Draft` lives only in an
/// [`OfferDraft`]; `Active`/`Inactive` is the `active` flag; a deleted offer
/// leaves the cache.
pub struct OfferBook<B> {
  backend: Arc<B>,
  offers:  Vec<Offer>,
}

impl<B: JobBoardBackend> OfferBook<B> {
  pub fn new(backend: Arc<B>) -> Self { Self { backend, offers: Vec::new() } }

  pub fn offers(&self) -> &[Offer] { &self.offers }

  pub fn get(&self, id: i64) -> Option<&Offer> {
    self.offers.iter().find(|o| o.id == id)
  }

  // ── Loading ─────────────────────────────────────────────────────────────

  /// The public board. Inactive offers are hidden unless the query asks for
  /// them.
  pub async fn load_public(&mut self, query: &OfferQuery) -> Result<&[Offer]> {
    let offers = self.backend.list_offers(query).await?;
    debug!(count = offers.len(), "loaded offers");
    self.offers = offers;
    Ok(&self.offers)
  }

  /// Everything `principal` has posted, active or not.
  pub async fn load_owned(&mut self, principal: &Principal) -> Result<&[Offer]> {
    let offers = self.backend.offers_by_owner(principal.identity).await?;
    debug!(owner = %principal.identity, count = offers.len(), "loaded own offers");
    self.offers = offers;
    Ok(&self.offers)
  }

  /// Re-read one offer from the backend.
  pub async fn refresh(&mut self, id: i64) -> Result<&Offer> {
    let offer = self.backend.offer(id).await?;
    Ok(self.upsert(offer))
  }

  // ── Mutations ───────────────────────────────────────────────────────────

  /// Submit a draft. The offer starts active and owned by `principal`; its
  /// activities are attached one by one after the offer exists.
  pub async fn create(
    &mut self,
    principal: &Principal,
    draft: &OfferDraft,
  ) -> Result<Offer> {
    draft.validate()?;

    let mut offer = self
      .backend
      .create_offer(&NewOffer::from_draft(draft, principal.identity))
      .await?;
    info!(id = offer.id, owner = %principal.identity, "offer created");

    offer.required_activities.clear();
    let mut failure = None;
    for activity in &draft.activities {
      match self.backend.add_offer_activity(offer.id, activity).await {
        Ok(()) => offer.required_activities.push(activity.clone()),
        Err(e) => {
          warn!(offer = offer.id, activity = activity.activity_id, error = %e, "could not attach activity");
          failure = Some(e);
          break;
        }
      }
    }

    let offer = self.upsert(offer).clone();
    match failure {
      Some(e) => Err(e),
      None => Ok(offer),
    }
  }

  /// Apply a partial edit. The full title/description/active triple is always
  /// sent, taken from the cached offer where the patch is silent.
  pub async fn update(
    &mut self,
    principal: &Principal,
    id: i64,
    patch: &OfferPatch,
  ) -> Result<Offer> {
    let current = self.resolve(id).await?;
    guard::ensure_offer_owner(principal, &current)?;
    let update = patch.apply_to(&current)?;

    let mut updated = self.backend.update_offer(id, &update).await?;
    // The activity list is only changed through its own endpoints.
    updated.required_activities = current.required_activities;
    info!(id, active = updated.active, "offer updated");
    Ok(self.upsert(updated).clone())
  }

  pub async fn set_active(
    &mut self,
    principal: &Principal,
    id: i64,
    active: bool,
  ) -> Result<Offer> {
    let patch = OfferPatch { active: Some(active), ..OfferPatch::default() };
    self.update(principal, id, &patch).await
  }

  pub async fn add_activity(
    &mut self,
    principal: &Principal,
    id: i64,
    activity_id: i64,
    level: Level,
  ) -> Result<()> {
    let offer = self.resolve(id).await?;
    guard::ensure_offer_owner(principal, &offer)?;
    if offer.requires(activity_id) {
      return Err(Error::DuplicateActivity {
        target: format!("offer {id}"),
        activity_id,
      });
    }

    let required = RequiredActivity::new(activity_id, level);
    self.backend.add_offer_activity(id, &required).await?;
    if let Some(cached) = self.offers.iter_mut().find(|o| o.id == id) {
      cached.required_activities.push(required);
    }
    Ok(())
  }

  pub async fn remove_activity(
    &mut self,
    principal: &Principal,
    id: i64,
    activity_id: i64,
  ) -> Result<()> {
    let offer = self.resolve(id).await?;
    guard::ensure_offer_owner(principal, &offer)?;
    if !offer.requires(activity_id) {
      return Err(Error::NotFound(format!(
        "activity {activity_id} on offer {id}"
      )));
    }

    self.backend.remove_offer_activity(id, activity_id).await?;
    if let Some(cached) = self.offers.iter_mut().find(|o| o.id == id) {
      cached.required_activities.retain(|r| r.activity_id != activity_id);
    }
    Ok(())
  }

  pub async fn delete(&mut self, principal: &Principal, id: i64) -> Result<()> {
    let offer = self.resolve(id).await?;
    guard::ensure_offer_owner(principal, &offer)?;
    self.backend.delete_offer(id).await?;
    self.offers.retain(|o| o.id != id);
    info!(id, "offer deleted");
    Ok(())
  }

  // ── Helpers ─────────────────────────────────────────────────────────────

  /// The cached offer, fetching it if this book has not seen it yet.
  async fn resolve(&mut self, id: i64) -> Result<Offer> {
    if let Some(offer) = self.get(id) {
      return Ok(offer.clone());
    }
    Ok(self.refresh(id).await?.clone())
  }

  fn upsert(&mut self, offer: Offer) -> &Offer {
    let index = match self.offers.iter().position(|o| o.id == offer.id) {
      Some(i) => {
        self.offers[i] = offer;
        i
      }
      None => {
        self.offers.push(offer);
        self.offers.len() - 1
      }
    };
    &self.offers[index]
  }
}
