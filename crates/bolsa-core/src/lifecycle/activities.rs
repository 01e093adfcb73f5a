use std::sync::Arc;

use tracing::info;

use crate::{
  Error, Result,
  activity::{
    Activity, CompanySpecialty, CompanySpecialtyLink, NewActivity, PersonSkill,
    PersonSkillLink,
  },
  backend::JobBoardBackend,
  guard,
  offer::Level,
  principal::{Identity, Principal},
};

/// The activity catalog and the activity links of one profile.
pub struct ActivityBook<B> {
  backend:     Arc<B>,
  catalog:     Vec<Activity>,
  skills:      Vec<PersonSkill>,
  specialties: Vec<CompanySpecialty>,
}

impl<B: JobBoardBackend> ActivityBook<B> {
  pub fn new(backend: Arc<B>) -> Self {
    Self {
      backend,
      catalog: Vec::new(),
      skills: Vec::new(),
      specialties: Vec::new(),
    }
  }

  pub fn catalog(&self) -> &[Activity] { &self.catalog }

  pub fn skills(&self) -> &[PersonSkill] { &self.skills }

  pub fn specialties(&self) -> &[CompanySpecialty] { &self.specialties }

  /// Catalog name of `id`, if loaded.
  pub fn name_of(&self, id: i64) -> Option<&str> {
    self
      .catalog
      .iter()
      .find(|a| a.id == id)
      .map(|a| a.name.as_str())
  }

  // ── Catalog ─────────────────────────────────────────────────────────────

  pub async fn load_catalog(&mut self) -> Result<&[Activity]> {
    self.catalog = self.backend.activities().await?;
    Ok(&self.catalog)
  }

  /// Add a catalog entry. Open to any logged-in principal.
  pub async fn create_activity(
    &mut self,
    principal: &Principal,
    activity: NewActivity,
  ) -> Result<Activity> {
    let activity = activity.normalized()?;
    let created = self.backend.create_activity(&activity).await?;
    info!(id = created.id, by = %principal.identity, "catalog activity created");
    self.catalog.push(created.clone());
    Ok(created)
  }

  // ── Person skills ───────────────────────────────────────────────────────

  pub async fn load_skills(&mut self, dni: i64) -> Result<&[PersonSkill]> {
    self.skills = self.backend.person_skills(dni).await?;
    Ok(&self.skills)
  }

  pub async fn add_skill(
    &mut self,
    principal: &Principal,
    activity_id: i64,
    level: Option<Level>,
    years: u32,
  ) -> Result<()> {
    let dni = guard::ensure_person(principal)?;
    if self.skills.iter().any(|s| s.activity_id == activity_id) {
      return Err(Error::DuplicateActivity {
        target: format!("the profile of dni {dni}"),
        activity_id,
      });
    }

    let link = PersonSkillLink { dni, activity_id, level, years };
    self.backend.add_person_skill(&link).await?;
    info!(dni, activity_id, "skill added");
    self.load_skills(dni).await?;
    Ok(())
  }

  pub async fn remove_skill(
    &mut self,
    principal: &Principal,
    dni: i64,
    activity_id: i64,
  ) -> Result<()> {
    guard::ensure_self(principal, Identity::Person { dni })?;
    self.backend.remove_person_skill(dni, activity_id).await?;
    self.skills.retain(|s| s.activity_id != activity_id);
    Ok(())
  }

  // ── Company specialties ─────────────────────────────────────────────────

  pub async fn load_specialties(&mut self, id_empresa: i64) -> Result<&[CompanySpecialty]> {
    self.specialties = self.backend.company_specialties(id_empresa).await?;
    Ok(&self.specialties)
  }

  pub async fn add_specialty(
    &mut self,
    principal: &Principal,
    activity_id: i64,
    specialization: Option<String>,
  ) -> Result<()> {
    let Identity::Company { id_empresa } = principal.identity else {
      return Err(Error::Authorization(format!(
        "{} has no company specialties",
        principal.identity
      )));
    };
    if self.specialties.iter().any(|s| s.activity_id == activity_id) {
      return Err(Error::DuplicateActivity {
        target: format!("company {id_empresa}"),
        activity_id,
      });
    }

    let specialization = specialization
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty());
    let link = CompanySpecialtyLink { id_empresa, activity_id, specialization };
    self.backend.add_company_specialty(&link).await?;
    info!(id_empresa, activity_id, "specialty added");
    self.load_specialties(id_empresa).await?;
    Ok(())
  }

  pub async fn remove_specialty(
    &mut self,
    principal: &Principal,
    id_empresa: i64,
    activity_id: i64,
  ) -> Result<()> {
    guard::ensure_self(principal, Identity::Company { id_empresa })?;
    self
      .backend
      .remove_company_specialty(id_empresa, activity_id)
      .await?;
    self.specialties.retain(|s| s.activity_id != activity_id);
    Ok(())
  }
}
