//! An in-memory `JobBoardBackend` for tests. Every call is recorded so tests
//! can check that a request was, or was not, issued.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;

use crate::{
  Error, Result,
  activity::{
    Activity, CompanySpecialty, CompanySpecialtyLink, NewActivity, PersonSkill,
    PersonSkillLink,
  },
  application::{
    Applicant, Application, ApplicationStatus, AppliedOffer, CompanyApplication,
    NewApplication,
  },
  backend::JobBoardBackend,
  matching::{MatchingReport, OfferMatch, SkillReport},
  offer::{NewOffer, Offer, OfferQuery, OfferUpdate, RequiredActivity},
  principal::{Identity, LoginRequest, LoginResponse, UserInfo},
  profile::{
    CompanyProfile, CompanyRegistration, PersonProfile, PersonRegistration,
    RegistrationReceipt,
  },
};

struct Account {
  email:    String,
  password: String,
  identity: Identity,
}

#[derive(Default)]
struct World {
  accounts:     Vec<Account>,
  sessions:     HashMap<String, Identity>,
  bearer:       Option<String>,
  offers:       Vec<Offer>,
  activities:   Vec<Activity>,
  skills:       Vec<PersonSkillLink>,
  specialties:  Vec<CompanySpecialtyLink>,
  applications: Vec<Application>,
  next_id:      i64,
}

impl World {
  fn next_id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id
  }

  fn offer_mut(&mut self, id: i64) -> Result<&mut Offer> {
    self
      .offers
      .iter_mut()
      .find(|o| o.id == id)
      .ok_or_else(|| Error::NotFound(format!("Oferta {id} no encontrada")))
  }

  fn activity_name(&self, id: i64) -> String {
    self
      .activities
      .iter()
      .find(|a| a.id == id)
      .map(|a| a.name.clone())
      .unwrap_or_default()
  }
}

#[derive(Default)]
pub struct FakeBackend {
  world: Mutex<World>,
  calls: Mutex<Vec<String>>,
}

impl FakeBackend {
  pub fn new() -> Self { Self::default() }

  pub fn with_person(self, dni: i64, email: &str, password: &str) -> Self {
    self.account(Identity::Person { dni }, email, password)
  }

  pub fn with_company(self, id_empresa: i64, email: &str, password: &str) -> Self {
    self.account(Identity::Company { id_empresa }, email, password)
  }

  pub fn with_activity(self, id: i64, name: &str) -> Self {
    self.world().activities.push(Activity {
      id,
      name: name.into(),
      area: None,
      specialty: None,
      description: None,
    });
    self
  }

  /// Seed an active offer owned by `owner`.
  pub fn with_offer(self, id: i64, title: &str, owner: Identity) -> Self {
    let (company_id, person_dni) = match owner {
      Identity::Company { id_empresa } => (Some(id_empresa), None),
      Identity::Person { dni } => (None, Some(dni)),
    };
    {
      let mut world = self.world();
      world.next_id = world.next_id.max(id);
      world.offers.push(Offer {
        id,
        title: title.into(),
        description: format!("{title} description"),
        active: true,
        published_at: Some(Utc::now()),
        company_id,
        person_dni,
        required_activities: Vec::new(),
      });
    }
    self
  }

  fn account(self, identity: Identity, email: &str, password: &str) -> Self {
    self.world().accounts.push(Account {
      email: email.into(),
      password: password.into(),
      identity,
    });
    self
  }

  fn world(&self) -> MutexGuard<'_, World> {
    self.world.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn record(&self, call: impl Into<String>) {
    self
      .calls
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .push(call.into());
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  pub fn count(&self, prefix: &str) -> usize {
    self.calls().iter().filter(|c| c.starts_with(prefix)).count()
  }

  pub fn bearer(&self) -> Option<String> { self.world().bearer.clone() }

  pub fn stored_offer(&self, id: i64) -> Option<Offer> {
    self.world().offers.iter().find(|o| o.id == id).cloned()
  }

  pub fn stored_applications(&self) -> Vec<Application> {
    self.world().applications.clone()
  }

  /// Forget every issued token, as a backend restart with a new key would.
  pub fn revoke_sessions(&self) { self.world().sessions.clear(); }
}

fn user_info(email: &str, identity: Identity) -> UserInfo {
  let (dni, id_empresa) = match identity {
    Identity::Person { dni } => (Some(dni), None),
    Identity::Company { id_empresa } => (None, Some(id_empresa)),
  };
  UserInfo {
    email: email.into(),
    rol: identity.kind().role().into(),
    id_usuario: Some(1),
    dni,
    id_empresa,
    activo: true,
  }
}

impl JobBoardBackend for FakeBackend {
  fn set_bearer(&self, token: Option<String>) { self.world().bearer = token; }

  async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
    self.record("POST /auth/login");
    let mut world = self.world();
    let identity = world
      .accounts
      .iter()
      .find(|a| a.email == request.email && a.password == request.password)
      .map(|a| a.identity)
      .ok_or_else(|| Error::Auth("Credenciales inválidas".into()))?;

    let token = format!("tok-{}-{}", request.email, world.sessions.len());
    world.sessions.insert(token.clone(), identity);
    let info = user_info(&request.email, identity);
    Ok(LoginResponse {
      access_token: token,
      token_type:   "bearer".into(),
      rol:          info.rol,
      dni:          info.dni,
      id_empresa:   info.id_empresa,
      usuario:      None,
    })
  }

  async fn current_user(&self, token: &str) -> Result<UserInfo> {
    self.record("GET /auth/me");
    let world = self.world();
    let identity = world
      .sessions
      .get(token)
      .copied()
      .ok_or_else(|| Error::Auth("Token inválido".into()))?;
    let email = world
      .accounts
      .iter()
      .find(|a| a.identity == identity)
      .map(|a| a.email.clone())
      .unwrap_or_default();
    Ok(user_info(&email, identity))
  }

  async fn register_person(
    &self,
    registration: &PersonRegistration,
  ) -> Result<RegistrationReceipt> {
    self.record("POST /auth/registro/persona");
    let mut world = self.world();
    if world.accounts.iter().any(|a| a.email == registration.email) {
      return Err(Error::Validation("email: ya registrado".into()));
    }
    world.accounts.push(Account {
      email:    registration.email.clone(),
      password: registration.password.clone(),
      identity: Identity::Person { dni: registration.dni },
    });
    Ok(RegistrationReceipt {
      message:    "Persona registrada".into(),
      dni:        Some(registration.dni),
      id_empresa: None,
    })
  }

  async fn register_company(
    &self,
    registration: &CompanyRegistration,
  ) -> Result<RegistrationReceipt> {
    self.record("POST /auth/registro/empresa");
    let mut world = self.world();
    let id_empresa = world.next_id();
    world.accounts.push(Account {
      email:    registration.email.clone(),
      password: registration.password.clone(),
      identity: Identity::Company { id_empresa },
    });
    Ok(RegistrationReceipt {
      message:    "Empresa registrada".into(),
      dni:        None,
      id_empresa: Some(id_empresa),
    })
  }

  async fn person(&self, dni: i64) -> Result<PersonProfile> {
    self.record(format!("GET /api/personas/{dni}"));
    Ok(PersonProfile {
      dni,
      nombre: "Juan".into(),
      apellido: "Pérez".into(),
      email: "juan@example.com".into(),
      ciudad: None,
      provincia: None,
      telefono: None,
    })
  }

  async fn company(&self, id_empresa: i64) -> Result<CompanyProfile> {
    self.record(format!("GET /api/empresas/{id_empresa}"));
    Ok(CompanyProfile {
      id_empresa,
      nombre: "Panadería Sur".into(),
      email: "rrhh@sur.com".into(),
      ciudad: None,
      provincia: None,
      telefono: None,
    })
  }

  async fn search_talent(&self, _query: &str) -> Result<Vec<PersonProfile>> {
    self.record("GET /api/personas/buscar");
    Ok(Vec::new())
  }

  async fn list_offers(&self, query: &OfferQuery) -> Result<Vec<Offer>> {
    self.record("GET /api/ofertas/");
    let active = query.active.unwrap_or(true);
    let text = query.text.as_deref().map(str::to_lowercase);
    Ok(
      self
        .world()
        .offers
        .iter()
        .filter(|o| o.active == active)
        .filter(|o| {
          text
            .as_deref()
            .is_none_or(|t| o.title.to_lowercase().contains(t))
        })
        .cloned()
        .collect(),
    )
  }

  async fn offer(&self, id: i64) -> Result<Offer> {
    self.record(format!("GET /api/ofertas/{id}"));
    Ok(self.world().offer_mut(id)?.clone())
  }

  async fn offers_by_owner(&self, owner: Identity) -> Result<Vec<Offer>> {
    self.record("GET /api/ofertas/owner");
    Ok(
      self
        .world()
        .offers
        .iter()
        .filter(|o| o.owner() == Some(owner))
        .cloned()
        .collect(),
    )
  }

  async fn create_offer(&self, offer: &NewOffer) -> Result<Offer> {
    self.record("POST /api/ofertas/");
    let mut world = self.world();
    let id = world.next_id();
    let created = Offer {
      id,
      title: offer.title.clone(),
      description: offer.description.clone(),
      active: offer.active,
      published_at: Some(Utc::now()),
      company_id: offer.company_id,
      person_dni: offer.person_dni,
      required_activities: Vec::new(),
    };
    world.offers.push(created.clone());
    Ok(created)
  }

  async fn update_offer(&self, id: i64, update: &OfferUpdate) -> Result<Offer> {
    self.record(format!("PUT /api/ofertas/{id}"));
    let mut world = self.world();
    let offer = world.offer_mut(id)?;
    offer.title = update.title.clone();
    offer.description = update.description.clone();
    offer.active = update.active;
    // Like the real backend, the PUT answer omits the activity list.
    let mut answer = offer.clone();
    answer.required_activities.clear();
    Ok(answer)
  }

  async fn delete_offer(&self, id: i64) -> Result<()> {
    self.record(format!("DELETE /api/ofertas/{id}"));
    let mut world = self.world();
    world.offer_mut(id)?;
    world.offers.retain(|o| o.id != id);
    Ok(())
  }

  async fn add_offer_activity(
    &self,
    offer_id: i64,
    activity: &RequiredActivity,
  ) -> Result<()> {
    self.record(format!("POST /api/ofertas/{offer_id}/actividades/"));
    let mut world = self.world();
    let name = world.activity_name(activity.activity_id);
    let offer = world.offer_mut(offer_id)?;
    offer.required_activities.push(RequiredActivity {
      name: Some(name).filter(|n| !n.is_empty()),
      ..activity.clone()
    });
    Ok(())
  }

  async fn remove_offer_activity(&self, offer_id: i64, activity_id: i64) -> Result<()> {
    self.record(format!("DELETE /api/ofertas/{offer_id}/actividades/"));
    let mut world = self.world();
    let offer = world.offer_mut(offer_id)?;
    offer.required_activities.retain(|r| r.activity_id != activity_id);
    Ok(())
  }

  async fn activities(&self) -> Result<Vec<Activity>> {
    self.record("GET /api/actividades/");
    Ok(self.world().activities.clone())
  }

  async fn create_activity(&self, activity: &NewActivity) -> Result<Activity> {
    self.record("POST /api/actividades/");
    let mut world = self.world();
    let created = Activity {
      id:          world.next_id(),
      name:        activity.name.clone(),
      area:        activity.area.clone(),
      specialty:   activity.specialty.clone(),
      description: activity.description.clone(),
    };
    world.activities.push(created.clone());
    Ok(created)
  }

  async fn person_skills(&self, dni: i64) -> Result<Vec<PersonSkill>> {
    self.record(format!("GET /api/actividades/persona/{dni}"));
    let world = self.world();
    Ok(
      world
        .skills
        .iter()
        .filter(|l| l.dni == dni)
        .map(|l| PersonSkill {
          activity_id: l.activity_id,
          name:        world.activity_name(l.activity_id),
          area:        None,
          specialty:   None,
          level:       l.level,
          years:       Some(l.years),
        })
        .collect(),
    )
  }

  async fn add_person_skill(&self, link: &PersonSkillLink) -> Result<()> {
    self.record("POST /api/actividades/persona");
    self.world().skills.push(link.clone());
    Ok(())
  }

  async fn remove_person_skill(&self, dni: i64, activity_id: i64) -> Result<()> {
    self.record(format!("DELETE /api/actividades/persona/{dni}/{activity_id}"));
    self
      .world()
      .skills
      .retain(|l| !(l.dni == dni && l.activity_id == activity_id));
    Ok(())
  }

  async fn company_specialties(&self, id_empresa: i64) -> Result<Vec<CompanySpecialty>> {
    self.record(format!("GET /api/actividades/empresa/{id_empresa}"));
    let world = self.world();
    Ok(
      world
        .specialties
        .iter()
        .filter(|l| l.id_empresa == id_empresa)
        .map(|l| CompanySpecialty {
          activity_id:    l.activity_id,
          name:           world.activity_name(l.activity_id),
          area:           None,
          specialization: l.specialization.clone(),
        })
        .collect(),
    )
  }

  async fn add_company_specialty(&self, link: &CompanySpecialtyLink) -> Result<()> {
    self.record("POST /api/actividades/empresa");
    self.world().specialties.push(link.clone());
    Ok(())
  }

  async fn remove_company_specialty(
    &self,
    id_empresa: i64,
    activity_id: i64,
  ) -> Result<()> {
    self.record(format!("DELETE /api/actividades/empresa/{id_empresa}/{activity_id}"));
    self
      .world()
      .specialties
      .retain(|l| !(l.id_empresa == id_empresa && l.activity_id == activity_id));
    Ok(())
  }

  async fn applications(&self) -> Result<Vec<Application>> {
    self.record("GET /api/postulaciones/");
    Ok(self.world().applications.clone())
  }

  async fn company_applications(&self, id_empresa: i64) -> Result<Vec<CompanyApplication>> {
    self.record(format!("GET /api/postulaciones/empresa/{id_empresa}"));
    let world = self.world();
    let owner = Some(Identity::Company { id_empresa });
    Ok(
      world
        .applications
        .iter()
        .filter_map(|a| {
          let offer = world
            .offers
            .iter()
            .find(|o| o.id == a.offer_id && o.owner() == owner)?;
          Some(CompanyApplication {
            id:         a.id,
            status:     a.status,
            created_at: a.created_at,
            applicant:  Applicant {
              dni:     a.dni,
              name:    "Juan".into(),
              surname: "Pérez".into(),
              email:   "juan@example.com".into(),
              phone:   None,
            },
            offer:      AppliedOffer { id: offer.id, title: offer.title.clone() },
          })
        })
        .collect(),
    )
  }

  async fn create_application(&self, application: &NewApplication) -> Result<Application> {
    self.record("POST /api/postulaciones/");
    let mut world = self.world();
    if world.offer_mut(application.offer_id).is_err() {
      return Err(Error::NotFound("Oferta no encontrada".into()));
    }
    let created = Application {
      id:         world.next_id(),
      dni:        application.dni,
      offer_id:   application.offer_id,
      status:     application.status,
      created_at: Some(Utc::now()),
    };
    world.applications.push(created.clone());
    Ok(created)
  }

  async fn delete_application(&self, dni: i64, offer_id: i64) -> Result<()> {
    self.record(format!("DELETE /api/postulaciones/{dni}/{offer_id}"));
    let mut world = self.world();
    let before = world.applications.len();
    world.applications.retain(|a| a.key() != (dni, offer_id));
    if world.applications.len() == before {
      return Err(Error::NotFound("Postulación no encontrada".into()));
    }
    Ok(())
  }

  async fn set_application_status(
    &self,
    application_id: i64,
    status: ApplicationStatus,
  ) -> Result<()> {
    self.record(format!("PUT /api/postulaciones/{application_id}/estado"));
    let mut world = self.world();
    let application = world
      .applications
      .iter_mut()
      .find(|a| a.id == application_id)
      .ok_or_else(|| Error::NotFound("Postulación no encontrada".into()))?;
    application.status = status;
    Ok(())
  }

  async fn semantic_search(&self, query: &str) -> Result<Vec<Offer>> {
    self.record("GET /api/matching/buscar_semantica");
    self.list_offers(&OfferQuery::text(query)).await
  }

  async fn matching(&self, dni: i64) -> Result<MatchingReport> {
    self.record(format!("GET /api/matching/matching/{dni}"));
    let matches = self
      .world()
      .offers
      .iter()
      .map(|o| OfferMatch { offer_id: o.id, title: o.title.clone(), score: 50.0 })
      .collect();
    Ok(MatchingReport { matches })
  }

  async fn skill_recommendations(&self, dni: i64) -> Result<SkillReport> {
    self.record(format!("GET /api/actividades/recomendaciones/habilidades/{dni}"));
    Ok(SkillReport::default())
  }
}
