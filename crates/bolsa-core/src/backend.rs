//! The `JobBoardBackend` trait: the boundary to the REST backend.
//!
//! The trait is implemented by transports (e.g. `bolsa-client`'s
//! `HttpBackend`). The session store and the lifecycle books depend on this
//! abstraction, not on any concrete transport. Implementations map failures
//! onto the crate's [`Error`](crate::Error) taxonomy: rejected credentials or
//! tokens as `Auth`, missing entities as `NotFound`, backend validation
//! failures as `Validation`, everything else as `Network`.

use crate::{
  Result,
  activity::{
    Activity, CompanySpecialty, CompanySpecialtyLink, NewActivity, PersonSkill,
    PersonSkillLink,
  },
  application::{Application, ApplicationStatus, CompanyApplication, NewApplication},
  matching::{MatchingReport, SkillReport},
  offer::{NewOffer, Offer, OfferQuery, OfferUpdate, RequiredActivity},
  principal::{Identity, LoginRequest, LoginResponse, UserInfo},
  profile::{
    CompanyProfile, CompanyRegistration, PersonProfile, PersonRegistration,
    RegistrationReceipt,
  },
};

pub trait JobBoardBackend: Send + Sync {
  /// Attach (or, with `None`, drop) the bearer token sent with every
  /// subsequent request.
  fn set_bearer(&self, token: Option<String>);

  // ── Authentication ────────────────────────────────────────────────────

  /// `POST /auth/login`
  async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

  /// `GET /auth/me` using the bearer token given.
  async fn current_user(&self, token: &str) -> Result<UserInfo>;

  /// `POST /auth/registro/persona`
  async fn register_person(
    &self,
    registration: &PersonRegistration,
  ) -> Result<RegistrationReceipt>;

  /// `POST /auth/registro/empresa`
  async fn register_company(
    &self,
    registration: &CompanyRegistration,
  ) -> Result<RegistrationReceipt>;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// `GET /api/personas/{dni}`
  async fn person(&self, dni: i64) -> Result<PersonProfile>;

  /// `GET /api/empresas/{id}`
  async fn company(&self, id_empresa: i64) -> Result<CompanyProfile>;

  /// `GET /api/personas/buscar?q=`
  async fn search_talent(&self, query: &str) -> Result<Vec<PersonProfile>>;

  // ── Offers ────────────────────────────────────────────────────────────

  /// `GET /api/ofertas/`, or `GET /api/ofertas/buscar` when `query.text`
  /// is set.
  async fn list_offers(&self, query: &OfferQuery) -> Result<Vec<Offer>>;

  /// `GET /api/ofertas/{id}`
  async fn offer(&self, id: i64) -> Result<Offer>;

  /// `GET /api/ofertas/empresa/{id}` or `GET /api/ofertas/persona/{dni}`.
  async fn offers_by_owner(&self, owner: Identity) -> Result<Vec<Offer>>;

  /// `POST /api/ofertas/`
  async fn create_offer(&self, offer: &NewOffer) -> Result<Offer>;

  /// `PUT /api/ofertas/{id}`
  async fn update_offer(&self, id: i64, update: &OfferUpdate) -> Result<Offer>;

  /// `DELETE /api/ofertas/{id}`
  async fn delete_offer(&self, id: i64) -> Result<()>;

  /// `POST /api/ofertas/{id}/actividades/`
  async fn add_offer_activity(
    &self,
    offer_id: i64,
    activity: &RequiredActivity,
  ) -> Result<()>;

  /// `DELETE /api/ofertas/{id}/actividades/` with body `{id_actividad}`
  async fn remove_offer_activity(&self, offer_id: i64, activity_id: i64) -> Result<()>;

  // ── Activities ────────────────────────────────────────────────────────

  /// `GET /api/actividades/`
  async fn activities(&self) -> Result<Vec<Activity>>;

  /// `POST /api/actividades/`
  async fn create_activity(&self, activity: &NewActivity) -> Result<Activity>;

  /// `GET /api/actividades/persona/{dni}`
  async fn person_skills(&self, dni: i64) -> Result<Vec<PersonSkill>>;

  /// `POST /api/actividades/persona`
  async fn add_person_skill(&self, link: &PersonSkillLink) -> Result<()>;

  /// `DELETE /api/actividades/persona/{dni}/{id_actividad}`
  async fn remove_person_skill(&self, dni: i64, activity_id: i64) -> Result<()>;

  /// `GET /api/actividades/empresa/{id}`
  async fn company_specialties(&self, id_empresa: i64) -> Result<Vec<CompanySpecialty>>;

  /// `POST /api/actividades/empresa`
  async fn add_company_specialty(&self, link: &CompanySpecialtyLink) -> Result<()>;

  /// `DELETE /api/actividades/empresa/{id}/{id_actividad}`
  async fn remove_company_specialty(
    &self,
    id_empresa: i64,
    activity_id: i64,
  ) -> Result<()>;

  // ── Applications ──────────────────────────────────────────────────────

  /// `GET /api/postulaciones/`
  async fn applications(&self) -> Result<Vec<Application>>;

  /// `GET /api/postulaciones/empresa/{id}`
  async fn company_applications(&self, id_empresa: i64) -> Result<Vec<CompanyApplication>>;

  /// `POST /api/postulaciones/`
  async fn create_application(&self, application: &NewApplication) -> Result<Application>;

  /// `DELETE /api/postulaciones/{dni}/{id_oferta}`
  async fn delete_application(&self, dni: i64, offer_id: i64) -> Result<()>;

  /// `PUT /api/postulaciones/{id}/estado`
  async fn set_application_status(
    &self,
    application_id: i64,
    status: ApplicationStatus,
  ) -> Result<()>;

  // ── Matching ──────────────────────────────────────────────────────────

  /// `GET /api/matching/buscar_semantica?consulta=`
  async fn semantic_search(&self, query: &str) -> Result<Vec<Offer>>;

  /// `GET /api/matching/matching/{dni}`
  async fn matching(&self, dni: i64) -> Result<MatchingReport>;

  /// `GET /api/actividades/recomendaciones/habilidades/{dni}`
  async fn skill_recommendations(&self, dni: i64) -> Result<SkillReport>;
}
