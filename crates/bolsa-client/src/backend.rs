//! Async HTTP implementation of `JobBoardBackend`.

use std::{sync::RwLock, time::Duration};

use bolsa_core::{
  Error, Result,
  activity::{
    Activity, CompanySpecialty, CompanySpecialtyLink, NewActivity, PersonSkill,
    PersonSkillLink,
  },
  application::{Application, ApplicationStatus, CompanyApplication, NewApplication},
  backend::JobBoardBackend,
  matching::{MatchingReport, SkillReport},
  offer::{NewOffer, Offer, OfferQuery, OfferUpdate, RequiredActivity},
  principal::{Identity, LoginRequest, LoginResponse, UserInfo},
  profile::{
    CompanyProfile, CompanyRegistration, PersonProfile, PersonRegistration,
    RegistrationReceipt,
  },
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error;

/// Largest page `GET /api/postulaciones/` serves.
const APPLICATION_PAGE: usize = 100;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Connection settings for the job-board backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// HTTP client for the job-board REST API.
pub struct HttpBackend {
  client: Client,
  config: ClientConfig,
  bearer: RwLock<Option<String>>,
}

impl HttpBackend {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, config, bearer: RwLock::new(None) })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    let bearer = self.bearer.read().unwrap_or_else(|e| e.into_inner());
    match bearer.as_deref() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send, check the status, and decode the JSON answer.
  async fn fetch<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T> {
    let bytes = self.exchange(what, req).await?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  /// Send and check the status; the answer body is ignored.
  async fn execute(&self, what: &str, req: RequestBuilder) -> Result<()> {
    self.exchange(what, req).await.map(drop)
  }

  async fn exchange(&self, what: &str, req: RequestBuilder) -> Result<Vec<u8>> {
    debug!(request = what, "sending");
    let resp = req.send().await.map_err(|e| error::transport(what, e))?;
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(|e| error::transport(what, e))?;
    debug!(request = what, %status, len = bytes.len(), "answered");

    if !status.is_success() {
      return Err(error::from_status(status, &String::from_utf8_lossy(&bytes)));
    }
    Ok(bytes.to_vec())
  }
}

impl JobBoardBackend for HttpBackend {
  fn set_bearer(&self, token: Option<String>) {
    *self.bearer.write().unwrap_or_else(|e| e.into_inner()) = token;
  }

  // ── Authentication ────────────────────────────────────────────────────────

  async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
    let req = self.request(Method::POST, "/auth/login").json(request);
    self.fetch("POST /auth/login", req).await
  }

  async fn current_user(&self, token: &str) -> Result<UserInfo> {
    let req = self
      .client
      .get(self.url("/auth/me"))
      .bearer_auth(token);
    self.fetch("GET /auth/me", req).await
  }

  async fn register_person(
    &self,
    registration: &PersonRegistration,
  ) -> Result<RegistrationReceipt> {
    let req = self
      .request(Method::POST, "/auth/registro/persona")
      .json(registration);
    self.fetch("POST /auth/registro/persona", req).await
  }

  async fn register_company(
    &self,
    registration: &CompanyRegistration,
  ) -> Result<RegistrationReceipt> {
    let req = self
      .request(Method::POST, "/auth/registro/empresa")
      .json(registration);
    self.fetch("POST /auth/registro/empresa", req).await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn person(&self, dni: i64) -> Result<PersonProfile> {
    let path = format!("/api/personas/{dni}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn company(&self, id_empresa: i64) -> Result<CompanyProfile> {
    let path = format!("/api/empresas/{id_empresa}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn search_talent(&self, query: &str) -> Result<Vec<PersonProfile>> {
    let req = self
      .request(Method::GET, "/api/personas/buscar")
      .query(&[("q", query)]);
    self.fetch("GET /api/personas/buscar", req).await
  }

  // ── Offers ────────────────────────────────────────────────────────────────

  /// The search endpoint ignores the active flag, so search results are
  /// filtered here.
  async fn list_offers(&self, query: &OfferQuery) -> Result<Vec<Offer>> {
    let active = query.active.unwrap_or(true);
    match query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
      Some(text) => {
        let req = self
          .request(Method::GET, "/api/ofertas/buscar")
          .query(&[("q", text)]);
        let mut offers: Vec<Offer> = self.fetch("GET /api/ofertas/buscar", req).await?;
        offers.retain(|o| o.active == active);
        Ok(offers)
      }
      None => {
        let mut params = vec![("activa", active.to_string())];
        if let Some(skip) = query.skip {
          params.push(("skip", skip.to_string()));
        }
        if let Some(limit) = query.limit {
          params.push(("limit", limit.to_string()));
        }
        let req = self.request(Method::GET, "/api/ofertas/").query(&params);
        self.fetch("GET /api/ofertas/", req).await
      }
    }
  }

  async fn offer(&self, id: i64) -> Result<Offer> {
    let path = format!("/api/ofertas/{id}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn offers_by_owner(&self, owner: Identity) -> Result<Vec<Offer>> {
    let path = match owner {
      Identity::Company { id_empresa } => format!("/api/ofertas/empresa/{id_empresa}"),
      Identity::Person { dni } => format!("/api/ofertas/persona/{dni}"),
    };
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn create_offer(&self, offer: &NewOffer) -> Result<Offer> {
    let req = self.request(Method::POST, "/api/ofertas/").json(offer);
    self.fetch("POST /api/ofertas/", req).await
  }

  async fn update_offer(&self, id: i64, update: &OfferUpdate) -> Result<Offer> {
    let path = format!("/api/ofertas/{id}");
    let req = self.request(Method::PUT, &path).json(update);
    self.fetch(&format!("PUT {path}"), req).await
  }

  async fn delete_offer(&self, id: i64) -> Result<()> {
    let path = format!("/api/ofertas/{id}");
    self.execute(&format!("DELETE {path}"), self.request(Method::DELETE, &path)).await
  }

  async fn add_offer_activity(
    &self,
    offer_id: i64,
    activity: &RequiredActivity,
  ) -> Result<()> {
    let path = format!("/api/ofertas/{offer_id}/actividades/");
    let req = self.request(Method::POST, &path).json(&json!({
      "id_actividad": activity.activity_id,
      "nivel_requerido": activity.level,
    }));
    self.execute(&format!("POST {path}"), req).await
  }

  async fn remove_offer_activity(&self, offer_id: i64, activity_id: i64) -> Result<()> {
    let path = format!("/api/ofertas/{offer_id}/actividades/");
    let req = self
      .request(Method::DELETE, &path)
      .json(&json!({ "id_actividad": activity_id }));
    self.execute(&format!("DELETE {path}"), req).await
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn activities(&self) -> Result<Vec<Activity>> {
    let req = self.request(Method::GET, "/api/actividades/");
    self.fetch("GET /api/actividades/", req).await
  }

  async fn create_activity(&self, activity: &NewActivity) -> Result<Activity> {
    let req = self.request(Method::POST, "/api/actividades/").json(activity);
    self.fetch("POST /api/actividades/", req).await
  }

  async fn person_skills(&self, dni: i64) -> Result<Vec<PersonSkill>> {
    let path = format!("/api/actividades/persona/{dni}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn add_person_skill(&self, link: &PersonSkillLink) -> Result<()> {
    let req = self.request(Method::POST, "/api/actividades/persona").json(link);
    self.execute("POST /api/actividades/persona", req).await
  }

  async fn remove_person_skill(&self, dni: i64, activity_id: i64) -> Result<()> {
    let path = format!("/api/actividades/persona/{dni}/{activity_id}");
    self.execute(&format!("DELETE {path}"), self.request(Method::DELETE, &path)).await
  }

  async fn company_specialties(&self, id_empresa: i64) -> Result<Vec<CompanySpecialty>> {
    let path = format!("/api/actividades/empresa/{id_empresa}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn add_company_specialty(&self, link: &CompanySpecialtyLink) -> Result<()> {
    let req = self.request(Method::POST, "/api/actividades/empresa").json(link);
    self.execute("POST /api/actividades/empresa", req).await
  }

  async fn remove_company_specialty(
    &self,
    id_empresa: i64,
    activity_id: i64,
  ) -> Result<()> {
    let path = format!("/api/actividades/empresa/{id_empresa}/{activity_id}");
    self.execute(&format!("DELETE {path}"), self.request(Method::DELETE, &path)).await
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn applications(&self) -> Result<Vec<Application>> {
    let mut all = Vec::new();
    loop {
      let req = self
        .request(Method::GET, "/api/postulaciones/")
        .query(&[("skip", all.len()), ("limit", APPLICATION_PAGE)]);
      let page: Vec<Application> = self.fetch("GET /api/postulaciones/", req).await?;
      let last = page.len() < APPLICATION_PAGE;
      all.extend(page);
      if last {
        return Ok(all);
      }
    }
  }

  async fn company_applications(&self, id_empresa: i64) -> Result<Vec<CompanyApplication>> {
    let path = format!("/api/postulaciones/empresa/{id_empresa}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn create_application(&self, application: &NewApplication) -> Result<Application> {
    let req = self.request(Method::POST, "/api/postulaciones/").json(application);
    self.fetch("POST /api/postulaciones/", req).await
  }

  async fn delete_application(&self, dni: i64, offer_id: i64) -> Result<()> {
    let path = format!("/api/postulaciones/{dni}/{offer_id}");
    self.execute(&format!("DELETE {path}"), self.request(Method::DELETE, &path)).await
  }

  /// The backend reads `estado` from the query string; the body carries it
  /// too.
  async fn set_application_status(
    &self,
    application_id: i64,
    status: ApplicationStatus,
  ) -> Result<()> {
    let path = format!("/api/postulaciones/{application_id}/estado");
    let req = self
      .request(Method::PUT, &path)
      .query(&[("estado", status.wire_name())])
      .json(&json!({ "estado": status }));
    self.execute(&format!("PUT {path}"), req).await
  }

  // ── Matching ──────────────────────────────────────────────────────────────

  async fn semantic_search(&self, query: &str) -> Result<Vec<Offer>> {
    let req = self
      .request(Method::GET, "/api/matching/buscar_semantica")
      .query(&[("consulta", query)]);
    self.fetch("GET /api/matching/buscar_semantica", req).await
  }

  async fn matching(&self, dni: i64) -> Result<MatchingReport> {
    let path = format!("/api/matching/matching/{dni}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }

  async fn skill_recommendations(&self, dni: i64) -> Result<SkillReport> {
    let path = format!("/api/actividades/recomendaciones/habilidades/{dni}");
    self.fetch(&format!("GET {path}"), self.request(Method::GET, &path)).await
  }
}
