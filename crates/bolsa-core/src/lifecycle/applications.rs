use std::{collections::HashMap, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  application::{
    Applicant, Application, ApplicationStatus, AppliedOffer, CompanyApplication,
    NewApplication,
  },
  backend::JobBoardBackend,
  guard,
  offer::Offer,
  principal::{Identity, Principal},
};

/// Applications visible to the current principal: a person's own plus those
/// received on offers they posted, or every application to a company's offers.
pub struct ApplicationBook<B> {
  backend:      Arc<B>,
  applications: Vec<Application>,
  /// Joined rows for applications received on the principal's offers.
  rows:         Vec<CompanyApplication>,
}

impl<B: JobBoardBackend> ApplicationBook<B> {
  pub fn new(backend: Arc<B>) -> Self {
    Self { backend, applications: Vec::new(), rows: Vec::new() }
  }

  pub fn applications(&self) -> &[Application] { &self.applications }

  /// Applications made by `dni`, leaving out those received on its offers.
  pub fn of_candidate(&self, dni: i64) -> Vec<&Application> {
    self.applications.iter().filter(|a| a.dni == dni).collect()
  }

  pub fn rows(&self) -> &[CompanyApplication] { &self.rows }

  pub fn get(&self, id: i64) -> Option<&Application> {
    self.applications.iter().find(|a| a.id == id)
  }

  pub fn find(&self, dni: i64, offer_id: i64) -> Option<&Application> {
    self.applications.iter().find(|a| a.key() == (dni, offer_id))
  }

  pub async fn load_for(&mut self, principal: &Principal) -> Result<&[Application]> {
    match principal.identity {
      Identity::Person { dni } => {
        let owned: HashMap<i64, String> = self
          .backend
          .offers_by_owner(principal.identity)
          .await?
          .into_iter()
          .map(|o| (o.id, o.title))
          .collect();
        let mut all = self.backend.applications().await?;
        all.retain(|a| a.dni == dni || owned.contains_key(&a.offer_id));
        self.rows = self.received_rows(&all, &owned).await;
        self.applications = all;
      }
      Identity::Company { id_empresa } => {
        self.rows = self.backend.company_applications(id_empresa).await?;
        self.applications =
          self.rows.iter().map(CompanyApplication::to_application).collect();
      }
    }
    debug!(who = %principal.identity, count = self.applications.len(), "loaded applications");
    Ok(&self.applications)
  }

  /// Join applications to the offers in `owned` with their candidates'
  /// profiles. A profile that cannot be fetched leaves a placeholder.
  async fn received_rows(
    &self,
    all: &[Application],
    owned: &HashMap<i64, String>,
  ) -> Vec<CompanyApplication> {
    let mut applicants: HashMap<i64, Applicant> = HashMap::new();
    let mut rows = Vec::new();
    for a in all {
      let Some(title) = owned.get(&a.offer_id) else { continue };
      let applicant = match applicants.get(&a.dni) {
        Some(known) => known.clone(),
        None => {
          let fetched = match self.backend.person(a.dni).await {
            Ok(profile) => Applicant::from(profile),
            Err(e) => {
              warn!(dni = a.dni, error = %e, "could not load applicant profile");
              Applicant::unknown(a.dni)
            }
          };
          applicants.insert(a.dni, fetched.clone());
          fetched
        }
      };
      rows.push(CompanyApplication {
        id:         a.id,
        status:     a.status,
        created_at: a.created_at,
        applicant,
        offer:      AppliedOffer { id: a.offer_id, title: title.clone() },
      });
    }
    rows
  }

  /// Apply to `offer_id` as the logged-in person. A second application to
  /// the same offer is refused without contacting the backend.
  pub async fn apply(&mut self, principal: &Principal, offer_id: i64) -> Result<Application> {
    let dni = guard::ensure_person(principal)?;
    if self.find(dni, offer_id).is_some() {
      return Err(Error::DuplicateApplication { dni, offer_id });
    }

    let request = NewApplication {
      dni,
      offer_id,
      status: ApplicationStatus::Pending,
    };
    let application = self.backend.create_application(&request).await?;
    info!(dni, offer_id, "applied");

    // A racing duplicate may have landed meanwhile; keep one entry per key.
    self.applications.retain(|a| a.key() != application.key());
    self.applications.push(application.clone());
    Ok(application)
  }

  /// Move an application to `status`. Only the owner of `offer`, the offer
  /// the application targets, may do this. Any status may follow any other.
  pub async fn set_status(
    &mut self,
    principal: &Principal,
    application_id: i64,
    offer: &Offer,
    status: ApplicationStatus,
  ) -> Result<()> {
    let application = self
      .get(application_id)
      .ok_or_else(|| Error::NotFound(format!("application {application_id}")))?;
    guard::ensure_target_owner(principal, application, offer)?;

    self
      .backend
      .set_application_status(application_id, status)
      .await?;
    info!(application_id, %status, "application status changed");

    for a in self.applications.iter_mut().filter(|a| a.id == application_id) {
      a.status = status;
    }
    for row in self.rows.iter_mut().filter(|r| r.id == application_id) {
      row.status = status;
    }
    Ok(())
  }

  /// Withdraw the application of `dni` to `offer_id`. Only the candidate may
  /// withdraw, and only while the application is not hired or rejected.
  pub async fn withdraw(
    &mut self,
    principal: &Principal,
    dni: i64,
    offer_id: i64,
  ) -> Result<()> {
    let application = self.find(dni, offer_id).ok_or_else(|| {
      Error::NotFound(format!("application of dni {dni} to offer {offer_id}"))
    })?;
    guard::ensure_candidate(principal, application)?;
    if application.status.is_terminal() {
      return Err(Error::ApplicationClosed {
        dni,
        offer_id,
        status: application.status,
      });
    }

    self.backend.delete_application(dni, offer_id).await?;
    self.applications.retain(|a| a.key() != (dni, offer_id));
    self
      .rows
      .retain(|r| (r.applicant.dni, r.offer.id) != (dni, offer_id));
    info!(dni, offer_id, "application withdrawn");
    Ok(())
  }
}
