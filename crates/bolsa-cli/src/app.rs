//! Application state machine and event dispatcher.

use std::{sync::Arc, time::Duration};

use bolsa_client::HttpBackend;
use bolsa_core::{
  Error, ErrorKind, Result,
  application::{Application, ApplicationStatus},
  backend::JobBoardBackend,
  lifecycle::{ActivityBook, ApplicationBook, OfferBook},
  matching::{OfferMatch, SkillRecommendation},
  offer::{Offer, OfferPatch, OfferQuery},
  principal::{Identity, Principal, PrincipalKind},
  profile::{CompanyProfile, PersonProfile},
  session::{LogoutReason, SessionEvent, SessionStore},
  view::{self, View},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tracing::warn;

use crate::form::{Form, FormAction, FormKind, parse_id, parse_level};

// ─── Tabs ─────────────────────────────────────────────────────────────────────

/// Sections of the profile views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Offers,
  Applications,
  Skills,
  Matches,
  SkillRecs,
  MyOffers,
  Applicants,
  Specialties,
  Talent,
}

impl Tab {
  pub fn for_kind(kind: PrincipalKind) -> &'static [Tab] {
    match kind {
      PrincipalKind::Person => &[
        Self::Offers,
        Self::Applications,
        Self::MyOffers,
        Self::Applicants,
        Self::Skills,
        Self::Matches,
        Self::SkillRecs,
      ],
      PrincipalKind::Company => {
        &[Self::MyOffers, Self::Applicants, Self::Specialties, Self::Talent]
      }
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Offers => "Offers",
      Self::Applications => "My applications",
      Self::Skills => "Skills",
      Self::Matches => "Matches",
      Self::SkillRecs => "Skills to learn",
      Self::MyOffers => "My offers",
      Self::Applicants => "Applicants",
      Self::Specialties => "Specialties",
      Self::Talent => "Talent",
    }
  }
}

/// What the body of the screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  /// The public board on the home view.
  Board,
  /// The login or registration form.
  Entry,
  Tab(Tab),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub view: View,

  /// Selected section of the profile views.
  pub tab: Tab,

  pub session:   SessionStore<HttpBackend>,
  pub principal: Option<Principal>,

  /// Public active offers.
  pub board:        OfferBook<HttpBackend>,
  /// Offers owned by the logged-in principal.
  pub owned:        OfferBook<HttpBackend>,
  pub applications: ApplicationBook<HttpBackend>,
  pub activities:   ActivityBook<HttpBackend>,

  pub person:          Option<PersonProfile>,
  pub company:         Option<CompanyProfile>,
  pub matches:         Vec<OfferMatch>,
  pub recommendations: Vec<SkillRecommendation>,
  pub talent:          Vec<PersonProfile>,

  /// Semantic search hits; replace the board listing while set.
  pub search_results: Option<Vec<Offer>>,

  /// Current fuzzy-filter string (only edited while `filter_active`).
  pub filter:        String,
  pub filter_active: bool,

  /// Cursor position within the list of the current pane.
  pub cursor: usize,

  /// Form being edited, if any.
  pub form: Option<Form>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(session: SessionStore<HttpBackend>) -> Self {
    let backend = Arc::clone(session.backend());
    Self {
      view: View::Home,
      tab: Tab::Offers,
      principal: None,
      board: OfferBook::new(Arc::clone(&backend)),
      owned: OfferBook::new(Arc::clone(&backend)),
      applications: ApplicationBook::new(Arc::clone(&backend)),
      activities: ActivityBook::new(backend),
      person: None,
      company: None,
      matches: Vec::new(),
      recommendations: Vec::new(),
      talent: Vec::new(),
      search_results: None,
      filter: String::new(),
      filter_active: false,
      cursor: 0,
      form: None,
      status_msg: String::new(),
      session,
    }
  }

  fn backend(&self) -> &Arc<HttpBackend> { self.session.backend() }

  /// Pick up a session left by an earlier run, then load the first view.
  pub async fn start(&mut self) {
    match self.session.resume().await {
      Ok(Some(principal)) => {
        self.status_msg = format!("Welcome back, {}", principal.display_name);
        self.enter_session(principal);
      }
      Ok(None) => {}
      Err(e) => self.fail(e),
    }
    self.reload().await;
  }

  pub fn pane(&self) -> Pane {
    match self.view {
      View::Home => Pane::Board,
      View::Login | View::Register => Pane::Entry,
      View::PersonProfile | View::CompanyProfile => Pane::Tab(self.tab),
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  fn enter_session(&mut self, principal: Principal) {
    self.tab = Tab::for_kind(principal.kind())[0];
    self.view = View::landing(&principal);
    self.principal = Some(principal);
    self.form = None;
    self.cursor = 0;
  }

  /// Forget everything that belonged to the principal.
  fn clear_session(&mut self) {
    let backend = Arc::clone(self.backend());
    self.principal = None;
    self.owned = OfferBook::new(Arc::clone(&backend));
    self.applications = ApplicationBook::new(Arc::clone(&backend));
    self.activities = ActivityBook::new(backend);
    self.person = None;
    self.company = None;
    self.matches.clear();
    self.recommendations.clear();
    self.talent.clear();
    self.form = None;
    self.view = view::route(self.view, None);
    self.cursor = 0;
  }

  /// React to a change announced by the session store. Only logouts the app
  /// did not start itself (idle expiry) need handling here.
  pub fn on_session_event(&mut self, event: SessionEvent) {
    let SessionEvent::LoggedOut { reason } = event else { return };
    if self.principal.is_none() {
      return;
    }
    self.clear_session();
    self.status_msg = match reason {
      LogoutReason::Idle => format!(
        "Logged out after {} without activity",
        describe(self.session.idle_timeout())
      ),
      LogoutReason::Rejected => "Your session is no longer valid; log in again".into(),
      LogoutReason::Explicit => "Logged out".into(),
    };
  }

  fn sign_out(&mut self) {
    self.session.logout();
    self.clear_session();
    self.status_msg = "Logged out".into();
  }

  fn require_principal(&self) -> Result<Principal> {
    self
      .principal
      .clone()
      .ok_or_else(|| Error::Auth("log in first".into()))
  }

  /// Put a failed action in the status bar. A credential the backend no
  /// longer accepts ends the session.
  fn fail(&mut self, e: Error) {
    warn!(error = %e, "action failed");
    if e.kind() == ErrorKind::Auth && self.principal.is_some() {
      self.session.logout();
      self.clear_session();
    }
    self.status_msg = format!("Error: {e}");
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  async fn navigate(&mut self, requested: View) {
    let target = view::route(requested, self.principal.as_ref());
    if target == View::Home && requested != View::Home {
      self.status_msg = "Log in to see your profile".into();
    }
    self.view = target;
    self.cursor = 0;
    self.form = match target {
      View::Login => Some(Form::new(FormKind::Login)),
      View::Register => Some(Form::new(FormKind::RegisterPerson)),
      _ => None,
    };
    self.reload().await;
  }

  /// Move to the next or previous profile tab. Returns whether it moved.
  fn cycle_tab(&mut self, forward: bool) -> bool {
    if !matches!(self.pane(), Pane::Tab(_)) {
      return false;
    }
    let Some(principal) = &self.principal else { return false };
    let tabs = Tab::for_kind(principal.kind());
    let index = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
    let next = if forward {
      (index + 1) % tabs.len()
    } else {
      (index + tabs.len() - 1) % tabs.len()
    };
    self.tab = tabs[next];
    self.cursor = 0;
    true
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Refresh what the current pane shows; failures go to the status bar.
  pub async fn reload(&mut self) {
    if let Err(e) = self.load().await {
      self.fail(e);
    }
    self.cursor = self.cursor.min(self.list_len().saturating_sub(1));
  }

  async fn load(&mut self) -> Result<()> {
    if self.activities.catalog().is_empty() {
      if let Err(e) = self.activities.load_catalog().await {
        warn!(error = %e, "could not load the activity catalog");
      }
    }

    match self.pane() {
      Pane::Entry => Ok(()),
      Pane::Board => self.load_board().await,
      Pane::Tab(tab) => {
        let principal = self.require_principal()?;
        self.load_profile(&principal).await?;
        self.load_tab(tab, &principal).await
      }
    }
  }

  async fn load_board(&mut self) -> Result<()> {
    self.board.load_public(&OfferQuery::default()).await?;
    if let Some(principal) = self.principal.clone() {
      if principal.kind() == PrincipalKind::Person {
        self.applications.load_for(&principal).await?;
      }
    }
    Ok(())
  }

  async fn load_profile(&mut self, principal: &Principal) -> Result<()> {
    match principal.identity {
      Identity::Person { dni } if self.person.is_none() => {
        self.person = Some(self.backend().person(dni).await?);
      }
      Identity::Company { id_empresa } if self.company.is_none() => {
        self.company = Some(self.backend().company(id_empresa).await?);
      }
      _ => {}
    }
    Ok(())
  }

  async fn load_tab(&mut self, tab: Tab, principal: &Principal) -> Result<()> {
    match (tab, principal.identity) {
      (Tab::Offers, _) => self.load_board().await?,
      (Tab::Applications, _) => {
        self.board.load_public(&OfferQuery::default()).await?;
        self.applications.load_for(principal).await?;
      }
      (Tab::Skills, Identity::Person { dni }) => {
        self.activities.load_skills(dni).await?;
      }
      (Tab::Matches, Identity::Person { dni }) => {
        self.matches = self.backend().matching(dni).await?.ranked();
      }
      (Tab::SkillRecs, Identity::Person { dni }) => {
        self.recommendations = self.backend().skill_recommendations(dni).await?.skills;
      }
      (Tab::MyOffers, _) => {
        self.owned.load_owned(principal).await?;
      }
      (Tab::Applicants, _) => {
        self.owned.load_owned(principal).await?;
        self.applications.load_for(principal).await?;
      }
      (Tab::Specialties, Identity::Company { id_empresa }) => {
        self.activities.load_specialties(id_empresa).await?;
      }
      _ => {}
    }
    Ok(())
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  /// Offers listed by the current pane, after the fuzzy filter.
  pub fn visible_offers(&self) -> Vec<&Offer> {
    let source: &[Offer] = match self.pane() {
      Pane::Board | Pane::Tab(Tab::Offers) => {
        self.search_results.as_deref().unwrap_or(self.board.offers())
      }
      Pane::Tab(Tab::MyOffers) => self.owned.offers(),
      _ => &[],
    };
    fuzzy_filter(source, &self.filter)
  }

  /// Applications the logged-in person made, without those received on
  /// offers they posted.
  pub fn own_applications(&self) -> Vec<&Application> {
    match self.principal.as_ref().and_then(Principal::dni) {
      Some(dni) => self.applications.of_candidate(dni),
      None => Vec::new(),
    }
  }

  pub fn cursor_offer(&self) -> Option<&Offer> {
    self.visible_offers().get(self.cursor).copied()
  }

  pub fn list_len(&self) -> usize {
    match self.pane() {
      Pane::Board | Pane::Tab(Tab::Offers | Tab::MyOffers) => self.visible_offers().len(),
      Pane::Entry => 0,
      Pane::Tab(Tab::Applications) => self.own_applications().len(),
      Pane::Tab(Tab::Skills) => self.activities.skills().len(),
      Pane::Tab(Tab::Matches) => self.matches.len(),
      Pane::Tab(Tab::SkillRecs) => self.recommendations.len(),
      Pane::Tab(Tab::Applicants) => self.applications.rows().len(),
      Pane::Tab(Tab::Specialties) => self.activities.specialties().len(),
      Pane::Tab(Tab::Talent) => self.talent.len(),
    }
  }

  /// Title of offer `id` from whatever listing has it.
  pub fn offer_title(&self, id: i64) -> String {
    self
      .board
      .get(id)
      .or_else(|| self.owned.get(id))
      .map(|o| o.title.clone())
      .unwrap_or_else(|| format!("offer #{id}"))
  }

  /// Whether the logged-in person has applied to `offer_id`.
  pub fn has_applied(&self, offer_id: i64) -> bool {
    self
      .principal
      .as_ref()
      .and_then(Principal::dni)
      .is_some_and(|dni| self.applications.find(dni, offer_id).is_some())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }
    self.status_msg.clear();

    if self.form.is_some() {
      self.handle_form_key(key).await;
      return Ok(true);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Down | KeyCode::Char('j') => {
        self.cursor = (self.cursor + 1).min(self.list_len().saturating_sub(1));
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Tab | KeyCode::BackTab => {
        // Tab switches load their data on arrival.
        if self.cycle_tab(key.code == KeyCode::Tab) {
          self.reload().await;
        }
      }
      KeyCode::Char('h') => self.navigate(View::Home).await,
      KeyCode::Char('p') => self.navigate(View::PersonProfile).await,
      KeyCode::Char('l') => self.navigate(View::Login).await,
      KeyCode::Char('r') => self.navigate(View::Register).await,
      KeyCode::Char('o') if self.principal.is_some() => self.sign_out(),
      KeyCode::Char('g') => {
        self.search_results = None;
        self.reload().await;
      }
      KeyCode::Char('c') if self.principal.is_some() => {
        self.form = Some(Form::new(FormKind::NewCatalogActivity));
      }
      _ => self.handle_pane_key(key).await,
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursor = 0;
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let Some(form) = self.form.as_mut() else { return };

    if key.code == KeyCode::F(2) {
      match form.kind {
        FormKind::RegisterPerson => *form = Form::new(FormKind::RegisterCompany),
        FormKind::RegisterCompany => *form = Form::new(FormKind::RegisterPerson),
        _ => {}
      }
      return;
    }

    match form.handle_key(key) {
      FormAction::Editing => {}
      FormAction::Cancel => {
        self.form = None;
        if self.pane() == Pane::Entry {
          self.navigate(View::Home).await;
        }
      }
      FormAction::Submit => {
        let Some(form) = self.form.take() else { return };
        match self.submit(&form).await {
          Ok(message) => {
            self.status_msg = message;
            self.reload().await;
          }
          Err(e) => {
            self.form = Some(form);
            self.fail(e);
          }
        }
      }
    }
  }

  async fn handle_pane_key(&mut self, key: KeyEvent) {
    let result = match (self.pane(), key.code) {
      (Pane::Board | Pane::Tab(Tab::Offers | Tab::MyOffers), KeyCode::Char('/')) => {
        self.filter_active = true;
        Ok(None)
      }
      (Pane::Board | Pane::Tab(Tab::Offers), KeyCode::Esc) => {
        self.search_results = None;
        self.filter.clear();
        Ok(None)
      }
      (Pane::Board | Pane::Tab(Tab::Offers), KeyCode::Char('s')) => {
        self.form = Some(Form::new(FormKind::SemanticSearch));
        Ok(None)
      }
      (Pane::Board | Pane::Tab(Tab::Offers), KeyCode::Char('a')) => self.apply().await,
      (Pane::Tab(Tab::Applications), KeyCode::Char('w')) => self.withdraw().await,
      (Pane::Tab(Tab::Skills), KeyCode::Char('n')) => {
        self.form = Some(Form::new(FormKind::AddSkill));
        Ok(None)
      }
      (Pane::Tab(Tab::Skills), KeyCode::Char('D')) => self.remove_skill().await,
      (Pane::Tab(Tab::MyOffers), code) => self.handle_my_offers_key(code).await,
      (Pane::Tab(Tab::Applicants), KeyCode::Char(c @ '1'..='5')) => {
        let index = c as usize - '1' as usize;
        self.set_status(ApplicationStatus::ALL[index]).await
      }
      (Pane::Tab(Tab::Specialties), KeyCode::Char('n')) => {
        self.form = Some(Form::new(FormKind::AddSpecialty));
        Ok(None)
      }
      (Pane::Tab(Tab::Specialties), KeyCode::Char('D')) => self.remove_specialty().await,
      (Pane::Tab(Tab::Talent), KeyCode::Char('s')) => {
        self.form = Some(Form::new(FormKind::TalentSearch));
        Ok(None)
      }
      _ => Ok(None),
    };

    match result {
      Ok(Some(message)) => self.status_msg = message,
      Ok(None) => {}
      Err(e) => self.fail(e),
    }
  }

  async fn handle_my_offers_key(&mut self, code: KeyCode) -> Result<Option<String>> {
    if code == KeyCode::Char('n') {
      self.form = Some(Form::new(FormKind::NewOffer));
      return Ok(None);
    }
    let Some(offer) = self.cursor_offer().cloned() else {
      return Ok(None);
    };
    let offer_id = offer.id;
    match code {
      KeyCode::Char('e') => {
        self.form = Some(
          Form::new(FormKind::EditOffer { offer_id })
            .with_value(0, offer.title)
            .with_value(1, offer.description),
        );
        Ok(None)
      }
      KeyCode::Char('+') => {
        self.form = Some(Form::new(FormKind::AddOfferActivity { offer_id }));
        Ok(None)
      }
      KeyCode::Char('-') => {
        self.form = Some(Form::new(FormKind::RemoveOfferActivity { offer_id }));
        Ok(None)
      }
      KeyCode::Char('t') => {
        let principal = self.require_principal()?;
        let updated = self.owned.set_active(&principal, offer_id, !offer.active).await?;
        let state = if updated.active { "active" } else { "inactive" };
        Ok(Some(format!("Offer #{offer_id} is now {state}")))
      }
      KeyCode::Char('D') => {
        let principal = self.require_principal()?;
        self.owned.delete(&principal, offer_id).await?;
        self.cursor = self.cursor.saturating_sub(1);
        Ok(Some(format!("Deleted offer #{offer_id}")))
      }
      _ => Ok(None),
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  async fn apply(&mut self) -> Result<Option<String>> {
    let principal = self.require_principal()?;
    let Some(offer) = self.cursor_offer().map(|o| (o.id, o.title.clone())) else {
      return Ok(None);
    };
    self.applications.apply(&principal, offer.0).await?;
    Ok(Some(format!("Applied to {}", offer.1)))
  }

  async fn withdraw(&mut self) -> Result<Option<String>> {
    let principal = self.require_principal()?;
    let Some(selected) = self.own_applications().get(self.cursor).map(|a| (*a).clone()) else {
      return Ok(None);
    };
    // The status may have moved on since the list was drawn.
    self.applications.load_for(&principal).await?;
    self
      .applications
      .withdraw(&principal, selected.dni, selected.offer_id)
      .await?;
    self.cursor = self.cursor.saturating_sub(1);
    Ok(Some(format!("Withdrew from {}", self.offer_title(selected.offer_id))))
  }

  async fn set_status(&mut self, status: ApplicationStatus) -> Result<Option<String>> {
    let principal = self.require_principal()?;
    let Some(row) = self.applications.rows().get(self.cursor).cloned() else {
      return Ok(None);
    };
    let offer = match self.owned.get(row.offer.id) {
      Some(offer) => offer.clone(),
      None => self.owned.refresh(row.offer.id).await?.clone(),
    };
    self
      .applications
      .set_status(&principal, row.id, &offer, status)
      .await?;
    Ok(Some(format!("{} is now {status}", row.applicant.full_name())))
  }

  async fn remove_skill(&mut self) -> Result<Option<String>> {
    let principal = self.require_principal()?;
    let Some(dni) = principal.dni() else { return Ok(None) };
    let Some(skill) = self.activities.skills().get(self.cursor).cloned() else {
      return Ok(None);
    };
    self
      .activities
      .remove_skill(&principal, dni, skill.activity_id)
      .await?;
    Ok(Some(format!("Removed {} from your skills", skill.name)))
  }

  async fn remove_specialty(&mut self) -> Result<Option<String>> {
    let principal = self.require_principal()?;
    let Identity::Company { id_empresa } = principal.identity else {
      return Ok(None);
    };
    let Some(specialty) = self.activities.specialties().get(self.cursor).cloned() else {
      return Ok(None);
    };
    self
      .activities
      .remove_specialty(&principal, id_empresa, specialty.activity_id)
      .await?;
    Ok(Some(format!("Removed {} from your specialties", specialty.name)))
  }

  /// Carry out a submitted form; the message goes to the status bar.
  async fn submit(&mut self, form: &Form) -> Result<String> {
    match form.kind {
      FormKind::Login => {
        let principal = self.session.login(form.value(0), form.raw(1)).await?;
        let message = format!("Welcome, {}", principal.display_name);
        self.enter_session(principal);
        Ok(message)
      }
      FormKind::RegisterPerson => {
        let registration = form.person_registration()?;
        let principal = self.session.register_person(&registration).await?;
        self.enter_session(principal);
        Ok("Registered and logged in".into())
      }
      FormKind::RegisterCompany => {
        let principal = self
          .session
          .register_company(&form.company_registration())
          .await?;
        self.enter_session(principal);
        Ok("Company registered and logged in".into())
      }
      FormKind::NewOffer => {
        let principal = self.require_principal()?;
        let offer = self.owned.create(&principal, &form.offer_draft()?).await?;
        Ok(format!("Published offer #{}", offer.id))
      }
      FormKind::EditOffer { offer_id } => {
        let principal = self.require_principal()?;
        let patch = OfferPatch {
          title: Some(form.value(0).to_owned()),
          description: Some(form.value(1).to_owned()),
          active: None,
        };
        self.owned.update(&principal, offer_id, &patch).await?;
        Ok(format!("Saved offer #{offer_id}"))
      }
      FormKind::AddOfferActivity { offer_id } => {
        let principal = self.require_principal()?;
        let activity_id = parse_id("activity id", form.value(0))?;
        let level = parse_level(form.value(1))?.ok_or_else(|| Error::required("level"))?;
        self
          .owned
          .add_activity(&principal, offer_id, activity_id, level)
          .await?;
        Ok(format!("Offer #{offer_id} now requires {}", self.activity_name(activity_id)))
      }
      FormKind::RemoveOfferActivity { offer_id } => {
        let principal = self.require_principal()?;
        let activity_id = parse_id("activity id", form.value(0))?;
        self
          .owned
          .remove_activity(&principal, offer_id, activity_id)
          .await?;
        Ok(format!("Offer #{offer_id} no longer requires {}", self.activity_name(activity_id)))
      }
      FormKind::AddSkill => {
        let principal = self.require_principal()?;
        let activity_id = parse_id("activity id", form.value(0))?;
        let level = parse_level(form.value(1))?;
        let years = match form.value(2) {
          "" => 0,
          v => v.parse().map_err(|_| {
            Error::Validation(format!("years of experience must be a number, got {v:?}"))
          })?,
        };
        self
          .activities
          .add_skill(&principal, activity_id, level, years)
          .await?;
        Ok(format!("Added {} to your skills", self.activity_name(activity_id)))
      }
      FormKind::AddSpecialty => {
        let principal = self.require_principal()?;
        let activity_id = parse_id("activity id", form.value(0))?;
        self
          .activities
          .add_specialty(&principal, activity_id, Some(form.value(1).to_owned()))
          .await?;
        Ok(format!("Added {} to your specialties", self.activity_name(activity_id)))
      }
      FormKind::NewCatalogActivity => {
        let principal = self.require_principal()?;
        let created = self
          .activities
          .create_activity(&principal, form.new_activity())
          .await?;
        Ok(format!("Created activity #{} {}", created.id, created.name))
      }
      FormKind::SemanticSearch => {
        let query = required_query(form)?;
        let hits = self.backend().semantic_search(query).await?;
        let message = format!("{} offers match {query:?}  (Esc clears)", hits.len());
        self.search_results = Some(hits);
        self.cursor = 0;
        Ok(message)
      }
      FormKind::TalentSearch => {
        let query = required_query(form)?;
        self.talent = self.backend().search_talent(query).await?;
        self.cursor = 0;
        Ok(format!("{} people match {query:?}", self.talent.len()))
      }
    }
  }

  pub fn activity_name(&self, id: i64) -> String {
    self
      .activities
      .name_of(id)
      .map(str::to_owned)
      .unwrap_or_else(|| format!("activity #{id}"))
  }
}

fn required_query(form: &Form) -> Result<&str> {
  match form.value(0) {
    "" => Err(Error::required("query")),
    query => Ok(query),
  }
}

/// Offers whose title or description fuzzy-matches `query`, best first.
pub fn fuzzy_filter<'a>(offers: &'a [Offer], query: &str) -> Vec<&'a Offer> {
  if query.is_empty() {
    return offers.iter().collect();
  }
  let matcher = SkimMatcherV2::default();
  let mut scored: Vec<_> = offers
    .iter()
    .filter_map(|offer| {
      let title = matcher.fuzzy_match(&offer.title, query);
      let description = matcher.fuzzy_match(&offer.description, query);
      title.max(description).map(|score| (score, offer))
    })
    .collect();
  scored.sort_by(|a, b| b.0.cmp(&a.0));
  scored.into_iter().map(|(_, offer)| offer).collect()
}

fn describe(duration: Duration) -> String {
  let secs = duration.as_secs();
  if secs >= 60 && secs % 60 == 0 {
    format!("{} min", secs / 60)
  } else {
    format!("{secs} s")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn offer(id: i64, title: &str, description: &str) -> Offer {
    Offer {
      id,
      title: title.into(),
      description: description.into(),
      active: true,
      published_at: None,
      company_id: Some(1),
      person_dni: None,
      required_activities: Vec::new(),
    }
  }

  #[test]
  fn fuzzy_filter_matches_title_or_description() {
    let offers = vec![
      offer(1, "Mozo de salón", "Turno noche"),
      offer(2, "Electricista", "Instalaciones domiciliarias"),
      offer(3, "Cadete", "Reparto en moto, zona centro"),
    ];
    let ids = |q: &str| fuzzy_filter(&offers, q).iter().map(|o| o.id).collect::<Vec<_>>();
    assert_eq!(ids(""), vec![1, 2, 3]);
    assert_eq!(ids("electr"), vec![2]);
    assert_eq!(ids("moto"), vec![3]);
    assert!(ids("zzzz").is_empty());
  }

  #[test]
  fn tabs_depend_on_principal_kind() {
    assert_eq!(Tab::for_kind(PrincipalKind::Person)[0], Tab::Offers);
    assert_eq!(Tab::for_kind(PrincipalKind::Company)[0], Tab::MyOffers);
    assert!(!Tab::for_kind(PrincipalKind::Company).contains(&Tab::Applications));

    // A person may post offers too, and review who applied to them.
    let person = Tab::for_kind(PrincipalKind::Person);
    assert!(person.contains(&Tab::MyOffers));
    assert!(person.contains(&Tab::Applicants));
  }

  #[test]
  fn durations_read_naturally() {
    assert_eq!(describe(Duration::from_secs(600)), "10 min");
    assert_eq!(describe(Duration::from_secs(45)), "45 s");
  }
}
