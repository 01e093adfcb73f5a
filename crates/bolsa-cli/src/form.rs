//! Text-entry forms: login, registration, and the modal editors opened from
//! the profile tabs.

use bolsa_core::{
  Error, Result,
  activity::NewActivity,
  offer::{Level, OfferDraft, RequiredActivity},
  profile::{CompanyRegistration, PersonRegistration},
};
use crossterm::event::{KeyCode, KeyEvent};

/// What a submitted form is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
  Login,
  RegisterPerson,
  RegisterCompany,
  NewOffer,
  EditOffer { offer_id: i64 },
  AddOfferActivity { offer_id: i64 },
  RemoveOfferActivity { offer_id: i64 },
  AddSkill,
  AddSpecialty,
  NewCatalogActivity,
  SemanticSearch,
  TalentSearch,
}

impl FormKind {
  pub fn title(self) -> String {
    match self {
      Self::Login => "Log in".into(),
      Self::RegisterPerson => "Register as a person  (F2: company)".into(),
      Self::RegisterCompany => "Register as a company  (F2: person)".into(),
      Self::NewOffer => "New offer".into(),
      Self::EditOffer { offer_id } => format!("Edit offer #{offer_id}"),
      Self::AddOfferActivity { offer_id } => format!("Require an activity on #{offer_id}"),
      Self::RemoveOfferActivity { offer_id } => format!("Drop an activity from #{offer_id}"),
      Self::AddSkill => "Add a skill".into(),
      Self::AddSpecialty => "Add a specialty".into(),
      Self::NewCatalogActivity => "New catalog activity".into(),
      Self::SemanticSearch => "Semantic search".into(),
      Self::TalentSearch => "Search people".into(),
    }
  }

  fn fields(self) -> Vec<Field> {
    match self {
      Self::Login => vec![Field::new("Email"), Field::secret("Password")],
      Self::RegisterPerson => vec![
        Field::new("DNI"),
        Field::new("Name"),
        Field::new("Surname"),
        Field::new("Email"),
        Field::secret("Password"),
        Field::new("Birth date (YYYY-MM-DD)"),
        Field::new("Address"),
        Field::new("City"),
        Field::new("Province"),
        Field::new("Sex"),
        Field::new("Phone (optional)"),
      ],
      Self::RegisterCompany => vec![
        Field::new("Company name"),
        Field::new("Email"),
        Field::secret("Password"),
        Field::new("Address"),
        Field::new("City"),
        Field::new("Province"),
        Field::new("Phone (optional)"),
      ],
      Self::NewOffer => vec![
        Field::new("Title"),
        Field::new("Description"),
        Field::new("Activities (id:level, ...)"),
      ],
      Self::EditOffer { .. } => vec![Field::new("Title"), Field::new("Description")],
      Self::AddOfferActivity { .. } => vec![Field::new("Activity id"), Field::new("Level")],
      Self::RemoveOfferActivity { .. } => vec![Field::new("Activity id")],
      Self::AddSkill => vec![
        Field::new("Activity id"),
        Field::new("Level (optional)"),
        Field::new("Years of experience"),
      ],
      Self::AddSpecialty => {
        vec![Field::new("Activity id"), Field::new("Specialization (optional)")]
      }
      Self::NewCatalogActivity => vec![
        Field::new("Name"),
        Field::new("Area"),
        Field::new("Specialty"),
        Field::new("Description"),
      ],
      Self::SemanticSearch | Self::TalentSearch => vec![Field::new("Query")],
    }
  }
}

#[derive(Debug, Clone)]
pub struct Field {
  pub label:  &'static str,
  pub value:  String,
  pub secret: bool,
}

impl Field {
  fn new(label: &'static str) -> Self { Self { label, value: String::new(), secret: false } }

  fn secret(label: &'static str) -> Self { Self { secret: true, ..Self::new(label) } }

  /// The text as drawn: secrets are masked.
  pub fn shown(&self) -> String {
    if self.secret {
      "*".repeat(self.value.chars().count())
    } else {
      self.value.clone()
    }
  }
}

/// Outcome of a key press inside a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
  Editing,
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
pub struct Form {
  pub kind:   FormKind,
  pub fields: Vec<Field>,
  pub focus:  usize,
}

impl Form {
  pub fn new(kind: FormKind) -> Self { Self { kind, fields: kind.fields(), focus: 0 } }

  /// Pre-fill field `index`.
  pub fn with_value(mut self, index: usize, value: impl Into<String>) -> Self {
    if let Some(field) = self.fields.get_mut(index) {
      field.value = value.into();
    }
    self
  }

  pub fn value(&self, index: usize) -> &str {
    self.fields.get(index).map(|f| f.value.trim()).unwrap_or_default()
  }

  /// The untrimmed text, for passwords.
  pub fn raw(&self, index: usize) -> &str {
    self.fields.get(index).map(|f| f.value.as_str()).unwrap_or_default()
  }

  fn optional(&self, index: usize) -> Option<String> {
    Some(self.value(index).to_owned()).filter(|v| !v.is_empty())
  }

  /// Enter submits from the last field and moves on from any other.
  pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
    let last = self.fields.len().saturating_sub(1);
    match key.code {
      KeyCode::Esc => return FormAction::Cancel,
      KeyCode::Enter if self.focus >= last => return FormAction::Submit,
      KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1).min(last);
      }
      KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.saturating_sub(1),
      KeyCode::Backspace => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.push(c);
        }
      }
      _ => {}
    }
    FormAction::Editing
  }

  // ── Conversions ─────────────────────────────────────────────────────────

  pub fn person_registration(&self) -> Result<PersonRegistration> {
    Ok(PersonRegistration {
      dni:              parse_id("DNI", self.value(0))?,
      nombre:           self.value(1).to_owned(),
      apellido:         self.value(2).to_owned(),
      email:            self.value(3).to_owned(),
      password:         self.raw(4).to_owned(),
      fecha_nacimiento: self.value(5).to_owned(),
      direccion:        self.value(6).to_owned(),
      ciudad:           self.value(7).to_owned(),
      provincia:        self.value(8).to_owned(),
      sexo:             self.value(9).to_owned(),
      telefono:         self.optional(10),
    })
  }

  pub fn company_registration(&self) -> CompanyRegistration {
    CompanyRegistration {
      nombre:    self.value(0).to_owned(),
      email:     self.value(1).to_owned(),
      password:  self.raw(2).to_owned(),
      direccion: self.value(3).to_owned(),
      ciudad:    self.value(4).to_owned(),
      provincia: self.value(5).to_owned(),
      telefono:  self.optional(6),
    }
  }

  pub fn offer_draft(&self) -> Result<OfferDraft> {
    let mut draft = OfferDraft::new(self.value(0), self.value(1));
    draft.activities = parse_requirements(self.value(2))?;
    Ok(draft)
  }

  pub fn new_activity(&self) -> NewActivity {
    NewActivity {
      name:        self.value(0).to_owned(),
      area:        self.optional(1),
      specialty:   self.optional(2),
      description: self.optional(3),
    }
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

pub fn parse_id(label: &str, value: &str) -> Result<i64> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::Validation(format!("{label} is required")));
  }
  value
    .parse()
    .map_err(|_| Error::Validation(format!("{label} must be a number, got {value:?}")))
}

pub fn parse_level(value: &str) -> Result<Option<Level>> {
  match value.trim() {
    "" => Ok(None),
    v => v.parse().map(Some),
  }
}

/// Parse `7:advanced, 9:2, 12` into required activities. A missing level
/// means beginner.
pub fn parse_requirements(value: &str) -> Result<Vec<RequiredActivity>> {
  value
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(|item| {
      let (id, level) = item.split_once(':').unwrap_or((item, ""));
      let level = parse_level(level)?.unwrap_or(Level::Beginner);
      Ok(RequiredActivity::new(parse_id("activity id", id)?, level))
    })
    .collect()
}
