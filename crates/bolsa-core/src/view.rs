//! View Router: which top-level screen to show for the current session.

use crate::principal::{Principal, PrincipalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
  /// The public board of active offers.
  Home,
  Login,
  Register,
  PersonProfile,
  CompanyProfile,
}

impl View {
  /// Where a principal lands right after logging in.
  pub fn landing(principal: &Principal) -> Self {
    match principal.kind() {
      PrincipalKind::Person => Self::PersonProfile,
      PrincipalKind::Company => Self::CompanyProfile,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Home => "Offers",
      Self::Login => "Log in",
      Self::Register => "Register",
      Self::PersonProfile => "My profile",
      Self::CompanyProfile => "Company",
    }
  }
}

/// Resolve a requested view against the session. Profile views always show
/// the principal's own profile kind; signed-out users never see a profile.
pub fn route(requested: View, principal: Option<&Principal>) -> View {
  match (requested, principal) {
    (View::Home, _) => View::Home,
    (View::Login | View::Register, None) => requested,
    (View::Login | View::Register, Some(p)) => View::landing(p),
    (View::PersonProfile | View::CompanyProfile, Some(p)) => View::landing(p),
    (View::PersonProfile | View::CompanyProfile, None) => View::Home,
  }
}
