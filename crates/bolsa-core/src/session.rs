//! Session Store: the single source of truth for who is logged in.
//!
//! The store owns the current [`Principal`], the durable [`TokenSlot`] and the
//! idle timer. A timer is live exactly while a principal is present; every
//! activity signal ([`SessionStore::touch`]) replaces it with a fresh one, and
//! expiry logs the session out. Observers learn about logins and logouts
//! through [`SessionStore::subscribe`].

use std::{
  sync::{Arc, Mutex, MutexGuard, Weak},
  time::Duration,
};

use tokio::{runtime::Handle, sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
  Error, ErrorKind, Result,
  backend::JobBoardBackend,
  principal::{Identity, LoginRequest, Principal, SessionToken},
  profile::{CompanyRegistration, PersonRegistration},
  token::TokenSlot,
};

/// Ten minutes.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
  /// The user asked to log out.
  Explicit,
  /// No activity for the whole idle window.
  Idle,
  /// The stored token was refused when resuming.
  Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
  LoggedIn(Identity),
  LoggedOut { reason: LogoutReason },
}

struct IdleTimer {
  epoch:  u64,
  handle: JoinHandle<()>,
}

#[derive(Default)]
struct State {
  principal: Option<Principal>,
  timer:     Option<IdleTimer>,
  /// Bumped on every arm; a firing timer only acts if its epoch is current.
  epoch:     u64,
}

struct Inner<B> {
  backend:      Arc<B>,
  slot:         Box<dyn TokenSlot>,
  state:        Mutex<State>,
  events:       broadcast::Sender<SessionEvent>,
  idle_timeout: Duration,
}

impl<B> Inner<B> {
  fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn emit(&self, event: SessionEvent) {
    // No subscribers is fine.
    let _ = self.events.send(event);
  }

  fn clear_slot(&self) {
    if let Err(e) = self.slot.clear() {
      warn!(error = %e, "could not clear the stored session token");
    }
  }
}

/// Cheap to clone; clones share the same session.
pub struct SessionStore<B> {
  inner: Arc<Inner<B>>,
}

impl<B> Clone for SessionStore<B> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<B: JobBoardBackend + 'static> SessionStore<B> {
  pub fn new(backend: Arc<B>, slot: impl TokenSlot + 'static) -> Self {
    Self::with_idle_timeout(backend, slot, DEFAULT_IDLE_TIMEOUT)
  }

  pub fn with_idle_timeout(
    backend: Arc<B>,
    slot: impl TokenSlot + 'static,
    idle_timeout: Duration,
  ) -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self {
      inner: Arc::new(Inner {
        backend,
        slot: Box::new(slot),
        state: Mutex::new(State::default()),
        events,
        idle_timeout,
      }),
    }
  }

  pub fn backend(&self) -> &Arc<B> { &self.inner.backend }

  pub fn idle_timeout(&self) -> Duration { self.inner.idle_timeout }

  pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
    self.inner.events.subscribe()
  }

  pub fn current_principal(&self) -> Option<Principal> {
    self.inner.state().principal.clone()
  }

  /// Whether an idle timer is pending. Inside a tokio runtime this equals
  /// whether a principal is present; a login or `touch` made outside one
  /// leaves no timer, so the session never expires.
  pub fn timer_armed(&self) -> bool { self.inner.state().timer.is_some() }

  // ── Login / logout ──────────────────────────────────────────────────────

  pub async fn login(&self, email: &str, password: &str) -> Result<Principal> {
    let email = email.trim();
    if email.is_empty() {
      return Err(Error::Validation("email is required".into()));
    }
    if password.is_empty() {
      return Err(Error::Validation("password is required".into()));
    }

    let request = LoginRequest {
      email:    email.to_owned(),
      password: password.to_owned(),
    };
    let response = self.inner.backend.login(&request).await.map_err(|e| {
      match e.kind() {
        ErrorKind::Auth | ErrorKind::Validation => e,
        _ => Error::Auth(format!("could not sign in: {e}")),
      }
    })?;

    let principal = Principal::from_login(response, email)?;
    self.install(principal.clone());
    Ok(principal)
  }

  /// Drop the principal, the timer and the stored token. Safe to call at any
  /// time, any number of times.
  pub fn logout(&self) {
    let had_principal = {
      let mut state = self.inner.state();
      if let Some(timer) = state.timer.take() {
        timer.handle.abort();
      }
      state.principal.take().is_some()
    };
    self.inner.clear_slot();
    self.inner.backend.set_bearer(None);
    if had_principal {
      info!("logged out");
      self.inner.emit(SessionEvent::LoggedOut { reason: LogoutReason::Explicit });
    }
  }

  /// Rebuild the session from a token left in the durable slot by an earlier
  /// run. Returns `None` when there is no token or the backend refuses it; a
  /// refused token is cleared.
  pub async fn resume(&self) -> Result<Option<Principal>> {
    let Some(token) = self.inner.slot.load()? else {
      return Ok(None);
    };

    let principal = match self.inner.backend.current_user(&token).await {
      Ok(info) => Principal::from_user_info(info, SessionToken::new(token)),
      Err(e) => Err(e),
    };

    match principal {
      Ok(principal) => {
        self.install(principal.clone());
        Ok(Some(principal))
      }
      Err(e) if matches!(e.kind(), ErrorKind::Auth | ErrorKind::NotFound) => {
        info!(error = %e, "stored session token rejected");
        self.inner.clear_slot();
        self.inner.emit(SessionEvent::LoggedOut { reason: LogoutReason::Rejected });
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }

  // ── Registration ────────────────────────────────────────────────────────

  /// Register a person and log in with the same credentials.
  pub async fn register_person(
    &self,
    registration: &PersonRegistration,
  ) -> Result<Principal> {
    registration.validate()?;
    let receipt = self.inner.backend.register_person(registration).await?;
    info!(dni = ?receipt.dni, "person registered");
    self.login(&registration.email, &registration.password).await
  }

  /// Register a company and log in with the same credentials.
  pub async fn register_company(
    &self,
    registration: &CompanyRegistration,
  ) -> Result<Principal> {
    registration.validate()?;
    let receipt = self.inner.backend.register_company(registration).await?;
    info!(id_empresa = ?receipt.id_empresa, "company registered");
    self.login(&registration.email, &registration.password).await
  }

  // ── Idle timer ──────────────────────────────────────────────────────────

  /// A user-activity signal. Re-arms the idle timer when a principal is
  /// present; does nothing otherwise.
  pub fn touch(&self) {
    let mut state = self.inner.state();
    if state.principal.is_some() {
      self.arm(&mut state);
    }
  }

  fn install(&self, principal: Principal) {
    if let Err(e) = self.inner.slot.store(principal.token.as_str()) {
      warn!(error = %e, "could not persist the session token");
    }
    self
      .inner
      .backend
      .set_bearer(Some(principal.token.as_str().to_owned()));

    let identity = principal.identity;
    {
      let mut state = self.inner.state();
      state.principal = Some(principal);
      self.arm(&mut state);
    }
    info!(%identity, "logged in");
    self.inner.emit(SessionEvent::LoggedIn(identity));
  }

  /// Replace any pending timer with a fresh one.
  fn arm(&self, state: &mut State) {
    if let Some(old) = state.timer.take() {
      old.handle.abort();
    }
    state.epoch += 1;
    let epoch = state.epoch;

    let Ok(runtime) = Handle::try_current() else {
      warn!("no async runtime; idle timeout disabled for this session");
      return;
    };

    let weak = Arc::downgrade(&self.inner);
    let timeout = self.inner.idle_timeout;
    let handle = runtime.spawn(async move {
      tokio::time::sleep(timeout).await;
      expire(weak, epoch);
    });
    state.timer = Some(IdleTimer { epoch, handle });
  }
}

/// Runs on the timer task once the idle window has elapsed.
fn expire<B: JobBoardBackend>(inner: Weak<Inner<B>>, epoch: u64) {
  let Some(inner) = inner.upgrade() else {
    return;
  };
  {
    let mut state = inner.state();
    match &state.timer {
      Some(timer) if timer.epoch == epoch => {}
      _ => {
        debug!(epoch, "stale idle timer ignored");
        return;
      }
    }
    state.timer = None;
    if state.principal.take().is_none() {
      return;
    }
  }
  inner.clear_slot();
  inner.backend.set_bearer(None);
  info!(timeout = ?inner.idle_timeout, "session expired after inactivity");
  inner.emit(SessionEvent::LoggedOut { reason: LogoutReason::Idle });
}
