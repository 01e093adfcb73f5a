//! The durable token slot, the only session state that survives a restart.
//!
//! A slot stores one bearer token under the fixed key [`TOKEN_KEY`]. Nothing
//! else about the principal is persisted.

use std::{
  collections::BTreeMap,
  fs, io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
};

use crate::Result;

/// The key the token is stored under.
pub const TOKEN_KEY: &str = "token";

pub trait TokenSlot: Send + Sync {
  fn load(&self) -> Result<Option<String>>;

  fn store(&self, token: &str) -> Result<()>;

  /// Remove the token. Clearing an empty slot is not an error.
  fn clear(&self) -> Result<()>;
}

impl<T: TokenSlot + ?Sized> TokenSlot for Arc<T> {
  fn load(&self) -> Result<Option<String>> { (**self).load() }

  fn store(&self, token: &str) -> Result<()> { (**self).store(token) }

  fn clear(&self) -> Result<()> { (**self).clear() }
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// A slot that lives as long as the process. Used in tests and when no state
/// directory is available.
#[derive(Debug, Default)]
pub struct MemoryTokenSlot {
  token: Mutex<Option<String>>,
}

impl MemoryTokenSlot {
  pub fn new() -> Self { Self::default() }
}

impl TokenSlot for MemoryTokenSlot {
  fn load(&self) -> Result<Option<String>> {
    Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
  }

  fn store(&self, token: &str) -> Result<()> {
    *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_owned());
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
    Ok(())
  }
}

// ─── File ────────────────────────────────────────────────────────────────────

/// A slot backed by a small JSON object on disk, e.g.
/// `{"token": "eyJ..."}`.
#[derive(Debug, Clone)]
pub struct FileTokenSlot {
  path: PathBuf,
}

impl FileTokenSlot {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  fn read_map(&self) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(&self.path) {
      Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
      Ok(raw) => Ok(serde_json::from_str(&raw)?),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
      Err(e) => Err(e.into()),
    }
  }

  fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
    Ok(())
  }
}

impl TokenSlot for FileTokenSlot {
  fn load(&self) -> Result<Option<String>> {
    Ok(self.read_map()?.remove(TOKEN_KEY))
  }

  fn store(&self, token: &str) -> Result<()> {
    let mut map = self.read_map().unwrap_or_default();
    map.insert(TOKEN_KEY.to_owned(), token.to_owned());
    self.write_map(&map)
  }

  fn clear(&self) -> Result<()> {
    // An unreadable slot is treated as empty.
    let mut map = self.read_map().unwrap_or_default();
    map.remove(TOKEN_KEY);
    if !map.is_empty() {
      return self.write_map(&map);
    }
    match fs::remove_file(&self.path) {
      Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
      .join(format!("bolsa-token-{}-{name}", std::process::id()))
      .join("session.json")
  }

  #[test]
  fn memory_slot_round_trip() {
    let slot = MemoryTokenSlot::new();
    assert_eq!(slot.load().unwrap(), None);
    slot.store("abc").unwrap();
    assert_eq!(slot.load().unwrap().as_deref(), Some("abc"));
    slot.clear().unwrap();
    slot.clear().unwrap();
    assert_eq!(slot.load().unwrap(), None);
  }

  #[test]
  fn file_slot_persists_across_instances() {
    let path = temp_path("persist");
    let slot = FileTokenSlot::new(&path);
    slot.store("eyJ.jwt").unwrap();

    let reopened = FileTokenSlot::new(&path);
    assert_eq!(reopened.load().unwrap().as_deref(), Some("eyJ.jwt"));

    reopened.clear().unwrap();
    assert!(!path.exists());
    assert_eq!(slot.load().unwrap(), None);
    reopened.clear().unwrap();
  }

  #[test]
  fn file_slot_keeps_foreign_keys() {
    let path = temp_path("foreign");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"theme":"dark","token":"t"}"#).unwrap();

    let slot = FileTokenSlot::new(&path);
    slot.clear().unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("theme"));
    assert!(!raw.contains("\"token\""));
    fs::remove_file(&path).unwrap();
  }
}
