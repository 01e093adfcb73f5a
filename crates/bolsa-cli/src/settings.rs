//! Layered settings: defaults, then the TOML file, then `BOLSA_*`
//! environment variables, then command-line flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use bolsa_client::{ClientConfig, DEFAULT_BASE_URL};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug, Default)]
#[command(name = "bolsa", version, about = "Terminal client for the Bolsa de Trabajo job board")]
pub struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Base URL of the backend (default: http://localhost:3000).
  #[arg(long, env = "BOLSA_URL")]
  pub url: Option<String>,

  /// Log out after this many seconds without input.
  #[arg(long, value_name = "SECS")]
  pub idle_timeout: Option<u64>,

  /// Directory holding the session token and the log file.
  #[arg(long, value_name = "DIR")]
  pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub base_url:             String,
  pub idle_timeout_secs:    u64,
  pub request_timeout_secs: u64,
  pub state_dir:            PathBuf,
}

impl Settings {
  pub fn load(args: &Args) -> anyhow::Result<Self> {
    let config_path = args
      .config
      .clone()
      .unwrap_or_else(|| config_dir().join("config.toml"));
    Self::load_from(&config_path, args)
  }

  fn load_from(config_path: &Path, args: &Args) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("base_url", DEFAULT_BASE_URL)?
      .set_default("idle_timeout_secs", 600_u64)?
      .set_default("request_timeout_secs", 30_u64)?
      .set_default("state_dir", config_dir().to_string_lossy().into_owned())?
      .add_source(config::File::from(config_path).required(false))
      .add_source(config::Environment::with_prefix("BOLSA"))
      .set_override_option("base_url", args.url.clone())?
      .set_override_option("idle_timeout_secs", args.idle_timeout)?
      .set_override_option(
        "state_dir",
        args
          .state_dir
          .as_ref()
          .map(|p| p.to_string_lossy().into_owned()),
      )?
      .build()
      .with_context(|| format!("failed to read config file {}", config_path.display()))?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    anyhow::ensure!(settings.idle_timeout_secs > 0, "idle_timeout_secs must be at least 1");
    anyhow::ensure!(settings.request_timeout_secs > 0, "request_timeout_secs must be at least 1");
    settings.state_dir = expand_tilde(&settings.state_dir);
    Ok(settings)
  }

  pub fn idle_timeout(&self) -> Duration { Duration::from_secs(self.idle_timeout_secs) }

  pub fn client_config(&self) -> ClientConfig {
    ClientConfig {
      base_url: self.base_url.clone(),
      timeout:  Duration::from_secs(self.request_timeout_secs),
    }
  }

  pub fn token_path(&self) -> PathBuf { self.state_dir.join("session.json") }

  pub fn log_path(&self) -> PathBuf { self.state_dir.join("bolsa.log") }
}

fn home() -> Option<PathBuf> { std::env::var_os("HOME").map(PathBuf::from) }

fn config_dir() -> PathBuf {
  home()
    .map(|h| h.join(".config").join("bolsa"))
    .unwrap_or_else(|| PathBuf::from(".bolsa"))
}

fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), home()) {
    (Ok(rest), Some(home)) => home.join(rest),
    _ => path.to_path_buf(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_config(name: &str, body: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bolsa-settings-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
  }

  #[test]
  fn defaults_without_a_file() {
    let settings =
      Settings::load_from(Path::new("/nonexistent/bolsa/config.toml"), &Args::default()).unwrap();
    assert_eq!(settings.base_url, "http://localhost:3000");
    assert_eq!(settings.idle_timeout(), Duration::from_secs(600));
    assert_eq!(settings.client_config().timeout, Duration::from_secs(30));
  }

  #[test]
  fn file_then_flags() {
    let path = write_config(
      "layers",
      "base_url = \"https://bolsa.example.org\"\nidle_timeout_secs = 120\nstate_dir = \"/tmp/bolsa-state\"\n",
    );
    let from_file = Settings::load_from(&path, &Args::default()).unwrap();
    assert_eq!(from_file.base_url, "https://bolsa.example.org");
    assert_eq!(from_file.idle_timeout_secs, 120);
    assert_eq!(from_file.token_path(), PathBuf::from("/tmp/bolsa-state/session.json"));

    let args = Args {
      url: Some("http://127.0.0.1:8000".into()),
      idle_timeout: Some(30),
      ..Args::default()
    };
    let overridden = Settings::load_from(&path, &args).unwrap();
    assert_eq!(overridden.base_url, "http://127.0.0.1:8000");
    assert_eq!(overridden.idle_timeout_secs, 30);
    assert_eq!(overridden.state_dir, PathBuf::from("/tmp/bolsa-state"));
  }

  #[test]
  fn zero_timeouts_are_rejected() {
    let path = write_config("zero-idle", "idle_timeout_secs = 0\n");
    let err = Settings::load_from(&path, &Args::default()).unwrap_err();
    assert!(err.to_string().contains("idle_timeout_secs"));

    let path = write_config("zero-request", "request_timeout_secs = 0\n");
    let err = Settings::load_from(&path, &Args::default()).unwrap_err();
    assert!(err.to_string().contains("request_timeout_secs"));

    let args = Args { idle_timeout: Some(0), ..Args::default() };
    let err = Settings::load_from(Path::new("/nonexistent/bolsa/config.toml"), &args).unwrap_err();
    assert!(err.to_string().contains("idle_timeout_secs"));
  }

  #[test]
  fn tilde_is_expanded() {
    let Some(home) = home() else { return };
    assert_eq!(expand_tilde(Path::new("~/x")), home.join("x"));
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
