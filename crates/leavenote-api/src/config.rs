//! Runtime server configuration.
//!
//! Read from a TOML file layered under `LEAVENOTE_*` environment variables,
//! e.g. `LEAVENOTE_PORT=9000` or `LEAVENOTE_AUTH__SECRET=...`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const ENV_PREFIX: &str = "LEAVENOTE";

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("leavenote.db") }

fn default_public_base_url() -> String { "https://leavenote.app".to_owned() }

/// Server configuration, deserialised from `config.toml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// SQLite database file; a leading `~/` is expanded by the binary.
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Origin that share links are built on.
  #[serde(default = "default_public_base_url")]
  pub public_base_url: String,
  pub auth:            AuthSettings,
}

/// How bearer tokens are verified.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AuthSettings {
  /// A fixed table of tokens, stored as SHA-256 digests.
  Static {
    #[serde(default)]
    tokens: Vec<StaticToken>,
  },
  /// HS256-signed JWTs from an external identity provider.
  Jwt {
    secret:   String,
    issuer:   Option<String>,
    audience: Option<String>,
  },
}

/// One entry of the static token table.
#[derive(Debug, Deserialize, Clone)]
pub struct StaticToken {
  /// Lowercase hex SHA-256 of the bearer token (see `leavenote --hash-token`).
  pub token_sha256: String,
  pub subject:      String,
  pub name:         Option<String>,
  pub email:        Option<String>,
}

impl ServerConfig {
  /// Load from `path` (optional; a missing file is not an error) plus the
  /// environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(env_source())
      .build()?
      .try_deserialize()
  }

  /// Load from TOML text plus the environment.
  pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from_str(text, FileFormat::Toml))
      .add_source(env_source())
      .build()?
      .try_deserialize()
  }
}

fn env_source() -> Environment {
  Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true)
}
