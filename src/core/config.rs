//! Runtime configuration: `quorum.toml` in the working directory (all
//! sections optional), with provider API keys overridable via the standard
//! environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 17917;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub providers: ProviderKeys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_API_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderKeys {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = PathBuf::from("quorum.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// The configured database path, or `<data dir>/quorum/quorum.db`.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.db_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quorum")
            .join("quorum.db")
    }

    /// API key for a provider id: environment variable first, config second.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        let (env_var, from_file) = match provider {
            "openai" => ("OPENAI_API_KEY", &self.providers.openai_api_key),
            "anthropic" => ("ANTHROPIC_API_KEY", &self.providers.anthropic_api_key),
            "google" => ("GOOGLE_AI_API_KEY", &self.providers.google_api_key),
            _ => return None,
        };
        std::env::var(env_var)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| from_file.clone())
    }
}
