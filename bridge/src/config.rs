//! Configuration loading
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. `.sql-bridge.toml` (path from `SQL_BRIDGE_CONFIG`, else found by walking
//!    up from the current directory, else `<config_dir>/sql-bridge/`)
//! 3. Environment variables (`DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASS`,
//!    `DB_PORT`, `OLLAMA_URL`, `OLLAMA_MODEL`)
//!
//! The resulting [`BridgeConfig`] is built once at startup and passed down.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = ".sql-bridge.toml";

/// Find a config file by walking up the directory tree, then checking global config.
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("sql-bridge").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default = "default_db_password")]
    pub password: String,
    /// Namespace scanned during introspection
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Connection attempts before giving up
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    /// Delay between connection attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Inference server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "agentic_db".to_string()
}

fn default_db_user() -> String {
    "admin".to_string()
}

fn default_db_password() -> String {
    "password123".to_string()
}

fn default_namespace() -> String {
    "public".to_string()
}

fn default_connect_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5-coder:3b".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_num_predict() -> u32 {
    250
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            user: default_db_user(),
            password: default_db_password(),
            namespace: default_namespace(),
            connect_attempts: default_connect_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_model(),
            temperature: default_temperature(),
            num_predict: default_num_predict(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl BridgeConfig {
    /// Load config from file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var("SQL_BRIDGE_CONFIG")
            .ok()
            .map(PathBuf::from)
            .or_else(|| find_config_file(CONFIG_FILENAME));

        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading config from: {}", path.display());
                Self::load_from_path(&path)?
            }
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a specific path, without environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASS") {
            self.database.password = password;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = port
                .trim()
                .parse()
                .with_context(|| format!("DB_PORT is not a valid port: {:?}", port))?;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.model = model;
        }
        Ok(())
    }
}
