//! Configuration management for chatmem.
//!
//! All chatmem components share one configuration file at `~/.chatmem/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (`CHATMEM_*` prefix, plus a few well-known names)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `CHATMEM_REDIS_HOST` → redis.host
//! - `CHATMEM_REDIS_PORT` → redis.port
//! - `CHATMEM_REDIS_DB` → redis.db
//! - `CHATMEM_MAX_MESSAGES` → memory.max_messages
//! - `CHATMEM_DISPLAY_WINDOW` → memory.display_window
//! - `QDRANT_URL` → search.qdrant_url
//! - `EMBEDDING_API_KEY` (fallback `OPENAI_API_KEY`) → search.embedding.api_key
//! - `CHATMEM_LOG_LEVEL` → observability.log_level
//! - `CHATMEM_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".chatmem"),
        |dirs| dirs.home_dir().join(".chatmem"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Redis connection for short-term session memory
    #[serde(default)]
    pub redis: RedisConfig,

    /// Session memory windows
    #[serde(default)]
    pub memory: MemoryConfig,

    /// FAQ hybrid search
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration (default path or `path`) and apply environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Numeric values that fail to parse are skipped with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CHATMEM_REDIS_HOST") {
            self.redis.host = host;
        }
        if let Some(port) = parse_override(&lookup, "CHATMEM_REDIS_PORT") {
            self.redis.port = port;
        }
        if let Some(db) = parse_override(&lookup, "CHATMEM_REDIS_DB") {
            self.redis.db = db;
        }

        if let Some(max) = parse_override(&lookup, "CHATMEM_MAX_MESSAGES") {
            self.memory.max_messages = max;
        }
        if let Some(window) = parse_override(&lookup, "CHATMEM_DISPLAY_WINDOW") {
            self.memory.display_window = window;
        }

        if let Some(url) = lookup("QDRANT_URL") {
            self.search.qdrant_url = url;
        }
        if let Some(key) = lookup("EMBEDDING_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.search.embedding.api_key = Some(key);
        }

        if let Some(level) = lookup("CHATMEM_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("CHATMEM_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

fn parse_override<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

// ============================================================================
// Redis
// ============================================================================

/// Redis connection settings for the session list store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis host
    #[serde(default = "default_redis_host")]
    pub host: String,

    /// Redis port
    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Logical database index
    #[serde(default)]
    pub db: i64,

    /// Optional password
    #[serde(default)]
    pub password: Option<String>,

    /// Prefix prepended to every session key
    #[serde(default)]
    pub key_prefix: String,
}

impl RedisConfig {
    /// `host:port/db`, for log and error messages. Never includes the password.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
            password: None,
            key_prefix: String::new(),
        }
    }
}

fn default_redis_host() -> String {
    "localhost".into()
}

fn default_redis_port() -> u16 {
    6379
}

// ============================================================================
// Memory windows
// ============================================================================

/// Default retention window (records kept per session).
pub const DEFAULT_MAX_MESSAGES: usize = 15;

/// Default display window (records rendered into the prompt).
pub const DEFAULT_DISPLAY_WINDOW: usize = 8;

/// Short-term memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of records retained per session
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Number of most recent records rendered into the context.
    /// Must not exceed `max_messages`.
    #[serde(default = "default_display_window")]
    pub display_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_display_window() -> usize {
    DEFAULT_DISPLAY_WINDOW
}

// ============================================================================
// Search
// ============================================================================

/// FAQ hybrid search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Qdrant server URL (gRPC port)
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Collection holding the FAQ points
    #[serde(default = "default_collection")]
    pub collection: String,

    /// SQLite database used for the keyword (FTS5) index. `~` is expanded.
    #[serde(default = "default_keyword_db_path")]
    pub keyword_db_path: String,

    /// Weight of the dense (semantic) leg in fusion
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    /// Weight of the keyword (BM25) leg in fusion
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f32,

    /// Results returned when the caller does not ask for a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Embedding provider
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl SearchConfig {
    /// Keyword database path with `~` and environment variables expanded.
    pub fn keyword_db_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::full(&self.keyword_db_path).map_or_else(
            |_| self.keyword_db_path.clone(),
            |expanded| expanded.into_owned(),
        ))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            keyword_db_path: default_keyword_db_path(),
            vector_weight: default_vector_weight(),
            keyword_weight: default_keyword_weight(),
            default_limit: default_limit(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

fn default_collection() -> String {
    "faq".into()
}

fn default_keyword_db_path() -> String {
    "~/.chatmem/faq.db".into()
}

fn default_vector_weight() -> f32 {
    0.7
}

fn default_keyword_weight() -> f32 {
    0.3
}

fn default_limit() -> usize {
    5
}

/// OpenAI-compatible embedding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL; `/v1/embeddings` is appended
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// Model name sent with each request
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Bearer token (optional for local servers)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Vector dimensions produced by the model
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            api_key: None,
            dimensions: default_embedding_dimensions(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

fn default_embedding_endpoint() -> String {
    "http://localhost:8080".into()
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".into()
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_embedding_timeout() -> u64 {
    30
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
