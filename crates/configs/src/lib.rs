use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_run_migrations() -> bool { true }

/// Key material and lifetime for access tokens.
///
/// Both keys are base64-encoded PEM documents: the RS256 private key used for
/// signing and its public counterpart used for verification.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token_secret: String,
    #[serde(default)]
    pub public_access_token_secret: String,
    #[serde(default)]
    pub access_token_life: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Parse an access-token lifetime: bare seconds (`"3600"`) or a humantime
/// duration (`"1h"`, `"15m"`, `"7d"`).
pub fn parse_token_lifetime(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("auth.access_token_life is empty"));
    }
    let lifetime = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(raw)
            .with_context(|| format!("auth.access_token_life `{raw}` is not a duration"))?,
    };
    if lifetime.is_zero() {
        return Err(anyhow!("auth.access_token_life must be greater than zero"));
    }
    Ok(lifetime)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`) when present, fill blanks from the
    /// process environment, and validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// [`load_and_validate`](Self::load_and_validate) with an explicit file and
    /// variable source. A missing file means defaults.
    pub fn load_with<F>(path: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = if Path::new(path).exists() {
            load_from_file(path).with_context(|| format!("reading {path}"))?
        } else {
            AppConfig::default()
        };
        cfg.normalize_with(lookup);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fill values the file left empty from `lookup` (normally the environment).
    /// `SERVER_HOST` and `SERVER_PORT` override the file when set.
    pub fn normalize_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize_with(&lookup);
        self.database.normalize_with(&lookup);
        self.auth.normalize_with(&lookup);
        self.cors.normalize_with(&lookup);
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.cors.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if let Some(host) = lookup("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => {
                self.worker_threads = lookup("TOKIO_WORKER_THREADS")
                    .and_then(|v| v.parse::<usize>().ok())
                    .filter(|w| *w > 0)
                    .or(Some(4));
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn normalize_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if self.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn normalize_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        fill(&mut self.access_token_secret, lookup("ACCESS_TOKEN_SECRET"));
        fill(&mut self.public_access_token_secret, lookup("PUBLIC_ACCESS_TOKEN_SECRET"));
        fill(&mut self.access_token_life, lookup("ACCESS_TOKEN_LIFE"));
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token_secret.trim().is_empty() {
            return Err(anyhow!("auth.access_token_secret is empty; set ACCESS_TOKEN_SECRET"));
        }
        if self.public_access_token_secret.trim().is_empty() {
            return Err(anyhow!(
                "auth.public_access_token_secret is empty; set PUBLIC_ACCESS_TOKEN_SECRET"
            ));
        }
        self.token_lifetime()?;
        Ok(())
    }

    pub fn token_lifetime(&self) -> Result<Duration> {
        parse_token_lifetime(&self.access_token_life)
    }
}

impl CorsConfig {
    fn normalize_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if !self.allowed_origins.is_empty() {
            return;
        }
        if let Some(raw) = lookup("ALLOWED_ORIGINS") {
            self.allowed_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    /// Origins are matched exactly, so `*` and anything that cannot be sent
    /// back as a header value are rejected.
    pub fn validate(&self) -> Result<()> {
        for origin in &self.allowed_origins {
            if origin.trim() == "*" {
                return Err(anyhow!("cors.allowed_origins cannot contain `*`; list origins explicitly"));
            }
            if origin.trim().is_empty() || !origin.bytes().all(is_header_byte) {
                return Err(anyhow!("cors origin `{}` is not a valid header value", origin.escape_debug()));
            }
        }
        Ok(())
    }
}

fn is_header_byte(b: u8) -> bool {
    (b >= 0x20 && b != 0x7f) || b == b'\t'
}

fn fill(slot: &mut String, value: Option<String>) {
    if slot.trim().is_empty() {
        if let Some(v) = value {
            *slot = v;
        }
    }
}
