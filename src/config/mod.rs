use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use thiserror::Error;
use url::Url;

/// Errors raised while loading startup configuration. All of them are fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid backend URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("SUPABASE_ANON_KEY cannot be used as a header value")]
    InvalidApiKey,

    #[error("Invalid header value for {name}: '{value}'")]
    InvalidHeader { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Url,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Ask the store to echo inserted/updated rows back
    pub return_representation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let raw_url = lookup("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let api_key = lookup("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;
        let url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                value: raw_url,
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let backend = BackendConfig {
            url,
            api_key,
            return_representation: false,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(backend),
            Environment::Staging => Self::staging(backend),
            Environment::Development => Self::development(backend),
        };

        Ok(config.with_overrides(lookup))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("CHALLENGE_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_or_keep("PORT", &v, self.server.port);
        }
        if let Some(v) = lookup("SERVER_BASE_PATH") {
            self.server.base_path = normalize_base_path(&v);
        }

        // Backend overrides
        if let Some(v) = lookup("BACKEND_RETURN_REPRESENTATION") {
            self.backend.return_representation =
                parse_or_keep("BACKEND_RETURN_REPRESENTATION", &v, self.backend.return_representation);
        }

        // CORS overrides
        if let Some(v) = lookup("CORS_ALLOW_ORIGIN") {
            self.cors.allow_origin = v;
        }

        self
    }

    fn development(backend: BackendConfig) -> Self {
        Self {
            environment: Environment::Development,
            backend,
            server: ServerConfig {
                port: 3000,
                base_path: None,
            },
            cors: CorsConfig::with_origin("*"),
        }
    }

    fn staging(backend: BackendConfig) -> Self {
        Self {
            environment: Environment::Staging,
            backend,
            server: ServerConfig {
                port: 8080,
                base_path: None,
            },
            cors: CorsConfig::with_origin("*"),
        }
    }

    fn production(backend: BackendConfig) -> Self {
        Self {
            environment: Environment::Production,
            backend,
            server: ServerConfig {
                port: 8080,
                base_path: Some("/functions/v1".to_string()),
            },
            // Wildcard until the app's deployed origin is known; set CORS_ALLOW_ORIGIN
            cors: CorsConfig::with_origin("*"),
        }
    }
}

impl CorsConfig {
    pub const ALLOW_METHODS: &'static str = "GET, POST, PATCH, DELETE, OPTIONS";
    pub const ALLOW_HEADERS: &'static str = "Content-Type, Authorization, apikey";

    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            allow_origin: origin.into(),
            allow_methods: Self::ALLOW_METHODS.to_string(),
            allow_headers: Self::ALLOW_HEADERS.to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self::with_origin("*")
    }
}

/// "/functions/v1/" -> Some("/functions/v1"), "/" or "" -> None
/// Unparsable values fall back to the current setting, loudly
fn parse_or_keep<T>(name: &str, raw: &str, current: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
{
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(variable = name, value = raw, fallback = ?current, "ignoring unparsable configuration value");
            current
        }
    }
}

fn normalize_base_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}
