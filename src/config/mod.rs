use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Placeholder secret shipped in sample `.env` files; only tolerated in development.
pub const PLACEHOLDER_SECRET: &str = "changethis";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    /// Bounded reconnect loop at startup: attempts before giving up.
    pub connect_max_attempts: u32,
    /// Fixed wait between reconnect attempts.
    pub connect_retry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub jwt_expiry_minutes: i64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub first_superuser: Option<String>,
    #[serde(skip_serializing)]
    pub first_superuser_password: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set")]
    MissingSecret,

    #[error("SECRET_KEY is still \"{PLACEHOLDER_SECRET}\"; change it outside development")]
    PlaceholderSecret,

    #[error("DATABASE_URL must be set when DATABASE_BACKEND=postgres")]
    MissingDatabaseUrl,

    #[error("API_DEFAULT_PAGE_SIZE ({default}) exceeds API_MAX_PAGE_SIZE ({max})")]
    PageSize { default: u64, max: u64 },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" | "mem" => StoreBackend::Memory,
                _ => StoreBackend::Postgres,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_MAX_ATTEMPTS") {
            self.database.connect_max_attempts =
                v.parse().unwrap_or(self.database.connect_max_attempts);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_RETRY_SECS") {
            self.database.connect_retry_secs =
                v.parse().unwrap_or(self.database.connect_retry_secs);
        }

        // API overrides
        if let Some(v) = env::var("ITEMS_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.secret_key = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes =
                v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Bootstrap overrides
        if let Ok(v) = env::var("FIRST_SUPERUSER") {
            self.bootstrap.first_superuser = Some(v);
        }
        if let Ok(v) = env::var("FIRST_SUPERUSER_PASSWORD") {
            self.bootstrap.first_superuser_password = Some(v);
        }

        self
    }

    /// Check the invariants the server refuses to start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.security.secret_key == PLACEHOLDER_SECRET {
            if self.is_development() {
                tracing::warn!(
                    "SECRET_KEY is \"{}\"; for security, change it before deploying",
                    PLACEHOLDER_SECRET
                );
            } else {
                return Err(ConfigError::PlaceholderSecret);
            }
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.api.default_page_size > self.api.max_page_size {
            return Err(ConfigError::PageSize {
                default: self.api.default_page_size,
                max: self.api.max_page_size,
            });
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }

    /// Configuration for the in-memory store, used by tests and local tinkering.
    pub fn for_memory_store(secret_key: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.database.backend = StoreBackend::Memory;
        config.security.secret_key = secret_key.into();
        config
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connect_max_attempts: 60 * 5, // 5 minutes
                connect_retry_secs: 1,
            },
            api: ApiConfig {
                port: 8000,
                default_page_size: 100,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                secret_key: PLACEHOLDER_SECRET.to_string(),
                jwt_expiry_minutes: 60 * 24 * 8, // 8 days
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            bootstrap: BootstrapConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connect_max_attempts: 60 * 5,
                connect_retry_secs: 1,
            },
            api: ApiConfig {
                port: 8000,
                default_page_size: 100,
                max_page_size: 500,
            },
            security: SecurityConfig {
                secret_key: String::new(),
                jwt_expiry_minutes: 60 * 24,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            bootstrap: BootstrapConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 50,
                connect_max_attempts: 60 * 5,
                connect_retry_secs: 1,
            },
            api: ApiConfig {
                port: 8000,
                default_page_size: 100,
                max_page_size: 100,
            },
            security: SecurityConfig {
                secret_key: String::new(),
                jwt_expiry_minutes: 60 * 4,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            bootstrap: BootstrapConfig::default(),
        }
    }
}
