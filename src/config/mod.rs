use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub paging: PagingConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent the server falls back to the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PagingConfig {
    pub default_size: u32,
    pub max_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub realm: String,
    pub required_role: String,
    pub bcrypt_cost: u32,
    pub users: Vec<UserSpec>,
}

/// A user entry as configured. `password` is either plaintext or a bcrypt hash.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSpec {
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl std::fmt::Debug for UserSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSpec")
            .field("username", &self.username)
            .field("password", &"***")
            .field("roles", &self.roles)
            .finish()
    }
}

impl UserSpec {
    pub fn new(username: &str, password: &str, roles: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }
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
        // Server overrides
        if let Ok(v) = env::var("CASHCARD_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("CASHCARD_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Paging overrides
        if let Ok(v) = env::var("PAGING_DEFAULT_SIZE") {
            self.paging.default_size = v.parse().unwrap_or(self.paging.default_size);
        }
        if let Ok(v) = env::var("PAGING_MAX_SIZE") {
            self.paging.max_size = v.parse().unwrap_or(self.paging.max_size);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_REALM") {
            self.security.realm = v;
        }
        if let Ok(v) = env::var("SECURITY_REQUIRED_ROLE") {
            self.security.required_role = v;
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("CASHCARD_USERS") {
            self.security.users = parse_users(&v);
        }

        self
    }

    /// Page size settings must stay usable even when overridden with nonsense
    pub fn paging(&self) -> PagingConfig {
        let max_size = self.paging.max_size.max(1);
        PagingConfig {
            default_size: self.paging.default_size.clamp(1, max_size),
            max_size,
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            paging: PagingConfig {
                default_size: 20,
                max_size: 2000,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                realm: "Realm".to_string(),
                required_role: "CARD-OWNER".to_string(),
                bcrypt_cost: 4,
                users: vec![
                    UserSpec::new("sarah1", "abc123", &["CARD-OWNER"]),
                    UserSpec::new("hank-owns-no-cards", "qrs456", &["NON-OWNER"]),
                    UserSpec::new("kumar2", "xyz789", &["CARD-OWNER"]),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            paging: PagingConfig {
                default_size: 20,
                max_size: 500,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 64 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                realm: "Realm".to_string(),
                required_role: "CARD-OWNER".to_string(),
                bcrypt_cost: bcrypt::DEFAULT_COST,
                users: Vec::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            paging: PagingConfig {
                default_size: 20,
                max_size: 100,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 16 * 1024,
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
                realm: "Realm".to_string(),
                required_role: "CARD-OWNER".to_string(),
                bcrypt_cost: bcrypt::DEFAULT_COST,
                users: Vec::new(),
            },
        }
    }
}

/// Parse `name:password:ROLE1|ROLE2,name2:password2:ROLE` into user entries.
/// Malformed entries are skipped with a warning.
pub fn parse_users(raw: &str) -> Vec<UserSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let username = parts.next().map(str::trim).unwrap_or_default();
            let password = parts.next().unwrap_or_default();
            let roles = parts.next().unwrap_or_default();
            if username.is_empty() || password.is_empty() {
                tracing::warn!("Ignoring malformed CASHCARD_USERS entry for '{}'", username);
                return None;
            }
            Some(UserSpec {
                username: username.to_string(),
                password: password.to_string(),
                roles: roles
                    .split('|')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
