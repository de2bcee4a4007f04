/// Configuration management for the Tapcard directory service
use crate::db::models::PublicTheme;
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub directory: DirectoryConfig,
    pub seed: Option<SeedConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Base URL under which public card pages are served; QR payloads
    /// point at `<public_base_url>/<username>`.
    pub public_base_url: String,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub directory_db: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Profile directory behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub default_theme: PublicTheme,
    /// When true, the public resolver answers NotFound for DISABLED
    /// profiles instead of returning the record with its status.
    pub hide_disabled: bool,
}

/// Startup admin seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let host = env::var("TAPCARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("TAPCARD_PORT")
            .unwrap_or_else(|_| "5050".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;

        let public_base_url = env::var("TAPCARD_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let version = env::var("TAPCARD_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("TAPCARD_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let directory_db = env::var("TAPCARD_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("directory.sqlite"));

        let jwt_secret = env::var("TAPCARD_JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT secret required".to_string()))?;
        let token_ttl_hours = env::var("TAPCARD_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let default_theme = env::var("TAPCARD_DEFAULT_THEME")
            .ok()
            .map(|s| PublicTheme::from_str(&s))
            .transpose()?
            .unwrap_or(PublicTheme::DarkMinimal);
        let hide_disabled = env::var("TAPCARD_PUBLIC_HIDE_DISABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let seed = match (
            env::var("TAPCARD_SEED_ADMIN_EMAIL"),
            env::var("TAPCARD_SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(admin_email), Ok(admin_password)) => Some(SeedConfig {
                admin_email,
                admin_password,
            }),
            _ => None,
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                host,
                port,
                public_base_url,
                version,
            },
            storage: StorageConfig {
                data_directory,
                directory_db,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            directory: DirectoryConfig {
                default_theme,
                hide_disabled,
            },
            seed,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Fixed configuration for unit tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        ServerConfig {
            service: ServiceConfig {
                host: "localhost".to_string(),
                port: 0,
                public_base_url: "https://cards.test".to_string(),
                version: "0.0.0".to_string(),
            },
            storage: StorageConfig {
                data_directory: ":memory:".into(),
                directory_db: ":memory:".into(),
            },
            authentication: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
                token_ttl_hours: 24,
            },
            directory: DirectoryConfig {
                default_theme: PublicTheme::DarkMinimal,
                hide_disabled: false,
            },
            seed: None,
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.host.is_empty() {
            return Err(ApiError::Validation("Host cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.token_ttl_hours <= 0 {
            return Err(ApiError::Validation(
                "Token TTL must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
