use std::env;

use auth::duration::parse_duration_secs;
use auth::duration::DEFAULT_ACCESS_TTL_SECS;
use auth::duration::DEFAULT_REFRESH_TTL_SECS;
use auth::jwt::MIN_SECRET_BYTES;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::otp::models::DEFAULT_TTL_MINUTES;
use crate::domain::session::models::SessionTtls;

/// Longest lifetime accepted for any token, in seconds (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

const ENVIRONMENTS: [&str; 3] = ["development", "test", "production"];

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "session_service=debug,tower_http=debug";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub environment: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub otp: OtpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Empty selects the in-memory stores.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Duration string such as "15m"
    pub access_ttl: Option<String>,
    /// Duration string such as "7d"
    pub refresh_ttl: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CookieConfig {
    /// Only applied in production.
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OtpConfig {
    pub ttl_minutes: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .set_default("environment", run_mode)?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    ///
    /// # Errors
    /// * `Message` - Short signing secret, unknown environment or non-positive OTP lifetime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }
        if !ENVIRONMENTS.contains(&self.environment.as_str()) {
            return Err(ConfigError::Message(format!(
                "environment must be one of {ENVIRONMENTS:?}, got {:?}",
                self.environment
            )));
        }
        if self.otp.ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "otp.ttl_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuse a development-only adapter when running in production.
    ///
    /// # Errors
    /// * `Message` - Environment is production
    pub fn ensure_not_production(&self, adapter: &str) -> Result<(), ConfigError> {
        if self.is_production() {
            return Err(ConfigError::Message(format!(
                "{adapter} is not allowed in production"
            )));
        }
        Ok(())
    }

    /// Whether the PostgreSQL stores are configured.
    pub fn uses_database(&self) -> bool {
        !self.database.url.trim().is_empty()
    }

    /// Token lifetimes parsed from the configured duration strings.
    ///
    /// Unparsable or absurdly long values fall back to the defaults.
    pub fn session_ttls(&self) -> SessionTtls {
        SessionTtls {
            access: ttl_secs(self.jwt.access_ttl.as_deref(), DEFAULT_ACCESS_TTL_SECS),
            refresh: ttl_secs(self.jwt.refresh_ttl.as_deref(), DEFAULT_REFRESH_TTL_SECS),
        }
    }

    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.otp.ttl_minutes)
    }

    /// In-memory, development-mode configuration with a valid secret.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            environment: "test".to_string(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: default_max_connections(),
            },
            server: ServerConfig { http_port: 0 },
            jwt: JwtConfig {
                secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".to_string(),
                access_ttl: None,
                refresh_ttl: None,
            },
            cookie: CookieConfig::default(),
            otp: OtpConfig::default(),
        }
    }
}

fn ttl_secs(input: Option<&str>, fallback: u64) -> i64 {
    let mut secs = parse_duration_secs(input, fallback);
    if secs == 0 || secs > MAX_TTL_SECS {
        tracing::warn!(value = ?input, fallback_secs = fallback, "Token lifetime out of range, using fallback");
        secs = fallback;
    }
    // Bounded by MAX_TTL_SECS, always fits.
    secs as i64
}
