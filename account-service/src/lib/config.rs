use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use auth::CapabilityError;
use auth::CapabilityRegistry;
use auth::Clock;
use auth::CodeGenerator;
use auth::CodeGeneratorError;
use auth::HashCost;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenCodec;
use auth::TokenError;
use auth::TokenSettings;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::authentication::models::AuthComponents;
use crate::domain::code::models::CodeSettings;

/// Shortest accepted HS256 signing secret, in bytes.
const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub codes: CodesConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    pub roles: RolesConfig,
    pub janitor: JanitorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CodesConfig {
    pub alphabet: String,
    pub length: usize,
    pub activation_window_hours: i64,
    pub reset_window_hours: i64,
}

/// Argon2id cost. Missing fields fall back to the library defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    HashCost::default().memory_kib
}

fn default_iterations() -> u32 {
    HashCost::default().iterations
}

fn default_parallelism() -> u32 {
    HashCost::default().parallelism
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RolesConfig {
    pub default_role: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JanitorConfig {
    pub interval_seconds: u64,
}

/// Error for configuration values that cannot become domain settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("JWT secret must be at least {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("Invalid token lifetimes: {0}")]
    Token(#[from] TokenError),

    #[error("Invalid code settings: {0}")]
    Codes(#[from] CodeGeneratorError),

    #[error("Code windows must be positive")]
    CodeWindow,

    #[error("Invalid password cost: {0}")]
    Password(#[from] PasswordError),

    #[error("Invalid default role: {0}")]
    Role(#[from] CapabilityError),

    #[error("Janitor interval must be positive")]
    JanitorInterval,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
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
            // Example: CODES__RESET_WINDOW_HOURS=1 overrides codes.reset_window_hours
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    pub fn token_settings(&self) -> Result<TokenSettings, SettingsError> {
        Ok(TokenSettings::new(
            Duration::minutes(self.jwt.access_ttl_minutes),
            Duration::hours(self.jwt.refresh_ttl_hours),
        )?)
    }

    pub fn code_settings(&self) -> Result<CodeSettings, SettingsError> {
        if self.codes.activation_window_hours <= 0 || self.codes.reset_window_hours <= 0 {
            return Err(SettingsError::CodeWindow);
        }

        Ok(CodeSettings {
            generator: Arc::new(CodeGenerator::new(&self.codes.alphabet, self.codes.length)?),
            activation_window: Duration::hours(self.codes.activation_window_hours),
            reset_window: Duration::hours(self.codes.reset_window_hours),
        })
    }

    pub fn hash_cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.password.memory_kib,
            iterations: self.password.iterations,
            parallelism: self.password.parallelism,
        }
    }

    pub fn default_role(&self) -> Result<Role, SettingsError> {
        Ok(Role::from_str(&self.roles.default_role)?)
    }

    pub fn janitor_interval(&self) -> Result<StdDuration, SettingsError> {
        if self.janitor.interval_seconds == 0 {
            return Err(SettingsError::JanitorInterval);
        }
        Ok(StdDuration::from_secs(self.janitor.interval_seconds))
    }

    /// Turn the loaded values into the immutable pieces the authentication
    /// service is built from. Fails on the first invalid value.
    pub fn build_components(&self, clock: Arc<dyn Clock>) -> Result<AuthComponents, SettingsError> {
        let secret = self.jwt.secret.expose_secret().as_bytes();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(SettingsError::WeakSecret {
                min: MIN_SECRET_BYTES,
                actual: secret.len(),
            });
        }

        let codec = TokenCodec::new(
            secret,
            Arc::new(CapabilityRegistry::new()),
            self.token_settings()?,
            clock.clone(),
        );

        Ok(AuthComponents {
            codec: Arc::new(codec),
            hasher: PasswordHasher::with_cost(self.hash_cost())?,
            codes: self.code_settings()?,
            default_role: self.default_role()?,
            clock,
        })
    }
}
