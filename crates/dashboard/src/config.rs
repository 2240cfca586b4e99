//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHRONIFY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SUPABASE_URL` - Base URL of the hosted auth provider
//! - `SUPABASE_ANON_KEY` - Public anon key for the auth provider
//!
//! ## Optional
//! - `CHRONIFY_HOST` - Bind address (default: 127.0.0.1)
//! - `CHRONIFY_PORT` - Listen port (default: 3001)
//! - `CHRONIFY_BASE_URL` - Public URL of the dashboard (default: <http://localhost:3001>)
//! - `CHRONIFY_DEV_MODE` / `DEV_MODE` - `true` skips login and acts as `test@test.com`
//! - `CHRONIFY_LOG_JSON` - Emit JSON logs instead of text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (TLS)
//! - `CHRONIFY_TLS_CERT` - PEM-encoded certificate chain
//! - `CHRONIFY_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the dashboard
    pub base_url: String,
    /// Auth provider endpoint and key
    pub auth: AuthProviderConfig,
    /// Bypass login and act as the fixed development identity
    pub dev_mode: bool,
    /// Emit JSON logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Auth provider configuration.
///
/// Implements `Debug` manually to redact the anon key.
#[derive(Clone)]
pub struct AuthProviderConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: Url,
    /// Anon (public) API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for AuthProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProviderConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl AuthProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url: Url = require_env("SUPABASE_URL")?
            .parse()
            .map_err(|e| invalid("SUPABASE_URL", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "SUPABASE_URL",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(Self {
            url,
            anon_key: get_validated_secret("SUPABASE_ANON_KEY")?,
        })
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (env_var("CHRONIFY_TLS_CERT"), env_var("CHRONIFY_TLS_KEY")) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(invalid(
                "CHRONIFY_TLS_*",
                "CHRONIFY_TLS_CERT and CHRONIFY_TLS_KEY must be set together",
            )),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the environment, reading `.env` first if it
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the anon key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_database_url("CHRONIFY_DATABASE_URL")?,
            host: parse_env("CHRONIFY_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_env("CHRONIFY_PORT", 3001)?,
            base_url: env_var("CHRONIFY_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3001".to_string()),
            auth: AuthProviderConfig::from_env()?,
            dev_mode: get_flag("CHRONIFY_DEV_MODE")? || get_flag("DEV_MODE")?,
            log_json: get_flag("CHRONIFY_LOG_JSON")?,
            sentry_dsn: env_var("SENTRY_DSN"),
            sentry_environment: env_var("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
            tls: TlsConfig::from_env()?,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the dashboard is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Read only the database URL, for tools that need no other settings.
///
/// # Errors
///
/// Returns an error if neither `CHRONIFY_DATABASE_URL` nor `DATABASE_URL`
/// is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url("CHRONIFY_DATABASE_URL")
}

// =============================================================================
// Environment access
// =============================================================================

/// A set, non-empty variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    env_var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

/// `key` parsed as `T`, or `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key).map_or(Ok(default), |raw| raw.trim().parse().map_err(|e| invalid(key, e)))
}

/// A sample rate between 0 and 1.
fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(invalid(key, format!("{rate} is outside 0.0..=1.0")))
    }
}

/// The named URL, falling back to the conventional `DATABASE_URL`.
fn get_database_url(key: &str) -> Result<SecretString, ConfigError> {
    env_var(key)
        .or_else(|| env_var("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read a boolean flag; unset means `false`.
fn get_flag(key: &str) -> Result<bool, ConfigError> {
    env_var(key).map_or(Ok(false), |value| parse_flag(key, &value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(key, format!("expected true or false, got '{other}'"))),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the provider dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = require_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> DashboardConfig {
        DashboardConfig {
            database_url: SecretString::from("postgres://localhost/chronify"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: base_url.to_string(),
            auth: AuthProviderConfig {
                url: Url::parse("https://abc.supabase.co").unwrap(),
                anon_key: SecretString::from("eyJhbGciOiJIUzI1NiJ9.k3Yq"),
            },
            dev_mode: false,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            tls: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-anon-key", "SUPABASE_ANON_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "SUPABASE_ANON_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_jwt_like_key() {
        let key = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJyb2xlIjoiYW5vbiJ9.Qm9vN2tZ";
        assert!(validate_secret_strength(key, "SUPABASE_ANON_KEY").is_ok());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("DEV_MODE", "true").unwrap());
        assert!(parse_flag("DEV_MODE", " TRUE ").unwrap());
        assert!(parse_flag("DEV_MODE", "1").unwrap());
        assert!(!parse_flag("DEV_MODE", "false").unwrap());
        assert!(!parse_flag("DEV_MODE", "").unwrap());
        assert!(parse_flag("DEV_MODE", "maybe").is_err());
    }

    #[test]
    fn test_parse_env_default_and_error() {
        assert_eq!(
            parse_env::<u16>("CHRONIFY_TEST_UNSET_PORT", 3001).unwrap(),
            3001
        );
        assert!(matches!(
            "70000".parse::<u16>().map_err(|e| invalid("CHRONIFY_PORT", e)),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_socket_addr() {
        let config = config("http://localhost:3001");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
    }

    #[test]
    fn test_is_https() {
        assert!(!config("http://localhost:3001").is_https());
        assert!(config("https://inventory.example.com").is_https());
    }

    #[test]
    fn test_debug_redacts_anon_key() {
        let debug = format!("{:?}", config("http://localhost:3001").auth);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("eyJhbGci"));
    }
}
