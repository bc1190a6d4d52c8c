//! Server configuration read from the environment.
//!
//! Every variable has a default except `AUTH_JWT_SECRET`. Parsing goes through
//! [`AppConfig::from_lookup`] so tests can supply a map instead of touching
//! the process environment.

use std::collections::HashSet;
use std::num::NonZeroU32;
use std::time::Duration;

use axum::http::HeaderValue;
use governor::Quota;
use tracing::{debug, warn};

use memoir_core::defaults;
use memoir_core::{Error, Result};

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
    /// No store; persistence calls fail with `StorageUnavailable`.
    None,
}

/// Global request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u64,
    pub period_secs: u64,
}

impl RateLimitConfig {
    /// Build the `governor` quota, rejecting zero values.
    pub fn quota(&self) -> Result<Quota> {
        let burst = u32::try_from(self.requests)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                Error::Config("RATE_LIMIT_REQUESTS must be between 1 and 2^32-1".to_string())
            })?;
        let quota = Quota::with_period(Duration::from_secs(self.period_secs))
            .ok_or_else(|| Error::Config("RATE_LIMIT_PERIOD_SECS must be non-zero".to_string()))?;
        Ok(quota.allow_burst(burst))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Subjects treated as admin regardless of token roles.
    pub admin_uids: HashSet<String>,
    pub delete_token_ttl: Duration,
    pub allowed_origins: Vec<HeaderValue>,
    /// `None` when rate limiting is disabled.
    pub rate_limit: Option<RateLimitConfig>,
    pub generation_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| defaults::SERVER_HOST.to_string());
        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", v)))?,
            None => defaults::SERVER_PORT,
        };

        let database_url = get("DATABASE_URL");
        let store = match get("MEMOIR_STORE") {
            Some(v) => parse_store_kind(&v)?,
            None if database_url.is_some() => StoreKind::Postgres,
            None => StoreKind::None,
        };
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "MEMOIR_STORE=postgres requires DATABASE_URL".to_string(),
            ));
        }

        let jwt_secret = get("AUTH_JWT_SECRET")
            .ok_or_else(|| Error::Config("AUTH_JWT_SECRET is required".to_string()))?;
        if jwt_secret.len() < defaults::JWT_SECRET_MIN_LEN {
            return Err(Error::Config(format!(
                "AUTH_JWT_SECRET must be at least {} characters",
                defaults::JWT_SECRET_MIN_LEN
            )));
        }

        let admin_uids: HashSet<String> = get("ADMIN_UIDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let delete_token_ttl = Duration::from_secs(parse_u64(
            get("DELETE_TOKEN_TTL_SECS"),
            "DELETE_TOKEN_TTL_SECS",
            defaults::DELETE_TOKEN_TTL_SECS,
        )?);

        let allowed_origins =
            parse_allowed_origins(&get("ALLOWED_ORIGINS").unwrap_or_default());

        let rate_limit_enabled = get("RATE_LIMIT_ENABLED")
            .map(|v| parse_bool(&v))
            .unwrap_or(true);
        let rate_limit = if rate_limit_enabled {
            let config = RateLimitConfig {
                requests: parse_u64(
                    get("RATE_LIMIT_REQUESTS"),
                    "RATE_LIMIT_REQUESTS",
                    defaults::RATE_LIMIT_REQUESTS,
                )?,
                period_secs: parse_u64(
                    get("RATE_LIMIT_PERIOD_SECS"),
                    "RATE_LIMIT_PERIOD_SECS",
                    defaults::RATE_LIMIT_PERIOD_SECS,
                )?,
            };
            config.quota()?;
            Some(config)
        } else {
            None
        };

        let generation_enabled = match get("GENERATION_ENABLED") {
            Some(v) => parse_bool(&v),
            None => get("OPENAI_API_KEY").is_some() || get("OPENAI_BASE_URL").is_some(),
        };

        debug!(
            subsystem = "api",
            component = "config",
            store = ?store,
            admin_uids = admin_uids.len(),
            rate_limited = rate_limit.is_some(),
            generation_enabled,
            "Configuration loaded"
        );

        Ok(Self {
            host,
            port,
            store,
            database_url,
            jwt_secret,
            admin_uids,
            delete_token_ttl,
            allowed_origins,
            rate_limit,
            generation_enabled,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_store_kind(value: &str) -> Result<StoreKind> {
    match value.trim().to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StoreKind::Postgres),
        "memory" => Ok(StoreKind::Memory),
        "none" => Ok(StoreKind::None),
        other => Err(Error::Config(format!(
            "Unknown MEMOIR_STORE '{}', expected postgres, memory or none",
            other
        ))),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_u64(value: Option<String>, key: &str, default: u64) -> Result<u64> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: {}", key, v))),
        None => Ok(default),
    }
}

/// Parse a comma-separated CORS whitelist. Invalid entries are skipped with a
/// warning; an empty list falls back to the local development origin.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    let parsed: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if parsed.is_empty() {
        vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGINS)]
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_secret() {
        let config = config_from(&[("AUTH_JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store, StoreKind::None);
        assert!(config.admin_uids.is_empty());
        assert_eq!(config.delete_token_ttl, Duration::from_secs(300));
        assert_eq!(config.allowed_origins, vec![HeaderValue::from_static("http://localhost:3000")]);
        assert_eq!(
            config.rate_limit,
            Some(RateLimitConfig {
                requests: 100,
                period_secs: 60
            })
        );
        assert!(!config.generation_enabled);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_secret_required_and_length_checked() {
        assert!(matches!(config_from(&[]), Err(Error::Config(_))));
        assert!(matches!(
            config_from(&[("AUTH_JWT_SECRET", "short")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let config = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("DATABASE_URL", "postgres://localhost/memoir"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreKind::Postgres);

        let config = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("DATABASE_URL", "postgres://localhost/memoir"),
            ("MEMOIR_STORE", "memory"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreKind::Memory);
    }

    #[test]
    fn test_postgres_without_url_is_rejected() {
        let result = config_from(&[("AUTH_JWT_SECRET", SECRET), ("MEMOIR_STORE", "postgres")]);
        assert!(matches!(result, Err(Error::Config(_))));
        let result = config_from(&[("AUTH_JWT_SECRET", SECRET), ("MEMOIR_STORE", "mongo")]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_admin_uids_split_and_trimmed() {
        let config = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("ADMIN_UIDS", " alice, ,bob "),
        ])
        .unwrap();
        assert_eq!(config.admin_uids.len(), 2);
        assert!(config.admin_uids.contains("alice"));
        assert!(config.admin_uids.contains("bob"));
    }

    #[test]
    fn test_rate_limit_toggle_and_zero_rejected() {
        let config = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("RATE_LIMIT_ENABLED", "false"),
        ])
        .unwrap();
        assert!(config.rate_limit.is_none());

        let result = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("RATE_LIMIT_REQUESTS", "0"),
        ]);
        assert!(matches!(result, Err(Error::Config(_))));

        let result = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("RATE_LIMIT_PERIOD_SECS", "0"),
        ]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_generation_enabled_by_backend_settings() {
        let config = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ])
        .unwrap();
        assert!(config.generation_enabled);

        let config = config_from(&[
            ("AUTH_JWT_SECRET", SECRET),
            ("OPENAI_API_KEY", "sk-test"),
            ("GENERATION_ENABLED", "false"),
        ])
        .unwrap();
        assert!(!config.generation_enabled);
    }

    #[test]
    fn test_allowed_origins_skip_invalid() {
        let origins = parse_allowed_origins("https://a.example, ,bad\norigin,http://b.example");
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://a.example"),
                HeaderValue::from_static("http://b.example")
            ]
        );
        assert_eq!(parse_allowed_origins("").len(), 1);
    }
}
