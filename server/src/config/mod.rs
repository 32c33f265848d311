use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_MINUTES: i64 = 30;
/// One year.
const MAX_TOKEN_MINUTES: i64 = 60 * 24 * 365;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEV_JWT_SECRET: &str = "development-only-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub environment: Environment,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("RUST_ENV") {
            Some(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        };

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::Missing("JWT_SECRET"))
            }
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let access_token_minutes = parse_or(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            Some(DEFAULT_TOKEN_MINUTES),
        )?;
        if !(1..=MAX_TOKEN_MINUTES).contains(&access_token_minutes) {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: access_token_minutes.to_string(),
            });
        }

        Ok(Self {
            database_url,
            bind_addr: parse_or(
                &lookup,
                "BIND_ADDR",
                DEFAULT_BIND_ADDR.parse::<SocketAddr>().ok(),
            )?,
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                Some(DEFAULT_MAX_CONNECTIONS),
            )?,
            jwt_secret,
            access_token_minutes,
            environment,
            cors_allowed_origins,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => default.ok_or(ConfigError::Missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/events")]).unwrap();
        assert_eq!(
            config.bind_addr,
            "0.0.0.0:3001".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.access_token_minutes, 30);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let result = config(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("RUST_ENV", "Production"),
        ]);
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));

        let config = config(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("RUST_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let result = config(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                ..
            })
        ));
    }

    #[test]
    fn test_token_lifetime_must_be_positive() {
        for minutes in ["0", "-5"] {
            let result = config(&[
                ("DATABASE_URL", "postgres://db/events"),
                ("ACCESS_TOKEN_EXPIRE_MINUTES", minutes),
            ]);
            assert!(
                matches!(
                    result,
                    Err(ConfigError::Invalid {
                        key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                        ..
                    })
                ),
                "{minutes} should be rejected"
            );
        }
    }

    #[test]
    fn test_token_lifetime_has_an_upper_bound() {
        let result = config(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "140000000000000"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                ..
            })
        ));

        let config = config(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "525600"),
        ])
        .unwrap();
        assert_eq!(config.access_token_minutes, MAX_TOKEN_MINUTES);
    }

    #[test]
    fn test_origins_are_trimmed() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("CORS_ALLOWED_ORIGINS", " https://a.example , ,https://b.example"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}
