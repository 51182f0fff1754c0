// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into an
//! immutable [`AppConfig`]. Nothing mutates it afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `auth.redb`; unset keeps everything in memory | unset |
//! | `JWT_SECRET` | HMAC key for access tokens, at least 32 bytes | Required |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime, at most ten years | `3600` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime, at most ten years | `600` |
//! | `REFRESH_SWEEP_INTERVAL_SECS` | Expired refresh token sweep period, `0` disables | `60` |
//! | `TLS_CERT_PATH` | PEM certificate chain; HTTPS when set with `TLS_KEY_PATH` | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `SEED_ADMIN_USERNAME` | Admin user created at startup if absent | unset |
//! | `SEED_ADMIN_PASSWORD` | Password for the seeded admin | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable name for the bind host.
pub const HOST_ENV: &str = "HOST";
/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable name for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
/// Environment variable name for the access token signing key.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const REFRESH_SWEEP_INTERVAL_ENV: &str = "REFRESH_SWEEP_INTERVAL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const SEED_ADMIN_USERNAME_ENV: &str = "SEED_ADMIN_USERNAME";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 600;
const DEFAULT_REFRESH_SWEEP_INTERVAL_SECS: u64 = 60;

/// Longest accepted token lifetime (ten years).
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Shortest accepted HMAC key.
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{name} has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
    #[error("{JWT_SECRET_ENV} must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together")]
    PartialTls,
    #[error("{SEED_ADMIN_USERNAME_ENV} and {SEED_ADMIN_PASSWORD_ENV} must be set together")]
    PartialSeedAdmin,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(()),
        }
    }
}

/// Token signing and lifetime settings.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Admin account ensured at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` selects the in-memory store
    pub data_dir: Option<PathBuf>,
    pub tokens: TokenSettings,
    /// `None` disables the background sweep
    pub sweep_interval: Option<Duration>,
    pub tls: Option<TlsSettings>,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;

        let secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let access_ttl = token_ttl(&get, ACCESS_TOKEN_TTL_ENV, DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_ttl = token_ttl(&get, REFRESH_TOKEN_TTL_ENV, DEFAULT_REFRESH_TOKEN_TTL_SECS)?;

        let sweep_secs = parse_or(
            &get,
            REFRESH_SWEEP_INTERVAL_ENV,
            DEFAULT_REFRESH_SWEEP_INTERVAL_SECS,
        )?;
        let sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsSettings {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let seed_admin = match (get(SEED_ADMIN_USERNAME_ENV), get(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(username), Some(password)) => Some(SeedAdmin { username, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialSeedAdmin),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                value,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from),
            tokens: TokenSettings {
                secret: secret.into_bytes(),
                access_ttl,
                refresh_ttl,
            },
            sweep_interval,
            tls,
            seed_admin,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            name: HOST_ENV,
            value: raw,
        })
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn positive_secs(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match parse_or(get, name, default)? {
        0 => Err(ConfigError::NotPositive(name)),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn token_ttl(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let ttl = positive_secs(get, name, default)?;
    if ttl.as_secs() > MAX_TOKEN_TTL_SECS {
        return Err(ConfigError::Invalid {
            name,
            value: ttl.as_secs().to_string(),
        });
    }
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_secret() {
        let config = load(&[(JWT_SECRET_ENV, SECRET)]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.tokens.access_ttl, Duration::from_secs(3600));
        assert_eq!(config.tokens.refresh_ttl, Duration::from_secs(600));
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.tls, None);
        assert_eq!(config.seed_admin, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    fn secret_is_required_and_long_enough() {
        assert_eq!(load(&[]), Err(ConfigError::Missing(JWT_SECRET_ENV)));
        assert_eq!(
            load(&[(JWT_SECRET_ENV, "short")]),
            Err(ConfigError::SecretTooShort)
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            (JWT_SECRET_ENV, SECRET),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (DATA_DIR_ENV, "/var/lib/auth"),
            (ACCESS_TOKEN_TTL_ENV, "60"),
            (REFRESH_TOKEN_TTL_ENV, "120"),
            (REFRESH_SWEEP_INTERVAL_ENV, "0"),
            (LOG_FORMAT_ENV, "JSON"),
            (SEED_ADMIN_USERNAME_ENV, "admin"),
            (SEED_ADMIN_PASSWORD_ENV, "changeme"),
        ])
        .unwrap();

        assert_eq!(config.bind_address().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/auth")));
        assert_eq!(config.tokens.access_ttl, Duration::from_secs(60));
        assert_eq!(config.tokens.refresh_ttl, Duration::from_secs(120));
        assert_eq!(config.sweep_interval, None);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.seed_admin.unwrap().username, "admin");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[(JWT_SECRET_ENV, SECRET), (PORT_ENV, "http")]),
            Err(ConfigError::Invalid { name: PORT_ENV, .. })
        ));
        assert_eq!(
            load(&[(JWT_SECRET_ENV, SECRET), (ACCESS_TOKEN_TTL_ENV, "0")]),
            Err(ConfigError::NotPositive(ACCESS_TOKEN_TTL_ENV))
        );
        assert!(matches!(
            load(&[(JWT_SECRET_ENV, SECRET), (LOG_FORMAT_ENV, "xml")]),
            Err(ConfigError::Invalid { name: LOG_FORMAT_ENV, .. })
        ));
    }

    #[test]
    fn token_lifetimes_are_capped() {
        let max = MAX_TOKEN_TTL_SECS.to_string();
        let config = load(&[(JWT_SECRET_ENV, SECRET), (REFRESH_TOKEN_TTL_ENV, max.as_str())]).unwrap();
        assert_eq!(config.tokens.refresh_ttl, Duration::from_secs(MAX_TOKEN_TTL_SECS));

        assert_eq!(
            load(&[(JWT_SECRET_ENV, SECRET), (ACCESS_TOKEN_TTL_ENV, "1000000000000000")]),
            Err(ConfigError::Invalid {
                name: ACCESS_TOKEN_TTL_ENV,
                value: "1000000000000000".into(),
            })
        );
        let too_long = (MAX_TOKEN_TTL_SECS + 1).to_string();
        assert!(matches!(
            load(&[(JWT_SECRET_ENV, SECRET), (REFRESH_TOKEN_TTL_ENV, too_long.as_str())]),
            Err(ConfigError::Invalid { name: REFRESH_TOKEN_TTL_ENV, .. })
        ));
    }

    #[test]
    fn paired_settings_must_come_together() {
        assert_eq!(
            load(&[(JWT_SECRET_ENV, SECRET), (TLS_CERT_PATH_ENV, "cert.pem")]),
            Err(ConfigError::PartialTls)
        );
        assert_eq!(
            load(&[(JWT_SECRET_ENV, SECRET), (SEED_ADMIN_PASSWORD_ENV, "pw")]),
            Err(ConfigError::PartialSeedAdmin)
        );

        let config = load(&[
            (JWT_SECRET_ENV, SECRET),
            (TLS_CERT_PATH_ENV, "cert.pem"),
            (TLS_KEY_PATH_ENV, "key.pem"),
        ])
        .unwrap();
        assert_eq!(config.tls.unwrap().key_path, PathBuf::from("key.pem"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[
            (JWT_SECRET_ENV, SECRET),
            (SEED_ADMIN_USERNAME_ENV, "admin"),
            (SEED_ADMIN_PASSWORD_ENV, "hunter2-hunter2"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("hunter2-hunter2"));
    }
}
