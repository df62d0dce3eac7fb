use dotenv::dotenv;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_JWT_EXPIRES_IN: &str = "24h";
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_POOL_MAX_SIZE: usize = 16;
const DEFAULT_DB_QUERY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_PER_SECOND: u64 = 10;
const DEFAULT_RATE_LIMIT_BURST: u32 = 20;
const DEFAULT_LOG_CONFIG: &str = "./log-config.yml";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub server_host: String,
    pub port: u16,
    pub db_pool_max_size: usize,
    pub db_query_timeout: Duration,
    pub trusted_reverse_proxy_ip: IpAddr,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub log_config: String,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let expires_raw =
            optional("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string());
        let jwt_expires_in = parse_duration(&expires_raw).ok_or(ConfigError::Invalid {
            key: "JWT_EXPIRES_IN",
            value: expires_raw.clone(),
        })?;

        let db_query_timeout_secs: u64 = parse_or(
            optional("DB_QUERY_TIMEOUT_SECS"),
            "DB_QUERY_TIMEOUT_SECS",
            DEFAULT_DB_QUERY_TIMEOUT_SECS,
        )?;

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_expires_in,
            server_host: optional("SERVER_HOST")
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or(optional("PORT"), "PORT", DEFAULT_PORT)?,
            db_pool_max_size: parse_or(
                optional("DB_POOL_MAX_SIZE"),
                "DB_POOL_MAX_SIZE",
                DEFAULT_DB_POOL_MAX_SIZE,
            )?,
            db_query_timeout: Duration::from_secs(db_query_timeout_secs),
            trusted_reverse_proxy_ip: parse_or(
                optional("TRUSTED_PROXY_IP"),
                "TRUSTED_PROXY_IP",
                IpAddr::V4(Ipv4Addr::LOCALHOST),
            )?,
            rate_limit_per_second: parse_or(
                optional("RATE_LIMIT_PER_SECOND"),
                "RATE_LIMIT_PER_SECOND",
                DEFAULT_RATE_LIMIT_PER_SECOND,
            )?,
            rate_limit_burst: parse_or(
                optional("RATE_LIMIT_BURST"),
                "RATE_LIMIT_BURST",
                DEFAULT_RATE_LIMIT_BURST,
            )?,
            log_config: optional("LOG_CONFIG").unwrap_or_else(|| DEFAULT_LOG_CONFIG.to_string()),
        })
    }
}

impl Config {
    /// Milliseconds between quota refills for `RATE_LIMIT_PER_SECOND` requests a second.
    pub fn rate_limit_replenish_ms(&self) -> Option<u64> {
        1000u64
            .checked_div(self.rate_limit_per_second)
            .map(|ms| ms.max(1))
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Parses `90`, `90s`, `15m`, `24h` or `7d` into a duration. Zero is rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit_secs) = match raw.chars().last()? {
        's' => (&raw[..raw.len() - 1], 1),
        'm' => (&raw[..raw.len() - 1], 60),
        'h' => (&raw[..raw.len() - 1], 60 * 60),
        'd' => (&raw[..raw.len() - 1], 24 * 60 * 60),
        c if c.is_ascii_digit() => (raw, 1),
        _ => return None,
    };
    let amount: u64 = digits.parse().ok()?;
    if amount == 0 {
        return None;
    }
    amount.checked_mul(unit_secs).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/league"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.jwt_expires_in, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.port, 3001);
        assert_eq!(config.db_pool_max_size, 16);
        assert_eq!(config.db_query_timeout, Duration::from_secs(10));
        assert_eq!(config.trusted_reverse_proxy_ip.to_string(), "127.0.0.1");
        assert_eq!(config.log_config, "./log-config.yml");
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn rate_limit_turns_into_a_refill_interval() {
        let mut config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("RATE_LIMIT_PER_SECOND", "4"),
        ]))
        .unwrap();
        assert_eq!(config.rate_limit_replenish_ms(), Some(250));

        config.rate_limit_per_second = 5000;
        assert_eq!(config.rate_limit_replenish_ms(), Some(1));

        config.rate_limit_per_second = 0;
        assert_eq!(config.rate_limit_replenish_ms(), None);
    }

    #[test]
    fn durations_accept_unit_suffixes() {
        assert_eq!(parse_duration("3600"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("45s"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_duration("24h"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_duration("0h"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("12w"), None);
    }
}
