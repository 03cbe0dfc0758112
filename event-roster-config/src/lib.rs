use core::fmt::{Debug, Display};
use core::time::Duration;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use event_roster_assignment::{RemovalPolicy, DEFAULT_DEPARTMENT_SEQUENCE};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "event-roster.toml";
pub const ENV_PREFIX: &str = "ROSTER_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub address: SocketAddr,
    /// Without a database url the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Bearer token for operator routes. Operator routes are closed when unset.
    pub operator_token: Option<String>,
    pub store_timeout_secs: u64,
    /// Upper bound for reading a request and answering it.
    pub request_timeout_secs: u64,
    pub removal_policy: RemovalPolicy,
    /// Display priority of departments on the home page.
    pub department_sequence: Vec<String>,
    pub tls: Option<TlsConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000)),
            database_url: None,
            operator_token: None,
            store_timeout_secs: 5,
            request_timeout_secs: 30,
            removal_policy: RemovalPolicy::default(),
            department_sequence: DEFAULT_DEPARTMENT_SEQUENCE
                .iter()
                .map(|department| (*department).to_owned())
                .collect(),
            tls: None,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Defaults, then `event-roster.toml`, then `ROSTER_*` environment variables.
/// Nested keys use a double underscore, e.g. `ROSTER_TLS__CERT`.
pub fn get_config() -> Result<Config, ConfigError> {
    Ok(Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_any_source() {
        Jail::expect_with(|_jail| {
            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config, Config::default());
            assert_eq!(config.store_timeout(), Duration::from_secs(5));
            assert_eq!(config.request_timeout(), Duration::from_secs(30));
            assert_eq!(config.removal_policy, RemovalPolicy::Unconditional);
            assert_eq!(config.department_sequence.first().map(String::as_str), Some("Show Flow"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    address = "127.0.0.1:8080"
                    operator_token = "from-file"
                    removal_policy = "recompute"
                    department_sequence = ["Media", "Logistics"]

                    [tls]
                    cert = "cert.pem"
                    key = "key.pem"
                "#,
            )?;
            jail.set_env("ROSTER_OPERATOR_TOKEN", "from-env");
            jail.set_env("ROSTER_DATABASE_URL", "postgres://localhost/roster");
            jail.set_env("ROSTER_REQUEST_TIMEOUT_SECS", "3");

            let config = get_config().map_err(|err| err.to_string())?;
            assert_eq!(config.address.port(), 8080);
            assert_eq!(config.operator_token.as_deref(), Some("from-env"));
            assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/roster"));
            assert_eq!(config.removal_policy, RemovalPolicy::Recompute);
            assert_eq!(config.request_timeout(), Duration::from_secs(3));
            assert_eq!(config.department_sequence, vec!["Media", "Logistics"]);
            assert_eq!(
                config.tls,
                Some(TlsConfig {
                    cert: "cert.pem".into(),
                    key: "key.pem".into(),
                })
            );
            Ok(())
        });
    }

    #[test]
    fn invalid_policy_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("ROSTER_REMOVAL_POLICY", "sometimes");
            assert!(get_config().is_err());
            Ok(())
        });
    }
}
