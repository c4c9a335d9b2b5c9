//! Server configuration from environment variables
//!
//! | Variable                         | Default          |
//! |----------------------------------|------------------|
//! | `BEARER_LOCAL`                   | unset (0.0.0.0)  |
//! | `BEARER_PORT`                    | `0` (ephemeral)  |
//! | `BEARER_LOG_LEVEL`               | `info`           |
//! | `BEARER_MAX_PAYLOAD`             | `1048576`        |
//! | `BEARER_CONNECTION_TIMEOUT_SECS` | `30`             |
//! | `BEARER_MAX_CONNECTIONS`         | `100`            |
//! | `BEARER_REALM`                   | `oauth2-bearer`  |

use crate::error::{ServerError, ServerResult};
use crate::types::LogLevel;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1024 * 1024; // 1MB
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;
pub const DEFAULT_REALM: &str = "oauth2-bearer";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_level: LogLevel,
    pub max_payload_size: usize,
    pub connection_timeout: Duration,
    pub max_connections: usize,
    /// Realm advertised in `WWW-Authenticate` challenges
    pub realm: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            log_level: LogLevel::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            connection_timeout: Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            realm: DEFAULT_REALM.to_string(),
        }
    }
}

impl Config {
    /// Loopback-only configuration on an ephemeral port
    pub fn local() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            ..Self::default()
        }
    }

    pub fn from_env() -> ServerResult<Self> {
        let ip = if std::env::var("BEARER_LOCAL").is_ok_and(|v| !v.is_empty()) {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        };

        let port: u16 = parse_var("BEARER_PORT")?.unwrap_or(0);

        let max_payload_size = parse_var("BEARER_MAX_PAYLOAD")?.unwrap_or(DEFAULT_MAX_PAYLOAD_SIZE);
        if max_payload_size == 0 {
            return Err(ServerError::Config(
                "BEARER_MAX_PAYLOAD must be greater than zero".to_string(),
            ));
        }

        let timeout_secs = parse_var("BEARER_CONNECTION_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS);

        let max_connections = parse_var("BEARER_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let realm = std::env::var("BEARER_REALM")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REALM.to_string());
        if realm.contains('"') || realm.contains('\\') {
            return Err(ServerError::Config(
                "BEARER_REALM must not contain quotes or backslashes".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            log_level: LogLevel::from_env("BEARER_LOG_LEVEL"),
            max_payload_size,
            connection_timeout: Duration::from_secs(timeout_secs),
            max_connections,
            realm,
        })
    }
}

/// Unset or empty means "use the default"; anything unparsable is an error
fn parse_var<T: FromStr>(name: &'static str) -> ServerResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ServerError::Config(format!("invalid value for {name}: {raw}"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BEARER_LOCAL",
        "BEARER_PORT",
        "BEARER_LOG_LEVEL",
        "BEARER_MAX_PAYLOAD",
        "BEARER_CONNECTION_TIMEOUT_SECS",
        "BEARER_MAX_CONNECTIONS",
        "BEARER_REALM",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = Config::from_env().unwrap();
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.bind_addr.port(), 0);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.max_payload_size, DEFAULT_MAX_PAYLOAD_SIZE);
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.realm, "oauth2-bearer");
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        unsafe {
            std::env::set_var("BEARER_LOCAL", "1");
            std::env::set_var("BEARER_PORT", "8088");
            std::env::set_var("BEARER_LOG_LEVEL", "debug");
            std::env::set_var("BEARER_MAX_PAYLOAD", "2048");
            std::env::set_var("BEARER_CONNECTION_TIMEOUT_SECS", "5");
            std::env::set_var("BEARER_MAX_CONNECTIONS", "8");
            std::env::set_var("BEARER_REALM", "api");
        }

        let config = Config::from_env().unwrap();
        clear_env();

        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.bind_addr.port(), 8088);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.max_payload_size, 2048);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.realm, "api");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        unsafe {
            std::env::set_var("BEARER_PORT", "not-a-port");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("BEARER_PORT"));
        clear_env();

        unsafe {
            std::env::set_var("BEARER_MAX_PAYLOAD", "0");
        }
        assert!(Config::from_env().is_err());
        clear_env();

        unsafe {
            std::env::set_var("BEARER_REALM", "a\"b");
        }
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_local_config_is_loopback() {
        let config = Config::local();
        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.bind_addr.port(), 0);
    }
}
