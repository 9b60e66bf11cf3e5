//! Process configuration, read once from the environment

use std::env;
use std::time::Duration;

use log::error;

/// Well-known cloud endpoint listing the bridges on the caller's network
pub const HUE_DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// Nest developer API root
pub const NEST_API_URL: &str = "https://developer-api.nest.com";

/// Environment variable holding the provisioned Hue bridge user id
pub const HUE_USER_ID_VAR: &str = "HUE_USER_ID";

/// Environment variable holding the Nest OAuth access token
pub const NEST_ACCESS_TOKEN_VAR: &str = "NEST_ACCESS_TOKEN";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8000";

/// Gateway settings
///
/// Credentials are not part of this, see
/// [crate::credentials::CredentialProvider].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use homegate::Config;
///
/// let config = Config::from_lookup(|key| match key {
///     "HOMEGATE_PORT" => Some("9090".to_string()),
///     "HUE_BRIDGE_ADDRESS" => Some("10.0.0.5".to_string()),
///     _ => None,
/// });
/// assert_eq!(config.port, 9090);
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// assert_eq!(config.bridge_address.as_deref(), Some("10.0.0.5"));
/// ```
///
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the API server listens on
    pub port: u16,

    /// Allowed CORS origin for the API server
    pub cors_origin: String,

    /// Upper bound for every outbound vendor call
    pub timeout: Duration,

    /// Hue discovery endpoint
    pub discovery_url: String,

    /// Fixed bridge address, skips discovery when set
    pub bridge_address: Option<String>,

    /// Nest API root
    pub nest_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            cors_origin: String::from(DEFAULT_CORS_ORIGIN),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            discovery_url: String::from(HUE_DISCOVERY_URL),
            bridge_address: None,
            nest_api_url: String::from(NEST_API_URL),
        }
    }
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through some key lookup
    ///
    /// Unparseable values are logged and replaced by their defaults.
    ///
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("HOMEGATE_PORT") {
            Some(port) => match port.parse::<u16>() {
                Ok(v) => v,
                Err(e) => {
                    error!("Invalid port: {port}: {:?}", e);
                    defaults.port
                }
            },
            None => defaults.port,
        };

        let timeout = match non_empty("HOMEGATE_TIMEOUT_SECS") {
            Some(secs) => match secs.parse::<u64>() {
                Ok(v) if v > 0 => Duration::from_secs(v),
                _ => {
                    error!("Invalid timeout: {secs}, using {DEFAULT_TIMEOUT_SECS}s");
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Config {
            port,
            timeout,
            cors_origin: non_empty("HOMEGATE_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            discovery_url: non_empty("HUE_DISCOVERY_URL").unwrap_or(defaults.discovery_url),
            bridge_address: non_empty("HUE_BRIDGE_ADDRESS"),
            nest_api_url: non_empty("NEST_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.nest_api_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origin, "http://localhost:8000");
        assert_eq!(config.discovery_url, HUE_DISCOVERY_URL);
        assert_eq!(config.nest_api_url, NEST_API_URL);
        assert!(config.bridge_address.is_none());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(|key| match key {
            "HOMEGATE_PORT" => Some("http".to_string()),
            "HOMEGATE_TIMEOUT_SECS" => Some("0".to_string()),
            "HUE_BRIDGE_ADDRESS" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 8080);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.bridge_address.is_none());
    }

    #[test]
    fn test_nest_url_trailing_slash() {
        let config = Config::from_lookup(|key| match key {
            "NEST_API_URL" => Some("http://localhost:9000/".to_string()),
            _ => None,
        });
        assert_eq!(config.nest_api_url, "http://localhost:9000");
    }
}
