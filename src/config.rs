//! Application configuration loaded from environment variables.
//!
//! Every value has a default suited to a backend running on
//! `localhost:8080`:
//! - `COINSIM_API_URL`: REST base URL (`http://localhost:8080/api`)
//! - `COINSIM_WS_URL`: STOMP WebSocket endpoint (`ws://localhost:8080/ws/websocket`)
//! - `COINSIM_RECONNECT_DELAY_SECS`: fixed delay between stream reconnects (5)
//! - `COINSIM_HEARTBEAT_MS`: requested STOMP heart-beat interval (4000)
//! - `COINSIM_POLL_INTERVAL_SECS`: holdings/history refresh period (30)
//! - `COINSIM_REQUEST_TIMEOUT_SECS`: per-request HTTP timeout (30)
//! - `COINSIM_LOG_FILE`: tracing output file (`coinsim.log`)

use std::str::FromStr;
use std::time::Duration;

/// Default REST base URL.
const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default raw WebSocket endpoint of the backend's STOMP broker.
const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws/websocket";

const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;
const DEFAULT_HEARTBEAT_MS: u64 = 4_000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILE: &str = "coinsim.log";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub stream: StreamConfig,
    /// How often mounted holdings/history views re-fetch.
    pub poll_interval: Duration,
    pub log_file: String,
}

/// REST endpoint settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_url: String,
    pub request_timeout: Duration,
}

/// Price stream settings.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub websocket_url: String,
    /// Delay before every reconnect attempt; never grows.
    pub reconnect_delay: Duration,
    /// Heart-beat interval requested in both directions.
    pub heartbeat: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            websocket_url: DEFAULT_WS_URL.to_string(),
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS),
            heartbeat: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`CoinsimError::Config`](crate::CoinsimError::Config) if a
/// numeric variable is set but cannot be parsed, or if a duration that
/// must be positive is zero.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let api_url = non_empty_var("COINSIM_API_URL")
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string();
    let websocket_url =
        non_empty_var("COINSIM_WS_URL").unwrap_or_else(|| DEFAULT_WS_URL.to_string());

    let reconnect_secs: u64 =
        parsed_var("COINSIM_RECONNECT_DELAY_SECS", DEFAULT_RECONNECT_DELAY_SECS)?;
    let heartbeat_ms: u64 = parsed_var("COINSIM_HEARTBEAT_MS", DEFAULT_HEARTBEAT_MS)?;
    let poll_secs: u64 = parsed_var("COINSIM_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
    let timeout_secs: u64 =
        parsed_var("COINSIM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

    if poll_secs == 0 {
        return Err(crate::CoinsimError::Config(
            "COINSIM_POLL_INTERVAL_SECS must be greater than zero".to_string(),
        ));
    }
    if timeout_secs == 0 {
        return Err(crate::CoinsimError::Config(
            "COINSIM_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        backend: BackendConfig {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
        },
        stream: StreamConfig {
            websocket_url,
            reconnect_delay: Duration::from_secs(reconnect_secs),
            heartbeat: Duration::from_millis(heartbeat_ms),
        },
        poll_interval: Duration::from_secs(poll_secs),
        log_file: non_empty_var("COINSIM_LOG_FILE")
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parses an optional numeric variable, falling back to `default` when unset.
fn parsed_var<T: FromStr>(name: &str, default: T) -> crate::Result<T>
where
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| crate::CoinsimError::Config(format!("{name}={raw:?} is invalid: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 7] = [
        "COINSIM_API_URL",
        "COINSIM_WS_URL",
        "COINSIM_RECONNECT_DELAY_SECS",
        "COINSIM_HEARTBEAT_MS",
        "COINSIM_POLL_INTERVAL_SECS",
        "COINSIM_REQUEST_TIMEOUT_SECS",
        "COINSIM_LOG_FILE",
    ];

    /// Serializes tests that mutate the process environment.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    /// Helper that clears every config var, applies `vars`, runs `f`, then
    /// restores the originals.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let originals: Vec<(&str, Option<String>)> = ALL_VARS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: every env-mutating test holds ENV_LOCK.
        unsafe {
            for k in ALL_VARS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        // SAFETY: restoring original values under the same lock.
        unsafe {
            for (k, original) in originals {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_without_env_vars() {
        with_env(&[], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.backend.api_url, DEFAULT_API_URL);
            assert_eq!(config.stream.websocket_url, DEFAULT_WS_URL);
            assert_eq!(config.stream.reconnect_delay, Duration::from_secs(5));
            assert_eq!(config.stream.heartbeat, Duration::from_millis(4_000));
            assert_eq!(config.poll_interval, Duration::from_secs(30));
            assert_eq!(config.backend.request_timeout, Duration::from_secs(30));
            assert_eq!(config.log_file, "coinsim.log");
        });
    }

    #[test]
    fn overrides_from_env() {
        with_env(
            &[
                ("COINSIM_API_URL", Some("http://trading.local:9000/api/")),
                ("COINSIM_WS_URL", Some("ws://trading.local:9000/ws/websocket")),
                ("COINSIM_RECONNECT_DELAY_SECS", Some("2")),
                ("COINSIM_HEARTBEAT_MS", Some("10000")),
                ("COINSIM_POLL_INTERVAL_SECS", Some("15")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.backend.api_url, "http://trading.local:9000/api");
                assert_eq!(
                    config.stream.websocket_url,
                    "ws://trading.local:9000/ws/websocket"
                );
                assert_eq!(config.stream.reconnect_delay, Duration::from_secs(2));
                assert_eq!(config.stream.heartbeat, Duration::from_secs(10));
                assert_eq!(config.poll_interval, Duration::from_secs(15));
            },
        );
    }

    #[test]
    fn rejects_non_numeric_interval() {
        with_env(&[("COINSIM_POLL_INTERVAL_SECS", Some("soon"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("COINSIM_POLL_INTERVAL_SECS"));
        });
    }

    #[test]
    fn rejects_zero_poll_interval() {
        with_env(&[("COINSIM_POLL_INTERVAL_SECS", Some("0"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("greater than zero"));
        });
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("COINSIM_API_URL", Some("")),
                ("COINSIM_WS_URL", Some("")),
                ("COINSIM_HEARTBEAT_MS", Some("")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.backend.api_url, DEFAULT_API_URL);
                assert_eq!(config.stream.websocket_url, DEFAULT_WS_URL);
                assert_eq!(config.stream.heartbeat, Duration::from_millis(4_000));
            },
        );
    }
}
