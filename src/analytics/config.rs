use std::env;
use std::fs;
use std::time::Duration;

use serde::Deserialize;

use crate::analytics::error::{invalid_argument, AnalyticsResult};

pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_millis(5000);

const DEFAULTS_ENV: &str = "__GTAG_DEFAULTS__";
const DEFAULTS_PATH_ENV: &str = "__GTAG_DEFAULTS_PATH";

/// Runtime options of a [`GtagClient`](crate::analytics::GtagClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    event_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            event_timeout: DEFAULT_EVENT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Sets how long `send_event` waits for the completion callback.
    pub fn with_event_timeout(mut self, timeout: Duration) -> AnalyticsResult<Self> {
        if timeout.is_zero() {
            return Err(invalid_argument("event timeout must be greater than zero"));
        }
        self.event_timeout = timeout;
        Ok(self)
    }

    pub fn event_timeout(&self) -> Duration {
        self.event_timeout
    }

    /// Applies the fields present in `overrides` on top of the defaults.
    pub fn merged(overrides: &ClientOptionsOverride) -> AnalyticsResult<Self> {
        let mut options = Self::default();
        if let Some(millis) = overrides.event_timeout_millis {
            options = options.with_event_timeout(Duration::from_millis(millis))?;
        }
        Ok(options)
    }
}

/// Partial options, typically deserialized from host configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ClientOptionsOverride {
    #[serde(default, alias = "eventTimeoutMillis", alias = "eventTimeout")]
    pub event_timeout_millis: Option<u64>,
}

impl ClientOptionsOverride {
    /// Reads overrides from `__GTAG_DEFAULTS__` (inline JSON) or the file named by
    /// `__GTAG_DEFAULTS_PATH`. Returns an empty override when neither is usable.
    pub fn from_env() -> Self {
        defaults_from_env()
            .or_else(defaults_from_path)
            .unwrap_or_default()
    }

    pub fn from_json(raw: &str) -> AnalyticsResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| invalid_argument(format!("invalid gtag client options: {err}")))
    }
}

fn defaults_from_env() -> Option<ClientOptionsOverride> {
    let raw = env::var(DEFAULTS_ENV).ok()?;
    parse_defaults(DEFAULTS_ENV, &raw)
}

fn defaults_from_path() -> Option<ClientOptionsOverride> {
    let path = env::var(DEFAULTS_PATH_ENV).ok()?;
    match fs::read_to_string(&path) {
        Ok(content) => parse_defaults(&path, &content),
        Err(err) => {
            log::warn!("failed to read gtag defaults from `{path}`: {err}");
            None
        }
    }
}

fn parse_defaults(source: &str, raw: &str) -> Option<ClientOptionsOverride> {
    match ClientOptionsOverride::from_json(raw) {
        Ok(overrides) => Some(overrides),
        Err(err) => {
            log::warn!("ignoring gtag defaults from {source}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{LazyLock, Mutex, MutexGuard};

    #[test]
    fn defaults_to_five_seconds() {
        assert_eq!(
            ClientOptions::default().event_timeout(),
            Duration::from_millis(5000)
        );
    }

    #[test]
    fn override_is_merged_onto_defaults() {
        let overrides = ClientOptionsOverride::from_json(r#"{"eventTimeoutMillis": 500}"#).unwrap();
        let options = ClientOptions::merged(&overrides).unwrap();
        assert_eq!(options.event_timeout(), Duration::from_millis(500));

        let empty = ClientOptions::merged(&ClientOptionsOverride::default()).unwrap();
        assert_eq!(empty, ClientOptions::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let overrides = ClientOptionsOverride {
            event_timeout_millis: Some(0),
        };
        let err = ClientOptions::merged(&overrides).unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-argument");
    }

    #[test]
    fn malformed_defaults_are_ignored() {
        assert_eq!(parse_defaults("test", "not json"), None);
        assert_eq!(
            parse_defaults("test", r#"{"event_timeout_millis": 250}"#),
            Some(ClientOptionsOverride {
                event_timeout_millis: Some(250)
            })
        );
    }

    static ENV_TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    fn env_test_guard() -> MutexGuard<'static, ()> {
        ENV_TEST_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn temp_defaults_file(contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "gtag_client_defaults_{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn from_env_reads_defaults_path() {
        let _guard = env_test_guard();
        let path = temp_defaults_file(r#"{"eventTimeoutMillis": 750}"#);
        env::remove_var(DEFAULTS_ENV);
        env::set_var(DEFAULTS_PATH_ENV, &path);

        let overrides = ClientOptionsOverride::from_env();

        env::remove_var(DEFAULTS_PATH_ENV);
        let _ = fs::remove_file(path);
        assert_eq!(overrides.event_timeout_millis, Some(750));
    }

    #[test]
    fn inline_defaults_win_over_path() {
        let _guard = env_test_guard();
        let path = temp_defaults_file(r#"{"eventTimeoutMillis": 750}"#);
        env::set_var(DEFAULTS_ENV, r#"{"eventTimeout": 1200}"#);
        env::set_var(DEFAULTS_PATH_ENV, &path);

        let overrides = ClientOptionsOverride::from_env();

        env::remove_var(DEFAULTS_ENV);
        env::remove_var(DEFAULTS_PATH_ENV);
        let _ = fs::remove_file(path);
        assert_eq!(overrides.event_timeout_millis, Some(1200));
    }

    #[test]
    fn unusable_env_yields_empty_override() {
        let _guard = env_test_guard();
        env::set_var(DEFAULTS_ENV, "not json");
        env::set_var(DEFAULTS_PATH_ENV, "/nonexistent/gtag-defaults.json");

        let overrides = ClientOptionsOverride::from_env();

        env::remove_var(DEFAULTS_ENV);
        env::remove_var(DEFAULTS_PATH_ENV);
        assert_eq!(overrides, ClientOptionsOverride::default());
    }
}
