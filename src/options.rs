use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use serde::Deserialize;

/// Default retry budget: additional attempts after the first one.
pub const DEFAULT_RETRIES: u32 = 3;

/// Configures timeout, retry budget and exponential backoff parameters.
///
/// Defaults follow the conventional exponential backoff settings:
/// 500 ms initial interval, 1.5× multiplier, 60 s max interval and
/// 15 min max elapsed time.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Maximum number of retries after the initial attempt.
    pub retries: u32,
    /// Per-call timeout in milliseconds. `0` disables the timeout.
    pub timeout_ms: u64,
    /// First backoff interval in milliseconds.
    pub initial_interval_ms: u64,
    /// Growth factor applied to the interval after each retry.
    pub multiplier: f64,
    /// Jitter applied to each interval, in `[0, 1]`.
    pub randomization_factor: f64,
    /// Upper bound for a single interval in milliseconds.
    pub max_interval_ms: u64,
    /// Total time budget for retries in milliseconds. `0` means unbounded.
    pub max_elapsed_ms: u64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            timeout_ms: 0,
            initial_interval_ms: 500,
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval_ms: 60_000,
            max_elapsed_ms: 15 * 60_000,
        }
    }
}

impl RequestOptions {
    /// Reads overrides from environment variables on top of the defaults.
    ///
    /// Reads:
    /// - `RETRYING_REQUEST_RETRIES` — retry budget
    /// - `RETRYING_REQUEST_TIMEOUT_MS` — per-call timeout in milliseconds
    ///
    /// Unset variables keep their default. Set-but-invalid values are an error.
    pub fn from_env() -> Result<Self, String> {
        let mut opts = Self::default();
        if let Some(retries) = read_env_number("RETRYING_REQUEST_RETRIES")? {
            opts.retries = u32::try_from(retries)
                .map_err(|_| "RETRYING_REQUEST_RETRIES is out of range".to_owned())?;
        }
        if let Some(timeout_ms) = read_env_number("RETRYING_REQUEST_TIMEOUT_MS")? {
            opts.timeout_ms = timeout_ms;
        }
        Ok(opts)
    }

    /// Per-call timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Builds a fresh exponential backoff from these settings.
    pub fn to_backoff(&self) -> ExponentialBackoff {
        let max_elapsed =
            (self.max_elapsed_ms > 0).then(|| Duration::from_millis(self.max_elapsed_ms));
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.initial_interval_ms))
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.randomization_factor)
            .with_max_interval(Duration::from_millis(self.max_interval_ms))
            .with_max_elapsed_time(max_elapsed)
            .build()
    }
}

fn read_env_number(name: &str) -> Result<Option<u64>, String> {
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Err(format!("{name} is set but empty")),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| format!("{name} must be a non-negative integer: {err}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RequestOptions, DEFAULT_RETRIES};

    #[test]
    fn defaults_match_conventional_backoff() {
        let opts = RequestOptions::default();
        assert_eq!(opts.retries, DEFAULT_RETRIES);
        assert_eq!(opts.timeout(), None);

        let backoff = opts.to_backoff();
        assert_eq!(backoff.initial_interval, Duration::from_millis(500));
        assert_eq!(backoff.multiplier, 1.5);
        assert_eq!(backoff.max_interval, Duration::from_secs(60));
        assert_eq!(backoff.max_elapsed_time, Some(Duration::from_secs(15 * 60)));
    }

    #[test]
    fn zero_max_elapsed_means_unbounded() {
        let opts = RequestOptions {
            max_elapsed_ms: 0,
            ..RequestOptions::default()
        };
        assert_eq!(opts.to_backoff().max_elapsed_time, None);
    }

    #[test]
    fn deserializes_partial_config_over_defaults() {
        let opts: RequestOptions =
            serde_json::from_str(r#"{ "retries": 5, "timeout_ms": 2500 }"#)
                .expect("options must deserialize");
        assert_eq!(opts.retries, 5);
        assert_eq!(opts.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(opts.initial_interval_ms, 500);
    }
}
