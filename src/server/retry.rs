use serde::Deserialize;
use std::time::Duration;

/// Retry settings for the two retry tiers.
///
/// The defaults reproduce the service guidance this client follows: writes
/// retry four times with `2^k * 50ms` backoff, and throttled calls that opted
/// in wait `k` seconds before attempt `k`, with no cap.
///
/// ```rust
/// use dynamodb_rpc::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default();
/// assert_eq!(config.write_backoff(3), Duration::from_millis(400));
/// assert_eq!(config.throttle_delay(2), Duration::from_secs(2));
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first for retryable write errors.
    pub max_write_retries: u32,
    /// Base of the exponential write backoff.
    #[serde(deserialize_with = "millis::deserialize")]
    pub write_backoff_base: Duration,
    /// Linear step of the throttling backoff.
    #[serde(deserialize_with = "millis::deserialize")]
    pub throttle_step: Duration,
    /// Cap on throttling retries; `None` retries for as long as the service throttles.
    pub max_throttle_retries: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_write_retries: 4,
            write_backoff_base: Duration::from_millis(50),
            throttle_step: Duration::from_secs(1),
            max_throttle_retries: None,
        }
    }
}

impl RetryConfig {
    /// Delay before write retry `attempt` (0-indexed): `2^attempt * base`.
    pub fn write_backoff(&self, attempt: u32) -> Duration {
        self.write_backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Delay before throttling retry `attempt` (1-indexed): `attempt * step`.
    pub fn throttle_delay(&self, attempt: u32) -> Duration {
        self.throttle_step.saturating_mul(attempt)
    }

    /// Whether another throttling retry is allowed after `attempts` retries.
    pub fn allows_throttle_retry(&self, attempts: u32) -> bool {
        self.max_throttle_retries
            .is_none_or(|max_throttle_retries| attempts < max_throttle_retries)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::first(0, 50)]
    #[case::second(1, 100)]
    #[case::third(2, 200)]
    #[case::fourth(3, 400)]
    #[case::fifth(4, 800)]
    fn test_write_backoff(#[case] attempt: u32, #[case] expected_millis: u64) {
        let actual = RetryConfig::default().write_backoff(attempt);
        assert_eq!(actual, Duration::from_millis(expected_millis));
    }

    #[test]
    fn test_write_backoff_saturates() {
        let actual = RetryConfig::default().write_backoff(64);
        assert_eq!(actual, Duration::from_millis(50).saturating_mul(u32::MAX));
    }

    #[rstest]
    #[case::first(1, 1)]
    #[case::third(3, 3)]
    fn test_throttle_delay(#[case] attempt: u32, #[case] expected_secs: u64) {
        let actual = RetryConfig::default().throttle_delay(attempt);
        assert_eq!(actual, Duration::from_secs(expected_secs));
    }

    #[rstest]
    #[case::unbounded(None, 1_000, true)]
    #[case::below_cap(Some(2), 1, true)]
    #[case::at_cap(Some(2), 2, false)]
    fn test_allows_throttle_retry(
        #[case] max_throttle_retries: Option<u32>,
        #[case] attempts: u32,
        #[case] expected: bool,
    ) {
        let config = RetryConfig {
            max_throttle_retries,
            ..Default::default()
        };
        assert_eq!(config.allows_throttle_retry(attempts), expected);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"max_write_retries": 2, "write_backoff_base": 10}"#).unwrap();
        assert_eq!(
            config,
            RetryConfig {
                max_write_retries: 2,
                write_backoff_base: Duration::from_millis(10),
                ..Default::default()
            }
        );
    }
}
