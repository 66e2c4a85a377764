use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry behavior for transient adapter failures inside a running job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_millis")]
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Tunables for the collection orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Upper bound on concurrently executing jobs; further submissions
    /// queue on the pool.
    pub max_concurrent_jobs: usize,
    pub retry: RetryPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            retry: RetryPolicy::default(),
        }
    }
}

// Backoff durations serialize as integer milliseconds in config files.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(de)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bound_the_pool() {
        let config = CollectorConfig::default();
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let raw = "max_concurrent_jobs = 2\n[retry]\nmax_attempts = 5\nbackoff = 100\n";
        let config: CollectorConfig = toml::from_str(raw).expect("config parses");

        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.retry.backoff, Duration::from_millis(100));
    }
}
