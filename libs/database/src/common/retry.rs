use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};

/// Exponential backoff settings for connection attempts and store reads
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,

    /// Ceiling for the delay between retries in milliseconds
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after every failed attempt
    pub backoff_multiplier: f64,

    /// Scale each delay into 50-100% of its value to spread concurrent retries
    pub use_jitter: bool,
}

impl RetryConfig {
    /// Defaults: 3 retries, 100ms initial delay, 5s cap, x2 backoff, jitter on.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay after `delay_ms`, capped at `max_delay_ms`.
    fn next_delay(&self, delay_ms: u64) -> u64 {
        ((delay_ms as f64 * self.backoff_multiplier) as u64).min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Environment variables:
/// - `DB_RETRY_MAX_RETRIES` (default: 3)
/// - `DB_RETRY_INITIAL_DELAY_MS` (default: 100)
/// - `DB_RETRY_MAX_DELAY_MS` (default: 5000)
/// - `DB_RETRY_JITTER` (default: true)
#[cfg(feature = "config")]
impl FromEnv for RetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_retries: env_parse("DB_RETRY_MAX_RETRIES", defaults.max_retries)?,
            initial_delay_ms: env_parse("DB_RETRY_INITIAL_DELAY_MS", defaults.initial_delay_ms)?,
            max_delay_ms: env_parse("DB_RETRY_MAX_DELAY_MS", defaults.max_delay_ms)?,
            backoff_multiplier: defaults.backoff_multiplier,
            use_jitter: env_parse("DB_RETRY_JITTER", defaults.use_jitter)?,
        })
    }
}

/// Retry an async operation with exponential backoff while `should_retry`
/// accepts the error.
///
/// Errors rejected by `should_retry` are returned immediately, so callers can
/// retry transport failures without retrying "not found" style outcomes.
///
/// ```ignore
/// use database::common::{RetryConfig, retry_if};
///
/// let products = retry_if(
///     || store.list_products(),
///     RetryConfig::new().with_max_retries(2),
///     |e: &StoreError| e.is_transient(),
/// )
/// .await?;
/// ```
pub async fn retry_if<F, Fut, T, E, P>(
    mut operation: F,
    config: RetryConfig,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay_ms;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(retries = attempt, "Operation succeeded after retrying");
                }
                return Ok(result);
            }
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    warn!(attempts = attempt, error = %e, "Operation failed, giving up");
                    return Err(e);
                }

                let current_delay = if config.use_jitter {
                    apply_jitter(delay)
                } else {
                    delay
                };

                debug!(
                    attempt,
                    max_retries = config.max_retries,
                    error = %e,
                    delay_ms = current_delay,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(Duration::from_millis(current_delay)).await;
                delay = config.next_delay(delay);
            }
        }
    }
}

/// Retry every failure with exponential backoff.
///
/// ```ignore
/// let client = retry_with_backoff(|| connect(&config), RetryConfig::new().with_max_retries(5)).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_if(operation, config, |_| true).await
}

/// Scale a delay into 50-100% of its value.
fn apply_jitter(delay: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    // RandomState is seeded per instance, which is enough entropy for spreading retries
    let random_factor =
        (RandomState::new().hash_one(std::time::SystemTime::now()) % 51) as f64 / 100.0 + 0.5;

    (delay as f64 * random_factor) as u64
}
