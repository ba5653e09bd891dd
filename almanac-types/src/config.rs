//! Configuration types shared by the orchestrator and its fetch groups.

use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// How the concurrency limit is applied across the four fetch groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConcurrencyScope {
    /// Each group gets its own limit; up to four groups run side by side.
    #[default]
    PerGroup,
    /// One limit is shared by every task of every group in a run.
    Shared,
}

/// Cooldown policy applied when a provider signals throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Fixed cooldown slept after a rate-limit signal, in milliseconds.
    pub cooldown_ms: u64,
    /// Maximum number of cooldown-and-retry cycles per task.
    pub max_cooldowns: u32,
    /// Random jitter percentage [0, 100] added to each cooldown.
    pub jitter_percent: u8,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 60_000,
            max_cooldowns: 1,
            jitter_percent: 0,
        }
    }
}

/// Inclusive date window used by the earnings fetch group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day of the window.
    pub from: NaiveDate,
    /// Last day of the window.
    pub to: NaiveDate,
}

impl DateWindow {
    /// Window covering the whole calendar year containing `date`.
    #[must_use]
    pub fn calendar_year(date: NaiveDate) -> Self {
        use chrono::Datelike;
        let year = date.year();
        // Jan 1 and Dec 31 exist for every year chrono can represent.
        let from = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date);
        let to = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(date);
        Self { from, to }
    }

    /// Parameter used in cache keys, e.g. `2025-01-01..2025-12-31`.
    #[must_use]
    pub fn cache_param(&self) -> String {
        format!("{}..{}", self.from, self.to)
    }
}

/// Global configuration for the `Almanac` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlmanacConfig {
    /// Maximum number of in-flight provider tasks (per group or shared).
    pub concurrency: usize,
    /// Whether the limit is per group or shared by the whole run.
    pub concurrency_scope: ConcurrencyScope,
    /// Cooldown policy for rate-limited tasks.
    pub backoff: BackoffConfig,
    /// Pause after each successful per-instrument provider call.
    pub request_delay: Duration,
    /// Pause after each successful macro series call.
    pub macro_request_delay: Duration,
    /// Age after which cached group results are treated as absent.
    pub cache_ttl: Duration,
    /// Timeout for individual provider requests.
    pub provider_timeout: Duration,
    /// Earnings fetch window; `None` means the calendar year containing today.
    pub earnings_window: Option<DateWindow>,
    /// Time zone used to decide what "today" is.
    pub market_timezone: Tz,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            concurrency_scope: ConcurrencyScope::PerGroup,
            backoff: BackoffConfig::default(),
            request_delay: Duration::from_millis(1_000),
            macro_request_delay: Duration::from_millis(1_200),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            provider_timeout: Duration::from_secs(30),
            earnings_window: None,
            market_timezone: chrono_tz::America::New_York,
        }
    }
}
