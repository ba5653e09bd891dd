use std::time::Duration;

use almanac_core::{AlmanacError, BackoffConfig};
use rand::Rng;

/// Base wait plus a random extra of up to `jitter_percent` percent of it.
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Run `op`, cooling down and retrying while it reports throttling.
///
/// At most `cfg.max_cooldowns` cooldowns are slept; a throttling error after
/// the last one is returned to the caller like any other failure. Errors that
/// are not rate limits are returned immediately.
pub async fn retry_rate_limited<T, F, Fut>(
    cfg: &BackoffConfig,
    subject: &str,
    mut op: F,
) -> Result<T, AlmanacError>
where
    F: FnMut() -> Fut,
    Fut: core::future::Future<Output = Result<T, AlmanacError>>,
{
    let mut cooldowns = 0u32;
    loop {
        match op().await {
            Err(e) if e.is_rate_limited() && cooldowns < cfg.max_cooldowns => {
                cooldowns += 1;
                let wait_ms = jitter_wait(cfg.cooldown_ms, u32::from(cfg.jitter_percent));
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "almanac::backoff",
                    subject,
                    cooldown_ms = wait_ms,
                    cooldown = cooldowns,
                    error = %e,
                    "rate limited; cooling down before retry"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = (subject, e);
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
            other => return other,
        }
    }
}
