use std::sync::Arc;
use std::time::Duration;

use almanac::{Almanac, AlmanacBuilder, AlmanacError, ManualClock};
use almanac_alphavantage::AlphaVantageConnector;
use almanac_finnhub::FinnhubConnector;
use almanac_mock::MockConnector;
use chrono::NaiveDate;

/// Set to run the demos against fixture data instead of live providers.
pub const USE_MOCK_ENV: &str = "ALMANAC_DEMOS_USE_MOCK";

/// Whether the demos run against the mock connector.
#[must_use]
pub fn use_mock() -> bool {
    std::env::var_os(USE_MOCK_ENV).is_some()
}

/// Monday of the week the mock fixtures are written around.
#[must_use]
pub fn mock_week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 11).unwrap_or_default()
}

/// Builder preloaded with the connectors for this environment.
///
/// Mock mode pins the clock to the fixture week and drops request pacing.
/// Live mode needs `FINNHUB_API_KEY`; `ALPHA_VANTAGE_API_KEY` is optional and
/// only feeds the macro releases.
///
/// # Errors
/// Returns `InvalidArg` when live mode lacks the Finnhub key, or the
/// connector's error when its HTTP client cannot be built.
pub fn builder() -> Result<AlmanacBuilder, AlmanacError> {
    if use_mock() {
        println!("--- (Using Mock Connector for CI) ---");
        let now = mock_week()
            .and_hms_opt(13, 0, 0)
            .unwrap_or_default()
            .and_utc();
        return Ok(Almanac::builder()
            .with_connector(Arc::new(MockConnector::new()))
            .clock(Arc::new(ManualClock::new(now)))
            .request_delay(Duration::ZERO)
            .macro_request_delay(Duration::ZERO));
    }

    let finnhub_key = std::env::var("FINNHUB_API_KEY").map_err(|_| {
        AlmanacError::InvalidArg(format!(
            "FINNHUB_API_KEY is not set (or set {USE_MOCK_ENV}=1 for fixture data)"
        ))
    })?;
    let mut builder = Almanac::builder().with_connector(Arc::new(FinnhubConnector::new(finnhub_key)?));
    if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
        builder = builder.with_connector(Arc::new(AlphaVantageConnector::new(key)?));
    } else {
        tracing::warn!("ALPHA_VANTAGE_API_KEY not set; macro releases will show without values");
    }
    Ok(builder)
}
