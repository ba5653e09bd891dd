//! Mock connectors for tests and demos.
//!
//! - [`MockConnector`]: deterministic fixture data for the default universe and
//!   the CPI/PPI series. The symbols `FAIL`, `RATELIMIT` and `TIMEOUT` trigger a
//!   connector error, a throttling signal and a short delay respectively.
//! - [`DynamicMockConnector`]: behaviour scripted per key from a
//!   [`DynamicMockController`], with call counters and an in-flight peak gauge.
#![warn(missing_docs)]

use std::time::Duration;

use almanac_core::connector::{
    AlmanacConnector, EarningsCalendarProvider, MacroSeriesProvider, ProfileProvider,
    QuoteProvider,
};
use almanac_core::{
    AlmanacError, EarningsEvent, Instrument, InstrumentProfile, MacroObservation, MacroSeries,
    Quote,
};
use async_trait::async_trait;
use chrono::NaiveDate;

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Mock connector for CI-safe demos. Provides deterministic data from static fixtures.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockConnector;

impl MockConnector {
    /// Connector name.
    pub const NAME: &'static str = "almanac-mock";

    /// Create the connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(what: &str) -> AlmanacError {
        AlmanacError::not_found(what.to_string())
    }

    async fn maybe_fail(symbol: &str, capability: &'static str) -> Result<(), AlmanacError> {
        match symbol {
            "FAIL" => Err(AlmanacError::connector(
                Self::NAME,
                format!("forced failure: {capability}"),
            )),
            "RATELIMIT" => Err(AlmanacError::rate_limited(Self::NAME)),
            "TIMEOUT" => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl AlmanacConnector for MockConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        Some(self as &dyn ProfileProvider)
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        Some(self as &dyn QuoteProvider)
    }

    fn as_earnings_calendar_provider(&self) -> Option<&dyn EarningsCalendarProvider> {
        Some(self as &dyn EarningsCalendarProvider)
    }

    fn as_macro_series_provider(&self) -> Option<&dyn MacroSeriesProvider> {
        Some(self as &dyn MacroSeriesProvider)
    }
}

#[async_trait]
impl ProfileProvider for MockConnector {
    async fn profile(&self, instrument: &Instrument) -> Result<InstrumentProfile, AlmanacError> {
        let s = instrument.symbol();
        Self::maybe_fail(s, "profile").await?;
        fixtures::companies::profile(instrument)
            .ok_or_else(|| Self::not_found(&format!("profile for {s}")))
    }
}

#[async_trait]
impl QuoteProvider for MockConnector {
    async fn quote(&self, instrument: &Instrument) -> Result<Quote, AlmanacError> {
        let s = instrument.symbol();
        Self::maybe_fail(s, "quote").await?;
        fixtures::companies::quote(instrument)
            .ok_or_else(|| Self::not_found(&format!("quote for {s}")))
    }
}

#[async_trait]
impl EarningsCalendarProvider for MockConnector {
    async fn earnings_calendar(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsEvent>, AlmanacError> {
        let s = instrument.symbol();
        Self::maybe_fail(s, "earnings-calendar").await?;
        // Unknown symbols simply have no scheduled releases.
        Ok(fixtures::companies::earnings(instrument, from, to).unwrap_or_default())
    }
}

#[async_trait]
impl MacroSeriesProvider for MockConnector {
    async fn series(&self, series: &MacroSeries) -> Result<Vec<MacroObservation>, AlmanacError> {
        Self::maybe_fail(&series.function, "macro-series").await?;
        fixtures::macro_series::by_function(&series.function)
            .ok_or_else(|| Self::not_found(&format!("macro series {}", series.function)))
    }
}
