use async_trait::async_trait;
use chrono::NaiveDate;

use crate::AlmanacError;
pub use almanac_types::ConnectorKey;
use almanac_types::{
    EarningsEvent, Instrument, InstrumentProfile, MacroObservation, MacroSeries, Quote,
};

/// Focused role trait for connectors that provide company profiles.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Fetch display metadata for the given instrument.
    async fn profile(&self, instrument: &Instrument) -> Result<InstrumentProfile, AlmanacError>;
}

/// Focused role trait for connectors that provide quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the last price for the given instrument.
    async fn quote(&self, instrument: &Instrument) -> Result<Quote, AlmanacError>;
}

/// Focused role trait for connectors that provide earnings calendars.
#[async_trait]
pub trait EarningsCalendarProvider: Send + Sync {
    /// Fetch every earnings event of `instrument` dated within `[from, to]`.
    ///
    /// Rows without a usable date are dropped by the connector.
    async fn earnings_calendar(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsEvent>, AlmanacError>;
}

/// Focused role trait for connectors that provide macroeconomic series.
#[async_trait]
pub trait MacroSeriesProvider: Send + Sync {
    /// Fetch the published observations of a series, in any order.
    async fn series(&self, series: &MacroSeries) -> Result<Vec<MacroObservation>, AlmanacError>;
}

/// Main connector trait. Connectors advertise capabilities through the
/// `as_*_provider` accessors; the orchestrator routes each call to the
/// connectors that return `Some`.
pub trait AlmanacConnector: Send + Sync {
    /// A stable identifier for logs and priority lists (e.g. "almanac-finnhub").
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise profile capability.
    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        None
    }

    /// Advertise quote capability.
    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        None
    }

    /// Advertise earnings calendar capability.
    fn as_earnings_calendar_provider(&self) -> Option<&dyn EarningsCalendarProvider> {
        None
    }

    /// Advertise macro series capability.
    fn as_macro_series_provider(&self) -> Option<&dyn MacroSeriesProvider> {
        None
    }
}
