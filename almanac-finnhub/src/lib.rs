//! almanac-finnhub
//!
//! Connector implementing `AlmanacConnector` on top of the Finnhub REST API.
//! Exposes company profiles, quotes and per-symbol earnings calendars.
#![warn(missing_docs)]

mod http;
mod wire;

use almanac_core::connector::{
    AlmanacConnector, ConnectorKey, EarningsCalendarProvider, ProfileProvider, QuoteProvider,
};
use almanac_core::{AlmanacError, EarningsEvent, Instrument, InstrumentProfile, Quote};
use async_trait::async_trait;
use chrono::NaiveDate;
use url::Url;

pub use http::DEFAULT_BASE_URL;
use wire::{EarningsCalendarWire, ProfileWire, QuoteWire};

/// Finnhub connector. Construct with [`FinnhubConnector::new`].
#[derive(Debug, Clone)]
pub struct FinnhubConnector {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl FinnhubConnector {
    /// Static connector key for logs and priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("almanac-finnhub");

    /// Connector against the public Finnhub endpoint.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AlmanacError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AlmanacError::InvalidArg("finnhub api key is empty".into()));
        }
        Ok(Self {
            client: http::default_client(),
            base_url: http::parse_base_url(DEFAULT_BASE_URL)?,
            api_key,
        })
    }

    /// Point the connector at another server (e.g. a local mock).
    ///
    /// # Errors
    /// Returns `InvalidArg` when `base_url` does not parse.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AlmanacError> {
        self.base_url = http::parse_base_url(base_url)?;
        Ok(self)
    }

    /// Use a caller-provided HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Current base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ProfileProvider for FinnhubConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac_finnhub::profile",
            skip(self, instrument),
            fields(symbol = %instrument.symbol()),
        )
    )]
    async fn profile(&self, instrument: &Instrument) -> Result<InstrumentProfile, AlmanacError> {
        let wire: ProfileWire = self
            .get_json("stock/profile2", &[("symbol", instrument.symbol())])
            .await?;
        wire.into_profile(instrument)
            .ok_or_else(|| AlmanacError::not_found(format!("profile for {}", instrument.symbol())))
    }
}

#[async_trait]
impl QuoteProvider for FinnhubConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac_finnhub::quote",
            skip(self, instrument),
            fields(symbol = %instrument.symbol()),
        )
    )]
    async fn quote(&self, instrument: &Instrument) -> Result<Quote, AlmanacError> {
        let wire: QuoteWire = self
            .get_json("quote", &[("symbol", instrument.symbol())])
            .await?;
        Ok(wire.into_quote(instrument))
    }
}

#[async_trait]
impl EarningsCalendarProvider for FinnhubConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac_finnhub::earnings_calendar",
            skip(self, instrument),
            fields(symbol = %instrument.symbol(), %from, %to),
        )
    )]
    async fn earnings_calendar(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsEvent>, AlmanacError> {
        if from > to {
            return Err(AlmanacError::InvalidArg(format!(
                "earnings window starts after it ends: {from} > {to}"
            )));
        }
        let from_s = from.format("%Y-%m-%d").to_string();
        let to_s = to.format("%Y-%m-%d").to_string();
        let wire: EarningsCalendarWire = self
            .get_json(
                "calendar/earnings",
                &[
                    ("from", from_s.as_str()),
                    ("to", to_s.as_str()),
                    ("symbol", instrument.symbol()),
                    ("international", "false"),
                ],
            )
            .await?;
        let rows = wire.earnings_calendar;
        #[cfg(feature = "tracing")]
        let total = rows.len();
        let events: Vec<EarningsEvent> = rows
            .into_iter()
            .filter_map(|row| row.into_event(instrument))
            .collect();
        #[cfg(feature = "tracing")]
        if events.len() < total {
            tracing::debug!(
                dropped = total - events.len(),
                "dropped earnings rows without a usable date"
            );
        }
        Ok(events)
    }
}

impl AlmanacConnector for FinnhubConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Finnhub"
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
}
