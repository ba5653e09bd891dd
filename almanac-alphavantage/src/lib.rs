//! almanac-alphavantage
//!
//! Connector implementing `AlmanacConnector` on top of the Alpha Vantage
//! economic indicator endpoints (`CPI`, `PPI`, ...), queried at monthly interval.
#![warn(missing_docs)]

use std::str::FromStr;
use std::time::Duration;

use almanac_core::connector::{AlmanacConnector, ConnectorKey, MacroSeriesProvider};
use almanac_core::{AlmanacError, MacroObservation, MacroSeries};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

/// Alpha Vantage REST root.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/";

#[derive(Debug, Deserialize)]
struct SeriesWire {
    #[serde(default)]
    data: Vec<PointWire>,
}

#[derive(Debug, Deserialize)]
struct PointWire {
    date: String,
    value: String,
}

impl PointWire {
    /// `None` for missing values (published as `"."`) and unparseable rows.
    fn into_observation(self) -> Option<MacroObservation> {
        let value = self.value.trim();
        if value == "." || value.is_empty() {
            return None;
        }
        Some(MacroObservation {
            date: NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?,
            value: Decimal::from_str(value).ok()?,
        })
    }
}

/// Alpha Vantage connector. Construct with [`AlphaVantageConnector::new`].
#[derive(Debug, Clone)]
pub struct AlphaVantageConnector {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    interval: String,
}

fn parse_base_url(raw: &str) -> Result<Url, AlmanacError> {
    let mut s = raw.trim().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Url::parse(&s).map_err(|e| AlmanacError::InvalidArg(format!("invalid base url {raw}: {e}")))
}

impl AlphaVantageConnector {
    /// Static connector key for logs and priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("almanac-alphavantage");

    /// Connector against the public Alpha Vantage endpoint, monthly interval.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AlmanacError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AlmanacError::InvalidArg("alpha vantage api key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Ok(Self {
            client,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            api_key,
            interval: "monthly".into(),
        })
    }

    /// Point the connector at another server (e.g. a local mock).
    ///
    /// # Errors
    /// Returns `InvalidArg` when `base_url` does not parse.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AlmanacError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Use a caller-provided HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Override the series interval (`monthly` by default).
    #[must_use]
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    fn throttled(&self) -> AlmanacError {
        AlmanacError::rate_limited(Self::KEY.as_str())
    }

    // Alpha Vantage reports throttling and bad requests with HTTP 200 and a
    // message object instead of data.
    fn classify_body(&self, body: &serde_json::Value) -> Result<(), AlmanacError> {
        let Some(obj) = body.as_object() else {
            return Err(AlmanacError::Data("alpha vantage body is not an object".into()));
        };
        if obj.contains_key("data") {
            return Ok(());
        }
        if let Some(msg) = obj.get("Error Message").and_then(|v| v.as_str()) {
            return Err(AlmanacError::connector(Self::KEY.as_str(), msg));
        }
        if obj.contains_key("Note") || obj.contains_key("Information") {
            return Err(self.throttled());
        }
        Err(AlmanacError::Data("alpha vantage body has no data".into()))
    }
}

#[async_trait]
impl MacroSeriesProvider for AlphaVantageConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac_alphavantage::series",
            skip(self, series),
            fields(function = %series.function, series_id = %series.series_id),
        )
    )]
    async fn series(&self, series: &MacroSeries) -> Result<Vec<MacroObservation>, AlmanacError> {
        let mut url = self
            .base_url
            .join("query")
            .map_err(|e| AlmanacError::InvalidArg(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("function", &series.function)
            .append_pair("interval", &self.interval)
            .append_pair("apikey", &self.api_key);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AlmanacError::connector(Self::KEY.as_str(), e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(self.throttled());
        }
        if !status.is_success() {
            return Err(AlmanacError::connector(
                Self::KEY.as_str(),
                format!("GET query {}: HTTP {status}", series.function),
            ));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AlmanacError::Data(format!("alpha vantage {}: {e}", series.function)))?;
        self.classify_body(&body)?;
        let wire: SeriesWire = serde_json::from_value(body)
            .map_err(|e| AlmanacError::Data(format!("alpha vantage {}: {e}", series.function)))?;

        Ok(wire
            .data
            .into_iter()
            .filter_map(PointWire::into_observation)
            .collect())
    }
}

impl AlmanacConnector for AlphaVantageConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Alpha Vantage"
    }

    fn as_macro_series_provider(&self) -> Option<&dyn MacroSeriesProvider> {
        Some(self as &dyn MacroSeriesProvider)
    }
}
