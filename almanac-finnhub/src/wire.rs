//! Finnhub response payloads and their conversion into Almanac records.

use almanac_core::{EarningsEvent, Instrument, InstrumentProfile, Quote, ReleaseTiming};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileWire {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl ProfileWire {
    /// `None` when Finnhub answered with an empty object (unknown symbol).
    pub(crate) fn into_profile(self, instrument: &Instrument) -> Option<InstrumentProfile> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        Some(InstrumentProfile {
            instrument: instrument.clone(),
            display_name: name,
            logo_url: self.logo.filter(|l| !l.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteWire {
    /// Current price; Finnhub reports 0 for unknown symbols.
    #[serde(default)]
    pub c: Option<f64>,
}

impl QuoteWire {
    pub(crate) fn into_quote(self, instrument: &Instrument) -> Quote {
        Quote {
            instrument: instrument.clone(),
            last_price: self.c.filter(|p| *p != 0.0).and_then(decimal),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EarningsCalendarWire {
    #[serde(rename = "earningsCalendar", default)]
    pub earnings_calendar: Vec<EarningsRowWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EarningsRowWire {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub hour: Option<String>,
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub eps_actual: Option<f64>,
    #[serde(default)]
    pub revenue_estimate: Option<f64>,
    #[serde(default)]
    pub revenue_actual: Option<f64>,
    #[serde(default)]
    pub quarter: Option<u8>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl EarningsRowWire {
    /// Rows without a parseable date, or for another symbol, are dropped.
    pub(crate) fn into_event(self, instrument: &Instrument) -> Option<EarningsEvent> {
        if let Some(sym) = &self.symbol
            && !sym.eq_ignore_ascii_case(instrument.symbol())
        {
            return None;
        }
        let date = NaiveDate::parse_from_str(self.date.as_deref()?.trim(), "%Y-%m-%d").ok()?;
        Some(EarningsEvent {
            instrument: instrument.clone(),
            date,
            eps_estimate: self.eps_estimate.and_then(decimal),
            revenue_estimate: self.revenue_estimate.and_then(decimal),
            release_timing: self
                .hour
                .as_deref()
                .map_or(ReleaseTiming::Unspecified, ReleaseTiming::from_hour_code),
            eps_actual: self.eps_actual.and_then(decimal),
            revenue_actual: self.revenue_actual.and_then(decimal),
            fiscal_quarter: self.quarter,
            fiscal_year: self.year,
        })
    }
}

fn decimal(v: f64) -> Option<Decimal> {
    Decimal::try_from(v).ok()
}
