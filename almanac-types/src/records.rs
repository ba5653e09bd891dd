//! Provider-facing records produced by connectors and consumed by the aggregator.

use core::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AlmanacError;

/// A tracked instrument, identified by its ticker symbol.
///
/// Serialised as the bare symbol; deserialisation applies the same checks as
/// [`Instrument::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instrument(String);

impl Instrument {
    /// Build an instrument from a ticker symbol.
    ///
    /// Surrounding whitespace is trimmed; case is preserved.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the symbol is empty or whitespace only.
    pub fn new(symbol: impl Into<String>) -> Result<Self, AlmanacError> {
        let raw = symbol.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AlmanacError::InvalidArg(
                "instrument symbol must not be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Instrument {
    type Error = AlmanacError;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        Self::new(symbol)
    }
}

impl From<Instrument> for String {
    fn from(inst: Instrument) -> Self {
        inst.0
    }
}

impl AsRef<str> for Instrument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// When an earnings release happens relative to the trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReleaseTiming {
    /// Before the market opens ("bmo").
    BeforeOpen,
    /// After the market closes ("amc").
    AfterClose,
    /// Not reported or not recognised.
    #[default]
    Unspecified,
}

impl ReleaseTiming {
    /// Map a provider hour code (`bmo`, `amc`, ...) to a timing, case-insensitively.
    #[must_use]
    pub fn from_hour_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "bmo" => Self::BeforeOpen,
            "amc" => Self::AfterClose,
            _ => Self::Unspecified,
        }
    }

    /// Human readable description; empty when unspecified.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::BeforeOpen => "Before Market Opens",
            Self::AfterClose => "After Market Closes",
            Self::Unspecified => "",
        }
    }
}

/// One scheduled (or reported) earnings release for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsEvent {
    /// Reporting instrument.
    pub instrument: Instrument,
    /// Release date.
    pub date: NaiveDate,
    /// Consensus EPS estimate.
    pub eps_estimate: Option<Decimal>,
    /// Consensus revenue estimate, in currency units.
    pub revenue_estimate: Option<Decimal>,
    /// Session timing of the release.
    pub release_timing: ReleaseTiming,
    /// Reported EPS once the release happened.
    #[serde(default)]
    pub eps_actual: Option<Decimal>,
    /// Reported revenue once the release happened.
    #[serde(default)]
    pub revenue_actual: Option<Decimal>,
    /// Fiscal quarter the release covers.
    #[serde(default)]
    pub fiscal_quarter: Option<u8>,
    /// Fiscal year the release covers.
    #[serde(default)]
    pub fiscal_year: Option<i32>,
}

impl EarningsEvent {
    /// Event with only a date; estimates and actuals empty.
    #[must_use]
    pub const fn new(instrument: Instrument, date: NaiveDate) -> Self {
        Self {
            instrument,
            date,
            eps_estimate: None,
            revenue_estimate: None,
            release_timing: ReleaseTiming::Unspecified,
            eps_actual: None,
            revenue_actual: None,
            fiscal_quarter: None,
            fiscal_year: None,
        }
    }
}

/// A macroeconomic series endpoint queried from the macro provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroSeries {
    /// Provider function name, e.g. `CPI`.
    pub function: String,
    /// Display name, e.g. `CPI (All Urban Consumers)`.
    pub name: String,
    /// Series identifier shared with the release schedule, e.g. `CPIAUCSL`.
    pub series_id: String,
}

impl MacroSeries {
    /// Convenience constructor.
    pub fn new(
        function: impl Into<String>,
        name: impl Into<String>,
        series_id: impl Into<String>,
    ) -> Self {
        Self {
            function: function.into(),
            name: name.into(),
            series_id: series_id.into(),
        }
    }
}

/// One published data point of a macro series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroObservation {
    /// Observation period date.
    pub date: NaiveDate,
    /// Published value.
    pub value: Decimal,
}

/// A scheduled macroeconomic release, back-filled with the latest published value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicRelease {
    /// Display name.
    pub name: String,
    /// Series identifier used to match macro fetch results.
    pub series_id: String,
    /// Scheduled release date.
    pub date: NaiveDate,
    /// Latest published value of the series, when fetched.
    pub value: Option<Decimal>,
    /// Period date of `value`.
    pub as_of: Option<NaiveDate>,
}

impl EconomicRelease {
    /// Scheduled release without fetched data.
    pub fn scheduled(name: impl Into<String>, series_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            series_id: series_id.into(),
            date,
            value: None,
            as_of: None,
        }
    }
}

/// Display metadata for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Profiled instrument.
    pub instrument: Instrument,
    /// Company name, or the symbol for placeholders.
    pub display_name: String,
    /// Logo image URL.
    pub logo_url: Option<String>,
}

impl InstrumentProfile {
    /// Well-formed profile used when the fetch ultimately fails.
    #[must_use]
    pub fn placeholder(instrument: &Instrument) -> Self {
        Self {
            instrument: instrument.clone(),
            display_name: instrument.symbol().to_string(),
            logo_url: None,
        }
    }
}

/// Last traded price for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted instrument.
    pub instrument: Instrument,
    /// Last price, if known.
    pub last_price: Option<Decimal>,
}

impl Quote {
    /// Well-formed quote used when the fetch ultimately fails.
    #[must_use]
    pub fn placeholder(instrument: &Instrument) -> Self {
        Self {
            instrument: instrument.clone(),
            last_price: None,
        }
    }
}
