use core::fmt;
use serde::{Deserialize, Serialize};

/// Provider capability labels for routing, errors, and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Company profile (display name, logo).
    Profile,
    /// Point-in-time quote.
    Quote,
    /// Earnings calendar over a date window.
    EarningsCalendar,
    /// Macroeconomic series observations.
    MacroSeries,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Quote => "quote",
            Self::EarningsCalendar => "earnings-calendar",
            Self::MacroSeries => "macro-series",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four provider fetch groups making up a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FetchGroup {
    /// Per-instrument company profiles.
    Profiles,
    /// Per-instrument last prices.
    Quotes,
    /// Per-instrument earnings events over the fetch window.
    Earnings,
    /// Per-endpoint macro series back-filling the release schedule.
    Economic,
}

impl FetchGroup {
    /// Every group, in the order they are reported.
    pub const ALL: [Self; 4] = [Self::Profiles, Self::Quotes, Self::Earnings, Self::Economic];

    /// Cache kind under which the group's complete result is stored.
    #[must_use]
    pub const fn cache_kind(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Quotes => "prices",
            Self::Earnings => "earnings-year",
            Self::Economic => "economic-year",
        }
    }
}

impl fmt::Display for FetchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Profiles => "profiles",
            Self::Quotes => "quotes",
            Self::Earnings => "earnings",
            Self::Economic => "economic",
        };
        f.write_str(s)
    }
}
