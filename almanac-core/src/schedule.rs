//! Static macroeconomic release schedule and the series that back-fill it.

use almanac_types::{EconomicRelease, MacroSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scheduled releases plus the provider series that supply their values.
///
/// Releases are matched to series by `series_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicSchedule {
    /// Scheduled releases, in display order.
    pub releases: Vec<EconomicRelease>,
    /// Series fetched from the macro provider, one task each.
    pub endpoints: Vec<MacroSeries>,
}

impl EconomicSchedule {
    /// Build a schedule from parts.
    #[must_use]
    pub const fn new(releases: Vec<EconomicRelease>, endpoints: Vec<MacroSeries>) -> Self {
        Self {
            releases,
            endpoints,
        }
    }

    /// The CPI and PPI releases published in the second half of 2025.
    #[must_use]
    pub fn us_inflation_2025() -> Self {
        const CPI: &str = "CPI (All Urban Consumers)";
        const PPI: &str = "PPI (All Commodities)";
        const CPI_DATES: [(u32, u32); 5] = [(8, 12), (9, 9), (10, 14), (11, 11), (12, 9)];
        const PPI_DATES: [(u32, u32); 5] = [(8, 14), (9, 11), (10, 16), (11, 13), (12, 11)];

        let mut releases = Vec::with_capacity(CPI_DATES.len() + PPI_DATES.len());
        for (m, d) in CPI_DATES {
            if let Some(date) = NaiveDate::from_ymd_opt(2025, m, d) {
                releases.push(EconomicRelease::scheduled(CPI, "CPIAUCSL", date));
            }
        }
        for (m, d) in PPI_DATES {
            if let Some(date) = NaiveDate::from_ymd_opt(2025, m, d) {
                releases.push(EconomicRelease::scheduled(PPI, "PPIACO", date));
            }
        }
        let endpoints = vec![
            MacroSeries::new("CPI", CPI, "CPIAUCSL"),
            MacroSeries::new("PPI", PPI, "PPIACO"),
        ];
        Self::new(releases, endpoints)
    }
}

impl Default for EconomicSchedule {
    fn default() -> Self {
        Self::us_inflation_2025()
    }
}
