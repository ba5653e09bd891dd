//! Report views produced by the aggregator and published by the orchestrator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::records::{EarningsEvent, EconomicRelease, Instrument, ReleaseTiming};
use crate::week::WeekRange;

/// One company card shown on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCardView {
    /// Reporting instrument.
    pub instrument: Instrument,
    /// Release date.
    pub date: NaiveDate,
    /// Consensus EPS estimate.
    pub eps_estimate: Option<Decimal>,
    /// Consensus revenue estimate.
    pub revenue_estimate: Option<Decimal>,
    /// Session timing of the release.
    pub release_timing: ReleaseTiming,
}

impl CompanyCardView {
    /// Revenue estimate in billions, e.g. `$94.27B`.
    #[must_use]
    pub fn revenue_label(&self) -> Option<String> {
        self.revenue_estimate
            .map(|r| format!("${:.2}B", (r / Decimal::from(1_000_000_000u64)).round_dp(2)))
    }

    /// EPS estimate, e.g. `$1.43`.
    #[must_use]
    pub fn eps_label(&self) -> Option<String> {
        self.eps_estimate.map(|e| format!("${:.2}", e.round_dp(2)))
    }

    /// True for after-close releases.
    #[must_use]
    pub fn is_post_market(&self) -> bool {
        self.release_timing == ReleaseTiming::AfterClose
    }

    /// See [`ReleaseTiming::describe`].
    #[must_use]
    pub const fn timing_label(&self) -> &'static str {
        self.release_timing.describe()
    }
}

impl From<&EarningsEvent> for CompanyCardView {
    fn from(e: &EarningsEvent) -> Self {
        Self {
            instrument: e.instrument.clone(),
            date: e.date,
            eps_estimate: e.eps_estimate,
            revenue_estimate: e.revenue_estimate,
            release_timing: e.release_timing,
        }
    }
}

/// One macroeconomic release shown on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicItemView {
    /// Display name.
    pub name: String,
    /// Series identifier.
    pub series_id: String,
    /// Latest published value, when fetched.
    pub value: Option<Decimal>,
    /// Period date of `value`.
    pub as_of: Option<NaiveDate>,
}

impl From<&EconomicRelease> for EconomicItemView {
    fn from(r: &EconomicRelease) -> Self {
        Self {
            name: r.name.clone(),
            series_id: r.series_id.clone(),
            value: r.value,
            as_of: r.as_of,
        }
    }
}

/// All calendar entries falling on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The day; ordering key.
    pub date: NaiveDate,
    /// Weekday name and `MM/DD`, e.g. `Tuesday 08/12`.
    pub day_label: String,
    /// Earnings releases in universe order.
    pub companies: Vec<CompanyCardView>,
    /// Macro releases in schedule order.
    pub economic_items: Vec<EconomicItemView>,
}

/// The next upcoming earnings release of an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextEarnings {
    /// Release date.
    pub date: NaiveDate,
    /// Consensus EPS estimate.
    pub eps_estimate: Option<Decimal>,
    /// Consensus revenue estimate.
    pub revenue_estimate: Option<Decimal>,
    /// Session timing of the release.
    pub release_timing: ReleaseTiming,
}

impl From<&EarningsEvent> for NextEarnings {
    fn from(e: &EarningsEvent) -> Self {
        Self {
            date: e.date,
            eps_estimate: e.eps_estimate,
            revenue_estimate: e.revenue_estimate,
            release_timing: e.release_timing,
        }
    }
}

/// Next earnings per instrument; has an entry for every instrument of the universe.
pub type NextEarningsIndex = BTreeMap<Instrument, Option<NextEarnings>>;

/// Aggregated view of one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCalendar {
    /// Displayed week.
    pub week: WeekRange,
    /// Days with at least one entry, ascending by date.
    pub days: Vec<CalendarDay>,
    /// Upcoming earnings for every instrument.
    pub next_earnings: NextEarningsIndex,
    /// Instruments without a release this week, soonest next release first.
    pub missing: Vec<Instrument>,
}

/// Calendar snapshot published to observers once a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarView {
    /// Aggregated week.
    pub calendar: WeeklyCalendar,
    /// Advisory message when nothing could be fetched.
    pub error: Option<String>,
}

/// Run progress; `completed <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Units finished so far.
    pub completed: u32,
    /// Units in the run.
    pub total: u32,
}

impl Progress {
    /// Completion ratio in `[0, 1]`; an empty run counts as done.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            f64::from(self.completed.min(self.total)) / f64::from(self.total)
        }
    }

    /// Whether every unit has completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}
