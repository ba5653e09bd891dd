//! Almanac records, report views, configuration primitives and the unified error type.
#![warn(missing_docs)]

mod capability;
mod config;
mod connector;
mod error;
mod records;
mod reports;
mod week;

pub use capability::{Capability, FetchGroup};
pub use config::{AlmanacConfig, BackoffConfig, ConcurrencyScope, DateWindow};
pub use connector::ConnectorKey;
pub use error::AlmanacError;
pub use records::{
    EarningsEvent, EconomicRelease, Instrument, InstrumentProfile, MacroObservation, MacroSeries,
    Quote, ReleaseTiming,
};
pub use reports::{
    CalendarDay, CalendarView, CompanyCardView, EconomicItemView, NextEarnings,
    NextEarningsIndex, Progress, WeeklyCalendar,
};
pub use week::WeekRange;
