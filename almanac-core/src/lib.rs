//! almanac-core
//!
//! Core traits and pure logic shared across the almanac workspace.
//!
//! - `connector`: the `AlmanacConnector` trait and capability provider traits.
//! - `store`: the byte-level `PersistenceBackend` seam underneath the cache.
//! - `clock`: injectable time source.
//! - `universe` / `schedule`: the tracked instruments and macro release schedule.
//! - `calendar`: the weekly calendar aggregator.
#![warn(missing_docs)]

/// Weekly calendar aggregation.
pub mod calendar;
/// Injectable clocks.
pub mod clock;
/// Connector capability traits and the primary `AlmanacConnector` interface.
pub mod connector;
/// Static macro release schedule.
pub mod schedule;
/// Persistence backend trait.
pub mod store;
/// Default instrument universe.
pub mod universe;

pub use almanac_types::*;
pub use calendar::{EarningsByInstrument, aggregate, day_label, next_earnings_for};
pub use clock::{Clock, ManualClock, SystemClock, market_today};
pub use connector::{
    AlmanacConnector, EarningsCalendarProvider, MacroSeriesProvider, ProfileProvider,
    QuoteProvider,
};
pub use schedule::EconomicSchedule;
pub use store::PersistenceBackend;
pub use universe::{DEFAULT_SYMBOLS, default_universe, universe_from_symbols};
