//! Almanac builds a weekly earnings and macro release calendar from several
//! rate-limited data providers.
//!
//! Overview
//! - Routes each request to the registered connectors exposing the capability,
//!   in registration order, with a per-provider timeout and fallback.
//! - Runs four fetch groups per run (profiles, quotes, earnings, economic),
//!   each bounded by a concurrency limit and paced between requests.
//! - Caches every group result behind a time-to-live; a refresh drops the cache.
//! - Aggregates whatever arrived, placeholders included, into a
//!   [`WeeklyCalendar`] with a next-earnings index.
//!
//! Key behaviors and trade-offs
//! - Partial failure: a failed provider call never fails a run. Profiles and
//!   quotes fall back to placeholders, earnings to an empty list, macro values
//!   to none. Only a failed cache clear or an unschedulable group fails a run.
//! - Throttling: a rate-limited task sleeps one fixed cooldown and retries once;
//!   cheap on quota, slow to recover from sustained throttling.
//! - Caching: whole groups are cached and only reused when they cover exactly
//!   the configured universe (or schedule). Changing the universe refetches the
//!   group instead of merging per instrument.
//! - Overlapping runs: each run gets a [`RunGeneration`]; a run that finishes
//!   after a newer one started publishes nothing.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use almanac::Almanac;
//! use almanac_mock::MockConnector;
//!
//! let almanac = Almanac::builder()
//!     .with_connector(Arc::new(MockConnector::new()))
//!     .build()?;
//!
//! let mut progress = almanac.subscribe_progress();
//! let report = almanac.trigger_run(almanac.today(), false).await?;
//! for day in &report.view.calendar.days {
//!     println!("{}: {} companies", day.day_label, day.companies.len());
//! }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod backoff;
mod fetch;
mod lookup;
mod pipeline;
mod progress;
mod router;
mod scheduler;
mod util;

pub use crate::core::{Almanac, AlmanacBuilder, tag_err};
pub use backoff::{jitter_wait, retry_rate_limited};
pub use fetch::GroupReport;
pub use lookup::{LOOKUP_DAYS_AHEAD, LOOKUP_DAYS_BACK};
pub use pipeline::{NO_DATA_ADVISORY, PipelineState, RunReport};
pub use progress::{ProgressTracker, RunGeneration};
pub use scheduler::Scheduler;
pub use util::collapse_errors;

pub use almanac_cache::{CacheKey, CacheStats, CacheStore, FileBackend, MemoryBackend};

// Re-export core types for convenience
pub use almanac_core::{
    AlmanacConfig, AlmanacConnector, AlmanacError, BackoffConfig, CalendarDay, CalendarView,
    Capability, Clock, CompanyCardView, ConcurrencyScope, DateWindow, EarningsEvent,
    EconomicItemView, EconomicRelease, EconomicSchedule, FetchGroup, Instrument,
    InstrumentProfile, MacroObservation, MacroSeries, ManualClock, NextEarnings,
    NextEarningsIndex, PersistenceBackend, Progress, Quote, ReleaseTiming, SystemClock,
    WeekRange, WeeklyCalendar, default_universe, universe_from_symbols,
};
