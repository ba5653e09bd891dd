//! Run lifecycle and the state published to observers.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

use almanac_core::{
    AlmanacError, CalendarView, DateWindow, Instrument, InstrumentProfile, NextEarnings,
    Progress, Quote, WeekRange, aggregate, market_today,
};
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::Almanac;
use crate::fetch::{self, GroupReport, RunContext};
use crate::progress::RunGeneration;

/// Advisory attached to a calendar when nothing at all could be fetched.
pub const NO_DATA_ADVISORY: &str = "no data could be fetched";

/// Where the pipeline is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No run triggered yet.
    #[default]
    Idle,
    /// Provider groups are running.
    Fetching,
    /// Groups settled; the calendar is being built.
    Aggregating,
    /// The latest run published its calendar.
    Ready,
    /// The latest run failed as a whole; see [`Almanac::last_error`].
    Error,
}

/// Outcome of one call to [`Almanac::trigger_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Generation of the run.
    pub generation: RunGeneration,
    /// Week the run aggregated.
    pub week: WeekRange,
    /// The calendar the run built.
    pub view: CalendarView,
    /// Per-group outcome, in [`almanac_core::FetchGroup::ALL`] order.
    pub groups: Vec<GroupReport>,
    /// True when a newer run had started, so nothing was published.
    pub superseded: bool,
}

impl RunReport {
    /// Report of one group.
    #[must_use]
    pub fn group(&self, group: almanac_core::FetchGroup) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.group == group)
    }

    /// Whether every group was served from the cache.
    #[must_use]
    pub fn fully_cached(&self) -> bool {
        self.groups.iter().all(|g| g.from_cache)
    }
}

/// What observers see between runs.
#[derive(Debug, Default)]
pub(crate) struct Published {
    pub state: PipelineState,
    pub last_error: Option<AlmanacError>,
    pub week: Option<WeekRange>,
    pub calendar: Option<CalendarView>,
    pub profiles: BTreeMap<Instrument, InstrumentProfile>,
    pub quotes: BTreeMap<Instrument, Quote>,
}

impl Almanac {
    fn read_published(&self) -> RwLockReadGuard<'_, Published> {
        self.published.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_published(&self) -> RwLockWriteGuard<'_, Published> {
        self.published.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_current(&self, generation: RunGeneration) -> bool {
        self.runs.load(Ordering::SeqCst) == generation.get()
    }

    /// Apply `f` to the published state if `generation` is still the latest run.
    fn publish(&self, generation: RunGeneration, f: impl FnOnce(&mut Published)) -> bool {
        let mut guard = self.write_published();
        if !self.is_current(generation) {
            #[cfg(feature = "tracing")]
            tracing::debug!(generation = %generation, "superseded run; not publishing");
            return false;
        }
        let before = guard.state;
        f(&mut guard);
        #[cfg(feature = "tracing")]
        {
            if before != guard.state {
                tracing::info!(generation = %generation, from = ?before, to = ?guard.state, "pipeline state");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = before;
        true
    }

    fn fail(&self, generation: RunGeneration, e: &AlmanacError) {
        self.publish(generation, |p| {
            p.state = PipelineState::Error;
            p.last_error = Some(e.clone());
        });
    }

    /// Progress units of a run: one per profile and quote task, one for the
    /// earnings group, one per macro endpoint.
    #[must_use]
    pub fn progress_total(&self) -> u32 {
        let n = self.universe.len();
        let m = self.schedule.endpoints.len();
        u32::try_from(2 * n + 1 + m).unwrap_or(u32::MAX)
    }

    /// Current date in the market time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        market_today(self.clock.as_ref(), self.cfg.market_timezone)
    }

    /// Run the whole pipeline for the week containing `week_start`.
    ///
    /// Progress restarts at `(0, total)`. With `force_refresh` every cache entry
    /// is dropped first. The four fetch groups run concurrently; once all of them
    /// settled the calendar is aggregated and, unless a newer run started in the
    /// meantime, published together with the profiles and quotes.
    ///
    /// # Errors
    /// Returns `Storage` when a forced refresh cannot clear the cache and
    /// `Scheduler` when a group could not be run at all. Both leave the
    /// pipeline in [`PipelineState::Error`]. Failures of individual provider
    /// calls are not errors; they yield placeholders.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac::pipeline::trigger_run",
            skip(self),
            fields(week_start = %week_start, force_refresh = force_refresh),
        )
    )]
    pub async fn trigger_run(
        &self,
        week_start: NaiveDate,
        force_refresh: bool,
    ) -> Result<RunReport, AlmanacError> {
        let generation = RunGeneration::from_raw(self.runs.fetch_add(1, Ordering::SeqCst) + 1);
        let week = WeekRange::containing(week_start);
        let today = self.today();
        let window = self
            .cfg
            .earnings_window
            .unwrap_or_else(|| DateWindow::calendar_year(today));

        self.publish(generation, |p| {
            p.state = PipelineState::Fetching;
            p.last_error = None;
            p.week = Some(week);
        });
        self.progress.reset(generation, self.progress_total());

        if force_refresh && let Err(e) = self.cache.clear_all().await {
            self.fail(generation, &e);
            return Err(e);
        }

        let ctx = RunContext::new(self, generation, window);
        let (profiles, quotes, earnings, economic) = tokio::join!(
            fetch::profiles(&ctx),
            fetch::quotes(&ctx),
            fetch::earnings(&ctx),
            fetch::economic(&ctx),
        );
        let settled = profiles.and_then(|p| Ok((p, quotes?, earnings?, economic?)));
        let (profiles, quotes, earnings, economic) = match settled {
            Ok(groups) => groups,
            Err(e) => {
                self.fail(generation, &e);
                return Err(e);
            }
        };

        self.publish(generation, |p| p.state = PipelineState::Aggregating);
        let calendar = aggregate(&week, today, &self.universe, &earnings.data, &economic.data);
        let groups = vec![profiles.report, quotes.report, earnings.report, economic.report];
        let error = (!groups.iter().any(GroupReport::has_data)).then(|| {
            #[cfg(feature = "tracing")]
            tracing::warn!(generation = %generation, "every fetch failed");
            NO_DATA_ADVISORY.to_string()
        });
        let view = CalendarView { calendar, error };

        let published = self.publish(generation, |p| {
            p.state = PipelineState::Ready;
            p.calendar = Some(view.clone());
            p.profiles = profiles.data;
            p.quotes = quotes.data;
        });

        Ok(RunReport {
            generation,
            week,
            view,
            groups,
            superseded: !published,
        })
    }

    /// Clear the cache and re-run the week shown last (or the current week).
    ///
    /// # Errors
    /// See [`Almanac::trigger_run`].
    pub async fn refresh(&self) -> Result<RunReport, AlmanacError> {
        let week = self.read_published().week;
        let start = week.map_or_else(|| self.today(), |w| w.start);
        self.trigger_run(start, true).await
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.read_published().state
    }

    /// Error of the latest run, when it ended in [`PipelineState::Error`].
    #[must_use]
    pub fn last_error(&self) -> Option<AlmanacError> {
        self.read_published().last_error.clone()
    }

    /// Progress of the latest run.
    #[must_use]
    pub fn current_progress(&self) -> Progress {
        self.progress.current()
    }

    /// Receiver notified whenever progress changes.
    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Calendar published by the latest completed run.
    #[must_use]
    pub fn current_calendar(&self) -> Option<CalendarView> {
        self.read_published().calendar.clone()
    }

    /// Week of the latest triggered run.
    #[must_use]
    pub fn current_week(&self) -> Option<WeekRange> {
        self.read_published().week
    }

    /// Next upcoming earnings of `inst` from the published calendar.
    #[must_use]
    pub fn next_earnings(&self, inst: &Instrument) -> Option<NextEarnings> {
        self.read_published()
            .calendar
            .as_ref()
            .and_then(|v| v.calendar.next_earnings.get(inst).cloned().flatten())
    }

    /// Published profile of `inst` (real or placeholder).
    #[must_use]
    pub fn profile(&self, inst: &Instrument) -> Option<InstrumentProfile> {
        self.read_published().profiles.get(inst).cloned()
    }

    /// Published quote of `inst` (real or placeholder).
    #[must_use]
    pub fn quote(&self, inst: &Instrument) -> Option<Quote> {
        self.read_published().quotes.get(inst).cloned()
    }
}
