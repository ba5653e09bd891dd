//! The four fetch groups of a run.
//!
//! Each group consults the cache first and short-circuits on a complete,
//! fresh hit. Otherwise every task goes through the scheduler; failed tasks
//! become placeholders and the group's result is cached only when at least one
//! task actually succeeded.

mod earnings;
mod economic;
mod profiles;
mod quotes;

use std::collections::BTreeMap;
use std::time::Duration;

use almanac_cache::CacheKey;
use almanac_core::{AlmanacError, DateWindow, FetchGroup, Instrument};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::progress::RunGeneration;
use crate::scheduler::Scheduler;
use crate::{Almanac, backoff};

pub(crate) use earnings::earnings;
pub(crate) use economic::economic;
pub(crate) use profiles::profiles;
pub(crate) use quotes::quotes;

/// How one fetch group of a run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupReport {
    /// The group.
    pub group: FetchGroup,
    /// Whether the result came from the cache without any provider call.
    pub from_cache: bool,
    /// Tasks that produced real data.
    pub succeeded: usize,
    /// Tasks that fell back to a placeholder.
    pub failed: usize,
}

impl GroupReport {
    const fn new(group: FetchGroup) -> Self {
        Self {
            group,
            from_cache: false,
            succeeded: 0,
            failed: 0,
        }
    }

    const fn cached(group: FetchGroup) -> Self {
        Self {
            group,
            from_cache: true,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Whether the group produced any real data, from cache or providers.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.from_cache || self.succeeded > 0
    }
}

pub(crate) struct GroupOutcome<T> {
    pub data: T,
    pub report: GroupReport,
}

/// Everything a group needs from the run that owns it.
pub(crate) struct RunContext<'a> {
    pub almanac: &'a Almanac,
    pub generation: RunGeneration,
    pub scheduler: Scheduler,
    pub window: DateWindow,
}

impl<'a> RunContext<'a> {
    pub fn new(almanac: &'a Almanac, generation: RunGeneration, window: DateWindow) -> Self {
        Self {
            almanac,
            generation,
            scheduler: almanac.scheduler_for_run(),
            window,
        }
    }

    pub fn advance(&self, units: usize) {
        let units = u32::try_from(units).unwrap_or(u32::MAX);
        self.almanac.progress.advance(self.generation, units);
    }

    /// One provider task: throttling cooldowns, pacing after success and,
    /// when `signal` is set, exactly one progress unit whatever the outcome.
    pub async fn task<T, F, Fut>(
        &self,
        subject: &str,
        pacing: Duration,
        signal: bool,
        op: F,
    ) -> Result<T, AlmanacError>
    where
        F: FnMut() -> Fut,
        Fut: core::future::Future<Output = Result<T, AlmanacError>>,
    {
        let out = backoff::retry_rate_limited(&self.almanac.cfg.backoff, subject, op).await;
        if out.is_ok() && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
        if signal {
            self.advance(1);
        }
        out
    }

    /// Persist a group result unless every task fell back to a placeholder or
    /// a newer run has started since this one.
    pub async fn store<T: Serialize + Sync>(&self, key: &CacheKey, payload: &T, report: &GroupReport) {
        if !self.almanac.is_current(self.generation) {
            #[cfg(feature = "tracing")]
            tracing::debug!(group = %report.group, generation = %self.generation, "superseded run; result not cached");
            return;
        }
        if report.succeeded > 0 {
            self.almanac.cache.put(key, payload).await;
        } else {
            #[cfg(feature = "tracing")]
            tracing::info!(group = %report.group, "no task succeeded; result not cached");
        }
    }
}

fn covers_exactly<T>(map: &BTreeMap<Instrument, T>, universe: &[Instrument]) -> bool {
    map.len() == universe.len() && universe.iter().all(|i| map.contains_key(i))
}

/// Shared body of the per-instrument groups (profiles, quotes, earnings).
///
/// `per_task_progress` selects between one unit per instrument and a single
/// unit once the whole group settled.
pub(crate) async fn instrument_group<'a, T, F, Fut>(
    ctx: &RunContext<'a>,
    group: FetchGroup,
    key: CacheKey,
    pacing: Duration,
    per_task_progress: bool,
    fetch: F,
    placeholder: fn(&Instrument) -> T,
) -> Result<GroupOutcome<BTreeMap<Instrument, T>>, AlmanacError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'a,
    F: Fn(&'a Instrument) -> Fut + Sync,
    Fut: core::future::Future<Output = Result<T, AlmanacError>> + Send,
{
    let almanac: &'a Almanac = ctx.almanac;
    let universe: &'a [Instrument] = &almanac.universe;
    let weight = if per_task_progress { universe.len() } else { 1 };

    if let Some(cached) = almanac
        .cache
        .get::<BTreeMap<Instrument, T>>(&key)
        .await
        .filter(|m| covers_exactly(m, universe))
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(group = %group, key = %key, "serving group from cache");
        ctx.advance(weight);
        return Ok(GroupOutcome {
            data: cached,
            report: GroupReport::cached(group),
        });
    }

    let fetch = &fetch;
    let tasks: Vec<BoxFuture<'_, (&'a Instrument, Result<T, AlmanacError>)>> = universe
        .iter()
        .map(|inst| {
            async move {
                let res = ctx
                    .task(inst.symbol(), pacing, per_task_progress, || fetch(inst))
                    .await;
                (inst, res)
            }
            .boxed()
        })
        .collect();
    let settled = ctx.scheduler.run_all(group, tasks).await?;
    if !per_task_progress {
        ctx.advance(1);
    }

    let mut report = GroupReport::new(group);
    let mut data = BTreeMap::new();
    for (inst, res) in settled {
        let value = match res {
            Ok(v) => {
                report.succeeded += 1;
                v
            }
            Err(_e) => {
                report.failed += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!(group = %group, symbol = %inst, error = %_e, "using placeholder");
                placeholder(inst)
            }
        };
        data.insert(inst.clone(), value);
    }

    ctx.store(&key, &data, &report).await;
    Ok(GroupOutcome { data, report })
}
