use almanac_cache::CacheKey;
use almanac_core::{AlmanacError, EconomicRelease, FetchGroup, MacroObservation, MacroSeries};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::{GroupOutcome, GroupReport, RunContext};

/// Latest observation by period date.
fn latest(observations: Vec<MacroObservation>) -> Option<MacroObservation> {
    observations.into_iter().max_by_key(|o| o.date)
}

/// Scheduled macro releases back-filled with the latest value of their series.
///
/// One task per endpoint. Every release sharing the endpoint's `series_id`
/// gets its value, or none when the endpoint failed.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "almanac::fetch::economic",
        skip(ctx),
        fields(generation = %ctx.generation, window = %ctx.window.cache_param()),
    )
)]
pub(crate) async fn economic(
    ctx: &RunContext<'_>,
) -> Result<GroupOutcome<Vec<EconomicRelease>>, AlmanacError> {
    let almanac = ctx.almanac;
    let schedule = &almanac.schedule;
    let key = CacheKey::for_group(FetchGroup::Economic, Some(ctx.window.cache_param()));

    if let Some(cached) = almanac
        .cache
        .get::<Vec<EconomicRelease>>(&key)
        .await
        .filter(|v| v.len() == schedule.releases.len())
    {
        ctx.advance(schedule.endpoints.len());
        return Ok(GroupOutcome {
            data: cached,
            report: GroupReport::cached(FetchGroup::Economic),
        });
    }

    let pacing = almanac.cfg.macro_request_delay;
    let tasks: Vec<BoxFuture<'_, (&MacroSeries, Result<MacroObservation, AlmanacError>)>> =
        schedule
            .endpoints
            .iter()
            .map(|series| {
                async move {
                    let res = ctx
                        .task(&series.series_id, pacing, true, || almanac.fetch_series(series))
                        .await
                        .and_then(|obs| {
                            latest(obs).ok_or_else(|| {
                                AlmanacError::Data(format!(
                                    "no observations for {}",
                                    series.series_id
                                ))
                            })
                        });
                    (series, res)
                }
                .boxed()
            })
            .collect();
    let settled = ctx.scheduler.run_all(FetchGroup::Economic, tasks).await?;

    let mut report = GroupReport::new(FetchGroup::Economic);
    let mut releases = schedule.releases.clone();
    for (series, res) in settled {
        let point = match res {
            Ok(obs) => {
                report.succeeded += 1;
                Some(obs)
            }
            Err(_e) => {
                report.failed += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!(series_id = %series.series_id, error = %_e, "macro series unavailable");
                None
            }
        };
        for r in releases.iter_mut().filter(|r| r.series_id == series.series_id) {
            r.value = point.map(|o| o.value);
            r.as_of = point.map(|o| o.date);
        }
    }

    ctx.store(&key, &releases, &report).await;
    Ok(GroupOutcome {
        data: releases,
        report,
    })
}
