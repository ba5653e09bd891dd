use almanac_cache::CacheKey;
use almanac_core::{AlmanacError, EarningsByInstrument, FetchGroup};

use super::{GroupOutcome, RunContext, instrument_group};

/// Earnings events of every instrument within the run's window.
///
/// A failed instrument contributes an empty list. The group reports a single
/// progress unit once every instrument settled.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "almanac::fetch::earnings",
        skip(ctx),
        fields(generation = %ctx.generation, window = %ctx.window.cache_param()),
    )
)]
pub(crate) async fn earnings(
    ctx: &RunContext<'_>,
) -> Result<GroupOutcome<EarningsByInstrument>, AlmanacError> {
    let almanac = ctx.almanac;
    let window = ctx.window;
    instrument_group(
        ctx,
        FetchGroup::Earnings,
        CacheKey::for_group(FetchGroup::Earnings, Some(window.cache_param())),
        almanac.cfg.request_delay,
        false,
        move |inst| almanac.fetch_earnings(inst, window),
        |_| Vec::new(),
    )
    .await
}
