use std::collections::BTreeMap;

use almanac_cache::CacheKey;
use almanac_core::{AlmanacError, FetchGroup, Instrument, Quote};

use super::{GroupOutcome, RunContext, instrument_group};

/// Last prices for the whole universe, cached under `prices`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "almanac::fetch::quotes",
        skip(ctx),
        fields(generation = %ctx.generation),
    )
)]
pub(crate) async fn quotes(
    ctx: &RunContext<'_>,
) -> Result<GroupOutcome<BTreeMap<Instrument, Quote>>, AlmanacError> {
    let almanac = ctx.almanac;
    instrument_group(
        ctx,
        FetchGroup::Quotes,
        CacheKey::for_group(FetchGroup::Quotes, None),
        almanac.cfg.request_delay,
        true,
        |inst| almanac.fetch_quote(inst),
        Quote::placeholder,
    )
    .await
}
