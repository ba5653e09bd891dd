use std::collections::BTreeMap;

use almanac_cache::CacheKey;
use almanac_core::{AlmanacError, FetchGroup, Instrument, InstrumentProfile};

use super::{GroupOutcome, RunContext, instrument_group};

/// Company profiles for the whole universe; failures become placeholders.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "almanac::fetch::profiles",
        skip(ctx),
        fields(generation = %ctx.generation),
    )
)]
pub(crate) async fn profiles(
    ctx: &RunContext<'_>,
) -> Result<GroupOutcome<BTreeMap<Instrument, InstrumentProfile>>, AlmanacError> {
    let almanac = ctx.almanac;
    instrument_group(
        ctx,
        FetchGroup::Profiles,
        CacheKey::for_group(FetchGroup::Profiles, None),
        almanac.cfg.request_delay,
        true,
        |inst| almanac.fetch_profile(inst),
        InstrumentProfile::placeholder,
    )
    .await
}
