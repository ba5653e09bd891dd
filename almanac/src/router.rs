//! Single-subject provider calls routed with priority and fallback.

use almanac_core::{
    AlmanacError, Capability, DateWindow, EarningsEvent, Instrument, InstrumentProfile,
    MacroObservation, MacroSeries, Quote,
};

use crate::Almanac;

impl Almanac {
    /// Fetch a profile from the first connector that can supply it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "almanac::router", skip(self), fields(symbol = %inst.symbol()))
    )]
    pub(crate) async fn fetch_profile(
        &self,
        inst: &Instrument,
    ) -> Result<InstrumentProfile, AlmanacError> {
        self.fetch_single(Capability::Profile, inst.symbol(), |c| {
            c.as_profile_provider()?;
            let inst = inst.clone();
            Some(async move {
                match c.as_profile_provider() {
                    Some(p) => p.profile(&inst).await,
                    None => Err(AlmanacError::connector(
                        c.name(),
                        "missing profile capability during call",
                    )),
                }
            })
        })
        .await
    }

    /// Fetch a quote from the first connector that can supply it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "almanac::router", skip(self), fields(symbol = %inst.symbol()))
    )]
    pub(crate) async fn fetch_quote(&self, inst: &Instrument) -> Result<Quote, AlmanacError> {
        self.fetch_single(Capability::Quote, inst.symbol(), |c| {
            c.as_quote_provider()?;
            let inst = inst.clone();
            Some(async move {
                match c.as_quote_provider() {
                    Some(p) => p.quote(&inst).await,
                    None => Err(AlmanacError::connector(
                        c.name(),
                        "missing quote capability during call",
                    )),
                }
            })
        })
        .await
    }

    /// Fetch the earnings events of `inst` within `window`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "almanac::router",
            skip(self, window),
            fields(symbol = %inst.symbol(), from = %window.from, to = %window.to),
        )
    )]
    pub(crate) async fn fetch_earnings(
        &self,
        inst: &Instrument,
        window: DateWindow,
    ) -> Result<Vec<EarningsEvent>, AlmanacError> {
        self.fetch_single(Capability::EarningsCalendar, inst.symbol(), |c| {
            c.as_earnings_calendar_provider()?;
            let inst = inst.clone();
            Some(async move {
                match c.as_earnings_calendar_provider() {
                    Some(p) => p.earnings_calendar(&inst, window.from, window.to).await,
                    None => Err(AlmanacError::connector(
                        c.name(),
                        "missing earnings-calendar capability during call",
                    )),
                }
            })
        })
        .await
    }

    /// Fetch every published observation of a macro series.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "almanac::router",
            skip(self, series),
            fields(series_id = %series.series_id, function = %series.function),
        )
    )]
    pub(crate) async fn fetch_series(
        &self,
        series: &MacroSeries,
    ) -> Result<Vec<MacroObservation>, AlmanacError> {
        self.fetch_single(Capability::MacroSeries, &series.series_id, |c| {
            c.as_macro_series_provider()?;
            let series = series.clone();
            Some(async move {
                match c.as_macro_series_provider() {
                    Some(p) => p.series(&series).await,
                    None => Err(AlmanacError::connector(
                        c.name(),
                        "missing macro-series capability during call",
                    )),
                }
            })
        })
        .await
    }
}
