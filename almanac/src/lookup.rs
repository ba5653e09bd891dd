use almanac_core::{AlmanacError, DateWindow, Instrument, NextEarnings, next_earnings_for};
use chrono::Days;

use crate::Almanac;

/// Days looked back from today by [`Almanac::lookup_next_earnings`].
pub const LOOKUP_DAYS_BACK: u64 = 270;
/// Days looked ahead from today by [`Almanac::lookup_next_earnings`].
pub const LOOKUP_DAYS_AHEAD: u64 = 180;

impl Almanac {
    /// Next earnings of any instrument, tracked or not, straight from the providers.
    ///
    /// Queries `[today - 270d, today + 180d]` and returns the earliest event on
    /// or after today. The cache and the published state are left alone.
    ///
    /// # Errors
    /// Returns the routed provider error when no connector could supply the
    /// calendar, after the usual throttling cooldown.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac::lookup_next_earnings",
            skip(self),
            fields(symbol = %inst.symbol()),
        )
    )]
    pub async fn lookup_next_earnings(
        &self,
        inst: &Instrument,
    ) -> Result<Option<NextEarnings>, AlmanacError> {
        let today = self.today();
        let window = DateWindow {
            from: today
                .checked_sub_days(Days::new(LOOKUP_DAYS_BACK))
                .unwrap_or(today),
            to: today
                .checked_add_days(Days::new(LOOKUP_DAYS_AHEAD))
                .unwrap_or(today),
        };
        let events = crate::backoff::retry_rate_limited(&self.cfg.backoff, inst.symbol(), || {
            self.fetch_earnings(inst, window)
        })
        .await?;
        Ok(next_earnings_for(&events, today))
    }
}
