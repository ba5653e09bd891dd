//! Weekly calendar aggregation: pure reshaping of fetched data into report views.

mod aggregate;
mod format;

pub use aggregate::{EarningsByInstrument, aggregate, next_earnings_for};
pub use format::day_label;
