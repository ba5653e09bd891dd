#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use almanac::{
    Almanac, AlmanacBuilder, AlmanacConnector, EarningsEvent, EconomicSchedule, Instrument,
    InstrumentProfile, MacroObservation, ManualClock, Quote, ReleaseTiming,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";
pub const CRWD: &str = "CRWD";

/// Calendar date without unwrap noise in tests.
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
}

/// 13:00 UTC on the given day (morning in New York).
pub fn at(y: i32, m: u32, day: u32) -> DateTime<Utc> {
    d(y, m, day)
        .and_hms_opt(13, 0, 0)
        .expect("valid test time")
        .and_utc()
}

pub fn clock_at(y: i32, m: u32, day: u32) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(at(y, m, day)))
}

pub fn inst(symbol: &str) -> Instrument {
    Instrument::new(symbol).expect("valid static test symbol")
}

pub fn universe(symbols: &[&str]) -> Vec<Instrument> {
    symbols.iter().map(|s| inst(s)).collect()
}

pub fn profile(symbol: &str, name: &str) -> InstrumentProfile {
    InstrumentProfile {
        instrument: inst(symbol),
        display_name: name.to_string(),
        logo_url: Some(format!("https://logo.example/{symbol}.png")),
    }
}

pub fn quote(symbol: &str, price: &str) -> Quote {
    Quote {
        instrument: inst(symbol),
        last_price: Some(price.parse::<Decimal>().expect("decimal literal")),
    }
}

pub fn event(symbol: &str, date: NaiveDate, eps: &str) -> EarningsEvent {
    let mut e = EarningsEvent::new(inst(symbol), date);
    e.eps_estimate = Some(eps.parse::<Decimal>().expect("decimal literal"));
    e.release_timing = ReleaseTiming::AfterClose;
    e
}

pub fn observation(date: NaiveDate, value: &str) -> MacroObservation {
    MacroObservation {
        date,
        value: value.parse::<Decimal>().expect("decimal literal"),
    }
}

/// Builder without pacing so tests only spend (virtual) time where they mean to.
pub fn unpaced(connector: Arc<dyn AlmanacConnector>, clock: Arc<ManualClock>) -> AlmanacBuilder {
    Almanac::builder()
        .with_connector(connector)
        .clock(clock)
        .request_delay(Duration::ZERO)
        .macro_request_delay(Duration::ZERO)
}

/// Default CPI/PPI schedule; its first week is 2025-08-11..15.
pub fn schedule() -> EconomicSchedule {
    EconomicSchedule::default()
}
