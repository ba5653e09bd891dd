use std::sync::Arc;

use almanac::{Almanac, AlmanacConfig, AlmanacError, DateWindow, EconomicSchedule};
use almanac_mock::MockConnector;
use crate::helpers::*;

fn invalid(result: Result<Almanac, AlmanacError>) -> String {
    match result {
        Err(AlmanacError::InvalidArg(msg)) => msg,
        other => panic!("expected InvalidArg, got {other:?}"),
    }
}

#[test]
fn requires_a_connector() {
    let msg = invalid(Almanac::builder().build());
    assert!(msg.contains("no connectors"));
}

#[test]
fn rejects_empty_universe() {
    let msg = invalid(
        Almanac::builder()
            .with_connector(Arc::new(MockConnector::new()))
            .universe(vec![])
            .build(),
    );
    assert!(msg.contains("universe"));
}

#[test]
fn rejects_duplicate_instruments() {
    let msg = invalid(
        Almanac::builder()
            .with_connector(Arc::new(MockConnector::new()))
            .universe(universe(&[AAPL, MSFT, AAPL]))
            .build(),
    );
    assert!(msg.contains("AAPL"));
}

#[test]
fn rejects_zero_concurrency() {
    let msg = invalid(
        Almanac::builder()
            .with_connector(Arc::new(MockConnector::new()))
            .concurrency(0)
            .build(),
    );
    assert!(msg.contains("concurrency"));
}

#[test]
fn rejects_inverted_earnings_window() {
    let msg = invalid(
        Almanac::builder()
            .with_connector(Arc::new(MockConnector::new()))
            .earnings_window(DateWindow {
                from: d(2025, 12, 31),
                to: d(2025, 1, 1),
            })
            .build(),
    );
    assert!(msg.contains("2025-12-31..2025-01-01"));
}

#[test]
fn defaults_match_the_documented_configuration() {
    let almanac = Almanac::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .build()
        .unwrap();
    assert_eq!(almanac.config(), &AlmanacConfig::default());
    assert_eq!(almanac.universe().len(), 46);
    assert_eq!(almanac.schedule(), &EconomicSchedule::default());
    assert_eq!(almanac.connectors().len(), 1);
    assert_eq!(almanac.cache().ttl(), std::time::Duration::from_secs(86_400));
}

#[test]
fn config_from_json_drives_the_builder() {
    let cfg: AlmanacConfig =
        serde_json::from_str(r#"{ "concurrency": 4, "concurrency_scope": "Shared" }"#).unwrap();
    let almanac = Almanac::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .config(cfg.clone())
        .build()
        .unwrap();
    assert_eq!(almanac.config().concurrency, 4);
    assert_eq!(almanac.config(), &cfg);
}
