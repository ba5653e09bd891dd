use std::sync::Arc;
use std::time::Duration;

use almanac::{
    AlmanacError, Capability, FetchGroup, InstrumentProfile, NO_DATA_ADVISORY, PipelineState,
    Quote,
};
use almanac_mock::{DynamicMockConnector, DynamicMockController, MockBehavior};
use crate::helpers::*;

/// Scripts real data for AAPL and MSFT on every capability.
async fn script_all(ctrl: &DynamicMockController) {
    ctrl.set_profile_behavior(AAPL, MockBehavior::Return(profile(AAPL, "Apple Inc")))
        .await;
    ctrl.set_profile_behavior(MSFT, MockBehavior::Return(profile(MSFT, "Microsoft Corp")))
        .await;
    ctrl.set_quote_behavior(AAPL, MockBehavior::Return(quote(AAPL, "229.31")))
        .await;
    ctrl.set_quote_behavior(MSFT, MockBehavior::Return(quote(MSFT, "522.57")))
        .await;
    ctrl.set_earnings_behavior(
        AAPL,
        MockBehavior::Return(vec![event(AAPL, d(2025, 8, 12), "1.43")]),
    )
    .await;
    ctrl.set_earnings_behavior(
        MSFT,
        MockBehavior::Return(vec![event(MSFT, d(2025, 10, 29), "3.65")]),
    )
    .await;
    ctrl.set_macro_behavior(
        "CPIAUCSL",
        MockBehavior::Return(vec![observation(d(2025, 7, 1), "322.132")]),
    )
    .await;
    ctrl.set_macro_behavior(
        "PPIACO",
        MockBehavior::Return(vec![observation(d(2025, 7, 1), "262.451")]),
    )
    .await;
}

#[tokio::test(start_paused = true)]
async fn rate_limited_profile_becomes_placeholder_after_one_cooldown() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    script_all(&ctrl).await;
    ctrl.set_profile_behavior(MSFT, MockBehavior::Fail(AlmanacError::rate_limited("dyn")))
        .await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(almanac.state(), PipelineState::Ready);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    // One call, one cooldown, one retry for MSFT; one call for AAPL.
    assert_eq!(ctrl.calls(Capability::Profile), 3);

    let msft = inst(MSFT);
    assert_eq!(
        almanac.profile(&msft),
        Some(InstrumentProfile::placeholder(&msft))
    );
    assert_eq!(
        almanac.profile(&inst(AAPL)).map(|p| p.display_name),
        Some("Apple Inc".to_string())
    );
    let profiles = report.group(FetchGroup::Profiles).unwrap();
    assert_eq!((profiles.succeeded, profiles.failed), (1, 1));
    assert!(almanac.current_progress().is_complete());
    assert!(report.view.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn throttling_that_clears_after_cooldown_yields_real_data() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    script_all(&ctrl).await;
    ctrl.set_quote_behavior(AAPL, MockBehavior::Fail(AlmanacError::rate_limited("dyn")))
        .await;
    ctrl.push_quote_behavior(AAPL, MockBehavior::Return(quote(AAPL, "229.31")))
        .await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(almanac.quote(&inst(AAPL)), Some(quote(AAPL, "229.31")));
    assert_eq!(ctrl.calls(Capability::Quote), 3);
}

#[tokio::test]
async fn missing_capability_yields_placeholders() {
    let (conn, ctrl) = DynamicMockConnector::with_capabilities(
        "no-quotes",
        &[
            Capability::Profile,
            Capability::EarningsCalendar,
            Capability::MacroSeries,
        ],
    );
    script_all(&ctrl).await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    let aapl = inst(AAPL);
    assert_eq!(almanac.quote(&aapl), Some(Quote::placeholder(&aapl)));
    assert_eq!(ctrl.calls(Capability::Quote), 0);
    let quotes = report.group(FetchGroup::Quotes).unwrap();
    assert_eq!((quotes.succeeded, quotes.failed), (0, 2));
    // Nothing real to keep, so nothing cached for the group.
    assert_eq!(almanac.cache().stats().writes, 3);
    assert_eq!(almanac.state(), PipelineState::Ready);
}

#[tokio::test]
async fn failed_earnings_leave_instrument_missing() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    script_all(&ctrl).await;
    ctrl.set_earnings_behavior(
        AAPL,
        MockBehavior::Fail(AlmanacError::connector("dyn", "HTTP 500")),
    )
    .await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    let cal = &report.view.calendar;
    assert!(cal.days.iter().all(|day| day.companies.is_empty()));
    assert_eq!(cal.missing, universe(&[MSFT, AAPL]));
    assert_eq!(almanac.next_earnings(&inst(AAPL)), None);
    assert_eq!(
        almanac.next_earnings(&inst(MSFT)).map(|n| n.date),
        Some(d(2025, 10, 29))
    );
}

#[tokio::test]
async fn failed_macro_series_clears_matching_releases_only() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    script_all(&ctrl).await;
    ctrl.set_macro_behavior(
        "PPIACO",
        MockBehavior::Fail(AlmanacError::connector("dyn", "HTTP 500")),
    )
    .await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    let items: Vec<_> = report
        .view
        .calendar
        .days
        .iter()
        .flat_map(|day| day.economic_items.iter())
        .collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].series_id, "CPIAUCSL");
    assert!(items[0].value.is_some());
    assert_eq!(items[1].series_id, "PPIACO");
    assert_eq!((items[1].value, items[1].as_of), (None, None));
}

#[tokio::test(start_paused = true)]
async fn hung_provider_times_out_into_placeholder() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    script_all(&ctrl).await;
    ctrl.set_profile_behavior(AAPL, MockBehavior::Hang).await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .provider_timeout(Duration::from_secs(30))
        .build()
        .unwrap();
    let start = tokio::time::Instant::now();
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(30));
    let aapl = inst(AAPL);
    assert_eq!(
        almanac.profile(&aapl),
        Some(InstrumentProfile::placeholder(&aapl))
    );
    assert_eq!(almanac.state(), PipelineState::Ready);
}

#[tokio::test]
async fn second_connector_covers_for_first() {
    let (primary, primary_ctrl) = DynamicMockConnector::new_with_controller("primary");
    let (backup, backup_ctrl) = DynamicMockConnector::new_with_controller("backup");
    script_all(&backup_ctrl).await;
    primary_ctrl
        .set_profile_behavior(
            AAPL,
            MockBehavior::Fail(AlmanacError::connector("primary", "HTTP 503")),
        )
        .await;

    let almanac = unpaced(primary, clock_at(2025, 8, 11))
        .with_connector(backup)
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(
        almanac.profile(&inst(AAPL)).map(|p| p.display_name),
        Some("Apple Inc".to_string())
    );
    assert_eq!(primary_ctrl.calls(Capability::Profile), 2);
    assert_eq!(backup_ctrl.calls(Capability::Profile), 2);
    assert!(report.groups.iter().all(|g| g.failed == 0));
}

#[tokio::test]
async fn nothing_fetched_carries_advisory() {
    let (conn, _ctrl) = DynamicMockConnector::new_with_controller("empty");

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(almanac.state(), PipelineState::Ready);
    assert_eq!(report.view.error.as_deref(), Some(NO_DATA_ADVISORY));
    assert_eq!(almanac.cache().stats().writes, 0);
    // The universe is still fully represented.
    assert_eq!(report.view.calendar.missing.len(), 2);
    assert_eq!(report.view.calendar.next_earnings.len(), 2);
    // The schedule still shows the week's releases, without values.
    assert_eq!(report.view.calendar.days.len(), 2);
}
