use std::sync::Arc;
use std::time::Duration;

use almanac::{Capability, ConcurrencyScope, FetchGroup, PipelineState, default_universe};
use almanac_mock::{DynamicMockConnector, MockBehavior, MockConnector};
use crate::helpers::*;

const SYMBOLS: [&str; 6] = ["OPCH", "CRWD", "MDB", "ORCL", "ADBE", "SOFI"];

#[tokio::test(start_paused = true)]
async fn per_group_limit_is_respected() {
    let (conn, ctrl) = DynamicMockConnector::with_capabilities("profiles-only", &[Capability::Profile]);
    for s in SYMBOLS {
        ctrl.set_profile_behavior(s, MockBehavior::Return(profile(s, s)))
            .await;
    }
    ctrl.set_latency(Duration::from_millis(250)).await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&SYMBOLS))
        .concurrency(2)
        .build()
        .unwrap();
    let start = tokio::time::Instant::now();
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(ctrl.peak_in_flight(), 2);
    assert_eq!(ctrl.calls(Capability::Profile), SYMBOLS.len());
    // Six calls of 250ms, two at a time.
    assert_eq!(start.elapsed(), Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn shared_scope_caps_the_whole_run() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    for s in SYMBOLS {
        ctrl.set_profile_behavior(s, MockBehavior::Return(profile(s, s)))
            .await;
        ctrl.set_quote_behavior(s, MockBehavior::Return(quote(s, "10.00")))
            .await;
        ctrl.set_earnings_behavior(s, MockBehavior::Return(vec![]))
            .await;
    }
    ctrl.set_latency(Duration::from_millis(100)).await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&SYMBOLS))
        .concurrency(3)
        .concurrency_scope(ConcurrencyScope::Shared)
        .build()
        .unwrap();
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    assert_eq!(ctrl.peak_in_flight(), 3);
    assert_eq!(almanac.state(), PipelineState::Ready);
}

#[tokio::test(start_paused = true)]
async fn per_group_scope_lets_groups_overlap() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    for s in SYMBOLS {
        ctrl.set_profile_behavior(s, MockBehavior::Return(profile(s, s)))
            .await;
        ctrl.set_quote_behavior(s, MockBehavior::Return(quote(s, "10.00")))
            .await;
    }
    ctrl.set_latency(Duration::from_millis(100)).await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&SYMBOLS))
        .concurrency(2)
        .build()
        .unwrap();
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    // Four groups, two slots each.
    let peak = ctrl.peak_in_flight();
    assert!(peak > 2 && peak <= 8, "peak {peak}");
}

#[tokio::test(start_paused = true)]
async fn later_run_supersedes_earlier_one() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    // The first run's AAPL profile stalls until the provider timeout.
    ctrl.set_profile_behavior(AAPL, MockBehavior::Hang).await;
    ctrl.push_profile_behavior(AAPL, MockBehavior::Return(profile(AAPL, "Apple Inc")))
        .await;

    let almanac = Arc::new(
        unpaced(conn, clock_at(2025, 8, 11))
            .universe(universe(&[AAPL]))
            .provider_timeout(Duration::from_secs(30))
            .build()
            .unwrap(),
    );

    let slow = {
        let almanac = Arc::clone(&almanac);
        tokio::spawn(async move { almanac.trigger_run(d(2025, 8, 4), false).await })
    };
    // Let the first run reach its stalled call.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let fast = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert!(!fast.superseded);
    assert_eq!(almanac.state(), PipelineState::Ready);
    assert_eq!(almanac.current_week(), Some(fast.week));

    let slow = slow.await.unwrap().unwrap();
    assert!(slow.superseded);
    assert!(slow.generation < fast.generation);
    // The stale run published nothing.
    assert_eq!(almanac.state(), PipelineState::Ready);
    assert_eq!(almanac.current_week(), Some(fast.week));
    assert_eq!(
        almanac.current_calendar().map(|v| v.calendar.week),
        Some(fast.week)
    );
    assert_eq!(
        almanac.profile(&inst(AAPL)).map(|p| p.display_name),
        Some("Apple Inc".to_string())
    );
    assert_eq!(almanac.current_progress().total, 5);
    assert!(almanac.current_progress().is_complete());
}

#[tokio::test]
async fn default_universe_runs_with_default_limit() {
    let (conn, ctrl) = DynamicMockConnector::with_capabilities("quotes-only", &[Capability::Quote]);
    let almanac = unpaced(conn, clock_at(2025, 8, 11)).build().unwrap();
    assert_eq!(almanac.universe(), default_universe().as_slice());
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert_eq!(ctrl.calls(Capability::Quote), 46);
    assert!(ctrl.peak_in_flight() <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_can_be_spawned_on_worker_threads() {
    let almanac = Arc::new(
        unpaced(Arc::new(MockConnector::new()), clock_at(2025, 8, 11))
            .universe(universe(&[AAPL, MSFT]))
            .build()
            .unwrap(),
    );

    let background = {
        let almanac = Arc::clone(&almanac);
        tokio::spawn(async move { almanac.trigger_run(almanac.today(), false).await })
    };
    let report = background.await.unwrap().unwrap();

    assert!(!report.superseded);
    assert_eq!(almanac.state(), PipelineState::Ready);
    assert_eq!(almanac.current_week(), Some(report.week));
}

#[tokio::test(start_paused = true)]
async fn superseded_run_does_not_overwrite_the_cache() {
    let (conn, ctrl) =
        DynamicMockConnector::with_capabilities("profiles-only", &[Capability::Profile]);
    ctrl.set_profile_behavior(AAPL, MockBehavior::Return(profile(AAPL, "Old Name")))
        .await;
    ctrl.push_profile_behavior(AAPL, MockBehavior::Return(profile(AAPL, "New Name")))
        .await;
    // Only the first run's call picks up this latency.
    ctrl.set_latency(Duration::from_secs(5)).await;

    let almanac = Arc::new(
        unpaced(conn, clock_at(2025, 8, 11))
            .universe(universe(&[AAPL]))
            .build()
            .unwrap(),
    );

    let slow = {
        let almanac = Arc::clone(&almanac);
        tokio::spawn(async move { almanac.trigger_run(d(2025, 8, 11), false).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctrl.set_latency(Duration::ZERO).await;

    let refreshed = almanac.trigger_run(d(2025, 8, 11), true).await.unwrap();
    assert!(!refreshed.superseded);
    assert_eq!(almanac.cache().stats().writes, 1);

    let slow = slow.await.unwrap().unwrap();
    assert!(slow.superseded);
    // The stale result neither published nor reached the cache.
    assert_eq!(almanac.cache().stats().writes, 1);

    let next = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert!(next.group(FetchGroup::Profiles).unwrap().from_cache);
    assert_eq!(
        almanac.profile(&inst(AAPL)).map(|p| p.display_name),
        Some("New Name".to_string())
    );
    assert_eq!(ctrl.calls(Capability::Profile), 2);
}
