use std::sync::Arc;

use almanac::{
    Almanac, AlmanacError, Capability, FetchGroup, MemoryBackend, PersistenceBackend,
    PipelineState,
};
use almanac_mock::{DynamicMockConnector, MockConnector};
use async_trait::async_trait;
use crate::helpers::*;

#[tokio::test]
async fn refresh_bypasses_every_cache_entry() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    ctrl.set_profile_behavior(
        AAPL,
        almanac_mock::MockBehavior::Return(profile(AAPL, "Apple Inc")),
    )
    .await;
    ctrl.set_quote_behavior(AAPL, almanac_mock::MockBehavior::Return(quote(AAPL, "229.31")))
        .await;
    ctrl.set_earnings_behavior(AAPL, almanac_mock::MockBehavior::Return(vec![]))
        .await;

    let almanac = unpaced(conn, clock_at(2025, 8, 11))
        .universe(universe(&[AAPL]))
        .build()
        .unwrap();

    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert_eq!(almanac.state(), PipelineState::Ready);
    let calls_after_first = ctrl.total_calls();
    let hits_before = almanac.cache().stats().hits;

    let report = almanac.refresh().await.unwrap();

    assert_eq!(almanac.cache().stats().hits, hits_before);
    assert!(report.groups.iter().all(|g| !g.from_cache));
    assert_eq!(ctrl.total_calls(), calls_after_first * 2);
    assert_eq!(report.week.start, d(2025, 8, 11));
    assert_eq!(almanac.state(), PipelineState::Ready);
}

#[tokio::test]
async fn refresh_before_any_run_uses_current_week() {
    let almanac = unpaced(Arc::new(MockConnector::new()), clock_at(2025, 8, 13))
        .build()
        .unwrap();
    let report = almanac.refresh().await.unwrap();
    assert_eq!(report.week.start, d(2025, 8, 11));
    assert_eq!(almanac.current_week(), Some(report.week));
}

#[tokio::test]
async fn expired_entries_are_refetched() {
    let clock = clock_at(2025, 8, 11);
    let almanac = unpaced(Arc::new(MockConnector::new()), Arc::clone(&clock))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();

    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    clock.advance(chrono::Duration::hours(23));
    let warm = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert!(warm.fully_cached());

    clock.advance(chrono::Duration::hours(2));
    let cold = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert!(cold.groups.iter().all(|g| !g.from_cache));
    assert_eq!(almanac.cache().stats().writes, 8);
}

#[tokio::test]
async fn changed_universe_refetches_instrument_groups() {
    let backend: Arc<dyn PersistenceBackend> = Arc::new(MemoryBackend::new());
    let clock = clock_at(2025, 8, 11);

    let first = unpaced(Arc::new(MockConnector::new()), Arc::clone(&clock))
        .backend(Arc::clone(&backend))
        .universe(universe(&[AAPL, MSFT]))
        .build()
        .unwrap();
    first.trigger_run(d(2025, 8, 11), false).await.unwrap();

    let second = unpaced(Arc::new(MockConnector::new()), clock)
        .backend(backend)
        .universe(universe(&[AAPL, MSFT, CRWD]))
        .build()
        .unwrap();
    let report = second.trigger_run(d(2025, 8, 11), false).await.unwrap();

    for group in [FetchGroup::Profiles, FetchGroup::Quotes, FetchGroup::Earnings] {
        let g = report.group(group).unwrap();
        assert!(!g.from_cache, "{group} reused a partial cache entry");
        assert_eq!(g.succeeded, 3);
    }
    // The schedule did not change, so the macro group still hits.
    assert!(report.group(FetchGroup::Economic).unwrap().from_cache);
    assert_eq!(
        second.profile(&inst(CRWD)).map(|p| p.display_name),
        Some("CrowdStrike Holdings Inc".to_string())
    );
}

#[tokio::test]
async fn earnings_window_is_part_of_the_key() {
    let (conn, ctrl) = DynamicMockConnector::new_with_controller("dyn");
    ctrl.set_earnings_behavior(AAPL, almanac_mock::MockBehavior::Return(vec![]))
        .await;
    let backend: Arc<dyn PersistenceBackend> = Arc::new(MemoryBackend::new());

    let this_year = unpaced(Arc::clone(&conn), clock_at(2025, 8, 11))
        .backend(Arc::clone(&backend))
        .universe(universe(&[AAPL]))
        .build()
        .unwrap();
    this_year.trigger_run(d(2025, 8, 11), false).await.unwrap();

    let next_year = unpaced(conn, clock_at(2026, 2, 2))
        .backend(backend)
        .universe(universe(&[AAPL]))
        .cache_ttl(std::time::Duration::from_secs(365 * 24 * 3600))
        .build()
        .unwrap();
    let report = next_year.trigger_run(d(2026, 2, 2), false).await.unwrap();
    assert!(!report.group(FetchGroup::Earnings).unwrap().from_cache);
    assert_eq!(ctrl.calls(Capability::EarningsCalendar), 2);
}

#[derive(Debug, Default)]
struct UnclearableBackend {
    inner: MemoryBackend,
}

#[async_trait]
impl PersistenceBackend for UnclearableBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AlmanacError> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), AlmanacError> {
        self.inner.write(key, bytes).await
    }

    async fn clear(&self) -> Result<(), AlmanacError> {
        Err(AlmanacError::Storage("device storage locked".into()))
    }
}

#[tokio::test]
async fn failed_clear_puts_pipeline_in_error() {
    let almanac: Almanac = unpaced(Arc::new(MockConnector::new()), clock_at(2025, 8, 11))
        .backend(Arc::new(UnclearableBackend::default()))
        .universe(universe(&[AAPL]))
        .build()
        .unwrap();

    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    let before = almanac.current_calendar();

    let err = almanac.refresh().await.unwrap_err();
    assert!(matches!(err, AlmanacError::Storage(_)));
    assert_eq!(almanac.state(), PipelineState::Error);
    assert_eq!(almanac.last_error(), Some(err));
    // The previous calendar stays visible.
    assert_eq!(almanac.current_calendar(), before);

    // A normal run recovers.
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert_eq!(almanac.state(), PipelineState::Ready);
    assert!(almanac.last_error().is_none());
}
