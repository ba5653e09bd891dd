use std::sync::Arc;
use std::time::Duration;

use almanac::{Almanac, FetchGroup, PipelineState, Progress};
use almanac_mock::MockConnector;
use crate::helpers::*;
use rust_decimal::Decimal;

fn mock_almanac() -> Almanac {
    unpaced(Arc::new(MockConnector::new()), clock_at(2025, 8, 11))
        .build()
        .expect("valid almanac")
}

#[tokio::test]
async fn fresh_almanac_is_idle() {
    let almanac = mock_almanac();
    assert_eq!(almanac.state(), PipelineState::Idle);
    assert!(almanac.current_calendar().is_none());
    assert_eq!(almanac.current_progress(), Progress::default());
    assert_eq!(almanac.progress_total(), 2 * 46 + 1 + 2);
}

#[tokio::test]
async fn full_run_publishes_the_week() {
    let almanac = mock_almanac();
    // A Wednesday; the run normalises it to the Monday.
    let report = almanac.trigger_run(d(2025, 8, 13), false).await.unwrap();

    assert!(!report.superseded);
    assert_eq!(report.week.start, d(2025, 8, 11));
    let order: Vec<_> = report.groups.iter().map(|g| g.group).collect();
    assert_eq!(order, FetchGroup::ALL);
    assert_eq!(almanac.state(), PipelineState::Ready);
    assert_eq!(
        almanac.current_progress(),
        Progress {
            completed: 95,
            total: 95
        }
    );

    let view = almanac.current_calendar().expect("published calendar");
    assert_eq!(view, report.view);
    assert!(view.error.is_none());

    let cal = &view.calendar;
    let dates: Vec<_> = cal.days.iter().map(|day| day.date).collect();
    assert_eq!(
        dates,
        vec![
            d(2025, 8, 11),
            d(2025, 8, 12),
            d(2025, 8, 13),
            d(2025, 8, 14),
            d(2025, 8, 15)
        ]
    );

    let tuesday = &cal.days[1];
    assert_eq!(tuesday.day_label, "Tuesday 08/12");
    let symbols: Vec<_> = tuesday
        .companies
        .iter()
        .map(|c| c.instrument.symbol())
        .collect();
    assert_eq!(symbols, vec![MSFT, "BAC"]);
    assert_eq!(tuesday.economic_items.len(), 1);
    let cpi = &tuesday.economic_items[0];
    assert_eq!(cpi.series_id, "CPIAUCSL");
    assert_eq!(cpi.value, Some(Decimal::new(322_132, 3)));
    assert_eq!(cpi.as_of, Some(d(2025, 7, 1)));

    let thursday = &cal.days[3];
    assert_eq!(thursday.economic_items[0].series_id, "PPIACO");

    // Weekend-shifted releases pile up on Monday.
    let monday: Vec<_> = cal.days[0]
        .companies
        .iter()
        .map(|c| c.instrument.symbol())
        .collect();
    assert_eq!(monday, vec!["C", "LLY", AAPL, "CVX", "UNH", "BRK.B"]);
    let shown: usize = cal.days.iter().map(|day| day.companies.len()).sum();
    assert_eq!(shown, 14);
    assert_eq!(cal.missing.len(), 32);
    assert_eq!(cal.next_earnings.len(), 46);
}

#[tokio::test]
async fn card_enrichment_accessors() {
    let almanac = mock_almanac();
    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();

    let aapl = inst(AAPL);
    let p = almanac.profile(&aapl).expect("profile published");
    assert_eq!(p.display_name, "Apple Inc");
    let q = almanac.quote(&aapl).expect("quote published");
    assert_eq!(q.last_price, Some(Decimal::new(22_931, 2)));
    let next = almanac.next_earnings(&aapl).expect("upcoming release");
    assert_eq!(next.date, d(2025, 8, 11));

    assert!(almanac.profile(&inst("ZZZZ")).is_none());
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let almanac = mock_almanac();
    let first = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    assert!(first.groups.iter().all(|g| !g.from_cache));
    assert_eq!(almanac.cache().stats().writes, 4);

    let second = almanac.trigger_run(d(2025, 8, 18), false).await.unwrap();
    assert!(second.fully_cached());
    assert_eq!(almanac.cache().stats().hits, 4);
    // Cache hits advance progress by the full group weight.
    assert!(almanac.current_progress().is_complete());
    assert_eq!(second.week.start, d(2025, 8, 18));
    assert_ne!(first.view.calendar.days, second.view.calendar.days);
}

#[tokio::test(start_paused = true)]
async fn pacing_spaces_successful_calls() {
    let almanac = Almanac::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .clock(clock_at(2025, 8, 11))
        .universe(universe(&[AAPL, MSFT]))
        .concurrency(1)
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let report = almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    // Two sequential calls per group at 1s, two macro calls at 1.2s.
    assert_eq!(start.elapsed(), Duration::from_millis(2_400));
    assert_eq!(report.group(FetchGroup::Economic).unwrap().succeeded, 2);
    assert_eq!(
        almanac.current_progress(),
        Progress {
            completed: 7,
            total: 7
        }
    );
}

#[tokio::test]
async fn progress_subscribers_see_monotonic_updates() {
    let almanac = mock_almanac();
    let mut rx = almanac.subscribe_progress();
    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let p = *rx.borrow_and_update();
            if p.total == 0 {
                continue;
            }
            seen.push(p);
            if p.is_complete() {
                break;
            }
        }
        seen
    });

    almanac.trigger_run(d(2025, 8, 11), false).await.unwrap();
    let seen = collector.await.unwrap();

    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0].completed <= w[1].completed));
    assert!(seen.iter().all(|p| p.completed <= p.total));
    assert_eq!(seen.last().map(|p| p.completed), Some(95));
}
