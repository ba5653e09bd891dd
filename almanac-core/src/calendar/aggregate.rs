use std::collections::{BTreeMap, HashSet};

use almanac_types::{
    CalendarDay, CompanyCardView, EarningsEvent, EconomicItemView, EconomicRelease, Instrument,
    NextEarnings, NextEarningsIndex, WeekRange, WeeklyCalendar,
};
use chrono::NaiveDate;

use super::format::day_label;

/// Raw earnings events keyed by instrument, as produced by the earnings fetch group.
pub type EarningsByInstrument = BTreeMap<Instrument, Vec<EarningsEvent>>;

/// Earliest event dated on or after `today`; the first one wins on ties.
#[must_use]
pub fn next_earnings_for(events: &[EarningsEvent], today: NaiveDate) -> Option<NextEarnings> {
    events
        .iter()
        .filter(|e| e.date >= today)
        .min_by_key(|e| e.date)
        .map(NextEarnings::from)
}

/// Build the weekly calendar and next-earnings index.
///
/// Deterministic for a given input. Every instrument of `universe` ends up
/// either on a calendar day or in `missing`, and always has an index entry.
/// Instruments absent from `earnings` behave as instruments without events.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "almanac::calendar::aggregate",
        skip_all,
        fields(week_start = %week.start, instruments = universe.len()),
    )
)]
#[must_use]
pub fn aggregate(
    week: &WeekRange,
    today: NaiveDate,
    universe: &[Instrument],
    earnings: &EarningsByInstrument,
    releases: &[EconomicRelease],
) -> WeeklyCalendar {
    let mut days: BTreeMap<NaiveDate, CalendarDay> = BTreeMap::new();
    let mut next_earnings = NextEarningsIndex::new();
    let mut missing = Vec::new();
    let mut seen = HashSet::new();

    for inst in universe {
        // A repeated symbol would otherwise appear twice on the same day.
        if !seen.insert(inst) {
            continue;
        }
        let events = earnings.get(inst).map_or(&[][..], Vec::as_slice);

        let mut shown = false;
        for ev in events.iter().filter(|e| week.contains(e.date)) {
            shown = true;
            let mut card = CompanyCardView::from(ev);
            card.instrument = inst.clone();
            day_entry(&mut days, ev.date).companies.push(card);
        }
        if !shown {
            missing.push(inst.clone());
        }

        next_earnings.insert(inst.clone(), next_earnings_for(events, today));
    }

    for release in releases.iter().filter(|r| week.contains(r.date)) {
        day_entry(&mut days, release.date)
            .economic_items
            .push(EconomicItemView::from(release));
    }

    missing.sort_by_key(|inst| {
        let date = next_earnings.get(inst).and_then(|n| n.as_ref()).map(|n| n.date);
        (date.is_none(), date)
    });

    #[cfg(feature = "tracing")]
    tracing::debug!(
        days = days.len(),
        missing = missing.len(),
        "aggregated weekly calendar"
    );

    WeeklyCalendar {
        week: *week,
        days: days.into_values().collect(),
        next_earnings,
        missing,
    }
}

fn day_entry(days: &mut BTreeMap<NaiveDate, CalendarDay>, date: NaiveDate) -> &mut CalendarDay {
    days.entry(date).or_insert_with(|| CalendarDay {
        date,
        day_label: day_label(date),
        companies: Vec::new(),
        economic_items: Vec::new(),
    })
}
