use almanac_core::{EarningsEvent, Instrument, InstrumentProfile, Quote, ReleaseTiming};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::Decimal;

/// (symbol, company name, last price in cents)
const COMPANIES: &[(&str, &str, i64)] = &[
    ("OPCH", "Option Care Health Inc", 3_112),
    ("CRWD", "CrowdStrike Holdings Inc", 42_870),
    ("MDB", "MongoDB Inc", 21_450),
    ("ORCL", "Oracle Corp", 24_790),
    ("ADBE", "Adobe Inc", 35_120),
    ("SOFI", "SoFi Technologies Inc", 2_084),
    ("OXY", "Occidental Petroleum Corp", 4_391),
    ("PEP", "PepsiCo Inc", 14_610),
    ("C", "Citigroup Inc", 9_377),
    ("LLY", "Eli Lilly and Co", 72_105),
    ("AAPL", "Apple Inc", 22_931),
    ("MSFT", "Microsoft Corp", 52_257),
    ("GOOGL", "Alphabet Inc", 20_140),
    ("AMZN", "Amazon.com Inc", 22_113),
    ("TSLA", "Tesla Inc", 33_984),
    ("NVDA", "NVIDIA Corp", 18_077),
    ("META", "Meta Platforms Inc", 76_920),
    ("JPM", "JPMorgan Chase & Co", 28_851),
    ("JNJ", "Johnson & Johnson", 17_640),
    ("PFE", "Pfizer Inc", 2_488),
    ("WMT", "Walmart Inc", 9_832),
    ("XOM", "Exxon Mobil Corp", 10_715),
    ("KO", "Coca-Cola Co", 6_930),
    ("DIS", "Walt Disney Co", 11_870),
    ("NKE", "Nike Inc", 7_654),
    ("MCD", "McDonald's Corp", 30_145),
    ("HD", "Home Depot Inc", 39_012),
    ("IBM", "International Business Machines Corp", 24_033),
    ("CVX", "Chevron Corp", 15_690),
    ("UNH", "UnitedHealth Group Inc", 25_118),
    ("BRK.B", "Berkshire Hathaway Inc", 47_320),
    ("BAC", "Bank of America Corp", 4_712),
    ("NFLX", "Netflix Inc", 121_400),
    ("GE", "GE Aerospace", 26_731),
    ("BA", "Boeing Co", 22_950),
    ("CAT", "Caterpillar Inc", 41_876),
    ("PG", "Procter & Gamble Co", 15_410),
    ("NEE", "NextEra Energy Inc", 7_218),
    ("ECL", "Ecolab Inc", 26_890),
    ("DD", "DuPont de Nemours Inc", 7_304),
    ("AMT", "American Tower Corp", 20_955),
    ("PLD", "Prologis Inc", 10_812),
    ("SPG", "Simon Property Group Inc", 16_720),
    ("DUK", "Duke Energy Corp", 12_260),
    ("AEP", "American Electric Power Co", 11_140),
    ("AXP", "American Express Co", 30_505),
];

fn index_of(symbol: &str) -> Option<usize> {
    COMPANIES.iter().position(|(s, _, _)| *s == symbol)
}

pub fn profile(instrument: &Instrument) -> Option<InstrumentProfile> {
    let i = index_of(instrument.symbol())?;
    let (sym, name, _) = COMPANIES[i];
    Some(InstrumentProfile {
        instrument: instrument.clone(),
        display_name: name.to_string(),
        logo_url: Some(format!(
            "https://static.example.com/logo/{}.png",
            sym.to_ascii_lowercase()
        )),
    })
}

pub fn quote(instrument: &Instrument) -> Option<Quote> {
    let i = index_of(instrument.symbol())?;
    Some(Quote {
        instrument: instrument.clone(),
        last_price: Some(Decimal::new(COMPANIES[i].2, 2)),
    })
}

fn next_weekday(d: NaiveDate) -> NaiveDate {
    match d.weekday() {
        Weekday::Sat => d.checked_add_days(Days::new(2)).unwrap_or(d),
        Weekday::Sun => d.checked_add_days(Days::new(1)).unwrap_or(d),
        _ => d,
    }
}

/// Quarterly releases spread over the first weeks of Feb/May/Aug/Nov of 2025 and 2026.
pub fn earnings(instrument: &Instrument, from: NaiveDate, to: NaiveDate) -> Option<Vec<EarningsEvent>> {
    let i = index_of(instrument.symbol())?;
    let offset = u64::try_from(i % 20).unwrap_or(0);
    let idx = i64::try_from(i).unwrap_or(0);
    let mut out = Vec::new();
    for (year, fiscal_year) in [(2025, 2025), (2026, 2026)] {
        for (q, month) in [(4u8, 2u32), (1, 5), (2, 8), (3, 11)] {
            let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            let date = next_weekday(first.checked_add_days(Days::new(offset)).unwrap_or(first));
            if date < from || date > to {
                continue;
            }
            let mut ev = EarningsEvent::new(instrument.clone(), date);
            ev.eps_estimate = Some(Decimal::new(85 + idx * 7, 2));
            ev.revenue_estimate = Some(Decimal::from(1_250_000_000i64 * (idx + 1)));
            ev.release_timing = if i % 2 == 0 {
                ReleaseTiming::BeforeOpen
            } else {
                ReleaseTiming::AfterClose
            };
            ev.fiscal_quarter = Some(q);
            ev.fiscal_year = Some(if q == 4 { fiscal_year - 1 } else { fiscal_year });
            out.push(ev);
        }
    }
    Some(out)
}
