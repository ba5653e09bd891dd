use almanac_types::{AlmanacError, Instrument};

/// Symbols tracked by default.
pub const DEFAULT_SYMBOLS: [&str; 46] = [
    "OPCH", "CRWD", "MDB", "ORCL", "ADBE", "SOFI", "OXY", "PEP", "C", "LLY", "AAPL", "MSFT",
    "GOOGL", "AMZN", "TSLA", "NVDA", "META", "JPM", "JNJ", "PFE", "WMT", "XOM", "KO", "DIS", "NKE",
    "MCD", "HD", "IBM", "CVX", "UNH", "BRK.B", "BAC", "NFLX", "GE", "BA", "CAT", "PG", "NEE", "ECL",
    "DD", "AMT", "PLD", "SPG", "DUK", "AEP", "AXP",
];

/// Build a universe from symbols, keeping order.
///
/// # Errors
/// Returns `InvalidArg` for a blank symbol, a duplicate, or an empty list.
pub fn universe_from_symbols<I, S>(symbols: I) -> Result<Vec<Instrument>, AlmanacError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<Instrument> = Vec::new();
    for s in symbols {
        let inst = Instrument::new(s)?;
        if out.contains(&inst) {
            return Err(AlmanacError::InvalidArg(format!(
                "duplicate instrument in universe: {inst}"
            )));
        }
        out.push(inst);
    }
    if out.is_empty() {
        return Err(AlmanacError::InvalidArg("universe must not be empty".into()));
    }
    Ok(out)
}

/// The default tracked universe.
#[must_use]
pub fn default_universe() -> Vec<Instrument> {
    DEFAULT_SYMBOLS
        .iter()
        .filter_map(|s| Instrument::new(*s).ok())
        .collect()
}
