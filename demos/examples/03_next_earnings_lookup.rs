use almanac::Instrument;
use almanac_demos::common;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let almanac = common::builder()?.build()?;

    // Any symbol works here; it need not belong to the tracked universe.
    let symbols: Vec<String> = std::env::args().skip(1).collect();
    let symbols = if symbols.is_empty() {
        vec!["AAPL".to_string(), "JPM".to_string(), "NKE".to_string()]
    } else {
        symbols
    };

    for symbol in symbols {
        let inst = Instrument::new(&symbol)?;
        match almanac.lookup_next_earnings(&inst).await {
            Ok(Some(next)) => println!(
                "{inst}: {} ({})",
                next.date,
                next.release_timing.describe()
            ),
            Ok(None) => println!("{inst}: nothing scheduled"),
            Err(e) => println!("{inst}: lookup failed: {e}"),
        }
    }
    Ok(())
}
