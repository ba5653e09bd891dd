use almanac_demos::common;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,almanac=debug,almanac_finnhub=trace
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    let almanac = common::builder()?.build()?;
    let report = almanac.trigger_run(almanac.today(), false).await?;

    for group in &report.groups {
        println!(
            "{:<10} cached={:<5} ok={:<3} failed={}",
            group.group.to_string(),
            group.from_cache,
            group.succeeded,
            group.failed
        );
    }
    Ok(())
}
