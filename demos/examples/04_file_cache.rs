use std::sync::Arc;

use almanac::FileBackend;
use almanac_demos::common;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("almanac-demo-{}", std::process::id()));
    let almanac = common::builder()?
        .backend(Arc::new(FileBackend::new(&dir)))
        .build()?;
    let week = almanac.today();

    let first = almanac.trigger_run(week, false).await?;
    println!("first run fully cached: {}", first.fully_cached());

    let second = almanac.trigger_run(week, false).await?;
    println!("second run fully cached: {}", second.fully_cached());

    let refreshed = almanac.refresh().await?;
    println!("after refresh fully cached: {}", refreshed.fully_cached());
    println!("cache stats: {:?}", almanac.cache().stats());

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
