use std::sync::Arc;

use almanac_demos::common;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let almanac = Arc::new(common::builder()?.build()?);
    let mut rx = almanac.subscribe_progress();

    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let p = *rx.borrow_and_update();
            if p.total == 0 {
                continue;
            }
            println!("{:>3}/{:<3} {:>5.1}%", p.completed, p.total, p.fraction() * 100.0);
            if p.is_complete() {
                break;
            }
        }
    });

    let report = almanac.trigger_run(almanac.today(), false).await?;
    let _ = printer.await;
    println!("run {} finished in state {:?}", report.generation, almanac.state());
    Ok(())
}
