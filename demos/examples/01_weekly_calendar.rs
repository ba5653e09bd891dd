use almanac_demos::common;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let almanac = common::builder()?.build()?;
    let report = almanac.trigger_run(almanac.today(), false).await?;
    let view = report.view;

    println!("## {}", view.calendar.week.label());
    if let Some(advisory) = &view.error {
        println!("!! {advisory}");
    }

    for day in &view.calendar.days {
        println!("\n### {}", day.day_label);
        for item in &day.economic_items {
            let value = item
                .value
                .map_or_else(|| "n/a".to_string(), |v| v.to_string());
            println!("- [macro] {} ({}): {value}", item.name, item.series_id);
        }
        for card in &day.companies {
            let name = almanac
                .profile(&card.instrument)
                .map_or_else(|| card.instrument.to_string(), |p| p.display_name);
            println!(
                "- {name} [{}] {} EPS {} Rev {}",
                card.instrument,
                card.timing_label(),
                card.eps_label().unwrap_or_else(|| "-".into()),
                card.revenue_label().unwrap_or_else(|| "-".into()),
            );
        }
    }

    println!("\n### Not reporting this week");
    for inst in view.calendar.missing.iter().take(10) {
        let next = almanac
            .next_earnings(inst)
            .map_or_else(|| "not scheduled".to_string(), |n| n.date.to_string());
        println!("- {inst}: {next}");
    }
    Ok(())
}
