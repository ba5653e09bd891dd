use almanac_core::MacroObservation;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Monthly observations (year, month, value in thousandths) per provider function.
pub fn by_function(function: &str) -> Option<Vec<MacroObservation>> {
    let rows: &[(i32, u32, i64)] = match function {
        "CPI" => &[
            (2025, 7, 322_132),
            (2025, 6, 321_500),
            (2025, 5, 320_580),
            (2025, 4, 320_795),
        ],
        "PPI" => &[
            (2025, 7, 262_451),
            (2025, 6, 260_030),
            (2025, 5, 259_844),
            (2025, 4, 259_318),
        ],
        _ => return None,
    };
    Some(
        rows.iter()
            .filter_map(|(y, m, v)| {
                Some(MacroObservation {
                    date: NaiveDate::from_ymd_opt(*y, *m, 1)?,
                    value: Decimal::new(*v, 3),
                })
            })
            .collect(),
    )
}
