use chrono::NaiveDate;

/// Weekday name followed by `MM/DD`, e.g. `Tuesday 08/12`.
#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    date.format("%A %m/%d").to_string()
}
