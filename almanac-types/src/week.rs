use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A trading week, Monday through Friday inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekRange {
    /// Monday of the week.
    pub start: NaiveDate,
    /// Friday of the week.
    pub end: NaiveDate,
}

impl WeekRange {
    /// The week containing `date`. Weekends belong to the week that just ended.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let back = u64::from(date.weekday().num_days_from_monday());
        let start = date.checked_sub_days(Days::new(back)).unwrap_or(date);
        Self::starting(start)
    }

    fn starting(start: NaiveDate) -> Self {
        let end = start.checked_add_days(Days::new(4)).unwrap_or(start);
        Self { start, end }
    }

    /// The following week.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::starting(self.start.checked_add_days(Days::new(7)).unwrap_or(self.start))
    }

    /// The preceding week.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::starting(self.start.checked_sub_days(Days::new(7)).unwrap_or(self.start))
    }

    /// Whether `date` falls within `[start, end]`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Header label, e.g. `From 08/11 to 08/15`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "From {} to {}",
            self.start.format("%m/%d"),
            self.end.format("%m/%d")
        )
    }
}
