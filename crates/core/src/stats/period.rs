//! Calendar month windows used by period-scoped metrics.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Inclusive bounds of one calendar month, formatted for gateway filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl MonthWindow {
    /// Month containing `now`, shifted by `month_offset` months
    /// (0 = current, -1 = previous).
    pub fn around(now: DateTime<Utc>, month_offset: i32) -> Self {
        let months = i64::from(now.year()) * 12 + i64::from(now.month0()) + i64::from(month_offset);
        let year = i32::try_from(months.div_euclid(12)).unwrap_or(now.year());
        let month0 = u32::try_from(months.rem_euclid(12)).unwrap_or(0);

        let first_day = NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(now.date_naive());
        let next_first = if month0 == 11 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month0 + 2, 1)
        };
        let last_day = next_first.map_or(first_day, |next| next - Duration::days(1));

        Self { first_day, last_day }
    }

    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub const fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Lower bound as a bare date, `YYYY-MM-01`
    pub fn start_bound(&self) -> String {
        self.first_day.format("%Y-%m-%d").to_string()
    }

    /// Upper bound as the month's last millisecond, `YYYY-MM-DDT23:59:59.999Z`
    pub fn end_bound(&self) -> String {
        format!("{}T23:59:59.999Z", self.last_day.format("%Y-%m-%d"))
    }
}
