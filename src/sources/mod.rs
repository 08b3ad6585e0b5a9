//! Schedule sources. Each one turns its upstream feed into canonical
//! programmes for a window of civil dates.

pub mod lbc;
pub mod mtv;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::model::Programme;

/// The civil dates one guide build covers, all interpreted in one zone.
#[derive(Debug, Clone)]
pub struct ScheduleWindow {
    pub tz: Tz,
    pub dates: Vec<NaiveDate>,
}

impl ScheduleWindow {
    /// Window starting at "today" as observed in `tz`, `days` dates long.
    pub fn next_days(tz: Tz, days: u32) -> Self {
        let today = Utc::now().with_timezone(&tz).date_naive();
        Self::from_start(tz, today, days)
    }

    /// Window with an explicit first date.
    pub fn from_start(tz: Tz, start: NaiveDate, days: u32) -> Self {
        let dates = (0..days).map(|i| start + Duration::days(i64::from(i))).collect();
        Self { tz, dates }
    }
}

/// A schedule upstream normalized behind one call.
#[async_trait]
pub trait ProgrammeSource: Send + Sync {
    /// Fetch and normalize every date in the window. A failed fetch is
    /// fatal for the source; parse anomalies only shrink the output.
    async fn collect(&self, window: &ScheduleWindow) -> Result<Vec<Programme>>;

    /// Short name used in logs and error contexts.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Beirut;

    #[test]
    fn window_enumerates_consecutive_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 27).expect("valid date");
        let window = ScheduleWindow::from_start(Beirut, start, 3);

        let dates: Vec<String> = window.dates.iter().map(|d| d.to_string()).collect();
        // February 2026 has 28 days; the window crosses into March.
        assert_eq!(dates, ["2026-02-27", "2026-02-28", "2026-03-01"]);
    }

    #[test]
    fn zero_day_window_is_empty() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 20).expect("valid date");
        let window = ScheduleWindow::from_start(Beirut, start, 0);
        assert!(window.dates.is_empty());
    }
}
