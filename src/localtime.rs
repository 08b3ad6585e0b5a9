//! Civil-time resolution against an IANA zone, plus the XMLTV timestamp
//! format.
//!
//! Schedule feeds publish wall-clock times with no offset. Around DST
//! transitions a wall time can name two instants or none; the conventions
//! here are: ambiguous times take the earlier occurrence, times falling in
//! a spring-forward gap shift one hour later and resolve with the
//! post-transition offset.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// XMLTV wire timestamp: `YYYYMMDDHHMMSS +HHMM`, offset without a colon.
const XMLTV_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Resolve a wall-clock `hour:minute` on `date` to a zoned instant.
///
/// Hour 24 is accepted as the end-of-day convention and rolls into the
/// next civil date. Returns `None` for out-of-range components.
pub fn resolve_local(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Tz>> {
    let (date, hour) = if hour == 24 {
        (date.succ_opt()?, 0)
    } else {
        (date, hour)
    };
    let naive = date.and_hms_opt(hour, minute, 0)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earlier, _) => Some(earlier),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    }
}

/// Format an instant as an XMLTV timestamp in its own zone.
pub fn format_xmltv(dt: &DateTime<Tz>) -> String {
    dt.format(XMLTV_FORMAT).to_string()
}
