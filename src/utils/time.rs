use crate::availability::TimeWindow;
use crate::error::{BotResult, Error};
use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Parse a weekday name such as "monday" or "Mon"
pub fn parse_weekday(day: &str) -> Option<Weekday> {
    day.trim().parse::<Weekday>().ok()
}

/// Convert a local wall-clock time on `date` to UTC
pub fn local_to_utc(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> BotResult<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| Error::TimeWindow(format!("Invalid time {:02}:{:02}", hour, minute)))?;

    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Repeated hour at a DST change; take the first occurrence
        chrono::LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => Err(Error::TimeWindow(format!(
            "{} does not exist in {}",
            naive, tz
        ))),
    }
}

/// Longest DST gap searched past midnight, in 15 minute steps
const MAX_GAP_STEPS: i64 = 16;

/// Start of the local day `date`, in UTC.
///
/// A day that begins inside a DST gap starts at its first local time that exists.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> BotResult<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_STEPS)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|start| start.with_timezone(&Utc))
        .ok_or_else(|| Error::TimeWindow(format!("{} has no start in {}", date, tz)))
}

/// `[now, next local midnight)`
pub fn rest_of_day(now: DateTime<Utc>, tz: Tz) -> BotResult<TimeWindow> {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today + Duration::days(1);
    TimeWindow::new(now, local_midnight(tomorrow, tz)?)
}

/// The whole local day containing `now`
pub fn whole_day(now: DateTime<Utc>, tz: Tz) -> BotResult<TimeWindow> {
    let today = now.with_timezone(&tz).date_naive();
    TimeWindow::new(
        local_midnight(today, tz)?,
        local_midnight(today + Duration::days(1), tz)?,
    )
}

/// Date of the next `day`, counting today
pub fn next_occurrence(today: NaiveDate, day: Weekday) -> NaiveDate {
    let days_ahead =
        (7 + day.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(days_ahead as i64)
}

/// Window for a room schedule query.
///
/// Today (or no day given) is the rest of today; any other weekday is the
/// whole of its next occurrence.
pub fn day_window(now: DateTime<Utc>, tz: Tz, day: Option<Weekday>) -> BotResult<TimeWindow> {
    let today = now.with_timezone(&tz).date_naive();
    match day {
        None => rest_of_day(now, tz),
        Some(day) if day == today.weekday() => rest_of_day(now, tz),
        Some(day) => {
            let date = next_occurrence(today, day);
            TimeWindow::new(
                local_midnight(date, tz)?,
                local_midnight(date + Duration::days(1), tz)?,
            )
        }
    }
}

/// Parse a `yyyyMMddTHHmm` local timestamp
pub fn parse_compact_local(value: &str, tz: Tz) -> BotResult<DateTime<Utc>> {
    let naive = chrono::NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M")
        .map_err(|e| Error::TimeWindow(format!("Invalid timestamp '{}': {}", value, e)))?;
    local_to_utc(naive.date(), naive.hour(), naive.minute(), tz)
}

/// Format an instant as HH:MM in `tz`
pub fn format_clock(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::{New_York, Santiago};
    use chrono_tz::Europe::Helsinki;

    #[test]
    fn test_parse_time() {
        // Valid cases
        assert_eq!(parse_time("00:00"), Some((0, 0)));
        assert_eq!(parse_time("12:30"), Some((12, 30)));
        assert_eq!(parse_time(" 23:59 "), Some((23, 59)));

        // Invalid cases
        assert_eq!(parse_time("24:00"), None); // Hour out of range
        assert_eq!(parse_time("12:60"), None); // Minute out of range
        assert_eq!(parse_time("12:30:45"), None); // Too many parts
        assert_eq!(parse_time("12"), None); // Too few parts
        assert_eq!(parse_time("12:ab"), None); // Invalid minute
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("fri"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn test_next_occurrence() {
        // Wednesday
        let today = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(next_occurrence(today, Weekday::Wed), today);
        assert_eq!(
            next_occurrence(today, Weekday::Fri),
            NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
        );
        assert_eq!(
            next_occurrence(today, Weekday::Mon),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_rest_of_day_ends_at_local_midnight() {
        // 20:00 in New York on Monday 2026-03-02 (EST, UTC-5)
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 1, 0, 0).unwrap();
        let window = rest_of_day(now, New_York).unwrap();
        assert_eq!(window.start(), now);
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2026, 3, 3, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_whole_day() {
        // 20:00 in New York on Monday 2026-03-02
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 1, 0, 0).unwrap();
        let day = whole_day(now, New_York).unwrap();
        assert_eq!(day.start(), Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 0).unwrap());
        assert_eq!(day.end(), Utc.with_ymd_and_hms(2026, 3, 3, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_rest_of_day_when_midnight_is_skipped() {
        // Chile moves from 00:00 -04 straight to 01:00 -03 on 2026-09-06
        let now = Utc.with_ymd_and_hms(2026, 9, 5, 18, 0, 0).unwrap();
        let window = rest_of_day(now, Santiago).unwrap();
        assert_eq!(window.start(), now);
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2026, 9, 6, 4, 0, 0).unwrap());

        let day = day_window(now, Santiago, Some(Weekday::Sun)).unwrap();
        assert_eq!(day.start(), Utc.with_ymd_and_hms(2026, 9, 6, 4, 0, 0).unwrap());
        assert_eq!(day.end(), Utc.with_ymd_and_hms(2026, 9, 7, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_day_window_for_other_weekday() {
        // Wednesday 2026-03-04 10:00 in Helsinki (EET, UTC+2)
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 8, 0, 0).unwrap();

        let window = day_window(now, Helsinki, Some(Weekday::Fri)).unwrap();
        assert_eq!(window.start(), Utc.with_ymd_and_hms(2026, 3, 5, 22, 0, 0).unwrap());
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2026, 3, 6, 22, 0, 0).unwrap());

        let today = day_window(now, Helsinki, Some(Weekday::Wed)).unwrap();
        assert_eq!(today.start(), now);
        assert_eq!(today, day_window(now, Helsinki, None).unwrap());
    }

    #[test]
    fn test_parse_compact_local() {
        let parsed = parse_compact_local("20260302T0930", New_York).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap());
        assert!(parse_compact_local("2026-03-02 09:30", New_York).is_err());
    }

    #[test]
    fn test_format_clock() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 2, 14, 5, 0).unwrap();
        assert_eq!(format_clock(instant, New_York), "09:05");
    }
}
