use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "dot-dev",
            Profile::Prod => "dot",
        }
    }
}

/// Get the default home directory for the journal.
/// If profile is Dev, uses "dot-dev" instead of "dot"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "dot", profile.app_name()).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Today's calendar date (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_monday = i64::from(date.weekday().num_days_from_monday());
    date - Duration::days(days_since_monday)
}

/// Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

pub fn is_past(date: NaiveDate) -> bool {
    date < today()
}

pub fn is_today(date: NaiveDate) -> bool {
    date == today()
}

pub fn is_future(date: NaiveDate) -> bool {
    date > today()
}

/// Parse a date string in YYYY-MM-DD format
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// Parse a point in time from the command line.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]` and a
/// bare date (midnight). Values without an offset are read as UTC.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    parse_date(value)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("expected YYYY-MM-DD[THH:MM[:SS]], got `{value}`"))
}

/// A timestamp that is strictly later than `previous`, normally "now".
///
/// Status transitions can happen within one clock tick; bumping by a
/// nanosecond keeps `updated_at` monotonic.
pub fn later_than(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_bounds_run_monday_to_sunday() {
        // 2024-01-17 is a Wednesday
        assert_eq!(week_start(date(2024, 1, 17)), date(2024, 1, 15));
        assert_eq!(week_end(date(2024, 1, 17)), date(2024, 1, 21));
        assert_eq!(week_start(date(2024, 1, 15)), date(2024, 1, 15));
        assert_eq!(week_start(date(2024, 1, 21)), date(2024, 1, 15));
    }

    #[test]
    fn month_end_handles_december_and_leap_years() {
        assert_eq!(month_end(2023, 12), Some(date(2023, 12, 31)));
        assert_eq!(month_end(2024, 2), Some(date(2024, 2, 29)));
        assert_eq!(month_end(2023, 2), Some(date(2023, 2, 28)));
        assert_eq!(month_start(2024, 13), None);
    }

    #[test]
    fn relative_date_checks() {
        let today = today();
        assert!(is_today(today));
        assert!(is_past(today - Duration::days(1)));
        assert!(is_future(today + Duration::days(1)));
    }

    #[test]
    fn parse_datetime_accepts_common_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-15T10:00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-15T10:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-15 10:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-15T11:00:00+01:00").unwrap(), expected);
        assert_eq!(
            parse_datetime("2024-01-15").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert!(parse_datetime("15/01/2024").is_err());
    }

    #[test]
    fn later_than_is_strictly_later() {
        let future = Utc::now() + Duration::hours(1);
        assert!(later_than(future) > future);
        let past = Utc::now() - Duration::hours(1);
        assert!(later_than(past) > past);
    }

    #[test]
    fn expand_path_leaves_plain_paths_alone() {
        assert_eq!(expand_path("/tmp/dot.db"), PathBuf::from("/tmp/dot.db"));
    }
}
