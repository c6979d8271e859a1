//! Cron-based recurrence for repeating tasks.
//!
//! Expressions use the classic five fields (minute, hour, day of month,
//! month, day of week). Occurrence math is delegated to the `cron` crate,
//! which expects a leading seconds field; we pin it to `0`.
//!
//! Day-of-week numbers follow classic cron: `0` through `6` start on Sunday
//! and `7` is Sunday again. The `cron` crate counts `1` through `7` from
//! Sunday instead, so numeric items are rewritten to weekday names first.

use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::validation::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceSettings {
    pub cron_expression: String,
    pub next_occurrence: DateTime<Utc>,
    pub last_occurrence: Option<DateTime<Utc>>,
}

impl RecurrenceSettings {
    pub fn new(
        cron_expression: String,
        next_occurrence: DateTime<Utc>,
        last_occurrence: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        validate_cron(&cron_expression)?;
        Ok(Self {
            cron_expression,
            next_occurrence,
            last_occurrence,
        })
    }
}

fn parse_schedule(expression: &str) -> Result<Schedule, DomainError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(DomainError::InvalidCron(format!(
            "`{expression}` must have 5 fields, found {}",
            fields.len()
        )));
    }

    let day_of_week = weekday_names(expression, fields[4])?;
    Schedule::from_str(&format!("0 {} {day_of_week}", fields[..4].join(" ")))
        .map_err(|err| DomainError::InvalidCron(format!("`{expression}`: {err}")))
}

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Rewrites numeric day-of-week items (`1-5`, `0,3`, `2-6/2`, `1/2`) as name
/// lists. Wildcards and named items pass through untouched.
fn weekday_names(expression: &str, field: &str) -> Result<String, DomainError> {
    let invalid = |reason: String| DomainError::InvalidCron(format!("`{expression}`: {reason}"));

    let mut items = Vec::new();
    for item in field.split(',') {
        let (base, step) = match item.split_once('/') {
            Some((base, step)) => (base, Some(step)),
            None => (item, None),
        };
        if base == "*" || base == "?" || !base.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
            items.push(item.to_string());
            continue;
        }

        let number = |text: &str| -> Result<u32, DomainError> {
            match text.parse::<u32>() {
                Ok(n) if n <= 7 => Ok(n),
                _ => Err(invalid(format!("day of week `{text}` is not in 0-7"))),
            }
        };
        let (start, end) = match base.split_once('-') {
            Some((start, end)) => (number(start)?, number(end)?),
            None => {
                let start = number(base)?;
                // `N/step` runs to the end of the week
                let end = if step.is_some() { start.max(6) } else { start };
                (start, end)
            }
        };
        if start > end {
            return Err(invalid(format!("day-of-week range `{base}` runs backwards")));
        }
        let step = match step {
            Some(step) => match step.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid(format!("day-of-week step `{step}` is not a positive number"))),
            },
            None => 1,
        };

        for day in (start..=end).step_by(step) {
            let name = WEEKDAYS[(day % 7) as usize];
            if !items.iter().any(|seen| seen == name) {
                items.push(name.to_string());
            }
        }
    }
    Ok(items.join(","))
}

pub fn validate_cron(expression: &str) -> Result<(), DomainError> {
    parse_schedule(expression).map(|_| ())
}

/// First occurrence strictly after `from`.
pub fn next_occurrence(expression: &str, from: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
    parse_schedule(expression)?
        .after(&from)
        .next()
        .ok_or_else(|| DomainError::InvalidCron(format!("`{expression}` never fires again")))
}

/// Last occurrence strictly before `from`.
pub fn previous_occurrence(
    expression: &str,
    from: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    parse_schedule(expression)?
        .after(&from)
        .next_back()
        .ok_or_else(|| DomainError::InvalidCron(format!("`{expression}` never fired before")))
}

pub fn upcoming_occurrences(
    expression: &str,
    count: usize,
    from: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, DomainError> {
    Ok(parse_schedule(expression)?.after(&from).take(count).collect())
}

pub fn setup_recurrence(
    expression: &str,
    start: Option<DateTime<Utc>>,
) -> Result<RecurrenceSettings, DomainError> {
    let start = start.unwrap_or_else(Utc::now);
    let next = next_occurrence(expression, start)?;
    RecurrenceSettings::new(expression.to_string(), next, None)
}

/// Moves the schedule forward one step: the pending occurrence becomes the
/// last one.
pub fn advance(settings: &RecurrenceSettings) -> Result<RecurrenceSettings, DomainError> {
    let next = next_occurrence(&settings.cron_expression, settings.next_occurrence)?;
    RecurrenceSettings::new(
        settings.cron_expression.clone(),
        next,
        Some(settings.next_occurrence),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(matches!(validate_cron("not a cron"), Err(DomainError::InvalidCron(_))));
        assert!(matches!(validate_cron("0 9 * *"), Err(DomainError::InvalidCron(_))));
        assert!(matches!(validate_cron("0 0 9 * * *"), Err(DomainError::InvalidCron(_))));
        assert!(matches!(validate_cron("61 9 * * *"), Err(DomainError::InvalidCron(_))));
        assert!(validate_cron("*/15 9-17 * * *").is_ok());
        assert!(matches!(validate_cron("0 9 * * 8"), Err(DomainError::InvalidCron(_))));
        assert!(matches!(validate_cron("0 9 * * 5-1"), Err(DomainError::InvalidCron(_))));
    }

    #[test]
    fn numeric_weekdays_count_from_sunday_zero() {
        // 2024-01-13 is a Saturday
        let saturday = at(2024, 1, 13, 12, 0);
        let sunday = at(2024, 1, 14, 0, 0);

        assert_eq!(next_occurrence("* * * * 0", saturday).unwrap(), sunday);
        assert_eq!(next_occurrence("* * * * 7", saturday).unwrap(), sunday);
        assert_eq!(next_occurrence("0 9 * * 1", saturday).unwrap(), at(2024, 1, 15, 9, 0));

        let weekdays = upcoming_occurrences("0 9 * * 1-5", 5, saturday).unwrap();
        let expected: Vec<_> = (15..=19).map(|d| at(2024, 1, d, 9, 0)).collect();
        assert_eq!(weekdays, expected);
    }

    #[test]
    fn numeric_lists_and_steps_match_names() {
        let from = at(2024, 1, 13, 12, 0);
        for (numeric, named) in [
            ("0 9 * * 1,3,5", "0 9 * * MON,WED,FRI"),
            ("0 9 * * 1-5/2", "0 9 * * MON,WED,FRI"),
            ("0 9 * * 5-7", "0 9 * * FRI,SAT,SUN"),
            ("0 9 * * 0,6", "0 9 * * SAT,SUN"),
        ] {
            assert_eq!(
                upcoming_occurrences(numeric, 6, from).unwrap(),
                upcoming_occurrences(named, 6, from).unwrap(),
                "{numeric}"
            );
        }
    }

    #[test]
    fn next_and_previous_daily_occurrence() {
        let from = at(2024, 1, 15, 12, 0);
        assert_eq!(next_occurrence("0 9 * * *", from).unwrap(), at(2024, 1, 16, 9, 0));
        assert_eq!(previous_occurrence("0 9 * * *", from).unwrap(), at(2024, 1, 15, 9, 0));
    }

    #[test]
    fn upcoming_occurrences_are_consecutive() {
        let from = at(2024, 1, 15, 8, 0);
        let upcoming = upcoming_occurrences("30 8 * * *", 3, from).unwrap();
        assert_eq!(
            upcoming,
            vec![at(2024, 1, 15, 8, 30), at(2024, 1, 16, 8, 30), at(2024, 1, 17, 8, 30)]
        );
    }

    #[test]
    fn advance_rolls_next_into_last() {
        let settings = setup_recurrence("0 9 * * *", Some(at(2024, 1, 15, 12, 0))).unwrap();
        assert_eq!(settings.next_occurrence, at(2024, 1, 16, 9, 0));
        assert_eq!(settings.last_occurrence, None);

        let advanced = advance(&settings).unwrap();
        assert_eq!(advanced.last_occurrence, Some(at(2024, 1, 16, 9, 0)));
        assert_eq!(advanced.next_occurrence, at(2024, 1, 17, 9, 0));
    }
}
