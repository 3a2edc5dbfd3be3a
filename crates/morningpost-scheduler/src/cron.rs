//! Cron expression evaluator.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Field syntax: *, ?, N, A-B, */N, A-B/N, A/N, comma lists; month and
//! weekday names (JAN, MON). Descriptors: @yearly, @monthly, @weekly,
//! @daily, @hourly.
//! Example: "0 8 * * *" = every day at 8:00

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use morningpost_core::error::{MorningPostError, Result};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
const NUMERIC: &[&str] = &[];

/// How far ahead `next_after` looks before giving up (e.g. "0 0 30 2 *").
const SEARCH_DAYS: i64 = 4 * 366;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    /// 0 = Sunday.
    days_of_week: Vec<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let expanded = match expression.trim() {
            "@yearly" | "@annually" => "0 0 1 1 *",
            "@monthly" => "0 0 1 * *",
            "@weekly" => "0 0 * * 0",
            "@daily" | "@midnight" => "0 0 * * *",
            "@hourly" => "0 * * * *",
            other => other,
        };

        let parts: Vec<&str> = expanded.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(MorningPostError::Schedule(format!(
                "Invalid cron expression: '{expression}' (need 5 fields: MIN HOUR DOM MON DOW)"
            )));
        }

        let field = |i: usize, min: u32, max: u32, names: &[&str], base: u32| {
            parse_field(parts[i], min, max, names, base).ok_or_else(|| {
                MorningPostError::Schedule(format!(
                    "Invalid cron field '{}' in '{expression}'",
                    parts[i]
                ))
            })
        };

        let minutes = field(0, 0, 59, NUMERIC, 0)?;
        let hours = field(1, 0, 23, NUMERIC, 0)?;
        let days_of_month = field(2, 1, 31, NUMERIC, 0)?;
        let months = field(3, 1, 12, &MONTHS[..], 1)?;
        let mut days_of_week = field(4, 0, 7, &WEEKDAYS[..], 0)?;
        // 7 is another spelling of Sunday.
        for d in days_of_week.iter_mut() {
            if *d == 7 {
                *d = 0;
            }
        }
        days_of_week.sort_unstable();
        days_of_week.dedup();

        Ok(Self {
            expression: expression.trim().to_string(),
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !is_wildcard(parts[2]),
            dow_restricted: !is_wildcard(parts[4]),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Next matching minute strictly after `after`, in `after`'s zone.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let start = after.naive_local();
        let limit = start + Duration::days(SEARCH_DAYS);

        let mut t = start.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);
        while t <= limit {
            if !self.months.contains(&t.month()) {
                t = first_of_next_month(t.date())?;
                continue;
            }
            if !self.day_matches(t.date()) {
                t = t.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.hours.contains(&t.hour()) {
                t = t.with_minute(0)? + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(&t.minute()) {
                t += Duration::minutes(1);
                continue;
            }
            if let Some(found) = tz.from_local_datetime(&t).earliest() {
                return Some(found);
            }
            // Local time skipped by a DST jump; keep looking.
            t += Duration::minutes(1);
        }
        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(&date.day());
        let dow = self
            .days_of_week
            .contains(&date.weekday().num_days_from_sunday());
        match (self.dom_restricted, self.dow_restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}

fn is_wildcard(field: &str) -> bool {
    field == "*" || field == "?"
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.and_hms_opt(0, 0, 0)
}

/// Parse a cron field into the sorted list of matching values.
fn parse_field(field: &str, min: u32, max: u32, names: &[&str], base: u32) -> Option<Vec<u32>> {
    let mut values = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, step.parse::<u32>().ok()?),
            None => (part, 1),
        };
        if step == 0 {
            return None;
        }

        let (lo, hi) = if is_wildcard(range) {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (value(a, names, base)?, value(b, names, base)?)
        } else {
            let v = value(range, names, base)?;
            // "5/15" means 5, 20, 35, 50.
            if part.contains('/') { (v, max) } else { (v, v) }
        };

        if lo < min || hi > max || lo > hi {
            return None;
        }
        values.extend((lo..=hi).step_by(step as usize));
    }
    values.sort_unstable();
    values.dedup();
    Some(values)
}

fn value(token: &str, names: &[&str], base: u32) -> Option<u32> {
    let token = token.trim();
    if let Ok(n) = token.parse::<u32>() {
        return Some(n);
    }
    let upper = token.to_ascii_uppercase();
    names
        .iter()
        .position(|name| *name == upper)
        .map(|i| i as u32 + base)
}
