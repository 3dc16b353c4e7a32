// Calendar arithmetic shared by the period model and the alignment engine
use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;

pub const FULL_MONTH_NAMES: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

pub const ABBREV_MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
];

/// Weekday abbreviations, starting at Sunday.
pub const DAYS_OF_WEEK: [&str; 7] = ["Zo", "Ma", "Di", "Wo", "Do", "Vr", "Za"];

/// Unit of a bucket within a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Start of the unit-sized slot `t` falls into.
    pub fn truncate(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        match self {
            TimeUnit::Month => first_of_month(date).and_time(NaiveTime::MIN),
            TimeUnit::Day => date.and_time(NaiveTime::MIN),
            TimeUnit::Hour => date.and_time(hms(t.hour(), 0, 0)),
            TimeUnit::Minute => date.and_time(hms(t.hour(), t.minute(), 0)),
            TimeUnit::Second => date.and_time(hms(t.hour(), t.minute(), t.second())),
        }
    }

    /// Shift `t` forward by `n` units. Months keep the day of month clamped
    /// to the target month's length.
    pub fn add(self, t: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        self.shift(t, i64::from(n))
    }

    /// Shift `t` by `n` units in either direction.
    pub fn shift(self, t: NaiveDateTime, n: i64) -> Option<NaiveDateTime> {
        match self {
            TimeUnit::Month => {
                let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
                if n >= 0 {
                    t.checked_add_months(months)
                } else {
                    t.checked_sub_months(months)
                }
            }
            TimeUnit::Day => t.checked_add_signed(TimeDelta::try_days(n)?),
            TimeUnit::Hour => t.checked_add_signed(TimeDelta::try_hours(n)?),
            TimeUnit::Minute => t.checked_add_signed(TimeDelta::try_minutes(n)?),
            TimeUnit::Second => t.checked_add_signed(TimeDelta::try_seconds(n)?),
        }
    }

    /// Duration literal used in `GROUP BY time(...)` clauses. Calendar
    /// months have no fixed duration and therefore no literal.
    pub fn interval(self) -> Option<&'static str> {
        match self {
            TimeUnit::Month => None,
            TimeUnit::Day => Some("1d"),
            TimeUnit::Hour => Some("1h"),
            TimeUnit::Minute => Some("1m"),
            TimeUnit::Second => Some("1s"),
        }
    }
}

/// A stepping rule: one bucket (or tick) every `every` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickRule {
    pub unit: TimeUnit,
    pub every: u32,
}

impl TickRule {
    pub const fn new(unit: TimeUnit, every: u32) -> Self {
        Self { unit, every }
    }

    /// All instants from `start` stepping by this rule while `<= end`.
    ///
    /// Month steps are taken from `start` rather than chained so a start on
    /// the 31st does not drift after passing a short month.
    pub fn enumerate(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
        let mut result = Vec::new();
        let mut step = 0u32;

        while let Some(current) = self.unit.add(start, step) {
            if current > end {
                break;
            }
            result.push(current);
            step += self.every.max(1);
        }

        result
    }
}

pub fn days_in_month(year: i32, month0: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month0 + 1, 1) else {
        return 0;
    };
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        // December of the last representable year
        None => 31,
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Current civil time on the host's wall clock.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) fn hms(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN)
}

/// The last millisecond before `t`.
pub(crate) fn just_before(t: NaiveDateTime) -> NaiveDateTime {
    t - TimeDelta::milliseconds(1)
}
