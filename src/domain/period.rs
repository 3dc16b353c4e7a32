// Period domain model - the calendar window currently being viewed
use crate::domain::calendar::{
    self, ABBREV_MONTH_NAMES, DAYS_OF_WEEK, FULL_MONTH_NAMES, TickRule, TimeUnit, days_in_month,
    hms, just_before,
};
use crate::domain::error::{PeriodError, PeriodResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSize {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

/// Whether axis ticks sit on a bucket or on the boundary between buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphTickPositions {
    OnValue,
    BetweenValues,
}

fn out_of_range() -> ! {
    panic!("period arithmetic left the representable calendar range")
}

fn valid_date(year: i32, month: u32, day: u32) -> PeriodResult<NaiveDate> {
    if month > 11 {
        return Err(PeriodError::InvalidCoordinates(format!(
            "month {month} is outside 0-11"
        )));
    }
    NaiveDate::from_ymd_opt(year, month + 1, day).ok_or_else(|| {
        PeriodError::InvalidCoordinates(format!("{year}-{:02}-{day:02} is not a date", month + 1))
    })
}

fn valid_time(hour: u32, minute: u32) -> PeriodResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        PeriodError::InvalidCoordinates(format!("{hour:02}:{minute:02} is not a time of day"))
    })
}

fn weekday_name(date: NaiveDate) -> &'static str {
    DAYS_OF_WEEK[date.weekday().num_days_from_sunday() as usize]
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearDescription {
    year: i32,
}

impl YearDescription {
    /// # Panics
    /// When the year lies outside the representable calendar range.
    pub fn new(year: i32) -> Self {
        Self::try_new(year).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(year: i32) -> PeriodResult<Self> {
        valid_date(year, 0, 1)?;
        valid_date(year, 11, 31)?;
        Ok(Self { year })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, 1, 1)
            .unwrap_or_else(|| out_of_range())
            .and_time(NaiveTime::MIN)
    }

    pub fn previous(&self) -> Self {
        Self::try_new(self.year - 1).unwrap_or_else(|_| out_of_range())
    }

    pub fn next(&self) -> Self {
        Self::try_new(self.year + 1).unwrap_or_else(|_| out_of_range())
    }

    /// Month `index` (0 = January) of this year.
    pub fn at_index(&self, index: usize) -> MonthDescription {
        assert!(index < 12, "month index {index} is outside 0-11");
        MonthDescription::new(self.year, index as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDescription {
    year: i32,
    month: u32,
}

impl MonthDescription {
    /// `month` is zero-based.
    ///
    /// # Panics
    /// When `month` is outside 0-11 or the year is not representable.
    pub fn new(year: i32, month: u32) -> Self {
        Self::try_new(year, month).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(year: i32, month: u32) -> PeriodResult<Self> {
        valid_date(year, month, 1)?;
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0())
    }

    pub fn this_month() -> Self {
        Self::containing(calendar::now().date())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn start(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
            .unwrap_or_else(|| out_of_range())
            .and_time(NaiveTime::MIN)
    }

    pub fn previous(&self) -> Self {
        self.shifted(-1)
    }

    pub fn next(&self) -> Self {
        self.shifted(1)
    }

    fn shifted(&self, months: i64) -> Self {
        let start = TimeUnit::Month
            .shift(self.start(), months)
            .unwrap_or_else(|| out_of_range());
        Self::containing(start.date())
    }

    pub fn up(&self) -> YearDescription {
        YearDescription::new(self.year)
    }

    /// Day `index` (0 = the first) of this month.
    pub fn at_index(&self, index: usize) -> DayDescription {
        assert!(
            index < self.days() as usize,
            "day index {index} is outside a {}-day month",
            self.days()
        );
        let date = TimeUnit::Day
            .add(self.start(), index as u32)
            .unwrap_or_else(|| out_of_range());
        DayDescription::containing(date.date())
    }

    pub fn at_instant(&self, instant: NaiveDateTime) -> DayDescription {
        assert!(
            MonthDescription::containing(instant.date()) == *self,
            "{instant} is not inside {}-{:02}",
            self.year,
            self.month + 1
        );
        DayDescription::containing(instant.date())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayDescription {
    year: i32,
    month: u32,
    day: u32,
}

impl DayDescription {
    /// `month` is zero-based, `day` one-based.
    ///
    /// # Panics
    /// When the coordinates do not name a calendar day.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self::try_new(year, month, day).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(year: i32, month: u32, day: u32) -> PeriodResult<Self> {
        valid_date(year, month, day)?;
        Ok(Self { year, month, day })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            day: date.day(),
        }
    }

    pub fn today() -> Self {
        Self::containing(calendar::now().date())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day).unwrap_or_else(|| out_of_range())
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date().and_time(NaiveTime::MIN)
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.date().pred_opt().unwrap_or_else(|| out_of_range()))
    }

    pub fn next(&self) -> Self {
        Self::containing(self.date().succ_opt().unwrap_or_else(|| out_of_range()))
    }

    pub fn up(&self) -> MonthDescription {
        MonthDescription::new(self.year, self.month)
    }

    /// Hour `index` (0-23) of this day.
    pub fn at_index(&self, index: usize) -> HourDescription {
        assert!(index < 24, "hour index {index} is outside 0-23");
        HourDescription::new(self.year, self.month, self.day, index as u32)
    }

    pub fn at_instant(&self, instant: NaiveDateTime) -> HourDescription {
        assert!(
            instant.date() == self.date(),
            "{instant} is not on {}",
            self.date()
        );
        HourDescription::containing(instant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourDescription {
    day: DayDescription,
    hour: u32,
}

impl HourDescription {
    /// # Panics
    /// When the coordinates do not name an hour of a calendar day.
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self::try_new(year, month, day, hour).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(year: i32, month: u32, day: u32, hour: u32) -> PeriodResult<Self> {
        let day = DayDescription::try_new(year, month, day)?;
        valid_time(hour, 0)?;
        Ok(Self { day, hour })
    }

    pub fn containing(instant: NaiveDateTime) -> Self {
        Self {
            day: DayDescription::containing(instant.date()),
            hour: instant.hour(),
        }
    }

    pub fn year(&self) -> i32 {
        self.day.year
    }

    pub fn month(&self) -> u32 {
        self.day.month
    }

    pub fn day(&self) -> u32 {
        self.day.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn start(&self) -> NaiveDateTime {
        self.day.date().and_time(hms(self.hour, 0, 0))
    }

    pub fn previous(&self) -> Self {
        self.shifted(-1)
    }

    pub fn next(&self) -> Self {
        self.shifted(1)
    }

    fn shifted(&self, hours: i64) -> Self {
        Self::containing(
            TimeUnit::Hour
                .shift(self.start(), hours)
                .unwrap_or_else(|| out_of_range()),
        )
    }

    pub fn up(&self) -> DayDescription {
        self.day
    }

    /// Minute `index` (0-59) of this hour.
    pub fn at_index(&self, index: usize) -> MinuteDescription {
        assert!(index < 60, "minute index {index} is outside 0-59");
        MinuteDescription {
            hour: *self,
            minute: index as u32,
        }
    }

    pub fn at_instant(&self, instant: NaiveDateTime) -> MinuteDescription {
        assert!(
            HourDescription::containing(instant) == *self,
            "{instant} is not inside hour {}",
            self.start()
        );
        MinuteDescription::containing(instant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinuteDescription {
    hour: HourDescription,
    minute: u32,
}

impl MinuteDescription {
    /// # Panics
    /// When the coordinates do not name a minute of a calendar day.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self::try_new(year, month, day, hour, minute).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> PeriodResult<Self> {
        let hour = HourDescription::try_new(year, month, day, hour)?;
        valid_time(hour.hour, minute)?;
        Ok(Self { hour, minute })
    }

    pub fn containing(instant: NaiveDateTime) -> Self {
        Self {
            hour: HourDescription::containing(instant),
            minute: instant.minute(),
        }
    }

    pub fn year(&self) -> i32 {
        self.hour.year()
    }

    pub fn month(&self) -> u32 {
        self.hour.month()
    }

    pub fn day(&self) -> u32 {
        self.hour.day()
    }

    pub fn hour(&self) -> u32 {
        self.hour.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn start(&self) -> NaiveDateTime {
        self.hour.day.date().and_time(hms(self.hour.hour, self.minute, 0))
    }

    pub fn previous(&self) -> Self {
        self.shifted(-1)
    }

    pub fn next(&self) -> Self {
        self.shifted(1)
    }

    fn shifted(&self, minutes: i64) -> Self {
        Self::containing(
            TimeUnit::Minute
                .shift(self.start(), minutes)
                .unwrap_or_else(|| out_of_range()),
        )
    }

    pub fn up(&self) -> HourDescription {
        self.hour
    }
}

/// Rolling window of the 60 minutes ending with the current one.
///
/// Its bounds are recomputed from the wall clock on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LastHourDescription;

impl LastHourDescription {
    pub fn bounds_at(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let current_minute = TimeUnit::Minute.truncate(now);
        let start = TimeUnit::Minute
            .shift(current_minute, -59)
            .unwrap_or(current_minute);
        (start, now)
    }
}

// ---------------------------------------------------------------------------
// Sum type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodDescription {
    Year(YearDescription),
    Month(MonthDescription),
    Day(DayDescription),
    Hour(HourDescription),
    Minute(MinuteDescription),
    LastHour(LastHourDescription),
}

impl From<YearDescription> for PeriodDescription {
    fn from(value: YearDescription) -> Self {
        PeriodDescription::Year(value)
    }
}

impl From<MonthDescription> for PeriodDescription {
    fn from(value: MonthDescription) -> Self {
        PeriodDescription::Month(value)
    }
}

impl From<DayDescription> for PeriodDescription {
    fn from(value: DayDescription) -> Self {
        PeriodDescription::Day(value)
    }
}

impl From<HourDescription> for PeriodDescription {
    fn from(value: HourDescription) -> Self {
        PeriodDescription::Hour(value)
    }
}

impl From<MinuteDescription> for PeriodDescription {
    fn from(value: MinuteDescription) -> Self {
        PeriodDescription::Minute(value)
    }
}

impl From<LastHourDescription> for PeriodDescription {
    fn from(value: LastHourDescription) -> Self {
        PeriodDescription::LastHour(value)
    }
}

impl PeriodDescription {
    pub fn today() -> Self {
        DayDescription::today().into()
    }

    /// Variant name as used in stored state and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PeriodDescription::Year(_) => "year",
            PeriodDescription::Month(_) => "month",
            PeriodDescription::Day(_) => "day",
            PeriodDescription::Hour(_) => "hour",
            PeriodDescription::Minute(_) => "minute",
            PeriodDescription::LastHour(_) => "last_hour",
        }
    }

    pub fn period_size(&self) -> PeriodSize {
        match self {
            PeriodDescription::Year(_) => PeriodSize::Year,
            PeriodDescription::Month(_) => PeriodSize::Month,
            PeriodDescription::Day(_) => PeriodSize::Day,
            PeriodDescription::Hour(_) | PeriodDescription::LastHour(_) => PeriodSize::Hour,
            PeriodDescription::Minute(_) => PeriodSize::Minute,
        }
    }

    pub fn graph_tick_positions(&self) -> GraphTickPositions {
        match self {
            PeriodDescription::Year(_)
            | PeriodDescription::Month(_)
            | PeriodDescription::Minute(_) => GraphTickPositions::OnValue,
            PeriodDescription::Day(_)
            | PeriodDescription::Hour(_)
            | PeriodDescription::LastHour(_) => GraphTickPositions::BetweenValues,
        }
    }

    /// One bucket per step of this rule, from start to end of the period.
    pub fn expected_domain_values(&self) -> TickRule {
        TickRule::new(self.bucket_unit(), 1)
    }

    /// Axis tick placement; may skip buckets.
    pub fn chart_ticks(&self) -> TickRule {
        match self {
            PeriodDescription::Year(_) => TickRule::new(TimeUnit::Month, 1),
            PeriodDescription::Month(_) => TickRule::new(TimeUnit::Day, 2),
            PeriodDescription::Day(_) => TickRule::new(TimeUnit::Hour, 2),
            PeriodDescription::Hour(_) => TickRule::new(TimeUnit::Minute, 5),
            PeriodDescription::Minute(_) => TickRule::new(TimeUnit::Second, 10),
            PeriodDescription::LastHour(_) => TickRule::new(TimeUnit::Minute, 10),
        }
    }

    pub fn bucket_unit(&self) -> TimeUnit {
        match self {
            PeriodDescription::Year(_) => TimeUnit::Month,
            PeriodDescription::Month(_) => TimeUnit::Day,
            PeriodDescription::Day(_) => TimeUnit::Hour,
            PeriodDescription::Hour(_) | PeriodDescription::LastHour(_) => TimeUnit::Minute,
            PeriodDescription::Minute(_) => TimeUnit::Second,
        }
    }

    pub fn bucket_count(&self) -> usize {
        match self {
            PeriodDescription::Year(_) => 12,
            PeriodDescription::Month(m) => m.days() as usize,
            PeriodDescription::Day(_) => 24,
            PeriodDescription::Hour(_)
            | PeriodDescription::Minute(_)
            | PeriodDescription::LastHour(_) => 60,
        }
    }

    /// Start of the bucket `instant` falls into.
    pub fn normalize(&self, instant: NaiveDateTime) -> NaiveDateTime {
        self.bucket_unit().truncate(instant)
    }

    pub fn start_of_period(&self) -> NaiveDateTime {
        self.bounds().0
    }

    /// Inclusive upper bound: the last millisecond of the period.
    pub fn end_of_period(&self) -> NaiveDateTime {
        self.bounds().1
    }

    /// Start and inclusive end, read from one clock sample for rolling periods.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let (start, span) = match self {
            PeriodDescription::Year(y) => (y.start(), TimeUnit::Month.add(y.start(), 12)),
            PeriodDescription::Month(m) => (m.start(), TimeUnit::Month.add(m.start(), 1)),
            PeriodDescription::Day(d) => (d.start(), TimeUnit::Day.add(d.start(), 1)),
            PeriodDescription::Hour(h) => (h.start(), TimeUnit::Hour.add(h.start(), 1)),
            PeriodDescription::Minute(m) => (m.start(), TimeUnit::Minute.add(m.start(), 1)),
            PeriodDescription::LastHour(_) => return LastHourDescription::bounds_at(calendar::now()),
        };
        let end = span.map(just_before).unwrap_or(NaiveDateTime::MAX);
        (start, end)
    }

    /// Bucket start instants, in order.
    pub fn buckets(&self) -> Vec<NaiveDateTime> {
        let (start, end) = self.bounds();
        self.expected_domain_values().enumerate(start, end)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        let (start, end) = self.bounds();
        start <= instant && instant <= end
    }

    pub fn previous(&self) -> PeriodResult<Self> {
        Ok(match self {
            PeriodDescription::Year(y) => y.previous().into(),
            PeriodDescription::Month(m) => m.previous().into(),
            PeriodDescription::Day(d) => d.previous().into(),
            PeriodDescription::Hour(h) => h.previous().into(),
            PeriodDescription::Minute(m) => m.previous().into(),
            PeriodDescription::LastHour(_) => return Err(self.unsupported("previous")),
        })
    }

    pub fn next(&self) -> PeriodResult<Self> {
        Ok(match self {
            PeriodDescription::Year(y) => y.next().into(),
            PeriodDescription::Month(m) => m.next().into(),
            PeriodDescription::Day(d) => d.next().into(),
            PeriodDescription::Hour(h) => h.next().into(),
            PeriodDescription::Minute(m) => m.next().into(),
            PeriodDescription::LastHour(_) => return Err(self.unsupported("next")),
        })
    }

    /// The coarser period containing this one; `None` at the top of the hierarchy.
    pub fn up(&self) -> PeriodResult<Option<Self>> {
        Ok(match self {
            PeriodDescription::Year(_) => None,
            PeriodDescription::Month(m) => Some(m.up().into()),
            PeriodDescription::Day(d) => Some(d.up().into()),
            PeriodDescription::Hour(h) => Some(h.up().into()),
            PeriodDescription::Minute(m) => Some(m.up().into()),
            PeriodDescription::LastHour(_) => return Err(self.unsupported("up")),
        })
    }

    /// Drill down into the finer period at bucket `index`.
    pub fn at_index(&self, index: usize) -> PeriodResult<Self> {
        let buckets = self.bucket_count();
        if index >= buckets {
            return Err(PeriodError::IndexOutOfRange { index, buckets });
        }
        Ok(match self {
            PeriodDescription::Year(y) => y.at_index(index).into(),
            PeriodDescription::Month(m) => m.at_index(index).into(),
            PeriodDescription::Day(d) => d.at_index(index).into(),
            PeriodDescription::Hour(h) => h.at_index(index).into(),
            PeriodDescription::Minute(_) => return Err(PeriodError::NoFinerPeriod("minute")),
            PeriodDescription::LastHour(_) => {
                let start = self.start_of_period();
                let minute = TimeUnit::Minute
                    .add(start, index as u32)
                    .ok_or(PeriodError::IndexOutOfRange { index, buckets })?;
                MinuteDescription::containing(minute).into()
            }
        })
    }

    /// Drill down into the finer period containing `instant`.
    pub fn at_instant(&self, instant: NaiveDateTime) -> PeriodResult<Self> {
        if let PeriodDescription::Minute(_) = self {
            return Err(PeriodError::NoFinerPeriod("minute"));
        }
        if !self.contains(instant) {
            return Err(PeriodError::InstantOutOfRange(instant));
        }
        Ok(match self {
            PeriodDescription::Year(_) => MonthDescription::containing(instant.date()).into(),
            PeriodDescription::Month(m) => m.at_instant(instant).into(),
            PeriodDescription::Day(d) => d.at_instant(instant).into(),
            PeriodDescription::Hour(h) => h.at_instant(instant).into(),
            PeriodDescription::LastHour(_) | PeriodDescription::Minute(_) => {
                MinuteDescription::containing(instant).into()
            }
        })
    }

    /// False when the period ends before the first recorded measurement or
    /// starts after `now`.
    pub fn has_measurements(&self, first_measurement: NaiveDate, now: NaiveDateTime) -> bool {
        let (start, end) = self.bounds();
        end >= first_measurement.and_time(NaiveTime::MIN) && start <= now
    }

    fn unsupported(&self, operation: &'static str) -> PeriodError {
        PeriodError::Unsupported {
            operation,
            period: self.kind(),
        }
    }

    // -----------------------------------------------------------------------
    // Addressing
    // -----------------------------------------------------------------------

    pub fn to_url(&self) -> String {
        match self {
            PeriodDescription::Year(y) => format!("/year/{}", y.year),
            PeriodDescription::Month(m) => format!("/month/{}/{}", m.year, m.month + 1),
            PeriodDescription::Day(d) => format!("/day/{}/{}/{}", d.year, d.month + 1, d.day),
            PeriodDescription::Hour(h) => format!(
                "/hour/{}/{}/{}/{}",
                h.year(),
                h.month() + 1,
                h.day(),
                h.hour
            ),
            PeriodDescription::Minute(m) => format!(
                "/minute/{}/{}/{}/{}/{}",
                m.year(),
                m.month() + 1,
                m.day(),
                m.hour(),
                m.minute
            ),
            PeriodDescription::LastHour(_) => "/last_hour".to_string(),
        }
    }

    /// Inverse of [`PeriodDescription::to_url`]. Months in the url are one-based.
    pub fn from_url(url: &str) -> PeriodResult<Self> {
        let malformed = || PeriodError::MalformedUrl(url.to_string());
        let segments: Vec<&str> = url.trim_matches('/').split('/').collect();
        let (kind, coordinates) = segments.split_first().ok_or_else(malformed)?;

        if *kind == "last_hour" {
            return match coordinates {
                [] => Ok(LastHourDescription.into()),
                _ => Err(malformed()),
            };
        }

        let (year, rest) = coordinates.split_first().ok_or_else(malformed)?;
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let numbers = rest
            .iter()
            .map(|s| s.parse::<u32>().map_err(|_| malformed()))
            .collect::<PeriodResult<Vec<u32>>>()?;

        let month0 = |n: u32| n.checked_sub(1).ok_or_else(malformed);

        match (*kind, numbers.as_slice()) {
            ("year", []) => Ok(YearDescription::try_new(year)?.into()),
            ("month", [m]) => Ok(MonthDescription::try_new(year, month0(*m)?)?.into()),
            ("day", [m, d]) => Ok(DayDescription::try_new(year, month0(*m)?, *d)?.into()),
            ("hour", [m, d, h]) => {
                Ok(HourDescription::try_new(year, month0(*m)?, *d, *h)?.into())
            }
            ("minute", [m, d, h, min]) => {
                Ok(MinuteDescription::try_new(year, month0(*m)?, *d, *h, *min)?.into())
            }
            _ => Err(malformed()),
        }
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    pub fn to_title(&self) -> String {
        match self {
            PeriodDescription::Year(y) => y.year.to_string(),
            PeriodDescription::Month(m) => {
                format!("{} {}", FULL_MONTH_NAMES[m.month as usize], m.year)
            }
            PeriodDescription::Day(d) => format!(
                "{} {} {} {}",
                weekday_name(d.date()),
                d.day,
                FULL_MONTH_NAMES[d.month as usize],
                d.year
            ),
            PeriodDescription::Hour(h) => format!(
                "{} {:02}:00",
                PeriodDescription::Day(h.day).to_title(),
                h.hour
            ),
            PeriodDescription::Minute(m) => format!(
                "{} {:02}:{:02}",
                PeriodDescription::Day(m.hour.day).to_title(),
                m.hour(),
                m.minute
            ),
            PeriodDescription::LastHour(_) => "Afgelopen uur".to_string(),
        }
    }

    pub fn to_short_title(&self) -> String {
        match self {
            PeriodDescription::Day(d) => {
                format!("{} {} {}", d.day, FULL_MONTH_NAMES[d.month as usize], d.year)
            }
            PeriodDescription::Hour(h) => format!(
                "{} {} {:02}:00",
                h.day(),
                FULL_MONTH_NAMES[h.month() as usize],
                h.hour
            ),
            PeriodDescription::Minute(m) => format!("{:02}:{:02}", m.hour(), m.minute),
            _ => self.to_title(),
        }
    }

    /// Axis label for bucket `index`.
    pub fn format_tick(&self, index: usize) -> String {
        match self {
            PeriodDescription::Year(_) => ABBREV_MONTH_NAMES
                .get(index)
                .map(|name| name.to_string())
                .unwrap_or_else(|| (index + 1).to_string()),
            PeriodDescription::Month(_) => (index + 1).to_string(),
            PeriodDescription::Day(_) => index.to_string(),
            PeriodDescription::Hour(h) => format!("{:02}:{:02}", h.hour, index),
            PeriodDescription::Minute(_) => format!("{index}s"),
            PeriodDescription::LastHour(_) => {
                let start = self.start_of_period();
                let minute = start + TimeDelta::minutes(index as i64);
                minute.format("%H:%M").to_string()
            }
        }
    }

    /// strftime pattern for time-axis labels.
    pub fn time_format(&self) -> &'static str {
        match self {
            PeriodDescription::Year(_) => "%m",
            PeriodDescription::Month(_) => "%-d",
            PeriodDescription::Day(_) | PeriodDescription::Hour(_) => "%H:%M",
            PeriodDescription::Minute(_) => "%H:%M:%S",
            PeriodDescription::LastHour(_) => "%H:%M",
        }
    }
}

impl fmt::Display for PeriodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

impl FromStr for PeriodDescription {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_url(s)
    }
}

// ---------------------------------------------------------------------------
// Stored state
// ---------------------------------------------------------------------------

/// Persisted shape of a period. Months are zero-based.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum StoredPeriod {
    YearDescription {
        year: i32,
    },
    MonthDescription {
        year: i32,
        month: u32,
    },
    DayDescription {
        year: i32,
        month: u32,
        day: u32,
    },
    HourDescription {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
    },
    MinuteDescription {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
    LastHourDescription,
}

impl From<&PeriodDescription> for StoredPeriod {
    fn from(period: &PeriodDescription) -> Self {
        match *period {
            PeriodDescription::Year(y) => StoredPeriod::YearDescription { year: y.year },
            PeriodDescription::Month(m) => StoredPeriod::MonthDescription {
                year: m.year,
                month: m.month,
            },
            PeriodDescription::Day(d) => StoredPeriod::DayDescription {
                year: d.year,
                month: d.month,
                day: d.day,
            },
            PeriodDescription::Hour(h) => StoredPeriod::HourDescription {
                year: h.year(),
                month: h.month(),
                day: h.day(),
                hour: h.hour,
            },
            PeriodDescription::Minute(m) => StoredPeriod::MinuteDescription {
                year: m.year(),
                month: m.month(),
                day: m.day(),
                hour: m.hour(),
                minute: m.minute,
            },
            PeriodDescription::LastHour(_) => StoredPeriod::LastHourDescription,
        }
    }
}

impl TryFrom<StoredPeriod> for PeriodDescription {
    type Error = PeriodError;

    fn try_from(stored: StoredPeriod) -> Result<Self, Self::Error> {
        Ok(match stored {
            StoredPeriod::YearDescription { year } => YearDescription::try_new(year)?.into(),
            StoredPeriod::MonthDescription { year, month } => {
                MonthDescription::try_new(year, month)?.into()
            }
            StoredPeriod::DayDescription { year, month, day } => {
                DayDescription::try_new(year, month, day)?.into()
            }
            StoredPeriod::HourDescription {
                year,
                month,
                day,
                hour,
            } => HourDescription::try_new(year, month, day, hour)?.into(),
            StoredPeriod::MinuteDescription {
                year,
                month,
                day,
                hour,
                minute,
            } => MinuteDescription::try_new(year, month, day, hour, minute)?.into(),
            StoredPeriod::LastHourDescription => LastHourDescription.into(),
        })
    }
}

pub fn serialize_period(period: &PeriodDescription) -> serde_json::Value {
    serde_json::to_value(StoredPeriod::from(period)).unwrap_or(serde_json::Value::Null)
}

/// Restore a stored period. Anything unrecognised lands on today.
pub fn deserialize_period(value: &serde_json::Value) -> PeriodDescription {
    let restored = serde_json::from_value::<StoredPeriod>(value.clone())
        .map_err(|e| e.to_string())
        .and_then(|stored| PeriodDescription::try_from(stored).map_err(|e| e.to_string()));

    match restored {
        Ok(period) => period,
        Err(reason) => {
            tracing::warn!("Falling back to today for stored period {}: {}", value, reason);
            PeriodDescription::today()
        }
    }
}

impl Serialize for PeriodDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredPeriod::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PeriodDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(deserialize_period(&value))
    }
}
