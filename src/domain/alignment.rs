// Alignment engine - densify sparse samples onto the bucket grid of a period
use crate::domain::measurement::ValueWithTimestamp;
use crate::domain::period::{PeriodDescription, PeriodSize};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

/// How several samples inside one bucket combine into its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollup {
    Sum,
    Mean,
}

/// Combine samples finer than the buckets of `period` into one entry per
/// bucket, stamped with the bucket start. Buckets without samples stay
/// absent; samples outside the period are left out.
pub fn roll_up(
    entries: &[ValueWithTimestamp],
    period: &PeriodDescription,
    rollup: Rollup,
) -> Vec<ValueWithTimestamp> {
    let mut by_bucket: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for entry in entries.iter().filter(|e| period.contains(e.timestamp)) {
        let slot = by_bucket
            .entry(period.normalize(entry.timestamp))
            .or_insert((0.0, 0));
        slot.0 += entry.value;
        slot.1 += 1;
    }

    by_bucket
        .into_iter()
        .map(|(bucket, (total, count))| {
            let value = match rollup {
                Rollup::Sum => total,
                Rollup::Mean => total / count as f64,
            };
            ValueWithTimestamp::new(bucket, value)
        })
        .collect()
}

/// Produce exactly one entry per bucket of `period`, in bucket order.
///
/// A bucket takes the first input entry that normalizes into it; buckets
/// without one get a zero-valued entry stamped with the bucket start.
/// Entries outside the period are left out. Year periods are returned
/// unchanged since monthly data arrives dense.
pub fn pad_data(
    entries: &[ValueWithTimestamp],
    period: &PeriodDescription,
) -> Vec<ValueWithTimestamp> {
    if period.period_size() == PeriodSize::Year {
        return entries.to_vec();
    }

    let buckets = period.buckets();

    let mut by_bucket: HashMap<NaiveDateTime, &ValueWithTimestamp> =
        HashMap::with_capacity(entries.len());
    let mut duplicates = 0usize;
    for entry in entries {
        let bucket = period.normalize(entry.timestamp);
        if by_bucket.contains_key(&bucket) {
            duplicates += 1;
        } else {
            by_bucket.insert(bucket, entry);
        }
    }

    let mut used = 0usize;
    let result: Vec<ValueWithTimestamp> = buckets
        .iter()
        .map(|bucket| match by_bucket.get(bucket) {
            Some(entry) => {
                used += 1;
                **entry
            }
            None => ValueWithTimestamp::new(*bucket, 0.0),
        })
        .collect();

    let outside = by_bucket.len() - used;
    if duplicates > 0 || outside > 0 {
        tracing::warn!(
            "Aligning {} for {}: ignored {} duplicate and {} out-of-period samples",
            entries.len(),
            period,
            duplicates,
            outside
        );
    }
    tracing::debug!(
        "Aligned {} samples onto {} buckets of {} ({} filled with zero)",
        entries.len(),
        result.len(),
        period,
        result.len() - used
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::period::{DayDescription, MonthDescription, YearDescription};
    use chrono::{Datelike, NaiveDate, TimeDelta, Timelike};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_does_not_pad_complete_day() {
        let data: Vec<_> = (0..24)
            .map(|hour| ValueWithTimestamp::new(at(2022, 3, 2, hour), 0.0))
            .collect();
        let period: PeriodDescription = DayDescription::new(2022, 2, 2).into();

        assert_eq!(pad_data(&data, &period), data);
    }

    #[test]
    fn test_pads_day_data() {
        let start = at(2022, 3, 2, 0);
        let add = |hours: i64| start + TimeDelta::hours(hours);
        let data = vec![
            ValueWithTimestamp::new(add(2), 12.0),
            ValueWithTimestamp::new(add(5), 15.0),
            ValueWithTimestamp::new(add(10), 10.0),
        ];
        let period: PeriodDescription = DayDescription::new(2022, 2, 2).into();

        let padded = pad_data(&data, &period);

        assert_eq!(padded.len(), 24);
        for (hour, entry) in padded.iter().enumerate() {
            assert_eq!(entry.timestamp.date(), NaiveDate::from_ymd_opt(2022, 3, 2).unwrap());
            assert_eq!(entry.timestamp.hour() as usize, hour);
            let expected = match hour {
                2 => 12.0,
                5 => 15.0,
                10 => 10.0,
                _ => 0.0,
            };
            assert_eq!(entry.value, expected);
        }
    }

    #[test]
    fn test_pads_month_data() {
        let start = at(2022, 2, 1, 0);
        let add = |days: i64| start + TimeDelta::days(days);
        let data = vec![
            ValueWithTimestamp::new(add(2), 12.0),
            ValueWithTimestamp::new(add(5), 15.0),
            ValueWithTimestamp::new(add(10), 10.0),
        ];
        let period: PeriodDescription = MonthDescription::new(2022, 1).into();

        let padded = pad_data(&data, &period);

        assert_eq!(padded.len(), 28);
        for (index, entry) in padded.iter().enumerate() {
            let day = index as u32 + 1;
            assert_eq!(entry.timestamp.day(), day);
            assert_eq!(entry.timestamp.month(), 2);
            assert_eq!(entry.timestamp.year(), 2022);
            let expected = match day {
                3 => 12.0,
                6 => 15.0,
                11 => 10.0,
                _ => 0.0,
            };
            assert_eq!(entry.value, expected);
        }
    }

    #[test]
    fn test_unordered_input_with_offsets_inside_buckets() {
        let data = vec![
            ValueWithTimestamp::new(at(2022, 3, 2, 20) + TimeDelta::minutes(59), 3.0),
            ValueWithTimestamp::new(at(2022, 3, 2, 1) + TimeDelta::minutes(15), 1.0),
        ];
        let period: PeriodDescription = DayDescription::new(2022, 2, 2).into();

        let padded = pad_data(&data, &period);

        assert_eq!(padded[1], data[1]);
        assert_eq!(padded[20], data[0]);
        assert!(padded.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let data = vec![
            ValueWithTimestamp::new(at(2022, 3, 2, 4), 7.0),
            ValueWithTimestamp::new(at(2022, 3, 2, 4) + TimeDelta::minutes(30), 9.0),
        ];
        let period: PeriodDescription = DayDescription::new(2022, 2, 2).into();

        let padded = pad_data(&data, &period);

        assert_eq!(padded.len(), 24);
        assert_eq!(padded[4].value, 7.0);
    }

    #[test]
    fn test_drops_samples_outside_period() {
        let data = vec![ValueWithTimestamp::new(at(2022, 3, 3, 0), 5.0)];
        let period: PeriodDescription = DayDescription::new(2022, 2, 2).into();

        let padded = pad_data(&data, &period);

        assert_eq!(padded.len(), 24);
        assert!(padded.iter().all(|e| e.value == 0.0));
    }

    #[test]
    fn test_roll_up_days_into_months() {
        let data = vec![
            ValueWithTimestamp::new(at(2022, 3, 2, 0), 2.0),
            ValueWithTimestamp::new(at(2022, 1, 5, 0), 1.0),
            ValueWithTimestamp::new(at(2022, 3, 30, 0), 4.0),
            ValueWithTimestamp::new(at(2023, 1, 1, 0), 100.0),
        ];
        let period: PeriodDescription = YearDescription::new(2022).into();

        let summed = roll_up(&data, &period, Rollup::Sum);
        assert_eq!(
            summed,
            vec![
                ValueWithTimestamp::new(at(2022, 1, 1, 0), 1.0),
                ValueWithTimestamp::new(at(2022, 3, 1, 0), 6.0),
            ]
        );

        let averaged = roll_up(&data, &period, Rollup::Mean);
        assert_eq!(averaged[1].value, 3.0);
    }

    #[test]
    fn test_year_is_not_padded() {
        let data = vec![ValueWithTimestamp::new(at(2022, 5, 1, 0), 42.0)];
        let period: PeriodDescription = YearDescription::new(2022).into();

        assert_eq!(pad_data(&data, &period), data);
    }

    proptest! {
        #[test]
        fn day_padding_is_dense_and_idempotent(
            day in 1u32..=28,
            month in 0u32..12,
            samples in proptest::collection::vec((0u32..24, 0u32..60, 0.0f64..100.0), 0..40)
        ) {
            let period: PeriodDescription = DayDescription::new(2022, month, day).into();
            let date = NaiveDate::from_ymd_opt(2022, month + 1, day).unwrap();
            let data: Vec<_> = samples
                .iter()
                .map(|(h, m, v)| ValueWithTimestamp::new(date.and_hms_opt(*h, *m, 0).unwrap(), *v))
                .collect();

            let padded = pad_data(&data, &period);

            prop_assert_eq!(padded.len(), 24);
            for (hour, entry) in padded.iter().enumerate() {
                prop_assert_eq!(entry.timestamp.hour() as usize, hour);
                let first = data.iter().find(|e| e.timestamp.hour() as usize == hour);
                prop_assert_eq!(entry.value, first.map(|e| e.value).unwrap_or(0.0));
            }
            prop_assert_eq!(pad_data(&padded, &period), padded);
        }

        #[test]
        fn month_padding_matches_month_length(year in 1950i32..2050, month in 0u32..12) {
            let month = MonthDescription::new(year, month);
            let period: PeriodDescription = month.into();

            let padded = pad_data(&[], &period);

            prop_assert_eq!(padded.len(), month.days() as usize);
            prop_assert!(padded.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
    }
}
