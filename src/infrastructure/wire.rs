// Wire format: ordered `[timestamp, value]` rows, ISO-8601 timestamps
use crate::domain::measurement::ValueWithTimestamp;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};

pub type WireRow = (String, f64);

const CIVIL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an ISO-8601 timestamp into civil time of the local zone.
/// Timestamps without an offset are taken as civil time already.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .with_context(|| format!("Invalid timestamp: {}", raw))
}

/// Civil time to an absolute instant. Times skipped by a DST jump resolve to
/// the instant one hour later; repeated times resolve to the earlier one.
pub fn to_utc(civil: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&civil)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(civil + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&civil))
}

/// Rows from a database result where values may be missing.
pub fn decode_rows(
    rows: &[Vec<serde_json::Value>],
    time_idx: usize,
    value_idx: usize,
) -> Vec<ValueWithTimestamp> {
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(time), Some(value)) = (row.get(time_idx), row.get(value_idx)) else {
            continue;
        };
        let (Some(time), Some(value)) = (time.as_str(), value.as_f64()) else {
            continue;
        };
        match parse_timestamp(time) {
            Ok(timestamp) => entries.push(ValueWithTimestamp::new(timestamp, value)),
            Err(e) => tracing::warn!("Skipping row: {}", e),
        }
    }
    entries
}

pub fn encode_series(entries: &[ValueWithTimestamp]) -> Vec<WireRow> {
    entries
        .iter()
        .map(|entry| (entry.timestamp.format(CIVIL_FORMAT).to_string(), entry.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_civil_timestamp() {
        assert_eq!(parse_timestamp("2022-03-02T14:30:00").unwrap(), at(14, 30));
        assert_eq!(parse_timestamp("2022-03-02 14:30:00").unwrap(), at(14, 30));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_offset_timestamp_lands_in_local_zone() {
        let parsed = parse_timestamp("2022-03-02T14:30:00Z").unwrap();
        let expected = Utc
            .from_utc_datetime(&at(14, 30))
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_to_utc_round_trips_local_time() {
        let civil = at(12, 0);
        assert_eq!(to_utc(civil).with_timezone(&Local).naive_local(), civil);
    }

    #[test]
    fn test_decode_rows_skips_nulls() {
        let rows = vec![
            vec![json!("2022-03-02T02:00:00"), json!(1.5)],
            vec![json!("2022-03-02T03:00:00"), json!(null)],
            vec![json!("not a time"), json!(2.0)],
        ];
        assert_eq!(
            decode_rows(&rows, 0, 1),
            vec![ValueWithTimestamp::new(at(2, 0), 1.5)]
        );
    }

    #[test]
    fn test_encode_series() {
        let encoded = encode_series(&[ValueWithTimestamp::new(at(2, 0), 12.0)]);
        assert_eq!(encoded, vec![("2022-03-02T02:00:00".to_string(), 12.0)]);
    }
}
