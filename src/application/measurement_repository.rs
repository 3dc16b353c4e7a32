// Repository trait for measurement data access
use crate::domain::calendar::TimeUnit;
use crate::domain::graph::UsageField;
use crate::domain::measurement::ValueWithTimestamp;
use crate::domain::period::PeriodDescription;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Civil time range and bucket size to query for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub bucket: TimeUnit,
}

impl QueryWindow {
    /// Month buckets are queried per day, since the store only groups by
    /// fixed durations; see [`QueryWindow::needs_roll_up`].
    pub fn for_period(period: &PeriodDescription) -> Self {
        let (start, end) = period.bounds();
        let bucket = match period.bucket_unit() {
            TimeUnit::Month => TimeUnit::Day,
            unit => unit,
        };
        Self { start, end, bucket }
    }

    /// Whether samples come back finer than the period's buckets.
    pub fn needs_roll_up(&self, period: &PeriodDescription) -> bool {
        self.bucket != period.bucket_unit()
    }

    /// The `GROUP BY time(...)` literal for this window.
    pub fn interval(&self) -> anyhow::Result<&'static str> {
        self.bucket
            .interval()
            .ok_or_else(|| anyhow::anyhow!("No fixed-duration interval for {:?} buckets", self.bucket))
    }
}

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Samples of a single field, in stored units, possibly sparse
    async fn query_series(
        &self,
        field: UsageField,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<ValueWithTimestamp>>;

    /// Temperature samples of one room, keyed by series name
    async fn query_temperature(
        &self,
        room: &str,
        window: &QueryWindow,
    ) -> anyhow::Result<BTreeMap<String, Vec<ValueWithTimestamp>>>;
}
