// Period service - fetch, align and describe the data for one period
use crate::application::measurement_repository::{MeasurementRepository, QueryWindow};
use crate::domain::alignment::{pad_data, roll_up};
use crate::domain::calendar;
use crate::domain::graph::{GraphDescription, UsageField};
use crate::domain::measurement::ValueWithTimestamp;
use crate::domain::period::PeriodDescription;
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FieldSeries {
    pub period: PeriodDescription,
    pub graph: GraphDescription,
    pub entries: Vec<ValueWithTimestamp>,
}

impl FieldSeries {
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }
}

#[derive(Debug, Clone)]
pub struct TemperatureSeries {
    pub period: PeriodDescription,
    pub graph: GraphDescription,
    pub series: BTreeMap<String, Vec<ValueWithTimestamp>>,
}

#[derive(Clone)]
pub struct PeriodService {
    repository: Arc<dyn MeasurementRepository>,
    first_measurement: NaiveDate,
}

impl PeriodService {
    pub fn new(repository: Arc<dyn MeasurementRepository>, first_measurement: NaiveDate) -> Self {
        Self {
            repository,
            first_measurement,
        }
    }

    pub async fn field_series(
        &self,
        field: UsageField,
        period: PeriodDescription,
    ) -> anyhow::Result<FieldSeries> {
        let graph = GraphDescription::new(field, &period);

        let raw = if self.should_fetch(&period) {
            let window = QueryWindow::for_period(&period);
            let samples: Vec<ValueWithTimestamp> = self
                .repository
                .query_series(field, &window)
                .await
                .with_context(|| format!("Failed to fetch {} for {}", field, period))?
                .into_iter()
                .map(|entry| entry.scaled(field.wire_scale()))
                .collect();
            if window.needs_roll_up(&period) {
                roll_up(&samples, &period, field.rollup())
            } else {
                samples
            }
        } else {
            Vec::new()
        };

        Ok(FieldSeries {
            period,
            graph,
            entries: pad_data(&raw, &period),
        })
    }

    pub async fn temperature_series(
        &self,
        room: &str,
        period: PeriodDescription,
    ) -> anyhow::Result<TemperatureSeries> {
        let graph = GraphDescription::new(UsageField::IndoorTemperature, &period);

        let series = if self.should_fetch(&period) {
            let window = QueryWindow::for_period(&period);
            self.repository
                .query_temperature(room, &window)
                .await
                .with_context(|| format!("Failed to fetch temperature of {} for {}", room, period))?
                .into_iter()
                .map(|(name, entries)| {
                    let entries = if window.needs_roll_up(&period) {
                        roll_up(&entries, &period, UsageField::IndoorTemperature.rollup())
                    } else {
                        entries
                    };
                    (name, pad_data(&entries, &period))
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        Ok(TemperatureSeries {
            period,
            graph,
            series,
        })
    }

    fn should_fetch(&self, period: &PeriodDescription) -> bool {
        let has_measurements = period.has_measurements(self.first_measurement, calendar::now());
        if !has_measurements {
            tracing::debug!("Skipping fetch for {}: no measurements in period", period);
        }
        has_measurements
    }
}
