// Graph description - per-field scaling and labelling for a period
use crate::domain::alignment::Rollup;
use crate::domain::period::{PeriodDescription, PeriodSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageField {
    Gas,
    Stroom,
    Water,
    CurrentPowerUsage,
    IndoorTemperature,
}

impl UsageField {
    pub const ALL: [UsageField; 5] = [
        UsageField::Gas,
        UsageField::Stroom,
        UsageField::Water,
        UsageField::CurrentPowerUsage,
        UsageField::IndoorTemperature,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UsageField::Gas => "gas",
            UsageField::Stroom => "stroom",
            UsageField::Water => "water",
            UsageField::CurrentPowerUsage => "current_power_usage",
            UsageField::IndoorTemperature => "indoor_temperature",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            UsageField::Gas => "m³",
            UsageField::Stroom => "kWh",
            UsageField::Water => "L",
            UsageField::CurrentPowerUsage => "W",
            UsageField::IndoorTemperature => "°C",
        }
    }

    /// Usage totals add up; readings of a level average out.
    pub fn rollup(self) -> Rollup {
        match self {
            UsageField::Gas | UsageField::Stroom | UsageField::Water => Rollup::Sum,
            UsageField::CurrentPowerUsage | UsageField::IndoorTemperature => Rollup::Mean,
        }
    }

    /// Factor from the stored value to the displayed unit. Power samples are
    /// stored in kW and shown in W.
    pub fn wire_scale(self) -> f64 {
        match self {
            UsageField::CurrentPowerUsage => 1000.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for UsageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UsageField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UsageField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown usage field: {s}"))
    }
}

/// Display metadata for one field, fixed at construction for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphDescription {
    pub field: UsageField,
    pub period_size: PeriodSize,
    pub bar_color: &'static str,
    pub unit: &'static str,
    pub min_y: f64,
    pub max_y: f64,
    pub fraction_digits: usize,
    pub x_label_height: u32,
    pub has_text_labels: bool,
    pub displayed_tick_indices: Vec<usize>,
}

impl GraphDescription {
    pub fn new(field: UsageField, period: &PeriodDescription) -> Self {
        let period_size = period.period_size();
        let (min_y, max_y) = y_bounds(field, period_size);

        Self {
            field,
            period_size,
            bar_color: bar_color(field),
            unit: field.unit(),
            min_y,
            max_y,
            fraction_digits: fraction_digits(field),
            x_label_height: if period_size == PeriodSize::Year { 40 } else { 20 },
            has_text_labels: period_size == PeriodSize::Year,
            displayed_tick_indices: displayed_tick_indices(period),
        }
    }

    /// Value with the field's precision, decimal comma and unit.
    pub fn format_value(&self, value: f64) -> String {
        let number = format!("{:.*}", self.fraction_digits, value).replace('.', ",");
        format!("{} {}", number, self.unit)
    }
}

fn bar_color(field: UsageField) -> &'static str {
    match field {
        UsageField::Gas => "#e73711",
        UsageField::Stroom => "#f0ad4e",
        UsageField::Water => "#428bca",
        UsageField::CurrentPowerUsage => "#f0ad4e",
        UsageField::IndoorTemperature => "#d9534f",
    }
}

fn fraction_digits(field: UsageField) -> usize {
    match field {
        UsageField::Gas | UsageField::Stroom => 3,
        UsageField::Water | UsageField::CurrentPowerUsage => 0,
        UsageField::IndoorTemperature => 1,
    }
}

fn y_bounds(field: UsageField, size: PeriodSize) -> (f64, f64) {
    let max_y = match (field, size) {
        (UsageField::Gas, PeriodSize::Year) => 400.0,
        (UsageField::Gas, PeriodSize::Month) => 20.0,
        (UsageField::Gas, PeriodSize::Day) => 3.0,
        (UsageField::Gas, PeriodSize::Hour) => 0.1,
        (UsageField::Gas, PeriodSize::Minute) => 0.01,

        (UsageField::Stroom, PeriodSize::Year) => 600.0,
        (UsageField::Stroom, PeriodSize::Month) => 20.0,
        (UsageField::Stroom, PeriodSize::Day) => 2.0,
        (UsageField::Stroom, PeriodSize::Hour) => 0.1,
        (UsageField::Stroom, PeriodSize::Minute) => 0.005,

        (UsageField::Water, PeriodSize::Year) => 30000.0,
        (UsageField::Water, PeriodSize::Month) => 1500.0,
        (UsageField::Water, PeriodSize::Day) => 200.0,
        (UsageField::Water, PeriodSize::Hour) => 20.0,
        (UsageField::Water, PeriodSize::Minute) => 10.0,

        (UsageField::CurrentPowerUsage, _) => 3000.0,
        (UsageField::IndoorTemperature, _) => 25.0,
    };
    let min_y = match field {
        UsageField::IndoorTemperature => 15.0,
        _ => 0.0,
    };
    (min_y, max_y)
}

/// Bucket indices that get a visible tick label.
///
/// Month view shows alternating day ticks and always shows day 1 and the
/// last day, but suppresses the tick exactly two before the end so the
/// final label is not crowded.
fn displayed_tick_indices(period: &PeriodDescription) -> Vec<usize> {
    match period {
        PeriodDescription::Year(_) => (0..12).collect(),
        PeriodDescription::Month(_) => {
            let days = period.bucket_count();
            (0..days)
                .filter(|&i| {
                    if i == 0 || i == days - 1 {
                        return true;
                    }
                    i % 2 == 0 && i != days - 2
                })
                .collect()
        }
        PeriodDescription::Day(_) => (0..23).collect(),
        PeriodDescription::Hour(_) => (0..60).step_by(5).collect(),
        PeriodDescription::Minute(_) | PeriodDescription::LastHour(_) => {
            (0..60).step_by(10).collect()
        }
    }
}
