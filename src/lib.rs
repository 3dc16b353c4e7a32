//! Calendar-period model and time-series alignment for utility metering
//! dashboards (gas, electricity, water, indoor temperature).
//!
//! The core is synchronous and side-effect free: a [`PeriodDescription`]
//! names the window being viewed and how to navigate it, [`pad_data`]
//! densifies sparse samples onto that window's bucket grid, and
//! [`GraphDescription`] carries the scaling metadata a renderer needs.
//! The application, infrastructure and presentation layers wrap the core
//! in an HTTP service backed by InfluxDB.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::alignment::pad_data;
pub use domain::error::{PeriodError, PeriodResult};
pub use domain::graph::{GraphDescription, UsageField};
pub use domain::measurement::{MeasurementEntry, ValueWithTimestamp};
pub use domain::period::{
    DayDescription, GraphTickPositions, HourDescription, LastHourDescription, MinuteDescription,
    MonthDescription, PeriodDescription, PeriodSize, YearDescription, deserialize_period,
    serialize_period,
};
