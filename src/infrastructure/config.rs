use crate::domain::graph::UsageField;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub influx: InfluxSettings,
    #[serde(default)]
    pub metering: MeteringSettings,
    pub queries: QueryTemplates,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MeteringSettings {
    /// Periods ending before this date have no data and are never queried.
    #[serde(default = "default_first_measurement_date")]
    pub first_measurement_date: NaiveDate,
    /// IANA zone name handed to the database for calendar bucketing. It
    /// should match the zone the server process runs in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for MeteringSettings {
    fn default() -> Self {
        Self {
            first_measurement_date: default_first_measurement_date(),
            timezone: default_timezone(),
        }
    }
}

/// One InfluxQL template per data source.
#[derive(Debug, Deserialize, Clone)]
pub struct QueryTemplates {
    pub gas: String,
    pub stroom: String,
    pub water: String,
    pub recent_power: String,
    pub temperature: String,
}

impl QueryTemplates {
    pub fn for_field(&self, field: UsageField) -> &str {
        match field {
            UsageField::Gas => &self.gas,
            UsageField::Stroom => &self.stroom,
            UsageField::Water => &self.water,
            UsageField::CurrentPowerUsage => &self.recent_power,
            UsageField::IndoorTemperature => &self.temperature,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_first_measurement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 3, 3).unwrap_or_default()
}

fn default_timezone() -> String {
    "Europe/Amsterdam".to_string()
}

/// Load `config/metering.*`, overridable with `METERING__SECTION__KEY`
/// environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/metering"))
        .add_source(config::Environment::with_prefix("METERING").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
