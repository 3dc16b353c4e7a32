// InfluxDB repository implementation
use crate::application::measurement_repository::{MeasurementRepository, QueryWindow};
use crate::domain::graph::UsageField;
use crate::domain::measurement::ValueWithTimestamp;
use crate::infrastructure::config::{InfluxSettings, QueryTemplates, prepare_query};
use crate::infrastructure::wire::{decode_rows, to_utc};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Escape a value for use inside a single-quoted InfluxQL string literal.
fn quote_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    timezone: String,
    queries: QueryTemplates,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

impl InfluxQLSeries {
    fn entries(&self) -> Vec<ValueWithTimestamp> {
        let time_idx = self.columns.iter().position(|c| c == "time").unwrap_or(0);
        let value_idx = self
            .columns
            .iter()
            .position(|c| matches!(c.as_str(), "value" | "mean" | "sum" | "last"))
            .unwrap_or(1);

        decode_rows(&self.values, time_idx, value_idx)
    }

    /// Series name, preferring the `name` tag over the measurement name
    fn label(&self) -> String {
        self.tags
            .as_ref()
            .and_then(|tags| tags.get("name"))
            .cloned()
            .unwrap_or_else(|| self.name.clone())
    }
}

impl InfluxRepository {
    pub fn new(settings: InfluxSettings, timezone: String, queries: QueryTemplates) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            timezone,
            queries,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn window_vars(&self, window: &QueryWindow) -> Result<HashMap<String, String>> {
        let mut vars = HashMap::new();
        vars.insert(
            "start".to_string(),
            to_utc(window.start).to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        vars.insert(
            "end".to_string(),
            to_utc(window.end).to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        vars.insert("interval".to_string(), window.interval()?.to_string());
        vars.insert("tz".to_string(), self.timezone.clone());
        Ok(vars)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);
        tracing::debug!("Executing query: {}", query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    fn into_series(response: InfluxQLResponse) -> Vec<InfluxQLSeries> {
        response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.series)
            .unwrap_or_default()
    }
}

#[async_trait]
impl MeasurementRepository for InfluxRepository {
    async fn query_series(
        &self,
        field: UsageField,
        window: &QueryWindow,
    ) -> Result<Vec<ValueWithTimestamp>> {
        if field == UsageField::IndoorTemperature {
            anyhow::bail!("Indoor temperature is queried per room");
        }
        let query = prepare_query(self.queries.for_field(field), &self.window_vars(window)?);
        let response = self.execute_query(&query).await?;

        let points: Vec<ValueWithTimestamp> = Self::into_series(response)
            .iter()
            .flat_map(InfluxQLSeries::entries)
            .collect();

        tracing::debug!("Got {} {} samples", points.len(), field);
        Ok(points)
    }

    async fn query_temperature(
        &self,
        room: &str,
        window: &QueryWindow,
    ) -> Result<BTreeMap<String, Vec<ValueWithTimestamp>>> {
        let mut vars = self.window_vars(window)?;
        vars.insert("room".to_string(), quote_literal(room));
        let query = prepare_query(&self.queries.temperature, &vars);
        let response = self.execute_query(&query).await?;

        let mut result: BTreeMap<String, Vec<ValueWithTimestamp>> = BTreeMap::new();
        for series in Self::into_series(response) {
            result
                .entry(series.label())
                .or_default()
                .extend(series.entries());
        }

        tracing::debug!("Got {} temperature series for {}", result.len(), room);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::TimeUnit;
    use crate::domain::period::{DayDescription, PeriodDescription, YearDescription};
    use chrono::NaiveDate;

    fn repository() -> InfluxRepository {
        InfluxRepository::new(
            InfluxSettings {
                host: "http://influx:8086/".to_string(),
                token: "secret".to_string(),
                database: "meterstanden".to_string(),
                retention_policy: "autogen".to_string(),
            },
            "Europe/Amsterdam".to_string(),
            QueryTemplates {
                gas: "SELECT sum(gas) FROM usage GROUP BY time(${interval})".to_string(),
                stroom: String::new(),
                water: String::new(),
                recent_power: String::new(),
                temperature: String::new(),
            },
        )
    }

    #[test]
    fn test_build_query_url() {
        let url = repository().build_query_url("SELECT 1");
        assert_eq!(
            url,
            "http://influx:8086/query?db=meterstanden&rp=autogen&q=SELECT%201"
        );
    }

    #[test]
    fn test_window_vars() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let window = QueryWindow {
            start,
            end: start,
            bucket: TimeUnit::Hour,
        };

        let vars = repository().window_vars(&window).unwrap();

        assert_eq!(vars["interval"], "1h");
        assert_eq!(vars["tz"], "Europe/Amsterdam");
        assert!(vars["start"].ends_with('Z'));
    }

    #[test]
    fn test_year_query_groups_by_day() {
        let year: PeriodDescription = YearDescription::new(2022).into();
        let repository = repository();
        let vars = repository
            .window_vars(&QueryWindow::for_period(&year))
            .unwrap();

        let query = prepare_query(repository.queries.for_field(UsageField::Gas), &vars);

        assert_eq!(query, "SELECT sum(gas) FROM usage GROUP BY time(1d)");
    }

    #[test]
    fn test_month_interval_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let window = QueryWindow {
            start,
            end: start,
            bucket: TimeUnit::Month,
        };

        assert!(repository().window_vars(&window).is_err());
    }

    #[tokio::test]
    async fn test_temperature_is_not_a_plain_series() {
        let day: PeriodDescription = DayDescription::new(2022, 2, 2).into();
        let result = repository()
            .query_series(UsageField::IndoorTemperature, &QueryWindow::for_period(&day))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_room_cannot_break_out_of_its_literal() {
        let template = "SELECT mean(value) FROM temperature WHERE \"room\" = '${room}'";
        let mut vars = HashMap::new();
        vars.insert("room".to_string(), quote_literal("x' OR '1'='1"));

        assert_eq!(
            prepare_query(template, &vars),
            "SELECT mean(value) FROM temperature WHERE \"room\" = 'x\\' OR \\'1\\'=\\'1'"
        );
        assert_eq!(quote_literal("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_parse_series() {
        let response: InfluxQLResponse = serde_json::from_str(
            r#"{"results": [{"series": [{
                "name": "temperature",
                "tags": {"name": "living_room"},
                "columns": ["time", "mean"],
                "values": [["2022-03-02T02:00:00", 19.5], ["2022-03-02T03:00:00", null]]
            }]}]}"#,
        )
        .unwrap();

        let series = InfluxRepository::into_series(response);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label(), "living_room");
        assert_eq!(series[0].entries().len(), 1);
        assert_eq!(series[0].entries()[0].value, 19.5);
    }
}
