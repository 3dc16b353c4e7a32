// HTTP request handlers
use crate::application::period_service::{FieldSeries, TemperatureSeries};
use crate::domain::graph::{GraphDescription, UsageField};
use crate::domain::period::{GraphTickPositions, PeriodDescription};
use crate::infrastructure::wire::{WireRow, encode_series};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Debug, Serialize)]
pub struct PeriodInfo {
    pub description: PeriodDescription,
    pub url: String,
    pub title: String,
    pub short_title: String,
    pub start: String,
    pub end: String,
    pub graph_tick_positions: GraphTickPositions,
    pub time_format: &'static str,
    pub tick_labels: Vec<String>,
}

impl PeriodInfo {
    fn new(period: &PeriodDescription, graph: &GraphDescription) -> Self {
        let (start, end) = period.bounds();
        Self {
            description: *period,
            url: period.to_url(),
            title: period.to_title(),
            short_title: period.to_short_title(),
            start: start.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            end: end.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            graph_tick_positions: period.graph_tick_positions(),
            time_format: period.time_format(),
            tick_labels: graph
                .displayed_tick_indices
                .iter()
                .map(|i| period.format_tick(*i))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub period: PeriodInfo,
    pub graph: GraphDescription,
    pub total: String,
    pub entries: Vec<WireRow>,
}

impl From<FieldSeries> for SeriesResponse {
    fn from(series: FieldSeries) -> Self {
        Self {
            period: PeriodInfo::new(&series.period, &series.graph),
            total: series.graph.format_value(series.total()),
            entries: encode_series(&series.entries),
            graph: series.graph,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemperatureResponse {
    pub period: PeriodInfo,
    pub graph: GraphDescription,
    pub series: BTreeMap<String, Vec<WireRow>>,
}

impl From<TemperatureSeries> for TemperatureResponse {
    fn from(temperature: TemperatureSeries) -> Self {
        Self {
            period: PeriodInfo::new(&temperature.period, &temperature.graph),
            series: temperature
                .series
                .iter()
                .map(|(name, entries)| (name.clone(), encode_series(entries)))
                .collect(),
            graph: temperature.graph,
        }
    }
}

/// Fields served by the field route; temperature needs a room and has its own route.
fn parse_field(raw: &str) -> Result<UsageField, (StatusCode, String)> {
    match raw.parse::<UsageField>() {
        Ok(UsageField::IndoorTemperature) => Err((
            StatusCode::NOT_FOUND,
            "indoor temperature is served per room under /api/temperature/:room".to_string(),
        )),
        Ok(field) => Ok(field),
        Err(e) => Err((StatusCode::NOT_FOUND, e)),
    }
}

/// Room names are identifiers: ASCII letters, digits, `_` and `-`.
fn parse_room(raw: &str) -> Result<&str, (StatusCode, String)> {
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(raw)
    } else {
        Err((StatusCode::BAD_REQUEST, format!("invalid room name: {raw}")))
    }
}

fn parse_period(raw: &str) -> Result<PeriodDescription, (StatusCode, String)> {
    PeriodDescription::from_url(raw).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

fn upstream_error(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("{:#}", e);
    (StatusCode::BAD_GATEWAY, "measurement store unavailable".to_string())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Aligned series of one field for the period encoded in the rest of the path
pub async fn field_series(
    Path((field, period)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<SeriesResponse> {
    let field = parse_field(&field)?;
    let period = parse_period(&period)?;

    let series = state
        .period_service
        .field_series(field, period)
        .await
        .map_err(upstream_error)?;

    Ok(Json(series.into()))
}

/// Aligned temperature series of one room
pub async fn temperature_series(
    Path((room, period)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<TemperatureResponse> {
    let room = parse_room(&room)?;
    let period = parse_period(&period)?;

    let temperature = state
        .period_service
        .temperature_series(room, period)
        .await
        .map_err(upstream_error)?;

    Ok(Json(temperature.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measurement::ValueWithTimestamp;
    use crate::domain::period::MonthDescription;
    use chrono::NaiveDate;

    #[test]
    fn test_series_response() {
        let period: PeriodDescription = MonthDescription::new(2022, 1).into();
        let graph = GraphDescription::new(UsageField::Gas, &period);
        let timestamp = NaiveDate::from_ymd_opt(2022, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = FieldSeries {
            period,
            graph,
            entries: vec![
                ValueWithTimestamp::new(timestamp, 1.5),
                ValueWithTimestamp::new(timestamp, 2.25),
            ],
        };

        let response = SeriesResponse::from(series);

        assert_eq!(response.total, "3,750 m³");
        assert_eq!(response.period.url, "/month/2022/2");
        assert_eq!(response.period.title, "februari 2022");
        assert_eq!(response.period.start, "2022-02-01T00:00:00.000");
        assert_eq!(response.period.end, "2022-02-28T23:59:59.999");
        assert_eq!(response.period.tick_labels.first().map(String::as_str), Some("1"));
        assert_eq!(response.entries[0], ("2022-02-01T00:00:00".to_string(), 1.5));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["period"]["description"]["type"], "MonthDescription");
        assert_eq!(json["period"]["graph_tick_positions"], "on_value");
        assert_eq!(json["graph"]["field"], "gas");
    }

    #[test]
    fn test_field_route_rejects_temperature() {
        assert_eq!(parse_field("gas"), Ok(UsageField::Gas));
        assert_eq!(
            parse_field("indoor_temperature").unwrap_err().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(parse_field("electricity").unwrap_err().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_room_must_be_an_identifier() {
        assert_eq!(parse_room("living_room-2"), Ok("living_room-2"));
        assert_eq!(
            parse_room("x' OR '1'='1").unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
        assert!(parse_room("").is_err());
        assert!(parse_room("kamer\\").is_err());
    }

    #[test]
    fn test_parse_period_rejects_garbage() {
        let (status, _) = parse_period("week/2022/1").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(parse_period("day/2022/3/3").is_ok());
    }
}
