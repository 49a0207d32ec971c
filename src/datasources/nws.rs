use crate::error::{Result, WeatherAlertsError};
use crate::models::{DailyForecast, PRECIPITATION_PROBABILITY, TEMPERATURE_MAX, TEMPERATURE_MIN};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.weather.gov";

/// National Weather Service client. Free and keyless, US locations only.
pub struct NwsClient {
    client: reqwest::Client,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct NwsPointsResponse {
    properties: NwsPointsProperties,
}

#[derive(Debug, Deserialize)]
struct NwsPointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct NwsForecastResponse {
    properties: NwsForecastProperties,
}

#[derive(Debug, Deserialize)]
struct NwsForecastProperties {
    periods: Vec<NwsPeriod>,
}

/// One day or night period of an NWS forecast
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NwsPeriod {
    pub start_time: String,
    pub is_daytime: bool,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub short_forecast: Option<String>,
    #[serde(default)]
    pub probability_of_precipitation: Option<NwsQuantity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NwsQuantity {
    pub value: Option<f64>,
}

impl NwsClient {
    pub fn new(client: reqwest::Client, latitude: f64, longitude: f64) -> Self {
        Self {
            client,
            latitude,
            longitude,
        }
    }

    /// Resolve the grid forecast URL for the location, then fetch and normalize it
    pub async fn fetch_forecast(&self, days: usize) -> Result<Vec<DailyForecast>> {
        let points_url = format!("{}/points/{},{}", API_BASE_URL, self.latitude, self.longitude);
        let points: NwsPointsResponse = self.get_json(&points_url).await?;

        let forecast: NwsForecastResponse = self.get_json(&points.properties.forecast).await?;

        normalize_periods(&forecast.properties.periods, days)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherAlertsError::DataSourceUnavailable(format!("NWS: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherAlertsError::DataSourceUnavailable(format!(
                "NWS returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            WeatherAlertsError::DataSourceUnavailable(format!("Failed to parse NWS response: {}", e))
        })
    }
}

/// Fold day/night periods into daily records.
///
/// Periods are grouped by the calendar date of their local start time.
/// Daytime temperature becomes the high, night temperature the low, and the
/// day's precipitation probability is the largest of its periods (null as 0).
pub fn normalize_periods(periods: &[NwsPeriod], days: usize) -> Result<Vec<DailyForecast>> {
    let mut daily: Vec<DailyForecast> = Vec::new();
    let mut current: Option<(NaiveDate, DailyForecast)> = None;

    for period in periods.iter().take(days.saturating_mul(2)) {
        let period_date = DateTime::parse_from_rfc3339(&period.start_time)
            .map_err(|e| {
                WeatherAlertsError::InvalidData(format!(
                    "bad NWS startTime '{}': {}",
                    period.start_time, e
                ))
            })?
            .date_naive();

        if current.as_ref().map(|(d, _)| *d) != Some(period_date) {
            if let Some((_, day)) = current.take() {
                daily.push(day);
            }
            let mut day = DailyForecast::new(period_date);
            day.set_field(TEMPERATURE_MIN, None);
            day.set_field(TEMPERATURE_MAX, None);
            day.set_field(PRECIPITATION_PROBABILITY, Some(0.0));
            day.conditions = Some(period.short_forecast.clone().unwrap_or_default());
            current = Some((period_date, day));
        }

        if let Some((_, day)) = current.as_mut() {
            let field = if period.is_daytime {
                TEMPERATURE_MAX
            } else {
                TEMPERATURE_MIN
            };
            day.set_field(field, period.temperature);

            let precip = period
                .probability_of_precipitation
                .as_ref()
                .and_then(|p| p.value)
                .unwrap_or(0.0);
            let max_precip = day.precipitation_probability().unwrap_or(0.0).max(precip);
            day.set_field(PRECIPITATION_PROBABILITY, Some(max_precip));
        }
    }

    if let Some((_, day)) = current {
        daily.push(day);
    }

    daily.truncate(days);
    Ok(daily)
}
