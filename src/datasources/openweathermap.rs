use crate::error::{Result, WeatherAlertsError};
use crate::models::{DailyForecast, PRECIPITATION_PROBABILITY, TEMPERATURE_MAX, TEMPERATURE_MIN};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Three-hour slots per day in the 5-day forecast
const SLOTS_PER_DAY: usize = 8;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    api_key: String,
    latitude: f64,
    longitude: f64,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmForecastItem {
    pub dt_txt: String,
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmWeather>,
    /// Probability of precipitation, 0.0-1.0
    #[serde(default)]
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmMain {
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmWeather {
    pub main: String,
}

impl OpenWeatherMapClient {
    pub fn new(client: reqwest::Client, api_key: String, latitude: f64, longitude: f64) -> Self {
        Self {
            client,
            api_key,
            latitude,
            longitude,
        }
    }

    /// Fetch the 5-day/3-hour forecast in imperial units
    pub async fn fetch_forecast(&self, days: usize) -> Result<Vec<DailyForecast>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=imperial&cnt={}",
            API_BASE_URL,
            self.latitude,
            self.longitude,
            self.api_key,
            slot_count(days)
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                WeatherAlertsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherAlertsError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            WeatherAlertsError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        normalize_items(&owm_response.list, days)
    }
}

/// Number of 3-hour slots to request for `days` days
fn slot_count(days: usize) -> usize {
    days.saturating_mul(SLOTS_PER_DAY)
}

#[derive(Default)]
struct DayAccumulator {
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    precip: f64,
    conditions: Vec<String>,
}

/// Aggregate 3-hour slots into days keyed by the date part of `dt_txt`.
///
/// Low is the min of `temp_min`, high the max of `temp_max`, precipitation
/// probability the max `pop` as a percentage, and conditions the distinct
/// weather names in first-seen order.
pub fn normalize_items(items: &[OwmForecastItem], days: usize) -> Result<Vec<DailyForecast>> {
    let mut by_date: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for item in items {
        let date_str = item.dt_txt.split_whitespace().next().unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            WeatherAlertsError::InvalidData(format!("bad OpenWeatherMap dt_txt '{}': {}", item.dt_txt, e))
        })?;

        let acc = by_date.entry(date).or_default();
        acc.temp_min = Some(acc.temp_min.map_or(item.main.temp_min, |t| t.min(item.main.temp_min)));
        acc.temp_max = Some(acc.temp_max.map_or(item.main.temp_max, |t| t.max(item.main.temp_max)));
        if let Some(pop) = item.pop {
            acc.precip = acc.precip.max(pop * 100.0);
        }
        if let Some(weather) = item.weather.first() {
            if !acc.conditions.contains(&weather.main) {
                acc.conditions.push(weather.main.clone());
            }
        }
    }

    Ok(by_date
        .into_iter()
        .take(days)
        .map(|(date, acc)| {
            let mut day = DailyForecast::new(date)
                .with_conditions(acc.conditions.join(", "))
                .with_field(PRECIPITATION_PROBABILITY, acc.precip);
            day.set_field(TEMPERATURE_MIN, acc.temp_min);
            day.set_field(TEMPERATURE_MAX, acc.temp_max);
            day
        })
        .collect())
}
