pub mod nws;
pub mod openweathermap;

pub use nws::NwsClient;
pub use openweathermap::OpenWeatherMapClient;

use crate::config::{ForecastProvider, LocationConfig, WeatherConfig};
use crate::error::{Result, WeatherAlertsError};
use crate::models::DailyForecast;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("weather-alerts/", env!("CARGO_PKG_VERSION"));

/// Fetch a normalized daily forecast from the configured provider.
///
/// One attempt per request; failures are returned to the caller.
pub async fn fetch_forecast(
    weather: &WeatherConfig,
    location: &LocationConfig,
) -> Result<Vec<DailyForecast>> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    match &weather.provider {
        ForecastProvider::Nws => {
            let (lat, lon) = location.coordinates()?;
            NwsClient::new(client, lat, lon)
                .fetch_forecast(weather.days)
                .await
        }
        ForecastProvider::OpenWeather => {
            let api_key = weather
                .api_key
                .as_ref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    WeatherAlertsError::Config("OpenWeatherMap API key not configured".into())
                })?;
            let (lat, lon) = location.coordinates()?;
            OpenWeatherMapClient::new(client, api_key.clone(), lat, lon)
                .fetch_forecast(weather.days)
                .await
        }
        ForecastProvider::Unknown(name) => Err(WeatherAlertsError::Config(format!(
            "Unknown weather provider: {}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> LocationConfig {
        LocationConfig {
            latitude: Some(35.81),
            longitude: Some(-84.33),
            zip_code: None,
        }
    }

    #[tokio::test]
    async fn unknown_provider_is_config_error() {
        let weather = WeatherConfig {
            provider: ForecastProvider::Unknown("metoffice".into()),
            ..Default::default()
        };

        let err = fetch_forecast(&weather, &location()).await.unwrap_err();

        assert!(err.to_string().contains("Unknown weather provider"));
    }

    #[tokio::test]
    async fn openweather_requires_api_key() {
        let weather = WeatherConfig {
            provider: ForecastProvider::OpenWeather,
            api_key: None,
            ..Default::default()
        };

        let err = fetch_forecast(&weather, &location()).await.unwrap_err();

        assert!(err.to_string().contains("API key not configured"));
    }

    #[tokio::test]
    async fn nws_requires_coordinates() {
        let weather = WeatherConfig::default();
        let zip_only = LocationConfig {
            zip_code: Some("37771".into()),
            ..Default::default()
        };

        let err = fetch_forecast(&weather, &zip_only).await.unwrap_err();

        assert!(matches!(err, WeatherAlertsError::Config(_)));
    }
}
