use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherAlertsError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Email error: {0}")]
    Email(String),
}

pub type Result<T> = std::result::Result<T, WeatherAlertsError>;
