//! Open-Meteo client and observation normalization.
//!
//! Fetches current conditions plus the hourly humidity series and
//! flattens them into a single [`WeatherObservation`]. Humidity is an
//! approximation: the hourly value at the current-conditions timestamp,
//! or 50 when that timestamp is not in the hourly series.

use serde::{Deserialize, Serialize};

use crate::conditions::condition_for_code;
use crate::config::{LocationConfig, PROVIDER_TIMEOUT};

/// Humidity used when the current-conditions timestamp has no match in
/// the hourly series.
const FALLBACK_HUMIDITY: i64 = 50;

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}")]
    Status { status: u16 },
}

pub type Result<T> = std::result::Result<T, ApiError>;

// ── Observation ─────────────────────────────────────────────────────

/// One normalized weather record, as published to the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub city: String,
    pub temperature: f64,
    pub humidity: i64,
    #[serde(rename = "windSpeed")]
    pub wind_speed: f64,
    pub condition: String,
    pub timestamp: String,
}

// ── Provider payload ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: CurrentWeather,
    #[serde(default)]
    hourly: Hourly,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    windspeed: f64,
    #[serde(default)]
    weathercode: i32,
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Hourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    relativehumidity_2m: Vec<i64>,
}

impl Hourly {
    /// Humidity at the hourly slot matching `current_time`, if any.
    fn humidity_at(&self, current_time: Option<&str>) -> Option<i64> {
        let current_time = current_time?;
        let index = self.time.iter().position(|t| t == current_time)?;
        self.relativehumidity_2m.get(index).copied()
    }
}

/// Flatten a provider response into an observation.
///
/// Missing numeric fields default to 0.0 (code 0 maps to "Clear sky");
/// an unmatched humidity timestamp falls back silently.
fn normalize(response: &ForecastResponse, city: &str, timestamp: String) -> WeatherObservation {
    let current = &response.current_weather;
    let humidity = response
        .hourly
        .humidity_at(current.time.as_deref())
        .unwrap_or(FALLBACK_HUMIDITY);

    WeatherObservation {
        city: city.to_string(),
        temperature: current.temperature,
        humidity,
        wind_speed: current.windspeed,
        condition: condition_for_code(current.weathercode).to_string(),
        timestamp,
    }
}

/// Local capture time, ISO-8601.
fn capture_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

// ── Fetcher ─────────────────────────────────────────────────────────

/// Client for the Open-Meteo forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherFetcher {
    /// Create a fetcher against the given provider base URL.
    pub fn new(base_url: &str) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and normalize the current observation for `location`.
    ///
    /// The record's timestamp is the capture time, not the provider's
    /// reported observation time.
    pub async fn fetch(&self, location: &LocationConfig) -> Result<WeatherObservation> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current_weather=true&hourly=relativehumidity_2m,windspeed_10m",
            self.base_url, location.latitude, location.longitude
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let forecast: ForecastResponse = response.json().await?;
        Ok(normalize(&forecast, &location.city, capture_timestamp()))
    }
}
