//! Weather Lookup
//!
//! Fetches current conditions from the OpenWeatherMap current-weather
//! endpoint and derives the soil-facing fields the advisory rules need.
//! Lookup outcomes are cached per location key, failures included, for the
//! lifetime of the process.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const CACHE_MAX_LOCATIONS: u64 = 100;

/// Where to fetch weather for
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    Named(String),
}

impl LocationQuery {
    /// Cache key for this location. The prefixes keep a place named
    /// "12.5,79.1" from colliding with the same coordinates.
    fn cache_key(&self) -> String {
        match self {
            Self::Coordinates { lat, lon } => format!("coords:{lat},{lon}"),
            Self::Named(name) => format!("name:{name}"),
        }
    }
}

/// Normalized snapshot of current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature (°C)
    pub temperature: f64,
    /// Rainfall over the last hour (mm); 0 when the provider reports none
    pub rainfall: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Wind speed as reported by the provider (m/s in metric mode)
    pub wind_speed: f64,
    /// Derived: temperature - 2, floored at 10
    pub soil_temp: f64,
    /// Derived: humidity + 10, capped at 100
    pub soil_moisture: f64,
}

impl WeatherSnapshot {
    fn from_observation(temperature: f64, rainfall: f64, humidity: f64, wind_speed: f64) -> Self {
        Self {
            temperature,
            rainfall,
            humidity,
            wind_speed,
            soil_temp: (temperature - 2.0).max(10.0),
            soil_moisture: (humidity + 10.0).min(100.0),
        }
    }

    /// Fixed snapshot used when the caller supplies no location at all.
    /// Producing it never touches the network or the cache.
    pub fn default_conditions() -> Self {
        Self {
            temperature: 25.0,
            rainfall: 0.0,
            humidity: 60.0,
            wind_speed: 2.0,
            soil_temp: 23.0,
            soil_moisture: 50.0,
        }
    }
}

/// Weather lookup errors. `Clone` so failed lookups can sit in the cache
/// alongside successes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Request(String),
    #[error("Weather provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unusable weather payload: {0}")]
    Payload(String),
}

/// OpenWeatherMap current-weather payload (only the fields we read)
#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    wind: OwmWind,
    rain: Option<OwmRain>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h")]
    one_hour_mm: Option<f64>,
}

/// Client for the weather provider plus the per-location lookup cache
#[derive(Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Cache<String, Result<WeatherSnapshot, WeatherError>>,
}

impl WeatherService {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the service at a different provider endpoint. Tests use this to
    /// target a mock server.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache: Cache::builder().max_capacity(CACHE_MAX_LOCATIONS).build(),
        })
    }

    /// Current conditions for a location.
    ///
    /// Repeated lookups for the same key return the cached outcome without a
    /// new provider call. Entries never expire within a process run; weather
    /// staleness across a long-lived process is a known limitation of this
    /// service.
    pub async fn get_weather(
        &self,
        location: &LocationQuery,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.cache
            .get_with(location.cache_key(), self.fetch(location))
            .await
    }

    async fn fetch(&self, location: &LocationQuery) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let mut query: Vec<(&str, String)> = match location {
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            LocationQuery::Named(name) => vec![("q", name.clone())],
        };
        query.push(("appid", self.api_key.clone()));
        query.push(("units", "metric".to_string()));

        tracing::debug!("Fetching weather for {:?}", location);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Payload(e.to_string()))?;

        let rainfall = payload.rain.and_then(|r| r.one_hour_mm).unwrap_or(0.0);

        Ok(WeatherSnapshot::from_observation(
            payload.main.temp,
            rainfall,
            payload.main.humidity,
            payload.wind.speed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soil_temp_floor() {
        let snapshot = WeatherSnapshot::from_observation(-8.0, 0.0, 50.0, 1.0);
        assert_eq!(snapshot.soil_temp, 10.0);

        let snapshot = WeatherSnapshot::from_observation(11.5, 0.0, 50.0, 1.0);
        assert_eq!(snapshot.soil_temp, 10.0);

        let snapshot = WeatherSnapshot::from_observation(25.0, 0.0, 50.0, 1.0);
        assert_eq!(snapshot.soil_temp, 23.0);
    }

    #[test]
    fn test_soil_moisture_cap() {
        let snapshot = WeatherSnapshot::from_observation(25.0, 0.0, 97.0, 1.0);
        assert_eq!(snapshot.soil_moisture, 100.0);

        let snapshot = WeatherSnapshot::from_observation(25.0, 0.0, 60.0, 1.0);
        assert_eq!(snapshot.soil_moisture, 70.0);
    }

    #[test]
    fn test_default_conditions() {
        let snapshot = WeatherSnapshot::default_conditions();
        assert_eq!(snapshot.temperature, 25.0);
        assert_eq!(snapshot.rainfall, 0.0);
        assert_eq!(snapshot.humidity, 60.0);
        assert_eq!(snapshot.wind_speed, 2.0);
        assert_eq!(snapshot.soil_temp, 23.0);
        assert_eq!(snapshot.soil_moisture, 50.0);
    }

    #[test]
    fn test_payload_without_rain_defaults_to_zero() {
        let payload: OwmResponse = serde_json::from_str(
            r#"{"main":{"temp":28.5,"humidity":74},"wind":{"speed":3.6}}"#,
        )
        .unwrap();

        let rainfall = payload.rain.and_then(|r| r.one_hour_mm).unwrap_or(0.0);
        assert_eq!(rainfall, 0.0);
        assert_eq!(payload.main.temp, 28.5);
    }

    #[test]
    fn test_payload_with_rain() {
        let payload: OwmResponse = serde_json::from_str(
            r#"{"main":{"temp":22.0,"humidity":90},"wind":{"speed":6.1},"rain":{"1h":12.3}}"#,
        )
        .unwrap();

        let rainfall = payload.rain.and_then(|r| r.one_hour_mm).unwrap_or(0.0);
        assert_eq!(rainfall, 12.3);
    }

    #[test]
    fn test_payload_missing_required_field_is_rejected() {
        let result: Result<OwmResponse, _> =
            serde_json::from_str(r#"{"wind":{"speed":3.6}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_keys_do_not_collide() {
        let coords = LocationQuery::Coordinates {
            lat: 12.5,
            lon: 79.1,
        };
        let named = LocationQuery::Named("12.5,79.1".to_string());
        assert_ne!(coords.cache_key(), named.cache_key());
    }
}
