//! Live backend backed by the Open-Meteo geocoding and forecast APIs.
//!
//! # Responsibilities
//! - Resolve a place name to coordinates
//! - Query current conditions for those coordinates
//! - Retry failed requests with linear backoff before giving up

use std::time::Duration;

use serde_json::{json, Value};
use url::Url;

use crate::config::WeatherConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::weather::types::{WeatherError, WeatherResult};

/// Open-Meteo client built for one configuration.
#[derive(Debug, Clone)]
pub struct LiveBackend {
    client: reqwest::Client,
    geocoding_endpoint: Url,
    forecast_endpoint: Url,
    timezone: String,
    max_attempts: u32,
    backoff_base_ms: u64,
    backoff_step_ms: u64,
    backoff_max_ms: u64,
}

impl LiveBackend {
    /// Requires both endpoints as valid URLs.
    pub fn new(config: &WeatherConfig) -> WeatherResult<Self> {
        let (geocoding, forecast) = match (&config.geocoding_endpoint, &config.forecast_endpoint) {
            (Some(geocoding), Some(forecast)) if !geocoding.is_empty() && !forecast.is_empty() => {
                (geocoding, forecast)
            }
            _ => {
                return Err(WeatherError::Config(
                    "geocoding_endpoint and forecast_endpoint must be set for real mode".to_string(),
                ))
            }
        };

        if !config.units.eq_ignore_ascii_case("metric") {
            tracing::warn!(units = %config.units, "Ignoring units, Open-Meteo is queried in metric");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WeatherError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            geocoding_endpoint: parse_endpoint("geocoding_endpoint", geocoding)?,
            forecast_endpoint: parse_endpoint("forecast_endpoint", forecast)?,
            timezone: config.timezone.clone(),
            max_attempts: config.max_retries.max(1),
            backoff_base_ms: config.backoff_base_ms,
            backoff_step_ms: config.backoff_step_ms,
            backoff_max_ms: config.backoff_max_ms,
        })
    }

    pub async fn get_weather(&self, location: &str) -> WeatherResult<Value> {
        // 1. Geocoding
        let geocode = self
            .request_with_retries(
                &self.geocoding_endpoint,
                &[("name", location.to_string()), ("count", "1".to_string())],
                "geocoding",
            )
            .await?;

        let place = geocode
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .cloned()
            .ok_or_else(|| {
                WeatherError::Fetch(format!(
                    "geocoding failed for location '{location}' - no results"
                ))
            })?;

        let (latitude, longitude) = match (
            place.get("latitude").and_then(Value::as_f64),
            place.get("longitude").and_then(Value::as_f64),
        ) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(WeatherError::Fetch(format!(
                    "geocoding response missing coordinates for '{location}'"
                )))
            }
        };
        let name = place
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(location)
            .to_string();
        let country = place.get("country").and_then(Value::as_str);

        // 2. Forecast (current weather)
        let forecast = self
            .request_with_retries(
                &self.forecast_endpoint,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("current_weather", "true".to_string()),
                    ("hourly", "relativehumidity_2m".to_string()),
                    ("timezone", self.timezone.clone()),
                ],
                "forecast",
            )
            .await?;

        let current = forecast.get("current_weather").ok_or_else(|| {
            WeatherError::Fetch(format!(
                "forecast API returned unexpected payload for {location}"
            ))
        })?;

        tracing::info!(
            location = %name,
            latitude,
            longitude,
            "Open-Meteo returned weather"
        );

        let display_name = match country {
            Some(country) => format!("{name}, {country}"),
            None => name,
        };

        Ok(json!({
            "location": display_name,
            "timestamp": current.get("time"),
            "weather": {
                "summary": summary_for_code(current.get("weathercode").and_then(Value::as_i64)),
                "temperature_c": current.get("temperature"),
                "humidity": humidity(&forecast),
                "wind_kmph": current.get("windspeed"),
            },
            "raw": {
                "geocoding": place,
                "forecast": forecast,
            },
            "source": "real",
        }))
    }

    async fn request_with_retries(
        &self,
        url: &Url,
        params: &[(&str, String)],
        desc: &str,
    ) -> WeatherResult<Value> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            tracing::info!(request = desc, attempt, url = %url, "Calling weather API");

            match self.request_once(url, params, desc).await {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    tracing::warn!(request = desc, attempt, error = %e, "Weather API attempt failed");
                    last_error = e;
                }
            }

            if attempt < self.max_attempts {
                let delay = calculate_backoff(
                    attempt,
                    self.backoff_base_ms,
                    self.backoff_step_ms,
                    self.backoff_max_ms,
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(WeatherError::Fetch(format!(
            "all {} attempts for {desc} failed: {last_error}",
            self.max_attempts
        )))
    }

    async fn request_once(
        &self,
        url: &Url,
        params: &[(&str, String)],
        desc: &str,
    ) -> Result<Value, String> {
        let response = self
            .client
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!("{desc} status {status}"));
        }

        response.json::<Value>().await.map_err(|e| e.to_string())
    }
}

fn parse_endpoint(field: &str, value: &str) -> WeatherResult<Url> {
    Url::parse(value).map_err(|e| WeatherError::Config(format!("invalid {field} '{value}': {e}")))
}

/// First hourly relative-humidity value, or a scalar if that is what came back.
fn humidity(forecast: &Value) -> Option<f64> {
    match forecast.get("hourly")?.get("relativehumidity_2m")? {
        Value::Array(values) => values.first().and_then(Value::as_f64),
        other => other.as_f64(),
    }
}

/// Human summary for a WMO weather interpretation code.
pub fn summary_for_code(code: Option<i64>) -> String {
    let Some(code) = code else {
        return "Unknown".to_string();
    };

    let summary = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        other => return format!("Weather code {other}"),
    };
    summary.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(geocoding: Option<&str>, forecast: Option<&str>) -> WeatherConfig {
        WeatherConfig {
            geocoding_endpoint: geocoding.map(str::to_string),
            forecast_endpoint: forecast.map(str::to_string),
            ..WeatherConfig::default()
        }
    }

    #[test]
    fn test_requires_both_endpoints() {
        let err = LiveBackend::new(&config(Some("http://geo.test/search"), None)).unwrap_err();
        assert!(matches!(err, WeatherError::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = LiveBackend::new(&config(Some("not a url"), Some("http://f.test"))).unwrap_err();
        assert!(err.to_string().contains("geocoding_endpoint"));
    }

    #[test]
    fn test_non_metric_units_are_ignored() {
        let mut cfg = config(Some("http://g.test"), Some("http://f.test"));
        cfg.units = "imperial".to_string();
        assert!(LiveBackend::new(&cfg).is_ok());
    }

    #[test]
    fn test_zero_retries_still_makes_one_attempt() {
        let mut cfg = config(Some("http://g.test"), Some("http://f.test"));
        cfg.max_retries = 0;
        assert_eq!(LiveBackend::new(&cfg).unwrap().max_attempts, 1);
    }

    #[test]
    fn test_summary_for_code() {
        assert_eq!(summary_for_code(Some(0)), "Clear sky");
        assert_eq!(summary_for_code(Some(95)), "Thunderstorm");
        assert_eq!(summary_for_code(Some(42)), "Weather code 42");
        assert_eq!(summary_for_code(None), "Unknown");
    }

    #[test]
    fn test_humidity_extraction() {
        assert_eq!(humidity(&json!({"hourly": {"relativehumidity_2m": [61, 63]}})), Some(61.0));
        assert_eq!(humidity(&json!({"hourly": {"relativehumidity_2m": 55}})), Some(55.0));
        assert_eq!(humidity(&json!({"hourly": {"relativehumidity_2m": []}})), None);
        assert_eq!(humidity(&json!({})), None);
    }
}
