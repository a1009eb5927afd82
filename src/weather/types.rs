//! Weather result types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by weather backends.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The backend cannot be built from the given configuration.
    #[error("backend configuration error: {0}")]
    Config(String),

    /// A fetch failed after the backend's own retries.
    #[error("weather fetch failed: {0}")]
    Fetch(String),
}

/// Result type for weather operations.
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Backend-independent weather report.
///
/// Any field the backend did not supply is `None`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub timestamp: Option<String>,
    pub summary: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_kmph: Option<f64>,
    pub source: String,
    pub raw: Option<Value>,
}

impl WeatherReport {
    /// Normalize a backend payload of the shape
    /// `{location, timestamp, weather: {summary, temperature_c, humidity, wind_kmph}, source, raw}`.
    pub fn from_payload(queried: &str, payload: &Value) -> Self {
        let weather = payload.get("weather");
        let number = |key: &str| weather.and_then(|w| w.get(key)).and_then(Value::as_f64);

        Self {
            location: payload
                .get("location")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or(queried)
                .to_string(),
            timestamp: payload
                .get("timestamp")
                .and_then(Value::as_str)
                .map(str::to_string),
            summary: weather
                .and_then(|w| w.get("summary"))
                .and_then(Value::as_str)
                .map(str::to_string),
            temperature_c: number("temperature_c"),
            humidity: number("humidity"),
            wind_kmph: number("wind_kmph"),
            source: payload
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            raw: payload.get("raw").filter(|raw| !raw.is_null()).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_payload() {
        let payload = json!({
            "location": "Rajkot, India",
            "timestamp": "2024-01-01T00:00",
            "weather": {"summary": "Clear sky", "temperature_c": 25.5, "humidity": 40, "wind_kmph": 5.2},
            "source": "real",
            "raw": {"forecast": {}}
        });
        let report = WeatherReport::from_payload("Rajkot", &payload);

        assert_eq!(report.location, "Rajkot, India");
        assert_eq!(report.summary.as_deref(), Some("Clear sky"));
        assert_eq!(report.temperature_c, Some(25.5));
        assert_eq!(report.humidity, Some(40.0));
        assert_eq!(report.wind_kmph, Some(5.2));
        assert_eq!(report.source, "real");
        assert_eq!(report.raw, Some(json!({"forecast": {}})));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let report = WeatherReport::from_payload("Rajkot", &json!({}));

        assert_eq!(report.location, "Rajkot");
        assert_eq!(report.timestamp, None);
        assert_eq!(report.summary, None);
        assert_eq!(report.temperature_c, None);
        assert_eq!(report.source, "unknown");
        assert_eq!(report.raw, None);
    }

    #[test]
    fn test_wrongly_typed_fields_are_none() {
        let payload = json!({"weather": {"temperature_c": "hot", "humidity": null}});
        let report = WeatherReport::from_payload("Rajkot", &payload);
        assert_eq!(report.temperature_c, None);
        assert_eq!(report.humidity, None);
    }
}
