//! Backend selection for the active mode.

use serde_json::Value;

use crate::config::{Mode, WeatherConfig};
use crate::weather::demo::DemoBackend;
use crate::weather::live::LiveBackend;
use crate::weather::types::{WeatherReport, WeatherResult};

/// The backend constructed for one mode.
///
/// Built fresh whenever configuration is applied and never mutated after.
#[derive(Debug, Clone)]
pub enum WeatherBackend {
    Demo(DemoBackend),
    Live(LiveBackend),
}

impl WeatherBackend {
    /// Build the backend for `mode`, checking only that mode's required fields.
    pub fn build(mode: Mode, config: &WeatherConfig) -> WeatherResult<Self> {
        let backend = match mode {
            Mode::Demo => WeatherBackend::Demo(DemoBackend::new(config)?),
            Mode::Real => WeatherBackend::Live(LiveBackend::new(config)?),
        };
        tracing::debug!(mode = %mode, "Weather backend built");
        Ok(backend)
    }

    /// The mode this backend serves.
    pub fn mode(&self) -> Mode {
        match self {
            WeatherBackend::Demo(_) => Mode::Demo,
            WeatherBackend::Live(_) => Mode::Real,
        }
    }

    /// Raw backend payload for `location`.
    pub async fn get_weather(&self, location: &str) -> WeatherResult<Value> {
        match self {
            WeatherBackend::Demo(backend) => backend.get_weather(location).await,
            WeatherBackend::Live(backend) => backend.get_weather(location).await,
        }
    }

    /// Fetch and normalize.
    pub async fn fetch(&self, location: &str) -> WeatherResult<WeatherReport> {
        let payload = self.get_weather(location).await.map_err(|e| {
            tracing::error!(location = %location, error = %e, "Failed to fetch weather");
            e
        })?;

        let report = WeatherReport::from_payload(location, &payload);
        tracing::info!(
            source = %report.source,
            location = %location,
            "Weather fetched"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::types::WeatherError;

    #[test]
    fn test_build_checks_only_selected_mode() {
        let config = WeatherConfig {
            demo_data_path: Some("mock.json".into()),
            ..WeatherConfig::default()
        };

        let backend = WeatherBackend::build(Mode::Demo, &config).unwrap();
        assert_eq!(backend.mode(), Mode::Demo);

        let err = WeatherBackend::build(Mode::Real, &config).unwrap_err();
        assert!(matches!(err, WeatherError::Config(_)));
    }

    #[test]
    fn test_build_live() {
        let config = WeatherConfig {
            geocoding_endpoint: Some("http://127.0.0.1:1/v1/search".into()),
            forecast_endpoint: Some("http://127.0.0.1:1/v1/forecast".into()),
            ..WeatherConfig::default()
        };
        let backend = WeatherBackend::build(Mode::Real, &config).unwrap();
        assert_eq!(backend.mode(), Mode::Real);
    }
}
