//! Demo backend serving a local mock file.

use std::path::PathBuf;

use serde_json::Value;

use crate::config::loader::read_text;
use crate::config::WeatherConfig;
use crate::weather::types::{WeatherError, WeatherResult};

/// Reads the mock data file on every call, so edits show up immediately.
#[derive(Debug, Clone)]
pub struct DemoBackend {
    data_path: PathBuf,
}

impl DemoBackend {
    /// Requires `demo_data_path`.
    pub fn new(config: &WeatherConfig) -> WeatherResult<Self> {
        let data_path = config
            .demo_data_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| {
                WeatherError::Config("demo_data_path must be set for demo mode".to_string())
            })?;

        Ok(Self { data_path })
    }

    pub async fn get_weather(&self, location: &str) -> WeatherResult<Value> {
        let path = self.data_path.clone();
        let content = tokio::task::spawn_blocking(move || read_text(&path))
            .await
            .map_err(|e| WeatherError::Fetch(format!("mock data read aborted: {e}")))?
            .map_err(|e| {
                WeatherError::Fetch(format!(
                    "cannot read mock data {}: {e}",
                    self.data_path.display()
                ))
            })?;

        let mut data: Value = serde_json::from_str(&content).map_err(|e| {
            WeatherError::Fetch(format!(
                "invalid mock data {}: {e}",
                self.data_path.display()
            ))
        })?;

        let object = data.as_object_mut().ok_or_else(|| {
            WeatherError::Fetch(format!(
                "mock data {} is not a JSON object",
                self.data_path.display()
            ))
        })?;
        object.insert("queried_location".to_string(), Value::from(location));
        object.insert("source".to_string(), Value::from("mock"));

        tracing::info!(location = %location, "Returning mock weather data");
        Ok(data)
    }
}
