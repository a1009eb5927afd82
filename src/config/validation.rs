//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Normalize the requested mode into [`Mode`]
//! - Validate value ranges (timeouts > 0, at least one attempt)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SettingsFile → Result<Settings, Vec<ValidationError>>
//! - Mode-specific backend fields are not checked here; the backend does that
//!   when it is built for the selected mode

use std::fmt;

use crate::config::schema::{Mode, Settings, SettingsFile};

/// A single semantic problem in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a raw document and produce immutable [`Settings`].
pub fn validate_settings(file: SettingsFile) -> Result<Settings, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mode = if file.mode.trim().is_empty() {
        errors.push(ValidationError::new("mode", "mode must be set"));
        None
    } else {
        match file.mode.parse::<Mode>() {
            Ok(mode) => Some(mode),
            Err(other) => {
                errors.push(ValidationError::new(
                    "mode",
                    format!(
                        "'{}' is not one of {}",
                        other,
                        Mode::ALLOWED.join(", ")
                    ),
                ));
                None
            }
        }
    };

    if let Some(weather) = &file.weather {
        if weather.timeout_seconds == 0 {
            errors.push(ValidationError::new(
                "weather.timeout_seconds",
                "must be greater than zero",
            ));
        }
    } else {
        errors.push(ValidationError::new("weather", "section is required"));
    }

    if file.logging.level.trim().is_empty() {
        errors.push(ValidationError::new("logging.level", "must not be empty"));
    }

    match (mode, file.weather) {
        (Some(mode), Some(weather)) if errors.is_empty() => Ok(Settings {
            mode,
            weather,
            logging: file.logging,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SettingsFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_mode_is_lowercased() {
        let settings = validate_settings(parse(r#"{"mode": "REAL", "weather": {}}"#)).unwrap();
        assert_eq!(settings.mode, Mode::Real);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let errors = validate_settings(parse(r#"{"mode": "staging", "weather": {}}"#)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "mode");
    }

    #[test]
    fn test_empty_mode_rejected() {
        let errors = validate_settings(parse(r#"{"mode": "", "weather": {}}"#)).unwrap_err();
        assert_eq!(errors[0].message, "mode must be set");
    }

    #[test]
    fn test_collects_all_errors() {
        let errors = validate_settings(parse(
            r#"{"mode": "prod", "weather": {"timeout_seconds": 0}, "logging": {"level": " "}}"#,
        ))
        .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["mode", "weather.timeout_seconds", "logging.level"]
        );
    }

    #[test]
    fn test_zero_retries_accepted_at_load() {
        let settings = validate_settings(parse(
            r#"{"mode": "demo", "weather": {"demo_data_path": "m.json", "max_retries": 0}}"#,
        ))
        .unwrap();
        assert_eq!(settings.weather.max_retries, 0);
    }

    #[test]
    fn test_missing_weather_section() {
        let errors = validate_settings(parse(r#"{"mode": "demo"}"#)).unwrap_err();
        assert_eq!(errors[0].to_string(), "weather: section is required");
    }

    #[test]
    fn test_unselected_mode_fields_may_be_absent() {
        // real mode without endpoints is still a valid document
        let settings = validate_settings(parse(r#"{"mode": "real", "weather": {}}"#)).unwrap();
        assert!(settings.weather.forecast_endpoint.is_none());
    }
}
