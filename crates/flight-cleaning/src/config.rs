//! Configuration types for the flight cleaning pipeline.
//!
//! The configuration is passed explicitly to [`Pipeline`](crate::Pipeline);
//! nothing in the crate reads process-wide settings.

use serde::{Deserialize, Serialize};

/// Default increment between consecutive reconstructed flight codes.
pub const DEFAULT_STEP: i64 = 10;

/// Default field delimiter of the raw flight text.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Default separator between origin and destination in the route field.
pub const DEFAULT_ROUTE_SEPARATOR: char = '_';

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use flight_cleaning::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .step(5)
///     .delimiter(b',')
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Fixed increment between consecutive rows' flight codes.
    /// Must be positive.
    /// Default: 10
    pub step: i64,

    /// Field delimiter used when reading raw text.
    /// Default: b';'
    pub delimiter: u8,

    /// Character splitting the route field into origin and destination.
    /// Only the first occurrence is used.
    /// Default: '_'
    pub route_separator: char,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            delimiter: DEFAULT_DELIMITER,
            route_separator: DEFAULT_ROUTE_SEPARATOR,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.step <= 0 {
            return Err(ConfigValidationError::InvalidStep(self.step));
        }

        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(ConfigValidationError::InvalidDelimiter(
                self.delimiter as char,
            ));
        }

        if self.route_separator.is_ascii() && self.route_separator as u32 == self.delimiter as u32
        {
            return Err(ConfigValidationError::SeparatorClash(self.route_separator));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid step: {0} (must be a positive integer)")]
    InvalidStep(i64),

    #[error("Invalid delimiter {0:?}: quote and line-break characters are reserved")]
    InvalidDelimiter(char),

    #[error("Route separator {0:?} is also the field delimiter")]
    SeparatorClash(char),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    step: Option<i64>,
    delimiter: Option<u8>,
    route_separator: Option<char>,
}

impl CleaningConfigBuilder {
    /// Set the increment between consecutive flight codes.
    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the field delimiter of the raw text.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the separator used to split routes.
    pub fn route_separator(mut self, separator: char) -> Self {
        self.route_separator = Some(separator);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            step: self.step.unwrap_or(DEFAULT_STEP),
            delimiter: self.delimiter.unwrap_or(DEFAULT_DELIMITER),
            route_separator: self.route_separator.unwrap_or(DEFAULT_ROUTE_SEPARATOR),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.step, 10);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.route_separator, '_');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults() {
        let config = CleaningConfig::builder().build().unwrap();
        assert_eq!(config, CleaningConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .step(25)
            .delimiter(b',')
            .route_separator('-')
            .build()
            .unwrap();

        assert_eq!(config.step, 25);
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.route_separator, '-');
    }

    #[test]
    fn test_validation_rejects_non_positive_step() {
        for step in [0, -1, -10] {
            let result = CleaningConfig::builder().step(step).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidStep(s) if s == step
            ));
        }
    }

    #[test]
    fn test_validation_rejects_quote_delimiter() {
        let result = CleaningConfig::builder().delimiter(b'"').build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDelimiter('"')
        ));
    }

    #[test]
    fn test_validation_rejects_separator_clash() {
        let result = CleaningConfig::builder()
            .delimiter(b'_')
            .route_separator('_')
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::SeparatorClash('_')
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{ "step": 100, "delimiter": 44, "route_separator": "-" }"#;

        let config: CleaningConfig = serde_json::from_str(json).expect("Should deserialize");

        assert_eq!(config.step, 100);
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.route_separator, '-');
    }
}
