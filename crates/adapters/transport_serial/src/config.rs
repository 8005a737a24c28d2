//! Serial port configuration.

use serde::Deserialize;

use crate::error::SerialError;

/// Configuration for the serial link to the board.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path (e.g. `/dev/ttyUSB0`).
    pub path: String,
    /// Baud rate. The board firmware runs the link at 115200.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
        }
    }
}

impl SerialConfig {
    /// Check the configuration before opening the port.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Config`] when the device path is empty or the
    /// baud rate is zero.
    pub fn validate(&self) -> Result<(), SerialError> {
        if self.path.is_empty() {
            return Err(SerialError::Config("device path must not be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(SerialError::Config("baud rate must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = SerialConfig::default();
        assert_eq!(config.path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115_200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            path = "/dev/ttyACM0"
            baud_rate = 9600
        "#;
        let config: SerialConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 9600);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: SerialConfig = toml::from_str(r#"path = "/dev/ttyS1""#).unwrap();
        assert_eq!(config.path, "/dev/ttyS1");
        assert_eq!(config.baud_rate, 115_200);
    }

    #[test]
    fn should_reject_empty_path() {
        let mut config = SerialConfig::default();
        config.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_baud_rate() {
        let mut config = SerialConfig::default();
        config.baud_rate = 0;
        assert!(config.validate().is_err());
    }
}
