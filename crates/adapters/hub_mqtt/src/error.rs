//! MQTT adapter error types.

/// Errors specific to the MQTT hub-link adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// Invalid configuration value.
    #[error("invalid MQTT configuration: {0}")]
    Config(String),

    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[from] rumqttc::ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_config_error() {
        let err = MqttError::Config("broker port must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "invalid MQTT configuration: broker port must be non-zero"
        );
    }
}
