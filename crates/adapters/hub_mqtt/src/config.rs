//! MQTT hub-link configuration.

use serde::Deserialize;

use crate::error::MqttError;

/// Configuration for the MQTT connection to the hub.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub host: String,
    /// MQTT broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic prefix under which mirrored device state is published and
    /// command topics are watched.
    pub base_topic: String,
    /// Topic prefix under which the hub publishes entity state for the
    /// connected lights.
    pub hub_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "minilink".to_string(),
            base_topic: "minilink".to_string(),
            hub_topic: "minilink/hub".to_string(),
            keep_alive_secs: 30,
        }
    }
}

impl MqttConfig {
    /// Check the configuration before connecting.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Config`] for an empty host, a zero port, or a
    /// topic prefix containing MQTT wildcards.
    pub fn validate(&self) -> Result<(), MqttError> {
        if self.host.is_empty() {
            return Err(MqttError::Config("broker host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(MqttError::Config("broker port must be non-zero".to_string()));
        }
        for (name, topic) in [("base_topic", &self.base_topic), ("hub_topic", &self.hub_topic)] {
            if topic.is_empty() {
                return Err(MqttError::Config(format!("{name} must not be empty")));
            }
            if topic.contains(['#', '+']) {
                return Err(MqttError::Config(format!("{name} must not contain wildcards")));
            }
        }
        Ok(())
    }
}
