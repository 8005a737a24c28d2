//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `minilink.toml` in the working directory (path overridable via
//! `MINILINK_CONFIG`). Every field has a default so the file is optional,
//! though a daemon without a `[devices]` section mirrors nothing. Environment
//! variables take precedence over file values.

use minilink_adapter_hub_mqtt::MqttConfig;
use minilink_adapter_transport_serial::SerialConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Transport selection.
    pub transport: TransportConfig,
    /// Serial link settings (used when `transport.mode = "serial"`).
    pub serial: SerialConfig,
    /// MQTT hub-link settings.
    pub mqtt: MqttConfig,
    /// Wire protocol settings.
    pub protocol: ProtocolConfig,
    /// The devices mirrored over the wire.
    pub devices: DevicesConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "minilinkd=info,minilink=info".to_string(),
        }
    }
}

/// Transport selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Which transport to drive the bridge with.
    pub mode: TransportMode,
}

/// Available transports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Real board over a serial port.
    #[default]
    Serial,
    /// In-memory echo board; runs without hardware.
    Virtual,
}

/// Wire protocol settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Reject malformed frames instead of decoding them best-effort.
    pub strict: bool,
}

/// Per-category device tables.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    pub switches: Vec<DeviceEntry>,
    pub binary_sensors: Vec<DeviceEntry>,
    pub analog_sensors: Vec<DeviceEntry>,
    pub alarms: Vec<AlarmEntry>,
    pub televisions: Vec<DeviceEntry>,
    pub rgb_strips: Vec<DeviceEntry>,
    pub connected_lights: Vec<ConnectedLightEntry>,
}

/// One mirrored board device.
#[derive(Debug, Deserialize)]
pub struct DeviceEntry {
    /// Two-digit address on the wire.
    pub communication_id: u8,
    /// Topic slug; must be unique across all devices.
    pub name: String,
}

/// An alarm panel, optionally bundled with its missile launcher.
#[derive(Debug, Deserialize)]
pub struct AlarmEntry {
    pub communication_id: u8,
    pub name: String,
    /// Register the launcher sub-entities sharing this id.
    #[serde(default)]
    pub launcher: bool,
}

/// A hub-owned light mirrored to the board.
#[derive(Debug, Deserialize)]
pub struct ConnectedLightEntry {
    pub communication_id: u8,
    /// Hub entity identifier (e.g. `light.desk`).
    pub entity_id: String,
    /// Attribute surface to subscribe.
    pub kind: LightKind,
}

/// Attribute surface of a connected light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    /// On/off only.
    Binary,
    /// On/off, brightness, color temperature.
    Temperature,
    /// On/off, brightness, color temperature, color.
    Color,
}

impl Config {
    /// Load configuration from the TOML file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the merged configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("MINILINK_CONFIG").unwrap_or_else(|_| "minilink.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MINILINK_TRANSPORT") {
            match val.as_str() {
                "serial" => self.transport.mode = TransportMode::Serial,
                "virtual" => self.transport.mode = TransportMode::Virtual,
                _ => {}
            }
        }
        if let Ok(val) = std::env::var("MINILINK_SERIAL_PATH") {
            self.serial.path = val;
        }
        if let Ok(val) = std::env::var("MINILINK_SERIAL_BAUD") {
            if let Ok(baud) = val.parse() {
                self.serial.baud_rate = baud;
            }
        }
        if let Ok(val) = std::env::var("MINILINK_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Ok(val) = std::env::var("MINILINK_MQTT_PORT") {
            if let Ok(port) = val.parse() {
                self.mqtt.port = port;
            }
        }
        if let Ok(val) = std::env::var("MINILINK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.mode == TransportMode::Serial {
            self.serial
                .validate()
                .map_err(|err| ConfigError::Validation(err.to_string()))?;
        }
        self.mqtt
            .validate()
            .map_err(|err| ConfigError::Validation(err.to_string()))?;

        let mut names: Vec<&str> = Vec::new();
        let categories: [(&str, Vec<(u8, &str)>); 6] = [
            ("switches", slots(&self.devices.switches)),
            ("binary_sensors", slots(&self.devices.binary_sensors)),
            ("analog_sensors", slots(&self.devices.analog_sensors)),
            (
                "alarms",
                self.devices
                    .alarms
                    .iter()
                    .map(|entry| (entry.communication_id, entry.name.as_str()))
                    .collect(),
            ),
            ("televisions", slots(&self.devices.televisions)),
            ("rgb_strips", slots(&self.devices.rgb_strips)),
        ];
        for (category, entries) in &categories {
            let mut ids: Vec<u8> = Vec::new();
            for (id, name) in entries {
                validate_id(category, *id)?;
                validate_name(name)?;
                if ids.contains(id) {
                    return Err(ConfigError::Validation(format!(
                        "duplicate communication id {id} in {category}"
                    )));
                }
                ids.push(*id);
                if names.contains(name) {
                    return Err(ConfigError::Validation(format!("duplicate device name {name}")));
                }
                names.push(*name);
            }
        }

        let mut light_ids: Vec<u8> = Vec::new();
        let mut entity_ids: Vec<&str> = Vec::new();
        for light in &self.devices.connected_lights {
            validate_id("connected_lights", light.communication_id)?;
            if light.entity_id.is_empty() {
                return Err(ConfigError::Validation(
                    "connected light entity_id must not be empty".to_string(),
                ));
            }
            if light_ids.contains(&light.communication_id) {
                return Err(ConfigError::Validation(format!(
                    "duplicate communication id {} in connected_lights",
                    light.communication_id
                )));
            }
            light_ids.push(light.communication_id);
            if entity_ids.contains(&light.entity_id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate connected light entity id {}",
                    light.entity_id
                )));
            }
            entity_ids.push(&light.entity_id);
        }
        Ok(())
    }
}

fn slots(entries: &[DeviceEntry]) -> Vec<(u8, &str)> {
    entries
        .iter()
        .map(|entry| (entry.communication_id, entry.name.as_str()))
        .collect()
}

/// The wire encodes ids in two digits; wider ids corrupt framing, so the
/// configuration is where they get rejected.
fn validate_id(category: &str, id: u8) -> Result<(), ConfigError> {
    if id > 99 {
        return Err(ConfigError::Validation(format!(
            "communication id {id} in {category} exceeds the two-digit wire field"
        )));
    }
    Ok(())
}

/// Names become MQTT topic segments.
fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation("device name must not be empty".to_string()));
    }
    if name.contains(['/', '#', '+']) || name.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "device name {name} is not a valid topic segment"
        )));
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
