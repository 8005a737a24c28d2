//! Entity handles publishing mirrored device state.
//!
//! One handle per device slug; every capability trait publishes a retained
//! topic under `{base}/{slug}`, so the hub can pick up the last known state
//! after a restart. Publish failures are logged and dropped, matching the
//! fire-and-forget wire the state came from.

use minilink_core::device::{
    AlarmHandle, AnalogSensorHandle, BinarySensorHandle, LauncherPartHandle, RgbStripHandle,
    SwitchHandle, TelevisionHandle,
};
use minilink_protocol::{AlarmState, Rgb};
use rumqttc::{AsyncClient, QoS};
use tracing::warn;

/// Publishes one device's state to its MQTT topics.
#[derive(Clone)]
pub struct MqttEntityHandle {
    client: AsyncClient,
    topic: String,
}

impl MqttEntityHandle {
    pub(crate) fn new(client: AsyncClient, topic: String) -> Self {
        Self { client, topic }
    }

    fn publish(&self, suffix: &str, payload: String) {
        let topic = format!("{}/{suffix}", self.topic);
        if let Err(error) = self
            .client
            .try_publish(topic.as_str(), QoS::AtLeastOnce, true, payload)
        {
            warn!(%error, topic, "failed to publish entity state");
        }
    }

    fn publish_flag(&self, suffix: &str, on: bool) {
        self.publish(suffix, if on { "ON" } else { "OFF" }.to_string());
    }
}

impl SwitchHandle for MqttEntityHandle {
    fn publish_power(&self, on: bool) {
        self.publish_flag("state", on);
    }
}

impl BinarySensorHandle for MqttEntityHandle {
    fn publish_state(&self, on: bool) {
        self.publish_flag("state", on);
    }
}

impl AnalogSensorHandle for MqttEntityHandle {
    fn publish_value(&self, value: f64) {
        self.publish("state", value.to_string());
    }
}

impl AlarmHandle for MqttEntityHandle {
    fn publish_armed(&self, armed: bool) {
        self.publish_flag("armed", armed);
    }

    fn publish_state(&self, state: AlarmState) {
        self.publish("state", state.as_str().to_string());
    }
}

impl TelevisionHandle for MqttEntityHandle {
    fn publish_power(&self, on: bool) {
        self.publish_flag("state", on);
    }

    fn publish_muted(&self, muted: bool) {
        self.publish_flag("muted", muted);
    }

    fn publish_volume(&self, volume: u32) {
        self.publish("volume", volume.to_string());
    }
}

impl RgbStripHandle for MqttEntityHandle {
    fn publish_power(&self, on: bool) {
        self.publish_flag("state", on);
    }

    fn publish_color(&self, color: Rgb) {
        self.publish("color", color.to_string());
    }

    fn publish_effect(&self, effect: u8) {
        self.publish("effect", effect.to_string());
    }
}

impl LauncherPartHandle for MqttEntityHandle {
    fn publish_value(&self, value: u32) {
        self.publish("state", value.to_string());
    }
}
