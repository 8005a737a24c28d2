//! Capability handles for mirrored devices.
//!
//! Each board device category maps to one narrow trait; hub adapters
//! implement them by publishing entity state upward. The registry stores
//! shared trait objects, so one underlying entity can back several
//! capabilities.

use minilink_protocol::{AlarmState, Rgb};

pub trait SwitchHandle: Send + Sync {
    fn publish_power(&self, on: bool);
}

pub trait BinarySensorHandle: Send + Sync {
    fn publish_state(&self, on: bool);
}

pub trait AnalogSensorHandle: Send + Sync {
    fn publish_value(&self, value: f64);
}

pub trait AlarmHandle: Send + Sync {
    /// Coarse armed flag from the shared binary state path.
    fn publish_armed(&self, armed: bool);

    /// Extended panel state.
    fn publish_state(&self, state: AlarmState);
}

pub trait TelevisionHandle: Send + Sync {
    fn publish_power(&self, on: bool);
    fn publish_muted(&self, muted: bool);
    fn publish_volume(&self, volume: u32);
}

pub trait RgbStripHandle: Send + Sync {
    fn publish_power(&self, on: bool);
    fn publish_color(&self, color: Rgb);
    fn publish_effect(&self, effect: u8);
}

/// Numeric launcher sub-entity (angles, missile count).
pub trait LauncherPartHandle: Send + Sync {
    fn publish_value(&self, value: u32);
}

/// Missile launcher sub-entities attached to an alarm panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LauncherPart {
    /// Base rotation angle in degrees.
    Base,
    /// Elevation angle in degrees.
    Elevation,
    MissilesRemaining,
    /// Control-only; accepts a handle at registration, never published to.
    Trigger,
}

/// Attribute surface of a hub-owned light mirrored to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectedLightKind {
    /// On/off only.
    Binary,
    /// On/off, brightness, color temperature.
    TemperatureVariable,
    /// On/off, brightness, color temperature, color.
    ColorVariable,
}
