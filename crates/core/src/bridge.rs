//! The bridge state machine: accumulate, parse, dispatch.
//!
//! One [`Bridge`] serves one serial link. The caller owns the transport and
//! passes it into each operation; a single task is expected to drive polls
//! and control requests, which keeps one writer on the wire.
//!
//! Dispatch is deliberately forgiving: unknown opcodes, unknown sub-opcodes,
//! unregistered ids, and empty lines fall through without a side effect or an
//! error. The board and the daemon restart independently and neither end can
//! assume the other's device table.

use minilink_protocol::{
    Command, CommunicationId, LightRequest, Message, PowerAction, RawMessage, StateReport,
};
use minilink_protocol::{Accumulator, FieldError};
use tracing::{debug, info, warn};

use crate::control::ControlRequest;
use crate::device::LauncherPart;
use crate::ports::{HubLink, ServiceCall, Transport};
use crate::registry::DeviceRegistry;

/// Decode discipline for inbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Best-effort decode; malformed fields yield deterministic values.
    #[default]
    Lenient,
    /// Drop frames with malformed fields instead of fabricating values.
    Strict,
}

/// Dispatcher for one serial link.
pub struct Bridge<H> {
    hub: H,
    registry: DeviceRegistry,
    accumulator: Accumulator,
    mode: DecodeMode,
    synchronized: bool,
}

impl<H: HubLink> Bridge<H> {
    #[must_use]
    pub fn new(hub: H, registry: DeviceRegistry) -> Self {
        Self {
            hub,
            registry,
            accumulator: Accumulator::new(),
            mode: DecodeMode::Lenient,
            synchronized: false,
        }
    }

    /// Switch the inbound decode discipline.
    #[must_use]
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Drain the transport and dispatch every completed message.
    ///
    /// Emits the synchronization handshake first if it has not been sent
    /// since startup or the last resynchronization request.
    pub fn poll<T: Transport>(&mut self, transport: &mut T) {
        self.ensure_synchronized(transport);
        while let Some(byte) = transport.read_byte() {
            if let Some(raw) = self.accumulator.feed(byte) {
                self.dispatch(&raw);
            }
        }
    }

    /// Apply a hub-side control request, encoding it onto the wire.
    pub fn apply<T: Transport>(&mut self, transport: &mut T, request: ControlRequest) {
        let command = match request {
            ControlRequest::SetPower { id, on } => Command::SetPower { id, on },
            ControlRequest::SetAlarmMode { id, mode } => Command::SetAlarmMode { id, mode },
            ControlRequest::SetStripColor { id, color } => Command::SetStripColor { id, color },
            ControlRequest::SetStripEffect { id, effect } => Command::SetStripEffect { id, effect },
            ControlRequest::PointLauncherBase { id, angle } => {
                Command::PointLauncherBase { id, angle }
            }
            ControlRequest::PointLauncherElevation { id, angle } => {
                Command::PointLauncherElevation { id, angle }
            }
            ControlRequest::FireMissiles { id, count } => Command::FireMissiles { id, count },
            ControlRequest::SetMuted { id, muted } => Command::SetMuted { id, muted },
            ControlRequest::SetVolume { id, volume } => Command::SetVolume { id, volume },
            ControlRequest::VolumeUp { id } => Command::VolumeUp { id },
            ControlRequest::VolumeDown { id } => Command::VolumeDown { id },
            ControlRequest::LightPower { entity_id, on } => {
                let Some(id) = self.light_slot(&entity_id) else {
                    return;
                };
                Command::LightPower { id, on }
            }
            ControlRequest::LightBrightness {
                entity_id,
                brightness,
            } => {
                let Some(id) = self.light_slot(&entity_id) else {
                    return;
                };
                Command::LightBrightness { id, brightness }
            }
            ControlRequest::LightTemperature { entity_id, kelvin } => {
                let Some(id) = self.light_slot(&entity_id) else {
                    return;
                };
                Command::LightTemperature { id, kelvin }
            }
            ControlRequest::LightColor { entity_id, color } => {
                let Some(id) = self.light_slot(&entity_id) else {
                    return;
                };
                Command::LightColor { id, color }
            }
            ControlRequest::Resync => {
                self.synchronized = false;
                return;
            }
        };
        let frame = command.encode();
        debug!(frame = %String::from_utf8_lossy(frame.trim_ascii_end()), "sending command");
        transport.write_frame(&frame);
    }

    fn ensure_synchronized<T: Transport>(&mut self, transport: &mut T) {
        if !self.synchronized {
            self.synchronized = true;
            info!("announcing synchronization to the board");
            transport.write_frame(&Command::Handshake.encode());
        }
    }

    fn light_slot(&self, entity_id: &str) -> Option<CommunicationId> {
        let slot = self.registry.connected_light_slot(entity_id);
        if slot.is_none() {
            debug!(entity_id, "state change for unmapped hub entity");
        }
        slot
    }

    fn dispatch(&mut self, raw: &RawMessage) {
        if raw.is_empty() {
            return;
        }
        debug!(frame = %raw.printable(), "received message");
        let message = match self.mode {
            DecodeMode::Lenient => Message::parse(raw),
            DecodeMode::Strict => match Message::parse_strict(raw) {
                Ok(message) => message,
                Err(error) => {
                    self.reject(raw, &error);
                    return;
                }
            },
        };
        self.handle(message);
    }

    fn reject(&self, raw: &RawMessage, error: &FieldError) {
        warn!(frame = %raw.printable(), %error, "rejected malformed message");
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Light { id, request } => self.handle_light(id, request),
            Message::Report { id, report } => self.handle_report(id, report),
            Message::Announce { text } => {
                self.hub
                    .call_service(ServiceCall::new("tts.speak").with("message", text));
            }
            Message::PlayUrl { url } => {
                self.hub
                    .call_service(ServiceCall::new("media.play_url").with("url", url));
            }
            Message::Power { restart } => {
                let flag = if restart { "true" } else { "false" };
                self.hub
                    .call_service(ServiceCall::new("system.shutdown").with("restart", flag));
            }
            Message::Resync => {
                info!("board requested resynchronization");
                self.synchronized = false;
            }
            Message::Unknown => {}
        }
    }

    fn handle_light(&mut self, id: CommunicationId, request: LightRequest) {
        let Some(light) = self.registry.connected_light(id) else {
            return;
        };
        let call = match request {
            LightRequest::Power(PowerAction::Off) => ServiceCall::new("light.turn_off"),
            LightRequest::Power(PowerAction::On) => ServiceCall::new("light.turn_on"),
            LightRequest::Power(PowerAction::Toggle) => ServiceCall::new("light.toggle"),
            LightRequest::Brightness(value) => {
                ServiceCall::new("light.turn_on").with("brightness", value.to_string())
            }
            LightRequest::Temperature(kelvin) => {
                ServiceCall::new("light.turn_on").with("color_temp", kelvin.to_string())
            }
            LightRequest::Color(color) => {
                ServiceCall::new("light.turn_on").with("rgb_color", color.to_string())
            }
        };
        self.hub
            .call_service(call.with("entity_id", light.entity_id.clone()));
    }

    fn handle_report(&mut self, id: CommunicationId, report: StateReport) {
        match report {
            StateReport::Power { on } => self.route_power(id, on),
            StateReport::StripColor(color) => {
                if let Some(strip) = self.registry.rgb_strip(id) {
                    strip.publish_color(color);
                }
            }
            StateReport::StripEffect(effect) => {
                if let Some(strip) = self.registry.rgb_strip(id) {
                    strip.publish_effect(effect);
                }
            }
            StateReport::AlarmState(state) => {
                if let Some(panel) = self.registry.alarm_panel(id) {
                    panel.publish_state(state);
                }
            }
            StateReport::LauncherBase(value) => {
                self.publish_launcher(id, LauncherPart::Base, value);
            }
            StateReport::LauncherElevation(value) => {
                self.publish_launcher(id, LauncherPart::Elevation, value);
            }
            StateReport::MissilesRemaining(value) => {
                self.publish_launcher(id, LauncherPart::MissilesRemaining, value);
            }
            StateReport::Muted { muted } => {
                if let Some(television) = self.registry.television(id) {
                    television.publish_muted(muted);
                }
            }
            StateReport::Volume(volume) => {
                if let Some(television) = self.registry.television(id) {
                    television.publish_volume(volume);
                }
            }
            StateReport::BinarySensor { on } => {
                if let Some(sensor) = self.registry.binary_sensor(id) {
                    sensor.publish_state(on);
                }
            }
            StateReport::AnalogRaw(value) => {
                if let Some(sensor) = self.registry.analog_sensor(id) {
                    sensor.publish_value(f64::from(value));
                }
            }
            StateReport::AnalogPair { first, second } => {
                self.publish_analog_pair(id, first, second);
            }
        }
    }

    /// Priority routing for the shared binary state path: the first category
    /// containing the id wins and the rest are never consulted.
    fn route_power(&self, id: CommunicationId, on: bool) {
        if let Some(switch) = self.registry.switch(id) {
            switch.publish_power(on);
        } else if let Some(panel) = self.registry.alarm_panel(id) {
            panel.publish_armed(on);
        } else if let Some(television) = self.registry.television(id) {
            television.publish_power(on);
        } else if let Some(strip) = self.registry.rgb_strip(id) {
            strip.publish_power(on);
        }
    }

    /// The primary sensor at `id` gates the pair; the companion at `id + 1`
    /// is optional. Both values arrive as hundredths.
    fn publish_analog_pair(&self, id: CommunicationId, first: u32, second: u32) {
        let Some(primary) = self.registry.analog_sensor(id) else {
            return;
        };
        primary.publish_value(f64::from(first) / 100.0);
        if let Some(companion) = self.registry.analog_sensor(id.companion()) {
            companion.publish_value(f64::from(second) / 100.0);
        }
    }

    fn publish_launcher(&self, id: CommunicationId, part: LauncherPart, value: u32) {
        if let Some(handle) = self.registry.launcher_part(id, part) {
            handle.publish_value(value);
        }
    }
}
