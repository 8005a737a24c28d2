//! Outbound command encoding (hub to board).
//!
//! Wire form: opcode digit, two-digit device address (the handshake carries
//! none), remaining path digits, zero-padded payload fields, then `\n`.
//! Encoding is pure and infallible; oversized values widen their field per
//! the padding rules in [`crate::field`].

use crate::field::push_uint;
use crate::types::{ArmMode, CommunicationId, Rgb};

/// A board-bound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Power for a switch, television, or strip (`0 id 00 s`).
    SetPower { id: CommunicationId, on: bool },
    /// Alarm arming mode (`0 id 01 m`).
    SetAlarmMode { id: CommunicationId, mode: ArmMode },
    /// Strip color (`0 id 02 0 rrr ggg bbb`).
    SetStripColor { id: CommunicationId, color: Rgb },
    /// Strip effect (`0 id 02 1 ee`).
    SetStripEffect { id: CommunicationId, effect: u8 },
    /// Launcher base angle in degrees (`0 id 03 1 aaa`).
    PointLauncherBase { id: CommunicationId, angle: u16 },
    /// Launcher elevation angle in degrees (`0 id 03 2 aaa`).
    PointLauncherElevation { id: CommunicationId, angle: u16 },
    /// Fire missiles (`0 id 03 3 c`).
    FireMissiles { id: CommunicationId, count: u8 },
    /// Television mute flag (`0 id 04 0 m`).
    SetMuted { id: CommunicationId, muted: bool },
    /// Absolute television volume (`0 id 04 1 vvv`).
    SetVolume { id: CommunicationId, volume: u8 },
    /// Single volume step up (`0 id 04 2`).
    VolumeUp { id: CommunicationId },
    /// Single volume step down (`0 id 04 3`).
    VolumeDown { id: CommunicationId },
    /// Hub light power forwarded to the board (`1 id 00 s`).
    LightPower { id: CommunicationId, on: bool },
    /// Hub light brightness (`1 id 04 0 vvv`).
    LightBrightness { id: CommunicationId, brightness: u8 },
    /// Hub light color temperature in kelvin (`1 id 04 1 kkkk`).
    LightTemperature { id: CommunicationId, kelvin: u16 },
    /// Hub light color (`1 id 05 0 rrr ggg bbb`).
    LightColor { id: CommunicationId, color: Rgb },
    /// Synchronization handshake (`3 00`).
    Handshake,
}

impl Command {
    /// Encode to wire bytes, including the terminating line feed.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Frame::new();
        match *self {
            Self::SetPower { id, on } => {
                frame.opcode(b'0').id(id).path(b"00").flag(on);
            }
            Self::SetAlarmMode { id, mode } => {
                frame.opcode(b'0').id(id).path(b"01").uint(u32::from(mode.digit()), 1);
            }
            Self::SetStripColor { id, color } => {
                frame.opcode(b'0').id(id).path(b"020").rgb(color);
            }
            Self::SetStripEffect { id, effect } => {
                frame.opcode(b'0').id(id).path(b"021").uint(u32::from(effect), 2);
            }
            Self::PointLauncherBase { id, angle } => {
                frame.opcode(b'0').id(id).path(b"031").uint(u32::from(angle), 3);
            }
            Self::PointLauncherElevation { id, angle } => {
                frame.opcode(b'0').id(id).path(b"032").uint(u32::from(angle), 3);
            }
            Self::FireMissiles { id, count } => {
                frame.opcode(b'0').id(id).path(b"033").uint(u32::from(count), 1);
            }
            Self::SetMuted { id, muted } => {
                frame.opcode(b'0').id(id).path(b"040").flag(muted);
            }
            Self::SetVolume { id, volume } => {
                frame.opcode(b'0').id(id).path(b"041").uint(u32::from(volume), 3);
            }
            Self::VolumeUp { id } => {
                frame.opcode(b'0').id(id).path(b"042");
            }
            Self::VolumeDown { id } => {
                frame.opcode(b'0').id(id).path(b"043");
            }
            Self::LightPower { id, on } => {
                frame.opcode(b'1').id(id).path(b"00").flag(on);
            }
            Self::LightBrightness { id, brightness } => {
                frame.opcode(b'1').id(id).path(b"040").uint(u32::from(brightness), 3);
            }
            Self::LightTemperature { id, kelvin } => {
                frame.opcode(b'1').id(id).path(b"041").uint(u32::from(kelvin), 4);
            }
            Self::LightColor { id, color } => {
                frame.opcode(b'1').id(id).path(b"050").rgb(color);
            }
            Self::Handshake => {
                frame.opcode(b'3').path(b"00");
            }
        }
        frame.finish()
    }
}

/// Byte builder for one outbound frame.
struct Frame(Vec<u8>);

impl Frame {
    fn new() -> Self {
        Self(Vec::with_capacity(16))
    }

    fn opcode(&mut self, digit: u8) -> &mut Self {
        self.0.push(digit);
        self
    }

    fn id(&mut self, id: CommunicationId) -> &mut Self {
        push_uint(&mut self.0, u32::from(id.value()), 2);
        self
    }

    fn path(&mut self, digits: &[u8]) -> &mut Self {
        self.0.extend_from_slice(digits);
        self
    }

    fn uint(&mut self, value: u32, width: usize) -> &mut Self {
        push_uint(&mut self.0, value, width);
        self
    }

    fn flag(&mut self, on: bool) -> &mut Self {
        self.0.push(if on { b'1' } else { b'0' });
        self
    }

    fn rgb(&mut self, color: Rgb) -> &mut Self {
        self.uint(u32::from(color.red), 3)
            .uint(u32::from(color.green), 3)
            .uint(u32::from(color.blue), 3)
    }

    fn finish(self) -> Vec<u8> {
        let mut bytes = self.0;
        bytes.push(b'\n');
        bytes
    }
}
