//! Typed inbound messages (board to hub).
//!
//! Parsing is total by default: unknown opcodes and sub-opcodes come back as
//! [`Message::Unknown`] and field decoding follows the lenient rules of
//! [`crate::field`], so a malformed frame can never fail the stream. The
//! strict variant rejects frames where the lenient path would fabricate
//! values.
//!
//! Inbound layout, by opcode at position 0:
//!
//! | Opcode | Fields | Meaning |
//! |--------|--------|---------|
//! | `0` | `id[1,2] sub[3,2] …` | act on a hub-owned light |
//! | `1` | `id[1,2] sub[3,2] …` | state report for a board device |
//! | `2` | `text[1..]` | speak this text |
//! | `3` | `sub[1,2] …` | resynchronize / host power |
//! | `4` | `url[1..]` | play this media URL |

use crate::accumulator::RawMessage;
use crate::field::{FieldError, read_uint, read_uint_strict};
use crate::types::{AlarmState, CommunicationId, PowerAction, Rgb};

/// Request the board issues against a hub-owned light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRequest {
    Power(PowerAction),
    /// Brightness, hub scale 0–255.
    Brightness(u32),
    /// Color temperature in kelvin.
    Temperature(u32),
    Color(Rgb),
}

/// State carried by a board device report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateReport {
    /// Sub-opcode 01 — binary power state, routed by registry priority.
    Power { on: bool },
    /// Sub-opcode 02, select 0.
    StripColor(Rgb),
    /// Sub-opcode 02, select 1.
    StripEffect(u8),
    /// Sub-opcode 03, select 0.
    AlarmState(AlarmState),
    /// Sub-opcode 03, select 1 — base angle in degrees.
    LauncherBase(u32),
    /// Sub-opcode 03, select 2 — elevation angle in degrees.
    LauncherElevation(u32),
    /// Sub-opcode 03, select 3.
    MissilesRemaining(u32),
    /// Sub-opcode 04, select 0.
    Muted { muted: bool },
    /// Sub-opcode 04, select 1.
    Volume(u32),
    /// Sub-opcode 07.
    BinarySensor { on: bool },
    /// Sub-opcode 08 — raw analog value.
    AnalogRaw(u32),
    /// Sub-opcode 09 — paired sample; both values are hundredths.
    AnalogPair { first: u32, second: u32 },
}

/// A complete inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Opcode 0 — act on a hub-owned light.
    Light {
        id: CommunicationId,
        request: LightRequest,
    },
    /// Opcode 1 — state report for a board-owned device.
    Report {
        id: CommunicationId,
        report: StateReport,
    },
    /// Opcode 2 — speak this text.
    Announce { text: String },
    /// Opcode 3, sub 01 — re-emit the synchronization handshake.
    Resync,
    /// Opcode 3, sub 02 — host power request.
    Power { restart: bool },
    /// Opcode 4 — play this media URL.
    PlayUrl { url: String },
    /// Unrecognized opcode or sub-opcode; dropped by the dispatcher.
    Unknown,
}

impl Message {
    /// Decode a raw message, absorbing malformed input.
    #[must_use]
    pub fn parse(raw: &RawMessage) -> Self {
        let mut reader = Reader {
            bytes: raw.as_bytes(),
            strict: false,
            failure: None,
        };
        parse_with(&mut reader)
    }

    /// Decode a raw message, rejecting malformed fields.
    ///
    /// Unknown opcodes and sub-opcodes still come back as
    /// [`Message::Unknown`]; only fields the layout actually references are
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] encountered where the lenient path
    /// would have fabricated a value.
    pub fn parse_strict(raw: &RawMessage) -> Result<Self, FieldError> {
        let mut reader = Reader {
            bytes: raw.as_bytes(),
            strict: true,
            failure: None,
        };
        let message = parse_with(&mut reader);
        match reader.failure {
            Some(error) => Err(error),
            None => Ok(message),
        }
    }
}

/// Field cursor over one message, recording the first strict failure.
struct Reader<'a> {
    bytes: &'a [u8],
    strict: bool,
    failure: Option<FieldError>,
}

impl Reader<'_> {
    fn uint(&mut self, position: usize, length: usize) -> u32 {
        if self.strict && self.failure.is_none() {
            if let Err(error) = read_uint_strict(self.bytes, position, length) {
                self.failure = Some(error);
            }
        }
        read_uint(self.bytes, position, length)
    }

    fn device_id(&mut self) -> CommunicationId {
        CommunicationId::from_wire(self.uint(1, 2))
    }

    fn rgb(&mut self, position: usize) -> Rgb {
        Rgb::from_wire(
            self.uint(position, 3),
            self.uint(position + 3, 3),
            self.uint(position + 6, 3),
        )
    }
}

fn parse_with(reader: &mut Reader<'_>) -> Message {
    let Some(opcode) = reader.bytes.first() else {
        return Message::Unknown;
    };
    match opcode {
        b'0' => parse_light(reader),
        b'1' => parse_report(reader),
        b'2' => Message::Announce {
            text: text_payload(reader.bytes),
        },
        b'3' => parse_system(reader),
        b'4' => Message::PlayUrl {
            url: text_payload(reader.bytes),
        },
        _ => Message::Unknown,
    }
}

fn text_payload(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&bytes[1..]).into_owned()
}

/// Opcode 0: `sub[3,2]` selects the request.
///
/// | Sub | Fields | Request |
/// |-----|--------|---------|
/// | 00 | `action[5,1]` | power (0 off, 1 on, 2 toggle) |
/// | 04 | `select[5,1]` | 0 brightness `[6,3]`, 1 temperature `[6,4]` |
/// | 05 | `select[5,1]` | 0 color `[6,3][9,3][12,3]`, 1 temperature `[6,4]`, 2 brightness `[6,3]` |
fn parse_light(reader: &mut Reader<'_>) -> Message {
    let id = reader.device_id();
    let request = match reader.uint(3, 2) {
        0 => match PowerAction::from_digit(reader.uint(5, 1)) {
            Some(action) => LightRequest::Power(action),
            None => return Message::Unknown,
        },
        4 => match reader.uint(5, 1) {
            0 => LightRequest::Brightness(reader.uint(6, 3)),
            1 => LightRequest::Temperature(reader.uint(6, 4)),
            _ => return Message::Unknown,
        },
        5 => match reader.uint(5, 1) {
            0 => LightRequest::Color(reader.rgb(6)),
            1 => LightRequest::Temperature(reader.uint(6, 4)),
            2 => LightRequest::Brightness(reader.uint(6, 3)),
            _ => return Message::Unknown,
        },
        _ => return Message::Unknown,
    };
    Message::Light { id, request }
}

/// Opcode 1: `sub[3,2]` selects the report.
///
/// | Sub | Fields | Report |
/// |-----|--------|--------|
/// | 01 | `state[5,1]` | binary power state |
/// | 02 | `select[5,1]` | 0 strip color, 1 strip effect `[6,2]` |
/// | 03 | `select[5,1]` | 0 alarm state `[6,1]`, 1 base `[6,3]`, 2 elevation `[6,3]`, 3 missiles `[6,1]` |
/// | 04 | `select[5,1]` | 0 muted `[6,1]`, 1 volume `[6,3]` |
/// | 07 | `state[5,1]` | binary sensor |
/// | 08 | `value[5,4]` | raw analog value |
/// | 09 | `first[5,4] second[9,4]` | paired analog sample |
fn parse_report(reader: &mut Reader<'_>) -> Message {
    let id = reader.device_id();
    let report = match reader.uint(3, 2) {
        1 => StateReport::Power {
            on: reader.uint(5, 1) != 0,
        },
        2 => match reader.uint(5, 1) {
            0 => StateReport::StripColor(reader.rgb(6)),
            1 => StateReport::StripEffect(narrow_effect(reader.uint(6, 2))),
            _ => return Message::Unknown,
        },
        3 => match reader.uint(5, 1) {
            0 => match AlarmState::from_digit(reader.uint(6, 1)) {
                Some(state) => StateReport::AlarmState(state),
                None => return Message::Unknown,
            },
            1 => StateReport::LauncherBase(reader.uint(6, 3)),
            2 => StateReport::LauncherElevation(reader.uint(6, 3)),
            3 => StateReport::MissilesRemaining(reader.uint(6, 1)),
            _ => return Message::Unknown,
        },
        4 => match reader.uint(5, 1) {
            0 => StateReport::Muted {
                muted: reader.uint(6, 1) != 0,
            },
            1 => StateReport::Volume(reader.uint(6, 3)),
            _ => return Message::Unknown,
        },
        7 => StateReport::BinarySensor {
            on: reader.uint(5, 1) != 0,
        },
        8 => StateReport::AnalogRaw(reader.uint(5, 4)),
        9 => StateReport::AnalogPair {
            first: reader.uint(5, 4),
            second: reader.uint(9, 4),
        },
        _ => return Message::Unknown,
    };
    Message::Report { id, report }
}

/// Opcode 3: `sub[1,2]` — 01 resync, 02 host power with `restart[3,1]`.
fn parse_system(reader: &mut Reader<'_>) -> Message {
    match reader.uint(1, 2) {
        1 => Message::Resync,
        2 => Message::Power {
            restart: reader.uint(3, 1) != 0,
        },
        _ => Message::Unknown,
    }
}

fn narrow_effect(value: u32) -> u8 {
    u8::try_from(value.min(99)).unwrap_or(99)
}
