//! # minilink-protocol
//!
//! Wire protocol spoken between the minilink daemon and the microcontroller
//! board over a serial line.
//!
//! A message is a run of ASCII digit bytes (free-text payloads excepted)
//! terminated by a line feed. Carriage returns are noise and never reach the
//! decoder. Numeric fields are big-endian base-10 digit runs addressed by
//! `(position, length)` over the complete message, zero-padded on encode.
//!
//! ## Responsibilities
//! - Accumulate the raw byte stream into complete messages ([`Accumulator`])
//! - Decode and encode fixed-width digit fields ([`field`])
//! - Parse inbound messages into a closed type ([`Message`])
//! - Encode outbound commands ([`Command`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! Transports and hub links live in adapter crates; the dispatcher lives in
//! `minilink-core`.

pub mod accumulator;
pub mod command;
pub mod field;
pub mod message;
pub mod types;

pub use accumulator::{Accumulator, MAX_MESSAGE_LEN, RawMessage};
pub use command::Command;
pub use field::FieldError;
pub use message::{LightRequest, Message, StateReport};
pub use types::{AlarmState, ArmMode, CommunicationId, PowerAction, Rgb};
