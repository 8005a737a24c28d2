//! In-memory stand-in for the microcontroller board.

use std::collections::VecDeque;

use minilink_core::Transport;
use minilink_protocol::field::push_uint;
use minilink_protocol::{LightRequest, Message, PowerAction, RawMessage};
use tracing::debug;

/// Simulated board behind the [`Transport`] port.
///
/// Inbound traffic is scripted with [`VirtualBoard::script`]; outbound frames
/// are captured for inspection. With echo enabled, every power command is
/// answered with the matching state report, the way the firmware confirms a
/// relay write, so the daemon runs a full feedback loop without hardware.
#[derive(Debug, Default)]
pub struct VirtualBoard {
    incoming: VecDeque<u8>,
    partial: Vec<u8>,
    frames: Vec<Vec<u8>>,
    echo: bool,
}

impl VirtualBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer power commands with the matching state report.
    #[must_use]
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Queue bytes as if the board had sent them.
    pub fn script(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes);
    }

    /// Every complete frame written to the board so far, terminators included.
    #[must_use]
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    fn complete_frame(&mut self, frame: Vec<u8>) {
        if self.echo {
            self.echo_power_command(&frame);
        }
        self.frames.push(frame);
    }

    /// A power command (`0 id 00 s`) parses under the inbound layout as a
    /// light power request with the same field positions; that is enough to
    /// recover the id and state for the confirmation report (`1 id 01 s`).
    fn echo_power_command(&mut self, frame: &[u8]) {
        let body = frame.strip_suffix(b"\n").unwrap_or(frame);
        if frame.first() != Some(&b'0') {
            return;
        }
        let message = Message::parse(&RawMessage::from(body));
        if let Message::Light {
            id,
            request: LightRequest::Power(action),
        } = message
        {
            let on = match action {
                PowerAction::On => true,
                PowerAction::Off => false,
                PowerAction::Toggle => return,
            };
            debug!(%id, on, "echoing power state report");
            let mut report = Vec::with_capacity(8);
            report.push(b'1');
            push_uint(&mut report, u32::from(id.value()), 2);
            report.extend_from_slice(b"01");
            report.push(if on { b'1' } else { b'0' });
            report.push(b'\n');
            self.incoming.extend(report);
        }
    }
}

impl Transport for VirtualBoard {
    fn read_byte(&mut self) -> Option<u8> {
        self.incoming.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.partial.push(byte);
        if byte == b'\n' {
            let frame = std::mem::take(&mut self.partial);
            self.complete_frame(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_replay_scripted_bytes() {
        let mut board = VirtualBoard::new();
        board.script(b"102071\n");

        let bytes: Vec<u8> = std::iter::from_fn(|| board.read_byte()).collect();
        assert_eq!(bytes, b"102071\n");
    }

    #[test]
    fn should_capture_written_frames() {
        let mut board = VirtualBoard::new();
        board.write_frame(b"300\n");
        board.write_frame(b"007001\n");

        assert_eq!(board.frames(), [b"300\n".to_vec(), b"007001\n".to_vec()]);
    }

    #[test]
    fn should_echo_power_command_as_state_report() {
        let mut board = VirtualBoard::new().with_echo();
        board.write_frame(b"007001\n");

        let bytes: Vec<u8> = std::iter::from_fn(|| board.read_byte()).collect();
        assert_eq!(bytes, b"107011\n");
    }

    #[test]
    fn should_echo_power_off() {
        let mut board = VirtualBoard::new().with_echo();
        board.write_frame(b"042000\n");

        let bytes: Vec<u8> = std::iter::from_fn(|| board.read_byte()).collect();
        assert_eq!(bytes, b"142010\n");
    }

    #[test]
    fn should_not_echo_non_power_commands() {
        let mut board = VirtualBoard::new().with_echo();
        board.write_frame(b"300\n");
        board.write_frame(b"008012\n"); // alarm mode, not a power command
        board.write_frame(b"102001\n"); // light forward, opcode 1

        assert_eq!(board.read_byte(), None);
    }

    #[test]
    fn should_not_echo_when_disabled() {
        let mut board = VirtualBoard::new();
        board.write_frame(b"007001\n");

        assert_eq!(board.read_byte(), None);
    }
}
