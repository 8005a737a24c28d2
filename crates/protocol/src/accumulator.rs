//! Incremental line framing for the serial byte stream.
//!
//! The board terminates every message with a line feed and may interleave
//! carriage returns depending on its serial library; those are stripped
//! wherever they appear. Feeding the stream one byte at a time yields exactly
//! the messages that deleting `\r` and splitting on `\n` would yield.

use std::borrow::Cow;

/// Upper bound on a single accumulated message.
///
/// Real traffic stays far below this; the bound exists so a stream that never
/// sends a terminator cannot grow the buffer without limit. Overflowing bytes
/// are discarded and the truncated message still completes on the next `\n`.
pub const MAX_MESSAGE_LEN: usize = 256;

/// A complete message as accumulated off the wire, terminator already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage(Vec<u8>);

impl RawMessage {
    /// Message bytes, without the line feed.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 view for logging.
    #[must_use]
    pub fn printable(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<Vec<u8>> for RawMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for RawMessage {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Accumulates bytes until a line feed completes a message.
#[derive(Debug, Default)]
pub struct Accumulator {
    buffer: Vec<u8>,
    overflowed: bool,
}

impl Accumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns the completed message when `byte` is `\n`.
    ///
    /// Carriage returns are discarded, every other byte is appended up to
    /// [`MAX_MESSAGE_LEN`]. An empty line completes as an empty message.
    pub fn feed(&mut self, byte: u8) -> Option<RawMessage> {
        match byte {
            b'\r' => None,
            b'\n' => {
                self.overflowed = false;
                Some(RawMessage(std::mem::take(&mut self.buffer)))
            }
            _ if self.buffer.len() >= MAX_MESSAGE_LEN => {
                if !self.overflowed {
                    self.overflowed = true;
                    tracing::warn!(limit = MAX_MESSAGE_LEN, "message exceeds length bound, truncating");
                }
                None
            }
            _ => {
                self.buffer.push(byte);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(bytes: &[u8]) -> Vec<RawMessage> {
        let mut accumulator = Accumulator::new();
        bytes
            .iter()
            .filter_map(|byte| accumulator.feed(*byte))
            .collect()
    }

    /// Reference framing: delete `\r`, split on `\n`, drop the unterminated tail.
    fn split_reference(bytes: &[u8]) -> Vec<Vec<u8>> {
        let stripped: Vec<u8> = bytes.iter().copied().filter(|byte| *byte != b'\r').collect();
        let mut messages: Vec<Vec<u8>> = stripped
            .split(|byte| *byte == b'\n')
            .map(<[u8]>::to_vec)
            .collect();
        // split() yields a trailing fragment after the last terminator;
        // the accumulator keeps that fragment pending instead.
        messages.pop();
        messages
    }

    // ── Framing ─────────────────────────────────────────────────────────

    #[test]
    fn should_complete_message_on_line_feed() {
        let messages = feed_all(b"102071\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].as_bytes(), b"102071");
    }

    #[test]
    fn should_strip_carriage_returns() {
        let messages = feed_all(b"10\r2071\r\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].as_bytes(), b"102071");
    }

    #[test]
    fn should_hold_partial_message_until_terminated() {
        let mut accumulator = Accumulator::new();
        for byte in b"10207" {
            assert_eq!(accumulator.feed(*byte), None);
        }
        let message = accumulator.feed(b'\n').unwrap();
        assert_eq!(message.as_bytes(), b"10207");
    }

    #[test]
    fn should_emit_empty_message_for_blank_line() {
        let messages = feed_all(b"\r\n");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_empty());
    }

    #[test]
    fn should_split_back_to_back_messages() {
        let messages = feed_all(b"300\n007001\n2hello\n");
        let bytes: Vec<&[u8]> = messages.iter().map(RawMessage::as_bytes).collect();
        assert_eq!(bytes, vec![&b"300"[..], b"007001", b"2hello"]);
    }

    #[test]
    fn should_match_split_reference_on_byte_soup() {
        let soup: Vec<u8> = b"102071\r\n\n0070\r01\nabc\xFF\r\r\n42"
            .iter()
            .copied()
            .collect();
        let accumulated: Vec<Vec<u8>> = feed_all(&soup)
            .into_iter()
            .map(|message| message.as_bytes().to_vec())
            .collect();
        assert_eq!(accumulated, split_reference(&soup));
    }

    #[test]
    fn should_reset_after_each_message() {
        let mut accumulator = Accumulator::new();
        for byte in b"12\n" {
            accumulator.feed(*byte);
        }
        let second: Vec<RawMessage> = b"34\n"
            .iter()
            .filter_map(|byte| accumulator.feed(*byte))
            .collect();
        assert_eq!(second[0].as_bytes(), b"34");
    }

    // ── Bounds ──────────────────────────────────────────────────────────

    #[test]
    fn should_truncate_oversized_message() {
        let mut accumulator = Accumulator::new();
        for _ in 0..MAX_MESSAGE_LEN + 50 {
            assert_eq!(accumulator.feed(b'7'), None);
        }
        let message = accumulator.feed(b'\n').unwrap();
        assert_eq!(message.len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn should_recover_after_truncated_message() {
        let mut accumulator = Accumulator::new();
        for _ in 0..MAX_MESSAGE_LEN + 50 {
            accumulator.feed(b'7');
        }
        accumulator.feed(b'\n');
        let messages: Vec<RawMessage> = b"300\n"
            .iter()
            .filter_map(|byte| accumulator.feed(*byte))
            .collect();
        assert_eq!(messages[0].as_bytes(), b"300");
    }
}
