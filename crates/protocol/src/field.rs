//! Fixed-width ASCII-digit field primitives.
//!
//! Every numeric field on the wire is a big-endian base-10 digit run addressed
//! by `(position, length)` over a complete message. Decoding is best-effort:
//! bytes past the end of the message read as zero and non-digit bytes
//! contribute their wrapped distance from `b'0'`, so malformed input yields a
//! deterministic value instead of a failure. The strict variant rejects what
//! the lenient one absorbs and is only consulted when strict mode is enabled.

/// Failure modes of strict field decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field extends past the end of the message.
    #[error("field [{position},{length}] out of bounds for a {available}-byte message")]
    OutOfBounds {
        /// First byte offset of the field.
        position: usize,
        /// Declared field width.
        length: usize,
        /// Actual message length.
        available: usize,
    },
    /// A byte inside the field is not an ASCII digit.
    #[error("non-digit byte 0x{byte:02X} at position {position}")]
    NotADigit {
        /// Offset of the offending byte.
        position: usize,
        /// The byte found there.
        byte: u8,
    },
}

/// Read `length` digits starting at `position` as an unsigned value.
///
/// Total function: arithmetic wraps, missing bytes read as `b'0'`, and
/// non-digit bytes contribute `byte.wrapping_sub(b'0')`. Garbage in,
/// deterministic garbage out.
#[must_use]
pub fn read_uint(message: &[u8], position: usize, length: usize) -> u32 {
    let mut value = 0u32;
    for index in 0..length {
        let byte = position
            .checked_add(index)
            .and_then(|offset| message.get(offset))
            .copied()
            .unwrap_or(b'0');
        let digit = u32::from(byte.wrapping_sub(b'0'));
        value = value.wrapping_mul(10).wrapping_add(digit);
    }
    value
}

/// Strict variant of [`read_uint`].
///
/// # Errors
///
/// Returns [`FieldError::OutOfBounds`] when the field does not fit inside the
/// message and [`FieldError::NotADigit`] when a byte inside the field is not
/// an ASCII digit.
pub fn read_uint_strict(
    message: &[u8],
    position: usize,
    length: usize,
) -> Result<u32, FieldError> {
    let end = match position.checked_add(length) {
        Some(end) if end <= message.len() => end,
        _ => {
            return Err(FieldError::OutOfBounds {
                position,
                length,
                available: message.len(),
            });
        }
    };

    let mut value = 0u32;
    for (offset, byte) in message[position..end].iter().copied().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(FieldError::NotADigit {
                position: position + offset,
                byte,
            });
        }
        value = value
            .wrapping_mul(10)
            .wrapping_add(u32::from(byte - b'0'));
    }
    Ok(value)
}

/// Append `value` in decimal, left-padded with `'0'` to `width`.
///
/// Padding only ever grows: a value wider than `width` is appended in full,
/// never truncated.
pub fn push_uint(buffer: &mut Vec<u8>, value: u32, width: usize) {
    let digits = value.to_string();
    buffer.extend(std::iter::repeat_n(
        b'0',
        width.saturating_sub(digits.len()),
    ));
    buffer.extend_from_slice(digits.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u32, width: usize) -> Vec<u8> {
        let mut buffer = Vec::new();
        push_uint(&mut buffer, value, width);
        buffer
    }

    // ── Lenient decoding ────────────────────────────────────────────────

    #[test]
    fn should_read_multi_digit_field() {
        assert_eq!(read_uint(b"102071", 1, 2), 2);
        assert_eq!(read_uint(b"102071", 3, 2), 7);
        assert_eq!(read_uint(b"102071", 5, 1), 1);
    }

    #[test]
    fn should_read_leading_zeros_as_value() {
        assert_eq!(read_uint(b"0042", 0, 4), 42);
    }

    #[test]
    fn should_read_out_of_range_bytes_as_zero() {
        assert_eq!(read_uint(b"17", 0, 4), 1700);
        assert_eq!(read_uint(b"", 0, 3), 0);
        assert_eq!(read_uint(b"9", 5, 2), 0);
    }

    #[test]
    fn should_read_position_overflow_as_zero() {
        assert_eq!(read_uint(b"123", usize::MAX, 2), 0);
    }

    #[test]
    fn should_decode_garbage_deterministically() {
        let soup = b"\x00A?\xFF";
        assert_eq!(read_uint(soup, 0, 4), read_uint(soup, 0, 4));
    }

    // ── Strict decoding ─────────────────────────────────────────────────

    #[test]
    fn should_strict_read_clean_field() {
        assert_eq!(read_uint_strict(b"102071", 1, 2), Ok(2));
        assert_eq!(read_uint_strict(b"9999", 0, 4), Ok(9999));
    }

    #[test]
    fn should_strict_reject_short_message() {
        let err = read_uint_strict(b"12", 1, 2).unwrap_err();
        assert_eq!(
            err,
            FieldError::OutOfBounds {
                position: 1,
                length: 2,
                available: 2
            }
        );
    }

    #[test]
    fn should_strict_reject_non_digit() {
        let err = read_uint_strict(b"1A3", 0, 3).unwrap_err();
        assert_eq!(
            err,
            FieldError::NotADigit {
                position: 1,
                byte: b'A'
            }
        );
    }

    #[test]
    fn should_strict_match_lenient_on_clean_input() {
        let message = b"0070014321";
        for (position, length) in [(0, 1), (1, 2), (3, 2), (5, 1), (6, 4)] {
            assert_eq!(
                read_uint_strict(message, position, length),
                Ok(read_uint(message, position, length))
            );
        }
    }

    // ── Encoding ────────────────────────────────────────────────────────

    #[test]
    fn should_pad_narrow_value_with_zeros() {
        assert_eq!(encoded(7, 2), b"07");
        assert_eq!(encoded(0, 3), b"000");
        assert_eq!(encoded(42, 4), b"0042");
    }

    #[test]
    fn should_never_truncate_wide_value() {
        assert_eq!(encoded(123, 2), b"123");
        assert_eq!(encoded(1000, 1), b"1000");
    }

    #[test]
    fn should_round_trip_values_within_width() {
        for width in 1..=4usize {
            let limit = 10u32.pow(u32::try_from(width).unwrap());
            for value in [0, 1, 7, limit / 2, limit - 1] {
                let bytes = encoded(value, width);
                assert_eq!(bytes.len(), width);
                assert_eq!(read_uint(&bytes, 0, width), value, "width {width}");
            }
        }
    }
}
