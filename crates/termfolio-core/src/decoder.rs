//! Raw keystroke decoding.
//!
//! [`decode`] turns the payload of one inbound raw frame into exactly one
//! [`InputEvent`]. Decoding never fails: anything outside the fixed table
//! becomes [`InputEvent::Unrecognized`].
//!
//! A frame is decoded as a single unit. When a frame holds more than one
//! keystroke (a paste burst, or a client that batches writes) only its first
//! byte is considered, so `"abc"` decodes to `Char('a')`.

use crate::event::InputEvent;

const ESC: u8 = 0x1b;
const BS: u8 = 0x08;
const DEL: u8 = 0x7f;

/// Decode one raw frame into an input event.
///
/// | bytes | event |
/// |---|---|
/// | `ESC [ A` / `B` / `C` / `D` | arrows |
/// | `CR` or `LF` | [`InputEvent::Enter`] |
/// | lone `ESC` | [`InputEvent::Escape`] |
/// | `DEL` or `BS` | [`InputEvent::Backspace`] |
/// | `' '` | [`InputEvent::Space`] |
/// | other printable ASCII byte | [`InputEvent::Char`] |
///
/// Multi-byte sequences outside the table yield their first byte as a
/// `Char` when it is printable, and [`InputEvent::Unrecognized`] otherwise.
pub fn decode(bytes: &[u8]) -> InputEvent {
    match bytes {
        [ESC, b'[', b'A'] => InputEvent::ArrowUp,
        [ESC, b'[', b'B'] => InputEvent::ArrowDown,
        [ESC, b'[', b'C'] => InputEvent::ArrowRight,
        [ESC, b'[', b'D'] => InputEvent::ArrowLeft,
        [b'\r'] | [b'\n'] => InputEvent::Enter,
        [ESC] => InputEvent::Escape,
        [DEL] | [BS] => InputEvent::Backspace,
        [b' '] => InputEvent::Space,
        [first, ..] => printable(*first),
        [] => InputEvent::Unrecognized,
    }
}

fn printable(byte: u8) -> InputEvent {
    match byte {
        b' ' => InputEvent::Space,
        0x21..=0x7e => InputEvent::Char(byte as char),
        _ => InputEvent::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_sequences() {
        assert_eq!(decode(b"\x1b[A"), InputEvent::ArrowUp);
        assert_eq!(decode(b"\x1b[B"), InputEvent::ArrowDown);
        assert_eq!(decode(b"\x1b[C"), InputEvent::ArrowRight);
        assert_eq!(decode(b"\x1b[D"), InputEvent::ArrowLeft);
    }

    #[test]
    fn enter_escape_backspace_space() {
        assert_eq!(decode(b"\r"), InputEvent::Enter);
        assert_eq!(decode(b"\n"), InputEvent::Enter);
        assert_eq!(decode(b"\x1b"), InputEvent::Escape);
        assert_eq!(decode(b"\x7f"), InputEvent::Backspace);
        assert_eq!(decode(b"\x08"), InputEvent::Backspace);
        assert_eq!(decode(b" "), InputEvent::Space);
    }

    #[test]
    fn every_printable_byte_is_a_char() {
        for byte in 0x21u8..=0x7e {
            assert_eq!(decode(&[byte]), InputEvent::Char(byte as char), "byte {byte:#x}");
        }
    }

    #[test]
    fn control_bytes_are_unrecognized() {
        assert_eq!(decode(b"\x01"), InputEvent::Unrecognized);
        assert_eq!(decode(b"\x03"), InputEvent::Unrecognized);
        assert_eq!(decode(b"\x00"), InputEvent::Unrecognized);
    }

    #[test]
    fn empty_frame_is_unrecognized() {
        assert_eq!(decode(b""), InputEvent::Unrecognized);
    }

    #[test]
    fn multi_byte_frame_uses_first_byte() {
        assert_eq!(decode(b"abc"), InputEvent::Char('a'));
        assert_eq!(decode(b"q\r"), InputEvent::Char('q'));
    }

    #[test]
    fn unknown_escape_sequence_is_unrecognized() {
        // F1 (ESC O P) and Home (ESC [ H) are not in the table.
        assert_eq!(decode(b"\x1bOP"), InputEvent::Unrecognized);
        assert_eq!(decode(b"\x1b[H"), InputEvent::Unrecognized);
    }

    #[test]
    fn non_ascii_is_unrecognized() {
        assert_eq!(decode("é".as_bytes()), InputEvent::Unrecognized);
    }
}
