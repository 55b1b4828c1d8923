use core::ops::RangeInclusive;

use crate::buffer::{ByteBuffer, CharBuffer};
use crate::codecs::{handle_error, CoderError, CoderResult, CodingErrorAction};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::BufferError;

/// U+FFFD REPLACEMENT CHARACTER.
const REPLACEMENT_CHARACTER: u16 = 0xfffd;

/// A [`Decoder`] from UTF-8 bytes to UTF-16 code units.
///
/// Overlong forms, encoded surrogates and values above U+10FFFF are
/// malformed. The reported length is the longest prefix of the bad sequence
/// that could have started a valid one, so decoding resumes at the first
/// byte that broke the sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    action: CodingErrorAction,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a `Utf8Decoder` that handles malformed input with `action`.
    ///
    /// [`CodingErrorAction::Replace`] writes U+FFFD.
    pub fn with_action(action: CodingErrorAction) -> Self {
        Utf8Decoder { action }
    }

    pub fn action(&self) -> CodingErrorAction {
        self.action
    }
}

enum Scan {
    /// A full sequence: scalar value and byte length.
    Complete(u32, usize),
    /// A valid prefix of this many bytes that needs more input.
    Incomplete(usize),
    /// This many bytes cannot start a valid sequence.
    Invalid(usize),
}

fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

/// Second bytes a lead byte permits; rules out overlong forms, surrogates
/// and values past U+10FFFF.
fn second_byte_range(lead: u8) -> RangeInclusive<u8> {
    match lead {
        0xe0 => 0xa0..=0xbf,
        0xed => 0x80..=0x9f,
        0xf0 => 0x90..=0xbf,
        0xf4 => 0x80..=0x8f,
        _ => 0x80..=0xbf,
    }
}

fn scan(seq: &[u8]) -> Scan {
    let lead = seq[0];
    let Some(len) = sequence_len(lead) else {
        return Scan::Invalid(1);
    };
    for k in 1..len {
        let Some(&byte) = seq.get(k) else {
            return Scan::Incomplete(k);
        };
        let valid = if k == 1 {
            second_byte_range(lead).contains(&byte)
        } else {
            byte & 0xc0 == 0x80
        };
        if !valid {
            return Scan::Invalid(k);
        }
    }

    let mut scalar = u32::from(lead) & (0x7f >> len);
    for &byte in &seq[1..len] {
        scalar = (scalar << 6) | u32::from(byte & 0x3f);
    }
    Scan::Complete(scalar, len)
}

impl Decoder for Utf8Decoder {
    fn decode(
        &mut self,
        src: &mut ByteBuffer<'_>,
        dst: &mut CharBuffer<'_>,
        end_of_input: bool,
    ) -> Result<CoderResult, CoderError> {
        while src.has_remaining() {
            let start = src.position();
            let available = src.remaining().min(4);
            let mut seq = [0u8; 4];
            for (k, slot) in seq[..available].iter_mut().enumerate() {
                *slot = src.get_at(start + k)?;
            }

            let error = match scan(&seq[..available]) {
                Scan::Complete(scalar, len) => {
                    if scalar >= 0x1_0000 {
                        if dst.remaining() < 2 {
                            return Ok(CoderResult::Overflow);
                        }
                        let offset = scalar - 0x1_0000;
                        dst.put(0xd800 | (offset >> 10) as u16)?;
                        dst.put(0xdc00 | (offset & 0x3ff) as u16)?;
                    } else {
                        if !dst.has_remaining() {
                            return Ok(CoderResult::Overflow);
                        }
                        dst.put(scalar as u16)?;
                    }
                    src.set_position(start + len)?;
                    continue;
                }
                Scan::Incomplete(_) if !end_of_input => return Ok(CoderResult::Underflow),
                Scan::Incomplete(length) | Scan::Invalid(length) => CoderError::Malformed { length },
            };
            if !handle_error(self.action, error, src, dst, &[REPLACEMENT_CHARACTER][..])? {
                return Ok(CoderResult::Overflow);
            }
        }
        Ok(CoderResult::Underflow)
    }
}

/// An [`Encoder`] from UTF-16 code units to UTF-8 bytes.
///
/// Unpaired surrogates are malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utf8Encoder {
    action: CodingErrorAction,
    replacement: heapless::Vec<u8, 4>,
}

impl Utf8Encoder {
    pub fn new() -> Self {
        Self::with_action(CodingErrorAction::Report)
    }

    /// Returns a `Utf8Encoder` that handles malformed input with `action`.
    ///
    /// The replacement defaults to `?`.
    pub fn with_action(action: CodingErrorAction) -> Self {
        Utf8Encoder {
            action,
            replacement: [b'?'].into_iter().collect(),
        }
    }

    /// Sets the bytes written in place of malformed input.
    ///
    /// The replacement must be one to four bytes of valid UTF-8.
    pub fn with_replacement(mut self, replacement: &[u8]) -> Result<Self, BufferError> {
        if replacement.is_empty() || core::str::from_utf8(replacement).is_err() {
            return Err(BufferError::IllegalArgument(
                "replacement must be non-empty UTF-8",
            ));
        }
        self.replacement = heapless::Vec::from_slice(replacement)
            .map_err(|_| BufferError::IllegalArgument("replacement exceeds 4 bytes"))?;
        Ok(self)
    }

    pub fn action(&self) -> CodingErrorAction {
        self.action
    }

    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }
}

impl Default for Utf8Encoder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xd800..=0xdbff).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xdc00..=0xdfff).contains(&unit)
}

impl Encoder for Utf8Encoder {
    fn encode(
        &mut self,
        src: &mut CharBuffer<'_>,
        dst: &mut ByteBuffer<'_>,
        end_of_input: bool,
    ) -> Result<CoderResult, CoderError> {
        while src.has_remaining() {
            let start = src.position();
            let unit = src.get_at(start)?;

            let step = if is_high_surrogate(unit) {
                if src.remaining() < 2 {
                    if !end_of_input {
                        return Ok(CoderResult::Underflow);
                    }
                    None
                } else {
                    let low = src.get_at(start + 1)?;
                    is_low_surrogate(low).then(|| {
                        let high = u32::from(unit - 0xd800) << 10;
                        (0x1_0000 + high + u32::from(low - 0xdc00), 2)
                    })
                }
            } else if is_low_surrogate(unit) {
                None
            } else {
                Some((u32::from(unit), 1))
            };

            match step.and_then(|(scalar, consumed)| Some((char::from_u32(scalar)?, consumed))) {
                Some((c, consumed)) => {
                    let mut raw = [0u8; 4];
                    let encoded = c.encode_utf8(&mut raw);
                    if dst.remaining() < encoded.len() {
                        return Ok(CoderResult::Overflow);
                    }
                    dst.put_slice(encoded.as_bytes())?;
                    src.set_position(start + consumed)?;
                }
                None => {
                    let error = CoderError::Malformed { length: 1 };
                    if !handle_error(self.action, error, src, dst, self.replacement.as_slice())? {
                        return Ok(CoderResult::Overflow);
                    }
                }
            }
        }
        Ok(CoderResult::Underflow)
    }

    fn average_bytes_per_char(&self) -> f32 {
        1.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn decodes_every_sequence_length() {
        let text = "a\u{e9}\u{20ac}\u{1f600}";
        let mut src = ByteBuffer::wrap(text.as_bytes().to_vec());
        let mut dst = CharBuffer::allocate(8);
        let result = Utf8Decoder::new().decode(&mut src, &mut dst, true);
        assert_eq!(result, Ok(CoderResult::Underflow));
        assert!(!src.has_remaining());
        dst.flip();
        assert_eq!(dst.to_vec(), units(text));
    }

    #[test]
    fn incomplete_tail_waits_for_more_input() {
        let mut src = ByteBuffer::wrap(vec![b'x', 0xe2, 0x82]);
        let mut dst = CharBuffer::allocate(4);
        let mut decoder = Utf8Decoder::new();
        assert_eq!(
            decoder.decode(&mut src, &mut dst, false),
            Ok(CoderResult::Underflow)
        );
        assert_eq!(src.position(), 1);
        assert_eq!(dst.position(), 1);

        assert_eq!(
            decoder.decode(&mut src, &mut dst, true),
            Err(CoderError::Malformed { length: 2 })
        );
        assert_eq!(src.position(), 1);
    }

    #[test]
    fn rejects_overlong_surrogate_and_out_of_range() {
        for bad in [
            &[0xc0, 0x80][..],
            &[0xe0, 0x80, 0x80][..],
            &[0xed, 0xa0, 0x80][..],
            &[0xf4, 0x90, 0x80, 0x80][..],
            &[0xff][..],
            &[0x80][..],
        ] {
            let mut src = ByteBuffer::wrap(bad.to_vec());
            let mut dst = CharBuffer::allocate(4);
            assert_eq!(
                Utf8Decoder::new().decode(&mut src, &mut dst, true),
                Err(CoderError::Malformed { length: 1 }),
                "{:x?}",
                bad
            );
        }
    }

    #[test]
    fn bad_continuation_reports_valid_prefix() {
        let mut src = ByteBuffer::wrap(vec![0xe2, 0x82, b'a']);
        let mut dst = CharBuffer::allocate(4);
        assert_eq!(
            Utf8Decoder::new().decode(&mut src, &mut dst, false),
            Err(CoderError::Malformed { length: 2 })
        );
    }

    #[test]
    fn replace_and_ignore() {
        let input = vec![b'a', 0xff, b'b', 0xe2, 0x82];

        let mut src = ByteBuffer::wrap(input.clone());
        let mut dst = CharBuffer::allocate(8);
        let mut decoder = Utf8Decoder::with_action(CodingErrorAction::Replace);
        assert_eq!(
            decoder.decode(&mut src, &mut dst, true),
            Ok(CoderResult::Underflow)
        );
        dst.flip();
        assert_eq!(dst.to_vec(), vec![0x61, 0xfffd, 0x62, 0xfffd]);

        let mut src = ByteBuffer::wrap(input);
        let mut dst = CharBuffer::allocate(8);
        let mut decoder = Utf8Decoder::with_action(CodingErrorAction::Ignore);
        decoder.decode(&mut src, &mut dst, true).unwrap();
        dst.flip();
        assert_eq!(dst.to_vec(), vec![0x61, 0x62]);
    }

    #[test]
    fn surrogate_pair_needs_two_units() {
        let mut src = ByteBuffer::wrap("\u{1f600}".as_bytes().to_vec());
        let mut dst = CharBuffer::allocate(1);
        assert_eq!(
            Utf8Decoder::new().decode(&mut src, &mut dst, true),
            Ok(CoderResult::Overflow)
        );
        assert_eq!(src.position(), 0);
        assert_eq!(dst.position(), 0);
    }

    #[test]
    fn decode_all_grows_output() {
        let text = "h\u{e9}llo w\u{f6}rld \u{1f30d}";
        let mut src = ByteBuffer::wrap(text.as_bytes().to_vec());
        let mut decoder = Utf8Decoder::new();
        let out = decoder.decode_all(&mut src).unwrap();
        assert_eq!(out.position(), 0);
        assert_eq!(out.to_vec(), units(text));

        let mut empty = ByteBuffer::allocate(0);
        assert_eq!(decoder.decode_all(&mut empty).unwrap().remaining(), 0);
    }

    #[test]
    fn encodes_pairs_and_bmp() {
        let text = "a\u{e9}\u{20ac}\u{1f600}";
        let mut src = CharBuffer::wrap_elements(&units(text));
        let out = Utf8Encoder::new().encode_all(&mut src).unwrap();
        assert_eq!(&*out.chunk(), text.as_bytes());
    }

    #[test]
    fn trailing_high_surrogate_waits() {
        let mut src = CharBuffer::wrap_elements(&[0x61, 0xd83d]);
        let mut dst = ByteBuffer::allocate(8);
        let mut encoder = Utf8Encoder::new();
        assert_eq!(
            encoder.encode(&mut src, &mut dst, false),
            Ok(CoderResult::Underflow)
        );
        assert_eq!(src.position(), 1);
        assert_eq!(
            encoder.encode(&mut src, &mut dst, true),
            Err(CoderError::Malformed { length: 1 })
        );
    }

    #[test]
    fn lone_surrogates_are_replaced() {
        let mut src = CharBuffer::wrap_elements(&[0xdc00, 0x62, 0xd800, 0x63]);
        let mut encoder = Utf8Encoder::with_action(CodingErrorAction::Replace)
            .with_replacement("\u{fffd}".as_bytes())
            .unwrap();
        let out = encoder.encode_all(&mut src).unwrap();
        assert_eq!(&*out.chunk(), "\u{fffd}b\u{fffd}c".as_bytes());
    }

    #[test]
    fn encoder_overflow_keeps_input() {
        let mut src = CharBuffer::wrap_elements(&[0x20ac]);
        let mut dst = ByteBuffer::allocate(2);
        assert_eq!(
            Utf8Encoder::new().encode(&mut src, &mut dst, true),
            Ok(CoderResult::Overflow)
        );
        assert_eq!(src.position(), 0);
        assert_eq!(dst.position(), 0);
    }

    #[test]
    fn replacement_validation() {
        assert_eq!(Utf8Encoder::new().replacement(), b"?");
        assert!(Utf8Encoder::new().with_replacement(b"").is_err());
        assert!(Utf8Encoder::new().with_replacement(&[0xff]).is_err());
        assert!(Utf8Encoder::new().with_replacement(b"abcde").is_err());
        assert!(Utf8Encoder::new().with_replacement(b"--").is_ok());
    }
}
