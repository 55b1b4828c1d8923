use crate::buffer::{ByteBuffer, CharBuffer};
use crate::codecs::utf8::{is_high_surrogate, is_low_surrogate};
use crate::codecs::{handle_error, CoderError, CoderResult, CodingErrorAction};
use crate::decoder::Decoder;
use crate::encoder::Encoder;

/// A [`Decoder`] for ISO-8859-1, where every byte is the code unit of the
/// same value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latin1Decoder;

impl Decoder for Latin1Decoder {
    fn decode(
        &mut self,
        src: &mut ByteBuffer<'_>,
        dst: &mut CharBuffer<'_>,
        _end_of_input: bool,
    ) -> Result<CoderResult, CoderError> {
        while src.has_remaining() {
            if !dst.has_remaining() {
                return Ok(CoderResult::Overflow);
            }
            dst.put(u16::from(src.get()?))?;
        }
        Ok(CoderResult::Underflow)
    }
}

/// An [`Encoder`] for ISO-8859-1.
///
/// Units above U+00FF are unmappable, as are whole surrogate pairs. Unpaired
/// surrogates are malformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latin1Encoder {
    action: CodingErrorAction,
}

impl Latin1Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Replace` writes `?`.
    pub fn with_action(action: CodingErrorAction) -> Self {
        Latin1Encoder { action }
    }
}

impl Encoder for Latin1Encoder {
    fn encode(
        &mut self,
        src: &mut CharBuffer<'_>,
        dst: &mut ByteBuffer<'_>,
        end_of_input: bool,
    ) -> Result<CoderResult, CoderError> {
        while src.has_remaining() {
            let start = src.position();
            let unit = src.get_at(start)?;
            let error = if let Ok(byte) = u8::try_from(unit) {
                if !dst.has_remaining() {
                    return Ok(CoderResult::Overflow);
                }
                dst.put(byte)?;
                src.set_position(start + 1)?;
                continue;
            } else if is_high_surrogate(unit) {
                if src.remaining() < 2 {
                    if !end_of_input {
                        return Ok(CoderResult::Underflow);
                    }
                    CoderError::Malformed { length: 1 }
                } else if is_low_surrogate(src.get_at(start + 1)?) {
                    CoderError::Unmappable { length: 2 }
                } else {
                    CoderError::Malformed { length: 1 }
                }
            } else if is_low_surrogate(unit) {
                CoderError::Malformed { length: 1 }
            } else {
                CoderError::Unmappable { length: 1 }
            };
            if !handle_error(self.action, error, src, dst, &b"?"[..])? {
                return Ok(CoderResult::Overflow);
            }
        }
        Ok(CoderResult::Underflow)
    }
}
