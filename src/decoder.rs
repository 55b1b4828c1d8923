use crate::buffer::{ByteBuffer, CharBuffer};
use crate::codecs::{grow, CoderError, CoderResult};

/// Turns bytes into UTF-16 code units.
pub trait Decoder {
    /// Decodes as much of `src` into `dst` as both allow.
    ///
    /// Consumed bytes advance `src`'s position and produced units advance
    /// `dst`'s. An incomplete trailing sequence is left unconsumed and
    /// reported as [`CoderResult::Underflow`], unless `end_of_input` is set,
    /// in which case it is malformed.
    fn decode(
        &mut self,
        src: &mut ByteBuffer<'_>,
        dst: &mut CharBuffer<'_>,
        end_of_input: bool,
    ) -> Result<CoderResult, CoderError>;

    /// Clears any internal state.
    fn reset(&mut self) {}

    /// Expected number of units produced per input byte.
    fn average_chars_per_byte(&self) -> f32 {
        1.0
    }

    /// Decodes all of `src` into a newly allocated buffer, ready for reading.
    fn decode_all(&mut self, src: &mut ByteBuffer<'_>) -> Result<CharBuffer<'static>, CoderError> {
        self.reset();
        let estimate = (src.remaining() as f32 * self.average_chars_per_byte()) as usize;
        let mut out = CharBuffer::allocate(estimate);
        while self.decode(src, &mut out, true)? == CoderResult::Overflow {
            out = grow(&mut out)?;
        }
        out.flip();
        Ok(out)
    }
}
