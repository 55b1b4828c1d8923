use crate::buffer::{ByteBuffer, CharBuffer};
use crate::codecs::{grow, CoderError, CoderResult};

/// Turns UTF-16 code units into bytes.
pub trait Encoder {
    /// Encodes as much of `src` into `dst` as both allow.
    ///
    /// A high surrogate at the end of `src` is left unconsumed and reported
    /// as [`CoderResult::Underflow`], unless `end_of_input` is set.
    fn encode(
        &mut self,
        src: &mut CharBuffer<'_>,
        dst: &mut ByteBuffer<'_>,
        end_of_input: bool,
    ) -> Result<CoderResult, CoderError>;

    /// Clears any internal state.
    fn reset(&mut self) {}

    /// Expected number of bytes produced per input unit.
    fn average_bytes_per_char(&self) -> f32 {
        1.0
    }

    /// Encodes all of `src` into a newly allocated buffer, ready for reading.
    fn encode_all(&mut self, src: &mut CharBuffer<'_>) -> Result<ByteBuffer<'static>, CoderError> {
        self.reset();
        let estimate = (src.remaining() as f32 * self.average_bytes_per_char()) as usize;
        let mut out = ByteBuffer::allocate(estimate);
        while self.encode(src, &mut out, true)? == CoderResult::Overflow {
            out = grow(&mut out)?;
        }
        out.flip();
        Ok(out)
    }
}
