//! Byte ↔ UTF-16 coders built on [`ByteBuffer`] and [`CharBuffer`].
//!
//! [`ByteBuffer`]: crate::ByteBuffer
//! [`CharBuffer`]: crate::CharBuffer

use core::fmt;

use embedded_io_async::{Error, ErrorKind};

use crate::buffer::Buffer;
use crate::element::Element;
use crate::error::BufferError;

pub mod latin1;
pub mod utf8;

pub use self::latin1::{Latin1Decoder, Latin1Encoder};
pub use self::utf8::{Utf8Decoder, Utf8Encoder};

/// Why a coding step stopped without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoderResult {
    /// The input is exhausted, or what is left is an incomplete sequence
    /// that needs more input.
    Underflow,
    /// The output buffer has no room for the next unit.
    Overflow,
}

/// What a coder does with malformed or unmappable input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CodingErrorAction {
    /// Stop and return the error, leaving the input at the offending sequence.
    #[default]
    Report,
    /// Write the coder's replacement and skip the offending sequence.
    Replace,
    /// Skip the offending sequence.
    Ignore,
}

/// An error occurred while encoding or decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoderError {
    /// `length` input units do not form a valid sequence.
    Malformed { length: usize },
    /// `length` input units are valid but have no output representation.
    Unmappable { length: usize },
    /// A buffer operation failed.
    Buffer(BufferError),
}

impl Error for CoderError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed { .. } | Self::Unmappable { .. } => ErrorKind::InvalidData,
            Self::Buffer(e) => e.kind(),
        }
    }
}

impl fmt::Display for CoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoderError::Malformed { length } => write!(f, "malformed input of length {}", length),
            CoderError::Unmappable { length } => {
                write!(f, "unmappable input of length {}", length)
            }
            CoderError::Buffer(e) => write!(f, "{}", e),
        }
    }
}

impl From<BufferError> for CoderError {
    fn from(e: BufferError) -> CoderError {
        CoderError::Buffer(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoderError {}

/// Moves the written part of `full` into a new buffer with room to spare.
///
/// `full` is expected in write mode; the returned buffer is in write mode
/// with the same content before its position.
pub(crate) fn grow<E: Element>(
    full: &mut Buffer<'_, E>,
) -> Result<Buffer<'static, E>, BufferError> {
    let capacity = full.capacity().saturating_mul(2).saturating_add(1);
    log::trace!("growing {} output to {}", E::NAME, capacity);
    let mut grown = Buffer::allocate(capacity);
    full.flip();
    grown.put_buffer(full)?;
    Ok(grown)
}

/// Fills the replacement for a bad sequence of `length` units.
///
/// Returns `Ok(true)` when the sequence was dealt with and the input
/// advanced, `Ok(false)` when the output lacks room for the replacement.
pub(crate) fn handle_error<S: Element, D: Element>(
    action: CodingErrorAction,
    error: CoderError,
    src: &mut Buffer<'_, S>,
    dst: &mut Buffer<'_, D>,
    replacement: &[D],
) -> Result<bool, CoderError> {
    let length = match error {
        CoderError::Malformed { length } | CoderError::Unmappable { length } => length,
        CoderError::Buffer(_) => return Err(error),
    };
    match action {
        CodingErrorAction::Report => {
            log::debug!("coder stopped on {}", error);
            return Err(error);
        }
        CodingErrorAction::Replace => {
            if dst.remaining() < replacement.len() {
                return Ok(false);
            }
            dst.put_slice(replacement)?;
        }
        CodingErrorAction::Ignore => {}
    }
    src.set_position(src.position() + length)?;
    Ok(true)
}
