use core::fmt;

use embedded_io_async::{Error, ErrorKind};

/// A precondition of a buffer operation was violated.
///
/// Every variant is surfaced to the caller as-is; no operation clamps or
/// retries on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferError {
    /// Not enough remaining elements for a relative read.
    Underflow,
    /// Not enough remaining room for a relative write.
    Overflow,
    /// An absolute index or a bulk range falls outside the permitted bound.
    IndexOutOfBounds { index: usize, len: usize },
    /// A write was attempted through a read-only buffer.
    ReadOnly,
    /// `reset` was called while no mark was set.
    InvalidMark,
    /// An argument is unusable for the requested operation.
    IllegalArgument(&'static str),
    /// The shared store is held by a guard from `array`, `array_mut`,
    /// `chunk` or `chunk_mut` on some alias of this buffer.
    Borrowed,
}

impl Error for BufferError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Underflow => ErrorKind::InvalidData,
            Self::Overflow => ErrorKind::OutOfMemory,
            Self::ReadOnly => ErrorKind::PermissionDenied,
            Self::Borrowed => ErrorKind::Other,
            Self::IndexOutOfBounds { .. } | Self::InvalidMark | Self::IllegalArgument(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Underflow => write!(f, "buffer underflow"),
            BufferError::Overflow => write!(f, "buffer overflow"),
            BufferError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for length {}", index, len)
            }
            BufferError::ReadOnly => write!(f, "buffer is read-only"),
            BufferError::InvalidMark => write!(f, "mark is not set"),
            BufferError::IllegalArgument(msg) => write!(f, "illegal argument: {}", msg),
            BufferError::Borrowed => write!(f, "backing store is already borrowed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferError {}

pub type Result<T, E = BufferError> = core::result::Result<T, E>;
