//! Moving bytes between `embedded-io-async` readers/writers and byte buffers.
//!
//! Reads fill `[position, limit)` and writes drain it; in both cases the
//! position advances by the number of bytes actually transferred.

use core::fmt;

use embedded_io_async::{Error, ErrorKind, Read, Write};

use crate::buffer::ByteBuffer;
use crate::codecs::CoderError;
use crate::error::BufferError;

/// An error from a channel transfer.
#[derive(Debug)]
pub enum ChannelError<E> {
    /// The underlying reader or writer failed.
    Io(E),
    /// A buffer precondition failed.
    Buffer(BufferError),
    /// Encoding or decoding failed.
    Coder(CoderError),
    /// The writer accepted no bytes while some were pending.
    WriteZero,
}

impl<E: Error> Error for ChannelError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(e) => e.kind(),
            Self::Buffer(e) => e.kind(),
            Self::Coder(e) => e.kind(),
            Self::WriteZero => ErrorKind::Other,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for ChannelError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Io(e) => write!(f, "{:?}", e),
            ChannelError::Buffer(e) => write!(f, "{}", e),
            ChannelError::Coder(e) => write!(f, "{}", e),
            ChannelError::WriteZero => write!(f, "failed to write whole buffer"),
        }
    }
}

impl<E> From<BufferError> for ChannelError<E> {
    fn from(e: BufferError) -> Self {
        ChannelError::Buffer(e)
    }
}

impl<E> From<CoderError> for ChannelError<E> {
    fn from(e: CoderError) -> Self {
        ChannelError::Coder(e)
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for ChannelError<E> {}

/// Performs one read into `dst`'s remaining window.
///
/// Returns `Ok(None)` at end of input. A buffer with no room yields
/// `Ok(Some(0))` without touching the reader.
// The store stays mutably borrowed while the reader runs; aliases of `dst`
// used from inside the reader see `BufferError::Borrowed`.
#[allow(clippy::await_holding_refcell_ref)]
pub async fn read_into<R: Read>(
    reader: &mut R,
    dst: &mut ByteBuffer<'_>,
) -> Result<Option<usize>, ChannelError<R::Error>> {
    if !dst.has_remaining() {
        dst.ensure_writable()?;
        return Ok(Some(0));
    }
    let n = {
        let mut window = dst.chunk_mut()?;
        reader.read(&mut window).await.map_err(ChannelError::Io)?
    };
    if n == 0 {
        log::debug!("end of input after {} buffered bytes", dst.position());
        return Ok(None);
    }
    dst.advance(n)?;
    Ok(Some(n))
}

/// Performs one write from `src`'s remaining window.
pub async fn write_from<W: Write>(
    writer: &mut W,
    src: &mut ByteBuffer<'_>,
) -> Result<usize, ChannelError<W::Error>> {
    if !src.has_remaining() {
        return Ok(0);
    }
    let n = {
        let window = src.try_chunk()?;
        writer.write(&window).await.map_err(ChannelError::Io)?
    };
    src.advance(n)?;
    Ok(n)
}

/// Writes until `src` has nothing remaining.
pub async fn write_all_from<W: Write>(
    writer: &mut W,
    src: &mut ByteBuffer<'_>,
) -> Result<(), ChannelError<W::Error>> {
    while src.has_remaining() {
        if write_from(writer, src).await? == 0 {
            return Err(ChannelError::WriteZero);
        }
    }
    Ok(())
}
