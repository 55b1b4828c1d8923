use alloc::string::String;
use alloc::vec::Vec;

use embedded_io_async::{ErrorType, Read, Write};

use crate::buffer::{ByteBuffer, CharBuffer};
use crate::channel::{read_into, write_all_from, ChannelError};
use crate::codecs::CoderResult;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::BufferError;
use crate::{Sink, Stream};

/// Reads bytes from `R` and decodes them into UTF-16 with `D`.
///
/// The internal byte buffer stays in write mode between calls: decoded
/// input is compacted away and any incomplete trailing sequence waits at
/// the front for more bytes.
pub struct CharReader<'a, R, D> {
    inner: R,
    decoder: D,
    buffer: ByteBuffer<'a>,
    chunk: CharBuffer<'static>,
    eof: bool,
    has_errored: bool,
}

impl<R, D> CharReader<'static, R, D> {
    /// Returns a `CharReader` with a heap-allocated buffer of `capacity` bytes.
    pub fn new(inner: R, decoder: D, capacity: usize) -> Self {
        Self::with_buffer(inner, decoder, ByteBuffer::allocate(capacity))
    }
}

impl<'a, R, D> CharReader<'a, R, D> {
    /// Returns a `CharReader` reading through `buffer`, which is cleared.
    pub fn with_buffer(inner: R, decoder: D, mut buffer: ByteBuffer<'a>) -> Self {
        buffer.clear();
        let chunk = CharBuffer::allocate(buffer.capacity().max(1));
        Self {
            inner,
            decoder,
            buffer,
            chunk,
            eof: false,
            has_errored: false,
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R, D> CharReader<'_, R, D>
where
    R: Read,
    D: Decoder,
{
    /// Decodes into `dst` until at least one unit is produced, `dst` is full,
    /// or the input ends.
    ///
    /// Returns the number of units produced, or `Ok(None)` once the input is
    /// exhausted and every buffered byte has been decoded. After an error,
    /// the next call returns `Ok(None)`.
    pub async fn read_chars(
        &mut self,
        dst: &mut CharBuffer<'_>,
    ) -> Result<Option<usize>, ChannelError<R::Error>> {
        if self.has_errored {
            self.has_errored = false;
            self.eof = true;
            return Ok(None);
        }

        let start = dst.position();
        loop {
            // Decode whatever is buffered, then return to write mode.
            self.buffer.flip();
            let decoded = self.decoder.decode(&mut self.buffer, dst, self.eof);
            self.buffer.compact()?;
            let result = match decoded {
                Ok(result) => result,
                Err(err) => {
                    self.has_errored = true;
                    return Err(err.into());
                }
            };

            let produced = dst.position() - start;
            if produced > 0 || result == CoderResult::Overflow {
                return Ok(Some(produced));
            }
            if self.eof {
                return Ok(None);
            }

            // Nothing decodable yet: read more. A full buffer here means a
            // single sequence is longer than the buffer.
            if !self.buffer.has_remaining() {
                self.has_errored = true;
                return Err(ChannelError::Buffer(BufferError::Overflow));
            }
            match read_into(&mut self.inner, &mut self.buffer).await {
                Ok(Some(_)) => {}
                Ok(None) => self.eof = true,
                Err(err) => {
                    self.has_errored = true;
                    return Err(err);
                }
            }
        }
    }
}

impl<R, D> ErrorType for CharReader<'_, R, D>
where
    R: Read,
{
    type Error = ChannelError<R::Error>;
}

impl<R, D> Stream for CharReader<'_, R, D>
where
    R: Read,
    D: Decoder,
{
    type Item = Result<String, ChannelError<R::Error>>;

    /// Yields decoded text one buffer-full at a time. Chunks are never
    /// empty.
    async fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chunk = core::mem::replace(&mut self.chunk, CharBuffer::allocate(0));
            chunk.clear();
            let read = self.read_chars(&mut chunk).await;
            chunk.flip();
            let units = chunk.to_vec();
            match read {
                Ok(Some(0)) => {
                    // The next sequence decodes to more units than fit.
                    self.chunk = CharBuffer::allocate(chunk.capacity() * 2 + 1);
                    log::trace!("growing char chunk to {}", self.chunk.capacity());
                }
                Ok(Some(_)) => {
                    self.chunk = chunk;
                    return Some(Ok(char::decode_utf16(units)
                        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                        .collect()));
                }
                Ok(None) => {
                    self.chunk = chunk;
                    return None;
                }
                Err(err) => {
                    self.chunk = chunk;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Encodes UTF-16 with `E` and writes the bytes to `W`.
pub struct CharWriter<'a, W, E> {
    inner: W,
    encoder: E,
    buffer: ByteBuffer<'a>,
    backpressure_boundary: usize,
}

impl<W, E> CharWriter<'static, W, E> {
    /// Returns a `CharWriter` with a heap-allocated buffer of `capacity` bytes.
    pub fn new(inner: W, encoder: E, capacity: usize) -> Self {
        Self::with_buffer(inner, encoder, ByteBuffer::allocate(capacity))
    }
}

impl<'a, W, E> CharWriter<'a, W, E> {
    /// Returns a `CharWriter` writing through `buffer`, which is cleared.
    ///
    /// Encoded bytes are written out once the buffer is full.
    pub fn with_buffer(inner: W, encoder: E, mut buffer: ByteBuffer<'a>) -> Self {
        buffer.clear();
        let backpressure_boundary = buffer.capacity();
        Self {
            inner,
            encoder,
            buffer,
            backpressure_boundary,
        }
    }

    /// Writes buffered bytes out as soon as at least `boundary` are pending.
    pub fn set_backpressure_boundary(&mut self, boundary: usize) {
        self.backpressure_boundary = boundary;
    }

    /// Number of encoded bytes not yet handed to the writer.
    pub fn pending(&self) -> usize {
        self.buffer.position()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W, E> CharWriter<'_, W, E>
where
    W: Write,
    E: Encoder,
{
    /// Encodes all of `src` that can be encoded without more input.
    ///
    /// A trailing high surrogate stays in `src`.
    pub async fn write_chars(
        &mut self,
        src: &mut CharBuffer<'_>,
    ) -> Result<(), ChannelError<W::Error>> {
        self.encode_from(src, false).await
    }

    /// Encodes the rest of `src` as the final input and flushes.
    pub async fn finish(&mut self, src: &mut CharBuffer<'_>) -> Result<(), ChannelError<W::Error>> {
        self.encode_from(src, true).await?;
        self.flush_buffer().await?;
        self.inner.flush().await.map_err(ChannelError::Io)
    }

    pub async fn write_str(&mut self, text: &str) -> Result<(), ChannelError<W::Error>> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut src = CharBuffer::wrap_elements(&units);
        self.encode_from(&mut src, true).await
    }

    async fn encode_from(
        &mut self,
        src: &mut CharBuffer<'_>,
        end_of_input: bool,
    ) -> Result<(), ChannelError<W::Error>> {
        while self.encoder.encode(src, &mut self.buffer, end_of_input)? == CoderResult::Overflow {
            if self.buffer.position() == 0 {
                // Not even one unit fits.
                return Err(ChannelError::Buffer(BufferError::Overflow));
            }
            self.flush_buffer().await?;
        }
        if self.buffer.position() >= self.backpressure_boundary {
            self.flush_buffer().await?;
        }
        Ok(())
    }

    async fn flush_buffer(&mut self) -> Result<(), ChannelError<W::Error>> {
        self.buffer.flip();
        let written = write_all_from(&mut self.inner, &mut self.buffer).await;
        self.buffer.compact()?;
        written
    }
}

impl<W, E> ErrorType for CharWriter<'_, W, E>
where
    W: Write,
{
    type Error = ChannelError<W::Error>;
}

impl<'s, W, E> Sink<&'s str> for CharWriter<'_, W, E>
where
    W: Write,
    E: Encoder,
{
    async fn send(&mut self, item: &'s str) -> Result<(), Self::Error> {
        self.write_str(item).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.flush_buffer().await?;
        self.inner.flush().await.map_err(ChannelError::Io)
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        Sink::<&'s str>::flush(self).await
    }
}
