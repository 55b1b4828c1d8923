//! Multi-byte numeric access on byte buffers.
//!
//! Values are assembled from, and split into, consecutive bytes following
//! the buffer's [`ByteOrder`]. Signed integers use two's complement and
//! floats travel as their IEEE-754 bit patterns, so `-0.0` and NaN payloads
//! round-trip exactly.

use bytes::{Buf, Bytes};

use crate::buffer::{
    Buffer, ByteBuffer, CharBuffer, DoubleBuffer, FloatBuffer, IntBuffer, LongBuffer, ShortBuffer,
};
use crate::element::Element;
use crate::error::{BufferError, Result};
use crate::order::ByteOrder;
use crate::storage::{borrow_store, borrow_store_mut};

macro_rules! numeric_accessors {
    ($ty:ty, $get:ident, $get_at:ident, $put:ident, $put_at:ident) => {
        #[doc = concat!("Reads a `", stringify!($ty), "` at the position and advances past it.")]
        pub fn $get(&mut self) -> Result<$ty> {
            self.get_value::<$ty>()
        }

        #[doc = concat!("Reads a `", stringify!($ty), "` starting at byte `index`.")]
        pub fn $get_at(&self, index: usize) -> Result<$ty> {
            self.get_value_at::<$ty>(index)
        }

        #[doc = concat!("Writes a `", stringify!($ty), "` at the position and advances past it.")]
        pub fn $put(&mut self, value: $ty) -> Result<()> {
            self.put_value(value)
        }

        #[doc = concat!("Writes a `", stringify!($ty), "` starting at byte `index`.")]
        pub fn $put_at(&mut self, index: usize, value: $ty) -> Result<()> {
            self.put_value_at(index, value)
        }
    };
}

impl<'a> ByteBuffer<'a> {
    /// Selects the byte order for subsequent multi-byte access.
    ///
    /// Single-byte access is unaffected. Views already created keep the
    /// order they were created with.
    pub fn set_order(&mut self, order: ByteOrder) {
        self.set_order_raw(order);
    }

    fn get_value<T: Element>(&mut self) -> Result<T> {
        if self.remaining() < T::WIDTH {
            return Err(BufferError::Underflow);
        }
        let value = self.decode_at::<T>(self.position())?;
        self.advance(T::WIDTH)?;
        Ok(value)
    }

    fn get_value_at<T: Element>(&self, index: usize) -> Result<T> {
        self.check_value_index::<T>(index)?;
        self.decode_at::<T>(index)
    }

    fn put_value<T: Element>(&mut self, value: T) -> Result<()> {
        self.ensure_writable()?;
        if self.remaining() < T::WIDTH {
            return Err(BufferError::Overflow);
        }
        let index = self.position();
        self.encode_at(index, value)?;
        self.set_position(index + T::WIDTH)
    }

    fn put_value_at<T: Element>(&mut self, index: usize, value: T) -> Result<()> {
        self.ensure_writable()?;
        self.check_value_index::<T>(index)?;
        self.encode_at(index, value)
    }

    fn check_value_index<T: Element>(&self, index: usize) -> Result<()> {
        match index.checked_add(T::WIDTH) {
            Some(end) if end <= self.limit() => Ok(()),
            _ => Err(BufferError::IndexOutOfBounds {
                index,
                len: self.limit(),
            }),
        }
    }

    fn decode_at<T: Element>(&self, index: usize) -> Result<T> {
        let store = borrow_store(self.store())?;
        Ok(T::read(&store[self.byte_range(index, T::WIDTH)], self.order()))
    }

    fn encode_at<T: Element>(&mut self, index: usize, value: T) -> Result<()> {
        let range = self.byte_range(index, T::WIDTH);
        let mut store = borrow_store_mut(self.store())?;
        value.write(&mut store[range], self.order());
        Ok(())
    }

    numeric_accessors!(u16, get_char, get_char_at, put_char, put_char_at);
    numeric_accessors!(i16, get_short, get_short_at, put_short, put_short_at);
    numeric_accessors!(i32, get_int, get_int_at, put_int, put_int_at);
    numeric_accessors!(i64, get_long, get_long_at, put_long, put_long_at);
    numeric_accessors!(f32, get_float, get_float_at, put_float, put_float_at);
    numeric_accessors!(f64, get_double, get_double_at, put_double, put_double_at);

    /// A buffer of `T` elements over the remaining bytes.
    ///
    /// The view starts at the current position, holds as many whole elements
    /// as fit in `remaining()`, and inherits this buffer's byte order and
    /// read-only flag. Writes through either side are visible to the other.
    pub fn as_view<T: Element>(&self) -> Buffer<'a, T> {
        let offset = self.byte_range(self.position(), 0).start;
        let capacity = self.remaining() / T::WIDTH;
        log::trace!(
            "{} view over {} bytes at offset {}",
            T::NAME,
            capacity * T::WIDTH,
            offset
        );
        Buffer::from_parts(
            self.store().clone(),
            offset,
            capacity,
            self.is_read_only(),
            self.order(),
        )
    }

    pub fn as_char_buffer(&self) -> CharBuffer<'a> {
        self.as_view()
    }

    pub fn as_short_buffer(&self) -> ShortBuffer<'a> {
        self.as_view()
    }

    pub fn as_int_buffer(&self) -> IntBuffer<'a> {
        self.as_view()
    }

    pub fn as_long_buffer(&self) -> LongBuffer<'a> {
        self.as_view()
    }

    pub fn as_float_buffer(&self) -> FloatBuffer<'a> {
        self.as_view()
    }

    pub fn as_double_buffer(&self) -> DoubleBuffer<'a> {
        self.as_view()
    }

    /// Drains `src` into this buffer at the position.
    pub fn put_buf<B: Buf>(&mut self, src: &mut B) -> Result<()> {
        self.ensure_writable()?;
        if src.remaining() > self.remaining() {
            return Err(BufferError::Overflow);
        }
        while src.has_remaining() {
            let chunk = src.chunk();
            let len = chunk.len();
            self.put_slice(chunk)?;
            src.advance(len);
        }
        Ok(())
    }

    /// Reads `len` bytes at the position into a new [`Bytes`].
    pub fn copy_to_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.remaining() < len {
            return Err(BufferError::Underflow);
        }
        let bytes = Bytes::copy_from_slice(&self.try_chunk()?[..len]);
        self.advance(len)?;
        Ok(bytes)
    }
}
