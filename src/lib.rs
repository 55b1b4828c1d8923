//! Cursor-based windows over fixed-size byte stores.
//!
//! A [`Buffer`] tracks `position`, `limit` and an optional `mark` inside a
//! fixed `capacity` and reads or writes fixed-width elements relative to
//! that cursor or at absolute indices. Byte buffers add multi-byte numeric
//! access in a selectable [`ByteOrder`] and can be reinterpreted as buffers
//! of wider elements over the same storage.
//!
//! ```
//! use window_buffer::{ByteBuffer, ByteOrder};
//!
//! let mut bytes = ByteBuffer::allocate(8);
//! bytes.put_int(1).unwrap();
//! bytes.put_int(2).unwrap();
//! bytes.flip();
//! assert_eq!(bytes.get_int().unwrap(), 1);
//!
//! bytes.set_order(ByteOrder::LittleEndian);
//! assert_eq!(bytes.get_int_at(4).unwrap(), 0x0200_0000);
//! ```

#![allow(async_fn_in_trait)]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;

mod buffer;
mod channel;
mod cursor;
mod decoder;
mod element;
mod encoder;
mod error;
mod framed;
mod numeric;
mod order;
mod sink;
mod storage;
mod stream;

pub mod codecs;

pub use self::buffer::{
    Buffer, ByteBuffer, CharBuffer, DoubleBuffer, FloatBuffer, IntBuffer, LongBuffer, ShortBuffer,
};
pub use self::channel::{read_into, write_all_from, write_from, ChannelError};
pub use self::codecs::{CoderError, CoderResult, CodingErrorAction};
pub use self::decoder::Decoder;
pub use self::element::Element;
pub use self::encoder::Encoder;
pub use self::error::{BufferError, Result};
pub use self::framed::{CharReader, CharWriter};
pub use self::order::ByteOrder;
pub use self::sink::Sink;
pub use self::storage::Storage;
pub use self::stream::Stream;
