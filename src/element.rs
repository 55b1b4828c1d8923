//! Fixed-width element kinds a [`Buffer`](crate::Buffer) can be typed over.
//!
//! Every element is stored as raw bytes in the backing store and is decoded
//! or encoded on access according to the buffer's [`ByteOrder`].

use core::cmp::Ordering;
use core::fmt;
use core::mem::size_of;

use crate::order::ByteOrder;

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width value that can be read from and written to raw bytes.
///
/// This trait is sealed; the implemented kinds are `u8` (bytes), `u16`
/// (char code units), `i16`, `i32`, `i64`, `f32` and `f64`.
pub trait Element: Copy + fmt::Debug + sealed::Sealed + 'static {
    /// Number of bytes one element occupies in the backing store.
    const WIDTH: usize;

    /// Name used in the buffer's `Display` output.
    const NAME: &'static str;

    /// Decodes an element from exactly `WIDTH` bytes.
    fn read(bytes: &[u8], order: ByteOrder) -> Self;

    /// Encodes the element into exactly `WIDTH` bytes.
    fn write(self, bytes: &mut [u8], order: ByteOrder);

    /// Total order used by buffer comparison and equality.
    fn compare(self, other: Self) -> Ordering;

    /// Contribution of this element to a buffer's hash code.
    fn hash_value(self) -> i32;
}

macro_rules! impl_integer_element {
    ($ty:ty, $name:literal, |$v:ident| $hash:expr) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const WIDTH: usize = size_of::<$ty>();
            const NAME: &'static str = $name;

            #[inline]
            fn read(bytes: &[u8], order: ByteOrder) -> Self {
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                match order {
                    ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                    ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                }
            }

            #[inline]
            fn write(self, bytes: &mut [u8], order: ByteOrder) {
                let raw = match order {
                    ByteOrder::BigEndian => self.to_be_bytes(),
                    ByteOrder::LittleEndian => self.to_le_bytes(),
                };
                bytes.copy_from_slice(&raw);
            }

            #[inline]
            fn compare(self, other: Self) -> Ordering {
                self.cmp(&other)
            }

            #[inline]
            fn hash_value(self) -> i32 {
                let $v = self;
                $hash
            }
        }
    };
}

impl_integer_element!(u8, "ByteBuffer", |v| i32::from(v));
impl_integer_element!(u16, "CharBuffer", |v| i32::from(v));
impl_integer_element!(i16, "ShortBuffer", |v| i32::from(v));
impl_integer_element!(i32, "IntBuffer", |v| v);
impl_integer_element!(i64, "LongBuffer", |v| (v ^ (v >> 32)) as i32);

macro_rules! impl_float_element {
    ($ty:ty, $bits:ty, $name:literal) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const WIDTH: usize = size_of::<$ty>();
            const NAME: &'static str = $name;

            #[inline]
            fn read(bytes: &[u8], order: ByteOrder) -> Self {
                <$ty>::from_bits(<$bits as Element>::read(bytes, order) as _)
            }

            #[inline]
            fn write(self, bytes: &mut [u8], order: ByteOrder) {
                Element::write(self.to_bits() as $bits, bytes, order)
            }

            /// NaNs are equal to each other and greater than everything else.
            #[inline]
            fn compare(self, other: Self) -> Ordering {
                match (self.is_nan(), other.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => self.total_cmp(&other),
                }
            }

            #[inline]
            fn hash_value(self) -> i32 {
                let canonical = if self.is_nan() { <$ty>::NAN } else { self };
                Element::hash_value(canonical.to_bits() as $bits)
            }
        }
    };
}

impl_float_element!(f32, i32, "FloatBuffer");
impl_float_element!(f64, i64, "DoubleBuffer");
