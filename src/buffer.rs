use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::Range;

use bytes::BytesMut;

use crate::cursor::Cursor;
use crate::element::Element;
use crate::error::{BufferError, Result};
use crate::order::ByteOrder;
use crate::storage::{borrow_store, borrow_store_mut, Storage, Store};

/// A cursor-based window over a shared, fixed-size backing store.
///
/// Elements of type `E` are laid out back to back starting at a byte
/// `offset` into the store. Duplicates, slices and numeric views share the
/// store and see each other's writes, but each keeps its own
/// position/limit/mark.
///
/// Buffers are single-threaded: they are neither `Send` nor `Sync`. While a
/// guard from [`array`](Self::array), [`array_mut`](Self::array_mut),
/// [`chunk`](ByteBuffer::chunk) or [`chunk_mut`](ByteBuffer::chunk_mut) is
/// alive, operations on any alias that conflict with it fail with
/// [`BufferError::Borrowed`].
pub struct Buffer<'a, E: Element> {
    store: Store<'a>,
    offset: usize,
    cursor: Cursor,
    read_only: bool,
    order: ByteOrder,
    _element: PhantomData<E>,
}

pub type ByteBuffer<'a> = Buffer<'a, u8>;
pub type CharBuffer<'a> = Buffer<'a, u16>;
pub type ShortBuffer<'a> = Buffer<'a, i16>;
pub type IntBuffer<'a> = Buffer<'a, i32>;
pub type LongBuffer<'a> = Buffer<'a, i64>;
pub type FloatBuffer<'a> = Buffer<'a, f32>;
pub type DoubleBuffer<'a> = Buffer<'a, f64>;

fn default_order<E: Element>() -> ByteOrder {
    if E::WIDTH == 1 {
        ByteOrder::BigEndian
    } else {
        ByteOrder::native()
    }
}

fn check_range(offset: usize, length: usize, len: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= len => Ok(()),
        _ => Err(BufferError::IndexOutOfBounds { index: offset, len }),
    }
}

impl<E: Element> Buffer<'static, E> {
    /// Allocates a zero-filled buffer of `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` elements do not fit in memory, like `Vec` does.
    pub fn allocate(capacity: usize) -> Self {
        let storage = Storage::heap_zeroed(capacity.saturating_mul(E::WIDTH));
        Self::from_parts(
            storage.into_shared(),
            0,
            capacity,
            false,
            default_order::<E>(),
        )
    }

    /// Copies `elements` into a fresh buffer whose window covers all of them.
    pub fn wrap_elements(elements: &[E]) -> Self {
        let order = default_order::<E>();
        let mut raw = alloc::vec![0u8; elements.len() * E::WIDTH];
        for (value, bytes) in elements.iter().zip(raw.chunks_exact_mut(E::WIDTH)) {
            value.write(bytes, order);
        }
        Self::from_parts(
            Storage::Heap(raw).into_shared(),
            0,
            elements.len(),
            false,
            order,
        )
    }

    /// Copies `elements` and views only `[offset, offset + length)` of them.
    ///
    /// Like [`ByteBuffer::wrap_range`], the result has capacity `length`,
    /// position 0 and limit `length`.
    pub fn wrap_elements_range(elements: &[E], offset: usize, length: usize) -> Result<Self> {
        check_range(offset, length, elements.len())?;
        let whole = Self::wrap_elements(elements);
        Ok(Self::from_parts(
            whole.store,
            offset * E::WIDTH,
            length,
            false,
            whole.order,
        ))
    }
}

impl ByteBuffer<'static> {
    /// Adopts `vec` as the backing store, without copying.
    pub fn wrap(vec: Vec<u8>) -> Self {
        let capacity = vec.len();
        Self::from_parts(
            Storage::Heap(vec).into_shared(),
            0,
            capacity,
            false,
            ByteOrder::BigEndian,
        )
    }

    /// Adopts `vec` and views only `[offset, offset + length)` of it.
    ///
    /// The resulting buffer has capacity `length`, position 0 and limit
    /// `length`.
    pub fn wrap_range(vec: Vec<u8>, offset: usize, length: usize) -> Result<Self> {
        check_range(offset, length, vec.len())?;
        Ok(Self::from_parts(
            Storage::Heap(vec).into_shared(),
            offset,
            length,
            false,
            ByteOrder::BigEndian,
        ))
    }

    /// Adopts a `BytesMut` as the backing store, without copying.
    pub fn wrap_bytes(bytes: BytesMut) -> Self {
        let capacity = bytes.len();
        Self::from_parts(
            Storage::Bytes(bytes).into_shared(),
            0,
            capacity,
            false,
            ByteOrder::BigEndian,
        )
    }
}

impl<'a> ByteBuffer<'a> {
    /// Uses caller-owned memory as the backing store.
    pub fn wrap_slice(slice: &'a mut [u8]) -> Self {
        let capacity = slice.len();
        Self::from_parts(
            Storage::Borrowed(slice).into_shared(),
            0,
            capacity,
            false,
            ByteOrder::BigEndian,
        )
    }

    /// The bytes in `[position, limit)`.
    ///
    /// # Panics
    ///
    /// Panics if an alias holds a guard from `array_mut` or `chunk_mut`. Use
    /// [`try_chunk`](Self::try_chunk) to get an error instead.
    pub fn chunk(&self) -> Ref<'_, [u8]> {
        let range = self.byte_range(self.position(), self.remaining());
        Ref::map(self.store.borrow(), |storage| &storage[range])
    }

    /// Like [`chunk`](Self::chunk), but fails with `Borrowed` instead of
    /// panicking.
    pub fn try_chunk(&self) -> Result<Ref<'_, [u8]>> {
        let range = self.byte_range(self.position(), self.remaining());
        Ok(Ref::map(borrow_store(&self.store)?, |storage| &storage[range]))
    }

    /// The writable bytes in `[position, limit)`.
    ///
    /// Writes through aliases fail with `Borrowed` until the guard is
    /// dropped.
    pub fn chunk_mut(&mut self) -> Result<RefMut<'_, [u8]>> {
        self.ensure_writable()?;
        let range = self.byte_range(self.position(), self.remaining());
        Ok(RefMut::map(borrow_store_mut(&self.store)?, |storage| {
            &mut storage[range]
        }))
    }

    /// Advances the position by `cnt` bytes.
    pub fn advance(&mut self, cnt: usize) -> Result<()> {
        self.cursor.next_get_index(cnt).map(drop)
    }
}

impl<'a, E: Element> Buffer<'a, E> {
    pub(crate) fn from_parts(
        store: Store<'a>,
        offset: usize,
        capacity: usize,
        read_only: bool,
        order: ByteOrder,
    ) -> Self {
        Self {
            store,
            offset,
            cursor: Cursor::new(capacity),
            read_only,
            order,
            _element: PhantomData,
        }
    }

    pub(crate) fn store(&self) -> &Store<'a> {
        &self.store
    }

    pub(crate) fn set_order_raw(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Byte range in the store covering `count` elements from `index`.
    pub(crate) fn byte_range(&self, index: usize, count: usize) -> Range<usize> {
        let start = self.offset + index * E::WIDTH;
        start..start + count * E::WIDTH
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            Err(BufferError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn read_elements(&self, store: &[u8], index: usize, dst: &mut [E]) {
        let raw = &store[self.byte_range(index, dst.len())];
        for (slot, bytes) in dst.iter_mut().zip(raw.chunks_exact(E::WIDTH)) {
            *slot = E::read(bytes, self.order);
        }
    }

    fn write_elements(&self, store: &mut [u8], index: usize, src: &[E]) {
        let raw = &mut store[self.byte_range(index, src.len())];
        for (value, bytes) in src.iter().zip(raw.chunks_exact_mut(E::WIDTH)) {
            value.write(bytes, self.order);
        }
    }

    // === Cursor ===

    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Sets the position; fails if it would pass the limit.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        self.cursor.set_position(position)
    }

    pub fn limit(&self) -> usize {
        self.cursor.limit()
    }

    /// Sets the limit; fails if it would pass the capacity.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        self.cursor.set_limit(limit)
    }

    /// Records the current position.
    pub fn mark(&mut self) {
        self.cursor.mark()
    }

    pub fn mark_position(&self) -> Option<usize> {
        self.cursor.mark_position()
    }

    /// Returns to the recorded mark.
    pub fn reset(&mut self) -> Result<()> {
        self.cursor.reset()
    }

    /// Prepares for a fresh sequence of writes.
    pub fn clear(&mut self) {
        self.cursor.clear()
    }

    /// Prepares a just-written buffer for reading back what was written.
    pub fn flip(&mut self) {
        self.cursor.flip()
    }

    pub fn rewind(&mut self) {
        self.cursor.rewind()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.cursor.has_remaining()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Byte order used to encode multi-byte elements.
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    // === Element access ===

    /// Reads the element at the position and advances.
    pub fn get(&mut self) -> Result<E> {
        let store = borrow_store(&self.store)?;
        let index = self.cursor.next_get_index(1)?;
        Ok(E::read(&store[self.byte_range(index, 1)], self.order))
    }

    pub fn get_at(&self, index: usize) -> Result<E> {
        let index = self.cursor.check_index(index, 1)?;
        let store = borrow_store(&self.store)?;
        Ok(E::read(&store[self.byte_range(index, 1)], self.order))
    }

    /// Copies `length` elements into `dst[offset..]` and advances.
    pub fn get_into(&mut self, dst: &mut [E], offset: usize, length: usize) -> Result<()> {
        check_range(offset, length, dst.len())?;
        let store = borrow_store(&self.store)?;
        let index = self.cursor.next_get_index(length)?;
        self.read_elements(&store, index, &mut dst[offset..offset + length]);
        Ok(())
    }

    /// Fills all of `dst` and advances.
    pub fn get_slice(&mut self, dst: &mut [E]) -> Result<()> {
        let length = dst.len();
        self.get_into(dst, 0, length)
    }

    /// Writes `value` at the position and advances.
    pub fn put(&mut self, value: E) -> Result<()> {
        self.ensure_writable()?;
        let mut store = borrow_store_mut(&self.store)?;
        let index = self.cursor.next_put_index(1)?;
        value.write(&mut store[self.byte_range(index, 1)], self.order);
        Ok(())
    }

    pub fn put_at(&mut self, index: usize, value: E) -> Result<()> {
        self.ensure_writable()?;
        let index = self.cursor.check_index(index, 1)?;
        let mut store = borrow_store_mut(&self.store)?;
        value.write(&mut store[self.byte_range(index, 1)], self.order);
        Ok(())
    }

    /// Writes `src[offset..offset + length]` at the position and advances.
    pub fn put_from(&mut self, src: &[E], offset: usize, length: usize) -> Result<()> {
        self.ensure_writable()?;
        check_range(offset, length, src.len())?;
        let mut store = borrow_store_mut(&self.store)?;
        let index = self.cursor.next_put_index(length)?;
        self.write_elements(&mut store, index, &src[offset..offset + length]);
        Ok(())
    }

    pub fn put_slice(&mut self, src: &[E]) -> Result<()> {
        self.put_from(src, 0, src.len())
    }

    /// Transfers every remaining element of `src` into this buffer.
    ///
    /// Both positions advance by `src.remaining()`. The source may alias this
    /// buffer's store, even over an overlapping range.
    pub fn put_buffer(&mut self, src: &mut Buffer<'_, E>) -> Result<()> {
        self.ensure_writable()?;
        let count = src.remaining();
        if count > self.remaining() {
            return Err(BufferError::Overflow);
        }
        let from = src.byte_range(src.position(), count);
        let to = self.byte_range(self.position(), count);

        if E::WIDTH == 1 || self.order == src.order {
            // The lifetimes differ, so compare cell addresses.
            let shared = core::ptr::eq(
                Rc::as_ptr(&self.store).cast::<u8>(),
                Rc::as_ptr(&src.store).cast::<u8>(),
            );
            if shared {
                borrow_store_mut(&self.store)?.copy_within(from, to.start);
            } else {
                let source = borrow_store(&src.store)?;
                borrow_store_mut(&self.store)?[to].copy_from_slice(&source[from]);
            }
        } else {
            let mut elements = alloc::vec![self.placeholder(); count];
            {
                let source = borrow_store(&src.store)?;
                src.read_elements(&source, src.position(), &mut elements);
            }
            let mut store = borrow_store_mut(&self.store)?;
            self.write_elements(&mut store, self.position(), &elements);
        }

        src.cursor.next_get_index(count)?;
        self.cursor.next_put_index(count)?;
        Ok(())
    }

    /// Moves `[position, limit)` to the start of the buffer.
    ///
    /// Afterwards position is the number of moved elements, limit is the
    /// capacity and the mark is cleared.
    pub fn compact(&mut self) -> Result<()> {
        self.ensure_writable()?;
        let remaining = self.remaining();
        let from = self.byte_range(self.position(), remaining);
        borrow_store_mut(&self.store)?.copy_within(from, self.offset);
        log::trace!(
            "compacted {} {} elements to offset {}",
            remaining,
            E::NAME,
            self.offset
        );
        self.cursor.compacted(remaining);
        Ok(())
    }

    // === Derivation ===

    /// A new handle over the same store with a copy of this cursor.
    pub fn duplicate(&self) -> Self {
        Self {
            store: self.store.clone(),
            offset: self.offset,
            cursor: self.cursor,
            read_only: self.read_only,
            order: self.order,
            _element: PhantomData,
        }
    }

    /// Like [`duplicate`](Self::duplicate), but the result rejects writes.
    pub fn as_read_only_buffer(&self) -> Self {
        let mut duplicate = self.duplicate();
        duplicate.read_only = true;
        duplicate
    }

    /// A new buffer over `[position, limit)`.
    pub fn slice(&self) -> Self {
        self.slice_unchecked(self.position(), self.remaining())
    }

    /// A new buffer over the `length` elements starting at `index`.
    pub fn slice_at(&self, index: usize, length: usize) -> Result<Self> {
        let index = self.cursor.check_index(index, length)?;
        Ok(self.slice_unchecked(index, length))
    }

    fn slice_unchecked(&self, index: usize, length: usize) -> Self {
        log::trace!("slicing {} at {} for {}", E::NAME, index, length);
        Self::from_parts(
            self.store.clone(),
            self.offset + index * E::WIDTH,
            length,
            self.read_only,
            self.order,
        )
    }

    // === Raw access ===

    /// The raw bytes of the whole buffer, `capacity * WIDTH` long.
    ///
    /// While the guard is alive, writes through any alias fail with
    /// `Borrowed`.
    pub fn array(&self) -> Result<Ref<'_, [u8]>> {
        self.ensure_writable()?;
        let range = self.byte_range(0, self.capacity());
        Ok(Ref::map(borrow_store(&self.store)?, |storage| &storage[range]))
    }

    /// Mutable access to the raw bytes of the whole buffer.
    ///
    /// While the guard is alive, reads and writes through any alias fail
    /// with `Borrowed`.
    pub fn array_mut(&mut self) -> Result<RefMut<'_, [u8]>> {
        self.ensure_writable()?;
        let range = self.byte_range(0, self.capacity());
        Ok(RefMut::map(borrow_store_mut(&self.store)?, |storage| {
            &mut storage[range]
        }))
    }

    /// Byte offset of element 0 within the backing store.
    pub fn array_offset(&self) -> usize {
        self.offset
    }

    /// Copies the elements in `[position, limit)`.
    ///
    /// # Panics
    ///
    /// Panics if an alias holds a guard from `array_mut` or `chunk_mut`.
    pub fn to_vec(&self) -> Vec<E> {
        let mut out = alloc::vec![self.placeholder(); self.remaining()];
        self.read_elements(&self.store.borrow(), self.position(), &mut out);
        out
    }

    fn placeholder(&self) -> E {
        E::read(&[0u8; 8][..E::WIDTH], self.order)
    }

    // === Comparison ===

    fn window_cmp<'b>(&self, other: &Buffer<'b, E>) -> (Option<usize>, Ordering) {
        let lhs_store = self.store.borrow();
        let rhs_store = other.store.borrow();
        let lhs = &lhs_store[self.byte_range(self.position(), self.remaining())];
        let rhs = &rhs_store[other.byte_range(other.position(), other.remaining())];

        let pairs = lhs.chunks_exact(E::WIDTH).zip(rhs.chunks_exact(E::WIDTH));
        for (index, (a, b)) in pairs.enumerate() {
            let ordering = E::read(a, self.order).compare(E::read(b, other.order));
            if ordering != Ordering::Equal {
                return (Some(index), ordering);
            }
        }
        (None, self.remaining().cmp(&other.remaining()))
    }

    /// Relative index of the first element where the two windows differ.
    ///
    /// Like every comparison, this panics if either store is held by a guard
    /// from `array_mut` or `chunk_mut`.
    ///
    /// Returns `None` when both windows have the same length and content. When
    /// one window is a strict prefix of the other, returns the shorter length.
    pub fn mismatch<'b>(&self, other: &Buffer<'b, E>) -> Option<usize> {
        match self.window_cmp(other) {
            (Some(index), _) => Some(index),
            (None, Ordering::Equal) => None,
            (None, _) => Some(self.remaining().min(other.remaining())),
        }
    }

    /// Lexicographic comparison of the two windows.
    pub fn compare_to<'b>(&self, other: &Buffer<'b, E>) -> Ordering {
        self.window_cmp(other).1
    }

    /// Order-sensitive hash of `[position, limit)`.
    ///
    /// # Panics
    ///
    /// Panics if an alias holds a guard from `array_mut` or `chunk_mut`.
    pub fn hash_code(&self) -> i32 {
        let store = self.store.borrow();
        let window = &store[self.byte_range(self.position(), self.remaining())];
        window
            .chunks_exact(E::WIDTH)
            .rev()
            .fold(1i32, |h, bytes| {
                h.wrapping_mul(31)
                    .wrapping_add(E::read(bytes, self.order).hash_value())
            })
    }
}

impl<'a, 'b, E: Element> PartialEq<Buffer<'b, E>> for Buffer<'a, E> {
    fn eq(&self, other: &Buffer<'b, E>) -> bool {
        self.remaining() == other.remaining() && self.compare_to(other) == Ordering::Equal
    }
}

impl<E: Element> Eq for Buffer<'_, E> {}

impl<'a, 'b, E: Element> PartialOrd<Buffer<'b, E>> for Buffer<'a, E> {
    fn partial_cmp(&self, other: &Buffer<'b, E>) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl<E: Element> Ord for Buffer<'_, E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

impl<E: Element> Hash for Buffer<'_, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl<E: Element> fmt::Display for Buffer<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[pos={} lim={} cap={}]",
            E::NAME,
            self.position(),
            self.limit(),
            self.capacity()
        )
    }
}

impl<E: Element> fmt::Debug for Buffer<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(E::NAME)
            .field("position", &self.position())
            .field("limit", &self.limit())
            .field("capacity", &self.capacity())
            .field("mark", &self.mark_position())
            .field("offset", &self.offset)
            .field("order", &self.order)
            .field("read_only", &self.read_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn filled(content: &[u8]) -> ByteBuffer<'static> {
        ByteBuffer::wrap(content.to_vec())
    }

    #[test]
    fn allocate_starts_empty_cursor() {
        let buffer = CharBuffer::allocate(16);
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.limit(), 16);
        assert_eq!(buffer.order(), ByteOrder::native());
        assert!(!buffer.is_read_only());
        assert_eq!(ByteBuffer::allocate(3).order(), ByteOrder::BigEndian);
    }

    #[test]
    fn flip_reads_back_what_was_written() {
        fn roundtrip<E: Element + PartialEq>(values: &[E]) {
            let mut buffer = Buffer::<E>::allocate(values.len() + 3);
            for value in values {
                buffer.put(*value).unwrap();
            }
            buffer.flip();
            assert_eq!(buffer.remaining(), values.len());
            for value in values {
                assert_eq!(buffer.get().unwrap(), *value);
            }
            assert_eq!(buffer.get(), Err(BufferError::Underflow));
        }

        roundtrip::<u8>(&[1, 2, 0xff]);
        roundtrip::<u16>(&[0x41, 0xd83d, 0xde00]);
        roundtrip::<i32>(&[-1, i32::MIN, 7]);
        roundtrip::<i64>(&[i64::MAX, -9]);
    }

    #[test]
    fn relative_bounds() {
        let mut buffer = ByteBuffer::allocate(2);
        buffer.put(1).unwrap();
        buffer.put(2).unwrap();
        assert_eq!(buffer.put(3), Err(BufferError::Overflow));
        assert_eq!(buffer.get(), Err(BufferError::Underflow));
        assert_eq!(buffer.position(), 2);
    }

    #[test]
    fn absolute_access_ignores_position() {
        let mut buffer = filled(&[10, 20, 30, 40]);
        buffer.set_limit(3).unwrap();
        assert_eq!(buffer.get_at(2), Ok(30));
        assert_eq!(
            buffer.get_at(3),
            Err(BufferError::IndexOutOfBounds { index: 3, len: 3 })
        );
        buffer.put_at(0, 11).unwrap();
        assert!(buffer.put_at(3, 0).is_err());
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.get(), Ok(11));
    }

    #[test]
    fn bulk_get_and_put() {
        let mut buffer = ByteBuffer::allocate(6);
        buffer.put_from(&[9, 1, 2, 3, 9], 1, 3).unwrap();
        buffer.put_slice(&[4, 5]).unwrap();
        assert_eq!(buffer.put_slice(&[6, 7]), Err(BufferError::Overflow));
        assert_eq!(buffer.position(), 5);
        buffer.flip();

        let mut dst = [0u8; 6];
        assert_eq!(
            buffer.get_into(&mut dst, 4, 3),
            Err(BufferError::IndexOutOfBounds { index: 4, len: 6 })
        );
        assert_eq!(buffer.get_into(&mut dst, 0, 6), Err(BufferError::Underflow));
        buffer.get_into(&mut dst, 1, 5).unwrap();
        assert_eq!(dst, [0, 1, 2, 3, 4, 5]);
        assert!(!buffer.has_remaining());

        buffer.rewind();
        let mut two = [0u8; 2];
        buffer.get_slice(&mut two).unwrap();
        assert_eq!(two, [1, 2]);
    }

    #[test]
    fn read_only_rejects_every_put() {
        let buffer = filled(&[1, 2, 3]);
        let mut read_only = buffer.as_read_only_buffer();
        assert!(read_only.is_read_only());
        assert!(!buffer.is_read_only());

        assert_eq!(read_only.put(1), Err(BufferError::ReadOnly));
        assert_eq!(read_only.put_at(0, 1), Err(BufferError::ReadOnly));
        assert_eq!(read_only.put_slice(&[1]), Err(BufferError::ReadOnly));
        assert_eq!(read_only.compact(), Err(BufferError::ReadOnly));
        assert!(read_only.array().is_err());

        // full and read-only still reports read-only
        read_only.set_position(3).unwrap();
        assert_eq!(read_only.put(1), Err(BufferError::ReadOnly));

        // reads still work and derived views stay read-only
        assert_eq!(read_only.get_at(1), Ok(2));
        assert!(read_only.duplicate().is_read_only());
        assert!(read_only.slice().is_read_only());
    }

    #[test]
    fn compact_preserves_unread_tail() {
        let mut buffer = filled(b"ABCD");
        buffer.set_position(2).unwrap();
        buffer.mark();
        buffer.compact().unwrap();
        assert_eq!(buffer.position(), 2);
        assert_eq!(buffer.limit(), 4);
        assert_eq!(buffer.mark_position(), None);
        assert_eq!(&buffer.array().unwrap()[..2], b"CD");
    }

    #[test]
    fn compact_within_slice_stays_in_window() {
        let base = filled(b"xxABCDyy");
        let mut window = base.slice_at(2, 4).unwrap();
        window.set_position(3).unwrap();
        window.compact().unwrap();
        assert_eq!(window.position(), 1);
        assert_eq!(&*base.array().unwrap(), b"xxDBCDyy");
    }

    #[test]
    fn duplicate_shares_content_not_cursor() {
        let mut original = ByteBuffer::allocate(4);
        let mut duplicate = original.duplicate();

        duplicate.put(7).unwrap();
        assert_eq!(original.position(), 0);
        assert_eq!(original.get_at(0), Ok(7));

        original.put_at(3, 9).unwrap();
        assert_eq!(duplicate.get_at(3), Ok(9));

        original.set_position(2).unwrap();
        original.mark();
        let copy = original.duplicate();
        assert_eq!(copy.position(), 2);
        assert_eq!(copy.mark_position(), Some(2));
    }

    #[test]
    fn slice_maps_to_absolute_elements() {
        let base = filled(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let slice = base.slice_at(3, 4).unwrap();
        assert_eq!(slice.capacity(), 4);
        assert_eq!(slice.position(), 0);
        assert_eq!(slice.limit(), 4);
        for k in 0..4 {
            assert_eq!(slice.get_at(k).unwrap(), base.get_at(3 + k).unwrap());
        }
        assert_eq!(slice.array_offset(), 3);
        assert!(base.slice_at(5, 4).is_err());
        assert!(base.slice_at(8, 0).is_ok());

        let mut cursor_slice = filled(&[0, 1, 2, 3]);
        cursor_slice.set_position(1).unwrap();
        cursor_slice.set_limit(3).unwrap();
        let mut slice = cursor_slice.slice();
        assert_eq!(slice.capacity(), 2);
        slice.put(42).unwrap();
        assert_eq!(cursor_slice.get_at(1), Ok(42));
    }

    #[test]
    fn wide_slices_offset_in_bytes() {
        let mut ints = IntBuffer::wrap_elements(&[1, 2, 3, 4]);
        ints.set_position(1).unwrap();
        let slice = ints.slice();
        assert_eq!(slice.array_offset(), 4);
        assert_eq!(slice.to_vec(), vec![2, 3, 4]);
    }

    #[test]
    fn wrap_range_views_part_of_vec() {
        let mut buffer = ByteBuffer::wrap_range(vec![1, 2, 3, 4, 5], 1, 3).unwrap();
        assert_eq!(buffer.capacity(), 3);
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.limit(), 3);
        assert_eq!(buffer.get(), Ok(2));
        assert_eq!(buffer.array_offset(), 1);
        assert!(ByteBuffer::wrap_range(vec![0; 4], 2, 3).is_err());
        assert!(ByteBuffer::wrap_range(vec![0; 4], usize::MAX, 2).is_err());
    }

    #[test]
    fn wrap_elements_range_selects_window() {
        let chars = CharBuffer::wrap_elements_range(&[0x61, 0x62, 0x63], 1, 1).unwrap();
        assert_eq!(chars.capacity(), 1);
        assert_eq!(chars.position(), 0);
        assert_eq!(chars.limit(), 1);
        assert_eq!(chars.to_vec(), vec![0x62]);
        assert_eq!(chars.array_offset(), 2);

        // agrees with the byte form
        let ints = IntBuffer::wrap_elements_range(&[1, 2, 3, 4], 1, 2).unwrap();
        let bytes = ByteBuffer::wrap_range(vec![1, 2, 3, 4], 1, 2).unwrap();
        assert_eq!(
            (ints.position(), ints.limit(), ints.capacity()),
            (bytes.position(), bytes.limit(), bytes.capacity())
        );
        assert_eq!(ints.to_vec(), vec![2, 3]);
        assert!(IntBuffer::wrap_elements_range(&[1], 1, 1).is_err());
    }

    #[test]
    fn wrap_slice_writes_through() {
        let mut backing = [0u8; 4];
        {
            let mut buffer = ByteBuffer::wrap_slice(&mut backing);
            buffer.put_slice(&[1, 2]).unwrap();
            buffer.chunk_mut().unwrap()[0] = 3;
            buffer.advance(1).unwrap();
            assert_eq!(&*buffer.chunk(), &[0]);
            assert_eq!(buffer.advance(2), Err(BufferError::Underflow));
        }
        assert_eq!(backing, [1, 2, 3, 0]);
    }

    #[test]
    fn wrap_bytes_adopts_storage() {
        let bytes = BytesMut::from(&b"hey"[..]);
        let mut buffer = ByteBuffer::wrap_bytes(bytes);
        assert_eq!(buffer.capacity(), 3);
        assert_eq!(buffer.get(), Ok(b'h'));
    }

    #[test]
    fn put_buffer_transfers_remaining() {
        let mut src = filled(&[1, 2, 3, 4]);
        src.set_position(1).unwrap();
        let mut dst = ByteBuffer::allocate(4);
        dst.put(0).unwrap();
        dst.put_buffer(&mut src).unwrap();
        assert_eq!(src.remaining(), 0);
        assert_eq!(dst.position(), 4);
        assert_eq!(&*dst.array().unwrap(), &[0, 2, 3, 4]);

        let mut small = ByteBuffer::allocate(1);
        src.rewind();
        assert_eq!(small.put_buffer(&mut src), Err(BufferError::Overflow));
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn put_buffer_between_aliases() {
        let mut buffer = filled(&[1, 2, 3, 4, 0, 0]);
        let mut source = buffer.duplicate();
        source.set_limit(4).unwrap();
        buffer.set_position(2).unwrap();
        buffer.put_buffer(&mut source).unwrap();
        assert_eq!(&*buffer.array().unwrap(), &[1, 2, 1, 2, 3, 4]);
        assert_eq!(buffer.position(), 6);
        assert_eq!(source.position(), 4);
    }

    #[test]
    fn put_buffer_from_view_at_same_start() {
        let mut buffer = filled(&[1, 2, 3, 4]);
        let mut view = buffer.slice();
        buffer.put_buffer(&mut view).unwrap();
        assert_eq!(buffer.position(), 4);
        assert_eq!(view.position(), 4);
        assert_eq!(&*buffer.array().unwrap(), &[1, 2, 3, 4]);

        let mut wide = IntBuffer::wrap_elements(&[5, 6]);
        let mut twin = wide.duplicate();
        wide.put_buffer(&mut twin).unwrap();
        assert_eq!((wide.position(), twin.position()), (2, 2));
        wide.rewind();
        assert_eq!(wide.to_vec(), vec![5, 6]);
    }

    #[test]
    fn put_buffer_converts_byte_order() {
        let bytes = filled(&[0, 0, 0, 1]);
        let mut big = bytes.as_int_buffer();
        let mut little_bytes = ByteBuffer::allocate(4);
        little_bytes.set_order(ByteOrder::LittleEndian);
        let mut little = little_bytes.as_int_buffer();
        little.put_buffer(&mut big).unwrap();
        assert_eq!(&*little_bytes.array().unwrap(), &[1, 0, 0, 0]);
        assert_eq!(little.get_at(0), Ok(1));
    }

    #[test]
    fn equality_uses_visible_window() {
        let mut a = filled(&[9, 1, 2, 3]);
        let b = filled(&[1, 2, 3]);
        assert_ne!(a, b);
        a.set_position(1).unwrap();
        assert_eq!(a, b);
        a.set_limit(3).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn ordering_is_lexicographic_unsigned() {
        let low = filled(&[0x01, 0x02]);
        let high = filled(&[0xff]);
        assert!(low < high);
        let prefix = filled(&[0x01]);
        assert!(prefix < low);
        assert_eq!(low.cmp(&low.duplicate()), Ordering::Equal);
    }

    #[test]
    fn mismatch_reports_first_difference() {
        let a = filled(&[1, 2, 3, 4]);
        let b = filled(&[1, 2, 9, 4]);
        assert_eq!(a.mismatch(&b), Some(2));
        assert_eq!(a.mismatch(&a.duplicate()), None);

        let prefix = filled(&[1, 2]);
        assert_eq!(a.mismatch(&prefix), Some(2));
        assert_eq!(prefix.mismatch(&a), Some(2));

        let empty = ByteBuffer::allocate(0);
        assert_eq!(empty.mismatch(&ByteBuffer::allocate(0)), None);
        assert_eq!(empty.mismatch(&a), Some(0));
    }

    #[test]
    fn hash_depends_on_window_and_order() {
        let a = filled(&[1, 2]);
        let b = filled(&[2, 1]);
        assert_ne!(a.hash_code(), b.hash_code());
        assert_eq!(a.hash_code(), 31 * (31 + 2) + 1);

        let mut c = filled(&[7, 1, 2]);
        c.set_position(1).unwrap();
        assert_eq!(a.hash_code(), c.hash_code());
        assert_eq!(ByteBuffer::allocate(0).hash_code(), 1);
    }

    #[test]
    fn float_windows_treat_nan_as_equal() {
        let a = FloatBuffer::wrap_elements(&[f32::NAN, 1.0]);
        let b = FloatBuffer::wrap_elements(&[f32::NAN, 1.0]);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        let zero = DoubleBuffer::wrap_elements(&[0.0]);
        let negative_zero = DoubleBuffer::wrap_elements(&[-0.0]);
        assert!(negative_zero < zero);
    }

    #[test]
    fn display_summarises_cursor() {
        let mut buffer = ByteBuffer::allocate(16);
        buffer.set_position(3).unwrap();
        assert_eq!(buffer.to_string(), "ByteBuffer[pos=3 lim=16 cap=16]");
        assert_eq!(
            IntBuffer::allocate(2).to_string(),
            "IntBuffer[pos=0 lim=2 cap=2]"
        );
    }

    #[test]
    fn guards_turn_conflicting_access_into_errors() {
        let mut buffer = filled(&[1, 2, 3, 4]);
        let mut alias = buffer.duplicate();
        {
            let raw = buffer.array().unwrap();
            assert_eq!(raw[0], 1);
            assert_eq!(alias.put(9), Err(BufferError::Borrowed));
            assert_eq!(alias.put_slice(&[9, 9]), Err(BufferError::Borrowed));
            assert_eq!(alias.compact(), Err(BufferError::Borrowed));
            assert_eq!(alias.position(), 0);
            // shared reads are fine next to a shared guard
            assert_eq!(alias.get_at(1), Ok(2));
        }
        alias.put(9).unwrap();
        {
            let _raw = buffer.array_mut().unwrap();
            assert_eq!(alias.get(), Err(BufferError::Borrowed));
            assert_eq!(alias.position(), 1);
            assert!(alias.array().is_err());
            assert!(alias.try_chunk().is_err());
        }
        assert_eq!(buffer.get(), Ok(9));
    }

    #[test]
    fn views_keep_the_store_alive() {
        let slice = {
            let base = filled(&[5, 6, 7]);
            base.slice_at(1, 2).unwrap()
        };
        assert_eq!(slice.to_vec(), vec![6, 7]);
    }
}
