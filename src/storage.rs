use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};

use bytes::BytesMut;

use crate::error::{BufferError, Result};

/// Shared handle to a backing store.
///
/// Every buffer, duplicate, slice and numeric view holds one of these, so the
/// store stays alive for as long as any of them does.
pub(crate) type Store<'a> = Rc<RefCell<Storage<'a>>>;

/// Flexible backing store to allow both owned and borrowed memory.
///
/// The length is fixed at construction; nothing ever resizes it.
#[derive(Debug)]
pub enum Storage<'a> {
    Heap(Vec<u8>),
    Bytes(BytesMut),
    Borrowed(&'a mut [u8]),
}

impl Storage<'_> {
    pub fn heap_zeroed(len: usize) -> Self {
        let mut buf: Vec<u8> = Default::default();
        buf.resize(len, 0);
        log::trace!("allocated {} byte backing store", len);
        Self::Heap(buf)
    }
}

impl<'a> Storage<'a> {
    pub(crate) fn into_shared(self) -> Store<'a> {
        Rc::new(RefCell::new(self))
    }
}

/// Borrows the store for reading, failing while an alias holds it mutably.
pub(crate) fn borrow_store<'s, 'a>(store: &'s Store<'a>) -> Result<Ref<'s, Storage<'a>>> {
    store.try_borrow().map_err(|_| BufferError::Borrowed)
}

/// Borrows the store for writing, failing while any alias holds a guard.
pub(crate) fn borrow_store_mut<'s, 'a>(
    store: &'s Store<'a>,
) -> Result<RefMut<'s, Storage<'a>>> {
    store.try_borrow_mut().map_err(|_| BufferError::Borrowed)
}

impl core::ops::Deref for Storage<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Heap(vec) => &vec[..],
            Self::Bytes(bytes) => &bytes[..],
            Self::Borrowed(slice) => &*slice,
        }
    }
}

impl core::ops::DerefMut for Storage<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Heap(vec) => &mut vec[..],
            Self::Bytes(bytes) => &mut bytes[..],
            Self::Borrowed(slice) => &mut *slice,
        }
    }
}
