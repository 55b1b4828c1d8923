//! Position/limit/mark state shared by every buffer kind.
//!
//! The cursor never touches element storage. It only answers "which index
//! does the next operation act on" and enforces
//! `0 <= mark <= position <= limit <= capacity`.

use crate::error::{BufferError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    capacity: usize,
    position: usize,
    limit: usize,
    mark: Option<usize>,
}

impl Cursor {
    /// A cursor over `capacity` elements with the whole range active.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            position: 0,
            limit: capacity,
            mark: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor. A mark beyond the new position is discarded.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(BufferError::IndexOutOfBounds {
                index: position,
                len: self.limit,
            });
        }
        if self.mark.is_some_and(|mark| mark > position) {
            self.mark = None;
        }
        self.position = position;
        self.check_invariant();
        Ok(())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Moves the limit, pulling position and mark down with it.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity {
            return Err(BufferError::IndexOutOfBounds {
                index: limit,
                len: self.capacity,
            });
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        if self.mark.is_some_and(|mark| mark > limit) {
            self.mark = None;
        }
        self.check_invariant();
        Ok(())
    }

    pub fn mark(&mut self) {
        self.mark = Some(self.position);
    }

    pub fn mark_position(&self) -> Option<usize> {
        self.mark
    }

    pub fn reset(&mut self) -> Result<()> {
        let mark = self.mark.ok_or(BufferError::InvalidMark)?;
        self.position = mark;
        self.check_invariant();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity;
        self.mark = None;
    }

    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
        self.mark = None;
    }

    pub fn rewind(&mut self) {
        self.position = 0;
        self.mark = None;
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Claims `n` elements for a relative read, returning the first index.
    pub(crate) fn next_get_index(&mut self, n: usize) -> Result<usize> {
        if self.remaining() < n {
            return Err(BufferError::Underflow);
        }
        let index = self.position;
        self.position += n;
        Ok(index)
    }

    /// Claims `n` elements for a relative write, returning the first index.
    pub(crate) fn next_put_index(&mut self, n: usize) -> Result<usize> {
        if self.remaining() < n {
            return Err(BufferError::Overflow);
        }
        let index = self.position;
        self.position += n;
        Ok(index)
    }

    /// Checks that `n` elements starting at `index` lie below the limit.
    pub(crate) fn check_index(&self, index: usize, n: usize) -> Result<usize> {
        match index.checked_add(n) {
            Some(end) if end <= self.limit => Ok(index),
            _ => Err(BufferError::IndexOutOfBounds {
                index,
                len: self.limit,
            }),
        }
    }

    /// Replaces the whole state after a compaction.
    pub(crate) fn compacted(&mut self, remaining: usize) {
        self.position = remaining;
        self.limit = self.capacity;
        self.mark = None;
    }

    fn check_invariant(&self) {
        debug_assert!(self.mark.map_or(true, |mark| mark <= self.position));
        debug_assert!(self.position <= self.limit);
        debug_assert!(self.limit <= self.capacity);
    }
}
