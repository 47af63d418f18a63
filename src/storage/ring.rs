//! Cursor bookkeeping shared by the numeric and string rings.

use crate::error::DataError;

/// Read/write cursors over a ring of `capacity` slots.
///
/// A write to a full ring overwrites the oldest value. Logical index 0 is
/// always the oldest unread value.
#[derive(Debug, Clone)]
pub(crate) struct RingIndex {
    capacity: usize,
    head: usize,
    tail: usize,
    len: usize,
}

impl RingIndex {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Claim the slot for the next write and advance the write cursor.
    pub(crate) fn push(&mut self) -> usize {
        let slot = self.head;
        self.head = (self.head + 1) % self.capacity;
        if self.len == self.capacity {
            self.tail = (self.tail + 1) % self.capacity;
        } else {
            self.len += 1;
        }
        slot
    }

    /// Slot holding the value at logical `index`.
    pub(crate) fn slot(&self, index: usize) -> Result<usize, DataError> {
        if index >= self.len {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok((self.tail + index) % self.capacity)
    }

    /// Release the oldest value, returning the slot it occupies.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let slot = self.tail;
        self.tail = (self.tail + 1) % self.capacity;
        self.len -= 1;
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut ring = RingIndex::new(3);
        assert_eq!(ring.push(), 0);
        assert_eq!(ring.push(), 1);
        assert_eq!(ring.push(), 2);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.slot(0), Ok(0));
    }

    #[test]
    fn test_overwrite_moves_oldest() {
        let mut ring = RingIndex::new(3);
        for _ in 0..4 {
            ring.push();
        }
        assert_eq!(ring.len(), 3);
        // Slot 0 now holds the newest value
        assert_eq!(ring.slot(0), Ok(1));
        assert_eq!(ring.slot(2), Ok(0));
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut ring = RingIndex::new(3);
        ring.push();
        assert_eq!(
            ring.slot(1),
            Err(DataError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_pop_in_fifo_order() {
        let mut ring = RingIndex::new(2);
        assert_eq!(ring.pop(), None);
        ring.push();
        ring.push();
        ring.push();
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(0));
        assert_eq!(ring.pop(), None);
    }
}
