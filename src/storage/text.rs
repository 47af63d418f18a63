//! Fixed-length string field.

use alloc::string::String;
use alloc::vec::Vec;

use super::FieldType;
use super::ring::RingIndex;
use crate::error::DataError;
use crate::fixed_buffer::FixedLengthWriter;

/// Ring buffer of short text samples, such as a cardinal wind direction.
///
/// Values are stored as written, with no averaging, truncated to
/// `max_length` bytes on a character boundary.
#[derive(Debug, Clone)]
pub struct StringDataField {
    field_type: FieldType,
    channel: u32,
    max_length: usize,
    data: Vec<String>,
    ring: RingIndex,
}

impl StringDataField {
    pub fn new(
        field_type: FieldType,
        max_length: usize,
        capacity: usize,
    ) -> Result<Self, DataError> {
        if capacity == 0 {
            return Err(DataError::InvalidConfiguration(
                "field capacity must be at least 1",
            ));
        }
        if max_length == 0 {
            return Err(DataError::InvalidConfiguration(
                "string length must be at least 1",
            ));
        }

        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, || String::with_capacity(max_length));

        Ok(Self {
            field_type,
            channel: 0,
            max_length,
            data,
            ring: RingIndex::new(capacity),
        })
    }

    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn channel_number(&self) -> u32 {
        self.channel
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn stored_count(&self) -> usize {
        self.ring.len()
    }

    pub fn has_data(&self) -> bool {
        self.ring.len() > 0
    }

    /// Write `value` into the next slot, overwriting the oldest when full.
    pub fn store_data(&mut self, value: &str) {
        let mut cut = value.len().min(self.max_length);
        while !value.is_char_boundary(cut) {
            cut -= 1;
        }

        let slot = self.ring.push();
        let entry = &mut self.data[slot];
        entry.clear();
        entry.push_str(&value[..cut]);
    }

    /// Value at logical `index` (0 is the oldest).
    pub fn data(&self, index: usize) -> Result<&str, DataError> {
        Ok(self.data[self.ring.slot(index)?].as_str())
    }

    /// Copy the value at `index` into `buffer`, truncating to fit.
    /// Returns the number of bytes written.
    pub fn copy(&self, buffer: &mut [u8], index: usize) -> Result<usize, DataError> {
        let value = self.data(index)?;
        let mut writer = FixedLengthWriter::new(buffer);
        writer.write_truncating(value);
        Ok(writer.len())
    }

    /// Remove the oldest value and return it.
    ///
    /// The slot is only reused by a later write, so the returned slice stays
    /// valid for as long as the field is borrowed.
    pub fn take(&mut self) -> Option<&str> {
        let slot = self.ring.pop()?;
        Some(self.data[slot].as_str())
    }
}
