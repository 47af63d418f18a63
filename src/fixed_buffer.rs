//! Bounded writer over a caller-supplied byte buffer.

use core::fmt;

/// Accumulates UTF-8 text into a fixed-length buffer.
///
/// Writes that do not fit are truncated at the last whole character; the
/// buffer is never overrun.
pub struct FixedLengthWriter<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> FixedLengthWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, len: 0 }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Copy as much of `s` as fits. Returns true if all of `s` was written.
    pub fn write_truncating(&mut self, s: &str) -> bool {
        let available = self.buffer.len() - self.len;
        let mut cut = s.len().min(available);
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }

        self.buffer[self.len..self.len + cut].copy_from_slice(&s.as_bytes()[..cut]);
        self.len += cut;
        cut == s.len()
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buffer[..self.len]).unwrap_or_default()
    }
}

impl fmt::Write for FixedLengthWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.write_truncating(s) {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}
