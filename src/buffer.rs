//! Bounds-checked byte cursors over caller-provided buffers.
//!
//! Every codec writes through a `ByteWriter` and reads through a `ByteReader`.
//! The cursor position replaces the "return the end pointer" convention: the
//! number of bytes an encode wrote (or a decode consumed) is simply the final
//! `position()`. A write that would run past the end of the buffer fails with
//! `OutputOverflow` before touching any byte.

use crate::error::IntPackError;

//==================================================================================
// 1. Writer
//==================================================================================

/// Append-only cursor over a mutable byte slice with a fixed capacity.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        ByteWriter { buf, pos: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Claims the next `len` bytes, zero-filled, and advances past them.
    pub fn reserve(&mut self, len: usize) -> Result<&mut [u8], IntPackError> {
        let end = self.pos.checked_add(len).ok_or(IntPackError::OutputOverflow {
            needed: usize::MAX,
            capacity: self.buf.len(),
        })?;
        if end > self.buf.len() {
            return Err(IntPackError::OutputOverflow {
                needed: end,
                capacity: self.buf.len(),
            });
        }
        let region = &mut self.buf[self.pos..end];
        region.fill(0);
        self.pos = end;
        Ok(region)
    }

    #[inline]
    pub fn put_u8(&mut self, byte: u8) -> Result<(), IntPackError> {
        self.reserve(1)?[0] = byte;
        Ok(())
    }

    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<(), IntPackError> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }
}

//==================================================================================
// 2. Reader
//==================================================================================

/// Forward cursor over an immutable byte slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The unread tail of the buffer, without advancing.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], IntPackError> {
        if len > self.remaining() {
            return Err(IntPackError::TruncatedInput {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    #[inline]
    pub fn take_u8(&mut self) -> Result<u8, IntPackError> {
        Ok(self.take(1)?[0])
    }

    /// Advances `len` bytes without looking at them.
    pub fn skip(&mut self, len: usize) -> Result<(), IntPackError> {
        self.take(len).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_refuses_to_overflow() {
        let mut buf = [0xAAu8; 4];
        let mut writer = ByteWriter::new(&mut buf);
        writer.put_slice(&[1, 2, 3]).unwrap();
        let err = writer.put_slice(&[4, 5]).unwrap_err();
        assert_eq!(err, IntPackError::OutputOverflow { needed: 5, capacity: 4 });
        assert_eq!(writer.position(), 3);
        // The untouched tail byte must not have been modified by the failed write.
        assert_eq!(buf, [1, 2, 3, 0xAA]);
    }

    #[test]
    fn test_reserve_zero_fills() {
        let mut buf = [0xFFu8; 3];
        let mut writer = ByteWriter::new(&mut buf);
        let region = writer.reserve(2).unwrap();
        assert_eq!(region, &[0, 0]);
        assert_eq!(writer.remaining(), 1);
    }

    #[test]
    fn test_reader_reports_truncation() {
        let data = [7u8, 8, 9];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.take_u8().unwrap(), 7);
        assert_eq!(reader.take(2).unwrap(), &[8, 9]);
        assert_eq!(
            reader.take_u8().unwrap_err(),
            IntPackError::TruncatedInput { needed: 1, available: 0 }
        );
    }
}
