// Bounds-checked little-endian reader over an in-memory buffer

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::{DecodeError, Result};

/// Sequential reader that never reads past its buffer. Every failed read
/// leaves the position untouched.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    pub fn data(&self) -> &'a [u8] {
        *self.inner.get_ref()
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(DecodeError::TruncatedInput {
                offset: self.position(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        self.inner.read_u8().map_err(|_| self.truncated(1))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        self.inner
            .read_u16::<LittleEndian>()
            .map_err(|_| self.truncated(2))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        self.inner
            .read_u32::<LittleEndian>()
            .map_err(|_| self.truncated(4))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        self.inner
            .read_i32::<LittleEndian>()
            .map_err(|_| self.truncated(4))
    }

    pub fn read_fourcc(&mut self) -> Result<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Borrows the next `n` bytes straight out of the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.position();
        let data = self.data();
        self.inner.set_position((start + n) as u64);
        Ok(&data[start..start + n])
    }

    /// A reader limited to the next `n` bytes; this reader moves past them.
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>> {
        Ok(ByteReader::new(self.read_bytes(n)?))
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        let target = self.position().checked_add(n).ok_or(DecodeError::OutOfRange {
            target: u64::MAX,
            len: self.len(),
        })?;
        self.seek(target)
    }

    pub fn seek(&mut self, target: usize) -> Result<()> {
        if target > self.len() {
            return Err(DecodeError::OutOfRange {
                target: target as u64,
                len: self.len(),
            });
        }
        self.inner.set_position(target as u64);
        Ok(())
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::TruncatedInput {
            offset: self.position(),
            needed,
            remaining: self.remaining(),
        }
    }
}
