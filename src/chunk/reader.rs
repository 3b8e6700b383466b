use crate::errors::DecodeError;

/// Borrows `len` bytes at `offset`, failing instead of panicking when the
/// payload is too short.
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], DecodeError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(DecodeError::OutOfBounds {
            offset,
            len,
            available: buf.len(),
        })
}

pub fn array_at<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    let mut out = [0u8; N];
    out.copy_from_slice(slice_at(buf, offset, N)?);
    Ok(out)
}

/// Sequential little-endian reader over a chunk payload.
pub struct LeSliceReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> LeSliceReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        slice_at(self.buf, self.pos, n)?;
        self.pos += n;
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = array_at::<N>(self.buf, self.pos)?;
        self.pos += N;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.take()?))
    }
}
