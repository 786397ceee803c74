//! Unsigned LEB128 for `u32` fields.

use crate::DecodeError;

pub(super) fn write_u32(buf: &mut Vec<u8>, value: u32) {
    let mut val = value;
    loop {
        // Masked to seven bits, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if val == 0 {
            break;
        }
    }
}

/// Cursor over an encoded buffer.
pub(super) struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    pub(super) fn new(bytes: &'b [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    #[inline]
    pub(super) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(super) fn byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    pub(super) fn take(&mut self, len: usize) -> Result<&'b [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof {
                offset: self.bytes.len(),
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(super) fn u32(&mut self) -> Result<u32, DecodeError> {
        let start = self.pos;
        let mut value: u32 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.byte()?;
            let bits = u32::from(byte & 0x7F);
            if shift >= 32 || (shift == 28 && bits > 0x0F) {
                return Err(DecodeError::Overflow { offset: start });
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}
