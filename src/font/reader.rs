use super::FontError;

/// Bounds-checked big-endian reader over one table of a font file.
///
/// Offsets are relative to the start of the table the reader was scoped to,
/// and every read past its end yields [`FontError::Truncated`] naming that table.
#[derive(Clone, Copy)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    table: &'static str,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8], table: &'static str) -> Self {
        Self { data, table }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Narrow the reader to `len` bytes at `offset`, relabelled as `table`.
    pub(crate) fn sub(
        &self,
        offset: usize,
        len: usize,
        table: &'static str,
    ) -> Result<Reader<'a>, FontError> {
        let bytes = self.bytes(offset, len)?;
        Ok(Reader { data: bytes, table })
    }

    /// Everything from `offset` to the end of this reader.
    pub(crate) fn tail(&self, offset: usize) -> Result<Reader<'a>, FontError> {
        if offset > self.data.len() {
            return Err(self.truncated(offset));
        }
        Ok(Reader {
            data: &self.data[offset..],
            table: self.table,
        })
    }

    pub(crate) fn u16_at(&self, offset: usize) -> Result<u16, FontError> {
        let b = self.bytes(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn i16_at(&self, offset: usize) -> Result<i16, FontError> {
        let b = self.bytes(offset, 2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32_at(&self, offset: usize) -> Result<u32, FontError> {
        let b = self.bytes(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn tag_at(&self, offset: usize) -> Result<[u8; 4], FontError> {
        let b = self.bytes(offset, 4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], FontError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| self.truncated(offset))
    }

    fn truncated(&self, offset: usize) -> FontError {
        FontError::Truncated {
            table: self.table,
            offset,
        }
    }
}
