//! Binary Primitive Layer
//!
//! Little-endian fixed-width readers and writers shared by the string
//! table, the header records and the node codec.
//!
//! Strings come in two flavors: "short" strings carry a `u16` length
//! prefix and are used for dictionary keys, "long" strings carry a `u32`
//! length prefix. Blocks are written with an 8-byte size placeholder that
//! is patched once the block body is complete, so readers can skip
//! sections they do not understand.
//!
//! @module lim/io

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::core::error::{Error, Result};

/// Size of the block length prefix in bytes
pub const BLOCK_SIZE_LEN: u64 = 8;

// =============================================================================
// WRITER
// =============================================================================

/// Little-endian binary writer over any seekable sink
pub struct BinaryWriter<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Raw bytes with no length prefix (section tags)
    pub fn write_tag(&mut self, tag: &[u8]) -> Result<()> {
        self.inner.write_all(tag)?;
        Ok(())
    }

    /// `u16` length prefix followed by the UTF-8 bytes
    pub fn write_short_str(&mut self, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| {
            Error::format(format!(
                "String too long for a short string ({} bytes)",
                value.len()
            ))
        })?;
        self.write_u16(len)?;
        self.write_tag(value.as_bytes())
    }

    /// `u32` length prefix followed by the UTF-8 bytes
    pub fn write_long_str(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len())
            .map_err(|_| Error::format("String too long for a long string"))?;
        self.write_u32(len)?;
        self.write_tag(value.as_bytes())
    }

    /// Begin a size-prefixed block, returning its start offset
    pub fn start_block(&mut self) -> Result<u64> {
        let start = self.inner.stream_position()?;
        self.write_u64(0)?;
        Ok(start)
    }

    /// Patch the size of the block opened at `start`
    ///
    /// The stored size counts the placeholder itself.
    pub fn end_block(&mut self, start: u64) -> Result<()> {
        let end = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(start))?;
        self.write_u64(end - start)?;
        self.inner.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

// =============================================================================
// READER
// =============================================================================

/// Little-endian binary reader over any seekable source
pub struct BinaryReader<R: Read + Seek> {
    inner: R,
}

impl<R: Read + Seek> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(eof_to_format)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).map_err(eof_to_format)?;
        Ok(buf)
    }

    /// Read and compare a fixed section tag
    pub fn expect_tag(&mut self, tag: &[u8]) -> Result<()> {
        let found = self.read_bytes(tag.len())?;
        if found != tag {
            return Err(Error::format(format!(
                "Expected tag {:?}, found {:?}",
                String::from_utf8_lossy(tag),
                String::from_utf8_lossy(&found)
            )));
        }
        Ok(())
    }

    pub fn read_short_str(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        self.read_utf8(len)
    }

    pub fn read_long_str(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        self.read_utf8(len)
    }

    fn read_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| Error::format(format!("Invalid UTF-8: {}", e)))
    }

    /// Read a block size, returning the offset just past the block
    pub fn enter_block(&mut self) -> Result<u64> {
        let start = self.inner.stream_position()?;
        let size = self.read_u64()?;
        if size < BLOCK_SIZE_LEN {
            return Err(Error::format(format!("Invalid block size {}", size)));
        }
        Ok(start + size)
    }

    /// Skip a whole block, size prefix included
    pub fn skip_block(&mut self) -> Result<()> {
        let end = self.enter_block()?;
        self.seek_to(end)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }
}

fn eof_to_format(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::format("Unexpected end of stream")
    } else {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_primitives_are_little_endian() {
        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        w.write_u16(0x0102).unwrap();
        w.write_u32(0x0304_0506).unwrap();
        w.write_bool(true).unwrap();
        let bytes = w.into_inner().into_inner();
        assert_eq!(bytes, vec![0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 0x01]);
    }

    #[test]
    fn test_block_is_patched_and_skippable() {
        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        let start = w.start_block().unwrap();
        w.write_u32(7).unwrap();
        w.write_long_str("payload").unwrap();
        w.end_block(start).unwrap();
        w.write_u16(0xBEEF).unwrap();
        let bytes = w.into_inner().into_inner();

        // 8 size + 4 u32 + 4 len + 7 bytes
        assert_eq!(u64::from_le_bytes(bytes[0..8].try_into().unwrap()), 23);

        let mut r = BinaryReader::new(Cursor::new(bytes));
        r.skip_block().unwrap();
        assert_eq!(r.read_u16().unwrap(), 0xBEEF);
    }

    #[test]
    fn test_truncated_stream_is_format_error() {
        let mut r = BinaryReader::new(Cursor::new(vec![1u8, 2]));
        assert!(matches!(r.read_u32(), Err(Error::Format { .. })));
    }

    #[test]
    fn test_short_string_limit() {
        let mut w = BinaryWriter::new(Cursor::new(Vec::new()));
        let big = "x".repeat(u16::MAX as usize + 1);
        assert!(w.write_short_str(&big).is_err());
        w.write_short_str("key").unwrap();
        let mut r = BinaryReader::new(Cursor::new(w.into_inner().into_inner()));
        assert_eq!(r.read_short_str().unwrap(), "key");
    }

    #[test]
    fn test_expect_tag_mismatch() {
        let mut r = BinaryReader::new(Cursor::new(b"STRTBX".to_vec()));
        assert!(r.expect_tag(b"STRTBL").is_err());
    }
}
