//! Little-endian, length-prefixed binary codec used inside access tokens.
//!
//! Integers are written little-endian. Strings and byte runs are preceded by a
//! `u16` length, so no field can be confused with a delimiter.

use crate::error::PackError;

/// Append-only writer for the token wire format
#[derive(Debug, Default, Clone)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Writes a `u16` length followed by the raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, PackError> {
        let len = u16::try_from(bytes.len()).map_err(|_| PackError::TooLong(bytes.len()))?;
        self.put_u16(len);
        self.buf.extend_from_slice(bytes);
        Ok(self)
    }

    pub fn put_string(&mut self, value: &str) -> Result<&mut Self, PackError> {
        self.put_bytes(value.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a packed buffer
#[derive(Debug, Clone)]
pub struct Unpacker<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Everything not yet consumed
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], PackError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(PackError::UnexpectedEof { needed, remaining });
        }
        let slice = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    pub fn get_u16(&mut self) -> Result<u16, PackError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn get_u32(&mut self) -> Result<u32, PackError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn get_bytes(&mut self) -> Result<&'a [u8], PackError> {
        let len = self.get_u16()? as usize;
        self.take(len)
    }

    pub fn get_string(&mut self) -> Result<String, PackError> {
        let bytes = self.get_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| PackError::InvalidUtf8)
    }

    /// Fails if any input is left over
    pub fn finish(&self) -> Result<(), PackError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(PackError::TrailingBytes(n)),
        }
    }
}
