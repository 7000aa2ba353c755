//! Instruction data deserialization helpers
//!
//! Bounds-checked little-endian readers over raw instruction bytes. Every
//! short read is `RegistryError::InvalidInstruction`.

use crate::error::RegistryError;
use pinocchio::pubkey::Pubkey;

/// Read a u8 from instruction data
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, RegistryError> {
    data.get(offset).copied().ok_or(RegistryError::InvalidInstruction)
}

/// Read a u64 (little-endian) from instruction data
#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64, RegistryError> {
    Ok(u64::from_le_bytes(read_bytes::<8>(data, offset)?))
}

/// Read an i64 (little-endian) from instruction data
#[inline]
pub fn read_i64(data: &[u8], offset: usize) -> Result<i64, RegistryError> {
    Ok(i64::from_le_bytes(read_bytes::<8>(data, offset)?))
}

/// Read a fixed-size byte array from instruction data
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], RegistryError> {
    let end = offset.checked_add(N).ok_or(RegistryError::InvalidInstruction)?;
    let slice = data.get(offset..end).ok_or(RegistryError::InvalidInstruction)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(slice);
    Ok(bytes)
}

/// Instruction data reader with tracked offset
pub struct InstructionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, RegistryError> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, RegistryError> {
        let val = read_u64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, RegistryError> {
        let val = read_i64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], RegistryError> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }

    #[inline]
    pub fn read_pubkey(&mut self) -> Result<Pubkey, RegistryError> {
        self.read_bytes::<32>()
    }

    /// Borrow the next `len` bytes without copying
    #[inline]
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], RegistryError> {
        let end = self.offset.checked_add(len).ok_or(RegistryError::InvalidInstruction)?;
        let slice = self
            .data
            .get(self.offset..end)
            .ok_or(RegistryError::InvalidInstruction)?;
        self.offset = end;
        Ok(slice)
    }

    /// Fail if any bytes are left unread
    #[inline]
    pub fn finish(&self) -> Result<(), RegistryError> {
        if self.remaining() != 0 {
            return Err(RegistryError::InvalidInstruction);
        }
        Ok(())
    }
}
