//! Metadata block codec

use crate::error::{Result, RotateError};

/// Metadata block size: Checksum (2) + Counter (1)
pub const METADATA_LEN: usize = 3;

/// Checksum position within the block (big endian, 2 bytes)
pub const CHECKSUM_OFFSET: usize = 0;

/// Generation counter position within the block
pub const COUNTER_OFFSET: usize = 2;

/// Integrity and recency stamp embedded in every sector copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub checksum: u16,
    pub counter: u8,
}

impl Metadata {
    /// Decode the block at `offset`
    pub fn read(buffer: &[u8], offset: usize) -> Result<Self> {
        let block = block(buffer, offset)?;
        Ok(Self {
            checksum: u16::from_be_bytes([block[CHECKSUM_OFFSET], block[CHECKSUM_OFFSET + 1]]),
            counter: block[COUNTER_OFFSET],
        })
    }

    /// Encode the block at `offset`, leaving every other byte untouched
    pub fn write(&self, buffer: &mut [u8], offset: usize) -> Result<()> {
        let len = buffer.len();
        let block = offset
            .checked_add(METADATA_LEN)
            .and_then(|end| buffer.get_mut(offset..end))
            .ok_or_else(|| out_of_range(offset, len))?;
        block[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&self.checksum.to_be_bytes());
        block[COUNTER_OFFSET] = self.counter;
        Ok(())
    }
}

fn block(buffer: &[u8], offset: usize) -> Result<&[u8]> {
    offset
        .checked_add(METADATA_LEN)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| out_of_range(offset, buffer.len()))
}

fn out_of_range(offset: usize, size: usize) -> RotateError {
    RotateError::AddressOutOfRange {
        address: offset.saturating_add(METADATA_LEN - 1),
        size,
    }
}
