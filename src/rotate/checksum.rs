//! Record checksums
//!
//! Both checksums skip the metadata block so a copy stays valid after its
//! own checksum is written into it.

use crate::config::ChecksumKind;

use super::METADATA_LEN;

/// 16-bit wrapping sum of every byte outside `[offset, offset + 2]`
pub fn checksum(buffer: &[u8], offset: usize) -> u16 {
    payload(buffer, offset).fold(0u16, |sum, byte| sum.wrapping_add(u16::from(byte)))
}

/// CRC-32 of every byte outside `[offset, offset + 2]`, folded to 16 bits
pub fn crc32_folded(buffer: &[u8], offset: usize) -> u16 {
    let mut hasher = crc32fast::Hasher::new();
    let end = offset.min(buffer.len());
    hasher.update(&buffer[..end]);
    if let Some(tail) = buffer.get(offset.saturating_add(METADATA_LEN)..) {
        hasher.update(tail);
    }
    let crc = hasher.finalize();
    ((crc >> 16) ^ (crc & 0xFFFF)) as u16
}

fn payload(buffer: &[u8], offset: usize) -> impl Iterator<Item = u8> + '_ {
    buffer
        .iter()
        .enumerate()
        .filter(move |(address, _)| !(offset..offset.saturating_add(METADATA_LEN)).contains(address))
        .map(|(_, byte)| *byte)
}

impl ChecksumKind {
    /// Compute this checksum over `buffer` with metadata at `offset`
    pub fn compute(self, buffer: &[u8], offset: usize) -> u16 {
        match self {
            ChecksumKind::Additive => checksum(buffer, offset),
            ChecksumKind::Crc32Folded => crc32_folded(buffer, offset),
        }
    }
}
