//! Sector pool indexing

use crate::config::validate_pool_size;
use crate::error::Result;

/// Maps pool indices to physical sectors: index i ↔ sector (base - i)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool {
    base: u32,
    size: u8,
}

impl Pool {
    /// Create a pool of `size` sectors ending at `base`
    pub fn new(base: u32, size: u8) -> Result<Self> {
        validate_pool_size(size, base)?;
        Ok(Self { base, size })
    }

    /// Sector at pool index 0
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Physical sector of `index`, `None` outside the pool
    pub fn sector_of(&self, index: usize) -> Option<u32> {
        if index >= usize::from(self.size) {
            return None;
        }
        Some(self.base - index as u32)
    }

    /// Pool index of `sector`, `None` if the sector is not in the pool
    pub fn index_of(&self, sector: u32) -> Option<usize> {
        let index = self.base.checked_sub(sector)? as usize;
        (index < usize::from(self.size)).then_some(index)
    }

    /// Index written after `index`
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % usize::from(self.size)
    }

    /// Index written before `index`
    pub fn previous(&self, index: usize) -> usize {
        if index == 0 {
            usize::from(self.size) - 1
        } else {
            index - 1
        }
    }

    /// All pool sectors in index order
    pub fn sectors(&self) -> impl Iterator<Item = u32> + '_ {
        (0..u32::from(self.size)).map(move |index| self.base - index)
    }

    /// Sector of an index already reduced modulo the pool size
    pub(crate) fn slot(&self, index: usize) -> u32 {
        self.base - (index % usize::from(self.size)) as u32
    }
}
