//! Flash Module
//!
//! Raw access to block-erasable non-volatile memory.
//!
//! ## Responsibilities
//! - Erase, read and write whole sectors
//! - Report device geometry (replaces linker-provided flash symbols)
//!
//! ## Device Layout
//! ```text
//! sector 0                                   sector_count - 1
//! ┌──────────────────────────────┬──────┬──────────────────┐
//! │ application / filesystem ... │ pool │ system reserved  │
//! └──────────────────────────────┴──────┴──────────────────┘
//!                                   ▲    ▲
//!                  last_usable_sector    reserved_boundary
//! ```
//! The rotation pool sits directly below `reserved_boundary` and grows downward.

mod file;
mod memory;

pub use file::FileFlash;
pub use memory::MemFlash;

use crate::error::{Result, RotateError};

/// Raw sector primitives of a flash device
///
/// Writes only clear bits on real NOR flash, so callers erase before writing.
pub trait Flash {
    /// Device geometry
    fn geometry(&self) -> Geometry;

    /// Erase one sector (all bytes become 0xFF)
    fn erase(&mut self, sector: u32) -> Result<()>;

    /// Read `buf.len()` bytes starting at `offset` within `sector`
    fn read(&mut self, sector: u32, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Program `data` at the start of `sector`
    fn write(&mut self, sector: u32, data: &[u8]) -> Result<()>;
}

/// Value of an erased flash byte
pub const ERASED_BYTE: u8 = 0xFF;

/// Physical layout of a flash device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Bytes per erasable sector
    pub sector_size: usize,

    /// Total addressable sectors
    pub sector_count: u32,

    /// First sector of the trailing system-reserved region
    pub reserved_boundary: u32,
}

impl Geometry {
    /// Create a validated geometry
    pub fn new(sector_size: usize, sector_count: u32, reserved_boundary: u32) -> Result<Self> {
        let geometry = Self {
            sector_size,
            sector_count,
            reserved_boundary,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check a geometry that may have been built field by field
    pub fn validate(&self) -> Result<()> {
        if self.sector_size < crate::rotate::METADATA_LEN {
            return Err(RotateError::ConfigRejected(format!(
                "sector size {} too small",
                self.sector_size
            )));
        }
        if self.reserved_boundary == 0 || self.reserved_boundary > self.sector_count {
            return Err(RotateError::ConfigRejected(format!(
                "reserved boundary {} outside 1..={}",
                self.reserved_boundary, self.sector_count
            )));
        }
        Ok(())
    }

    /// Last sector available to user data (0 for an invalid geometry)
    pub fn last_usable_sector(&self) -> u32 {
        self.reserved_boundary.saturating_sub(1)
    }

    /// Number of sectors in the system-reserved tail
    pub fn reserved_sector_count(&self) -> u32 {
        self.sector_count.saturating_sub(self.reserved_boundary)
    }

    /// Total device size in bytes
    pub fn total_size(&self) -> u64 {
        self.sector_size as u64 * u64::from(self.sector_count)
    }

    /// Reject accesses outside the device or outside one sector
    pub(crate) fn check_access(&self, sector: u32, offset: usize, len: usize) -> Result<()> {
        if sector >= self.sector_count {
            return Err(RotateError::SectorOutOfRange {
                sector,
                limit: self.sector_count.saturating_sub(1),
            });
        }
        match offset.checked_add(len) {
            Some(end) if end <= self.sector_size => Ok(()),
            _ => Err(RotateError::AddressOutOfRange {
                address: offset.saturating_add(len),
                size: self.sector_size,
            }),
        }
    }
}
