//! EEPROM Emulation Module
//!
//! Byte-addressable access to one flash sector: the sector is loaded into
//! RAM, mutated byte by byte, and written back whole on commit.
//!
//! ## Responsibilities
//! - Load a sector into an in-memory buffer
//! - Track whether the buffer differs from flash (dirty flag)
//! - Erase and rewrite the current sector on commit
//! - Run every raw flash operation inside a critical section

mod sector;

pub use sector::SectorEeprom;

use crate::error::Result;
use crate::flash::Geometry;

/// Single-sector EEPROM emulation
///
/// The rotating store drives one of these, re-pointing it at a different
/// sector before each load and commit.
pub trait SectorStore {
    /// Geometry of the underlying flash
    fn geometry(&self) -> Geometry;

    /// Buffer length `begin(_, size)` would allocate
    fn buffer_len(&self, size: usize) -> usize;

    /// Load `buffer_len(size)` bytes of `sector` and clear the dirty flag
    fn begin(&mut self, sector: u32, size: usize) -> Result<()>;

    /// Erase and rewrite the current sector if dirty, then clear the dirty flag
    fn commit(&mut self) -> Result<()>;

    /// Sector the buffer is loaded from and committed to
    fn sector(&self) -> u32;

    /// Re-point the buffer at another sector without reloading it
    fn set_sector(&mut self, sector: u32);

    /// Buffer size in bytes (0 before the first load)
    fn size(&self) -> usize;

    /// Buffer contents
    fn data(&self) -> &[u8];

    /// Mutable buffer contents; does not touch the dirty flag
    fn data_mut(&mut self) -> &mut [u8];

    fn is_dirty(&self) -> bool;

    /// Force the next commit to write
    fn mark_dirty(&mut self);

    /// Read one buffered byte
    fn read(&self, address: usize) -> Result<u8>;

    /// Write one buffered byte, marking dirty if it changed
    fn write(&mut self, address: usize, value: u8) -> Result<()>;

    /// Erase a sector on the underlying flash
    fn erase(&mut self, sector: u32) -> Result<()>;

    /// Read raw sector bytes, bypassing the buffer
    fn read_raw(&mut self, sector: u32, offset: usize, buf: &mut [u8]) -> Result<()>;
}
