//! Flash-backed single-sector EEPROM

use tracing::trace;

use crate::critical::{CriticalSection, InterruptMask, NoopMask};
use crate::error::{Result, RotateError};
use crate::flash::{Flash, Geometry};

use super::SectorStore;

/// Buffer sizes are rounded up to the flash word
const WORD_SIZE: usize = 4;

/// EEPROM emulation over one sector of a `Flash` device
pub struct SectorEeprom<F: Flash, M: InterruptMask = NoopMask> {
    flash: F,
    mask: M,
    sector: u32,
    data: Vec<u8>,
    dirty: bool,
}

impl<F: Flash> SectorEeprom<F> {
    /// Wrap a flash device on a host without interrupt masking
    pub fn new(flash: F) -> Self {
        Self::with_mask(flash, NoopMask)
    }
}

impl<F: Flash, M: InterruptMask> SectorEeprom<F, M> {
    /// Wrap a flash device, masking interrupts around raw operations
    pub fn with_mask(flash: F, mask: M) -> Self {
        let sector = flash.geometry().last_usable_sector();
        Self {
            flash,
            mask,
            sector,
            data: Vec::new(),
            dirty: false,
        }
    }

    /// Underlying flash device
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Interrupt mask in use
    pub fn mask(&self) -> &M {
        &self.mask
    }

    fn check_address(&self, address: usize) -> Result<()> {
        if address >= self.data.len() {
            return Err(RotateError::AddressOutOfRange {
                address,
                size: self.data.len(),
            });
        }
        Ok(())
    }
}

impl<F: Flash, M: InterruptMask> SectorStore for SectorEeprom<F, M> {
    fn geometry(&self) -> Geometry {
        self.flash.geometry()
    }

    fn buffer_len(&self, size: usize) -> usize {
        let sector_size = self.flash.geometry().sector_size;
        size.min(sector_size)
            .next_multiple_of(WORD_SIZE)
            .min(sector_size)
    }

    fn begin(&mut self, sector: u32, size: usize) -> Result<()> {
        if size == 0 {
            return Err(RotateError::ConfigRejected(
                "record size must be nonzero".to_string(),
            ));
        }
        let size = self.buffer_len(size);

        let mut data = vec![0u8; size];
        {
            let _cs = CriticalSection::enter(&self.mask);
            self.flash.read(sector, 0, &mut data)?;
        }

        trace!(sector, size, "Loaded sector");
        self.sector = sector;
        self.data = data;
        self.dirty = false;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.data.is_empty() {
            return Err(RotateError::NotLoaded);
        }
        if !self.dirty {
            return Ok(());
        }

        {
            let _cs = CriticalSection::enter(&self.mask);
            self.flash.erase(self.sector)?;
            self.flash.write(self.sector, &self.data)?;
        }

        trace!(sector = self.sector, size = self.data.len(), "Committed sector");
        self.dirty = false;
        Ok(())
    }

    fn sector(&self) -> u32 {
        self.sector
    }

    fn set_sector(&mut self, sector: u32) {
        self.sector = sector;
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn read(&self, address: usize) -> Result<u8> {
        self.check_address(address)?;
        Ok(self.data[address])
    }

    fn write(&mut self, address: usize, value: u8) -> Result<()> {
        self.check_address(address)?;
        let before = std::mem::replace(&mut self.data[address], value);
        self.dirty |= before != value;
        Ok(())
    }

    fn erase(&mut self, sector: u32) -> Result<()> {
        let _cs = CriticalSection::enter(&self.mask);
        self.flash.erase(sector)
    }

    fn read_raw(&mut self, sector: u32, offset: usize, buf: &mut [u8]) -> Result<()> {
        let _cs = CriticalSection::enter(&self.mask);
        self.flash.read(sector, offset, buf)
    }
}
