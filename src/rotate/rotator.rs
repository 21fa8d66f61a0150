//! Rotating EEPROM
//!
//! Layers pool rotation, checksums and generation counters over a
//! single-sector `SectorStore`.

use std::io::Write;

use tracing::{info, warn};

use crate::config::{validate_offset, Config};
use crate::dump;
use crate::eeprom::SectorStore;
use crate::error::{Result, RotateError};

use super::recovery::{self, ScanReport};
use super::{Metadata, Pool};

/// Sectors past the last usable one that `dump` may still inspect
pub const DUMP_SECTOR_MARGIN: u32 = 4;

/// Which pool slot holds the data resident in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveState {
    /// Pool index
    pub index: usize,

    /// Physical sector of `index`
    pub sector: u32,

    /// Generation counter of the resident copy
    pub counter: u8,
}

impl ActiveState {
    /// Placeholder state before any record is loaded
    fn unloaded(pool: &Pool) -> Self {
        Self {
            index: 0,
            sector: pool.base(),
            counter: 0,
        }
    }
}

/// Fixed-size record persisted round-robin across a sector pool
///
/// ## Lifecycle
/// 1. Configure (`set_pool_size`, `set_offset`) before the first `begin`
/// 2. `begin(size)` scans the pool and loads the newest valid copy
/// 3. Mutate through `write`/`write_bytes`
/// 4. `commit()` writes the record to the next sector in the pool
///
/// Not reentrant: one operation at a time per instance.
pub struct RotatingEeprom<S: SectorStore> {
    store: S,
    config: Config,
    pool: Pool,
    active: ActiveState,
    loaded: bool,
}

impl<S: SectorStore> RotatingEeprom<S> {
    /// Wrap a sector store, validating `config` against its geometry
    pub fn new(store: S, config: Config) -> Result<Self> {
        let geometry = store.geometry();
        config.validate(&geometry)?;
        let pool = Pool::new(config.base_sector(&geometry), config.pool_size)?;

        Ok(Self {
            store,
            config,
            pool,
            active: ActiveState::unloaded(&pool),
            loaded: false,
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Change the pool size; rejected after the first load
    pub fn set_pool_size(&mut self, sectors: u8) -> Result<()> {
        self.ensure_unloaded()?;
        self.pool = Pool::new(self.pool.base(), sectors)?;
        self.config.pool_size = sectors;
        Ok(())
    }

    /// Move the metadata block; rejected after the first load
    pub fn set_offset(&mut self, offset: usize) -> Result<()> {
        self.ensure_unloaded()?;
        validate_offset(offset, self.store.geometry().sector_size)?;
        self.config.metadata_offset = offset;
        Ok(())
    }

    fn ensure_unloaded(&self) -> Result<()> {
        if self.loaded {
            return Err(RotateError::ConfigRejected(
                "pool is fixed once the record is loaded".to_string(),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Load / Commit
    // =========================================================================

    /// Scan the pool and load the newest valid copy of a `size`-byte record
    ///
    /// A pool with no valid copy (fresh flash) loads index 0 as-is. If the
    /// scan fails the record is left unloaded: the buffer may hold another
    /// sector's bytes, so commits are refused until a later `begin` succeeds.
    pub fn begin(&mut self, size: usize) -> Result<ScanReport> {
        if size == 0 {
            return Err(RotateError::ConfigRejected(
                "record size must be nonzero".to_string(),
            ));
        }
        validate_offset(self.config.metadata_offset, self.store.buffer_len(size))?;

        let scanned = recovery::scan(
            &mut self.store,
            &self.pool,
            self.config.metadata_offset,
            self.config.checksum,
            size,
        );
        let report = match scanned {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Scan failed, record unloaded");
                self.active = ActiveState::unloaded(&self.pool);
                self.loaded = false;
                return Err(e);
            }
        };

        self.active = ActiveState {
            index: report.selected,
            sector: self.pool.slot(report.selected),
            counter: report.counter,
        };
        self.loaded = true;
        Ok(report)
    }

    /// Persist the record to the next sector of the pool
    ///
    /// A clean record returns `Ok` without writing. If the write fails the
    /// active sector and counter revert, the record stays dirty, and the
    /// error is returned; the new metadata bytes remain in the buffer.
    pub fn commit(&mut self) -> Result<()> {
        if self.store.size() == 0 {
            return Err(RotateError::NotLoaded);
        }
        if !self.store.is_dirty() {
            return Ok(());
        }
        if !self.loaded {
            return Err(RotateError::NotLoaded);
        }

        let previous = self.active;

        let index = self.pool.next(previous.index);
        self.active = ActiveState {
            index,
            sector: self.pool.slot(index),
            counter: previous.counter.wrapping_add(1),
        };
        self.store.set_sector(self.active.sector);

        let offset = self.config.metadata_offset;
        let metadata = Metadata {
            checksum: self.config.checksum.compute(self.store.data(), offset),
            counter: self.active.counter,
        };
        metadata.write(self.store.data_mut(), offset)?;

        match self.store.commit() {
            Ok(()) => {
                info!(
                    sector = self.active.sector,
                    counter = self.active.counter,
                    "Committed record"
                );
                Ok(())
            }
            Err(e) => {
                warn!(sector = self.active.sector, error = %e, "Commit failed, restoring");
                self.active = previous;
                self.store.set_sector(previous.sector);
                Err(e)
            }
        }
    }

    /// Force a copy of the record into `target` (default: the base sector)
    ///
    /// No-op when `target` is already active. Otherwise the active index is
    /// moved to the slot just before `target` so the regular commit lands
    /// on it.
    pub fn backup(&mut self, target: Option<u32>) -> Result<()> {
        let target = target.unwrap_or_else(|| self.pool.base());
        if target == self.active.sector {
            return Ok(());
        }
        let target_index = self
            .pool
            .index_of(target)
            .ok_or(RotateError::NotInPool { sector: target })?;

        let saved = self.active;
        self.active.index = self.pool.previous(target_index);
        self.active.sector = self.pool.slot(self.active.index);
        self.store.mark_dirty();

        self.commit().map_err(|e| {
            warn!(target, error = %e, "Backup failed, restoring");
            self.active = saved;
            self.store.set_sector(saved.sector);
            e
        })
    }

    // =========================================================================
    // Erase
    // =========================================================================

    /// Erase a single sector
    pub fn erase(&mut self, sector: u32) -> Result<()> {
        self.store.erase(sector)
    }

    /// Erase every pool sector
    ///
    /// All sectors are attempted; the first failure is reported.
    pub fn erase_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for sector in self.pool.sectors() {
            if let Err(e) = self.store.erase(sector) {
                warn!(sector, error = %e, "Erase failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    // =========================================================================
    // Record Access
    // =========================================================================

    /// Read one byte of the record
    pub fn read(&self, address: usize) -> Result<u8> {
        self.store.read(address)
    }

    /// Write one byte of the record
    pub fn write(&mut self, address: usize, value: u8) -> Result<()> {
        self.store.write(address, value)
    }

    /// Borrow `len` bytes of the record starting at `address`
    pub fn read_bytes(&self, address: usize, len: usize) -> Result<&[u8]> {
        let data = self.store.data();
        address
            .checked_add(len)
            .and_then(|end| data.get(address..end))
            .ok_or(RotateError::AddressOutOfRange {
                address: address.saturating_add(len),
                size: data.len(),
            })
    }

    /// Write `bytes` into the record starting at `address`
    pub fn write_bytes(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        let size = self.store.size();
        if address.checked_add(bytes.len()).map_or(true, |end| end > size) {
            return Err(RotateError::AddressOutOfRange {
                address: address.saturating_add(bytes.len()),
                size,
            });
        }
        for (i, byte) in bytes.iter().enumerate() {
            self.store.write(address + i, *byte)?;
        }
        Ok(())
    }

    /// Whole record buffer
    pub fn data(&self) -> &[u8] {
        self.store.data()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Render `sector` (default: the active one) as a hex + ASCII table
    pub fn dump<W: Write>(&mut self, out: &mut W, sector: Option<u32>) -> Result<()> {
        let sector = sector.unwrap_or(self.active.sector);
        let limit = self.last().saturating_add(DUMP_SECTOR_MARGIN);
        if sector > limit {
            return Err(RotateError::SectorOutOfRange { sector, limit });
        }
        dump::write_sector(&mut self.store, sector, out)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Sector holding the resident copy
    pub fn current(&self) -> u32 {
        self.active.sector
    }

    /// Sector of pool index 0
    pub fn base(&self) -> u32 {
        self.pool.base()
    }

    /// Last sector available to user data
    pub fn last(&self) -> u32 {
        self.store.geometry().last_usable_sector()
    }

    /// Sectors in the system-reserved tail
    pub fn reserved(&self) -> u32 {
        self.store.geometry().reserved_sector_count()
    }

    pub fn pool_size(&self) -> u8 {
        self.pool.size()
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Metadata block offset
    pub fn offset(&self) -> usize {
        self.config.metadata_offset
    }

    pub fn active(&self) -> ActiveState {
        self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Record size (0 before `begin`)
    pub fn size(&self) -> usize {
        self.store.size()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying sector store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
