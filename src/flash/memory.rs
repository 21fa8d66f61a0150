//! In-memory flash
//!
//! RAM-backed flash with NOR programming semantics, fault injection and
//! operation counters. Clones share the same cells, so a test can keep a
//! handle after moving one into a store.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, RotateError};

use super::{Flash, Geometry, ERASED_BYTE};

/// Shared in-memory flash device
#[derive(Clone)]
pub struct MemFlash {
    inner: Arc<Mutex<MemInner>>,
}

struct MemInner {
    geometry: Geometry,
    cells: Vec<u8>,
    /// Sectors whose reads fail
    failing_reads: HashSet<u32>,
    /// Sectors whose writes fail
    failing_writes: HashSet<u32>,
    /// Fail every write regardless of sector
    fail_all_writes: bool,
    fail_all_erases: bool,
    reads: usize,
    writes: usize,
    erases: usize,
}

impl MemFlash {
    /// Create a fully erased device
    pub fn new(geometry: Geometry) -> Self {
        let cells = vec![ERASED_BYTE; geometry.total_size() as usize];
        Self {
            inner: Arc::new(Mutex::new(MemInner {
                geometry,
                cells,
                failing_reads: HashSet::new(),
                failing_writes: HashSet::new(),
                fail_all_writes: false,
                fail_all_erases: false,
                reads: 0,
                writes: 0,
                erases: 0,
            })),
        }
    }

    /// Copy of a whole sector
    pub fn sector(&self, sector: u32) -> Vec<u8> {
        let inner = self.inner.lock();
        let range = inner.range(sector);
        inner.cells[range].to_vec()
    }

    /// Overwrite the start of a sector directly, bypassing NOR semantics and counters
    pub fn load_sector(&self, sector: u32, data: &[u8]) {
        let mut inner = self.inner.lock();
        let start = inner.range(sector).start;
        inner.cells[start..start + data.len()].copy_from_slice(data);
    }

    /// Make every read from `sector` fail (or succeed again)
    pub fn fail_reads_from(&self, sector: u32, fail: bool) {
        let mut inner = self.inner.lock();
        if fail {
            inner.failing_reads.insert(sector);
        } else {
            inner.failing_reads.remove(&sector);
        }
    }

    /// Make every write to `sector` fail (or succeed again)
    pub fn fail_writes_to(&self, sector: u32, fail: bool) {
        let mut inner = self.inner.lock();
        if fail {
            inner.failing_writes.insert(sector);
        } else {
            inner.failing_writes.remove(&sector);
        }
    }

    /// Make every write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_all_writes = fail;
    }

    /// Make every erase fail (or succeed again)
    pub fn fail_erases(&self, fail: bool) {
        self.inner.lock().fail_all_erases = fail;
    }

    /// Number of raw reads
    pub fn read_count(&self) -> usize {
        self.inner.lock().reads
    }

    /// Number of attempted raw writes
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    /// Number of attempted raw erases
    pub fn erase_count(&self) -> usize {
        self.inner.lock().erases
    }
}

impl MemInner {
    fn range(&self, sector: u32) -> std::ops::Range<usize> {
        let start = sector as usize * self.geometry.sector_size;
        start..start + self.geometry.sector_size
    }
}

impl Flash for MemFlash {
    fn geometry(&self) -> Geometry {
        self.inner.lock().geometry
    }

    fn erase(&mut self, sector: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.geometry.check_access(sector, 0, 0)?;
        inner.erases += 1;
        if inner.fail_all_erases {
            return Err(RotateError::EraseFailed { sector });
        }
        let range = inner.range(sector);
        inner.cells[range].fill(ERASED_BYTE);
        Ok(())
    }

    fn read(&mut self, sector: u32, offset: usize, buf: &mut [u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.geometry.check_access(sector, offset, buf.len())?;
        inner.reads += 1;
        if inner.failing_reads.contains(&sector) {
            return Err(RotateError::ReadFailed { sector });
        }
        let start = inner.range(sector).start + offset;
        buf.copy_from_slice(&inner.cells[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, sector: u32, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.geometry.check_access(sector, 0, data.len())?;
        inner.writes += 1;
        if inner.fail_all_writes || inner.failing_writes.contains(&sector) {
            return Err(RotateError::WriteFailed { sector });
        }
        let start = inner.range(sector).start;
        // NOR programming can only clear bits
        for (cell, byte) in inner.cells[start..start + data.len()].iter_mut().zip(data) {
            *cell &= *byte;
        }
        Ok(())
    }
}
