//! Startup recovery
//!
//! Scans every pool sector and selects the newest copy whose checksum holds.

use tracing::{debug, info, warn};

use crate::config::ChecksumKind;
use crate::eeprom::SectorStore;
use crate::error::Result;

use super::{is_newer, Metadata, Pool};

/// Outcome of a pool scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Pool index selected as active
    pub selected: usize,

    /// Generation counter of the selected copy
    pub counter: u8,

    /// Indices whose checksum matched, in scan order
    pub valid: Vec<usize>,

    /// Indices skipped because of a checksum mismatch or read failure
    pub corrupted: Vec<usize>,
}

impl ScanReport {
    /// True when no sector held a valid copy and index 0 was used as fallback
    pub fn is_fresh(&self) -> bool {
        self.valid.is_empty()
    }
}

/// Scan the pool and leave the newest valid copy loaded in `store`
///
/// Sectors failing their checksum are skipped. The first valid copy becomes
/// the initial best; later ones replace it when `is_newer` says so. With no
/// valid copy at all, index 0 is loaded as-is so the caller has a buffer to
/// populate.
pub(crate) fn scan<S: SectorStore>(
    store: &mut S,
    pool: &Pool,
    offset: usize,
    checksum: ChecksumKind,
    size: usize,
) -> Result<ScanReport> {
    let mut best: Option<(usize, u8)> = None;
    let mut valid = Vec::new();
    let mut corrupted = Vec::new();

    for (index, sector) in pool.sectors().enumerate() {
        if let Err(e) = store.begin(sector, size) {
            warn!(sector, error = %e, "Sector could not be read, skipping");
            corrupted.push(index);
            continue;
        }

        let stored = Metadata::read(store.data(), offset)?;
        let calculated = checksum.compute(store.data(), offset);
        debug!(
            sector,
            counter = stored.counter,
            calculated,
            stored = stored.checksum,
            "Scanned sector"
        );

        if calculated != stored.checksum {
            debug!(sector, "Sector failed checksum, skipping");
            corrupted.push(index);
            continue;
        }
        valid.push(index);

        best = match best {
            None => Some((index, stored.counter)),
            Some((_, best_counter)) if is_newer(best_counter, stored.counter, pool.size()) => {
                Some((index, stored.counter))
            }
            keep => keep,
        };
    }

    let selected = best.map(|(index, _)| index).unwrap_or(0);
    let sector = pool.slot(selected);
    store.begin(sector, size)?;
    let counter = Metadata::read(store.data(), offset)?.counter;

    info!(sector, index = selected, counter, "Selected active sector");

    Ok(ScanReport {
        selected,
        counter,
        valid,
        corrupted,
    })
}
