//! Rotation Module
//!
//! Persists one fixed-size record into a pool of interchangeable sectors,
//! writing the next sector on every commit so wear spreads across the pool.
//!
//! ## Responsibilities
//! - Checksum every copy so torn or never-written sectors are ignored
//! - Stamp every copy with a wrapping generation counter
//! - Pick the newest valid copy on startup
//! - Roll back sector bookkeeping when a write fails
//!
//! ## Record Layout
//! ```text
//! ┌──────────────┬──────────┬──────────┬─────────┬──────────────┐
//! │ data ...     │ CRC hi   │ CRC lo   │ Counter │ data ...     │
//! └──────────────┴──────────┴──────────┴─────────┴──────────────┘
//!                 ▲ offset   offset+1   offset+2
//! ```
//! The checksum covers every byte except the three metadata bytes.
//!
//! ## Pool Layout
//! ```text
//!   index:    pool-1  ...   2      1      0
//!   sector:   base-(pool-1) base-2 base-1 base
//! ```
//! Commits walk the indices 0 → 1 → ... → pool-1 → 0.

mod checksum;
mod metadata;
mod pool;
mod recovery;
mod rotator;
mod version;

pub use checksum::{checksum, crc32_folded};
pub use metadata::{Metadata, CHECKSUM_OFFSET, COUNTER_OFFSET, METADATA_LEN};
pub use pool::Pool;
pub use recovery::ScanReport;
pub use rotator::{ActiveState, RotatingEeprom, DUMP_SECTOR_MARGIN};
pub use version::is_newer;
