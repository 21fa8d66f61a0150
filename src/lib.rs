//! # flashrotate
//!
//! Wear-leveled EEPROM emulation on block-erasable flash:
//! - One fixed-size record, held in RAM
//! - Each commit writes the next sector of a small pool (round robin)
//! - Checksum + wrapping generation counter in every copy
//! - Power-loss recovery: startup picks the newest copy whose checksum holds
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RotatingEeprom                          │
//! │     (pool scan, commit rotation, rollback, backup)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ SectorStore
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     SectorEeprom                            │
//! │        (RAM buffer over one sector, dirty tracking)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Flash (inside CriticalSection)
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  MemFlash   │          │  FileFlash  │
//!   │   (RAM)     │          │  (image)    │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod critical;
pub mod flash;
pub mod eeprom;
pub mod rotate;
pub mod dump;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RotateError, Result};
pub use config::{ChecksumKind, Config};
pub use eeprom::{SectorEeprom, SectorStore};
pub use flash::{FileFlash, Flash, Geometry, MemFlash};
pub use rotate::{ActiveState, RotatingEeprom, ScanReport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of flashrotate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
