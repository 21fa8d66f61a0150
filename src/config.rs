//! Configuration for flashrotate
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, RotateError};
use crate::flash::Geometry;
use crate::rotate::METADATA_LEN;

/// Smallest accepted rotation pool
pub const MIN_POOL_SIZE: u8 = 1;

/// Largest accepted rotation pool
pub const MAX_POOL_SIZE: u8 = 10;

/// Main configuration for a rotating record
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Pool Configuration
    // -------------------------------------------------------------------------
    /// Number of sectors the record rotates through (1..=10)
    pub pool_size: u8,

    /// Sector holding pool index 0. The pool grows downward from here:
    ///   index i → sector (base - i)
    /// `None` uses the last usable sector reported by the flash geometry.
    pub base_sector: Option<u32>,

    // -------------------------------------------------------------------------
    // Metadata Configuration
    // -------------------------------------------------------------------------
    /// Byte offset of the 3-byte metadata block inside the record
    ///   [offset+0..=offset+1] checksum (big endian)
    ///   [offset+2]            generation counter
    pub metadata_offset: usize,

    /// Checksum guarding each sector copy
    pub checksum: ChecksumKind,
}

/// Integrity checksum stored in the metadata block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    /// 16-bit wrapping sum of every record byte outside the metadata block
    #[default]
    Additive,

    /// CRC-32 of the same bytes, high and low halves XOR-folded to 16 bits
    Crc32Folded,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool_size: MIN_POOL_SIZE,
            base_sector: None,
            metadata_offset: 0,
            checksum: ChecksumKind::Additive,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the base sector against the device geometry
    pub fn base_sector(&self, geometry: &Geometry) -> u32 {
        self.base_sector
            .unwrap_or_else(|| geometry.last_usable_sector())
    }

    /// Check every field against the device geometry
    pub fn validate(&self, geometry: &Geometry) -> Result<()> {
        geometry.validate()?;
        validate_offset(self.metadata_offset, geometry.sector_size)?;

        let base = self.base_sector(geometry);
        if base >= geometry.sector_count {
            return Err(RotateError::ConfigRejected(format!(
                "base sector {} beyond device ({} sectors)",
                base, geometry.sector_count
            )));
        }

        validate_pool_size(self.pool_size, base)
    }
}

/// Pool must be 1..=10 sectors and fit below (and including) the base sector
pub(crate) fn validate_pool_size(pool_size: u8, base: u32) -> Result<()> {
    if !(MIN_POOL_SIZE..=MAX_POOL_SIZE).contains(&pool_size) {
        return Err(RotateError::ConfigRejected(format!(
            "pool size {} outside {}..={}",
            pool_size, MIN_POOL_SIZE, MAX_POOL_SIZE
        )));
    }
    if u32::from(pool_size) > base.saturating_add(1) {
        return Err(RotateError::ConfigRejected(format!(
            "pool of {} sectors does not fit below sector {}",
            pool_size, base
        )));
    }
    Ok(())
}

/// Metadata block must leave room for its 3 bytes
pub(crate) fn validate_offset(offset: usize, limit: usize) -> Result<()> {
    match offset.checked_add(METADATA_LEN) {
        Some(end) if end <= limit => Ok(()),
        _ => Err(RotateError::ConfigRejected(format!(
            "metadata offset {} leaves less than {} bytes in {}",
            offset, METADATA_LEN, limit
        ))),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of sectors in the rotation pool
    pub fn pool_size(mut self, sectors: u8) -> Self {
        self.config.pool_size = sectors;
        self
    }

    /// Pin pool index 0 to an explicit sector
    pub fn base_sector(mut self, sector: u32) -> Self {
        self.config.base_sector = Some(sector);
        self
    }

    /// Set the metadata block offset
    pub fn metadata_offset(mut self, offset: usize) -> Self {
        self.config.metadata_offset = offset;
        self
    }

    /// Set the checksum kind
    pub fn checksum(mut self, kind: ChecksumKind) -> Self {
        self.config.checksum = kind;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
