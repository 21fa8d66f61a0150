//! Tests for Config
//!
//! These tests verify:
//! - Defaults and builder
//! - Pool size bounds (1..=10) and fit below the base sector
//! - Metadata offset room (3 bytes)
//! - Base sector resolution from geometry
//! - Geometry validation, including hand-built values

use flashrotate::config::{Config, ChecksumKind, MAX_POOL_SIZE};
use flashrotate::{Geometry, MemFlash, RotateError, RotatingEeprom, SectorEeprom};

// =============================================================================
// Helper Functions
// =============================================================================

/// 16 sectors of 64 bytes, last 4 reserved → last usable sector 11
fn geometry() -> Geometry {
    Geometry::new(64, 16, 12).unwrap()
}

// =============================================================================
// Defaults / Builder Tests
// =============================================================================

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.pool_size, 1);
    assert_eq!(config.metadata_offset, 0);
    assert_eq!(config.base_sector, None);
    assert_eq!(config.checksum, ChecksumKind::Additive);
}

#[test]
fn test_builder_sets_fields() {
    let config = Config::builder()
        .pool_size(4)
        .metadata_offset(8)
        .base_sector(9)
        .checksum(ChecksumKind::Crc32Folded)
        .build();

    assert_eq!(config.pool_size, 4);
    assert_eq!(config.metadata_offset, 8);
    assert_eq!(config.base_sector, Some(9));
    assert_eq!(config.checksum, ChecksumKind::Crc32Folded);
}

#[test]
fn test_base_sector_defaults_to_last_usable() {
    let config = Config::default();
    assert_eq!(config.base_sector(&geometry()), 11);

    let config = Config::builder().base_sector(5).build();
    assert_eq!(config.base_sector(&geometry()), 5);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_validate_accepts_pool_bounds() {
    for size in 1..=MAX_POOL_SIZE {
        let config = Config::builder().pool_size(size).build();
        assert!(config.validate(&geometry()).is_ok(), "pool size {}", size);
    }
}

#[test]
fn test_validate_rejects_zero_pool() {
    let config = Config::builder().pool_size(0).build();

    let result = config.validate(&geometry());

    assert!(matches!(result, Err(RotateError::ConfigRejected(_))));
}

#[test]
fn test_validate_rejects_oversized_pool() {
    let config = Config::builder().pool_size(11).build();

    let result = config.validate(&geometry());

    assert!(matches!(result, Err(RotateError::ConfigRejected(_))));
}

#[test]
fn test_validate_rejects_pool_below_sector_zero() {
    // Sectors 2, 1, 0 exist below base 2; a fourth would underflow
    let config = Config::builder().pool_size(4).base_sector(2).build();
    assert!(matches!(
        config.validate(&geometry()),
        Err(RotateError::ConfigRejected(_))
    ));

    let config = Config::builder().pool_size(3).base_sector(2).build();
    assert!(config.validate(&geometry()).is_ok());
}

#[test]
fn test_validate_rejects_base_beyond_device() {
    let config = Config::builder().base_sector(16).build();

    let result = config.validate(&geometry());

    assert!(matches!(result, Err(RotateError::ConfigRejected(_))));
}

#[test]
fn test_validate_offset_needs_three_bytes() {
    let fits = Config::builder().metadata_offset(61).build();
    assert!(fits.validate(&geometry()).is_ok());

    let overflows = Config::builder().metadata_offset(62).build();
    assert!(matches!(
        overflows.validate(&geometry()),
        Err(RotateError::ConfigRejected(_))
    ));
}

// =============================================================================
// Geometry Tests
// =============================================================================

#[test]
fn test_geometry_derived_values() {
    let geometry = geometry();

    assert_eq!(geometry.last_usable_sector(), 11);
    assert_eq!(geometry.reserved_sector_count(), 4);
    assert_eq!(geometry.total_size(), 1024);
}

#[test]
fn test_geometry_rejects_bad_boundary() {
    assert!(Geometry::new(64, 16, 0).is_err());
    assert!(Geometry::new(64, 16, 17).is_err());
    assert!(Geometry::new(64, 16, 16).is_ok());
}

#[test]
fn test_geometry_rejects_tiny_sectors() {
    assert!(Geometry::new(2, 16, 12).is_err());
}

#[test]
fn test_hand_built_geometry_does_not_panic() {
    let geometry = Geometry {
        sector_size: 64,
        sector_count: 16,
        reserved_boundary: 0,
    };

    assert_eq!(geometry.last_usable_sector(), 0);
    assert_eq!(geometry.reserved_sector_count(), 16);
    assert!(matches!(
        geometry.validate(),
        Err(RotateError::ConfigRejected(_))
    ));
    assert!(matches!(
        Config::default().validate(&geometry),
        Err(RotateError::ConfigRejected(_))
    ));
}

#[test]
fn test_rotating_eeprom_rejects_invalid_geometry() {
    let geometry = Geometry {
        sector_size: 64,
        sector_count: 16,
        reserved_boundary: 0,
    };
    let store = SectorEeprom::new(MemFlash::new(geometry));

    let result = RotatingEeprom::new(store, Config::default());

    assert!(matches!(result, Err(RotateError::ConfigRejected(_))));
}
