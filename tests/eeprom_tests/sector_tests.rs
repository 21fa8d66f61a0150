//! Tests for SectorEeprom
//!
//! These tests verify:
//! - Loading a sector into the buffer (size rounding and clamping)
//! - Byte access and dirty tracking
//! - Commit (erase + rewrite, skip when clean)
//! - Failure paths keep the buffer dirty

use flashrotate::{Geometry, MemFlash, RotateError, SectorEeprom, SectorStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_eeprom() -> (MemFlash, SectorEeprom<MemFlash>) {
    let flash = MemFlash::new(Geometry::new(64, 16, 12).unwrap());
    let eeprom = SectorEeprom::new(flash.clone());
    (flash, eeprom)
}

// =============================================================================
// Begin Tests
// =============================================================================

#[test]
fn test_new_points_at_last_usable_sector() {
    let (_flash, eeprom) = setup_eeprom();

    assert_eq!(eeprom.sector(), 11);
    assert_eq!(eeprom.size(), 0);
    assert!(!eeprom.is_dirty());
}

#[test]
fn test_begin_loads_sector_contents() {
    let (flash, mut eeprom) = setup_eeprom();
    flash.load_sector(9, b"stored bytes");

    eeprom.begin(9, 16).unwrap();

    assert_eq!(eeprom.sector(), 9);
    assert_eq!(&eeprom.data()[..12], b"stored bytes");
    assert_eq!(&eeprom.data()[12..], &[0xFF; 4]);
    assert!(!eeprom.is_dirty());
}

#[test]
fn test_begin_rounds_size_to_word() {
    let (_flash, mut eeprom) = setup_eeprom();

    eeprom.begin(11, 10).unwrap();

    assert_eq!(eeprom.size(), 12);
}

#[test]
fn test_begin_clamps_to_sector_size() {
    let (_flash, mut eeprom) = setup_eeprom();

    eeprom.begin(11, 1000).unwrap();

    assert_eq!(eeprom.size(), 64);
}

#[test]
fn test_buffer_len_matches_loaded_size() {
    let (_flash, mut eeprom) = setup_eeprom();

    assert_eq!(eeprom.buffer_len(5), 8);
    assert_eq!(eeprom.buffer_len(64), 64);
    assert_eq!(eeprom.buffer_len(usize::MAX), 64);

    eeprom.begin(11, 5).unwrap();
    assert_eq!(eeprom.size(), eeprom.buffer_len(5));
}

#[test]
fn test_begin_zero_size_rejected() {
    let (_flash, mut eeprom) = setup_eeprom();

    let result = eeprom.begin(11, 0);

    assert!(matches!(result, Err(RotateError::ConfigRejected(_))));
    assert_eq!(eeprom.size(), 0);
}

#[test]
fn test_begin_failure_keeps_previous_buffer() {
    let (flash, mut eeprom) = setup_eeprom();
    flash.load_sector(11, &[7; 8]);
    eeprom.begin(11, 8).unwrap();

    assert!(eeprom.begin(40, 8).is_err());

    assert_eq!(eeprom.sector(), 11);
    assert_eq!(eeprom.data(), &[7; 8]);
}

#[test]
fn test_begin_clears_dirty() {
    let (_flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();
    eeprom.write(0, 1).unwrap();
    assert!(eeprom.is_dirty());

    eeprom.begin(11, 8).unwrap();

    assert!(!eeprom.is_dirty());
    assert_eq!(eeprom.read(0).unwrap(), 0xFF);
}

// =============================================================================
// Byte Access Tests
// =============================================================================

#[test]
fn test_write_marks_dirty_only_on_change() {
    let (_flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();

    eeprom.write(3, 0xFF).unwrap();
    assert!(!eeprom.is_dirty());

    eeprom.write(3, 0x10).unwrap();
    assert!(eeprom.is_dirty());
    assert_eq!(eeprom.read(3).unwrap(), 0x10);
}

#[test]
fn test_dirty_is_sticky_until_commit() {
    let (_flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();

    eeprom.write(3, 0x10).unwrap();
    eeprom.write(3, 0xFF).unwrap();

    assert!(eeprom.is_dirty());
}

#[test]
fn test_byte_access_out_of_range() {
    let (_flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();

    assert!(matches!(
        eeprom.read(8),
        Err(RotateError::AddressOutOfRange { address: 8, size: 8 })
    ));
    assert!(eeprom.write(8, 0).is_err());
}

#[test]
fn test_mark_dirty_and_data_mut() {
    let (_flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();

    eeprom.data_mut()[0] = 0x55;
    assert!(!eeprom.is_dirty());

    eeprom.mark_dirty();
    assert!(eeprom.is_dirty());
}

// =============================================================================
// Commit Tests
// =============================================================================

#[test]
fn test_commit_writes_current_sector() {
    let (flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();
    for (i, byte) in b"abcdefgh".iter().enumerate() {
        eeprom.write(i, *byte).unwrap();
    }

    eeprom.commit().unwrap();

    assert!(!eeprom.is_dirty());
    assert_eq!(&flash.sector(11)[..8], b"abcdefgh");
    assert_eq!(flash.erase_count(), 1);
    assert_eq!(flash.write_count(), 1);
}

#[test]
fn test_commit_follows_set_sector() {
    let (flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();
    eeprom.write(0, 0x01).unwrap();

    eeprom.set_sector(10);
    eeprom.commit().unwrap();

    assert_eq!(flash.sector(10)[0], 0x01);
    assert_eq!(flash.sector(11)[0], 0xFF);
}

#[test]
fn test_commit_clean_buffer_writes_nothing() {
    let (flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();

    eeprom.commit().unwrap();

    assert_eq!(flash.write_count(), 0);
    assert_eq!(flash.erase_count(), 0);
}

#[test]
fn test_commit_before_begin_fails() {
    let (_flash, mut eeprom) = setup_eeprom();

    assert!(matches!(eeprom.commit(), Err(RotateError::NotLoaded)));
}

#[test]
fn test_failed_commit_stays_dirty() {
    let (flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();
    eeprom.write(0, 0x01).unwrap();
    flash.fail_writes(true);

    let result = eeprom.commit();

    assert!(matches!(result, Err(RotateError::WriteFailed { sector: 11 })));
    assert!(eeprom.is_dirty());

    flash.fail_writes(false);
    eeprom.commit().unwrap();
    assert!(!eeprom.is_dirty());
    assert_eq!(flash.sector(11)[0], 0x01);
}

#[test]
fn test_failed_erase_skips_write() {
    let (flash, mut eeprom) = setup_eeprom();
    eeprom.begin(11, 8).unwrap();
    eeprom.write(0, 0x01).unwrap();
    flash.fail_erases(true);

    let result = eeprom.commit();

    assert!(matches!(result, Err(RotateError::EraseFailed { sector: 11 })));
    assert_eq!(flash.write_count(), 0);
    assert!(eeprom.is_dirty());
}
