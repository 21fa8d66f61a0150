//! Tests for sector dumps
//!
//! These tests verify:
//! - Header, separator and row layout
//! - Hex and ASCII rendering of stored bytes
//! - Sector bound (last usable + margin)
//! - Dumping leaves the record untouched

use flashrotate::rotate::DUMP_SECTOR_MARGIN;
use flashrotate::{Config, Geometry, MemFlash, RotateError, RotatingEeprom, SectorEeprom};

// =============================================================================
// Helper Functions
// =============================================================================

type Eeprom = RotatingEeprom<SectorEeprom<MemFlash>>;

fn setup_committed() -> (MemFlash, Eeprom) {
    let flash = MemFlash::new(Geometry::new(64, 16, 12).unwrap());
    let config = Config::builder().pool_size(3).build();
    let mut eeprom = RotatingEeprom::new(SectorEeprom::new(flash.clone()), config).unwrap();
    eeprom.begin(64).unwrap();
    eeprom.write_bytes(3, b"hello").unwrap();
    eeprom.commit().unwrap();
    (flash, eeprom)
}

fn dump_to_string(eeprom: &mut Eeprom, sector: Option<u32>) -> String {
    let mut out = Vec::new();
    eeprom.dump(&mut out, sector).unwrap();
    String::from_utf8(out).unwrap()
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_header_and_separator() {
    let (_flash, mut eeprom) = setup_committed();

    let output = dump_to_string(&mut eeprom, None);
    let lines: Vec<&str> = output.lines().collect();

    assert!(lines[0].starts_with("         00 01 02 "));
    assert!(lines[0].trim_end().ends_with("0E 0F"));
    assert_eq!(lines[1], "-".repeat(54));
}

#[test]
fn test_one_row_per_sixteen_bytes() {
    let (_flash, mut eeprom) = setup_committed();

    let output = dump_to_string(&mut eeprom, None);
    let lines: Vec<&str> = output.lines().collect();

    // header, separator, 4 rows, trailing blank line
    assert_eq!(lines.len(), 7);
    assert!(lines[2].starts_with("0x0000:  "));
    assert!(lines[3].starts_with("0x0010:  "));
    assert!(lines[5].starts_with("0x0030:  "));
    assert_eq!(lines[6], "");
}

#[test]
fn test_row_shows_hex_and_ascii() {
    let (_flash, mut eeprom) = setup_committed();

    let output = dump_to_string(&mut eeprom, None);
    let row = output.lines().nth(2).unwrap();

    // counter byte then the payload
    assert!(row.contains("00 68 65 6C 6C 6F FF "));
    assert!(row.ends_with(&format!("hello{}", " ".repeat(8))));
}

#[test]
fn test_erased_sector_renders_blank_ascii() {
    let (_flash, mut eeprom) = setup_committed();

    let output = dump_to_string(&mut eeprom, Some(9));
    let row = output.lines().nth(2).unwrap();

    assert_eq!(row, format!("0x0000:  {}{}", "FF ".repeat(16), " ".repeat(16)));
}

// =============================================================================
// Bounds Tests
// =============================================================================

#[test]
fn test_reserved_sectors_within_margin() {
    let (_flash, mut eeprom) = setup_committed();
    let limit = eeprom.last() + DUMP_SECTOR_MARGIN;

    assert_eq!(limit, 15);
    assert!(eeprom.dump(&mut Vec::new(), Some(14)).is_ok());
    assert!(eeprom.dump(&mut Vec::new(), Some(limit)).is_ok());
}

#[test]
fn test_sector_past_margin_rejected() {
    let (_flash, mut eeprom) = setup_committed();

    let result = eeprom.dump(&mut Vec::new(), Some(16));

    assert!(matches!(
        result,
        Err(RotateError::SectorOutOfRange { sector: 16, limit: 15 })
    ));
}

// =============================================================================
// Side Effect Tests
// =============================================================================

#[test]
fn test_dump_leaves_record_untouched() {
    let (flash, mut eeprom) = setup_committed();
    eeprom.write(40, 0x11).unwrap();
    let active = eeprom.active();
    let data = eeprom.data().to_vec();
    let writes = flash.write_count();

    dump_to_string(&mut eeprom, Some(11));

    assert_eq!(eeprom.active(), active);
    assert_eq!(eeprom.data(), data.as_slice());
    assert!(eeprom.is_dirty());
    assert_eq!(flash.write_count(), writes);
    assert_eq!(flash.erase_count(), 1);
}
