//! Sector dumps
//!
//! ```text
//!          00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F
//! ------------------------------------------------------
//! 0x0000:  12 34 07 68 65 6C 6C 6F FF FF FF FF FF FF FF FF    hello
//! ```

use std::io::Write;

use crate::eeprom::SectorStore;
use crate::error::Result;

/// Bytes per dump row
pub const ROW_LEN: usize = 16;

/// Write a hex + ASCII table of `sector` to `out`
///
/// Reads straight from flash one row at a time; the store's buffer is not touched.
pub fn write_sector<S, W>(store: &mut S, sector: u32, out: &mut W) -> Result<()>
where
    S: SectorStore + ?Sized,
    W: Write,
{
    let sector_size = store.geometry().sector_size;

    write!(out, "         ")?;
    for column in 0..ROW_LEN {
        write!(out, "{:02X} ", column)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(54))?;

    let mut row = [0u8; ROW_LEN];
    for address in (0..sector_size).step_by(ROW_LEN) {
        let len = ROW_LEN.min(sector_size - address);
        store.read_raw(sector, address, &mut row[..len])?;

        write!(out, "0x{:04X}:  ", address)?;
        for byte in &row[..len] {
            write!(out, "{:02X} ", byte)?;
        }
        for _ in len..ROW_LEN {
            write!(out, "   ")?;
        }
        let ascii: String = row[..len].iter().map(|&b| printable(b)).collect();
        writeln!(out, "{}", ascii)?;
    }
    writeln!(out)?;
    Ok(())
}

fn printable(byte: u8) -> char {
    if (32..127).contains(&byte) {
        byte as char
    } else {
        ' '
    }
}
