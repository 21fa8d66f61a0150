//! File-backed flash
//!
//! Emulates a flash device inside an image file.
//!
//! ## Image Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (18 bytes)                                           │
//! │   Magic: "FRIM" (4) | Version: u16 (2)                      │
//! │   SectorSize: u32 (4) | SectorCount: u32 (4)                │
//! │   ReservedBoundary: u32 (4)                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Sector 0 (sector_size bytes)                                │
//! │ Sector 1                                                    │
//! │ ...                                                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, RotateError};

use super::{Flash, Geometry, ERASED_BYTE};

/// Magic bytes identifying a flash image
const MAGIC: &[u8; 4] = b"FRIM";

/// Current image format version
const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + 3 × u32 (12) = 18 bytes
const HEADER_SIZE: u64 = 18;

/// Flash device stored in an image file
pub struct FileFlash {
    path: PathBuf,
    file: File,
    geometry: Geometry,
}

impl FileFlash {
    /// Create (or truncate) an image with every sector erased
    pub fn create(path: &Path, geometry: Geometry) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut flash = Self {
            path: path.to_path_buf(),
            file,
            geometry,
        };

        let mut header = Vec::with_capacity(HEADER_SIZE as usize);
        header.extend_from_slice(MAGIC);
        header.extend_from_slice(&VERSION.to_le_bytes());
        header.extend_from_slice(&(geometry.sector_size as u32).to_le_bytes());
        header.extend_from_slice(&geometry.sector_count.to_le_bytes());
        header.extend_from_slice(&geometry.reserved_boundary.to_le_bytes());
        flash.file.write_all(&header)?;

        let erased = vec![ERASED_BYTE; geometry.sector_size];
        for _ in 0..geometry.sector_count {
            flash.file.write_all(&erased)?;
        }
        flash.file.sync_all()?;

        debug!(
            path = %flash.path.display(),
            sectors = geometry.sector_count,
            sector_size = geometry.sector_size,
            "Created flash image"
        );

        Ok(flash)
    }

    /// Open an existing image
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let file_size = file.metadata()?.len();

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(RotateError::InvalidImage(format!(
                "expected magic FRIM, got {:?}",
                &header[0..4]
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(RotateError::InvalidImage(format!(
                "unsupported version {}",
                version
            )));
        }

        let field = |at: usize| u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]]);
        let geometry = Geometry::new(field(6) as usize, field(10), field(14))
            .map_err(|e| RotateError::InvalidImage(e.to_string()))?;

        let expected = HEADER_SIZE + geometry.total_size();
        if file_size != expected {
            return Err(RotateError::InvalidImage(format!(
                "size {} does not match geometry ({} expected)",
                file_size, expected
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            geometry,
        })
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seek_to(&mut self, sector: u32, offset: usize) -> Result<()> {
        let position =
            HEADER_SIZE + u64::from(sector) * self.geometry.sector_size as u64 + offset as u64;
        self.file.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

impl Flash for FileFlash {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn erase(&mut self, sector: u32) -> Result<()> {
        self.geometry.check_access(sector, 0, 0)?;
        self.seek_to(sector, 0)?;
        let erased = vec![ERASED_BYTE; self.geometry.sector_size];
        self.file
            .write_all(&erased)
            .and_then(|_| self.file.sync_all())
            .map_err(|_| RotateError::EraseFailed { sector })
    }

    fn read(&mut self, sector: u32, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.geometry.check_access(sector, offset, buf.len())?;
        self.seek_to(sector, offset)?;
        self.file
            .read_exact(buf)
            .map_err(|_| RotateError::ReadFailed { sector })
    }

    fn write(&mut self, sector: u32, data: &[u8]) -> Result<()> {
        self.geometry.check_access(sector, 0, data.len())?;

        // Program semantics: bits only go from 1 to 0
        let mut current = vec![0u8; data.len()];
        self.read(sector, 0, &mut current)?;
        for (cell, byte) in current.iter_mut().zip(data) {
            *cell &= *byte;
        }

        self.seek_to(sector, 0)?;
        self.file
            .write_all(&current)
            .and_then(|_| self.file.sync_all())
            .map_err(|_| RotateError::WriteFailed { sector })
    }
}
