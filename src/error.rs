//! Error types for flashrotate
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RotateError
pub type Result<T> = std::result::Result<T, RotateError>;

/// Unified error type for flashrotate operations
#[derive(Debug, Error)]
pub enum RotateError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid flash image: {0}")]
    InvalidImage(String),

    // -------------------------------------------------------------------------
    // Raw Flash Errors
    // -------------------------------------------------------------------------
    #[error("Erase of sector {sector} failed")]
    EraseFailed { sector: u32 },

    #[error("Read of sector {sector} failed")]
    ReadFailed { sector: u32 },

    #[error("Write to sector {sector} failed")]
    WriteFailed { sector: u32 },

    #[error("Sector {sector} out of range (limit {limit})")]
    SectorOutOfRange { sector: u32, limit: u32 },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Address {address} out of range (size {size})")]
    AddressOutOfRange { address: usize, size: usize },

    #[error("No record loaded")]
    NotLoaded,

    #[error("Sector {sector} is not part of the rotation pool")]
    NotInPool { sector: u32 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration rejected: {0}")]
    ConfigRejected(String),
}
