//! Error types for freeimage-color

use freeimage_core::ColorType;
use thiserror::Error;

/// Errors that can occur during color processing operations
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] freeimage_core::Error),

    /// No conversion is defined between the two color layouts
    #[error("unsupported conversion: {from:?} to {to:?}")]
    UnsupportedConversion { from: ColorType, to: ColorType },

    /// Requested palette size out of range
    #[error("invalid palette size: {0} (expected 2..=256)")]
    InvalidPaletteSize(usize),
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
