//! Error types for freeimage-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.
//!
//! # See also
//!
//! C FreeImage signals failure by returning `NULL` / `FALSE` and reporting
//! through a global message callback. This module replaces both with Rust's
//! `Result<T, Error>` pattern.

use thiserror::Error;

use crate::pixel::{ColorType, ImageType};

/// FreeImage-rs error type
#[derive(Error, Debug)]
pub enum Error {
    /// Bitmap has no pixel data (zero width or height)
    #[error("empty bitmap: no pixels to process")]
    EmptyBitmap,

    /// Invalid pixel depth for a classic bitmap
    #[error("invalid pixel depth: {0} bpp")]
    InvalidDepth(u32),

    /// Unsupported pixel depth for this operation
    #[error("unsupported pixel depth: {0} bpp")]
    UnsupportedDepth(u32),

    /// Unsupported image type for this operation
    #[error("unsupported image type: {0:?}")]
    UnsupportedImageType(ImageType),

    /// Unsupported color classification for this operation
    #[error("unsupported color type: {0:?}")]
    UnsupportedColorType(ColorType),

    /// Bitmap dimensions do not match the operation's requirement
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Fill value size does not match the pixel size
    #[error("invalid fill value: expected {expected} bytes, got {actual}")]
    InvalidFillValue { expected: usize, actual: usize },

    /// Pixel type size does not match the bitmap depth
    #[error("pixel size mismatch: {pixel_bits} bit pixel against {bpp} bpp bitmap")]
    PixelSizeMismatch { pixel_bits: usize, bpp: u32 },

    /// No extremum found (every pixel is NaN)
    #[error("no extremum: all pixels are NaN")]
    NoExtremum,
}

/// Result type alias for FreeImage operations
pub type Result<T> = std::result::Result<T, Error>;
