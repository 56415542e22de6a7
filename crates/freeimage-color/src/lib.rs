//! FreeImage Color - Color processing for bitmaps
//!
//! This crate provides the color operations layered on top of
//! `freeimage-core`:
//!
//! - **YUV conversion** ([`yuv`]): RGB <-> YUV in the JPEG standard,
//!   pixel-level and whole-bitmap
//! - **Tone mapping** ([`tonemap`]): clamp and linear-stretch operators
//!   from HDR types down to classic bitmaps
//! - **Quantization** ([`quantize`]): Wu's variance-minimizing color
//!   quantizer

pub mod error;
pub mod quantize;
pub mod tonemap;
pub mod yuv;

// Re-export core types
pub use freeimage_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

// Re-export YUV types and functions
pub use yuv::{
    // Types
    YuvStandard,
    // Image-level conversions
    convert_rgb_to_yuv,
    convert_to_color,
    convert_yuv_to_rgb,
    // Pixel-level conversions
    rgb_to_yuv8,
    rgb_to_yuv16,
    rgb_to_yuv_f32,
    yuv_to_rgb8,
    yuv_to_rgb16,
    yuv_to_rgb_f32,
};

// Re-export tone mapping operators
pub use tonemap::{tmo_clamp, tmo_linear};

// Re-export quantization
pub use quantize::{WuQuantizeOptions, wu_quantize};
