//! FreeImage Core - The in-memory bitmap engine
//!
//! This crate provides the bitmap container and the pixel-level
//! operations everything else builds on:
//!
//! - [`Bitmap`] - the device-independent bitmap container
//! - [`pixel`] - image types, color classification and typed pixel structs
//! - [`bitmap::scanline`] - typed per-pixel iteration and transformation
//! - bit-depth conversion, float conversion, statistics and compositing
//!   as [`Bitmap`] methods
//!
//! # See also
//!
//! C FreeImage: `FreeImage.h` (struct definitions), `BitmapAccess.cpp`

pub mod bitmap;
pub mod error;
pub mod pixel;

pub use bitmap::scanline::{for_each_pixel, transform};
pub use bitmap::{AlphaOperation, Bitmap, ColorEncoding, Metadata, MinMax, Palette};
pub use error::{Error, Result};
pub use pixel::{
    ColorType, Complex, ComplexF, ImageType, Pixel, PixelValue, Rgb8, Rgb16, Rgb32, RgbF, Rgba8,
    Rgba16, Rgba32, RgbaF, grey, luma_jpeg, luma_rec709,
};
