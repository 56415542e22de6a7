//! FreeImage - Bitmap processing library for Rust
//!
//! This is a Rust port of the in-memory engine of the
//! [FreeImage](https://freeimage.sourceforge.io/) bitmap library.
//!
//! # Overview
//!
//! FreeImage provides an owned device-independent bitmap container and
//! the pixel operations around it:
//!
//! - Classic (1 to 32 bpp) and extended (integer, float, complex) types
//! - Bit-depth conversion, greyscale and float conversion
//! - RGB <-> YUV color space conversion
//! - Brightness statistics and tone mapping operators
//! - Wu color quantization
//! - Alpha compositing and blended pasting
//!
//! # Example
//!
//! ```
//! use freeimage::{Bitmap, ColorType};
//!
//! // Create a 24-bpp bitmap and flatten it to greyscale
//! let bitmap = Bitmap::new(640, 480, 24).unwrap();
//! let grey = bitmap.convert_to_greyscale().unwrap();
//! assert_eq!(grey.bpp(), 8);
//! assert_eq!(grey.color_type(), ColorType::MinIsBlack);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use freeimage_core::*;

// Re-export the color crate as a module to avoid name conflicts
pub use freeimage_color as color;
