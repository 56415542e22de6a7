//! freeimage-test - Regression test framework for FreeImage
//!
//! This crate provides a regression test framework supporting three
//! modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! # Usage
//!
//! ```ignore
//! use freeimage_test::{RegParams, RegTestMode};
//!
//! let mut rp = RegParams::new("tonemap");
//! rp.compare_values(128.0, value as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use freeimage_core::{Bitmap, ImageType, Rgb8, RgbF};

/// Build a 24-bpp bitmap sweeping red along x and green along y, with a
/// constant blue.
///
/// Deterministic, so regression outputs derived from it are stable.
pub fn color_gradient(width: u32, height: u32) -> TestResult<Bitmap> {
    let mut b = Bitmap::new(width, height, 24)?;
    for y in 0..height {
        let row = b.scanline_mut(y);
        for x in 0..width as usize {
            let p = Rgb8 {
                blue: 64,
                green: (y * 255 / height.max(1)) as u8,
                red: (x as u32 * 255 / width.max(1)) as u8,
            };
            row[x * 3..x * 3 + 3].copy_from_slice(bytemuck::bytes_of(&p));
        }
    }
    Ok(b)
}

/// Build an 8-bpp greyscale bitmap with a left-to-right ramp and a
/// linear ramp palette.
pub fn grey_gradient(width: u32, height: u32) -> TestResult<Bitmap> {
    let mut b = Bitmap::new(width, height, 8)?;
    if let Some(pal) = b.palette_mut() {
        pal.set_grey_ramp();
    }
    for y in 0..height {
        let row = b.scanline_mut(y);
        for x in 0..width as usize {
            row[x] = (x as u32 * 255 / width.max(1)) as u8;
        }
    }
    Ok(b)
}

/// Build a float bitmap ramping from `lo` at the left edge to `hi` at
/// the right edge.
pub fn float_gradient(width: u32, height: u32, lo: f32, hi: f32) -> TestResult<Bitmap> {
    let mut b = Bitmap::with_type(ImageType::Float, width, height)?;
    for y in 0..height {
        let row = b.scanline_mut(y);
        for x in 0..width as usize {
            let t = x as f32 / (width.max(2) - 1) as f32;
            let v = lo + (hi - lo) * t;
            row[x * 4..x * 4 + 4].copy_from_slice(bytemuck::bytes_of(&v));
        }
    }
    Ok(b)
}

/// Build an RGBF bitmap whose brightness ramps along x while the hue
/// stays fixed, for exercising tone mapping.
pub fn hdr_gradient(width: u32, height: u32, peak: f32) -> TestResult<Bitmap> {
    let mut b = Bitmap::with_type(ImageType::RgbF, width, height)?;
    for y in 0..height {
        let row = b.scanline_mut(y);
        for x in 0..width as usize {
            let t = (x + 1) as f32 / width.max(1) as f32;
            let p = RgbF {
                red: peak * t,
                green: peak * t * 0.5,
                blue: peak * t * 0.25,
            };
            row[x * 12..x * 12 + 12].copy_from_slice(bytemuck::bytes_of(&p));
        }
    }
    Ok(b)
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // freeimage-test is at crates/freeimage-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
