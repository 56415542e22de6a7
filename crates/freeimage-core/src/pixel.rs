//! Pixel model: image types, color classification and typed pixel structs.
//!
//! Every bitmap stores raw scanline bytes; the structs in this module give
//! those bytes a typed layout. Classic 8-bit color pixels use the BGR(A)
//! byte order of a Windows DIB, all wider pixel types store red first.
//!
//! # See also
//!
//! C FreeImage: `FREE_IMAGE_TYPE`, `FREE_IMAGE_COLOR_TYPE`, `FIRGBA8` and
//! friends in `FreeImage.h`, channel helpers in `SimpleTools.h`

use bytemuck::{Pod, Zeroable};

/// Storage format of a bitmap.
///
/// `Bitmap` covers the classic 1/4/8/16/24/32 bpp formats; every other
/// variant has a fixed pixel layout.
///
/// # See also
///
/// C FreeImage: `FREE_IMAGE_TYPE` (`FIT_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// Classic bitmap: 1, 4, 8, 16, 24 or 32 bits per pixel
    Bitmap,
    /// Array of u16
    UInt16,
    /// Array of i16
    Int16,
    /// Array of u32
    UInt32,
    /// Array of i32
    Int32,
    /// Array of f32
    Float,
    /// Array of f64
    Double,
    /// Array of [`Complex`] (2 x f64)
    Complex,
    /// Array of [`ComplexF`] (2 x f32)
    ComplexF,
    /// Array of [`Rgb16`]
    Rgb16,
    /// Array of [`Rgba16`]
    Rgba16,
    /// Array of [`Rgb32`]
    Rgb32,
    /// Array of [`Rgba32`]
    Rgba32,
    /// Array of [`RgbF`]
    RgbF,
    /// Array of [`RgbaF`]
    RgbaF,
    /// Unknown format
    Unknown,
}

impl ImageType {
    /// Fixed bit depth of this type, or `None` for [`ImageType::Bitmap`]
    /// and [`ImageType::Unknown`] where the depth is per-image.
    pub fn bpp(self) -> Option<u32> {
        match self {
            ImageType::Bitmap | ImageType::Unknown => None,
            ImageType::UInt16 | ImageType::Int16 => Some(16),
            ImageType::UInt32 | ImageType::Int32 | ImageType::Float => Some(32),
            ImageType::Double | ImageType::ComplexF | ImageType::Rgba16 => Some(64),
            ImageType::Complex | ImageType::Rgba32 | ImageType::RgbaF => Some(128),
            ImageType::Rgb16 => Some(48),
            ImageType::Rgb32 | ImageType::RgbF => Some(96),
        }
    }
}

/// Color classification of a bitmap.
///
/// # See also
///
/// C FreeImage: `FREE_IMAGE_COLOR_TYPE` (`FIC_*`), `FreeImage_GetColorType2()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    /// Greyscale with minimum value white
    MinIsWhite,
    /// Greyscale with minimum value black
    MinIsBlack,
    /// RGB color
    Rgb,
    /// Color palette
    Palette,
    /// RGB color with an alpha channel
    RgbAlpha,
    /// CMYK color
    Cmyk,
    /// YUV color (tagged by an RGB-to-YUV conversion)
    Yuv,
}

// 16-bpp packed RGB masks. Unknown masks are treated as 555.
pub const RGB555_RED_MASK: u16 = 0x7C00;
pub const RGB555_GREEN_MASK: u16 = 0x03E0;
pub const RGB555_BLUE_MASK: u16 = 0x001F;
pub const RGB555_RED_SHIFT: u32 = 10;
pub const RGB555_GREEN_SHIFT: u32 = 5;
pub const RGB555_BLUE_SHIFT: u32 = 0;

pub const RGB565_RED_MASK: u16 = 0xF800;
pub const RGB565_GREEN_MASK: u16 = 0x07E0;
pub const RGB565_BLUE_MASK: u16 = 0x001F;
pub const RGB565_RED_SHIFT: u32 = 11;
pub const RGB565_GREEN_SHIFT: u32 = 5;
pub const RGB565_BLUE_SHIFT: u32 = 0;

/// Integer BT.601 luma, used by the palette and greyscale conversion paths.
///
/// # See also
///
/// C FreeImage: `GREY()` in `Utilities.h`
#[inline]
pub fn grey(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8
}

/// Rec.709 luma, used by the float conversion path.
///
/// Deliberately distinct from [`grey`]: the integer path quantizes with
/// BT.601 weights while HDR-oriented conversions use Rec.709.
///
/// # See also
///
/// C FreeImage: `LUMA_REC709()` in `Utilities.h`
#[inline]
pub fn luma_rec709(r: f64, g: f64, b: f64) -> f64 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// JPEG (ITU-T T.871) luma, the brightness measure of the statistics module.
#[inline]
pub fn luma_jpeg(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Channel scalar of a pixel type.
pub trait PixelValue: Copy + PartialOrd + Pod + std::fmt::Debug {
    /// Smallest representable value (numeric lowest, not smallest positive).
    const MIN_VALUE: Self;
    /// Largest representable value.
    const MAX_VALUE: Self;

    fn to_f64(self) -> f64;

    fn is_nan_value(self) -> bool {
        false
    }
}

macro_rules! int_pixel_value {
    ($($t:ty),*) => {$(
        impl PixelValue for $t {
            const MIN_VALUE: Self = <$t>::MIN;
            const MAX_VALUE: Self = <$t>::MAX;

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

int_pixel_value!(u8, u16, i16, u32, i32);

impl PixelValue for f32 {
    const MIN_VALUE: Self = f32::MIN;
    const MAX_VALUE: Self = f32::MAX;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn is_nan_value(self) -> bool {
        self.is_nan()
    }
}

impl PixelValue for f64 {
    const MIN_VALUE: Self = f64::MIN;
    const MAX_VALUE: Self = f64::MAX;

    fn to_f64(self) -> f64 {
        self
    }

    fn is_nan_value(self) -> bool {
        self.is_nan()
    }
}

/// A typed view of one pixel.
///
/// Channel indices are semantic, not positional: 0 = red, 1 = green,
/// 2 = blue, 3 = alpha for color pixels; 0 = re, 1 = im for complex
/// pixels; scalars expose a single channel 0.
pub trait Pixel: Pod + PartialEq + std::fmt::Debug {
    type Value: PixelValue;

    /// Number of channels.
    const CHANNELS: usize;

    /// Read channel `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= Self::CHANNELS`.
    fn channel(&self, index: usize) -> Self::Value;

    /// Write channel `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= Self::CHANNELS`.
    fn set_channel(&mut self, index: usize, value: Self::Value);

    /// A pixel with every channel set to `value`.
    fn splat(value: Self::Value) -> Self;

    /// True when any color channel is NaN; the alpha channel is ignored
    /// since the color can be computed without it.
    fn is_nan(&self) -> bool {
        false
    }
}

macro_rules! scalar_pixel {
    ($($t:ty),*) => {$(
        impl Pixel for $t {
            type Value = $t;

            const CHANNELS: usize = 1;

            fn channel(&self, index: usize) -> $t {
                assert!(index < Self::CHANNELS, "channel index out of range");
                *self
            }

            fn set_channel(&mut self, index: usize, value: $t) {
                assert!(index < Self::CHANNELS, "channel index out of range");
                *self = value;
            }

            fn splat(value: $t) -> $t {
                value
            }

            fn is_nan(&self) -> bool {
                PixelValue::is_nan_value(*self)
            }
        }
    )*};
}

scalar_pixel!(u8, u16, i16, u32, i32, f32, f64);

/// 24-bpp classic pixel, BGR byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb8 {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

/// 32-bpp classic pixel, BGRA byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgba8 {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub alpha: u8,
}

/// 48-bit RGB pixel, red stored first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb16 {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// 64-bit RGBA pixel, red stored first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgba16 {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

/// 96-bit RGB pixel, red stored first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb32 {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

/// 128-bit RGBA pixel, red stored first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgba32 {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
}

/// 96-bit floating point RGB pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RgbF {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// 128-bit floating point RGBA pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RgbaF {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

/// Single precision complex pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ComplexF {
    pub re: f32,
    pub im: f32,
}

/// Double precision complex pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

macro_rules! rgb_pixel {
    ($($t:ident : $v:ty),*) => {$(
        impl Pixel for $t {
            type Value = $v;

            const CHANNELS: usize = 3;

            fn channel(&self, index: usize) -> $v {
                match index {
                    0 => self.red,
                    1 => self.green,
                    2 => self.blue,
                    _ => panic!("channel index out of range"),
                }
            }

            fn set_channel(&mut self, index: usize, value: $v) {
                match index {
                    0 => self.red = value,
                    1 => self.green = value,
                    2 => self.blue = value,
                    _ => panic!("channel index out of range"),
                }
            }

            fn splat(value: $v) -> Self {
                Self {
                    red: value,
                    green: value,
                    blue: value,
                }
            }
        }
    )*};
}

macro_rules! rgba_pixel {
    ($($t:ident : $v:ty),*) => {$(
        impl Pixel for $t {
            type Value = $v;

            const CHANNELS: usize = 4;

            fn channel(&self, index: usize) -> $v {
                match index {
                    0 => self.red,
                    1 => self.green,
                    2 => self.blue,
                    3 => self.alpha,
                    _ => panic!("channel index out of range"),
                }
            }

            fn set_channel(&mut self, index: usize, value: $v) {
                match index {
                    0 => self.red = value,
                    1 => self.green = value,
                    2 => self.blue = value,
                    3 => self.alpha = value,
                    _ => panic!("channel index out of range"),
                }
            }

            fn splat(value: $v) -> Self {
                Self {
                    red: value,
                    green: value,
                    blue: value,
                    alpha: value,
                }
            }
        }
    )*};
}

macro_rules! complex_pixel {
    ($($t:ident : $v:ty),*) => {$(
        impl Pixel for $t {
            type Value = $v;

            const CHANNELS: usize = 2;

            fn channel(&self, index: usize) -> $v {
                match index {
                    0 => self.re,
                    1 => self.im,
                    _ => panic!("channel index out of range"),
                }
            }

            fn set_channel(&mut self, index: usize, value: $v) {
                match index {
                    0 => self.re = value,
                    1 => self.im = value,
                    _ => panic!("channel index out of range"),
                }
            }

            fn splat(value: $v) -> Self {
                Self { re: value, im: value }
            }
        }
    )*};
}

rgb_pixel!(Rgb8: u8, Rgb16: u16, Rgb32: u32);
rgba_pixel!(Rgba8: u8, Rgba16: u16, Rgba32: u32);
complex_pixel!(ComplexF: f32, Complex: f64);

impl Pixel for RgbF {
    type Value = f32;

    const CHANNELS: usize = 3;

    fn channel(&self, index: usize) -> f32 {
        match index {
            0 => self.red,
            1 => self.green,
            2 => self.blue,
            _ => panic!("channel index out of range"),
        }
    }

    fn set_channel(&mut self, index: usize, value: f32) {
        match index {
            0 => self.red = value,
            1 => self.green = value,
            2 => self.blue = value,
            _ => panic!("channel index out of range"),
        }
    }

    fn splat(value: f32) -> Self {
        Self {
            red: value,
            green: value,
            blue: value,
        }
    }

    fn is_nan(&self) -> bool {
        self.red.is_nan() || self.green.is_nan() || self.blue.is_nan()
    }
}

impl Pixel for RgbaF {
    type Value = f32;

    const CHANNELS: usize = 4;

    fn channel(&self, index: usize) -> f32 {
        match index {
            0 => self.red,
            1 => self.green,
            2 => self.blue,
            3 => self.alpha,
            _ => panic!("channel index out of range"),
        }
    }

    fn set_channel(&mut self, index: usize, value: f32) {
        match index {
            0 => self.red = value,
            1 => self.green = value,
            2 => self.blue = value,
            3 => self.alpha = value,
            _ => panic!("channel index out of range"),
        }
    }

    fn splat(value: f32) -> Self {
        Self {
            red: value,
            green: value,
            blue: value,
            alpha: value,
        }
    }

    fn is_nan(&self) -> bool {
        self.red.is_nan() || self.green.is_nan() || self.blue.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_struct_sizes_match_depths() {
        assert_eq!(size_of::<Rgb8>() * 8, 24);
        assert_eq!(size_of::<Rgba8>() * 8, 32);
        assert_eq!(size_of::<Rgb16>() as u32 * 8, ImageType::Rgb16.bpp().unwrap());
        assert_eq!(size_of::<Rgba16>() as u32 * 8, ImageType::Rgba16.bpp().unwrap());
        assert_eq!(size_of::<Rgb32>() as u32 * 8, ImageType::Rgb32.bpp().unwrap());
        assert_eq!(size_of::<Rgba32>() as u32 * 8, ImageType::Rgba32.bpp().unwrap());
        assert_eq!(size_of::<RgbF>() as u32 * 8, ImageType::RgbF.bpp().unwrap());
        assert_eq!(size_of::<RgbaF>() as u32 * 8, ImageType::RgbaF.bpp().unwrap());
        assert_eq!(size_of::<ComplexF>() as u32 * 8, ImageType::ComplexF.bpp().unwrap());
        assert_eq!(size_of::<Complex>() as u32 * 8, ImageType::Complex.bpp().unwrap());
    }

    #[test]
    fn test_grey_weights() {
        assert_eq!(grey(0, 0, 0), 0);
        assert_eq!(grey(255, 255, 255), 255);
        // pure green dominates the integer weights
        assert!(grey(0, 255, 0) > grey(255, 0, 0));
        assert!(grey(255, 0, 0) > grey(0, 0, 255));
    }

    #[test]
    fn test_nan_ignores_alpha() {
        let p = RgbaF {
            red: 0.5,
            green: 0.5,
            blue: 0.5,
            alpha: f32::NAN,
        };
        assert!(!p.is_nan());

        let p = RgbaF {
            red: f32::NAN,
            green: 0.5,
            blue: 0.5,
            alpha: 1.0,
        };
        assert!(p.is_nan());
    }

    #[test]
    fn test_bgra_field_order() {
        let p = Rgba8 {
            blue: 1,
            green: 2,
            red: 3,
            alpha: 4,
        };
        assert_eq!(bytemuck::bytes_of(&p), &[1, 2, 3, 4]);
        assert_eq!(p.channel(0), 3);
        assert_eq!(p.channel(3), 4);
    }
}
