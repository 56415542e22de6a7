//! Tone mapping operators
//!
//! Both operators fold HDR bitmaps down to classic 8-bit-per-channel
//! output. [`tmo_clamp`] rescales and clamps channels independently;
//! [`tmo_linear`] stretches the brightness range linearly in YUV space
//! so hue is preserved while contrast expands.
//!
//! # See also
//!
//! C FreeImage: `FreeImage_TmoClamp()` in `tmoClamp.cpp`,
//! `FreeImage_TmoLinear()` in `tmoLinear.cpp`

use freeimage_core::bitmap::scanline;
use freeimage_core::{
    Bitmap, ColorType, Error, ImageType, Rgb8, Rgb16, Rgb32, RgbF, Rgba8, Rgba16, Rgba32, RgbaF,
};

use crate::error::{ColorError, ColorResult};
use crate::yuv::{YuvStandard, rgb_to_yuv_f32, yuv_to_rgb_f32};

#[inline]
fn clamp256(value: f32) -> u8 {
    (value * 256.0).clamp(0.0, 255.0) as u8
}

#[inline]
fn clamp_scaled(value: f64, scale: f64) -> u8 {
    (value * scale).clamp(0.0, 255.0) as u8
}

fn default_max(max_value: f64, type_max: f64) -> f64 {
    if max_value <= 0.0 { type_max } else { max_value }
}

/// Clamp an HDR bitmap into a classic bitmap channel by channel.
///
/// Float channels map as `clamp(v * 256)`, so `[0, 1)` covers the byte
/// range; `max_value` is ignored for them. Integer channels scale by
/// `256 / max_value`, with `max_value <= 0` defaulting to the full range
/// of the channel type. A classic bitmap input is deep cloned.
///
/// # Errors
///
/// Fails for bitmaps without pixels and for signed integer, complex and
/// unknown types.
///
/// # See also
///
/// C FreeImage: `FreeImage_TmoClamp()`
pub fn tmo_clamp(src: &Bitmap, max_value: f64) -> ColorResult<Bitmap> {
    if !src.has_pixels() {
        return Err(ColorError::Core(Error::EmptyBitmap));
    }
    if src.image_type() == ImageType::Bitmap {
        return Ok(src.clone());
    }

    let width = src.width();
    let height = src.height();
    match src.image_type() {
        ImageType::RgbaF => {
            let mut dst = Bitmap::new(width, height, 32)?;
            scanline::transform::<Rgba8, RgbaF, _>(&mut dst, src, |p| Rgba8 {
                blue: clamp256(p.blue),
                green: clamp256(p.green),
                red: clamp256(p.red),
                alpha: clamp256(p.alpha),
            });
            Ok(dst)
        }
        ImageType::RgbF => {
            let mut dst = Bitmap::new(width, height, 24)?;
            scanline::transform::<Rgb8, RgbF, _>(&mut dst, src, |p| Rgb8 {
                blue: clamp256(p.blue),
                green: clamp256(p.green),
                red: clamp256(p.red),
            });
            Ok(dst)
        }
        ImageType::Rgba32 => {
            let scale = 256.0 / default_max(max_value, u32::MAX as f64);
            let mut dst = Bitmap::new(width, height, 32)?;
            scanline::transform::<Rgba8, Rgba32, _>(&mut dst, src, |p| Rgba8 {
                blue: clamp_scaled(p.blue as f64, scale),
                green: clamp_scaled(p.green as f64, scale),
                red: clamp_scaled(p.red as f64, scale),
                alpha: clamp_scaled(p.alpha as f64, scale),
            });
            Ok(dst)
        }
        ImageType::Rgb32 => {
            let scale = 256.0 / default_max(max_value, u32::MAX as f64);
            let mut dst = Bitmap::new(width, height, 24)?;
            scanline::transform::<Rgb8, Rgb32, _>(&mut dst, src, |p| Rgb8 {
                blue: clamp_scaled(p.blue as f64, scale),
                green: clamp_scaled(p.green as f64, scale),
                red: clamp_scaled(p.red as f64, scale),
            });
            Ok(dst)
        }
        ImageType::Rgba16 => {
            let scale = 256.0 / default_max(max_value, u16::MAX as f64);
            let mut dst = Bitmap::new(width, height, 32)?;
            scanline::transform::<Rgba8, Rgba16, _>(&mut dst, src, |p| Rgba8 {
                blue: clamp_scaled(p.blue as f64, scale),
                green: clamp_scaled(p.green as f64, scale),
                red: clamp_scaled(p.red as f64, scale),
                alpha: clamp_scaled(p.alpha as f64, scale),
            });
            Ok(dst)
        }
        ImageType::Rgb16 => {
            let scale = 256.0 / default_max(max_value, u16::MAX as f64);
            let mut dst = Bitmap::new(width, height, 24)?;
            scanline::transform::<Rgb8, Rgb16, _>(&mut dst, src, |p| Rgb8 {
                blue: clamp_scaled(p.blue as f64, scale),
                green: clamp_scaled(p.green as f64, scale),
                red: clamp_scaled(p.red as f64, scale),
            });
            Ok(dst)
        }
        ImageType::Double => {
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, f64, _>(&mut dst, src, |v| clamp256(v as f32));
            Ok(dst)
        }
        ImageType::Float => {
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, f32, _>(&mut dst, src, clamp256);
            Ok(dst)
        }
        ImageType::UInt32 => {
            let scale = 256.0 / default_max(max_value, u32::MAX as f64);
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, u32, _>(&mut dst, src, |v| clamp_scaled(v as f64, scale));
            Ok(dst)
        }
        ImageType::UInt16 => {
            let scale = 256.0 / default_max(max_value, u16::MAX as f64);
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, u16, _>(&mut dst, src, |v| clamp_scaled(v as f64, scale));
            Ok(dst)
        }
        other => Err(ColorError::Core(Error::UnsupportedImageType(other))),
    }
}

fn tone_rgb(r: f32, g: f32, b: f32, black: f32, div: f32) -> (u8, u8, u8) {
    let (y, u, v) = rgb_to_yuv_f32(r, g, b);
    let y = (y - black) * div;
    let (r, g, b) = yuv_to_rgb_f32(y, u, v);
    (clamp256(r), clamp256(g), clamp256(b))
}

/// Stretch the brightness range of an HDR bitmap linearly, preserving hue.
///
/// Color pixels normalize by the maximum brightness, stretch their Y in
/// `standard` YUV space from `[min/max, 1]` to `[0, 1]`, convert back
/// and clamp. Greyscale samples stretch `[min, max]` directly. The alpha
/// channel rescales by `256 / max_value`, with `max_value <= 0`
/// defaulting to the full channel range. A classic bitmap input is deep
/// cloned.
///
/// When no brightness extrema exist (every pixel NaN) or the bitmap is
/// flat (`min >= max`), the operator degrades to [`tmo_clamp`].
///
/// # Errors
///
/// Fails for bitmaps without pixels, for signed integer, complex and
/// unknown types, and for bitmaps whose layout does not match their type
/// (a YUV-tagged bitmap, say).
///
/// # See also
///
/// C FreeImage: `FreeImage_TmoLinear()`
pub fn tmo_linear(src: &Bitmap, max_value: f64, standard: YuvStandard) -> ColorResult<Bitmap> {
    if !src.has_pixels() {
        return Err(ColorError::Core(Error::EmptyBitmap));
    }
    if src.image_type() == ImageType::Bitmap {
        return Ok(src.clone());
    }
    let YuvStandard::Jpeg = standard;

    let ct = src.color_type();
    match src.image_type() {
        ImageType::RgbaF | ImageType::Rgba32 | ImageType::Rgba16 => {
            if ct != ColorType::RgbAlpha {
                return Err(ColorError::Core(Error::UnsupportedColorType(ct)));
            }
        }
        ImageType::RgbF | ImageType::Rgb32 | ImageType::Rgb16 => {
            if ct != ColorType::Rgb {
                return Err(ColorError::Core(Error::UnsupportedColorType(ct)));
            }
        }
        ImageType::Double | ImageType::Float | ImageType::UInt32 | ImageType::UInt16 => {
            if ct != ColorType::MinIsBlack {
                return Err(ColorError::Core(Error::UnsupportedColorType(ct)));
            }
        }
        other => return Err(ColorError::Core(Error::UnsupportedImageType(other))),
    }

    let mm = match src.find_min_max() {
        Ok(mm) => mm,
        Err(_) => return tmo_clamp(src, max_value),
    };
    if mm.min >= mm.max {
        return tmo_clamp(src, max_value);
    }

    let black = (mm.min / mm.max) as f32;
    let div = 1.0 / (1.0 - black);
    let max_b = mm.max;
    let width = src.width();
    let height = src.height();

    match src.image_type() {
        ImageType::RgbaF => {
            let alpha_scale = 256.0 / default_max(max_value, 1.0);
            let mut dst = Bitmap::new(width, height, 32)?;
            scanline::transform::<Rgba8, RgbaF, _>(&mut dst, src, |p| {
                let (r, g, b) = tone_rgb(
                    (p.red as f64 / max_b) as f32,
                    (p.green as f64 / max_b) as f32,
                    (p.blue as f64 / max_b) as f32,
                    black,
                    div,
                );
                Rgba8 { blue: b, green: g, red: r, alpha: clamp_scaled(p.alpha as f64, alpha_scale) }
            });
            Ok(dst)
        }
        ImageType::RgbF => {
            let mut dst = Bitmap::new(width, height, 24)?;
            scanline::transform::<Rgb8, RgbF, _>(&mut dst, src, |p| {
                let (r, g, b) = tone_rgb(
                    (p.red as f64 / max_b) as f32,
                    (p.green as f64 / max_b) as f32,
                    (p.blue as f64 / max_b) as f32,
                    black,
                    div,
                );
                Rgb8 { blue: b, green: g, red: r }
            });
            Ok(dst)
        }
        ImageType::Rgba32 => {
            let alpha_scale = 256.0 / default_max(max_value, u32::MAX as f64);
            let mut dst = Bitmap::new(width, height, 32)?;
            scanline::transform::<Rgba8, Rgba32, _>(&mut dst, src, |p| {
                let (r, g, b) = tone_rgb(
                    (p.red as f64 / max_b) as f32,
                    (p.green as f64 / max_b) as f32,
                    (p.blue as f64 / max_b) as f32,
                    black,
                    div,
                );
                Rgba8 { blue: b, green: g, red: r, alpha: clamp_scaled(p.alpha as f64, alpha_scale) }
            });
            Ok(dst)
        }
        ImageType::Rgb32 => {
            let mut dst = Bitmap::new(width, height, 24)?;
            scanline::transform::<Rgb8, Rgb32, _>(&mut dst, src, |p| {
                let (r, g, b) = tone_rgb(
                    (p.red as f64 / max_b) as f32,
                    (p.green as f64 / max_b) as f32,
                    (p.blue as f64 / max_b) as f32,
                    black,
                    div,
                );
                Rgb8 { blue: b, green: g, red: r }
            });
            Ok(dst)
        }
        ImageType::Rgba16 => {
            let alpha_scale = 256.0 / default_max(max_value, u16::MAX as f64);
            let mut dst = Bitmap::new(width, height, 32)?;
            scanline::transform::<Rgba8, Rgba16, _>(&mut dst, src, |p| {
                let (r, g, b) = tone_rgb(
                    (p.red as f64 / max_b) as f32,
                    (p.green as f64 / max_b) as f32,
                    (p.blue as f64 / max_b) as f32,
                    black,
                    div,
                );
                Rgba8 { blue: b, green: g, red: r, alpha: clamp_scaled(p.alpha as f64, alpha_scale) }
            });
            Ok(dst)
        }
        ImageType::Rgb16 => {
            let mut dst = Bitmap::new(width, height, 24)?;
            scanline::transform::<Rgb8, Rgb16, _>(&mut dst, src, |p| {
                let (r, g, b) = tone_rgb(
                    (p.red as f64 / max_b) as f32,
                    (p.green as f64 / max_b) as f32,
                    (p.blue as f64 / max_b) as f32,
                    black,
                    div,
                );
                Rgb8 { blue: b, green: g, red: r }
            });
            Ok(dst)
        }
        ImageType::Double => {
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, f64, _>(&mut dst, src, |v| {
                clamp256(((v - mm.min) / (mm.max - mm.min)) as f32)
            });
            Ok(dst)
        }
        ImageType::Float => {
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, f32, _>(&mut dst, src, |v| {
                clamp256(((v as f64 - mm.min) / (mm.max - mm.min)) as f32)
            });
            Ok(dst)
        }
        ImageType::UInt32 => {
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, u32, _>(&mut dst, src, |v| {
                clamp256(((v as f64 - mm.min) / (mm.max - mm.min)) as f32)
            });
            Ok(dst)
        }
        ImageType::UInt16 => {
            let mut dst = Bitmap::new(width, height, 8)?;
            scanline::transform::<u8, u16, _>(&mut dst, src, |v| {
                clamp256(((v as f64 - mm.min) / (mm.max - mm.min)) as f32)
            });
            Ok(dst)
        }
        // excluded by the guard above
        other => Err(ColorError::Core(Error::UnsupportedImageType(other))),
    }
}
