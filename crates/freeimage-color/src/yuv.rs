//! RGB <-> YUV color space conversion
//!
//! Classic 8-bit bitmaps convert through 12-bit fixed-point arithmetic,
//! float bitmaps through plain float math. Y, U and V land in the red,
//! green and blue slots of the pixel; alpha passes through untouched.
//! Converted bitmaps carry a [`ColorEncoding::Yuv`] tag so that later
//! operations can tell the layouts apart.
//!
//! # See also
//!
//! C FreeImage: `RgbToYuv()` / `YuvToRgb()` templates in
//! `ConversionYUV.h`, `FreeImage_ConvertRgbToYuv()` in `ConversionYUV.cpp`

use freeimage_core::bitmap::scanline;
use freeimage_core::{
    Bitmap, ColorEncoding, ColorType, Error, ImageType, Rgb8, RgbF, Rgba8, RgbaF,
};

use crate::error::{ColorError, ColorResult};

/// YUV conversion standard.
///
/// Only the JPEG (ITU-T T.871) full-range standard is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YuvStandard {
    #[default]
    Jpeg,
}

// 12 fractional bits, the precision of the integer conversion path.
const FX_BITS: i32 = 12;

#[inline]
fn fx(value: f64) -> i32 {
    (value * (1 << FX_BITS) as f64) as i32
}

#[inline]
fn fx_div(value: i32) -> i32 {
    (value + (1 << (FX_BITS - 1))) >> FX_BITS
}

/// Integer JPEG conversion for 8-bit channels, chroma biased by 128.
///
/// Results truncate to the byte range the way a C cast would; callers
/// feeding plain RGB stay in range by construction.
#[inline]
pub fn rgb_to_yuv8(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = fx_div(fx(0.299) * r + fx(0.587) * g + fx(0.114) * b);
    let u = fx_div(fx(0.5) * b - fx(0.331264) * g - fx(0.168736) * r) + 128;
    let v = fx_div(fx(0.5) * r - fx(0.418688) * g - fx(0.081312) * b) + 128;
    (y as u8, u as u8, v as u8)
}

/// Integer JPEG inverse for 8-bit channels.
#[inline]
pub fn yuv_to_rgb8(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = (y as i32) << FX_BITS;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let r = fx_div(y + fx(1.402) * v);
    let g = fx_div(y - fx(0.344136) * u - fx(0.714136) * v);
    let b = fx_div(y + fx(1.772) * u);
    (r as u8, g as u8, b as u8)
}

/// Integer JPEG conversion for 16-bit channels, chroma biased by 32768.
#[inline]
pub fn rgb_to_yuv16(r: u16, g: u16, b: u16) -> (u16, u16, u16) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = fx_div(fx(0.299) * r + fx(0.587) * g + fx(0.114) * b);
    let u = fx_div(fx(0.5) * b - fx(0.331264) * g - fx(0.168736) * r) + 32768;
    let v = fx_div(fx(0.5) * r - fx(0.418688) * g - fx(0.081312) * b) + 32768;
    (y as u16, u as u16, v as u16)
}

/// Integer JPEG inverse for 16-bit channels.
#[inline]
pub fn yuv_to_rgb16(y: u16, u: u16, v: u16) -> (u16, u16, u16) {
    let y = (y as i64) << FX_BITS;
    let u = u as i64 - 32768;
    let v = v as i64 - 32768;
    let div = |val: i64| ((val + (1 << (FX_BITS - 1))) >> FX_BITS) as i32;
    let r = div(y + fx(1.402) as i64 * v);
    let g = div(y - fx(0.344136) as i64 * u - fx(0.714136) as i64 * v);
    let b = div(y + fx(1.772) as i64 * u);
    (r as u16, g as u16, b as u16)
}

/// Float JPEG conversion, chroma biased by 0.5. No clamping is applied.
#[inline]
pub fn rgb_to_yuv_f32(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = 0.5 * b - 0.331264 * g - 0.168736 * r + 0.5;
    let v = 0.5 * r - 0.418688 * g - 0.081312 * b + 0.5;
    (y, u, v)
}

/// Float JPEG inverse. No clamping is applied.
#[inline]
pub fn yuv_to_rgb_f32(y: f32, u: f32, v: f32) -> (f32, f32, f32) {
    let u = u - 0.5;
    let v = v - 0.5;
    let r = y + 1.402 * v;
    let g = y - 0.344136 * u - 0.714136 * v;
    let b = y + 1.772 * u;
    (r, g, b)
}

fn convert_impl<F8, FF>(src: &Bitmap, op8: F8, op_f: FF) -> ColorResult<Bitmap>
where
    F8: Fn(u8, u8, u8) -> (u8, u8, u8) + Copy,
    FF: Fn(f32, f32, f32) -> (f32, f32, f32) + Copy,
{
    match src.image_type() {
        ImageType::Bitmap => match src.bpp() {
            32 => {
                let mut dst = Bitmap::new(src.width(), src.height(), 32)?;
                scanline::transform::<Rgba8, Rgba8, _>(&mut dst, src, |p| {
                    let (y, u, v) = op8(p.red, p.green, p.blue);
                    Rgba8 { blue: v, green: u, red: y, alpha: p.alpha }
                });
                Ok(dst)
            }
            24 => {
                let mut dst = Bitmap::new(src.width(), src.height(), 24)?;
                scanline::transform::<Rgb8, Rgb8, _>(&mut dst, src, |p| {
                    let (y, u, v) = op8(p.red, p.green, p.blue);
                    Rgb8 { blue: v, green: u, red: y }
                });
                Ok(dst)
            }
            other => Err(ColorError::Core(Error::UnsupportedDepth(other))),
        },
        ImageType::RgbF => {
            let mut dst = Bitmap::with_type(ImageType::RgbF, src.width(), src.height())?;
            scanline::transform::<RgbF, RgbF, _>(&mut dst, src, |p| {
                let (y, u, v) = op_f(p.red, p.green, p.blue);
                RgbF { red: y, green: u, blue: v }
            });
            Ok(dst)
        }
        ImageType::RgbaF => {
            let mut dst = Bitmap::with_type(ImageType::RgbaF, src.width(), src.height())?;
            scanline::transform::<RgbaF, RgbaF, _>(&mut dst, src, |p| {
                let (y, u, v) = op_f(p.red, p.green, p.blue);
                RgbaF { red: y, green: u, blue: v, alpha: p.alpha }
            });
            Ok(dst)
        }
        other => Err(ColorError::Core(Error::UnsupportedImageType(other))),
    }
}

/// Convert an RGB(A) bitmap to YUV, tagging the result.
///
/// # Errors
///
/// Fails for bitmaps without pixels, for a source already carrying the
/// YUV tag and for types with no conversion (classic depths below
/// 24 bpp, integer extended types, complex types).
///
/// # See also
///
/// C FreeImage: `FreeImage_ConvertRgbToYuv()`
pub fn convert_rgb_to_yuv(src: &Bitmap, standard: YuvStandard) -> ColorResult<Bitmap> {
    if !src.has_pixels() {
        return Err(ColorError::Core(Error::EmptyBitmap));
    }
    if src.color_type() == ColorType::Yuv {
        return Err(ColorError::Core(Error::UnsupportedColorType(ColorType::Yuv)));
    }
    let YuvStandard::Jpeg = standard;
    let mut dst = convert_impl(src, rgb_to_yuv8, rgb_to_yuv_f32)?;
    dst.set_encoding(ColorEncoding::Yuv);
    Ok(dst)
}

/// Convert a YUV bitmap back to RGB(A). The result carries the default
/// RGB encoding.
///
/// # Errors
///
/// Fails for bitmaps without pixels and for a source not carrying the
/// YUV tag.
///
/// # See also
///
/// C FreeImage: `FreeImage_ConvertYuvToRgb()`
pub fn convert_yuv_to_rgb(src: &Bitmap, standard: YuvStandard) -> ColorResult<Bitmap> {
    if !src.has_pixels() {
        return Err(ColorError::Core(Error::EmptyBitmap));
    }
    if src.color_type() != ColorType::Yuv {
        return Err(ColorError::Core(Error::UnsupportedColorType(src.color_type())));
    }
    let YuvStandard::Jpeg = standard;
    convert_impl(src, yuv_to_rgb8, yuv_to_rgb_f32)
}

/// Convert between the RGB and YUV layouts, choosing the direction from
/// the source classification and `target`.
///
/// # Errors
///
/// Returns [`ColorError::UnsupportedConversion`] for any pairing other
/// than RGB(A) to YUV or YUV to RGB(A).
///
/// # See also
///
/// C FreeImage: `FreeImage_ConvertToColor()` in `ConversionColor.cpp`
pub fn convert_to_color(
    src: &Bitmap,
    target: ColorType,
    standard: YuvStandard,
) -> ColorResult<Bitmap> {
    match (src.color_type(), target) {
        (ColorType::Rgb | ColorType::RgbAlpha, ColorType::Yuv) => convert_rgb_to_yuv(src, standard),
        (ColorType::Yuv, ColorType::Rgb | ColorType::RgbAlpha) => convert_yuv_to_rgb(src, standard),
        (from, to) => Err(ColorError::UnsupportedConversion { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_has_centered_chroma() {
        let (y, u, v) = rgb_to_yuv8(128, 128, 128);
        assert_eq!((y, u, v), (128, 128, 128));
        let (y, u, v) = rgb_to_yuv8(0, 0, 0);
        assert_eq!((y, u, v), (0, 128, 128));
    }

    #[test]
    fn test_pure_red_chroma_wraps() {
        // 0.5 * 255 rounds up to 256 and the cast wraps, exactly like the
        // C fixed-point path
        let (_, _, v) = rgb_to_yuv8(255, 0, 0);
        assert_eq!(v, 0);
        let (_, u, _) = rgb_to_yuv8(0, 0, 255);
        assert_eq!(u, 0);
    }

    #[test]
    fn test_pixel_roundtrip_within_two() {
        let colors = [
            (250u8, 10u8, 10u8),
            (0, 255, 0),
            (10, 10, 250),
            (255, 255, 0),
            (12, 200, 99),
            (128, 64, 32),
        ];
        for (r, g, b) in colors {
            let (y, u, v) = rgb_to_yuv8(r, g, b);
            let (rr, rg, rb) = yuv_to_rgb8(y, u, v);
            assert!(
                (rr as i32 - r as i32).abs() <= 2
                    && (rg as i32 - g as i32).abs() <= 2
                    && (rb as i32 - b as i32).abs() <= 2,
                "roundtrip failed for ({r},{g},{b}): got ({rr},{rg},{rb})"
            );
        }
    }

    #[test]
    fn test_u16_grey_chroma_near_bias() {
        // coefficient truncation error grows with the channel width, so
        // 16-bit chroma only lands near the bias, not exactly on it
        let (y, u, v) = rgb_to_yuv16(32768, 32768, 32768);
        assert!((y as i32 - 32768).abs() <= 32);
        assert!((u as i32 - 32768).abs() <= 32);
        assert!((v as i32 - 32768).abs() <= 32);
    }

    #[test]
    fn test_u16_roundtrip_within_fixed_point_error() {
        let (y, u, v) = rgb_to_yuv16(60000, 2500, 2500);
        let (r, g, b) = yuv_to_rgb16(y, u, v);
        assert!((r as i32 - 60000).abs() <= 64);
        assert!((g as i32 - 2500).abs() <= 64);
        assert!((b as i32 - 2500).abs() <= 64);
    }

    #[test]
    fn test_conversion_checks_the_tag() {
        let mut src = Bitmap::new(2, 2, 24).unwrap();
        assert!(matches!(
            convert_yuv_to_rgb(&src, YuvStandard::Jpeg),
            Err(ColorError::Core(Error::UnsupportedColorType(ColorType::Rgb)))
        ));
        src.set_encoding(ColorEncoding::Yuv);
        assert!(matches!(
            convert_rgb_to_yuv(&src, YuvStandard::Jpeg),
            Err(ColorError::Core(Error::UnsupportedColorType(ColorType::Yuv)))
        ));
    }

    #[test]
    fn test_float_roundtrip() {
        let (y, u, v) = rgb_to_yuv_f32(0.25, 0.5, 0.75);
        let (r, g, b) = yuv_to_rgb_f32(y, u, v);
        assert!((r - 0.25).abs() < 1e-5);
        assert!((g - 0.5).abs() < 1e-5);
        assert!((b - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_convert_tags_result() {
        let mut src = Bitmap::new(2, 2, 24).unwrap();
        src.fill(&[30, 60, 90]).unwrap();
        let yuv = convert_rgb_to_yuv(&src, YuvStandard::Jpeg).unwrap();
        assert_eq!(yuv.encoding(), ColorEncoding::Yuv);
        assert_eq!(yuv.color_type(), ColorType::Yuv);

        let rgb = convert_yuv_to_rgb(&yuv, YuvStandard::Jpeg).unwrap();
        assert_eq!(rgb.encoding(), ColorEncoding::Rgb);
        // Y lands in the red slot (byte 2 of a BGR triple)
        let (y, _, _) = rgb_to_yuv8(90, 60, 30);
        assert_eq!(yuv.scanline(0)[2], y);
    }

    #[test]
    fn test_alpha_passes_through() {
        let mut src = Bitmap::new(1, 1, 32).unwrap();
        src.fill(&[10, 20, 30, 77]).unwrap();
        let yuv = convert_rgb_to_yuv(&src, YuvStandard::Jpeg).unwrap();
        assert_eq!(yuv.scanline(0)[3], 77);
    }

    #[test]
    fn test_convert_to_color_rejects_odd_pairs() {
        let src = Bitmap::new(2, 2, 24).unwrap();
        assert!(matches!(
            convert_to_color(&src, ColorType::Rgb, YuvStandard::Jpeg),
            Err(ColorError::UnsupportedConversion { .. })
        ));
        let mut grey = Bitmap::new(2, 2, 8).unwrap();
        grey.palette_mut().unwrap().set_grey_ramp();
        assert!(matches!(
            convert_to_color(&grey, ColorType::Yuv, YuvStandard::Jpeg),
            Err(ColorError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_convert_rejects_8bpp() {
        let src = Bitmap::new(2, 2, 8).unwrap();
        assert!(convert_rgb_to_yuv(&src, YuvStandard::Jpeg).is_err());
    }
}
