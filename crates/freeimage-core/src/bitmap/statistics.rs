//! Pixel statistics and buffer filling
//!
//! Brightness extrema drive the tone mapping operators: RGB pixels
//! reduce through the JPEG luma, YUV-tagged bitmaps read their stored Y
//! channel directly, scalar types use the sample value itself.
//!
//! # See also
//!
//! C FreeImage: `FindMinMax()`, `FindMinMaxValue()`, `FreeImage_Fill()`
//! in `SimpleTools.cpp` / `SimpleTools.h`

use crate::bitmap::{Bitmap, scanline};
use crate::error::{Error, Result};
use crate::pixel::{
    ColorType, ImageType, Pixel, PixelValue, Rgb8, Rgb16, Rgb32, RgbF, Rgba8, Rgba16, Rgba32,
    RgbaF, luma_jpeg,
};

/// Brightness extrema of a bitmap with the positions they occur at.
///
/// Positions record the first occurrence in row-major scan order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
    pub min_pos: (u32, u32),
    pub max_pos: (u32, u32),
}

fn scan_extrema<P, F>(src: &Bitmap, brightness: F) -> Result<MinMax>
where
    P: Pixel,
    F: Fn(&P) -> f64,
{
    let mut result: Option<MinMax> = None;
    scanline::for_each_pixel::<P, _>(src, |p, x, y| {
        if p.is_nan() {
            return;
        }
        let v = brightness(&p);
        match &mut result {
            None => {
                result = Some(MinMax {
                    min: v,
                    max: v,
                    min_pos: (x, y),
                    max_pos: (x, y),
                })
            }
            Some(mm) => {
                if v < mm.min {
                    mm.min = v;
                    mm.min_pos = (x, y);
                }
                if v > mm.max {
                    mm.max = v;
                    mm.max_pos = (x, y);
                }
            }
        }
    });
    result.ok_or(Error::NoExtremum)
}

fn rgb_luma<P: Pixel>(p: &P) -> f64 {
    luma_jpeg(
        p.channel(0).to_f64(),
        p.channel(1).to_f64(),
        p.channel(2).to_f64(),
    )
}

// For a YUV-tagged bitmap the red slot holds the stored Y channel.
fn stored_y<P: Pixel>(p: &P) -> f64 {
    p.channel(0).to_f64()
}

impl Bitmap {
    /// Find the brightness extrema of the bitmap.
    ///
    /// RGB(A) pixels reduce through the JPEG luma; a YUV-tagged bitmap
    /// reads its stored Y channel; scalar types compare the raw sample.
    /// NaN pixels are skipped. Ties keep the first position found in
    /// row-major order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyBitmap`] without pixels, [`Error::NoExtremum`] when
    /// every pixel is NaN, [`Error::UnsupportedDepth`] /
    /// [`Error::UnsupportedColorType`] / [`Error::UnsupportedImageType`]
    /// for formats with no defined brightness (packed classic depths,
    /// paletted color, complex samples).
    ///
    /// # See also
    ///
    /// C FreeImage: `FindMinMax()` in `SimpleTools.cpp`
    pub fn find_min_max(&self) -> Result<MinMax> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }

        let yuv = self.color_type() == ColorType::Yuv;
        match self.image_type() {
            ImageType::Bitmap => match self.bpp() {
                32 if yuv => scan_extrema::<Rgba8, _>(self, stored_y),
                32 => scan_extrema::<Rgba8, _>(self, rgb_luma),
                24 if yuv => scan_extrema::<Rgb8, _>(self, stored_y),
                24 => scan_extrema::<Rgb8, _>(self, rgb_luma),
                8 if self.color_type() == ColorType::MinIsBlack => {
                    scan_extrema::<u8, _>(self, |v| v.to_f64())
                }
                8 => Err(Error::UnsupportedColorType(self.color_type())),
                other => Err(Error::UnsupportedDepth(other)),
            },
            ImageType::UInt16 => scan_extrema::<u16, _>(self, |v| v.to_f64()),
            ImageType::Int16 => scan_extrema::<i16, _>(self, |v| v.to_f64()),
            ImageType::UInt32 => scan_extrema::<u32, _>(self, |v| v.to_f64()),
            ImageType::Int32 => scan_extrema::<i32, _>(self, |v| v.to_f64()),
            ImageType::Float => scan_extrema::<f32, _>(self, |v| v.to_f64()),
            ImageType::Double => scan_extrema::<f64, _>(self, |v| *v),
            ImageType::Rgb16 => scan_extrema::<Rgb16, _>(self, rgb_luma),
            ImageType::Rgba16 => scan_extrema::<Rgba16, _>(self, rgb_luma),
            ImageType::Rgb32 => scan_extrema::<Rgb32, _>(self, rgb_luma),
            ImageType::Rgba32 => scan_extrema::<Rgba32, _>(self, rgb_luma),
            ImageType::RgbF if yuv => scan_extrema::<RgbF, _>(self, stored_y),
            ImageType::RgbF => scan_extrema::<RgbF, _>(self, rgb_luma),
            ImageType::RgbaF if yuv => scan_extrema::<RgbaF, _>(self, stored_y),
            ImageType::RgbaF => scan_extrema::<RgbaF, _>(self, rgb_luma),
            other => Err(Error::UnsupportedImageType(other)),
        }
    }

    /// Find per-channel extrema, alpha included.
    ///
    /// Returns `(min, max)` pixels holding the smallest and largest value
    /// seen in each channel independently. NaN channel values are
    /// skipped; if a channel is NaN everywhere its slots keep the type
    /// extremes they were initialized with.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyBitmap`] without pixels,
    /// [`Error::PixelSizeMismatch`] when `P` does not match the bitmap
    /// depth, [`Error::UnsupportedColorType`] for classic bitmaps whose
    /// layout is not plain greyscale or RGB(A).
    ///
    /// # See also
    ///
    /// C FreeImage: `FindMinMaxValue()` in `SimpleTools.cpp`
    pub fn find_min_max_value<P: Pixel>(&self) -> Result<(P, P)> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }
        let pixel_bits = size_of::<P>() * 8;
        if pixel_bits as u32 != self.bpp() {
            return Err(Error::PixelSizeMismatch {
                pixel_bits,
                bpp: self.bpp(),
            });
        }
        if self.image_type() == ImageType::Bitmap {
            let supported = matches!(
                (self.bpp(), self.color_type()),
                (32, ColorType::RgbAlpha | ColorType::Yuv)
                    | (24, ColorType::Rgb | ColorType::Yuv)
                    | (8, ColorType::MinIsBlack)
            );
            if !supported {
                return Err(Error::UnsupportedColorType(self.color_type()));
            }
        }

        let mut min = P::splat(P::Value::MAX_VALUE);
        let mut max = P::splat(P::Value::MIN_VALUE);
        scanline::for_each_pixel::<P, _>(self, |p, _, _| {
            for c in 0..P::CHANNELS {
                let v = p.channel(c);
                if v.is_nan_value() {
                    continue;
                }
                if v < min.channel(c) {
                    min.set_channel(c, v);
                }
                if v > max.channel(c) {
                    max.set_channel(c, v);
                }
            }
        });
        Ok((min, max))
    }

    /// Fill every pixel with the raw little-endian `value` bytes.
    ///
    /// Scanline padding is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFillValue`] when `value` is not exactly
    /// one pixel wide; packed sub-byte depths cannot be filled this way.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_Fill()` in `SimpleTools.h`
    pub fn fill(&mut self, value: &[u8]) -> Result<()> {
        let expected = self.bpp() as usize / 8;
        if self.bpp() % 8 != 0 || value.len() != expected {
            return Err(Error::InvalidFillValue {
                expected,
                actual: value.len(),
            });
        }

        let width = self.width() as usize;
        for y in 0..self.height() {
            let row = self.scanline_mut(y);
            for x in 0..width {
                row[x * expected..(x + 1) * expected].copy_from_slice(value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::bytes_of;

    #[test]
    fn test_min_max_8bpp_positions() {
        let mut b = Bitmap::new(3, 2, 8).unwrap();
        b.palette_mut().unwrap().set_grey_ramp();
        b.scanline_mut(0).copy_from_slice(&[50, 10, 50, 0]);
        b.scanline_mut(1).copy_from_slice(&[90, 10, 90, 0]);

        let mm = b.find_min_max().unwrap();
        assert_eq!(mm.min, 10.0);
        assert_eq!(mm.max, 90.0);
        assert_eq!(mm.min_pos, (1, 0));
        // ties keep the first occurrence
        assert_eq!(mm.max_pos, (0, 1));
    }

    #[test]
    fn test_min_max_32bpp_uses_jpeg_luma() {
        let mut b = Bitmap::new(2, 1, 32).unwrap();
        // pure blue, then pure green (BGRA bytes)
        b.scanline_mut(0).copy_from_slice(&[255, 0, 0, 255, 0, 255, 0, 255]);
        let mm = b.find_min_max().unwrap();
        assert_eq!(mm.min, 0.114 * 255.0);
        assert_eq!(mm.max, 0.587 * 255.0);
    }

    #[test]
    fn test_min_max_yuv_reads_stored_y() {
        use crate::bitmap::ColorEncoding;
        let mut b = Bitmap::new(1, 1, 24).unwrap();
        b.set_encoding(ColorEncoding::Yuv);
        // Y lives in the red slot (byte 2 of a BGR triple)
        b.scanline_mut(0)[..3].copy_from_slice(&[0, 0, 77]);
        let mm = b.find_min_max().unwrap();
        assert_eq!(mm.min, 77.0);
    }

    #[test]
    fn test_min_max_skips_nan() {
        let mut b = Bitmap::with_type(ImageType::Float, 3, 1).unwrap();
        let row = b.scanline_mut(0);
        row[0..4].copy_from_slice(bytes_of(&f32::NAN));
        row[4..8].copy_from_slice(bytes_of(&2.0f32));
        row[8..12].copy_from_slice(bytes_of(&-1.0f32));

        let mm = b.find_min_max().unwrap();
        assert_eq!(mm.min, -1.0);
        assert_eq!(mm.max, 2.0);
        assert_eq!(mm.min_pos, (2, 0));
    }

    #[test]
    fn test_min_max_all_nan_has_no_extremum() {
        let mut b = Bitmap::with_type(ImageType::Float, 2, 1).unwrap();
        b.fill(bytes_of(&f32::NAN)).unwrap();
        assert!(matches!(b.find_min_max(), Err(Error::NoExtremum)));
    }

    #[test]
    fn test_min_max_rejects_palette_and_packed() {
        let mut b = Bitmap::new(2, 2, 8).unwrap();
        b.palette_mut().unwrap().as_mut_slice()[0].red = 200;
        assert!(matches!(
            b.find_min_max(),
            Err(Error::UnsupportedColorType(ColorType::Palette))
        ));
        let b = Bitmap::new(2, 2, 4).unwrap();
        assert!(matches!(b.find_min_max(), Err(Error::UnsupportedDepth(4))));
    }

    #[test]
    fn test_min_max_value_per_channel() {
        let mut b = Bitmap::with_type(ImageType::RgbF, 2, 1).unwrap();
        let p0 = RgbF { red: 1.0, green: -2.0, blue: 0.0 };
        let p1 = RgbF { red: 0.5, green: 3.0, blue: -1.0 };
        b.scanline_mut(0)[..12].copy_from_slice(bytes_of(&p0));
        b.scanline_mut(0)[12..24].copy_from_slice(bytes_of(&p1));

        let (min, max) = b.find_min_max_value::<RgbF>().unwrap();
        assert_eq!(min, RgbF { red: 0.5, green: -2.0, blue: -1.0 });
        assert_eq!(max, RgbF { red: 1.0, green: 3.0, blue: 0.0 });
    }

    #[test]
    fn test_min_max_value_checks_pixel_size() {
        let b = Bitmap::with_type(ImageType::RgbF, 2, 1).unwrap();
        assert!(matches!(
            b.find_min_max_value::<RgbaF>(),
            Err(Error::PixelSizeMismatch { pixel_bits: 128, bpp: 96 })
        ));
    }

    #[test]
    fn test_fill_respects_padding() {
        let mut b = Bitmap::new(1, 2, 24).unwrap();
        b.fill(&[1, 2, 3]).unwrap();
        assert_eq!(b.scanline(0), &[1, 2, 3, 0]);
        assert_eq!(b.scanline(1), &[1, 2, 3, 0]);

        assert!(matches!(
            b.fill(&[1, 2]),
            Err(Error::InvalidFillValue { expected: 3, actual: 2 })
        ));
        let mut packed = Bitmap::new(8, 1, 1).unwrap();
        assert!(packed.fill(&[0xFF]).is_err());
    }
}
