//! Conversion to 32-bit float
//!
//! Folds any supported bitmap down to one `f32` sample per pixel. Color
//! sources reduce through the Rec.709 luma; integer sources optionally
//! rescale to `[0, 1]` by their type range.
//!
//! # See also
//!
//! C FreeImage: `FreeImage_ConvertToFloat()` in `ConversionFloat.cpp`

use crate::bitmap::{Bitmap, scanline};
use crate::error::{Error, Result};
use crate::pixel::{
    ColorType, ImageType, Rgb16, Rgb32, RgbF, Rgba16, Rgba32, RgbaF, luma_rec709,
};

impl Bitmap {
    /// Convert to a [`ImageType::Float`] bitmap.
    ///
    /// With `scale_linear` set, integer samples rescale to `[0, 1]` by
    /// the full range of their type and float color samples clamp their
    /// luma to `[0, 1]`; without it, values cast through unchanged.
    /// Classic bitmaps reduce to greyscale first, color types take the
    /// Rec.709 luma per pixel. A float input is deep cloned. Metadata is
    /// cloned on every successful conversion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] for a bitmap without pixels and
    /// [`Error::UnsupportedImageType`] for complex and unknown types.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_ConvertToFloat()`
    pub fn convert_to_float(&self, scale_linear: bool) -> Result<Bitmap> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }
        if self.image_type() == ImageType::Float {
            return Ok(self.clone());
        }

        let mut dst = Bitmap::with_type(ImageType::Float, self.width(), self.height())?;

        match self.image_type() {
            ImageType::Bitmap => {
                // work on an 8-bpp greyscale rendition of the input
                let grey;
                let src = if self.bpp() == 8 && self.color_type() == ColorType::MinIsBlack {
                    self
                } else {
                    grey = self.convert_to_greyscale()?;
                    &grey
                };
                dst.clone_metadata_from(src);
                if scale_linear {
                    scanline::transform::<f32, u8, _>(&mut dst, src, |v| v as f32 / 255.0);
                } else {
                    scanline::transform::<f32, u8, _>(&mut dst, src, |v| v as f32);
                }
                return Ok(dst);
            }
            _ => dst.clone_metadata_from(self),
        }

        match self.image_type() {
            ImageType::UInt16 if scale_linear => {
                scanline::transform::<f32, u16, _>(&mut dst, self, |v| v as f32 / 65535.0);
            }
            ImageType::UInt16 => {
                scanline::transform::<f32, u16, _>(&mut dst, self, |v| v as f32);
            }
            ImageType::Int16 if scale_linear => {
                scanline::transform::<f32, i16, _>(&mut dst, self, |v| v as f32 / 32767.0);
            }
            ImageType::Int16 => {
                scanline::transform::<f32, i16, _>(&mut dst, self, |v| v as f32);
            }
            ImageType::UInt32 if scale_linear => {
                scanline::transform::<f32, u32, _>(&mut dst, self, |v| {
                    (v as f64 / u32::MAX as f64) as f32
                });
            }
            ImageType::UInt32 => {
                scanline::transform::<f32, u32, _>(&mut dst, self, |v| v as f32);
            }
            ImageType::Int32 if scale_linear => {
                scanline::transform::<f32, i32, _>(&mut dst, self, |v| {
                    (v as f64 / i32::MAX as f64) as f32
                });
            }
            ImageType::Int32 => {
                scanline::transform::<f32, i32, _>(&mut dst, self, |v| v as f32);
            }
            ImageType::Double => {
                scanline::transform::<f32, f64, _>(&mut dst, self, |v| v as f32);
            }
            ImageType::Rgb16 if scale_linear => {
                scanline::transform::<f32, Rgb16, _>(&mut dst, self, |p| {
                    (luma_rec709(p.red as f64, p.green as f64, p.blue as f64) / 65535.0) as f32
                });
            }
            ImageType::Rgb16 => {
                scanline::transform::<f32, Rgb16, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64) as f32
                });
            }
            ImageType::Rgba16 if scale_linear => {
                scanline::transform::<f32, Rgba16, _>(&mut dst, self, |p| {
                    (luma_rec709(p.red as f64, p.green as f64, p.blue as f64) / 65535.0) as f32
                });
            }
            ImageType::Rgba16 => {
                scanline::transform::<f32, Rgba16, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64) as f32
                });
            }
            ImageType::Rgb32 if scale_linear => {
                scanline::transform::<f32, Rgb32, _>(&mut dst, self, |p| {
                    (luma_rec709(p.red as f64, p.green as f64, p.blue as f64) / u32::MAX as f64)
                        as f32
                });
            }
            ImageType::Rgb32 => {
                scanline::transform::<f32, Rgb32, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64) as f32
                });
            }
            ImageType::Rgba32 if scale_linear => {
                scanline::transform::<f32, Rgba32, _>(&mut dst, self, |p| {
                    (luma_rec709(p.red as f64, p.green as f64, p.blue as f64) / u32::MAX as f64)
                        as f32
                });
            }
            ImageType::Rgba32 => {
                scanline::transform::<f32, Rgba32, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64) as f32
                });
            }
            ImageType::RgbF if scale_linear => {
                scanline::transform::<f32, RgbF, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64).clamp(0.0, 1.0) as f32
                });
            }
            ImageType::RgbF => {
                scanline::transform::<f32, RgbF, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64) as f32
                });
            }
            ImageType::RgbaF if scale_linear => {
                scanline::transform::<f32, RgbaF, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64).clamp(0.0, 1.0) as f32
                });
            }
            ImageType::RgbaF => {
                scanline::transform::<f32, RgbaF, _>(&mut dst, self, |p| {
                    luma_rec709(p.red as f64, p.green as f64, p.blue as f64) as f32
                });
            }
            other => return Err(Error::UnsupportedImageType(other)),
        }

        Ok(dst)
    }
}
