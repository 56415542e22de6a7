//! Alpha compositing
//!
//! Composites a transparent foreground against a background into a flat
//! 24-bpp bitmap, premultiplies alpha in place, and pastes one 32-bpp
//! bitmap onto another with source-alpha blending. Scanline 0 is the
//! bottom row of a DIB, so the paste converts its top-left coordinates
//! accordingly.
//!
//! # See also
//!
//! C FreeImage: `FreeImage_Composite()`, `FreeImage_PreMultiplyWithAlpha()`
//! and the alpha blending paste in `Display.cpp`

use bytemuck::pod_read_unaligned;

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::pixel::{ColorType, ImageType, Rgb8, Rgba8};

/// Blending mode of [`Bitmap::draw_bitmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaOperation {
    /// Weight source and destination by the source alpha channel.
    SrcAlpha,
}

impl Bitmap {
    /// Composite the bitmap against a background into a 24-bpp bitmap.
    ///
    /// The foreground must be 8 bpp (alpha taken from the transparency
    /// table) or 32 bpp (alpha channel). The background is chosen per
    /// pixel with this priority:
    ///
    /// 1. the file background color, when `use_file_background` is set
    ///    and one is present
    /// 2. `app_background`
    /// 3. `background`, which must be a 24-bpp classic bitmap of the
    ///    same size
    /// 4. a 16x16 grey checkerboard
    ///
    /// Metadata is cloned from the foreground.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] without pixels,
    /// [`Error::UnsupportedDepth`] for depths other than 8 and 32, and
    /// [`Error::UnsupportedDepth`] / [`Error::DimensionMismatch`] for a
    /// supplied background that is not 24 bpp or differs in size.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_Composite()`
    pub fn composite(
        &self,
        use_file_background: bool,
        app_background: Option<Rgba8>,
        background: Option<&Bitmap>,
    ) -> Result<Bitmap> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }
        if self.bpp() != 8 && self.bpp() != 32 {
            return Err(Error::UnsupportedDepth(self.bpp()));
        }

        let width = self.width();
        let height = self.height();
        if let Some(bg) = background {
            if bg.bpp() != 24 || bg.image_type() != ImageType::Bitmap {
                return Err(Error::UnsupportedDepth(bg.bpp()));
            }
            if bg.width() != width || bg.height() != height {
                return Err(Error::DimensionMismatch {
                    expected: (width, height),
                    actual: (bg.width(), bg.height()),
                });
            }
        }

        // a whole-image background color, when one applies
        let fixed: Option<Rgb8> = if use_file_background && self.has_background_color() {
            self.background_color()
        } else {
            app_background
        }
        .map(|c| Rgb8 {
            blue: c.blue,
            green: c.green,
            red: c.red,
        });

        let palette: Vec<Rgba8> = self
            .palette()
            .map(|p| p.as_slice().to_vec())
            .unwrap_or_default();
        let table: Vec<u8> = self.transparency_table().map(<[u8]>::to_vec).unwrap_or_default();
        let transparent = self.is_transparent();

        let mut dst = Bitmap::new(width, height, 24)?;
        dst.clone_metadata_from(self);

        let w = width as usize;
        for y in 0..height {
            let src_row = self.scanline(y).to_vec();
            let bg_row: Option<Vec<Rgb8>> = background
                .map(|bg| bytemuck::cast_slice(&bg.scanline(y)[..w * 3]).to_vec());
            let dst_row: &mut [Rgb8] =
                bytemuck::cast_slice_mut(&mut dst.scanline_mut(y)[..w * 3]);

            for x in 0..w {
                let (fgc, alpha) = if self.bpp() == 8 {
                    let index = src_row[x] as usize;
                    let e = palette.get(index).copied().unwrap_or_default();
                    let a = if transparent {
                        table.get(index).copied().unwrap_or(255)
                    } else {
                        255
                    };
                    (Rgb8 { blue: e.blue, green: e.green, red: e.red }, a)
                } else {
                    let p: Rgba8 = pod_read_unaligned(&src_row[x * 4..x * 4 + 4]);
                    (Rgb8 { blue: p.blue, green: p.green, red: p.red }, p.alpha)
                };

                let bkc = if let Some(c) = fixed {
                    c
                } else if let Some(row) = &bg_row {
                    row[x]
                } else {
                    let v = if ((y & 8) == 0) != ((x as u32 & 8) == 0) { 192 } else { 255 };
                    Rgb8 { blue: v, green: v, red: v }
                };

                dst_row[x] = match alpha {
                    0 => bkc,
                    255 => fgc,
                    a => {
                        let a = a as u32;
                        let na = 255 - a;
                        Rgb8 {
                            blue: ((a * fgc.blue as u32 + na * bkc.blue as u32) >> 8) as u8,
                            green: ((a * fgc.green as u32 + na * bkc.green as u32) >> 8) as u8,
                            red: ((a * fgc.red as u32 + na * bkc.red as u32) >> 8) as u8,
                        }
                    }
                };
            }
        }

        Ok(dst)
    }

    /// Premultiply the color channels by the alpha channel, in place.
    ///
    /// Channels round to nearest: `(alpha * channel + 127) / 255`. Fully
    /// opaque pixels are left untouched, fully transparent ones go black.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] without pixels and
    /// [`Error::UnsupportedDepth`] unless the bitmap is a 32-bpp classic
    /// bitmap.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_PreMultiplyWithAlpha()`
    pub fn premultiply_with_alpha(&mut self) -> Result<()> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }
        if self.image_type() != ImageType::Bitmap || self.bpp() != 32 {
            return Err(Error::UnsupportedDepth(self.bpp()));
        }

        let w = self.width() as usize;
        for y in 0..self.height() {
            let row = self.scanline_mut(y);
            for x in 0..w {
                let px = &mut row[x * 4..x * 4 + 4];
                match px[3] {
                    0 => {
                        px[0] = 0;
                        px[1] = 0;
                        px[2] = 0;
                    }
                    255 => {}
                    a => {
                        let a = a as u32;
                        for c in &mut px[..3] {
                            *c = ((a * *c as u32 + 127) / 255) as u8;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Paste `src` onto the bitmap with its top-left corner at
    /// `(left, top)`, blending by the source alpha channel.
    ///
    /// Both bitmaps must be 32-bpp RGBA. Coordinates may be negative or
    /// run off the edges; the overlap is clipped and an empty overlap is
    /// a no-op. Only the color channels of the destination are written,
    /// its alpha channel keeps its values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] when either bitmap has no pixels,
    /// [`Error::UnsupportedDepth`] unless both bitmaps are 32-bpp
    /// classic bitmaps and [`Error::UnsupportedColorType`] when either
    /// is not plain RGBA (a YUV-tagged bitmap, say).
    pub fn draw_bitmap(
        &mut self,
        src: &Bitmap,
        alpha_op: AlphaOperation,
        left: i32,
        top: i32,
    ) -> Result<()> {
        for b in [&*self, src] {
            if !b.has_pixels() {
                return Err(Error::EmptyBitmap);
            }
            if b.image_type() != ImageType::Bitmap || b.bpp() != 32 {
                return Err(Error::UnsupportedDepth(b.bpp()));
            }
            if b.color_type() != ColorType::RgbAlpha {
                return Err(Error::UnsupportedColorType(b.color_type()));
            }
        }
        let AlphaOperation::SrcAlpha = alpha_op;

        let src_w = src.width() as i64;
        let src_h = src.height() as i64;
        let dst_w = self.width() as i64;
        let dst_h = self.height() as i64;
        let left = left as i64;
        let top = top as i64;

        let roi_left = left.max(0);
        let roi_top = top.max(0);
        let roi_right = (left + src_w).min(dst_w);
        let roi_bottom = (top + src_h).min(dst_h);
        if roi_right <= roi_left || roi_bottom <= roi_top {
            return Ok(());
        }

        let offset_x = (roi_left - left) as u32;
        let offset_y = (roi_top - top) as u32;
        let rows = (roi_bottom - roi_top) as u32;
        let cols = (roi_right - roi_left) as usize;
        let roi_left = roi_left as usize;
        let roi_top = roi_top as u32;

        // scanline 0 is the bottom row; count rows from the top edge
        for y in (1..=rows).rev() {
            let src_row = src.scanline(src.height() - y - offset_y).to_vec();
            let dst_row = self.scanline_mut(self.height() - roi_top - y);
            for x in 0..cols {
                let s = &src_row[(offset_x as usize + x) * 4..][..4];
                let d = &mut dst_row[(roi_left + x) * 4..][..4];
                match s[3] {
                    0 => {}
                    255 => d[..3].copy_from_slice(&s[..3]),
                    alpha => {
                        let a = alpha as u32;
                        let na = 255 - a;
                        for c in 0..3 {
                            d[c] = ((a * s[c] as u32 + na * d[c] as u32) / 255) as u8;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fg_32(width: u32, height: u32, pixel: [u8; 4]) -> Bitmap {
        let mut b = Bitmap::new(width, height, 32).unwrap();
        b.fill(&pixel).unwrap();
        b
    }

    #[test]
    fn test_composite_transparent_shows_checkerboard() {
        let fg = fg_32(16, 16, [0, 0, 0, 0]);
        let dst = fg.composite(false, None, None).unwrap();
        assert_eq!(dst.bpp(), 24);
        // top-left cell is light, cells flip every 8 pixels
        assert_eq!(dst.scanline(0)[0], 255);
        assert_eq!(dst.scanline(0)[8 * 3], 192);
        assert_eq!(dst.scanline(8)[0], 192);
        assert_eq!(dst.scanline(8)[8 * 3], 255);
    }

    #[test]
    fn test_composite_blends_against_app_color() {
        // half-transparent pure red over black
        let fg = fg_32(1, 1, [0, 0, 255, 128]);
        let black = Rgba8 { blue: 0, green: 0, red: 0, alpha: 0 };
        let dst = fg.composite(false, Some(black), None).unwrap();
        assert_eq!(&dst.scanline(0)[..3], &[0, 0, (128 * 255 >> 8) as u8]);
    }

    #[test]
    fn test_composite_file_background_wins() {
        let mut fg = fg_32(1, 1, [0, 0, 0, 0]);
        fg.set_background_color(Some(Rgba8 { blue: 10, green: 20, red: 30, alpha: 0 }));
        let app = Rgba8 { blue: 1, green: 2, red: 3, alpha: 0 };
        let dst = fg.composite(true, Some(app), None).unwrap();
        assert_eq!(&dst.scanline(0)[..3], &[10, 20, 30]);
        // without the flag the application color applies
        let dst = fg.composite(false, Some(app), None).unwrap();
        assert_eq!(&dst.scanline(0)[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_composite_8bpp_uses_transparency_table() {
        let mut fg = Bitmap::new(2, 1, 8).unwrap();
        fg.palette_mut().unwrap().as_mut_slice()[1] =
            Rgba8 { blue: 0, green: 0, red: 200, alpha: 0 };
        fg.set_transparency_table(vec![0]);
        fg.scanline_mut(0)[1] = 1;

        let black = Rgba8 { blue: 0, green: 0, red: 0, alpha: 0 };
        let dst = fg.composite(false, Some(black), None).unwrap();
        // index 0 is fully transparent, index 1 is beyond the table so opaque
        assert_eq!(&dst.scanline(0)[..6], &[0, 0, 0, 0, 0, 200]);
    }

    #[test]
    fn test_composite_rejects_mismatched_background() {
        let fg = fg_32(2, 2, [0, 0, 0, 0]);
        let odd_size = Bitmap::new(3, 3, 24).unwrap();
        assert!(matches!(
            fg.composite(false, None, Some(&odd_size)),
            Err(Error::DimensionMismatch { expected: (2, 2), actual: (3, 3) })
        ));
        let odd_depth = Bitmap::new(2, 2, 32).unwrap();
        assert!(matches!(
            fg.composite(false, None, Some(&odd_depth)),
            Err(Error::UnsupportedDepth(32))
        ));
    }

    #[test]
    fn test_premultiply() {
        let mut b = Bitmap::new(3, 1, 32).unwrap();
        let row = b.scanline_mut(0);
        row[..4].copy_from_slice(&[255, 255, 255, 128]);
        row[4..8].copy_from_slice(&[10, 20, 30, 0]);
        row[8..12].copy_from_slice(&[10, 20, 30, 255]);

        b.premultiply_with_alpha().unwrap();
        let row = b.scanline(0);
        assert_eq!(&row[..4], &[128, 128, 128, 128]);
        assert_eq!(&row[4..8], &[0, 0, 0, 0]);
        assert_eq!(&row[8..12], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_premultiply_rejects_24bpp() {
        let mut b = Bitmap::new(1, 1, 24).unwrap();
        assert!(matches!(
            b.premultiply_with_alpha(),
            Err(Error::UnsupportedDepth(24))
        ));
    }

    #[test]
    fn test_draw_bitmap_copies_opaque_pixels() {
        let mut dst = fg_32(2, 2, [1, 1, 1, 77]);
        let src = fg_32(1, 1, [10, 20, 30, 255]);
        dst.draw_bitmap(&src, AlphaOperation::SrcAlpha, 1, 1).unwrap();
        // top-left (1,1) is storage row 0, column 1; destination alpha survives
        assert_eq!(&dst.scanline(0)[4..8], &[10, 20, 30, 77]);
        assert_eq!(&dst.scanline(0)[..4], &[1, 1, 1, 77]);
        assert_eq!(&dst.scanline(1)[4..8], &[1, 1, 1, 77]);
    }

    #[test]
    fn test_draw_bitmap_blends_and_clips() {
        let mut dst = fg_32(2, 1, [0, 0, 0, 255]);
        let src = fg_32(2, 1, [200, 100, 50, 128]);
        // half off the left edge: only source column 1 lands on column 0
        dst.draw_bitmap(&src, AlphaOperation::SrcAlpha, -1, 0).unwrap();
        let blended = ((128u32 * 200 + 127 * 0) / 255) as u8;
        assert_eq!(dst.scanline(0)[0], blended);
        assert_eq!(&dst.scanline(0)[4..7], &[0, 0, 0]);
    }

    #[test]
    fn test_draw_bitmap_off_canvas_is_noop() {
        let mut dst = fg_32(2, 2, [9, 9, 9, 255]);
        let src = fg_32(1, 1, [1, 2, 3, 255]);
        dst.draw_bitmap(&src, AlphaOperation::SrcAlpha, -5, 0).unwrap();
        dst.draw_bitmap(&src, AlphaOperation::SrcAlpha, 2, 2).unwrap();
        assert_eq!(&dst.scanline(0)[..4], &[9, 9, 9, 255]);
    }

    #[test]
    fn test_draw_bitmap_rejects_empty() {
        let mut dst = fg_32(2, 2, [0, 0, 0, 255]);
        let empty = Bitmap::new(0, 0, 32).unwrap();
        assert!(matches!(
            dst.draw_bitmap(&empty, AlphaOperation::SrcAlpha, 0, 0),
            Err(Error::EmptyBitmap)
        ));
        let mut empty = Bitmap::new(0, 0, 32).unwrap();
        let src = fg_32(1, 1, [0, 0, 0, 255]);
        assert!(matches!(
            empty.draw_bitmap(&src, AlphaOperation::SrcAlpha, 0, 0),
            Err(Error::EmptyBitmap)
        ));
    }

    #[test]
    fn test_draw_bitmap_rejects_yuv() {
        use crate::bitmap::ColorEncoding;
        let mut dst = fg_32(2, 2, [0, 0, 0, 255]);
        let mut src = fg_32(1, 1, [0, 0, 0, 255]);
        src.set_encoding(ColorEncoding::Yuv);
        assert!(matches!(
            dst.draw_bitmap(&src, AlphaOperation::SrcAlpha, 0, 0),
            Err(Error::UnsupportedColorType(ColorType::Yuv))
        ));
    }
}
