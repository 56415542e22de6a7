//! Bit-depth conversion
//!
//! Smart converters between the classic bitmap depths. Each converter
//! allocates a fresh bitmap, clones the source metadata and expands or
//! quantizes scanline by scanline. Palette indices resolve through the
//! source palette; sub-byte depths are packed MSB-first.
//!
//! # See also
//!
//! C FreeImage: `FreeImage_ConvertTo32Bits()` in `Conversion32.cpp`,
//! `FreeImage_ConvertTo4Bits()` in `Conversion4.cpp`,
//! `FreeImage_ConvertToGreyscale()` in `Conversion8.cpp`

use crate::bitmap::{Bitmap, scanline};
use crate::error::{Error, Result};
use crate::pixel::{
    ColorType, ImageType, Rgb8, Rgb16, Rgba8, Rgba16, grey, RGB555_BLUE_MASK, RGB555_BLUE_SHIFT,
    RGB555_GREEN_MASK, RGB555_GREEN_SHIFT, RGB555_RED_MASK, RGB555_RED_SHIFT, RGB565_BLUE_MASK,
    RGB565_BLUE_SHIFT, RGB565_GREEN_MASK, RGB565_GREEN_SHIFT, RGB565_RED_MASK, RGB565_RED_SHIFT,
};

// ----------------------------------------------------------
//  line converters, X to 32 bits
// ----------------------------------------------------------

fn line_1_to_32(target: &mut [Rgba8], source: &[u8], width: usize, palette: &[Rgba8]) {
    for cols in 0..width {
        let index = usize::from(source[cols >> 3] & (0x80 >> (cols & 0x07)) != 0);
        let e = palette[index];
        target[cols] = Rgba8 {
            blue: e.blue,
            green: e.green,
            red: e.red,
            alpha: 0xFF,
        };
    }
}

fn line_4_to_32(target: &mut [Rgba8], source: &[u8], width: usize, palette: &[Rgba8]) {
    for cols in 0..width {
        let byte = source[cols >> 1];
        let index = if cols & 1 == 0 { byte >> 4 } else { byte & 0x0F } as usize;
        let e = palette[index];
        target[cols] = Rgba8 {
            blue: e.blue,
            green: e.green,
            red: e.red,
            alpha: 0xFF,
        };
    }
}

fn line_8_to_32(target: &mut [Rgba8], source: &[u8], width: usize, palette: &[Rgba8]) {
    for cols in 0..width {
        let e = palette[source[cols] as usize];
        target[cols] = Rgba8 {
            blue: e.blue,
            green: e.green,
            red: e.red,
            alpha: 0xFF,
        };
    }
}

// Transparency-aware variants: indices at or beyond the table length
// are opaque.

fn line_1_to_32_transparent(
    target: &mut [Rgba8],
    source: &[u8],
    width: usize,
    palette: &[Rgba8],
    table: &[u8],
) {
    for cols in 0..width {
        let index = usize::from(source[cols >> 3] & (0x80 >> (cols & 0x07)) != 0);
        let e = palette[index];
        target[cols] = Rgba8 {
            blue: e.blue,
            green: e.green,
            red: e.red,
            alpha: table.get(index).copied().unwrap_or(255),
        };
    }
}

fn line_4_to_32_transparent(
    target: &mut [Rgba8],
    source: &[u8],
    width: usize,
    palette: &[Rgba8],
    table: &[u8],
) {
    for cols in 0..width {
        let byte = source[cols >> 1];
        let index = if cols & 1 == 0 { byte >> 4 } else { byte & 0x0F } as usize;
        let e = palette[index];
        target[cols] = Rgba8 {
            blue: e.blue,
            green: e.green,
            red: e.red,
            alpha: table.get(index).copied().unwrap_or(255),
        };
    }
}

fn line_8_to_32_transparent(
    target: &mut [Rgba8],
    source: &[u8],
    width: usize,
    palette: &[Rgba8],
    table: &[u8],
) {
    for cols in 0..width {
        let index = source[cols] as usize;
        let e = palette[index];
        target[cols] = Rgba8 {
            blue: e.blue,
            green: e.green,
            red: e.red,
            alpha: table.get(index).copied().unwrap_or(255),
        };
    }
}

#[inline]
fn unpack_555(bits: u16) -> (u8, u8, u8) {
    (
        ((((bits & RGB555_RED_MASK) >> RGB555_RED_SHIFT) as u32 * 0xFF) / 0x1F) as u8,
        ((((bits & RGB555_GREEN_MASK) >> RGB555_GREEN_SHIFT) as u32 * 0xFF) / 0x1F) as u8,
        ((((bits & RGB555_BLUE_MASK) >> RGB555_BLUE_SHIFT) as u32 * 0xFF) / 0x1F) as u8,
    )
}

#[inline]
fn unpack_565(bits: u16) -> (u8, u8, u8) {
    (
        ((((bits & RGB565_RED_MASK) >> RGB565_RED_SHIFT) as u32 * 0xFF) / 0x1F) as u8,
        ((((bits & RGB565_GREEN_MASK) >> RGB565_GREEN_SHIFT) as u32 * 0xFF) / 0x3F) as u8,
        ((((bits & RGB565_BLUE_MASK) >> RGB565_BLUE_SHIFT) as u32 * 0xFF) / 0x1F) as u8,
    )
}

fn line_16_to_32(target: &mut [Rgba8], source: &[u8], width: usize, is_565: bool) {
    for cols in 0..width {
        let bits = u16::from_le_bytes([source[cols * 2], source[cols * 2 + 1]]);
        let (red, green, blue) = if is_565 { unpack_565(bits) } else { unpack_555(bits) };
        target[cols] = Rgba8 {
            blue,
            green,
            red,
            alpha: 0xFF,
        };
    }
}

fn line_24_to_32(target: &mut [Rgba8], source: &[Rgb8], width: usize) {
    for cols in 0..width {
        target[cols] = Rgba8 {
            blue: source[cols].blue,
            green: source[cols].green,
            red: source[cols].red,
            alpha: 0xFF,
        };
    }
}

// ----------------------------------------------------------
//  line converters, X to 4 bits
// ----------------------------------------------------------

// Nibbles pack MSB-first: pixel 0 lands in the high nibble.
#[inline]
fn pack_nibble(target: &mut [u8], cols: usize, value: u8) {
    if cols & 1 == 0 {
        target[cols >> 1] = value & 0xF0;
    } else {
        target[cols >> 1] |= value >> 4;
    }
}

fn line_1_to_4(target: &mut [u8], source: &[u8], width: usize) {
    for cols in 0..width {
        let bit = source[cols >> 3] & (0x80 >> (cols & 0x07)) != 0;
        pack_nibble(target, cols, if bit { 0xF0 } else { 0x00 });
    }
}

fn line_8_to_4(target: &mut [u8], source: &[u8], width: usize, palette: &[Rgba8]) {
    for cols in 0..width {
        let e = palette[source[cols] as usize];
        pack_nibble(target, cols, grey(e.red, e.green, e.blue));
    }
}

fn line_16_to_4(target: &mut [u8], source: &[u8], width: usize, is_565: bool) {
    for cols in 0..width {
        let bits = u16::from_le_bytes([source[cols * 2], source[cols * 2 + 1]]);
        let (r, g, b) = if is_565 { unpack_565(bits) } else { unpack_555(bits) };
        pack_nibble(target, cols, grey(r, g, b));
    }
}

fn line_24_to_4(target: &mut [u8], source: &[Rgb8], width: usize) {
    for cols in 0..width {
        let p = source[cols];
        pack_nibble(target, cols, grey(p.red, p.green, p.blue));
    }
}

fn line_32_to_4(target: &mut [u8], source: &[Rgba8], width: usize) {
    for cols in 0..width {
        let p = source[cols];
        pack_nibble(target, cols, grey(p.red, p.green, p.blue));
    }
}

impl Bitmap {
    /// Convert to a 32-bpp classic bitmap.
    ///
    /// Accepted sources are classic bitmaps of any depth (a 32-bpp input
    /// is deep cloned), [`ImageType::Rgb16`] and [`ImageType::Rgba16`].
    /// Paletted sources flagged transparent map their transparency table
    /// into the alpha channel; everything else gets alpha 255. 16-bpp
    /// sources unpack through their 555 or 565 masks, with unknown masks
    /// reading as 555. Metadata is cloned on every successful conversion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] for a bitmap without pixels and
    /// [`Error::UnsupportedImageType`] for any other extended type.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_ConvertTo32Bits()`
    pub fn convert_to_32_bits(&self) -> Result<Bitmap> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }

        match self.image_type() {
            ImageType::Bitmap => {}
            ImageType::Rgb16 => {
                let mut dst = Bitmap::new(self.width(), self.height(), 32)?;
                dst.clone_metadata_from(self);
                scanline::transform::<Rgba8, Rgb16, _>(&mut dst, self, |p| Rgba8 {
                    blue: (p.blue >> 8) as u8,
                    green: (p.green >> 8) as u8,
                    red: (p.red >> 8) as u8,
                    alpha: 0xFF,
                });
                return Ok(dst);
            }
            ImageType::Rgba16 => {
                let mut dst = Bitmap::new(self.width(), self.height(), 32)?;
                dst.clone_metadata_from(self);
                scanline::transform::<Rgba8, Rgba16, _>(&mut dst, self, |p| Rgba8 {
                    blue: (p.blue >> 8) as u8,
                    green: (p.green >> 8) as u8,
                    red: (p.red >> 8) as u8,
                    alpha: (p.alpha >> 8) as u8,
                });
                return Ok(dst);
            }
            other => return Err(Error::UnsupportedImageType(other)),
        }

        if self.bpp() == 32 {
            return Ok(self.clone());
        }

        let width = self.width() as usize;
        let mut dst = Bitmap::new(self.width(), self.height(), 32)?;
        dst.clone_metadata_from(self);

        let transparent = self.is_transparent();
        let table: Vec<u8> = self
            .transparency_table()
            .map(|t| t[..self.transparent_count().min(t.len())].to_vec())
            .unwrap_or_default();

        match self.bpp() {
            1 | 4 | 8 => {
                let palette = self
                    .palette()
                    .map(|p| p.as_slice().to_vec())
                    .unwrap_or_default();
                for y in 0..self.height() {
                    let src_row = self.scanline(y).to_vec();
                    let dst_row: &mut [Rgba8] =
                        bytemuck::cast_slice_mut(&mut dst.scanline_mut(y)[..width * 4]);
                    match (self.bpp(), transparent) {
                        (1, false) => line_1_to_32(dst_row, &src_row, width, &palette),
                        (1, true) => line_1_to_32_transparent(dst_row, &src_row, width, &palette, &table),
                        (4, false) => line_4_to_32(dst_row, &src_row, width, &palette),
                        (4, true) => line_4_to_32_transparent(dst_row, &src_row, width, &palette, &table),
                        (_, false) => line_8_to_32(dst_row, &src_row, width, &palette),
                        (_, true) => line_8_to_32_transparent(dst_row, &src_row, width, &palette, &table),
                    }
                }
            }
            16 => {
                let is_565 = self.is_rgb565();
                for y in 0..self.height() {
                    let src_row = self.scanline(y).to_vec();
                    let dst_row: &mut [Rgba8] =
                        bytemuck::cast_slice_mut(&mut dst.scanline_mut(y)[..width * 4]);
                    line_16_to_32(dst_row, &src_row, width, is_565);
                }
            }
            _ => {
                // 24 bpp
                for y in 0..self.height() {
                    let src_row: Vec<Rgb8> =
                        bytemuck::cast_slice(&self.scanline(y)[..width * 3]).to_vec();
                    let dst_row: &mut [Rgba8] =
                        bytemuck::cast_slice_mut(&mut dst.scanline_mut(y)[..width * 4]);
                    line_24_to_32(dst_row, &src_row, width);
                }
            }
        }

        Ok(dst)
    }

    /// Convert to a 4-bpp greyscale bitmap.
    ///
    /// The result always gets the 16-entry grey ramp palette. A 1-bpp
    /// source with a color palette keeps its two entries in ramp slots 0
    /// and 15; a min-is-white 1-bpp source inverts the ramp. Deeper
    /// sources quantize through the integer [`grey`] luma and pack two
    /// pixels per byte, high nibble first. A 4-bpp input is deep cloned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] for a bitmap without pixels and
    /// [`Error::UnsupportedImageType`] for non-classic types.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_ConvertTo4Bits()`
    pub fn convert_to_4_bits(&self) -> Result<Bitmap> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }
        if self.image_type() != ImageType::Bitmap {
            return Err(Error::UnsupportedImageType(self.image_type()));
        }
        if self.bpp() == 4 {
            return Ok(self.clone());
        }

        let width = self.width() as usize;
        let mut dst = Bitmap::new(self.width(), self.height(), 4)?;
        dst.clone_metadata_from(self);

        // a greyscale palette is always needed for image processing
        dst.palette_mut().expect("4 bpp bitmap has a palette").set_grey_ramp();

        match self.bpp() {
            1 => {
                match self.color_type() {
                    ColorType::Palette => {
                        let old = self.palette().expect("1 bpp bitmap has a palette");
                        let first = old.get(0).unwrap_or_default();
                        let second = old.get(1).unwrap_or_default();
                        let new_pal = dst.palette_mut().expect("palette").as_mut_slice();
                        new_pal[0] = first;
                        new_pal[15] = second;
                    }
                    ColorType::MinIsWhite => {
                        let new_pal = dst.palette_mut().expect("palette").as_mut_slice();
                        for (i, entry) in new_pal.iter_mut().enumerate() {
                            let v = 255 - (((i as u8) << 4) + i as u8);
                            entry.red = v;
                            entry.green = v;
                            entry.blue = v;
                        }
                    }
                    _ => {}
                }
                for y in 0..self.height() {
                    let src_row = self.scanline(y).to_vec();
                    line_1_to_4(dst.scanline_mut(y), &src_row, width);
                }
            }
            8 => {
                let palette = self
                    .palette()
                    .map(|p| p.as_slice().to_vec())
                    .unwrap_or_default();
                for y in 0..self.height() {
                    let src_row = self.scanline(y).to_vec();
                    line_8_to_4(dst.scanline_mut(y), &src_row, width, &palette);
                }
            }
            16 => {
                let is_565 = self.is_rgb565();
                for y in 0..self.height() {
                    let src_row = self.scanline(y).to_vec();
                    line_16_to_4(dst.scanline_mut(y), &src_row, width, is_565);
                }
            }
            24 => {
                for y in 0..self.height() {
                    let src_row: Vec<Rgb8> =
                        bytemuck::cast_slice(&self.scanline(y)[..width * 3]).to_vec();
                    line_24_to_4(dst.scanline_mut(y), &src_row, width);
                }
            }
            _ => {
                // 32 bpp
                for y in 0..self.height() {
                    let src_row: Vec<Rgba8> =
                        bytemuck::cast_slice(&self.scanline(y)[..width * 4]).to_vec();
                    line_32_to_4(dst.scanline_mut(y), &src_row, width);
                }
            }
        }

        Ok(dst)
    }

    /// Convert to an 8-bpp greyscale bitmap with a linear ramp palette.
    ///
    /// An 8-bpp min-is-black source is deep cloned. Paletted sources map
    /// every index through the [`grey`] luma of its palette entry, which
    /// also folds min-is-white palettes into true grey values. 16-bpp
    /// sources unpack through their masks; 24 and 32-bpp sources take the
    /// luma of each pixel. Metadata is cloned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBitmap`] for a bitmap without pixels and
    /// [`Error::UnsupportedImageType`] for non-classic types.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_ConvertToGreyscale()`
    pub fn convert_to_greyscale(&self) -> Result<Bitmap> {
        if !self.has_pixels() {
            return Err(Error::EmptyBitmap);
        }
        if self.image_type() != ImageType::Bitmap {
            return Err(Error::UnsupportedImageType(self.image_type()));
        }
        if self.bpp() == 8 && self.color_type() == ColorType::MinIsBlack {
            return Ok(self.clone());
        }

        let width = self.width() as usize;
        let mut dst = Bitmap::new(self.width(), self.height(), 8)?;
        dst.clone_metadata_from(self);
        dst.palette_mut().expect("8 bpp bitmap has a palette").set_grey_ramp();

        match self.bpp() {
            1 | 4 | 8 => {
                let lut: Vec<u8> = self
                    .palette()
                    .expect("indexed bitmap has a palette")
                    .as_slice()
                    .iter()
                    .map(|e| grey(e.red, e.green, e.blue))
                    .collect();
                for y in 0..self.height() {
                    let src_row = self.scanline(y).to_vec();
                    let dst_row = dst.scanline_mut(y);
                    for x in 0..width {
                        let index = match self.bpp() {
                            1 => usize::from(src_row[x >> 3] & (0x80 >> (x & 0x07)) != 0),
                            4 => {
                                let byte = src_row[x >> 1];
                                usize::from(if x & 1 == 0 { byte >> 4 } else { byte & 0x0F })
                            }
                            _ => src_row[x] as usize,
                        };
                        dst_row[x] = lut[index];
                    }
                }
            }
            16 => {
                let is_565 = self.is_rgb565();
                scanline::transform::<u8, u16, _>(&mut dst, self, |bits| {
                    let (r, g, b) = if is_565 { unpack_565(bits) } else { unpack_555(bits) };
                    grey(r, g, b)
                });
            }
            24 => {
                scanline::transform::<u8, Rgb8, _>(&mut dst, self, |p| {
                    grey(p.red, p.green, p.blue)
                });
            }
            _ => {
                // 32 bpp
                scanline::transform::<u8, Rgba8, _>(&mut dst, self, |p| {
                    grey(p.red, p.green, p.blue)
                });
            }
        }

        Ok(dst)
    }
}
