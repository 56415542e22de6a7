//! The in-memory bitmap container
//!
//! [`Bitmap`] owns its pixel buffer outright: cloning is a deep copy and
//! mutation requires `&mut self`. Scanlines are padded to 4-byte
//! boundaries; classic bitmaps of 8 bpp or less carry a [`Palette`],
//! optionally a transparency table and a file background color.
//!
//! Submodules add the pixel operations:
//!
//! - [`scanline`] - typed per-pixel iteration and transformation
//! - bit-depth conversion ([`Bitmap::convert_to_32_bits`] and friends)
//! - float conversion ([`Bitmap::convert_to_float`])
//! - statistics ([`Bitmap::find_min_max`], [`Bitmap::fill`])
//! - compositing ([`Bitmap::composite`], [`Bitmap::draw_bitmap`])
//!
//! # See also
//!
//! C FreeImage: `FIBITMAP` internals, `FreeImage_Allocate(T)()`,
//! `FreeImage_GetColorType2()` in `BitmapAccess.cpp`

mod composite;
mod convert;
mod convert_float;
mod palette;
pub mod scanline;
mod statistics;

pub use composite::AlphaOperation;
pub use palette::Palette;
pub use statistics::MinMax;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::pixel::{ColorType, ImageType, Rgba8};

/// Color encoding tag of a bitmap.
///
/// The RGB-to-YUV conversion marks its result so that later operations
/// can tell stored YUV triples from RGB ones; this is the in-memory
/// analog of an ICC profile flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorEncoding {
    #[default]
    Rgb,
    Yuv,
}

/// String tag map attached to a bitmap.
///
/// Conversions that document metadata propagation copy it wholesale.
///
/// # See also
///
/// C FreeImage: `FreeImage_CloneMetadata()`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    tags: BTreeMap<String, String>,
}

impl Metadata {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An in-memory device-independent bitmap.
#[derive(Debug, Clone)]
pub struct Bitmap {
    image_type: ImageType,
    width: u32,
    height: u32,
    bpp: u32,
    pitch: u32,
    red_mask: u16,
    green_mask: u16,
    blue_mask: u16,
    palette: Option<Palette>,
    transparency: Option<Vec<u8>>,
    transparent: bool,
    background: Option<Rgba8>,
    encoding: ColorEncoding,
    metadata: Metadata,
    data: Vec<u8>,
}

fn compute_pitch(width: u32, bpp: u32) -> u32 {
    (((width as u64 * bpp as u64 + 31) / 32) * 4) as u32
}

impl Bitmap {
    /// Allocate a classic bitmap, zero filled.
    ///
    /// `bpp` must be 1, 4, 8, 16, 24 or 32. Depths of 8 bpp or less get a
    /// zeroed palette of `2^bpp` entries; 16 bpp defaults to 555 masks.
    /// Zero width or height is allowed and yields an empty bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDepth`] for any other depth.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_Allocate()`
    pub fn new(width: u32, height: u32, bpp: u32) -> Result<Bitmap> {
        if !matches!(bpp, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(Error::InvalidDepth(bpp));
        }

        let pitch = compute_pitch(width, bpp);
        let palette = (bpp <= 8).then(|| Palette::new(1usize << bpp));
        let (red_mask, green_mask, blue_mask) = if bpp == 16 {
            use crate::pixel::{RGB555_BLUE_MASK, RGB555_GREEN_MASK, RGB555_RED_MASK};
            (RGB555_RED_MASK, RGB555_GREEN_MASK, RGB555_BLUE_MASK)
        } else {
            (0, 0, 0)
        };

        Ok(Bitmap {
            image_type: ImageType::Bitmap,
            width,
            height,
            bpp,
            pitch,
            red_mask,
            green_mask,
            blue_mask,
            palette,
            transparency: None,
            transparent: false,
            background: None,
            encoding: ColorEncoding::Rgb,
            metadata: Metadata::default(),
            data: vec![0; pitch as usize * height as usize],
        })
    }

    /// Allocate a bitmap of an extended type, zero filled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedImageType`] for [`ImageType::Bitmap`]
    /// (use [`Bitmap::new`], which takes an explicit depth) and
    /// [`ImageType::Unknown`].
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_AllocateT()`
    pub fn with_type(image_type: ImageType, width: u32, height: u32) -> Result<Bitmap> {
        let bpp = image_type
            .bpp()
            .ok_or(Error::UnsupportedImageType(image_type))?;
        let pitch = compute_pitch(width, bpp);

        Ok(Bitmap {
            image_type,
            width,
            height,
            bpp,
            pitch,
            red_mask: 0,
            green_mask: 0,
            blue_mask: 0,
            palette: None,
            transparency: None,
            transparent: false,
            background: None,
            encoding: ColorEncoding::Rgb,
            metadata: Metadata::default(),
            data: vec![0; pitch as usize * height as usize],
        })
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits per pixel.
    pub fn bpp(&self) -> u32 {
        self.bpp
    }

    /// Bytes per scanline, rows padded to a 4-byte boundary.
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// True when the bitmap has at least one pixel.
    pub fn has_pixels(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Raw bytes of scanline `y` (`pitch` bytes, including padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn scanline(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "scanline out of range");
        let start = y as usize * self.pitch as usize;
        &self.data[start..start + self.pitch as usize]
    }

    /// Mutable raw bytes of scanline `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn scanline_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "scanline out of range");
        let start = y as usize * self.pitch as usize;
        &mut self.data[start..start + self.pitch as usize]
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn palette_mut(&mut self) -> Option<&mut Palette> {
        self.palette.as_mut()
    }

    /// 16-bpp packed red mask; zero for every other depth.
    pub fn red_mask(&self) -> u16 {
        self.red_mask
    }

    pub fn green_mask(&self) -> u16 {
        self.green_mask
    }

    pub fn blue_mask(&self) -> u16 {
        self.blue_mask
    }

    /// Switch a 16-bpp bitmap to 565 masks.
    pub fn set_masks_565(&mut self) -> Result<()> {
        use crate::pixel::{RGB565_BLUE_MASK, RGB565_GREEN_MASK, RGB565_RED_MASK};
        if self.bpp != 16 {
            return Err(Error::UnsupportedDepth(self.bpp));
        }
        self.red_mask = RGB565_RED_MASK;
        self.green_mask = RGB565_GREEN_MASK;
        self.blue_mask = RGB565_BLUE_MASK;
        Ok(())
    }

    /// True when a 16-bpp bitmap carries exactly the 565 masks; every
    /// other mask combination (including all zero) reads as 555.
    pub(crate) fn is_rgb565(&self) -> bool {
        use crate::pixel::{RGB565_BLUE_MASK, RGB565_GREEN_MASK, RGB565_RED_MASK};
        self.red_mask == RGB565_RED_MASK
            && self.green_mask == RGB565_GREEN_MASK
            && self.blue_mask == RGB565_BLUE_MASK
    }

    /// Color classification of the bitmap.
    ///
    /// The YUV encoding tag wins over everything else. Paletted depths
    /// are classified by their palette: an all-grey ascending ramp is
    /// [`ColorType::MinIsBlack`], descending is [`ColorType::MinIsWhite`],
    /// anything colored is [`ColorType::Palette`].
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_GetColorType2()`
    pub fn color_type(&self) -> ColorType {
        if self.encoding == ColorEncoding::Yuv {
            return ColorType::Yuv;
        }

        match self.image_type {
            ImageType::Bitmap => match self.bpp {
                1 | 4 | 8 => {
                    // palette invariant holds for bpp <= 8
                    let pal = self.palette.as_ref().expect("indexed bitmap without palette");
                    if !pal.is_greyscale() {
                        return ColorType::Palette;
                    }
                    let first = pal.get(0).unwrap_or_default();
                    let last = pal.get(pal.len().saturating_sub(1)).unwrap_or_default();
                    if first.red > last.red {
                        ColorType::MinIsWhite
                    } else {
                        ColorType::MinIsBlack
                    }
                }
                16 | 24 => ColorType::Rgb,
                _ => ColorType::RgbAlpha,
            },
            ImageType::UInt16
            | ImageType::Int16
            | ImageType::UInt32
            | ImageType::Int32
            | ImageType::Float
            | ImageType::Double
            | ImageType::Complex
            | ImageType::ComplexF => ColorType::MinIsBlack,
            ImageType::Rgb16 | ImageType::Rgb32 | ImageType::RgbF => ColorType::Rgb,
            ImageType::Rgba16 | ImageType::Rgba32 | ImageType::RgbaF => ColorType::RgbAlpha,
            ImageType::Unknown => ColorType::MinIsBlack,
        }
    }

    /// Per-index alpha table of a transparent paletted bitmap.
    pub fn transparency_table(&self) -> Option<&[u8]> {
        self.transparency.as_deref()
    }

    /// Attach a per-index alpha table and flag the bitmap transparent.
    /// The table is truncated to 256 entries.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_SetTransparencyTable()`
    pub fn set_transparency_table(&mut self, mut table: Vec<u8>) {
        table.truncate(256);
        self.transparency = Some(table);
        self.transparent = true;
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Number of transparency table entries in effect; indices at or
    /// beyond this count are opaque.
    pub fn transparent_count(&self) -> usize {
        if self.transparent {
            self.transparency.as_ref().map_or(0, Vec::len)
        } else {
            0
        }
    }

    pub fn background_color(&self) -> Option<Rgba8> {
        self.background
    }

    pub fn has_background_color(&self) -> bool {
        self.background.is_some()
    }

    /// Set or clear the file background color.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_SetBackgroundColor()`
    pub fn set_background_color(&mut self, color: Option<Rgba8>) {
        self.background = color;
    }

    pub fn encoding(&self) -> ColorEncoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: ColorEncoding) {
        self.encoding = encoding;
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Replace this bitmap's metadata with a copy of `src`'s.
    ///
    /// # See also
    ///
    /// C FreeImage: `FreeImage_CloneMetadata()`
    pub fn clone_metadata_from(&mut self, src: &Bitmap) {
        self.metadata = src.metadata.clone();
    }
}
