//! Color palette for indexed bitmaps
//!
//! Every classic bitmap of 8 bpp or less owns a palette with `2^bpp`
//! entries, zero-initialized at allocation. Conversion routines that
//! produce greyscale output overwrite it with a linear ramp.
//!
//! # See also
//!
//! C FreeImage: `FreeImage_GetPalette()`, palette setup in `Conversion4.cpp`

use crate::pixel::Rgba8;

/// Color look-up table of an indexed bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<Rgba8>,
}

impl Palette {
    /// Create a palette of `len` black entries.
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![Rgba8::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgba8> {
        self.entries.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Rgba8] {
        &self.entries
    }

    pub fn as_mut_slice(&mut self) -> &mut [Rgba8] {
        &mut self.entries
    }

    /// Overwrite the palette with a linear greyscale ramp from black to
    /// white. For a 16-entry palette this is `(i << 4) + i`, for 256
    /// entries the identity ramp.
    pub fn set_grey_ramp(&mut self) {
        let last = self.entries.len().saturating_sub(1).max(1);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let v = (i * 255 / last) as u8;
            *entry = Rgba8 {
                blue: v,
                green: v,
                red: v,
                alpha: 0,
            };
        }
    }

    /// True when every entry is grey (equal red, green and blue).
    pub fn is_greyscale(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.red == e.green && e.green == e.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_ramp_16_entries() {
        let mut pal = Palette::new(16);
        pal.set_grey_ramp();
        for i in 0..16 {
            let v = ((i << 4) + i) as u8;
            assert_eq!(pal.get(i).unwrap().red, v);
            assert_eq!(pal.get(i).unwrap().green, v);
            assert_eq!(pal.get(i).unwrap().blue, v);
        }
    }

    #[test]
    fn test_grey_ramp_256_entries() {
        let mut pal = Palette::new(256);
        pal.set_grey_ramp();
        for i in 0..256 {
            assert_eq!(pal.get(i).unwrap().red, i as u8);
        }
        assert!(pal.is_greyscale());
    }
}
