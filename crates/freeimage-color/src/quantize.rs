//! Color quantization
//!
//! Wu's variance-minimizing cut quantizer: pixels are binned into a
//! 33x33x33 histogram of cumulative moments, the color cube is split
//! greedily along the axis that maximizes the variance reduction, and
//! every pixel maps to the palette entry of the box its bin falls in.
//!
//! # See also
//!
//! C FreeImage: `WuQuantizer` in `WuQuantizer.cpp` (after Xiaolin Wu,
//! "Efficient Statistical Computations for Optimal Color Quantization")

use freeimage_core::{Bitmap, Error, ImageType, Rgba8};

use crate::error::{ColorError, ColorResult};

const SIDE: usize = 33;
const SIZE_3D: usize = SIDE * SIDE * SIDE;

// Histogram index for quantized coordinates in 0..=32:
// (r << 10) + (r << 6) + r + (g << 5) + g + b == r*1089 + g*33 + b
#[inline]
fn index(r: usize, g: usize, b: usize) -> usize {
    (r << 10) + (r << 6) + r + (g << 5) + g + b
}

/// Options of [`wu_quantize`].
#[derive(Debug, Clone)]
pub struct WuQuantizeOptions {
    /// Number of palette entries to produce, 2 to 256.
    pub palette_size: usize,
    /// Colors guaranteed a palette slot of their own. Their histogram
    /// bins are weighted above every image color, so the cut isolates
    /// them.
    pub reserve_palette: Vec<Rgba8>,
}

impl Default for WuQuantizeOptions {
    fn default() -> Self {
        Self {
            palette_size: 256,
            reserve_palette: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ColorBox {
    r0: i32,
    r1: i32,
    g0: i32,
    g1: i32,
    b0: i32,
    b1: i32,
    vol: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Red,
    Green,
    Blue,
}

struct WuQuantizer {
    wt: Vec<i32>,
    mr: Vec<i32>,
    mg: Vec<i32>,
    mb: Vec<i32>,
    gm2: Vec<f32>,
    // per-pixel histogram bin, in scanline order
    qadd: Vec<u16>,
}

impl WuQuantizer {
    fn new(pixel_count: usize) -> Self {
        Self {
            wt: vec![0; SIZE_3D],
            mr: vec![0; SIZE_3D],
            mg: vec![0; SIZE_3D],
            mb: vec![0; SIZE_3D],
            gm2: vec![0.0; SIZE_3D],
            qadd: vec![0; pixel_count],
        }
    }

    /// Build the 3D color histogram, one bin per 3-bit-truncated color.
    fn histogram(&mut self, src: &Bitmap, reserve: &[Rgba8]) {
        let table: Vec<i32> = (0..256).map(|i| (i * i) as i32).collect();
        let width = src.width() as usize;
        let stride = src.bpp() as usize / 8;

        for y in 0..src.height() {
            let row = src.scanline(y);
            for x in 0..width {
                let blue = row[x * stride] as usize;
                let green = row[x * stride + 1] as usize;
                let red = row[x * stride + 2] as usize;

                let ind = index((red >> 3) + 1, (green >> 3) + 1, (blue >> 3) + 1);
                self.qadd[y as usize * width + x] = ind as u16;
                self.wt[ind] += 1;
                self.mr[ind] += red as i32;
                self.mg[ind] += green as i32;
                self.mb[ind] += blue as i32;
                self.gm2[ind] += (table[red] + table[green] + table[blue]) as f32;
            }
        }

        if !reserve.is_empty() {
            // outweigh every image color so the cut isolates these bins
            let max = self.wt.iter().copied().max().unwrap_or(0) + 1;
            for color in reserve {
                let (red, green, blue) =
                    (color.red as i32, color.green as i32, color.blue as i32);
                let ind = index(
                    (red as usize >> 3) + 1,
                    (green as usize >> 3) + 1,
                    (blue as usize >> 3) + 1,
                );
                self.wt[ind] = max;
                self.mr[ind] = max * red;
                self.mg[ind] = max * green;
                self.mb[ind] = max * blue;
                self.gm2[ind] = max as f32 * (red * red + green * green + blue * blue) as f32;
            }
        }
    }

    /// Turn the histogram into cumulative moments so any box sums in
    /// constant time by inclusion-exclusion.
    fn compute_moments(&mut self) {
        for r in 1..SIDE {
            let mut area = [0i32; SIDE];
            let mut area_r = [0i32; SIDE];
            let mut area_g = [0i32; SIDE];
            let mut area_b = [0i32; SIDE];
            let mut area2 = [0f32; SIDE];

            for g in 1..SIDE {
                let mut line = 0i32;
                let mut line_r = 0i32;
                let mut line_g = 0i32;
                let mut line_b = 0i32;
                let mut line2 = 0f32;

                for b in 1..SIDE {
                    let ind1 = index(r, g, b);
                    line += self.wt[ind1];
                    line_r += self.mr[ind1];
                    line_g += self.mg[ind1];
                    line_b += self.mb[ind1];
                    line2 += self.gm2[ind1];

                    area[b] += line;
                    area_r[b] += line_r;
                    area_g[b] += line_g;
                    area_b[b] += line_b;
                    area2[b] += line2;

                    let ind2 = ind1 - index(1, 0, 0);
                    self.wt[ind1] = self.wt[ind2] + area[b];
                    self.mr[ind1] = self.mr[ind2] + area_r[b];
                    self.mg[ind1] = self.mg[ind2] + area_g[b];
                    self.mb[ind1] = self.mb[ind2] + area_b[b];
                    self.gm2[ind1] = self.gm2[ind2] + area2[b];
                }
            }
        }
    }

    fn vol(moment: &[i32], c: &ColorBox) -> i32 {
        let at = |r: i32, g: i32, b: i32| moment[index(r as usize, g as usize, b as usize)];
        at(c.r1, c.g1, c.b1) - at(c.r1, c.g1, c.b0) - at(c.r1, c.g0, c.b1)
            + at(c.r1, c.g0, c.b0)
            - at(c.r0, c.g1, c.b1)
            + at(c.r0, c.g1, c.b0)
            + at(c.r0, c.g0, c.b1)
            - at(c.r0, c.g0, c.b0)
    }

    fn vol_f(moment: &[f32], c: &ColorBox) -> f32 {
        let at = |r: i32, g: i32, b: i32| moment[index(r as usize, g as usize, b as usize)];
        at(c.r1, c.g1, c.b1) - at(c.r1, c.g1, c.b0) - at(c.r1, c.g0, c.b1)
            + at(c.r1, c.g0, c.b0)
            - at(c.r0, c.g1, c.b1)
            + at(c.r0, c.g1, c.b0)
            + at(c.r0, c.g0, c.b1)
            - at(c.r0, c.g0, c.b0)
    }

    // Lower-boundary term of a box sum when splitting along `axis`.
    fn bottom(moment: &[i32], c: &ColorBox, axis: Axis) -> i32 {
        let at = |r: i32, g: i32, b: i32| moment[index(r as usize, g as usize, b as usize)];
        match axis {
            Axis::Red => {
                -at(c.r0, c.g1, c.b1) + at(c.r0, c.g1, c.b0) + at(c.r0, c.g0, c.b1)
                    - at(c.r0, c.g0, c.b0)
            }
            Axis::Green => {
                -at(c.r1, c.g0, c.b1) + at(c.r1, c.g0, c.b0) + at(c.r0, c.g0, c.b1)
                    - at(c.r0, c.g0, c.b0)
            }
            Axis::Blue => {
                -at(c.r1, c.g1, c.b0) + at(c.r1, c.g0, c.b0) + at(c.r0, c.g1, c.b0)
                    - at(c.r0, c.g0, c.b0)
            }
        }
    }

    // Upper-boundary term with the split plane at `pos`.
    fn top(moment: &[i32], c: &ColorBox, axis: Axis, pos: i32) -> i32 {
        let at = |r: i32, g: i32, b: i32| moment[index(r as usize, g as usize, b as usize)];
        match axis {
            Axis::Red => {
                at(pos, c.g1, c.b1) - at(pos, c.g1, c.b0) - at(pos, c.g0, c.b1)
                    + at(pos, c.g0, c.b0)
            }
            Axis::Green => {
                at(c.r1, pos, c.b1) - at(c.r1, pos, c.b0) - at(c.r0, pos, c.b1)
                    + at(c.r0, pos, c.b0)
            }
            Axis::Blue => {
                at(c.r1, c.g1, pos) - at(c.r1, c.g0, pos) - at(c.r0, c.g1, pos)
                    + at(c.r0, c.g0, pos)
            }
        }
    }

    /// Weighted variance of the colors in a box.
    fn variance(&self, c: &ColorBox) -> f32 {
        let dr = Self::vol(&self.mr, c) as f32;
        let dg = Self::vol(&self.mg, c) as f32;
        let db = Self::vol(&self.mb, c) as f32;
        let xx = Self::vol_f(&self.gm2, c);
        xx - (dr * dr + dg * dg + db * db) / Self::vol(&self.wt, c) as f32
    }

    /// Find the split position along `axis` that maximizes the sum of
    /// squared box sums. Returns `(gain, position)`; a position of -1
    /// means no valid split exists on this axis.
    fn maximize(
        &self,
        c: &ColorBox,
        axis: Axis,
        first: i32,
        last: i32,
        whole: (i32, i32, i32, i32),
    ) -> (f32, i32) {
        let (whole_r, whole_g, whole_b, whole_w) = whole;
        let base_r = Self::bottom(&self.mr, c, axis);
        let base_g = Self::bottom(&self.mg, c, axis);
        let base_b = Self::bottom(&self.mb, c, axis);
        let base_w = Self::bottom(&self.wt, c, axis);

        let mut max = 0.0f32;
        let mut cut = -1i32;

        for i in first..last {
            let mut half_r = base_r + Self::top(&self.mr, c, axis, i);
            let mut half_g = base_g + Self::top(&self.mg, c, axis, i);
            let mut half_b = base_b + Self::top(&self.mb, c, axis, i);
            let mut half_w = base_w + Self::top(&self.wt, c, axis, i);
            if half_w == 0 {
                continue;
            }
            let mut temp = (half_r as f32 * half_r as f32
                + half_g as f32 * half_g as f32
                + half_b as f32 * half_b as f32)
                / half_w as f32;

            half_r = whole_r - half_r;
            half_g = whole_g - half_g;
            half_b = whole_b - half_b;
            half_w = whole_w - half_w;
            if half_w == 0 {
                continue;
            }
            temp += (half_r as f32 * half_r as f32
                + half_g as f32 * half_g as f32
                + half_b as f32 * half_b as f32)
                / half_w as f32;

            if temp > max {
                max = temp;
                cut = i;
            }
        }
        (max, cut)
    }

    /// Split `set1` into two boxes. Returns `None` when the box cannot
    /// be split.
    fn cut(&self, set1: &mut ColorBox) -> Option<ColorBox> {
        let whole = (
            Self::vol(&self.mr, set1),
            Self::vol(&self.mg, set1),
            Self::vol(&self.mb, set1),
            Self::vol(&self.wt, set1),
        );

        let (max_r, cut_r) = self.maximize(set1, Axis::Red, set1.r0 + 1, set1.r1, whole);
        let (max_g, cut_g) = self.maximize(set1, Axis::Green, set1.g0 + 1, set1.g1, whole);
        let (max_b, cut_b) = self.maximize(set1, Axis::Blue, set1.b0 + 1, set1.b1, whole);

        let axis = if max_r >= max_g && max_r >= max_b {
            if cut_r < 0 {
                return None;
            }
            Axis::Red
        } else if max_g >= max_r && max_g >= max_b {
            Axis::Green
        } else {
            Axis::Blue
        };

        let mut set2 = ColorBox {
            r1: set1.r1,
            g1: set1.g1,
            b1: set1.b1,
            ..ColorBox::default()
        };
        match axis {
            Axis::Red => {
                set2.r0 = cut_r;
                set1.r1 = cut_r;
                set2.g0 = set1.g0;
                set2.b0 = set1.b0;
            }
            Axis::Green => {
                set2.g0 = cut_g;
                set1.g1 = cut_g;
                set2.r0 = set1.r0;
                set2.b0 = set1.b0;
            }
            Axis::Blue => {
                set2.b0 = cut_b;
                set1.b1 = cut_b;
                set2.r0 = set1.r0;
                set2.g0 = set1.g0;
            }
        }
        set1.vol = (set1.r1 - set1.r0) * (set1.g1 - set1.g0) * (set1.b1 - set1.b0);
        set2.vol = (set2.r1 - set2.r0) * (set2.g1 - set2.g0) * (set2.b1 - set2.b0);
        Some(set2)
    }

    fn mark(c: &ColorBox, label: u8, tag: &mut [u8]) {
        for r in (c.r0 + 1)..=c.r1 {
            for g in (c.g0 + 1)..=c.g1 {
                for b in (c.b0 + 1)..=c.b1 {
                    tag[index(r as usize, g as usize, b as usize)] = label;
                }
            }
        }
    }
}

/// Quantize a 24 or 32-bpp bitmap to an 8-bpp paletted bitmap.
///
/// The palette holds at most `palette_size` entries; fewer when the
/// image has fewer distinct (3-bit-truncated) colors. Metadata is
/// cloned. The alpha channel of a 32-bpp source is ignored.
///
/// # Errors
///
/// Fails for bitmaps without pixels, for sources that are not 24 or
/// 32-bpp classic bitmaps, and for a palette size outside `2..=256`.
///
/// # See also
///
/// C FreeImage: `FreeImage_ColorQuantizeEx()` with `FIQ_WUQUANT`
pub fn wu_quantize(src: &Bitmap, options: &WuQuantizeOptions) -> ColorResult<Bitmap> {
    if !src.has_pixels() {
        return Err(ColorError::Core(Error::EmptyBitmap));
    }
    if src.image_type() != ImageType::Bitmap {
        return Err(ColorError::Core(Error::UnsupportedImageType(src.image_type())));
    }
    if src.bpp() != 24 && src.bpp() != 32 {
        return Err(ColorError::Core(Error::UnsupportedDepth(src.bpp())));
    }
    if options.palette_size < 2 || options.palette_size > 256 {
        return Err(ColorError::InvalidPaletteSize(options.palette_size));
    }

    let width = src.width() as usize;
    let height = src.height() as usize;
    let mut q = WuQuantizer::new(width * height);
    q.histogram(src, &options.reserve_palette);
    q.compute_moments();

    let mut cube = vec![ColorBox::default(); options.palette_size];
    let mut vv = vec![0.0f32; options.palette_size];
    cube[0] = ColorBox {
        r0: 0,
        g0: 0,
        b0: 0,
        r1: 32,
        g1: 32,
        b1: 32,
        vol: 0,
    };

    let mut palette_size = options.palette_size;
    let mut next = 0usize;
    let mut i = 1usize;
    while i < palette_size {
        match q.cut(&mut cube[next]) {
            Some(set2) => {
                cube[i] = set2;
                vv[next] = if cube[next].vol > 1 { q.variance(&cube[next]) } else { 0.0 };
                vv[i] = if cube[i].vol > 1 { q.variance(&cube[i]) } else { 0.0 };
            }
            None => {
                vv[next] = 0.0;
                i -= 1;
            }
        }

        next = 0;
        let mut temp = vv[0];
        for k in 1..=i {
            if vv[k] > temp {
                temp = vv[k];
                next = k;
            }
        }
        if temp <= 0.0 {
            palette_size = i + 1;
            break;
        }
        i += 1;
    }

    let mut tag = vec![0u8; SIZE_3D];
    let mut dst = Bitmap::new(src.width(), src.height(), 8)?;
    dst.clone_metadata_from(src);
    let pal = dst.palette_mut().expect("8 bpp bitmap has a palette").as_mut_slice();
    for k in 0..palette_size {
        WuQuantizer::mark(&cube[k], k as u8, &mut tag);
        let weight = WuQuantizer::vol(&q.wt, &cube[k]);
        if weight > 0 {
            pal[k] = Rgba8 {
                blue: (WuQuantizer::vol(&q.mb, &cube[k]) as f32 / weight as f32 + 0.5) as u8,
                green: (WuQuantizer::vol(&q.mg, &cube[k]) as f32 / weight as f32 + 0.5) as u8,
                red: (WuQuantizer::vol(&q.mr, &cube[k]) as f32 / weight as f32 + 0.5) as u8,
                alpha: 0,
            };
        }
    }

    for y in 0..src.height() {
        let dst_row = dst.scanline_mut(y);
        for x in 0..width {
            dst_row[x] = tag[q.qadd[y as usize * width + x] as usize];
        }
    }

    Ok(dst)
}
