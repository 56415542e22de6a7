//! Typed scanline iteration
//!
//! The two functions here are the engine behind every whole-image
//! operation on non-packed depths: a read-only visitor walk and a
//! per-pixel unary transform. Both walk rows by pitch so the padding
//! bytes at the end of each scanline are never touched.
//!
//! Pixel reads and writes go through [`bytemuck`] copies, so the pixel
//! structs need no alignment guarantee from the row buffers.
//!
//! # See also
//!
//! C FreeImage: `BitmapForEach()`, `BitmapTransform()` in `SimpleTools.h`

use crate::bitmap::Bitmap;
use crate::pixel::Pixel;

/// Visit every pixel of `src` in row-major order as `(pixel, x, y)`.
///
/// An empty bitmap is visited zero times.
///
/// # Panics
///
/// Panics if `size_of::<P>()` does not match the bitmap depth. Packed
/// sub-byte depths cannot be walked this way.
pub fn for_each_pixel<P, F>(src: &Bitmap, mut visitor: F)
where
    P: Pixel,
    F: FnMut(P, u32, u32),
{
    let size = size_of::<P>();
    assert_eq!(
        size as u32 * 8,
        src.bpp(),
        "pixel type does not match bitmap depth"
    );

    for y in 0..src.height() {
        let row = src.scanline(y);
        for x in 0..src.width() as usize {
            let p: P = bytemuck::pod_read_unaligned(&row[x * size..(x + 1) * size]);
            visitor(p, x as u32, y);
        }
    }
}

/// Map every pixel of `src` through `op` into `dst`.
///
/// A 0x0 pair transforms successfully without touching memory.
///
/// # Panics
///
/// Panics if the dimensions differ or if the pixel type sizes do not
/// match the respective bitmap depths. These are programmer errors;
/// memory is never corrupted.
pub fn transform<D, S, F>(dst: &mut Bitmap, src: &Bitmap, mut op: F)
where
    D: Pixel,
    S: Pixel,
    F: FnMut(S) -> D,
{
    assert_eq!(
        (src.width(), src.height()),
        (dst.width(), dst.height()),
        "transform dimensions must match"
    );
    let src_size = size_of::<S>();
    let dst_size = size_of::<D>();
    assert_eq!(
        src_size as u32 * 8,
        src.bpp(),
        "source pixel type does not match bitmap depth"
    );
    assert_eq!(
        dst_size as u32 * 8,
        dst.bpp(),
        "destination pixel type does not match bitmap depth"
    );

    for y in 0..src.height() {
        let src_row = src.scanline(y);
        let dst_row = dst.scanline_mut(y);
        for x in 0..src.width() as usize {
            let s: S = bytemuck::pod_read_unaligned(&src_row[x * src_size..(x + 1) * src_size]);
            let d = op(s);
            dst_row[x * dst_size..(x + 1) * dst_size].copy_from_slice(bytemuck::bytes_of(&d));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{ImageType, Rgb8, Rgba8};

    #[test]
    fn test_transform_widens_pixels() {
        let mut src = Bitmap::new(3, 2, 24).unwrap();
        for y in 0..2 {
            let row = src.scanline_mut(y);
            for x in 0..3usize {
                row[x * 3] = (10 * x) as u8;
                row[x * 3 + 1] = (10 * x + 1) as u8;
                row[x * 3 + 2] = (10 * x + 2) as u8;
            }
        }

        let mut dst = Bitmap::new(3, 2, 32).unwrap();
        transform::<Rgba8, Rgb8, _>(&mut dst, &src, |p| Rgba8 {
            blue: p.blue,
            green: p.green,
            red: p.red,
            alpha: 255,
        });

        let row = dst.scanline(1);
        assert_eq!(&row[4..8], &[10, 11, 12, 255]);
    }

    #[test]
    fn test_transform_empty_bitmap() {
        let src = Bitmap::with_type(ImageType::Float, 0, 0).unwrap();
        let mut dst = Bitmap::new(0, 0, 8).unwrap();
        let mut calls = 0;
        transform::<u8, f32, _>(&mut dst, &src, |v| {
            calls += 1;
            v as u8
        });
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_for_each_visits_in_row_major_order() {
        let src = Bitmap::new(2, 2, 32).unwrap();
        let mut seen = Vec::new();
        for_each_pixel::<Rgba8, _>(&src, |_, x, y| seen.push((x, y)));
        assert_eq!(seen, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    #[should_panic(expected = "pixel type does not match bitmap depth")]
    fn test_for_each_rejects_wrong_pixel_size() {
        let src = Bitmap::new(2, 2, 24).unwrap();
        for_each_pixel::<Rgba8, _>(&src, |_, _, _| {});
    }
}
