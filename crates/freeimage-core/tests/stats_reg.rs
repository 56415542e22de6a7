//! Pixel statistics regression test
//!
//! # See also
//!
//! C FreeImage: `FindMinMax()` / `FindMinMaxValue()` / `Fill()` in
//! `SimpleTools.cpp` and `ToneMapping.cpp` helpers

use freeimage_core::{Bitmap, ImageType, Rgb8, luma_jpeg};
use freeimage_test::{RegParams, color_gradient, float_gradient, grey_gradient};

#[test]
fn stats_reg() {
    let mut rp = RegParams::new("stats");

    // ==========================================================
    // Test: float ramp reports exact extrema and positions
    // ==========================================================
    let ramp = float_gradient(32, 2, -1.0, 3.0).unwrap();
    let mm = ramp.find_min_max().unwrap();
    rp.compare_values(-1.0, mm.min, 1e-6);
    rp.compare_values(3.0, mm.max, 1e-6);
    rp.compare_values(0.0, mm.min_pos.0 as f64, 0.0);
    rp.compare_values(0.0, mm.min_pos.1 as f64, 0.0);
    rp.compare_values(31.0, mm.max_pos.0 as f64, 0.0);
    // the ramp repeats on row 1, first occurrence wins
    rp.compare_values(0.0, mm.max_pos.1 as f64, 0.0);

    // ==========================================================
    // Test: 8 bpp greyscale extrema
    // ==========================================================
    let grey = grey_gradient(32, 2).unwrap();
    let mm = grey.find_min_max().unwrap();
    rp.compare_values(0.0, mm.min, 0.0);
    rp.compare_values(grey.scanline(0)[31] as f64, mm.max, 0.0);

    // ==========================================================
    // Test: color brightness follows the JPEG luma
    // ==========================================================
    let color = color_gradient(32, 8).unwrap();
    let mm = color.find_min_max().unwrap();
    let darkest = &color.scanline(0)[0..3];
    let brightest = &color.scanline(7)[31 * 3..31 * 3 + 3];
    rp.compare_values(
        luma_jpeg(darkest[2] as f64, darkest[1] as f64, darkest[0] as f64),
        mm.min,
        1e-6,
    );
    rp.compare_values(
        luma_jpeg(brightest[2] as f64, brightest[1] as f64, brightest[0] as f64),
        mm.max,
        1e-6,
    );
    rp.compare_values(31.0, mm.max_pos.0 as f64, 0.0);
    rp.compare_values(7.0, mm.max_pos.1 as f64, 0.0);

    // ==========================================================
    // Test: NaN samples are skipped
    // ==========================================================
    let mut with_nan = float_gradient(8, 1, 0.0, 1.0).unwrap();
    with_nan.scanline_mut(0)[0..4].copy_from_slice(bytemuck::bytes_of(&f32::NAN));
    let mm = with_nan.find_min_max().unwrap();
    let second = 1.0 / 7.0;
    rp.compare_values(second, mm.min, 1e-6);
    rp.compare_values(1.0, mm.max, 1e-6);
    rp.compare_values(1.0, mm.min_pos.0 as f64, 0.0);

    // ==========================================================
    // Test: a single pixel is both extrema
    // ==========================================================
    let mut lone = Bitmap::with_type(ImageType::Float, 1, 1).unwrap();
    lone.fill(&0.75f32.to_le_bytes()).unwrap();
    let mm = lone.find_min_max().unwrap();
    rp.compare_values(0.75, mm.min, 1e-6);
    rp.compare_values(0.75, mm.max, 1e-6);
    rp.compare_values(0.0, mm.min_pos.0 as f64, 0.0);
    rp.compare_values(0.0, mm.max_pos.1 as f64, 0.0);

    // ==========================================================
    // Test: per-channel extrema through the typed scan
    // ==========================================================
    let (min, max) = color.find_min_max_value::<Rgb8>().unwrap();
    rp.compare_values(0.0, min.red as f64, 0.0);
    rp.compare_values(64.0, min.blue as f64, 0.0);
    rp.compare_values(64.0, max.blue as f64, 0.0);
    rp.compare_values((31 * 255 / 32) as f64, max.red as f64, 0.0);
    rp.compare_values((7 * 255 / 8) as f64, max.green as f64, 0.0);

    // ==========================================================
    // Test: fill stamps a whole-pixel pattern
    // ==========================================================
    let mut canvas = Bitmap::new(3, 2, 24).unwrap();
    canvas.fill(&[9, 8, 7]).unwrap();
    rp.compare_values(9.0, canvas.scanline(1)[6] as f64, 0.0);
    rp.compare_values(7.0, canvas.scanline(0)[2] as f64, 0.0);

    let mut float_canvas = Bitmap::with_type(ImageType::Float, 2, 2).unwrap();
    float_canvas.fill(&2.5f32.to_le_bytes()).unwrap();
    let v: f32 = bytemuck::pod_read_unaligned(&float_canvas.scanline(1)[4..8]);
    rp.compare_values(2.5, v as f64, 0.0);

    // a value that is not a whole pixel is rejected
    rp.compare_values(1.0, canvas.fill(&[1, 2]).is_err() as i32 as f64, 0.0);

    assert!(rp.cleanup(), "stats_reg statistics tests failed");
}
