//! Wu color quantization regression test
//!
//! # See also
//!
//! C FreeImage: `WuQuantizer` in `WuQuantizer.cpp`

use freeimage_color::{WuQuantizeOptions, wu_quantize};
use freeimage_core::{Bitmap, Rgba8};
use freeimage_test::{RegParams, color_gradient};

fn resolve(quantized: &Bitmap, x: usize, y: u32) -> Rgba8 {
    let index = quantized.scanline(y)[x] as usize;
    quantized
        .palette()
        .unwrap()
        .get(index)
        .unwrap_or_default()
}

#[test]
fn colorquant_reg() {
    let mut rp = RegParams::new("colorquant");

    // ==========================================================
    // Test: an image of two colors quantizes losslessly
    // ==========================================================
    let mut two = Bitmap::new(8, 2, 24).unwrap();
    for x in 0..8usize {
        let color: [u8; 3] = if x < 4 { [10, 200, 30] } else { [240, 16, 99] };
        two.scanline_mut(0)[x * 3..x * 3 + 3].copy_from_slice(&color);
        two.scanline_mut(1)[x * 3..x * 3 + 3].copy_from_slice(&color);
    }
    let options = WuQuantizeOptions { palette_size: 2, ..Default::default() };
    let quantized = wu_quantize(&two, &options).unwrap();
    rp.compare_values(8.0, quantized.bpp() as f64, 0.0);

    let left = resolve(&quantized, 0, 0);
    let right = resolve(&quantized, 7, 1);
    rp.compare_values(10.0, left.blue as f64, 0.0);
    rp.compare_values(200.0, left.green as f64, 0.0);
    rp.compare_values(30.0, left.red as f64, 0.0);
    rp.compare_values(240.0, right.blue as f64, 0.0);
    rp.compare_values(99.0, right.red as f64, 0.0);

    // ==========================================================
    // Test: three colors survive a larger palette unchanged
    // ==========================================================
    let colors: [[u8; 3]; 3] = [[10, 200, 30], [240, 16, 99], [77, 77, 77]];
    let mut three = Bitmap::new(4, 4, 24).unwrap();
    for y in 0..4 {
        let row = three.scanline_mut(y);
        for x in 0..4usize {
            row[x * 3..x * 3 + 3].copy_from_slice(&colors[(x + y as usize) % 3]);
        }
    }
    let options = WuQuantizeOptions { palette_size: 8, ..Default::default() };
    let quantized = wu_quantize(&three, &options).unwrap();
    let mut exact = 0;
    for y in 0..4 {
        let row = three.scanline(y);
        for x in 0..4usize {
            let q = resolve(&quantized, x, y);
            if row[x * 3..x * 3 + 3] == [q.blue, q.green, q.red] {
                exact += 1;
            }
        }
    }
    rp.compare_values(16.0, exact as f64, 0.0);

    // ==========================================================
    // Test: a full palette keeps a smooth gradient close
    // ==========================================================
    let gradient = color_gradient(32, 16).unwrap();
    let quantized = wu_quantize(&gradient, &WuQuantizeOptions::default()).unwrap();

    let mut total_error = 0u64;
    let mut samples = 0u64;
    for y in 0..gradient.height() {
        let row = gradient.scanline(y);
        for x in 0..gradient.width() as usize {
            let q = resolve(&quantized, x, y);
            let s = &row[x * 3..x * 3 + 3];
            total_error += (q.blue as i64 - s[0] as i64).unsigned_abs();
            total_error += (q.green as i64 - s[1] as i64).unsigned_abs();
            total_error += (q.red as i64 - s[2] as i64).unsigned_abs();
            samples += 3;
        }
    }
    let mean_error = total_error as f64 / samples as f64;
    rp.compare_values(0.0, mean_error, 8.0);

    // ==========================================================
    // Test: reserved colors get a palette slot of their own
    // ==========================================================
    let reserved = Rgba8 { blue: 1, green: 2, red: 3, alpha: 0 };
    let options = WuQuantizeOptions {
        palette_size: 16,
        reserve_palette: vec![reserved],
    };
    let quantized = wu_quantize(&gradient, &options).unwrap();
    let found = quantized
        .palette()
        .unwrap()
        .as_slice()
        .iter()
        .any(|e| e.red == 3 && e.green == 2 && e.blue == 1);
    rp.compare_values(1.0, found as i32 as f64, 0.0);

    // ==========================================================
    // Test: a flat image maps every pixel to its exact color
    // ==========================================================
    let mut flat = Bitmap::new(4, 4, 24).unwrap();
    flat.fill(&[90, 120, 150]).unwrap();
    let quantized = wu_quantize(&flat, &WuQuantizeOptions::default()).unwrap();
    let p = resolve(&quantized, 2, 2);
    rp.compare_values(90.0, p.blue as f64, 0.0);
    rp.compare_values(120.0, p.green as f64, 0.0);
    rp.compare_values(150.0, p.red as f64, 0.0);

    // ==========================================================
    // Test: alpha is ignored, 32 bpp input matches its 24 bpp twin
    // ==========================================================
    let rgba = gradient.convert_to_32_bits().unwrap();
    let from_32 = wu_quantize(&rgba, &WuQuantizeOptions::default()).unwrap();
    let from_24 = wu_quantize(&gradient, &WuQuantizeOptions::default()).unwrap();
    rp.compare_bitmaps(&from_24, &from_32);

    // ==========================================================
    // Test: metadata travels with the quantization
    // ==========================================================
    let mut tagged = color_gradient(8, 8).unwrap();
    tagged.metadata_mut().set("Comment", "ramp");
    let quantized = wu_quantize(&tagged, &WuQuantizeOptions::default()).unwrap();
    let kept = quantized.metadata().get("Comment") == Some("ramp");
    rp.compare_values(1.0, kept as i32 as f64, 0.0);

    assert!(rp.cleanup(), "colorquant_reg quantization tests failed");
}
