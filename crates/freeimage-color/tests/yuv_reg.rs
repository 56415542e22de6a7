//! RGB <-> YUV conversion regression test
//!
//! # See also
//!
//! C FreeImage: `FreeImage_ConvertRgbToYuv()` / `FreeImage_ConvertYuvToRgb()`
//! in `ConversionYUV.cpp`

use freeimage_color::{YuvStandard, convert_rgb_to_yuv, convert_to_color, convert_yuv_to_rgb, rgb_to_yuv8};
use freeimage_core::{ColorEncoding, ColorType};
use freeimage_test::{RegParams, color_gradient, hdr_gradient};

#[test]
fn yuv_reg() {
    let mut rp = RegParams::new("yuv");

    // ==========================================================
    // Test: 24 bpp conversion stores Y in the red slot and tags
    // ==========================================================
    let src = color_gradient(32, 16).unwrap();
    let yuv = convert_rgb_to_yuv(&src, YuvStandard::Jpeg).unwrap();
    rp.compare_values(1.0, (yuv.encoding() == ColorEncoding::Yuv) as i32 as f64, 0.0);
    rp.compare_values(1.0, (yuv.color_type() == ColorType::Yuv) as i32 as f64, 0.0);

    let (x, y) = (11usize, 5u32);
    let s = &src.scanline(y)[x * 3..x * 3 + 3];
    let (ey, eu, ev) = rgb_to_yuv8(s[2], s[1], s[0]);
    let d = &yuv.scanline(y)[x * 3..x * 3 + 3];
    rp.compare_values(ey as f64, d[2] as f64, 0.0);
    rp.compare_values(eu as f64, d[1] as f64, 0.0);
    rp.compare_values(ev as f64, d[0] as f64, 0.0);

    // ==========================================================
    // Test: integer roundtrip stays within 2 per channel
    // ==========================================================
    let back = convert_yuv_to_rgb(&yuv, YuvStandard::Jpeg).unwrap();
    rp.compare_values(1.0, (back.encoding() == ColorEncoding::Rgb) as i32 as f64, 0.0);
    let mut bad = 0u32;
    for row in 0..src.height() {
        let a = src.scanline(row);
        let b = back.scanline(row);
        for i in 0..src.width() as usize * 3 {
            if (a[i] as i32 - b[i] as i32).abs() > 2 {
                bad += 1;
            }
        }
    }
    rp.compare_values(0.0, bad as f64, 0.0);

    // ==========================================================
    // Test: 32 bpp conversion keeps the alpha channel
    // ==========================================================
    let mut rgba = src.convert_to_32_bits().unwrap();
    rgba.scanline_mut(3)[7 * 4 + 3] = 99;
    let yuva = convert_rgb_to_yuv(&rgba, YuvStandard::Jpeg).unwrap();
    rp.compare_values(99.0, yuva.scanline(3)[7 * 4 + 3] as f64, 0.0);

    // ==========================================================
    // Test: float conversion roundtrips almost exactly
    // ==========================================================
    let hdr = hdr_gradient(16, 4, 2.0).unwrap();
    let yuv_f = convert_rgb_to_yuv(&hdr, YuvStandard::Jpeg).unwrap();
    let back_f = convert_yuv_to_rgb(&yuv_f, YuvStandard::Jpeg).unwrap();
    let mut worst = 0.0f64;
    for row in 0..hdr.height() {
        let a = hdr.scanline(row);
        let b = back_f.scanline(row);
        for i in 0..hdr.width() as usize * 3 {
            let va: f32 = bytemuck::pod_read_unaligned(&a[i * 4..i * 4 + 4]);
            let vb: f32 = bytemuck::pod_read_unaligned(&b[i * 4..i * 4 + 4]);
            worst = worst.max((va as f64 - vb as f64).abs());
        }
    }
    rp.compare_values(0.0, worst, 1e-5);

    // ==========================================================
    // Test: convert_to_color dispatches on source and target
    // ==========================================================
    let via = convert_to_color(&src, ColorType::Yuv, YuvStandard::Jpeg).unwrap();
    rp.compare_bitmaps(&yuv, &via);
    let and_back = convert_to_color(&via, ColorType::Rgb, YuvStandard::Jpeg).unwrap();
    rp.compare_bitmaps(&back, &and_back);

    let rejected = convert_to_color(&src, ColorType::Rgb, YuvStandard::Jpeg).is_err();
    rp.compare_values(1.0, rejected as i32 as f64, 0.0);

    assert!(rp.cleanup(), "yuv_reg color space conversion tests failed");
}
