//! Single-image motion simulation, used when interpolation has only one key
//! image to work with.
//!
//! All resampling clamps at the source edges, so sub-unit zoom factors and
//! off-canvas offsets never introduce borders.

use image::{imageops, RgbImage};

use crate::{
    keywords::ActionCategory,
    raster::{adjust_brightness, adjust_saturation, blend_rgb},
};

use std::f32::consts::TAU;

const SWING_MAX_DEG: f32 = 15.0;
const SWING_BLUR_THRESHOLD_DEG: f32 = 5.0;
const BOB_AMPLITUDE_PX: f32 = 3.0;
const BREATH_AMPLITUDE: f32 = 0.02;

/// Synthesizes apparent motion for one frame at `progress` in `[0,1]`.
///
/// The action-specific step runs first; the subtle breathing zoom always
/// runs last so every frame shows at least a little movement, recognized
/// action or not.
pub fn simulate_motion(image: &RgbImage, progress: f32, action: ActionCategory) -> RgbImage {
    let mut out = match action {
        ActionCategory::Cutting | ActionCategory::Fighting => swing(image, progress),
        ActionCategory::Walking => bob(image, progress),
        ActionCategory::Jumping => jump(image, progress),
        ActionCategory::Dancing | ActionCategory::Waving => sway(image, progress),
        ActionCategory::Eating | ActionCategory::Other => image.clone(),
    };

    let scale = 1.0 + (progress * TAU).sin() * BREATH_AMPLITUDE;
    out = zoom_centered(&out, scale);
    out
}

/// Pendulum swing: rotation by `sin(progress·2π)·15°`, with blur mixed in
/// proportionally once the angle passes the threshold.
fn swing(image: &RgbImage, progress: f32) -> RgbImage {
    let angle_deg = (progress * TAU).sin() * SWING_MAX_DEG;
    let mut out = rotate_about_center(image, angle_deg.to_radians());
    let excess = angle_deg.abs() - SWING_BLUR_THRESHOLD_DEG;
    if excess > 0.0 {
        let blurred = imageops::blur(&out, 1.5);
        let weight = (excess / (SWING_MAX_DEG - SWING_BLUR_THRESHOLD_DEG)).clamp(0.0, 1.0);
        out = blend_rgb(&out, &blurred, weight);
    }
    out
}

/// Vertical bob at three cycles per sequence with a light blur.
fn bob(image: &RgbImage, progress: f32) -> RgbImage {
    let dy = ((progress * 3.0 * TAU).sin() * BOB_AMPLITUDE_PX).round() as i32;
    let out = translate(image, 0, dy);
    imageops::blur(&out, 0.6)
}

/// Parabolic lift peaking at mid-sequence, brightened near the peak.
fn jump(image: &RgbImage, progress: f32) -> RgbImage {
    let height = -4.0 * (progress - 0.5).powi(2) + 1.0;
    let lift_px = (height * image.height() as f32 * 0.05) as i32;
    let mut out = translate(image, 0, -lift_px);
    if height > 0.7 {
        adjust_brightness(&mut out, 1.0 + (height - 0.7) * 0.3);
    }
    out
}

/// Sinusoidal horizontal sway driving a saturation boost.
fn sway(image: &RgbImage, progress: f32) -> RgbImage {
    let dx = ((progress * 2.0 * TAU).sin() * 4.0).round() as i32;
    let mut out = translate(image, dx, 0);
    adjust_saturation(&mut out, 1.0 + 0.3 * (progress * TAU).sin().abs());
    out
}

/// Offset copy with clamped edge sampling.
pub fn translate(image: &RgbImage, dx: i32, dy: i32) -> RgbImage {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let mut out = RgbImage::new(image.width(), image.height());
    for y in 0..h {
        for x in 0..w {
            let sx = (x - dx).clamp(0, w - 1) as u32;
            let sy = (y - dy).clamp(0, h - 1) as u32;
            out.put_pixel(x as u32, y as u32, *image.get_pixel(sx, sy));
        }
    }
    out
}

/// Nearest-neighbor rotation about the image center, clamped at the edges.
pub fn rotate_about_center(image: &RgbImage, radians: f32) -> RgbImage {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let (sin, cos) = radians.sin_cos();
    let mut out = RgbImage::new(image.width(), image.height());
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            // Inverse mapping: destination pixel pulled from the source.
            let sx = (cx + dx * cos + dy * sin).round() as i32;
            let sy = (cy - dx * sin + dy * cos).round() as i32;
            let sx = sx.clamp(0, w - 1) as u32;
            let sy = sy.clamp(0, h - 1) as u32;
            out.put_pixel(x as u32, y as u32, *image.get_pixel(sx, sy));
        }
    }
    out
}

/// Center-anchored zoom by bilinear resampling; handles factors below 1
/// without introducing borders. Bilinear matters here: the breathing zoom
/// works in sub-pixel offsets, and nearest-neighbor would round them away
/// on small frames, leaving the output bit-identical.
pub fn zoom_centered(image: &RgbImage, scale: f32) -> RgbImage {
    if !scale.is_finite() || scale <= 0.0 || (scale - 1.0).abs() < 1e-4 {
        return image.clone();
    }
    let (w, h) = (image.width() as i32, image.height() as i32);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let mut out = RgbImage::new(image.width(), image.height());
    for y in 0..h {
        for x in 0..w {
            let sx = cx + (x as f32 - cx) / scale;
            let sy = cy + (y as f32 - cy) / scale;
            out.put_pixel(x as u32, y as u32, sample_bilinear(image, sx, sy));
        }
    }
    out
}

/// Bilinear sample with clamped edges.
fn sample_bilinear(image: &RgbImage, sx: f32, sy: f32) -> image::Rgb<u8> {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let x0 = sx.floor() as i32;
    let y0 = sy.floor() as i32;
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let at = |x: i32, y: i32| *image.get_pixel(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32);
    let p00 = at(x0, y0);
    let p10 = at(x0 + 1, y0);
    let p01 = at(x0, y0 + 1);
    let p11 = at(x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00.0[c] as f32 * (1.0 - fx) + p10.0[c] as f32 * fx;
        let bottom = p01.0[c] as f32 * (1.0 - fx) + p11.0[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    image::Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::solid;
    use image::Rgb;

    fn gradient_fixture(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 99]))
    }

    #[test]
    fn motion_preserves_dimensions_for_every_action() {
        let img = gradient_fixture(24, 24);
        for action in [
            ActionCategory::Cutting,
            ActionCategory::Walking,
            ActionCategory::Jumping,
            ActionCategory::Dancing,
            ActionCategory::Fighting,
            ActionCategory::Eating,
            ActionCategory::Waving,
            ActionCategory::Other,
        ] {
            let out = simulate_motion(&img, 0.37, action);
            assert_eq!(out.dimensions(), img.dimensions());
        }
    }

    #[test]
    fn every_frame_moves_even_without_a_recognized_action() {
        let img = gradient_fixture(32, 32);
        let out = simulate_motion(&img, 0.25, ActionCategory::Other);
        assert_ne!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn translate_clamps_at_edges() {
        let img = gradient_fixture(8, 8);
        let out = translate(&img, 100, -100);
        assert_eq!(out.dimensions(), (8, 8));
        // Fully shifted out: every pixel samples the clamped corner.
        assert_eq!(out.get_pixel(0, 0), out.get_pixel(7, 7));
    }

    #[test]
    fn zoom_scale_one_is_identity() {
        let img = gradient_fixture(16, 16);
        assert_eq!(zoom_centered(&img, 1.0).as_raw(), img.as_raw());
    }

    #[test]
    fn zoom_below_one_keeps_dimensions() {
        let img = solid(16, 16, [50, 60, 70]);
        let out = zoom_centered(&img, 0.98);
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn breathing_zoom_shifts_even_small_frames() {
        let img = gradient_fixture(32, 32);
        let out = zoom_centered(&img, 1.02);
        assert_eq!(out.dimensions(), (32, 32));
        assert_ne!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn rotation_by_zero_is_identity() {
        let img = gradient_fixture(12, 12);
        assert_eq!(rotate_about_center(&img, 0.0).as_raw(), img.as_raw());
    }
}
