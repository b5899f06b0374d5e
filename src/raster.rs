//! CPU raster helpers over `image::RgbImage`.
//!
//! Drawing primitives clip at the image bounds, so callers may pass
//! off-canvas geometry freely.

use image::{Rgb, RgbImage};

pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Vertical gradient darkening the base tint by up to 30% toward the bottom.
pub fn vertical_gradient(img: &mut RgbImage, base: [u8; 3]) {
    let height = img.height().max(1);
    for y in 0..img.height() {
        let ratio = y as f32 / height as f32;
        let scale = 1.0 - ratio * 0.3;
        let row = [
            (base[0] as f32 * scale) as u8,
            (base[1] as f32 * scale) as u8,
            (base[2] as f32 * scale) as u8,
        ];
        for x in 0..img.width() {
            img.put_pixel(x, y, Rgb(row));
        }
    }
}

pub fn fill_rect(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, fill: [u8; 3]) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let xa = x0.min(x1).clamp(0, w);
    let xb = x0.max(x1).clamp(0, w);
    let ya = y0.min(y1).clamp(0, h);
    let yb = y0.max(y1).clamp(0, h);
    for y in ya..yb {
        for x in xa..xb {
            img.put_pixel(x as u32, y as u32, Rgb(fill));
        }
    }
}

pub fn fill_ellipse(img: &mut RgbImage, cx: i32, cy: i32, rx: i32, ry: i32, fill: [u8; 3]) {
    if rx <= 0 || ry <= 0 {
        return;
    }
    let (w, h) = (img.width() as i32, img.height() as i32);
    let (rx2, ry2) = ((rx * rx) as i64, (ry * ry) as i64);
    for y in (cy - ry).max(0)..(cy + ry + 1).min(h) {
        for x in (cx - rx).max(0)..(cx + rx + 1).min(w) {
            let dx = (x - cx) as i64;
            let dy = (y - cy) as i64;
            if dx * dx * ry2 + dy * dy * rx2 <= rx2 * ry2 {
                img.put_pixel(x as u32, y as u32, Rgb(fill));
            }
        }
    }
}

pub fn fill_triangle(
    img: &mut RgbImage,
    p0: (i32, i32),
    p1: (i32, i32),
    p2: (i32, i32),
    fill: [u8; 3],
) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let min_x = p0.0.min(p1.0).min(p2.0).max(0);
    let max_x = p0.0.max(p1.0).max(p2.0).min(w - 1);
    let min_y = p0.1.min(p1.1).min(p2.1).max(0);
    let max_y = p0.1.max(p1.1).max(p2.1).min(h - 1);

    let edge = |a: (i32, i32), b: (i32, i32), p: (i32, i32)| -> i64 {
        (b.0 - a.0) as i64 * (p.1 - a.1) as i64 - (b.1 - a.1) as i64 * (p.0 - a.0) as i64
    };
    let area = edge(p0, p1, p2);
    if area == 0 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x, y);
            let e0 = edge(p0, p1, p);
            let e1 = edge(p1, p2, p);
            let e2 = edge(p2, p0, p);
            let inside = if area > 0 {
                e0 >= 0 && e1 >= 0 && e2 >= 0
            } else {
                e0 <= 0 && e1 <= 0 && e2 <= 0
            };
            if inside {
                img.put_pixel(x as u32, y as u32, Rgb(fill));
            }
        }
    }
}

/// Thick line drawn as stamped discs along the segment.
pub fn draw_line(
    img: &mut RgbImage,
    from: (i32, i32),
    to: (i32, i32),
    width: i32,
    fill: [u8; 3],
) {
    let dx = (to.0 - from.0) as f32;
    let dy = (to.1 - from.1) as f32;
    let steps = dx.abs().max(dy.abs()).max(1.0) as i32;
    let r = (width / 2).max(1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 + (dx * t) as i32;
        let y = from.1 + (dy * t) as i32;
        fill_ellipse(img, x, y, r, r, fill);
    }
}

/// Per-channel weighted blend: `out = (1-w)*a + w*b`.
pub fn blend_rgb(a: &RgbImage, b: &RgbImage, w: f32) -> RgbImage {
    let w = w.clamp(0.0, 1.0);
    let inv = 1.0 - w;
    let mut out = a.clone();
    for (dst, src) in out.pixels_mut().zip(b.pixels()) {
        for c in 0..3 {
            dst.0[c] = (dst.0[c] as f32 * inv + src.0[c] as f32 * w).round() as u8;
        }
    }
    out
}

pub fn adjust_brightness(img: &mut RgbImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px.0[c] = (px.0[c] as f32 * factor).clamp(0.0, 255.0) as u8;
        }
    }
}

pub fn adjust_contrast(img: &mut RgbImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in 0..3 {
            let v = (px.0[c] as f32 - 128.0) * factor + 128.0;
            px.0[c] = v.clamp(0.0, 255.0) as u8;
        }
    }
}

/// Scales each pixel's distance from its own luma. Factor 1.0 is identity,
/// 0.0 is grayscale.
pub fn adjust_saturation(img: &mut RgbImage, factor: f32) {
    for px in img.pixels_mut() {
        let luma =
            0.299 * px.0[0] as f32 + 0.587 * px.0[1] as f32 + 0.114 * px.0[2] as f32;
        for c in 0..3 {
            let v = luma + (px.0[c] as f32 - luma) * factor;
            px.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Signed per-channel shift, saturating at the value range.
pub fn shift_channels(img: &mut RgbImage, dr: i16, dg: i16, db: i16) {
    for px in img.pixels_mut() {
        px.0[0] = (px.0[0] as i16 + dr).clamp(0, 255) as u8;
        px.0[1] = (px.0[1] as i16 + dg).clamp(0, 255) as u8;
        px.0[2] = (px.0[2] as i16 + db).clamp(0, 255) as u8;
    }
}

/// Additively brightens a small disc, used for particle dots.
pub fn add_glow_dot(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, add: [i16; 3]) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let r2 = (radius * radius) as i64;
    for y in (cy - radius).max(0)..(cy + radius + 1).min(h) {
        for x in (cx - radius).max(0)..(cx + radius + 1).min(w) {
            let dx = (x - cx) as i64;
            let dy = (y - cy) as i64;
            if dx * dx + dy * dy <= r2 {
                let px = img.get_pixel_mut(x as u32, y as u32);
                px.0[0] = (px.0[0] as i16 + add[0]).clamp(0, 255) as u8;
                px.0[1] = (px.0[1] as i16 + add[1]).clamp(0, 255) as u8;
                px.0[2] = (px.0[2] as i16 + add[2]).clamp(0, 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints_return_inputs() {
        let a = solid(4, 4, [10, 20, 30]);
        let b = solid(4, 4, [200, 210, 220]);
        assert_eq!(blend_rgb(&a, &b, 0.0), a);
        assert_eq!(blend_rgb(&a, &b, 1.0), b);
    }

    #[test]
    fn blend_midpoint_averages_channels() {
        let a = solid(1, 1, [0, 0, 0]);
        let b = solid(1, 1, [100, 200, 50]);
        let mid = blend_rgb(&a, &b, 0.5);
        assert_eq!(mid.get_pixel(0, 0).0, [50, 100, 25]);
    }

    #[test]
    fn primitives_clip_at_bounds() {
        let mut img = solid(8, 8, [0, 0, 0]);
        fill_ellipse(&mut img, -10, -10, 4, 4, [255, 0, 0]);
        fill_rect(&mut img, 6, 6, 20, 20, [0, 255, 0]);
        fill_triangle(&mut img, (-5, 0), (12, -3), (4, 15), [0, 0, 255]);
        draw_line(&mut img, (-4, 4), (12, 4), 2, [255, 255, 0]);
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 8);
    }

    #[test]
    fn gradient_darkens_toward_bottom() {
        let mut img = solid(2, 10, [0, 0, 0]);
        vertical_gradient(&mut img, [200, 100, 50]);
        let top = img.get_pixel(0, 0).0;
        let bottom = img.get_pixel(0, 9).0;
        assert!(bottom[0] < top[0]);
        assert!(bottom[1] < top[1]);
    }

    #[test]
    fn saturation_zero_is_grayscale() {
        let mut img = solid(1, 1, [250, 10, 10]);
        adjust_saturation(&mut img, 0.0);
        let px = img.get_pixel(0, 0).0;
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn saturation_one_is_identity() {
        let mut img = solid(1, 1, [250, 10, 10]);
        adjust_saturation(&mut img, 1.0);
        assert_eq!(img.get_pixel(0, 0).0, [250, 10, 10]);
    }
}
