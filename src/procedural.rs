//! Procedural placeholder synthesis: the last rung of the image-source
//! chain, defined to always return a valid image.
//!
//! The scene is a pure function of `(prompt, dims, seed)`: the color table
//! picks a tint, the object table picks shape primitives, and the seeded RNG
//! places the decorative highlights.

use image::RgbImage;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::warn;

use crate::{
    error::{VidsmithError, VidsmithResult},
    keywords::{base_tint, detect_objects, ObjectKind},
    overlay,
    raster::{
        draw_line, fill_ellipse, fill_rect, fill_triangle, solid, vertical_gradient,
    },
};

const HIGHLIGHT_COUNT: usize = 8;

/// Renders a placeholder scene for the prompt. Never fails: a scene error
/// degrades to a text card, and a text card error degrades to a solid tint.
pub fn synthesize(prompt: &str, dims: (u32, u32), seed: u64) -> RgbImage {
    let tint = base_tint(prompt);
    match draw_scene(prompt, dims, seed, tint) {
        Ok(img) => img,
        Err(err) => {
            warn!(error = %err, "procedural scene failed, falling back to text card");
            match text_card(prompt, dims, tint) {
                Ok(img) => img,
                Err(err) => {
                    warn!(error = %err, "text card failed, falling back to solid tint");
                    solid(dims.0.max(1), dims.1.max(1), tint)
                }
            }
        }
    }
}

fn draw_scene(prompt: &str, dims: (u32, u32), seed: u64, tint: [u8; 3]) -> VidsmithResult<RgbImage> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return Err(VidsmithError::synthesis("scene dims must be non-zero"));
    }

    let mut img = solid(w, h, tint);
    vertical_gradient(&mut img, tint);

    for kind in detect_objects(prompt) {
        if let Err(err) = draw_object(&mut img, kind) {
            warn!(error = %err, ?kind, "object primitive failed, substituting generic shape");
            draw_object(&mut img, ObjectKind::Generic).ok();
        }
    }

    add_highlights(&mut img, seed);
    Ok(img)
}

fn draw_object(img: &mut RgbImage, kind: ObjectKind) -> VidsmithResult<()> {
    match kind {
        ObjectKind::Cat => draw_cat(img),
        ObjectKind::Dog => draw_dog(img),
        ObjectKind::Tree => draw_tree(img),
        ObjectKind::Sun => draw_sun(img),
        ObjectKind::House => draw_house(img),
        ObjectKind::Mountain => draw_mountain(img),
        ObjectKind::Generic => draw_generic(img),
    }
    Ok(())
}

/// Geometry below is authored against a 512px canvas and scaled.
fn px(width: u32, v: i32) -> i32 {
    (v as f32 * width as f32 / 512.0).round() as i32
}

fn draw_cat(img: &mut RgbImage) {
    let w = img.width();
    let (cx, cy) = (w as i32 / 2, img.height() as i32 / 2);
    let s = |v| px(w, v);

    fill_ellipse(img, cx, cy + s(20), s(60), s(40), [80, 80, 80]);
    fill_ellipse(img, cx, cy - s(30), s(50), s(50), [90, 90, 90]);
    // Ears.
    fill_triangle(
        img,
        (cx - s(30), cy - s(60)),
        (cx - s(55), cy - s(80)),
        (cx - s(18), cy - s(75)),
        [100, 100, 100],
    );
    fill_triangle(
        img,
        (cx + s(30), cy - s(60)),
        (cx + s(55), cy - s(80)),
        (cx + s(18), cy - s(75)),
        [100, 100, 100],
    );
    // Eyes and nose.
    fill_ellipse(img, cx - s(20), cy - s(45), s(5), s(5), [0, 255, 0]);
    fill_ellipse(img, cx + s(20), cy - s(45), s(5), s(5), [0, 255, 0]);
    fill_triangle(
        img,
        (cx, cy - s(35)),
        (cx - s(5), cy - s(25)),
        (cx + s(5), cy - s(25)),
        [255, 192, 203],
    );
    // Tail, stamped along a half circle.
    let (tx, ty, tr) = (cx + s(75), cy + s(15), s(25));
    for step in 0..=12 {
        let a = std::f32::consts::PI * step as f32 / 12.0;
        let x = tx + (tr as f32 * a.cos()) as i32;
        let y = ty + (tr as f32 * a.sin()) as i32;
        fill_ellipse(img, x, y, s(4).max(1), s(4).max(1), [80, 80, 80]);
    }
}

fn draw_dog(img: &mut RgbImage) {
    let w = img.width();
    let (cx, cy) = (w as i32 / 2, img.height() as i32 / 2);
    let s = |v| px(w, v);

    fill_ellipse(img, cx, cy + s(40), s(60), s(40), [139, 69, 19]);
    fill_ellipse(img, cx, cy - s(20), s(40), s(40), [160, 82, 45]);
    fill_ellipse(img, cx - s(35), cy - s(25), s(15), s(15), [101, 67, 33]);
    fill_ellipse(img, cx + s(35), cy - s(25), s(15), s(15), [101, 67, 33]);
    fill_ellipse(img, cx - s(15), cy - s(25), s(5), s(5), [0, 0, 0]);
    fill_ellipse(img, cx + s(15), cy - s(25), s(5), s(5), [0, 0, 0]);
    fill_ellipse(img, cx, cy - s(5), s(5), s(5), [0, 0, 0]);
}

fn draw_tree(img: &mut RgbImage) {
    let w = img.width();
    let cx = w as i32 / 2;
    let ground = img.height() as i32 - px(w, 50);
    let s = |v| px(w, v);

    fill_rect(img, cx - s(10), ground - s(100), cx + s(10), ground, [101, 67, 33]);

    let crown_colors = [[34u8, 139, 34], [50, 205, 50], [0, 128, 0]];
    for (i, color) in crown_colors.iter().enumerate() {
        let radius = s(50 - i as i32 * 10);
        let offset = s(15 * i as i32);
        fill_ellipse(img, cx, ground - s(100) + offset, radius, radius, *color);
    }
}

fn draw_sun(img: &mut RgbImage) {
    let w = img.width();
    let (sx, sy) = (w as i32 - px(w, 100), px(w, 100));
    let radius = px(w, 40);
    let ray = px(w, 20);

    for step in 0..8 {
        let a = std::f32::consts::TAU * step as f32 / 8.0;
        let from = (
            sx + ((radius + px(w, 5)) as f32 * a.cos()) as i32,
            sy + ((radius + px(w, 5)) as f32 * a.sin()) as i32,
        );
        let to = (
            sx + ((radius + ray) as f32 * a.cos()) as i32,
            sy + ((radius + ray) as f32 * a.sin()) as i32,
        );
        draw_line(img, from, to, px(w, 3).max(1), [255, 255, 0]);
    }
    fill_ellipse(img, sx, sy, radius, radius, [255, 215, 0]);
}

fn draw_house(img: &mut RgbImage) {
    let w = img.width();
    let cx = w as i32 / 2;
    let ground = img.height() as i32 - px(w, 80);
    let s = |v| px(w, v);

    fill_rect(img, cx - s(60), ground - s(80), cx + s(60), ground, [139, 69, 19]);
    fill_triangle(
        img,
        (cx - s(70), ground - s(80)),
        (cx, ground - s(120)),
        (cx + s(70), ground - s(80)),
        [178, 34, 34],
    );
    fill_rect(img, cx - s(12), ground - s(50), cx + s(12), ground, [101, 67, 33]);
    fill_rect(img, cx - s(40), ground - s(60), cx - s(20), ground - s(40), [135, 206, 235]);
    fill_rect(img, cx + s(20), ground - s(60), cx + s(40), ground - s(40), [135, 206, 235]);
}

fn draw_mountain(img: &mut RgbImage) {
    let width = img.width();
    let w = width as i32;
    let ground = img.height() as i32 - px(width, 50);
    let peaks = [
        (w / 4, px(width, 150), px(width, 100)),
        (w / 2, px(width, 200), px(width, 120)),
        (3 * w / 4, px(width, 180), px(width, 110)),
    ];
    let colors = [[105u8, 105, 105], [128, 128, 128], [119, 136, 153]];

    for ((peak_x, height, width), color) in peaks.iter().zip(colors.iter()) {
        fill_triangle(
            img,
            (peak_x - width / 2, ground),
            (*peak_x, ground - height),
            (peak_x + width / 2, ground),
            *color,
        );
    }
}

fn draw_generic(img: &mut RgbImage) {
    let w = img.width();
    let (cx, cy) = (w as i32 / 2, img.height() as i32 / 2);
    let s = |v| px(w, v);
    fill_ellipse(img, cx, cy, s(40), s(40), [139, 92, 246]);
    fill_rect(img, cx - s(20), cy - s(60), cx + s(20), cy + s(60), [99, 102, 241]);
}

fn add_highlights(img: &mut RgbImage, seed: u64) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    if w <= 40 || h <= 12 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..HIGHLIGHT_COUNT {
        let x = rng.gen_range(20..w - 20);
        let y = rng.gen_range(4..(h / 3).max(5));
        let size = rng.gen_range(2..5);
        fill_ellipse(img, x, y, size, size, [255, 255, 255]);
    }
}

/// Minimal text-on-solid fallback card.
pub fn text_card(prompt: &str, dims: (u32, u32), tint: [u8; 3]) -> VidsmithResult<RgbImage> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return Err(VidsmithError::synthesis("text card dims must be non-zero"));
    }

    let mut truncated: String = prompt.chars().take(30).collect();
    if prompt.chars().count() > 30 {
        truncated.push('…');
    }

    let font_size = (w as f32 / 18.0).max(10.0);
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <text x="50%" y="46%" text-anchor="middle" font-family="DejaVu Sans, sans-serif" font-weight="bold" font-size="{font_size}" fill="white">AI Generated</text>
  <text x="50%" y="56%" text-anchor="middle" font-family="DejaVu Sans, sans-serif" font-size="{small}" fill="white" fill-opacity="0.8">{text}</text>
</svg>"#,
        small = font_size * 0.6,
        text = overlay::xml_escape(&truncated),
    );

    let mut img = solid(w, h, tint);
    let panel = overlay::rasterize_svg(&svg, w, h)?;
    overlay::composite_premul_over(&mut img, &panel)?;
    Ok(img)
}
