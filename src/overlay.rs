//! Timed text overlays: a hook phrase over the opening window and a fixed
//! call-to-action over the closing window.
//!
//! Overlay failures never abort a run: any SVG or font problem logs a
//! warning and the frame passes through unchanged.

use std::sync::{Arc, OnceLock};

use image::RgbImage;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::warn;

use crate::{
    error::{VidsmithError, VidsmithResult},
    keywords::{detect_hook_category, hook_phrases, overlay_text_color, CALL_TO_ACTION},
};

/// Number of trailing frames reserved for the call-to-action.
const CTA_FRAMES: usize = 20;
/// Hook window fraction of the sequence.
const HOOK_FRACTION: f32 = 0.3;

/// Per-run overlay decisions, made once: the hook phrase (one seeded draw
/// from the matched category), text color, and the two frame windows.
#[derive(Clone, Debug)]
pub struct OverlayPlan {
    hook: String,
    text_rgb: [u8; 3],
    hook_end: usize,
    cta_start: usize,
    total: usize,
}

impl OverlayPlan {
    pub fn new(prompt: &str, total_frames: usize, seed: u64) -> Self {
        let phrases = hook_phrases(detect_hook_category(prompt));
        let mut rng = StdRng::seed_from_u64(seed);
        let hook = phrases[rng.gen_range(0..phrases.len())].to_string();

        let hook_end = (total_frames as f32 * HOOK_FRACTION) as usize;
        // Clamping the CTA start to the hook window's end keeps the two
        // windows mutually exclusive for every frame count; for short
        // sequences the CTA window shrinks instead of colliding.
        let cta_start = total_frames.saturating_sub(CTA_FRAMES).max(hook_end);

        Self {
            hook,
            text_rgb: overlay_text_color(prompt),
            hook_end,
            cta_start,
            total: total_frames,
        }
    }

    pub fn hook_text(&self) -> &str {
        &self.hook
    }

    /// `[0, hook_end)` — frames carrying the hook caption.
    pub fn hook_window(&self) -> std::ops::Range<usize> {
        0..self.hook_end
    }

    /// `[cta_start, total)` — frames carrying the call-to-action.
    pub fn cta_window(&self) -> std::ops::Range<usize> {
        self.cta_start..self.total
    }

    /// Composites the overlay for `frame_index`, returning the frame
    /// untouched when the index falls outside both windows.
    pub fn apply(&self, frame: &RgbImage, frame_index: usize) -> RgbImage {
        let rendered = if frame_index < self.hook_end {
            let fade = 1.0 - frame_index as f32 / self.hook_end.max(1) as f32;
            render_caption(frame, &self.hook, self.text_rgb, CaptionSlot::Top, 0.85 * fade)
        } else if frame_index >= self.cta_start && frame_index < self.total {
            render_caption(frame, CALL_TO_ACTION, self.text_rgb, CaptionSlot::Bottom, 0.6)
        } else {
            return frame.clone();
        };

        match rendered {
            Ok(out) => out,
            Err(err) => {
                warn!(error = %err, frame_index, "overlay render failed, passing frame through");
                frame.clone()
            }
        }
    }
}

enum CaptionSlot {
    Top,
    Bottom,
}

fn render_caption(
    frame: &RgbImage,
    text: &str,
    text_rgb: [u8; 3],
    slot: CaptionSlot,
    panel_alpha: f32,
) -> VidsmithResult<RgbImage> {
    let (w, h) = frame.dimensions();
    let (panel_top, panel_bottom) = match slot {
        CaptionSlot::Top => (0.05, 0.17),
        CaptionSlot::Bottom => (0.80, 0.92),
    };
    let panel_y = (h as f32 * panel_top) as u32;
    let panel_h = (h as f32 * (panel_bottom - panel_top)) as u32;
    let font_size = (w as f32 / 16.0).max(10.0);
    let text_y = panel_y as f32 + panel_h as f32 * 0.68;
    let panel_alpha = panel_alpha.clamp(0.0, 1.0);

    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
  <rect x="{pad}" y="{panel_y}" width="{pw}" height="{panel_h}" rx="8" fill="black" fill-opacity="{panel_alpha}"/>
  <text x="50%" y="{text_y}" text-anchor="middle" font-family="DejaVu Sans, sans-serif" font-weight="bold" font-size="{font_size}" fill="rgb({r},{g},{b})" fill-opacity="{text_alpha}">{body}</text>
</svg>"#,
        pad = w / 16,
        pw = w - w / 8,
        r = text_rgb[0],
        g = text_rgb[1],
        b = text_rgb[2],
        text_alpha = (panel_alpha * 1.2).clamp(0.0, 1.0),
        body = xml_escape(text),
    );

    let panel = rasterize_svg(&svg, w, h)?;
    let mut out = frame.clone();
    composite_premul_over(&mut out, &panel)?;
    Ok(out)
}

fn shared_fontdb() -> Arc<usvg::fontdb::Database> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// Rasterizes an SVG snippet to premultiplied RGBA8 at the given size.
pub(crate) fn rasterize_svg(svg: &str, width: u32, height: u32) -> VidsmithResult<Vec<u8>> {
    let opts = usvg::Options {
        fontdb: shared_fontdb(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
        .map_err(|e| VidsmithError::synthesis(format!("parse overlay svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| VidsmithError::synthesis("overlay pixmap dims must be non-zero"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap.take())
}

/// Composites a premultiplied RGBA8 buffer over an opaque RGB frame.
pub(crate) fn composite_premul_over(frame: &mut RgbImage, rgba_premul: &[u8]) -> VidsmithResult<()> {
    let expected = frame.width() as usize * frame.height() as usize * 4;
    if rgba_premul.len() != expected {
        return Err(VidsmithError::synthesis(
            "overlay buffer size mismatch with frame dims",
        ));
    }

    for (px, src) in frame.pixels_mut().zip(rgba_premul.chunks_exact(4)) {
        let a = src[3] as u16;
        if a == 0 {
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            let v = src[c] as u16 + ((px.0[c] as u16 * inv + 127) / 255);
            px.0[c] = v.min(255) as u8;
        }
    }
    Ok(())
}

pub(crate) fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
