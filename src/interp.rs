//! Frame interpolation: turns a small set of key images into the full
//! fixed-length frame sequence.

use image::{imageops, RgbImage};

use crate::{
    ease::Ease,
    error::{VidsmithError, VidsmithResult},
    keywords::{detect_action, ActionCategory},
    motion,
    raster::{adjust_saturation, blend_rgb},
};

use std::f32::consts::TAU;

/// Gaussian sigma applied to both blend sources mid-transition for
/// fast/sharp actions.
const SHARP_BLUR_SIGMA: f32 = 2.0;

/// Frame progress convention: `f / (frame_count - 1)`, so the final frame
/// lands exactly on the last key image. Single-frame sequences use 0.
pub fn frame_progress(frame_index: usize, frame_count: usize) -> f32 {
    if frame_count <= 1 {
        0.0
    } else {
        frame_index as f32 / (frame_count - 1) as f32
    }
}

/// Builds exactly `frame_count` frames from the key images.
///
/// With one key image every frame goes through the single-image motion
/// simulation; with more, consecutive keys are blended with a smoothstep
/// weight over the fractional key index, plus prompt-conditioned
/// pre-processing (mid-transition blur for sharp actions, sinusoidal
/// saturation for flowing ones).
pub fn build_frames(
    key_images: &[RgbImage],
    frame_count: usize,
    prompt: &str,
) -> VidsmithResult<Vec<RgbImage>> {
    if key_images.is_empty() {
        return Err(VidsmithError::validation("at least one key image required"));
    }
    if frame_count == 0 {
        return Err(VidsmithError::validation("frame_count must be >= 1"));
    }
    let dims = key_images[0].dimensions();
    if key_images.iter().any(|img| img.dimensions() != dims) {
        return Err(VidsmithError::validation(
            "key images must share dimensions",
        ));
    }

    let action = detect_action(prompt);
    let sharp = matches!(action, ActionCategory::Cutting | ActionCategory::Fighting);
    let flowing = matches!(action, ActionCategory::Dancing);

    let mut frames = Vec::with_capacity(frame_count);
    for f in 0..frame_count {
        let progress = frame_progress(f, frame_count);
        let frame = if key_images.len() == 1 {
            motion::simulate_motion(&key_images[0], progress, action)
        } else {
            blend_keys(key_images, progress, sharp, flowing)
        };
        frames.push(frame);
    }
    Ok(frames)
}

fn blend_keys(keys: &[RgbImage], progress: f32, sharp: bool, flowing: bool) -> RgbImage {
    let last = keys.len() - 1;
    let idx = (progress * last as f32).clamp(0.0, last as f32);
    let base = (idx.floor() as usize).min(last);
    let ratio = idx - base as f32;

    if base >= last {
        return keys[last].clone();
    }

    let mut a = keys[base].clone();
    let mut b = keys[base + 1].clone();

    if sharp && ratio > 0.3 && ratio < 0.7 {
        a = imageops::blur(&a, SHARP_BLUR_SIGMA);
        b = imageops::blur(&b, SHARP_BLUR_SIGMA);
    }
    if flowing {
        let factor = 1.0 + 0.25 * (progress * TAU).sin();
        adjust_saturation(&mut a, factor);
        adjust_saturation(&mut b, factor);
    }

    blend_rgb(&a, &b, Ease::SmoothStep.apply(ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::solid;

    #[test]
    fn returns_exactly_frame_count_frames() {
        let keys = vec![solid(16, 16, [0, 0, 0]), solid(16, 16, [255, 255, 255])];
        for count in [1usize, 2, 7, 30] {
            let frames = build_frames(&keys, count, "plain").unwrap();
            assert_eq!(frames.len(), count);
            assert!(frames.iter().all(|f| f.dimensions() == (16, 16)));
        }
    }

    #[test]
    fn single_key_runs_motion_simulation() {
        let keys = vec![solid(16, 16, [100, 100, 100])];
        let frames = build_frames(&keys, 8, "a dog walking in a park").unwrap();
        assert_eq!(frames.len(), 8);
        assert!(frames.iter().all(|f| f.dimensions() == (16, 16)));
    }

    #[test]
    fn endpoints_land_on_first_and_last_keys() {
        let keys = vec![solid(8, 8, [10, 10, 10]), solid(8, 8, [200, 200, 200])];
        let frames = build_frames(&keys, 9, "still life").unwrap();
        assert_eq!(frames[0].as_raw(), keys[0].as_raw());
        assert_eq!(frames[8].as_raw(), keys[1].as_raw());
    }

    #[test]
    fn midpoint_blend_is_between_keys() {
        let keys = vec![solid(8, 8, [0, 0, 0]), solid(8, 8, [200, 200, 200])];
        let frames = build_frames(&keys, 9, "still life").unwrap();
        let mid = frames[4].get_pixel(0, 0).0[0];
        assert!(mid > 0 && mid < 200);
    }

    #[test]
    fn rejects_empty_keys_and_zero_count() {
        assert!(build_frames(&[], 4, "x").is_err());
        assert!(build_frames(&[solid(4, 4, [0, 0, 0])], 0, "x").is_err());
    }

    #[test]
    fn rejects_mismatched_key_dimensions() {
        let keys = vec![solid(4, 4, [0, 0, 0]), solid(8, 8, [0, 0, 0])];
        assert!(build_frames(&keys, 4, "x").is_err());
    }

    #[test]
    fn progress_convention_is_count_minus_one() {
        assert_eq!(frame_progress(0, 10), 0.0);
        assert_eq!(frame_progress(9, 10), 1.0);
        assert_eq!(frame_progress(0, 1), 0.0);
    }
}
