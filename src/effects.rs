//! Per-frame mood effects.
//!
//! One effect is selected per run from the ordered mood table; each effect
//! is a closed-form function of `(frame, progress, seed)` with no
//! inter-frame state, so the stage parallelizes across frames without
//! changing output. An effect that reports an error is swallowed and the
//! frame passes through unchanged.

use image::{imageops, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::warn;

use crate::{
    error::VidsmithResult,
    keywords::{detect_action, detect_mood, ActionCategory, Mood},
    raster::{add_glow_dot, adjust_brightness, adjust_contrast, shift_channels},
};

use std::f32::consts::TAU;

/// Immutable per-run inputs read by every effect. Never mutated mid-run.
#[derive(Clone, Debug)]
pub struct EffectContext {
    pub prompt: String,
    pub mood: Mood,
    pub action: ActionCategory,
    pub frame_count: usize,
    pub fps: u32,
    pub seed: u64,
}

impl EffectContext {
    pub fn new(prompt: &str, frame_count: usize, fps: u32, seed: u64) -> Self {
        Self {
            prompt: prompt.to_string(),
            mood: detect_mood(prompt),
            action: detect_action(prompt),
            frame_count,
            fps,
            seed,
        }
    }
}

/// Applies the run's mood effect to one frame. Pure in
/// `(frame, progress, ctx.seed)`; any internal error yields the input
/// unchanged.
pub fn apply_mood_effect(frame: &RgbImage, progress: f32, ctx: &EffectContext) -> RgbImage {
    apply_or_identity(frame, |f| {
        let mut rng = particle_rng(ctx.seed, progress);
        Ok(match ctx.mood {
            Mood::Fire => fire(f, progress, &mut rng),
            Mood::Water => water(f, progress, &mut rng),
            Mood::Motion => motion_blur(f, progress)?,
            Mood::Glow => glow(f, progress, &mut rng),
            Mood::Night => night(f, progress, &mut rng),
            Mood::Portrait => portrait(f, progress),
            Mood::Breathing => breathing(f, progress),
        })
    })
}

/// Runs the effect stage over the whole sequence in parallel; indexed
/// iteration keeps the output ordering identical to a sequential pass.
pub fn run_effect_stage(frames: &mut [RgbImage], ctx: &EffectContext) {
    let count = frames.len();
    frames.par_iter_mut().enumerate().for_each(|(idx, frame)| {
        let progress = crate::interp::frame_progress(idx, count);
        *frame = apply_mood_effect(frame, progress, ctx);
    });
}

/// Fallback-to-identity combinator: the uniform boundary at which effect
/// failures are swallowed instead of aborting the run.
fn apply_or_identity(
    frame: &RgbImage,
    f: impl FnOnce(&RgbImage) -> VidsmithResult<RgbImage>,
) -> RgbImage {
    match f(frame) {
        Ok(out) => out,
        Err(err) => {
            warn!(error = %err, "effect failed, passing frame through unchanged");
            frame.clone()
        }
    }
}

/// Particle RNG derived from the run seed and the quantized progress, so a
/// given frame's particles are reproducible in isolation.
fn particle_rng(seed: u64, progress: f32) -> StdRng {
    let quantized = (progress * 1_000_000.0) as u64;
    StdRng::seed_from_u64(seed ^ quantized.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Flicker at two superposed frequencies, warm shift, rising embers.
fn fire(frame: &RgbImage, progress: f32, rng: &mut StdRng) -> RgbImage {
    let mut out = frame.clone();
    let flicker = 1.0 + 0.08 * (progress * TAU * 3.0).sin() + 0.05 * (progress * TAU * 7.0).sin();
    adjust_brightness(&mut out, flicker);
    shift_channels(&mut out, 14, 2, -12);

    let (w, h) = (out.width() as i32, out.height() as i32);
    for _ in 0..12 {
        let x = rng.gen_range(0..w.max(1));
        let base_y = rng.gen_range(h / 2..h.max(h / 2 + 1));
        let rise = (progress * h as f32 * 0.5) as i32;
        let y = (base_y - rise).rem_euclid(h.max(1));
        let radius = rng.gen_range(1..4);
        add_glow_dot(&mut out, x, y, radius, [90, 45, 0]);
    }
    out
}

/// Cool shift, slow brightness wave, falling droplets.
fn water(frame: &RgbImage, progress: f32, rng: &mut StdRng) -> RgbImage {
    let mut out = frame.clone();
    adjust_brightness(&mut out, 1.0 + 0.04 * (progress * TAU * 1.5).sin());
    shift_channels(&mut out, -6, 2, 12);

    let (w, h) = (out.width() as i32, out.height() as i32);
    for _ in 0..10 {
        let x = rng.gen_range(0..w.max(1));
        let base_y = rng.gen_range(0..h.max(1));
        let fall = (progress * h as f32) as i32;
        let y = (base_y + fall).rem_euclid(h.max(1));
        let radius = rng.gen_range(1..3);
        add_glow_dot(&mut out, x, y, radius, [20, 35, 70]);
    }
    out
}

/// Generic motion treatment: blur strength modulated sinusoidally.
fn motion_blur(frame: &RgbImage, progress: f32) -> VidsmithResult<RgbImage> {
    let sigma = 0.6 + 1.0 * (progress * TAU).sin().abs();
    Ok(imageops::blur(frame, sigma))
}

/// Brightness/contrast pulse with sparkles twinkling at two frequencies.
fn glow(frame: &RgbImage, progress: f32, rng: &mut StdRng) -> RgbImage {
    let mut out = frame.clone();
    adjust_brightness(&mut out, 1.0 + 0.10 * (progress * TAU).sin());
    adjust_contrast(&mut out, 1.05);

    let (w, h) = (out.width() as i32, out.height() as i32);
    for _ in 0..6 {
        let x = rng.gen_range(0..w.max(1));
        let y = rng.gen_range(0..h.max(1));
        let twinkle = ((progress * TAU * 2.0).sin() * (progress * TAU * 5.0).sin()).abs();
        let boost = (70.0 * twinkle) as i16;
        add_glow_dot(&mut out, x, y, rng.gen_range(1..3), [boost, boost, boost / 2]);
    }
    out
}

/// Darken, raise contrast, and twinkle stars at two frequencies.
fn night(frame: &RgbImage, progress: f32, rng: &mut StdRng) -> RgbImage {
    let mut out = frame.clone();
    adjust_brightness(&mut out, 0.75);
    adjust_contrast(&mut out, 1.15);

    let (w, h) = (out.width() as i32, out.height() as i32);
    for _ in 0..15 {
        let x = rng.gen_range(0..w.max(1));
        let y = rng.gen_range(0..(h / 2).max(1));
        let phase = rng.gen_range(0.0..TAU);
        let twinkle =
            ((progress * TAU * 2.0 + phase).sin() * (progress * TAU * 5.0 + phase).sin()).abs();
        let boost = (110.0 * twinkle) as i16;
        add_glow_dot(&mut out, x, y, 1, [boost, boost, boost]);
    }
    out
}

/// Gentle breathing brightness with a warm cast.
fn portrait(frame: &RgbImage, progress: f32) -> RgbImage {
    let mut out = frame.clone();
    adjust_brightness(&mut out, 1.0 + 0.03 * (progress * TAU).sin());
    shift_channels(&mut out, 6, 2, -2);
    out
}

/// Default treatment when no mood keyword matches.
fn breathing(frame: &RgbImage, progress: f32) -> RgbImage {
    let mut out = frame.clone();
    adjust_brightness(&mut out, 1.0 + 0.03 * (progress * TAU).sin());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::solid;

    fn ctx(prompt: &str) -> EffectContext {
        EffectContext::new(prompt, 30, 15, 77)
    }

    #[test]
    fn effects_are_deterministic_for_same_inputs() {
        let frame = solid(24, 24, [120, 110, 100]);
        for prompt in [
            "dragon fire",
            "ocean waves",
            "wind in the trees",
            "magic glow",
            "night sky",
            "portrait of a woman",
            "plain meadow",
        ] {
            let c = ctx(prompt);
            let a = apply_mood_effect(&frame, 0.4, &c);
            let b = apply_mood_effect(&frame, 0.4, &c);
            assert_eq!(a.as_raw(), b.as_raw(), "prompt: {prompt}");
        }
    }

    #[test]
    fn effects_preserve_dimensions() {
        let frame = solid(20, 12, [50, 50, 50]);
        for prompt in ["fire", "water", "flying", "magic", "night", "face", "meadow"] {
            let out = apply_mood_effect(&frame, 0.8, &ctx(prompt));
            assert_eq!(out.dimensions(), (20, 12), "prompt: {prompt}");
        }
    }

    #[test]
    fn stage_preserves_frame_count_and_order_independence() {
        let frames: Vec<_> = (0..6u8).map(|i| solid(12, 12, [i * 20, 0, 0])).collect();
        let c = ctx("night city");
        let mut parallel = frames.clone();
        run_effect_stage(&mut parallel, &c);

        let sequential: Vec<_> = frames
            .iter()
            .enumerate()
            .map(|(i, f)| apply_mood_effect(f, crate::interp::frame_progress(i, 6), &c))
            .collect();

        assert_eq!(parallel.len(), 6);
        for (p, s) in parallel.iter().zip(sequential.iter()) {
            assert_eq!(p.as_raw(), s.as_raw());
        }
    }

    #[test]
    fn night_darkens_the_frame() {
        let frame = solid(10, 10, [200, 200, 200]);
        let out = apply_mood_effect(&frame, 0.0, &ctx("a dark night"));
        // Sample away from the star band in the top half.
        assert!(out.get_pixel(5, 9).0[0] < 200);
    }

    #[test]
    fn identity_combinator_swallows_errors() {
        let frame = solid(6, 6, [1, 2, 3]);
        let out = apply_or_identity(&frame, |_| {
            Err(crate::error::VidsmithError::synthesis("boom"))
        });
        assert_eq!(out.as_raw(), frame.as_raw());
    }
}
