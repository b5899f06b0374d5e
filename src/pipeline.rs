//! End-to-end video generation: prompt in, playable artifact out.
//!
//! The pipeline degrades rather than fails: remote sources fall back to
//! procedural synthesis, MP4 encoding falls back to animated GIF, effects
//! and overlays pass frames through on error, and the audio mux keeps the
//! silent video when it cannot complete. The only hard failures are invalid
//! input and an empty output file.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    audio, encode,
    effects::{run_effect_stage, EffectContext},
    error::{VidsmithError, VidsmithResult},
    interp,
    overlay::OverlayPlan,
    plan,
    prompt::validate_prompt,
    source::{ImageOrigin, SourceChain},
};

use image::RgbImage;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub fps: u32,
    /// Plan action stages and fetch one remote key image per stage. With no
    /// remote source available the run proceeds on the base image alone.
    pub use_action_sequence: bool,
    /// Cap on extra remote key images fetched beyond the base image.
    pub extra_key_images: usize,
    pub mux_audio: bool,
    pub out_dir: PathBuf,
    /// Fixed seed for reproducible runs; `None` draws one per run.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            frame_count: 45,
            fps: 15,
            use_action_sequence: true,
            extra_key_images: 1,
            mux_audio: false,
            out_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> VidsmithResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VidsmithError::validation("width/height must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(VidsmithError::validation("width/height must be even"));
        }
        if self.frame_count == 0 {
            return Err(VidsmithError::validation("frame_count must be >= 1"));
        }
        if self.fps == 0 {
            return Err(VidsmithError::validation("fps must be non-zero"));
        }
        Ok(())
    }

    fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn duration_secs(&self) -> f32 {
        self.frame_count as f32 / self.fps as f32
    }
}

/// What a finished run produced.
#[derive(Clone, Debug)]
pub struct VideoArtifact {
    pub path: PathBuf,
    pub byte_size: u64,
    pub frames_written: usize,
    /// `"mp4"` or `"gif"`.
    pub container: String,
    pub origin: ImageOrigin,
    pub elapsed: Duration,
}

pub struct Pipeline {
    config: PipelineConfig,
    sources: SourceChain,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, sources: SourceChain) -> Self {
        Self { config, sources }
    }

    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default(), SourceChain::default_chain())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the whole pipeline for one prompt.
    pub fn generate(&self, raw_prompt: &str) -> VidsmithResult<VideoArtifact> {
        let started = Instant::now();
        self.config.validate()?;
        let prompt = validate_prompt(raw_prompt)?;
        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        info!(prompt, seed, "starting video generation");

        let (key_images, origin) = self.gather_key_images(prompt, seed);
        let mut frames = interp::build_frames(&key_images, self.config.frame_count, prompt)?;

        let ctx = EffectContext::new(prompt, self.config.frame_count, self.config.fps, seed);
        run_effect_stage(&mut frames, &ctx);

        let overlay = OverlayPlan::new(prompt, frames.len(), seed);
        for (idx, frame) in frames.iter_mut().enumerate() {
            *frame = overlay.apply(frame, idx);
        }

        let (path, report) = self.encode_with_fallback(&frames)?;

        let path = if self.config.mux_audio && report.codec != "gif" {
            let muxed = audio::mux_audio(&path, prompt, self.config.duration_secs());
            if muxed != path {
                // The silent intermediate is superseded by the muxed file.
                let _ = std::fs::remove_file(&path);
            }
            muxed
        } else {
            path
        };

        let byte_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if byte_size == 0 {
            return Err(VidsmithError::encode(format!(
                "artifact '{}' is missing or empty",
                path.display()
            )));
        }

        let container = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_string();
        info!(path = %path.display(), byte_size, container, "video generation finished");
        Ok(VideoArtifact {
            path,
            byte_size,
            frames_written: report.frames_written,
            container,
            origin,
            elapsed: started.elapsed(),
        })
    }

    /// Base image plus optional remote action-stage keys. The base is
    /// always first so interpolation starts from it; stage fetches that
    /// fall through are skipped rather than replaced with placeholders.
    fn gather_key_images(&self, prompt: &str, seed: u64) -> (Vec<RgbImage>, ImageOrigin) {
        let dims = self.config.dims();
        let (base, origin) = self.sources.obtain_base_image(prompt, dims, seed);
        let mut keys = vec![base];

        if self.config.use_action_sequence && self.config.extra_key_images > 0 {
            let stages = plan::plan_stages(prompt);
            // The first stage describes roughly the base image's moment.
            for stage_prompt in stages.iter().skip(1) {
                if keys.len() > self.config.extra_key_images {
                    break;
                }
                match self.sources.fetch_remote(stage_prompt, dims) {
                    Some((img, source)) => {
                        info!(source, stage = stage_prompt.as_str(), "fetched stage key image");
                        keys.push(img);
                    }
                    None => {
                        warn!(stage = stage_prompt.as_str(), "stage key unavailable, skipping");
                    }
                }
            }
        }
        (keys, origin)
    }

    /// MP4 via the codec chain first, animated GIF when the chain (or
    /// ffmpeg itself) is unavailable.
    fn encode_with_fallback(
        &self,
        frames: &[RgbImage],
    ) -> VidsmithResult<(PathBuf, encode::EncodeReport)> {
        let token = unique_token();
        let mp4_path = self.config.out_dir.join(format!("ai_video_{token}.mp4"));
        match encode::encode(frames, &mp4_path, self.config.fps) {
            Ok(report) => Ok((mp4_path, report)),
            Err(err) => {
                warn!(error = %err, "mp4 encode failed, falling back to gif");
                let _ = std::fs::remove_file(&mp4_path);
                let gif_path = self.config.out_dir.join(format!("fallback_{token}.gif"));
                let report = encode::encode_gif(frames, &gif_path, self.config.fps)?;
                Ok((gif_path, report))
            }
        }
    }

    /// Obtains one base image and saves it as a standalone PNG, without
    /// running the video stages.
    pub fn save_key_image(&self, raw_prompt: &str) -> VidsmithResult<PathBuf> {
        self.config.validate()?;
        let prompt = validate_prompt(raw_prompt)?;
        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());

        let (image, origin) = self
            .sources
            .obtain_base_image(prompt, self.config.dims(), seed);
        let path = self
            .config
            .out_dir
            .join(format!("generated_{}.png", unique_token()));
        encode::ensure_parent_dir(&path)?;
        image
            .save(&path)
            .map_err(|e| VidsmithError::encode(format!("save key image: {e}")))?;
        info!(path = %path.display(), ?origin, "saved key image");
        Ok(path)
    }
}

/// Eight hex chars for collision-unlikely artifact names.
pub fn unique_token() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn test_config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            width: 32,
            height: 32,
            frame_count: 10,
            fps: 10,
            use_action_sequence: false,
            extra_key_images: 0,
            mux_audio: false,
            out_dir: dir.to_path_buf(),
            seed: Some(42),
        }
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let base = PipelineConfig::default();
        assert!(base.validate().is_ok());
        assert!(PipelineConfig { width: 0, ..base.clone() }.validate().is_err());
        assert!(PipelineConfig { height: 33, ..base.clone() }.validate().is_err());
        assert!(PipelineConfig { frame_count: 0, ..base.clone() }.validate().is_err());
        assert!(PipelineConfig { fps: 0, ..base }.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = PipelineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.width, cfg.width);
        assert_eq!(back.frame_count, cfg.frame_count);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let result: Result<PipelineConfig, _> =
            serde_json::from_str(r#"{"width": 64, "bogus": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn generate_rejects_invalid_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(test_config(dir.path()), SourceChain::local_only());
        assert!(pipeline.generate("").is_err());
        assert!(pipeline.generate("<script>x</script>").is_err());
    }

    #[test]
    fn save_key_image_writes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(test_config(dir.path()), SourceChain::local_only());
        let path = pipeline.save_key_image("a tiny red house").unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("generated_"));
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[test]
    fn unique_tokens_are_hex_and_vary() {
        let a = unique_token();
        let b = unique_token();
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        // Not a hard guarantee, but 1 in 4 billion.
        assert_ne!(a, b);
    }
}
