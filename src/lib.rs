//! Prompt-to-video generation: turn a short text prompt into a short
//! playable clip with no models and no GPU.
//!
//! A run flows through fixed stages: validate the prompt, obtain a base
//! image (remote generators with a procedural fallback), optionally fetch
//! action-stage key images, interpolate the full frame sequence, apply a
//! keyword-selected mood effect per frame, composite timed text overlays,
//! and encode (MP4 via `ffmpeg`, animated GIF as fallback), with an
//! optional procedural soundtrack muxed in at the end.

#![forbid(unsafe_code)]

pub mod audio;
pub mod ease;
pub mod effects;
pub mod encode;
pub mod error;
pub mod interp;
pub mod keywords;
pub mod motion;
pub mod overlay;
pub mod pipeline;
pub mod plan;
pub mod procedural;
pub mod prompt;
pub mod raster;
pub mod source;

pub use ease::Ease;
pub use effects::EffectContext;
pub use error::{VidsmithError, VidsmithResult};
pub use overlay::OverlayPlan;
pub use pipeline::{Pipeline, PipelineConfig, VideoArtifact};
pub use source::{ImageOrigin, ImageSource, RemoteSource, SourceChain};
