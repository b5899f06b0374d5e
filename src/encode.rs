//! Frame-sequence encoding.
//!
//! MP4 output streams raw rgb24 frames to the system `ffmpeg` binary over
//! stdin, trying an ordered codec chain; the animated-GIF path is the
//! simpler fallback container when no codec produces a playable file. We
//! intentionally shell out to `ffmpeg` rather than link FFmpeg natively to
//! avoid dev header/lib requirements.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;
use image::RgbImage;
use tracing::{info, warn};

use crate::error::{VidsmithError, VidsmithResult};

/// Codec identifiers tried in order; first one that opens and finishes with
/// a non-empty file wins.
pub const CODEC_CHAIN: &[&str] = &["libx264", "mpeg4"];

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
}

impl EncodeConfig {
    pub fn validate(&self) -> VidsmithResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VidsmithError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(VidsmithError::validation("encode fps must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // yuv420p output requires even dimensions.
            return Err(VidsmithError::validation(
                "encode width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeReport {
    pub frames_written: usize,
    pub codec: String,
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> VidsmithResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

struct FfmpegWriter {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    width: u32,
    height: u32,
}

/// Dropping mid-stream (a failed codec attempt) must not leave a zombie
/// ffmpeg behind: kill and reap the child.
impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl FfmpegWriter {
    /// Spawns ffmpeg for one codec; "open" means the process spawned and
    /// handed us its stdin pipe.
    fn open(cfg: &EncodeConfig, codec: &str) -> VidsmithResult<Self> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            codec,
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| VidsmithError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VidsmithError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            width: cfg.width,
            height: cfg.height,
        })
    }

    fn write_frame(&mut self, frame: &RgbImage) -> VidsmithResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(VidsmithError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VidsmithError::encode("ffmpeg writer is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| VidsmithError::encode(format!("write frame to ffmpeg stdin: {e}")))?;
        Ok(())
    }

    fn finish(mut self) -> VidsmithResult<()> {
        drop(self.stdin.take());

        let child = self
            .child
            .take()
            .ok_or_else(|| VidsmithError::encode("ffmpeg writer is already finalized"))?;
        let output = child
            .wait_with_output()
            .map_err(|e| VidsmithError::encode(format!("wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsmithError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Encodes the sequence to MP4, trying [`CODEC_CHAIN`] in order.
pub fn encode(frames: &[RgbImage], out_path: &Path, fps: u32) -> VidsmithResult<EncodeReport> {
    encode_with_chain(frames, out_path, fps, CODEC_CHAIN)
}

/// Encodes the sequence to MP4, trying the given codecs in order. A codec
/// that fails to open, dies mid-stream, or leaves a zero-byte file falls
/// through to the next; the partial file is removed. Errors only when the
/// whole chain is exhausted.
pub fn encode_with_chain(
    frames: &[RgbImage],
    out_path: &Path,
    fps: u32,
    chain: &[&str],
) -> VidsmithResult<EncodeReport> {
    if frames.is_empty() {
        return Err(VidsmithError::validation("no frames to encode"));
    }
    let (width, height) = frames[0].dimensions();
    let cfg = EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.to_path_buf(),
    };
    cfg.validate()?;
    ensure_parent_dir(out_path)?;

    if !is_ffmpeg_on_path() {
        return Err(VidsmithError::encode(
            "ffmpeg is required for MP4 encoding, but was not found on PATH",
        ));
    }

    for codec in chain {
        match try_codec(&cfg, codec, frames) {
            Ok(frames_written) => {
                info!(codec, frames_written, "encode finished");
                return Ok(EncodeReport {
                    frames_written,
                    codec: codec.to_string(),
                });
            }
            Err(err) => {
                warn!(codec, error = %err, "codec failed, trying next");
                let _ = std::fs::remove_file(out_path);
            }
        }
    }

    Err(VidsmithError::encode(
        "no codec in the chain produced a playable file",
    ))
}

fn try_codec(cfg: &EncodeConfig, codec: &str, frames: &[RgbImage]) -> VidsmithResult<usize> {
    let mut writer = FfmpegWriter::open(cfg, codec)?;
    let mut written = 0usize;
    for frame in frames {
        writer.write_frame(frame)?;
        written += 1;
    }
    writer.finish()?;
    verify_non_empty(&cfg.out_path)?;
    Ok(written)
}

fn verify_non_empty(path: &Path) -> VidsmithResult<()> {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(VidsmithError::encode(format!(
            "output file '{}' is missing or empty",
            path.display()
        )));
    }
    Ok(())
}

/// Animated-GIF fallback container; needs no external tooling.
pub fn encode_gif(frames: &[RgbImage], out_path: &Path, fps: u32) -> VidsmithResult<EncodeReport> {
    if frames.is_empty() {
        return Err(VidsmithError::validation("no frames to encode"));
    }
    if fps == 0 {
        return Err(VidsmithError::validation("encode fps must be non-zero"));
    }
    ensure_parent_dir(out_path)?;

    let file = File::create(out_path)
        .with_context(|| format!("create gif '{}'", out_path.display()))?;
    let mut encoder = image::codecs::gif::GifEncoder::new_with_speed(BufWriter::new(file), 10);
    encoder
        .set_repeat(image::codecs::gif::Repeat::Infinite)
        .map_err(|e| VidsmithError::encode(format!("set gif repeat: {e}")))?;

    let delay = image::Delay::from_numer_denom_ms(1000, fps);
    let mut written = 0usize;
    for frame in frames {
        let rgba = image::DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
        let gif_frame = image::Frame::from_parts(rgba, 0, 0, delay);
        encoder
            .encode_frame(gif_frame)
            .map_err(|e| VidsmithError::encode(format!("encode gif frame: {e}")))?;
        written += 1;
    }
    drop(encoder);

    verify_non_empty(out_path)?;
    Ok(EncodeReport {
        frames_written: written,
        codec: "gif".to_string(),
    })
}
