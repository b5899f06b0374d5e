//! Procedural soundtrack synthesis and muxing.
//!
//! The track is additive sine harmonics picked from an ordered mood table,
//! written as raw f32le samples and muxed into the finished video with the
//! system `ffmpeg` binary. Muxing is best-effort: any failure leaves the
//! silent video untouched and returns its path.

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::error::{VidsmithError, VidsmithResult};

pub const SAMPLE_RATE: u32 = 44_100;

/// Peak amplitude of the mixed track; quiet on purpose, it sits under the
/// visuals rather than carrying them.
const PEAK_AMPLITUDE: f32 = 0.15;

/// Fundamental frequencies (Hz) per audio mood. First match against the
/// lowercased prompt wins; the final row is the default.
const AUDIO_MOOD_TABLE: &[(&str, &[f32])] = &[
    ("dance", &[220.0, 277.18, 329.63]),
    ("party", &[220.0, 277.18, 329.63]),
    ("upbeat", &[220.0, 277.18, 329.63]),
    ("peaceful", &[174.61, 220.0, 261.63]),
    ("calm", &[174.61, 220.0, 261.63]),
    ("ambient", &[174.61, 220.0, 261.63]),
    ("dramatic", &[146.83, 185.0, 233.08]),
    ("epic", &[146.83, 185.0, 233.08]),
    ("battle", &[146.83, 185.0, 233.08]),
    ("", &[196.0, 246.94, 293.66]),
];

/// Rising-pitch treatment for dramatic tracks.
const DRAMATIC_KEYWORDS: &[&str] = &["dramatic", "epic", "battle"];

pub fn track_frequencies(prompt: &str) -> &'static [f32] {
    let lower = prompt.to_lowercase();
    for (keyword, freqs) in AUDIO_MOOD_TABLE {
        if keyword.is_empty() || lower.contains(keyword) {
            return freqs;
        }
    }
    AUDIO_MOOD_TABLE[AUDIO_MOOD_TABLE.len() - 1].1
}

fn is_dramatic(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    DRAMATIC_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Synthesizes a mono track of exactly `duration_secs` seconds.
///
/// Each fundamental contributes itself plus a quieter octave harmonic; an
/// attack/release envelope avoids clicks at the boundaries. Dramatic moods
/// get a slow upward pitch drift across the track.
pub fn synthesize_track(prompt: &str, duration_secs: f32) -> VidsmithResult<Vec<f32>> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(VidsmithError::validation(
            "audio duration must be positive and finite",
        ));
    }
    let freqs = track_frequencies(prompt);
    let dramatic = is_dramatic(prompt);
    let sample_count = (duration_secs * SAMPLE_RATE as f32) as usize;
    let attack = (SAMPLE_RATE / 20) as usize; // 50 ms
    let release = sample_count.saturating_sub(attack);

    let mut samples = Vec::with_capacity(sample_count);
    let per_voice = PEAK_AMPLITUDE / (freqs.len() as f32 * 1.5);
    for i in 0..sample_count {
        let t = i as f32 / SAMPLE_RATE as f32;
        let drift = if dramatic {
            1.0 + 0.08 * (i as f32 / sample_count.max(1) as f32)
        } else {
            1.0
        };
        let mut value = 0.0f32;
        for &freq in freqs {
            let phase = std::f32::consts::TAU * freq * drift * t;
            value += per_voice * phase.sin();
            value += per_voice * 0.5 * (phase * 2.0).sin();
        }

        let envelope = if i < attack {
            i as f32 / attack.max(1) as f32
        } else if i >= release {
            (sample_count - i) as f32 / attack.max(1) as f32
        } else {
            1.0
        };
        samples.push(value * envelope);
    }
    Ok(samples)
}

/// Writes mono samples as raw little-endian f32, the layout ffmpeg reads
/// with `-f f32le`.
pub fn write_f32le(samples: &[f32], path: &Path) -> VidsmithResult<()> {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("write audio track '{}'", path.display()))?;
    Ok(())
}

/// Muxes a synthesized track into `video_path`, producing a new file next
/// to it. Best-effort: on any failure the original path is returned and the
/// video is left as-is. The raw track file is removed either way.
pub fn mux_audio(video_path: &Path, prompt: &str, duration_secs: f32) -> PathBuf {
    match try_mux(video_path, prompt, duration_secs) {
        Ok(out) => out,
        Err(err) => {
            warn!(error = %err, "audio mux failed, keeping silent video");
            video_path.to_path_buf()
        }
    }
}

fn try_mux(video_path: &Path, prompt: &str, duration_secs: f32) -> VidsmithResult<PathBuf> {
    let samples = synthesize_track(prompt, duration_secs)?;
    let track_path = video_path.with_extension("f32le");
    write_f32le(&samples, &track_path)?;

    let out_path = audio_output_path(video_path);
    let status = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error"])
        .args(["-i"])
        .arg(video_path)
        .args(["-f", "f32le", "-ar", &SAMPLE_RATE.to_string(), "-ac", "1", "-i"])
        .arg(&track_path)
        .args(["-c:v", "copy", "-c:a", "aac", "-shortest"])
        .arg(&out_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    let _ = std::fs::remove_file(&track_path);

    let status =
        status.map_err(|e| VidsmithError::encode(format!("failed to spawn ffmpeg for mux: {e}")))?;
    if !status.success() {
        let _ = std::fs::remove_file(&out_path);
        return Err(VidsmithError::encode(format!(
            "ffmpeg mux exited with status {status}"
        )));
    }
    if std::fs::metadata(&out_path).map(|m| m.len()).unwrap_or(0) == 0 {
        let _ = std::fs::remove_file(&out_path);
        return Err(VidsmithError::encode("muxed output is missing or empty"));
    }

    debug!(out = %out_path.display(), "audio mux finished");
    Ok(out_path)
}

fn audio_output_path(video_path: &Path) -> PathBuf {
    let stem = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    let ext = video_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("mp4");
    video_path.with_file_name(format!("{stem}_audio.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_has_expected_sample_count() {
        let samples = synthesize_track("calm lake", 2.0).unwrap();
        assert_eq!(samples.len(), (2.0 * SAMPLE_RATE as f32) as usize);
    }

    #[test]
    fn samples_stay_within_peak_amplitude() {
        for prompt in ["dance party", "peaceful lake", "epic battle", "plain field"] {
            let samples = synthesize_track(prompt, 0.5).unwrap();
            assert!(
                samples.iter().all(|s| s.abs() <= PEAK_AMPLITUDE + 1e-3),
                "prompt: {prompt}"
            );
        }
    }

    #[test]
    fn envelope_starts_and_ends_near_silence() {
        let samples = synthesize_track("ambient drift", 1.0).unwrap();
        assert!(samples[0].abs() < 1e-4);
        assert!(samples[samples.len() - 1].abs() < 0.01);
    }

    #[test]
    fn mood_table_first_match_wins_with_default_fallback() {
        assert_eq!(track_frequencies("upbeat dance")[0], 220.0);
        assert_eq!(track_frequencies("a calm sea")[0], 174.61);
        assert_eq!(track_frequencies("epic battle scene")[0], 146.83);
        assert_eq!(track_frequencies("a quiet library")[0], 196.0);
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert!(synthesize_track("x", 0.0).is_err());
        assert!(synthesize_track("x", -1.0).is_err());
        assert!(synthesize_track("x", f32::NAN).is_err());
    }

    #[test]
    fn f32le_file_is_four_bytes_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.f32le");
        write_f32le(&[0.0, 0.5, -0.5], &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 12);
    }
}
