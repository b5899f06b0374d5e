//! Base-image acquisition: an ordered chain of remote generators with a
//! procedural last resort.
//!
//! Every remote failure mode (timeout, non-200, empty or undecodable body)
//! is recovered locally by falling through to the next source; the chain as
//! a whole cannot fail because procedural synthesis is total.

use std::time::Duration;

use image::{imageops::FilterType, RgbImage};
use tracing::{info, warn};

use crate::{
    error::{VidsmithError, VidsmithResult},
    procedural,
    prompt::enhance_prompt,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// One remote image generator endpoint.
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &str;
    fn fetch(&self, prompt: &str, dims: (u32, u32)) -> VidsmithResult<RgbImage>;
}

/// How the prompt travels to the endpoint.
#[derive(Clone, Debug)]
enum RequestMode {
    /// Prompt appended as a percent-encoded path segment; generation
    /// parameters go in the query string.
    PathGet,
    /// Prompt posted as a JSON body: `{"inputs": prompt, "parameters": ...}`.
    JsonPost,
}

/// HTTP-backed source with a bounded per-request timeout.
pub struct RemoteSource {
    name: String,
    base_url: String,
    mode: RequestMode,
    timeout: Duration,
}

impl RemoteSource {
    pub fn path_get(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            mode: RequestMode::PathGet,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn json_post(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            mode: RequestMode::JsonPost,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request(&self, prompt: &str, dims: (u32, u32)) -> VidsmithResult<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| VidsmithError::source(format!("build http client: {e}")))?;

        let response = match self.mode {
            RequestMode::PathGet => {
                let mut url = reqwest::Url::parse(&self.base_url)
                    .map_err(|e| VidsmithError::source(format!("bad source url: {e}")))?;
                url.path_segments_mut()
                    .map_err(|_| VidsmithError::source("source url cannot take a path"))?
                    .push(prompt);
                url.query_pairs_mut()
                    .append_pair("width", &dims.0.to_string())
                    .append_pair("height", &dims.1.to_string())
                    .append_pair("seed", "-1")
                    .append_pair("nologo", "true");
                client.get(url).send()
            }
            RequestMode::JsonPost => {
                let payload = serde_json::json!({
                    "inputs": prompt,
                    "parameters": {
                        "width": dims.0,
                        "height": dims.1,
                        "num_inference_steps": 20,
                    },
                });
                client
                    .post(&self.base_url)
                    .header("Content-Type", "application/json")
                    .body(payload.to_string())
                    .send()
            }
        }
        .map_err(|e| VidsmithError::source(format!("{}: request failed: {e}", self.name)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VidsmithError::source(format!(
                "{}: unexpected status {status}",
                self.name
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| VidsmithError::source(format!("{}: read body: {e}", self.name)))?;
        if bytes.is_empty() {
            return Err(VidsmithError::source(format!("{}: empty body", self.name)));
        }
        Ok(bytes.to_vec())
    }
}

impl ImageSource for RemoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, prompt: &str, dims: (u32, u32)) -> VidsmithResult<RgbImage> {
        let bytes = self.request(prompt, dims)?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| VidsmithError::source(format!("{}: decode body: {e}", self.name)))?;
        let mut rgb = decoded.to_rgb8();
        if rgb.dimensions() != dims {
            rgb = image::imageops::resize(&rgb, dims.0, dims.1, FilterType::Lanczos3);
        }
        Ok(rgb)
    }
}

/// Where the base image ultimately came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageOrigin {
    Remote(String),
    Procedural,
}

/// Ordered source chain ending in procedural synthesis.
pub struct SourceChain {
    sources: Vec<Box<dyn ImageSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn ImageSource>>) -> Self {
        Self { sources }
    }

    /// No remote sources: every request synthesizes locally.
    pub fn local_only() -> Self {
        Self::new(Vec::new())
    }

    /// The stock free-generator chain.
    pub fn default_chain() -> Self {
        Self::new(vec![
            Box::new(RemoteSource::path_get(
                "pollinations",
                "https://image.pollinations.ai/prompt",
            )),
            Box::new(RemoteSource::json_post(
                "huggingface",
                "https://api-inference.huggingface.co/models/runwayml/stable-diffusion-v1-5",
            )),
        ])
    }

    /// Obtains a base image for the prompt. Remote sources receive the
    /// quality-enhanced prompt; procedural synthesis sees the raw prompt so
    /// keyword dispatch stays faithful. Never fails.
    pub fn obtain_base_image(
        &self,
        prompt: &str,
        dims: (u32, u32),
        seed: u64,
    ) -> (RgbImage, ImageOrigin) {
        if let Some((img, name)) = self.fetch_remote(prompt, dims) {
            return (img, ImageOrigin::Remote(name));
        }
        info!("all remote sources exhausted, synthesizing locally");
        (procedural::synthesize(prompt, dims, seed), ImageOrigin::Procedural)
    }

    /// Tries the remote sources only; `None` when all fall through. Used
    /// for optional action-stage key images, where a placeholder would
    /// pollute the interpolation.
    pub fn fetch_remote(&self, prompt: &str, dims: (u32, u32)) -> Option<(RgbImage, String)> {
        let enhanced = enhance_prompt(prompt);
        for source in &self.sources {
            match source.fetch(&enhanced, dims) {
                Ok(img) => {
                    info!(source = source.name(), "remote source produced base image");
                    return Some((img, source.name().to_string()));
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "source failed, falling through");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl ImageSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }
        fn fetch(&self, _prompt: &str, _dims: (u32, u32)) -> VidsmithResult<RgbImage> {
            Err(VidsmithError::source("always down"))
        }
    }

    struct FixedSource(RgbImage);

    impl ImageSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }
        fn fetch(&self, _prompt: &str, _dims: (u32, u32)) -> VidsmithResult<RgbImage> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn exhausted_chain_falls_back_to_procedural() {
        let chain = SourceChain::new(vec![Box::new(FailingSource), Box::new(FailingSource)]);
        let (img, origin) = chain.obtain_base_image("a calm lake", (32, 32), 5);
        assert_eq!(origin, ImageOrigin::Procedural);
        assert_eq!(img.dimensions(), (32, 32));
    }

    #[test]
    fn first_healthy_source_wins() {
        let fixed = crate::raster::solid(32, 32, [1, 2, 3]);
        let chain = SourceChain::new(vec![
            Box::new(FailingSource),
            Box::new(FixedSource(fixed.clone())),
        ]);
        let (img, origin) = chain.obtain_base_image("anything here", (32, 32), 0);
        assert_eq!(origin, ImageOrigin::Remote("fixed".to_string()));
        assert_eq!(img.as_raw(), fixed.as_raw());
    }

    #[test]
    fn fetch_remote_reports_none_on_exhaustion() {
        let chain = SourceChain::new(vec![Box::new(FailingSource)]);
        assert!(chain.fetch_remote("stage prompt", (16, 16)).is_none());
    }

    #[test]
    fn local_only_chain_is_procedural() {
        let (_, origin) = SourceChain::local_only().obtain_base_image("x y z", (8, 8), 1);
        assert_eq!(origin, ImageOrigin::Procedural);
    }
}
