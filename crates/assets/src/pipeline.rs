use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::decode::{DecodedImage, ImageDecoder, PixelFormat};
use crate::error::AssetError;
use crate::header::read_png_header;
use crate::source::AssetSource;
use crate::texture::{Texture, TextureHandle, TextureState};

/// Which unit of work the next `advance_one_frame` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Upload,
}

/// What a single `advance_one_frame` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameWork {
    /// Nothing was queued for the current stage.
    Idle,
    /// Decoded one entry; its upload happens on a later call.
    Decoded { key: String },
    /// Copied one decoded entry into its texture.
    Uploaded { key: String },
    /// Gave up on one entry and filled its texture with the placeholder.
    Failed { key: String },
}

/// Running totals for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub requested: u64,
    pub cache_hits: u64,
    pub decoded: u64,
    pub uploaded: u64,
    pub placeholders: u64,
}

/// Turns encoded image bytes into resident textures over several frames.
///
/// All in-flight keys share one stage flag, so each `advance_one_frame` does
/// at most one decode or one upload regardless of backlog. Draining N keys
/// takes at most 2N calls. Not internally synchronized: drive it from the
/// thread that owns the textures.
pub struct StagedAssetPipeline<S, D> {
    source: S,
    decoder: D,
    cache: HashMap<String, TextureHandle>,
    pending_decode: VecDeque<(String, Vec<u8>)>,
    pending_upload: VecDeque<(String, DecodedImage)>,
    stage: Stage,
    stats: PipelineStats,
}

impl<S: AssetSource, D: ImageDecoder> StagedAssetPipeline<S, D> {
    pub fn new(source: S, decoder: D) -> Self {
        Self {
            source,
            decoder,
            cache: HashMap::new(),
            pending_decode: VecDeque::new(),
            pending_upload: VecDeque::new(),
            stage: Stage::Decode,
            stats: PipelineStats::default(),
        }
    }

    /// Return the texture for `key`, queueing it for decode on first request.
    ///
    /// Never fails: unreadable or malformed assets resolve to the placeholder.
    /// Repeated requests for the same key return the same handle whether the
    /// texture is in flight or resident.
    pub fn request_load(&mut self, key: &str) -> TextureHandle {
        self.stats.requested += 1;
        if let Some(texture) = self.cache.get(key) {
            self.stats.cache_hits += 1;
            tracing::trace!(key, state = ?texture.state(), "texture cache hit");
            return texture.clone();
        }

        let texture = match self.prepare(key) {
            Ok((texture, bytes)) => {
                self.pending_decode.push_back((key.to_string(), bytes));
                tracing::debug!(
                    key,
                    queued = self.pending_decode.len(),
                    "texture queued for decode"
                );
                texture
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "texture unavailable, using placeholder");
                self.stats.placeholders += 1;
                Arc::new(Texture::placeholder(key))
            }
        };

        self.cache.insert(key.to_string(), texture.clone());
        texture
    }

    /// Read bytes and allocate the final-size texture from the header.
    fn prepare(&self, key: &str) -> Result<(TextureHandle, Vec<u8>), AssetError> {
        let bytes = self.source.read(key)?;
        let header = read_png_header(&bytes)?;
        tracing::debug!(
            key,
            bytes = bytes.len(),
            width = header.width,
            height = header.height,
            "texture header read"
        );
        let texture = Arc::new(Texture::pending(key, header.width, header.height));
        Ok((texture, bytes))
    }

    /// Perform at most one unit of pipeline work. Call once per frame.
    pub fn advance_one_frame(&mut self) -> FrameWork {
        let _span = tracing::trace_span!("asset_pipeline").entered();

        // An unload can empty the stage's queue; switch rather than stall.
        match self.stage {
            Stage::Upload if self.pending_upload.is_empty() => self.stage = Stage::Decode,
            Stage::Decode if self.pending_decode.is_empty() && !self.pending_upload.is_empty() => {
                self.stage = Stage::Upload
            }
            _ => {}
        }

        match self.stage {
            Stage::Decode => self.decode_one(),
            Stage::Upload => self.upload_one(),
        }
    }

    fn decode_one(&mut self) -> FrameWork {
        let Some((key, bytes)) = self.pending_decode.pop_front() else {
            return FrameWork::Idle;
        };

        match self.decode_with_fallback(&key, &bytes) {
            Ok(image) => {
                tracing::debug!(
                    key = %key,
                    width = image.width,
                    height = image.height,
                    format = ?image.format,
                    "texture decoded"
                );
                self.stats.decoded += 1;
                self.pending_upload.push_back((key.clone(), image));
                self.stage = Stage::Upload;
                FrameWork::Decoded { key }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "texture decode failed, using placeholder");
                self.resolve_placeholder(&key);
                FrameWork::Failed { key }
            }
        }
    }

    fn decode_with_fallback(&self, key: &str, bytes: &[u8]) -> Result<DecodedImage, AssetError> {
        match self.decoder.decode(bytes, PixelFormat::Rgba8) {
            Ok(image) => Ok(image),
            Err(e) => {
                tracing::debug!(key, error = %e, "RGBA decode failed, trying RGB");
                self.decoder.decode(bytes, PixelFormat::Rgb8)
            }
        }
    }

    fn upload_one(&mut self) -> FrameWork {
        self.stage = Stage::Decode;
        let Some((key, image)) = self.pending_upload.pop_front() else {
            return FrameWork::Idle;
        };
        let Some(texture) = self.cache.get(&key).cloned() else {
            tracing::warn!(key = %key, "decoded texture no longer cached, dropping");
            return FrameWork::Idle;
        };

        let (width, height) = (image.width, image.height);
        match image.into_rgba() {
            Ok(rgba) => {
                if texture.size() != (width, height) {
                    tracing::warn!(
                        key = %key,
                        header = ?texture.size(),
                        decoded = ?(width, height),
                        "decoded size differs from header"
                    );
                }
                texture.fill(width, height, rgba);
                self.stats.uploaded += 1;
                tracing::info!(key = %key, width, height, "texture resident");
                FrameWork::Uploaded { key }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "texture upload failed, using placeholder");
                self.resolve_placeholder(&key);
                FrameWork::Failed { key }
            }
        }
    }

    fn resolve_placeholder(&mut self, key: &str) {
        if let Some(texture) = self.cache.get(key) {
            texture.fill_placeholder();
        }
        self.stats.placeholders += 1;
    }

    /// Cached handle for `key`, without requesting it.
    pub fn try_get(&self, key: &str) -> Option<TextureHandle> {
        self.cache.get(key).cloned()
    }

    /// Forget `key`. Outstanding handles keep their data; a later request
    /// starts over. Handles to a load still in flight get the placeholder so
    /// they never stay pending. Returns false if the key was unknown.
    pub fn unload(&mut self, key: &str) -> bool {
        let cached = self.cache.remove(key);
        let before = self.pending_decode.len() + self.pending_upload.len();
        self.pending_decode.retain(|(k, _)| k != key);
        self.pending_upload.retain(|(k, _)| k != key);
        let dequeued = self.pending_decode.len() + self.pending_upload.len() < before;
        if let Some(texture) = &cached {
            if texture.state() == TextureState::Pending {
                texture.fill_placeholder();
                self.stats.placeholders += 1;
                tracing::debug!(key, "in-flight texture unloaded, placeholder substituted");
            }
        }
        if cached.is_some() || dequeued {
            tracing::debug!(key, "texture unloaded");
        }
        cached.is_some() || dequeued
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending_decode.iter().any(|(k, _)| k == key)
            || self.pending_upload.iter().any(|(k, _)| k == key)
    }

    /// Keys still waiting for decode or upload.
    pub fn pending_count(&self) -> usize {
        self.pending_decode.len() + self.pending_upload.len()
    }

    /// Keys in the cache, including in-flight and placeholder textures.
    pub fn resident_count(&self) -> usize {
        self.cache.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}

impl<S, D> std::fmt::Debug for StagedAssetPipeline<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedAssetPipeline")
            .field("cached", &self.cache.len())
            .field("pending_decode", &self.pending_decode.len())
            .field("pending_upload", &self.pending_upload.len())
            .field("stage", &self.stage)
            .finish()
    }
}
