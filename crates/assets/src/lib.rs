//! Asset pipeline: staged texture loading that spreads decode and upload
//! across frames.
//!
//! `request_load` always hands back a usable [`TextureHandle`] immediately.
//! Pixel data arrives later, one unit of work per frame:
//!
//! ```text
//! request_load:        read bytes, parse header, allocate final-size texture
//! advance_one_frame N:   decode one entry
//! advance_one_frame N+1: upload that entry into its texture
//! ```
//!
//! # Invariants
//! - A key maps to exactly one texture handle for the lifetime of the cache.
//! - At most one decode or one upload happens per `advance_one_frame` call.
//! - I/O and decode failures resolve to the placeholder texture, never to an error.

mod decode;
mod error;
mod header;
mod pipeline;
mod source;
mod texture;

pub use decode::{DecodedImage, ImageCrateDecoder, ImageDecoder, PixelFormat};
pub use error::AssetError;
pub use header::{ImageHeader, MAX_TEXTURE_DIMENSION, read_png_header};
pub use pipeline::{FrameWork, PipelineStats, Stage, StagedAssetPipeline};
pub use source::{AssetSource, FsSource, MemorySource};
pub use texture::{
    PLACEHOLDER_CELL, PLACEHOLDER_SIZE, Texture, TextureHandle, TextureState, placeholder_pixels,
};

pub fn crate_info() -> &'static str {
    "sidescroll-assets v0.1.0"
}
