use crate::decode::PixelFormat;

/// Errors from reading, parsing and decoding image assets.
///
/// The pipeline logs these and substitutes the placeholder; they only reach
/// callers that use the collaborators directly.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("malformed image header: {0}")]
    MalformedHeader(&'static str),
    #[error("image dimensions {width}x{height} out of range")]
    DimensionsOutOfRange { width: u32, height: u32 },
    #[error("decode as {format:?} failed: {reason}")]
    Decode { format: PixelFormat, reason: String },
    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}
