use crate::error::AssetError;

/// Largest width or height accepted from a header.
pub const MAX_TEXTURE_DIMENSION: u32 = 16384;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Dimensions read from an encoded image without decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
}

/// Read width and height from a PNG signature and IHDR chunk header.
///
/// ```text
/// 0..8    signature
/// 8..12   IHDR length (big-endian)
/// 12..16  "IHDR"
/// 16..20  width  (big-endian)
/// 20..24  height (big-endian)
/// ```
pub fn read_png_header(bytes: &[u8]) -> Result<ImageHeader, AssetError> {
    if bytes.len() < 24 {
        return Err(AssetError::MalformedHeader("too short for PNG header"));
    }
    if bytes[..8] != PNG_SIGNATURE {
        return Err(AssetError::MalformedHeader("missing PNG signature"));
    }
    if &bytes[12..16] != b"IHDR" {
        return Err(AssetError::MalformedHeader("first chunk is not IHDR"));
    }

    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    if width == 0 || height == 0 || width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION
    {
        return Err(AssetError::DimensionsOutOfRange { width, height });
    }

    Ok(ImageHeader { width, height })
}
