use crate::error::AssetError;

/// Channel layout requested from a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
        }
    }
}

/// Decoded pixels waiting for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Expand to tightly packed RGBA8, filling alpha with 255 for RGB input.
    pub fn into_rgba(self) -> Result<Vec<u8>, AssetError> {
        let pixels = self.width as usize * self.height as usize;
        let expected = pixels * self.format.bytes_per_pixel();
        if self.data.len() != expected {
            return Err(AssetError::BufferSize {
                expected,
                actual: self.data.len(),
            });
        }

        match self.format {
            PixelFormat::Rgba8 => Ok(self.data),
            PixelFormat::Rgb8 => {
                let mut rgba = Vec::with_capacity(pixels * 4);
                for px in self.data.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                Ok(rgba)
            }
        }
    }
}

/// Turns encoded bytes into a raw pixel buffer of the requested format.
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8], format: PixelFormat) -> Result<DecodedImage, AssetError>;
}

/// Decoder backed by the `image` crate; accepts any format it can sniff.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8], format: PixelFormat) -> Result<DecodedImage, AssetError> {
        let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
            format,
            reason: e.to_string(),
        })?;
        let (width, height, data) = match format {
            PixelFormat::Rgba8 => {
                let buf = image.to_rgba8();
                (buf.width(), buf.height(), buf.into_raw())
            }
            PixelFormat::Rgb8 => {
                let buf = image.to_rgb8();
                (buf.width(), buf.height(), buf.into_raw())
            }
        };
        Ok(DecodedImage {
            width,
            height,
            format,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_as_rgba() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        let decoded = ImageCrateDecoder
            .decode(&encode_png(&img), PixelFormat::Rgba8)
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.data.len(), 3 * 2 * 4);
        assert_eq!(&decoded.data[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn decodes_png_as_rgb() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let decoded = ImageCrateDecoder
            .decode(&encode_png(&img), PixelFormat::Rgb8)
            .unwrap();
        assert_eq!(decoded.format, PixelFormat::Rgb8);
        assert_eq!(decoded.data, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = ImageCrateDecoder
            .decode(b"definitely not an image", PixelFormat::Rgba8)
            .unwrap_err();
        assert!(matches!(
            err,
            AssetError::Decode {
                format: PixelFormat::Rgba8,
                ..
            }
        ));
    }

    #[test]
    fn rgb_expands_with_opaque_alpha() {
        let decoded = DecodedImage {
            width: 2,
            height: 1,
            format: PixelFormat::Rgb8,
            data: vec![9, 8, 7, 6, 5, 4],
        };
        assert_eq!(decoded.into_rgba().unwrap(), vec![9, 8, 7, 255, 6, 5, 4, 255]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let decoded = DecodedImage {
            width: 2,
            height: 2,
            format: PixelFormat::Rgba8,
            data: vec![0; 15],
        };
        assert!(matches!(
            decoded.into_rgba(),
            Err(AssetError::BufferSize {
                expected: 16,
                actual: 15
            })
        ));
    }
}
