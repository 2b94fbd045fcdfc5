//! Image decode/encode with an explicit format mapping.
//!
//! Decoding sniffs the container from the byte stream; only the four formats
//! the pipeline accepts are recognized, anything else fails loudly. Encoding
//! picks the encoder from the *source* format: webp sources are re-emitted
//! as high-quality JPEG since no native webp encoder is available.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

/// JPEG quality for jpeg-sourced derivatives.
const JPEG_QUALITY: u8 = 85;
/// JPEG quality for webp-sourced derivatives, bumped to offset the extra
/// lossy generation.
const JPEG_QUALITY_FROM_WEBP: u8 = 90;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("unsupported image format: {0}")]
    Unsupported(String),

    #[error("failed to encode image as {format}: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },
}

/// Container format of a decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl SourceFormat {
    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::Gif => Some(SourceFormat::Gif),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    /// MIME type of the bytes [`encode`] produces for this source format.
    pub fn content_type(self) -> &'static str {
        match self {
            SourceFormat::Jpeg | SourceFormat::WebP => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::Gif => "image/gif",
        }
    }
}

/// A decoded source image. Shared read-only across fan-out tasks; resizing
/// always produces a new raster.
#[derive(Debug)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: SourceFormat,
}

/// Decode a source byte stream, sniffing the container format.
pub fn decode(data: &[u8]) -> Result<DecodedImage, CodecError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(image::ImageError::IoError(e)))?;

    let format = match reader.format() {
        Some(format) => SourceFormat::from_image_format(format)
            .ok_or_else(|| CodecError::Unsupported(format!("{:?}", format)))?,
        None => return Err(CodecError::Unsupported("unrecognized container".to_string())),
    };

    let image = reader.decode().map_err(CodecError::Decode)?;

    Ok(DecodedImage { image, format })
}

/// Encode a raster for the given source format, returning the bytes and
/// their MIME type.
pub fn encode(image: &DynamicImage, format: SourceFormat) -> Result<(Vec<u8>, &'static str), CodecError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    match format {
        SourceFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            image
                .write_with_encoder(encoder)
                .map_err(|source| CodecError::Encode {
                    format: "jpeg",
                    source,
                })?;
        }
        SourceFormat::WebP => {
            let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY_FROM_WEBP);
            image
                .write_with_encoder(encoder)
                .map_err(|source| CodecError::Encode {
                    format: "jpeg",
                    source,
                })?;
        }
        SourceFormat::Png => {
            image
                .write_to(&mut cursor, ImageFormat::Png)
                .map_err(|source| CodecError::Encode {
                    format: "png",
                    source,
                })?;
        }
        SourceFormat::Gif => {
            image
                .write_to(&mut cursor, ImageFormat::Gif)
                .map_err(|source| CodecError::Encode {
                    format: "gif",
                    source,
                })?;
        }
    }

    Ok((buffer, format.content_type()))
}
