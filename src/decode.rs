//! Payload decoding.

use image::RgbImage;
use thiserror::Error;

/// Owned RGB8 raster produced from one frame payload.
pub type DecodedImage = RgbImage;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not a decodable image: {0}")]
    DecodeFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        DecodeError::DecodeFailure(Box::new(err))
    }
}

/// Turns a frame payload into a raster image. Implementations keep no state
/// between calls.
pub trait ImageDecoder {
    fn decode(&self, payload: &[u8]) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate codecs (JPEG as streamed by the camera).
#[derive(Clone, Copy, Debug, Default)]
pub struct CodecDecoder;

impl ImageDecoder for CodecDecoder {
    fn decode(&self, payload: &[u8]) -> Result<DecodedImage, DecodeError> {
        decode(payload)
    }
}

pub fn decode(payload: &[u8]) -> Result<DecodedImage, DecodeError> {
    let image = image::load_from_memory(payload)?;
    Ok(image.into_rgb8())
}
