//! Output encoding.

use crate::core::error::EncodeError;
use crate::core::types::Image;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// Prefix of every transport string.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Encode `image` as baseline JPEG at `quality` (1-100).
pub fn encode_jpeg(image: &Image, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Encode `image` as a `data:image/jpeg;base64,...` string.
pub fn to_data_url(image: &Image, quality: u8) -> Result<String, EncodeError> {
    let bytes = encode_jpeg(image, quality)?;
    Ok(format!("{DATA_URL_PREFIX}{}", BASE64.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::JPEG_QUALITY;
    use crate::effects::test_support::textured;

    #[test]
    fn test_encode_jpeg_magic() {
        let bytes = encode_jpeg(&textured(40, 30), JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_data_url_decodes_back() {
        let url = to_data_url(&textured(40, 30), JPEG_QUALITY).unwrap();
        let payload = url.strip_prefix(DATA_URL_PREFIX).unwrap();
        let bytes = BASE64.decode(payload).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }
}
