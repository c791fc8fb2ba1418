//! Image loading from encoded bytes and `data:` URIs.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::ImageReader;

use super::{DecodeError, DecodedImage};

/// Decode an image from encoded bytes (PNG or JPEG), converting to RGBA8.
///
/// The format is sniffed from the content, not from any file name.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized,
/// `DecodeError::CorruptedFile` if decoding fails, and
/// `DecodeError::EmptyImage` for images with a zero dimension.
pub fn load_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    Ok(DecodedImage::new(width, height, rgba.into_raw()))
}

/// Decode an image from a `data:<mime>;base64,<payload>` URI.
///
/// The mime type is not trusted; the payload is sniffed like any other bytes.
pub fn load_data_uri(uri: &str) -> Result<DecodedImage, DecodeError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| DecodeError::InvalidDataUri("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUri("missing payload separator".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(DecodeError::InvalidDataUri(
            "only base64 payloads are supported".to_string(),
        ));
    }

    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::InvalidDataUri(e.to_string()))?;

    load_image(&bytes)
}
