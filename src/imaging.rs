//! Decoding of caller-supplied images.
//!
//! Kiosk clients send photos as data-URI strings
//! (`data:image/<subtype>;base64,<payload>`). Raw base64 without the header
//! is accepted too. Whatever the declared subtype, the payload must parse as
//! an image in any format the `image` crate understands.

use std::io::Cursor;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use image::{ImageFormat, ImageReader, Limits};

use crate::error::ImageDecodeError;

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Largest accepted width or height, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 8192;

/// Largest buffer a single decode may allocate.
pub const MAX_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

/// Image bytes that have been checked to parse as an image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// The encoded image bytes, exactly as supplied.
    pub bytes: Vec<u8>,
    /// The detected container format.
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DecodedImage {
    /// Preferred file extension for the detected format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// Returns the base64 payload of a data-URI, or the input unchanged when
/// it has no header.
///
/// ```
/// use attendance_checkin::imaging::strip_data_uri;
///
/// assert_eq!(strip_data_uri("data:image/png;base64,AAAA"), "AAAA");
/// assert_eq!(strip_data_uri("AAAA"), "AAAA");
/// ```
pub fn strip_data_uri(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

/// Decodes a data-URI or raw base64 string and checks that it is an image.
pub fn decode_image_data(data: &str) -> Result<DecodedImage, ImageDecodeError> {
    let payload: String = strip_data_uri(data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if payload.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    let bytes = LENIENT_BASE64
        .decode(payload.as_bytes())
        .map_err(|e| ImageDecodeError::Base64 {
            message: e.to_string(),
        })?;

    parse_image(bytes)
}

/// Checks that raw bytes parse as an image.
///
/// The decode runs under [`MAX_IMAGE_SIDE`] and [`MAX_DECODE_ALLOC`], so a
/// small payload that inflates to a huge pixel buffer is rejected before it
/// is allocated.
pub fn parse_image(bytes: Vec<u8>) -> Result<DecodedImage, ImageDecodeError> {
    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    let unparseable = |message: String| ImageDecodeError::Unparseable { message };

    let mut reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| unparseable(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| unparseable("unrecognised image format".to_string()))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_SIDE);
    limits.max_image_height = Some(MAX_IMAGE_SIDE);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    let decoded = reader.decode().map_err(|e| unparseable(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    Ok(DecodedImage {
        bytes,
        format,
        width,
        height,
    })
}

/// Encodes bytes as a data-URI with the given MIME subtype.
pub fn to_data_uri(subtype: &str, bytes: &[u8]) -> String {
    format!(
        "data:image/{subtype};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[test]
    fn test_decodes_data_uri() {
        let png = png_bytes(7);
        let decoded = decode_image_data(&to_data_uri("jpeg", &png)).unwrap();

        assert_eq!(decoded.bytes, png);
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (4, 4));
        assert_eq!(decoded.extension(), "png");
    }

    #[test]
    fn test_accepts_raw_base64() {
        let png = png_bytes(7);
        let raw = base64::engine::general_purpose::STANDARD.encode(&png);
        assert_eq!(decode_image_data(&raw).unwrap().bytes, png);
    }

    #[test]
    fn test_accepts_wrapped_and_unpadded_base64() {
        let png = png_bytes(9);
        let encoded = base64::engine::general_purpose::STANDARD_NO_PAD.encode(&png);
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("data:image/png;base64,{head}\n{tail}");
        assert_eq!(decode_image_data(&wrapped).unwrap().bytes, png);
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(
            decode_image_data("not-base64!!!"),
            Err(ImageDecodeError::Base64 { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert_eq!(
            decode_image_data("data:image/png;base64,").unwrap_err(),
            ImageDecodeError::Empty
        );
        assert_eq!(decode_image_data("").unwrap_err(), ImageDecodeError::Empty);
    }

    #[test]
    fn test_rejects_base64_that_is_not_an_image() {
        let data = to_data_uri("jpeg", b"fake capture image");
        assert!(matches!(
            decode_image_data(&data),
            Err(ImageDecodeError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_image() {
        let png = png_bytes(3);
        let truncated = png[..png.len() / 2].to_vec();
        assert!(matches!(
            parse_image(truncated),
            Err(ImageDecodeError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_rejects_dimensions_over_the_limit() {
        let wide = image::GrayImage::new(MAX_IMAGE_SIDE + 1, 1);
        let mut png = Vec::new();
        wide.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let err = decode_image_data(&to_data_uri("png", &png)).unwrap_err();
        assert!(matches!(err, ImageDecodeError::Unparseable { .. }));
    }

    #[test]
    fn test_accepts_dimensions_at_the_limit() {
        let tall = image::GrayImage::new(1, MAX_IMAGE_SIDE);
        let mut png = Vec::new();
        tall.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let decoded = parse_image(png).unwrap();
        assert_eq!((decoded.width, decoded.height), (1, MAX_IMAGE_SIDE));
    }

    #[test]
    fn test_strip_data_uri_splits_on_first_comma_only() {
        assert_eq!(strip_data_uri("data:x,AB,CD"), "AB,CD");
    }
}
