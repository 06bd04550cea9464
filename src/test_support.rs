//! Fixtures shared by unit tests.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};

use crate::error::{ProviderError, ProviderResult};
use crate::imaging::to_data_uri;
use crate::verification::{VerificationProvider, VerificationResult};

/// A small PNG whose pixels depend on `seed`.
pub fn png_bytes(seed: u8) -> Vec<u8> {
    let image: RgbImage = ImageBuffer::from_fn(4, 4, |x, y| {
        Rgb([
            seed,
            seed.wrapping_add(x as u8 * 16),
            seed.wrapping_add(y as u8 * 16),
        ])
    });

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// [`png_bytes`] as a data-URI.
pub fn png_data_uri(seed: u8) -> String {
    to_data_uri("png", &png_bytes(seed))
}

/// Returns a fixed score for every comparison.
pub struct StubProvider {
    pub score: f64,
}

impl VerificationProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn verify(&self, _: &[u8], _: &[u8], _: Option<&str>) -> ProviderResult<VerificationResult> {
        Ok(VerificationResult {
            score: self.score,
            matched: self.score >= 0.8,
            provider_name: "stub".to_string(),
        })
    }
}

/// Fails every comparison with a backend error.
pub struct FailingProvider;

impl VerificationProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn verify(&self, _: &[u8], _: &[u8], _: Option<&str>) -> ProviderResult<VerificationResult> {
        Err(ProviderError::Backend {
            message: "model unavailable".to_string(),
        })
    }
}
