//! Deterministic reference provider.
//!
//! Scores two byte streams from their SHA-256 fingerprints instead of a
//! biometric model, so the same inputs always produce the same score.
//! Identical bytes score 1.0; anything else lands in the failing band
//! `[0.2, 0.5]`.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ProviderResult;

use super::provider::{VerificationProvider, VerificationResult};

/// Name under which the provider is selected and recorded.
pub const DETERMINISTIC_PROVIDER_NAME: &str = "deterministic";

/// The provider's internal match threshold, independent of the pipeline's.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.80;

const FINGERPRINT_PREFIX_LEN: usize = 8;
const LENGTH_WEIGHT: f64 = 0.3;
const PREFIX_WEIGHT: f64 = 0.7;
const MISMATCH_FLOOR: f64 = 0.2;
const MISMATCH_CEILING: f64 = 0.5;

/// Lower-case hex SHA-256 digest of `bytes`.
///
/// ```
/// use attendance_checkin::verification::fingerprint;
///
/// assert_eq!(
///     fingerprint(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Fingerprint-based scorer with no model behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicProvider;

impl DeterministicProvider {
    /// Creates the provider.
    pub fn new() -> Self {
        Self
    }

    /// Computes the similarity score for two byte streams.
    pub fn score(reference: &[u8], capture: &[u8]) -> f64 {
        let reference_fingerprint = fingerprint(reference);
        let capture_fingerprint = fingerprint(capture);

        if reference_fingerprint == capture_fingerprint {
            return 1.0;
        }

        let composite = LENGTH_WEIGHT * length_similarity(reference.len(), capture.len())
            + PREFIX_WEIGHT * prefix_similarity(&reference_fingerprint, &capture_fingerprint);

        round_to_4(composite.clamp(MISMATCH_FLOOR, MISMATCH_CEILING))
    }

    pub(crate) fn evaluate(
        reference: &[u8],
        capture: &[u8],
        provider_name: &str,
    ) -> VerificationResult {
        let score = Self::score(reference, capture);
        let matched = score >= DEFAULT_MATCH_THRESHOLD;

        debug!(
            provider = provider_name,
            score,
            matched,
            reference_len = reference.len(),
            capture_len = capture.len(),
            "fingerprint comparison"
        );

        VerificationResult {
            score,
            matched,
            provider_name: provider_name.to_string(),
        }
    }
}

impl VerificationProvider for DeterministicProvider {
    fn name(&self) -> &str {
        DETERMINISTIC_PROVIDER_NAME
    }

    fn verify(
        &self,
        reference: &[u8],
        capture: &[u8],
        _employee_code: Option<&str>,
    ) -> ProviderResult<VerificationResult> {
        Ok(Self::evaluate(reference, capture, self.name()))
    }
}

/// Ratio of the shorter length to the longer one; 0/0 counts as 0.
fn length_similarity(a: usize, b: usize) -> f64 {
    a.min(b) as f64 / a.max(b).max(1) as f64
}

/// Fraction of the first eight fingerprint characters that agree
/// positionally. Zero when either fingerprint is shorter than eight.
fn prefix_similarity(a: &str, b: &str) -> f64 {
    if a.len() < FINGERPRINT_PREFIX_LEN || b.len() < FINGERPRINT_PREFIX_LEN {
        return 0.0;
    }

    let matching = a
        .bytes()
        .zip(b.bytes())
        .take(FINGERPRINT_PREFIX_LEN)
        .filter(|(x, y)| x == y)
        .count();

    matching as f64 / FINGERPRINT_PREFIX_LEN as f64
}

fn round_to_4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
