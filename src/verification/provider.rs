//! The verification provider interface.

use crate::error::ProviderResult;

/// Outcome of comparing a capture against a reference image.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Similarity in `[0.0, 1.0]`. Higher = more similar.
    pub score: f64,
    /// The provider's own opinion of a match, against its internal default
    /// threshold. Advisory only: the pipeline decides with its configured
    /// threshold.
    pub matched: bool,
    /// Name of the provider that produced the score.
    pub provider_name: String,
}

/// Strategy for scoring the similarity of two images.
///
/// Implementations must not keep per-call state; the same provider instance
/// is shared by every concurrent check-in. A provider that calls out to a
/// remote service is expected to enforce its own deadline and report expiry
/// as [`ProviderError::Timeout`](crate::error::ProviderError::Timeout).
pub trait VerificationProvider: Send + Sync {
    /// Stable name recorded in the attendance ledger.
    fn name(&self) -> &str;

    /// Scores `capture` against `reference`.
    ///
    /// `employee_code` is a hint some providers use to pick behaviour
    /// variants; it must never be required.
    fn verify(
        &self,
        reference: &[u8],
        capture: &[u8],
        employee_code: Option<&str>,
    ) -> ProviderResult<VerificationResult>;
}
