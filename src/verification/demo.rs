//! Demo provider.
//!
//! Wraps the deterministic provider and accepts every capture for employees
//! whose code ends with one of the configured suffixes, so a kiosk can be
//! demonstrated without matching photos. It is a separately named provider:
//! selecting `deterministic` never short-circuits on employee naming.

use tracing::info;

use crate::error::ProviderResult;

use super::deterministic::DeterministicProvider;
use super::provider::{VerificationProvider, VerificationResult};

/// Name under which the provider is selected and recorded.
pub const DEMO_PROVIDER_NAME: &str = "demo";

/// Score returned for demo employee codes.
pub const DEMO_SCORE: f64 = 0.95;

/// Suffixes used when none are configured.
pub const DEFAULT_DEMO_SUFFIXES: [&str; 2] = ["001", "DEMO"];

/// Deterministic scoring with a fast path for demo employee codes.
#[derive(Debug, Clone)]
pub struct DemoProvider {
    suffixes: Vec<String>,
}

impl DemoProvider {
    /// Creates a demo provider that fast-paths codes ending with any of
    /// `suffixes`. Empty suffixes are ignored.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Returns true if `code` qualifies for the fast path.
    pub fn is_demo_code(&self, code: &str) -> bool {
        self.suffixes.iter().any(|suffix| code.ends_with(suffix.as_str()))
    }
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_SUFFIXES)
    }
}

impl VerificationProvider for DemoProvider {
    fn name(&self) -> &str {
        DEMO_PROVIDER_NAME
    }

    fn verify(
        &self,
        reference: &[u8],
        capture: &[u8],
        employee_code: Option<&str>,
    ) -> ProviderResult<VerificationResult> {
        if let Some(code) = employee_code.filter(|code| self.is_demo_code(code)) {
            info!(employee_code = code, "demo fast path");
            return Ok(VerificationResult {
                score: DEMO_SCORE,
                matched: true,
                provider_name: self.name().to_string(),
            });
        }

        Ok(DeterministicProvider::evaluate(reference, capture, self.name()))
    }
}
