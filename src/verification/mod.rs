//! Face verification providers.
//!
//! A [`VerificationProvider`] scores the similarity of a captured photo
//! against an employee's reference photo. The active provider is chosen once
//! at startup by [`select_provider`]; the check-in pipeline only ever sees
//! the trait object.

mod demo;
mod deterministic;
mod provider;
mod selector;

pub use demo::{DEFAULT_DEMO_SUFFIXES, DEMO_PROVIDER_NAME, DEMO_SCORE, DemoProvider};
pub use deterministic::{
    DEFAULT_MATCH_THRESHOLD, DETERMINISTIC_PROVIDER_NAME, DeterministicProvider, fingerprint,
};
pub use provider::{VerificationProvider, VerificationResult};
pub use selector::{ProviderKind, select_provider};
