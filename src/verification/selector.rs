//! Provider selection from configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::config::VerificationSettings;
use crate::error::{ConfigError, ConfigResult};

use super::demo::{DEMO_PROVIDER_NAME, DemoProvider};
use super::deterministic::{DETERMINISTIC_PROVIDER_NAME, DeterministicProvider};
use super::provider::VerificationProvider;

/// The closed set of providers this build knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Fingerprint scoring with no fast path.
    Deterministic,
    /// Fingerprint scoring with the demo employee fast path.
    Demo,
}

impl ProviderKind {
    /// Every known provider, in documentation order.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Deterministic, ProviderKind::Demo];

    /// The configuration name of the provider.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Deterministic => DETERMINISTIC_PROVIDER_NAME,
            ProviderKind::Demo => DEMO_PROVIDER_NAME,
        }
    }

    fn known_names() -> String {
        Self::ALL
            .iter()
            .map(ProviderKind::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownProvider {
                name: name.to_string(),
                known: Self::known_names(),
            })
    }
}

/// Builds the provider named in `settings`.
///
/// Called once at startup; an unknown name is a configuration error.
///
/// ```
/// use attendance_checkin::config::VerificationSettings;
/// use attendance_checkin::verification::select_provider;
///
/// let settings = VerificationSettings::default();
/// let provider = select_provider(&settings).unwrap();
/// assert_eq!(provider.name(), "deterministic");
/// ```
pub fn select_provider(
    settings: &VerificationSettings,
) -> ConfigResult<Arc<dyn VerificationProvider>> {
    let kind: ProviderKind = settings.provider.parse()?;

    let provider: Arc<dyn VerificationProvider> = match kind {
        ProviderKind::Deterministic => Arc::new(DeterministicProvider::new()),
        ProviderKind::Demo => Arc::new(DemoProvider::new(settings.demo.suffixes.iter().cloned())),
    };

    info!(provider = %kind, "verification provider selected");
    Ok(provider)
}
