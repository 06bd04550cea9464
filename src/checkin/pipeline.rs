//! Check-in orchestration.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{VerificationSettings, validate_threshold};
use crate::directory::EmployeeDirectory;
use crate::error::{CheckInError, CheckInResult, ConfigResult, ProviderError};
use crate::imaging::decode_image_data;
use crate::ledger::AttendanceLedger;
use crate::models::{CheckInOutcome, Employee, NewAttendanceEvent};
use crate::verification::{VerificationProvider, select_provider};

/// Evaluates check-ins against the employee directory and records the
/// outcome in the attendance ledger.
///
/// The pipeline holds no per-request state, so one instance can serve any
/// number of concurrent check-ins.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use attendance_checkin::checkin::CheckInPipeline;
/// use attendance_checkin::config::VerificationSettings;
/// use attendance_checkin::directory::InMemoryDirectory;
/// use attendance_checkin::ledger::InMemoryLedger;
///
/// let pipeline = CheckInPipeline::from_settings(
///     &VerificationSettings::default(),
///     Arc::new(InMemoryDirectory::new()),
///     Arc::new(InMemoryLedger::new()),
/// )
/// .unwrap();
///
/// assert_eq!(pipeline.threshold(), 0.80);
/// assert_eq!(pipeline.provider_name(), "deterministic");
/// ```
#[derive(Clone)]
pub struct CheckInPipeline {
    directory: Arc<dyn EmployeeDirectory>,
    ledger: Arc<dyn AttendanceLedger>,
    provider: Arc<dyn VerificationProvider>,
    threshold: f64,
}

impl CheckInPipeline {
    /// Creates a pipeline from explicit collaborators.
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
        provider: Arc<dyn VerificationProvider>,
        threshold: f64,
    ) -> Self {
        Self {
            directory,
            ledger,
            provider,
            threshold,
        }
    }

    /// Creates a pipeline using the provider and threshold named in
    /// `settings`.
    ///
    /// Fails if the provider is unknown or the threshold is out of range.
    pub fn from_settings(
        settings: &VerificationSettings,
        directory: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
    ) -> ConfigResult<Self> {
        let threshold = validate_threshold(settings.similarity_threshold)?;
        let provider = select_provider(settings)?;
        Ok(Self::new(directory, ledger, provider, threshold))
    }

    /// The similarity threshold every decision is made against.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Name of the active verification provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Runs a single check-in.
    ///
    /// Validation failures return an error and record nothing. Once the
    /// provider has produced a score, exactly one event is appended whether
    /// the check-in is accepted or rejected.
    pub fn check_in(
        &self,
        employee_code: &str,
        capture_image: &str,
    ) -> CheckInResult<CheckInOutcome> {
        let employee = self
            .directory
            .find_by_code(employee_code)?
            .ok_or_else(|| CheckInError::EmployeeNotFound {
                code: employee_code.to_string(),
            })?;

        if !employee.is_active() {
            warn!(employee_code, "check-in attempted by inactive employee");
            return Err(CheckInError::EmployeeInactive {
                code: employee_code.to_string(),
            });
        }

        let capture = decode_image_data(capture_image).inspect_err(|e| {
            warn!(employee_code, error = %e, "capture image rejected");
        })?;
        debug!(
            employee_code,
            format = ?capture.format,
            width = capture.width,
            height = capture.height,
            "capture image decoded"
        );

        let reference = read_reference(&employee)?;
        let score = self.score(&employee, &reference, &capture.bytes)?;
        let decision = score >= self.threshold;

        let event = self.ledger.append(NewAttendanceEvent {
            employee_code: employee.code.clone(),
            score,
            decision,
            provider_name: self.provider.name().to_string(),
            threshold_used: self.threshold,
        })?;

        info!(
            employee_code,
            event_id = %event.id,
            score,
            decision,
            threshold = self.threshold,
            provider = %event.provider_name,
            "check-in recorded"
        );
        Ok(CheckInOutcome::from(&event))
    }

    fn score(&self, employee: &Employee, reference: &[u8], capture: &[u8]) -> CheckInResult<f64> {
        let verification_failed = |message: String| CheckInError::VerificationFailed {
            provider: self.provider.name().to_string(),
            message,
        };

        let result = self
            .provider
            .verify(reference, capture, Some(employee.code.as_str()))
            .map_err(|e| verification_failed(e.to_string()))?;

        if !result.score.is_finite() || !(0.0..=1.0).contains(&result.score) {
            let out_of_range = ProviderError::ScoreOutOfRange {
                score: result.score,
            };
            return Err(verification_failed(out_of_range.to_string()));
        }
        Ok(result.score)
    }
}

/// Reads the reference photo, releasing the file handle before returning.
fn read_reference(employee: &Employee) -> CheckInResult<Vec<u8>> {
    employee.reference_image.read_all().map_err(|e| {
        error!(
            employee_code = %employee.code,
            location = ?employee.reference_image.location(),
            error = %e,
            "reference image unreadable"
        );
        CheckInError::ReferenceImageUnreadable {
            code: employee.code.to_string(),
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryDirectory, NewEmployee};
    use crate::error::{ErrorKind, ImageDecodeError};
    use crate::imaging::to_data_uri;
    use crate::ledger::{EventFilter, InMemoryLedger};
    use crate::models::{EmployeeStatus, ReferenceImage};
    use crate::test_support::{FailingProvider, StubProvider, png_bytes, png_data_uri};
    use crate::verification::DeterministicProvider;
    use std::path::PathBuf;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        ledger: Arc<InMemoryLedger>,
    }

    impl Fixture {
        fn new() -> Self {
            let directory = Arc::new(InMemoryDirectory::new());
            directory
                .create(NewEmployee {
                    code: "EMP100".to_string(),
                    display_name: "Ana Torres".to_string(),
                    status: EmployeeStatus::Active,
                    reference_image: ReferenceImage::from(png_bytes(10)),
                })
                .unwrap();
            directory
                .create(NewEmployee {
                    code: "EMP200".to_string(),
                    display_name: "Luis Romero".to_string(),
                    status: EmployeeStatus::Inactive,
                    reference_image: ReferenceImage::from(png_bytes(20)),
                })
                .unwrap();
            Self {
                directory,
                ledger: Arc::new(InMemoryLedger::new()),
            }
        }

        fn pipeline(&self, provider: Arc<dyn VerificationProvider>, threshold: f64) -> CheckInPipeline {
            CheckInPipeline::new(
                self.directory.clone(),
                self.ledger.clone(),
                provider,
                threshold,
            )
        }

        fn deterministic(&self) -> CheckInPipeline {
            self.pipeline(Arc::new(DeterministicProvider::new()), 0.80)
        }

        fn event_count(&self) -> usize {
            self.ledger.len().unwrap()
        }
    }

    #[test]
    fn test_identical_capture_is_accepted() {
        let fixture = Fixture::new();
        let outcome = fixture
            .deterministic()
            .check_in("EMP100", &png_data_uri(10))
            .unwrap();

        assert!(outcome.decision);
        assert_eq!(outcome.score, 1.0);
        assert_eq!(outcome.threshold_used, 0.80);
        assert_eq!(outcome.employee_code, "EMP100");
        assert_eq!(outcome.provider_name, "deterministic");
        assert_eq!(fixture.event_count(), 1);

        let event = fixture.ledger.get(outcome.event_id).unwrap().unwrap();
        assert_eq!(event.timestamp, outcome.timestamp);
        assert!(event.decision);
    }

    #[test]
    fn test_different_capture_is_rejected_and_recorded() {
        let fixture = Fixture::new();
        let outcome = fixture
            .deterministic()
            .check_in("EMP100", &png_data_uri(99))
            .unwrap();

        assert!(!outcome.decision);
        assert!((0.2..=0.5).contains(&outcome.score));
        assert_eq!(fixture.event_count(), 1);
    }

    #[test]
    fn test_unknown_employee_records_nothing() {
        let fixture = Fixture::new();
        let error = fixture
            .deterministic()
            .check_in("NOPE", &png_data_uri(10))
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_inactive_employee_records_nothing() {
        let fixture = Fixture::new();
        let error = fixture
            .deterministic()
            .check_in("EMP200", &png_data_uri(20))
            .unwrap_err();

        assert!(matches!(error, CheckInError::EmployeeInactive { .. }));
        assert_eq!(error.kind(), ErrorKind::InvalidState);
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_invalid_base64_is_invalid_input() {
        let fixture = Fixture::new();
        let error = fixture
            .deterministic()
            .check_in("EMP100", "not-base64!!!")
            .unwrap_err();

        assert!(matches!(
            error,
            CheckInError::InvalidImage(ImageDecodeError::Base64 { .. })
        ));
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_non_image_capture_is_invalid_input() {
        let fixture = Fixture::new();
        let error = fixture
            .deterministic()
            .check_in("EMP100", &to_data_uri("jpeg", b"fake capture image"))
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_threshold_decides_not_provider() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(Arc::new(StubProvider { score: 0.75 }), 0.90);
        let outcome = pipeline.check_in("EMP100", &png_data_uri(10)).unwrap();

        assert!(!outcome.decision);
        assert_eq!(outcome.score, 0.75);
        assert_eq!(outcome.threshold_used, 0.90);

        let events = fixture.ledger.list(&EventFilter::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].threshold_used, 0.90);
        assert_eq!(events[0].provider_name, "stub");
    }

    #[test]
    fn test_score_equal_to_threshold_is_accepted() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(Arc::new(StubProvider { score: 0.80 }), 0.80);
        assert!(pipeline.check_in("EMP100", &png_data_uri(10)).unwrap().decision);
    }

    #[test]
    fn test_provider_failure_is_invalid_input() {
        let fixture = Fixture::new();
        let error = fixture
            .pipeline(Arc::new(FailingProvider), 0.80)
            .check_in("EMP100", &png_data_uri(10))
            .unwrap_err();

        match &error {
            CheckInError::VerificationFailed { provider, message } => {
                assert_eq!(provider, "failing");
                assert!(message.contains("model unavailable"));
            }
            other => panic!("Expected VerificationFailed, got {other:?}"),
        }
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let fixture = Fixture::new();
        for score in [1.5, -0.1, f64::NAN] {
            let error = fixture
                .pipeline(Arc::new(StubProvider { score }), 0.80)
                .check_in("EMP100", &png_data_uri(10))
                .unwrap_err();
            assert!(matches!(error, CheckInError::VerificationFailed { .. }));
        }
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_unreadable_reference_is_invalid_state() {
        let fixture = Fixture::new();
        fixture
            .directory
            .create(NewEmployee {
                code: "EMP300".to_string(),
                display_name: "Sin Foto".to_string(),
                status: EmployeeStatus::Active,
                reference_image: ReferenceImage::File(PathBuf::from("/nonexistent/emp300.png")),
            })
            .unwrap();

        let error = fixture
            .deterministic()
            .check_in("EMP300", &png_data_uri(10))
            .unwrap_err();

        assert!(matches!(error, CheckInError::ReferenceImageUnreadable { .. }));
        assert_eq!(error.kind(), ErrorKind::InvalidState);
        assert_eq!(fixture.event_count(), 0);
    }

    #[test]
    fn test_demo_provider_accepts_demo_codes() {
        let fixture = Fixture::new();
        fixture
            .directory
            .create(NewEmployee {
                code: "KIOSK-DEMO".to_string(),
                display_name: "Demo".to_string(),
                status: EmployeeStatus::Active,
                reference_image: ReferenceImage::from(png_bytes(1)),
            })
            .unwrap();

        let settings = VerificationSettings {
            provider: "demo".to_string(),
            ..VerificationSettings::default()
        };
        let pipeline = CheckInPipeline::from_settings(
            &settings,
            fixture.directory.clone(),
            fixture.ledger.clone(),
        )
        .unwrap();

        let outcome = pipeline.check_in("KIOSK-DEMO", &png_data_uri(77)).unwrap();
        assert!(outcome.decision);
        assert_eq!(outcome.score, 0.95);
        assert_eq!(outcome.provider_name, "demo");
    }

    #[test]
    fn test_from_settings_rejects_bad_configuration() {
        let fixture = Fixture::new();
        let unknown = VerificationSettings {
            provider: "facenet".to_string(),
            ..VerificationSettings::default()
        };
        assert!(
            CheckInPipeline::from_settings(&unknown, fixture.directory.clone(), fixture.ledger.clone())
                .is_err()
        );

        let bad_threshold = VerificationSettings {
            similarity_threshold: 1.5,
            ..VerificationSettings::default()
        };
        assert!(
            CheckInPipeline::from_settings(
                &bad_threshold,
                fixture.directory.clone(),
                fixture.ledger.clone()
            )
            .is_err()
        );
    }

    #[test]
    fn test_ledger_holds_no_capture_bytes() {
        let fixture = Fixture::new();
        let capture = png_data_uri(10);
        let outcome = fixture.deterministic().check_in("EMP100", &capture).unwrap();

        let event = fixture.ledger.get(outcome.event_id).unwrap().unwrap();
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains(crate::imaging::strip_data_uri(&capture)));
    }
}
