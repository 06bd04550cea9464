//! The result of a single check-in attempt.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::AttendanceEvent;

/// Summary of an evaluated check-in, accepted or rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInOutcome {
    /// Whether the check-in was accepted.
    pub decision: bool,
    /// The provider's similarity score.
    pub score: f64,
    /// The threshold the score was compared against.
    pub threshold_used: f64,
    /// The employee who checked in.
    pub employee_code: String,
    /// When the attempt was recorded.
    pub timestamp: DateTime<Utc>,
    /// Identifier of the recorded event.
    pub event_id: Uuid,
    /// The provider that produced the score.
    pub provider_name: String,
}

impl From<&AttendanceEvent> for CheckInOutcome {
    fn from(event: &AttendanceEvent) -> Self {
        Self {
            decision: event.decision,
            score: event.score,
            threshold_used: event.threshold_used,
            employee_code: event.employee_code.to_string(),
            timestamp: event.timestamp,
            event_id: event.id,
            provider_name: event.provider_name.clone(),
        }
    }
}
