//! Attendance events recorded by the check-in pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EmployeeCode;

/// A recorded check-in decision.
///
/// Events are immutable once appended to a ledger. They hold only the
/// numeric outcome of a check-in, never the captured image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Ledger-assigned identifier.
    pub id: Uuid,
    /// The employee who checked in.
    pub employee_code: EmployeeCode,
    /// When the ledger recorded the event.
    pub timestamp: DateTime<Utc>,
    /// Similarity score in `[0.0, 1.0]`.
    pub score: f64,
    /// Whether the check-in was accepted.
    pub decision: bool,
    /// The verification provider that produced the score.
    pub provider_name: String,
    /// The threshold in effect when the decision was made.
    pub threshold_used: f64,
}

/// An event the pipeline asks a ledger to record.
///
/// The ledger assigns the identifier and timestamp on append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceEvent {
    /// The employee who checked in.
    pub employee_code: EmployeeCode,
    /// Similarity score in `[0.0, 1.0]`.
    pub score: f64,
    /// Whether the check-in was accepted.
    pub decision: bool,
    /// The verification provider that produced the score.
    pub provider_name: String,
    /// The threshold in effect when the decision was made.
    pub threshold_used: f64,
}

impl NewAttendanceEvent {
    /// Stamps the event with its ledger identity.
    pub fn into_event(self, id: Uuid, timestamp: DateTime<Utc>) -> AttendanceEvent {
        AttendanceEvent {
            id,
            employee_code: self.employee_code,
            timestamp,
            score: self.score,
            decision: self.decision,
            provider_name: self.provider_name,
            threshold_used: self.threshold_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_event() -> NewAttendanceEvent {
        NewAttendanceEvent {
            employee_code: EmployeeCode::parse("EMP001").unwrap(),
            score: 0.75,
            decision: false,
            provider_name: "deterministic".to_string(),
            threshold_used: 0.9,
        }
    }

    #[test]
    fn test_into_event_keeps_outcome() {
        let id = Uuid::new_v4();
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 2, 8, 15, 0).unwrap();
        let event = new_event().into_event(id, timestamp);

        assert_eq!(event.id, id);
        assert_eq!(event.timestamp, timestamp);
        assert_eq!(event.employee_code.as_str(), "EMP001");
        assert_eq!(event.score, 0.75);
        assert!(!event.decision);
        assert_eq!(event.threshold_used, 0.9);
    }

    #[test]
    fn test_serialized_event_has_only_outcome_fields() {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 2, 8, 15, 0).unwrap();
        let event = new_event().into_event(Uuid::nil(), timestamp);
        let json = serde_json::to_value(&event).unwrap();

        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "decision",
                "employee_code",
                "id",
                "provider_name",
                "score",
                "threshold_used",
                "timestamp"
            ]
        );
        assert_eq!(json["timestamp"], "2026-03-02T08:15:00Z");
    }
}
