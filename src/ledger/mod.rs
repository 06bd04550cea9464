//! Attendance ledger.
//!
//! An append-only record of check-in decisions. The ledger assigns each
//! event its identifier and timestamp; nothing on the check-in path ever
//! updates or deletes an event.

mod jsonl;
mod memory;

use uuid::Uuid;

use crate::error::LedgerResult;
use crate::models::{AttendanceEvent, NewAttendanceEvent};

pub use jsonl::JsonlLedger;
pub use memory::InMemoryLedger;

/// Append-only store of attendance events.
///
/// Implementations must accept concurrent appends, for the same employee
/// or different ones.
pub trait AttendanceLedger: Send + Sync {
    /// Records an event, stamping it with an id and the current time.
    fn append(&self, event: NewAttendanceEvent) -> LedgerResult<AttendanceEvent>;

    /// Lists events matching `filter`, newest first.
    fn list(&self, filter: &EventFilter) -> LedgerResult<Vec<AttendanceEvent>>;

    /// Returns a single event by id.
    fn get(&self, id: Uuid) -> LedgerResult<Option<AttendanceEvent>>;
}

/// Selection of events to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events for this employee.
    pub employee_code: Option<String>,
    /// At most this many events.
    pub limit: Option<usize>,
}

impl EventFilter {
    /// Events for a single employee.
    pub fn for_employee(code: impl Into<String>) -> Self {
        Self {
            employee_code: Some(code.into()),
            limit: None,
        }
    }

    /// Caps the number of returned events.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, event: &AttendanceEvent) -> bool {
        self.employee_code
            .as_deref()
            .is_none_or(|code| event.employee_code.as_str() == code)
    }

    /// Applies the filter to events stored oldest first.
    pub(crate) fn select(&self, events: &[AttendanceEvent]) -> Vec<AttendanceEvent> {
        events
            .iter()
            .rev()
            .filter(|event| self.matches(event))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
