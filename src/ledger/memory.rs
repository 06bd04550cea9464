//! In-memory attendance ledger.

use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AttendanceEvent, NewAttendanceEvent};

use super::{AttendanceLedger, EventFilter};

/// Ledger kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    events: RwLock<Vec<AttendanceEvent>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events.
    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.events.read().map_err(|_| LedgerError::Poisoned)?.len())
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl AttendanceLedger for InMemoryLedger {
    fn append(&self, event: NewAttendanceEvent) -> LedgerResult<AttendanceEvent> {
        let mut events = self.events.write().map_err(|_| LedgerError::Poisoned)?;
        let event = event.into_event(Uuid::new_v4(), Utc::now());
        events.push(event.clone());
        Ok(event)
    }

    fn list(&self, filter: &EventFilter) -> LedgerResult<Vec<AttendanceEvent>> {
        let events = self.events.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(filter.select(&events))
    }

    fn get(&self, id: Uuid) -> LedgerResult<Option<AttendanceEvent>> {
        let events = self.events.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(events.iter().find(|event| event.id == id).cloned())
    }
}
