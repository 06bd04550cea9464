//! File-backed attendance ledger.
//!
//! Events are stored one JSON object per line, in append order. The file is
//! replayed into memory on open; appends go to disk before they become
//! visible to readers.
//!
//! An append either lands as one complete line or leaves the file at its
//! previous length. A final line torn by a crash mid-write is dropped on the
//! next open.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AttendanceEvent, NewAttendanceEvent};

use super::{AttendanceLedger, EventFilter};

/// Ledger persisted as a JSON-lines file.
#[derive(Debug)]
pub struct JsonlLedger {
    path: PathBuf,
    file: Mutex<File>,
    events: RwLock<Vec<AttendanceEvent>>,
}

impl JsonlLedger {
    /// Opens the ledger at `path`, creating the file and its parent
    /// directories when missing.
    ///
    /// Fails with `Corrupt` if a complete line is not a valid event. An
    /// unterminated final line that does not parse is truncated away.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let io_error = |e: io::Error| LedgerError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;

        let mut content = Vec::new();
        file.read_to_end(&mut content).map_err(io_error)?;

        let mut events = Vec::new();
        let mut offset = 0;
        for (index, line) in content.split_inclusive(|&b| b == b'\n').enumerate() {
            let start = offset;
            offset += line.len();
            let terminated = line.ends_with(b"\n");
            let body = line.strip_suffix(b"\n").unwrap_or(line);
            if body.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice::<AttendanceEvent>(body) {
                Ok(event) => {
                    if !terminated {
                        file.write_all(b"\n")
                            .and_then(|()| file.sync_data())
                            .map_err(io_error)?;
                    }
                    events.push(event);
                }
                Err(e) if !terminated => {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        bytes = body.len(),
                        error = %e,
                        "dropping incomplete final ledger line"
                    );
                    file.set_len(start as u64)
                        .and_then(|()| file.sync_data())
                        .map_err(io_error)?;
                }
                Err(e) => {
                    return Err(LedgerError::Corrupt {
                        path: path.display().to_string(),
                        line: index + 1,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(path = %path.display(), events = events.len(), "attendance ledger opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
            events: RwLock::new(events),
        })
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttendanceLedger for JsonlLedger {
    fn append(&self, event: NewAttendanceEvent) -> LedgerResult<AttendanceEvent> {
        let event = event.into_event(Uuid::new_v4(), Utc::now());
        let mut line = serde_json::to_string(&event).map_err(|e| LedgerError::Serialization {
            message: e.to_string(),
        })?;
        line.push('\n');

        // Holding the file lock while updating the cache keeps the in-memory
        // order identical to the on-disk order.
        let mut file = self.file.lock().map_err(|_| LedgerError::Poisoned)?;
        append_line(&mut *file, line.as_bytes()).map_err(|e| LedgerError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        self.events
            .write()
            .map_err(|_| LedgerError::Poisoned)?
            .push(event.clone());

        debug!(event_id = %event.id, employee_code = %event.employee_code, "event appended");
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

/// The file operations an append needs.
trait LedgerFile: Write {
    fn size(&self) -> io::Result<u64>;
    fn sync(&self) -> io::Result<()>;
    fn truncate(&self, size: u64) -> io::Result<()>;
}

impl LedgerFile for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&self, size: u64) -> io::Result<()> {
        self.set_len(size)
    }
}

/// Writes and syncs `line`, restoring the previous length on any failure.
fn append_line<F: LedgerFile + ?Sized>(file: &mut F, line: &[u8]) -> io::Result<()> {
    let start = file.size()?;
    let written = file.write_all(line).and_then(|()| file.sync());
    if let Err(e) = written {
        if let Err(rollback) = file.truncate(start).and_then(|()| file.sync()) {
            warn!(error = %rollback, "failed to roll back partial ledger write");
        }
        return Err(e);
    }
    Ok(())
}
