//! In-memory employee directory.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::info;

use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{
    Employee, EmployeeCode, EmployeeStatus, MAX_DISPLAY_NAME_LEN, ReferenceImage,
};

use super::EmployeeDirectory;

/// Data for registering a new employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    /// Unique business key; validated on create.
    pub code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Initial status.
    pub status: EmployeeStatus,
    /// The stored reference photo.
    pub reference_image: ReferenceImage,
}

/// A partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    /// New display name.
    pub display_name: Option<String>,
    /// New status.
    pub status: Option<EmployeeStatus>,
    /// Replacement reference photo.
    pub reference_image: Option<ReferenceImage>,
}

/// Thread-safe directory kept entirely in memory.
///
/// Codes of removed employees stay reserved, since their attendance events
/// remain in the ledger under the same code.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<HashMap<EmployeeCode, Employee>>,
    retired: RwLock<HashSet<EmployeeCode>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new employee.
    ///
    /// Fails with `InvalidCode` for malformed codes and `DuplicateCode` when
    /// the code is registered or belonged to a removed employee.
    pub fn create(&self, new: NewEmployee) -> DirectoryResult<Employee> {
        let code = EmployeeCode::parse(&new.code)?;
        let display_name = validate_display_name(&new.display_name)?;

        let mut employees = self.write()?;
        if employees.contains_key(&code) || self.retired()?.contains(&code) {
            return Err(DirectoryError::DuplicateCode {
                code: code.to_string(),
            });
        }

        let now = Utc::now();
        let employee = Employee {
            code: code.clone(),
            display_name,
            status: new.status,
            reference_image: new.reference_image,
            created_at: now,
            updated_at: now,
        };
        employees.insert(code, employee.clone());

        info!(employee_code = %employee.code, status = employee.status.as_str(), "employee created");
        Ok(employee)
    }

    /// Applies a partial update to an existing employee.
    pub fn update(&self, code: &str, update: EmployeeUpdate) -> DirectoryResult<Employee> {
        let display_name = update
            .display_name
            .as_deref()
            .map(validate_display_name)
            .transpose()?;

        let not_found = || DirectoryError::NotFound {
            code: code.to_string(),
        };
        let key = EmployeeCode::parse(code).map_err(|_| not_found())?;

        let mut employees = self.write()?;
        let employee = employees.get_mut(&key).ok_or_else(not_found)?;

        if let Some(display_name) = display_name {
            employee.display_name = display_name;
        }
        if let Some(status) = update.status {
            employee.status = status;
        }
        if let Some(reference_image) = update.reference_image {
            employee.reference_image = reference_image;
        }
        employee.updated_at = Utc::now();

        info!(employee_code = code, status = employee.status.as_str(), "employee updated");
        Ok(employee.clone())
    }

    /// Returns true if `code` is registered or was retired by [`remove`].
    ///
    /// [`remove`]: Self::remove
    pub fn is_code_taken(&self, code: &EmployeeCode) -> DirectoryResult<bool> {
        let employees = self.read()?;
        Ok(employees.contains_key(code) || self.retired()?.contains(code))
    }

    /// Removes an employee, returning the removed record.
    ///
    /// Attendance events already recorded for the employee are kept, and the
    /// code is retired so it cannot be registered again.
    pub fn remove(&self, code: &str) -> DirectoryResult<Employee> {
        let not_found = || DirectoryError::NotFound {
            code: code.to_string(),
        };
        let key = EmployeeCode::parse(code).map_err(|_| not_found())?;

        let mut employees = self.write()?;
        let removed = employees.remove(&key).ok_or_else(not_found)?;
        self.retired_mut()?.insert(key);
        drop(employees);

        info!(employee_code = code, "employee removed");
        Ok(removed)
    }

    /// Lists employees, most recently created first.
    pub fn list(&self, active_only: bool) -> DirectoryResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .read()?
            .values()
            .filter(|employee| !active_only || employee.is_active())
            .cloned()
            .collect();

        employees.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(employees)
    }

    /// Number of registered employees.
    pub fn len(&self) -> DirectoryResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if no employees are registered.
    pub fn is_empty(&self) -> DirectoryResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> DirectoryResult<RwLockReadGuard<'_, HashMap<EmployeeCode, Employee>>> {
        self.employees.read().map_err(|_| DirectoryError::Storage {
            message: "directory lock poisoned".to_string(),
        })
    }

    fn write(&self) -> DirectoryResult<RwLockWriteGuard<'_, HashMap<EmployeeCode, Employee>>> {
        self.employees.write().map_err(|_| DirectoryError::Storage {
            message: "directory lock poisoned".to_string(),
        })
    }

    // Always taken after `employees`.
    fn retired(&self) -> DirectoryResult<RwLockReadGuard<'_, HashSet<EmployeeCode>>> {
        self.retired.read().map_err(|_| DirectoryError::Storage {
            message: "directory lock poisoned".to_string(),
        })
    }

    fn retired_mut(&self) -> DirectoryResult<RwLockWriteGuard<'_, HashSet<EmployeeCode>>> {
        self.retired.write().map_err(|_| DirectoryError::Storage {
            message: "directory lock poisoned".to_string(),
        })
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn find_by_code(&self, code: &str) -> DirectoryResult<Option<Employee>> {
        // Malformed codes cannot be registered, so they are simply absent.
        let Ok(key) = EmployeeCode::parse(code) else {
            return Ok(None);
        };
        Ok(self.read()?.get(&key).cloned())
    }
}

/// Trims `name` and checks it is non-empty and within the length limit.
pub(crate) fn validate_display_name(name: &str) -> DirectoryResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DirectoryError::InvalidField {
            field: "display_name".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(DirectoryError::InvalidField {
            field: "display_name".to_string(),
            message: format!("must be at most {MAX_DISPLAY_NAME_LEN} characters"),
        });
    }
    Ok(trimmed.to_string())
}
