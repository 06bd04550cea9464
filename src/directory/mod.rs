//! Employee directory.
//!
//! The check-in pipeline only needs [`EmployeeDirectory::find_by_code`].
//! [`InMemoryDirectory`] adds the admin operations (create, update, remove,
//! list) used by the employee endpoints, and can be seeded from a YAML
//! roster with [`load_roster`].

mod memory;
mod photos;
mod roster;

use crate::error::DirectoryResult;
use crate::models::Employee;

pub use memory::{EmployeeUpdate, InMemoryDirectory, NewEmployee};
pub(crate) use memory::validate_display_name;
pub use photos::PhotoStore;
pub use roster::{RosterEntry, RosterFile, load_roster};

/// Lookup of employees by code.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the employee registered under `code`, or `None`.
    fn find_by_code(&self, code: &str) -> DirectoryResult<Option<Employee>>;
}
