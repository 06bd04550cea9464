//! Core data models for the attendance check-in service.

mod attendance_event;
mod check_in;
mod employee;

pub use attendance_event::{AttendanceEvent, NewAttendanceEvent};
pub use check_in::CheckInOutcome;
pub use employee::{
    Employee, EmployeeCode, EmployeeStatus, MAX_CODE_LEN, MAX_DISPLAY_NAME_LEN, ReferenceImage,
};
