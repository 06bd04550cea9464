//! The check-in transaction.
//!
//! [`CheckInPipeline`] turns an employee code and a captured photo into an
//! accept/reject decision and records it in the attendance ledger.

mod pipeline;

pub use pipeline::CheckInPipeline;
