//! Attendance check-in service with pluggable face verification.
//!
//! An employee submits a captured photo; the service compares it against the
//! employee's stored reference photo using the configured verification
//! provider, decides against a similarity threshold, and records the outcome
//! in an append-only attendance ledger.

#![warn(missing_docs)]

pub mod api;
pub mod checkin;
pub mod config;
pub mod directory;
pub mod error;
pub mod imaging;
pub mod ledger;
pub mod models;
pub mod verification;

#[cfg(test)]
mod test_support;
