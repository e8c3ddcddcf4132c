//! Conformance testing harness for klib.
//!
//! This crate provides:
//! - Fixture verify: run JSON fixture cases against `klib-core` in strict and
//!   hardened mode
//! - Execution: map a fixture's function name and inputs onto the core calls
//! - Report generation: human-readable + machine-readable conformance reports
//! - Structured logging: canonical JSONL records plus a SHA-256 artifact index

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
