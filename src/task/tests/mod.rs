//! Unit tests for the task module.
//!
//! Tests are organised by concern: domain validation, the status state
//! machine, each in-memory adapter, the orchestration service, and
//! concurrency behaviour.

mod domain_tests;
mod service_tests;
