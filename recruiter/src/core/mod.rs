//! Deterministic, pure logic shared by the recruiter.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! definitions and return deterministic outputs suitable for tests.

pub mod assemble;
pub mod requirements;
pub mod spec;
pub mod template;
pub mod tools;
pub mod types;
