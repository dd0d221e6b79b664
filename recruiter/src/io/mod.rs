//! I/O helpers for recruiter commands.

pub mod anthropic;
pub mod config;
pub mod console;
pub mod credentials;
pub mod definitions;
pub mod executor;
pub mod init;
pub mod prompt;
pub mod report;
pub mod throttle;
pub mod tools;
