//! Stable exit codes for recruiter CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Configuration, templating, execution or I/O failure.
pub const FAILED: i32 = 1;
/// `ANTHROPIC_API_KEY` or `SERPER_API_KEY` is missing.
pub const MISSING_CREDENTIALS: i32 = 1;
