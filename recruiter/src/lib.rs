//! Recruitment crew orchestrator.
//!
//! Loads agent and task definitions from YAML, assembles them into a
//! sequential crew and runs it against a language-model backend to produce a
//! candidate report. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (definition parsing, templating,
//!   assembly). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, environment, HTTP,
//!   terminal). Isolated behind small seams such as
//!   [`io::executor::Executor`] so tests never touch the network.
//!
//! Orchestration modules ([`crew`], [`kickoff`], [`driver`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod core;
pub mod crew;
pub mod driver;
pub mod exit_codes;
pub mod io;
pub mod kickoff;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
