//! Tracing setup for the recruiter binary.
//!
//! Two sinks:
//!
//! - **stderr**: diagnostics filtered by `RUST_LOG` (default `warn`), compact
//!   format. Console output of the run itself goes to stdout.
//! - **log file** (`logs/app.log` by default): every `info` and above event of
//!   this crate, appended across runs, unaffected by `RUST_LOG`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const FILE_FILTER: &str = "recruiter=info";

/// Initialize the global subscriber, optionally mirroring to `log_path`.
///
/// # Example
/// ```bash
/// RUST_LOG=recruiter=debug recruiter run
/// ```
pub fn init(log_path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(filter);

    let file = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(FILE_FILTER)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init()
        .context("install tracing subscriber")
}
