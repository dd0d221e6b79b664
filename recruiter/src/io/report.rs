//! Persistence of the final report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Write `report` to `path`, creating parent directories and replacing any
/// previous report.
pub fn save_report(path: &Path, report: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, report).with_context(|| format!("write report {}", path.display()))?;
    info!(path = %path.display(), bytes = report.len(), "report saved");
    Ok(())
}
