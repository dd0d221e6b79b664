//! Project layout and scaffolding for `recruiter init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::config::{RecruiterConfig, render_config};
use super::definitions::{AGENTS_FILE, TASKS_FILE};

pub const SETTINGS_FILE: &str = "recruiter.toml";

const DEFAULT_AGENTS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/agents.yaml"));
const DEFAULT_TASKS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/tasks.yaml"));
const ENV_EXAMPLE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/.env.example"));

/// Canonical paths of a recruiter project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub settings_path: PathBuf,
    pub env_path: PathBuf,
    pub env_example_path: PathBuf,
    pub config_dir: PathBuf,
    pub agents_path: PathBuf,
    pub tasks_path: PathBuf,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
}

impl ProjectPaths {
    /// Paths under `root` using the default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_settings(root, &RecruiterConfig::default())
    }

    /// Paths under `root`; relative settings paths resolve against it.
    pub fn with_settings(root: impl Into<PathBuf>, settings: &RecruiterConfig) -> Self {
        let root = root.into();
        let config_dir = root.join(&settings.config_dir);
        Self {
            settings_path: root.join(SETTINGS_FILE),
            env_path: root.join(".env"),
            env_example_path: root.join(".env.example"),
            agents_path: config_dir.join(AGENTS_FILE),
            tasks_path: config_dir.join(TASKS_FILE),
            output_path: root.join(&settings.output_path),
            log_path: root.join(&settings.log_path),
            config_dir,
            root,
        }
    }
}

/// Options for `init_project`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing files.
    pub force: bool,
}

/// Files written or left alone by `init_project`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Write the default configuration into `root`.
///
/// Existing files are kept unless `options.force` is set.
pub fn init_project(root: &Path, options: &InitOptions) -> Result<(ProjectPaths, InitReport)> {
    let paths = ProjectPaths::new(root);
    let mut report = InitReport::default();
    let settings = render_config(&RecruiterConfig::default())?;

    for (path, contents) in [
        (&paths.agents_path, DEFAULT_AGENTS),
        (&paths.tasks_path, DEFAULT_TASKS),
        (&paths.env_example_path, ENV_EXAMPLE),
        (&paths.settings_path, settings.as_str()),
    ] {
        if path.exists() && !options.force {
            debug!(path = %path.display(), "keeping existing file");
            report.skipped.push(path.clone());
            continue;
        }
        write_file(path, contents)?;
        report.written.push(path.clone());
    }
    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "project initialized"
    );
    Ok((paths, report))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write file {}", path.display()))
}
