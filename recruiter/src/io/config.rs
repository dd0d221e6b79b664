//! Recruiter settings stored in `recruiter.toml` at the project root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::{ContextPolicy, DEFAULT_LLM, DEFAULT_MAX_RPM};

/// Recruiter settings (TOML).
///
/// Every field is optional in the file; missing fields take the defaults the
/// pipeline was designed around. Relative paths resolve against the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecruiterConfig {
    /// Directory holding `agents.yaml` and `tasks.yaml`.
    pub config_dir: PathBuf,

    /// Where the final report is written (overwritten on every run).
    pub output_path: PathBuf,

    /// Plain-text log file for the run.
    pub log_path: PathBuf,

    /// Model requests per minute, shared across all agents.
    pub max_rpm: u32,

    /// Model used by agents whose definition omits `llm`.
    pub default_llm: String,

    /// What to do with `context` names that do not match an earlier task.
    pub context_policy: ContextPolicy,

    pub llm: LlmConfig,

    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Anthropic API.
    pub base_url: String,
    /// Upper bound on tokens generated per model request.
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    /// Serper search endpoint.
    pub search_url: String,
    /// Number of organic results requested per search.
    pub search_results: u32,
    /// Truncate scraped page text beyond this many bytes.
    pub scrape_limit_bytes: usize,
    pub request_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_url: "https://google.serper.dev/search".to_string(),
            search_results: 10,
            scrape_limit_bytes: 20_000,
            request_timeout_secs: 30,
        }
    }
}

impl Default for RecruiterConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
            output_path: PathBuf::from("output/report.md"),
            log_path: PathBuf::from("logs/app.log"),
            max_rpm: DEFAULT_MAX_RPM,
            default_llm: DEFAULT_LLM.to_string(),
            context_policy: ContextPolicy::default(),
            llm: LlmConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl RecruiterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.config_dir.as_os_str().is_empty() {
            return Err(anyhow!("config_dir must be non-empty"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(anyhow!("output_path must be non-empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(anyhow!("log_path must be non-empty"));
        }
        if self.max_rpm == 0 {
            return Err(anyhow!("max_rpm must be > 0"));
        }
        if self.default_llm.trim().is_empty() {
            return Err(anyhow!("default_llm must be non-empty"));
        }
        if self.llm.max_tokens == 0 {
            return Err(anyhow!("llm.max_tokens must be > 0"));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(anyhow!("llm.request_timeout_secs must be > 0"));
        }
        if self.tools.search_results == 0 {
            return Err(anyhow!("tools.search_results must be > 0"));
        }
        if self.tools.scrape_limit_bytes == 0 {
            return Err(anyhow!("tools.scrape_limit_bytes must be > 0"));
        }
        if self.tools.request_timeout_secs == 0 {
            return Err(anyhow!("tools.request_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load settings from a TOML file.
///
/// If the file is missing, returns `RecruiterConfig::default()`.
pub fn load_config(path: &Path) -> Result<RecruiterConfig> {
    if !path.exists() {
        let cfg = RecruiterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RecruiterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(cfg)
}

/// Serialize settings as TOML, as written by `recruiter init`.
pub fn render_config(cfg: &RecruiterConfig) -> Result<String> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    Ok(buf)
}
