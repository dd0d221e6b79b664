//! Placeholder interpolation for task templates.
//!
//! Task definitions name runtime values as `{job_title}`. The doubled form
//! `{{ job_title }}` is accepted too. Any other brace text, such as a JSON
//! example, is left as written.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

/// Named runtime values substituted into task templates.
pub type TemplateInputs = BTreeMap<String, String>;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("placeholder regex should be valid")
});

/// Renders named placeholders, failing on any name missing from the inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, template: &str, inputs: &TemplateInputs) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut unresolved: Vec<&str> = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER_RE.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            out.push_str(&template[last..whole.start()]);
            match inputs.get(name.as_str()) {
                Some(value) => out.push_str(value),
                None => {
                    if !unresolved.contains(&name.as_str()) {
                        unresolved.push(name.as_str());
                    }
                    out.push_str(whole.as_str());
                }
            }
            last = whole.end();
        }
        out.push_str(&template[last..]);

        if !unresolved.is_empty() {
            let names: Vec<String> = unresolved
                .iter()
                .map(|name| format!("{{{name}}}"))
                .collect();
            bail!(
                "unresolved placeholder {} (available: {})",
                names.join(", "),
                inputs.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }
        Ok(out)
    }
}
