//! Loader for the YAML agent and task definition files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

pub const AGENTS_FILE: &str = "agents.yaml";
pub const TASKS_FILE: &str = "tasks.yaml";

/// A parsed definition file: names mapped to their fields, in file order.
#[derive(Debug, Clone)]
pub struct DefinitionFile {
    pub path: PathBuf,
    pub entries: Mapping,
}

impl DefinitionFile {
    /// Defined names in file order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().map(key_name).collect()
    }
}

fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => format!("{other:?}"),
    }
}

/// Top level of a definition file.
///
/// A repeated name keeps the position of its first occurrence and the fields
/// of its last one.
enum TopLevel {
    Empty,
    Entries {
        entries: Mapping,
        duplicates: Vec<String>,
    },
}

impl<'de> Deserialize<'de> for TopLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TopLevelVisitor)
    }
}

struct TopLevelVisitor;

impl<'de> Visitor<'de> for TopLevelVisitor {
    type Value = TopLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of names to definitions")
    }

    fn visit_unit<E: de::Error>(self) -> Result<TopLevel, E> {
        Ok(TopLevel::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<TopLevel, E> {
        Ok(TopLevel::Empty)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TopLevel, A::Error> {
        let mut entries = Mapping::new();
        let mut duplicates = Vec::new();
        while let Some((key, value)) = map.next_entry::<Value, Value>()? {
            if let Some(previous) = entries.get_mut(&key) {
                duplicates.push(key_name(&key));
                *previous = value;
            } else {
                entries.insert(key, value);
            }
        }
        Ok(TopLevel::Entries {
            entries,
            duplicates,
        })
    }
}

/// Load `filename` from `config_dir`.
///
/// Fails if the file is missing or is not a YAML mapping. A name defined
/// twice keeps its last definition and is logged at `warn`. Field-level
/// checks are left to [`crate::core::spec`].
pub fn load_definitions(config_dir: &Path, filename: &str) -> Result<DefinitionFile> {
    let path = config_dir.join(filename);
    if !path.is_file() {
        bail!("Configuration file not found: {}", path.display());
    }
    info!(path = %path.display(), "loading configuration");
    let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let top: TopLevel =
        serde_yaml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    let (entries, duplicates) = match top {
        TopLevel::Entries {
            entries,
            duplicates,
        } => (entries, duplicates),
        TopLevel::Empty => bail!("{} is empty", path.display()),
    };
    for name in &duplicates {
        warn!(
            path = %path.display(),
            name = %name,
            "name defined more than once, keeping the last definition"
        );
    }

    let file = DefinitionFile { path, entries };
    info!(path = %file.path.display(), names = ?file.names(), "definitions loaded");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_with_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_definitions(temp.path(), AGENTS_FILE).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Configuration file not found:"));
        assert!(msg.contains("agents.yaml"));
    }

    #[test]
    fn names_follow_file_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join(TASKS_FILE),
            "zeta:\n  a: 1\nalpha:\n  a: 2\nmid:\n  a: 3\n",
        )
        .expect("write");
        let file = load_definitions(temp.path(), TASKS_FILE).expect("load");
        assert_eq!(file.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_names_keep_the_last_definition() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join(TASKS_FILE),
            "task1:\n  a: 1\ntask2:\n  a: 5\ntask1:\n  a: 2\n",
        )
        .expect("write");
        let file = load_definitions(temp.path(), TASKS_FILE).expect("load");
        assert_eq!(file.names(), vec!["task1", "task2"]);
        let fields = file.entries.get("task1").expect("task1");
        assert_eq!(fields.get("a").and_then(Value::as_u64), Some(2));
    }

    #[test]
    fn empty_file_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(AGENTS_FILE), "").expect("write");
        let err = load_definitions(temp.path(), AGENTS_FILE).unwrap_err();
        assert!(err.to_string().ends_with("agents.yaml is empty"));
    }

    #[test]
    fn top_level_list_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(AGENTS_FILE), "- researcher\n").expect("write");
        let err = load_definitions(temp.path(), AGENTS_FILE).unwrap_err();
        assert!(format!("{err:#}").contains("expected a mapping of names to definitions"));
    }
}
