//! Typed agent and task definitions parsed from YAML mappings.
//!
//! Every entry is checked field by field and all problems are collected, so a
//! broken configuration file is reported in one pass instead of failing on the
//! first missing key at assembly time.

use anyhow::{Result, bail};
use serde_yaml::{Mapping, Value};

/// Agent definition as declared in `agents.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub llm: Option<String>,
    pub memory: Option<bool>,
    pub allow_delegation: Option<bool>,
    pub max_iter: Option<u32>,
    pub verbose: Option<bool>,
}

/// Task definition as declared in `tasks.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub agent: String,
    /// Names of earlier tasks whose output feeds this one, in declared order.
    pub context: Option<Vec<String>>,
}

impl AgentSpec {
    /// Parse every agent entry, preserving file order.
    pub fn parse_all(entries: &Mapping) -> Result<Vec<AgentSpec>> {
        let mut errors = Vec::new();
        let mut specs = Vec::with_capacity(entries.len());
        for (name, fields) in named_entries(entries, "agent", &mut errors) {
            let mut reader = FieldReader::new("agent", &name, fields, &mut errors);
            let role = reader.required_str("role");
            let goal = reader.required_str("goal");
            let backstory = reader.required_str("backstory");
            let llm = reader.optional_str("llm");
            let memory = reader.optional_bool("memory");
            let allow_delegation = reader.optional_bool("allow_delegation");
            let max_iter = reader.optional_u32("max_iter");
            let verbose = reader.optional_bool("verbose");
            if let (Some(role), Some(goal), Some(backstory)) = (role, goal, backstory) {
                specs.push(AgentSpec {
                    name,
                    role,
                    goal,
                    backstory,
                    llm,
                    memory,
                    allow_delegation,
                    max_iter,
                    verbose,
                });
            }
        }
        finish(specs, errors, "agent")
    }
}

impl TaskSpec {
    /// Parse every task entry, preserving file order.
    pub fn parse_all(entries: &Mapping) -> Result<Vec<TaskSpec>> {
        let mut errors = Vec::new();
        let mut specs = Vec::with_capacity(entries.len());
        for (name, fields) in named_entries(entries, "task", &mut errors) {
            let mut reader = FieldReader::new("task", &name, fields, &mut errors);
            let description = reader.required_str("description");
            let expected_output = reader.required_str("expected_output");
            let agent = reader.required_str("agent");
            let context = reader.optional_str_list("context");
            if let (Some(description), Some(expected_output), Some(agent)) =
                (description, expected_output, agent)
            {
                specs.push(TaskSpec {
                    name,
                    description,
                    expected_output,
                    agent,
                    context,
                });
            }
        }
        finish(specs, errors, "task")
    }
}

fn finish<T>(specs: Vec<T>, errors: Vec<String>, kind: &str) -> Result<Vec<T>> {
    if !errors.is_empty() {
        bail!("invalid {kind} definitions:\n- {}", errors.join("\n- "));
    }
    Ok(specs)
}

fn named_entries<'a>(
    entries: &'a Mapping,
    kind: &str,
    errors: &mut Vec<String>,
) -> Vec<(String, &'a Mapping)> {
    let mut out = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let Some(name) = key.as_str() else {
            errors.push(format!("{kind} name {key:?} must be a string"));
            continue;
        };
        match value {
            Value::Mapping(fields) => out.push((name.to_string(), fields)),
            _ => errors.push(format!("{kind} '{name}' must be a mapping of fields")),
        }
    }
    out
}

/// Reads typed fields from one entry, recording problems instead of failing.
struct FieldReader<'a> {
    kind: &'static str,
    name: &'a str,
    fields: &'a Mapping,
    errors: &'a mut Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(
        kind: &'static str,
        name: &'a str,
        fields: &'a Mapping,
        errors: &'a mut Vec<String>,
    ) -> Self {
        Self {
            kind,
            name,
            fields,
            errors,
        }
    }

    fn invalid(&mut self, key: &str, expected: &str) {
        self.errors.push(format!(
            "{} '{}': field '{}' must be {}",
            self.kind, self.name, key, expected
        ));
    }

    fn required_str(&mut self, key: &str) -> Option<String> {
        match self.fields.get(key) {
            None | Some(Value::Null) => {
                self.errors.push(format!(
                    "{} '{}': missing required field '{}'",
                    self.kind, self.name, key
                ));
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.invalid(key, "a string");
                None
            }
        }
    }

    fn optional_str(&mut self, key: &str) -> Option<String> {
        match self.fields.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.invalid(key, "a string");
                None
            }
        }
    }

    fn optional_bool(&mut self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.invalid(key, "a boolean");
                None
            }
        }
    }

    fn optional_u32(&mut self, key: &str) -> Option<u32> {
        match self.fields.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) if n > 0 => Some(n),
                _ => {
                    self.invalid(key, "a positive integer");
                    None
                }
            },
        }
    }

    fn optional_str_list(&mut self, key: &str) -> Option<Vec<String>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Sequence(items)) => {
                let names: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                if names.is_none() {
                    self.invalid(key, "a list of task names");
                }
                names
            }
            Some(_) => {
                self.invalid(key, "a list of task names");
                None
            }
        }
    }
}
