//! Test-only helpers for definitions, executors and throwaway projects.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::spec::{AgentSpec, TaskSpec};
use crate::core::template::TemplateInputs;
use crate::core::types::Task;
use crate::io::executor::{ExecRequest, Executor};
use crate::io::init::{InitOptions, ProjectPaths, init_project};

/// Create a deterministic agent definition with no optional fields.
pub fn agent_spec(name: &str) -> AgentSpec {
    AgentSpec {
        name: name.to_string(),
        role: format!("{name} role"),
        goal: format!("{name} goal"),
        backstory: format!("{name} backstory"),
        llm: None,
        memory: None,
        allow_delegation: None,
        max_iter: None,
        verbose: None,
    }
}

/// Create a task definition whose templates use every job placeholder.
///
/// An empty `context` slice means the field is absent.
pub fn task_spec(name: &str, agent: &str, context: &[&str]) -> TaskSpec {
    TaskSpec {
        name: name.to_string(),
        description: format!(
            "{name}: find {{job_title}} with {{skills}}, \
             {{experience_level}} in {{location}}"
        ),
        expected_output: format!("{name} output for {{job_title}}"),
        agent: agent.to_string(),
        context: (!context.is_empty())
            .then(|| context.iter().map(|ctx| ctx.to_string()).collect()),
    }
}

/// Create an assembled task owned by the agent at `agent`.
pub fn task(name: &str, agent: usize) -> Task {
    Task {
        name: name.to_string(),
        description: format!("{name} description"),
        expected_output: format!("{name} expected output"),
        agent,
        context: None,
    }
}

pub fn job_inputs(
    job_title: &str,
    skills: &str,
    experience_level: &str,
    location: &str,
) -> TemplateInputs {
    [
        ("job_title", job_title),
        ("skills", skills),
        ("experience_level", experience_level),
        ("location", location),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Executor returning canned answers in order and recording every request.
///
/// Once the script runs out, answers fall back to `output of <task>`.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    outputs: RefCell<VecDeque<String>>,
    fail_at: Option<(usize, String)>,
    requests: RefCell<Vec<ExecRequest>>,
}

impl ScriptedExecutor {
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outputs: RefCell::new(outputs.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Fail the request with index `idx` (0-based) with `message`.
    pub fn failing_at(idx: usize, message: &str) -> Self {
        Self {
            fail_at: Some((idx, message.to_string())),
            ..Self::default()
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ExecRequest> {
        self.requests.borrow().clone()
    }
}

impl Executor for ScriptedExecutor {
    fn exec(&self, request: &ExecRequest) -> Result<String> {
        let idx = {
            let mut requests = self.requests.borrow_mut();
            requests.push(request.clone());
            requests.len() - 1
        };
        match &self.fail_at {
            Some((fail_idx, message)) if *fail_idx == idx => Err(anyhow!("{message}")),
            _ => Ok(self
                .outputs
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| format!("output of {}", request.task))),
        }
    }
}

/// A temporary project initialized with the shipped configuration.
pub struct TestProject {
    pub dir: TempDir,
    pub paths: ProjectPaths,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let (paths, _) =
            init_project(dir.path(), &InitOptions { force: false }).expect("init project");
        Self { dir, paths }
    }

    pub fn write_agents(&self, contents: &str) {
        fs::write(&self.paths.agents_path, contents).expect("write agents.yaml");
    }

    pub fn write_tasks(&self, contents: &str) {
        fs::write(&self.paths.tasks_path, contents).expect("write tasks.yaml");
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
