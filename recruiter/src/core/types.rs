//! Assembled crew types shared by assembly, kickoff and the driver.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::tools::Tool;

/// Model used when an agent definition omits `llm`.
pub const DEFAULT_LLM: &str = "anthropic/claude-sonnet-4-20250514";
/// Tool-use rounds allowed per task when `max_iter` is omitted.
pub const DEFAULT_MAX_ITER: u32 = 5;
/// Model requests per minute shared by every agent of a crew.
pub const DEFAULT_MAX_RPM: u32 = 10;

/// An executable agent: its definition plus the tools it may call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub llm: String,
    pub tools: Vec<Tool>,
    pub memory: bool,
    pub allow_delegation: bool,
    pub max_iter: u32,
    pub verbose: bool,
}

/// A task with placeholders resolved and references bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    /// Index of the owning agent in [`Crew::agents`].
    pub agent: usize,
    /// Indices of earlier tasks in [`Crew::tasks`] whose output feeds this one.
    ///
    /// `None` means no declared dependency; never `Some` of an empty list.
    pub context: Option<Vec<usize>>,
}

/// How tasks are scheduled. Only sequential execution exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Process {
    Sequential,
}

/// Handling of `context` names that do not match an earlier task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Drop the reference and keep assembling.
    #[default]
    Lenient,
    /// Fail assembly with a configuration error.
    Strict,
}

/// Agents and tasks composed into one sequential execution unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crew {
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
    pub process: Process,
    pub verbose: bool,
    pub max_rpm: u32,
}

impl Crew {
    pub fn agent_for(&self, task: &Task) -> Result<&Agent> {
        self.agents.get(task.agent).ok_or_else(|| {
            anyhow!(
                "task '{}' is assigned agent #{} but the crew has {} agents",
                task.name,
                task.agent,
                self.agents.len()
            )
        })
    }

    /// Tasks feeding `task`, in declared order.
    pub fn context_of(&self, task: &Task) -> Result<Vec<&Task>> {
        task.context
            .iter()
            .flatten()
            .map(|&idx| {
                self.tasks.get(idx).ok_or_else(|| {
                    anyhow!(
                        "task '{}' lists context task #{} but the crew has {} tasks",
                        task.name,
                        idx,
                        self.tasks.len()
                    )
                })
            })
            .collect()
    }
}

/// Output of one executed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub raw: String,
}

/// Result of a full crew run. `raw` is the final task's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewOutput {
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assemble::{assemble_agents, build_crew};
    use crate::test_support::{agent_spec, task};

    #[test]
    fn lookups_resolve_in_range_indices() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let mut report = task("report_task", 0);
        report.context = Some(vec![0]);
        let crew = build_crew(agents, vec![task("research_task", 0), report], 10);

        assert_eq!(crew.agent_for(&crew.tasks[1]).expect("agent").name, "researcher");
        let context = crew.context_of(&crew.tasks[1]).expect("context");
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].name, "research_task");
        assert!(crew.context_of(&crew.tasks[0]).expect("context").is_empty());
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let mut orphan = task("orphan_task", 4);
        orphan.context = Some(vec![7]);
        let crew = build_crew(agents, vec![orphan], 10);

        let err = crew.agent_for(&crew.tasks[0]).unwrap_err().to_string();
        assert!(err.contains("agent #4 but the crew has 1 agents"));
        let err = crew.context_of(&crew.tasks[0]).unwrap_err().to_string();
        assert!(err.contains("context task #7 but the crew has 1 tasks"));
    }
}
