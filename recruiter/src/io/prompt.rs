//! Prompt builder for agent task execution.

use anyhow::Result;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::types::{Agent, Task};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");
const TASK_TEMPLATE: &str = include_str!("prompts/task.md");

#[derive(Debug, Clone, Serialize)]
struct ToolContext {
    name: &'static str,
    description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct AgentContext<'a> {
    role: &'a str,
    goal: &'a str,
    backstory: &'a str,
    tools: Vec<ToolContext>,
}

impl<'a> AgentContext<'a> {
    fn from_agent(agent: &'a Agent) -> Self {
        Self {
            role: &agent.role,
            goal: &agent.goal,
            backstory: &agent.backstory,
            tools: agent
                .tools
                .iter()
                .map(|tool| ToolContext {
                    name: tool.name(),
                    description: tool.description(),
                })
                .collect(),
        }
    }
}

/// Output of an earlier task, shown to a later one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PriorOutput {
    pub task: String,
    pub agent: String,
    pub output: String,
}

/// Everything needed to prompt one agent for one task.
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    pub agent: &'a Agent,
    pub task: &'a Task,
    /// Outputs of the tasks feeding this one.
    pub context: Vec<PriorOutput>,
    /// The agent's own earlier outputs in this run (empty when memory is off).
    pub memory: Vec<PriorOutput>,
}

/// Rendered system and user prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPack {
    pub system: String,
    pub user: String,
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("system", SYSTEM_TEMPLATE)
            .expect("system template should be valid");
        env.add_template("task", TASK_TEMPLATE)
            .expect("task template should be valid");
        Self { env }
    }

    pub fn build(&self, input: &PromptInputs<'_>) -> Result<PromptPack> {
        let system = self.env.get_template("system")?.render(context! {
            agent => AgentContext::from_agent(input.agent),
        })?;
        let user = self.env.get_template("task")?.render(context! {
            task => context! {
                description => &input.task.description,
                expected_output => &input.task.expected_output,
            },
            context => &input.context,
            memory => &input.memory,
        })?;
        Ok(PromptPack {
            system: system.trim().to_string(),
            user: user.trim().to_string(),
        })
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}
