//! Executor abstraction for agent invocation.
//!
//! The [`Executor`] trait decouples crew orchestration from the model backend
//! (currently the Anthropic Messages API). Tests use scripted executors that
//! return predetermined outputs without touching the network.

use std::sync::Arc;

use anyhow::Result;

use crate::core::tools::Tool;
use crate::io::throttle::Throttle;

/// Parameters for one agent working on one task.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Name of the task being executed.
    pub task: String,
    /// Name of the agent executing it.
    pub agent: String,
    /// Model identifier, optionally prefixed with its provider (`anthropic/...`).
    pub model: String,
    /// Role, goal and backstory of the agent.
    pub system_prompt: String,
    /// Task description, expected output and context.
    pub prompt: String,
    /// Tools the agent may call.
    pub tools: Vec<Tool>,
    /// Maximum tool-use rounds before a final answer is forced.
    pub max_iter: u32,
    /// Log agent steps at `info` instead of `debug`.
    pub verbose: bool,
    /// Shared request-rate ceiling; acquire once per model request.
    pub throttle: Arc<Throttle>,
}

/// Abstraction over agent execution backends.
pub trait Executor {
    /// Run the agent on the task and return its final answer.
    fn exec(&self, request: &ExecRequest) -> Result<String>;
}

impl<T: Executor + ?Sized> Executor for &T {
    fn exec(&self, request: &ExecRequest) -> Result<String> {
        (**self).exec(request)
    }
}
