//! Sequential execution of an assembled crew.
//!
//! Tasks run one at a time in crew order. Each task sees the outputs of its
//! context tasks, or the previous task's output when it declares no context.
//! Agents with memory also see their own earlier answers from this run.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, error, info, instrument, warn};

use crate::core::types::{Crew, CrewOutput, TaskOutput};
use crate::io::executor::{ExecRequest, Executor};
use crate::io::prompt::{PriorOutput, PromptEngine, PromptInputs};
use crate::io::throttle::Throttle;

/// Run every task of `crew` through `executor`.
///
/// `on_task` is called after each completed task, in order. The first task
/// failure (or `on_task` error) stops the run and is returned with the task
/// name attached.
#[instrument(skip_all, fields(tasks = crew.tasks.len(), max_rpm = crew.max_rpm))]
pub fn kickoff<E, F>(crew: &Crew, executor: &E, mut on_task: F) -> Result<CrewOutput>
where
    E: Executor + ?Sized,
    F: FnMut(&TaskOutput) -> Result<()>,
{
    if crew.tasks.is_empty() {
        bail!("crew has no tasks to run");
    }
    let throttle = Arc::new(Throttle::per_minute(crew.max_rpm)?);
    let engine = PromptEngine::new();
    for agent in crew.agents.iter().filter(|agent| agent.allow_delegation) {
        warn!(
            agent = %agent.name,
            "allow_delegation is set but delegation is not supported; the agent works alone"
        );
    }

    let mut outputs: Vec<TaskOutput> = Vec::with_capacity(crew.tasks.len());
    for (idx, task) in crew.tasks.iter().enumerate() {
        let agent = crew.agent_for(task)?;
        if crew.verbose {
            info!(task = %task.name, agent = %agent.name, "task started");
        }

        let context: Vec<PriorOutput> = match &task.context {
            Some(indices) => indices
                .iter()
                .map(|&i| match outputs.get(i) {
                    Some(output) => Ok(prior(output)),
                    None => Err(anyhow!(
                        "task '{}' lists context task #{} which has not run before it",
                        task.name,
                        i
                    )),
                })
                .collect::<Result<_>>()?,
            None => outputs.last().map(prior).into_iter().collect(),
        };
        let memory: Vec<PriorOutput> = if agent.memory {
            outputs
                .iter()
                .filter(|out| out.agent == agent.name)
                .filter(|out| !context.iter().any(|ctx| ctx.task == out.task))
                .map(prior)
                .collect()
        } else {
            Vec::new()
        };
        debug!(
            task = %task.name,
            context = context.len(),
            memory = memory.len(),
            "prompt inputs resolved"
        );

        let prompts = engine
            .build(&PromptInputs {
                agent,
                task,
                context,
                memory,
            })
            .with_context(|| format!("build prompt for task '{}'", task.name))?;
        let request = ExecRequest {
            task: task.name.clone(),
            agent: agent.name.clone(),
            model: agent.llm.clone(),
            system_prompt: prompts.system,
            prompt: prompts.user,
            tools: agent.tools.clone(),
            max_iter: agent.max_iter,
            verbose: agent.verbose,
            throttle: Arc::clone(&throttle),
        };

        let raw = match executor.exec(&request) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    task = %task.name,
                    agent = %agent.name,
                    err = %format!("{err:#}"),
                    "task failed"
                );
                return Err(err.context(format!(
                    "task '{}' ({} of {}) failed",
                    task.name,
                    idx + 1,
                    crew.tasks.len()
                )));
            }
        };
        if crew.verbose {
            info!(task = %task.name, bytes = raw.len(), "task completed");
        }

        let output = TaskOutput {
            task: task.name.clone(),
            agent: agent.name.clone(),
            raw,
        };
        on_task(&output)?;
        outputs.push(output);
    }

    let raw = outputs
        .last()
        .map(|out| out.raw.clone())
        .unwrap_or_default();
    Ok(CrewOutput {
        raw,
        tasks_output: outputs,
    })
}

fn prior(output: &TaskOutput) -> PriorOutput {
    PriorOutput {
        task: output.task.clone(),
        agent: output.agent.clone(),
        output: output.raw.clone(),
    }
}
