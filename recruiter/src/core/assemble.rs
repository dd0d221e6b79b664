//! Turns parsed definitions into an executable crew.
//!
//! Tasks are assembled strictly in declaration order: that order is both the
//! execution order and the only order in which `context` references resolve,
//! so a task can only depend on tasks declared above it.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, warn};

use crate::core::spec::{AgentSpec, TaskSpec};
use crate::core::template::{TemplateInputs, TemplateRenderer};
use crate::core::tools::tools_for_agent;
use crate::core::types::{Agent, ContextPolicy, Crew, DEFAULT_MAX_ITER, Process, Task};

/// Build one agent per definition, in file order.
pub fn assemble_agents(specs: &[AgentSpec], default_llm: &str) -> Vec<Agent> {
    specs
        .iter()
        .map(|spec| {
            debug!(agent = %spec.name, role = %spec.role, "creating agent");
            Agent {
                name: spec.name.clone(),
                role: spec.role.clone(),
                goal: spec.goal.clone(),
                backstory: spec.backstory.clone(),
                llm: spec.llm.clone().unwrap_or_else(|| default_llm.to_string()),
                tools: tools_for_agent(&spec.name),
                memory: spec.memory.unwrap_or(true),
                allow_delegation: spec.allow_delegation.unwrap_or(false),
                max_iter: spec.max_iter.unwrap_or(DEFAULT_MAX_ITER),
                verbose: spec.verbose.unwrap_or(true),
            }
        })
        .collect()
}

/// Build tasks in file order, resolving placeholders, agents and context.
///
/// Fails without returning any task if a template references a placeholder
/// missing from `inputs` or a task names an unknown agent.
pub fn assemble_tasks(
    specs: &[TaskSpec],
    agents: &[Agent],
    inputs: &TemplateInputs,
    policy: ContextPolicy,
) -> Result<Vec<Task>> {
    let renderer = TemplateRenderer::new();
    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(specs.len());
    let mut tasks = Vec::with_capacity(specs.len());

    for spec in specs {
        debug!(task = %spec.name, agent = %spec.agent, "creating task");
        let description = renderer
            .render(&spec.description, inputs)
            .with_context(|| format!("render description of task '{}'", spec.name))?;
        let expected_output = renderer
            .render(&spec.expected_output, inputs)
            .with_context(|| format!("render expected_output of task '{}'", spec.name))?;

        let agent = agents
            .iter()
            .position(|agent| agent.name == spec.agent)
            .ok_or_else(|| {
                let available: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
                anyhow!(
                    "task '{}' references unknown agent '{}' (available agents: {})",
                    spec.name,
                    spec.agent,
                    available.join(", ")
                )
            })?;

        let mut context = Vec::new();
        for ctx_name in spec.context.iter().flatten() {
            match by_name.get(ctx_name.as_str()) {
                Some(&idx) => context.push(idx),
                None if policy == ContextPolicy::Strict => bail!(
                    "task '{}' lists context '{}' which is not a task declared before it",
                    spec.name,
                    ctx_name
                ),
                None => warn!(
                    task = %spec.name,
                    context = %ctx_name,
                    "dropping context reference to unknown or later task"
                ),
            }
        }

        by_name.insert(spec.name.as_str(), tasks.len());
        tasks.push(Task {
            name: spec.name.clone(),
            description,
            expected_output,
            agent,
            context: (!context.is_empty()).then_some(context),
        });
    }

    Ok(tasks)
}

/// Compose agents and tasks into a sequential crew.
pub fn build_crew(agents: Vec<Agent>, tasks: Vec<Task>, max_rpm: u32) -> Crew {
    Crew {
        agents,
        tasks,
        process: Process::Sequential,
        verbose: true,
        max_rpm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tools::Tool;
    use crate::core::types::DEFAULT_LLM;
    use crate::test_support::{agent_spec, job_inputs, task_spec};

    #[test]
    fn agent_defaults_apply() {
        let agents = assemble_agents(&[agent_spec("evaluator")], DEFAULT_LLM);
        let agent = &agents[0];
        assert_eq!(agent.llm, DEFAULT_LLM);
        assert!(agent.memory);
        assert!(!agent.allow_delegation);
        assert_eq!(agent.max_iter, 5);
        assert!(agent.verbose);
        assert!(agent.tools.is_empty());
    }

    #[test]
    fn agent_fields_override_defaults() {
        let mut spec = agent_spec("researcher");
        spec.llm = Some("anthropic/claude-3-5-haiku".to_string());
        spec.memory = Some(false);
        spec.allow_delegation = Some(true);
        spec.max_iter = Some(2);
        spec.verbose = Some(false);
        let agent = &assemble_agents(&[spec], DEFAULT_LLM)[0];
        assert_eq!(agent.llm, "anthropic/claude-3-5-haiku");
        assert!(!agent.memory);
        assert!(agent.allow_delegation);
        assert_eq!(agent.max_iter, 2);
        assert!(!agent.verbose);
        assert_eq!(agent.tools, vec![Tool::SerperSearch, Tool::ScrapeWebsite]);
    }

    #[test]
    fn only_researcher_carries_tools() {
        let agents = assemble_agents(
            &[
                agent_spec("researcher"),
                agent_spec("evaluator"),
                agent_spec("reporter"),
            ],
            DEFAULT_LLM,
        );
        let with_tools: Vec<&str> = agents
            .iter()
            .filter(|a| !a.tools.is_empty())
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(with_tools, vec!["researcher"]);
        assert_eq!(agents.len(), 3);
    }

    #[test]
    fn single_task_interpolates_all_placeholders() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let mut spec = task_spec("task1", "researcher", &[]);
        spec.description =
            "Find {job_title} with {skills}, {experience_level}, in {location}"
                .to_string();
        let tasks = assemble_tasks(
            &[spec],
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .expect("assemble");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Find X with Y, Z, in W");
        assert_eq!(tasks[0].context, None);
        assert_eq!(tasks[0].agent, 0);
    }

    #[test]
    fn context_resolves_to_earlier_task() {
        let agents = assemble_agents(
            &[agent_spec("researcher"), agent_spec("evaluator")],
            DEFAULT_LLM,
        );
        let specs = [
            task_spec("task1", "researcher", &[]),
            task_spec("task2", "evaluator", &["task1"]),
        ];
        let tasks = assemble_tasks(
            &specs,
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .expect("assemble");
        assert_eq!(tasks[1].context, Some(vec![0]));
        assert_eq!(tasks[1].agent, 1);
        assert_eq!(tasks[tasks[1].context.as_ref().unwrap()[0]].name, "task1");
    }

    #[test]
    fn unknown_and_forward_context_is_dropped_when_lenient() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let specs = [
            task_spec("task1", "researcher", &["task2", "ghost"]),
            task_spec("task2", "researcher", &["ghost", "task1"]),
        ];
        let tasks = assemble_tasks(
            &specs,
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .expect("assemble");
        assert_eq!(tasks[0].context, None);
        assert_eq!(tasks[1].context, Some(vec![0]));
    }

    #[test]
    fn unknown_context_is_rejected_when_strict() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let specs = [task_spec("task1", "researcher", &["ghost"])];
        let err = assemble_tasks(
            &specs,
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Strict,
        )
        .unwrap_err();
        assert!(err.to_string().contains("context 'ghost'"));
    }

    #[test]
    fn unknown_agent_lists_available_agents() {
        let agents = assemble_agents(
            &[agent_spec("researcher"), agent_spec("evaluator")],
            DEFAULT_LLM,
        );
        let specs = [task_spec("task1", "recruiter", &[])];
        let err = assemble_tasks(
            &specs,
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("unknown agent 'recruiter'"));
        assert!(err.contains("researcher, evaluator"));
    }

    #[test]
    fn missing_placeholder_fails_whole_build() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let mut broken = task_spec("task2", "researcher", &[]);
        broken.expected_output = "Budget: {salary}".to_string();
        let specs = [task_spec("task1", "researcher", &[]), broken];
        let err = assemble_tasks(
            &specs,
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("render expected_output of task 'task2'"));
    }

    #[test]
    fn unknown_placeholder_in_description_is_not_passed_through() {
        let agents = assemble_agents(&[agent_spec("researcher")], DEFAULT_LLM);
        let mut spec = task_spec("task1", "researcher", &[]);
        spec.description = "Find {job_title} in {location}; budget {salary}".to_string();
        let err = assemble_tasks(
            &[spec.clone()],
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("render description of task 'task1'"));
        assert!(msg.contains("{salary}"));

        spec.description = "Find {job_title} in {location}".to_string();
        let tasks = assemble_tasks(
            &[spec],
            &agents,
            &job_inputs("X", "Y", "Z", "W"),
            ContextPolicy::Lenient,
        )
        .expect("assemble");
        assert_eq!(tasks[0].description, "Find X in W");
    }

    #[test]
    fn assembly_is_idempotent() {
        let agents = assemble_agents(
            &[agent_spec("researcher"), agent_spec("evaluator")],
            DEFAULT_LLM,
        );
        let specs = [
            task_spec("task1", "researcher", &[]),
            task_spec("task2", "evaluator", &["task1"]),
        ];
        let inputs = job_inputs("X", "Y", "Z", "W");
        let first = assemble_tasks(&specs, &agents, &inputs, ContextPolicy::Lenient)
            .expect("first");
        let second = assemble_tasks(&specs, &agents, &inputs, ContextPolicy::Lenient)
            .expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn crew_is_sequential_with_rate_cap() {
        let crew = build_crew(Vec::new(), Vec::new(), 10);
        assert_eq!(crew.process, Process::Sequential);
        assert!(crew.verbose);
        assert_eq!(crew.max_rpm, 10);
    }
}
