//! Builds a crew from the definition files on disk.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::core::assemble::{assemble_agents, assemble_tasks, build_crew};
use crate::core::spec::{AgentSpec, TaskSpec};
use crate::core::template::TemplateInputs;
use crate::core::types::Crew;
use crate::io::config::RecruiterConfig;
use crate::io::definitions::{AGENTS_FILE, TASKS_FILE, load_definitions};
use crate::io::init::ProjectPaths;

/// Load `agents.yaml` and `tasks.yaml`, then assemble them with `inputs`.
#[instrument(skip_all, fields(config_dir = %paths.config_dir.display()))]
pub fn load_crew(
    paths: &ProjectPaths,
    settings: &RecruiterConfig,
    inputs: &TemplateInputs,
) -> Result<Crew> {
    let agents_file = load_definitions(&paths.config_dir, AGENTS_FILE)?;
    let tasks_file = load_definitions(&paths.config_dir, TASKS_FILE)?;
    let agent_specs = AgentSpec::parse_all(&agents_file.entries)
        .with_context(|| format!("load {}", agents_file.path.display()))?;
    let task_specs = TaskSpec::parse_all(&tasks_file.entries)
        .with_context(|| format!("load {}", tasks_file.path.display()))?;

    let agents = assemble_agents(&agent_specs, &settings.default_llm);
    let tasks = assemble_tasks(&task_specs, &agents, inputs, settings.context_policy)
        .with_context(|| format!("assemble tasks from {}", tasks_file.path.display()))?;
    info!(agents = agents.len(), tasks = tasks.len(), "crew assembled");
    Ok(build_crew(agents, tasks, settings.max_rpm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requirements::JobRequirements;
    use crate::core::tools::Tool;
    use crate::test_support::TestProject;
    use std::fs;

    #[test]
    fn shipped_configuration_assembles() {
        let project = TestProject::new();
        let crew = load_crew(
            &project.paths,
            &RecruiterConfig::default(),
            &JobRequirements::default().to_inputs(),
        )
        .expect("crew");

        let agent_names: Vec<&str> = crew.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(agent_names, ["researcher", "evaluator", "reporter"]);
        assert_eq!(
            crew.agents[0].tools,
            vec![Tool::SerperSearch, Tool::ScrapeWebsite]
        );
        let task_names: Vec<&str> = crew.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(task_names, ["research_task", "evaluation_task", "report_task"]);
        assert_eq!(crew.tasks[0].context, None);
        assert_eq!(crew.tasks[1].context, Some(vec![0]));
        assert_eq!(crew.tasks[2].context, Some(vec![0, 1]));
        assert!(crew.tasks[0].description.contains("Senior Python Developer"));
        assert_eq!(crew.max_rpm, 10);
    }

    #[test]
    fn missing_tasks_file_is_reported() {
        let project = TestProject::new();
        fs::remove_file(&project.paths.tasks_path).expect("remove");
        let err = load_crew(
            &project.paths,
            &RecruiterConfig::default(),
            &JobRequirements::default().to_inputs(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Configuration file not found:"));
    }

    #[test]
    fn invalid_agent_fields_are_reported_together() {
        let project = TestProject::new();
        project.write_agents("researcher:\n  goal: g\n  backstory: b\nreporter:\n  role: r\n");
        let err = load_crew(
            &project.paths,
            &RecruiterConfig::default(),
            &JobRequirements::default().to_inputs(),
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("agent 'researcher': missing required field 'role'"));
        assert!(msg.contains("agent 'reporter': missing required field 'goal'"));
    }
}
