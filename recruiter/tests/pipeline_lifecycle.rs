//! End-to-end pipeline tests with a scripted executor.
//!
//! These drive `drive` through a full run against a temporary project: input
//! collection, assembly from YAML on disk, sequential execution and report
//! persistence.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;

use recruiter::core::requirements::{JobField, JobRequirements};
use recruiter::driver::{DriverOutcome, RunContext, drive};
use recruiter::io::config::RecruiterConfig;
use recruiter::io::credentials::Credentials;
use recruiter::test_support::{ScriptedExecutor, TestProject};

fn credentials() -> Credentials {
    Credentials {
        anthropic_api_key: "sk-test".to_string(),
        serper_api_key: "serp".to_string(),
    }
}

fn settings() -> RecruiterConfig {
    RecruiterConfig {
        max_rpm: 100,
        ..RecruiterConfig::default()
    }
}

fn run(
    project: &TestProject,
    preset: HashMap<JobField, String>,
    answers: &str,
    executor: &ScriptedExecutor,
) -> (DriverOutcome, String) {
    let mut input = Cursor::new(answers.as_bytes().to_vec());
    let mut out = Vec::new();
    let outcome = drive(
        RunContext {
            paths: &project.paths,
            settings: &settings(),
            credentials: Ok(credentials()),
            preset,
            input: &mut input,
            out: &mut out,
        },
        |_, _| Ok(executor),
    )
    .expect("drive");
    (outcome, String::from_utf8(out).expect("utf8"))
}

/// A single task sees every placeholder and no context.
#[test]
fn single_task_crew_interpolates_requirements() {
    let project = TestProject::new();
    project.write_tasks(
        "research_task:\n  \
           description: \"Find {job_title} with {skills} ({experience_level}) in {location}\"\n  \
           expected_output: A list\n  \
           agent: researcher\n",
    );
    let executor = ScriptedExecutor::new(["Only task output"]);

    let (outcome, _) = run(&project, HashMap::new(), "X\nY\nZ\nW\n", &executor);

    let DriverOutcome::Completed(done) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(done.report, "Only task output");
    let requests = executor.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Find X with Y (Z) in W"));
    assert!(!requests[0].prompt.contains("<context>"));
    assert_eq!(requests[0].tools.len(), 2);
}

/// The evaluation task receives exactly the research output as context.
#[test]
fn dependent_task_receives_declared_context() {
    let project = TestProject::new();
    let executor = ScriptedExecutor::new(["RESEARCH-OUT", "EVAL-OUT", "REPORT-OUT"]);

    let (outcome, out) = run(&project, HashMap::new(), "\n\n\n\n", &executor);

    let DriverOutcome::Completed(done) = outcome else {
        panic!("expected a completed run");
    };
    let requests = executor.requests();
    let names: Vec<&str> = requests.iter().map(|r| r.task.as_str()).collect();
    assert_eq!(names, ["research_task", "evaluation_task", "report_task"]);
    assert!(requests[1].prompt.contains("### Output of research_task (researcher)"));
    assert!(requests[1].prompt.contains("RESEARCH-OUT"));
    assert!(!requests[1].prompt.contains("### Output of report_task"));
    assert!(requests[2].prompt.contains("RESEARCH-OUT"));
    assert!(requests[2].prompt.contains("EVAL-OUT"));
    assert_eq!(done.report, "REPORT-OUT");
    assert!(out.contains("REPORT-OUT"));
}

/// Blank answers resolve to the documented defaults.
#[test]
fn blank_answers_use_default_requirements() {
    let project = TestProject::new();
    let executor = ScriptedExecutor::default();

    let (outcome, out) = run(&project, HashMap::new(), "\n\n\n\n", &executor);

    let DriverOutcome::Completed(done) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(done.requirements, JobRequirements::default());
    assert_eq!(out.matches("  Using default: ").count(), 4);
    assert!(executor.requests()[0].prompt.contains("Senior Python Developer"));
}

/// Each run replaces the previous report.
#[test]
fn report_is_overwritten_on_rerun() {
    let project = TestProject::new();
    let preset = HashMap::from([
        (JobField::JobTitle, "SRE".to_string()),
        (JobField::Skills, "Go".to_string()),
        (JobField::ExperienceLevel, "3 years".to_string()),
        (JobField::Location, "Remote".to_string()),
    ]);

    let first = ScriptedExecutor::new(["a", "b", "a long first report"]);
    run(&project, preset.clone(), "", &first);
    let second = ScriptedExecutor::new(["a", "b", "second"]);
    let (_, out) = run(&project, preset, "", &second);

    assert_eq!(
        fs::read_to_string(&project.paths.output_path).expect("report"),
        "second"
    );
    assert!(!out.contains("Job title"));
    assert!(second.requests()[0].prompt.contains("SRE"));
}
