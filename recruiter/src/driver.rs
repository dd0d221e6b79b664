//! Orchestration for `recruiter run`.
//!
//! A run checks credentials, collects the job requirements, assembles the
//! crew, executes it and persists the final report. Nothing is assembled when
//! credentials are missing.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, instrument};

use crate::core::requirements::{JobField, JobRequirements};
use crate::crew::load_crew;
use crate::io::config::RecruiterConfig;
use crate::io::console::{
    collect_requirements, print_missing_credentials, print_report, print_saved,
};
use crate::io::credentials::{Credentials, MissingCredentials};
use crate::io::executor::Executor;
use crate::io::init::ProjectPaths;
use crate::io::report::save_report;
use crate::kickoff::kickoff;

/// A run that produced and saved a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRun {
    pub requirements: JobRequirements,
    pub report: String,
    pub report_path: PathBuf,
}

/// Outcome of `recruiter run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutcome {
    Completed(CompletedRun),
    /// Required keys were missing; nothing was assembled or executed.
    MissingCredentials(MissingCredentials),
}

/// Inputs of one run besides the project layout.
pub struct RunContext<'a, R, W> {
    pub paths: &'a ProjectPaths,
    pub settings: &'a RecruiterConfig,
    pub credentials: Result<Credentials, MissingCredentials>,
    /// Answers given on the command line; their prompts are skipped.
    pub preset: HashMap<JobField, String>,
    pub input: &'a mut R,
    pub out: &'a mut W,
}

/// Run the recruitment pipeline end to end.
///
/// `make_executor` is only called once the crew has been assembled, so tests
/// and dry runs never construct a network client.
#[instrument(skip_all, fields(root = %ctx.paths.root.display()))]
pub fn drive<R, W, E, M>(ctx: RunContext<'_, R, W>, make_executor: M) -> Result<DriverOutcome>
where
    R: BufRead,
    W: Write,
    E: Executor,
    M: FnOnce(&RecruiterConfig, &Credentials) -> Result<E>,
{
    let RunContext {
        paths,
        settings,
        credentials,
        preset,
        input,
        out,
    } = ctx;

    let credentials = match credentials {
        Ok(credentials) => credentials,
        Err(missing) => {
            error!(missing = ?missing.missing, "required API keys are missing");
            print_missing_credentials(&missing, out)?;
            return Ok(DriverOutcome::MissingCredentials(missing));
        }
    };
    info!("API keys validated successfully");

    let requirements = collect_requirements(&preset, input, out)?;
    info!(
        job_title = %requirements.job_title,
        location = %requirements.location,
        experience = %requirements.experience_level,
        "job requirements collected"
    );

    writeln!(out, "Building crew...")?;
    let crew = load_crew(paths, settings, &requirements.to_inputs())?;
    let executor = make_executor(settings, &credentials).context("create executor")?;

    writeln!(out, "Kicking off the recruitment pipeline...")?;
    writeln!(out)?;
    let result = kickoff(&crew, &executor, |task| {
        writeln!(out, "  Completed {} ({})", task.task, task.agent)?;
        Ok(())
    });
    let crew_output = match result {
        Ok(output) => output,
        Err(err) => {
            error!(err = %format!("{err:#}"), "crew execution failed");
            return Err(err.context("crew execution failed"));
        }
    };
    info!("crew execution completed successfully");

    print_report(&crew_output.raw, out)?;
    save_report(&paths.output_path, &crew_output.raw)?;
    print_saved(&paths.output_path, out)?;

    Ok(DriverOutcome::Completed(CompletedRun {
        requirements,
        report: crew_output.raw,
        report_path: paths.output_path.clone(),
    }))
}
