//! Recruitment crew CLI.
//!
//! Reads agent and task definitions from `config/`, asks for the job
//! requirements and runs the researcher, evaluator and reporter agents in
//! sequence. The final report is printed and saved to `output/report.md`.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use recruiter::core::requirements::{JobField, JobRequirements};
use recruiter::core::types::Crew;
use recruiter::crew::load_crew;
use recruiter::driver::{DriverOutcome, RunContext, drive};
use recruiter::exit_codes;
use recruiter::io::anthropic::AnthropicExecutor;
use recruiter::io::config::{RecruiterConfig, load_config};
use recruiter::io::credentials::{Credentials, load_dotenv};
use recruiter::io::init::{InitOptions, ProjectPaths, SETTINGS_FILE, init_project};
use recruiter::logging;

#[derive(Parser)]
#[command(
    name = "recruiter",
    version,
    about = "Run a crew of agents that sources and evaluates candidates for a job"
)]
struct Cli {
    /// Project root holding `config/`, `.env` and `recruiter.toml`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect job requirements, run the crew and save the report (default).
    Run(JobArgs),
    /// Check the definition files and print what they declare.
    Validate,
    /// Print every task as it would be sent to its agent, without running it.
    Render(JobArgs),
    /// Write the default configuration files if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

/// Job requirements given up front; the matching prompts are skipped.
#[derive(Args, Default)]
struct JobArgs {
    #[arg(long)]
    job_title: Option<String>,
    #[arg(long)]
    skills: Option<String>,
    #[arg(long)]
    experience_level: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

impl JobArgs {
    fn preset(self) -> HashMap<JobField, String> {
        [
            (JobField::JobTitle, self.job_title),
            (JobField::Skills, self.skills),
            (JobField::ExperienceLevel, self.experience_level),
            (JobField::Location, self.location),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }

    /// Requirements from the flags alone, defaults for the rest.
    fn requirements(self) -> JobRequirements {
        let mut requirements = JobRequirements::default();
        for (field, value) in self.preset() {
            requirements.set(field, &value);
        }
        requirements
    }
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!(err = %format!("{err:#}"), "recruiter failed");
            eprintln!("{err:#}");
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let settings = load_config(&cli.root.join(SETTINGS_FILE))?;
    let paths = ProjectPaths::with_settings(&cli.root, &settings);
    match cli.command.unwrap_or(Command::Run(JobArgs::default())) {
        Command::Run(args) => cmd_run(&paths, &settings, args),
        Command::Validate => {
            logging::init(None)?;
            cmd_validate(&paths, &settings)
        }
        Command::Render(args) => {
            logging::init(None)?;
            cmd_render(&paths, &settings, args)
        }
        Command::Init { force } => {
            logging::init(None)?;
            cmd_init(&cli.root, force)
        }
    }
}

fn cmd_run(paths: &ProjectPaths, settings: &RecruiterConfig, args: JobArgs) -> Result<i32> {
    logging::init(Some(&paths.log_path))?;
    info!("recruiter starting up");
    load_dotenv(&paths.root)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = drive(
        RunContext {
            paths,
            settings,
            credentials: Credentials::from_env(),
            preset: args.preset(),
            input: &mut input,
            out: &mut out,
        },
        AnthropicExecutor::from_settings,
    )?;
    out.flush()?;

    match outcome {
        DriverOutcome::Completed(_) => {
            info!("recruiter finished");
            Ok(exit_codes::OK)
        }
        DriverOutcome::MissingCredentials(_) => Ok(exit_codes::MISSING_CREDENTIALS),
    }
}

fn cmd_validate(paths: &ProjectPaths, settings: &RecruiterConfig) -> Result<i32> {
    let crew = load_crew(paths, settings, &JobRequirements::default().to_inputs())?;
    println!("ok: agents={} tasks={}", crew.agents.len(), crew.tasks.len());
    Ok(exit_codes::OK)
}

fn cmd_render(paths: &ProjectPaths, settings: &RecruiterConfig, args: JobArgs) -> Result<i32> {
    let crew = load_crew(paths, settings, &args.requirements().to_inputs())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_crew(&crew, &mut out)?;
    Ok(exit_codes::OK)
}

fn render_crew<W: Write>(crew: &Crew, out: &mut W) -> Result<()> {
    for (idx, task) in crew.tasks.iter().enumerate() {
        let agent = crew.agent_for(task)?;
        let context: Vec<&str> = crew
            .context_of(task)?
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        if idx > 0 {
            writeln!(out)?;
        }
        writeln!(out, "== {} (agent: {}, llm: {}) ==", task.name, agent.name, agent.llm)?;
        if context.is_empty() {
            writeln!(out, "context: none")?;
        } else {
            writeln!(out, "context: {}", context.join(", "))?;
        }
        writeln!(out, "description:\n{}", task.description.trim())?;
        writeln!(out, "expected output:\n{}", task.expected_output.trim())?;
    }
    Ok(())
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let (_, report) = init_project(root, &InitOptions { force })?;
    for path in &report.written {
        println!("wrote {}", path.display());
    }
    for path in &report.skipped {
        println!("kept {} (use --force to overwrite)", path.display());
    }
    Ok(exit_codes::OK)
}
