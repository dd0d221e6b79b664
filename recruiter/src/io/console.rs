//! Terminal interaction for the `run` command.
//!
//! Reader and writer are injected so the full dialogue can be driven from
//! tests with in-memory buffers.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::requirements::{JobField, JobRequirements};
use crate::io::credentials::MissingCredentials;

const BANNER_WIDTH: usize = 60;

fn rule(ch: char) -> String {
    ch.to_string().repeat(BANNER_WIDTH)
}

/// Ask for every job field not already in `preset`.
///
/// Blank answers (and end of input) fall back to the field's default, which
/// is echoed as `  Using default: <value>`. Preset values are used as given.
pub fn collect_requirements<R, W>(
    preset: &HashMap<JobField, String>,
    input: &mut R,
    out: &mut W,
) -> Result<JobRequirements>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "  RECRUITMENT ASSISTANT - Job Requirements Input")?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out)?;

    let mut requirements = JobRequirements::default();
    for field in JobField::ALL {
        let answer = match preset.get(&field) {
            Some(value) => value.clone(),
            None => {
                write!(out, "{}", field.prompt())?;
                out.flush()?;
                let mut line = String::new();
                input
                    .read_line(&mut line)
                    .with_context(|| format!("read {}", field.key()))?;
                line
            }
        };
        if requirements.set(field, &answer) {
            writeln!(out, "  Using default: {}", requirements.get(field))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", rule('-'))?;
    writeln!(out, "  Searching for: {}", requirements.job_title)?;
    writeln!(out, "  Skills: {}", requirements.skills)?;
    writeln!(out, "  Experience: {}", requirements.experience_level)?;
    writeln!(out, "  Location: {}", requirements.location)?;
    writeln!(out, "{}", rule('-'))?;
    writeln!(out)?;
    Ok(requirements)
}

/// Explain which keys are missing and how to provide them.
pub fn print_missing_credentials<W: Write>(
    missing: &MissingCredentials,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "ERROR: Missing required API keys in .env file:")?;
    for key in &missing.missing {
        writeln!(out, "  - {key}")?;
    }
    writeln!(out)?;
    writeln!(out, "Copy .env.example to .env and add your keys:")?;
    writeln!(out, "  cp .env.example .env")?;
    Ok(())
}

pub fn print_report<W: Write>(report: &str, out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "  RECRUITMENT REPORT")?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out)?;
    writeln!(out, "{report}")?;
    Ok(())
}

pub fn print_saved<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Report saved to: {}", path.display())?;
    Ok(())
}
