//! Job requirements collected from the user.

use crate::core::template::TemplateInputs;

/// One job-requirement field, with its prompt and fallback value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    JobTitle,
    Skills,
    ExperienceLevel,
    Location,
}

impl JobField {
    pub const ALL: [JobField; 4] = [
        JobField::JobTitle,
        JobField::Skills,
        JobField::ExperienceLevel,
        JobField::Location,
    ];

    /// Placeholder name used in task templates.
    pub fn key(self) -> &'static str {
        match self {
            JobField::JobTitle => "job_title",
            JobField::Skills => "skills",
            JobField::ExperienceLevel => "experience_level",
            JobField::Location => "location",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            JobField::JobTitle => "Job title (e.g. Senior Python Developer): ",
            JobField::Skills => {
                "Required skills (comma-separated, e.g. Python, FastAPI, PostgreSQL): "
            }
            JobField::ExperienceLevel => "Experience level (e.g. 5+ years): ",
            JobField::Location => "Location preference (e.g. London, UK): ",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            JobField::JobTitle => "Senior Python Developer",
            JobField::Skills => "Python, FastAPI, PostgreSQL",
            JobField::ExperienceLevel => "5+ years",
            JobField::Location => "London, UK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequirements {
    pub job_title: String,
    pub skills: String,
    pub experience_level: String,
    pub location: String,
}

impl Default for JobRequirements {
    fn default() -> Self {
        Self {
            job_title: JobField::JobTitle.default_value().to_string(),
            skills: JobField::Skills.default_value().to_string(),
            experience_level: JobField::ExperienceLevel.default_value().to_string(),
            location: JobField::Location.default_value().to_string(),
        }
    }
}

impl JobRequirements {
    pub fn get(&self, field: JobField) -> &str {
        match field {
            JobField::JobTitle => &self.job_title,
            JobField::Skills => &self.skills,
            JobField::ExperienceLevel => &self.experience_level,
            JobField::Location => &self.location,
        }
    }

    /// Set a field from raw user input. Blank input keeps the default.
    ///
    /// Returns `true` when the default was used.
    pub fn set(&mut self, field: JobField, answer: &str) -> bool {
        let answer = answer.trim();
        let (value, defaulted) = if answer.is_empty() {
            (field.default_value(), true)
        } else {
            (answer, false)
        };
        let slot = match field {
            JobField::JobTitle => &mut self.job_title,
            JobField::Skills => &mut self.skills,
            JobField::ExperienceLevel => &mut self.experience_level,
            JobField::Location => &mut self.location,
        };
        *slot = value.to_string();
        defaulted
    }

    /// Template inputs keyed by placeholder name.
    pub fn to_inputs(&self) -> TemplateInputs {
        JobField::ALL
            .into_iter()
            .map(|field| (field.key().to_string(), self.get(field).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_fall_back_to_defaults() {
        let mut req = JobRequirements {
            job_title: "x".to_string(),
            skills: "x".to_string(),
            experience_level: "x".to_string(),
            location: "x".to_string(),
        };
        for field in JobField::ALL {
            assert!(req.set(field, "   "));
        }
        assert_eq!(req, JobRequirements::default());
    }

    #[test]
    fn answers_are_trimmed() {
        let mut req = JobRequirements::default();
        assert!(!req.set(JobField::Location, "  Remote \n"));
        assert_eq!(req.location, "Remote");
    }

    #[test]
    fn inputs_use_placeholder_names() {
        let inputs = JobRequirements::default().to_inputs();
        let keys: Vec<&str> = inputs.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["experience_level", "job_title", "location", "skills"]
        );
        assert_eq!(inputs["job_title"], "Senior Python Developer");
    }
}
