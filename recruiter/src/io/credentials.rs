//! API credentials required before any external call is made.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

/// Keys for the model provider and the search provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub anthropic_api_key: String,
    pub serper_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &"<redacted>")
            .field("serper_api_key", &"<redacted>")
            .finish()
    }
}

/// Names of required keys that are unset or blank, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCredentials {
    pub missing: Vec<&'static str>,
}

impl fmt::Display for MissingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required API keys: {}", self.missing.join(", "))
    }
}

impl std::error::Error for MissingCredentials {}

impl Credentials {
    /// Read both keys through `lookup`; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials, MissingCredentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let anthropic = read(ANTHROPIC_API_KEY);
        let serper = read(SERPER_API_KEY);
        match (anthropic, serper) {
            (Some(anthropic_api_key), Some(serper_api_key)) => Ok(Credentials {
                anthropic_api_key,
                serper_api_key,
            }),
            (anthropic, serper) => {
                let mut missing = Vec::new();
                if anthropic.is_none() {
                    missing.push(ANTHROPIC_API_KEY);
                }
                if serper.is_none() {
                    missing.push(SERPER_API_KEY);
                }
                Err(MissingCredentials { missing })
            }
        }
    }

    /// Read both keys from the process environment.
    pub fn from_env() -> Result<Credentials, MissingCredentials> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Load `<root>/.env` into the process environment if it exists.
///
/// Variables already set in the environment win over the file.
pub fn load_dotenv(root: &Path) -> anyhow::Result<()> {
    let path = root.join(".env");
    if !path.is_file() {
        debug!(path = %path.display(), "no .env file");
        return Ok(());
    }
    dotenvy::from_path(&path).with_context(|| format!("load {}", path.display()))?;
    info!(path = %path.display(), "environment variables loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn both_keys_present() {
        let creds = Credentials::from_lookup(lookup(&[
            (ANTHROPIC_API_KEY, "sk-ant"),
            (SERPER_API_KEY, "serp"),
        ]))
        .expect("credentials");
        assert_eq!(creds.anthropic_api_key, "sk-ant");
        assert_eq!(creds.serper_api_key, "serp");
    }

    #[test]
    fn reports_only_the_missing_key() {
        let err = Credentials::from_lookup(lookup(&[(SERPER_API_KEY, "serp")])).unwrap_err();
        assert_eq!(err.missing, vec![ANTHROPIC_API_KEY]);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            (ANTHROPIC_API_KEY, "  "),
            (SERPER_API_KEY, ""),
        ]))
        .unwrap_err();
        assert_eq!(err.missing, vec![ANTHROPIC_API_KEY, SERPER_API_KEY]);
    }

    #[test]
    fn debug_redacts_keys() {
        let creds = Credentials {
            anthropic_api_key: "sk-secret".to_string(),
            serper_api_key: "serp-secret".to_string(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
