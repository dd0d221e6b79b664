//! Capability tools an agent may be granted.

use serde_json::{Value, json};

/// The agent that is allowed to reach the web.
pub const RESEARCHER: &str = "researcher";

/// External capability available to an agent during task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Web search through the Serper API.
    SerperSearch,
    /// Fetch a page and extract its readable text.
    ScrapeWebsite,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::SerperSearch => "search_internet",
            Tool::ScrapeWebsite => "read_website_content",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        [Tool::SerperSearch, Tool::ScrapeWebsite]
            .into_iter()
            .find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::SerperSearch => {
                "Search the internet with a query and return the top results \
                 (title, link, snippet)."
            }
            Tool::ScrapeWebsite => "Read the text content of a web page given its URL.",
        }
    }

    /// JSON Schema for the tool's input object.
    pub fn input_schema(self) -> Value {
        match self {
            Tool::SerperSearch => json!({
                "type": "object",
                "properties": {
                    "search_query": {
                        "type": "string",
                        "description": "Query to search the internet with"
                    }
                },
                "required": ["search_query"]
            }),
            Tool::ScrapeWebsite => json!({
                "type": "object",
                "properties": {
                    "website_url": {
                        "type": "string",
                        "description": "Full URL of the page to read"
                    }
                },
                "required": ["website_url"]
            }),
        }
    }
}

/// Tools granted to the agent with the given name.
///
/// Only the researcher browses the web; every other agent works from the
/// context handed to it by earlier tasks.
pub fn tools_for_agent(agent_name: &str) -> Vec<Tool> {
    if agent_name == RESEARCHER {
        vec![Tool::SerperSearch, Tool::ScrapeWebsite]
    } else {
        Vec::new()
    }
}
