//! HTTP-backed implementations of the agent tools.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use reqwest::blocking::Client;
use scraper::Html;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::core::tools::Tool;
use crate::io::config::ToolsConfig;

const USER_AGENT: &str = concat!("recruiter/", env!("CARGO_PKG_VERSION"));

/// Executes tool calls requested by the model.
#[derive(Clone)]
pub struct ToolRunner {
    client: Client,
    search_url: String,
    serper_api_key: String,
    search_results: u32,
    scrape_limit_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

impl ToolRunner {
    pub fn new(config: &ToolsConfig, serper_api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("build tool http client")?;
        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            serper_api_key,
            search_results: config.search_results,
            scrape_limit_bytes: config.scrape_limit_bytes,
        })
    }

    /// Run `tool` with the JSON `input` the model supplied.
    pub fn run(&self, tool: Tool, input: &Value) -> Result<String> {
        match tool {
            Tool::SerperSearch => self.search(string_arg(input, "search_query")?),
            Tool::ScrapeWebsite => self.scrape(string_arg(input, "website_url")?),
        }
    }

    #[instrument(skip(self))]
    fn search(&self, query: &str) -> Result<String> {
        debug!("searching");
        let response = self
            .client
            .post(&self.search_url)
            .header("X-API-KEY", &self.serper_api_key)
            .json(&json!({ "q": query, "num": self.search_results }))
            .send()
            .context("send search request")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("search failed with status {status}: {}", body.trim());
        }
        let results: SearchResponse = response.json().context("parse search response")?;
        if results.organic.is_empty() {
            return Ok(format!("No results found for '{query}'."));
        }
        let formatted = results
            .organic
            .iter()
            .map(|r| {
                format!(
                    "Title: {}\nLink: {}\nSnippet: {}",
                    r.title,
                    r.link,
                    r.snippet.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n");
        debug!(results = results.organic.len(), "search complete");
        Ok(formatted)
    }

    #[instrument(skip(self))]
    fn scrape(&self, url: &str) -> Result<String> {
        debug!("scraping");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("fetch {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("fetch {url} failed with status {status}");
        }
        let html = response.text().with_context(|| format!("read body of {url}"))?;
        let text = extract_text(&html);
        Ok(truncate_text(text, self.scrape_limit_bytes))
    }
}

fn string_arg<'a>(input: &'a Value, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("missing string argument '{key}'"))
}

/// Visible text of an HTML document with whitespace collapsed.
pub fn extract_text(html: &str) -> String {
    static WHITESPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex should be valid"));

    let document = Html::parse_document(html);
    let mut chunks = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
        if hidden {
            continue;
        }
        let chunk = text.trim();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
    }
    WHITESPACE_RE.replace_all(&chunks.join(" "), " ").into_owned()
}

fn truncate_text(mut text: String, limit: usize) -> String {
    if text.len() <= limit {
        return text;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let dropped = text.len() - cut;
    warn!(dropped, limit, "page text truncated");
    text.truncate(cut);
    text.push_str(&format!("\n[truncated {dropped} bytes]"));
    text
}
