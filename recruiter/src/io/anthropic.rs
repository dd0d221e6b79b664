//! Executor backed by the Anthropic Messages API.
//!
//! Each task is one conversation: the agent may call its tools for up to
//! `max_iter` rounds, after which one last request with tool use disabled
//! forces a final answer.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::core::tools::Tool;
use crate::io::config::{LlmConfig, RecruiterConfig};
use crate::io::credentials::Credentials;
use crate::io::executor::{ExecRequest, Executor};
use crate::io::tools::ToolRunner;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER_PREFIX: &str = "anthropic/";
const FINAL_ANSWER_NUDGE: &str =
    "You have used all the tool calls available for this task. Do not call any more tools; \
     give your best final answer now.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: Role,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Executor that talks to the Anthropic Messages API.
pub struct AnthropicExecutor {
    client: Client,
    messages_url: String,
    api_key: String,
    max_tokens: u32,
    tools: ToolRunner,
}

impl AnthropicExecutor {
    pub fn new(config: &LlmConfig, api_key: String, tools: ToolRunner) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build anthropic http client")?;
        Ok(Self {
            client,
            messages_url: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            api_key,
            max_tokens: config.max_tokens,
            tools,
        })
    }

    /// Executor with tools, both configured from settings.
    pub fn from_settings(settings: &RecruiterConfig, credentials: &Credentials) -> Result<Self> {
        let tools = ToolRunner::new(&settings.tools, credentials.serper_api_key.clone())?;
        Self::new(&settings.llm, credentials.anthropic_api_key.clone(), tools)
    }

    fn send(&self, request: &MessagesRequest<'_>) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .context("send messages request")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => anyhow!(
                    "anthropic api returned {status} ({}): {}",
                    parsed.error.kind,
                    parsed.error.message
                ),
                Err(_) => anyhow!("anthropic api returned {status}: {}", body.trim()),
            });
        }
        response.json().context("parse messages response")
    }

    fn run_tool(&self, request: &ExecRequest, name: &str, input: &Value) -> Result<String> {
        let tool = Tool::from_name(name)
            .filter(|tool| request.tools.contains(tool))
            .ok_or_else(|| anyhow!("tool '{name}' is not available to this agent"))?;
        self.tools.run(tool, input)
    }
}

impl Executor for AnthropicExecutor {
    #[instrument(skip_all, fields(task = %request.task, agent = %request.agent))]
    fn exec(&self, request: &ExecRequest) -> Result<String> {
        let model = model_id(&request.model)?;
        let definitions = || {
            request
                .tools
                .iter()
                .map(|tool| ToolDefinition {
                    name: tool.name(),
                    description: tool.description(),
                    input_schema: tool.input_schema(),
                })
                .collect::<Vec<_>>()
        };
        let mut messages = vec![Message {
            role: Role::User,
            content: vec![ContentBlock::Text {
                text: request.prompt.clone(),
            }],
        }];

        for round in 0..=request.max_iter {
            let final_round = round == request.max_iter;
            let tool_choice = (final_round && !request.tools.is_empty())
                .then(|| json!({ "type": "none" }));
            request.throttle.acquire();
            let response = self.send(&MessagesRequest {
                model,
                max_tokens: self.max_tokens,
                system: &request.system_prompt,
                messages: &messages,
                tools: definitions(),
                tool_choice,
            })?;

            let tool_calls: Vec<(String, String, Value)> = response
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            if tool_calls.is_empty() || final_round {
                if response.stop_reason.as_deref() == Some("max_tokens") {
                    warn!(max_tokens = self.max_tokens, "answer cut off at max_tokens");
                }
                let answer = final_text(&response.content);
                if answer.is_empty() {
                    bail!(
                        "model returned no text for task '{}' (stop reason: {})",
                        request.task,
                        response.stop_reason.as_deref().unwrap_or("unknown")
                    );
                }
                if request.verbose {
                    info!(round, bytes = answer.len(), "final answer");
                } else {
                    debug!(round, bytes = answer.len(), "final answer");
                }
                return Ok(answer);
            }

            let mut results = Vec::with_capacity(tool_calls.len() + 1);
            for (id, name, input) in tool_calls {
                if request.verbose {
                    info!(round, tool = %name, input = %input, "using tool");
                } else {
                    debug!(round, tool = %name, input = %input, "using tool");
                }
                let (content, is_error) = match self.run_tool(request, &name, &input) {
                    Ok(output) => (output, false),
                    Err(err) => {
                        warn!(tool = %name, err = %format!("{err:#}"), "tool failed");
                        (format!("Tool error: {err:#}"), true)
                    }
                };
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id,
                    content,
                    is_error,
                });
            }
            if round + 1 == request.max_iter {
                results.push(ContentBlock::Text {
                    text: FINAL_ANSWER_NUDGE.to_string(),
                });
            }

            messages.push(Message {
                role: Role::Assistant,
                content: response
                    .content
                    .into_iter()
                    .filter(|block| *block != ContentBlock::Unsupported)
                    .collect(),
            });
            messages.push(Message {
                role: Role::User,
                content: results,
            });
        }

        unreachable!("the final round always returns")
    }
}

/// Strip the provider prefix from a model identifier.
fn model_id(model: &str) -> Result<&str> {
    if let Some(id) = model.strip_prefix(PROVIDER_PREFIX) {
        return Ok(id);
    }
    match model.split_once('/') {
        Some((provider, _)) => bail!(
            "unsupported llm provider '{provider}' in '{model}' (only anthropic models are supported)"
        ),
        None => Ok(model),
    }
}

fn final_text(content: &[ContentBlock]) -> String {
    content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.trim()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
