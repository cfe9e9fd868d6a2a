//! Relationship analysis through an OpenAI-compatible chat-completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, handle_response_errors};
use super::traits::RelationAnalyzer;
use crate::{HuginnError, Result};

/// Default base URL of the chat-completions service.
pub const DEFAULT_BASE_URL: &str = "https://spark-api-open.xf-yun.com/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "4.0Ultra";

/// Completions are slow; the per-call timeout is longer than for data calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You help maintain the GitHub open-source community by \
explaining what two GitHub nodes have in common, to encourage collaboration. \
First decide whether each node is a user or a repository. \
For two repositories, give reasons why contributors of one would want to maintain the other. \
For two users, compare their preferences and technology stacks so they could connect. \
For a user and a repository, explain why the user should contribute to the repository. \
Answer with a plain-text numbered list of clear, specific reasons and nothing else. \
Do not use markdown.";

/// Client for a chat-completions endpoint.
#[derive(Clone)]
pub struct ChatAnalyzer {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            http: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 4096,
        })
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl RelationAnalyzer for ChatAnalyzer {
    fn name(&self) -> &str {
        "chat"
    }

    async fn analyze(&self, node_a: &str, node_b: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let prompt = format!("Analyze {node_a} and {node_b}");
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        handle_response_errors(&response, "/chat/completions")?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Analysis(format!("malformed completion: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| HuginnError::Analysis("empty completion".into()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
