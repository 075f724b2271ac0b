use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use heritage_core::config::LlmSettings;
use heritage_core::traits::Generator;

/// System prompt for question answering.
pub const EXPERT_SYSTEM_PROMPT: &str = "你是一位中国非物质文化遗产专家，\
    擅长讲解各类非遗的历史渊源、文化价值和传承意义。回答要专业、准确、有文化底蕴。";

/// System prompt for writing project introductions.
pub const RESEARCHER_SYSTEM_PROMPT: &str = "你是一位中国非物质文化遗产研究专家，\
    熟悉各类非遗项目的历史渊源、技艺特点和文化价值。";

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(settings: &LlmSettings, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow!("LLM API key cannot be empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            endpoint: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            system_prompt: EXPERT_SYSTEM_PROMPT.to_string(),
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the reply text.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &self.system_prompt },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("chat request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, model = %self.model, "chat completion rejected");
            return Err(anyhow!("chat completion returned {}: {}", status, body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("malformed chat response: {}", e))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat response has no content"))?;
        debug!(
            model = %self.model,
            chars = content.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "chat completion"
        );
        Ok(content)
    }
}

#[async_trait]
impl Generator for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(prompt).await
    }
}
