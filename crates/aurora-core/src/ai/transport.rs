//! Transports that turn a prompt into model text
//!
//! Gemini goes through `genai`; everything else is assumed to speak the
//! OpenAI chat completions protocol and is called directly with reqwest.

use async_trait::async_trait;
use aurora_common::{AiProviderConfig, AuroraError, ProviderKind, Result, models, timeouts};
use genai::chat::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponseFormat, MessageContent, ReasoningEffort,
};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client as GenaiClient, ModelIden};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One prompt to send
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    /// Ask the backend for a JSON response when it supports a hint for that
    pub expect_json: bool,
}

impl CompletionRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            expect_json: false,
        }
    }

    pub fn json(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            expect_json: true,
            ..Self::text(model, prompt)
        }
    }
}

/// A provider config together with the credential resolved for it
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub config: AiProviderConfig,
    pub api_key: String,
}

impl ResolvedProvider {
    /// Configured model; a blank Gemini model falls back to the default one
    pub fn model(&self) -> String {
        let model = self.config.model.trim();
        if model.is_empty() && self.config.kind == ProviderKind::Google {
            models::GEMINI_2_5_FLASH.to_string()
        } else {
            model.to_string()
        }
    }
}

#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send the prompt and return the raw response text
    async fn complete(&self, provider: &ResolvedProvider, request: &CompletionRequest)
    -> Result<String>;
}

/// Models that reason by default; the budget is pinned to zero for latency
pub fn disables_thinking(model: &str) -> bool {
    model.contains("gemini-2.5") || model.contains("gemini-2.0")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiTransport;

impl GeminiTransport {
    fn client_for(api_key: &str) -> GenaiClient {
        let key = api_key.to_string();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden: ModelIden| -> std::result::Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(key.clone())))
            },
        );
        GenaiClient::builder().with_auth_resolver(auth_resolver).build()
    }

    fn options_for(request: &CompletionRequest) -> ChatOptions {
        let mut options = ChatOptions::default();
        if disables_thinking(&request.model) {
            options = options.with_reasoning_effort(ReasoningEffort::Budget(0));
        }
        if request.expect_json {
            options = options.with_response_format(ChatResponseFormat::JsonMode);
        }
        options
    }
}

#[async_trait]
impl CompletionTransport for GeminiTransport {
    async fn complete(
        &self,
        provider: &ResolvedProvider,
        request: &CompletionRequest,
    ) -> Result<String> {
        let client = Self::client_for(&provider.api_key);
        let chat_req = ChatRequest::new(vec![ChatMessage::user(request.prompt.clone())]);
        let options = Self::options_for(request);

        debug!("Executing Gemini request with model {}", request.model);
        let call = client.exec_chat(&request.model, chat_req, Some(&options));
        let response = tokio::time::timeout(Duration::from_secs(timeouts::DEFAULT_LLM_TIMEOUT), call)
            .await
            .map_err(|_| AuroraError::ai("请求超时"))?
            .map_err(|e| AuroraError::ai(e.to_string()))?;

        let text = response
            .content
            .into_iter()
            .find_map(|content| match content {
                MessageContent::Text(text) => Some(text),
                _ => None,
            })
            .unwrap_or_default();
        Ok(text)
    }
}

/// `<base>/v1/chat/completions`, without doubling an existing `/v1`
pub fn chat_completions_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim();
    let base = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: ChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Any OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatTransport {
    client: Client,
}

impl OpenAiCompatTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeouts::DEFAULT_LLM_TIMEOUT))
            .build()
            .map_err(|e| AuroraError::ai(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionTransport for OpenAiCompatTransport {
    async fn complete(
        &self,
        provider: &ResolvedProvider,
        request: &CompletionRequest,
    ) -> Result<String> {
        let endpoint = chat_completions_endpoint(&provider.config.base_url);
        let body = ChatCompletionBody {
            model: &request.model,
            messages: vec![ChatCompletionMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!("POST {} (model {})", endpoint, request.model);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&provider.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuroraError::ai(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuroraError::ai(format!("HTTP {}: {}", status.as_u16(), text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AuroraError::ai(e.to_string()))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
