//! AI helpers: URL analysis, link generation, greeting, icon suggestion
//!
//! Every call resolves the active provider from the current settings and
//! its credential from the environment secrets, then dispatches to the
//! transport matching the provider type. Missing credentials never cause
//! a network call.

pub mod json;
pub mod prompts;
pub mod transport;

pub use json::extract_json;
pub use transport::{
    CompletionRequest, CompletionTransport, GeminiTransport, OpenAiCompatTransport,
    ResolvedProvider,
};

use crate::activity::ActivityLog;
use aurora_common::defaults::fallback_ai_config;
use aurora_common::{
    AiProviderConfig, AppSettings, AuroraError, ConnectionTestResult, DEFAULT_ICON, EnvSecrets,
    GeneratedLink, LinkAnalysis, ProviderKind, Result, models,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static ICON_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\s"']+"#).unwrap());

/// Credential for a provider: env slot, then manual key, then `API_KEY` for Gemini
pub fn resolve_api_key(config: &AiProviderConfig, secrets: &EnvSecrets) -> Option<String> {
    if let Some(value) = config.env_slot.as_deref().and_then(|slot| secrets.slot(slot)) {
        return Some(value.to_string());
    }
    let manual = config.api_key.trim();
    if !manual.is_empty() {
        return Some(manual.to_string());
    }
    match config.kind {
        ProviderKind::Google => secrets.default_api_key().map(str::to_string),
        ProviderKind::OpenAi => None,
    }
}

/// Keep only CJK ideographs and Chinese sentence punctuation
pub fn clean_greeting(text: &str) -> String {
    text.chars()
        .filter(|c| ('\u{4e00}'..='\u{9fa5}').contains(c) || "，。？！".contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// First token of the model's answer, or the default icon
pub fn parse_icon_name(text: &str) -> String {
    ICON_SEPARATORS
        .split(text.trim())
        .find(|token| !token.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_ICON.to_string())
}

pub struct AiService {
    secrets: EnvSecrets,
    log: ActivityLog,
    google: Arc<dyn CompletionTransport>,
    openai: Arc<dyn CompletionTransport>,
}

impl AiService {
    pub fn new(secrets: EnvSecrets, log: ActivityLog) -> Result<Self> {
        Ok(Self::with_transports(
            secrets,
            log,
            Arc::new(GeminiTransport),
            Arc::new(OpenAiCompatTransport::new()?),
        ))
    }

    pub fn with_transports(
        secrets: EnvSecrets,
        log: ActivityLog,
        google: Arc<dyn CompletionTransport>,
        openai: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            secrets,
            log,
            google,
            openai,
        }
    }

    pub fn secrets(&self) -> &EnvSecrets {
        &self.secrets
    }

    fn transport_for(&self, kind: ProviderKind) -> &dyn CompletionTransport {
        match kind {
            ProviderKind::Google => self.google.as_ref(),
            ProviderKind::OpenAi => self.openai.as_ref(),
        }
    }

    fn resolve(&self, config: &AiProviderConfig) -> Option<ResolvedProvider> {
        resolve_api_key(config, &self.secrets).map(|api_key| ResolvedProvider {
            config: config.clone(),
            api_key,
        })
    }

    /// The active provider with a usable credential, if any
    pub fn active_provider(&self, settings: &AppSettings) -> Option<ResolvedProvider> {
        let config = settings
            .active_ai_config()
            .cloned()
            .unwrap_or_else(fallback_ai_config);
        self.resolve(&config)
    }

    async fn complete(&self, provider: &ResolvedProvider, prompt: String, expect_json: bool) -> Result<String> {
        let request = if expect_json {
            CompletionRequest::json(provider.model(), prompt)
        } else {
            CompletionRequest::text(provider.model(), prompt)
        };
        self.transport_for(provider.config.kind)
            .complete(provider, &request)
            .await
    }

    fn fail(&self, context: &str, err: AuroraError) -> AuroraError {
        let message = err.message();
        let message = if message.is_empty() { "未知错误".to_string() } else { message };
        self.log.error(format!("AI {} 失败: {}", context, message));
        match err {
            AuroraError::Ai(_) => err,
            _ => AuroraError::Ai(message),
        }
    }

    /// Describe a URL: title, summary, brand color, pros and cons
    pub async fn analyze_url(&self, settings: &AppSettings, url: &str) -> Result<LinkAnalysis> {
        let provider = self
            .active_provider(settings)
            .ok_or_else(|| AuroraError::ai("API Key 未配置 (Check Environment Variables)"))?;

        let outcome = async {
            let raw = self.complete(&provider, prompts::analyze_url(url), true).await?;
            extract_json::<LinkAnalysis>(&raw)
        }
        .await;

        match outcome {
            Ok(analysis) => {
                self.log.info(format!("AI 链接分析完成: {}", analysis.title));
                Ok(analysis)
            }
            Err(e) => Err(self.fail("网址分析", e)),
        }
    }

    /// Ask for `count` sites fitting a category; unconfigured providers yield nothing
    pub async fn generate_links(
        &self,
        settings: &AppSettings,
        category_title: &str,
        count: usize,
        existing_urls: &[String],
    ) -> Result<Vec<GeneratedLink>> {
        let Some(provider) = self.active_provider(settings) else {
            return Ok(Vec::new());
        };

        let prompt = prompts::generate_links(category_title, count, existing_urls);
        let outcome = async {
            let raw = self.complete(&provider, prompt, true).await?;
            extract_json::<Vec<GeneratedLink>>(&raw)
        }
        .await;

        match outcome {
            Ok(links) => {
                self.log
                    .info(format!("AI 内容生成完成: {} 条候选", links.len()));
                Ok(links)
            }
            Err(e) => Err(self.fail("内容生成", e)),
        }
    }

    /// A short Chinese sentence; empty on any failure
    pub async fn greeting(&self, settings: &AppSettings) -> String {
        let Some(provider) = self.active_provider(settings) else {
            return String::new();
        };
        match self.complete(&provider, prompts::GREETING.to_string(), false).await {
            Ok(raw) => clean_greeting(&raw),
            Err(e) => {
                debug!("Greeting request failed: {}", e);
                String::new()
            }
        }
    }

    /// A Lucide icon name for `text`; `Folder` on any failure
    pub async fn suggest_icon(&self, settings: &AppSettings, text: &str) -> String {
        let Some(provider) = self.active_provider(settings) else {
            return DEFAULT_ICON.to_string();
        };
        match self.complete(&provider, prompts::suggest_icon(text), false).await {
            Ok(raw) => parse_icon_name(&raw),
            Err(e) => {
                debug!("Icon suggestion failed: {}", e);
                DEFAULT_ICON.to_string()
            }
        }
    }

    /// Send a trivial prompt with the given (not necessarily active) provider
    pub async fn test_connection(&self, config: &AiProviderConfig) -> ConnectionTestResult {
        let Some(provider) = self.resolve(config) else {
            return ConnectionTestResult {
                success: false,
                message: "API Key 未找到 (请检查环境变量配置)".to_string(),
            };
        };

        match self
            .complete(&provider, prompts::CONNECTION_TEST.to_string(), false)
            .await
        {
            Ok(_) => ConnectionTestResult {
                success: true,
                message: "连接成功 (Connected)".to_string(),
            },
            Err(e) => ConnectionTestResult {
                success: false,
                message: format!("连接失败: {}", e.message()),
            },
        }
    }

    /// Models offered in the provider editor
    pub fn list_models(&self, _config: &AiProviderConfig) -> Vec<String> {
        [models::GEMINI_2_5_FLASH, models::GEMINI_3_PRO_PREVIEW, models::GPT_4O]
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
