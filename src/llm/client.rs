//! Anthropic Messages API 客户端
//!
//! 引擎外部生成能力的适配器：在引擎外构造，作为 `DocstringSource` 注入。
//! 任何调用失败都映射为 `GenerationFailure`，由引擎降级到本地模板。

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::prompts;
use super::types::{ChatMessage, LlmError, MessagesRequest, MessagesResponse};
use crate::engine::generator::{DocstringSource, GenerationFailure};
use crate::engine::types::{DeclKind, DocstringStyle};

/// Anthropic 客户端
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    style: DocstringStyle,
}

impl AnthropicClient {
    /// 创建新的客户端
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
        style: DocstringStyle,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::ConfigError("API Key is required".to_string()));
        }

        // 构建 HTTP 客户端；委托调用的超时由此契约承担
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            api_key,
            endpoint: build_endpoint(base_url),
            model: model.into(),
            max_tokens,
            temperature,
            style,
        })
    }

    /// 单次补全调用，返回响应中的首个文本块
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = MessagesRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            system: None,
        };

        debug!("Anthropic API request: endpoint={}, model={}", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Anthropic API error: status={}, body={}",
                status_code,
                &error_text[..error_text.len().min(500)]
            );
            return Err(LlmError::ApiError {
                status: status_code,
                message: error_text,
            });
        }

        let body: MessagesResponse = response.json().await?;
        body.content
            .iter()
            .find_map(|block| {
                if block.block_type == "text" {
                    block.text.clone()
                } else {
                    None
                }
            })
            .map(|text| text.trim().to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}

fn build_endpoint(base_url: &str) -> String {
    format!("{}/v1/messages", base_url.trim_end_matches('/'))
}

#[async_trait]
impl DocstringSource for AnthropicClient {
    async fn generate(
        &self,
        code: &str,
        kind: DeclKind,
        name: &str,
    ) -> Result<String, GenerationFailure> {
        let prompt = prompts::format_docstring_prompt(self.style, kind, name, code);
        self.complete(&prompt)
            .await
            .map_err(|e| GenerationFailure(e.to_string()))
    }
}
