//! LLM 类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 聊天消息
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Messages API 请求载荷
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Messages API 响应
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
}

/// 响应内容块
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// LLM 错误类型
#[derive(Debug, Error)]
pub enum LlmError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// HTTP 请求失败
    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API 返回错误状态
    #[error("API 错误 (status={status}): {message}")]
    ApiError { status: u16, message: String },

    /// 响应中没有文本内容
    #[error("响应中没有文本内容")]
    EmptyResponse,
}
