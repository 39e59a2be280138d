//! 应用配置管理
//!
//! 配置从 JSON 文件加载后按调用显式传入，不使用进程级全局状态。
//! 文件缺失时使用默认值，API Key 允许从环境变量兜底。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::engine::types::{DocstringStyle, EngineConfig};

/// 配置错误类型
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({0}): {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API 密钥（留空时尝试 ANTHROPIC_API_KEY 环境变量）
    #[serde(default)]
    pub api_key: String,

    /// LLM API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 模型名称
    #[serde(default = "default_model")]
    pub model: String,

    /// 温度参数
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 最大 token 数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// 文档字符串风格名（无法识别的名称回退到默认风格）
    #[serde(default = "default_docstring_style")]
    pub docstring_style: String,

    /// 引擎配置
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_docstring_style() -> String {
    "google".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            docstring_style: default_docstring_style(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 文件缺失或不可解析时使用默认配置
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => return config,
                Err(e) => warn!("加载配置失败, 使用默认配置: {}", e),
            }
        }
        Self::default()
    }

    /// 解析 API Key：配置文件优先，环境变量兜底
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// 解析后的引擎配置（风格名映射为风格枚举）
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            style: DocstringStyle::from_name(&self.docstring_style),
            ..self.engine.clone()
        }
    }
}
