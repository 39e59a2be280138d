//! 文档生成器
//!
//! 双模式生成：注入了外部能力时走委托模式，任何失败（超时、响应畸形、
//! 传输错误）都被捕获并降级到确定性本地模板——生成永远不会中断流水线。
//! 回退模式只依赖声明的参数表和固定的风格骨架，对相同输入输出恒定。
//! 生成器不接触文件系统。

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use super::types::{DeclKind, Declaration, DocstringStyle, DocumentationBlock};

/// 委托生成失败（内部恢复，不向调用方传播）
#[derive(Debug, Error)]
#[error("{0}")]
pub struct GenerationFailure(pub String);

/// 外部文本生成能力
///
/// 适配器在引擎外构造后注入，引擎不探测客户端形态。
#[async_trait]
pub trait DocstringSource: Send + Sync {
    /// 为指定声明生成文档字符串内容（不含定界符）
    async fn generate(
        &self,
        code: &str,
        kind: DeclKind,
        name: &str,
    ) -> Result<String, GenerationFailure>;
}

// 预编译正则：剥离委托响应中的 Markdown 代码围栏行
static RE_CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*```[\w-]*\s*$").unwrap()
});

/// 文档生成器
pub struct DocstringGenerator {
    style: DocstringStyle,
    source: Option<Arc<dyn DocstringSource>>,
}

impl DocstringGenerator {
    /// 创建生成器；`source` 为 None 时只使用回退模板
    pub fn new(style: DocstringStyle, source: Option<Arc<dyn DocstringSource>>) -> Self {
        Self { style, source }
    }

    /// 为声明生成文档块，永不失败
    pub async fn generate(&self, declaration: &Declaration, code: &str) -> DocumentationBlock {
        if let Some(source) = &self.source {
            match source.generate(code, declaration.kind, &declaration.name).await {
                Ok(text) => {
                    let lines = sanitize_response(&text);
                    if !lines.is_empty() {
                        return DocumentationBlock::new(lines);
                    }
                    warn!("委托生成返回空内容, 回退到模板: {}", declaration.name);
                }
                Err(e) => {
                    warn!("委托生成失败, 回退到模板: {}: {}", declaration.name, e);
                }
            }
        }

        self.fallback_block(declaration)
    }

    /// 确定性回退模板
    pub fn fallback_block(&self, declaration: &Declaration) -> DocumentationBlock {
        let lines = match self.style {
            DocstringStyle::Google => google_template(&declaration.name, &declaration.parameters),
            DocstringStyle::Numpy => numpy_template(&declaration.name, &declaration.parameters),
        };
        DocumentationBlock::new(lines)
    }
}

/// 清洗委托响应：去围栏行、去游离三引号、去首尾空行
fn sanitize_response(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("\"\"\"").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("\"\"\"").unwrap_or(trimmed);

    let mut lines: Vec<String> = trimmed
        .split('\n')
        .filter(|line| !RE_CODE_FENCE.is_match(line))
        .map(|line| line.trim_end().to_string())
        .collect();

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn google_template(name: &str, parameters: &[String]) -> Vec<String> {
    let mut lines = vec![format!("Brief description of {name}."), String::new()];

    if !parameters.is_empty() {
        lines.push("Args:".to_string());
        for param in parameters {
            lines.push(format!("    {param} (Any): Description of {param}."));
        }
        lines.push(String::new());
    }

    lines.push("Returns:".to_string());
    lines.push("    Any: Description of return value.".to_string());
    lines
}

fn numpy_template(name: &str, parameters: &[String]) -> Vec<String> {
    let mut lines = vec![
        format!("{name}."),
        String::new(),
        "Parameters".to_string(),
        "----------".to_string(),
    ];

    for param in parameters {
        lines.push(format!("{param} : Any"));
        lines.push("    Description.".to_string());
    }

    lines.push(String::new());
    lines.push("Returns".to_string());
    lines.push("-------".to_string());
    lines.push("Any".to_string());
    lines.push("    Description.".to_string());
    lines
}
