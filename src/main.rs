//! AI Docstring Agent - Rust Engine
//!
//! 为 Python 源码自动插入文档字符串：单文件或目录批处理。配置了
//! API Key 时走委托生成，否则使用确定性本地模板。

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod engine;
mod error;
mod llm;

use config::AppConfig;
use engine::{DocstringEngine, DocstringSource, FileOutcome};
use llm::AnthropicClient;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docstring_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(source_path) = args.next().map(PathBuf::from) else {
        bail!("用法: docstring-rs <源文件或目录> [输出路径]");
    };
    let output_path = args.next().map(PathBuf::from);

    let config = AppConfig::load_or_default(Path::new("config.json"));
    let engine_config = config.engine_config();

    // 构造可选的委托生成能力；无 Key 时引擎只用本地模板
    let generation_source: Option<Arc<dyn DocstringSource>> = match config.resolve_api_key() {
        Some(api_key) => match AnthropicClient::new(
            api_key,
            &config.base_url,
            config.model.clone(),
            config.max_tokens,
            config.temperature,
            engine_config.style,
        ) {
            Ok(client) => {
                info!("Delegated generation enabled: model={}", config.model);
                Some(Arc::new(client) as Arc<dyn DocstringSource>)
            }
            Err(e) => {
                warn!("LLM 客户端初始化失败, 使用本地模板: {}", e);
                None
            }
        },
        None => {
            info!("未配置 API Key, 使用本地模板生成");
            None
        }
    };

    let engine = DocstringEngine::new(engine_config, generation_source);

    if source_path.is_dir() {
        let result = engine
            .process_tree(&source_path, output_path.as_deref())
            .await?;
        for (path, outcome) in &result.entries {
            if let FileOutcome::Failure { error } = outcome {
                warn!("{}: {}", path, error);
            }
        }
        info!(
            "批处理完成: {} 成功, {} 失败",
            result.success_count(),
            result.failure_count()
        );
    } else {
        let text = engine.process_file(&source_path).await?;
        match output_path {
            Some(out) => {
                tokio::fs::write(&out, &text)
                    .await
                    .with_context(|| format!("写出 {} 失败", out.display()))?;
                info!("已写出: {}", out.display());
            }
            None => print!("{text}"),
        }
    }

    Ok(())
}
