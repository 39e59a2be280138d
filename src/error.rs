//! 统一错误处理模块
//!
//! 定义引擎级错误类型。生成失败（降级到本地模板）和不安全插入点（跳过单个
//! 声明）属于可本地恢复的情况，不在此枚举中，分别见 `engine::generator` 与
//! `engine::types::SkipReason`。

use std::path::PathBuf;
use thiserror::Error;

/// 引擎错误枚举
#[derive(Debug, Error)]
pub enum EngineError {
    /// 源码结构解析失败，携带解析器定位信息
    #[error("源码解析失败 (第{line}行, 第{column}列): {message}")]
    MalformedSource {
        line: usize,
        column: usize,
        message: String,
    },

    /// 解析器初始化失败（语法版本不兼容等）
    #[error("解析器初始化失败: {0}")]
    ParserInit(String),

    /// 批处理根路径不存在
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    /// 批处理根路径不是目录
    #[error("路径不是目录: {0}")]
    NotADirectory(PathBuf),

    /// 文件读写错误
    #[error("IO错误 ({0}): {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// 便捷类型别名
pub type EngineResult<T> = Result<T, EngineError>;
