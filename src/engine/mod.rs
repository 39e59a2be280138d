//! 文档字符串插入引擎
//!
//! 针对 Python 源码的注释块插入核心：结构化解析出可文档化声明清单，
//! 判定缺失文档的声明，为其获取或合成文档块，再在不破坏行号、缩进与
//! 周边代码的前提下回填原文。支持单文件与有界并发的目录批处理。
//!
//! # 使用示例
//!
//! ```ignore
//! use docstring_rs::engine::{DocstringEngine, EngineConfig};
//!
//! let engine = DocstringEngine::new(EngineConfig::default(), None);
//! let documented = engine.process_source("def add(a, b):\n    return a + b\n").await?;
//! ```
//!
//! 引擎只在批处理边界接触文件系统；提取、计划、生成、拼接均为纯内存操作。

pub mod extractor;
pub mod generator;
pub mod planner;
pub mod processor;
pub mod scanner;
pub mod splicer;
pub mod types;

pub use generator::{DocstringGenerator, DocstringSource, GenerationFailure};
pub use processor::DocstringEngine;
pub use types::{
    BatchResult, DeclKind, Declaration, DocstringStyle, DocumentationBlock, EngineConfig,
    FileOutcome, InsertionPlan, SkipReason,
};
