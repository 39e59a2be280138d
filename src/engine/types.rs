//! 引擎类型定义
//!
//! 定义声明清单、文档块、插入计划、批处理结果等核心值对象，
//! 以及引擎配置。所有类型均为每次运行新建的值对象，不跨文件共享可变状态。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 声明种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// 顶层函数（含嵌套在函数内的函数）
    Function,
    /// 异步函数（无论是否嵌套在类中）
    AsyncFunction,
    /// 类中的同步方法
    Method,
    /// 类定义
    Class,
}

impl DeclKind {
    /// 用于 Prompt 措辞的英文标签
    pub fn label(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::AsyncFunction => "async function",
            DeclKind::Method => "method",
            DeclKind::Class => "class",
        }
    }
}

/// 单个可文档化声明
///
/// 行号为 1 起始、闭区间，均指原始文本中的位置；装饰器不计入范围。
/// 提取顺序为定义关键字在源码中出现的顺序。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    /// 声明种类
    pub kind: DeclKind,
    /// 标识符名称
    pub name: String,
    /// 头部行号（`def`/`class` 所在行）
    pub start_line: usize,
    /// 结构化结束行号
    pub end_line: usize,
    /// 参数名列表（类为空）
    pub parameters: Vec<String>,
    /// 类的成员方法名列表（仅类有效）
    pub nested_member_names: Vec<String>,
    /// 主体首语句是否已是文档字符串
    pub has_documentation: bool,
}

/// 文档块：纯内容行，不含定界符，未应用缩进
///
/// 不变量：非空。回退模式下对相同 (code, kind, name, style) 输入输出恒定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationBlock {
    pub lines: Vec<String>,
}

impl DocumentationBlock {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 头部行去尾空白后未以块开始标记（冒号）结尾，如单行定义
    NonBlockHeader,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NonBlockHeader => write!(f, "non-block header"),
        }
    }
}

/// 单个声明的插入计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertionPlan {
    /// 目标声明
    pub declaration: Declaration,
    /// 头部行号（1 起始），文档块插在该行之后
    pub insert_after_line: usize,
    /// 插入块的前导空格数：头部缩进 + 一个缩进单位
    pub indent_width: usize,
    /// 置位时拼接器必须忽略此计划
    pub skip_reason: Option<SkipReason>,
}

/// 单个文件的处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// 转换后的完整文本
    Success { text: String },
    /// 捕获的错误描述
    Failure { error: String },
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success { .. })
    }
}

/// 批处理结果
///
/// 不变量：每个被发现的合格文件恰有一个条目，处理失败的文件以错误条目
/// 保留，绝不静默丢弃。键为相对根目录的路径（正斜杠）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub entries: BTreeMap<String, FileOutcome>,
}

impl BatchResult {
    /// 成功条目数量
    pub fn success_count(&self) -> usize {
        self.entries.values().filter(|o| o.is_success()).count()
    }

    /// 失败条目数量
    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }
}

/// 文档字符串风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    Google,
    Numpy,
}

impl Default for DocstringStyle {
    fn default() -> Self {
        Self::Google
    }
}

impl DocstringStyle {
    /// 按名称解析风格，无法识别的名称回退到默认风格
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "numpy" => Self::Numpy,
            _ => Self::Google,
        }
    }

    /// 用于 Prompt 措辞的风格名
    pub fn label(&self) -> &'static str {
        match self {
            DocstringStyle::Google => "Google",
            DocstringStyle::Numpy => "NumPy",
        }
    }
}

/// 引擎配置
///
/// 每次调用显式传入，不使用进程级全局状态。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 文档字符串风格
    #[serde(default)]
    pub style: DocstringStyle,

    /// 并行处理数量（默认3，使用时收敛到 1..=10）
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// 忽略的目录名模式（目录级剪枝，被忽略的子树不会被枚举）
    #[serde(default = "default_ignore_names")]
    pub ignore_names: Vec<String>,

    /// 缩进单位宽度（空格数）
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
}

fn default_concurrency() -> usize {
    3
}

fn default_ignore_names() -> Vec<String> {
    vec![
        ".venv".to_string(),
        "venv".to_string(),
        ".git".to_string(),
        "node_modules".to_string(),
        "__pycache__".to_string(),
        "output_docs".to_string(),
    ]
}

fn default_indent_size() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style: DocstringStyle::default(),
            concurrency: default_concurrency(),
            ignore_names: default_ignore_names(),
            indent_size: default_indent_size(),
        }
    }
}
