//! 插入计划器
//!
//! 对每个未文档化的声明决定能否安全插入以及插入位置与缩进。
//! 已文档化的声明在上游被过滤，不会进入计划。

use super::types::{Declaration, InsertionPlan, SkipReason};

/// 为声明计算插入计划
///
/// 头部行去尾空白后必须以冒号结尾，否则视为不安全插入点（单行定义、
/// 跨行签名、冒号后带注释等），置 `skip_reason` 保护原文不被破坏。
/// 主体为空的声明仍获得计划，插入点紧跟头部行。
pub fn plan(declaration: &Declaration, header_line: &str, indent_size: usize) -> InsertionPlan {
    let skip_reason = if header_line.trim_end().ends_with(':') {
        None
    } else {
        Some(SkipReason::NonBlockHeader)
    };

    let leading = header_line.len() - header_line.trim_start().len();

    InsertionPlan {
        declaration: declaration.clone(),
        insert_after_line: declaration.start_line,
        indent_width: leading + indent_size,
        skip_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::DeclKind;

    fn decl(start_line: usize) -> Declaration {
        Declaration {
            kind: DeclKind::Function,
            name: "f".to_string(),
            start_line,
            end_line: start_line + 1,
            parameters: vec!["x".to_string()],
            nested_member_names: Vec::new(),
            has_documentation: false,
        }
    }

    #[test]
    fn test_plan_for_block_header() {
        let plan = plan(&decl(3), "def f(x):", 4);

        assert!(plan.skip_reason.is_none());
        assert_eq!(plan.insert_after_line, 3);
        assert_eq!(plan.indent_width, 4);
    }

    #[test]
    fn test_plan_respects_header_indentation() {
        let plan = plan(&decl(10), "        def f(x):", 4);

        assert_eq!(plan.indent_width, 12);
    }

    #[test]
    fn test_single_line_definition_is_skipped() {
        let plan = plan(&decl(1), "def f(x): pass", 4);

        assert_eq!(plan.skip_reason, Some(SkipReason::NonBlockHeader));
    }

    #[test]
    fn test_trailing_comment_is_skipped() {
        let plan = plan(&decl(1), "def f(x):  # 保持兼容", 4);

        assert_eq!(plan.skip_reason, Some(SkipReason::NonBlockHeader));
    }

    #[test]
    fn test_trailing_whitespace_after_colon_is_safe() {
        let plan = plan(&decl(1), "def f(x):   ", 4);

        assert!(plan.skip_reason.is_none());
    }

    #[test]
    fn test_configured_indent_unit() {
        let plan = plan(&decl(1), "  def f(x):", 2);

        assert_eq!(plan.indent_width, 4);
    }
}
