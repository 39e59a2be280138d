//! 拼接器
//!
//! 将全部插入计划一次性回填到行缓冲中。核心不变量：插入不得使尚未应用的
//! 插入点失效——按 `insert_after_line` 降序应用，先插行号最大的块，使
//! 每次插入只位移其下方的行，行号更小的待处理插入点始终有效。

use super::types::{DocumentationBlock, InsertionPlan};

/// 应用全部插入计划，返回最终文本
///
/// 携带 `skip_reason` 的计划被忽略。每个块渲染为：定界符行、逐行加
/// `indent_width` 个前导空格的内容行、定界符行，插在头部行之后。
pub fn apply(source: &str, mut jobs: Vec<(InsertionPlan, DocumentationBlock)>) -> String {
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();

    jobs.retain(|(plan, _)| plan.skip_reason.is_none());
    jobs.sort_by(|a, b| b.0.insert_after_line.cmp(&a.0.insert_after_line));

    for (plan, block) in &jobs {
        let indent = " ".repeat(plan.indent_width);
        let mut rendered = Vec::with_capacity(block.lines.len() + 2);
        rendered.push(format!("{indent}\"\"\""));
        for line in &block.lines {
            rendered.push(format!("{indent}{line}"));
        }
        rendered.push(format!("{indent}\"\"\""));

        // 行缓冲 0 起始，索引 == 1 起始头部行号，即头部行之后的位置
        let at = plan.insert_after_line.min(lines.len());
        lines.splice(at..at, rendered);
    }

    lines.join("\n")
}
