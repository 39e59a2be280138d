//! 声明提取器
//!
//! 对 Python 源码做完整结构化解析（tree-sitter，非文本启发式），按定义
//! 关键字在源码中出现的顺序收集函数、异步函数、方法和类定义。解析失败时
//! 返回携带定位信息的 `MalformedSource`，不产生部分清单。

use tree_sitter::{Node, Parser};

use super::types::{DeclKind, Declaration};
use crate::error::{EngineError, EngineResult};

/// 提取源码中的全部可文档化声明
pub fn extract(source: &str) -> EngineResult<Vec<Declaration>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| EngineError::ParserInit(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or_else(|| EngineError::ParserInit(
        "解析器未能生成语法树".to_string(),
    ))?;

    let root = tree.root_node();
    if root.has_error() {
        let node = find_error_node(root).unwrap_or(root);
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("缺少语法成分 `{}`", node.kind())
        } else {
            "无法识别的语法结构".to_string()
        };
        return Err(EngineError::MalformedSource {
            line: pos.row + 1,
            column: pos.column + 1,
            message,
        });
    }

    let mut declarations = Vec::new();
    visit_children(root, source, false, &mut declarations);
    Ok(declarations)
}

/// 定位第一个错误或缺失节点
fn find_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_error_node(child) {
            return Some(found);
        }
    }
    Some(node)
}

/// 前序遍历：保证声明顺序即关键字出现顺序
fn visit(node: Node<'_>, source: &str, in_class: bool, declarations: &mut Vec<Declaration>) {
    match node.kind() {
        "function_definition" => {
            if let Some(decl) = build_function(node, source, in_class) {
                declarations.push(decl);
            }
            // 函数体内的 def 是嵌套函数，不再视为方法
            if let Some(body) = node.child_by_field_name("body") {
                visit_children(body, source, false, declarations);
            }
        }
        "class_definition" => {
            if let Some(decl) = build_class(node, source) {
                declarations.push(decl);
            }
            if let Some(body) = node.child_by_field_name("body") {
                visit_children(body, source, true, declarations);
            }
        }
        _ => visit_children(node, source, in_class, declarations),
    }
}

fn visit_children(node: Node<'_>, source: &str, in_class: bool, declarations: &mut Vec<Declaration>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, in_class, declarations);
    }
}

fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

fn build_function(node: Node<'_>, source: &str, in_class: bool) -> Option<Declaration> {
    let name = node.child_by_field_name("name").map(|n| node_text(n, source))?;
    let is_async = node.child(0).map(|c| c.kind() == "async").unwrap_or(false);

    // 分类策略：async def 一律标记为异步函数，类中的同步 def 为方法
    let kind = if is_async {
        DeclKind::AsyncFunction
    } else if in_class {
        DeclKind::Method
    } else {
        DeclKind::Function
    };

    let parameters = node
        .child_by_field_name("parameters")
        .map(|p| parameter_names(p, source))
        .unwrap_or_default();

    Some(Declaration {
        kind,
        name,
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        parameters,
        nested_member_names: Vec::new(),
        has_documentation: has_docstring(node),
    })
}

fn build_class(node: Node<'_>, source: &str) -> Option<Declaration> {
    let name = node.child_by_field_name("name").map(|n| node_text(n, source))?;

    Some(Declaration {
        kind: DeclKind::Class,
        name,
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        parameters: Vec::new(),
        nested_member_names: member_names(node, source),
        has_documentation: has_docstring(node),
    })
}

/// 收集参数名：普通、带类型、带默认值的参数（含 self/cls），
/// 排除 *args/**kwargs 以及裸 `*`、`/` 分隔符
fn parameter_names(params: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(node_text(child, source)),
            "typed_parameter" => {
                if let Some(inner) = child.named_child(0) {
                    if inner.kind() == "identifier" {
                        names.push(node_text(inner, source));
                    }
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    if name_node.kind() == "identifier" {
                        names.push(node_text(name_node, source));
                    }
                }
            }
            _ => {}
        }
    }
    names
}

/// 类主体中的同步方法名（按出现顺序，装饰器不影响收集）
fn member_names(class_node: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let Some(body) = class_node.child_by_field_name("body") else {
        return names;
    };
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        let definition = match child.kind() {
            "function_definition" => Some(child),
            "decorated_definition" => child
                .child_by_field_name("definition")
                .filter(|d| d.kind() == "function_definition"),
            _ => None,
        };
        if let Some(def) = definition {
            let is_async = def.child(0).map(|c| c.kind() == "async").unwrap_or(false);
            if !is_async {
                if let Some(name_node) = def.child_by_field_name("name") {
                    names.push(node_text(name_node, source));
                }
            }
        }
    }
    names
}

/// 主体首个语句是否为裸字符串表达式
fn has_docstring(definition: Node<'_>) -> bool {
    let Some(body) = definition.child_by_field_name("body") else {
        return false;
    };
    let Some(first) = body.named_child(0) else {
        return false;
    };
    if first.kind() != "expression_statement" {
        return false;
    }
    matches!(
        first.named_child(0).map(|n| n.kind()),
        Some("string") | Some("concatenated_string")
    )
}
