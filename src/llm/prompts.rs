//! LLM Prompt 模板
//!
//! 定义文档字符串生成的 Prompt 模板

use crate::engine::types::{DeclKind, DocstringStyle};

/// 文档字符串生成 Prompt
pub const DOCSTRING_PROMPT: &str = r#"You are an expert Python developer. Generate a comprehensive {style}-style docstring for the following {kind}.

IMPORTANT RULES:
1. Use {style}-style docstring format
2. Be concise but informative
3. Include Args, Returns, Raises sections when applicable
4. For classes, describe the purpose and key attributes
5. Do NOT include the code in the docstring
6. Do NOT include triple quotes in your response
7. Match the indentation of the original code

{kind_upper} NAME: {name}
{kind_upper} CODE:
```python
{code}
```

Generate ONLY the docstring content (without triple quotes), ready to insert directly after the definition line."#;

/// 填充文档字符串生成 Prompt
pub fn format_docstring_prompt(
    style: DocstringStyle,
    kind: DeclKind,
    name: &str,
    code: &str,
) -> String {
    DOCSTRING_PROMPT
        .replace("{style}", style.label())
        .replace("{kind_upper}", &kind.label().to_uppercase())
        .replace("{kind}", kind.label())
        .replace("{name}", name)
        .replace("{code}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_style_kind_and_name() {
        let prompt = format_docstring_prompt(
            DocstringStyle::Numpy,
            DeclKind::Method,
            "save",
            "def save(self): ...",
        );

        assert!(prompt.contains("NumPy-style"));
        assert!(prompt.contains("METHOD NAME: save"));
        assert!(prompt.contains("def save(self): ..."));
        assert!(!prompt.contains("{name}"));
        assert!(!prompt.contains("{kind"));
    }
}
