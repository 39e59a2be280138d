//! 流水线处理器
//!
//! 主调度器：单文件流水线（提取 → 计划 → 生成 → 拼接）与目录批处理。
//! 批处理对独立文件做有界并发，单个文件的失败在文件边界被捕获记录，
//! 不影响其他文件。

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::generator::{DocstringGenerator, DocstringSource};
use super::types::{BatchResult, Declaration, EngineConfig, FileOutcome};
use super::{extractor, planner, scanner, splicer};
use crate::error::{EngineError, EngineResult};

/// 并行上限（配置值收敛到 1..=10）
const MAX_CONCURRENCY: usize = 10;

/// 文档字符串插入引擎
pub struct DocstringEngine {
    config: EngineConfig,
    generator: DocstringGenerator,
}

impl DocstringEngine {
    /// 创建引擎；`source` 为 None 时仅使用回退模板
    pub fn new(config: EngineConfig, source: Option<Arc<dyn DocstringSource>>) -> Self {
        let generator = DocstringGenerator::new(config.style, source);
        Self { config, generator }
    }

    /// 使用默认配置创建（无外部生成能力）
    pub fn with_default_config() -> Self {
        Self::new(EngineConfig::default(), None)
    }

    /// 单文本流水线
    ///
    /// 全部插入计划先在原始行缓冲上收集完毕，再统一生成与回填，
    /// 规划与变更绝不交错。
    pub async fn process_source(&self, source: &str) -> EngineResult<String> {
        let declarations = extractor::extract(source)?;
        let lines: Vec<&str> = source.split('\n').collect();

        let mut jobs = Vec::new();
        for declaration in declarations.iter().filter(|d| !d.has_documentation) {
            let header = lines
                .get(declaration.start_line - 1)
                .copied()
                .unwrap_or_default();
            let plan = planner::plan(declaration, header, self.config.indent_size);
            if let Some(reason) = plan.skip_reason {
                debug!("跳过 {}: {}", declaration.name, reason);
                continue;
            }

            let snippet = snippet_of(&lines, declaration);
            let block = self.generator.generate(declaration, &snippet).await;
            jobs.push((plan, block));
        }

        Ok(splicer::apply(source, jobs))
    }

    /// 单文件模式：读取并转换；IO 与解析错误直接上抛
    pub async fn process_file(&self, path: &Path) -> EngineResult<String> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::Io(path.to_path_buf(), e))?;
        self.process_source(&source).await
    }

    /// 批处理模式
    ///
    /// 每个被发现的文件恰好产生一个结果条目。给定 `output_root` 时，
    /// 成功转换的文件写到其下的镜像相对路径。并发数为 1 或只有一个
    /// 文件时严格串行。
    pub async fn process_tree(
        &self,
        root: &Path,
        output_root: Option<&Path>,
    ) -> EngineResult<BatchResult> {
        let files = scanner::collect_source_files(root, &self.config.ignore_names)?;

        let concurrency = self.config.concurrency.clamp(1, MAX_CONCURRENCY);
        info!("Processing {} files, concurrency: {}", files.len(), concurrency);

        let entries = Arc::new(Mutex::new(BTreeMap::new()));

        if concurrency <= 1 || files.len() <= 1 {
            for path in files {
                let key = relative_key(root, &path);
                let outcome = self.process_one(&path, root, output_root).await;
                entries.lock().insert(key, outcome);
            }
        } else {
            stream::iter(files)
                .for_each_concurrent(concurrency, |path| {
                    let entries = Arc::clone(&entries);
                    async move {
                        let key = relative_key(root, &path);
                        let outcome = self.process_one(&path, root, output_root).await;
                        entries.lock().insert(key, outcome);
                    }
                })
                .await;
        }

        let entries = Arc::try_unwrap(entries)
            .map(Mutex::into_inner)
            .unwrap_or_else(|shared| shared.lock().clone());
        Ok(BatchResult { entries })
    }

    /// 处理单个文件并按需镜像写出；失败在此边界捕获为错误条目
    async fn process_one(
        &self,
        path: &Path,
        root: &Path,
        output_root: Option<&Path>,
    ) -> FileOutcome {
        match self.process_file(path).await {
            Ok(text) => {
                if let Some(out_root) = output_root {
                    if let Err(e) = write_mirrored(out_root, root, path, &text).await {
                        warn!("Failed to write output for {}: {}", path.display(), e);
                        return FileOutcome::Failure { error: e.to_string() };
                    }
                }
                FileOutcome::Success { text }
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                FileOutcome::Failure { error: e.to_string() }
            }
        }
    }
}

/// 声明对应的源码片段（供委托生成使用）
fn snippet_of(lines: &[&str], declaration: &Declaration) -> String {
    let start = declaration.start_line.saturating_sub(1);
    let end = declaration.end_line.min(lines.len());
    lines[start..end].join("\n")
}

/// 批处理结果键：相对根目录的路径，统一正斜杠
fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// 镜像写出：仅在整条流水线成功后一次性写入最终文本，不落半成品
async fn write_mirrored(
    output_root: &Path,
    root: &Path,
    path: &Path,
    text: &str,
) -> EngineResult<()> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let target = output_root.join(relative);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| EngineError::Io(parent.to_path_buf(), e))?;
    }
    tokio::fs::write(&target, text)
        .await
        .map_err(|e| EngineError::Io(target.clone(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn engine() -> DocstringEngine {
        DocstringEngine::with_default_config()
    }

    #[tokio::test]
    async fn test_inserts_block_after_header() {
        let source = "def add(a, b):\n    return a + b\n";
        let out = engine().process_source(source).await.unwrap();
        let lines: Vec<&str> = out.split('\n').collect();

        // 头部行与主体首行逐字节保留，文档块插在头部行之后
        assert_eq!(lines[0], "def add(a, b):");
        assert_eq!(lines[1], "    \"\"\"");
        assert!(lines.iter().any(|l| l.contains("a (Any)")));
        assert!(lines.iter().any(|l| l.contains("b (Any)")));
        assert!(lines.iter().any(|l| l.contains("Returns:")));
        assert_eq!(*lines.last().unwrap(), "");
        assert!(out.contains("    return a + b"));

        // 行数不变量：原 3 行 + 内容 8 行 + 定界符 2 行
        assert_eq!(lines.len(), 13);
    }

    #[tokio::test]
    async fn test_single_line_definition_untouched() {
        let source = "def f(): pass\n";
        let out = engine().process_source(source).await.unwrap();
        assert_eq!(out, source);
    }

    #[tokio::test]
    async fn test_documented_declarations_not_replanned() {
        let source = "\
class Greeter:
    \"\"\"Greets people.\"\"\"

    def documented(self, name):
        \"\"\"Say hello.\"\"\"
        return name

    def bare(self, name):
        return name
";
        let out = engine().process_source(source).await.unwrap();
        let lines: Vec<&str> = out.split('\n').collect();

        // 已文档化的类与方法保持原位、原文
        assert_eq!(lines[0], "class Greeter:");
        assert_eq!(lines[1], "    \"\"\"Greets people.\"\"\"");
        assert_eq!(lines[3], "    def documented(self, name):");
        assert_eq!(lines[4], "        \"\"\"Say hello.\"\"\"");

        // 只有未文档化的方法得到插入
        assert_eq!(lines[7], "    def bare(self, name):");
        assert_eq!(lines[8], "        \"\"\"");
        let original_count = source.split('\n').count();
        assert_eq!(lines.len(), original_count + 8 + 2);
    }

    #[tokio::test]
    async fn test_idempotence() {
        let source = "def add(a, b):\n    return a + b\n\nclass C:\n    def m(self):\n        return 1\n";
        let engine = engine();

        let once = engine.process_source(source).await.unwrap();
        let twice = engine.process_source(&once).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_malformed_source_surfaces_error() {
        let err = engine().process_source("def broken(:\n    pass\n").await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedSource { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = engine()
            .process_file(Path::new("/no/such/file.py"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Io(_, _)));
    }

    fn write_file(path: &Path, content: &str) {
        File::create(path).unwrap().write_all(content.as_bytes()).unwrap();
    }

    fn create_batch_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("ok.py"), "def a(x):\n    return x\n");
        write_file(&dir.path().join("bad.py"), "def broken(:\n    pass\n");

        let pkg = dir.path().join("pkg");
        fs::create_dir(&pkg).unwrap();
        write_file(&pkg.join("inner.py"), "def b(y):\n    return y\n");
        dir
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let tree = create_batch_tree();
        let result = engine().process_tree(tree.path(), None).await.unwrap();

        // 每个文件恰有一个条目，坏文件不影响其他文件
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert!(!result.entries["bad.py"].is_success());
        assert!(result.entries["ok.py"].is_success());
        assert!(result.entries["pkg/inner.py"].is_success());
    }

    #[tokio::test]
    async fn test_batch_sequential_mode() {
        let tree = create_batch_tree();
        let config = EngineConfig {
            concurrency: 1,
            ..EngineConfig::default()
        };
        let engine = DocstringEngine::new(config, None);

        let result = engine.process_tree(tree.path(), None).await.unwrap();
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.success_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_writes_mirrored_output() {
        let tree = create_batch_tree();
        let out = TempDir::new().unwrap();

        let result = engine()
            .process_tree(tree.path(), Some(out.path()))
            .await
            .unwrap();

        let inner = out.path().join("pkg").join("inner.py");
        assert!(inner.exists());
        let written = fs::read_to_string(&inner).unwrap();
        match &result.entries["pkg/inner.py"] {
            FileOutcome::Success { text } => assert_eq!(&written, text),
            other => panic!("unexpected outcome: {other:?}"),
        }

        // 失败的文件不产生输出文件
        assert!(!out.path().join("bad.py").exists());
    }

    #[tokio::test]
    async fn test_batch_empty_directory() {
        let dir = TempDir::new().unwrap();
        let result = engine().process_tree(dir.path(), None).await.unwrap();
        assert!(result.entries.is_empty());
    }
}
