//! 目录扫描器
//!
//! 递归枚举批处理根目录下的 Python 源文件。忽略目录在目录层级剪枝，
//! 被排除的子树不会被枚举。

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{EngineError, EngineResult};

/// 枚举 root 下全部合格源文件（按文件名排序，保证结果可复现）
pub fn collect_source_files(root: &Path, ignore_names: &[String]) -> EngineResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(EngineError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(EngineError::NotADirectory(root.to_path_buf()));
    }

    // 编译忽略模式（glob），无效模式告警后跳过
    let patterns: Vec<glob::Pattern> = ignore_names
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Invalid ignore pattern '{}': {}", p, e);
                None
            }
        })
        .collect();

    info!("Starting directory scan: {}", root.display());

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, &patterns));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_python_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    info!("Scan completed: {} files", files.len());
    Ok(files)
}

/// 目录级剪枝：名称命中忽略模式的目录整棵跳过（根目录除外）
fn is_pruned(entry: &DirEntry, patterns: &[glob::Pattern]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    patterns.iter().any(|p| p.matches(&name))
}

fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("py"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::EngineConfig;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let dir = TempDir::new().unwrap();

        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        File::create(src.join("main.py"))
            .unwrap()
            .write_all(b"print('hello')\n")
            .unwrap();
        File::create(src.join("notes.md"))
            .unwrap()
            .write_all(b"# notes\n")
            .unwrap();

        let utils = src.join("utils");
        fs::create_dir(&utils).unwrap();
        File::create(utils.join("helper.py"))
            .unwrap()
            .write_all(b"def helper(): pass\n")
            .unwrap();

        // 应被剪枝的目录
        let cache = dir.path().join("__pycache__");
        fs::create_dir(&cache).unwrap();
        File::create(cache.join("stale.py"))
            .unwrap()
            .write_all(b"x = 1\n")
            .unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        dir
    }

    #[test]
    fn test_collects_only_python_files() {
        let tree = create_test_tree();
        let config = EngineConfig::default();

        let files = collect_source_files(tree.path(), &config.ignore_names).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "py"));
    }

    #[test]
    fn test_ignored_subtree_is_never_listed() {
        let tree = create_test_tree();
        let config = EngineConfig::default();

        let files = collect_source_files(tree.path(), &config.ignore_names).unwrap();

        assert!(!files.iter().any(|f| f.to_string_lossy().contains("__pycache__")));
    }

    #[test]
    fn test_empty_ignore_list_walks_everything() {
        let tree = create_test_tree();

        let files = collect_source_files(tree.path(), &[]).unwrap();

        assert!(files.iter().any(|f| f.to_string_lossy().contains("__pycache__")));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = collect_source_files(Path::new("/definitely/not/here"), &[]).unwrap_err();
        assert!(matches!(err, EngineError::PathNotFound(_)));
    }

    #[test]
    fn test_file_root_is_an_error() {
        let tree = create_test_tree();
        let file = tree.path().join("src").join("main.py");

        let err = collect_source_files(&file, &[]).unwrap_err();
        assert!(matches!(err, EngineError::NotADirectory(_)));
    }
}
