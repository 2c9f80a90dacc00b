//! 다중 파일 해석기
//!
//! 공백으로 구분된 경로 목록을 실제 파일 집합으로 해석합니다.
//! 각 항목은 리터럴 경로이거나 glob 패턴(`*`, `?`, `[...]`)입니다.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CheckerError;

/// 로그 파일 목록 해석기
pub struct FileResolver;

impl FileResolver {
    /// 파일 지정 문자열을 중복 없는 사전순 일반 파일 목록으로 해석합니다.
    ///
    /// 존재하지 않거나 일반 파일이 아닌 항목은 조용히 제외됩니다.
    /// glob 문법 오류만 에러로 보고됩니다.
    pub fn resolve(spec: &str) -> Result<Vec<PathBuf>, CheckerError> {
        let mut files = BTreeSet::new();

        for token in spec.split_whitespace() {
            if is_glob(token) {
                let entries = glob::glob(token).map_err(|e| CheckerError::Glob {
                    pattern: token.to_owned(),
                    reason: e.to_string(),
                })?;
                for entry in entries {
                    match entry {
                        Ok(path) => Self::admit(&mut files, path),
                        Err(e) => debug!(pattern = token, error = %e, "unreadable glob entry skipped"),
                    }
                }
            } else {
                Self::admit(&mut files, PathBuf::from(token));
            }
        }

        Ok(files.into_iter().collect())
    }

    fn admit(files: &mut BTreeSet<PathBuf>, path: PathBuf) {
        if is_regular_file(&path) {
            files.insert(path);
        } else {
            debug!(path = %path.display(), "not a regular file, skipped");
        }
    }
}

fn is_glob(token: &str) -> bool {
    token.contains(['*', '?', '['])
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn literal_paths_are_deduplicated_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();

        let spec = format!("{} {} {}", b.display(), a.display(), b.display());
        let files = FileResolver::resolve(&spec).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn glob_expands_to_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app1.log", "app2.log", "other.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let spec = format!("{}/app*.log", dir.path().display());
        let files = FileResolver::resolve(&spec).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("app1.log"));
        assert!(files[1].ends_with("app2.log"));
    }

    #[test]
    fn glob_and_literal_overlap_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        fs::write(&a, "").unwrap();

        let spec = format!("{}/*.log {}", dir.path().display(), a.display());
        assert_eq!(FileResolver::resolve(&spec).unwrap(), vec![a]);
    }

    #[test]
    fn missing_files_and_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub.log")).unwrap();

        let spec = format!(
            "{}/missing.log {}/sub.log",
            dir.path().display(),
            dir.path().display()
        );
        assert!(FileResolver::resolve(&spec).unwrap().is_empty());
    }

    #[test]
    fn malformed_glob_is_an_error() {
        let err = FileResolver::resolve("/tmp/[unclosed").unwrap_err();
        assert!(matches!(err, CheckerError::Glob { .. }));
    }

    #[test]
    fn empty_spec_resolves_to_nothing() {
        assert!(FileResolver::resolve("   ").unwrap().is_empty());
    }
}
