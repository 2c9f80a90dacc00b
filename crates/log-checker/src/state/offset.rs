//! 오프셋 레코드 저장소
//!
//! 논리적 로그 스트림마다 하나의 레코드 파일을 상태 디렉토리에 둡니다.
//! 레코드 이름은 `(발견 패턴, 태그, 식별자)`에서 결정적으로 파생됩니다.
//!
//! ```text
//! <sha256(pattern)>[.<tag>].path-<sha256(path)>.seek
//! <sha256(pattern)>[.<tag>].inode-<ino>.seek
//! ```
//!
//! 태그에는 `.`이 들어갈 수 없으므로 이름을 `.`으로 나누면 항상 모호함 없이
//! 구성 요소를 복원할 수 있습니다. 레코드 파일의 mtime이 마지막 갱신 시각이며
//! 만료 판정에 사용됩니다.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::SUFFIX_SEEK;
use crate::collector::FileMeta;

/// 해시 접두 길이 (바이트). 16바이트 = 128비트
const DIGEST_BYTES: usize = 16;

/// 레코드에 저장되는 읽기 위치
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRecord {
    /// 마지막으로 읽은 바이트 오프셋
    pub offset: u64,
    /// 마지막으로 관측한 파일 크기
    pub size: u64,
    /// 마지막으로 관측한 inode
    #[serde(default)]
    pub inode: Option<u64>,
}

impl OffsetRecord {
    /// 레코드를 읽습니다.
    ///
    /// 파일이 없거나, 읽을 수 없거나, 내용이 손상되었으면 `None`입니다.
    /// 호출자는 이를 "처음 보는 스트림"으로 취급해 오프셋 0부터 읽습니다.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable offset record, starting over");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt offset record, starting over");
                None
            }
        }
    }

    /// 레코드를 원자적으로 저장합니다 (임시 파일 작성 후 rename).
    ///
    /// 저장할 때마다 레코드 파일의 mtime이 갱신됩니다.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let json = serde_json::to_vec(self).map_err(io::Error::other)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)
    }

    /// 현재 파일 상태에 대해 읽기를 재개할 오프셋을 결정합니다.
    ///
    /// 파일이 저장된 오프셋보다 작아졌거나(잘림), inode 추적 중 inode가
    /// 바뀌었으면(로테이션) 처음부터 읽습니다.
    pub fn resume_offset(&self, current: &FileMeta, trace_inode: bool) -> u64 {
        if current.size < self.offset {
            debug!(
                stored = self.offset,
                size = current.size,
                "file shrank below stored offset, restarting at 0"
            );
            return 0;
        }

        if trace_inode && self.inode.is_some() && current.inode != self.inode {
            debug!(
                stored = ?self.inode,
                current = ?current.inode,
                "inode changed, restarting at 0"
            );
            return 0;
        }

        self.offset
    }
}

/// 스트림 식별자
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// 경로 기준 (기본)
    ByPath(PathBuf),
    /// inode 기준 (rename 되어도 같은 레코드)
    ByInode(u64),
}

impl Identity {
    /// 파일의 식별자를 결정합니다.
    ///
    /// inode 추적 시 파일을 stat하므로 파일이 없으면 에러입니다.
    /// inode를 제공하지 않는 플랫폼에서는 경로 기준으로 대체됩니다.
    pub fn of(file: &Path, trace_inode: bool) -> io::Result<Self> {
        if trace_inode {
            if let Some(inode) = FileMeta::of(file)?.inode {
                return Ok(Self::ByInode(inode));
            }
        }
        Ok(Self::ByPath(file.to_path_buf()))
    }

    /// 레코드 이름에 들어가는 식별자 구간
    pub fn key(&self) -> String {
        match self {
            Self::ByPath(path) => format!("path-{}", digest(path.as_os_str().as_encoded_bytes())),
            Self::ByInode(inode) => format!("inode-{inode}"),
        }
    }
}

/// 하나의 (패턴, 태그) 이름 공간에 속한 오프셋 레코드 집합
#[derive(Debug, Clone)]
pub struct OffsetStore {
    state_dir: PathBuf,
    pattern_key: String,
    tag: Option<String>,
}

impl OffsetStore {
    /// 새 저장소 뷰를 생성합니다. 디스크에는 아무것도 쓰지 않습니다.
    pub fn new(state_dir: &Path, pattern: &str, tag: Option<&str>) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
            pattern_key: digest(pattern.as_bytes()),
            tag: tag.filter(|t| !t.is_empty()).map(str::to_owned),
        }
    }

    /// 식별자에 대응하는 레코드 경로 (순수 함수)
    pub fn record_path(&self, identity: &Identity) -> PathBuf {
        let mut name = self.pattern_key.clone();
        if let Some(tag) = &self.tag {
            name.push('.');
            name.push_str(tag);
        }
        name.push('.');
        name.push_str(&identity.key());
        name.push_str(SUFFIX_SEEK);
        self.state_dir.join(name)
    }

    /// 파일의 레코드 경로를 결정합니다.
    pub fn resolve(&self, file: &Path, trace_inode: bool) -> io::Result<PathBuf> {
        Ok(self.record_path(&Identity::of(file, trace_inode)?))
    }

    /// 이 이름 공간에 속한 모든 레코드 파일을 나열합니다.
    ///
    /// 현재 패턴에 더 이상 매칭되지 않는 파일의 레코드도 포함됩니다.
    pub fn records(&self) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.state_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_str().is_some_and(|n| self.owns(n)) {
                records.push(entry.path());
            }
        }
        records.sort();
        Ok(records)
    }

    fn owns(&self, name: &str) -> bool {
        let Some(rest) = name
            .strip_prefix(self.pattern_key.as_str())
            .and_then(|r| r.strip_prefix('.'))
            .and_then(|r| r.strip_suffix(SUFFIX_SEEK))
        else {
            return false;
        };

        let parts: Vec<&str> = rest.split('.').collect();
        match (self.tag.as_deref(), parts.as_slice()) {
            (None, [identity]) => is_identity(identity),
            (Some(tag), [t, identity]) => *t == tag && is_identity(identity),
            _ => false,
        }
    }

    /// 만료된 레코드를 삭제하고 삭제 수를 반환합니다.
    pub fn purge_expired(&self, expiration: Duration, now: SystemTime) -> io::Result<usize> {
        let mut removed = 0;
        for record in self.records()? {
            if purge_if_expired(&record, expiration, now)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// 이 이름 공간의 모든 레코드를 삭제합니다.
    pub fn reset(&self) -> io::Result<usize> {
        let mut removed = 0;
        for record in self.records()? {
            remove_if_exists(&record)?;
            removed += 1;
        }
        info!(state_dir = %self.state_dir.display(), removed, "offset records reset");
        Ok(removed)
    }
}

/// 레코드가 `expiration`보다 오래 갱신되지 않았으면 삭제합니다.
///
/// 삭제했으면 `true`를 반환합니다. 이미 없는 레코드는 `false`입니다.
pub fn purge_if_expired(record: &Path, expiration: Duration, now: SystemTime) -> io::Result<bool> {
    let modified = match fs::metadata(record) {
        Ok(meta) => meta.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let idle = now.duration_since(modified).unwrap_or(Duration::ZERO);
    if idle <= expiration {
        return Ok(false);
    }

    remove_if_exists(record)?;
    info!(
        record = %record.display(),
        idle_secs = idle.as_secs(),
        "expired offset record removed"
    );
    Ok(true)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn is_identity(segment: &str) -> bool {
    segment.starts_with("path-") || segment.starts_with("inode-")
}

fn digest(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    hex::encode(&hash[..DIGEST_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(size: u64, inode: Option<u64>) -> FileMeta {
        FileMeta {
            size,
            inode,
            modified: SystemTime::now(),
        }
    }

    #[test]
    fn record_path_is_deterministic() {
        let store = OffsetStore::new(Path::new("/state"), "/var/log/*.log", None);
        let id = Identity::ByPath(PathBuf::from("/var/log/app.log"));
        assert_eq!(store.record_path(&id), store.record_path(&id));
    }

    #[test]
    fn distinct_paths_get_distinct_records() {
        let store = OffsetStore::new(Path::new("/state"), "p", None);
        let a = store.record_path(&Identity::ByPath("/var/log/a.log".into()));
        let b = store.record_path(&Identity::ByPath("/var/log/b.log".into()));
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_patterns_get_distinct_records() {
        let id = Identity::ByInode(42);
        let a = OffsetStore::new(Path::new("/state"), "/var/log/a*", None).record_path(&id);
        let b = OffsetStore::new(Path::new("/state"), "/var/log/b*", None).record_path(&id);
        assert_ne!(a, b);
    }

    #[test]
    fn tag_is_a_name_segment() {
        let store = OffsetStore::new(Path::new("/state"), "p", Some("web"));
        let path = store.record_path(&Identity::ByInode(7));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".web.inode-7.seek"), "{name}");
    }

    #[test]
    fn empty_tag_means_no_tag() {
        let id = Identity::ByInode(7);
        let tagged = OffsetStore::new(Path::new("/s"), "p", Some("")).record_path(&id);
        let untagged = OffsetStore::new(Path::new("/s"), "p", None).record_path(&id);
        assert_eq!(tagged, untagged);
    }

    #[test]
    fn missing_record_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OffsetRecord::load(&dir.path().join("x.seek")).is_none());
    }

    #[test]
    fn corrupt_record_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.seek");
        fs::write(&path, b"not json").unwrap();
        assert!(OffsetRecord::load(&path).is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("x.seek");
        let record = OffsetRecord {
            offset: 120,
            size: 120,
            inode: Some(99),
        };
        record.save(&path).unwrap();
        assert_eq!(OffsetRecord::load(&path), Some(record));
        assert!(!dir.path().join("nested").join("x.seek.tmp").exists());
    }

    #[test]
    fn truncation_restarts_at_zero() {
        let record = OffsetRecord {
            offset: 100,
            size: 100,
            inode: Some(1),
        };
        assert_eq!(record.resume_offset(&meta(40, Some(1)), false), 0);
        assert_eq!(record.resume_offset(&meta(140, Some(1)), false), 100);
    }

    #[test]
    fn inode_change_restarts_only_when_traced() {
        let record = OffsetRecord {
            offset: 100,
            size: 100,
            inode: Some(1),
        };
        assert_eq!(record.resume_offset(&meta(200, Some(2)), true), 0);
        assert_eq!(record.resume_offset(&meta(200, Some(2)), false), 100);
    }

    #[test]
    fn records_lists_only_own_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let mine = OffsetStore::new(dir.path(), "mine", None);
        let tagged = OffsetStore::new(dir.path(), "mine", Some("t1"));
        let other = OffsetStore::new(dir.path(), "other", None);

        let record = OffsetRecord::default();
        let a = mine.record_path(&Identity::ByInode(1));
        let b = tagged.record_path(&Identity::ByInode(1));
        let c = other.record_path(&Identity::ByInode(1));
        for path in [&a, &b, &c] {
            record.save(path).unwrap();
        }
        fs::write(dir.path().join("logprobe.cache"), "{}").unwrap();

        assert_eq!(mine.records().unwrap(), vec![a]);
        assert_eq!(tagged.records().unwrap(), vec![b]);
        assert_eq!(other.records().unwrap(), vec![c]);
    }

    #[test]
    fn records_in_missing_dir_is_empty() {
        let store = OffsetStore::new(Path::new("/nonexistent/logprobe"), "p", None);
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn purge_if_expired_respects_expiration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.seek");
        OffsetRecord::default().save(&path).unwrap();

        let now = SystemTime::now();
        assert!(!purge_if_expired(&path, Duration::from_secs(60), now).unwrap());
        assert!(path.exists());

        let later = now + Duration::from_secs(120);
        assert!(purge_if_expired(&path, Duration::from_secs(60), later).unwrap());
        assert!(!path.exists());
        assert!(!purge_if_expired(&path, Duration::from_secs(60), later).unwrap());
    }

    #[test]
    fn reset_removes_every_record_of_the_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::new(dir.path(), "p", None);
        for inode in 1..=3 {
            OffsetRecord::default()
                .save(&store.record_path(&Identity::ByInode(inode)))
                .unwrap();
        }
        assert_eq!(store.reset().unwrap(), 3);
        assert!(store.records().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn rename_keeps_inode_identity() {
        let dir = tempfile::tempdir().unwrap();
        let before = dir.path().join("app.log");
        let after = dir.path().join("app.log.1");
        fs::write(&before, "x\n").unwrap();

        let store = OffsetStore::new(dir.path(), "p", None);
        let first = store.resolve(&before, true).unwrap();
        fs::rename(&before, &after).unwrap();
        let second = store.resolve(&after, true).unwrap();
        assert_eq!(first, second);
    }
}
