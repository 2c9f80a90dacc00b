//! 결과 캐시
//!
//! 직전 판정(상태 + 메시지)을 `<prefix>.cache` 파일에 JSON으로 보관합니다.
//! 유효 시간 안에 다시 호출되면 스캔 없이 캐시된 판정을 그대로 반환합니다.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use logprobe_core::State;

/// 캐시된 판정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 판정 상태
    pub state: State,
    /// 판정 메시지
    pub message: String,
    /// 기록 시각
    pub written_at: DateTime<Utc>,
}

impl CacheEntry {
    /// `now` 기준으로 아직 유효한지 확인합니다.
    ///
    /// 기록 시각이 미래(시계 역행)이면 방금 기록된 것으로 봅니다.
    pub fn is_fresh(&self, lifetime: Duration, now: SystemTime) -> bool {
        let written = SystemTime::from(self.written_at);
        let age = now.duration_since(written).unwrap_or(Duration::ZERO);
        age < lifetime
    }
}

/// 상태 디렉토리/태그 단위의 결과 캐시
#[derive(Debug, Clone)]
pub struct ResultCache {
    path: PathBuf,
    lifetime: Duration,
}

impl ResultCache {
    /// 캐시 파일 경로와 유효 시간으로 캐시를 생성합니다.
    pub fn new(path: PathBuf, lifetime: Duration) -> Self {
        Self { path, lifetime }
    }

    /// 캐시 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 유효한 캐시 항목을 반환합니다. 없거나, 손상되었거나, 만료되면 `None`입니다.
    pub fn get(&self, now: SystemTime) -> Option<CacheEntry> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable cache file ignored");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cache file ignored");
                return None;
            }
        };

        if entry.is_fresh(self.lifetime, now) {
            debug!(path = %self.path.display(), state = %entry.state, "cache hit");
            Some(entry)
        } else {
            debug!(path = %self.path.display(), "cache expired");
            None
        }
    }

    /// 판정을 기록합니다 (기존 항목을 덮어씀).
    pub fn put(&self, state: State, message: &str, now: SystemTime) -> io::Result<()> {
        let entry = CacheEntry {
            state,
            message: message.to_owned(),
            written_at: DateTime::<Utc>::from(now),
        };
        let json = serde_json::to_vec(&entry).map_err(io::Error::other)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}
