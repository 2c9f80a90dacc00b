//! 외부화된 검사 상태 -- 오프셋 레코드, 결과 캐시, 락
//!
//! 프로세스는 매번 새로 시작되므로 연속 상태는 모두 상태 디렉토리의 파일입니다.
//! 캐시와 락 파일은 [`prefix_datafile`]이 만든 공통 접두 경로에 접미사를 붙여 만듭니다.

pub mod cache;
pub mod lock;
pub mod offset;

pub use cache::{CacheEntry, ResultCache};
pub use lock::AdvisoryLock;
pub use offset::{Identity, OffsetRecord, OffsetStore, purge_if_expired};

use std::path::{Path, PathBuf};

/// 캐시/락 파일 공통 이름
pub const PREFIX_DATA: &str = "logprobe";
/// 오프셋 레코드 접미사
pub const SUFFIX_SEEK: &str = ".seek";
/// 결과 캐시 접미사
pub const SUFFIX_CACHE: &str = ".cache";
/// 락 파일 접미사
pub const SUFFIX_LOCK: &str = ".lock";

/// 캐시/락 파일의 공통 접두 경로를 계산합니다.
///
/// 상태 디렉토리가 주어지면 그 아래, 아니면 명시적 레코드 파일과 같은 디렉토리에
/// 둡니다. 태그가 있으면 `.<tag>`를 덧붙입니다.
pub fn prefix_datafile(seekfile: Option<&Path>, state_dir: Option<&Path>, tag: Option<&str>) -> PathBuf {
    let dir = match state_dir.filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => seekfile
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut name = PREFIX_DATA.to_owned();
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        name.push('.');
        name.push_str(tag);
    }
    dir.join(name)
}

/// 접두 경로에 접미사를 붙입니다.
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}
