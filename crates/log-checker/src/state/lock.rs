//! 프로세스 간 advisory lock
//!
//! 같은 상태 디렉토리/태그를 공유하는 동시 실행을 직렬화합니다.
//! 오프셋 레코드를 읽거나 쓰기 전에 획득하고, 판정과 캐시가 확정된 뒤 해제합니다.
//!
//! 해제 시 락 파일을 삭제하므로, 대기 중이던 프로세스가 삭제된 파일의 락을
//! 잡을 수 있습니다. 이를 막기 위해 락을 잡은 뒤 경로가 여전히 같은 파일을
//! 가리키는지 확인하고, 아니면 새 파일로 다시 시도합니다.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// 락 재시도 간격
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// 획득한 락
///
/// [`AdvisoryLock::release`]를 호출하지 않고 drop되면 파일 핸들이 닫히며
/// OS 락은 풀리지만 락 파일은 남습니다.
#[derive(Debug)]
pub struct AdvisoryLock {
    file: File,
    path: PathBuf,
}

impl AdvisoryLock {
    /// 락을 획득합니다.
    ///
    /// `timeout`이 0이면 무기한 대기합니다. 시간 안에 획득하지 못하면 `Ok(None)`,
    /// 락 파일을 만들 수 없으면 `Err`를 반환합니다.
    pub fn acquire(path: &Path, timeout: Duration) -> io::Result<Option<Self>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);

        loop {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?;

            let locked = match deadline {
                None => {
                    fs2::FileExt::lock_exclusive(&file)?;
                    true
                }
                Some(_) => match fs2::FileExt::try_lock_exclusive(&file) {
                    Ok(()) => true,
                    Err(e) if is_contended(&e) => false,
                    Err(e) => return Err(e),
                },
            };

            if locked {
                if still_linked(&file, path)? {
                    debug!(path = %path.display(), "lock acquired");
                    return Ok(Some(Self {
                        file,
                        path: path.to_path_buf(),
                    }));
                }
                debug!(path = %path.display(), "lock file replaced while waiting, retrying");
                fs2::FileExt::unlock(&file)?;
                continue;
            }

            // deadline이 None이면 위에서 이미 반환됨
            let Some(deadline) = deadline else { continue };
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(RETRY_INTERVAL.min(deadline - now));
        }
    }

    /// 락 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 락 파일을 삭제하고 락을 해제합니다.
    pub fn release(self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
        fs2::FileExt::unlock(&self.file)?;
        debug!(path = %self.path.display(), "lock released");
        Ok(())
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match std::fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> io::Result<bool> {
    Ok(path.exists())
}
