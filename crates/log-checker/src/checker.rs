//! 검사 오케스트레이터
//!
//! [`LogChecker`]는 락 획득, 캐시 확인, 파일 해석, 증분 스캔, 판정, 캐시 기록,
//! 락 해제를 순서대로 수행합니다. 판정 누적기는 인스턴스가 소유하며
//! [`LogChecker::clear_state`]로만 초기화됩니다.
//!
//! # 사용 예시
//! ```no_run
//! use std::path::Path;
//! use logprobe_checker::{CheckerConfigBuilder, LogChecker};
//!
//! # fn run() -> Result<(), logprobe_checker::CheckerError> {
//! let config = CheckerConfigBuilder::new()
//!     .patterns(vec!["ERROR".to_owned()])
//!     .state_dir("/var/tmp/logprobe")
//!     .build()?;
//! let mut checker = LogChecker::new(config)?;
//! let state = checker.check("/var/log/app*.log", None, None)?;
//! println!("{}", checker.message());
//! # let _ = state;
//! # Ok(())
//! # }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use logprobe_core::State;

use crate::clock::{Clock, SystemClock};
use crate::collector::{FileMeta, FileResolver, ScanWindow, TailReader};
use crate::config::CheckerConfig;
use crate::error::CheckerError;
use crate::parser::{LineDecoder, LineFormat};
use crate::rule::{Block, BlockAccumulator, PatternMatcher};
use crate::state::{
    self, AdvisoryLock, OffsetRecord, OffsetStore, ResultCache, SUFFIX_CACHE, SUFFIX_LOCK,
};
use crate::verdict::{Verdict, VerdictPolicy};

/// 락 획득 실패 시 메시지
pub const LOCK_TIMEOUT_MESSAGE: &str = "UNKNOWN: Lock timeout. Another process is running.";

/// 로그 검사기
pub struct LogChecker {
    config: CheckerConfig,
    format: LineFormat,
    matcher: PatternMatcher,
    decoder: LineDecoder,
    window: ScanWindow,
    policy: VerdictPolicy,
    clock: Arc<dyn Clock>,
    verdict: Verdict,
}

impl LogChecker {
    /// 설정을 검증하고 템플릿, 패턴, 인코딩을 컴파일합니다.
    ///
    /// 잘못된 템플릿이나 정규식은 여기서 치명적 에러가 됩니다.
    pub fn new(config: CheckerConfig) -> Result<Self, CheckerError> {
        config.validate()?;

        let format = LineFormat::new(&config.logformat)?;
        let matcher = PatternMatcher::new(&config.rules)?;
        let decoder = LineDecoder::new(&config.encoding)?;

        if config.rules.is_empty() {
            warn!("no patterns configured, every check will report no matches");
        }

        Ok(Self {
            window: ScanWindow::new(config.scantime),
            policy: VerdictPolicy {
                warning: config.warning,
                critical: config.critical,
                nodiff_warn: config.nodiff_warn,
                nodiff_crit: config.nodiff_crit,
            },
            format,
            matcher,
            decoder,
            clock: Arc::new(SystemClock),
            verdict: Verdict::default(),
            config,
        })
    }

    /// 시간 소스를 교체합니다.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 현재 설정
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// 락과 캐시를 포함한 전체 검사를 수행합니다.
    ///
    /// `seekfile`이 주어지면 `logfile`을 단일 파일로 보고 그 레코드로 검사합니다.
    /// 아니면 `logfile`을 파일 목록/glob으로 해석해 상태 디렉토리(`state_dir`,
    /// 없으면 설정값)의 레코드로 검사합니다.
    ///
    /// 락을 얻지 못하면 아무 상태도 바꾸지 않고 `State::Unknown`을 반환합니다.
    pub fn check(
        &mut self,
        logfile: &str,
        seekfile: Option<&Path>,
        state_dir: Option<&Path>,
    ) -> Result<State, CheckerError> {
        let tag = self.config.tag().map(str::to_owned);
        let state_dir = match (seekfile, state_dir) {
            (_, Some(dir)) => Some(dir.to_path_buf()),
            (None, None) => Some(self.config.state_dir.clone()),
            (Some(_), None) => None,
        };
        let prefix = state::prefix_datafile(seekfile, state_dir.as_deref(), tag.as_deref());
        let lock_path = state::with_suffix(&prefix, SUFFIX_LOCK);

        let Some(lock) = AdvisoryLock::acquire(&lock_path, self.config.lock_timeout)? else {
            warn!(
                lock = %lock_path.display(),
                timeout_secs = self.config.lock_timeout.as_secs(),
                "lock timeout"
            );
            self.verdict.set_fixed(State::Unknown, LOCK_TIMEOUT_MESSAGE);
            return Ok(State::Unknown);
        };

        let outcome = self.check_locked(logfile, seekfile, state_dir, &prefix, tag.as_deref());
        let released = lock.release();
        outcome?;
        released?;

        Ok(self.state())
    }

    fn check_locked(
        &mut self,
        logfile: &str,
        seekfile: Option<&Path>,
        state_dir: Option<PathBuf>,
        prefix: &Path,
        tag: Option<&str>,
    ) -> Result<(), CheckerError> {
        let now = self.clock.now();
        let cache = self.config.cache.then(|| {
            ResultCache::new(
                state::with_suffix(prefix, SUFFIX_CACHE),
                self.config.cachetime,
            )
        });

        if let Some(entry) = cache.as_ref().and_then(|c| c.get(now)) {
            self.verdict.set_fixed(entry.state, entry.message);
            return Ok(());
        }

        match seekfile {
            Some(seekfile) => self.check_log(Path::new(logfile), seekfile)?,
            None => {
                let dir = state_dir.unwrap_or_else(|| self.config.state_dir.clone());
                self.check_log_multi(logfile, &dir, self.config.remove_seekfile, tag)?;
            }
        }

        if let Some(cache) = cache {
            cache.put(self.state(), &self.message(), now)?;
        }
        Ok(())
    }

    /// 단일 파일을 명시적 레코드로 검사합니다.
    ///
    /// 파일 해석, 스캔 윈도우, 레코드 만료를 거치지 않습니다.
    pub fn check_log(&mut self, logfile: &Path, seekfile: &Path) -> Result<(), CheckerError> {
        self.scan_file(logfile, seekfile)
    }

    /// 파일 목록/glob을 해석하여 각 파일을 검사합니다.
    ///
    /// `remove_seekfile`이면 이 (패턴, 태그) 이름 공간의 만료된 레코드를 정리합니다.
    /// 현재 패턴에 더 이상 매칭되지 않는 파일의 레코드도 대상입니다.
    pub fn check_log_multi(
        &mut self,
        logfile: &str,
        state_dir: &Path,
        remove_seekfile: bool,
        tag: Option<&str>,
    ) -> Result<(), CheckerError> {
        let store = OffsetStore::new(state_dir, logfile, tag);
        let now = self.clock.now();

        for path in FileResolver::resolve(logfile)? {
            let meta = match FileMeta::of(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "file vanished before scan");
                    continue;
                }
            };

            if !self.window.admits(meta.modified, now) {
                debug!(path = %path.display(), "outside scan window, skipped");
                continue;
            }

            let record = match store.resolve(&path, self.config.trace_inode) {
                Ok(record) => record,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "file vanished before scan");
                    continue;
                }
            };

            match self.scan_file(&path, &record) {
                Ok(()) => {}
                Err(CheckerError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "file vanished during scan");
                }
                Err(CheckerError::Io(e)) if e.kind() == io::ErrorKind::PermissionDenied => {
                    warn!(path = %path.display(), error = %e, "unreadable file skipped");
                }
                Err(e) => return Err(e),
            }
        }

        if remove_seekfile {
            let removed = store.purge_expired(self.config.expiration, now)?;
            if removed > 0 {
                info!(removed, state_dir = %state_dir.display(), "expired offset records purged");
            }
        }

        Ok(())
    }

    /// 한 파일을 저장된 오프셋부터 끝까지 스캔하고 새 오프셋을 저장합니다.
    fn scan_file(&mut self, path: &Path, record_path: &Path) -> Result<(), CheckerError> {
        let mut reader = TailReader::open(path)?;
        let meta = reader.meta().clone();

        let start = OffsetRecord::load(record_path)
            .map(|record| record.resume_offset(&meta, self.config.trace_inode))
            .unwrap_or(0);
        reader.seek_to(start)?;

        let mut buf = Vec::new();
        let mut blocks = BlockAccumulator::new();
        let mut undecodable = 0usize;

        while reader.next_line(&mut buf)? {
            let Some(line) = self.decoder.decode(&buf) else {
                undecodable += 1;
                continue;
            };
            let parts = self.format.split(&line);

            if self.config.rules.multiline {
                if let Some(block) = blocks.push(parts.prefix, parts.body) {
                    self.evaluate_block(&block, path);
                }
            } else if let Some(tier) = self.matcher.classify(parts.body) {
                self.verdict.record_hit(tier, &parts.display(), path);
            }
        }
        if let Some(block) = blocks.finish() {
            self.evaluate_block(&block, path);
        }

        if undecodable > 0 {
            warn!(
                path = %path.display(),
                lines = undecodable,
                encoding = self.decoder.name(),
                "undecodable lines skipped"
            );
        }

        let end = reader.offset();
        self.verdict.add_bytes_read(end.saturating_sub(start));

        OffsetRecord {
            offset: end,
            size: meta.size.max(end),
            inode: meta.inode,
        }
        .save(record_path)?;

        debug!(path = %path.display(), start, end, "file scanned");
        Ok(())
    }

    fn evaluate_block(&mut self, block: &Block, path: &Path) {
        if let Some(tier) = self.matcher.classify(&block.text()) {
            self.verdict.record_hit(tier, &block.display(), path);
        }
    }

    /// 판정 누적기를 비웁니다. 디스크 상태는 건드리지 않습니다.
    pub fn clear_state(&mut self) {
        self.verdict.clear();
    }

    /// 현재까지의 판정 상태
    pub fn state(&self) -> State {
        self.verdict.state(&self.policy)
    }

    /// 현재까지의 판정 메시지
    pub fn message(&self) -> String {
        self.verdict.message(&self.policy)
    }

    /// 이 (패턴, 태그) 이름 공간의 모든 오프셋 레코드를 삭제합니다.
    ///
    /// 락 안에서 수행되며, 락을 얻지 못하면 `Ok(None)`입니다.
    pub fn reset_offsets(
        &self,
        logfile: &str,
        state_dir: Option<&Path>,
    ) -> Result<Option<usize>, CheckerError> {
        let dir = state_dir.unwrap_or(self.config.state_dir.as_path());
        let tag = self.config.tag();
        let prefix = state::prefix_datafile(None, Some(dir), tag);
        let lock_path = state::with_suffix(&prefix, SUFFIX_LOCK);

        let Some(lock) = AdvisoryLock::acquire(&lock_path, self.config.lock_timeout)? else {
            return Ok(None);
        };
        let outcome = OffsetStore::new(dir, logfile, tag).reset();
        let released = lock.release();
        let removed = outcome?;
        released?;
        Ok(Some(removed))
    }

    /// 파일에 대응하는 오프셋 레코드 경로를 계산합니다.
    pub fn seekfile(
        logfile_pattern: &str,
        state_dir: &Path,
        logfile: &Path,
        trace_inode: bool,
        tag: Option<&str>,
    ) -> io::Result<PathBuf> {
        OffsetStore::new(state_dir, logfile_pattern, tag).resolve(logfile, trace_inode)
    }

    /// 캐시/락 파일의 공통 접두 경로를 계산합니다.
    pub fn prefix_datafile(
        seekfile: Option<&Path>,
        state_dir: Option<&Path>,
        tag: Option<&str>,
    ) -> PathBuf {
        state::prefix_datafile(seekfile, state_dir, tag)
    }
}
