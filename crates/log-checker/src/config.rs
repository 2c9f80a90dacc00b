//! 검사 엔진 설정
//!
//! [`CheckerConfig`]는 core의 [`CheckConfig`](logprobe_core::config::CheckConfig)에서
//! 파생되는 엔진 전용 설정입니다. 초 단위 정수는 [`Duration`]으로, 패턴 목록은
//! [`RuleSet`]으로 묶입니다.
//!
//! # 사용 예시
//! ```
//! use logprobe_core::config::ProbeConfig;
//! use logprobe_checker::config::CheckerConfig;
//!
//! let core_config = ProbeConfig::default();
//! let config = CheckerConfig::from_core(&core_config.check);
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;
use std::time::Duration;

use logprobe_core::config::{CheckConfig, is_valid_tag};

use crate::error::CheckerError;
use crate::rule::RuleSet;

/// 검사 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// 라인 형식 템플릿
    pub logformat: String,
    /// 패턴 규칙
    pub rules: RuleSet,
    /// 로그 인코딩 레이블
    pub encoding: String,
    /// WARNING 임계 매칭 수
    pub warning: u64,
    /// CRITICAL 임계 매칭 수 (0이면 경고 매칭 수로 승격하지 않음)
    pub critical: u64,
    /// 새 내용이 없으면 WARNING
    pub nodiff_warn: bool,
    /// 새 내용이 없으면 CRITICAL
    pub nodiff_crit: bool,
    /// inode 기준 레코드 추적
    pub trace_inode: bool,
    /// 스캔 윈도우 (None이면 무제한)
    pub scantime: Option<Duration>,
    /// 오프셋 레코드 만료 시간
    pub expiration: Duration,
    /// 결과 캐시 사용
    pub cache: bool,
    /// 결과 캐시 유효 시간
    pub cachetime: Duration,
    /// 락 대기 시간 (0이면 무기한)
    pub lock_timeout: Duration,
    /// 상태 디렉토리
    pub state_dir: PathBuf,
    /// 레코드 이름 공간 태그
    pub seekfile_tag: Option<String>,
    /// 만료 레코드 정리
    pub remove_seekfile: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self::from_core(&CheckConfig::default())
    }
}

impl CheckerConfig {
    /// core의 `CheckConfig`에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &CheckConfig) -> Self {
        Self {
            logformat: core.logformat.clone(),
            rules: RuleSet {
                patterns: core.patterns.clone(),
                critical_patterns: core.critical_patterns.clone(),
                negpatterns: core.negpatterns.clone(),
                critical_negpatterns: core.critical_negpatterns.clone(),
                case_insensitive: core.case_insensitive,
                multiline: core.multiline,
            },
            encoding: core.encoding.clone(),
            warning: core.warning,
            critical: core.critical,
            nodiff_warn: core.nodiff_warn,
            nodiff_crit: core.nodiff_crit,
            trace_inode: core.trace_inode,
            scantime: core.scantime_secs.map(Duration::from_secs),
            expiration: Duration::from_secs(core.expiration_secs),
            cache: core.cache,
            cachetime: Duration::from_secs(core.cachetime_secs),
            lock_timeout: Duration::from_secs(core.lock_timeout_secs),
            state_dir: PathBuf::from(&core.state_dir),
            seekfile_tag: core.tag().map(str::to_owned),
            remove_seekfile: core.remove_seekfile,
        }
    }

    /// 태그 (빈 문자열은 없음)
    pub fn tag(&self) -> Option<&str> {
        self.seekfile_tag.as_deref().filter(|t| !t.is_empty())
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 템플릿과 정규식의 컴파일 검증은 [`LogChecker::new`](crate::LogChecker::new)에서 합니다.
    pub fn validate(&self) -> Result<(), CheckerError> {
        if self.logformat.is_empty() {
            return Err(CheckerError::Config {
                field: "logformat".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.encoding.trim().is_empty() {
            return Err(CheckerError::Config {
                field: "encoding".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.state_dir.as_os_str().is_empty() {
            return Err(CheckerError::Config {
                field: "state_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if let Some(tag) = &self.seekfile_tag {
            if !is_valid_tag(tag) {
                return Err(CheckerError::Config {
                    field: "seekfile_tag".to_owned(),
                    reason: format!("'{tag}' contains characters outside [-_0-9A-Za-z]"),
                });
            }
        }

        if self.cache && self.cachetime.is_zero() {
            return Err(CheckerError::Config {
                field: "cachetime".to_owned(),
                reason: "must be greater than 0 when cache is enabled".to_owned(),
            });
        }

        Ok(())
    }
}

/// 검사 엔진 설정 빌더
#[derive(Default)]
pub struct CheckerConfigBuilder {
    config: CheckerConfig,
}

impl CheckerConfigBuilder {
    /// 기본값에서 시작하는 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 라인 형식 템플릿을 설정합니다.
    pub fn logformat(mut self, template: impl Into<String>) -> Self {
        self.config.logformat = template.into();
        self
    }

    /// WARNING 패턴을 설정합니다.
    pub fn patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.rules.patterns = patterns;
        self
    }

    /// CRITICAL 패턴을 설정합니다.
    pub fn critical_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.rules.critical_patterns = patterns;
        self
    }

    /// WARNING 제외 패턴을 설정합니다.
    pub fn negpatterns(mut self, patterns: Vec<String>) -> Self {
        self.config.rules.negpatterns = patterns;
        self
    }

    /// 라인 전체 제외 패턴을 설정합니다.
    pub fn critical_negpatterns(mut self, patterns: Vec<String>) -> Self {
        self.config.rules.critical_negpatterns = patterns;
        self
    }

    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.config.rules.case_insensitive = enabled;
        self
    }

    pub fn multiline(mut self, enabled: bool) -> Self {
        self.config.rules.multiline = enabled;
        self
    }

    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.config.encoding = label.into();
        self
    }

    /// WARNING/CRITICAL 임계 매칭 수를 설정합니다.
    pub fn thresholds(mut self, warning: u64, critical: u64) -> Self {
        self.config.warning = warning;
        self.config.critical = critical;
        self
    }

    pub fn nodiff_warn(mut self, enabled: bool) -> Self {
        self.config.nodiff_warn = enabled;
        self
    }

    pub fn nodiff_crit(mut self, enabled: bool) -> Self {
        self.config.nodiff_crit = enabled;
        self
    }

    pub fn trace_inode(mut self, enabled: bool) -> Self {
        self.config.trace_inode = enabled;
        self
    }

    /// 스캔 윈도우를 설정합니다 (`None`이면 무제한).
    pub fn scantime(mut self, scantime: Option<Duration>) -> Self {
        self.config.scantime = scantime;
        self
    }

    pub fn expiration(mut self, expiration: Duration) -> Self {
        self.config.expiration = expiration;
        self
    }

    /// 결과 캐시를 켜고 유효 시간을 설정합니다.
    pub fn cache(mut self, enabled: bool, cachetime: Duration) -> Self {
        self.config.cache = enabled;
        self.config.cachetime = cachetime;
        self
    }

    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = timeout;
        self
    }

    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.state_dir = dir.into();
        self
    }

    /// 레코드 이름 공간 태그를 설정합니다.
    pub fn seekfile_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.config.seekfile_tag = (!tag.is_empty()).then_some(tag);
        self
    }

    pub fn remove_seekfile(mut self, enabled: bool) -> Self {
        self.config.remove_seekfile = enabled;
        self
    }

    /// 설정을 검증하고 `CheckerConfig`를 생성합니다.
    pub fn build(self) -> Result<CheckerConfig, CheckerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
