//! 설정 관리 — logprobe.toml 파싱 및 런타임 설정
//!
//! [`ProbeConfig`]는 CLI와 검사 엔진이 공유하는 최상위 설정 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGPROBE_CHECK_STATE_DIR=/var/tmp/logprobe` 형식)
//! 3. 설정 파일 (`logprobe.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), logprobe_core::error::ProbeError> {
//! use logprobe_core::config::ProbeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ProbeConfig::load("/etc/logprobe.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ProbeConfig::parse("[check]\npatterns = [\"ERROR\"]")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ProbeError};

/// syslog 형식 라인 템플릿 (기본값)
///
/// `Dec  5 12:34:56 hostname prog[123]: message` 또는
/// `2013-12-05T12:34:56+09:00 hostname prog: message` 형식을 처리합니다.
/// 첫 번째 캡처 그룹이 헤더(prefix), 두 번째가 메시지 본문입니다.
pub const FORMAT_SYSLOG: &str =
    r"^((?:%b\s%e\s%T|%FT%T\S*)\s[-_0-9A-Za-z.]+\s(?:[^ :\[\]]+(?:\[\d+\])?:\s)?)(.*)$";

/// logprobe 통합 설정
///
/// `logprobe.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 검사 설정
    #[serde(default)]
    pub check: CheckConfig,
}

impl ProbeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ProbeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ProbeError> {
        toml::from_str(toml_str).map_err(|e| {
            ProbeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGPROBE_{SECTION}_{FIELD}`
    /// 예: `LOGPROBE_CHECK_SEEKFILE_TAG=app1`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGPROBE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGPROBE_GENERAL_LOG_FORMAT");

        // Check
        override_string(&mut self.check.logformat, "LOGPROBE_CHECK_LOGFORMAT");
        override_csv(&mut self.check.patterns, "LOGPROBE_CHECK_PATTERNS");
        override_csv(
            &mut self.check.critical_patterns,
            "LOGPROBE_CHECK_CRITICAL_PATTERNS",
        );
        override_csv(&mut self.check.negpatterns, "LOGPROBE_CHECK_NEGPATTERNS");
        override_csv(
            &mut self.check.critical_negpatterns,
            "LOGPROBE_CHECK_CRITICAL_NEGPATTERNS",
        );
        override_bool(
            &mut self.check.case_insensitive,
            "LOGPROBE_CHECK_CASE_INSENSITIVE",
        );
        override_string(&mut self.check.encoding, "LOGPROBE_CHECK_ENCODING");
        override_u64(&mut self.check.warning, "LOGPROBE_CHECK_WARNING");
        override_u64(&mut self.check.critical, "LOGPROBE_CHECK_CRITICAL");
        override_bool(&mut self.check.nodiff_warn, "LOGPROBE_CHECK_NODIFF_WARN");
        override_bool(&mut self.check.nodiff_crit, "LOGPROBE_CHECK_NODIFF_CRIT");
        override_bool(&mut self.check.trace_inode, "LOGPROBE_CHECK_TRACE_INODE");
        override_bool(&mut self.check.multiline, "LOGPROBE_CHECK_MULTILINE");
        override_opt_u64(&mut self.check.scantime_secs, "LOGPROBE_CHECK_SCANTIME_SECS");
        override_u64(
            &mut self.check.expiration_secs,
            "LOGPROBE_CHECK_EXPIRATION_SECS",
        );
        override_bool(&mut self.check.cache, "LOGPROBE_CHECK_CACHE");
        override_u64(&mut self.check.cachetime_secs, "LOGPROBE_CHECK_CACHETIME_SECS");
        override_u64(
            &mut self.check.lock_timeout_secs,
            "LOGPROBE_CHECK_LOCK_TIMEOUT_SECS",
        );
        override_string(&mut self.check.state_dir, "LOGPROBE_CHECK_STATE_DIR");
        override_string(&mut self.check.seekfile_tag, "LOGPROBE_CHECK_SEEKFILE_TAG");
        override_bool(
            &mut self.check.remove_seekfile,
            "LOGPROBE_CHECK_REMOVE_SEEKFILE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ProbeError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.check.validate()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 로그 검사 설정
///
/// 엔진 쪽 `CheckerConfig`의 원본이 되는 직렬화 가능한 설정입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// 라인 형식 템플릿 (strftime 플레이스홀더 + 두 개의 캡처 그룹)
    pub logformat: String,
    /// WARNING 패턴 목록 (OR 결합)
    pub patterns: Vec<String>,
    /// CRITICAL 패턴 목록 (OR 결합)
    pub critical_patterns: Vec<String>,
    /// WARNING 제외 패턴 목록
    pub negpatterns: Vec<String>,
    /// CRITICAL 제외 패턴 목록
    pub critical_negpatterns: Vec<String>,
    /// 대소문자 무시 여부 (두 등급 모두에 적용)
    pub case_insensitive: bool,
    /// 로그 파일 인코딩 레이블
    pub encoding: String,
    /// WARNING 임계 매칭 수 (0이면 한 건만으로 도달)
    pub warning: u64,
    /// CRITICAL 임계 매칭 수 (0이면 경고 매칭 수로는 CRITICAL에 도달하지 않음)
    pub critical: u64,
    /// 새로 읽은 내용이 없으면 WARNING
    pub nodiff_warn: bool,
    /// 새로 읽은 내용이 없으면 CRITICAL
    pub nodiff_crit: bool,
    /// inode 기준으로 오프셋 레코드를 추적 (로테이션 대응)
    pub trace_inode: bool,
    /// 여러 줄을 하나의 블록으로 매칭
    pub multiline: bool,
    /// 마지막 수정 후 이 시간(초)이 지난 파일은 검사하지 않음 (None이면 무제한)
    pub scantime_secs: Option<u64>,
    /// 이 시간(초) 동안 갱신되지 않은 오프셋 레코드는 삭제 대상
    pub expiration_secs: u64,
    /// 결과 캐시 사용 여부
    pub cache: bool,
    /// 결과 캐시 유효 시간 (초)
    pub cachetime_secs: u64,
    /// 락 대기 시간 (초, 0이면 무기한 대기)
    pub lock_timeout_secs: u64,
    /// 오프셋 레코드, 캐시, 락 파일이 저장되는 디렉토리
    pub state_dir: String,
    /// 레코드 이름 공간 태그 (빈 문자열이면 없음)
    pub seekfile_tag: String,
    /// 만료된 오프셋 레코드를 정리할지 여부
    pub remove_seekfile: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            logformat: FORMAT_SYSLOG.to_owned(),
            patterns: Vec::new(),
            critical_patterns: Vec::new(),
            negpatterns: Vec::new(),
            critical_negpatterns: Vec::new(),
            case_insensitive: false,
            encoding: "utf-8".to_owned(),
            warning: 1,
            critical: 0,
            nodiff_warn: false,
            nodiff_crit: false,
            trace_inode: false,
            multiline: false,
            scantime_secs: None,
            expiration_secs: 691_200, // 8일
            cache: false,
            cachetime_secs: 60,
            lock_timeout_secs: 3,
            state_dir: "/var/tmp/logprobe".to_owned(),
            seekfile_tag: String::new(),
            remove_seekfile: false,
        }
    }
}

impl CheckConfig {
    /// 태그를 `Option`으로 반환합니다 (빈 문자열은 태그 없음).
    pub fn tag(&self) -> Option<&str> {
        if self.seekfile_tag.is_empty() {
            None
        } else {
            Some(&self.seekfile_tag)
        }
    }

    /// 검사 설정의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.logformat.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "check.logformat".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.encoding.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "check.encoding".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.state_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "check.state_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        // 태그는 파일 이름의 한 구간이 되므로 구분자('.', '/')를 허용하지 않음
        if !is_valid_tag(&self.seekfile_tag) {
            return Err(ConfigError::InvalidValue {
                field: "check.seekfile_tag".to_owned(),
                reason: "only [-_0-9A-Za-z] characters are allowed".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 태그 문자열이 레코드 이름에 안전하게 들어갈 수 있는지 확인합니다.
///
/// 빈 문자열은 "태그 없음"으로 유효합니다.
pub fn is_valid_tag(tag: &str) -> bool {
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_opt_u64(target: &mut Option<u64>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = ProbeConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.check.warning, 1);
        assert_eq!(config.check.critical, 0);
        assert_eq!(config.check.expiration_secs, 691_200);
        assert_eq!(config.check.cachetime_secs, 60);
        assert_eq!(config.check.lock_timeout_secs, 3);
        assert!(config.check.scantime_secs.is_none());
        assert_eq!(config.check.logformat, FORMAT_SYSLOG);
    }

    #[test]
    fn default_config_passes_validation() {
        ProbeConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = ProbeConfig::parse("").unwrap();
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.check.encoding, "utf-8");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[check]
patterns = ["ERROR", "FATAL"]
trace_inode = true
scantime_secs = 86400
"#;
        let config = ProbeConfig::parse(toml).unwrap();
        assert_eq!(config.check.patterns, vec!["ERROR", "FATAL"]);
        assert!(config.check.trace_inode);
        assert_eq!(config.check.scantime_secs, Some(86400));
        // 나머지는 기본값 유지
        assert_eq!(config.check.warning, 1);
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = ProbeConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = ProbeConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = ProbeConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_tag_with_separator() {
        let mut config = ProbeConfig::default();
        config.check.seekfile_tag = "app.1".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("seekfile_tag"));

        config.check.seekfile_tag = "../etc".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_logformat() {
        let mut config = ProbeConfig::default();
        config.check.logformat = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn tag_accessor_treats_empty_as_none() {
        let mut check = CheckConfig::default();
        assert_eq!(check.tag(), None);
        check.seekfile_tag = "web".to_owned();
        assert_eq!(check.tag(), Some("web"));
    }

    #[test]
    fn load_missing_file_reports_not_found() {
        let err = ProbeConfig::load("/nonexistent/logprobe.toml").unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 환경변수 조작을 직렬화합니다.
        unsafe { std::env::set_var("TEST_LOGPROBE_STR", "overridden") };
        override_string(&mut val, "TEST_LOGPROBE_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LOGPROBE_STR") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: serial 테스트로 환경변수 조작을 직렬화합니다.
        unsafe { std::env::set_var("TEST_LOGPROBE_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_LOGPROBE_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_LOGPROBE_BOOL_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_optional_u64() {
        let mut val = None;
        // SAFETY: serial 테스트로 환경변수 조작을 직렬화합니다.
        unsafe { std::env::set_var("TEST_LOGPROBE_OPT_U64", "120") };
        override_opt_u64(&mut val, "TEST_LOGPROBE_OPT_U64");
        assert_eq!(val, Some(120));
        unsafe { std::env::remove_var("TEST_LOGPROBE_OPT_U64") };
    }

    #[test]
    #[serial]
    fn env_override_csv_skips_blank_items() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: serial 테스트로 환경변수 조작을 직렬화합니다.
        unsafe { std::env::set_var("TEST_LOGPROBE_CSV", "ERROR, ,FATAL ") };
        override_csv(&mut val, "TEST_LOGPROBE_CSV");
        assert_eq!(val, vec!["ERROR", "FATAL"]);
        unsafe { std::env::remove_var("TEST_LOGPROBE_CSV") };
    }

    #[test]
    #[serial]
    fn env_override_missing_var_keeps_original() {
        let mut val = 7;
        override_u64(&mut val, "TEST_LOGPROBE_DEFINITELY_UNSET");
        assert_eq!(val, 7);
    }
}
