//! 검사 엔진 에러 타입
//!
//! [`CheckerError`]는 검사 엔진 내부에서 발생하는 에러를 표현합니다.
//! `From<CheckerError> for ProbeError` 변환이 구현되어 있어
//! CLI 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 설정 시점 에러(형식 템플릿, 정규식, 인코딩)는 치명적이며,
//! 검사 도중의 이상 상황(손상된 오프셋 레코드, 디코딩 불가 라인,
//! 사라진 파일)은 에러가 아니라 "매칭 없음"으로 처리됩니다.

use logprobe_core::error::{ConfigError, ProbeError};

/// 검사 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// 설정 값 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 라인 형식 템플릿 에러 (알 수 없는 플레이스홀더, 캡처 그룹 부족)
    #[error("format error: '{template}': {reason}")]
    Format {
        /// 문제가 된 템플릿
        template: String,
        /// 에러 사유
        reason: String,
    },

    /// 패턴 정규식 컴파일 실패
    #[error("pattern error in {list}: {reason}")]
    Pattern {
        /// 패턴 목록 이름 (pattern, critical-pattern 등)
        list: String,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// glob 패턴 파싱 실패
    #[error("glob error: '{pattern}': {reason}")]
    Glob {
        /// 문제가 된 glob 패턴
        pattern: String,
        /// 에러 사유
        reason: String,
    },

    /// 알 수 없는 인코딩 레이블
    #[error("unknown encoding: {0}")]
    Encoding(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CheckerError> for ProbeError {
    fn from(err: CheckerError) -> Self {
        match err {
            CheckerError::Config { field, reason } => {
                ProbeError::Config(ConfigError::InvalidValue { field, reason })
            }
            CheckerError::Io(e) => ProbeError::Io(e),
            other => ProbeError::Check(other.to_string()),
        }
    }
}
