//! 도메인 타입 — 워크스페이스 전역에서 사용되는 공통 타입
//!
//! 검사 결과를 표현하는 [`State`]를 정의합니다.
//! 엔진(`logprobe-checker`)과 CLI가 같은 상태 표현을 공유합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 검사 결과 상태
///
/// `Ok < Warning < Critical` 순서로 심각도가 증가합니다.
/// `Unknown`은 감시 대상의 상태가 아니라 검사 자체의 운영 실패
/// (예: 락 획득 타임아웃)를 나타냅니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    /// 매칭 없음
    #[default]
    Ok,
    /// 경고 수준 매칭
    Warning,
    /// 치명적 매칭
    Critical,
    /// 검사 실패
    Unknown,
}

impl State {
    /// 모니터링 플러그인 규약의 종료 코드를 반환합니다.
    ///
    /// OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
