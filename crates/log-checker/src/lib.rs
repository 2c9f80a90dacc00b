#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`collector`]: 파일 목록 해석, 스캔 윈도우, 오프셋 기반 증분 읽기
//! - [`parser`]: 인코딩 디코딩, strftime 템플릿 기반 헤더/본문 분리
//! - [`rule`]: 등급별 패턴 매칭, 다중 라인 블록 누적
//! - [`state`]: 오프셋 레코드, 결과 캐시, advisory lock
//! - [`verdict`]: 판정 상태/메시지 누적
//! - [`checker`]: 전체 검사 오케스트레이션
//! - [`config`]: 엔진 설정 (core 설정에서 파생)
//! - [`clock`]: 시간 소스 추상화
//! - [`error`]: 도메인 에러 타입

pub mod checker;
pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod parser;
pub mod rule;
pub mod state;
pub mod verdict;

// --- 주요 타입 re-export ---

// 검사기
pub use checker::{LOCK_TIMEOUT_MESSAGE, LogChecker};

// 설정
pub use config::{CheckerConfig, CheckerConfigBuilder};

// 에러
pub use error::CheckerError;

// 시간
pub use clock::{Clock, SystemClock};

// 규칙
pub use rule::{PatternMatcher, RuleSet, Tier};

// 파서
pub use parser::{LineDecoder, LineFormat, LineParts};

// 판정
pub use verdict::{PIPE_PLACEHOLDER, Verdict, VerdictPolicy};
