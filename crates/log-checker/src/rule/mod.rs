//! 패턴 규칙 -- 등급별 매칭과 다중 라인 블록
//!
//! - [`types`]: 규칙 집합과 매칭 등급
//! - [`matcher`]: 정규식 집합 기반 분류기
//! - [`multiline`]: 연속 라인 블록 누적 상태 기계

pub mod matcher;
pub mod multiline;
pub mod types;

pub use matcher::PatternMatcher;
pub use multiline::{Block, BlockAccumulator};
pub use types::{RuleSet, Tier};
