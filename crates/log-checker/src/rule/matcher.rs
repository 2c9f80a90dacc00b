//! 패턴 매칭 로직 -- 등급별 정규식 집합 평가
//!
//! [`PatternMatcher`]는 [`RuleSet`]의 네 목록을 각각 하나의 [`RegexSet`]으로
//! 미리 컴파일합니다. 매칭 시 재컴파일 오버헤드가 없으며, 잘못된 정규식은
//! 생성 시점(설정 시점)에 에러로 보고됩니다.

use regex::{RegexSet, RegexSetBuilder};

use super::types::{RuleSet, Tier};
use crate::error::CheckerError;

/// 패턴 매처
///
/// 평가 순서:
/// 1. `critical_negpatterns`에 매칭되면 라인 전체가 제외됩니다.
/// 2. `critical_patterns`에 매칭되면 CRITICAL입니다 (WARNING 평가 생략).
/// 3. `patterns`에 매칭되고 `negpatterns`에 매칭되지 않으면 WARNING입니다.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    warning: RegexSet,
    critical: RegexSet,
    negative: RegexSet,
    critical_negative: RegexSet,
}

impl PatternMatcher {
    /// 규칙 집합을 컴파일합니다.
    pub fn new(rules: &RuleSet) -> Result<Self, CheckerError> {
        let ci = rules.case_insensitive;
        Ok(Self {
            warning: compile("pattern", &rules.patterns, ci)?,
            critical: compile("critical-pattern", &rules.critical_patterns, ci)?,
            negative: compile("negpattern", &rules.negpatterns, ci)?,
            critical_negative: compile("critical-negpattern", &rules.critical_negpatterns, ci)?,
        })
    }

    /// 텍스트를 분류합니다. 매칭되지 않으면 `None`을 반환합니다.
    ///
    /// 다중 라인 모드에서는 블록 전체를 공백으로 이은 텍스트가 전달되므로
    /// 제외 패턴이 블록 어디에 있든 블록 전체가 억제됩니다.
    pub fn classify(&self, text: &str) -> Option<Tier> {
        if self.critical_negative.is_match(text) {
            return None;
        }
        if self.critical.is_match(text) {
            return Some(Tier::Critical);
        }
        if self.warning.is_match(text) && !self.negative.is_match(text) {
            return Some(Tier::Warning);
        }
        None
    }
}

fn compile(list: &str, patterns: &[String], case_insensitive: bool) -> Result<RegexSet, CheckerError> {
    RegexSetBuilder::new(patterns)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| CheckerError::Pattern {
            list: list.to_owned(),
            reason: e.to_string(),
        })
}
