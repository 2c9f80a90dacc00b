//! 규칙 데이터 타입
//!
//! 한 번의 실행 동안 불변인 [`RuleSet`]과 매칭 결과 등급 [`Tier`]를 정의합니다.

use serde::{Deserialize, Serialize};

/// 패턴 규칙 집합
///
/// 각 목록은 정규식의 OR 결합으로 평가됩니다.
/// CRITICAL 등급은 WARNING 등급과 독립적으로 평가되며,
/// `critical_negpatterns`에 매칭된 라인은 어느 등급으로도 보고되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// WARNING 패턴
    pub patterns: Vec<String>,
    /// CRITICAL 패턴
    pub critical_patterns: Vec<String>,
    /// WARNING 제외 패턴
    pub negpatterns: Vec<String>,
    /// 라인 전체 제외 패턴 (두 등급 모두 억제)
    pub critical_negpatterns: Vec<String>,
    /// 대소문자 무시 (두 등급 모두에 적용)
    pub case_insensitive: bool,
    /// 연속 라인을 블록으로 묶어 매칭
    pub multiline: bool,
}

impl RuleSet {
    /// 양성 패턴이 하나도 없는지 확인합니다.
    ///
    /// 이 경우 어떤 라인도 매칭되지 않습니다.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.critical_patterns.is_empty()
    }
}

/// 매칭 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// 경고 등급
    Warning,
    /// 치명 등급
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_set_is_empty() {
        assert!(RuleSet::default().is_empty());
    }

    #[test]
    fn negpatterns_alone_do_not_make_rules() {
        let rules = RuleSet {
            negpatterns: vec!["IGNORE".to_owned()],
            ..Default::default()
        };
        assert!(rules.is_empty());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let rules: RuleSet = serde_json::from_str(r#"{"patterns":["ERROR"]}"#).unwrap();
        assert_eq!(rules.patterns, vec!["ERROR"]);
        assert!(!rules.multiline);
    }
}
