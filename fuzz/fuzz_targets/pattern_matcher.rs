#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logprobe_checker::rule::BlockAccumulator;
use logprobe_checker::{PatternMatcher, RuleSet};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    patterns: Vec<String>,
    critical_patterns: Vec<String>,
    negpatterns: Vec<String>,
    critical_negpatterns: Vec<String>,
    case_insensitive: bool,
    /// (헤더, 본문) 라인 목록
    lines: Vec<(String, String)>,
}

fn limit(list: Vec<String>) -> Vec<String> {
    list.into_iter().take(4).collect()
}

fuzz_target!(|input: FuzzInput| {
    let rules = RuleSet {
        patterns: limit(input.patterns),
        critical_patterns: limit(input.critical_patterns),
        negpatterns: limit(input.negpatterns),
        critical_negpatterns: limit(input.critical_negpatterns),
        case_insensitive: input.case_insensitive,
        multiline: true,
    };

    // 컴파일 실패는 크래시가 아님
    let Ok(matcher) = PatternMatcher::new(&rules) else {
        return;
    };

    let mut blocks = BlockAccumulator::new();
    for (prefix, body) in input.lines.iter().take(64) {
        let _ = matcher.classify(body);
        if let Some(block) = blocks.push(prefix, body) {
            let _ = matcher.classify(&block.text());
        }
    }
    if let Some(block) = blocks.finish() {
        let _ = matcher.classify(&block.text());
    }
});
