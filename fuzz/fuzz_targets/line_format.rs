#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logprobe_checker::LineFormat;
use logprobe_core::FORMAT_SYSLOG;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 사용자 정의 템플릿 (없으면 syslog 템플릿)
    template: Option<String>,
    line: String,
}

fuzz_target!(|input: FuzzInput| {
    let template = input.template.as_deref().unwrap_or(FORMAT_SYSLOG);

    // 잘못된 템플릿은 에러로 끝나야 함
    let Ok(format) = LineFormat::new(template) else {
        return;
    };

    let parts = format.split(&input.line);
    assert!(input.line.contains(parts.body));
    let _ = parts.display();
});
