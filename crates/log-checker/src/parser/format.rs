//! 라인 형식 템플릿
//!
//! 템플릿은 strftime 스타일 플레이스홀더(`%b`, `%e`, `%T` 등)를 포함한 정규식이며,
//! 두 개의 캡처 그룹(헤더, 본문)을 가져야 합니다. 플레이스홀더는 실행마다
//! 한 번 정규식 조각으로 치환된 뒤 컴파일됩니다.
//!
//! # 예시
//! ```
//! use logprobe_checker::parser::LineFormat;
//!
//! let format = LineFormat::new(r"^(\[%a %b %d %T %Y\] \[\S+\]) (.*)$").unwrap();
//! let parts = format.split("[Thu Dec 05 12:34:56 2013] [error] ERROR");
//! assert_eq!(parts.prefix, "[Thu Dec 05 12:34:56 2013] [error]");
//! assert_eq!(parts.body, "ERROR");
//! ```

use regex::Regex;

use super::LineParts;
use crate::error::CheckerError;

const WEEKDAY_ABBR: &str = "(?:Sun|Mon|Tue|Wed|Thu|Fri|Sat)";
const WEEKDAY_FULL: &str = "(?:Sunday|Monday|Tuesday|Wednesday|Thursday|Friday|Saturday)";
const MONTH_ABBR: &str = "(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";
const MONTH_FULL: &str =
    "(?:January|February|March|April|May|June|July|August|September|October|November|December)";
const DAY: &str = "(?:0[1-9]|[12][0-9]|3[01])";
const DAY_SPACE_PADDED: &str = "(?:3[01]|[ 12]?[0-9])";
const HOUR: &str = "(?:[01][0-9]|2[0-3])";
const HOUR_12: &str = "(?:0[1-9]|1[0-2])";
const MINUTE: &str = "[0-5][0-9]";
const SECOND: &str = "(?:[0-5][0-9]|60)";
const MONTH: &str = "(?:0[1-9]|1[0-2])";

/// 컴파일된 라인 형식
#[derive(Debug, Clone)]
pub struct LineFormat {
    regex: Regex,
}

impl LineFormat {
    /// 템플릿을 치환하고 컴파일합니다.
    ///
    /// 알 수 없는 플레이스홀더, 정규식 문법 오류, 캡처 그룹 부족은
    /// 모두 [`CheckerError::Format`]으로 보고됩니다.
    pub fn new(template: &str) -> Result<Self, CheckerError> {
        let translated = Self::translate(template)?;
        let regex = Regex::new(&translated).map_err(|e| CheckerError::Format {
            template: template.to_owned(),
            reason: e.to_string(),
        })?;

        // captures_len()은 전체 매칭(0번 그룹)을 포함
        if regex.captures_len() < 3 {
            return Err(CheckerError::Format {
                template: template.to_owned(),
                reason: "template needs two capture groups (prefix, body)".to_owned(),
            });
        }

        Ok(Self { regex })
    }

    /// strftime 플레이스홀더를 정규식 조각으로 치환합니다.
    ///
    /// 역슬래시 이스케이프는 그대로 복사되므로 `\%`는 리터럴 `%`로 남습니다.
    pub fn translate(template: &str) -> Result<String, CheckerError> {
        let mut out = String::with_capacity(template.len() * 2);
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '%' => {
                    let Some(spec) = chars.next() else {
                        return Err(CheckerError::Format {
                            template: template.to_owned(),
                            reason: "dangling '%' at end of template".to_owned(),
                        });
                    };
                    out.push_str(&placeholder(template, spec)?);
                }
                _ => out.push(c),
            }
        }

        Ok(out)
    }

    /// 라인을 헤더와 본문으로 나눕니다.
    ///
    /// 형식에 맞지 않는 라인은 헤더가 비고 라인 전체가 본문이 됩니다.
    pub fn split<'a>(&self, line: &'a str) -> LineParts<'a> {
        self.regex
            .captures(line)
            .and_then(|caps| {
                let prefix = caps.get(1)?.as_str();
                let body = caps.get(2)?.as_str();
                Some(LineParts { prefix, body })
            })
            .unwrap_or(LineParts {
                prefix: "",
                body: line,
            })
    }
}

fn placeholder(template: &str, spec: char) -> Result<String, CheckerError> {
    let fragment = match spec {
        'a' => WEEKDAY_ABBR.to_owned(),
        'A' => WEEKDAY_FULL.to_owned(),
        'b' | 'h' => MONTH_ABBR.to_owned(),
        'B' => MONTH_FULL.to_owned(),
        'd' => DAY.to_owned(),
        'e' => DAY_SPACE_PADDED.to_owned(),
        'H' => HOUR.to_owned(),
        'I' => HOUR_12.to_owned(),
        'M' => MINUTE.to_owned(),
        'S' => SECOND.to_owned(),
        'm' => MONTH.to_owned(),
        'y' => "[0-9]{2}".to_owned(),
        'Y' => "[0-9]{4}".to_owned(),
        'j' => "[0-9]{3}".to_owned(),
        'p' => "(?:AM|PM)".to_owned(),
        'z' => "[+-][0-9]{4}".to_owned(),
        'Z' => "[A-Za-z]{1,5}".to_owned(),
        's' => "[0-9]+".to_owned(),
        'T' => format!("{HOUR}:{MINUTE}:{SECOND}"),
        'R' => format!("{HOUR}:{MINUTE}"),
        'F' => format!("[0-9]{{4}}-{MONTH}-{DAY}"),
        'D' => format!("{MONTH}/{DAY}/[0-9]{{2}}"),
        '%' => "%".to_owned(),
        other => {
            return Err(CheckerError::Format {
                template: template.to_owned(),
                reason: format!("unknown placeholder '%{other}'"),
            });
        }
    };
    Ok(fragment)
}
