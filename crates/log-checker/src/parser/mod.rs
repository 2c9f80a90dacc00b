//! 라인 해석 -- 바이트 디코딩과 헤더/본문 분리
//!
//! - [`LineDecoder`]: 설정된 인코딩으로 원시 라인을 문자열로 변환
//! - [`LineFormat`]: strftime 플레이스홀더 템플릿으로 헤더와 본문을 분리

pub mod decoder;
pub mod format;

pub use decoder::LineDecoder;
pub use format::LineFormat;

/// 헤더와 본문으로 나뉜 라인
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParts<'a> {
    /// 형식 템플릿 첫 번째 그룹 (형식 불일치 시 빈 문자열)
    pub prefix: &'a str,
    /// 형식 템플릿 두 번째 그룹 (패턴 매칭 대상)
    pub body: &'a str,
}

impl LineParts<'_> {
    /// 보고용 텍스트: `헤더 본문`, 헤더가 없으면 본문만
    pub fn display(&self) -> String {
        if self.prefix.is_empty() {
            self.body.to_owned()
        } else {
            format!("{} {}", self.prefix.trim_end(), self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_trimmed_prefix_and_body() {
        let parts = LineParts {
            prefix: "Dec  5 12:34:56 hostname test: ",
            body: "ERROR",
        };
        assert_eq!(parts.display(), "Dec  5 12:34:56 hostname test: ERROR");
    }

    #[test]
    fn display_without_prefix_is_body() {
        let parts = LineParts {
            prefix: "",
            body: "bare ERROR",
        };
        assert_eq!(parts.display(), "bare ERROR");
    }
}
