//! 원시 바이트 라인 디코더
//!
//! 로그 파일은 바이트 단위로 읽히고, 라인 구분은 `\n` 바이트로 합니다.
//! 따라서 ASCII 호환 인코딩(UTF-8, EUC-JP, Shift_JIS, ISO-8859-x 등)만 허용합니다.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::CheckerError;

/// 인코딩별 라인 디코더
#[derive(Debug, Clone, Copy)]
pub struct LineDecoder {
    encoding: &'static Encoding,
}

impl LineDecoder {
    /// 인코딩 레이블(WHATWG 레이블, 대소문자 무시)로 디코더를 생성합니다.
    pub fn new(label: &str) -> Result<Self, CheckerError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| CheckerError::Encoding(label.to_owned()))?;

        if !encoding.is_ascii_compatible() {
            return Err(CheckerError::Encoding(format!(
                "{label} (line splitting requires an ASCII-compatible encoding)"
            )));
        }

        Ok(Self { encoding })
    }

    /// 정규화된 인코딩 이름
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// 한 라인을 디코딩합니다.
    ///
    /// 잘못된 바이트 시퀀스가 있으면 `None`을 반환하며, 그 라인은 매칭되지 않습니다.
    pub fn decode<'a>(&self, raw: &'a [u8]) -> Option<Cow<'a, str>> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(raw)
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}
