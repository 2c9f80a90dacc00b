//! 다중 라인 블록 누적기
//!
//! 한 파일의 한 번의 스캔 안에서 같은 헤더(prefix)를 가진 연속 라인을
//! 하나의 블록으로 묶습니다. 헤더가 없는 라인(형식 불일치)은 진행 중인
//! 블록의 연속 라인으로 취급됩니다.
//!
//! 상태는 두 가지뿐입니다: 대기(`current == None`)와 누적 중.
//! 헤더가 바뀌면 누적 중이던 블록이 방출되고 새 블록이 시작되며,
//! 스캔이 끝나면 [`BlockAccumulator::finish`]로 마지막 블록을 방출합니다.

/// 누적된 라인 블록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    prefix: String,
    bodies: Vec<String>,
}

impl Block {
    fn start(prefix: &str, body: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            bodies: vec![body.to_owned()],
        }
    }

    /// 블록 첫 라인의 헤더
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 블록에 포함된 라인 수
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// 라인이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// 매칭 대상 텍스트: 본문들을 공백 하나로 이은 문자열
    pub fn text(&self) -> String {
        self.bodies.join(" ")
    }

    /// 보고용 텍스트: 첫 라인의 헤더, 공백, 이어 붙인 본문
    pub fn display(&self) -> String {
        let text = self.text();
        if self.prefix.is_empty() {
            text
        } else {
            format!("{} {}", self.prefix.trim_end(), text)
        }
    }
}

/// 블록 누적 상태 기계
#[derive(Debug, Default)]
pub struct BlockAccumulator {
    current: Option<Block>,
}

impl BlockAccumulator {
    /// 대기 상태의 누적기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 라인을 추가합니다.
    ///
    /// 헤더가 바뀌어 이전 블록이 닫히면 그 블록을 반환합니다.
    pub fn push(&mut self, prefix: &str, body: &str) -> Option<Block> {
        match self.current.as_mut() {
            Some(block) if prefix.is_empty() || block.prefix == prefix => {
                block.bodies.push(body.to_owned());
                None
            }
            Some(_) => self.current.replace(Block::start(prefix, body)),
            None => {
                self.current = Some(Block::start(prefix, body));
                None
            }
        }
    }

    /// 누적 중인 블록을 방출하고 대기 상태로 돌아갑니다.
    pub fn finish(&mut self) -> Option<Block> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &str = "Dec  5 12:34:56 hostname test: ";

    #[test]
    fn same_prefix_lines_form_one_block() {
        let mut acc = BlockAccumulator::new();
        assert!(acc.push(HEAD, "ERROR1").is_none());
        assert!(acc.push(HEAD, "ERROR2").is_none());
        let block = acc.finish().unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.text(), "ERROR1 ERROR2");
        assert_eq!(
            block.display(),
            "Dec  5 12:34:56 hostname test: ERROR1 ERROR2"
        );
    }

    #[test]
    fn prefix_change_flushes_previous_block() {
        let mut acc = BlockAccumulator::new();
        acc.push("Dec  5 12:34:56 hostname noop: ", "NOOP");
        let flushed = acc.push(HEAD, "ERROR1").unwrap();
        assert_eq!(flushed.text(), "NOOP");
        assert_eq!(acc.finish().unwrap().text(), "ERROR1");
    }

    #[test]
    fn unprefixed_lines_continue_the_block() {
        let mut acc = BlockAccumulator::new();
        acc.push(HEAD, "java.lang.Exception");
        acc.push("", "    at Foo.bar");
        let block = acc.finish().unwrap();
        assert_eq!(block.text(), "java.lang.Exception     at Foo.bar");
    }

    #[test]
    fn unprefixed_first_line_starts_a_bare_block() {
        let mut acc = BlockAccumulator::new();
        acc.push("", "raw line");
        let block = acc.finish().unwrap();
        assert_eq!(block.prefix(), "");
        assert_eq!(block.display(), "raw line");
    }

    #[test]
    fn finish_resets_to_idle() {
        let mut acc = BlockAccumulator::new();
        acc.push(HEAD, "x");
        assert!(acc.finish().is_some());
        assert!(acc.finish().is_none());
    }
}
