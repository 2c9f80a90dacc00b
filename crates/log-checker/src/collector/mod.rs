//! 로그 파일 수집 -- 대상 해석, 시간 윈도우, 증분 읽기
//!
//! - [`FileResolver`]: 리터럴 경로와 glob 패턴을 파일 목록으로 해석
//! - [`ScanWindow`]: 오래 갱신되지 않은 파일 제외
//! - [`TailReader`]: 저장된 오프셋부터 라인 단위로 읽기

pub mod file;
pub mod resolver;
pub mod window;

pub use file::{FileMeta, TailReader};
pub use resolver::FileResolver;
pub use window::ScanWindow;
