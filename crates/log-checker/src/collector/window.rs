//! 스캔 윈도우 필터
//!
//! 마지막 수정 후 `scantime`보다 오래된 파일은 읽지도, 오프셋을 갱신하지도 않습니다.

use std::time::{Duration, SystemTime};

/// 파일 수정 시각 기반 스캔 대상 필터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanWindow {
    scantime: Option<Duration>,
}

impl ScanWindow {
    /// `None`이면 모든 파일을 허용합니다.
    pub fn new(scantime: Option<Duration>) -> Self {
        Self { scantime }
    }

    /// 파일을 스캔해야 하는지 판정합니다.
    ///
    /// 수정 시각이 현재보다 미래(시계 오차)인 파일은 나이 0으로 취급합니다.
    pub fn admits(&self, modified: SystemTime, now: SystemTime) -> bool {
        match self.scantime {
            None => true,
            Some(limit) => {
                let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
                age <= limit
            }
        }
    }
}
