//! 시간 소스 추상화
//!
//! 스캔 윈도우, 레코드 만료, 캐시 유효 시간은 모두 "현재 시각"에 의존합니다.
//! [`Clock`] trait으로 주입하여 테스트에서 sleep 없이 시간 경과를 재현합니다.

use std::time::{Duration, SystemTime};

/// 현재 시각 공급자
pub trait Clock: Send + Sync {
    /// 현재 벽시계 시각을 반환합니다.
    fn now(&self) -> SystemTime;
}

/// 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// 시스템 시계에 고정된 간격을 더한 시계
///
/// 파일 mtime은 실제 시각으로 기록되므로, 시계를 앞으로 당겨
/// "그 시간이 지난 뒤의 실행"을 재현할 때 사용합니다.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedClock {
    shift: Duration,
}

impl ShiftedClock {
    /// `shift`만큼 미래를 가리키는 시계를 생성합니다.
    pub fn ahead(shift: Duration) -> Self {
        Self { shift }
    }
}

impl Clock for ShiftedClock {
    fn now(&self) -> SystemTime {
        SystemTime::now() + self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_clock_runs_ahead() {
        let shifted = ShiftedClock::ahead(Duration::from_secs(3600));
        let gap = shifted
            .now()
            .duration_since(SystemClock.now())
            .unwrap();
        assert!(gap >= Duration::from_secs(3590));
    }
}
