//! 판정 누적기
//!
//! 한 번의 검사 동안 파일별 매칭 결과를 모아 최종 상태와 메시지를 만듭니다.
//!
//! # 메시지 형식
//! ```text
//! OK - No matches found.
//! OK - Found <n> lines (limit=<w>/<c>): <hits>
//! WARNING: Found <n> lines (limit=<w>/<c>): <hits>
//! CRITICAL: Found <n> lines (limit=<w>/<c>): <hits>
//! CRITICAL: Critical Found <n> lines: <critical hits>
//! <STATE>: The log files have not been updated.
//! ```
//! 각 hit은 `"<text> at <path>"`이며 `,`로 이어집니다.
//! `|` 치환은 매칭 텍스트에만 적용되고 경로는 그대로 둡니다.

use std::path::Path;

use logprobe_core::State;

use crate::rule::Tier;

/// 보고 텍스트의 `|` 대체 문자열
///
/// 모니터링 플러그인 출력에서 `|`는 성능 데이터 구분자이므로 쓸 수 없습니다.
pub const PIPE_PLACEHOLDER: &str = "(pipe)";

/// 판정 정책 (임계치와 무변경 경보)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictPolicy {
    /// WARNING 임계 매칭 수
    pub warning: u64,
    /// CRITICAL 임계 매칭 수
    pub critical: u64,
    /// 새 내용이 없으면 WARNING
    pub nodiff_warn: bool,
    /// 새 내용이 없으면 CRITICAL
    pub nodiff_crit: bool,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            warning: 1,
            critical: 0,
            nodiff_warn: false,
            nodiff_crit: false,
        }
    }
}

/// 판정 누적기
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    warning_hits: Vec<String>,
    critical_hits: Vec<String>,
    bytes_read: u64,
    fixed: Option<(State, String)>,
}

impl Verdict {
    /// 매칭을 기록합니다.
    pub fn record_hit(&mut self, tier: Tier, text: &str, path: &Path) {
        let hit = format!(
            "{} at {}",
            text.replace('|', PIPE_PLACEHOLDER),
            path.display()
        );
        match tier {
            Tier::Warning => self.warning_hits.push(hit),
            Tier::Critical => self.critical_hits.push(hit),
        }
    }

    /// 이번 검사에서 새로 읽은 바이트 수를 더합니다.
    pub fn add_bytes_read(&mut self, bytes: u64) {
        self.bytes_read += bytes;
    }

    /// 스캔 없이 결정된 판정(캐시, 락 타임아웃)을 설정합니다.
    pub fn set_fixed(&mut self, state: State, message: impl Into<String>) {
        self.fixed = Some((state, message.into()));
    }

    /// 누적 상태를 비웁니다.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 최종 상태
    pub fn state(&self, policy: &VerdictPolicy) -> State {
        self.evaluate(policy).0
    }

    /// 최종 메시지
    pub fn message(&self, policy: &VerdictPolicy) -> String {
        self.evaluate(policy).1
    }

    fn evaluate(&self, policy: &VerdictPolicy) -> (State, String) {
        if let Some((state, message)) = &self.fixed {
            return (*state, message.clone());
        }

        if !self.critical_hits.is_empty() {
            return (
                State::Critical,
                format!(
                    "CRITICAL: Critical Found {} lines: {}",
                    self.critical_hits.len(),
                    self.critical_hits.join(",")
                ),
            );
        }

        let found = self.warning_hits.len() as u64;
        if found > 0 {
            let state = if policy.critical > 0 && found >= policy.critical {
                State::Critical
            } else if found >= policy.warning {
                State::Warning
            } else {
                State::Ok
            };
            let lead = match state {
                State::Ok => "OK -".to_owned(),
                other => format!("{other}:"),
            };
            return (
                state,
                format!(
                    "{lead} Found {found} lines (limit={}/{}): {}",
                    policy.warning,
                    policy.critical,
                    self.warning_hits.join(",")
                ),
            );
        }

        if self.bytes_read == 0 {
            let stale = if policy.nodiff_crit {
                Some(State::Critical)
            } else if policy.nodiff_warn {
                Some(State::Warning)
            } else {
                None
            };
            if let Some(state) = stale {
                return (state, format!("{state}: The log files have not been updated."));
            }
        }

        (State::Ok, "OK - No matches found.".to_owned())
    }
}
