use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::knowledge::ExerciseId;
use crate::pose::{JointAngles, PoseSnapshot};

/// レップ判定の最小間隔
pub const DEFAULT_REP_DEBOUNCE: Duration = Duration::from_millis(1000);

/// レップ中の大まかな段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPhase {
    Setup,
    Execution,
    Completion,
    Rest,
}

impl MovementPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementPhase::Setup => "setup",
            MovementPhase::Execution => "execution",
            MovementPhase::Completion => "completion",
            MovementPhase::Rest => "rest",
        }
    }
}

impl std::fmt::Display for MovementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// 現在の角度からフェーズを判定（ルールのない種目は常に`Execution`）
pub fn classify_phase(angles: &JointAngles, exercise_id: &str) -> MovementPhase {
    ExerciseId::from_id(exercise_id)
        .and_then(|id| id.knowledge().phase_rule)
        .map_or(MovementPhase::Execution, |rule| rule(angles))
}

/// 関節角度からレップ完了を検出
///
/// 完了ルールは種目ごと。ルールのない種目はカウントしない。
/// カウント後はデバウンス期間が過ぎるまで次をカウントしない。
pub struct RepDetector {
    debounce: Duration,
    last_rep: Option<Instant>,
}

impl RepDetector {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_rep: None,
        }
    }

    /// レップ完了なら1、それ以外は0
    pub fn detect_rep(&mut self, snapshot: &PoseSnapshot, exercise_id: &str) -> u32 {
        self.detect_rep_at(snapshot, exercise_id, Instant::now())
    }

    /// 指定時刻でレップ判定
    pub fn detect_rep_at(&mut self, snapshot: &PoseSnapshot, exercise_id: &str, now: Instant) -> u32 {
        if let Some(last) = self.last_rep {
            if now.saturating_duration_since(last) < self.debounce {
                return 0;
            }
        }

        let Some(rule) = ExerciseId::from_id(exercise_id).and_then(|id| id.knowledge().rep_rule) else {
            return 0;
        };

        if rule(&snapshot.angles) {
            debug!(exercise = exercise_id, "rep detected");
            self.last_rep = Some(now);
            1
        } else {
            0
        }
    }

    /// 直前のレップ時刻をクリア（セット間など）
    pub fn reset(&mut self) {
        self.last_rep = None;
    }
}

impl Default for RepDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REP_DEBOUNCE)
    }
}
