//! ワークアウト記録と履歴統計

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::knowledge::ExerciseId;

/// 未知の種目の表示名
pub const UNKNOWN_EXERCISE: &str = "Unknown Exercise";

/// Unixエポックからのミリ秒
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// 種目IDの表示名
pub fn display_name(exercise_id: &str) -> &'static str {
    ExerciseId::from_id(exercise_id).map_or(UNKNOWN_EXERCISE, |id| id.display_name())
}

/// 履歴に保存される完了済みワークアウト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    /// 開始時刻（Unixミリ秒）
    pub date: u64,
    /// 所要時間（秒）
    pub duration: u64,
    /// 完了セット数
    pub sets: u32,
    /// 合計レップ数
    pub total_reps: u32,
    /// 平均フォームスコア
    pub average_form_score: f32,
}

/// 記録中のワークアウトを集計
pub struct WorkoutRecorder {
    exercise_id: String,
    exercise_name: &'static str,
    started_at: Instant,
    started_epoch_ms: u64,
    sets: u32,
    total_reps: u32,
    set_reps: u32,
    score_sum: f64,
    score_count: u32,
}

impl WorkoutRecorder {
    /// 記録開始
    pub fn start(exercise_id: &str) -> Self {
        Self::start_at(exercise_id, Instant::now())
    }

    pub fn start_at(exercise_id: &str, now: Instant) -> Self {
        let exercise_name = display_name(exercise_id);
        info!(exercise = exercise_id, name = exercise_name, "workout started");
        Self {
            exercise_id: exercise_id.to_string(),
            exercise_name,
            started_at: now,
            started_epoch_ms: epoch_millis(),
            sets: 0,
            total_reps: 0,
            set_reps: 0,
            score_sum: 0.0,
            score_count: 0,
        }
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    pub fn exercise_name(&self) -> &'static str {
        self.exercise_name
    }

    /// ティックごとのスコアを平均に加える
    pub fn record_score(&mut self, score: f32) {
        self.score_sum += score as f64;
        self.score_count += 1;
    }

    /// 進行中セットにレップを加算
    pub fn add_reps(&mut self, reps: u32) {
        self.set_reps += reps;
    }

    /// 進行中セットのレップ数
    pub fn set_reps(&self) -> u32 {
        self.set_reps
    }

    /// 確定済みレップ + 進行中セット
    pub fn total_reps(&self) -> u32 {
        self.total_reps + self.set_reps
    }

    /// 完了セット数
    pub fn sets(&self) -> u32 {
        self.sets
    }

    /// スコアの移動平均（記録前は0）
    pub fn average_score(&self) -> f32 {
        if self.score_count == 0 {
            return 0.0;
        }
        (self.score_sum / self.score_count as f64) as f32
    }

    /// 現在のセットを確定（0レップのセットは数えない）
    pub fn finish_set(&mut self) -> u32 {
        let reps = self.set_reps;
        if reps > 0 {
            self.sets += 1;
            self.total_reps += reps;
            self.set_reps = 0;
            info!(set = self.sets, reps, average = self.average_score(), "set finished");
        }
        reps
    }

    pub fn finish(self) -> WorkoutSession {
        self.finish_at(Instant::now())
    }

    /// ワークアウトを終了。未確定のレップは最終セットとして確定
    pub fn finish_at(mut self, now: Instant) -> WorkoutSession {
        self.finish_set();
        let duration = now.saturating_duration_since(self.started_at).as_secs();
        let session = WorkoutSession {
            id: self.started_epoch_ms.to_string(),
            exercise_id: self.exercise_id.clone(),
            exercise_name: self.exercise_name.to_string(),
            date: self.started_epoch_ms,
            duration,
            sets: self.sets,
            total_reps: self.total_reps,
            average_form_score: self.average_score(),
        };
        info!(
            exercise = %session.exercise_id,
            sets = session.sets,
            reps = session.total_reps,
            duration,
            "workout finished"
        );
        session
    }
}

/// 履歴の集計（新しい順）
pub struct WorkoutStats<'a> {
    sessions: &'a [WorkoutSession],
}

impl<'a> WorkoutStats<'a> {
    pub fn new(sessions: &'a [WorkoutSession]) -> Self {
        Self { sessions }
    }

    pub fn total_workouts(&self) -> usize {
        self.sessions.len()
    }

    /// 平均フォームスコア（四捨五入、履歴なしは0）
    pub fn average_score(&self) -> u32 {
        if self.sessions.is_empty() {
            return 0;
        }
        let sum: f32 = self.sessions.iter().map(|s| s.average_form_score).sum();
        (sum / self.sessions.len() as f32).round() as u32
    }

    /// 合計時間（分、四捨五入）
    pub fn total_minutes(&self) -> u64 {
        let secs: u64 = self.sessions.iter().map(|s| s.duration).sum();
        (secs as f64 / 60.0).round() as u64
    }

    /// 新しい順にn件
    pub fn recent(&self, n: usize) -> &'a [WorkoutSession] {
        &self.sessions[..n.min(self.sessions.len())]
    }
}
