use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use super::form::{FormAssessment, FormEvaluator};
use super::reps::{classify_phase, MovementPhase, RepDetector};
use crate::knowledge::{RiskLevel, Urgency, UserLevel};
use crate::pose::PoseSnapshot;
use crate::session::epoch_millis;

/// フィードバックの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Safety,
    Technique,
    Encouragement,
    RepCount,
}

/// 発話優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// ユーザー向けメッセージ候補（発話するかはオーケストレータが決める）
#[derive(Debug, Clone, Serialize)]
pub struct CoachingFeedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub priority: Priority,
    /// 生成時刻（Unixミリ秒）
    pub timestamp: u64,
    /// 発話を希望するか
    pub should_speak: bool,
}

impl CoachingFeedback {
    pub fn new(kind: FeedbackKind, message: impl Into<String>, priority: Priority, should_speak: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            priority,
            timestamp: epoch_millis(),
            should_speak,
        }
    }
}

/// 進行中ワークアウトの状態
#[derive(Debug, Clone)]
pub struct ExerciseContext {
    pub exercise: String,
    /// 現在のセット番号（1始まり）
    pub current_set: u32,
    /// これまでの合計レップ数
    pub total_reps: u32,
    /// レベル別キューの選択に使う
    pub user_level: UserLevel,
}

impl ExerciseContext {
    pub fn new(exercise: impl Into<String>, user_level: UserLevel) -> Self {
        Self {
            exercise: exercise.into(),
            current_set: 1,
            total_reps: 0,
            user_level,
        }
    }
}

/// 1ティック分の解析結果
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutAnalysis {
    /// フォームスコア (0..=100)
    pub form_score: f32,
    /// このティックでレップが完了したら1
    pub rep_count: u32,
    pub phase: MovementPhase,
    pub feedback: Vec<CoachingFeedback>,
    /// 評価器のフィードバック（改善点）
    pub improvements: Vec<String>,
}

/// ティックごとの解析（フェーズ、フォームスコア、レップ検出、フィードバック候補）
pub struct CoachingEngine {
    evaluator: FormEvaluator,
    reps: RepDetector,
}

impl CoachingEngine {
    pub fn new(evaluator: FormEvaluator, reps: RepDetector) -> Self {
        Self { evaluator, reps }
    }

    pub fn evaluator(&self) -> &FormEvaluator {
        &self.evaluator
    }

    /// レップ検出のデバウンスをリセット（セット間）
    pub fn reset_reps(&mut self) {
        self.reps.reset();
    }

    /// 現在時刻でスナップショットを解析
    pub fn analyze(&mut self, snapshot: &PoseSnapshot, context: &ExerciseContext) -> WorkoutAnalysis {
        self.analyze_at(snapshot, context, Instant::now())
    }

    pub fn analyze_at(&mut self, snapshot: &PoseSnapshot, context: &ExerciseContext, now: Instant) -> WorkoutAnalysis {
        let exercise = context.exercise.as_str();
        let phase = classify_phase(&snapshot.angles, exercise);
        let assessment = self.evaluator.evaluate(exercise, snapshot, Some(phase.as_str()));
        let rep_count = self.reps.detect_rep_at(snapshot, exercise, now);

        let feedback = self.feedback_for(&assessment, rep_count, context);
        debug!(
            exercise,
            score = assessment.score,
            %phase,
            rep_count,
            candidates = feedback.len(),
            "tick analyzed"
        );

        WorkoutAnalysis {
            form_score: assessment.score,
            rep_count,
            phase,
            feedback,
            improvements: assessment.feedback,
        }
    }

    /// スコア・ミス・レップからフィードバック候補を組み立てる
    fn feedback_for(&self, assessment: &FormAssessment, rep_count: u32, context: &ExerciseContext) -> Vec<CoachingFeedback> {
        let score = assessment.score;
        let mut items = Vec::new();

        for mistake in &assessment.mistakes {
            let item = if mistake.risk == RiskLevel::High {
                CoachingFeedback::new(FeedbackKind::Safety, mistake.correction, Priority::High, true)
            } else {
                CoachingFeedback::new(FeedbackKind::Technique, mistake.correction, Priority::Medium, false)
            };
            items.push(item);
        }

        if score > 85.0 {
            items.push(CoachingFeedback::new(
                FeedbackKind::Encouragement,
                "Excellent form!",
                Priority::Low,
                false,
            ));
        }

        if rep_count > 0 {
            let rep = context.total_reps + rep_count;
            items.push(CoachingFeedback::new(
                FeedbackKind::RepCount,
                format!("Rep {} complete!", rep),
                Priority::Medium,
                true,
            ));
            let level_cues = self.evaluator.knowledge().cues_for_level(&context.exercise, context.user_level);
            if !level_cues.is_empty() {
                let cue = level_cues[(rep as usize - 1) % level_cues.len()];
                items.push(CoachingFeedback::new(FeedbackKind::Technique, cue, Priority::Low, false));
            }
        }

        for cue in &assessment.cues {
            items.push(CoachingFeedback::new(FeedbackKind::Technique, *cue, Priority::Medium, true));
        }

        let urgency = Urgency::for_score(score);
        let priority = if score > 60.0 { Priority::Medium } else { Priority::High };
        for cue in self.evaluator.knowledge().real_time_cues(&context.exercise, urgency) {
            items.push(CoachingFeedback::new(FeedbackKind::Technique, *cue, priority, score < 60.0));
        }

        items
    }
}

impl Default for CoachingEngine {
    fn default() -> Self {
        Self::new(FormEvaluator::default(), RepDetector::default())
    }
}
