//! ルールベースのフォーム採点
//!
//! 100点から開始し、検出したミスのリスクごとに減点、指定フェーズの
//! 理想範囲外の関節ごとにさらに減点する。結果は0..=100にクランプ。

use serde::Serialize;
use tracing::debug;

use crate::knowledge::{KnowledgeBase, Mistake};
use crate::pose::PoseSnapshot;

pub const MAX_SCORE: i32 = 100;
/// フェーズ理想範囲外の関節1つあたりの減点
pub const PHASE_RANGE_PENALTY: i32 = 5;
/// フィードバックの最大件数
pub const MAX_FEEDBACK: usize = 3;
/// キューの最大件数
pub const MAX_CUES: usize = 2;

/// 未知の種目のスコア
pub const FALLBACK_SCORE: f32 = 80.0;
pub const FALLBACK_FEEDBACK: &str = "Exercise knowledge not available";

const EXCELLENT_FEEDBACK: &str = "Excellent form!";
const EXCELLENT_CUE: &str = "Keep it up!";
const GOOD_FEEDBACK: &str = "Good technique, minor adjustments needed";

/// 1スナップショットの評価結果
#[derive(Debug, Clone, Serialize)]
pub struct FormAssessment {
    /// 0..=100
    pub score: f32,
    /// 重要な順、最大3件
    pub feedback: Vec<String>,
    pub mistakes: Vec<&'static Mistake>,
    /// 発話用キュー、最大2件
    pub cues: Vec<&'static str>,
}

impl FormAssessment {
    /// 未知の種目用の結果
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            feedback: vec![FALLBACK_FEEDBACK.to_string()],
            mistakes: Vec::new(),
            cues: Vec::new(),
        }
    }

    pub fn has_mistakes(&self) -> bool {
        !self.mistakes.is_empty()
    }
}

/// 知識ベースに基づくフォーム評価器
pub struct FormEvaluator {
    knowledge: KnowledgeBase,
}

impl FormEvaluator {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// スナップショットを採点（phase指定時はその理想範囲もチェック）
    pub fn evaluate(&self, exercise_id: &str, snapshot: &PoseSnapshot, phase: Option<&str>) -> FormAssessment {
        let Some(knowledge) = self.knowledge.get(exercise_id) else {
            debug!(exercise = exercise_id, "no knowledge entry, using fallback assessment");
            return FormAssessment::fallback();
        };
        let angles = &snapshot.angles;

        let mut score = MAX_SCORE;
        let mut feedback = Vec::new();
        let mut cues = Vec::new();
        let mut mistakes = Vec::new();

        for mistake in knowledge.mistakes.iter().filter(|m| m.detect(angles)) {
            score -= mistake.risk.deduction() as i32;
            feedback.push(mistake.correction.to_string());
            cues.push(mistake.cue);
            mistakes.push(mistake);
        }

        if let Some(phase) = phase.and_then(|name| knowledge.phase(name)) {
            for (joint, range) in phase.ideal_ranges {
                // 未計測の関節はスキップ
                let Some(angle) = angles.measured(*joint) else {
                    continue;
                };
                if !range.contains(angle) {
                    score -= PHASE_RANGE_PENALTY;
                    feedback.push(format!("Adjust {} position", joint.body_part()));
                }
            }
        }

        if score > 85 {
            feedback.push(EXCELLENT_FEEDBACK.to_string());
            cues.push(EXCELLENT_CUE);
        } else if score > 75 {
            feedback.push(GOOD_FEEDBACK.to_string());
        }

        feedback.truncate(MAX_FEEDBACK);
        cues.truncate(MAX_CUES);

        let score = score.clamp(0, MAX_SCORE) as f32;
        debug!(exercise = exercise_id, score, mistakes = mistakes.len(), "form evaluated");

        FormAssessment {
            score,
            feedback,
            mistakes,
            cues,
        }
    }
}

impl Default for FormEvaluator {
    fn default() -> Self {
        Self::new(KnowledgeBase::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Joint, JointAngles};

    fn snapshot(pairs: &[(Joint, f32)]) -> PoseSnapshot {
        PoseSnapshot::from_angles(JointAngles::from_pairs(pairs))
    }

    #[test]
    fn test_low_elbow_press() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[(Joint::LeftElbow, 80.0), (Joint::RightElbow, 170.0)]);
        let result = evaluator.evaluate("overhead-press", &snap, None);

        assert!(result.mistakes.iter().any(|m| m.name == "Insufficient Elbow Height"));
        // high 20 + low 5 (ロックアウト) + medium 10 (左右差)
        assert_eq!(result.score, 65.0);
        assert_eq!(result.feedback[0], "Lift your elbows higher");
        assert_eq!(result.cues, vec!["Elbows up, under the bar", "Push the ceiling away"]);
    }

    #[test]
    fn test_clean_lockout() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[
            (Joint::LeftElbow, 175.0),
            (Joint::RightElbow, 175.0),
            (Joint::LeftShoulder, 160.0),
            (Joint::RightShoulder, 165.0),
        ]);
        let result = evaluator.evaluate("overhead-press", &snap, None);
        assert!(result.mistakes.is_empty());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.feedback, vec!["Excellent form!"]);
        assert_eq!(result.cues, vec!["Keep it up!"]);
    }

    #[test]
    fn test_unknown_exercise_fallback() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[(Joint::LeftElbow, 10.0)]);
        let result = evaluator.evaluate("deadlift", &snap, Some("setup"));
        assert_eq!(result.score, 80.0);
        assert_eq!(result.feedback, vec!["Exercise knowledge not available"]);
        assert!(result.mistakes.is_empty());
        assert!(result.cues.is_empty());
    }

    #[test]
    fn test_phase_range_penalty() {
        let evaluator = FormEvaluator::default();
        // 肘172度のロックアウトはミス判定も範囲チェックも通る
        let snap = snapshot(&[(Joint::LeftElbow, 172.0), (Joint::RightElbow, 172.0)]);
        assert_eq!(evaluator.evaluate("overhead-press", &snap, Some("lockout")).score, 100.0);

        // セットアップ範囲: 肘90..=100, 肩30..=50（ここでは肩は未計測）
        let result = evaluator.evaluate("overhead-press", &snap, Some("Setup"));
        assert_eq!(result.score, 90.0);
        assert_eq!(result.feedback[0], "Adjust elbow position");
        assert_eq!(result.feedback[1], "Adjust elbow position");
        assert_eq!(result.feedback[2], "Excellent form!");
    }

    #[test]
    fn test_unknown_phase_is_ignored() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[(Joint::LeftElbow, 172.0), (Joint::RightElbow, 172.0)]);
        let result = evaluator.evaluate("overhead-press", &snap, Some("completion"));
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_good_band_note() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[(Joint::LeftElbow, 150.0), (Joint::RightElbow, 170.0)]);
        let result = evaluator.evaluate("overhead-press", &snap, None);
        // ロックアウト -5, 左右差 -10
        assert_eq!(result.score, 85.0);
        assert_eq!(
            result.feedback,
            vec!["Full lockout overhead", "Keep both arms even", "Good technique, minor adjustments needed"]
        );
        assert_eq!(result.cues, vec!["Push the ceiling away", "Press evenly"]);
    }

    #[test]
    fn test_score_never_negative() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[
            (Joint::LeftElbow, 10.0),
            (Joint::RightElbow, 170.0),
            (Joint::LeftShoulder, 170.0),
            (Joint::RightShoulder, 5.0),
        ]);
        for phase in [None, Some("setup"), Some("press"), Some("lockout"), Some("descent")] {
            let result = evaluator.evaluate("overhead-press", &snap, phase);
            assert!((0.0..=100.0).contains(&result.score));
            assert!(result.feedback.len() <= MAX_FEEDBACK);
            assert!(result.cues.len() <= MAX_CUES);
        }
    }

    #[test]
    fn test_limits_hold_for_every_exercise() {
        let evaluator = FormEvaluator::default();
        let extremes = [0.0, 1.0, 45.0, 90.0, 135.0, 179.0, 180.0];
        for id in evaluator.knowledge().exercise_ids() {
            for &l in &extremes {
                for &r in &extremes {
                    let snap = snapshot(&[
                        (Joint::LeftElbow, l),
                        (Joint::RightElbow, r),
                        (Joint::LeftShoulder, r),
                        (Joint::RightShoulder, l),
                    ]);
                    let result = evaluator.evaluate(id, &snap, Some("a"));
                    assert!((0.0..=100.0).contains(&result.score), "{} {} {}", id, l, r);
                    assert!(result.feedback.len() <= MAX_FEEDBACK);
                    assert!(result.cues.len() <= MAX_CUES);
                }
            }
        }
    }

    #[test]
    fn test_tennis_square_shoulders() {
        let evaluator = FormEvaluator::default();
        let snap = snapshot(&[(Joint::LeftShoulder, 45.0), (Joint::RightShoulder, 50.0)]);
        let result = evaluator.evaluate("tennis-serve", &snap, None);
        assert_eq!(result.score, 90.0);
        assert_eq!(result.feedback[0], "Turn your shoulders more");
        assert_eq!(result.cues[0], "Show your back to your opponent");
    }
}
