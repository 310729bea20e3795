//! 種目ごとの静的な参照データ（フェーズ、よくあるミス、スコア帯、コーチングキュー）
//!
//! カタログから一度だけ構築し、以後は読み取り専用。

pub mod catalog;

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::analysis::MovementPhase;
use crate::pose::{Joint, JointAngles};

pub use catalog::ExerciseId;

/// 未知の種目に返すスコア帯説明
pub const UNAVAILABLE_DESCRIPTION: &[&str] = &["Form analysis not available"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// このリスクのミス1件あたりの減点
    pub fn deduction(self) -> u32 {
        match self {
            RiskLevel::High => 20,
            RiskLevel::Medium => 10,
            RiskLevel::Low => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
    pub optimal: Option<f32>,
}

impl AngleRange {
    pub const fn new(min: f32, max: f32, optimal: f32) -> Self {
        Self {
            min,
            max,
            optimal: Some(optimal),
        }
    }

    pub fn contains(&self, degrees: f32) -> bool {
        degrees >= self.min && degrees <= self.max
    }
}

/// レップ内の名前付きフェーズ
#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub name: &'static str,
    /// 想定所要時間 (e.g. "1-2 seconds")
    pub duration: &'static str,
    pub key_points: &'static [&'static str],
    pub ideal_ranges: &'static [(Joint, AngleRange)],
}

impl Phase {
    /// 大文字小文字を無視した部分一致
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

pub type MistakeCheck = fn(&JointAngles) -> bool;

/// 検出可能なフォームエラー
#[derive(Debug, Clone, Serialize)]
pub struct Mistake {
    pub name: &'static str,
    /// 検出内容の説明
    pub detection: &'static str,
    pub risk: RiskLevel,
    pub correction: &'static str,
    pub cue: &'static str,
    /// 角度ベースの判定がないミスはNone
    #[serde(skip)]
    pub check: Option<MistakeCheck>,
}

impl Mistake {
    pub fn detect(&self, angles: &JointAngles) -> bool {
        self.check.map_or(false, |check| check(angles))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBand {
    pub min: f32,
    pub description: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct FormCriteria {
    pub excellent: ScoreBand,
    pub good: ScoreBand,
    pub acceptable: ScoreBand,
    pub poor: ScoreBand,
}

impl FormCriteria {
    /// 上から順に最小値を満たす最初の帯（どれも満たさなければpoor）
    pub fn band(&self, score: f32) -> &ScoreBand {
        [&self.excellent, &self.good, &self.acceptable]
            .into_iter()
            .find(|band| score >= band.min)
            .unwrap_or(&self.poor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl UserLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    Important,
    Minor,
}

impl Urgency {
    /// スコアに応じたリアルタイムキューの段階
    pub fn for_score(score: f32) -> Self {
        if score > 80.0 {
            Urgency::Minor
        } else if score > 60.0 {
            Urgency::Important
        } else {
            Urgency::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RealTimeCues {
    pub critical: &'static [&'static str],
    pub important: &'static [&'static str],
    pub minor: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachingCues {
    pub beginner: &'static [&'static str],
    pub intermediate: &'static [&'static str],
    pub advanced: &'static [&'static str],
    pub real_time: RealTimeCues,
}

impl CoachingCues {
    pub fn for_level(&self, level: UserLevel) -> &'static [&'static str] {
        match level {
            UserLevel::Beginner => self.beginner,
            UserLevel::Intermediate => self.intermediate,
            UserLevel::Advanced => self.advanced,
        }
    }

    pub fn for_urgency(&self, urgency: Urgency) -> &'static [&'static str] {
        match urgency {
            Urgency::Critical => self.real_time.critical,
            Urgency::Important => self.real_time.important,
            Urgency::Minor => self.real_time.minor,
        }
    }
}

/// 1種目分の知識
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseKnowledge {
    pub id: ExerciseId,
    pub name: &'static str,
    pub overview: &'static str,
    pub phases: &'static [Phase],
    pub mistakes: &'static [Mistake],
    pub safety_notes: &'static [&'static str],
    pub form_criteria: FormCriteria,
    pub cues: CoachingCues,
    /// レップ完了判定
    #[serde(skip)]
    pub rep_rule: Option<MistakeCheck>,
    #[serde(skip)]
    pub phase_rule: Option<fn(&JointAngles) -> MovementPhase>,
}

impl ExerciseKnowledge {
    pub fn phase(&self, query: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.matches(query))
    }
}

/// 種目IDで引く知識テーブル
pub struct KnowledgeBase {
    exercises: HashMap<ExerciseId, &'static ExerciseKnowledge>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        let exercises: HashMap<_, _> = catalog::all().iter().map(|&k| (k.id, k)).collect();
        debug!(count = exercises.len(), "knowledge base loaded");
        Self { exercises }
    }

    /// カタログにないIDはNone
    pub fn get(&self, exercise_id: &str) -> Option<&'static ExerciseKnowledge> {
        let id = ExerciseId::from_id(exercise_id)?;
        self.exercises.get(&id).copied()
    }

    pub fn cues_for_level(&self, exercise_id: &str, level: UserLevel) -> &'static [&'static str] {
        self.get(exercise_id)
            .map(|k| k.cues.for_level(level))
            .unwrap_or_default()
    }

    pub fn real_time_cues(&self, exercise_id: &str, urgency: Urgency) -> &'static [&'static str] {
        self.get(exercise_id)
            .map(|k| k.cues.for_urgency(urgency))
            .unwrap_or_default()
    }

    pub fn describe_score(&self, exercise_id: &str, score: f32) -> &'static [&'static str] {
        match self.get(exercise_id) {
            Some(k) => k.form_criteria.band(score).description,
            None => UNAVAILABLE_DESCRIPTION,
        }
    }

    /// 表示順の種目ID一覧
    pub fn exercise_ids(&self) -> Vec<&'static str> {
        ExerciseId::ALL.iter().map(|id| id.as_str()).collect()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}
