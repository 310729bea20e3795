use serde::Serialize;

use super::{
    AngleRange, CoachingCues, ExerciseKnowledge, FormCriteria, Mistake, Phase, RealTimeCues,
    RiskLevel, ScoreBand,
};
use crate::analysis::MovementPhase;
use crate::pose::{Joint, JointAngles};

/// コーチング対象の種目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseId {
    OverheadPress,
    TennisServe,
    BoxingCombo,
}

impl ExerciseId {
    pub const ALL: [ExerciseId; 3] = [
        ExerciseId::OverheadPress,
        ExerciseId::TennisServe,
        ExerciseId::BoxingCombo,
    ];

    /// IDから種目を引く
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "overhead-press" => Some(Self::OverheadPress),
            "tennis-serve" => Some(Self::TennisServe),
            "boxing-combo" => Some(Self::BoxingCombo),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OverheadPress => "overhead-press",
            Self::TennisServe => "tennis-serve",
            Self::BoxingCombo => "boxing-combo",
        }
    }

    /// 表示名（種目選択・履歴用）
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OverheadPress => "Overhead Press",
            Self::TennisServe => "Tennis Serve",
            Self::BoxingCombo => "Boxing Combo",
        }
    }

    /// この種目の知識レコード
    pub fn knowledge(self) -> &'static ExerciseKnowledge {
        match self {
            Self::OverheadPress => &OVERHEAD_PRESS,
            Self::TennisServe => &TENNIS_SERVE,
            Self::BoxingCombo => &BOXING_COMBO,
        }
    }
}

/// 全種目の知識レコード
pub fn all() -> &'static [&'static ExerciseKnowledge] {
    static ALL: [&ExerciseKnowledge; 3] = [&OVERHEAD_PRESS, &TENNIS_SERVE, &BOXING_COMBO];
    &ALL
}

// ---------------------------------------------------------------------------
// オーバーヘッドプレス
// ---------------------------------------------------------------------------

/// 肘が90度未満
fn insufficient_elbow_height(a: &JointAngles) -> bool {
    a.left_elbow < 90.0 || a.right_elbow < 90.0
}

/// 肘が伸びきっていない
fn incomplete_lockout(a: &JointAngles) -> bool {
    a.left_elbow < 170.0 || a.right_elbow < 170.0
}

/// 左右の肘角度差が15度超
fn asymmetrical_press(a: &JointAngles) -> bool {
    (a.left_elbow - a.right_elbow).abs() > 15.0
}

/// 両肘160度超でロックアウト
fn press_rep(a: &JointAngles) -> bool {
    a.left_elbow > 160.0 && a.right_elbow > 160.0
}

/// 肘角度からプレスのフェーズを判定
fn press_phase(a: &JointAngles) -> MovementPhase {
    if a.left_elbow < 100.0 && a.right_elbow < 100.0 {
        MovementPhase::Setup
    } else if a.left_elbow > 160.0 && a.right_elbow > 160.0 {
        MovementPhase::Completion
    } else {
        MovementPhase::Execution
    }
}

static OVERHEAD_PRESS: ExerciseKnowledge = ExerciseKnowledge {
    id: ExerciseId::OverheadPress,
    name: "Overhead Press",
    overview: "Fundamental upper body strength exercise targeting shoulders, triceps, and core.",
    phases: &[
        Phase {
            name: "Setup",
            duration: "0-1 seconds",
            key_points: &["Feet shoulder-width apart", "Core engaged", "Elbows at 90°"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(90.0, 100.0, 95.0)),
                (Joint::RightElbow, AngleRange::new(90.0, 100.0, 95.0)),
                (Joint::LeftShoulder, AngleRange::new(30.0, 50.0, 40.0)),
                (Joint::RightShoulder, AngleRange::new(30.0, 50.0, 40.0)),
            ],
        },
        Phase {
            name: "Press",
            duration: "1-2 seconds",
            key_points: &["Straight bar path", "Progressive elbow extension", "Core braced"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(100.0, 180.0, 140.0)),
                (Joint::RightElbow, AngleRange::new(100.0, 180.0, 140.0)),
            ],
        },
        Phase {
            name: "Lockout",
            duration: "2-2.5 seconds",
            key_points: &["Full extension", "Shoulders stable", "Core still engaged"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(170.0, 180.0, 175.0)),
                (Joint::RightElbow, AngleRange::new(170.0, 180.0, 175.0)),
            ],
        },
        Phase {
            name: "Descent",
            duration: "2.5-4 seconds",
            key_points: &["Controlled lowering", "Maintain tension", "Prepare for next rep"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(90.0, 180.0, 135.0)),
                (Joint::RightElbow, AngleRange::new(90.0, 180.0, 135.0)),
            ],
        },
    ],
    mistakes: &[
        Mistake {
            name: "Insufficient Elbow Height",
            detection: "Elbow angle < 90° at start",
            risk: RiskLevel::High,
            correction: "Lift your elbows higher",
            cue: "Elbows up, under the bar",
            check: Some(insufficient_elbow_height),
        },
        Mistake {
            name: "Incomplete Lockout",
            detection: "Elbow angle < 170° at top",
            risk: RiskLevel::Low,
            correction: "Full lockout overhead",
            cue: "Push the ceiling away",
            check: Some(incomplete_lockout),
        },
        Mistake {
            name: "Asymmetrical Press",
            detection: "Left/right elbow difference > 15°",
            risk: RiskLevel::Medium,
            correction: "Keep both arms even",
            cue: "Press evenly",
            check: Some(asymmetrical_press),
        },
    ],
    safety_notes: &[
        "Adequate shoulder mobility required",
        "Warm up shoulders thoroughly",
        "Start with light weight",
        "Stop if shoulder pain occurs",
    ],
    form_criteria: FormCriteria {
        excellent: ScoreBand {
            min: 90.0,
            description: &["Perfect elbow positioning", "Straight bar path", "Full ROM"],
        },
        good: ScoreBand {
            min: 80.0,
            description: &["Minor bar path deviation", "Good control overall"],
        },
        acceptable: ScoreBand {
            min: 70.0,
            description: &["Moderate form issues", "Safe execution"],
        },
        poor: ScoreBand {
            min: 60.0,
            description: &["Multiple form breaks", "Safety concerns present"],
        },
    },
    cues: CoachingCues {
        beginner: &["Feet shoulder-width apart", "Elbows up and under", "Press straight up"],
        intermediate: &["Drive through your heels", "Maintain upper back tightness"],
        advanced: &["Generate power from the ground up", "Time your breathing"],
        real_time: RealTimeCues {
            critical: &["Elbows higher!", "Core tight!", "Control the weight!"],
            important: &["Full lockout", "Even pressure", "Straight path"],
            minor: &["Good tempo", "Stay tight", "Nice control"],
        },
    },
    rep_rule: Some(press_rep),
    phase_rule: Some(press_phase),
};

// ---------------------------------------------------------------------------
// テニスサーブ
// ---------------------------------------------------------------------------

fn poor_shoulder_rotation(a: &JointAngles) -> bool {
    (a.left_shoulder - a.right_shoulder).abs() < 20.0
}

/// インパクト: 両腕がほぼ伸びきった状態
fn serve_rep(a: &JointAngles) -> bool {
    a.left_elbow > 170.0 && a.right_elbow > 170.0
}

static TENNIS_SERVE: ExerciseKnowledge = ExerciseKnowledge {
    id: ExerciseId::TennisServe,
    name: "Tennis Serve",
    overview: "Complex kinetic chain movement combining power, precision, and technique.",
    phases: &[
        Phase {
            name: "Ball Toss",
            duration: "0-1 seconds",
            key_points: &["Consistent height", "Proper placement", "Smooth release"],
            ideal_ranges: &[
                (Joint::LeftShoulder, AngleRange::new(20.0, 40.0, 30.0)),
                (Joint::RightShoulder, AngleRange::new(30.0, 60.0, 45.0)),
            ],
        },
        Phase {
            name: "Loading",
            duration: "1-1.5 seconds",
            key_points: &["Shoulder turn", "Trophy position", "Core coiled"],
            ideal_ranges: &[
                (Joint::LeftShoulder, AngleRange::new(40.0, 80.0, 60.0)),
                (Joint::RightShoulder, AngleRange::new(60.0, 100.0, 80.0)),
            ],
        },
        Phase {
            name: "Acceleration",
            duration: "1.5-1.8 seconds",
            key_points: &["Explosive leg drive", "Hip rotation", "Shoulder turn"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(120.0, 180.0, 150.0)),
                (Joint::RightElbow, AngleRange::new(100.0, 160.0, 130.0)),
            ],
        },
        Phase {
            name: "Contact",
            duration: "1.8-1.9 seconds",
            key_points: &["Highest reach point", "Full extension", "Clean contact"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(170.0, 180.0, 175.0)),
                (Joint::RightElbow, AngleRange::new(170.0, 180.0, 175.0)),
            ],
        },
    ],
    mistakes: &[
        Mistake {
            name: "Low Ball Toss",
            detection: "Rushed swing timing",
            risk: RiskLevel::Medium,
            correction: "Toss higher and more consistent",
            cue: "Let the ball come down to you",
            // ボール追跡が必要、関節角度だけでは判定不可
            check: None,
        },
        Mistake {
            name: "Poor Shoulder Rotation",
            detection: "Limited shoulder turn",
            risk: RiskLevel::Medium,
            correction: "Turn your shoulders more",
            cue: "Show your back to your opponent",
            check: Some(poor_shoulder_rotation),
        },
    ],
    safety_notes: &[
        "Proper warm-up essential",
        "Gradual intensity increase",
        "Watch for shoulder/elbow pain",
    ],
    form_criteria: FormCriteria {
        excellent: ScoreBand {
            min: 90.0,
            description: &["Consistent toss", "Perfect timing", "Full rotation"],
        },
        good: ScoreBand {
            min: 80.0,
            description: &["Minor toss variations", "Good timing"],
        },
        acceptable: ScoreBand {
            min: 70.0,
            description: &["Basic technique present", "Room for improvement"],
        },
        poor: ScoreBand {
            min: 60.0,
            description: &["Major timing issues", "Inconsistent execution"],
        },
    },
    cues: CoachingCues {
        beginner: &["Stand sideways", "Consistent toss", "Reach high"],
        intermediate: &["Use your legs", "Full shoulder turn", "Accelerate through"],
        advanced: &["Coordinate kinetic chain", "Generate racquet speed"],
        real_time: RealTimeCues {
            critical: &["Toss higher!", "Turn more!", "Stay sideways!"],
            important: &["Good extension", "Nice rotation", "Follow through"],
            minor: &["Great timing", "Smooth motion", "Perfect toss"],
        },
    },
    rep_rule: Some(serve_rep),
    phase_rule: None,
};

// ---------------------------------------------------------------------------
// ボクシングコンビネーション
// ---------------------------------------------------------------------------

fn overreaching(a: &JointAngles) -> bool {
    a.left_elbow > 175.0 && a.right_elbow > 175.0
}

/// クロス着弾: 後ろ手が伸び、前手はガードに戻っている
fn combo_rep(a: &JointAngles) -> bool {
    a.right_elbow > 160.0 && a.left_elbow < 120.0
}

static BOXING_COMBO: ExerciseKnowledge = ExerciseKnowledge {
    id: ExerciseId::BoxingCombo,
    name: "Boxing Combo (Jab-Cross-Hook)",
    overview: "Fundamental boxing combination developing coordination, power, and defense.",
    phases: &[
        Phase {
            name: "Jab",
            duration: "0-0.3 seconds",
            key_points: &["Straight extension", "Quick snap back", "Guard maintained"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(160.0, 180.0, 170.0)),
                (Joint::RightElbow, AngleRange::new(90.0, 120.0, 100.0)),
            ],
        },
        Phase {
            name: "Cross",
            duration: "0.3-0.6 seconds",
            key_points: &["Hip rotation", "Power from ground", "Straight line"],
            ideal_ranges: &[
                (Joint::RightElbow, AngleRange::new(160.0, 180.0, 170.0)),
                (Joint::LeftElbow, AngleRange::new(90.0, 120.0, 100.0)),
            ],
        },
        Phase {
            name: "Hook",
            duration: "0.6-1.0 seconds",
            key_points: &["90° elbow", "Circular motion", "Pivot on foot"],
            ideal_ranges: &[
                (Joint::LeftElbow, AngleRange::new(80.0, 100.0, 90.0)),
                (Joint::RightElbow, AngleRange::new(90.0, 120.0, 100.0)),
            ],
        },
    ],
    mistakes: &[
        Mistake {
            name: "Dropping Guard",
            detection: "Hand below chin level",
            risk: RiskLevel::High,
            correction: "Keep your hands up",
            cue: "Protect your face",
            // 手と顎の位置関係は角度では判定不可
            check: None,
        },
        Mistake {
            name: "Overreaching",
            detection: "Full arm extension on all punches",
            risk: RiskLevel::Medium,
            correction: "Don't overextend",
            cue: "Punch through, not at",
            check: Some(overreaching),
        },
    ],
    safety_notes: &[
        "Always use hand wraps",
        "Proper warm-up required",
        "Focus on technique before power",
    ],
    form_criteria: FormCriteria {
        excellent: ScoreBand {
            min: 90.0,
            description: &["Perfect guard", "Optimal power", "Flawless sequence"],
        },
        good: ScoreBand {
            min: 80.0,
            description: &["Minor guard lapses", "Good technique"],
        },
        acceptable: ScoreBand {
            min: 70.0,
            description: &["Moderate flaws", "Basic competency"],
        },
        poor: ScoreBand {
            min: 60.0,
            description: &["Major issues", "Poor power generation"],
        },
    },
    cues: CoachingCues {
        beginner: &["Hands up", "Jab straight out", "Cross with hip rotation"],
        intermediate: &["Coordinate footwork", "Flow between punches", "Power from legs"],
        advanced: &["Vary timing", "Integrate head movement", "Develop power"],
        real_time: RealTimeCues {
            critical: &["Hands up!", "Don't drop guard!", "Stay balanced!"],
            important: &["Good rotation", "Sharp punches", "Nice flow"],
            minor: &["Great combo", "Perfect timing", "Excellent form"],
        },
    },
    rep_rule: Some(combo_rep),
    phase_rule: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for id in ExerciseId::ALL {
            assert_eq!(ExerciseId::from_id(id.as_str()), Some(id));
            assert_eq!(id.knowledge().id, id);
        }
        assert_eq!(ExerciseId::from_id("Overhead-Press"), None);
    }

    #[test]
    fn test_every_record_is_complete() {
        for k in all() {
            assert!(!k.phases.is_empty(), "{} has no phases", k.name);
            assert!(!k.mistakes.is_empty(), "{} has no mistakes", k.name);
            assert!(!k.safety_notes.is_empty(), "{} has no safety notes", k.name);
            assert!(k.rep_rule.is_some(), "{} has no rep rule", k.name);
            for phase in k.phases {
                for (joint, range) in phase.ideal_ranges {
                    assert!(range.min <= range.max, "{} {} {:?}", k.name, phase.name, joint);
                    if let Some(optimal) = range.optimal {
                        assert!(range.contains(optimal));
                    }
                }
            }
            let c = &k.form_criteria;
            assert!(c.excellent.min > c.good.min && c.good.min > c.acceptable.min);
            assert!(c.acceptable.min > c.poor.min);
        }
    }

    #[test]
    fn test_press_rules() {
        let low = JointAngles::from_pairs(&[(Joint::LeftElbow, 80.0), (Joint::RightElbow, 170.0)]);
        assert!(insufficient_elbow_height(&low));
        assert!(incomplete_lockout(&low));
        assert!(asymmetrical_press(&low));

        let top = JointAngles::from_pairs(&[(Joint::LeftElbow, 175.0), (Joint::RightElbow, 175.0)]);
        assert!(!insufficient_elbow_height(&top));
        assert!(!incomplete_lockout(&top));
        assert!(!asymmetrical_press(&top));
        assert!(press_rep(&top));
        assert_eq!(press_phase(&top), MovementPhase::Completion);

        let rack = JointAngles::from_pairs(&[(Joint::LeftElbow, 92.0), (Joint::RightElbow, 95.0)]);
        assert_eq!(press_phase(&rack), MovementPhase::Setup);
        let mid = JointAngles::from_pairs(&[(Joint::LeftElbow, 130.0), (Joint::RightElbow, 95.0)]);
        assert_eq!(press_phase(&mid), MovementPhase::Execution);
    }

    #[test]
    fn test_serve_and_combo_rules() {
        let square = JointAngles::from_pairs(&[(Joint::LeftShoulder, 40.0), (Joint::RightShoulder, 50.0)]);
        assert!(poor_shoulder_rotation(&square));
        let turned = JointAngles::from_pairs(&[(Joint::LeftShoulder, 30.0), (Joint::RightShoulder, 80.0)]);
        assert!(!poor_shoulder_rotation(&turned));

        let cross = JointAngles::from_pairs(&[(Joint::LeftElbow, 100.0), (Joint::RightElbow, 170.0)]);
        assert!(combo_rep(&cross));
        assert!(!overreaching(&cross));
        let both = JointAngles::from_pairs(&[(Joint::LeftElbow, 178.0), (Joint::RightElbow, 178.0)]);
        assert!(overreaching(&both));
        assert!(serve_rep(&both));
    }
}
