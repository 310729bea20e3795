use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::landmark::{Landmark, LandmarkIndex, Pose};

/// 3点角度の計測方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// 画像平面のみ（zは無視）
    Planar,
    /// zを奥行きとして使う
    Spatial,
}

/// 計測方法に応じてベクトル化
fn to_vector(l: &Landmark, projection: Projection) -> Vector3<f32> {
    match projection {
        Projection::Planar => Vector3::new(l.x, l.y, 0.0),
        Projection::Spatial => Vector3::new(l.x, l.y, l.z),
    }
}

/// `vertex`での内角（度、0.0..=180.0）
///
/// 点が欠けているか辺の長さが0なら0.0
pub fn joint_angle(
    proximal: Option<&Landmark>,
    vertex: Option<&Landmark>,
    distal: Option<&Landmark>,
    projection: Projection,
) -> f32 {
    let (Some(a), Some(b), Some(c)) = (proximal, vertex, distal) else {
        return 0.0;
    };
    let b = to_vector(b, projection);
    let v1 = to_vector(a, projection) - b;
    let v2 = to_vector(c, projection) - b;

    let m1 = v1.norm();
    let m2 = v2.norm();
    if m1 == 0.0 || m2 == 0.0 {
        return 0.0;
    }

    // 丸め誤差でcosが[-1, 1]をわずかに超えることがある
    let cos = (v1.dot(&v2) / (m1 * m2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// フォーム判定に使う関節
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftWrist,
    RightWrist,
    LeftKnee,
    RightKnee,
}

impl Joint {
    pub const ALL: [Joint; 8] = [
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftKnee,
        Joint::RightKnee,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Joint::LeftElbow => "leftElbow",
            Joint::RightElbow => "rightElbow",
            Joint::LeftShoulder => "leftShoulder",
            Joint::RightShoulder => "rightShoulder",
            Joint::LeftWrist => "leftWrist",
            Joint::RightWrist => "rightWrist",
            Joint::LeftKnee => "leftKnee",
            Joint::RightKnee => "rightKnee",
        }
    }

    /// 左右なしの部位名 (e.g. "elbow")
    pub fn body_part(self) -> &'static str {
        match self {
            Joint::LeftElbow | Joint::RightElbow => "elbow",
            Joint::LeftShoulder | Joint::RightShoulder => "shoulder",
            Joint::LeftWrist | Joint::RightWrist => "wrist",
            Joint::LeftKnee | Joint::RightKnee => "knee",
        }
    }

    /// (近位, 頂点, 遠位) のランドマーク。計測しない関節はNone
    pub fn landmarks(self) -> Option<(LandmarkIndex, LandmarkIndex, LandmarkIndex)> {
        use LandmarkIndex::*;
        match self {
            Joint::LeftElbow => Some((LeftShoulder, LeftElbow, LeftWrist)),
            Joint::RightElbow => Some((RightShoulder, RightElbow, RightWrist)),
            Joint::LeftShoulder => Some((LeftHip, LeftShoulder, LeftElbow)),
            Joint::RightShoulder => Some((RightHip, RightShoulder, RightElbow)),
            // 手首の屈曲は手のランドマークが必要なので未計測
            Joint::LeftWrist | Joint::RightWrist => None,
            Joint::LeftKnee => Some((LeftHip, LeftKnee, LeftAnkle)),
            Joint::RightKnee => Some((RightHip, RightKnee, RightAnkle)),
        }
    }
}

/// 関節角度（度）。0.0は未計測
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngles {
    pub left_elbow: f32,
    pub right_elbow: f32,
    pub left_shoulder: f32,
    pub right_shoulder: f32,
    pub left_wrist: f32,
    pub right_wrist: f32,
    pub left_knee: f32,
    pub right_knee: f32,
}

impl JointAngles {
    /// ポーズから全関節の角度を計算
    pub fn from_pose(pose: &Pose, visibility_threshold: f32) -> Self {
        let mut angles = Self::default();
        for joint in Joint::ALL {
            if let Some((a, b, c)) = joint.landmarks() {
                let angle = joint_angle(
                    pose.visible(a, visibility_threshold),
                    pose.visible(b, visibility_threshold),
                    pose.visible(c, visibility_threshold),
                    Projection::Spatial,
                );
                angles.set(joint, angle);
            }
        }
        angles
    }

    pub fn from_pairs(pairs: &[(Joint, f32)]) -> Self {
        let mut angles = Self::default();
        for &(joint, degrees) in pairs {
            angles.set(joint, degrees);
        }
        angles
    }

    /// 関節の角度（未計測は0.0）
    pub fn get(&self, joint: Joint) -> f32 {
        match joint {
            Joint::LeftElbow => self.left_elbow,
            Joint::RightElbow => self.right_elbow,
            Joint::LeftShoulder => self.left_shoulder,
            Joint::RightShoulder => self.right_shoulder,
            Joint::LeftWrist => self.left_wrist,
            Joint::RightWrist => self.right_wrist,
            Joint::LeftKnee => self.left_knee,
            Joint::RightKnee => self.right_knee,
        }
    }

    pub fn set(&mut self, joint: Joint, degrees: f32) {
        let slot = match joint {
            Joint::LeftElbow => &mut self.left_elbow,
            Joint::RightElbow => &mut self.right_elbow,
            Joint::LeftShoulder => &mut self.left_shoulder,
            Joint::RightShoulder => &mut self.right_shoulder,
            Joint::LeftWrist => &mut self.left_wrist,
            Joint::RightWrist => &mut self.right_wrist,
            Joint::LeftKnee => &mut self.left_knee,
            Joint::RightKnee => &mut self.right_knee,
        };
        *slot = degrees;
    }

    /// 計測済みの角度（0.0ならNone）
    pub fn measured(&self, joint: Joint) -> Option<f32> {
        let v = self.get(joint);
        (v != 0.0 && v.is_finite()).then_some(v)
    }
}
