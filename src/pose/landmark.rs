use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::angles::JointAngles;

/// これ未満の可視度は未検出扱い
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// 33点ボディランドマークのインデックス (BlazePose形式)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// インデックスから変換
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 肩〜手首
    pub fn is_arm(self) -> bool {
        (Self::LeftShoulder as usize..=Self::RightWrist as usize).contains(&(self as usize))
    }

    /// 腰〜足首
    pub fn is_leg(self) -> bool {
        (Self::LeftHip as usize..=Self::RightAnkle as usize).contains(&(self as usize))
    }
}

/// 1つのランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// 正規化X座標 (0.0..1.0)
    pub x: f32,
    /// 正規化Y座標 (0.0..1.0)
    pub y: f32,
    /// 相対奥行き（2D検出器では0.0）
    pub z: f32,
    /// 可視度 (0.0..1.0)
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// 可視度1.0の平面ランドマーク
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// 可視度がしきい値以上か
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    /// ピクセル座標に変換
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f32) as i32;
        let py = (self.y * height as f32) as i32;
        (px, py)
    }
}

/// 全身のランドマーク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub landmarks: Vec<Landmark>,
}

impl Pose {
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self {
            landmarks: landmarks.to_vec(),
        }
    }

    /// 33点未満でも可。足りない分は欠損扱い
    pub fn from_partial(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.get(index as usize)
    }

    /// 可視度を満たすランドマークのみ返す
    pub fn visible(&self, index: LandmarkIndex, threshold: f32) -> Option<&Landmark> {
        self.get(index).filter(|l| l.is_visible(threshold))
    }

    pub fn set(&mut self, index: LandmarkIndex, landmark: Landmark) {
        let i = index as usize;
        if i >= self.landmarks.len() {
            self.landmarks.resize(i + 1, Landmark::default());
        }
        self.landmarks[i] = landmark;
    }

    /// 平均可視度
    pub fn average_visibility(&self) -> f32 {
        if self.landmarks.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.landmarks.iter().map(|l| l.visibility).sum();
        sum / self.landmarks.len() as f32
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new([Landmark::default(); LandmarkIndex::COUNT])
    }
}

/// 1検出ティック分のランドマークと関節角度
///
/// 生成後は変更しない。
#[derive(Debug, Clone)]
pub struct PoseSnapshot {
    pub captured_at: Instant,
    pub pose: Pose,
    pub angles: JointAngles,
    /// 平均可視度
    pub confidence: f32,
}

impl PoseSnapshot {
    /// ポーズから角度を計算（`visibility_threshold`未満は無視）
    pub fn from_pose(pose: Pose, captured_at: Instant, visibility_threshold: f32) -> Self {
        let angles = JointAngles::from_pose(&pose, visibility_threshold);
        let confidence = pose.average_visibility();
        Self {
            captured_at,
            pose,
            angles,
            confidence,
        }
    }

    /// 角度のみのスナップショット（上流の検出器が角度を直接渡す場合）
    pub fn from_angles(angles: JointAngles) -> Self {
        Self {
            captured_at: Instant::now(),
            pose: Pose::from_partial(Vec::new()),
            angles,
            confidence: 1.0,
        }
    }
}
