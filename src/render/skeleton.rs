use crate::pose::{LandmarkIndex, Pose};

/// スケルトン接続定義 (start, end)
pub const SKELETON_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 16] = [
    // 顔
    (LandmarkIndex::LeftEar, LandmarkIndex::LeftEye),
    (LandmarkIndex::LeftEye, LandmarkIndex::Nose),
    (LandmarkIndex::Nose, LandmarkIndex::RightEye),
    (LandmarkIndex::RightEye, LandmarkIndex::RightEar),
    // 胴体
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    // 腕
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    // 脚
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
];

/// 骨格線の色 (RGB)
pub const SKELETON_COLOR: u32 = 0x00FF88;
/// 腕の関節色
pub const ARM_COLOR: u32 = 0xFF6B35;
/// 脚の関節色
pub const LEG_COLOR: u32 = 0x34C759;
/// その他の関節色
pub const JOINT_COLOR: u32 = 0x00D4FF;

/// 関節点の半径（ピクセル）
pub const JOINT_RADIUS: i32 = 4;

/// ランドマークの描画色
pub fn landmark_color(index: LandmarkIndex) -> u32 {
    if index.is_arm() {
        ARM_COLOR
    } else if index.is_leg() {
        LEG_COLOR
    } else {
        JOINT_COLOR
    }
}

/// 骨格線1本（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

/// 関節点1つ（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointDot {
    pub index: LandmarkIndex,
    pub at: (i32, i32),
    pub color: u32,
}

/// 1ポーズ分のピクセル座標オーバーレイ（可視なものだけ）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub segments: Vec<Segment>,
    pub joints: Vec<JointDot>,
}

impl Overlay {
    /// 可視度でフィルタしてピクセル座標に投影
    pub fn from_pose(pose: &Pose, width: u32, height: u32, visibility_threshold: f32) -> Self {
        let segments = SKELETON_CONNECTIONS
            .iter()
            .filter_map(|&(a, b)| {
                let start = pose.visible(a, visibility_threshold)?;
                let end = pose.visible(b, visibility_threshold)?;
                Some(Segment {
                    from: start.to_pixel(width, height),
                    to: end.to_pixel(width, height),
                })
            })
            .collect();

        let joints = (0..pose.landmarks.len())
            .filter_map(LandmarkIndex::from_index)
            .filter_map(|index| {
                let l = pose.visible(index, visibility_threshold)?;
                Some(JointDot {
                    index,
                    at: l.to_pixel(width, height),
                    color: landmark_color(index),
                })
            })
            .collect();

        Self { segments, joints }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.joints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, VISIBILITY_THRESHOLD};

    #[test]
    fn test_colors_by_group() {
        assert_eq!(landmark_color(LandmarkIndex::LeftElbow), ARM_COLOR);
        assert_eq!(landmark_color(LandmarkIndex::RightWrist), ARM_COLOR);
        assert_eq!(landmark_color(LandmarkIndex::LeftKnee), LEG_COLOR);
        assert_eq!(landmark_color(LandmarkIndex::Nose), JOINT_COLOR);
        assert_eq!(landmark_color(LandmarkIndex::LeftFootIndex), JOINT_COLOR);
    }

    #[test]
    fn test_only_visible_parts_drawn() {
        let mut pose = Pose::default();
        pose.set(LandmarkIndex::LeftShoulder, Landmark::at(0.5, 0.5));
        pose.set(LandmarkIndex::LeftElbow, Landmark::at(0.25, 0.5));
        pose.set(LandmarkIndex::LeftWrist, Landmark::new(0.1, 0.5, 0.0, 0.2));

        let overlay = Overlay::from_pose(&pose, 640, 480, VISIBILITY_THRESHOLD);
        assert_eq!(
            overlay.segments,
            vec![Segment {
                from: (320, 240),
                to: (160, 240)
            }]
        );
        assert_eq!(overlay.joints.len(), 2);
        assert!(overlay.joints.iter().all(|j| j.color == ARM_COLOR));
    }

    #[test]
    fn test_empty_pose_draws_nothing() {
        let overlay = Overlay::from_pose(&Pose::default(), 640, 480, VISIBILITY_THRESHOLD);
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut pose = Pose::default();
        pose.set(LandmarkIndex::Nose, Landmark::new(0.5, 0.1, 0.0, 0.5));
        let overlay = Overlay::from_pose(&pose, 100, 100, 0.5);
        assert_eq!(overlay.joints.len(), 1);
        assert_eq!(overlay.joints[0].at, (50, 10));
    }
}
