use std::f32::consts::PI;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::landmark::{Landmark, LandmarkIndex, Pose, PoseSnapshot};
use crate::config::PoseConfig;

/// 検出ティックごとにポーズを返すソース
///
/// 実際の推論モデルもこの裏に置く。同梱は合成ソースのみ。
pub trait PoseSource {
    /// このティックでポーズがなければNone
    fn next_snapshot(&mut self, now: Instant) -> Option<PoseSnapshot>;
}

/// プレス動作で動かさないランドマークの固定位置
const BASE_POSITIONS: [(LandmarkIndex, f32, f32); 12] = [
    (LandmarkIndex::Nose, 0.5, 0.2),
    (LandmarkIndex::LeftEye, 0.48, 0.18),
    (LandmarkIndex::RightEye, 0.52, 0.18),
    (LandmarkIndex::LeftEar, 0.46, 0.2),
    (LandmarkIndex::RightEar, 0.54, 0.2),
    (LandmarkIndex::LeftHip, 0.42, 0.65),
    (LandmarkIndex::RightHip, 0.58, 0.65),
    (LandmarkIndex::LeftKnee, 0.42, 0.8),
    (LandmarkIndex::RightKnee, 0.58, 0.8),
    (LandmarkIndex::LeftAnkle, 0.42, 0.95),
    (LandmarkIndex::RightAnkle, 0.58, 0.95),
    (LandmarkIndex::MouthLeft, 0.49, 0.23),
];

const LEFT_SHOULDER: (f32, f32) = (0.4, 0.35);
const RIGHT_SHOULDER: (f32, f32) = (0.6, 0.35);
const UPPER_ARM: f32 = 0.12;
const FOREARM: f32 = 0.11;

/// オーバーヘッドプレスを繰り返す開発用ポーズ生成器
///
/// 肘は1サイクルで90度（肩の位置）から175度（ロックアウト）まで動く。
/// 同じシードなら同じ系列。
pub struct SyntheticPoseSource {
    rng: StdRng,
    started: Option<Instant>,
    cycle: Duration,
    jitter: f32,
    visibility_threshold: f32,
}

impl SyntheticPoseSource {
    pub fn new(seed: u64, cycle: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            started: None,
            cycle,
            jitter: 0.005,
            visibility_threshold: super::landmark::VISIBILITY_THRESHOLD,
        }
    }

    /// 設定から生成（シード未指定ならランダム）
    pub fn from_config(config: &PoseConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut source = Self::new(seed, Duration::from_secs_f32(config.cycle_secs.max(0.5)));
        source.visibility_threshold = config.visibility_threshold;
        source
    }

    /// 座標ノイズの大きさを設定
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    /// サイクル内位置tでの肘角度 (t: 0.0..1.0)
    fn elbow_target(t: f32) -> f32 {
        90.0 + 85.0 * (1.0 - (2.0 * PI * t).cos()) / 2.0
    }

    /// ノイズを加える
    fn noisy(&mut self, v: f32) -> f32 {
        if self.jitter == 0.0 {
            return v;
        }
        (v + self.rng.gen_range(-self.jitter..=self.jitter)).clamp(0.0, 1.0)
    }

    fn landmark(&mut self, x: f32, y: f32) -> Landmark {
        let x = self.noisy(x);
        let y = self.noisy(y);
        let z = self.rng.gen_range(-1.0..1.0) * self.jitter;
        let visibility = self.rng.gen_range(0.7..1.0);
        Landmark::new(x, y, z, visibility)
    }

    /// 片腕の肩・肘・手首（side: 左-1.0, 右1.0）
    fn arm(shoulder: (f32, f32), t: f32, side: f32) -> [(f32, f32); 3] {
        // 上腕はプレス中に水平から垂直へ
        let lift = (1.0 - (2.0 * PI * t).cos()) / 2.0 * (PI / 2.0);
        let upper = (side * lift.cos(), -lift.sin());
        let elbow = (shoulder.0 + upper.0 * UPPER_ARM, shoulder.1 + upper.1 * UPPER_ARM);

        // 肘→肩の向きを目標角度だけ頭側へ回転
        let back = (-upper.0, -upper.1);
        let theta = Self::elbow_target(t).to_radians() * side;
        let forearm = (
            back.0 * theta.cos() - back.1 * theta.sin(),
            back.0 * theta.sin() + back.1 * theta.cos(),
        );
        let wrist = (elbow.0 + forearm.0 * FOREARM, elbow.1 + forearm.1 * FOREARM);
        [shoulder, elbow, wrist]
    }

    /// サイクル内位置tの全身ポーズを組み立てる
    fn build_pose(&mut self, t: f32) -> Pose {
        let mut pose = Pose::default();
        for (index, x, y) in BASE_POSITIONS {
            let l = self.landmark(x, y);
            pose.set(index, l);
        }

        let left = Self::arm(LEFT_SHOULDER, t, -1.0);
        let right = Self::arm(RIGHT_SHOULDER, t, 1.0);
        let arm_indices = [
            (LandmarkIndex::LeftShoulder, left[0]),
            (LandmarkIndex::LeftElbow, left[1]),
            (LandmarkIndex::LeftWrist, left[2]),
            (LandmarkIndex::RightShoulder, right[0]),
            (LandmarkIndex::RightElbow, right[1]),
            (LandmarkIndex::RightWrist, right[2]),
        ];
        for (index, (x, y)) in arm_indices {
            let l = self.landmark(x, y);
            pose.set(index, l);
        }
        pose
    }
}

impl PoseSource for SyntheticPoseSource {
    fn next_snapshot(&mut self, now: Instant) -> Option<PoseSnapshot> {
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started).as_secs_f32();
        let cycle = self.cycle.as_secs_f32();
        let t = (elapsed % cycle) / cycle;

        let pose = self.build_pose(t);
        Some(PoseSnapshot::from_pose(pose, now, self.visibility_threshold))
    }
}
