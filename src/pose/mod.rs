pub mod angles;
pub mod landmark;
pub mod synthetic;

pub use angles::{joint_angle, Joint, JointAngles, Projection};
pub use landmark::{Landmark, LandmarkIndex, Pose, PoseSnapshot, VISIBILITY_THRESHOLD};
pub use synthetic::{PoseSource, SyntheticPoseSource};
