pub mod coaching;
pub mod form;
pub mod reps;

pub use coaching::{CoachingEngine, CoachingFeedback, ExerciseContext, FeedbackKind, Priority, WorkoutAnalysis};
pub use form::{FormAssessment, FormEvaluator};
pub use reps::{classify_phase, MovementPhase, RepDetector};
