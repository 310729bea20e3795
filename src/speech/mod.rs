pub mod orchestrator;
pub mod voice;

pub use orchestrator::{CoachingOrchestrator, Route};
pub use voice::{LoggingSpeaker, Speaker, VoiceCoach, VoiceFeedback, VoiceSettings};
