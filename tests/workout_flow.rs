use std::time::{Duration, Instant};

use fitform::analysis::{CoachingEngine, ExerciseContext, FeedbackKind, MovementPhase};
use fitform::knowledge::UserLevel;
use fitform::pose::{Joint, JointAngles, PoseSnapshot, PoseSource, SyntheticPoseSource};
use fitform::render::Overlay;
use fitform::session::{WorkoutRecorder, WorkoutStats};
use fitform::speech::{CoachingOrchestrator, LoggingSpeaker, VoiceCoach, VoiceSettings};
use fitform::storage::{MemoryStore, WorkoutStore};

const TICK: Duration = Duration::from_millis(100);

#[test]
fn test_synthetic_press_workout() {
    let mut source = SyntheticPoseSource::new(7, Duration::from_secs(3)).with_jitter(0.0);
    let mut engine = CoachingEngine::default();
    let voice = VoiceCoach::new(LoggingSpeaker::new(false), VoiceSettings::default());
    let mut orchestrator = CoachingOrchestrator::new(voice, Duration::from_secs(3));

    let t0 = Instant::now();
    let mut recorder = WorkoutRecorder::start_at("overhead-press", t0);
    let mut context = ExerciseContext::new("overhead-press", UserLevel::Beginner);
    let mut phases_seen = Vec::new();
    let mut rep_messages = Vec::new();

    for i in 0..300 {
        let now = t0 + TICK * i;
        let snapshot = source.next_snapshot(now).expect("synthetic source always yields");
        let analysis = engine.analyze_at(&snapshot, &context, now);

        assert!((0.0..=100.0).contains(&analysis.form_score));
        if !phases_seen.contains(&analysis.phase) {
            phases_seen.push(analysis.phase);
        }

        recorder.record_score(analysis.form_score);
        if analysis.rep_count > 0 {
            recorder.add_reps(analysis.rep_count);
            context.total_reps = recorder.total_reps();
        }
        rep_messages.extend(
            analysis
                .feedback
                .iter()
                .filter(|f| f.kind == FeedbackKind::RepCount)
                .map(|f| f.message.clone()),
        );

        orchestrator.submit_all(&analysis.feedback, now);
        orchestrator.flush();

        if i == 150 {
            recorder.finish_set();
        }
    }

    // 3秒サイクルごとに1レップ
    assert_eq!(recorder.total_reps(), 10);
    assert_eq!(rep_messages.first().map(String::as_str), Some("Rep 1 complete!"));
    assert_eq!(rep_messages.last().map(String::as_str), Some("Rep 10 complete!"));
    assert!(phases_seen.contains(&MovementPhase::Setup));
    assert!(phases_seen.contains(&MovementPhase::Execution));
    assert!(phases_seen.contains(&MovementPhase::Completion));

    // 30秒間の発話数はクールダウンで制限される
    let spoken = orchestrator.voice().speaker().spoken().len();
    assert!(spoken >= 1 && spoken <= 10, "spoken={}", spoken);

    orchestrator.stop();
    let session = recorder.finish_at(t0 + Duration::from_secs(30));
    assert_eq!(session.sets, 2);
    assert_eq!(session.total_reps, 10);
    assert_eq!(session.duration, 30);
    assert_eq!(session.exercise_name, "Overhead Press");
    assert!(session.average_form_score > 0.0 && session.average_form_score <= 100.0);

    let mut store = MemoryStore::default();
    store.append(session).unwrap();
    let history = store.load().unwrap();
    let stats = WorkoutStats::new(&history);
    assert_eq!(stats.total_workouts(), 1);
    assert_eq!(stats.total_minutes(), 1);
}

#[test]
fn test_overlay_for_synthetic_pose() {
    let mut source = SyntheticPoseSource::new(3, Duration::from_secs(3));
    let snapshot = source.next_snapshot(Instant::now()).unwrap();
    let overlay = Overlay::from_pose(&snapshot.pose, 640, 480, 0.5);
    // 顔・胴体・腕・脚はすべて可視で生成される
    assert_eq!(overlay.segments.len(), 16);
    assert!(overlay
        .joints
        .iter()
        .all(|j| (0..640).contains(&j.at.0) && (0..480).contains(&j.at.1)));
}

#[test]
fn test_muted_voice_still_shows_safety_cue() {
    let mut engine = CoachingEngine::default();
    let mut voice = VoiceCoach::new(LoggingSpeaker::new(false), VoiceSettings::default());
    voice.set_enabled(false);
    let mut orchestrator = CoachingOrchestrator::new(voice, Duration::from_secs(3));

    let snapshot = PoseSnapshot::from_angles(JointAngles::from_pairs(&[
        (Joint::LeftElbow, 80.0),
        (Joint::RightElbow, 85.0),
    ]));
    let context = ExerciseContext::new("overhead-press", UserLevel::Beginner);
    let now = Instant::now();
    let analysis = engine.analyze_at(&snapshot, &context, now);

    let shown: Vec<_> = orchestrator
        .submit_all(&analysis.feedback, now)
        .iter()
        .map(|f| f.message.clone())
        .collect();
    assert_eq!(shown.len(), analysis.feedback.len());
    assert!(shown.iter().any(|m| m == "Lift your elbows higher"));
    assert_eq!(orchestrator.flush(), 0);
    assert!(orchestrator.voice().speaker().spoken().is_empty());
}
