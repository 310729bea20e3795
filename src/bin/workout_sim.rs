use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fitform::analysis::{CoachingEngine, ExerciseContext, FormEvaluator, RepDetector};
use fitform::config::Config;
use fitform::pose::{PoseSource, SyntheticPoseSource};
use fitform::render::{Canvas, Overlay};
use fitform::session::WorkoutRecorder;
use fitform::speech::{CoachingOrchestrator, LoggingSpeaker, VoiceCoach};
use fitform::storage::{JsonFileStore, WorkoutStore};

const CONFIG_PATH: &str = "config.toml";
const DEFAULT_SECONDS: u64 = 20;

struct Args {
    seconds: u64,
    frame_path: Option<String>,
}

/// 引数: workout_sim [秒数] [--frame out.ppm]
fn parse_args() -> Args {
    let mut args = Args {
        seconds: DEFAULT_SECONDS,
        frame_path: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frame" => args.frame_path = iter.next(),
            other => match other.parse() {
                Ok(secs) => args.seconds = secs,
                Err(_) => eprintln!("ignoring argument: {}", other),
            },
        }
    }
    args
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = parse_args();
    let config = Config::load_or_default(CONFIG_PATH);
    let exercise = config.session.exercise.clone();

    println!("fitform workout simulator {}", env!("GIT_VERSION"));
    println!("Exercise: {}", exercise);
    println!("Tick: {}ms, duration: {}s", config.session.tick_ms, args.seconds);
    println!("Speech: {}", if config.speech.enabled { "ON" } else { "OFF" });
    println!();

    let mut source = SyntheticPoseSource::from_config(&config.pose);
    let mut engine = CoachingEngine::new(
        FormEvaluator::default(),
        RepDetector::new(config.coaching.rep_debounce()),
    );
    let speaker = LoggingSpeaker::new(config.speech.simulate_duration);
    let voice = VoiceCoach::from_config(speaker, &config.speech);
    let mut orchestrator = CoachingOrchestrator::new(voice, config.coaching.speech_cooldown());

    let mut context = ExerciseContext::new(exercise.as_str(), config.session.level());
    let mut recorder = WorkoutRecorder::start(&exercise);
    let reps_per_set = config.coaching.reps_per_set.max(1);

    let tick = config.session.tick();
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut report_timer = Instant::now();
    let mut ticks = 0u32;
    let mut last_snapshot = None;

    while Instant::now() < deadline {
        let frame_start = Instant::now();

        if let Some(snapshot) = source.next_snapshot(frame_start) {
            let analysis = engine.analyze_at(&snapshot, &context, frame_start);
            recorder.record_score(analysis.form_score);

            if analysis.rep_count > 0 {
                recorder.add_reps(analysis.rep_count);
                context.total_reps = recorder.total_reps();
            }

            orchestrator.submit_all(&analysis.feedback, frame_start);

            if recorder.set_reps() >= reps_per_set {
                let reps = recorder.finish_set();
                println!("Set {} done: {} reps", recorder.sets(), reps);
                orchestrator.voice_mut().speak_phrase("finish_strong", None);
                context.current_set = recorder.sets() + 1;
                engine.reset_reps();
            }

            orchestrator.flush();
            ticks += 1;

            if report_timer.elapsed() >= Duration::from_secs(1) {
                println!(
                    "score: {:>5.1}  phase: {:<10}  reps: {:>3}  set: {}  avg: {:.1}  [{} ticks]",
                    analysis.form_score,
                    analysis.phase,
                    recorder.total_reps(),
                    context.current_set,
                    recorder.average_score(),
                    ticks
                );
                ticks = 0;
                report_timer = Instant::now();
            }
            last_snapshot = Some(snapshot);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < tick {
            std::thread::sleep(tick - elapsed);
        }
    }

    orchestrator.stop();
    let session = recorder.finish();
    println!();
    println!(
        "Workout: {} - {} sets, {} reps, average form {:.1}, {}s",
        session.exercise_name, session.sets, session.total_reps, session.average_form_score, session.duration
    );

    let mut store = JsonFileStore::new(&config.storage.path);
    match store.append(session) {
        Ok(()) => info!(path = %store.path().display(), "workout saved"),
        Err(e) => warn!("workout not saved: {:#}", e),
    }

    if let (Some(path), Some(snapshot)) = (args.frame_path, last_snapshot) {
        let overlay = Overlay::from_pose(
            &snapshot.pose,
            config.render.width,
            config.render.height,
            config.pose.visibility_threshold,
        );
        let mut canvas = Canvas::new(config.render.width as usize, config.render.height as usize);
        canvas.draw_overlay(&overlay);
        canvas.write_ppm(&path)?;
        println!("Overlay frame written to {}", path);
    }

    Ok(())
}
