use anyhow::Result;
use fitform::analysis::FormEvaluator;
use fitform::config::Config;
use fitform::knowledge::{Urgency, UserLevel};
use fitform::pose::{Joint, JointAngles, PoseSnapshot};
use fitform::session::WorkoutStats;
use fitform::storage::{JsonFileStore, WorkoutStore};
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_PATH: &str = "config.toml";

fn print_help() {
    println!("commands:");
    println!("  l                    - list exercises");
    println!("  e <id>               - select exercise (e.g. e tennis-serve)");
    println!("  p <phase> | p -      - score against a phase, or none");
    println!("  a le re [ls rs]      - evaluate elbow (and shoulder) angles, e.g. a 80 170");
    println!("  c <level>            - coaching cues (beginner/intermediate/advanced)");
    println!("  b <score>            - score band description and real-time cues");
    println!("  j                    - toggle JSON output");
    println!("  s                    - workout history stats");
    println!("  q                    - quit");
}

fn parse_angles(args: &[&str]) -> Option<JointAngles> {
    let values: Vec<f32> = args.iter().map(|s| s.parse().ok()).collect::<Option<_>>()?;
    let joints = [Joint::LeftElbow, Joint::RightElbow, Joint::LeftShoulder, Joint::RightShoulder];
    let pairs: Vec<(Joint, f32)> = joints.into_iter().zip(values).collect();
    Some(JointAngles::from_pairs(&pairs))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::load_or_default(CONFIG_PATH);
    let evaluator = FormEvaluator::default();
    let kb = evaluator.knowledge();

    let mut exercise = config.session.exercise.clone();
    let mut phase: Option<String> = None;
    let mut json = false;

    println!("=== fitform {} - form console ===", env!("GIT_VERSION"));
    println!("exercise: {}", exercise);
    println!();
    print_help();
    println!();

    loop {
        print!("[{}{}]> ", exercise, phase.as_deref().map(|p| format!(" / {}", p)).unwrap_or_default());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "l" => {
                for id in kb.exercise_ids() {
                    let name = kb.get(id).map(|k| k.name).unwrap_or(id);
                    println!("  {:<16} {}", id, name);
                }
            }
            "e" if parts.len() == 2 => {
                if kb.get(parts[1]).is_none() {
                    println!("unknown exercise {} (scores will use the fallback)", parts[1]);
                }
                exercise = parts[1].to_string();
                phase = None;
            }
            "p" if parts.len() == 2 => {
                phase = match parts[1] {
                    "-" => None,
                    name => {
                        match kb.get(&exercise).and_then(|k| k.phase(name)) {
                            Some(p) => println!("phase {} ({}): {}", p.name, p.duration, p.key_points.join(", ")),
                            None => println!("no phase matches {}, range checks skipped", name),
                        }
                        Some(name.to_string())
                    }
                };
            }
            "a" if parts.len() == 3 || parts.len() == 5 => {
                let Some(angles) = parse_angles(&parts[1..]) else {
                    println!("angles must be numbers");
                    continue;
                };
                let snapshot = PoseSnapshot::from_angles(angles);
                let result = evaluator.evaluate(&exercise, &snapshot, phase.as_deref());
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    continue;
                }
                println!("score: {}", result.score);
                for m in &result.mistakes {
                    println!("  mistake: {} ({:?}) - {}", m.name, m.risk, m.detection);
                }
                for f in &result.feedback {
                    println!("  feedback: {}", f);
                }
                for c in &result.cues {
                    println!("  cue: {}", c);
                }
            }
            "c" if parts.len() == 2 => match UserLevel::from_name(parts[1]) {
                Some(level) => {
                    for cue in kb.cues_for_level(&exercise, level) {
                        println!("  {}", cue);
                    }
                }
                None => println!("unknown level {}", parts[1]),
            },
            "b" if parts.len() == 2 => match parts[1].parse::<f32>() {
                Ok(score) => {
                    println!("band: {}", kb.describe_score(&exercise, score).join(", "));
                    let urgency = Urgency::for_score(score);
                    println!("{:?} cues: {}", urgency, kb.real_time_cues(&exercise, urgency).join(", "));
                }
                Err(_) => println!("score must be a number"),
            },
            "j" => {
                json = !json;
                println!("json output {}", if json { "on" } else { "off" });
            }
            "s" => {
                let store = JsonFileStore::new(&config.storage.path);
                match store.load() {
                    Ok(history) => {
                        let stats = WorkoutStats::new(&history);
                        println!(
                            "workouts: {}  average score: {}  minutes: {}",
                            stats.total_workouts(),
                            stats.average_score(),
                            stats.total_minutes()
                        );
                        for s in stats.recent(5) {
                            println!(
                                "  {} {}: {} sets, {} reps, {:.0} avg, {}s",
                                s.id, s.exercise_name, s.sets, s.total_reps, s.average_form_score, s.duration
                            );
                        }
                    }
                    Err(e) => println!("history unavailable: {:#}", e),
                }
            }
            "h" => print_help(),
            "q" => {
                println!("bye");
                break;
            }
            _ => {
                println!("unknown command: {}", parts[0]);
            }
        }
    }

    Ok(())
}
