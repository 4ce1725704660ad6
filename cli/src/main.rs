use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repcount_core::{
    pipeline::{Session, SessionOptions},
    profile::{Exercise, ExerciseProfile},
    source::{LandmarkSource, ReplaySource},
    speech::{CommandSpeaker, LogSpeaker, SpeechWorker},
};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "rep-counter",
    version,
    about = "Count exercise repetitions from pose landmarks",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a landmark file through the counter for one exercise.
    Count {
        /// Exercise to count
        #[arg(short, long, value_enum)]
        exercise: ExerciseArg,

        /// JSON Lines file with one pose frame per line
        #[arg(short, long)]
        landmarks: PathBuf,

        /// TOML profile overriding the built-in thresholds and messages
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Process only every Nth frame [default: the profile's stride]
        #[arg(long)]
        frame_stride: Option<u32>,

        /// Where spoken feedback goes
        #[arg(long, value_enum, default_value_t = SpeechArg::Log)]
        speech: SpeechArg,

        /// TTS program used with `--speech command`
        #[arg(long, default_value = "espeak")]
        speech_command: String,

        /// Extra argument passed to the TTS program before the message
        #[arg(long = "speech-arg", allow_hyphen_values = true)]
        speech_args: Vec<String>,
    },

    /// List built-in exercises and their thresholds.
    Exercises,

    /// Write a built-in profile to TOML for editing.
    Profile {
        #[arg(short, long, value_enum)]
        exercise: ExerciseArg,

        /// Output TOML path
        #[arg(short, long, default_value = "profile.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExerciseArg {
    KneeRaise,
    ButtKick,
    LegRaise,
    GluteBridge,
}

impl From<ExerciseArg> for Exercise {
    fn from(arg: ExerciseArg) -> Self {
        match arg {
            ExerciseArg::KneeRaise => Exercise::KneeRaise,
            ExerciseArg::ButtKick => Exercise::ButtKick,
            ExerciseArg::LegRaise => Exercise::LegRaise,
            ExerciseArg::GluteBridge => Exercise::GluteBridge,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpeechArg {
    /// Write messages to the log
    Log,
    /// Run an external TTS program
    Command,
    /// Stay silent
    Off,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Respect RUST_LOG; default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Count {
            exercise,
            landmarks,
            profile,
            frame_stride,
            speech,
            speech_command,
            speech_args,
        } => cmd_count(
            exercise.into(),
            landmarks,
            profile,
            frame_stride,
            speech,
            speech_command,
            speech_args,
        ),
        Commands::Exercises => cmd_exercises(),
        Commands::Profile { exercise, output } => cmd_profile(exercise.into(), output),
    }
}

// ── count ─────────────────────────────────────────────────────────────────────

fn cmd_count(
    exercise: Exercise,
    landmarks: PathBuf,
    profile_path: Option<PathBuf>,
    frame_stride: Option<u32>,
    speech: SpeechArg,
    speech_command: String,
    speech_args: Vec<String>,
) -> Result<()> {
    let profile = match profile_path {
        Some(path) => {
            let profile = ExerciseProfile::load(&path)?;
            anyhow::ensure!(
                profile.exercise == exercise,
                "profile {} is for {}, not {}",
                path.display(),
                profile.exercise,
                exercise
            );
            profile
        }
        None => ExerciseProfile::builtin(exercise),
    };

    info!("Counting {}", profile.name);
    info!("  landmarks : {}", landmarks.display());
    info!(
        "  threshold : {}° / {}°",
        profile.threshold.low, profile.threshold.high
    );

    let worker = match speech {
        SpeechArg::Log => Some(SpeechWorker::spawn(LogSpeaker)?),
        SpeechArg::Command => {
            let speaker = speech_args
                .into_iter()
                .fold(CommandSpeaker::new(speech_command), CommandSpeaker::arg);
            Some(SpeechWorker::spawn(speaker)?)
        }
        SpeechArg::Off => None,
    };

    let source = ReplaySource::open(&landmarks)
        .with_context(|| format!("failed to open landmarks: {}", landmarks.display()))?;
    let total = source.len_hint().unwrap_or(0);

    let options = match frame_stride {
        Some(frame_stride) => SessionOptions { frame_stride },
        None => SessionOptions::for_profile(&profile),
    };
    let mut session = Session::open(source, profile, worker, options)?;

    let pb = progress(total);
    let pb2 = pb.clone();

    session
        .run(move |outcome, current, _total| {
            pb2.set_position(current);
            let counts: Vec<String> = outcome
                .limbs
                .iter()
                .map(|l| format!("{} {} ({})", l.side.label(), l.reps, l.stage))
                .collect();
            if outcome.person_detected {
                pb2.set_message(counts.join("  "));
            } else {
                pb2.set_message(format!("{}  [no person]", counts.join("  ")));
            }
        })
        .context("counting session failed")?;

    let summary = session.close();
    pb.finish_with_message("Done.");

    for (side, reps) in &summary.reps {
        println!("{} {}: {}", side.label(), summary.exercise, reps);
    }
    info!(
        frames = summary.frames_read,
        processed = summary.frames_processed,
        superseded_speech = summary.speech_superseded,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "finished"
    );
    Ok(())
}

// ── exercises ─────────────────────────────────────────────────────────────────

fn cmd_exercises() -> Result<()> {
    for exercise in Exercise::ALL {
        let p = ExerciseProfile::builtin(exercise);
        let sides: Vec<&str> = p.limbs.iter().map(|l| l.side.label()).collect();
        println!(
            "{:<13} low <{:>5.1}°  high >{:>5.1}°  {:?}  sides: {}",
            exercise,
            p.threshold.low,
            p.threshold.high,
            p.counting,
            sides.join("/")
        );
    }
    Ok(())
}

// ── profile ───────────────────────────────────────────────────────────────────

fn cmd_profile(exercise: Exercise, output: PathBuf) -> Result<()> {
    ExerciseProfile::builtin(exercise).save(&output)?;
    info!("wrote {} profile to {}", exercise, output.display());
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn progress(total: u64) -> ProgressBar {
    let pb = if total > 0 {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg} [{elapsed_precise}]")
                .unwrap()
                .progress_chars("=> "),
        );
        pb
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed_precise}]")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    };
    pb.set_message("Counting…");
    pb
}
