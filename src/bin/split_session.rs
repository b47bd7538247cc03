/// split_session: load a recording session, split its trials into
/// gesture-stratified train/test sets and write the result.
///
/// Output files (in `--output`):
///   split.safetensors   train_idxs, test_idxs [M] i64; train_kinematics, test_kinematics [M, D] f32
///   trials.json         train/test trial info + split report
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kinsplit::{generate_train_test_split, io::{write_split, SessionData}, SplitConfig, TrainingType};

#[derive(Parser, Debug)]
#[command(name = "split_session", about = "Gesture-stratified train/test split of a kinematic session")]
struct Args {
    /// Session container with kinematics, nip_time and trial markers.
    #[arg(long)]
    input: PathBuf,

    /// Separate events container (trial_start_idxs / trial_stop_idxs).
    /// When given, --input only needs kinematics and nip_time.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    output: PathBuf,

    /// Fraction of each gesture's trials used for training.
    #[arg(long, default_value_t = 0.7)]
    train_ratio: f64,

    /// Activation threshold on per-channel peak |value|.
    #[arg(long, default_value_t = 0.1)]
    threshold: f32,

    /// train_first, train_last or train_random.
    #[arg(long, default_value = "train_first")]
    training_type: String,

    /// Keep trials with more than one active DOF.
    #[arg(long)]
    include_combined: bool,

    /// Seed for train_random.
    #[arg(long, default_value_t = 2025)]
    seed: u64,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Fail on a bad policy name before touching any file.
    let training_type: TrainingType = args.training_type.parse()?;
    let cfg = SplitConfig {
        train_ratio: args.train_ratio,
        activation_threshold: args.threshold,
        training_type,
        include_combined: args.include_combined,
        seed: args.seed,
    };
    cfg.validate()?;

    let session = match &args.events {
        Some(events) => SessionData::load_pair(&args.input, events)?,
        None => SessionData::load(&args.input)?,
    };
    info!(
        samples = session.kinematics.nrows(),
        dofs = session.kinematics.ncols(),
        starts = session.trial_start_timestamps.len(),
        stops = session.trial_stop_timestamps.len(),
        "loaded {}",
        args.input.display()
    );

    let split = generate_train_test_split(
        session.kinematics.view(),
        &session.timestamps,
        &session.trial_start_timestamps,
        &session.trial_stop_timestamps,
        &cfg,
    )
    .context("splitting session")?;

    write_split(&split, session.kinematics.view(), &args.output)?;
    info!(
        train_trials = split.train_info.len(),
        test_trials = split.test_info.len(),
        "written → {}",
        args.output.display()
    );
    Ok(())
}
