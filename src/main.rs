use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use quill::{
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    curriculum::Curriculum,
    evaluator::{Direction, ExpectedStrokeDescriptor, Severity},
    export::append_attempts_file,
    session::{Attempt, SessionAttemptLog},
    stroke::{Point, Stroke, StrokeKind, StrokeRecorder},
};
use std::{
    error::Error,
    path::{Path, PathBuf},
};

/// heuristic stroke and dictation scoring for shorthand practice
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Cli {
    /// path to a JSON config file (defaults to the platform config dir)
    #[clap(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// print results as JSON
    #[clap(long, global = true)]
    json: bool,

    /// append graded attempts to attempts.csv in the export directory
    #[clap(long, global = true)]
    record: bool,

    /// directory for recorded attempts (defaults to the platform data dir)
    #[clap(long, global = true)]
    export_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// list the practice symbols and their expected strokes
    Symbols,

    /// grade a stroke given as space separated "x,y" points
    Evaluate {
        /// curriculum symbol to grade against, e.g. P or CH
        #[clap(short = 's', long, conflicts_with = "direction")]
        symbol: Option<String>,

        /// expected direction when no symbol is given
        #[clap(short = 'd', long, value_enum)]
        direction: Option<DirectionArg>,

        /// minimum start-to-end length (defaults to the configured value)
        #[clap(short = 'm', long)]
        min_length: Option<f64>,

        /// points, e.g. "50,20 50,50 50,80"
        #[clap(short = 'p', long, allow_hyphen_values = true)]
        points: String,
    },

    /// check a transcription against a reference text or dictation passage
    Compare {
        /// reference text
        #[clap(short = 'r', long, conflicts_with = "passage")]
        reference: Option<String>,

        /// id of a built-in dictation passage
        #[clap(long)]
        passage: Option<String>,

        /// the learner's transcription
        #[clap(short = 't', long)]
        candidate: String,
    },

    /// show the effective configuration, or write the defaults with --init
    Config {
        #[clap(long)]
        init: bool,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum DirectionArg {
    Upward,
    Downward,
    UpwardSlope,
    Clockwise,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Upward => Direction::Upward,
            DirectionArg::Downward => Direction::Downward,
            DirectionArg::UpwardSlope => Direction::UpwardSlope,
            DirectionArg::Clockwise => Direction::Clockwise,
        }
    }
}

fn parse_points(raw: &str) -> Result<Vec<(f64, f64)>, Box<dyn Error>> {
    raw.split_whitespace()
        .map(|pair| -> Result<(f64, f64), Box<dyn Error>> {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("point '{pair}' is not in x,y form"))?;
            Ok((x.trim().parse::<f64>()?, y.trim().parse::<f64>()?))
        })
        .collect()
}

/// Replays points through a recorder as one gesture, ~60Hz apart
fn record_stroke(points: &[(f64, f64)], config: &Config, kind: StrokeKind) -> Result<Stroke, Box<dyn Error>> {
    let (&(x0, y0), rest) = points.split_first().ok_or("no points given")?;
    let mut recorder = StrokeRecorder::new(SystemClock)
        .with_pen(config.default_stroke_width, kind)
        .with_dedupe(config.dedupe_zero_delta);

    let handle = recorder.begin_stroke(Point::new(x0, y0, 0))?;
    for (i, &(x, y)) in rest.iter().enumerate() {
        recorder.extend_stroke(handle, Point::new(x, y, (i as i64 + 1) * 16))?;
    }
    Ok(recorder.end_stroke(handle)?)
}

fn record_attempt_to(dir: &Path, item_id: &str, attempt: Attempt) -> Result<(), Box<dyn Error>> {
    let mut log = SessionAttemptLog::new(item_id);
    log.record(attempt);
    let path = dir.join("attempts.csv");
    append_attempts_file(&log, &path)?;
    debug!("recorded attempt for {} in {}", item_id, path.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = store.load();
    debug!("loaded config from {}", store.path().display());
    let export_dir = match (cli.record, cli.export_dir) {
        (false, _) => None,
        (true, Some(dir)) => Some(dir),
        (true, None) => Some(AppDirs::export_dir().ok_or("no export directory available, pass --export-dir")?),
    };

    match cli.command {
        Command::Symbols => {
            let curriculum = Curriculum::load()?;
            if cli.json {
                let rows: Vec<_> = curriculum
                    .symbols()
                    .iter()
                    .map(|s| (s.id.as_str(), s.expected()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for s in curriculum.symbols() {
                    println!(
                        "{:<6} {:<6} {:<7} {:<13} min {:>5.1}  {}",
                        s.id, s.phonetic_name, s.stroke_kind, s.direction, s.min_length, s.category
                    );
                }
            }
        }
        Command::Evaluate {
            symbol,
            direction,
            min_length,
            points,
        } => {
            let item_id = match (&symbol, direction) {
                (Some(id), _) => id.to_uppercase(),
                (None, Some(d)) => Direction::from(d).to_string(),
                (None, None) => String::new(),
            };
            let expected = match (symbol, direction) {
                (Some(id), _) => {
                    let mut e = Curriculum::load()?
                        .expected(&id)
                        .ok_or_else(|| format!("unknown symbol '{id}'"))?;
                    if let Some(min) = min_length {
                        e.min_length = min;
                    }
                    e
                }
                (None, Some(d)) => ExpectedStrokeDescriptor::new(
                    d.into(),
                    min_length.unwrap_or(config.default_min_length),
                    StrokeKind::Light,
                ),
                (None, None) => return Err("either --symbol or --direction is required".into()),
            };

            let stroke = record_stroke(&parse_points(&points)?, &config, expected.stroke_kind)?;
            let result = config.evaluator().evaluate(&stroke, &expected);
            if let Some(dir) = &export_dir {
                record_attempt_to(dir, &item_id, result.into())?;
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "score {} ({}) {}",
                    result.score,
                    Severity::for_score(result.score),
                    if result.passed { "PASS" } else { "FAIL" }
                );
                println!("{}", result.feedback_code.hint(expected.direction));
            }
        }
        Command::Compare {
            reference,
            passage,
            candidate,
        } => {
            let item_id = passage.clone().unwrap_or_else(|| "dictation".to_string());
            let reference = match (reference, passage) {
                (Some(text), _) => text,
                (None, Some(id)) => Curriculum::load()?
                    .passage(&id)
                    .map(|p| p.text.clone())
                    .ok_or_else(|| format!("unknown passage '{id}'"))?,
                (None, None) => return Err("either --reference or --passage is required".into()),
            };

            let comparison = config.comparator().compare(&reference, &candidate);
            if let Some(dir) = &export_dir {
                let attempt = Attempt::transcript(comparison.clone(), SystemClock.now_ms());
                record_attempt_to(dir, &item_id, attempt)?;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!(
                    "{}/{} words, accuracy {}% {}",
                    comparison.matched_count,
                    comparison.reference_words.len(),
                    comparison.accuracy,
                    if comparison.passed { "PASS" } else { "FAIL" }
                );
                println!("{}", comparison.feedback().message());
            }
        }
        Command::Config { init } => {
            if init {
                store.save(&config)?;
                println!("wrote {}", store.path().display());
            } else {
                println!("# {}", store.path().display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(Cli::parse())
}
