use crate::app_dirs::AppDirs;
use crate::evaluator::{Evaluator, EvaluatorConfig, DEFAULT_MIN_LENGTH};
use crate::history::CanvasSize;
use crate::surface::DEFAULT_STALE_TICKS;
use crate::transcript::Comparator;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub direction_threshold: f64,
    pub slope_threshold_x: f64,
    pub slope_threshold_y: f64,
    /// Only for descriptors built ad hoc (the CLI's `--direction`); curriculum
    /// entries and serialized descriptors fall back to `DEFAULT_MIN_LENGTH`
    pub default_min_length: f64,
    pub pass_threshold: u8,
    pub too_short_score: u8,
    pub dictation_pass_threshold: u8,
    pub dedupe_zero_delta: bool,
    /// idle runner ticks before an open stroke is dropped; 0 keeps it forever
    pub stale_stroke_ticks: u32,
    pub default_stroke_width: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            direction_threshold: 30.0,
            slope_threshold_x: 20.0,
            slope_threshold_y: 20.0,
            default_min_length: DEFAULT_MIN_LENGTH,
            pass_threshold: 80,
            too_short_score: 20,
            dictation_pass_threshold: 75,
            dedupe_zero_delta: true,
            stale_stroke_ticks: DEFAULT_STALE_TICKS,
            default_stroke_width: 2.0,
            canvas_width: 600.0,
            canvas_height: 400.0,
        }
    }
}

impl Config {
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(EvaluatorConfig {
            direction_threshold: self.direction_threshold,
            slope_threshold_x: self.slope_threshold_x,
            slope_threshold_y: self.slope_threshold_y,
            pass_threshold: self.pass_threshold,
            too_short_score: self.too_short_score,
        })
    }

    pub fn comparator(&self) -> Comparator {
        Comparator::new(self.dictation_pass_threshold)
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to the defaults
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring malformed config {}: {}", self.path.display(), e);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
