use crate::stroke::{Stroke, StrokeKind};
use log::debug;
use serde::{Deserialize, Serialize};

const BASE_SCORE: i32 = 50;
const DIRECTION_BONUS: i32 = 30;
const LENGTH_BONUS: i32 = 20;

/// Expected start-to-end travel of a stroke. Screen y grows downward.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Direction {
    Upward,
    Downward,
    UpwardSlope,
    Clockwise,
}

impl Direction {
    pub fn instructions(&self) -> &'static str {
        match self {
            Direction::Downward => "Draw a straight line from top to bottom",
            Direction::Upward => "Draw a straight line from bottom to top",
            Direction::UpwardSlope => "Draw a slanted line going up and to the right",
            Direction::Clockwise => "Follow the target stroke shown in light blue",
        }
    }
}

/// Minimum start-to-end length when a descriptor or curriculum entry names none
pub const DEFAULT_MIN_LENGTH: f64 = 70.0;

pub(crate) fn default_min_length() -> f64 {
    DEFAULT_MIN_LENGTH
}

/// Reference geometry a drawn stroke is graded against
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedStrokeDescriptor {
    pub direction: Direction,
    #[serde(default = "default_min_length")]
    pub min_length: f64,
    pub stroke_kind: StrokeKind,
}

impl ExpectedStrokeDescriptor {
    pub fn new(direction: Direction, min_length: f64, stroke_kind: StrokeKind) -> Self {
        Self {
            direction,
            min_length,
            stroke_kind,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackCode {
    /// direction and length both met
    GoodDirection,
    /// direction met, stroke too short for the symbol
    NeedsLength,
    /// long enough, wrong direction
    NeedsDirection,
    /// neither check met
    TryAgain,
    /// fewer than two points
    TooShort,
}

impl FeedbackCode {
    pub fn hint(&self, direction: Direction) -> String {
        match self {
            FeedbackCode::TooShort => {
                "Stroke too short. Try a longer, more confident stroke.".to_string()
            }
            FeedbackCode::GoodDirection | FeedbackCode::NeedsLength => {
                let praise = match direction {
                    Direction::Downward => "Good downward stroke direction!",
                    Direction::Upward => "Excellent upward stroke!",
                    Direction::UpwardSlope => "Nice upward slope!",
                    Direction::Clockwise => "Good stroke direction!",
                };
                if *self == FeedbackCode::NeedsLength {
                    format!("{praise} Make the stroke a little longer.")
                } else {
                    praise.to_string()
                }
            }
            FeedbackCode::NeedsDirection | FeedbackCode::TryAgain => {
                format!("Try to follow the {direction} direction more closely.")
            }
        }
    }
}

/// Banner colour bucket for a score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

impl Severity {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => Severity::Success,
            60..=79 => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub score: u8,
    pub passed: bool,
    pub feedback_code: FeedbackCode,
    pub timestamp: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    pub direction_threshold: f64,
    pub slope_threshold_x: f64,
    pub slope_threshold_y: f64,
    pub pass_threshold: u8,
    pub too_short_score: u8,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            direction_threshold: 30.0,
            slope_threshold_x: 20.0,
            slope_threshold_y: 20.0,
            pass_threshold: 80,
            too_short_score: 20,
        }
    }
}

/// Gross-displacement stroke grader.
///
/// Only the first and last points are looked at; path shape, curvature and
/// intermediate points are ignored, so `clockwise` strokes never earn the
/// direction bonus.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Grades `stroke`; the result is stamped with the stroke's finish time
    pub fn evaluate(&self, stroke: &Stroke, expected: &ExpectedStrokeDescriptor) -> EvaluationResult {
        if stroke.points().len() < 2 {
            return EvaluationResult {
                score: self.config.too_short_score.min(100),
                passed: false,
                feedback_code: FeedbackCode::TooShort,
                timestamp: stroke.created_at(),
            };
        }

        let (dx, dy) = stroke.displacement();
        let length = (dx * dx + dy * dy).sqrt();

        let direction_ok = self.direction_matches(expected.direction, dx, dy);
        let length_ok = length > expected.min_length;

        let mut score = BASE_SCORE;
        if direction_ok {
            score += DIRECTION_BONUS;
        }
        if length_ok {
            score += LENGTH_BONUS;
        }
        let score = score.clamp(0, 100) as u8;

        let feedback_code = match (direction_ok, length_ok) {
            (true, true) => FeedbackCode::GoodDirection,
            (true, false) => FeedbackCode::NeedsLength,
            (false, true) => FeedbackCode::NeedsDirection,
            (false, false) => FeedbackCode::TryAgain,
        };

        debug!(
            "evaluated {} against {}: d=({:.1},{:.1}) len={:.1} score={}",
            stroke.id(),
            expected.direction,
            dx,
            dy,
            length,
            score
        );

        EvaluationResult {
            score,
            passed: score >= self.config.pass_threshold,
            feedback_code,
            timestamp: stroke.created_at(),
        }
    }

    pub fn direction_matches(&self, direction: Direction, dx: f64, dy: f64) -> bool {
        let c = &self.config;
        match direction {
            Direction::Downward => dy > c.direction_threshold,
            Direction::Upward => dy < -c.direction_threshold,
            Direction::UpwardSlope => dy < -c.slope_threshold_y && dx > c.slope_threshold_x,
            Direction::Clockwise => false,
        }
    }
}

/// Grades with the default thresholds
pub fn evaluate(stroke: &Stroke, expected: &ExpectedStrokeDescriptor) -> EvaluationResult {
    Evaluator::default().evaluate(stroke, expected)
}
