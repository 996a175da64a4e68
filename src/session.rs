use crate::evaluator::EvaluationResult;
use crate::time_series::ScorePoint;
use crate::transcript::TranscriptComparison;
use crate::util::{mean, percent, std_dev};
use log::info;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Stroke(EvaluationResult),
    Transcript(TranscriptComparison),
}

/// One graded try at a practice item, reduced to `{score, passed}`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attempt {
    pub at: i64,
    pub outcome: AttemptOutcome,
}

impl Attempt {
    /// Stroke attempts carry the evaluation's own timestamp
    pub fn stroke(result: EvaluationResult) -> Self {
        Self {
            at: result.timestamp,
            outcome: AttemptOutcome::Stroke(result),
        }
    }

    pub fn transcript(comparison: TranscriptComparison, at: i64) -> Self {
        Self {
            at,
            outcome: AttemptOutcome::Transcript(comparison),
        }
    }

    pub fn score(&self) -> u8 {
        match &self.outcome {
            AttemptOutcome::Stroke(r) => r.score,
            AttemptOutcome::Transcript(c) => c.score(),
        }
    }

    pub fn passed(&self) -> bool {
        match &self.outcome {
            AttemptOutcome::Stroke(r) => r.passed,
            AttemptOutcome::Transcript(c) => c.passed,
        }
    }
}

impl From<EvaluationResult> for Attempt {
    fn from(result: EvaluationResult) -> Self {
        Attempt::stroke(result)
    }
}

/// Running record of every attempt at one practice item
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionAttemptLog {
    item_id: String,
    attempts: Vec<Attempt>,
    best_score: u8,
    first_passed_at: Option<i64>,
}

impl SessionAttemptLog {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            attempts: Vec::new(),
            best_score: 0,
            first_passed_at: None,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn best_score(&self) -> u8 {
        self.best_score
    }

    pub fn first_passed_at(&self) -> Option<i64> {
        self.first_passed_at
    }

    pub fn has_passed(&self) -> bool {
        self.first_passed_at.is_some()
    }

    pub fn latest(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// Appends an attempt and refreshes the cached best score and first pass
    pub fn record(&mut self, attempt: impl Into<Attempt>) -> &Self {
        let attempt = attempt.into();
        self.best_score = self.best_score.max(attempt.score());
        if self.first_passed_at.is_none() && attempt.passed() {
            info!(
                "{} passed on attempt {} with {}",
                self.item_id,
                self.attempts.len() + 1,
                attempt.score()
            );
            self.first_passed_at = Some(attempt.at);
        }
        self.attempts.push(attempt);
        self
    }

    pub fn score_series(&self) -> Vec<ScorePoint> {
        self.attempts
            .iter()
            .enumerate()
            .map(|(i, a)| ScorePoint::new(i + 1, a.score()))
            .collect()
    }

    pub fn summary(&self) -> AttemptSummary {
        let scores: Vec<f64> = self.attempts.iter().map(|a| f64::from(a.score())).collect();
        let passes = self.attempts.iter().filter(|a| a.passed()).count();

        AttemptSummary {
            attempts: self.attempts.len(),
            best_score: self.best_score,
            latest_score: self.latest().map(Attempt::score),
            mean_score: mean(&scores).unwrap_or(0.0),
            std_dev: std_dev(&scores).unwrap_or(0.0),
            pass_rate: percent(passes, scores.len()),
            first_passed_at: self.first_passed_at,
        }
    }
}

/// Appends `attempt` to `log` and hands the log back
pub fn record_attempt(mut log: SessionAttemptLog, attempt: impl Into<Attempt>) -> SessionAttemptLog {
    log.record(attempt);
    log
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttemptSummary {
    pub attempts: usize,
    pub best_score: u8,
    pub latest_score: Option<u8>,
    pub mean_score: f64,
    pub std_dev: f64,
    pub pass_rate: f64,
    pub first_passed_at: Option<i64>,
}
