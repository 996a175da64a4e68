use serde::Serialize;

/// Score of the n-th attempt (1-based), for progress charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScorePoint {
    pub attempt: usize,
    pub score: u8,
}

impl ScorePoint {
    pub fn new(attempt: usize, score: u8) -> Self {
        Self { attempt, score }
    }
}

impl From<(usize, u8)> for ScorePoint {
    fn from(v: (usize, u8)) -> Self {
        ScorePoint {
            attempt: v.0,
            score: v.1,
        }
    }
}

/// Chart coordinates
impl From<ScorePoint> for (f64, f64) {
    fn from(p: ScorePoint) -> Self {
        (p.attempt as f64, f64::from(p.score))
    }
}
