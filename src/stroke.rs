use crate::clock::{Clock, SystemClock};
use itertools::{Itertools, MinMaxResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// A sampled pointer position. Timestamps are milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub timestamp: i64,
}

impl Point {
    pub fn new(x: f64, y: f64, timestamp: i64) -> Self {
        Self { x, y, timestamp }
    }

    fn same_position(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Pen category a stroke was drawn with; mirrors the curriculum's stroke types
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrokeKind {
    #[default]
    Light,
    Heavy,
    Circle,
    Dot,
}

impl StrokeKind {
    /// Pen width the practice dialog draws this kind with
    pub fn pen_width(&self) -> f64 {
        match self {
            StrokeKind::Heavy => 6.0,
            _ => 3.0,
        }
    }
}

/// Axis aligned bounds of a stroke
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// One finished pointer gesture. Never empty, never mutated after it is built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stroke {
    id: String,
    points: Vec<Point>,
    stroke_width: f64,
    kind: StrokeKind,
    created_at: i64,
}

impl Stroke {
    /// Builds a finished stroke from already captured points.
    /// Returns `None` for an empty point list.
    pub fn from_points(
        id: impl Into<String>,
        points: Vec<Point>,
        stroke_width: f64,
        kind: StrokeKind,
        created_at: i64,
    ) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            points,
            stroke_width,
            kind,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn kind(&self) -> StrokeKind {
        self.kind
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn first(&self) -> &Point {
        &self.points[0]
    }

    pub fn last(&self) -> &Point {
        &self.points[self.points.len() - 1]
    }

    /// Single-point strokes are taps
    pub fn is_tap(&self) -> bool {
        self.points.len() == 1
    }

    /// Start to end displacement `(dx, dy)`; y grows downward
    pub fn displacement(&self) -> (f64, f64) {
        let (first, last) = (self.first(), self.last());
        (last.x - first.x, last.y - first.y)
    }

    /// Straight-line distance between the first and last point
    pub fn chord_length(&self) -> f64 {
        let (dx, dy) = self.displacement();
        (dx * dx + dy * dy).sqrt()
    }

    /// Length of the drawn path along every segment
    pub fn path_length(&self) -> f64 {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt())
            .sum()
    }

    pub fn duration_ms(&self) -> i64 {
        self.last().timestamp - self.first().timestamp
    }

    pub fn bounds(&self) -> Bounds {
        let (min_x, max_x) = min_max(self.points.iter().map(|p| p.x));
        let (min_y, max_y) = min_max(self.points.iter().map(|p| p.y));
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    match values.minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => (0.0, 0.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    }
}

/// Identifies an in-progress stroke; unique across every recorder in the process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StrokeHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

impl StrokeHandle {
    fn next() -> Self {
        StrokeHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StrokeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("stroke {0} is still in progress on this surface")]
    StrokeInProgress(StrokeHandle),
    #[error("stroke handle {0} is not in progress")]
    UnknownHandle(StrokeHandle),
}

#[derive(Debug)]
struct ActiveStroke {
    handle: StrokeHandle,
    points: Vec<Point>,
}

/// Captures one pointer gesture at a time and turns it into a [`Stroke`].
#[derive(Debug)]
pub struct StrokeRecorder<C: Clock = SystemClock> {
    clock: C,
    stroke_width: f64,
    kind: StrokeKind,
    dedupe_zero_delta: bool,
    active: Option<ActiveStroke>,
}

impl Default for StrokeRecorder<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> StrokeRecorder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            stroke_width: 2.0,
            kind: StrokeKind::Light,
            dedupe_zero_delta: true,
            active: None,
        }
    }

    pub fn with_pen(mut self, stroke_width: f64, kind: StrokeKind) -> Self {
        self.set_pen(stroke_width, kind);
        self
    }

    pub fn with_dedupe(mut self, dedupe_zero_delta: bool) -> Self {
        self.dedupe_zero_delta = dedupe_zero_delta;
        self
    }

    /// Pen settings apply to strokes begun after the call
    pub fn set_pen(&mut self, stroke_width: f64, kind: StrokeKind) {
        self.stroke_width = stroke_width;
        self.kind = kind;
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<StrokeHandle> {
        self.active.as_ref().map(|a| a.handle)
    }

    /// Points of the in-progress stroke, for live rendering
    pub fn pending_points(&self) -> &[Point] {
        self.active.as_ref().map_or(&[][..], |a| a.points.as_slice())
    }

    pub fn begin_stroke(&mut self, point: Point) -> Result<StrokeHandle, RecorderError> {
        if let Some(active) = &self.active {
            warn!("begin_stroke while {} is still open", active.handle);
            return Err(RecorderError::StrokeInProgress(active.handle));
        }

        let handle = StrokeHandle::next();
        self.active = Some(ActiveStroke {
            handle,
            points: vec![point],
        });
        Ok(handle)
    }

    pub fn extend_stroke(&mut self, handle: StrokeHandle, point: Point) -> Result<(), RecorderError> {
        let dedupe = self.dedupe_zero_delta;
        let active = self.active_mut(handle)?;

        // a never-empty buffer; begin_stroke seeds it
        let last = active.points[active.points.len() - 1];
        if dedupe && last.same_position(&point) {
            return Ok(());
        }

        // timestamps stay monotonic inside one stroke
        let timestamp = point.timestamp.max(last.timestamp);
        active.points.push(Point { timestamp, ..point });
        Ok(())
    }

    pub fn end_stroke(&mut self, handle: StrokeHandle) -> Result<Stroke, RecorderError> {
        self.active_mut(handle)?;
        let active = match self.active.take() {
            Some(active) => active,
            None => return Err(RecorderError::UnknownHandle(handle)),
        };

        let created_at = self.clock.now_ms();
        let stroke = Stroke {
            id: format!("stroke_{}_{}", created_at, active.handle.0),
            points: active.points,
            stroke_width: self.stroke_width,
            kind: self.kind,
            created_at,
        };
        debug!(
            "finished {} with {} points, chord {:.1}",
            stroke.id,
            stroke.points.len(),
            stroke.chord_length()
        );
        Ok(stroke)
    }

    /// Drops the in-progress stroke, if any, without producing a value
    pub fn cancel(&mut self) -> Option<StrokeHandle> {
        self.active.take().map(|a| a.handle)
    }

    fn active_mut(&mut self, handle: StrokeHandle) -> Result<&mut ActiveStroke, RecorderError> {
        match self.active.as_mut() {
            Some(active) if active.handle == handle => Ok(active),
            _ => {
                warn!("stale stroke handle {}", handle);
                Err(RecorderError::UnknownHandle(handle))
            }
        }
    }
}
