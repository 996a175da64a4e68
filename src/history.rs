use crate::stroke::Stroke;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(600.0, 400.0)
    }
}

/// Strokes on one drawing surface, in drawing order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanvasState {
    pub strokes: Vec<Stroke>,
    pub canvas_size: CanvasSize,
}

impl CanvasState {
    pub fn empty(canvas_size: CanvasSize) -> Self {
        Self {
            strokes: Vec::new(),
            canvas_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }
}

/// Linear undo/redo over canvas snapshots.
///
/// Snapshot 0 is always the empty canvas. Every mutation pushes a fresh
/// snapshot after the cursor and drops whatever redo future was there;
/// snapshots already taken are shared, never edited.
#[derive(Debug, Clone)]
pub struct CanvasHistory {
    snapshots: Vec<Rc<CanvasState>>,
    cursor: usize,
    max_snapshots: Option<usize>,
}

impl CanvasHistory {
    pub fn new(canvas_size: CanvasSize) -> Self {
        Self {
            snapshots: vec![Rc::new(CanvasState::empty(canvas_size))],
            cursor: 0,
            max_snapshots: None,
        }
    }

    /// Cap the number of retained snapshots; the oldest are dropped first
    pub fn with_limit(mut self, max_snapshots: usize) -> Self {
        self.max_snapshots = Some(max_snapshots.max(1));
        self.enforce_limit();
        self
    }

    pub fn current(&self) -> &CanvasState {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn append(&mut self, stroke: Stroke) -> &CanvasState {
        let mut next = CanvasState::clone(self.current());
        next.strokes.push(stroke);
        self.push(next)
    }

    pub fn clear(&mut self) -> &CanvasState {
        let next = CanvasState::empty(self.current().canvas_size);
        self.push(next)
    }

    /// Steps back one snapshot; a no-op at the start of history
    pub fn undo(&mut self) -> &CanvasState {
        if self.can_undo() {
            self.cursor -= 1;
        }
        self.current()
    }

    /// Steps forward one snapshot; a no-op at the end of history
    pub fn redo(&mut self) -> &CanvasState {
        if self.can_redo() {
            self.cursor += 1;
        }
        self.current()
    }

    fn push(&mut self, next: CanvasState) -> &CanvasState {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Rc::new(next));
        self.cursor = self.snapshots.len() - 1;
        self.enforce_limit();
        self.current()
    }

    fn enforce_limit(&mut self) {
        if let Some(max) = self.max_snapshots {
            if self.snapshots.len() > max {
                let excess = self.snapshots.len() - max;
                self.snapshots.drain(..excess);
                self.cursor = self.cursor.saturating_sub(excess);
            }
        }
    }
}

impl Default for CanvasHistory {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}
