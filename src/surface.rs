use crate::clock::Clock;
use crate::config::Config;
use crate::evaluator::{EvaluationResult, Evaluator, ExpectedStrokeDescriptor};
use crate::history::{CanvasHistory, CanvasSize, CanvasState};
use crate::runtime::{PointerEvent, PointerPhase, SurfaceEvent};
use crate::session::SessionAttemptLog;
use crate::stroke::{RecorderError, StrokeHandle, StrokeKind, StrokeRecorder};
use log::{debug, warn};

/// Idle ticks an open stroke survives before it is dropped
pub const DEFAULT_STALE_TICKS: u32 = 30;

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceUpdate {
    StrokeStarted,
    StrokeExtended,
    StrokeCompleted {
        stroke_id: String,
        evaluation: Option<EvaluationResult>,
    },
    /// open stroke dropped after its pointer went quiet, e.g. a release
    /// outside the surface that never reached it
    StrokeAbandoned(StrokeHandle),
    /// moves and releases with no stroke open, and uneventful ticks
    Ignored,
}

struct Target {
    expected: ExpectedStrokeDescriptor,
    log: SessionAttemptLog,
}

/// One drawing surface: records gestures, keeps undo history and grades
/// finished strokes against the current practice target.
pub struct PracticeSurface<C: Clock> {
    recorder: StrokeRecorder<C>,
    history: CanvasHistory,
    evaluator: Evaluator,
    target: Option<Target>,
    stale_after_ticks: u32,
    idle_ticks: u32,
}

impl<C: Clock> PracticeSurface<C> {
    pub fn new(clock: C, canvas_size: CanvasSize) -> Self {
        Self {
            recorder: StrokeRecorder::new(clock),
            history: CanvasHistory::new(canvas_size),
            evaluator: Evaluator::default(),
            target: None,
            stale_after_ticks: DEFAULT_STALE_TICKS,
            idle_ticks: 0,
        }
    }

    pub fn from_config(clock: C, config: &Config) -> Self {
        let recorder = StrokeRecorder::new(clock)
            .with_pen(config.default_stroke_width, StrokeKind::Light)
            .with_dedupe(config.dedupe_zero_delta);
        Self {
            recorder,
            history: CanvasHistory::new(config.canvas_size()),
            evaluator: config.evaluator(),
            target: None,
            stale_after_ticks: config.stale_stroke_ticks,
            idle_ticks: 0,
        }
    }

    /// Ticks without pointer input before an open stroke is dropped; 0 never drops
    pub fn with_stale_after(mut self, ticks: u32) -> Self {
        self.stale_after_ticks = ticks;
        self
    }

    /// Grades subsequent strokes against `expected`, logging under `item_id`
    pub fn set_target(&mut self, item_id: impl Into<String>, expected: ExpectedStrokeDescriptor) {
        self.recorder
            .set_pen(expected.stroke_kind.pen_width(), expected.stroke_kind);
        self.target = Some(Target {
            expected,
            log: SessionAttemptLog::new(item_id),
        });
    }

    /// Stops grading and hands back the attempt log
    pub fn take_log(&mut self) -> Option<SessionAttemptLog> {
        self.target.take().map(|t| t.log)
    }

    pub fn log(&self) -> Option<&SessionAttemptLog> {
        self.target.as_ref().map(|t| &t.log)
    }

    pub fn canvas(&self) -> &CanvasState {
        self.history.current()
    }

    pub fn history(&self) -> &CanvasHistory {
        &self.history
    }

    pub fn recorder(&self) -> &StrokeRecorder<C> {
        &self.recorder
    }

    /// Feeds one runner step to the surface
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<SurfaceUpdate, RecorderError> {
        match event {
            SurfaceEvent::Pointer(ev) => self.handle(ev),
            SurfaceEvent::Tick => Ok(self.tick()),
        }
    }

    /// Counts an idle tick against the open stroke, dropping it once stale
    pub fn tick(&mut self) -> SurfaceUpdate {
        let Some(handle) = self.recorder.active_handle() else {
            return SurfaceUpdate::Ignored;
        };
        self.idle_ticks += 1;
        if self.stale_after_ticks == 0 || self.idle_ticks < self.stale_after_ticks {
            return SurfaceUpdate::Ignored;
        }
        warn!("dropping stroke {} after {} idle ticks", handle, self.idle_ticks);
        self.recorder.cancel();
        self.idle_ticks = 0;
        SurfaceUpdate::StrokeAbandoned(handle)
    }

    pub fn handle(&mut self, event: PointerEvent) -> Result<SurfaceUpdate, RecorderError> {
        self.idle_ticks = 0;
        match event.phase {
            PointerPhase::Down => {
                self.recorder.begin_stroke(event.point())?;
                Ok(SurfaceUpdate::StrokeStarted)
            }
            PointerPhase::Move => match self.recorder.active_handle() {
                Some(handle) => {
                    self.recorder.extend_stroke(handle, event.point())?;
                    Ok(SurfaceUpdate::StrokeExtended)
                }
                None => Ok(SurfaceUpdate::Ignored),
            },
            PointerPhase::Up => match self.recorder.active_handle() {
                Some(handle) => {
                    self.recorder.extend_stroke(handle, event.point())?;
                    let stroke = self.recorder.end_stroke(handle)?;
                    let stroke_id = stroke.id().to_string();

                    let evaluation = self.target.as_mut().map(|target| {
                        let result = self.evaluator.evaluate(&stroke, &target.expected);
                        target.log.record(result);
                        result
                    });

                    self.history.append(stroke);
                    debug!(
                        "canvas now holds {} strokes",
                        self.history.current().stroke_count()
                    );
                    Ok(SurfaceUpdate::StrokeCompleted {
                        stroke_id,
                        evaluation,
                    })
                }
                None => Ok(SurfaceUpdate::Ignored),
            },
        }
    }

    pub fn undo(&mut self) -> &CanvasState {
        self.history.undo()
    }

    pub fn redo(&mut self) -> &CanvasState {
        self.history.redo()
    }

    /// Clears the canvas and drops any half-drawn stroke
    pub fn clear(&mut self) -> &CanvasState {
        self.recorder.cancel();
        self.idle_ticks = 0;
        self.history.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::evaluator::{Direction, FeedbackCode};
    use assert_matches::assert_matches;

    fn surface() -> PracticeSurface<ManualClock> {
        PracticeSurface::new(ManualClock::new(100), CanvasSize::new(300.0, 200.0))
    }

    fn draw(surface: &mut PracticeSurface<ManualClock>, from: (f64, f64), to: (f64, f64)) -> SurfaceUpdate {
        surface.handle(PointerEvent::down(from.0, from.1, 0)).unwrap();
        surface
            .handle(PointerEvent::moved((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0, 50))
            .unwrap();
        surface.handle(PointerEvent::up(to.0, to.1, 100)).unwrap()
    }

    #[test]
    fn gesture_lands_on_canvas() {
        let mut s = surface();
        let update = draw(&mut s, (50.0, 20.0), (50.0, 80.0));
        assert_matches!(update, SurfaceUpdate::StrokeCompleted { evaluation: None, .. });
        assert_eq!(s.canvas().stroke_count(), 1);
        assert_eq!(s.canvas().strokes[0].points().len(), 3);
    }

    #[test]
    fn target_grades_and_logs_strokes() {
        let mut s = surface();
        s.set_target(
            "P",
            ExpectedStrokeDescriptor::new(Direction::Downward, 70.0, StrokeKind::Light),
        );
        let update = draw(&mut s, (150.0, 50.0), (150.0, 150.0));
        match update {
            SurfaceUpdate::StrokeCompleted {
                evaluation: Some(result),
                ..
            } => {
                assert_eq!(result.score, 100);
                assert_eq!(result.feedback_code, FeedbackCode::GoodDirection);
                assert_eq!(result.timestamp, 100);
            }
            other => panic!("unexpected {:?}", other),
        }
        let log = s.take_log().unwrap();
        assert_eq!(log.best_score(), 100);
        assert_eq!(log.first_passed_at(), Some(100));
        assert!(s.log().is_none());
    }

    #[test]
    fn heavy_target_switches_pen() {
        let mut s = surface();
        s.set_target(
            "B",
            ExpectedStrokeDescriptor::new(Direction::Downward, 70.0, StrokeKind::Heavy),
        );
        draw(&mut s, (0.0, 0.0), (0.0, 100.0));
        assert_eq!(s.canvas().strokes[0].kind(), StrokeKind::Heavy);
        assert_eq!(s.canvas().strokes[0].stroke_width(), 6.0);
    }

    #[test]
    fn second_down_is_rejected() {
        let mut s = surface();
        s.handle(PointerEvent::down(0.0, 0.0, 0)).unwrap();
        assert_matches!(
            s.handle(PointerEvent::down(5.0, 5.0, 1)),
            Err(RecorderError::StrokeInProgress(_))
        );
    }

    #[test]
    fn hover_and_stray_release_are_ignored() {
        let mut s = surface();
        assert_eq!(
            s.handle(PointerEvent::moved(1.0, 1.0, 0)).unwrap(),
            SurfaceUpdate::Ignored
        );
        assert_eq!(
            s.handle(PointerEvent::up(1.0, 1.0, 0)).unwrap(),
            SurfaceUpdate::Ignored
        );
        assert!(s.canvas().is_empty());
    }

    #[test]
    fn tap_scores_too_short() {
        let mut s = surface();
        s.set_target(
            "P",
            ExpectedStrokeDescriptor::new(Direction::Downward, 70.0, StrokeKind::Light),
        );
        s.handle(PointerEvent::down(10.0, 10.0, 0)).unwrap();
        let update = s.handle(PointerEvent::up(10.0, 10.0, 5)).unwrap();
        assert_matches!(
            update,
            SurfaceUpdate::StrokeCompleted {
                evaluation: Some(EvaluationResult {
                    feedback_code: FeedbackCode::TooShort,
                    passed: false,
                    ..
                }),
                ..
            }
        );
    }

    #[test]
    fn quiet_open_stroke_is_abandoned() {
        let mut s = surface().with_stale_after(3);
        s.handle(PointerEvent::down(0.0, 0.0, 0)).unwrap();
        let handle = s.recorder().active_handle().unwrap();

        assert_eq!(s.handle_event(SurfaceEvent::Tick).unwrap(), SurfaceUpdate::Ignored);
        assert_eq!(s.tick(), SurfaceUpdate::Ignored);
        assert_eq!(s.tick(), SurfaceUpdate::StrokeAbandoned(handle));
        assert!(!s.recorder().is_recording());
        assert!(s.canvas().is_empty());
        // a late release is a stray one now
        assert_eq!(s.handle(PointerEvent::up(0.0, 50.0, 10)).unwrap(), SurfaceUpdate::Ignored);
    }

    #[test]
    fn pointer_input_resets_idle_ticks() {
        let mut s = surface().with_stale_after(2);
        s.handle(PointerEvent::down(0.0, 0.0, 0)).unwrap();
        for t in 1..5 {
            assert_eq!(s.tick(), SurfaceUpdate::Ignored);
            s.handle(PointerEvent::moved(0.0, f64::from(t) * 10.0, i64::from(t))).unwrap();
        }
        assert!(s.recorder().is_recording());
    }

    #[test]
    fn ticks_without_open_stroke_do_nothing() {
        let mut s = surface().with_stale_after(1);
        assert_eq!(s.tick(), SurfaceUpdate::Ignored);
        let mut never = surface().with_stale_after(0);
        never.handle(PointerEvent::down(0.0, 0.0, 0)).unwrap();
        for _ in 0..100 {
            assert_eq!(never.tick(), SurfaceUpdate::Ignored);
        }
    }

    #[test]
    fn clear_drops_open_stroke_and_is_undoable() {
        let mut s = surface();
        draw(&mut s, (0.0, 0.0), (0.0, 100.0));
        s.handle(PointerEvent::down(0.0, 0.0, 200)).unwrap();
        assert!(s.clear().is_empty());
        assert!(!s.recorder().is_recording());
        assert_eq!(s.undo().stroke_count(), 1);
        assert!(s.redo().is_empty());
    }
}
