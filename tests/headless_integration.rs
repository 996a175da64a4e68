use std::sync::mpsc;
use std::time::Duration;

use quill::clock::ManualClock;
use quill::curriculum::Curriculum;
use quill::export::attempts_to_csv;
use quill::history::CanvasSize;
use quill::runtime::{ChannelEventSource, FixedTicker, PointerEvent, Runner, SurfaceEvent};
use quill::surface::{PracticeSurface, SurfaceUpdate};

// Drives a practice surface through the runner the way a host event loop would.
#[test]
fn headless_practice_flow_grades_and_logs() {
    let mut surface = PracticeSurface::new(ManualClock::new(1_000), CanvasSize::new(300.0, 200.0));
    let expected = Curriculum::builtin().expected("CH").unwrap();
    surface.set_target("CH", expected);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // a too-flat attempt, then a proper upward slope
    for ev in [
        PointerEvent::down(100.0, 150.0, 0),
        PointerEvent::moved(150.0, 145.0, 16),
        PointerEvent::up(200.0, 140.0, 32),
        PointerEvent::down(100.0, 150.0, 100),
        PointerEvent::moved(150.0, 100.0, 116),
        PointerEvent::up(200.0, 50.0, 132),
    ] {
        tx.send(ev).unwrap();
    }

    let mut completed = Vec::new();
    for _ in 0..100u32 {
        let event = runner.step();
        let update = surface.handle_event(event).unwrap();
        if let SurfaceUpdate::StrokeCompleted { evaluation, .. } = update {
            completed.push(evaluation.unwrap());
        }
        if event == SurfaceEvent::Tick {
            break;
        }
    }

    assert_eq!(completed.len(), 2);
    assert_eq!(completed[0].score, 70);
    assert!(!completed[0].passed);
    assert_eq!(completed[1].score, 100);
    assert!(completed[1].passed);

    assert_eq!(surface.canvas().stroke_count(), 2);
    let log = surface.log().unwrap();
    assert_eq!(log.attempt_count(), 2);
    assert_eq!(log.best_score(), 100);
    assert!(log.has_passed());

    let csv = attempts_to_csv(log).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

// The host lost the release (pointer left the window); the runner's ticks drop the stroke.
#[test]
fn headless_lost_release_is_abandoned() {
    let mut surface = PracticeSurface::new(ManualClock::new(0), CanvasSize::default()).with_stale_after(3);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    tx.send(PointerEvent::down(10.0, 10.0, 0)).unwrap();
    tx.send(PointerEvent::moved(10.0, 60.0, 16)).unwrap();

    let mut abandoned = None;
    for _ in 0..20u32 {
        if let SurfaceUpdate::StrokeAbandoned(handle) = surface.handle_event(runner.step()).unwrap() {
            abandoned = Some(handle);
            break;
        }
    }
    assert!(abandoned.is_some());
    assert!(!surface.recorder().is_recording());
    assert!(surface.canvas().is_empty());

    // the next gesture starts cleanly
    tx.send(PointerEvent::down(0.0, 0.0, 100)).unwrap();
    tx.send(PointerEvent::up(0.0, 90.0, 120)).unwrap();
    for _ in 0..2 {
        surface.handle_event(runner.step()).unwrap();
    }
    assert_eq!(surface.canvas().stroke_count(), 1);
}

#[test]
fn headless_undo_after_gestures() {
    let mut surface = PracticeSurface::new(ManualClock::new(0), CanvasSize::default());
    for start in [0.0, 10.0] {
        surface.handle(PointerEvent::down(start, 0.0, 0)).unwrap();
        surface.handle(PointerEvent::up(start, 90.0, 10)).unwrap();
    }
    assert_eq!(surface.undo().stroke_count(), 1);
    assert_eq!(surface.undo().stroke_count(), 0);
    assert_eq!(surface.undo().stroke_count(), 0);
    assert_eq!(surface.redo().stroke_count(), 1);
}
