use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::stroke::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Raw pointer or touch sample from the host UI
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub timestamp: i64,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64, timestamp: i64) -> Self {
        Self {
            x,
            y,
            timestamp,
            phase: PointerPhase::Down,
        }
    }

    pub fn moved(x: f64, y: f64, timestamp: i64) -> Self {
        Self {
            x,
            y,
            timestamp,
            phase: PointerPhase::Move,
        }
    }

    pub fn up(x: f64, y: f64, timestamp: i64) -> Self {
        Self {
            x,
            y,
            timestamp,
            phase: PointerPhase::Up,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y, self.timestamp)
    }
}

/// Unified event type consumed by the surface runner
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceEvent {
    Pointer(PointerEvent),
    /// a tick interval passed with no pointer input; expires stale strokes
    Tick,
}

/// Source of pointer events
pub trait PointerEventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<PointerEvent, RecvTimeoutError>;
}

/// Events pushed by the host over a channel
pub struct ChannelEventSource {
    rx: Receiver<PointerEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<PointerEvent>) -> Self {
        Self { rx }
    }
}

impl PointerEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PointerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Advances a surface one event/tick at a time
pub struct Runner<E: PointerEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: PointerEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> SurfaceEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => SurfaceEvent::Pointer(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                SurfaceEvent::Tick
            }
        }
    }
}
