// Library surface for the binary, integration tests and host UIs.
pub mod app_dirs;
pub mod assessment;
pub mod clock;
pub mod config;
pub mod curriculum;
pub mod dictation;
pub mod evaluator;
pub mod export;
pub mod history;
pub mod runtime;
pub mod session;
pub mod stroke;
pub mod surface;
pub mod time_series;
pub mod transcript;
pub mod util;

pub use evaluator::{evaluate, EvaluationResult, ExpectedStrokeDescriptor};
pub use history::{CanvasHistory, CanvasState};
pub use session::{record_attempt, SessionAttemptLog};
pub use stroke::{Point, Stroke, StrokeRecorder};
pub use transcript::{compare, TranscriptComparison};
