use crate::session::Attempt;
use crate::transcript::{Comparator, TranscriptComparison};
use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("{0} is not available on this host")]
    Unavailable(&'static str),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Text-to-speech output the host provides
pub trait AudioPlayback {
    fn speak(&mut self, text: &str, rate: f64) -> Result<(), PortError>;
    fn pause(&mut self) -> Result<(), PortError>;
    fn resume(&mut self) -> Result<(), PortError>;
    fn cancel(&mut self);
}

/// Speech-to-text input the host provides
pub trait SpeechRecognizer {
    fn start(&mut self) -> Result<(), PortError>;
    fn stop(&mut self);
    /// Final results produced since the previous call
    fn take_final_results(&mut self) -> Vec<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Finished,
}

/// One dictation passage: playback, transcription capture and scoring.
///
/// Audio and recognition are injected; nothing here touches a global
/// speech engine.
pub struct DictationExercise<A: AudioPlayback, R: SpeechRecognizer> {
    item_id: String,
    reference: String,
    audio: A,
    recognizer: R,
    comparator: Comparator,
    rate: f64,
    state: PlaybackState,
    played_ms: i64,
    resumed_at: Option<i64>,
    recording: bool,
    transcription: String,
}

impl<A: AudioPlayback, R: SpeechRecognizer> DictationExercise<A, R> {
    pub fn new(item_id: impl Into<String>, reference: impl Into<String>, audio: A, recognizer: R) -> Self {
        Self {
            item_id: item_id.into(),
            reference: reference.into(),
            audio,
            recognizer,
            comparator: Comparator::default(),
            rate: 1.0,
            state: PlaybackState::Idle,
            played_ms: 0,
            resumed_at: None,
            recording: false,
            transcription: String::new(),
        }
    }

    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn transcription(&self) -> &str {
        &self.transcription
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Rough speaking time: ten characters per second at rate 1.0
    pub fn estimated_duration_ms(&self) -> i64 {
        (self.reference.chars().count() as f64 / (self.rate * 10.0) * 1000.0).round() as i64
    }

    /// Estimated playback progress as a percentage
    pub fn progress(&self, now_ms: i64) -> f64 {
        if self.state == PlaybackState::Finished {
            return 100.0;
        }
        let played = self.played_ms + self.resumed_at.map_or(0, |t| (now_ms - t).max(0));
        let duration = self.estimated_duration_ms();
        if duration <= 0 {
            return 100.0;
        }
        (played as f64 / duration as f64 * 100.0).min(100.0)
    }

    /// Starts playback, or resumes it when paused
    pub fn play(&mut self, now_ms: i64) -> Result<(), PortError> {
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => {
                self.audio.resume()?;
                self.resumed_at = Some(now_ms);
                self.state = PlaybackState::Playing;
                Ok(())
            }
            PlaybackState::Idle | PlaybackState::Finished => {
                self.audio.speak(&self.reference, self.rate)?;
                self.played_ms = 0;
                self.resumed_at = Some(now_ms);
                self.state = PlaybackState::Playing;
                debug!("playing {} at rate {}", self.item_id, self.rate);
                Ok(())
            }
        }
    }

    pub fn pause(&mut self, now_ms: i64) -> Result<(), PortError> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        self.audio.pause()?;
        if let Some(t) = self.resumed_at.take() {
            self.played_ms += (now_ms - t).max(0);
        }
        self.state = PlaybackState::Paused;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.audio.cancel();
        self.state = PlaybackState::Idle;
        self.played_ms = 0;
        self.resumed_at = None;
    }

    /// The host reports the utterance has ended
    pub fn finish_playback(&mut self) {
        self.state = PlaybackState::Finished;
        self.resumed_at = None;
    }

    /// Changing speed mid-playback stops the current utterance
    pub fn set_rate(&mut self, rate: f64) {
        if rate <= 0.0 {
            warn!("ignoring non-positive playback rate {}", rate);
            return;
        }
        self.rate = rate;
        if self.state == PlaybackState::Playing {
            self.stop();
        }
    }

    pub fn start_recording(&mut self) -> Result<(), PortError> {
        if self.recording {
            return Ok(());
        }
        self.transcription.clear();
        self.recognizer.start()?;
        self.recording = true;
        Ok(())
    }

    pub fn stop_recording(&mut self) {
        if self.recording {
            self.recognizer.stop();
            self.recording = false;
        }
        self.collect_results();
    }

    /// Appends any final recognition results to the transcription
    pub fn collect_results(&mut self) {
        for result in self.recognizer.take_final_results() {
            self.transcription.push_str(&result);
            self.transcription.push(' ');
        }
    }

    /// Replaces the transcription with typed text
    pub fn set_transcription(&mut self, text: impl Into<String>) {
        self.transcription = text.into();
    }

    pub fn compare(&self) -> TranscriptComparison {
        self.comparator.compare(&self.reference, &self.transcription)
    }

    /// Scores the current transcription as an attempt stamped `now_ms`
    pub fn submit(&mut self, now_ms: i64) -> Attempt {
        self.collect_results();
        Attempt::transcript(self.compare(), now_ms)
    }

    pub fn reset(&mut self) {
        self.stop();
        if self.recording {
            self.recognizer.stop();
            self.recording = false;
        }
        self.transcription.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeAudio {
        calls: Vec<String>,
    }

    impl AudioPlayback for FakeAudio {
        fn speak(&mut self, text: &str, rate: f64) -> Result<(), PortError> {
            self.calls.push(format!("speak {rate} {text}"));
            Ok(())
        }
        fn pause(&mut self) -> Result<(), PortError> {
            self.calls.push("pause".into());
            Ok(())
        }
        fn resume(&mut self) -> Result<(), PortError> {
            self.calls.push("resume".into());
            Ok(())
        }
        fn cancel(&mut self) {
            self.calls.push("cancel".into());
        }
    }

    #[derive(Default)]
    struct FakeRecognizer {
        pending: VecDeque<String>,
        running: bool,
    }

    impl SpeechRecognizer for FakeRecognizer {
        fn start(&mut self) -> Result<(), PortError> {
            self.running = true;
            Ok(())
        }
        fn stop(&mut self) {
            self.running = false;
        }
        fn take_final_results(&mut self) -> Vec<String> {
            self.pending.drain(..).collect()
        }
    }

    struct NoSpeech;

    impl SpeechRecognizer for NoSpeech {
        fn start(&mut self) -> Result<(), PortError> {
            Err(PortError::Unavailable("speech recognition"))
        }
        fn stop(&mut self) {}
        fn take_final_results(&mut self) -> Vec<String> {
            Vec::new()
        }
    }

    fn exercise() -> DictationExercise<FakeAudio, FakeRecognizer> {
        DictationExercise::new(
            "reading_practice_1",
            "the cat sat",
            FakeAudio::default(),
            FakeRecognizer::default(),
        )
    }

    #[test]
    fn play_pause_resume_stop() {
        let mut ex = exercise();
        ex.play(0).unwrap();
        assert_eq!(ex.state(), PlaybackState::Playing);
        ex.pause(500).unwrap();
        assert_eq!(ex.state(), PlaybackState::Paused);
        ex.play(900).unwrap();
        ex.stop();
        assert_eq!(ex.state(), PlaybackState::Idle);
        assert_eq!(
            ex.audio().calls,
            vec!["speak 1 the cat sat", "pause", "resume", "cancel"]
        );
    }

    #[test]
    fn progress_excludes_paused_time() {
        let mut ex = exercise();
        // 11 chars at rate 1.0
        assert_eq!(ex.estimated_duration_ms(), 1_100);
        ex.play(0).unwrap();
        ex.pause(550).unwrap();
        assert_eq!(ex.progress(5_000), 50.0);
        ex.play(5_000).unwrap();
        assert_eq!(ex.progress(10_000), 100.0);
    }

    #[test]
    fn rate_change_stops_playback() {
        let mut ex = exercise();
        ex.play(0).unwrap();
        ex.set_rate(2.0);
        assert_eq!(ex.state(), PlaybackState::Idle);
        assert_eq!(ex.estimated_duration_ms(), 550);
        ex.set_rate(0.0);
        assert_eq!(ex.rate(), 2.0);
    }

    #[test]
    fn finished_playback_reports_full_progress() {
        let mut ex = exercise();
        ex.play(0).unwrap();
        ex.finish_playback();
        assert_eq!(ex.progress(1), 100.0);
    }

    #[test]
    fn recognized_speech_is_scored() {
        let mut ex = exercise();
        ex.start_recording().unwrap();
        ex.recognizer.pending.push_back("the cat".into());
        ex.recognizer.pending.push_back("sat".into());
        ex.stop_recording();
        assert_eq!(ex.transcription(), "the cat sat ");

        let attempt = ex.submit(42);
        assert_eq!(attempt.at, 42);
        assert_eq!(attempt.score(), 100);
        assert!(attempt.passed());
    }

    #[test]
    fn typed_transcription_can_be_scored() {
        let mut ex = exercise();
        ex.set_transcription("teh cat");
        assert_eq!(ex.compare().accuracy, 33.0);
        ex.reset();
        assert_eq!(ex.transcription(), "");
        assert_eq!(ex.compare().accuracy, 0.0);
    }

    #[test]
    fn unavailable_recognizer_surfaces_error() {
        let mut ex = DictationExercise::new("x", "the cat", FakeAudio::default(), NoSpeech);
        assert_eq!(
            ex.start_recording(),
            Err(PortError::Unavailable("speech recognition"))
        );
        assert!(!ex.is_recording());
    }
}
