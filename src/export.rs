use crate::history::CanvasState;
use crate::session::{AttemptOutcome, SessionAttemptLog};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize)]
struct AttemptRow<'a> {
    item_id: &'a str,
    attempt: usize,
    recorded_at: String,
    kind: &'static str,
    score: u8,
    passed: bool,
    feedback: String,
}

#[derive(Debug, Deserialize)]
struct RecordedRow {
    item_id: String,
}

fn rows(log: &SessionAttemptLog, offset: usize) -> impl Iterator<Item = AttemptRow<'_>> {
    log.attempts().iter().enumerate().map(move |(i, attempt)| {
        let (kind, feedback) = match &attempt.outcome {
            AttemptOutcome::Stroke(r) => ("stroke", r.feedback_code.to_string()),
            AttemptOutcome::Transcript(c) => ("transcript", c.feedback().to_string()),
        };
        AttemptRow {
            item_id: log.item_id(),
            attempt: offset + i + 1,
            recorded_at: format_timestamp(attempt.at),
            kind,
            score: attempt.score(),
            passed: attempt.passed(),
            feedback,
        }
    })
}

fn format_timestamp(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

/// Writes one CSV row per attempt, optionally preceded by a header
pub fn write_attempts_csv<W: Write>(
    log: &SessionAttemptLog,
    writer: W,
    with_header: bool,
) -> Result<(), ExportError> {
    write_rows(log, writer, with_header, 0)
}

fn write_rows<W: Write>(
    log: &SessionAttemptLog,
    writer: W,
    with_header: bool,
    offset: usize,
) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(writer);
    for row in rows(log, offset) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn attempts_to_csv(log: &SessionAttemptLog) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_attempts_csv(log, &mut buf, true)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Number of rows already in an attempts CSV for `item_id`
pub fn recorded_attempts(path: &Path, item_id: &str) -> Result<usize, ExportError> {
    if !path.exists() {
        return Ok(0);
    }
    let mut rdr = csv::Reader::from_path(path)?;
    let mut count = 0;
    for row in rdr.deserialize::<RecordedRow>() {
        if row?.item_id == item_id {
            count += 1;
        }
    }
    Ok(count)
}

/// Appends attempts to a CSV file, emitting the header only for a new file.
/// Attempt numbers continue from the rows already recorded for the item.
pub fn append_attempts_file(log: &SessionAttemptLog, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let needs_header = std::fs::metadata(path).map_or(true, |m| m.len() == 0);
    let offset = recorded_attempts(path, log.item_id())?;
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    write_rows(log, file, needs_header, offset)
}

pub fn log_to_json(log: &SessionAttemptLog) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(log)?)
}

pub fn canvas_to_json(canvas: &CanvasState) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(canvas)?)
}
