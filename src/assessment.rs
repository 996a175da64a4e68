use crate::evaluator::{EvaluationResult, Evaluator, ExpectedStrokeDescriptor};
use crate::stroke::Stroke;
use crate::transcript::{normalize_words, Comparator, TranscriptComparison};
use crate::util::mean;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    ShorthandWriting,
    Identification,
    Dictation,
}

/// One assessment item; each kind carries what its grader needs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice {
        prompt: String,
        options: Vec<String>,
        correct: usize,
    },
    ShorthandWriting {
        prompt: String,
        symbol_id: String,
        expected: ExpectedStrokeDescriptor,
    },
    Identification {
        prompt: String,
        answer: String,
        #[serde(default)]
        also_accepted: Vec<String>,
    },
    Dictation {
        prompt: String,
        reference: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Choice(usize),
    Stroke(Stroke),
    Text(String),
}

impl Answer {
    fn describe(&self) -> &'static str {
        match self {
            Answer::Choice(_) => "choice",
            Answer::Stroke(_) => "stroke",
            Answer::Text(_) => "text",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("{kind} question cannot be answered with a {answer}")]
    AnswerMismatch {
        kind: QuestionKind,
        answer: &'static str,
    },
    #[error("expected {expected} answers, got {got}")]
    AnswerCount { expected: usize, got: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradeDetail {
    Choice { chosen: usize, correct: usize },
    Stroke(EvaluationResult),
    Identification { given: String },
    Dictation(TranscriptComparison),
}

/// Common shape every question kind grades into
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grade {
    pub score: u8,
    pub passed: bool,
    pub detail: GradeDetail,
}

/// Scorers shared by every question in a sitting
#[derive(Clone, Copy, Debug, Default)]
pub struct Graders {
    pub evaluator: Evaluator,
    pub comparator: Comparator,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Question::ShorthandWriting { .. } => QuestionKind::ShorthandWriting,
            Question::Identification { .. } => QuestionKind::Identification,
            Question::Dictation { .. } => QuestionKind::Dictation,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Question::MultipleChoice { prompt, .. }
            | Question::ShorthandWriting { prompt, .. }
            | Question::Identification { prompt, .. }
            | Question::Dictation { prompt, .. } => prompt,
        }
    }

    pub fn grade(&self, answer: &Answer, graders: &Graders) -> Result<Grade, AssessmentError> {
        match (self, answer) {
            (Question::MultipleChoice { correct, .. }, Answer::Choice(chosen)) => {
                Ok(grade_choice(*correct, *chosen))
            }
            (Question::ShorthandWriting { expected, .. }, Answer::Stroke(stroke)) => {
                Ok(grade_writing(&graders.evaluator, stroke, expected))
            }
            (
                Question::Identification {
                    answer: expected,
                    also_accepted,
                    ..
                },
                Answer::Text(given),
            ) => Ok(grade_identification(expected, also_accepted, given)),
            (Question::Dictation { reference, .. }, Answer::Text(given)) => {
                Ok(grade_dictation(&graders.comparator, reference, given))
            }
            _ => Err(AssessmentError::AnswerMismatch {
                kind: self.kind(),
                answer: answer.describe(),
            }),
        }
    }
}

fn grade_choice(correct: usize, chosen: usize) -> Grade {
    let passed = correct == chosen;
    Grade {
        score: if passed { 100 } else { 0 },
        passed,
        detail: GradeDetail::Choice { chosen, correct },
    }
}

fn grade_writing(evaluator: &Evaluator, stroke: &Stroke, expected: &ExpectedStrokeDescriptor) -> Grade {
    let result = evaluator.evaluate(stroke, expected);
    Grade {
        score: result.score,
        passed: result.passed,
        detail: GradeDetail::Stroke(result),
    }
}

/// Exact match after the same normalisation dictation uses
fn grade_identification(expected: &str, also_accepted: &[String], given: &str) -> Grade {
    let given_words = normalize_words(given);
    let passed = !given_words.is_empty()
        && std::iter::once(expected)
            .chain(also_accepted.iter().map(String::as_str))
            .any(|candidate| normalize_words(candidate) == given_words);
    Grade {
        score: if passed { 100 } else { 0 },
        passed,
        detail: GradeDetail::Identification {
            given: given.to_string(),
        },
    }
}

fn grade_dictation(comparator: &Comparator, reference: &str, given: &str) -> Grade {
    let comparison = comparator.compare(reference, given);
    Grade {
        score: comparison.score(),
        passed: comparison.passed,
        detail: GradeDetail::Dictation(comparison),
    }
}

/// A graded sitting. Retry limits are left to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub title: String,
    pub passing_score: u8,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub assessment_id: String,
    pub grades: Vec<Grade>,
    pub score: u8,
    pub passed: bool,
}

impl Assessment {
    /// Grades answers positionally; the overall score is the rounded mean
    pub fn grade(&self, answers: &[Answer], graders: &Graders) -> Result<AssessmentReport, AssessmentError> {
        if answers.len() != self.questions.len() {
            return Err(AssessmentError::AnswerCount {
                expected: self.questions.len(),
                got: answers.len(),
            });
        }

        let grades = self
            .questions
            .iter()
            .zip(answers)
            .map(|(q, a)| q.grade(a, graders))
            .collect::<Result<Vec<_>, _>>()?;

        let scores: Vec<f64> = grades.iter().map(|g| f64::from(g.score)).collect();
        let score = mean(&scores).unwrap_or(0.0).round() as u8;

        Ok(AssessmentReport {
            assessment_id: self.id.clone(),
            grades,
            score,
            passed: score >= self.passing_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Direction, FeedbackCode};
    use crate::stroke::{Point, StrokeKind};
    use assert_matches::assert_matches;

    fn downward_stroke() -> Stroke {
        Stroke::from_points(
            "s",
            vec![Point::new(50.0, 20.0, 0), Point::new(50.0, 120.0, 80)],
            2.0,
            StrokeKind::Light,
            3,
        )
        .unwrap()
    }

    fn writing() -> Question {
        Question::ShorthandWriting {
            prompt: "Write P".into(),
            symbol_id: "P".into(),
            expected: ExpectedStrokeDescriptor::new(Direction::Downward, 70.0, StrokeKind::Light),
        }
    }

    #[test]
    fn multiple_choice_is_all_or_nothing() {
        let q = Question::MultipleChoice {
            prompt: "Which stroke is heavy?".into(),
            options: vec!["P".into(), "B".into()],
            correct: 1,
        };
        let g = Graders::default();
        assert_eq!(q.grade(&Answer::Choice(1), &g).unwrap().score, 100);
        assert!(!q.grade(&Answer::Choice(0), &g).unwrap().passed);
    }

    #[test]
    fn writing_uses_stroke_evaluator() {
        let grade = writing()
            .grade(&Answer::Stroke(downward_stroke()), &Graders::default())
            .unwrap();
        assert_eq!(grade.score, 100);
        assert_matches!(
            grade.detail,
            GradeDetail::Stroke(EvaluationResult {
                feedback_code: FeedbackCode::GoodDirection,
                ..
            })
        );
    }

    #[test]
    fn identification_normalises_and_accepts_alternates() {
        let q = Question::Identification {
            prompt: "Name this outline".into(),
            answer: "Chay".into(),
            also_accepted: vec!["ch".into()],
        };
        let g = Graders::default();
        assert!(q.grade(&Answer::Text("chay!".into()), &g).unwrap().passed);
        assert!(q.grade(&Answer::Text("CH".into()), &g).unwrap().passed);
        assert!(!q.grade(&Answer::Text("jay".into()), &g).unwrap().passed);
        assert!(!q.grade(&Answer::Text("  ".into()), &g).unwrap().passed);
    }

    #[test]
    fn dictation_uses_comparator() {
        let q = Question::Dictation {
            prompt: "Transcribe".into(),
            reference: "the cat sat".into(),
        };
        let grade = q.grade(&Answer::Text("teh cat".into()), &Graders::default()).unwrap();
        assert_eq!(grade.score, 33);
        assert!(!grade.passed);
    }

    #[test]
    fn wrong_answer_kind_is_an_error() {
        assert_matches!(
            writing().grade(&Answer::Choice(0), &Graders::default()),
            Err(AssessmentError::AnswerMismatch {
                kind: QuestionKind::ShorthandWriting,
                answer: "choice"
            })
        );
    }

    #[test]
    fn assessment_averages_grades() {
        let assessment = Assessment {
            id: "module_a_assessment".into(),
            title: "Module A".into(),
            passing_score: 70,
            questions: vec![
                writing(),
                Question::Dictation {
                    prompt: "Transcribe".into(),
                    reference: "the cat sat".into(),
                },
            ],
        };
        let report = assessment
            .grade(
                &[
                    Answer::Stroke(downward_stroke()),
                    Answer::Text("the cat".into()),
                ],
                &Graders::default(),
            )
            .unwrap();
        // (100 + 67) / 2
        assert_eq!(report.score, 84);
        assert!(report.passed);
    }

    #[test]
    fn answer_count_must_match() {
        let assessment = Assessment {
            id: "a".into(),
            title: "A".into(),
            passing_score: 70,
            questions: vec![writing()],
        };
        assert_matches!(
            assessment.grade(&[], &Graders::default()),
            Err(AssessmentError::AnswerCount { expected: 1, got: 0 })
        );
    }

    #[test]
    fn questions_deserialize_by_kind_tag() {
        let q: Question = serde_json::from_str(
            r#"{"kind":"shorthand_writing","prompt":"Write T","symbol_id":"T",
                "expected":{"direction":"upward","stroke_kind":"light"}}"#,
        )
        .unwrap();
        assert_eq!(q.kind(), QuestionKind::ShorthandWriting);
        assert_eq!(q.prompt(), "Write T");
    }
}
