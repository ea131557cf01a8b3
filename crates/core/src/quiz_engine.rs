//! Question sequencing and scoring for a single quiz attempt.
//!
//! The engine has no knowledge of rendering. Each question carries an explicit
//! lock that is set on the first committed answer, so the score cannot be
//! inflated by answering the same question twice.

use thiserror::Error;

use crate::model::{Question, Quiz};

/// Score at or above which an attempt counts as passed.
pub const PASSING_PERCENTAGE: u32 = 70;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("invalid quiz: {reason}")]
    InvalidQuiz { reason: String },

    #[error("no active question")]
    NoActiveQuestion,

    #[error("quiz is not in progress")]
    InvalidState,

    #[error("option {option} is out of range for a question with {len} options")]
    OptionOutOfRange { option: usize, len: usize },
}

//
// ─── VIEWS ────────────────────────────────────────────────────────────────────
//

/// What the engine currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentQuestion<'a> {
    Active { index: usize, question: &'a Question },
    Completed,
}

/// Result of committing (or re-submitting) an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    /// The committed answer. On a re-submission this is the original answer.
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: String,
    /// `false` when the question was already locked before this call.
    pub newly_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// One-based position of the current question, capped at `total`.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}

/// Final tally of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
}

impl QuizOutcome {
    #[must_use]
    pub fn new(score: u32, total: u32) -> Self {
        Self {
            score,
            total,
            percentage: percentage(score, total),
        }
    }

    #[must_use]
    pub fn is_passing(&self) -> bool {
        self.percentage >= PASSING_PERCENTAGE
    }
}

/// `round(score / total * 100)` with halves rounded up; zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (score, total) = (u64::from(score), u64::from(total));
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── ENGINE ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
enum State {
    NotStarted,
    InProgress(Attempt),
    Completed(Attempt),
}

#[derive(Debug, Clone)]
struct Attempt {
    quiz: Quiz,
    index: usize,
    score: u32,
    /// Committed answer per question; `Some` means locked.
    answers: Vec<Option<usize>>,
}

impl Attempt {
    fn answered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    fn total(&self) -> u32 {
        u32::try_from(self.quiz.len()).unwrap_or(u32::MAX)
    }
}

/// Drives one quiz attempt: `NotStarted → InProgress → Completed`.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    state: State,
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::NotStarted,
        }
    }

    /// Begin an attempt at `quiz`, discarding any previous attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidQuiz` if the quiz has no questions, or a question
    /// has no options or a correct index outside its options.
    pub fn start(&mut self, quiz: Quiz) -> Result<(), QuizError> {
        validate(&quiz)?;
        let answers = vec![None; quiz.len()];
        self.state = State::InProgress(Attempt {
            quiz,
            index: 0,
            score: 0,
            answers,
        });
        Ok(())
    }

    /// Convenience for `new` + `start`.
    ///
    /// # Errors
    ///
    /// See [`QuizEngine::start`].
    pub fn started(quiz: Quiz) -> Result<Self, QuizError> {
        let mut engine = Self::new();
        engine.start(quiz)?;
        Ok(engine)
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` before `start`.
    pub fn current_question(&self) -> Result<CurrentQuestion<'_>, QuizError> {
        match &self.state {
            State::NotStarted => Err(QuizError::NoActiveQuestion),
            State::InProgress(attempt) => Ok(CurrentQuestion::Active {
                index: attempt.index,
                question: &attempt.quiz.questions[attempt.index],
            }),
            State::Completed(_) => Ok(CurrentQuestion::Completed),
        }
    }

    /// Commit `option` as the answer to the current question.
    ///
    /// The first call locks the question and scores it. Later calls on the same
    /// question return the original feedback and leave the score untouched.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` outside an attempt, or
    /// `QuizError::OptionOutOfRange` for an index the question does not have.
    pub fn submit_answer(&mut self, option: usize) -> Result<AnswerFeedback, QuizError> {
        let State::InProgress(attempt) = &mut self.state else {
            return Err(QuizError::NoActiveQuestion);
        };
        let index = attempt.index;
        let question = &attempt.quiz.questions[index];

        if let Some(committed) = attempt.answers[index] {
            return Ok(feedback(question, committed, false));
        }

        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                option,
                len: question.options.len(),
            });
        }

        let result = feedback(question, option, true);
        attempt.answers[index] = Some(option);
        if result.is_correct {
            attempt.score = attempt.score.saturating_add(1);
        }
        Ok(result)
    }

    /// Move to the next question, completing the attempt after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless an attempt is in progress.
    pub fn advance(&mut self) -> Result<(), QuizError> {
        let state = std::mem::replace(&mut self.state, State::NotStarted);
        let State::InProgress(mut attempt) = state else {
            self.state = state;
            return Err(QuizError::InvalidState);
        };

        attempt.index += 1;
        self.state = if attempt.index >= attempt.quiz.len() {
            State::Completed(attempt)
        } else {
            State::InProgress(attempt)
        };
        Ok(())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.state, State::Completed(_))
    }

    /// Whether the current question already has a committed answer.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        match &self.state {
            State::InProgress(attempt) => attempt.answers[attempt.index].is_some(),
            _ => false,
        }
    }

    /// Correct answers so far; zero before `start`.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.attempt().map_or(0, |attempt| attempt.score)
    }

    /// Number of questions; zero before `start`.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.attempt().map_or(0, Attempt::total)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        match &self.state {
            State::NotStarted => QuizProgress {
                position: 0,
                total: 0,
                answered: 0,
                is_complete: false,
            },
            State::InProgress(attempt) | State::Completed(attempt) => QuizProgress {
                position: (attempt.index + 1).min(attempt.quiz.len()),
                total: attempt.quiz.len(),
                answered: attempt.answered(),
                is_complete: self.is_completed(),
            },
        }
    }

    /// Final tally; only available once the attempt is completed.
    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        match &self.state {
            State::Completed(attempt) => Some(QuizOutcome::new(attempt.score, attempt.total())),
            _ => None,
        }
    }

    fn attempt(&self) -> Option<&Attempt> {
        match &self.state {
            State::NotStarted => None,
            State::InProgress(attempt) | State::Completed(attempt) => Some(attempt),
        }
    }
}

fn validate(quiz: &Quiz) -> Result<(), QuizError> {
    if quiz.is_empty() {
        return Err(QuizError::InvalidQuiz {
            reason: "quiz has no questions".into(),
        });
    }
    for (i, question) in quiz.questions.iter().enumerate() {
        if question.options.is_empty() {
            return Err(QuizError::InvalidQuiz {
                reason: format!("question {} has no options", i + 1),
            });
        }
        if question.correct >= question.options.len() {
            return Err(QuizError::InvalidQuiz {
                reason: format!("question {} has an out-of-range correct index", i + 1),
            });
        }
    }
    Ok(())
}

fn feedback(question: &Question, selected: usize, newly_locked: bool) -> AnswerFeedback {
    AnswerFeedback {
        selected,
        correct_index: question.correct,
        is_correct: question.is_correct(selected),
        explanation: question.explanation.clone(),
        newly_locked,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
