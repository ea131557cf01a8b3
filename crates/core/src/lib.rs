#![forbid(unsafe_code)]

pub mod fixtures;
pub mod model;
pub mod quiz_engine;

pub use quiz_engine::{
    AnswerFeedback, CurrentQuestion, QuizEngine, QuizError, QuizOutcome, QuizProgress,
};
