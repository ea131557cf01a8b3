use quest_core::fixtures;
use quest_core::model::{Course, Quiz};
use quest_core::{AnswerFeedback, CurrentQuestion, QuizEngine, QuizError, QuizOutcome, QuizProgress};
use tracing::{debug, info};

use crate::error::QuizRunError;

/// Outcome of a finished quiz and the course it advanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCompletion {
    pub outcome: QuizOutcome,
    pub course: Option<Course>,
}

/// One quiz attempt tied to the course it belongs to.
#[derive(Debug, Clone)]
pub struct QuizRunner {
    engine: QuizEngine,
    course: Option<Course>,
}

impl QuizRunner {
    /// Start `quiz`, crediting `course` on completion.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidQuiz` for an unusable quiz.
    pub fn start(quiz: Quiz, course: Option<Course>) -> Result<Self, QuizError> {
        debug!(course_id = %quiz.course_id, questions = quiz.len(), "starting quiz");
        Ok(Self {
            engine: QuizEngine::started(quiz)?,
            course,
        })
    }

    /// Start the demo quiz for `course_id` against `courses`.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::NotFound` if the course has no demo quiz.
    pub fn start_demo(course_id: &str, courses: &[Course]) -> Result<Self, QuizRunError> {
        let quiz = fixtures::demo_quiz_for(course_id)
            .ok_or_else(|| QuizRunError::NotFound(course_id.to_owned()))?;
        let course = courses.iter().find(|c| c.id == course_id).cloned();
        Ok(Self::start(quiz, course)?)
    }

    /// # Errors
    ///
    /// See [`QuizEngine::current_question`].
    pub fn current(&self) -> Result<CurrentQuestion<'_>, QuizError> {
        self.engine.current_question()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.engine.progress()
    }

    /// # Errors
    ///
    /// See [`QuizEngine::submit_answer`].
    pub fn answer(&mut self, option: usize) -> Result<AnswerFeedback, QuizError> {
        let feedback = self.engine.submit_answer(option)?;
        debug!(
            option,
            correct = feedback.is_correct,
            newly_locked = feedback.newly_locked,
            score = self.engine.score(),
            "answer submitted"
        );
        Ok(feedback)
    }

    /// # Errors
    ///
    /// See [`QuizEngine::advance`].
    pub fn next(&mut self) -> Result<(), QuizError> {
        self.engine.advance()
    }

    /// Tally the attempt and credit the course.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` if the attempt is not completed.
    pub fn finish(self) -> Result<QuizCompletion, QuizError> {
        let outcome = self.engine.outcome().ok_or(QuizError::InvalidState)?;
        let course = self.course.map(|mut course| {
            course.record_quiz_completion();
            course
        });
        info!(
            score = outcome.score,
            total = outcome.total,
            percentage = outcome.percentage,
            "quiz completed"
        );
        Ok(QuizCompletion { outcome, course })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::fixtures::demo_courses;

    #[test]
    fn demo_quiz_credits_course_on_finish() {
        let courses = demo_courses();
        let mut runner = QuizRunner::start_demo("irrigation_mastery", &courses).unwrap();

        while let CurrentQuestion::Active { question, .. } = runner.current().unwrap() {
            let correct = question.correct;
            runner.answer(correct).unwrap();
            runner.next().unwrap();
        }

        let completion = runner.finish().unwrap();
        assert_eq!(completion.outcome.score, 2);
        assert_eq!(completion.outcome.percentage, 100);
        let course = completion.course.unwrap();
        assert_eq!(course.progress, 90);
        assert_eq!(course.completed, 6);
    }

    #[test]
    fn finishing_early_is_rejected() {
        let runner = QuizRunner::start_demo("irrigation_mastery", &demo_courses()).unwrap();
        assert_eq!(runner.finish().unwrap_err(), QuizError::InvalidState);
    }

    #[test]
    fn unknown_course_has_no_demo_quiz() {
        let err = QuizRunner::start_demo("soil_health", &demo_courses()).unwrap_err();
        assert!(matches!(err, QuizRunError::NotFound(id) if id == "soil_health"));
    }
}
