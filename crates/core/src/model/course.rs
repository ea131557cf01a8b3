use serde::{Deserialize, Serialize};

/// Progress gained by completing a course quiz, in percentage points.
pub const QUIZ_PROGRESS_STEP: u8 = 25;

/// A course as shown in the catalog, with the learner's progress through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// Total number of lessons.
    pub lessons: u32,
    /// Lessons completed so far.
    pub completed: u32,
    /// Overall progress, 0..=100.
    pub progress: u8,
}

impl Course {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, lessons: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: String::new(),
            lessons,
            completed: 0,
            progress: 0,
        }
    }

    /// Credit a finished quiz: one more lesson and a fixed progress step, both capped.
    pub fn record_quiz_completion(&mut self) {
        self.progress = self.progress.saturating_add(QUIZ_PROGRESS_STEP).min(100);
        self.completed = self.completed.saturating_add(1).min(self.lessons);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress >= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_completion_caps_progress_and_lessons() {
        let mut course = Course::new("c", "Course", 2);
        course.progress = 90;
        course.completed = 2;

        course.record_quiz_completion();

        assert_eq!(course.progress, 100);
        assert_eq!(course.completed, 2);
        assert!(course.is_finished());
    }

    #[test]
    fn quiz_completion_advances_fresh_course() {
        let mut course = Course::new("c", "Course", 8);
        course.record_quiz_completion();
        assert_eq!(course.progress, 25);
        assert_eq!(course.completed, 1);
    }
}
