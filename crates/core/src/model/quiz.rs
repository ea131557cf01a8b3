use serde::{Deserialize, Serialize};

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    #[must_use]
    pub fn new<I, S>(prompt: impl Into<String>, options: I, correct: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct,
            explanation: String::new(),
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct
    }
}

/// An ordered set of questions attached to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(alias = "course_id")]
    pub course_id: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn new(course_id: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            course_id: course_id.into(),
            questions,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_fixture_shape() {
        let quiz: Quiz = serde_json::from_str(
            r#"{
                "courseId": "irrigation_mastery",
                "questions": [
                    { "question": "Best time?", "options": ["Noon", "Morning"], "correct": 1 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(quiz.course_id, "irrigation_mastery");
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.questions[0].prompt, "Best time?");
        assert_eq!(quiz.questions[0].explanation, "");
        assert!(quiz.questions[0].is_correct(1));
    }
}
