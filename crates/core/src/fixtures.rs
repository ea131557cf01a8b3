//! Demo content served when nobody is signed in.

use crate::model::{Course, Question, Quiz};

fn course(
    id: &str,
    title: &str,
    category: &str,
    lessons: u32,
    completed: u32,
    progress: u8,
) -> Course {
    Course {
        id: id.to_owned(),
        title: title.to_owned(),
        category: category.to_owned(),
        lessons,
        completed,
        progress,
    }
}

#[must_use]
pub fn demo_courses() -> Vec<Course> {
    vec![
        course("irrigation_mastery", "Smart Irrigation Mastery", "water", 8, 5, 65),
        course("soil_health", "Soil Health Fundamentals", "soil", 10, 9, 90),
        course("pest_control", "Integrated Pest Management", "pest", 6, 2, 30),
        course("organic_farming", "Organic Farming Practices", "sustainable", 12, 0, 0),
        course("crop_rotation", "Crop Rotation Strategies", "soil", 5, 5, 100),
    ]
}

#[must_use]
pub fn demo_quizzes() -> Vec<Quiz> {
    vec![Quiz::new(
        "irrigation_mastery",
        vec![
            Question::new(
                "Which irrigation method is most water-efficient?",
                ["Flood Irrigation", "Sprinkler System", "Drip Irrigation", "Manual Watering"],
                2,
            )
            .with_explanation(
                "Drip irrigation delivers water directly to plant roots, reducing waste by up to 50%.",
            ),
            Question::new(
                "What is the ideal time for irrigation?",
                ["Noon", "Evening", "Early morning", "Late night"],
                2,
            )
            .with_explanation(
                "Early morning irrigation reduces evaporation and allows plants to absorb water efficiently.",
            ),
        ],
    )]
}

/// The demo quiz attached to `course_id`, if any.
#[must_use]
pub fn demo_quiz_for(course_id: &str) -> Option<Quiz> {
    demo_quizzes()
        .into_iter()
        .find(|quiz| quiz.course_id == course_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz_engine::QuizEngine;

    #[test]
    fn every_demo_quiz_starts_and_belongs_to_a_course() {
        let courses = demo_courses();
        for quiz in demo_quizzes() {
            assert!(courses.iter().any(|c| c.id == quiz.course_id));
            QuizEngine::started(quiz).unwrap();
        }
    }

    #[test]
    fn demo_quiz_lookup() {
        assert!(demo_quiz_for("irrigation_mastery").is_some());
        assert!(demo_quiz_for("soil_health").is_none());
    }
}
